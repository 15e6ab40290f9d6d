use cvclient_api::types::{AlertValue, AlertsResponse, ChartResponse, StatusResponse};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_alerts_full() {
    let json = load_fixture("alerts.json");
    let resp: AlertsResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(
        resp.tx.as_deref(),
        Some("9fd73a9f-6008-4df1-bc60-5c86a0aa0350")
    );
    let alerts = resp.alerts.unwrap();
    assert_eq!(alerts.len(), 6);
    assert_eq!(alerts["bch"], AlertValue::Series(vec![0.08, 0.24, 0.24]));
    assert_eq!(alerts["FGI"], AlertValue::Level(25.0));
    assert_eq!(resp.kind, None);
    assert_eq!(resp.msg, None);
}

#[test]
fn deserialize_chart_full() {
    let json = load_fixture("chart.json");
    let resp: ChartResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.stamp.as_deref(), Some("2021-07-12-13-55"));
    let bars = resp.chart_data.unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(
        bars[0],
        vec![Some(281.84), Some(282.28), Some(281.84), Some(282.28), Some(0.1814)]
    );
    assert_eq!(resp.price_data, None);
    let alert_data = resp.alert_data.unwrap();
    assert_eq!(alert_data["xrp"], AlertValue::Level(-3.26));
}

#[test]
fn deserialize_status() {
    let json = load_fixture("status.json");
    let resp: StatusResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.stamp.as_deref(), Some("2021-07-12-13-55"));
    assert!(resp.tx.is_some());
}

#[test]
fn deserialize_status_error_message() {
    let json = r#"{"tx": "abc", "type": "error", "msg": "unknown status type"}"#;
    let resp: StatusResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.stamp, None);
    assert_eq!(resp.kind.as_deref(), Some("error"));
    assert_eq!(resp.msg.as_deref(), Some("unknown status type"));
}
