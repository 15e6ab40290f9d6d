//! Response bodies.
//!
//! The client only depends on `tx` and `stamp`; everything else is passed
//! through for display. Fields are read leniently so an unexpected shape in
//! one of them never makes the whole response unreadable: text fields accept
//! any JSON value, chart cells that are not numbers become `None`, and a
//! missing or `null` field is `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A decoded response body before it is viewed as a typed response.
pub type Payload = serde_json::Map<String, Value>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tx: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stamp: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub msg: Option<String>,
}

impl StatusResponse {
    /// Views a decoded payload as a status response.
    pub fn from_payload(payload: &Payload) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(payload.clone()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlertsResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tx: Option<String>,
    #[serde(default, deserialize_with = "lenient_alerts")]
    pub alerts: Option<BTreeMap<String, AlertValue>>,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub msg: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChartResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tx: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub chart_data: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default)]
    pub price_data: Option<Value>,
    #[serde(default, deserialize_with = "lenient_alerts")]
    pub alert_data: Option<BTreeMap<String, AlertValue>>,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub msg: Option<String>,
}

/// Strings as-is, `null` as absent, any other value in its JSON form.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Rows of numeric cells. A non-numeric cell is `None`, a row that is not an
/// array is empty, and anything but an array of rows is absent.
fn lenient_rows<'de, D>(deserializer: D) -> Result<Option<Vec<Vec<Option<f64>>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(rows)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        rows.iter()
            .map(|row| match row {
                Value::Array(cells) => cells.iter().map(Value::as_f64).collect(),
                _ => Vec::new(),
            })
            .collect(),
    ))
}

/// A symbol-to-value map; anything that is not a JSON object is absent.
fn lenient_alerts<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, AlertValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Object(map)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        map.into_iter()
            .map(|(symbol, value)| (symbol, AlertValue::from(value)))
            .collect(),
    ))
}

/// One alert entry: a series of readings, a single reading, or something else.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AlertValue {
    Series(Vec<f64>),
    Level(f64),
    Other(serde_json::Value),
}

impl From<Value> for AlertValue {
    fn from(value: Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(AlertValue::Other(value))
    }
}

impl AlertValue {
    /// Renders the value the way a table cell would show it.
    pub fn display(&self) -> String {
        match self {
            AlertValue::Series(values) => values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            AlertValue::Level(v) => v.to_string(),
            AlertValue::Other(v) => v.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_value_variants() {
        let series: AlertValue = serde_json::from_str("[0.08, 0.24]").unwrap();
        assert_eq!(series, AlertValue::Series(vec![0.08, 0.24]));
        let level: AlertValue = serde_json::from_str("25").unwrap();
        assert_eq!(level, AlertValue::Level(25.0));
        let other: AlertValue = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(other, AlertValue::Other(serde_json::json!("n/a")));
    }

    #[test]
    fn alert_value_display() {
        assert_eq!(AlertValue::Series(vec![1.5, -2.0]).display(), "1.5, -2");
        assert_eq!(AlertValue::Level(25.0).display(), "25");
    }

    #[test]
    fn missing_fields_are_none() {
        let resp: StatusResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.stamp, None);
        assert_eq!(resp.tx, None);
    }

    #[test]
    fn text_fields_accept_any_value() {
        let json = r#"{"tx": 7, "stamp": 20210712, "type": 1, "msg": {"code": 3}}"#;
        let resp: StatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.tx.as_deref(), Some("7"));
        assert_eq!(resp.stamp.as_deref(), Some("20210712"));
        assert_eq!(resp.kind.as_deref(), Some("1"));
        assert_eq!(resp.msg.as_deref(), Some(r#"{"code":3}"#));

        let resp: StatusResponse = serde_json::from_str(r#"{"stamp": null}"#).unwrap();
        assert_eq!(resp.stamp, None);
    }

    #[test]
    fn chart_cells_tolerate_gaps() {
        let json = r#"{"chart_data": [[1.0, null, 2.0], "bad", [3, "x"]], "type": 1}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.chart_data.unwrap(),
            vec![
                vec![Some(1.0), None, Some(2.0)],
                vec![],
                vec![Some(3.0), None],
            ]
        );
        assert_eq!(resp.kind.as_deref(), Some("1"));

        let resp: ChartResponse = serde_json::from_str(r#"{"chart_data": "none"}"#).unwrap();
        assert_eq!(resp.chart_data, None);
    }

    #[test]
    fn alerts_that_are_not_a_map_are_absent() {
        let resp: AlertsResponse = serde_json::from_str(r#"{"alerts": [1, 2]}"#).unwrap();
        assert_eq!(resp.alerts, None);

        let json = r#"{"alerts": {"FGI": 25, "bch": [0.1, null]}}"#;
        let resp: AlertsResponse = serde_json::from_str(json).unwrap();
        let alerts = resp.alerts.unwrap();
        assert_eq!(alerts["FGI"], AlertValue::Level(25.0));
        assert_eq!(alerts["bch"], AlertValue::Other(serde_json::json!([0.1, null])));
    }

    #[test]
    fn status_from_payload() {
        let payload = match serde_json::json!({"tx": "a", "stamp": "s1"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let resp = StatusResponse::from_payload(&payload).unwrap();
        assert_eq!(resp.stamp.as_deref(), Some("s1"));
    }
}
