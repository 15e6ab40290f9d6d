use anyhow::Result;
use cvclient_lib::types::{AlertValue, AlertsResponse, ChartResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct AlertRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Values")]
    #[serde(rename = "Values")]
    values: String,
}

#[derive(Tabled, Serialize)]
struct BarRow {
    #[tabled(rename = "Bar")]
    #[serde(rename = "Bar")]
    index: usize,
    #[tabled(rename = "Values")]
    #[serde(rename = "Values")]
    values: String,
}

// -- Row builders --

fn build_alert_rows(alerts: &BTreeMap<String, AlertValue>) -> Vec<AlertRow> {
    alerts
        .iter()
        .map(|(symbol, value)| AlertRow {
            symbol: symbol.clone(),
            values: value.display(),
        })
        .collect()
}

fn build_bar_rows(bars: &[Vec<Option<f64>>]) -> Vec<BarRow> {
    bars.iter()
        .enumerate()
        .map(|(index, bar)| BarRow {
            index,
            values: bar
                .iter()
                .map(|v| v.map_or_else(|| "-".to_string(), |v| v.to_string()))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

// -- Rendering --

fn print_rows<R: Tabled + Serialize>(rows: Vec<R>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

pub fn print_alerts(resp: &AlertsResponse, format: &OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        print_json(resp);
        return Ok(());
    }
    let empty = BTreeMap::new();
    print_rows(build_alert_rows(resp.alerts.as_ref().unwrap_or(&empty)), format)
}

pub fn print_chart(resp: &ChartResponse, format: &OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        print_json(resp);
        return Ok(());
    }
    print_rows(
        build_bar_rows(resp.chart_data.as_deref().unwrap_or(&[])),
        format,
    )?;
    if let Some(alert_data) = &resp.alert_data {
        print_rows(build_alert_rows(alert_data), format)?;
    }
    if let Some(price_data) = &resp.price_data {
        print_json(price_data);
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_alerts_fixture() -> AlertsResponse {
        let json_str = include_str!("../../cvclient_api/tests/fixtures/alerts.json");
        serde_json::from_str(json_str).unwrap()
    }

    fn load_chart_fixture() -> ChartResponse {
        let json_str = include_str!("../../cvclient_api/tests/fixtures/chart.json");
        serde_json::from_str(json_str).unwrap()
    }

    #[test]
    fn alert_rows_are_sorted_by_symbol() {
        let resp = load_alerts_fixture();
        let rows = build_alert_rows(resp.alerts.as_ref().unwrap());
        assert_eq!(rows.len(), 6);
        // BTreeMap ordering: uppercase sorts first.
        assert_eq!(rows[0].symbol, "FGI");
        assert_eq!(rows[0].values, "25");
        assert_eq!(rows[1].symbol, "bch");
        assert_eq!(rows[1].values, "0.08, 0.24, 0.24");
    }

    #[test]
    fn bar_rows_are_indexed() {
        let resp = load_chart_fixture();
        let rows = build_bar_rows(resp.chart_data.as_deref().unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[1].values, "282.28, 282.72, 282.28, 282.72, 0.1814");
    }

    #[test]
    fn table_render_contains_headers() {
        let resp = load_alerts_fixture();
        let table = Table::new(build_alert_rows(resp.alerts.as_ref().unwrap())).to_string();
        assert!(table.contains("Symbol"));
        assert!(table.contains("Values"));
        assert!(table.contains("btc_eth"));
    }

    #[test]
    fn csv_rows_serialize() {
        let resp = load_alerts_fixture();
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in build_alert_rows(resp.alerts.as_ref().unwrap()) {
            wtr.serialize(row).unwrap();
        }
        let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let mut lines = data.lines();
        assert_eq!(lines.next(), Some("Symbol,Values"));
        assert_eq!(lines.next(), Some("FGI,25"));
    }

    #[test]
    fn missing_cells_render_as_dash() {
        let rows = build_bar_rows(&[vec![Some(1.0), None, Some(2.5)]]);
        assert_eq!(rows[0].values, "1, -, 2.5");
    }

    #[test]
    fn empty_chart_renders_no_rows() {
        assert!(build_bar_rows(&[]).is_empty());
    }
}
