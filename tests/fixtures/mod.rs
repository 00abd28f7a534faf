//! Canned provider payloads shared by the integration tests.

use serde_json::{json, Map, Value};

/// `count` consecutive canonical periods starting at `year-month`.
pub fn monthly_periods(year: i32, month: u32, count: usize) -> Vec<String> {
    (0..count)
        .map(|offset| {
            let index = (month - 1) as usize + offset;
            format!("{:04}-{:02}", year + (index / 12) as i32, index % 12 + 1)
        })
        .collect()
}

/// Index levels growing by `monthly_pct` each month from `start`.
pub fn compounding_index(start: f64, monthly_pct: f64, count: usize) -> Vec<Option<f64>> {
    (0..count)
        .map(|step| Some(start * (1.0 + monthly_pct / 100.0).powi(step as i32)))
        .collect()
}

/// Twelve months at 100 followed by twelve at 110.
pub fn flat_then_higher() -> Vec<Option<f64>> {
    (0..24)
        .map(|index| Some(if index < 12 { 100.0 } else { 110.0 }))
        .collect()
}

/// SDMX-JSON 1.0 message with one series and a TIME_PERIOD dimension.
pub fn sdmx_body(periods: &[String], values: &[Option<f64>]) -> String {
    let observations = values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| value.map(|value| (index.to_string(), json!([value, 0]))))
        .collect::<Map<String, Value>>();
    let time_values = periods
        .iter()
        .map(|period| json!({ "id": period, "name": period }))
        .collect::<Vec<_>>();

    json!({
        "header": { "id": "PRICES_CPI", "test": false },
        "dataSets": [{
            "action": "Information",
            "series": { "0:0:0:0": { "attributes": [0], "observations": observations } }
        }],
        "structure": {
            "dimensions": {
                "series": [
                    { "id": "LOCATION", "values": [{ "id": "TUR", "name": "Türkiye" }] }
                ],
                "observation": [
                    { "id": "TIME_PERIOD", "name": "Time", "values": time_values }
                ]
            }
        }
    })
    .to_string()
}

/// CSV with the given header names; `value_first` swaps the column order.
pub fn csv_body(
    time_header: &str,
    value_header: &str,
    periods: &[String],
    values: &[Option<f64>],
    value_first: bool,
) -> String {
    let mut lines = Vec::with_capacity(periods.len() + 1);
    if value_first {
        lines.push(format!("REF_AREA,{value_header},{time_header},UNIT_MEASURE"));
    } else {
        lines.push(format!("REF_AREA,{time_header},{value_header},UNIT_MEASURE"));
    }

    for (period, value) in periods.iter().zip(values) {
        let value = value.map(|value| value.to_string()).unwrap_or_default();
        if value_first {
            lines.push(format!("TUR,{value},{period},\"IX, 2015=100\""));
        } else {
            lines.push(format!("TUR,{period},{value},\"IX, 2015=100\""));
        }
    }
    lines.join("\n")
}

/// DBnomics series response wrapping parallel arrays under `series.docs`.
pub fn dbnomics_body(code: &str, periods: &[String], values: &[Option<f64>]) -> String {
    let values = values
        .iter()
        .map(|value| value.map_or_else(|| json!("NA"), |value| json!(value)))
        .collect::<Vec<_>>();

    json!({
        "series": {
            "num_found": 1,
            "docs": [{
                "dataset_code": "CPI",
                "provider_code": "IMF",
                "series_code": code,
                "period": periods,
                "value": values
            }]
        }
    })
    .to_string()
}

/// Central bank style table: rows of (MM-YYYY, annual %, monthly %).
pub fn tcmb_page(rows: &[(&str, &str, &str)]) -> String {
    let body = rows
        .iter()
        .map(|(period, annual, monthly)| {
            format!("<tr><td><b>{period}</b></td><td>{annual}</td><td>{monthly}</td></tr>")
        })
        .collect::<String>();

    format!(
        "<html><body><table class=\"tcmbTable\">\
         <tr><th>Ay-Yıl</th><th>TÜFE (Yıllık % Değişim)</th><th>TÜFE (Aylık % Değişim)</th></tr>\
         {body}</table></body></html>"
    )
}
