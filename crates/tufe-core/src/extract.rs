//! Wire-format adapters that turn provider payloads into a [`Series`].
//!
//! Each [`ExtractStrategy`] is a pure function from the raw body to a series.
//! A strategy that does not recognise the payload returns an empty series
//! rather than an error, so callers can try the next one.
//!
//! # Strategies
//!
//! | Strategy | Payload |
//! |----------|---------|
//! | [`ExtractStrategy::DimensionMap`] | SDMX-JSON dimension values + sparse observation map |
//! | [`ExtractStrategy::CsvColumnar`] | CSV with time/value columns under varying names |
//! | [`ExtractStrategy::ParallelArrays`] | `{"period": [...], "value": [...]}` |
//! | [`ExtractStrategy::WrappedParallelArrays`] | the same under `series.docs[0]` |
//! | [`ExtractStrategy::RowPairs`] | `[["2025-07", 1.2], ...]` |

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Deserialize;
use serde_json::Value;

use crate::number::{parse_number, to_number};
use crate::series::Series;

const TIME_COLUMNS: [&str; 5] = ["time_period", "time", "period", "date", "ref_period"];
const VALUE_COLUMNS: [&str; 4] = ["obs_value", "value", "obs value", "observation value"];

/// Closed set of supported payload layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractStrategy {
    DimensionMap,
    CsvColumnar,
    ParallelArrays,
    WrappedParallelArrays,
    RowPairs,
}

impl ExtractStrategy {
    /// Declared priority order used by [`PayloadShape::Auto`].
    pub const ALL: [Self; 5] = [
        Self::DimensionMap,
        Self::CsvColumnar,
        Self::ParallelArrays,
        Self::WrappedParallelArrays,
        Self::RowPairs,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DimensionMap => "dimension_map",
            Self::CsvColumnar => "csv_columnar",
            Self::ParallelArrays => "parallel_arrays",
            Self::WrappedParallelArrays => "wrapped_parallel_arrays",
            Self::RowPairs => "row_pairs",
        }
    }

    pub fn extract(self, body: &str) -> Series {
        match self {
            Self::DimensionMap => extract_dimension_map(body),
            Self::CsvColumnar => extract_csv(body),
            Self::ParallelArrays => extract_parallel_arrays(body),
            Self::WrappedParallelArrays => extract_wrapped_parallel_arrays(body),
            Self::RowPairs => extract_row_pairs(body),
        }
    }
}

impl Display for ExtractStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategies to run against a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadShape {
    #[default]
    Auto,
    Only(ExtractStrategy),
}

/// Extracts a series, returning an empty one when nothing matches.
pub fn extract(body: &str, shape: PayloadShape) -> Series {
    extract_traced(body, shape)
        .map(|(_, series)| series)
        .unwrap_or_default()
}

/// Like [`extract`] but also reports which strategy matched.
pub fn extract_traced(body: &str, shape: PayloadShape) -> Option<(ExtractStrategy, Series)> {
    let strategies: &[ExtractStrategy] = match &shape {
        PayloadShape::Auto => &ExtractStrategy::ALL,
        PayloadShape::Only(strategy) => std::slice::from_ref(strategy),
    };

    strategies.iter().find_map(|strategy| {
        let series = strategy.extract(body);
        (!series.is_empty()).then_some((*strategy, series))
    })
}

// ---------------------------------------------------------------------------
// SDMX-JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct SdmxMessage {
    #[serde(rename = "dataSets", default)]
    data_sets: Vec<SdmxDataSet>,
    #[serde(default)]
    structure: Option<SdmxStructure>,
    #[serde(default)]
    data: Option<SdmxPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxPayload {
    #[serde(rename = "dataSets", default)]
    data_sets: Vec<SdmxDataSet>,
    #[serde(default)]
    structure: Option<SdmxStructure>,
    #[serde(default)]
    structures: Vec<SdmxStructure>,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxDataSet {
    #[serde(default)]
    series: BTreeMap<String, SdmxSeries>,
    #[serde(default)]
    observations: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxSeries {
    #[serde(default)]
    observations: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxStructure {
    #[serde(default)]
    dimensions: SdmxDimensions,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxDimensions {
    #[serde(default)]
    observation: Vec<SdmxDimension>,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxDimension {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    values: Vec<SdmxDimensionValue>,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxDimensionValue {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
}

impl SdmxDimensionValue {
    fn label(&self) -> Option<String> {
        self.id
            .as_ref()
            .and_then(scalar_label)
            .or_else(|| self.name.as_ref().and_then(localized_label))
    }
}

impl SdmxMessage {
    fn into_parts(self) -> Option<(SdmxDataSet, SdmxStructure)> {
        let SdmxMessage {
            data_sets,
            structure,
            data,
        } = self;

        if let (Some(data_set), Some(structure)) = (data_sets.into_iter().next(), structure) {
            return Some((data_set, structure));
        }

        let payload = data?;
        let structure = payload
            .structure
            .or_else(|| payload.structures.into_iter().next())?;
        let data_set = payload.data_sets.into_iter().next()?;
        Some((data_set, structure))
    }
}

fn extract_dimension_map(body: &str) -> Series {
    let Ok(message) = serde_json::from_str::<SdmxMessage>(body) else {
        return Series::empty();
    };
    let Some((data_set, structure)) = message.into_parts() else {
        return Series::empty();
    };

    let dimensions = structure.dimensions.observation;
    let time_position = dimensions
        .iter()
        .position(|dimension| dimension.id.as_deref() == Some("TIME_PERIOD"))
        .unwrap_or(0);
    let Some(time_dimension) = dimensions.get(time_position) else {
        return Series::empty();
    };
    let labels = time_dimension
        .values
        .iter()
        .map(SdmxDimensionValue::label)
        .collect::<Vec<_>>();

    let mut points = Vec::new();

    if let Some(series) = data_set.series.into_values().next() {
        // Series-keyed layout: observation keys index the time dimension.
        for (key, observation) in &series.observations {
            push_sdmx_point(&mut points, &labels, key.trim(), observation);
        }
    } else {
        // Flat layout: keys are "i:j:...:t" across all observation dimensions.
        for (key, observation) in &data_set.observations {
            let Some(time_key) = key.split(':').nth(time_position) else {
                continue;
            };
            push_sdmx_point(&mut points, &labels, time_key, observation);
        }
    }

    Series::from_points(points)
}

fn push_sdmx_point(
    points: &mut Vec<(String, Option<f64>)>,
    labels: &[Option<String>],
    index_key: &str,
    observation: &Value,
) {
    let Ok(index) = index_key.parse::<usize>() else {
        return;
    };
    let Some(Some(period)) = labels.get(index) else {
        return;
    };
    let value = match observation {
        Value::Array(items) => items.first().and_then(to_number),
        other => to_number(other),
    };
    if value.is_some() {
        points.push((period.clone(), value));
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn extract_csv(body: &str) -> Series {
    let body = body.trim_start_matches('\u{feff}');
    let trimmed = body.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('<') {
        return Series::empty();
    }

    let header_line = trimmed.lines().next().unwrap_or_default();
    let delimiter = if !header_line.contains(',') && header_line.contains(';') {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(trimmed.as_bytes());

    let Ok(headers) = reader.headers() else {
        return Series::empty();
    };
    let Some(time_index) = find_column(headers, &TIME_COLUMNS) else {
        return Series::empty();
    };
    let Some(value_index) = find_column(headers, &VALUE_COLUMNS) else {
        return Series::empty();
    };

    let mut points = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        let Some(period) = record.get(time_index).filter(|cell| !cell.is_empty()) else {
            continue;
        };
        let value = record.get(value_index).and_then(parse_number);
        points.push((period.to_owned(), value));
    }

    Series::from_points(points)
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    let normalized = headers
        .iter()
        .map(|header| header.trim().trim_matches('"').to_ascii_lowercase())
        .collect::<Vec<_>>();

    aliases
        .iter()
        .find_map(|alias| normalized.iter().position(|header| header == alias))
}

// ---------------------------------------------------------------------------
// JSON arrays
// ---------------------------------------------------------------------------

fn extract_parallel_arrays(body: &str) -> Series {
    let Ok(root) = serde_json::from_str::<Value>(body) else {
        return Series::empty();
    };
    parallel_arrays(&root)
}

fn extract_wrapped_parallel_arrays(body: &str) -> Series {
    let Ok(root) = serde_json::from_str::<Value>(body) else {
        return Series::empty();
    };

    let documents = [
        root.pointer("/series/docs/0"),
        root.pointer("/docs/0"),
        root.pointer("/series/0"),
    ];
    let series = documents
        .into_iter()
        .flatten()
        .map(parallel_arrays)
        .find(|series| !series.is_empty())
        .unwrap_or_default();
    series
}

fn parallel_arrays(document: &Value) -> Series {
    let periods = document
        .get("period")
        .or_else(|| document.get("periods"))
        .and_then(Value::as_array);
    let values = document
        .get("value")
        .or_else(|| document.get("values"))
        .and_then(Value::as_array);

    let (Some(periods), Some(values)) = (periods, values) else {
        return Series::empty();
    };
    if periods.is_empty() || periods.len() != values.len() {
        return Series::empty();
    }

    Series::from_points(
        periods
            .iter()
            .zip(values)
            .filter_map(|(period, value)| Some((scalar_label(period)?, to_number(value)))),
    )
}

fn extract_row_pairs(body: &str) -> Series {
    let Ok(root) = serde_json::from_str::<Value>(body) else {
        return Series::empty();
    };

    let rows = match &root {
        Value::Array(rows) => Some(rows),
        Value::Object(_) => ["data", "observations", "rows"]
            .iter()
            .find_map(|key| root.get(*key).and_then(Value::as_array)),
        _ => None,
    };
    let Some(rows) = rows else {
        return Series::empty();
    };

    Series::from_points(rows.iter().filter_map(|row| {
        let pair = row.as_array().filter(|pair| pair.len() >= 2)?;
        Some((scalar_label(&pair[0])?, to_number(&pair[1])))
    }))
}

fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn localized_label(value: &Value) -> Option<String> {
    match value {
        Value::Object(languages) => languages
            .get("en")
            .or_else(|| languages.values().next())
            .and_then(scalar_label),
        other => scalar_label(other),
    }
}
