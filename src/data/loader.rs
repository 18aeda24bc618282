use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray, ListArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::model::{Curve, Dataset, GroupDefinitions, Label, NameRegistry};

const CURVE_COL: &str = "curve";
const LABEL_COL: &str = "label";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a labelled curve collection from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – `curve` list column and `label` column (recommended)
/// * `.json`    – `[{ "curve": [...], "label": ... }, ...]`
/// * `.csv`     – `curve` column of semicolon-separated floats, `label` column
///
/// Missing measurements (JSON `null`, empty / `nan` CSV tokens, Parquet
/// nulls) become `NaN`.
pub fn load_file(path: &Path) -> Result<Dataset<Label>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!("Loaded {} curves from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Read a `{ "<label>": "<learner name>", ... }` JSON object.
///
/// Keys that parse as integers become [`Label::Integer`].
pub fn load_registry(path: &Path) -> Result<NameRegistry<Label>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading registry {}", path.display()))?;
    let raw: std::collections::BTreeMap<String, String> =
        serde_json::from_str(&text).context("parsing registry JSON")?;
    Ok(raw
        .into_iter()
        .map(|(key, name)| (parse_label(&key), name))
        .collect())
}

/// Read a `{ "<group>": ["<learner name>", ...], ... }` JSON object.
///
/// Groups keep the order they appear in the file.
pub fn load_group_definitions(path: &Path) -> Result<GroupDefinitions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading group definitions {}", path.display()))?;
    let raw: serde_json::Map<String, JsonValue> =
        serde_json::from_str(&text).context("parsing group definitions JSON")?;

    raw.into_iter()
        .map(|(group, members)| {
            let members: Vec<String> = serde_json::from_value(members)
                .with_context(|| format!("group '{group}': expected a list of learner names"))?;
            Ok((group, members))
        })
        .collect()
}

/// Write any result as pretty JSON. `NaN` is written as `null`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)
        .with_context(|| format!("writing {}", path.display()))
}

fn parse_label(s: &str) -> Label {
    match s.parse::<Label>() {
        Ok(label) => label,
        Err(never) => match never {},
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented layout (`df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "curve": [0.51, 0.63, null, 0.70], "label": 3 },
///   { "curve": [0.48, 0.49, 0.49],       "label": "knn" }
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset<Label>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut curves = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        curves.push(json_array_to_curve(obj.get(CURVE_COL), i)?);
        labels.push(json_to_label(obj.get(LABEL_COL), i)?);
    }

    Ok(Dataset { curves, labels })
}

fn json_array_to_curve(val: Option<&JsonValue>, row: usize) -> Result<Curve> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("Row {row}: missing or invalid '{CURVE_COL}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| match v {
            JsonValue::Null => Ok(f64::NAN),
            other => other
                .as_f64()
                .with_context(|| format!("Row {row}, {CURVE_COL}[{j}]: not a number")),
        })
        .collect()
}

fn json_to_label(val: Option<&JsonValue>, row: usize) -> Result<Label> {
    match val {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .map(Label::Integer)
            .with_context(|| format!("Row {row}: label {n} is not an integer")),
        Some(JsonValue::String(s)) => Ok(Label::Text(s.clone())),
        Some(other) => bail!("Row {row}: label must be an integer or string, got {other}"),
        None => bail!("Row {row}: missing '{LABEL_COL}'"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names.
/// `curve` holds semicolon-separated floats, `"0.51;0.63;;0.70"`, where an
/// empty token or `nan` marks a missing value. `label` is an integer or a name.
/// Other columns are ignored.
fn load_csv(path: &Path) -> Result<Dataset<Label>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?;

    let curve_idx = headers
        .iter()
        .position(|h| h == CURVE_COL)
        .context("CSV missing 'curve' column")?;
    let label_idx = headers
        .iter()
        .position(|h| h == LABEL_COL)
        .context("CSV missing 'label' column")?;

    let mut curves = Vec::new();
    let mut labels = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        curves.push(parse_semicolon_floats(
            record.get(curve_idx).unwrap_or(""),
            row_no,
        )?);

        let label = record.get(label_idx).unwrap_or("").trim();
        if label.is_empty() {
            bail!("CSV row {row_no}: empty label");
        }
        labels.push(parse_label(label));
    }

    Ok(Dataset { curves, labels })
}

fn parse_semicolon_floats(s: &str, row: usize) -> Result<Curve> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            let tok = tok.trim();
            if tok.is_empty() {
                return Ok(f64::NAN);
            }
            // "nan" / "NaN" parse natively
            tok.parse::<f64>().with_context(|| {
                format!("Row {row}, {CURVE_COL}[{j}]: '{tok}' is not a number")
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of learning curves.
///
/// Expected schema:
/// - `curve`: List<Float64|Float32> or LargeList<..>, null items are missing values
/// - `label`: Int32, Int64 or Utf8
/// - Any other columns are ignored
fn load_parquet(path: &Path) -> Result<Dataset<Label>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut curves = Vec::new();
    let mut labels = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let curve_idx = schema
            .index_of(CURVE_COL)
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'curve' column"))?;
        let label_idx = schema
            .index_of(LABEL_COL)
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'label' column"))?;

        let curve_col = batch.column(curve_idx);
        let label_col = batch.column(label_idx);

        for row in 0..batch.num_rows() {
            let offset = curves.len();
            curves.push(
                extract_curve(curve_col, row)
                    .with_context(|| format!("Row {offset}: failed to read 'curve'"))?,
            );
            labels.push(
                extract_label(label_col, row)
                    .with_context(|| format!("Row {offset}: failed to read 'label'"))?,
            );
        }
    }

    Ok(Dataset { curves, labels })
}

// -- Parquet / Arrow helpers --

/// Extract a curve from a List or LargeList column at the given row.
fn extract_curve(col: &Arc<dyn Array>, row: usize) -> Result<Curve> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .context("expected ListArray")?
            .value(row),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .context("expected LargeListArray")?
            .value(row),
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

fn extract_label(col: &Arc<dyn Array>, row: usize) -> Result<Label> {
    if col.is_null(row) {
        bail!("null label");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(Label::Integer(i64::from(arr.value(row))))
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(Label::Integer(arr.value(row)))
        }
        DataType::Utf8 => Ok(Label::Text(col.as_string::<i32>().value(row).to_string())),
        DataType::LargeUtf8 => Ok(Label::Text(col.as_string::<i64>().value(row).to_string())),
        other => bail!("Unsupported label type {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_floats_mark_gaps_as_nan() {
        let curve = parse_semicolon_floats("0.5; ;0.7;nan", 0).unwrap();
        assert_eq!(curve.len(), 4);
        assert_eq!(curve[0], 0.5);
        assert!(curve[1].is_nan());
        assert_eq!(curve[2], 0.7);
        assert!(curve[3].is_nan());
    }

    #[test]
    fn semicolon_floats_reject_garbage() {
        assert!(parse_semicolon_floats("0.5;abc", 3).is_err());
    }

    #[test]
    fn labels_parse_as_integer_when_possible() {
        assert_eq!(parse_label("12"), Label::Integer(12));
        assert_eq!(parse_label("svm"), Label::Text("svm".into()));
    }

    #[test]
    fn json_label_must_be_integer_or_string() {
        assert!(json_to_label(Some(&JsonValue::Bool(true)), 0).is_err());
        assert!(json_to_label(None, 0).is_err());
        assert!(json_to_label(Some(&serde_json::json!(1.5)), 0).is_err());
        assert_eq!(
            json_to_label(Some(&serde_json::json!(4)), 0).unwrap(),
            Label::Integer(4)
        );
    }
}
