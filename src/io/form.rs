//! Read raw submissions from the command line, JSON files, and CSV files.
//!
//! Readers only collect `name -> string` pairs. They never judge whether a
//! value is numeric or whether all fields are present; that is the
//! normalizer's job, so a bad submission still produces the error
//! presentation instead of aborting the run.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;

use crate::domain::RawInputMap;
use crate::error::{AppError, EXIT_INPUT};

/// Parse one `name=value` CLI argument (used as a clap value parser).
pub fn parse_field_arg(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {arg:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in {arg:?}"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Build a submission from `--field` pairs, keeping their order.
pub fn raw_from_pairs(pairs: &[(String, String)]) -> RawInputMap {
    pairs.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect()
}

/// Read a submission from a flat JSON object of strings or numbers.
pub fn read_form_json(path: &Path) -> Result<RawInputMap, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open input JSON '{}': {e}", path.display()),
        )
    })?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid input JSON '{}': {e}", path.display())))?;
    raw_from_json(&value)
}

/// Convert a parsed JSON object into a submission.
///
/// Booleans become `1`/`0` and `null` becomes an empty (missing) value.
pub fn raw_from_json(value: &Value) -> Result<RawInputMap, AppError> {
    let Value::Object(object) = value else {
        return Err(AppError::new(EXIT_INPUT, "Input JSON must be an object of field values."));
    };

    let mut raw = RawInputMap::new();
    for (name, value) in object {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => u8::from(*b).to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                return Err(AppError::new(
                    EXIT_INPUT,
                    format!("Input JSON field '{name}' must be a string or number."),
                ));
            }
        };
        raw.insert(name.as_str(), text);
    }
    Ok(raw)
}

/// Read one submission per CSV row; the header row names the fields.
pub fn read_batch_csv(path: &Path) -> Result<Vec<RawInputMap>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open batch CSV '{}': {e}", path.display()),
        )
    })?;
    read_batch(file)
}

/// Same as `read_batch_csv` for any reader.
///
/// Short rows yield short submissions and long rows keep their extra values
/// under positional names (`column_11`, ...), so both are rejected later as a
/// wrong field count rather than a read error.
pub fn read_batch<R: Read>(reader: R) -> Result<Vec<RawInputMap>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV headers: {e}")))?
        .clone();
    if headers.is_empty() {
        return Err(AppError::new(EXIT_INPUT, "Batch CSV has no header row."));
    }

    let mut rows: Vec<RawInputMap> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV line {line}: {e}")))?;
        let mut raw: RawInputMap = headers.iter().zip(record.iter()).collect();
        for (col, value) in record.iter().enumerate().skip(headers.len()) {
            raw.insert(format!("column_{}", col + 1), value);
        }
        rows.push(raw);
    }

    tracing::debug!(rows = rows.len(), "read batch CSV");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FormField;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn field_args_split_on_first_equals() {
        assert_eq!(
            parse_field_arg("age=67").unwrap(),
            ("age".to_string(), "67".to_string())
        );
        assert_eq!(
            parse_field_arg("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_field_arg("age").is_err());
        assert!(parse_field_arg("=5").is_err());
    }

    #[test]
    fn pairs_keep_order() {
        let raw = raw_from_pairs(&[
            ("bmi".to_string(), "22".to_string()),
            ("age".to_string(), "40".to_string()),
        ]);
        let names: Vec<&str> = raw.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["bmi", "age"]);
    }

    #[test]
    fn json_values_become_strings() {
        let value = serde_json::json!({
            "age": 67,
            "bmi": "36.6",
            "hypertension": true,
            "glucose": null,
        });
        let raw = raw_from_json(&value).unwrap();
        assert_eq!(raw.get_field(FormField::Age), Some("67"));
        assert_eq!(raw.get_field(FormField::Bmi), Some("36.6"));
        assert_eq!(raw.get_field(FormField::Hypertension), Some("1"));
        assert_eq!(raw.get_field(FormField::Glucose), Some(""));
    }

    #[test]
    fn json_rejects_nested_values() {
        let err = raw_from_json(&serde_json::json!({"age": [1, 2]})).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        let err = raw_from_json(&serde_json::json!([1, 2])).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }

    #[test]
    fn reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"age": "67", "bmi": 30}}"#).unwrap();
        let raw = read_form_json(file.path()).unwrap();
        assert_eq!(raw.len(), 2);
        assert!(read_form_json(Path::new("/definitely/not/here.json")).is_err());
    }

    #[test]
    fn batch_rows_follow_header() {
        let data = "\
gender,hypertension,heartDisease,everMarried,smokingStatus,residenceType,workType,age,bmi,glucose
1,0,0,1,2,1,0,45,22.5,90
0,1,1,1,0,0,3,,30.1,210
1,0,0
";
        let rows = read_batch(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 10);
        assert_eq!(rows[0].get_field(FormField::Glucose), Some("90"));
        assert_eq!(rows[1].get_field(FormField::Age), Some(""));
        assert_eq!(rows[2].len(), 3);
    }

    #[test]
    fn long_batch_rows_keep_extra_values() {
        let data = "\
gender,hypertension,heartDisease,everMarried,smokingStatus,residenceType,workType,age,bmi,glucose
1,0,0,1,2,1,0,45,22.5,90,999
";
        let rows = read_batch(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 11);
        assert_eq!(rows[0].get("column_11"), Some("999"));

        let err = crate::features::normalize(&rows[0]).unwrap_err();
        assert_eq!(err.kind(), crate::error::NormalizationErrorKind::WrongCount);
    }

    #[test]
    fn json_input_keeps_field_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"glucose": "90", "age": "67", "bmi": 30}}"#).unwrap();
        let raw = read_form_json(file.path()).unwrap();
        let names: Vec<&str> = raw.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["glucose", "age", "bmi"]);
    }
}
