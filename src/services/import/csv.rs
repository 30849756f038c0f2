use std::collections::HashMap;

use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::validate::non_blank;
use crate::models::{ApiDraft, KeyValue};

/// One draft per data row. Columns are matched to draft fields by exact
/// name and unknown columns are ignored.
pub fn parse(file: &str, bytes: &[u8]) -> AppResult<Vec<ApiDraft>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: HashMap<String, usize> = reader
        .headers()
        .map_err(|e| AppError::import(file, e))?
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect();

    let mut drafts = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| AppError::import(file, e))?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let cell = |column: &str| {
            columns
                .get(column)
                .and_then(|&index| record.get(index))
                .map(str::to_string)
                .and_then(|value| non_blank(Some(value)))
        };

        let headers = match cell("headers") {
            Some(text) => header_pairs(&text)
                .map_err(|message| AppError::import(file, format!("row {}: {}", row + 1, message)))?,
            None => Vec::new(),
        };

        drafts.push(ApiDraft {
            name: cell("name"),
            endpoint: cell("endpoint"),
            method: cell("method"),
            headers,
            request_body: cell("requestBody"),
            response_example: cell("responseExample"),
            description: cell("description"),
            category_id: cell("categoryId"),
            category: cell("category"),
            example_integration: cell("exampleIntegration"),
            ..Default::default()
        });
    }

    Ok(drafts)
}

/// `{"Name": "value"}` to key/value pairs
fn header_pairs(text: &str) -> Result<Vec<KeyValue>, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("headers must be valid JSON ({e})"))?;

    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => KeyValue::new(key, text),
                other => KeyValue::new(key, other.to_string()),
            })
            .collect()),
        _ => Err("headers must be a JSON object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_map_to_fields() {
        let csv = "name,endpoint,method,headers,requestBody,category,extra\n\
                   List users,/users,get,\"{\"\"Accept\"\": \"\"application/json\"\"}\",,Users,x\n\
                   Create user,/users,POST,,\"{\"\"name\"\": \"\"a\"\"}\",Users,\n";
        let drafts = parse("apis.csv", csv.as_bytes()).unwrap();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].name.as_deref(), Some("List users"));
        assert_eq!(drafts[0].method.as_deref(), Some("get"));
        assert_eq!(drafts[0].headers, vec![KeyValue::new("Accept", "application/json")]);
        assert_eq!(drafts[0].request_body, None);
        assert_eq!(drafts[0].category.as_deref(), Some("Users"));
        assert_eq!(drafts[1].request_body.as_deref(), Some(r#"{"name": "a"}"#));
        assert!(drafts[1].headers.is_empty());
    }

    #[test]
    fn test_blank_rows_skipped() {
        let csv = "name,endpoint\nA,/a\n,\nB,/b\n";
        let drafts = parse("apis.csv", csv.as_bytes()).unwrap();
        assert_eq!(drafts.len(), 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let csv = "name,endpoint\nA,/a,extra\n";
        let err = parse("apis.csv", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::ImportParse { ref file, .. } if file == "apis.csv"));
    }

    #[test]
    fn test_bad_headers_cell_names_row() {
        let csv = "name,headers\nA,[1]\n";
        let err = parse("apis.csv", csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
