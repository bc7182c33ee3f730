// src/normalizer.rs
use serde::Deserialize;
use serde_json::Value;

use crate::data_types::Record;
use crate::error::AppError;

/// Expected service payload. Anything that does not deserialize into this
/// shape (malformed JSON, absent key, non-sequence value) is a single
/// normalization failure, never a panic.
#[derive(Debug, Deserialize)]
struct AnonymizeResponse {
    pseudonymized_data: Vec<Value>,
}

/// Reshape a raw response body into ordered records. Each element gets a
/// synthetic 1-based `id` from its position in the sequence; the output
/// length always equals the input length.
pub fn normalize(body: &str) -> Result<Vec<Record>, AppError> {
    let response: AnonymizeResponse = serde_json::from_str(body).map_err(|err| {
        tracing::error!(%err, "failed to parse service response");
        AppError::ResponseFormat
    })?;

    Ok(response
        .pseudonymized_data
        .into_iter()
        .enumerate()
        .map(|(i, row)| from_row(i as u64 + 1, row))
        .collect())
}

/// Build one record. Object elements contribute their fields in insertion
/// order; a server-supplied `id` field is dropped so the synthetic sequence
/// id can never collide with it. Non-object elements degrade to a record
/// carrying only the synthetic id.
fn from_row(id: u64, row: Value) -> Record {
    let fields = match row {
        Value::Object(mut map) => {
            map.remove("id");
            map
        }
        other => {
            tracing::warn!(row = %other, "non-object row in pseudonymized_data");
            serde_json::Map::new()
        }
    };
    Record { id, fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assigns_sequential_ids_in_response_order() {
        let body = r#"{"pseudonymized_data":[{"name":"X"},{"name":"Y"},{"name":"Z"}]}"#;
        let records = normalize(body).unwrap();

        assert_eq!(records.len(), 3);
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(records[0].fields["name"], json!("X"));
        assert_eq!(records[2].fields["name"], json!("Z"));
    }

    #[test]
    fn preserves_field_order_from_the_response() {
        let body = r#"{"pseudonymized_data":[{"zeta":1,"alpha":2,"mid":3}]}"#;
        let records = normalize(body).unwrap();
        assert_eq!(records[0].headers(), vec!["id", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn unparsable_body_is_a_format_error_not_a_crash() {
        assert_eq!(normalize("not json"), Err(AppError::ResponseFormat));
    }

    #[test]
    fn missing_key_is_a_format_error() {
        assert_eq!(normalize(r#"{"data":[]}"#), Err(AppError::ResponseFormat));
    }

    #[test]
    fn non_sequence_payload_is_a_format_error() {
        assert_eq!(
            normalize(r#"{"pseudonymized_data":"oops"}"#),
            Err(AppError::ResponseFormat)
        );
    }

    #[test]
    fn empty_sequence_yields_empty_records() {
        assert_eq!(normalize(r#"{"pseudonymized_data":[]}"#), Ok(Vec::new()));
    }

    #[test]
    fn server_id_field_loses_to_the_synthetic_id() {
        let body = r#"{"pseudonymized_data":[{"id":99,"name":"X"},{"id":42,"name":"Y"}]}"#;
        let records = normalize(body).unwrap();

        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.id, i as u64 + 1);
            assert_eq!(rec.headers().iter().filter(|h| *h == "id").count(), 1);
        }
    }

    #[test]
    fn non_object_rows_degrade_to_id_only() {
        let body = r#"{"pseudonymized_data":[{"name":"X"},"stray",null]}"#;
        let records = normalize(body).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records[1].fields.is_empty());
        assert!(records[2].fields.is_empty());
        assert_eq!(records[2].id, 3);
    }

    #[test]
    fn null_values_survive_normalization() {
        // The service maps unparsable cells to null; they must stay columns.
        let body = r#"{"pseudonymized_data":[{"phone":null,"name":"X"}]}"#;
        let records = normalize(body).unwrap();
        assert_eq!(records[0].csv_value("phone"), "null");
    }
}
