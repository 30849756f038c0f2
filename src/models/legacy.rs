use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::validate::{non_blank, validate_json};
use crate::models::{
    category_ref, ApiEntity, DataType, FieldDescriptor, FieldList, FieldType, HttpMethod,
};

/// First-generation API entry: headers and bodies as JSON text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyApi {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "json_text")]
    pub headers: Option<String>,
    #[serde(default, deserialize_with = "json_text")]
    pub request_body: Option<String>,
    #[serde(default, deserialize_with = "json_text")]
    pub response_example: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub example_integration: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
}

/// A legacy entry together with its original id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyApiRecord {
    pub id: String,
    pub api: LegacyApi,
}

/// Accept either JSON text or an inline JSON value, store as text
fn json_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Namespace for ids of migrated legacy entries
const LEGACY_NAMESPACE: Uuid = Uuid::from_u128(0x6b1f_3c2e_8d4a_4f57_9e61_2a7c_5d90_b3e4);

/// Deterministic id of the current-shape copy of a legacy entry
pub fn migrated_id(legacy_id: &str) -> Uuid {
    Uuid::new_v5(&LEGACY_NAMESPACE, legacy_id.as_bytes())
}

impl LegacyApi {
    /// JSON text fields must parse before a legacy record is stored
    pub fn validate(&self) -> AppResult<()> {
        validate_json("headers", self.headers.as_deref())?;
        validate_json("requestBody", self.request_body.as_deref())?;
        validate_json("responseExample", self.response_example.as_deref())?;
        Ok(())
    }

    /// Carry every legacy field over and default the rest
    pub fn upgrade(self) -> AppResult<ApiEntity> {
        let method = match non_blank(self.method) {
            Some(raw) => raw.parse::<HttpMethod>()?,
            None => HttpMethod::Get,
        };

        let category_id = non_blank(self.category_id).map(|raw| category_ref(&raw));

        let mut entity = ApiEntity::new(
            self.name.unwrap_or_default(),
            self.endpoint.unwrap_or_default(),
            method,
        );
        entity.headers = header_fields(self.headers.as_deref())?;
        entity.example_request_body = non_blank(self.request_body);
        entity.example_response_body = non_blank(self.response_example);
        entity.description = self.description;
        entity.example_integration = self.example_integration;
        entity.category_id = category_id;
        entity.data_type = DataType::Raw;
        Ok(entity)
    }
}

/// Legacy header map (`{"Name": value}`) to field descriptors
fn header_fields(text: Option<&str>) -> AppResult<Option<FieldList<FieldDescriptor>>> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };

    let value: Value = serde_json::from_str(text)
        .map_err(|e| AppError::invalid_field("headers", format!("must be valid JSON ({e})")))?;

    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(
            map.into_iter()
                .map(|(name, value)| FieldDescriptor {
                    kind: FieldType::infer(&value),
                    example: Some(match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    }),
                    name,
                    description: String::new(),
                })
                .collect(),
        )),
        _ => Err(AppError::invalid_field("headers", "must be a JSON object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upgrade_defaults() {
        let legacy: LegacyApi =
            serde_json::from_value(json!({"name": "A", "endpoint": "/a", "method": "GET"}))
                .unwrap();
        let entity = legacy.upgrade().unwrap();

        assert_eq!(entity.name, "A");
        assert_eq!(entity.endpoint, "/a");
        assert_eq!(entity.method, HttpMethod::Get);
        assert_eq!(entity.headers, None);
        assert_eq!(entity.data_type, DataType::Raw);
        assert!(entity.form_data.is_empty());
        assert_eq!(entity.graphql_query, None);
        assert_eq!(entity.graphql_variables, None);
        assert!(!entity.requires_auth);
    }

    #[test]
    fn test_inline_json_accepted_as_text() {
        let legacy: LegacyApi = serde_json::from_value(json!({
            "name": "B",
            "endpoint": "/b",
            "headers": {"Authorization": "Bearer t", "X-Retries": 3},
            "requestBody": {"a": 1},
            "responseExample": "{\"ok\": true}"
        }))
        .unwrap();
        assert_eq!(legacy.request_body.as_deref(), Some(r#"{"a":1}"#));

        let entity = legacy.upgrade().unwrap();
        let headers = entity.headers.unwrap();
        let auth = headers.iter().find(|h| h.name == "Authorization").unwrap();
        assert_eq!(auth.example.as_deref(), Some("Bearer t"));
        let retries = headers.iter().find(|h| h.name == "X-Retries").unwrap();
        assert_eq!(retries.kind, FieldType::Number);
        assert_eq!(entity.example_request_body.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(entity.example_response_body.as_deref(), Some("{\"ok\": true}"));
    }

    #[test]
    fn test_bad_headers_rejected() {
        let legacy = LegacyApi {
            headers: Some("[1, 2]".to_string()),
            ..Default::default()
        };
        let err = legacy.upgrade().unwrap_err();
        assert!(err.to_string().contains("headers"));
    }

    #[test]
    fn test_validate_json_text() {
        let legacy = LegacyApi {
            response_example: Some("{oops".to_string()),
            ..Default::default()
        };
        let err = legacy.validate().unwrap_err();
        assert!(err.to_string().contains("responseExample"));
        assert!(LegacyApi::default().validate().is_ok());
    }

    #[test]
    fn test_document_category_id_kept() {
        let legacy = LegacyApi {
            name: Some("A".to_string()),
            endpoint: Some("/a".to_string()),
            category_id: Some("firestore-doc-id".to_string()),
            ..Default::default()
        };
        let upgraded = legacy.clone().upgrade().unwrap();
        assert_eq!(upgraded.category_id, Some(category_ref("firestore-doc-id")));
        assert_eq!(legacy.upgrade().unwrap().category_id, upgraded.category_id);
    }

    #[test]
    fn test_migrated_id_is_deterministic() {
        assert_eq!(migrated_id("abc"), migrated_id("abc"));
        assert_ne!(migrated_id("abc"), migrated_id("abd"));
    }
}
