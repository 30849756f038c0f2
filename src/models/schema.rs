use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::validate::{non_blank, validate_json, validate_required};
use crate::models::FieldList;

/// Type tag of a described field. Unknown tags are kept as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Other(String),
}

impl FieldType {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, FieldType::Other(_))
    }

    /// Infer the tag from a sample JSON value
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Number(_) => FieldType::Number,
            Value::Bool(_) => FieldType::Boolean,
            Value::Array(_) => FieldType::Array,
            Value::Object(_) => FieldType::Other("object".to_string()),
            Value::String(_) | Value::Null => FieldType::String,
        }
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "array" => FieldType::Array,
            _ => FieldType::Other(raw),
        }
    }
}

impl From<FieldType> for String {
    fn from(kind: FieldType) -> Self {
        match kind {
            FieldType::String => "string".to_string(),
            FieldType::Number => "number".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Array => "array".to_string(),
            FieldType::Other(raw) => raw,
        }
    }
}

/// One header / query param / body field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "string")]
    pub kind: FieldType,
    #[serde(default)]
    pub description: String,
    /// Sample value, filled when converting key/value pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            example: None,
        }
    }

    /// A string field carrying `value` as its example
    pub fn from_pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: key.into(),
            kind: FieldType::String,
            description: String::new(),
            example: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusDescriptor {
    pub code: u16,
    #[serde(default)]
    pub description: String,
}

pub(crate) fn validate_status_codes(field: &str, codes: &[StatusDescriptor]) -> AppResult<()> {
    for status in codes {
        if !(100..=599).contains(&status.code) {
            return Err(AppError::invalid_field(
                field,
                format!("{} is not an HTTP status code", status.code),
            ));
        }
    }
    Ok(())
}

/// Writable part of a schema template
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = Vec<FieldDescriptor>)]
    pub headers: FieldList<FieldDescriptor>,
    #[serde(default)]
    #[schema(value_type = Vec<FieldDescriptor>)]
    pub query_params: FieldList<FieldDescriptor>,
    #[serde(default)]
    #[schema(value_type = Vec<FieldDescriptor>)]
    pub request_body: FieldList<FieldDescriptor>,
    #[serde(default)]
    #[schema(value_type = Vec<FieldDescriptor>)]
    pub response_body: FieldList<FieldDescriptor>,
    #[serde(default)]
    pub response_codes: Vec<StatusDescriptor>,
    #[serde(default)]
    pub example_request_body: Option<String>,
    #[serde(default)]
    pub example_response_body: Option<String>,
}

impl SchemaDefinition {
    /// Validate and normalize before persisting
    pub fn normalized(self) -> AppResult<Self> {
        validate_required("name", &self.name)?;
        validate_status_codes("responseCodes", &self.response_codes)?;
        validate_json("exampleRequestBody", self.example_request_body.as_deref())?;
        validate_json("exampleResponseBody", self.example_response_body.as_deref())?;

        for (section, fields) in [
            ("headers", &self.headers),
            ("queryParams", &self.query_params),
            ("requestBody", &self.request_body),
            ("responseBody", &self.response_body),
        ] {
            for field in fields {
                if !field.kind.is_recognized() {
                    tracing::warn!(
                        schema = %self.name,
                        section,
                        field = %field.name,
                        kind = ?field.kind,
                        "Unrecognized field type accepted as free text"
                    );
                }
            }
        }

        Ok(Self {
            name: self.name.trim().to_string(),
            example_request_body: non_blank(self.example_request_body),
            example_response_body: non_blank(self.example_response_body),
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTemplate {
    pub id: Uuid,
    pub definition: SchemaDefinition,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
