use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::schema::validate_status_codes;
use crate::models::validate::{parse_json, validate_json, validate_required};
use crate::models::{FieldDescriptor, FieldList, LegacyApi, SchemaTemplate, StatusDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Methods whose request body is expected to be empty
    pub fn expects_empty_body(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(AppError::invalid_field(
                "method",
                format!("unsupported HTTP method '{other}'"),
            )),
        }
    }
}

/// Which request-body representation is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    #[default]
    Raw,
    FormData,
    #[serde(rename = "x-www-form-urlencoded")]
    UrlEncoded,
    Binary,
    Graphql,
    None,
}

impl DataType {
    pub fn is_form(&self) -> bool {
        matches!(self, DataType::FormData | DataType::UrlEncoded)
    }
}

impl FromStr for DataType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(DataType::Raw),
            "form-data" | "formdata" => Ok(DataType::FormData),
            "x-www-form-urlencoded" | "urlencoded" => Ok(DataType::UrlEncoded),
            "binary" | "file" => Ok(DataType::Binary),
            "graphql" => Ok(DataType::Graphql),
            "none" | "" => Ok(DataType::None),
            other => Err(AppError::invalid_field(
                "dataType",
                format!("unsupported data type '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeyValue {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A catalogued API definition (current shape).
///
/// Fields of a request-body variant that is not the active `data_type` are
/// kept as they are: they are still validated and stored, but ignored by
/// [`ApiEntity::effective_request_body`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiEntity {
    pub name: String,
    pub endpoint: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    #[schema(value_type = Option<Vec<FieldDescriptor>>)]
    pub headers: Option<FieldList<FieldDescriptor>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<FieldDescriptor>>)]
    pub query_params: Option<FieldList<FieldDescriptor>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<FieldDescriptor>>)]
    pub request_body: Option<FieldList<FieldDescriptor>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<FieldDescriptor>>)]
    pub response_body: Option<FieldList<FieldDescriptor>>,
    #[serde(default)]
    pub status_codes: Option<Vec<StatusDescriptor>>,
    #[serde(default)]
    pub example_request_body: Option<String>,
    #[serde(default)]
    pub example_response_body: Option<String>,
    #[serde(default)]
    pub example_integration: Option<String>,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    #[schema(value_type = Vec<KeyValue>)]
    pub form_data: FieldList<KeyValue>,
    #[serde(default)]
    pub graphql_query: Option<String>,
    #[serde(default)]
    pub graphql_variables: Option<String>,
}

impl ApiEntity {
    /// Minimal entity with every optional part empty
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            method,
            description: None,
            category_id: None,
            requires_auth: false,
            headers: None,
            query_params: None,
            request_body: None,
            response_body: None,
            status_codes: None,
            example_request_body: None,
            example_response_body: None,
            example_integration: None,
            data_type: DataType::Raw,
            form_data: FieldList::new(),
            graphql_query: None,
            graphql_variables: None,
        }
    }

    /// The write gate: required fields and every JSON text field
    pub fn validate(&self) -> AppResult<()> {
        validate_required("name", &self.name)?;
        validate_required("endpoint", &self.endpoint)?;
        validate_json("exampleRequestBody", self.example_request_body.as_deref())?;
        validate_json("exampleResponseBody", self.example_response_body.as_deref())?;
        validate_json("graphqlVariables", self.graphql_variables.as_deref())?;
        if let Some(codes) = &self.status_codes {
            validate_status_codes("statusCodes", codes)?;
        }

        if self.method.expects_empty_body() && self.effective_request_body().is_some() {
            tracing::debug!(
                name = %self.name,
                method = %self.method,
                "Request body present on a method that normally has none"
            );
        }

        Ok(())
    }

    /// Request body implied by the active `data_type`
    pub fn effective_request_body(&self) -> Option<Value> {
        match self.data_type {
            DataType::Raw => parse_json(self.example_request_body.as_deref()),
            DataType::FormData | DataType::UrlEncoded => {
                Some(Value::Object(self.form_data_object()))
            }
            DataType::Graphql => Some(json!({
                "query": self.graphql_query.clone().unwrap_or_default(),
                "variables": parse_json(self.graphql_variables.as_deref())
                    .unwrap_or_else(|| json!({})),
            })),
            DataType::Binary | DataType::None => None,
        }
    }

    /// Form rows as an object; on duplicate keys the last row wins
    pub fn form_data_object(&self) -> Map<String, Value> {
        let mut object = Map::new();
        for row in self.form_data.iter().filter(|row| !row.key.is_empty()) {
            object.insert(row.key.clone(), Value::String(row.value.clone()));
        }
        object
    }

    /// Snapshot the template's shape onto this entity. No link is kept.
    pub fn apply_template(mut self, template: &SchemaTemplate) -> Self {
        let definition = &template.definition;
        self.headers = Some(definition.headers.clone());
        self.query_params = Some(definition.query_params.clone());
        self.request_body = Some(definition.request_body.clone());
        self.response_body = Some(definition.response_body.clone());
        self.status_codes = Some(definition.response_codes.clone());
        if let Some(example) = &definition.example_request_body {
            self.example_request_body = Some(example.clone());
        }
        if let Some(example) = &definition.example_response_body {
            self.example_response_body = Some(example.clone());
        }
        self
    }
}

/// A persisted API entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRecord {
    pub id: Uuid,
    pub entity: ApiEntity,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// List filter; both parts are AND-composed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiFilter {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
}

impl ApiFilter {
    pub fn new(category_id: Option<Uuid>, search: Option<String>) -> Self {
        Self {
            category_id,
            search: search
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, entity: &ApiEntity) -> bool {
        let category_ok = self
            .category_id
            .is_none_or(|id| entity.category_id == Some(id));
        let search_ok = self
            .search
            .as_deref()
            .is_none_or(|term| entity.name.to_lowercase().contains(term));
        category_ok && search_ok
    }
}

/// Stored form of an API entity, tagged with its schema version.
/// Reads accept every version; writes always produce the latest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schemaVersion", rename_all = "lowercase")]
pub enum ApiDocument {
    V1(LegacyApi),
    V2(ApiEntity),
}

impl ApiDocument {
    pub const CURRENT_VERSION: i16 = 2;

    pub fn current(entity: ApiEntity) -> Self {
        ApiDocument::V2(entity)
    }

    pub fn version(&self) -> i16 {
        match self {
            ApiDocument::V1(_) => 1,
            ApiDocument::V2(_) => 2,
        }
    }

    /// Upgrade to the current shape
    pub fn into_current(self) -> AppResult<ApiEntity> {
        match self {
            ApiDocument::V1(legacy) => legacy.upgrade(),
            ApiDocument::V2(entity) => Ok(entity),
        }
    }
}
