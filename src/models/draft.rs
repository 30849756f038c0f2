use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::models::validate::non_blank;
use crate::models::{
    category_ref, ApiEntity, DataType, FieldDescriptor, FieldList, HttpMethod, KeyValue,
};

/// Unpersisted API entry produced by an import, pending confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiDraft {
    pub name: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub query_params: Vec<KeyValue>,
    /// Raw request body text, not parsed at import time
    pub request_body: Option<String>,
    pub response_example: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    /// Category name, resolved (or created) on commit
    pub category: Option<String>,
    pub example_integration: Option<String>,
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub form_data: Vec<KeyValue>,
    pub graphql_query: Option<String>,
    pub graphql_variables: Option<String>,
    /// Unstructured page text (PDF imports)
    pub raw_text: Option<String>,
}

impl ApiDraft {
    /// Draft carrying only raw text for manual transcription
    pub fn from_raw_text(text: impl Into<String>) -> Self {
        Self {
            raw_text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Convert to an entity. The `category` name is not resolved here;
    /// `categoryId` is kept as a reference.
    pub fn into_entity(self) -> AppResult<ApiEntity> {
        let method = match non_blank(self.method) {
            Some(raw) => raw.parse::<HttpMethod>()?,
            None => HttpMethod::Get,
        };

        let category_id = non_blank(self.category_id).map(|raw| category_ref(&raw));

        let mut entity = ApiEntity::new(
            non_blank(self.name).unwrap_or_default(),
            non_blank(self.endpoint).unwrap_or_default(),
            method,
        );
        entity.headers = pairs_to_fields(self.headers);
        entity.query_params = pairs_to_fields(self.query_params);
        entity.example_request_body = non_blank(self.request_body);
        entity.example_response_body = non_blank(self.response_example);
        entity.description = non_blank(self.description);
        entity.example_integration = non_blank(self.example_integration);
        entity.category_id = category_id;
        entity.data_type = self.data_type.unwrap_or_default();
        entity.form_data = FieldList::from(self.form_data);
        entity.graphql_query = non_blank(self.graphql_query);
        entity.graphql_variables = non_blank(self.graphql_variables);
        Ok(entity)
    }
}

fn pairs_to_fields(pairs: Vec<KeyValue>) -> Option<FieldList<FieldDescriptor>> {
    if pairs.is_empty() {
        return None;
    }
    Some(
        pairs
            .into_iter()
            .fold(FieldList::new(), |list, pair| {
                list.push(FieldDescriptor::from_pair(pair.key, pair.value))
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_into_entity_maps_pairs() {
        let draft = ApiDraft {
            name: Some("Ping".to_string()),
            endpoint: Some("https://x/y".to_string()),
            headers: vec![KeyValue::new("Authorization", "Bearer t")],
            request_body: Some("  ".to_string()),
            ..Default::default()
        };
        let entity = draft.into_entity().unwrap();

        assert_eq!(entity.method, HttpMethod::Get);
        let headers = entity.headers.unwrap();
        assert_eq!(headers.as_slice()[0].name, "Authorization");
        assert_eq!(headers.as_slice()[0].example.as_deref(), Some("Bearer t"));
        assert_eq!(entity.query_params, None);
        assert_eq!(entity.example_request_body, None);
    }

    #[test]
    fn test_category_id_kept() {
        let explicit = Uuid::new_v4();
        let draft = ApiDraft {
            category_id: Some(explicit.to_string()),
            ..Default::default()
        };
        assert_eq!(draft.into_entity().unwrap().category_id, Some(explicit));

        let draft = ApiDraft {
            category_id: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        assert_eq!(
            draft.into_entity().unwrap().category_id,
            Some(category_ref("not-a-uuid"))
        );
    }

    #[test]
    fn test_bad_method_rejected() {
        let draft = ApiDraft {
            method: Some("TRACEY".to_string()),
            ..Default::default()
        };
        assert!(draft.into_entity().is_err());
    }
}
