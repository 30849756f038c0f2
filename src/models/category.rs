use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::validate::{non_blank, validate_required};

/// Label shown for APIs whose category is missing or dangling
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Namespace for category references that are not UUIDs
const CATEGORY_REF_NAMESPACE: Uuid = Uuid::from_u128(0x2d8e_71a4_c05b_4e13_a6f2_94b1_0c7e_58d3);

/// Category id for a stored reference. UUIDs are kept as they are; other
/// text (legacy document ids) always maps to the same v5 id.
pub fn category_ref(raw: &str) -> Uuid {
    let raw = raw.trim();
    raw.parse()
        .unwrap_or_else(|_| Uuid::new_v5(&CATEGORY_REF_NAMESPACE, raw.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub introduction: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Writable part of a category (create and full update)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub introduction: Option<String>,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>, introduction: Option<String>) -> Self {
        Self {
            name: name.into(),
            introduction,
        }
    }

    /// Validate and normalize (trimmed name, blank introduction dropped)
    pub fn normalized(self) -> AppResult<Self> {
        validate_required("name", &self.name)?;
        Ok(Self {
            name: self.name.trim().to_string(),
            introduction: non_blank(self.introduction),
        })
    }
}
