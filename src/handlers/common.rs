use axum::extract::{FromRequest, FromRequestParts};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::validate::non_blank;

// Extractors whose rejections are reported as `AppError`, so malformed
// input gets the same `{error}` body and 400 status as a failed validation

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Optional id field sent as text; blank means absent
pub fn parse_optional_id(field: &str, value: Option<String>) -> AppResult<Option<Uuid>> {
    non_blank(value)
        .map(|raw| {
            raw.parse::<Uuid>()
                .map_err(|_| AppError::invalid_field(field, format!("'{raw}' is not a valid id")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_optional_id("categoryId", Some(id.to_string())).unwrap(), Some(id));
        assert_eq!(parse_optional_id("categoryId", Some(" ".into())).unwrap(), None);
        assert_eq!(parse_optional_id("categoryId", None).unwrap(), None);

        let err = parse_optional_id("categoryId", Some("abc".into())).unwrap_err();
        assert!(err.to_string().contains("categoryId"));
    }
}
