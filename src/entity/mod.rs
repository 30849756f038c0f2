pub mod api;
pub mod category;
pub mod legacy_api;
pub mod schema_template;
