pub mod api;
pub mod category;
pub mod draft;
pub mod field_list;
pub mod legacy;
pub mod schema;
pub mod validate;

pub use api::*;
pub use category::*;
pub use draft::*;
pub use field_list::FieldList;
pub use legacy::*;
pub use schema::*;
