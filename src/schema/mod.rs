//! # Field Schema
//!
//! Declares output columns ([`field::SpreadsheetField`]), the typed value
//! model ([`value::Value`]) and the schema-driven conversion rules applied
//! to raw cells ([`convert`]).

pub mod convert;
pub mod field;
pub mod value;

pub use convert::CellError;
pub use field::FieldError;
pub use field::FieldType;
pub use field::SpreadsheetField;
pub use field::TrimPolicy;
pub use value::Value;
