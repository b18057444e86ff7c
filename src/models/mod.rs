//! Data models
//!
//! This module contains the data structures shared by the list controllers and
//! the record sources:
//! - `Record` and the `FieldAccess` capability
//! - Page size, sort and visible-page types

mod list;
mod record;

pub use list::{Coercion, PageSize, SortDirection, SortField, SortSpec, VisiblePage};
pub use record::{FieldAccess, FieldValue, Record};
pub(crate) use record::json_kind;
