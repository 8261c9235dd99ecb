//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

use serde::{Deserialize, Deserializer};

pub mod caption;
pub mod category;
pub mod kb_node;
pub mod project;
pub mod region;
pub mod review;
pub mod segment;
pub mod subpart;
pub mod tag;
pub mod video;

/// Deserialize a doubly-optional field: an absent field stays `None`, an
/// explicit JSON `null` becomes `Some(None)` (clear the column), and a
/// value becomes `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
