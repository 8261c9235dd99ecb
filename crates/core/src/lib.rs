//! Pure domain logic for the vidnote annotation platform.
//!
//! Everything in this crate is synchronous and storage-free so the review
//! consensus rules and knowledge-base tree arithmetic can be unit-tested
//! without a database.

pub mod annotation;
pub mod error;
pub mod kb;
pub mod review;
pub mod types;
