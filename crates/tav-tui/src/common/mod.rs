//! Shared rendering helpers.

pub mod scrollbar;
pub mod text;
