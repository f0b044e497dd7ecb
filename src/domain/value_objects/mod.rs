//! Value objects: small immutable types shared by entities and services.

mod file_kind;
mod pagination;

pub use file_kind::FileKind;
pub use pagination::{total_pages, Page, PageRequest};

/// Result of a like/follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

impl Toggle {
    pub fn is_added(&self) -> bool {
        matches!(self, Toggle::Added)
    }
}
