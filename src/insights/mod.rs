//! Pure transforms from provider payloads to dashboard records.

pub mod aggregate;
pub mod chains;
pub mod fees;
pub mod format;
pub mod health;
pub mod listing;
pub mod protocols;

pub use listing::{ListQuery, Listable, ListingError, SortOrder};
