//! Panel view models.
//!
//! One sub-module per dashboard panel. Each defines the row type its backend
//! feed returns plus the pure presentation helpers (status colours, filters,
//! date formatting) the renderer needs. Nothing in here fetches or draws:
//! payloads arrive already parsed from the update coordinator, and rendering
//! lives in [`crate::ui`], so every helper is testable as plain data.

mod documents;
mod listings;
mod pins;
mod users;

pub use documents::PendingDocument;
pub use listings::{cycle_value, distinct_values, Business, DirectoryPayload, ListingFilter};
pub use pins::{pin_bounds, Bounds, MapPin};
pub use users::{status_color, UserRow};
