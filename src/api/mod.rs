//! Per-resource stores of the admin API.
//!
//! Each module declares its resources (endpoint path, filters, mutation
//! policy) and the entity-specific actions that go beyond plain CRUD.

mod catalog;
mod checkpoints;
mod content;
mod counters;
mod inbox;
mod places;
mod registration;
mod users;

pub use catalog::*;
pub use checkpoints::*;
pub use content::*;
pub use counters::*;
pub use inbox::*;
pub use places::*;
pub use registration::*;
pub use users::*;
