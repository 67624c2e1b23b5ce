//! Data models for the immigration admin backend.
//!
//! Field names follow the backend's JSON payloads.

mod checkpoint;
mod common;
mod content;
mod inbox;
mod place;
mod registration;
mod user;

pub use checkpoint::*;
pub use common::*;
pub use content::*;
pub use inbox::*;
pub use place::*;
pub use registration::*;
pub use user::*;

macro_rules! impl_identified {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identified for $ty {
                fn id(&self) -> i64 {
                    self.id
                }
            }
        )*
    };
}

impl_identified!(
    User,
    Role,
    Permission,
    Checkpoint,
    CheckpointCategory,
    Province,
    Country,
    Hotel,
    News,
    NewsCategory,
    Banner,
    Popup,
    Law,
    VisaCategory,
    Service,
    LocalizedDetail,
    Feedback,
    Contact,
    ArrivalSummary,
    ArrivalDetail,
    Departure,
);
