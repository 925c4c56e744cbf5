//! JSON representations of the domain types.

use serde::Serialize;
use uuid::Uuid;

mod calendar;
mod library;
mod program;
mod report;
mod user;
mod workout;

pub use calendar::*;
pub use library::*;
pub use program::*;
pub use report::*;
pub use user::*;
pub use workout::*;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Deleted {
    pub success: bool,
    pub id: Uuid,
}

impl Deleted {
    pub fn new(id: impl std::ops::Deref<Target = Uuid>) -> Self {
        Self {
            success: true,
            id: *id,
        }
    }
}
