#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

macro_rules! id {
    ($name: ident) => {
        #[derive(
            derive_more::Deref,
            derive_more::Display,
            Debug,
            Default,
            Clone,
            Copy,
            Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
        )]
        pub struct $name(uuid::Uuid);

        impl $name {
            #[must_use]
            pub fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(uuid::Uuid::from_bytes(value.to_be_bytes()))
            }
        }
    };
}

mod body_metric;
mod body_pattern;
mod calendar;
mod equipment;
mod error;
mod exercise;
mod gym;
mod name;
mod program;
mod report;
mod service;
mod user;
mod workout;

pub use body_metric::*;
pub use body_pattern::*;
pub use calendar::*;
pub use equipment::*;
pub use error::*;
pub use exercise::*;
pub use gym::*;
pub use name::*;
pub use program::*;
pub use report::*;
pub use service::*;
pub use user::*;
pub use workout::*;
