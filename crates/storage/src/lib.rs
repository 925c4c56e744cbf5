#![warn(clippy::pedantic)]

mod sqlite;

pub use sqlite::{DecodeError, Error, Sqlite};
