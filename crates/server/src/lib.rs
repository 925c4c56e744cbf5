#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod extract;
pub mod logging;
pub mod model;
pub mod routes;

mod error;
mod state;

pub use error::AppError;
pub use state::{AppState, CurrentUser, USER_HEADER};
