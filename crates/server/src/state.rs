use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use ironplan_domain as domain;
use ironplan_storage::Sqlite;
use uuid::Uuid;

use crate::AppError;

/// Header carrying the id of the requesting user.
pub const USER_HEADER: &str = "x-user-id";

pub type Service = domain::Service<Sqlite>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
}

impl AppState {
    #[must_use]
    pub fn new(db: Sqlite) -> Self {
        Self {
            service: Arc::new(domain::Service::new(db)),
        }
    }
}

pub struct CurrentUser(pub domain::UserID);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_HEADER) else {
            return Err(AppError::new(StatusCode::UNAUTHORIZED, "Missing user"));
        };
        value
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(|id| CurrentUser(id.into()))
            .ok_or_else(|| AppError::new(StatusCode::UNAUTHORIZED, "Invalid user"))
    }
}
