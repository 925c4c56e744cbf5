use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ironplan_domain as domain;
use serde::Serialize;

pub struct AppError {
    pub code: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new<S: Into<String>>(code: StatusCode, message: S) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    fn internal(err: &impl fmt::Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppError {}: {}", self.code, self.message)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.code.is_server_error() {
            tracing::error!(status = %self.code, "request failed: {}", self.message);
        }
        (
            self.code,
            Json(ErrorBody {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<domain::ReadError> for AppError {
    fn from(err: domain::ReadError) -> Self {
        match err {
            domain::ReadError::NotFound => AppError::not_found("Not found"),
            domain::ReadError::Storage(_) | domain::ReadError::Other(_) => {
                AppError::internal(&err)
            }
        }
    }
}

impl From<domain::CreateError> for AppError {
    fn from(err: domain::CreateError) -> Self {
        match err {
            domain::CreateError::Conflict => AppError::conflict("Already exists"),
            domain::CreateError::NotFound => AppError::not_found("Not found"),
            domain::CreateError::Storage(_) | domain::CreateError::Other(_) => {
                AppError::internal(&err)
            }
        }
    }
}

impl From<domain::UpdateError> for AppError {
    fn from(err: domain::UpdateError) -> Self {
        match err {
            domain::UpdateError::Conflict => AppError::conflict("Conflict"),
            domain::UpdateError::NotFound => AppError::not_found("Not found"),
            domain::UpdateError::Storage(_) | domain::UpdateError::Other(_) => {
                AppError::internal(&err)
            }
        }
    }
}

impl From<domain::DeleteError> for AppError {
    fn from(err: domain::DeleteError) -> Self {
        match err {
            domain::DeleteError::NotFound => AppError::not_found("Not found"),
            domain::DeleteError::Storage(_) | domain::DeleteError::Other(_) => {
                AppError::internal(&err)
            }
        }
    }
}

impl From<domain::ValidationError> for AppError {
    fn from(err: domain::ValidationError) -> Self {
        match err {
            domain::ValidationError::Conflict(_) => AppError::conflict(err.to_string()),
            domain::ValidationError::Other(_) => AppError::bad_request(err.to_string()),
        }
    }
}

impl From<domain::NameError> for AppError {
    fn from(err: domain::NameError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<domain::RescheduleError> for AppError {
    fn from(err: domain::RescheduleError) -> Self {
        let code = match err {
            domain::RescheduleError::NotFound | domain::RescheduleError::ConflictNotFound => {
                StatusCode::NOT_FOUND
            }
            domain::RescheduleError::MissingData => StatusCode::BAD_REQUEST,
            domain::RescheduleError::Concurrent => StatusCode::CONFLICT,
            domain::RescheduleError::NoAvailableDate
            | domain::RescheduleError::Storage(_)
            | domain::RescheduleError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<domain::ScheduleError> for AppError {
    fn from(err: domain::ScheduleError) -> Self {
        let code = match err {
            domain::ScheduleError::MissingData
            | domain::ScheduleError::InvalidDay
            | domain::ScheduleError::DuplicateDay => StatusCode::BAD_REQUEST,
            domain::ScheduleError::ProgramNotFound
            | domain::ScheduleError::InstanceNotFound
            | domain::ScheduleError::GymNotFound => StatusCode::NOT_FOUND,
            domain::ScheduleError::AlreadyScheduled => StatusCode::CONFLICT,
            domain::ScheduleError::Storage(_) | domain::ScheduleError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError::new(code, err.to_string())
    }
}

impl From<domain::WorkoutError> for AppError {
    fn from(err: domain::WorkoutError) -> Self {
        let code = match err {
            domain::WorkoutError::NotFound => StatusCode::NOT_FOUND,
            domain::WorkoutError::InvalidSetNumber | domain::WorkoutError::NoSetsLogged => {
                StatusCode::BAD_REQUEST
            }
            domain::WorkoutError::Completed => StatusCode::CONFLICT,
            domain::WorkoutError::Storage(_) | domain::WorkoutError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError::new(code, err.to_string())
    }
}
