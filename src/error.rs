use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Every failure the core can surface. Nothing here is retried or recovered;
/// callers decide what to do with a partially applied sequence.
#[derive(Debug, Display)]
pub enum AppError {
    /// No current user when the operation needs one
    #[display(fmt = "User not authenticated")]
    NotAuthenticated,

    #[display(fmt = "{}", _0)]
    InvalidState(String),

    #[display(fmt = "{} not found", _0)]
    NotFound(String),

    /// Duplicate key on `add`, or a unique index clash
    #[display(fmt = "Constraint violation: {}", _0)]
    ConstraintViolation(String),

    #[display(fmt = "Storage error: {}", _0)]
    Storage(sqlx::Error),

    #[display(fmt = "Serialization error: {}", _0)]
    Serialization(serde_json::Error),
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Storage(e) => Some(e),
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // 1555 = SQLITE_CONSTRAINT_PRIMARYKEY, 2067 = SQLITE_CONSTRAINT_UNIQUE
            if db_err.is_unique_violation()
                || matches!(db_err.code().as_deref(), Some("1555") | Some("2067"))
            {
                return AppError::ConstraintViolation(db_err.message().to_string());
            }
        }
        AppError::Storage(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // never leak driver details to clients
            AppError::Storage(_) | AppError::Serialization(_) => {
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_distinct_statuses() {
        assert_eq!(
            AppError::NotAuthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidState("User is not checked in".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("Leave l1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ConstraintViolation("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn display_reads_like_a_message() {
        assert_eq!(
            AppError::NotFound("Leave l42".into()).to_string(),
            "Leave l42 not found"
        );
        assert_eq!(
            AppError::NotAuthenticated.to_string(),
            "User not authenticated"
        );
    }
}
