//! Unified service-layer error type for catalog-server
//!
//! `ServiceError` bridges infrastructure errors (`sqlx::Error`, search index
//! failures) and the API-layer error (`AppError`), so services can use `?`
//! everywhere and handlers only see `AppError`.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::filter::FilterError;
use crate::search::SearchError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error.
///
/// - `Db`: Database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: Business-rule errors and search index failures (passed through
///   to the client; search failures carry `SearchIndexError`)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<SearchError> for ServiceError {
    fn from(e: SearchError) -> Self {
        tracing::error!(error = %e, "Search index request failed");
        ServiceError::App(AppError::new(ErrorCode::SearchIndexError))
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<FilterError> for ServiceError {
    fn from(e: FilterError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service infrastructure error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
