//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::GoodNotFound | Self::UserNotFound => StatusCode::NOT_FOUND,

            Self::ValidationFailed | Self::InvalidFilter | Self::InvalidFilterValue => {
                StatusCode::BAD_REQUEST
            }

            Self::InternalError | Self::SearchIndexError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
