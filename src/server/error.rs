//! Mapping engine errors onto HTTP responses
//!
//! Bodies are plain text: the same message the CLI prints, which for git
//! failures includes the tool's combined output.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::error::NotesError;

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(pub NotesError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            NotesError::ConfigMissing | NotesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            NotesError::NotFound(_) => StatusCode::NOT_FOUND,
            NotesError::Upstream(_)
            | NotesError::Network(_)
            | NotesError::AuthenticationFailed(_)
            | NotesError::AuthenticationExpired => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<NotesError> for ApiError {
    fn from(err: NotesError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(NotesError::ConfigMissing).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(NotesError::NotFound("a.md".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(NotesError::Upstream("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(NotesError::git(&["push"], "rejected")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(NotesError::GitTimeout {
                command: "git push".into(),
                secs: 120
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
