use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum FileServerError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl FileServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FileServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            FileServerError::NotFound(_) => StatusCode::NOT_FOUND,
            FileServerError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            FileServerError::Io(_) | FileServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for FileServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match &self {
            FileServerError::Io(_) | FileServerError::Internal(_) => {
                error!(status = status.as_u16(), message = %message, "Request failed");
            }
            FileServerError::Forbidden(_) => {
                warn!(status = status.as_u16(), message = %message, "Request rejected");
            }
            _ => {
                debug!(status = status.as_u16(), message = %message, "Client error");
            }
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", message),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FileServerError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            FileServerError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FileServerError::InvalidPath("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FileServerError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            FileServerError::from(io).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_is_plain_text() {
        let response = FileServerError::NotFound("docs/missing.txt".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
