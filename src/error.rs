use poem::error::ResponseError;
use poem::http::StatusCode;
use poem::web::Redirect;
use poem::{IntoResponse, Response};
use thiserror::Error;
use validator::ValidationErrors;

use crate::store::StoreError;

pub const SIGN_IN_PATH: &str = "/signin/";

/// Errors that reach the HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A failed write, shown to the user as plain text with a 200.
    #[error("{0}")]
    WriteFailed(&'static str),
    #[error("invalid form input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("login required")]
    LoginRequired,
    #[error("failed to render page")]
    Render(#[from] askama::Error),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Maps a store failure on a write path: a missing record stays a 404,
    /// anything else becomes `message`.
    pub fn write(message: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |err| match err {
            StoreError::NotFound => AppError::NotFound("post"),
            other => {
                tracing::error!(error = %other, source = ?std::error::Error::source(&other), "write failed");
                AppError::WriteFailed(message)
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("record"),
            other => {
                tracing::error!(error = %other, source = ?std::error::Error::source(&other), "read failed");
                AppError::Internal
            }
        }
    }
}

impl ResponseError for AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::WriteFailed(_) => StatusCode::OK,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::LoginRequired => StatusCode::SEE_OTHER,
            AppError::Render(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn as_response(&self) -> Response {
        match self {
            AppError::LoginRequired => Redirect::see_other(SIGN_IN_PATH).into_response(),
            AppError::Render(err) => {
                tracing::error!(error = %err, "template render failed");
                plain_text(self.status(), "Internal Server Error".to_string())
            }
            _ => plain_text(self.status(), self.to_string()),
        }
    }
}

fn plain_text(status: StatusCode, body: String) -> Response {
    Response::builder()
        .status(status)
        .content_type("text/plain; charset=utf-8")
        .body(body)
}

#[cfg(test)]
mod tests {
    use poem::http::header;

    use super::*;

    #[test]
    fn test_login_required_redirects_to_sign_in() {
        let resp = AppError::LoginRequired.as_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            SIGN_IN_PATH
        );
    }

    #[test]
    fn test_write_failure_is_plain_text_ok() {
        let err = AppError::write("There was an issue adding your blog post")(
            StoreError::Persistence(sea_orm::DbErr::Custom("disk full".into())),
        );
        let resp = err.as_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.content_type()
                .is_some_and(|ct| ct.starts_with("text/plain"))
        );
    }

    #[test]
    fn test_write_on_missing_record_is_not_found() {
        let err = AppError::write("unused")(StoreError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
