//! Error handling - failures rendered as HTML error pages.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use yatube_core::error::{DomainError, RepoError};
use yatube_shared::ErrorResponse;

use crate::urls;
use crate::views::ErrorPage;

/// Application-level error type rendered through `core/error.html`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Anonymous visitor on a members-only page; answered with a redirect.
    #[error("Login required for {next}")]
    LoginRequired { next: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn body(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::LoginRequired { .. } => ErrorResponse::new(302, "Login required"),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::LoginRequired { next } = self {
            return HttpResponse::Found()
                .insert_header((header::LOCATION, urls::login(Some(next))))
                .finish();
        }

        let page = ErrorPage::from(self.body());
        match page.render() {
            Ok(html) => HttpResponse::build(self.status_code())
                .content_type("text/html; charset=utf-8")
                .body(html),
            Err(e) => {
                tracing::error!("Error page failed to render: {}", e);
                HttpResponse::build(self.status_code())
                    .content_type("text/plain; charset=utf-8")
                    .body(page.title)
            }
        }
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity, key } => {
                AppError::NotFound(format!("{} {} not found", entity, key))
            }
            DomainError::Validation(errors) => AppError::BadRequest(errors.to_string()),
            DomainError::Duplicate(msg) => AppError::BadRequest(msg),
            DomainError::Unauthorized => AppError::BadRequest("Unauthorized access".to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
            DomainError::Repository(e) => e.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("template rendering failed: {}", err))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use yatube_core::forms::FormErrors;

    use super::*;

    #[actix_rt::test]
    async fn test_login_required_redirects_with_next() {
        let err = AppError::LoginRequired {
            next: "/create/".to_string(),
        };

        let resp = err.error_response();

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/auth/login/?next=/create/"
        );
    }

    #[actix_rt::test]
    async fn test_not_found_renders_html_page() {
        let err: AppError = DomainError::not_found("Group", "missing").into();

        let resp = err.error_response();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("Page not found"));
        assert!(html.contains("Group missing not found"));
    }

    #[test]
    fn test_domain_error_mapping() {
        let mut errors = FormErrors::default();
        errors.add("text", "This field is required.");

        assert!(matches!(
            AppError::from(DomainError::Validation(errors)),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::Unauthorized),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::Repository(RepoError::Connection("down".into()))),
            AppError::Internal(_)
        ));
    }
}
