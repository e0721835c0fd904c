//! Login and logout.

use actix_session::Session;
use actix_web::{HttpResponse, web};
use yatube_core::DomainError;
use yatube_core::forms::{FormErrors, NON_FIELD_ERRORS};
use yatube_shared::dto::{LoginForm, NextQuery};

use super::{redirect, render};
use crate::middleware::auth::{MaybeUser, log_in, log_out};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::urls;
use crate::views::{LoginPage, Nav};

pub const INVALID_LOGIN_MESSAGE: &str = "Please enter a correct username and password.";

/// GET /auth/login/
pub async fn login_form(viewer: MaybeUser, query: web::Query<NextQuery>) -> AppResult<HttpResponse> {
    render(&LoginPage::new(
        Nav::for_user(viewer.user()),
        "",
        query.next.as_deref(),
        &FormErrors::default(),
    ))
}

/// POST /auth/login/
///
/// Success goes to `next` when it is a local path, else to the index.
pub async fn login(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    match state.accounts.authenticate(&form.username, &form.password).await {
        Ok(user) => {
            log_in(&session, &user)?;
            tracing::info!(user_id = user.id, "User logged in");

            let target = form
                .next
                .as_deref()
                .filter(|next| urls::is_safe_redirect(next))
                .map(str::to_string)
                .unwrap_or_else(urls::index);
            Ok(redirect(&target))
        }
        Err(DomainError::Unauthorized) => {
            let mut errors = FormErrors::default();
            errors.add(NON_FIELD_ERRORS, INVALID_LOGIN_MESSAGE);
            render(&LoginPage::new(None, &form.username, form.next.as_deref(), &errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET or POST /auth/logout/
pub async fn logout(session: Session) -> HttpResponse {
    log_out(&session);
    redirect(&urls::index())
}
