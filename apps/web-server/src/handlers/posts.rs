//! Blog pages: feeds, post detail and the post form.

use std::convert::Infallible;
use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use yatube_core::DomainError;
use yatube_core::domain::User;
use yatube_core::forms::{FormErrors, PostForm};
use yatube_core::services::{EditAccess, EditOutcome};

use super::{redirect, render};
use crate::middleware::auth::{CurrentUser, MaybeUser};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::urls;
use crate::views::{FeedView, GroupPage, IndexPage, Nav, PostDetailPage, PostFormPage, ProfilePage};

/// Raw `?page=` of a feed request. When repeated, the last value wins.
pub struct PageParam(Option<String>);

impl PageParam {
    fn parse(query: &str) -> Self {
        let page = url::form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| *key == "page")
            .last()
            .map(|(_, value)| value.into_owned());
        PageParam(page)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for PageParam {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(PageParam::parse(req.query_string())))
    }
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    page: PageParam,
) -> AppResult<HttpResponse> {
    let posts = state.posts.index(page.as_deref()).await?;

    render(&IndexPage {
        nav: Nav::for_user(viewer.user()),
        feed: FeedView::new(posts, urls::INDEX),
    })
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    slug: web::Path<String>,
    page: PageParam,
) -> AppResult<HttpResponse> {
    let feed = state.posts.group_feed(&slug, page.as_deref()).await?;

    render(&GroupPage::new(Nav::for_user(viewer.user()), feed.group, feed.page))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    username: web::Path<String>,
    page: PageParam,
) -> AppResult<HttpResponse> {
    let feed = state.posts.profile(&username, page.as_deref()).await?;

    render(&ProfilePage::new(Nav::for_user(viewer.user()), feed.author, feed.page))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    post_id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let details = state.posts.detail(post_id.into_inner()).await?;

    render(&PostDetailPage::new(
        Nav::for_user(viewer.user()),
        details,
        viewer.user(),
    ))
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> AppResult<HttpResponse> {
    form_page(&state, &user.0, &PostForm::default(), &FormErrors::default(), None).await
}

/// POST /create/
///
/// Valid submissions land on the author's profile; invalid ones re-render
/// the form with the submitted values and field errors.
pub async fn post_create(
    state: web::Data<AppState>,
    user: CurrentUser,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let user = user.0;
    let form = form.into_inner();

    match state.posts.create(&user, &form).await {
        Ok(_) => Ok(redirect(&urls::profile(&user.username))),
        Err(DomainError::Validation(errors)) => form_page(&state, &user, &form, &errors, None).await,
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{post_id}/edit/
///
/// Anyone but the author is sent to the post's page.
pub async fn post_edit_form(
    state: web::Data<AppState>,
    user: CurrentUser,
    post_id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let user = user.0;

    match state.posts.open_for_edit(&user, post_id.into_inner()).await? {
        EditAccess::Granted(post) => {
            let form = PostForm::from_post(&post);
            form_page(&state, &user, &form, &FormErrors::default(), Some(post.id)).await
        }
        EditAccess::NotAuthor(id) => Ok(redirect(&urls::post_detail(id))),
    }
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    user: CurrentUser,
    post_id: web::Path<i32>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let user = user.0;
    let post_id = post_id.into_inner();
    let form = form.into_inner();

    match state.posts.edit(&user, post_id, &form).await {
        Ok(EditOutcome::Updated(post)) => Ok(redirect(&urls::post_detail(post.id))),
        Ok(EditOutcome::NotAuthor(id)) => Ok(redirect(&urls::post_detail(id))),
        Err(DomainError::Validation(errors)) => {
            form_page(&state, &user, &form, &errors, Some(post_id)).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn form_page(
    state: &AppState,
    user: &User,
    form: &PostForm,
    errors: &FormErrors,
    post_id: Option<i32>,
) -> AppResult<HttpResponse> {
    let groups = state.posts.groups().await?;
    render(&PostFormPage::new(user, form, errors, groups, post_id))
}
