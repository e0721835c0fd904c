//! Reverse routing: every page's path in one place.

pub const INDEX: &str = "/";
pub const POST_CREATE: &str = "/create/";
pub const LOGIN: &str = "/auth/login/";

const SITE_ORIGIN: &str = "http://localhost/";

pub fn index() -> String {
    INDEX.to_string()
}

pub fn group_posts(slug: &str) -> String {
    format!("/group/{}/", slug)
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", username)
}

pub fn post_detail(post_id: i32) -> String {
    format!("/posts/{}/", post_id)
}

pub fn post_edit(post_id: i32) -> String {
    format!("/posts/{}/edit/", post_id)
}

pub fn post_create() -> String {
    POST_CREATE.to_string()
}

/// Login page, optionally returning to `next` afterwards.
///
/// `/` stays literal in the query so `/create/` reads as `?next=/create/`.
pub fn login(next: Option<&str>) -> String {
    match next {
        Some(next) if !next.is_empty() => {
            let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
            format!("{}?next={}", LOGIN, encoded.replace("%2F", "/"))
        }
        _ => LOGIN.to_string(),
    }
}

/// `base` with `?page=n` attached.
pub fn page(base: &str, number: u64) -> String {
    format!("{}?page={}", base, number)
}

/// Only same-site absolute paths are followed after login.
///
/// Control characters and backslashes are refused outright, since browsers
/// strip the former and read the latter as `/`. The rest must resolve onto
/// the site's own origin.
pub fn is_safe_redirect(target: &str) -> bool {
    if !target.starts_with('/') || target.chars().any(|c| c.is_control() || c == '\\') {
        return false;
    }
    let Ok(base) = url::Url::parse(SITE_ORIGIN) else {
        return false;
    };
    base.join(target)
        .is_ok_and(|resolved| resolved.origin() == base.origin())
}
