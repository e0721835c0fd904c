//! Askama page templates and the view models they render.
//!
//! View models carry display-ready strings and precomputed links so the
//! templates stay free of logic.

use askama::Template;
use yatube_core::Page;
use yatube_core::domain::{Group, PostCard, User};
use yatube_core::forms::{FormErrors, NON_FIELD_ERRORS, PostForm};
use yatube_core::services::PostDetails;
use yatube_shared::ErrorResponse;

use crate::urls;

const DATE_FORMAT: &str = "%d %b %Y %H:%M";

/// Navigation bar state for the logged-in user.
#[derive(Debug, Clone)]
pub struct Nav {
    pub username: String,
    pub profile_url: String,
}

impl Nav {
    pub fn for_user(user: Option<&User>) -> Option<Self> {
        user.map(|u| Self {
            username: u.username.clone(),
            profile_url: urls::profile(&u.username),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GroupLink {
    pub title: String,
    pub url: String,
}

/// One post as shown in a feed or on its own page.
#[derive(Debug, Clone)]
pub struct PostItem {
    pub id: i32,
    pub text: String,
    pub pub_date: String,
    pub author: String,
    pub author_url: String,
    pub detail_url: String,
    pub group: Option<GroupLink>,
}

impl From<PostCard> for PostItem {
    fn from(card: PostCard) -> Self {
        Self {
            id: card.post.id,
            pub_date: card.post.pub_date.format(DATE_FORMAT).to_string(),
            detail_url: urls::post_detail(card.post.id),
            author_url: urls::profile(&card.author.username),
            author: card.author.username,
            group: card.group.map(|g| GroupLink {
                url: urls::group_posts(&g.slug),
                title: g.title,
            }),
            text: card.post.text,
        }
    }
}

/// A page of posts plus the links of its paginator.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub posts: Vec<PostItem>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub first_url: Option<String>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub last_url: Option<String>,
}

impl FeedView {
    /// `base` is the feed's own path; page links are `base?page=n`.
    pub fn new(page: Page<PostCard>, base: &str) -> Self {
        let link = |n: u64| urls::page(base, n);
        let number = page.number();
        let num_pages = page.num_pages();

        Self {
            first_url: page.has_previous().then(|| link(1)),
            previous_url: page.previous_page_number().map(link),
            next_url: page.next_page_number().map(link),
            last_url: page.has_next().then(|| link(num_pages)),
            number,
            num_pages,
            total: page.total(),
            posts: page.into_items().into_iter().map(PostItem::from).collect(),
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}

/// One `<option>` of the group select.
#[derive(Debug, Clone)]
pub struct GroupChoice {
    pub id: i32,
    pub title: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexPage {
    pub nav: Option<Nav>,
    pub feed: FeedView,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupPage {
    pub nav: Option<Nav>,
    pub title: String,
    pub description: String,
    pub feed: FeedView,
}

impl GroupPage {
    pub fn new(nav: Option<Nav>, group: Group, page: Page<PostCard>) -> Self {
        Self {
            nav,
            feed: FeedView::new(page, &urls::group_posts(&group.slug)),
            title: group.title,
            description: group.description,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfilePage {
    pub nav: Option<Nav>,
    pub username: String,
    pub feed: FeedView,
}

impl ProfilePage {
    pub fn new(nav: Option<Nav>, author: User, page: Page<PostCard>) -> Self {
        Self {
            nav,
            feed: FeedView::new(page, &urls::profile(&author.username)),
            username: author.username,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailPage {
    pub nav: Option<Nav>,
    pub post: PostItem,
    pub author_posts: u64,
    /// Present only for the post's author.
    pub edit_url: Option<String>,
}

impl PostDetailPage {
    pub fn new(nav: Option<Nav>, details: PostDetails, viewer: Option<&User>) -> Self {
        let can_edit = viewer.is_some_and(|u| details.card.post.is_authored_by(u));
        let id = details.card.post.id;

        Self {
            nav,
            post: PostItem::from(details.card),
            author_posts: details.author_posts,
            edit_url: can_edit.then(|| urls::post_edit(id)),
        }
    }
}

/// Create and edit share one template; `is_edit` switches the wording.
#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormPage {
    pub nav: Option<Nav>,
    pub is_edit: bool,
    pub action_url: String,
    pub text: String,
    pub groups: Vec<GroupChoice>,
    pub text_errors: Vec<String>,
    pub group_errors: Vec<String>,
}

impl PostFormPage {
    /// `post_id` is set when editing.
    pub fn new(
        user: &User,
        form: &PostForm,
        errors: &FormErrors,
        groups: Vec<Group>,
        post_id: Option<i32>,
    ) -> Self {
        let selected = form.selected_group();

        Self {
            nav: Nav::for_user(Some(user)),
            is_edit: post_id.is_some(),
            action_url: post_id.map(urls::post_edit).unwrap_or_else(urls::post_create),
            text: form.text.clone(),
            groups: groups
                .into_iter()
                .map(|g| GroupChoice {
                    selected: selected == Some(g.id),
                    id: g.id,
                    title: g.title,
                })
                .collect(),
            text_errors: errors.field("text").to_vec(),
            group_errors: errors.field("group").to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginPage {
    pub nav: Option<Nav>,
    pub action_url: String,
    pub username: String,
    pub next: String,
    pub errors: Vec<String>,
}

impl LoginPage {
    pub fn new(nav: Option<Nav>, username: &str, next: Option<&str>, errors: &FormErrors) -> Self {
        Self {
            nav,
            action_url: urls::LOGIN.to_string(),
            username: username.to_string(),
            next: next.unwrap_or_default().to_string(),
            errors: errors.field(NON_FIELD_ERRORS).to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "core/error.html")]
pub struct ErrorPage {
    pub nav: Option<Nav>,
    pub status: u16,
    pub title: String,
    pub detail: Option<String>,
}

impl From<ErrorResponse> for ErrorPage {
    fn from(error: ErrorResponse) -> Self {
        Self {
            nav: None,
            status: error.status,
            title: error.title,
            detail: error.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use yatube_core::Paginator;
    use yatube_core::domain::Post;

    use super::*;

    fn card(id: i32) -> PostCard {
        PostCard {
            post: Post {
                id,
                text: format!("post {}", id),
                pub_date: Utc::now(),
                author_id: 1,
                group_id: Some(2),
            },
            author: User {
                id: 1,
                username: "max".to_string(),
                email: "max@mail.ru".to_string(),
                password_hash: String::new(),
                created_at: Utc::now(),
            },
            group: Some(Group {
                id: 2,
                title: "Тестовая группа".to_string(),
                slug: "slagtest_1".to_string(),
                description: String::new(),
            }),
        }
    }

    #[test]
    fn test_post_item_links() {
        let item = PostItem::from(card(5));

        assert_eq!(item.detail_url, "/posts/5/");
        assert_eq!(item.author_url, "/profile/max/");
        assert_eq!(item.group.unwrap().url, "/group/slagtest_1/");
    }

    #[test]
    fn test_middle_page_links_both_ways() {
        let cards: Vec<PostCard> = (1..=25).map(card).collect();
        let page = Paginator::default().paginate(&cards, Some("2"));

        let feed = FeedView::new(page, "/");

        assert_eq!(feed.posts.len(), 10);
        assert_eq!(feed.first_url.as_deref(), Some("/?page=1"));
        assert_eq!(feed.previous_url.as_deref(), Some("/?page=1"));
        assert_eq!(feed.next_url.as_deref(), Some("/?page=3"));
        assert_eq!(feed.last_url.as_deref(), Some("/?page=3"));
        assert!(feed.is_paginated());
    }

    #[test]
    fn test_single_page_has_no_links() {
        let cards: Vec<PostCard> = (1..=3).map(card).collect();
        let page = Paginator::default().paginate(&cards, None);

        let feed = FeedView::new(page, "/");

        assert!(feed.previous_url.is_none());
        assert!(feed.next_url.is_none());
        assert!(!feed.is_paginated());
    }

    #[test]
    fn test_form_page_marks_selected_group_and_errors() {
        let user = card(1).author;
        let groups = vec![card(1).group.unwrap()];
        let mut errors = FormErrors::default();
        errors.add("text", "This field is required.");

        let page = PostFormPage::new(&user, &PostForm::new("", Some(2)), &errors, groups, Some(9));

        assert!(page.is_edit);
        assert_eq!(page.action_url, "/posts/9/edit/");
        assert!(page.groups[0].selected);
        assert_eq!(page.text_errors, vec!["This field is required.".to_string()]);
        assert!(page.group_errors.is_empty());
    }

    #[test]
    fn test_escapes_post_text() {
        let mut c = card(1);
        c.post.text = "<script>alert(1)</script>".to_string();
        let page = Paginator::default().paginate(&[c], None);

        let html = IndexPage {
            nav: None,
            feed: FeedView::new(page, "/"),
        }
        .render()
        .unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
