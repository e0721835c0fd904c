//! Feeds, post detail and the create/edit write path.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{Group, NewPost, Post, PostCard, PostFilter, User};
use crate::error::DomainError;
use crate::forms::{FormErrors, INVALID_CHOICE_MESSAGE, PostData, PostForm};
use crate::pagination::{Page, Paginator};
use crate::ports::{GroupRepository, PostRepository, UserRepository};

/// A group together with one page of its posts.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostCard>,
}

/// An author together with one page of their posts.
///
/// `page.total()` is the author's post count.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: User,
    pub page: Page<PostCard>,
}

/// A single post and how many posts its author has written.
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub card: PostCard,
    pub author_posts: u64,
}

/// Whether a user may open a post's edit form.
#[derive(Debug, Clone)]
pub enum EditAccess {
    Granted(Post),
    /// The user is not the author; they are sent to the post instead.
    NotAuthor(i32),
}

/// Result of submitting an edit.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    Updated(Post),
    NotAuthor(i32),
}

/// Post reads and writes.
pub struct PostService {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    paginator: Paginator,
}

impl PostService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            users,
            groups,
            posts,
            paginator: Paginator::default(),
        }
    }

    /// Site-wide feed, newest first.
    pub async fn index(&self, page: Option<&str>) -> Result<Page<PostCard>, DomainError> {
        self.feed(PostFilter::All, page).await
    }

    /// Feed of one group, looked up by slug.
    pub async fn group_feed(&self, slug: &str, page: Option<&str>) -> Result<GroupFeed, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Group", slug))?;

        let page = self.feed(PostFilter::Group(group.id), page).await?;
        Ok(GroupFeed { group, page })
    }

    /// Feed of one author, looked up by username.
    pub async fn profile(&self, username: &str, page: Option<&str>) -> Result<ProfileFeed, DomainError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))?;

        let page = self.feed(PostFilter::Author(author.id), page).await?;
        Ok(ProfileFeed { author, page })
    }

    pub async fn detail(&self, post_id: i32) -> Result<PostDetails, DomainError> {
        let post = self.find(post_id).await?;
        let author_posts = self.posts.count(PostFilter::Author(post.author_id)).await?;
        let card = self
            .cards(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        Ok(PostDetails { card, author_posts })
    }

    pub async fn find(&self, post_id: i32) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    /// Groups offered as choices on the post form.
    pub async fn groups(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.groups.list().await?)
    }

    /// Validate `form` and store it as a new post by `author`.
    pub async fn create(&self, author: &User, form: &PostForm) -> Result<Post, DomainError> {
        let data = self.clean(form).await?;
        let post = self
            .posts
            .create(NewPost::new(author.id, data.text, data.group_id))
            .await?;

        tracing::info!(post_id = post.id, author_id = author.id, "Post created");
        Ok(post)
    }

    /// Check that `user` may edit the post before showing the form.
    pub async fn open_for_edit(&self, user: &User, post_id: i32) -> Result<EditAccess, DomainError> {
        let post = self.find(post_id).await?;
        if !post.is_authored_by(user) {
            return Ok(EditAccess::NotAuthor(post.id));
        }
        Ok(EditAccess::Granted(post))
    }

    /// Apply an edit submitted by `user`.
    ///
    /// Authorship is checked before the form is validated; only text and
    /// group change.
    pub async fn edit(
        &self,
        user: &User,
        post_id: i32,
        form: &PostForm,
    ) -> Result<EditOutcome, DomainError> {
        let mut post = match self.open_for_edit(user, post_id).await? {
            EditAccess::Granted(post) => post,
            EditAccess::NotAuthor(id) => {
                tracing::info!(post_id = id, user_id = user.id, "Edit refused: not the author");
                return Ok(EditOutcome::NotAuthor(id));
            }
        };

        let data = self.clean(form).await?;
        post.text = data.text;
        post.group_id = data.group_id;

        let post = self.posts.update(post).await?;
        tracing::info!(post_id = post.id, "Post updated");
        Ok(EditOutcome::Updated(post))
    }

    async fn clean(&self, form: &PostForm) -> Result<PostData, DomainError> {
        let data = form.clean().map_err(DomainError::Validation)?;

        if let Some(group_id) = data.group_id {
            if self.groups.find_by_id(group_id).await?.is_none() {
                let mut errors = FormErrors::default();
                errors.add("group", INVALID_CHOICE_MESSAGE);
                return Err(DomainError::Validation(errors));
            }
        }

        Ok(data)
    }

    async fn feed(&self, filter: PostFilter, page: Option<&str>) -> Result<Page<PostCard>, DomainError> {
        let total = self.posts.count(filter).await?;
        let window = self.paginator.window(page, total);
        let posts = self.posts.find_page(filter, window).await?;
        let cards = self.cards(posts).await?;

        Ok(Page::new(cards, window))
    }

    /// Join posts with their authors and groups, keeping the input order.
    async fn cards(&self, posts: Vec<Post>) -> Result<Vec<PostCard>, DomainError> {
        let author_ids: Vec<i32> = posts
            .iter()
            .map(|p| p.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let group_ids: Vec<i32> = posts
            .iter()
            .filter_map(|p| p.group_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let authors: HashMap<i32, User> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_by_ids(&author_ids)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        };
        let groups: HashMap<i32, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.groups
                .find_by_ids(&group_ids)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect()
        };

        posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    DomainError::Internal(format!(
                        "post {} references missing author {}",
                        post.id, post.author_id
                    ))
                })?;
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Ok(PostCard {
                    post,
                    author,
                    group,
                })
            })
            .collect()
    }
}
