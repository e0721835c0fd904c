use async_trait::async_trait;

use crate::domain::{Group, NewGroup, NewPost, NewUser, Post, PostFilter, User};
use crate::error::RepoError;
use crate::pagination::PageWindow;

/// Lookup shared by every repository.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Fetch every user whose id is in `ids`, in no particular order.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError>;

    /// Store a new user. Fails with `Constraint` when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i32> {
    /// Find a group by its URL slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Group>, RepoError>;

    /// All groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;

    /// Store a new group. Fails with `Constraint` when the slug is taken.
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;
}

/// Post repository.
///
/// Feeds are ordered newest first: `pub_date` descending, then `id` descending.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Number of posts matching `filter`.
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;

    /// One page of posts matching `filter`, newest first.
    async fn find_page(&self, filter: PostFilter, window: PageWindow)
    -> Result<Vec<Post>, RepoError>;

    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite the text and group of an existing post. The author is never touched.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;
}
