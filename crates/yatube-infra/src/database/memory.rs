//! In-memory repositories - used when no database is configured and in tests.
//!
//! Each repository keeps its rows in a `BTreeMap` keyed by id behind an async
//! `RwLock` and hands out ids from a counter, mimicking a serial primary key.
//! Data is lost on process restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::PageWindow;
use yatube_core::domain::{Group, NewGroup, NewPost, NewUser, Post, PostFilter, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository, UserRepository};

struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, i32> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        let table = self.table.read().await;
        Ok(ids.iter().filter_map(|id| table.rows.get(id)).cloned().collect())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.username == new_user.username) {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                new_user.username
            )));
        }

        let user = User {
            id: table.next_id(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: new_user.created_at,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }
}

/// In-memory group store.
#[derive(Default)]
pub struct InMemoryGroupRepository {
    table: RwLock<Table<Group>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Group, i32> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Group>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Group>, RepoError> {
        let table = self.table.read().await;
        Ok(ids.iter().filter_map(|id| table.rows.get(id)).cloned().collect())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let table = self.table.read().await;
        let mut groups: Vec<Group> = table.rows.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn create(&self, new_group: NewGroup) -> Result<Group, RepoError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|g| g.slug == new_group.slug) {
            return Err(RepoError::Constraint(format!(
                "slug {} already exists",
                new_group.slug
            )));
        }

        let group = Group {
            id: table.next_id(),
            title: new_group.title,
            slug: new_group.slug,
            description: new_group.description,
        };
        table.rows.insert(group.id, group.clone());
        Ok(group)
    }
}

/// In-memory post store.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<Table<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn find_page(
        &self,
        filter: PostFilter,
        window: PageWindow,
    ) -> Result<Vec<Post>, RepoError> {
        let table = self.table.read().await;
        let mut posts: Vec<&Post> = table.rows.values().filter(|p| filter.matches(p)).collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let post = Post {
            id: table.next_id(),
            text: new_post.text,
            pub_date: new_post.pub_date,
            author_id: new_post.author_id,
            group_id: new_post.group_id,
        };
        table.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let stored = table.rows.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        stored.text = post.text;
        stored.group_id = post.group_id;
        Ok(stored.clone())
    }
}
