use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Group, User};

/// Post entity - a piece of text written by a user, optionally filed under a group.
///
/// `author_id` is fixed at creation; only `text` and `group_id` change on edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i32,
    pub group_id: Option<i32>,
}

impl Post {
    /// Whether `user` wrote this post.
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i32,
    pub group_id: Option<i32>,
}

impl NewPost {
    /// Create a new post stamped with the current time.
    pub fn new(author_id: i32, text: String, group_id: Option<i32>) -> Self {
        Self {
            text,
            pub_date: Utc::now(),
            author_id,
            group_id,
        }
    }
}

/// Which posts a feed lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i32),
    Author(i32),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Group(group_id) => post.group_id == Some(*group_id),
            Self::Author(author_id) => post.author_id == *author_id,
        }
    }
}

/// A post together with its author and group, ready to render.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
}
