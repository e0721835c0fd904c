//! Domain entities - the core business objects.

mod group;
mod post;
mod user;

pub use group::{Group, NewGroup};
pub use post::{NewPost, Post, PostCard, PostFilter};
pub use user::{NewUser, User};
