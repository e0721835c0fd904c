//! Demo data for an empty blog.

use std::sync::Arc;

use yatube_core::DomainError;
use yatube_core::domain::{NewGroup, NewPost, PostFilter};
use yatube_core::ports::{GroupRepository, PostRepository};
use yatube_core::services::AccountService;

pub const DEMO_USERNAME: &str = "max";
pub const DEMO_PASSWORD: &str = "yatube-demo";
pub const DEMO_GROUP_SLUG: &str = "slagtest_1";

/// What a seeding run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { user_id: i32, group_id: i32 },
    /// Posts already exist; nothing was written.
    Skipped,
}

/// Create a demo author, group and welcome post unless the blog already has posts.
pub async fn seed_demo_data(
    accounts: &AccountService,
    groups: &Arc<dyn GroupRepository>,
    posts: &Arc<dyn PostRepository>,
) -> Result<SeedOutcome, DomainError> {
    if posts.count(PostFilter::All).await? > 0 {
        tracing::info!(reason = "posts exist", "demo data seeding skipped");
        return Ok(SeedOutcome::Skipped);
    }

    let user = accounts
        .register(DEMO_USERNAME, "max@example.com", DEMO_PASSWORD)
        .await?;
    let group = groups
        .create(NewGroup::new(
            "Тестовая группа",
            DEMO_GROUP_SLUG,
            "Группа для первых постов.",
        ))
        .await?;
    posts
        .create(NewPost::new(
            user.id,
            "Добро пожаловать в Yatube!".to_string(),
            Some(group.id),
        ))
        .await?;

    tracing::info!(
        username = DEMO_USERNAME,
        group = DEMO_GROUP_SLUG,
        "demo data seeded"
    );
    Ok(SeedOutcome::Seeded {
        user_id: user.id,
        group_id: group.id,
    })
}
