//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{GroupRepository, PasswordService, PostRepository, UserRepository};
use yatube_core::services::{AccountService, PostService};
use yatube_infra::seed::seed_demo_data;
use yatube_infra::{
    Argon2PasswordService, InMemoryGroupRepository, InMemoryPostRepository,
    InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};
#[cfg(feature = "postgres")]
use yatube_infra::{DatabaseConfig, DatabaseConnections};

use crate::config::AppConfig;

/// The three blog tables behind their ports.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    /// Process-local storage, lost on restart.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            groups: Arc::new(InMemoryGroupRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
            groups: Arc::new(PostgresGroupRepository::new(connections.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub accounts: Arc<AccountService>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (db, repos) = connect(config.database.as_ref()).await;

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Repositories::in_memory()
        };

        #[cfg_attr(not(feature = "postgres"), allow(unused_mut))]
        let mut state = Self::from_repositories(&repos);
        #[cfg(feature = "postgres")]
        {
            state.db = db;
        }

        if config.seed_demo_data {
            if let Err(e) = seed_demo_data(&state.accounts, &repos.groups, &repos.posts).await {
                tracing::error!("Demo data seeding failed: {}", e);
            }
        }

        tracing::info!("Application state initialized");
        state
    }

    /// State over the given repositories, hashing passwords with Argon2.
    pub fn from_repositories(repos: &Repositories) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        Self {
            posts: Arc::new(PostService::new(
                repos.users.clone(),
                repos.groups.clone(),
                repos.posts.clone(),
            )),
            accounts: Arc::new(AccountService::new(repos.users.clone(), passwords)),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Whether a database backs the state, and if so whether it answers.
    pub async fn database_status(&self) -> &'static str {
        #[cfg(feature = "postgres")]
        {
            if let Some(db) = &self.db {
                return match db.ping().await {
                    Ok(()) => "ok",
                    Err(e) => {
                        tracing::warn!("Database ping failed: {}", e);
                        "unavailable"
                    }
                };
            }
        }

        "in-memory"
    }
}

#[cfg(feature = "postgres")]
async fn connect(
    config: Option<&DatabaseConfig>,
) -> (Option<Arc<DatabaseConnections>>, Repositories) {
    let Some(config) = config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return (None, Repositories::in_memory());
    };

    match DatabaseConnections::init(config).await {
        Ok(connections) => {
            let repos = Repositories::postgres(&connections);
            (Some(Arc::new(connections)), repos)
        }
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            (None, Repositories::in_memory())
        }
    }
}
