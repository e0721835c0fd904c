//! Post and account services running on the in-memory repositories.

use std::sync::Arc;

use yatube_core::DomainError;
use yatube_core::domain::{Group, NewGroup, NewPost, NewUser, PostFilter, User};
use yatube_core::forms::{INVALID_CHOICE_MESSAGE, PostForm, REQUIRED_MESSAGE};
use yatube_core::ports::{
    BaseRepository, GroupRepository, PasswordService, PostRepository, UserRepository,
};
use yatube_core::services::{AccountService, EditAccess, EditOutcome, PostService};
use yatube_infra::seed::{DEMO_GROUP_SLUG, DEMO_PASSWORD, DEMO_USERNAME, SeedOutcome, seed_demo_data};
use yatube_infra::{
    Argon2PasswordService, InMemoryGroupRepository, InMemoryPostRepository,
    InMemoryUserRepository,
};

struct Blog {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    service: PostService,
}

impl Blog {
    fn new() -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let groups: Arc<dyn GroupRepository> = Arc::new(InMemoryGroupRepository::new());
        let posts: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new());
        let service = PostService::new(users.clone(), groups.clone(), posts.clone());
        Self {
            users,
            groups,
            posts,
            service,
        }
    }

    async fn user(&self, username: &str) -> User {
        self.users
            .create(NewUser::new(
                username.to_string(),
                format!("{}@mail.ru", username),
                "unused".to_string(),
            ))
            .await
            .unwrap()
    }

    async fn group(&self, slug: &str) -> Group {
        self.groups
            .create(NewGroup::new(format!("Группа {}", slug), slug, "Тестовое описание"))
            .await
            .unwrap()
    }

    async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> i32 {
        self.posts
            .create(NewPost::new(author.id, text.to_string(), group.map(|g| g.id)))
            .await
            .unwrap()
            .id
    }

    async fn total(&self) -> u64 {
        self.posts.count(PostFilter::All).await.unwrap()
    }
}

#[tokio::test]
async fn test_thirteen_posts_split_ten_and_three_in_every_feed() {
    let blog = Blog::new();
    let author = blog.user("max").await;
    let group = blog.group("test-slug2").await;
    for i in 0..13 {
        blog.post(&author, &format!("Тестовый пост {}", i), Some(&group))
            .await;
    }

    let index_1 = blog.service.index(None).await.unwrap();
    let index_2 = blog.service.index(Some("2")).await.unwrap();
    let group_1 = blog.service.group_feed("test-slug2", None).await.unwrap();
    let group_2 = blog.service.group_feed("test-slug2", Some("2")).await.unwrap();
    let profile_1 = blog.service.profile("max", None).await.unwrap();
    let profile_2 = blog.service.profile("max", Some("2")).await.unwrap();

    assert_eq!(index_1.len(), 10);
    assert_eq!(index_2.len(), 3);
    assert_eq!(group_1.page.len(), 10);
    assert_eq!(group_2.page.len(), 3);
    assert_eq!(profile_1.page.len(), 10);
    assert_eq!(profile_2.page.len(), 3);
    assert_eq!(profile_1.page.total(), 13);
}

#[tokio::test]
async fn test_group_feed_excludes_other_groups() {
    let blog = Blog::new();
    let author = blog.user("max1").await;
    let first = blog.group("test-slug1").await;
    let second = blog.group("test-slug2").await;
    blog.post(&author, "Тестовая запись для создания 1 поста", Some(&first))
        .await;
    blog.post(&author, "Тестовая запись для создания 2 поста", Some(&second))
        .await;

    let feed = blog.service.group_feed("test-slug1", None).await.unwrap();

    assert_eq!(feed.group.slug, "test-slug1");
    assert_eq!(feed.page.len(), 1);
    assert_eq!(
        feed.page.items()[0].post.text,
        "Тестовая запись для создания 1 поста"
    );
}

#[tokio::test]
async fn test_unknown_slug_username_and_id_are_not_found() {
    let blog = Blog::new();

    let group = blog.service.group_feed("missing", None).await;
    let profile = blog.service.profile("nobody", None).await;
    let detail = blog.service.detail(404).await;

    assert!(matches!(group, Err(DomainError::NotFound { entity: "Group", .. })));
    assert!(matches!(profile, Err(DomainError::NotFound { entity: "User", .. })));
    assert!(matches!(detail, Err(DomainError::NotFound { entity: "Post", .. })));
}

#[tokio::test]
async fn test_detail_joins_author_group_and_post_count() {
    let blog = Blog::new();
    let author = blog.user("max2").await;
    let group = blog.group("test-slug2").await;
    blog.post(&author, "first", None).await;
    let id = blog.post(&author, "second", Some(&group)).await;

    let details = blog.service.detail(id).await.unwrap();

    assert_eq!(details.card.post.text, "second");
    assert_eq!(details.card.author.username, "max2");
    assert_eq!(details.card.group.map(|g| g.slug), Some("test-slug2".to_string()));
    assert_eq!(details.author_posts, 2);
}

#[tokio::test]
async fn test_create_stores_post_for_caller() {
    let blog = Blog::new();
    let author = blog.user("max").await;
    let group = blog.group("slagtest_1").await;
    let before = blog.total().await;

    let post = blog
        .service
        .create(&author, &PostForm::new("Новый пост", Some(group.id)))
        .await
        .unwrap();

    assert_eq!(blog.total().await, before + 1);
    assert_eq!(post.author_id, author.id);
    assert_eq!(post.text, "Новый пост");
    assert_eq!(post.group_id, Some(group.id));

    let profile = blog.service.profile("max", None).await.unwrap();
    assert_eq!(profile.page.items()[0].post.id, post.id);
}

#[tokio::test]
async fn test_create_without_group() {
    let blog = Blog::new();
    let author = blog.user("max").await;

    let post = blog
        .service
        .create(&author, &PostForm::new("Без группы", None))
        .await
        .unwrap();

    assert_eq!(post.group_id, None);
}

#[tokio::test]
async fn test_create_with_empty_text_stores_nothing() {
    let blog = Blog::new();
    let author = blog.user("max").await;

    let result = blog.service.create(&author, &PostForm::new("", None)).await;

    let Err(DomainError::Validation(errors)) = result else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.field("text"), &[REQUIRED_MESSAGE.to_string()]);
    assert_eq!(blog.total().await, 0);
}

#[tokio::test]
async fn test_create_with_unknown_group_is_invalid_choice() {
    let blog = Blog::new();
    let author = blog.user("max").await;

    let result = blog
        .service
        .create(&author, &PostForm::new("text", Some(999)))
        .await;

    let Err(DomainError::Validation(errors)) = result else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.field("group"), &[INVALID_CHOICE_MESSAGE.to_string()]);
    assert_eq!(blog.total().await, 0);
}

#[tokio::test]
async fn test_author_edit_updates_in_place() {
    let blog = Blog::new();
    let author = blog.user("test1").await;
    let group = blog.group("test_group").await;
    let id = blog.post(&author, "Тестовый пост", Some(&group)).await;
    let before = blog.total().await;

    let outcome = blog
        .service
        .edit(&author, id, &PostForm::new("Измененный текст", None))
        .await
        .unwrap();

    assert!(matches!(outcome, EditOutcome::Updated(_)));
    let stored = blog.posts.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Измененный текст");
    assert_eq!(stored.group_id, None);
    assert_eq!(stored.author_id, author.id);
    assert_eq!(blog.total().await, before);
}

#[tokio::test]
async fn test_non_author_edit_is_refused_without_change() {
    let blog = Blog::new();
    let author = blog.user("Author").await;
    let stranger = blog.user("max888").await;
    let id = blog.post(&author, "original", None).await;

    let access = blog.service.open_for_edit(&stranger, id).await.unwrap();
    let outcome = blog
        .service
        .edit(&stranger, id, &PostForm::new("hijacked", None))
        .await
        .unwrap();

    assert!(matches!(access, EditAccess::NotAuthor(post_id) if post_id == id));
    assert!(matches!(outcome, EditOutcome::NotAuthor(post_id) if post_id == id));
    let stored = blog.posts.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
}

#[tokio::test]
async fn test_invalid_edit_keeps_post() {
    let blog = Blog::new();
    let author = blog.user("Author").await;
    let id = blog.post(&author, "original", None).await;

    let result = blog.service.edit(&author, id, &PostForm::new("  ", None)).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    let stored = blog.posts.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
}

#[tokio::test]
async fn test_authenticate_checks_password() {
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    let accounts = AccountService::new(users, passwords);
    accounts
        .register("max", "test@mail.ru", "test_pass")
        .await
        .unwrap();

    let ok = accounts.authenticate("max", "test_pass").await;
    let wrong = accounts.authenticate("max", "nope").await;
    let unknown = accounts.authenticate("ghost", "test_pass").await;
    let duplicate = accounts.register("max", "x@mail.ru", "pass").await;

    assert_eq!(ok.unwrap().username, "max");
    assert!(matches!(wrong, Err(DomainError::Unauthorized)));
    assert!(matches!(unknown, Err(DomainError::Unauthorized)));
    assert!(matches!(duplicate, Err(DomainError::Duplicate(_))));
}

#[tokio::test]
async fn test_demo_seed_runs_once() {
    let blog = Blog::new();
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    let accounts = AccountService::new(blog.users.clone(), passwords);

    let first = seed_demo_data(&accounts, &blog.groups, &blog.posts)
        .await
        .unwrap();
    let second = seed_demo_data(&accounts, &blog.groups, &blog.posts)
        .await
        .unwrap();

    assert!(matches!(first, SeedOutcome::Seeded { .. }));
    assert_eq!(second, SeedOutcome::Skipped);
    assert_eq!(blog.total().await, 1);
    assert!(accounts.authenticate(DEMO_USERNAME, DEMO_PASSWORD).await.is_ok());
    assert!(blog.groups.find_by_slug(DEMO_GROUP_SLUG).await.unwrap().is_some());
}
