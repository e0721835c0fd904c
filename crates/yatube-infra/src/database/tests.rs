use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use yatube_core::Paginator;
use yatube_core::domain::{Group, NewPost, Post, PostFilter};
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository};

use crate::database::entity::{group, post};
use crate::database::postgres_repo::{PostgresGroupRepository, PostgresPostRepository};

fn post_model(id: i32, text: &str, group_id: Option<i32>) -> post::Model {
    post::Model {
        id,
        text: text.to_owned(),
        pub_date: Utc::now().into(),
        author_id: 1,
        group_id,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(5, "Тестовый пост", None)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(5).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, 5);
    assert_eq!(post.text, "Тестовый пост");
    assert_eq!(post.group_id, None);
}

#[tokio::test]
async fn test_missing_post_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(404).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_find_page_orders_and_limits() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            post_model(13, "Тестовый пост 12", Some(2)),
            post_model(12, "Тестовый пост 11", Some(2)),
            post_model(11, "Тестовый пост 10", Some(2)),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let window = Paginator::default().window(Some("2"), 13);

    let page = repo.find_page(PostFilter::Group(2), window).await.unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(page.first().map(|p| p.id), Some(13));

    let log = repo.db.into_transaction_log();
    let sql = format!("{:?}", log);
    assert!(sql.contains("ORDER BY"));
    assert!(sql.contains("pub_date"));
    assert!(sql.contains("LIMIT"));
    assert!(sql.contains("OFFSET"));
}

#[tokio::test]
async fn test_create_post_returns_stored_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(1, "Новый пост", Some(3))]])
        .append_exec_results([MockExecResult {
            last_insert_id: 1,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let created = repo
        .create(NewPost::new(1, "Новый пост".to_owned(), Some(3)))
        .await
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.group_id, Some(3));
}

#[tokio::test]
async fn test_update_writes_only_text_and_group() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(7, "Измененный текст", None)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let mut edited = Post::from(post_model(7, "Тестовый пост", Some(2)));
    edited.text = "Измененный текст".to_owned();
    edited.group_id = None;
    edited.author_id = 99;

    let updated = repo.update(edited).await.unwrap();

    assert_eq!(updated.text, "Измененный текст");
    assert_eq!(updated.author_id, 1);

    let sql = format!("{:?}", repo.db.into_transaction_log());
    assert!(sql.contains("UPDATE"));
    let (assignments, _) = sql.split_once("WHERE").unwrap();
    assert!(assignments.contains("text"));
    assert!(assignments.contains("group_id"));
    assert!(!assignments.contains("author_id"));
    assert!(!assignments.contains("pub_date"));
}

#[tokio::test]
async fn test_find_group_by_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![group::Model {
            id: 2,
            title: "Тестовая группа".to_owned(),
            slug: "test_group".to_owned(),
            description: "Тестовая:)".to_owned(),
        }]])
        .into_connection();

    let repo = PostgresGroupRepository::new(db);

    let group: Group = repo.find_by_slug("test_group").await.unwrap().unwrap();

    assert_eq!(group.id, 2);
    assert_eq!(group.title, "Тестовая группа");
}
