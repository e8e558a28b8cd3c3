//! TaskRepository 統合テスト
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://localhost/taskboard cargo test -p taskboard-infra --test task_repository_test
//! ```

mod common;

use common::{at, task_at, task_with, user_at};
use pretty_assertions::assert_eq;
use sqlx::PgPool;
use taskboard_domain::{
    ObjectId,
    query::{ListQuery, Page, TaskFilter},
    task::TaskPatch,
};
use taskboard_infra::repository::{
    PostgresTaskRepository,
    PostgresUserRepository,
    TaskRepository,
    UserRepository,
};

#[sqlx::test(migrations = "../../migrations")]
async fn test_挿入したタスクをidで取得できる(pool: PgPool) {
    let repo = PostgresTaskRepository::new(pool);
    let task = task_with("請求書を送る", Some(ObjectId::new()), None, 0);

    repo.insert(&task).await.unwrap();
    let found = repo.find_by_id(&task.id()).await.unwrap();

    assert_eq!(found, Some(task));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_完了状態で絞り込み未設定は未完了に含める(pool: PgPool) {
    let repo = PostgresTaskRepository::new(pool);
    let unset = task_with("未設定", None, None, 0);
    let open = task_with("未完了", None, Some(false), 1);
    let done = task_with("完了", None, Some(true), 2);
    for task in [&unset, &open, &done] {
        repo.insert(task).await.unwrap();
    }
    let query = |completed| ListQuery {
        filter: TaskFilter {
            completed:     Some(completed),
            assigned_user: None,
        },
        page:   Page::all(),
    };

    let completed = repo.find_all(&query(true)).await.unwrap();
    let pending = repo.find_all(&query(false)).await.unwrap();

    assert_eq!(completed.items, vec![done]);
    assert_eq!(pending.items, vec![unset, open]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_担当者で絞り込みページングできる(pool: PgPool) {
    let repo = PostgresTaskRepository::new(pool);
    let owner = ObjectId::new();
    let a = task_with("a", Some(owner), None, 0);
    let b = task_with("b", Some(owner), None, 1);
    let other = task_with("c", Some(ObjectId::new()), None, 2);
    for task in [&b, &other, &a] {
        repo.insert(task).await.unwrap();
    }

    let listing = repo
        .find_all(&ListQuery {
            filter: TaskFilter {
                completed:     None,
                assigned_user: Some(owner),
            },
            page:   Page::new(1, Some(1)),
        })
        .await
        .unwrap();

    assert_eq!(listing.total, 2);
    assert_eq!(listing.items, vec![a]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_部分更新は未指定フィールドを保持する(pool: PgPool) {
    let repo = PostgresTaskRepository::new(pool);
    let task = task_with("書類", Some(ObjectId::new()), None, 0);
    repo.insert(&task).await.unwrap();
    let patch = TaskPatch {
        completed: Some(true),
        ..TaskPatch::default()
    };

    let updated = repo
        .update_by_id(&task.id(), &patch, at(30))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.completed(), Some(true));
    assert_eq!(updated.title(), "書類");
    assert_eq!(updated.assigned_user(), task.assigned_user());
    assert_eq!(updated.updated_at(), at(30));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ユーザー削除後も担当者idは残る(pool: PgPool) {
    let users = PostgresUserRepository::new(pool.clone());
    let tasks = PostgresTaskRepository::new(pool);
    let user = user_at("Ada", "ada@example.com", 0);
    users.insert(&user).await.unwrap();
    let task = task_with("引き継ぎ", Some(user.id()), None, 1);
    tasks.insert(&task).await.unwrap();

    users.delete_by_id(&user.id()).await.unwrap();
    let found = tasks.find_by_id(&task.id()).await.unwrap().unwrap();

    assert_eq!(found.assigned_user(), Some(user.id()));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_タスクを削除できる(pool: PgPool) {
    let repo = PostgresTaskRepository::new(pool);
    let task = task_at("消す", 0);
    repo.insert(&task).await.unwrap();

    assert!(repo.delete_by_id(&task.id()).await.unwrap());
    assert!(!repo.delete_by_id(&task.id()).await.unwrap());
}
