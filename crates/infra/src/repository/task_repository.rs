//! # TaskRepository
//!
//! タスクの永続化を担当するリポジトリ。
//!
//! `assigned_user` はユーザー ID の文字列を保持するだけで外部キー制約は持たない。
//! 参照先ユーザーが削除されても値はそのまま残る。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use taskboard_domain::{
    ObjectId,
    query::{ListQuery, Listing, TaskFilter},
    task::{Task, TaskPatch},
};

use super::push_order_and_page;
use crate::error::InfraError;

const TASK_COLUMNS: &str =
    "id, title, description, due_date, assigned_user, completed, created_at, updated_at";

/// タスクリポジトリトレイト
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// タスクを挿入する
    async fn insert(&self, task: &Task) -> Result<(), InfraError>;

    /// ID でタスクを検索
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Task>, InfraError>;

    /// 条件に一致するタスクの一覧と総件数を取得
    async fn find_all(&self, query: &ListQuery<TaskFilter>) -> Result<Listing<Task>, InfraError>;

    /// 差分を適用し、更新後のタスクを返す
    ///
    /// 対象が存在しない場合は `Ok(None)`。
    async fn update_by_id(
        &self,
        id: &ObjectId,
        patch: &TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, InfraError>;

    /// タスクを削除する
    ///
    /// 削除した場合は `true`、対象が存在しない場合は `false`。
    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, InfraError>;
}

/// PostgreSQL 実装の TaskRepository
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id:            String,
    title:         String,
    description:   Option<String>,
    due_date:      Option<DateTime<Utc>>,
    assigned_user: Option<String>,
    completed:     Option<bool>,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = InfraError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let parse_id =
            |raw: &str| ObjectId::parse(raw).map_err(|e| InfraError::corrupt_data(e.to_string()));

        Ok(Task::from_db(
            parse_id(&row.id)?,
            row.title,
            row.description,
            row.due_date,
            row.assigned_user.as_deref().map(parse_id).transpose()?,
            row.completed,
            row.created_at,
            row.updated_at,
        ))
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    builder.push(" WHERE TRUE");
    match filter.completed {
        Some(true) => {
            builder.push(" AND completed = TRUE");
        }
        // 未設定（NULL）は未完了として扱う
        Some(false) => {
            builder.push(" AND completed IS NOT TRUE");
        }
        None => {}
    }
    if let Some(assigned_user) = filter.assigned_user {
        builder
            .push(" AND assigned_user = ")
            .push_bind(assigned_user.to_hex());
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(id = %task.id()))]
    async fn insert(&self, task: &Task) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, title, description, due_date, assigned_user, completed, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(task.id().to_hex())
        .bind(task.title())
        .bind(task.description())
        .bind(task.due_date())
        .bind(task.assigned_user().map(|id| id.to_hex()))
        .bind(task.completed())
        .bind(task.created_at())
        .bind(task.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Task>, InfraError> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
                .bind(id.to_hex())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Task::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self, query: &ListQuery<TaskFilter>) -> Result<Listing<Task>, InfraError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_filter(&mut count, &query.filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        push_filter(&mut select, &query.filter);
        push_order_and_page(&mut select, &query.page);
        let rows: Vec<TaskRow> = select.build_query_as().fetch_all(&self.pool).await?;

        let tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::new(tasks, u64::try_from(total).unwrap_or_default()))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn update_by_id(
        &self,
        id: &ObjectId,
        patch: &TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, InfraError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                assigned_user = COALESCE($5, assigned_user),
                completed = COALESCE($6, completed),
                updated_at = $7
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id.to_hex())
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.due_date)
        .bind(patch.assigned_user.map(|id| id.to_hex()))
        .bind(patch.completed)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, InfraError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
