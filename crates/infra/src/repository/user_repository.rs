//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! - `email` の一意性は `users_email_key` 制約で保証し、
//!   違反は [`InfraErrorKind::DuplicateKey`](crate::InfraErrorKind::DuplicateKey) に変換する
//! - 検索（`search`）は姓・名・メールアドレスへの `ILIKE` 部分一致

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use taskboard_domain::{
   ObjectId,
   query::{ListQuery, Listing, UserFilter},
   user::{Email, User, UserPatch, UserRole},
};

use super::{escape_like, push_order_and_page};
use crate::error::InfraError;

/// email の一意制約名
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

const USER_COLUMNS: &str =
   "id, first_name, last_name, email, phone, address, role, created_at, updated_at";

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
   /// ユーザーを挿入する
   ///
   /// メールアドレスが重複している場合は `DuplicateKey` を返す。
   async fn insert(&self, user: &User) -> Result<(), InfraError>;

   /// ID でユーザーを検索
   async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, InfraError>;

   /// 複数の ID でユーザーを一括検索
   ///
   /// 存在しない ID は無視し、見つかったユーザーのみ返す。
   async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<User>, InfraError>;

   /// 条件に一致するユーザーの一覧と総件数を取得
   async fn find_all(&self, query: &ListQuery<UserFilter>) -> Result<Listing<User>, InfraError>;

   /// 差分を適用し、更新後のユーザーを返す
   ///
   /// 対象が存在しない場合は `Ok(None)`。
   async fn update_by_id(
      &self,
      id: &ObjectId,
      patch: &UserPatch,
      now: DateTime<Utc>,
   ) -> Result<Option<User>, InfraError>;

   /// ユーザーを削除する
   ///
   /// 削除した場合は `true`、対象が存在しない場合は `false`。
   async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, InfraError>;
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
   pool: PgPool,
}

impl PostgresUserRepository {
   pub fn new(pool: PgPool) -> Self {
      Self { pool }
   }
}

/// `users` テーブルの行
#[derive(Debug, FromRow)]
struct UserRow {
   id:         String,
   first_name: String,
   last_name:  String,
   email:      String,
   phone:      Option<String>,
   address:    Option<String>,
   role:       String,
   created_at: DateTime<Utc>,
   updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
   type Error = InfraError;

   fn try_from(row: UserRow) -> Result<Self, Self::Error> {
      Ok(User::from_db(
         ObjectId::parse(&row.id).map_err(|e| InfraError::corrupt_data(e.to_string()))?,
         row.first_name,
         row.last_name,
         Email::new(row.email).map_err(|e| InfraError::corrupt_data(e.to_string()))?,
         row.phone,
         row.address,
         row.role
            .parse::<UserRole>()
            .map_err(|_| InfraError::corrupt_data(format!("不正なロール: {}", row.role)))?,
         row.created_at,
         row.updated_at,
      ))
   }
}

/// 書き込み時のエラーを変換する（email の一意制約違反を識別）
fn map_write_error(err: sqlx::Error) -> InfraError {
   let is_duplicate_email = err
      .as_database_error()
      .and_then(|db_err| db_err.constraint())
      .is_some_and(|constraint| constraint == EMAIL_UNIQUE_CONSTRAINT);

   if is_duplicate_email {
      InfraError::duplicate_key("User", "email")
   } else {
      InfraError::from(err)
   }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
   builder.push(" WHERE TRUE");
   if let Some(role) = filter.role {
      builder.push(" AND role = ").push_bind(role.to_string());
   }
   if let Some(search) = &filter.search {
      let pattern = format!("%{}%", escape_like(search));
      builder
         .push(" AND (first_name ILIKE ")
         .push_bind(pattern.clone())
         .push(" OR last_name ILIKE ")
         .push_bind(pattern.clone())
         .push(" OR email ILIKE ")
         .push_bind(pattern)
         .push(")");
   }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
   #[tracing::instrument(skip_all, level = "debug", fields(id = %user.id()))]
   async fn insert(&self, user: &User) -> Result<(), InfraError> {
      sqlx::query(
         r#"
            INSERT INTO users (
                id, first_name, last_name, email, phone, address, role, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
      )
      .bind(user.id().to_hex())
      .bind(user.first_name())
      .bind(user.last_name())
      .bind(user.email().as_str())
      .bind(user.phone())
      .bind(user.address())
      .bind(user.role().to_string())
      .bind(user.created_at())
      .bind(user.updated_at())
      .execute(&self.pool)
      .await
      .map_err(map_write_error)?;

      Ok(())
   }

   #[tracing::instrument(skip_all, level = "debug", fields(%id))]
   async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, InfraError> {
      let row: Option<UserRow> =
         sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;

      row.map(User::try_from).transpose()
   }

   #[tracing::instrument(skip_all, level = "debug", fields(count = ids.len()))]
   async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<User>, InfraError> {
      if ids.is_empty() {
         return Ok(Vec::new());
      }

      let ids: Vec<String> = ids.iter().map(ObjectId::to_hex).collect();
      let rows: Vec<UserRow> =
         sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

      rows.into_iter().map(User::try_from).collect()
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn find_all(&self, query: &ListQuery<UserFilter>) -> Result<Listing<User>, InfraError> {
      let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
      push_filter(&mut count, &query.filter);
      let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

      let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
      push_filter(&mut select, &query.filter);
      push_order_and_page(&mut select, &query.page);
      let rows: Vec<UserRow> = select.build_query_as().fetch_all(&self.pool).await?;

      let users = rows
         .into_iter()
         .map(User::try_from)
         .collect::<Result<Vec<_>, _>>()?;
      Ok(Listing::new(users, u64::try_from(total).unwrap_or_default()))
   }

   #[tracing::instrument(skip_all, level = "debug", fields(%id))]
   async fn update_by_id(
      &self,
      id: &ObjectId,
      patch: &UserPatch,
      now: DateTime<Utc>,
   ) -> Result<Option<User>, InfraError> {
      let row: Option<UserRow> = sqlx::query_as(&format!(
         r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                role = COALESCE($7, role),
                updated_at = $8
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
      ))
      .bind(id.to_hex())
      .bind(patch.first_name.as_deref())
      .bind(patch.last_name.as_deref())
      .bind(patch.email.as_ref().map(Email::as_str))
      .bind(patch.phone.as_deref())
      .bind(patch.address.as_deref())
      .bind(patch.role.map(|role| role.to_string()))
      .bind(now)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_write_error)?;

      row.map(User::try_from).transpose()
   }

   #[tracing::instrument(skip_all, level = "debug", fields(%id))]
   async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, InfraError> {
      let result = sqlx::query("DELETE FROM users WHERE id = $1")
         .bind(id.to_hex())
         .execute(&self.pool)
         .await?;

      Ok(result.rows_affected() > 0)
   }
}
