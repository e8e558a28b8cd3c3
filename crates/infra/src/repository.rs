//! # リポジトリ
//!
//! エンティティごとの永続化トレイトと PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **トレイト経由の依存**: ユースケース層は `Arc<dyn XRepository>` だけを保持する
//! - **部分更新は 1 クエリ**: `update_by_id` は `COALESCE` で指定フィールドだけを書き換え、
//!   `RETURNING` で更新後の行を返す
//! - **実行時クエリ**: 絞り込み条件が可変のため `sqlx::QueryBuilder` を使う

pub mod task_repository;
pub mod user_repository;

use sqlx::{Postgres, QueryBuilder};
pub use task_repository::{PostgresTaskRepository, TaskRepository};
use taskboard_domain::query::Page;
pub use user_repository::{PostgresUserRepository, UserRepository};

/// `LIKE` / `ILIKE` のパターン用に `%` `_` `\` をエスケープする
pub(crate) fn escape_like(value: &str) -> String {
   let mut escaped = String::with_capacity(value.len());
   for c in value.chars() {
      if matches!(c, '%' | '_' | '\\') {
         escaped.push('\\');
      }
      escaped.push(c);
   }
   escaped
}

/// 並び順とページングを付与する
///
/// 並び順は作成日時の昇順、同時刻は ID 順。
pub(crate) fn push_order_and_page(builder: &mut QueryBuilder<'_, Postgres>, page: &Page) {
   builder.push(" ORDER BY created_at ASC, id ASC");
   if let Some(limit) = page.limit() {
      builder.push(" LIMIT ").push_bind(i64::from(limit));
      builder
         .push(" OFFSET ")
         .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
   }
}
