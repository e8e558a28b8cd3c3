//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは入力検証とレスポンス整形のみを行い、処理はユースケース層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック（Liveness / Readiness）
//! - `auth`: GitHub ログイン・ログアウト・現在のユーザー
//! - `user`: ユーザー CRUD
//! - `task`: タスク CRUD

pub mod auth;
pub mod health;
pub mod task;
pub mod user;

pub use auth::{AuthState, github_callback, login, logout, me};
pub use health::{ReadinessState, health_check, readiness_check};
pub use task::{TaskState, create_task, delete_task, get_task, list_tasks, update_task};
pub use user::{UserState, create_user, delete_user, get_user, list_users, update_user};

use taskboard_domain::ObjectId;

use crate::error::CoreError;

/// `GET /`
pub async fn index() -> &'static str {
   "Taskboard API"
}

/// パスパラメータの識別子を解釈する
///
/// 形式不正は `NotFound` ではなく `InvalidIdentifier` として区別する。
pub(crate) fn parse_path_id(raw: &str) -> Result<ObjectId, CoreError> {
   Ok(ObjectId::parse(raw)?)
}
