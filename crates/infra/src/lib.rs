//! # Taskboard インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とマイグレーション
//! - **セッション**: Redis に保存するログインセッションの管理
//! - **リポジトリ実装**: ユーザー・タスクの永続化
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ユースケース層はリポジトリトレイトにのみ依存し、PostgreSQL の詳細を知らない。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`redis`] - Redis 接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトと PostgreSQL 実装
//! - [`session`] - セッション管理
//! - `mock` - テスト用インメモリリポジトリ（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use taskboard_infra::{db, redis, repository::PostgresUserRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/taskboard").await?;
//!     db::run_migrations(&pool).await?;
//!     let users = PostgresUserRepository::new(pool);
//!
//!     let redis = redis::create_connection_manager("redis://localhost").await?;
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod redis;
pub mod repository;
pub mod session;

pub use error::{InfraError, InfraErrorKind};
pub use session::{RedisSessionManager, SessionData, SessionManager};
