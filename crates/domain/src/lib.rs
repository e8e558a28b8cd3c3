//! # Taskboard ドメイン層
//!
//! ユーザーとタスクのドメインモデル、および入力検証を定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子（[`ObjectId`]）を持つ [`user::User`] と [`task::Task`]
//! - **値オブジェクト**: 生成時に検証される不変オブジェクト（例: [`user::Email`]）
//! - **入力検証**: 型のない JSON を型付きの下書き（Draft）・差分（Patch）に変換する
//! - **ドメインエラー**: 検証失敗を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//!   ↘           ↗
//!     shared
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 現在時刻の抽象化
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`object_id`] - エンティティ識別子
//! - [`query`] - 一覧取得の絞り込み・ページング条件
//! - [`task`] - タスクエンティティ
//! - [`user`] - ユーザーエンティティ
//! - [`validation`] - リクエストボディ・クエリの検証
//!
//! ## 使用例
//!
//! ```rust
//! use taskboard_domain::{ObjectId, validation::validate_task_create};
//!
//! let draft = validate_task_create(&serde_json::json!({ "title": "買い物" })).unwrap();
//! assert_eq!(draft.title, "買い物");
//!
//! let id = ObjectId::new();
//! assert_eq!(id.to_string().len(), 24);
//! ```

pub mod clock;
pub mod error;
pub mod object_id;
pub mod query;
pub mod task;
pub mod user;
pub mod validation;

pub use error::DomainError;
pub use object_id::ObjectId;
