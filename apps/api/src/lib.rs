//! # Taskboard API サーバー
//!
//! ユーザーとタスクの CRUD を提供する REST API。
//! 更新系エンドポイントは GitHub OAuth でログインした利用者のみ呼び出せる。
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────┐     ┌─────────────────────────────┐     ┌──────────────┐
//! │  Client  │────▶│  handler → usecase → repo   │────▶│  PostgreSQL  │
//! └──────────┘     └─────────────────────────────┘     └──────────────┘
//!                         │               │
//!                         ▼               ▼
//!                   ┌──────────┐    ┌──────────┐
//!                   │  Redis   │    │  GitHub  │
//!                   │(session) │    │ (OAuth)  │
//!                   └──────────┘    └──────────┘
//! ```
//!
//! ## モジュール構成
//!
//! - [`app_builder`] - State の組み立てとルーター構築
//! - [`client`] - GitHub OAuth クライアント
//! - [`config`] - アプリケーション設定（環境変数からの読み込み）
//! - [`error`] - API エラー定義と HTTP レスポンスへの変換
//! - [`handler`] - HTTP リクエストハンドラ
//! - [`middleware`] - 認証状態の解決と認証ゲート
//! - [`usecase`] - ユーザー・タスクのユースケース
//!
//! ## 依存関係
//!
//! - `taskboard_domain`: エンティティ、識別子、入力検証
//! - `taskboard_infra`: リポジトリ、セッション、データベース・Redis 接続
//! - `taskboard_shared`: レスポンス型、トレーシング初期化

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;
