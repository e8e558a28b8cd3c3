//! # ミドルウェア
//!
//! - [`auth`] - セッション Cookie からの認証コンテキスト解決と、更新系ルートの認証ゲート

pub mod auth;

pub use auth::{AuthContext, require_authenticated, resolve_auth_context};
