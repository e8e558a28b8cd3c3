//! # 外部 API クライアント
//!
//! - [`github`] - GitHub OAuth（認可 URL・トークン交換・プロフィール取得）

pub mod github;

pub use github::{GitHubClient, GitHubClientImpl, GitHubError, GitHubUser};
