//! # ドメイン層エラー定義
//!
//! 入力検証の失敗と識別子の不正を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | リクエストボディ・クエリの検証失敗 |
//! | `InvalidIdentifier` | 500 Internal Server Error | パスの ID が 24 桁の16進数でない |
//!
//! `InvalidIdentifier` は `NotFound` と区別できるよう専用のエラーコードで返す。
//!
//! ## 使用例
//!
//! ```rust
//! use taskboard_domain::DomainError;
//!
//! fn validate_title(title: &str) -> Result<(), DomainError> {
//!     if title.is_empty() {
//!         return Err(DomainError::Validation("\"title\" は空にできません".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// メッセージは最初に失敗したフィールドだけを説明する。
    /// フィールド名はダブルクォートで囲む（例: `"email" は必須です`）。
    #[error("{0}")]
    Validation(String),

    /// 識別子の形式が不正
    ///
    /// 24 桁の16進数として解釈できない文字列を受け取った場合に使用する。
    #[error("識別子の形式が不正です: {0}")]
    InvalidIdentifier(String),
}
