//! # API エラー定義
//!
//! ハンドラが返すエラーと、HTTP レスポンスへの変換を定義する。
//!
//! ## エラーの階層
//!
//! ```text
//! DomainError (検証失敗・識別子不正)  ─┐
//! InfraError  (ストア障害・一意制約)  ─┼─▶ CoreError ──IntoResponse──▶ StatusCode + ErrorResponse
//! JsonRejection (ボディ不正)         ─┘
//! ```
//!
//! | バリアント | ステータス | code |
//! |-----------|-----------|------|
//! | `Validation` | 400 | `validation-error` |
//! | `BadRequest` | 400 | `bad-request` |
//! | `Conflict` | 400 | `conflict` |
//! | `Unauthenticated` | 401 | `unauthenticated` |
//! | `NotFound` | 404 | `not-found` |
//! | `InvalidIdentifier` | 500 | `invalid-identifier` |
//! | `Store` | 500 | `internal-error` |
//! | `Upstream` | 502 | `upstream-error` |

use axum::{
   Json,
   extract::rejection::JsonRejection,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use taskboard_domain::DomainError;
use taskboard_infra::{InfraError, InfraErrorKind};
use taskboard_shared::ErrorResponse;
use thiserror::Error;

use crate::client::GitHubError;

/// API 層で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
   /// 入力検証の失敗（最初に失敗したフィールドのメッセージ）
   #[error("{0}")]
   Validation(String),

   /// 検証以外の不正なリクエスト（OAuth コールバックのパラメータ不足など）
   #[error("{0}")]
   BadRequest(String),

   /// 一意制約違反
   #[error("{0}")]
   Conflict(String),

   #[error("認証が必要です")]
   Unauthenticated,

   #[error("{0}")]
   NotFound(String),

   /// パスパラメータの識別子が不正
   #[error("{0}")]
   InvalidIdentifier(String),

   /// 永続化層の障害
   #[error("ストアエラー: {0}")]
   Store(InfraError),

   /// GitHub との通信失敗
   #[error("外部サービスエラー: {0}")]
   Upstream(String),
}

impl From<DomainError> for CoreError {
   fn from(err: DomainError) -> Self {
      match err {
         DomainError::Validation(msg) => CoreError::Validation(msg),
         e @ DomainError::InvalidIdentifier(_) => CoreError::InvalidIdentifier(e.to_string()),
      }
   }
}

impl From<InfraError> for CoreError {
   fn from(err: InfraError) -> Self {
      match err.as_duplicate_key() {
         Some((_, field)) => CoreError::Conflict(format!("\"{field}\" は既に使用されています")),
         None => CoreError::Store(err),
      }
   }
}

impl From<GitHubError> for CoreError {
   fn from(err: GitHubError) -> Self {
      CoreError::Upstream(err.to_string())
   }
}

impl From<JsonRejection> for CoreError {
   fn from(rejection: JsonRejection) -> Self {
      tracing::debug!(error = %rejection, "リクエストボディを JSON として解釈できません");
      CoreError::Validation("リクエストボディは有効な JSON である必要があります".to_string())
   }
}

impl IntoResponse for CoreError {
   fn into_response(self) -> Response {
      let (status, body) = match self {
         CoreError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, ErrorResponse::validation_error(msg))
         }
         CoreError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg)),
         CoreError::Conflict(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::conflict(msg)),
         CoreError::Unauthenticated => (StatusCode::UNAUTHORIZED, ErrorResponse::unauthenticated()),
         CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
         CoreError::InvalidIdentifier(msg) => {
            tracing::error!(
               error.category = "request",
               error.kind = "invalid_identifier",
               "{}",
               msg
            );
            (
               StatusCode::INTERNAL_SERVER_ERROR,
               ErrorResponse::new("invalid-identifier", msg),
            )
         }
         CoreError::Store(err) => {
            let kind = match err.kind() {
               InfraErrorKind::Database(_) => "database",
               InfraErrorKind::Redis(_) => "redis",
               InfraErrorKind::Serialization(_) => "serialization",
               InfraErrorKind::DuplicateKey { .. } => "duplicate_key",
               InfraErrorKind::CorruptData(_) => "corrupt_data",
               InfraErrorKind::Unexpected(_) => "unexpected",
            };
            tracing::error!(
               error.category = "infrastructure",
               error.kind = kind,
               "{}\n{}",
               err,
               err.span_trace()
            );
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal_error())
         }
         CoreError::Upstream(msg) => {
            tracing::error!(
               error.category = "external_service",
               error.kind = "github",
               "{}",
               msg
            );
            (StatusCode::BAD_GATEWAY, ErrorResponse::upstream_error())
         }
      };

      (status, Json(body)).into_response()
   }
}
