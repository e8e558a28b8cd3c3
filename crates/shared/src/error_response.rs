//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - 形式は `{ "success": false, "error": "<メッセージ>", "code": "<種別>" }`
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換は API 側の責務（shared に axum 依存を入れない）
//! - HTTP ステータスはボディに含めず、レスポンスのステータスラインで表す

use serde::{Deserialize, Serialize};

/// エラーレスポンス
///
/// `code` はクライアントが機械的に判別するための種別文字列。
/// 同じステータス（例: 500）でも原因を区別できるようにする。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   pub success: bool,
   pub error:   String,
   pub code:    String,
}

impl ErrorResponse {
   /// 汎用コンストラクタ
   pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
      Self {
         success: false,
         error:   error.into(),
         code:    code.into(),
      }
   }

   /// 400 Validation Error
   pub fn validation_error(error: impl Into<String>) -> Self {
      Self::new("validation-error", error)
   }

   /// 400 Bad Request
   pub fn bad_request(error: impl Into<String>) -> Self {
      Self::new("bad-request", error)
   }

   /// 401 Unauthenticated
   pub fn unauthenticated() -> Self {
      Self::new("unauthenticated", "認証が必要です")
   }

   /// 404 Not Found
   pub fn not_found(error: impl Into<String>) -> Self {
      Self::new("not-found", error)
   }

   /// 重複エラー
   pub fn conflict(error: impl Into<String>) -> Self {
      Self::new("conflict", error)
   }

   /// 500 Internal Server Error
   ///
   /// メッセージは固定値（内部情報を漏らさないため）。
   pub fn internal_error() -> Self {
      Self::new("internal-error", "内部エラーが発生しました")
   }

   /// 502 Bad Gateway（外部サービス連携の失敗）
   pub fn upstream_error() -> Self {
      Self::new("upstream-error", "外部サービスとの通信に失敗しました")
   }
}
