//! # API レスポンスエンベロープ
//!
//! 成功レスポンスの統一形式を提供する。
//!
//! - 単体: `{ "success": true, "data": T }`
//! - 一覧: `{ "success": true, "count": n, "total": m, "data": [T] }`
//!
//! 失敗時の形式は [`ErrorResponse`](crate::ErrorResponse) を参照。

use serde::{Deserialize, Serialize};

/// 単体リソースのレスポンス型
///
/// ## 使用例
///
/// ```
/// use taskboard_shared::ApiResponse;
///
/// let response = ApiResponse::new("hello");
/// assert!(response.success);
/// assert_eq!(response.data, "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data:    T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// 一覧レスポンス型
///
/// `count` は今回返した件数、`total` はフィルタ条件に一致した全件数。
/// ページングしない場合は両者が一致する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count:   usize,
    pub total:   u64,
    pub data:    Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, total: u64) -> Self {
        Self {
            success: true,
            count: data.len(),
            total,
            data,
        }
    }
}
