//! # 一覧取得条件
//!
//! `GET /users` と `GET /tasks` の絞り込み・ページング条件。
//! クエリ文字列からの変換は [`crate::validation`] が担う。

use crate::{ObjectId, user::UserRole};

/// 1 ページあたりの最大件数
pub const MAX_LIMIT: u32 = 100;

/// ページング条件
///
/// `limit` が `None` の場合は全件を返す（`page` は無視される）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page:  u32,
    limit: Option<u32>,
}

impl Page {
    /// 全件取得
    pub fn all() -> Self {
        Self {
            page:  1,
            limit: None,
        }
    }

    /// `page` は 1 始まり。範囲は呼び出し元で検証済みであること。
    pub fn new(page: u32, limit: Option<u32>) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// 読み飛ばす件数
    pub fn offset(&self) -> u64 {
        match self.limit {
            Some(limit) => u64::from(self.page - 1) * u64::from(limit),
            None => 0,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::all()
    }
}

/// ユーザー一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role:   Option<UserRole>,
    /// 姓・名・メールアドレスの部分一致（大文字小文字を区別しない）
    pub search: Option<String>,
}

/// タスク一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// `Some(false)` は `completed` が未設定のタスクも含む
    pub completed:     Option<bool>,
    pub assigned_user: Option<ObjectId>,
}

/// 一覧取得条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery<F> {
    pub filter: F,
    pub page:   Page,
}

/// 一覧取得結果
///
/// `total` は絞り込み条件に一致した全件数（ページング前）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Page::all(), 0)]
    #[case(Page::new(1, Some(10)), 0)]
    #[case(Page::new(3, Some(10)), 20)]
    #[case(Page::new(0, Some(10)), 0)]
    fn test_offsetはページ番号と件数から計算される(#[case] page: Page, #[case] expected: u64) {
        assert_eq!(page.offset(), expected);
    }
}
