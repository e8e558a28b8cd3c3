//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するエンティティ生成ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use taskboard_domain::{
    ObjectId,
    task::{Task, TaskDraft},
    user::{Email, User, UserDraft, UserRole},
};

/// 秒単位のテスト用時刻
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// テスト用のユーザー入力
pub fn user_draft(first_name: &str, email: &str) -> UserDraft {
    UserDraft {
        first_name: first_name.to_string(),
        last_name:  "Tester".to_string(),
        email:      Email::new(email).unwrap(),
        phone:      None,
        address:    None,
        role:       None,
    }
}

/// 指定時刻に作成されたユーザー
pub fn user_at(first_name: &str, email: &str, secs: i64) -> User {
    User::new(ObjectId::new(), user_draft(first_name, email), at(secs))
}

/// 管理者ユーザー
pub fn admin_at(first_name: &str, email: &str, secs: i64) -> User {
    let mut draft = user_draft(first_name, email);
    draft.role = Some(UserRole::Admin);
    User::new(ObjectId::new(), draft, at(secs))
}

/// 指定時刻に作成されたタスク
pub fn task_at(title: &str, secs: i64) -> Task {
    Task::new(ObjectId::new(), TaskDraft::titled(title), at(secs))
}

/// 担当者と完了状態を指定したタスク
pub fn task_with(
    title: &str,
    assigned_user: Option<ObjectId>,
    completed: Option<bool>,
    secs: i64,
) -> Task {
    let mut draft = TaskDraft::titled(title);
    draft.assigned_user = assigned_user;
    draft.completed = completed;
    Task::new(ObjectId::new(), draft, at(secs))
}
