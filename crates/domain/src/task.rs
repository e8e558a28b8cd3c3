//! # タスク
//!
//! タスクエンティティを定義する。
//!
//! `assigned_user` はユーザーの [`ObjectId`] を保持するだけの参照で、
//! 書き込み時に存在確認はしない。読み取り時の展開はユースケース層が担う。

use chrono::{DateTime, Utc};

use crate::ObjectId;

/// 作成用の検証済み入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
   pub title:         String,
   pub description:   Option<String>,
   pub due_date:      Option<DateTime<Utc>>,
   pub assigned_user: Option<ObjectId>,
   pub completed:     Option<bool>,
}

impl TaskDraft {
   /// タイトルのみの入力を作る
   pub fn titled(title: impl Into<String>) -> Self {
      Self {
         title:         title.into(),
         description:   None,
         due_date:      None,
         assigned_user: None,
         completed:     None,
      }
   }
}

/// 更新用の検証済み差分
///
/// `None` のフィールドは変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
   pub title:         Option<String>,
   pub description:   Option<String>,
   pub due_date:      Option<DateTime<Utc>>,
   pub assigned_user: Option<ObjectId>,
   pub completed:     Option<bool>,
}

/// タスクエンティティ
///
/// `completed` は未設定（`None`）を保持できる。未設定は「未完了」と同じ意味で扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
   id: ObjectId,
   title: String,
   description: Option<String>,
   due_date: Option<DateTime<Utc>>,
   assigned_user: Option<ObjectId>,
   completed: Option<bool>,
   created_at: DateTime<Utc>,
   updated_at: DateTime<Utc>,
}

impl Task {
   pub fn new(id: ObjectId, draft: TaskDraft, now: DateTime<Utc>) -> Self {
      Self {
         id,
         title: draft.title,
         description: draft.description,
         due_date: draft.due_date,
         assigned_user: draft.assigned_user,
         completed: draft.completed,
         created_at: now,
         updated_at: now,
      }
   }

   /// 既存のデータからタスクを復元する（データベースから取得時）
   #[allow(clippy::too_many_arguments)]
   pub fn from_db(
      id: ObjectId,
      title: String,
      description: Option<String>,
      due_date: Option<DateTime<Utc>>,
      assigned_user: Option<ObjectId>,
      completed: Option<bool>,
      created_at: DateTime<Utc>,
      updated_at: DateTime<Utc>,
   ) -> Self {
      Self {
         id,
         title,
         description,
         due_date,
         assigned_user,
         completed,
         created_at,
         updated_at,
      }
   }

   pub fn id(&self) -> ObjectId {
      self.id
   }

   pub fn title(&self) -> &str {
      &self.title
   }

   pub fn description(&self) -> Option<&str> {
      self.description.as_deref()
   }

   pub fn due_date(&self) -> Option<DateTime<Utc>> {
      self.due_date
   }

   pub fn assigned_user(&self) -> Option<ObjectId> {
      self.assigned_user
   }

   pub fn completed(&self) -> Option<bool> {
      self.completed
   }

   /// 完了済みか（未設定は未完了）
   pub fn is_completed(&self) -> bool {
      self.completed.unwrap_or(false)
   }

   pub fn created_at(&self) -> DateTime<Utc> {
      self.created_at
   }

   pub fn updated_at(&self) -> DateTime<Utc> {
      self.updated_at
   }

   /// 差分を適用した新しいインスタンスを返す
   pub fn with_patch(self, patch: TaskPatch, now: DateTime<Utc>) -> Self {
      Self {
         title: patch.title.unwrap_or(self.title),
         description: patch.description.or(self.description),
         due_date: patch.due_date.or(self.due_date),
         assigned_user: patch.assigned_user.or(self.assigned_user),
         completed: patch.completed.or(self.completed),
         updated_at: now,
         ..self
      }
   }
}
