//! タスク管理ユースケース
//!
//! 読み取り系（一覧・詳細）は `assigned_user` の参照先ユーザーを展開して返す。
//! 参照先が存在しない場合は展開せず、ID のまま返す。

use std::{collections::HashMap, sync::Arc};

use taskboard_domain::{
    ObjectId,
    clock::Clock,
    query::{ListQuery, Listing, TaskFilter},
    task::{Task, TaskDraft, TaskPatch},
    user::User,
};
use taskboard_infra::repository::{TaskRepository, UserRepository};

use crate::error::CoreError;

const TASK_NOT_FOUND: &str = "タスクが見つかりません";

/// 担当者を展開したタスク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWithAssignee {
    pub task:     Task,
    /// `task.assigned_user()` の参照先。未設定または参照先が存在しない場合は `None`
    pub assignee: Option<User>,
}

/// タスク管理ユースケース
pub struct TaskUseCaseImpl {
    task_repository: Arc<dyn TaskRepository>,
    user_repository: Arc<dyn UserRepository>,
    clock:           Arc<dyn Clock>,
}

impl TaskUseCaseImpl {
    pub fn new(
        task_repository: Arc<dyn TaskRepository>,
        user_repository: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            task_repository,
            user_repository,
            clock,
        }
    }

    /// タスクを作成する
    ///
    /// `assigned_user` の存在確認は行わない。
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, CoreError> {
        let task = Task::new(ObjectId::new(), draft, self.clock.now());
        self.task_repository.insert(&task).await?;
        Ok(task)
    }

    pub async fn list_tasks(
        &self,
        query: &ListQuery<TaskFilter>,
    ) -> Result<Listing<TaskWithAssignee>, CoreError> {
        let listing = self.task_repository.find_all(query).await?;
        let users = self.resolve_assignees(&listing.items).await?;

        Ok(listing.map(|task| {
            let assignee = task.assigned_user().and_then(|id| users.get(&id).cloned());
            TaskWithAssignee { task, assignee }
        }))
    }

    pub async fn get_task(&self, id: &ObjectId) -> Result<TaskWithAssignee, CoreError> {
        let task = self
            .task_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(TASK_NOT_FOUND.to_string()))?;

        let assignee = match task.assigned_user() {
            Some(user_id) => self.user_repository.find_by_id(&user_id).await?,
            None => None,
        };

        Ok(TaskWithAssignee { task, assignee })
    }

    /// 指定フィールドのみ更新し、`updated_at` を現在時刻にする
    pub async fn update_task(&self, id: &ObjectId, patch: TaskPatch) -> Result<Task, CoreError> {
        self.task_repository
            .update_by_id(id, &patch, self.clock.now())
            .await?
            .ok_or_else(|| CoreError::NotFound(TASK_NOT_FOUND.to_string()))
    }

    pub async fn delete_task(&self, id: &ObjectId) -> Result<(), CoreError> {
        if self.task_repository.delete_by_id(id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound(TASK_NOT_FOUND.to_string()))
        }
    }

    /// 担当者 ID を重複なく集めて一括取得する
    async fn resolve_assignees(
        &self,
        tasks: &[Task],
    ) -> Result<HashMap<ObjectId, User>, CoreError> {
        let mut ids: Vec<ObjectId> = tasks.iter().filter_map(Task::assigned_user).collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.user_repository.find_by_ids(&ids).await?;
        Ok(users.into_iter().map(|user| (user.id(), user)).collect())
    }
}
