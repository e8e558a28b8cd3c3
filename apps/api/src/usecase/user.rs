//! ユーザー管理ユースケース

use std::sync::Arc;

use taskboard_domain::{
    ObjectId,
    clock::Clock,
    query::{ListQuery, Listing, UserFilter},
    user::{User, UserDraft, UserPatch},
};
use taskboard_infra::repository::UserRepository;

use crate::error::CoreError;

const USER_NOT_FOUND: &str = "ユーザーが見つかりません";

/// ユーザー管理ユースケース
pub struct UserUseCaseImpl {
    user_repository: Arc<dyn UserRepository>,
    clock:           Arc<dyn Clock>,
}

impl UserUseCaseImpl {
    pub fn new(user_repository: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repository,
            clock,
        }
    }

    /// ユーザーを作成する
    ///
    /// メールアドレスの一意性はストアの一意制約で判定し、違反は `Conflict` になる。
    pub async fn create_user(&self, draft: UserDraft) -> Result<User, CoreError> {
        let user = User::new(ObjectId::new(), draft, self.clock.now());
        self.user_repository.insert(&user).await?;
        Ok(user)
    }

    pub async fn list_users(
        &self,
        query: &ListQuery<UserFilter>,
    ) -> Result<Listing<User>, CoreError> {
        Ok(self.user_repository.find_all(query).await?)
    }

    pub async fn get_user(&self, id: &ObjectId) -> Result<User, CoreError> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(USER_NOT_FOUND.to_string()))
    }

    /// 指定フィールドのみ更新し、`updated_at` を現在時刻にする
    pub async fn update_user(&self, id: &ObjectId, patch: UserPatch) -> Result<User, CoreError> {
        self.user_repository
            .update_by_id(id, &patch, self.clock.now())
            .await?
            .ok_or_else(|| CoreError::NotFound(USER_NOT_FOUND.to_string()))
    }

    /// ユーザーを削除する
    ///
    /// 担当タスクは削除しない（タスク側の参照はそのまま残る）。
    pub async fn delete_user(&self, id: &ObjectId) -> Result<(), CoreError> {
        if self.user_repository.delete_by_id(id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound(USER_NOT_FOUND.to_string()))
        }
    }
}
