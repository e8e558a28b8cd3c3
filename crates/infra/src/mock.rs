//! # テスト用モックリポジトリ
//!
//! ユースケース・ハンドラのテストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! taskboard-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 各モックは呼び出し回数を記録する。認証ゲートで拒否されたリクエストが
//! ストアに到達していないことの検証に使う。

use std::sync::{
   Arc,
   Mutex,
   atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taskboard_domain::{
   ObjectId,
   query::{ListQuery, Listing, Page, TaskFilter, UserFilter},
   task::{Task, TaskPatch},
   user::{User, UserPatch},
};

use crate::{
   error::InfraError,
   repository::{TaskRepository, UserRepository},
};

/// 呼び出し回数と失敗モードの共通状態
#[derive(Clone, Default)]
struct Probe {
   calls:   Arc<AtomicUsize>,
   failing: Arc<AtomicBool>,
}

impl Probe {
   fn hit(&self) -> Result<(), InfraError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.failing.load(Ordering::SeqCst) {
         return Err(InfraError::unexpected("mock store failure"));
      }
      Ok(())
   }
}

/// 作成日時 → ID の順に並べ、ページを切り出す
fn paginate<T>(
   mut items: Vec<T>,
   page: &Page,
   key: impl Fn(&T) -> (DateTime<Utc>, ObjectId),
) -> Listing<T> {
   items.sort_by_key(|item| key(item));
   let total = items.len() as u64;
   let items = match page.limit() {
      Some(limit) => items
         .into_iter()
         .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
         .take(limit as usize)
         .collect(),
      None => items,
   };
   Listing::new(items, total)
}

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
   users: Arc<Mutex<Vec<User>>>,
   probe: Probe,
}

impl MockUserRepository {
   pub fn new() -> Self {
      Self::default()
   }

   /// 常にエラーを返すモックを作成する
   pub fn failing() -> Self {
      let mock = Self::default();
      mock.probe.failing.store(true, Ordering::SeqCst);
      mock
   }

   pub fn add_user(&self, user: User) {
      self.users.lock().unwrap().push(user);
   }

   /// トレイトメソッドが呼ばれた回数
   pub fn call_count(&self) -> usize {
      self.probe.calls.load(Ordering::SeqCst)
   }

   pub fn snapshot(&self) -> Vec<User> {
      self.users.lock().unwrap().clone()
   }
}

#[async_trait]
impl UserRepository for MockUserRepository {
   async fn insert(&self, user: &User) -> Result<(), InfraError> {
      self.probe.hit()?;
      let mut users = self.users.lock().unwrap();
      if users.iter().any(|u| u.email() == user.email()) {
         return Err(InfraError::duplicate_key("User", "email"));
      }
      users.push(user.clone());
      Ok(())
   }

   async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, InfraError> {
      self.probe.hit()?;
      Ok(self
         .users
         .lock()
         .unwrap()
         .iter()
         .find(|u| u.id() == *id)
         .cloned())
   }

   async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<User>, InfraError> {
      self.probe.hit()?;
      Ok(self
         .users
         .lock()
         .unwrap()
         .iter()
         .filter(|u| ids.contains(&u.id()))
         .cloned()
         .collect())
   }

   async fn find_all(&self, query: &ListQuery<UserFilter>) -> Result<Listing<User>, InfraError> {
      self.probe.hit()?;
      let filter = &query.filter;
      let search = filter.search.as_ref().map(|s| s.to_lowercase());
      let matched = self
         .users
         .lock()
         .unwrap()
         .iter()
         .filter(|u| filter.role.is_none_or(|role| u.role() == role))
         .filter(|u| {
            search.as_ref().is_none_or(|s| {
               [u.first_name(), u.last_name(), u.email().as_str()]
                  .iter()
                  .any(|field| field.to_lowercase().contains(s.as_str()))
            })
         })
         .cloned()
         .collect();
      Ok(paginate(matched, &query.page, |u| (u.created_at(), u.id())))
   }

   async fn update_by_id(
      &self,
      id: &ObjectId,
      patch: &UserPatch,
      now: DateTime<Utc>,
   ) -> Result<Option<User>, InfraError> {
      self.probe.hit()?;
      let mut users = self.users.lock().unwrap();
      if let Some(email) = &patch.email
         && users.iter().any(|u| u.id() != *id && u.email() == email)
      {
         return Err(InfraError::duplicate_key("User", "email"));
      }
      let Some(pos) = users.iter().position(|u| u.id() == *id) else {
         return Ok(None);
      };
      let updated = users[pos].clone().with_patch(patch.clone(), now);
      users[pos] = updated.clone();
      Ok(Some(updated))
   }

   async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, InfraError> {
      self.probe.hit()?;
      let mut users = self.users.lock().unwrap();
      let before = users.len();
      users.retain(|u| u.id() != *id);
      Ok(users.len() < before)
   }
}

// ===== MockTaskRepository =====

#[derive(Clone, Default)]
pub struct MockTaskRepository {
   tasks: Arc<Mutex<Vec<Task>>>,
   probe: Probe,
}

impl MockTaskRepository {
   pub fn new() -> Self {
      Self::default()
   }

   /// 常にエラーを返すモックを作成する
   pub fn failing() -> Self {
      let mock = Self::default();
      mock.probe.failing.store(true, Ordering::SeqCst);
      mock
   }

   pub fn add_task(&self, task: Task) {
      self.tasks.lock().unwrap().push(task);
   }

   /// トレイトメソッドが呼ばれた回数
   pub fn call_count(&self) -> usize {
      self.probe.calls.load(Ordering::SeqCst)
   }

   pub fn snapshot(&self) -> Vec<Task> {
      self.tasks.lock().unwrap().clone()
   }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
   async fn insert(&self, task: &Task) -> Result<(), InfraError> {
      self.probe.hit()?;
      self.tasks.lock().unwrap().push(task.clone());
      Ok(())
   }

   async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Task>, InfraError> {
      self.probe.hit()?;
      Ok(self
         .tasks
         .lock()
         .unwrap()
         .iter()
         .find(|t| t.id() == *id)
         .cloned())
   }

   async fn find_all(&self, query: &ListQuery<TaskFilter>) -> Result<Listing<Task>, InfraError> {
      self.probe.hit()?;
      let filter = &query.filter;
      let matched = self
         .tasks
         .lock()
         .unwrap()
         .iter()
         .filter(|t| filter.completed.is_none_or(|c| t.is_completed() == c))
         .filter(|t| {
            filter
               .assigned_user
               .is_none_or(|user| t.assigned_user() == Some(user))
         })
         .cloned()
         .collect();
      Ok(paginate(matched, &query.page, |t| (t.created_at(), t.id())))
   }

   async fn update_by_id(
      &self,
      id: &ObjectId,
      patch: &TaskPatch,
      now: DateTime<Utc>,
   ) -> Result<Option<Task>, InfraError> {
      self.probe.hit()?;
      let mut tasks = self.tasks.lock().unwrap();
      let Some(pos) = tasks.iter().position(|t| t.id() == *id) else {
         return Ok(None);
      };
      let updated = tasks[pos].clone().with_patch(patch.clone(), now);
      tasks[pos] = updated.clone();
      Ok(Some(updated))
   }

   async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, InfraError> {
      self.probe.hit()?;
      let mut tasks = self.tasks.lock().unwrap();
      let before = tasks.len();
      tasks.retain(|t| t.id() != *id);
      Ok(tasks.len() < before)
   }
}

#[cfg(test)]
mod tests {
   use chrono::TimeZone;
   use pretty_assertions::assert_eq;
   use taskboard_domain::{
      task::TaskDraft,
      user::{Email, UserDraft},
   };

   use super::*;

   fn user(email: &str, at_secs: i64) -> User {
      let draft = UserDraft {
         first_name: "Ada".to_string(),
         last_name:  "Lovelace".to_string(),
         email:      Email::new(email).unwrap(),
         phone:      None,
         address:    None,
         role:       None,
      };
      User::new(
         ObjectId::new(),
         draft,
         Utc.timestamp_opt(at_secs, 0).unwrap(),
      )
   }

   #[tokio::test]
   async fn test_メールアドレスの重複はduplicate_key() {
      let repo = MockUserRepository::new();
      repo.insert(&user("ada@example.com", 0)).await.unwrap();

      let err = repo.insert(&user("ada@example.com", 1)).await.unwrap_err();

      assert_eq!(err.as_duplicate_key(), Some(("User", "email")));
   }

   #[tokio::test]
   async fn test_一覧は作成日時順にページングされる() {
      let repo = MockUserRepository::new();
      repo.add_user(user("c@example.com", 30));
      repo.add_user(user("a@example.com", 10));
      repo.add_user(user("b@example.com", 20));

      let listing = repo
         .find_all(&ListQuery {
            filter: UserFilter::default(),
            page:   Page::new(2, Some(1)),
         })
         .await
         .unwrap();

      assert_eq!(listing.total, 3);
      assert_eq!(listing.items.len(), 1);
      assert_eq!(listing.items[0].email().as_str(), "b@example.com");
   }

   #[tokio::test]
   async fn test_未設定の完了状態は未完了として絞り込まれる() {
      let repo = MockTaskRepository::new();
      let now = Utc::now();
      repo.add_task(Task::new(ObjectId::new(), TaskDraft::titled("a"), now));
      let mut done = TaskDraft::titled("b");
      done.completed = Some(true);
      repo.add_task(Task::new(ObjectId::new(), done, now));

      let listing = repo
         .find_all(&ListQuery {
            filter: TaskFilter {
               completed:     Some(false),
               assigned_user: None,
            },
            page:   Page::all(),
         })
         .await
         .unwrap();

      assert_eq!(listing.total, 1);
      assert_eq!(listing.items[0].title(), "a");
   }

   #[tokio::test]
   async fn test_失敗モードは呼び出しを記録してエラーを返す() {
      let repo = MockTaskRepository::failing();

      let result = repo.find_by_id(&ObjectId::new()).await;

      assert!(result.is_err());
      assert_eq!(repo.call_count(), 1);
   }
}
