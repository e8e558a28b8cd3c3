//! ルーター統合テスト用のヘルパー
//!
//! リポジトリは `taskboard_infra::mock` のインメモリ実装、
//! セッションと GitHub はこのモジュールのスタブを使う。

#![allow(dead_code)]

use std::{
   collections::HashMap,
   sync::{
      Arc,
      Mutex,
      atomic::{AtomicUsize, Ordering},
   },
};

use async_trait::async_trait;
use axum::{
   Router,
   body::{Body, to_bytes},
   http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use taskboard_api::{
   app_builder::{AppDependencies, build_app},
   client::{GitHubClient, GitHubError, GitHubUser},
};
use taskboard_domain::clock::FixedClock;
use taskboard_infra::{
   InfraError,
   SessionData,
   SessionManager,
   mock::{MockTaskRepository, MockUserRepository},
   session::SESSION_TTL_SECONDS,
};
use tower::ServiceExt;

/// スタブが受け付ける認可コード
pub const VALID_CODE: &str = "valid-code";

pub fn base_time() -> DateTime<Utc> {
   Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

// --- セッションスタブ ---

/// インメモリのセッションマネージャ
#[derive(Clone, Default)]
pub struct InMemorySessionManager {
   sessions: Arc<Mutex<HashMap<String, SessionData>>>,
   next_id:  Arc<AtomicUsize>,
   failing:  bool,
}

impl InMemorySessionManager {
   /// 常にエラーを返すセッションマネージャ
   pub fn failing() -> Self {
      Self {
         failing: true,
         ..Self::default()
      }
   }

   pub fn contains(&self, session_id: &str) -> bool {
      self.sessions.lock().unwrap().contains_key(session_id)
   }

   fn check(&self) -> Result<(), InfraError> {
      if self.failing {
         return Err(InfraError::unexpected("session store unavailable"));
      }
      Ok(())
   }
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
   async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
      self.check()?;
      let n = self.next_id.fetch_add(1, Ordering::SeqCst);
      let session_id = format!("session-{n}");
      self.sessions
         .lock()
         .unwrap()
         .insert(session_id.clone(), data.clone());
      Ok(session_id)
   }

   async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
      self.check()?;
      Ok(self.sessions.lock().unwrap().get(session_id).cloned())
   }

   async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
      self.check()?;
      self.sessions.lock().unwrap().remove(session_id);
      Ok(())
   }

   async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError> {
      self.check()?;
      Ok(self
         .contains(session_id)
         .then(|| i64::try_from(SESSION_TTL_SECONDS).unwrap()))
   }
}

// --- GitHub スタブ ---

/// [`VALID_CODE`] のみ受け付ける GitHub クライアント
pub struct StubGitHubClient;

#[async_trait]
impl GitHubClient for StubGitHubClient {
   fn authorize_url(&self, state: &str) -> Result<String, GitHubError> {
      Ok(format!(
         "https://github.com/login/oauth/authorize?client_id=test&state={state}"
      ))
   }

   async fn exchange_code(&self, code: &str) -> Result<String, GitHubError> {
      if code == VALID_CODE {
         Ok("gho_test_token".to_string())
      } else {
         Err(GitHubError::Rejected("bad_verification_code".to_string()))
      }
   }

   async fn fetch_user(&self, _access_token: &str) -> Result<GitHubUser, GitHubError> {
      Ok(GitHubUser {
         id:         583231,
         login:      "octocat".to_string(),
         name:       Some("The Octocat".to_string()),
         avatar_url: None,
      })
   }
}

// --- テスト用アプリケーション ---

pub struct TestApp {
   pub router:   Router,
   pub users:    MockUserRepository,
   pub tasks:    MockTaskRepository,
   pub sessions: InMemorySessionManager,
   pub clock:    Arc<FixedClock>,
}

/// レスポンスのステータス・ヘッダー・JSON ボディ
pub struct TestResponse {
   pub status:  StatusCode,
   pub headers: HeaderMap,
   /// ボディが空の場合は `Value::Null`
   pub body:    Value,
}

impl TestResponse {
   /// `Set-Cookie` ヘッダーをすべて返す
   pub fn set_cookies(&self) -> Vec<String> {
      self.headers
         .get_all(header::SET_COOKIE)
         .iter()
         .map(|value| value.to_str().unwrap().to_string())
         .collect()
   }

   /// 指定した名前の `Set-Cookie` の値部分
   pub fn cookie_value(&self, name: &str) -> Option<String> {
      let prefix = format!("{name}=");
      self.set_cookies().into_iter().find_map(|cookie| {
         cookie
            .strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
      })
   }

   pub fn location(&self) -> Option<&str> {
      self.headers
         .get(header::LOCATION)
         .map(|value| value.to_str().unwrap())
   }
}

impl Default for TestApp {
   fn default() -> Self {
      Self::build(
         MockUserRepository::new(),
         MockTaskRepository::new(),
         InMemorySessionManager::default(),
      )
   }
}

impl TestApp {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn build(
      users: MockUserRepository,
      tasks: MockTaskRepository,
      sessions: InMemorySessionManager,
   ) -> Self {
      let clock = Arc::new(FixedClock::new(base_time()));
      let deps = AppDependencies {
         user_repository: Arc::new(users.clone()),
         task_repository: Arc::new(tasks.clone()),
         session_manager: Arc::new(sessions.clone()),
         github_client:   Arc::new(StubGitHubClient),
         clock:           clock.clone(),
         secure_cookies:  false,
      };

      Self {
         router: build_app(deps, None),
         users,
         tasks,
         sessions,
         clock,
      }
   }

   /// セッションを直接作成し、`Cookie` ヘッダーの値を返す
   pub async fn login(&self) -> String {
      let session = SessionData::new(583231, "octocat", None, None);
      let session_id = self.sessions.create(&session).await.unwrap();
      format!("session_id={session_id}")
   }

   pub async fn send(&self, request: Request<Body>) -> TestResponse {
      let response = self.router.clone().oneshot(request).await.unwrap();
      let status = response.status();
      let headers = response.headers().clone();
      let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      let body = if bytes.is_empty() {
         Value::Null
      } else {
         serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
         })
      };

      TestResponse {
         status,
         headers,
         body,
      }
   }

   pub async fn get(&self, uri: &str) -> TestResponse {
      self.send(request(Method::GET, uri, None, None)).await
   }

   /// セッションなしで JSON リクエストを送る
   pub async fn anonymous(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
      self.send(request(method, uri, body, None)).await
   }

   /// ログイン済みで JSON リクエストを送る
   pub async fn authed(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
      let cookie = self.login().await;
      self.send(request(method, uri, body, Some(&cookie))).await
   }
}

pub fn request(
   method: Method,
   uri: &str,
   body: Option<Value>,
   cookie: Option<&str>,
) -> Request<Body> {
   let mut builder = Request::builder().method(method).uri(uri);
   if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
   }
   match body {
      Some(body) => builder
         .header(header::CONTENT_TYPE, "application/json")
         .body(Body::from(body.to_string()))
         .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
   }
}
