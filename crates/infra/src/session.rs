//! # セッション管理
//!
//! Redis を使用したログインセッションの管理を提供する。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `session:{session_id}` | SessionData (JSON) | 28800秒（8時間） |
//!
//! セッションは GitHub ログイン成功時に作成され、ログアウトまたは TTL 経過で削除される。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::InfraError;

/// セッションの有効期限（秒）
pub const SESSION_TTL_SECONDS: u64 = 28800;

/// セッションデータ
///
/// Redis に JSON 形式で保存される、GitHub で認証済みの利用者情報。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
   github_id:  i64,
   login:      String,
   name:       Option<String>,
   avatar_url: Option<String>,
   created_at: DateTime<Utc>,
}

impl SessionData {
   /// 新しいセッションデータを作成する
   ///
   /// `created_at` は現在時刻で初期化される。
   pub fn new(
      github_id: i64,
      login: impl Into<String>,
      name: Option<String>,
      avatar_url: Option<String>,
   ) -> Self {
      Self {
         github_id,
         login: login.into(),
         name,
         avatar_url,
         created_at: Utc::now(),
      }
   }

   pub fn github_id(&self) -> i64 {
      self.github_id
   }

   pub fn login(&self) -> &str {
      &self.login
   }

   pub fn name(&self) -> Option<&str> {
      self.name.as_deref()
   }

   pub fn avatar_url(&self) -> Option<&str> {
      self.avatar_url.as_deref()
   }

   pub fn created_at(&self) -> DateTime<Utc> {
      self.created_at
   }
}

/// セッション管理トレイト
///
/// 実装は Redis を使用する [`RedisSessionManager`] を参照。
#[async_trait]
pub trait SessionManager: Send + Sync {
   /// セッションを作成し、セッション ID（UUID v4）を返す
   async fn create(&self, data: &SessionData) -> Result<String, InfraError>;

   /// セッションを取得する
   ///
   /// 存在しない・期限切れの場合は `None`。
   async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError>;

   /// セッションを削除する
   ///
   /// 存在しないセッションを削除しても成功とする。
   async fn delete(&self, session_id: &str) -> Result<(), InfraError>;

   /// セッションの TTL（残り秒数）を取得する
   async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError>;
}

/// Redis を使用したセッションマネージャ
#[derive(Clone)]
pub struct RedisSessionManager {
   conn: ConnectionManager,
}

impl RedisSessionManager {
   /// 共有の `ConnectionManager` からセッションマネージャを作成する
   pub fn new(conn: ConnectionManager) -> Self {
      Self { conn }
   }

   fn session_key(session_id: &str) -> String {
      format!("session:{session_id}")
   }
}

#[async_trait]
impl SessionManager for RedisSessionManager {
   #[tracing::instrument(skip_all, level = "debug")]
   async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
      // UUID v4 でセッション ID を生成（推測困難なランダム値）
      let session_id = Uuid::new_v4().to_string();
      let key = Self::session_key(&session_id);
      let json = serde_json::to_string(data)?;

      let mut conn = self.conn.clone();
      let _: () = conn.set_ex(&key, json, SESSION_TTL_SECONDS).await?;

      Ok(session_id)
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
      let key = Self::session_key(session_id);
      let mut conn = self.conn.clone();

      let result: Option<String> = conn.get(&key).await?;

      match result {
         Some(json) => Ok(Some(serde_json::from_str(&json)?)),
         None => Ok(None),
      }
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
      let key = Self::session_key(session_id);
      let mut conn = self.conn.clone();
      let _: () = conn.del(&key).await?;
      Ok(())
   }

   async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError> {
      let key = Self::session_key(session_id);
      let mut conn = self.conn.clone();
      let ttl: i64 = conn.ttl(&key).await?;

      // -2: キーが存在しない、-1: TTL なし
      if ttl < 0 { Ok(None) } else { Ok(Some(ttl)) }
   }
}
