//! # Redis 接続管理
//!
//! セッション管理と Readiness Check で共有する `ConnectionManager` を作成する。
//! `ConnectionManager` は切断時に自動で再接続し、clone して使い回せる。

use ::redis::{Client, aio::ConnectionManager};

use crate::InfraError;

/// Redis 接続マネージャを作成する
///
/// # 引数
///
/// - `redis_url`: Redis 接続 URL（例: `redis://localhost:6379`）
pub async fn create_connection_manager(redis_url: &str) -> Result<ConnectionManager, InfraError> {
    let client = Client::open(redis_url)?;
    let conn = ConnectionManager::new(client).await?;
    Ok(conn)
}

/// 接続確認（Readiness Check 用）
pub async fn ping(conn: &ConnectionManager) -> Result<(), InfraError> {
    let mut conn = conn.clone();
    let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
}
