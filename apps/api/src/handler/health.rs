//! # ヘルスチェックハンドラ
//!
//! - `/health` - Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` - Readiness Check（PostgreSQL / Redis の接続状態を確認）

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use taskboard_infra::{db, redis as infra_redis};
use taskboard_shared::{CheckStatus, HealthResponse, ReadinessResponse};

/// 各依存先チェックのタイムアウト
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn health_check() -> Json<HealthResponse> {
   Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check 用の State
pub struct ReadinessState {
   pub pool:       PgPool,
   pub redis_conn: ConnectionManager,
}

/// 全チェック OK → 200、1 つでも失敗 → 503
#[tracing::instrument(skip_all)]
pub async fn readiness_check(
   State(state): State<Arc<ReadinessState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
   let (database, redis) = tokio::join!(
      check("database", db::ping(&state.pool)),
      check("redis", infra_redis::ping(&state.redis_conn)),
   );

   let checks = HashMap::from([
      ("database".to_string(), database),
      ("redis".to_string(), redis),
   ]);
   let response = ReadinessResponse::from_checks(checks);
   let status = if response.is_ready() {
      StatusCode::OK
   } else {
      StatusCode::SERVICE_UNAVAILABLE
   };

   (status, Json(response))
}

async fn check<E: std::fmt::Display>(
   name: &'static str,
   probe: impl Future<Output = Result<(), E>>,
) -> CheckStatus {
   match tokio::time::timeout(CHECK_TIMEOUT, probe).await {
      Ok(Ok(())) => CheckStatus::Ok,
      Ok(Err(e)) => {
         tracing::warn!(error = %e, dependency = name, "readiness check failed");
         CheckStatus::Error
      }
      Err(_) => {
         tracing::warn!(dependency = name, "readiness check timed out");
         CheckStatus::Error
      }
   }
}
