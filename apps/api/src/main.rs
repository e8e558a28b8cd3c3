//! # Taskboard API サーバー
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p taskboard-api
//!
//! # 本番環境
//! ENV=production DATABASE_URL=postgres://... REDIS_URL=redis://... cargo run -p taskboard-api --release
//! ```
//!
//! 環境変数の一覧は [`taskboard_api::config`] を参照。

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use taskboard_api::{
    app_builder::{AppDependencies, build_app},
    client::GitHubClientImpl,
    config::ApiConfig,
    handler::ReadinessState,
};
use taskboard_domain::clock::SystemClock;
use taskboard_infra::{
    RedisSessionManager,
    db,
    redis,
    repository::{PostgresTaskRepository, PostgresUserRepository},
};
use taskboard_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("taskboard-api"));
    let _tracing_guard = tracing::info_span!("app", service = "taskboard-api").entered();

    let config = ApiConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Taskboard API サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    db::run_migrations(&pool)
        .await
        .context("マイグレーションの実行に失敗しました")?;
    tracing::info!("マイグレーションを適用しました");

    let redis_conn = redis::create_connection_manager(&config.redis_url)
        .await
        .context("Redis 接続に失敗しました")?;
    tracing::info!("Redis に接続しました");

    // Readiness Check 用 State（pool / redis_conn が move される前に clone）
    let readiness_state = Arc::new(ReadinessState {
        pool:       pool.clone(),
        redis_conn: redis_conn.clone(),
    });

    let deps = AppDependencies {
        user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
        task_repository: Arc::new(PostgresTaskRepository::new(pool)),
        session_manager: Arc::new(RedisSessionManager::new(redis_conn)),
        github_client:   Arc::new(GitHubClientImpl::new(config.github.clone())),
        clock:           Arc::new(SystemClock),
        secure_cookies:  config.is_production(),
    };
    let app = build_app(deps, Some(readiness_state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Taskboard API サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
