//! # アプリケーション設定
//!
//! 環境変数からアプリケーション設定を読み込む。
//!
//! ## 環境変数一覧
//!
//! | 変数名 | 必須 | デフォルト | 説明 |
//! |--------|------|------------|------|
//! | `API_HOST` | No | `0.0.0.0` | バインドアドレス |
//! | `PORT` | No | `3000` | ポート番号 |
//! | `DATABASE_URL` | **Yes** | - | PostgreSQL 接続 URL |
//! | `REDIS_URL` | **Yes** | - | Redis 接続 URL（セッション保存先） |
//! | `GITHUB_CLIENT_ID` | **Yes** | - | GitHub OAuth App の Client ID |
//! | `GITHUB_CLIENT_SECRET` | **Yes** | - | GitHub OAuth App の Client Secret |
//! | `GITHUB_CALLBACK_URL` | **Yes** | - | GitHub に登録したコールバック URL |
//! | `ENV` | No | `development` | `production` で Cookie に Secure 属性を付与 |
//!
//! `LOG_FORMAT` はトレーシング初期化側（`taskboard_shared::observability`）で読む。

use std::env;

use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
   #[error("{0} が設定されていません")]
   Missing(&'static str),

   #[error("PORT は有効なポート番号である必要があります: {0}")]
   InvalidPort(String),
}

/// GitHub OAuth 設定
#[derive(Debug, Clone)]
pub struct GitHubConfig {
   pub client_id:     String,
   pub client_secret: String,
   pub callback_url:  String,
}

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
   /// バインドアドレス
   pub host:         String,
   /// ポート番号
   pub port:         u16,
   /// PostgreSQL 接続 URL
   pub database_url: String,
   /// Redis 接続 URL
   pub redis_url:    String,
   pub github:       GitHubConfig,
   /// 実行環境（`development`, `production` など）
   pub environment:  String,
}

impl ApiConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(|key| env::var(key).ok())
   }

   /// 任意の参照関数から設定を読み込む
   ///
   /// テストでプロセスの環境変数を書き換えずに済むよう分離している。
   pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
      let required = |key: &'static str| {
         lookup(key)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(key))
      };

      let port = match lookup("PORT") {
         Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
         None => 3000,
      };

      Ok(Self {
         host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
         port,
         database_url: required("DATABASE_URL")?,
         redis_url: required("REDIS_URL")?,
         github: GitHubConfig {
            client_id:     required("GITHUB_CLIENT_ID")?,
            client_secret: required("GITHUB_CLIENT_SECRET")?,
            callback_url:  required("GITHUB_CALLBACK_URL")?,
         },
         environment: lookup("ENV").unwrap_or_else(|| "development".to_string()),
      })
   }

   /// 本番環境か（Cookie の Secure 属性に使う）
   pub fn is_production(&self) -> bool {
      self.environment == "production"
   }
}
