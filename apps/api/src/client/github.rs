//! # GitHub OAuth クライアント
//!
//! ログインフローで GitHub と通信する。
//!
//! ## エンドポイント
//!
//! - `GET https://github.com/login/oauth/authorize` - 認可画面（リダイレクト先）
//! - `POST https://github.com/login/oauth/access_token` - 認可コードをアクセストークンに交換
//! - `GET https://api.github.com/user` - 認証済みユーザーのプロフィール
//!
//! テスト時にスタブを使用できるようトレイトで定義する。

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::GitHubConfig;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_API_URL: &str = "https://api.github.com/user";

/// 要求するスコープ（公開プロフィールの読み取りのみ）
const SCOPE: &str = "read:user";

/// GitHub API は User-Agent ヘッダーを必須とする
const CLIENT_USER_AGENT: &str = concat!("taskboard/", env!("CARGO_PKG_VERSION"));

/// GitHub クライアントエラー
#[derive(Debug, Clone, Error)]
pub enum GitHubError {
   /// GitHub がリクエストを拒否した（認可コードの期限切れなど）
   #[error("GitHub がリクエストを拒否しました: {0}")]
   Rejected(String),

   /// ネットワークエラー
   #[error("ネットワークエラー: {0}")]
   Network(String),

   /// 予期しないエラー
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

impl From<reqwest::Error> for GitHubError {
   fn from(err: reqwest::Error) -> Self {
      if err.is_decode() {
         GitHubError::Unexpected(err.to_string())
      } else {
         GitHubError::Network(err.to_string())
      }
   }
}

/// GitHub ユーザーのプロフィール（`GET /user` の必要な項目のみ）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubUser {
   pub id:         i64,
   pub login:      String,
   pub name:       Option<String>,
   pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
   client_id:     &'a str,
   client_secret: &'a str,
   code:          &'a str,
   redirect_uri:  &'a str,
}

/// トークン交換の応答
///
/// 失敗時も 200 で `error` / `error_description` が返る。
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
   access_token:      Option<String>,
   error:             Option<String>,
   error_description: Option<String>,
}

/// GitHub クライアントトレイト
#[async_trait]
pub trait GitHubClient: Send + Sync {
   /// 認可画面の URL を組み立てる
   fn authorize_url(&self, state: &str) -> Result<String, GitHubError>;

   /// 認可コードをアクセストークンに交換する
   async fn exchange_code(&self, code: &str) -> Result<String, GitHubError>;

   /// アクセストークンでユーザープロフィールを取得する
   async fn fetch_user(&self, access_token: &str) -> Result<GitHubUser, GitHubError>;
}

/// reqwest による GitHub クライアント実装
pub struct GitHubClientImpl {
   config: GitHubConfig,
   client: reqwest::Client,
}

impl GitHubClientImpl {
   pub fn new(config: GitHubConfig) -> Self {
      Self {
         config,
         client: reqwest::Client::new(),
      }
   }
}

#[async_trait]
impl GitHubClient for GitHubClientImpl {
   fn authorize_url(&self, state: &str) -> Result<String, GitHubError> {
      let url = Url::parse_with_params(
         AUTHORIZE_URL,
         &[
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("scope", SCOPE),
            ("state", state),
         ],
      )
      .map_err(|e| GitHubError::Unexpected(e.to_string()))?;

      Ok(url.into())
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn exchange_code(&self, code: &str) -> Result<String, GitHubError> {
      let request = AccessTokenRequest {
         client_id:     &self.config.client_id,
         client_secret: &self.config.client_secret,
         code,
         redirect_uri:  &self.config.callback_url,
      };

      let response = self
         .client
         .post(ACCESS_TOKEN_URL)
         .header(ACCEPT, "application/json")
         .header(USER_AGENT, CLIENT_USER_AGENT)
         .json(&request)
         .send()
         .await?;

      let status = response.status();
      if !status.is_success() {
         let body = response.text().await.unwrap_or_default();
         return Err(GitHubError::Unexpected(format!("予期しないステータス {status}: {body}")));
      }

      let body = response.json::<AccessTokenResponse>().await?;
      match (body.access_token, body.error) {
         (Some(token), None) => Ok(token),
         (_, Some(error)) => Err(GitHubError::Rejected(
            body.error_description.unwrap_or(error),
         )),
         (None, None) => Err(GitHubError::Unexpected(
            "アクセストークンが含まれていません".to_string(),
         )),
      }
   }

   #[tracing::instrument(skip_all, level = "debug")]
   async fn fetch_user(&self, access_token: &str) -> Result<GitHubUser, GitHubError> {
      let response = self
         .client
         .get(USER_API_URL)
         .bearer_auth(access_token)
         .header(ACCEPT, "application/vnd.github+json")
         .header(USER_AGENT, CLIENT_USER_AGENT)
         .send()
         .await?;

      match response.status() {
         status if status.is_success() => Ok(response.json::<GitHubUser>().await?),
         reqwest::StatusCode::UNAUTHORIZED => Err(GitHubError::Rejected(
            "アクセストークンが無効です".to_string(),
         )),
         status => {
            let body = response.text().await.unwrap_or_default();
            Err(GitHubError::Unexpected(format!("予期しないステータス {status}: {body}")))
         }
      }
   }
}
