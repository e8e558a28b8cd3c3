//! # 認証ハンドラ
//!
//! GitHub OAuth によるログインと、Redis セッションの発行・破棄を行う。
//!
//! ## エンドポイント
//!
//! - `GET /login` - GitHub の認可画面へリダイレクト
//! - `GET /github/callback` - 認可コードを受け取りセッションを発行
//! - `GET /logout` - セッションを破棄
//! - `GET /me` - 現在の利用者情報
//!
//! ## CSRF 対策
//!
//! `/login` でランダムな `state` を生成して短命の Cookie に保存し、
//! コールバックで GitHub から戻された値と定数時間で比較する。

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use taskboard_infra::{SessionData, SessionManager, session::SESSION_TTL_SECONDS};
use taskboard_shared::ApiResponse;

use crate::{
    client::GitHubClient,
    error::CoreError,
    middleware::AuthContext,
};

/// セッション Cookie 名
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// OAuth state Cookie 名
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// OAuth state Cookie の有効期限（秒）
const OAUTH_STATE_MAX_AGE: i64 = 600;

/// 認証ハンドラの共有状態
pub struct AuthState {
    pub github_client:   Arc<dyn GitHubClient>,
    pub session_manager: Arc<dyn SessionManager>,
    /// Cookie に Secure 属性を付与するか（本番環境のみ）
    pub secure_cookies:  bool,
}

/// GitHub からのコールバックパラメータ
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code:  Option<String>,
    pub state: Option<String>,
    /// 利用者が認可を拒否した場合などに設定される
    pub error: Option<String>,
}

/// 現在の利用者情報
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeDto {
    pub github_id:  i64,
    pub login:      String,
    pub name:       Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&SessionData> for MeDto {
    fn from(session: &SessionData) -> Self {
        Self {
            github_id:  session.github_id(),
            login:      session.login().to_string(),
            name:       session.name().map(str::to_string),
            avatar_url: session.avatar_url().map(str::to_string),
        }
    }
}

// --- Cookie ヘルパー ---

fn build_cookie(
    name: &'static str,
    value: String,
    max_age_seconds: i64,
    secure: bool,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path("/")
        .max_age(time::Duration::seconds(max_age_seconds))
        .http_only(true)
        .same_site(SameSite::Lax);

    if secure {
        builder = builder.secure(true);
    }

    builder.build()
}

/// Cookie をクリアするための Cookie を構築する
fn build_clear_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    build_cookie(name, String::new(), 0, secure)
}

fn session_max_age() -> i64 {
    i64::try_from(SESSION_TTL_SECONDS).unwrap_or(i64::MAX)
}

/// 推測困難な state 値（16 バイトの乱数の16進表現）
fn generate_state() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

fn states_match(expected: &str, actual: &str) -> bool {
    expected.as_bytes().ct_eq(actual.as_bytes()).into()
}

// --- ハンドラ ---

/// GET /login
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), CoreError> {
    let oauth_state = generate_state();
    let authorize_url = state.github_client.authorize_url(&oauth_state)?;

    let jar = jar.add(build_cookie(
        OAUTH_STATE_COOKIE,
        oauth_state,
        OAUTH_STATE_MAX_AGE,
        state.secure_cookies,
    ));

    Ok((jar, Redirect::to(&authorize_url)))
}

/// GET /github/callback
#[tracing::instrument(skip_all)]
pub async fn github_callback(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect), CoreError> {
    if let Some(error) = query.error {
        return Err(CoreError::BadRequest(format!(
            "GitHub での認可が完了しませんでした: {error}"
        )));
    }

    let expected = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| CoreError::BadRequest("state Cookie がありません".to_string()))?;
    let actual = query
        .state
        .ok_or_else(|| CoreError::BadRequest("state パラメータがありません".to_string()))?;
    if !states_match(&expected, &actual) {
        tracing::warn!("OAuth state が一致しません");
        return Err(CoreError::BadRequest("state が一致しません".to_string()));
    }
    let code = query
        .code
        .ok_or_else(|| CoreError::BadRequest("code パラメータがありません".to_string()))?;

    let access_token = state.github_client.exchange_code(&code).await?;
    let profile = state.github_client.fetch_user(&access_token).await?;

    let session = SessionData::new(profile.id, profile.login, profile.name, profile.avatar_url);
    let session_id = state.session_manager.create(&session).await?;

    tracing::info!(github.login = %session.login(), "ログインしました");

    let jar = jar
        .add(build_cookie(
            SESSION_COOKIE_NAME,
            session_id,
            session_max_age(),
            state.secure_cookies,
        ))
        .add(build_clear_cookie(OAUTH_STATE_COOKIE, state.secure_cookies));

    Ok((jar, Redirect::to("/")))
}

/// GET /logout
///
/// セッションの削除に失敗しても Cookie はクリアする。
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<Arc<AuthState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME)
        && let Err(e) = state.session_manager.delete(cookie.value()).await
    {
        tracing::warn!("セッション削除に失敗（無視）: {}", e);
    }

    let jar = jar.add(build_clear_cookie(SESSION_COOKIE_NAME, state.secure_cookies));
    (jar, Redirect::to("/"))
}

/// GET /me
pub async fn me(
    Extension(context): Extension<AuthContext>,
) -> Result<Json<ApiResponse<MeDto>>, CoreError> {
    let session = context.session().ok_or(CoreError::Unauthenticated)?;
    Ok(Json(ApiResponse::new(MeDto::from(session))))
}
