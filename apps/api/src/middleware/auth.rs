//! # 認証ミドルウェア
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::{from_fn, from_fn_with_state};
//!
//! Router::new()
//!     .merge(
//!         Router::new()
//!             .route("/users", post(create_user))
//!             .route_layer(from_fn(require_authenticated)),
//!     )
//!     .layer(from_fn_with_state(session_manager, resolve_auth_context))
//! ```
//!
//! [`resolve_auth_context`] は全リクエストで 1 回だけセッションを引き、
//! 結果を [`AuthContext`] としてリクエスト拡張に格納する。
//! [`require_authenticated`] はその値だけを見て判定し、自身は状態を持たない。

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use taskboard_infra::{SessionData, SessionManager};

use crate::{error::CoreError, handler::auth::SESSION_COOKIE_NAME};

/// リクエストごとの認証状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// セッションなし（Cookie なし・期限切れ・不明なセッション）
    Anonymous,
    /// 有効なセッションあり
    Authenticated {
        session_id: String,
        session:    SessionData,
    },
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated { .. })
    }

    pub fn session(&self) -> Option<&SessionData> {
        match self {
            AuthContext::Authenticated { session, .. } => Some(session),
            AuthContext::Anonymous => None,
        }
    }
}

/// セッション Cookie から [`AuthContext`] を解決し、リクエスト拡張に格納する
///
/// セッションストアの障害時は警告を出して `Anonymous` として扱う。
/// 参照系ルートはそのまま処理され、更新系ルートは認証ゲートで拒否される。
pub async fn resolve_auth_context(
    State(session_manager): State<Arc<dyn SessionManager>>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let context = match jar.get(SESSION_COOKIE_NAME) {
        Some(cookie) => {
            let session_id = cookie.value().to_string();
            match session_manager.get(&session_id).await {
                Ok(Some(session)) => AuthContext::Authenticated {
                    session_id,
                    session,
                },
                Ok(None) => AuthContext::Anonymous,
                Err(e) => {
                    tracing::warn!(
                        error.category = "infrastructure",
                        error.kind = "session",
                        "セッション取得に失敗したため未認証として扱います: {}",
                        e
                    );
                    AuthContext::Anonymous
                }
            }
        }
        None => AuthContext::Anonymous,
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// 認証ゲート
///
/// [`AuthContext`] が認証済みでなければ 401 を返し、ハンドラを実行しない。
pub async fn require_authenticated(request: Request<Body>, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated);

    if !authenticated {
        return CoreError::Unauthenticated.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        Extension,
        Router,
        http::{Method, StatusCode, header::COOKIE},
        middleware::{from_fn, from_fn_with_state},
        routing::{get, post},
    };
    use pretty_assertions::assert_eq;
    use taskboard_infra::InfraError;
    use tower::ServiceExt;

    use super::*;

    /// テスト用スタブ SessionManager
    ///
    /// `valid` と一致するセッション ID のみ有効とする。
    struct StubSessionManager {
        valid:   &'static str,
        failing: bool,
    }

    #[async_trait]
    impl SessionManager for StubSessionManager {
        async fn create(&self, _data: &SessionData) -> Result<String, InfraError> {
            Ok(self.valid.to_string())
        }

        async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
            if self.failing {
                return Err(InfraError::unexpected("redis down"));
            }
            Ok((session_id == self.valid).then(|| SessionData::new(1, "octocat", None, None)))
        }

        async fn delete(&self, _session_id: &str) -> Result<(), InfraError> {
            Ok(())
        }

        async fn get_ttl(&self, _session_id: &str) -> Result<Option<i64>, InfraError> {
            Ok(None)
        }
    }

    async fn whoami(Extension(context): Extension<AuthContext>) -> String {
        context
            .session()
            .map_or_else(|| "anonymous".to_string(), |s| s.login().to_string())
    }

    async fn dummy_handler() -> StatusCode {
        StatusCode::OK
    }

    fn app(failing: bool) -> Router {
        let session_manager: Arc<dyn SessionManager> = Arc::new(StubSessionManager {
            valid: "valid-session",
            failing,
        });
        Router::new()
            .route("/whoami", get(whoami))
            .merge(
                Router::new()
                    .route("/protected", post(dummy_handler))
                    .route_layer(from_fn(require_authenticated)),
            )
            .layer(from_fn_with_state(session_manager, resolve_auth_context))
    }

    fn request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session_id) = cookie {
            builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={session_id}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_有効なセッションでは認証済みコンテキストになる() {
        let response = app(false)
            .oneshot(request(Method::GET, "/whoami", Some("valid-session")))
            .await
            .unwrap();

        assert_eq!(body_text(response).await, "octocat");
    }

    #[tokio::test]
    async fn test_cookieなしや不明なセッションは未認証() {
        let without_cookie = app(false)
            .oneshot(request(Method::GET, "/whoami", None))
            .await
            .unwrap();
        let unknown = app(false)
            .oneshot(request(Method::GET, "/whoami", Some("unknown")))
            .await
            .unwrap();

        assert_eq!(body_text(without_cookie).await, "anonymous");
        assert_eq!(body_text(unknown).await, "anonymous");
    }

    #[tokio::test]
    async fn test_ゲートは未認証リクエストを401で拒否する() {
        let response = app(false)
            .oneshot(request(Method::POST, "/protected", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ゲートは認証済みリクエストを通す() {
        let response = app(false)
            .oneshot(request(Method::POST, "/protected", Some("valid-session")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_セッションストア障害時は参照は通り更新は拒否される() {
        let read = app(true)
            .oneshot(request(Method::GET, "/whoami", Some("valid-session")))
            .await
            .unwrap();
        let write = app(true)
            .oneshot(request(Method::POST, "/protected", Some("valid-session")))
            .await
            .unwrap();

        assert_eq!(read.status(), StatusCode::OK);
        assert_eq!(write.status(), StatusCode::UNAUTHORIZED);
    }
}
