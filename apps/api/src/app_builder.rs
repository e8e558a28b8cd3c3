//! # アプリケーション構築
//!
//! ユースケース・State の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! ## ルーティング
//!
//! | メソッド | パス | 認証 |
//! |---------|------|------|
//! | GET | `/users`, `/users/{id}`, `/tasks`, `/tasks/{id}` | 不要 |
//! | POST | `/users`, `/tasks` | 必要 |
//! | PUT / DELETE | `/users/{id}`, `/tasks/{id}` | 必要 |
//!
//! 認証が必要なルートは [`require_authenticated`] を `route_layer` で適用したルーターに
//! まとめ、同じパスの参照系ルーターとマージする。

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use taskboard_domain::clock::Clock;
use taskboard_infra::{
    SessionManager,
    repository::{TaskRepository, UserRepository},
};
use taskboard_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    client::GitHubClient,
    handler::{
        AuthState,
        ReadinessState,
        TaskState,
        UserState,
        create_task,
        create_user,
        delete_task,
        delete_user,
        get_task,
        get_user,
        github_callback,
        health_check,
        index,
        list_tasks,
        list_users,
        login,
        logout,
        me,
        readiness_check,
        update_task,
        update_user,
    },
    middleware::{require_authenticated, resolve_auth_context},
    usecase::{TaskUseCaseImpl, UserUseCaseImpl},
};

/// ルーター構築に必要な依存
///
/// インフラ初期化済みのトレイトオブジェクトを受け取る。
/// テストではモックリポジトリやスタブを渡す。
#[derive(Clone)]
pub struct AppDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub task_repository: Arc<dyn TaskRepository>,
    pub session_manager: Arc<dyn SessionManager>,
    pub github_client:   Arc<dyn GitHubClient>,
    pub clock:           Arc<dyn Clock>,
    /// Cookie に Secure 属性を付与するか
    pub secure_cookies:  bool,
}

/// ルーターを構築する
///
/// `readiness` が `None` の場合は `/health/ready` を登録しない。
pub fn build_app(deps: AppDependencies, readiness: Option<Arc<ReadinessState>>) -> Router {
    let user_state = Arc::new(UserState {
        usecase: UserUseCaseImpl::new(deps.user_repository.clone(), deps.clock.clone()),
    });
    let task_state = Arc::new(TaskState {
        usecase: TaskUseCaseImpl::new(deps.task_repository, deps.user_repository, deps.clock),
    });
    let auth_state = Arc::new(AuthState {
        github_client:   deps.github_client,
        session_manager: deps.session_manager.clone(),
        secure_cookies:  deps.secure_cookies,
    });

    let mut router = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check));

    if let Some(readiness_state) = readiness {
        router = router.merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        );
    }

    router
        // 認証
        .merge(
            Router::new()
                .route("/login", get(login))
                .route("/github/callback", get(github_callback))
                .route("/logout", get(logout))
                .with_state(auth_state),
        )
        .route("/me", get(me))
        // ユーザー API
        .merge(
            Router::new()
                .route("/users", get(list_users))
                .route("/users/{id}", get(get_user))
                .with_state(user_state.clone()),
        )
        .merge(
            Router::new()
                .route("/users", post(create_user))
                .route(
                    "/users/{id}",
                    put(update_user).delete(delete_user),
                )
                .route_layer(from_fn(require_authenticated))
                .with_state(user_state),
        )
        // タスク API
        .merge(
            Router::new()
                .route("/tasks", get(list_tasks))
                .route("/tasks/{id}", get(get_task))
                .with_state(task_state.clone()),
        )
        .merge(
            Router::new()
                .route("/tasks", post(create_task))
                .route(
                    "/tasks/{id}",
                    put(update_task).delete(delete_task),
                )
                .route_layer(from_fn(require_authenticated))
                .with_state(task_state),
        )
        .layer(from_fn_with_state(deps.session_manager, resolve_auth_context))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(CorsLayer::permissive())
}
