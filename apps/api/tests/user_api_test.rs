//! ユーザー API のルーター統合テスト
//!
//! インメモリリポジトリとセッションスタブで `build_app` のルーターを直接呼び出す。

mod helpers;

use axum::http::{Method, StatusCode};
use helpers::{InMemorySessionManager, TestApp, request};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use taskboard_infra::mock::{MockTaskRepository, MockUserRepository};

fn ada() -> Value {
   json!({
      "firstName": "Ada",
      "lastName": "Lovelace",
      "email": "ada@example.com"
   })
}

async fn create(app: &TestApp, body: Value) -> Value {
   let response = app.authed(Method::POST, "/users", Some(body)).await;
   assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
   response.body["data"].clone()
}

#[tokio::test]
async fn test_作成したユーザーをidで取得できる() {
   let app = TestApp::new();

   let created = create(&app, ada()).await;
   let id = created["id"].as_str().unwrap();
   let response = app.get(&format!("/users/{id}")).await;

   assert_eq!(response.status, StatusCode::OK);
   assert_eq!(response.body["success"], json!(true));
   assert_eq!(response.body["data"], created);
   assert_eq!(created["firstName"], json!("Ada"));
   assert_eq!(created["role"], json!("user"));
   assert_eq!(id.len(), 24);
}

#[tokio::test]
async fn test_未設定の任意項目は応答に含まれない() {
   let app = TestApp::new();

   let created = create(&app, ada()).await;

   assert!(created.get("phone").is_none());
   assert!(created.get("address").is_none());
}

#[tokio::test]
async fn test_未認証の作成は401でストアに到達しない() {
   let app = TestApp::new();

   let response = app.anonymous(Method::POST, "/users", Some(ada())).await;

   assert_eq!(response.status, StatusCode::UNAUTHORIZED);
   assert_eq!(response.body["code"], json!("unauthenticated"));
   assert_eq!(response.body["success"], json!(false));
   assert_eq!(app.users.call_count(), 0);
}

#[tokio::test]
async fn test_未認証の更新と削除は401でストアに到達しない() {
   let app = TestApp::new();
   let uri = "/users/507f1f77bcf86cd799439011";

   let update = app
      .anonymous(Method::PUT, uri, Some(json!({ "firstName": "Grace" })))
      .await;
   let delete = app.anonymous(Method::DELETE, uri, None).await;

   assert_eq!(update.status, StatusCode::UNAUTHORIZED);
   assert_eq!(delete.status, StatusCode::UNAUTHORIZED);
   assert_eq!(app.users.call_count(), 0);
}

#[tokio::test]
async fn test_不明なセッションidは未認証として扱う() {
   let app = TestApp::new();

   let response = app
      .send(request(
         Method::POST,
         "/users",
         Some(ada()),
         Some("session_id=unknown"),
      ))
      .await;

   assert_eq!(response.status, StatusCode::UNAUTHORIZED);
   assert_eq!(app.users.call_count(), 0);
}

#[tokio::test]
async fn test_メールアドレスの重複はconflict() {
   let app = TestApp::new();
   create(&app, ada()).await;

   let response = app.authed(Method::POST, "/users", Some(ada())).await;

   assert_eq!(response.status, StatusCode::BAD_REQUEST);
   assert_eq!(response.body["code"], json!("conflict"));
   assert_eq!(
      response.body["error"],
      json!("\"email\" は既に使用されています")
   );
}

#[tokio::test]
async fn test_別のメールアドレスなら作成できる() {
   let app = TestApp::new();
   create(&app, ada()).await;

   let mut grace = ada();
   grace["email"] = json!("grace@example.com");
   let response = app.authed(Method::POST, "/users", Some(grace)).await;

   assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_必須項目の欠落は検証エラーでストアに到達しない() {
   let app = TestApp::new();

   let response = app
      .authed(
         Method::POST,
         "/users",
         Some(json!({ "lastName": "Lovelace", "email": "ada@example.com" })),
      )
      .await;

   assert_eq!(response.status, StatusCode::BAD_REQUEST);
   assert_eq!(response.body["code"], json!("validation-error"));
   assert_eq!(app.users.call_count(), 0);
}

#[tokio::test]
async fn test_jsonでないボディは検証エラー() {
   let app = TestApp::new();
   let cookie = app.login().await;
   let request = axum::http::Request::builder()
      .method(Method::POST)
      .uri("/users")
      .header("content-type", "application/json")
      .header("cookie", cookie)
      .body(axum::body::Body::from("{not json"))
      .unwrap();

   let response = app.send(request).await;

   assert_eq!(response.status, StatusCode::BAD_REQUEST);
   assert_eq!(response.body["code"], json!("validation-error"));
}

#[tokio::test]
async fn test_存在しないidは404() {
   let app = TestApp::new();

   let response = app.get("/users/507f1f77bcf86cd799439011").await;

   assert_eq!(response.status, StatusCode::NOT_FOUND);
   assert_eq!(response.body["code"], json!("not-found"));
}

#[tokio::test]
async fn test_不正な形式のidは500でnot_foundと区別される() {
   let app = TestApp::new();

   let response = app.get("/users/not-an-id").await;

   assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
   assert_eq!(response.body["code"], json!("invalid-identifier"));
}

#[tokio::test]
async fn test_部分更新は指定項目のみ変更しupdated_atを進める() {
   let app = TestApp::new();
   let created = create(&app, ada()).await;
   let id = created["id"].as_str().unwrap();
   app.clock.advance(60);

   let response = app
      .authed(
         Method::PUT,
         &format!("/users/{id}"),
         Some(json!({ "role": "admin" })),
      )
      .await;

   assert_eq!(response.status, StatusCode::OK);
   let updated = &response.body["data"];
   assert_eq!(updated["role"], json!("admin"));
   assert_eq!(updated["firstName"], created["firstName"]);
   assert_eq!(updated["createdAt"], created["createdAt"]);
   assert_ne!(updated["updatedAt"], created["updatedAt"]);
}

#[tokio::test]
async fn test_空の更新は項目を変えずupdated_atだけ進める() {
   let app = TestApp::new();
   let created = create(&app, ada()).await;
   let id = created["id"].as_str().unwrap();
   app.clock.advance(1);

   let response = app
      .authed(Method::PUT, &format!("/users/{id}"), Some(json!({})))
      .await;

   let updated = &response.body["data"];
   assert_eq!(response.status, StatusCode::OK);
   assert_eq!(updated["email"], created["email"]);
   assert_eq!(updated["lastName"], created["lastName"]);
   assert_ne!(updated["updatedAt"], created["updatedAt"]);
}

#[tokio::test]
async fn test_存在しないユーザーの更新は404() {
   let app = TestApp::new();

   let response = app
      .authed(
         Method::PUT,
         "/users/507f1f77bcf86cd799439011",
         Some(json!({ "firstName": "Grace" })),
      )
      .await;

   assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_削除は204で以後取得できない() {
   let app = TestApp::new();
   let created = create(&app, ada()).await;
   let uri = format!("/users/{}", created["id"].as_str().unwrap());

   let response = app.authed(Method::DELETE, &uri, None).await;

   assert_eq!(response.status, StatusCode::NO_CONTENT);
   assert_eq!(response.body, Value::Null);
   assert_eq!(app.get(&uri).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_存在しないユーザーの削除は404でありサーバーエラーではない() {
   let app = TestApp::new();

   let response = app
      .authed(Method::DELETE, "/users/507f1f77bcf86cd799439011", None)
      .await;

   assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_一覧はロールで絞り込みページングする() {
   let app = TestApp::new();
   for (i, role) in ["user", "admin", "admin", "admin"].iter().enumerate() {
      app.clock.advance(1);
      create(
         &app,
         json!({
            "firstName": format!("User{i}"),
            "lastName": "Test",
            "email": format!("user{i}@example.com"),
            "role": role
         }),
      )
      .await;
   }

   let response = app.get("/users?role=admin&page=2&limit=2").await;

   assert_eq!(response.status, StatusCode::OK);
   assert_eq!(response.body["count"], json!(1));
   assert_eq!(response.body["total"], json!(3));
   assert_eq!(response.body["data"][0]["firstName"], json!("User3"));
}

#[tokio::test]
async fn test_一覧の検索は大文字小文字を区別しない() {
   let app = TestApp::new();
   create(&app, ada()).await;
   let mut grace = ada();
   grace["firstName"] = json!("Grace");
   grace["email"] = json!("grace@example.com");
   create(&app, grace).await;

   let response = app.get("/users?search=GRACE").await;

   assert_eq!(response.body["count"], json!(1));
   assert_eq!(response.body["data"][0]["firstName"], json!("Grace"));
}

#[tokio::test]
async fn test_不正なクエリは400() {
   let app = TestApp::new();

   for uri in ["/users?page=0", "/users?limit=1000", "/users?role=owner"] {
      let response = app.get(uri).await;

      assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
      assert_eq!(response.body["code"], json!("validation-error"), "{uri}");
   }
}

#[tokio::test]
async fn test_ストア障害は内部情報を含まない500() {
   let app = TestApp::build(
      MockUserRepository::failing(),
      MockTaskRepository::new(),
      InMemorySessionManager::default(),
   );

   let response = app.get("/users").await;

   assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
   assert_eq!(response.body["code"], json!("internal-error"));
   assert!(!response.body["error"].as_str().unwrap().contains("mock"));
}

#[tokio::test]
async fn test_セッションストア障害時も参照は可能で更新は401() {
   let app = TestApp::build(
      MockUserRepository::new(),
      MockTaskRepository::new(),
      InMemorySessionManager::failing(),
   );

   let list = app
      .send(request(
         Method::GET,
         "/users",
         None,
         Some("session_id=session-0"),
      ))
      .await;
   let create = app
      .send(request(
         Method::POST,
         "/users",
         Some(ada()),
         Some("session_id=session-0"),
      ))
      .await;

   assert_eq!(list.status, StatusCode::OK);
   assert_eq!(create.status, StatusCode::UNAUTHORIZED);
   assert_eq!(app.users.call_count(), 1);
}
