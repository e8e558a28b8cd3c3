//! # ユーザー API ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /users` - 作成（要認証）
//! - `GET /users` - 一覧（`role`, `search`, `page`, `limit`）
//! - `GET /users/{id}` - 詳細
//! - `PUT /users/{id}` - 部分更新（要認証）
//! - `DELETE /users/{id}` - 削除（要認証）

use std::{collections::HashMap, sync::Arc};

use axum::{
   Json,
   extract::{Path, Query, State, rejection::JsonRejection},
   http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use taskboard_domain::{
   user::{User, UserRole},
   validation::{parse_user_list_query, validate_user_create, validate_user_update},
};
use taskboard_shared::{ApiResponse, ListResponse};

use super::parse_path_id;
use crate::{error::CoreError, usecase::UserUseCaseImpl};

/// ユーザーハンドラーの State
pub struct UserState {
   pub usecase: UserUseCaseImpl,
}

/// ユーザー DTO
///
/// 未設定の任意項目（`phone`, `address`）は出力しない。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
   pub id:         String,
   pub first_name: String,
   pub last_name:  String,
   pub email:      String,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub phone:      Option<String>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub address:    Option<String>,
   pub role:       UserRole,
   pub created_at: DateTime<Utc>,
   pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
   fn from(user: &User) -> Self {
      Self {
         id:         user.id().to_hex(),
         first_name: user.first_name().to_string(),
         last_name:  user.last_name().to_string(),
         email:      user.email().as_str().to_string(),
         phone:      user.phone().map(str::to_string),
         address:    user.address().map(str::to_string),
         role:       user.role(),
         created_at: user.created_at(),
         updated_at: user.updated_at(),
      }
   }
}

/// POST /users
#[tracing::instrument(skip_all)]
pub async fn create_user(
   State(state): State<Arc<UserState>>,
   payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), CoreError> {
   let Json(payload) = payload?;
   let draft = validate_user_create(&payload)?;

   let user = state.usecase.create_user(draft).await?;

   tracing::info!(user.id = %user.id(), "ユーザーを作成しました");
   Ok((
      StatusCode::CREATED,
      Json(ApiResponse::new(UserDto::from(&user))),
   ))
}

/// GET /users
#[tracing::instrument(skip_all)]
pub async fn list_users(
   State(state): State<Arc<UserState>>,
   Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse<UserDto>>, CoreError> {
   let query = parse_user_list_query(&params)?;

   let listing = state.usecase.list_users(&query).await?;

   let data = listing.items.iter().map(UserDto::from).collect();
   Ok(Json(ListResponse::new(data, listing.total)))
}

/// GET /users/{id}
#[tracing::instrument(skip_all)]
pub async fn get_user(
   State(state): State<Arc<UserState>>,
   Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, CoreError> {
   let id = parse_path_id(&id)?;

   let user = state.usecase.get_user(&id).await?;

   Ok(Json(ApiResponse::new(UserDto::from(&user))))
}

/// PUT /users/{id}
#[tracing::instrument(skip_all)]
pub async fn update_user(
   State(state): State<Arc<UserState>>,
   Path(id): Path<String>,
   payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, CoreError> {
   let id = parse_path_id(&id)?;
   let Json(payload) = payload?;
   let patch = validate_user_update(&payload)?;

   let user = state.usecase.update_user(&id, patch).await?;

   Ok(Json(ApiResponse::new(UserDto::from(&user))))
}

/// DELETE /users/{id}
#[tracing::instrument(skip_all)]
pub async fn delete_user(
   State(state): State<Arc<UserState>>,
   Path(id): Path<String>,
) -> Result<StatusCode, CoreError> {
   let id = parse_path_id(&id)?;

   state.usecase.delete_user(&id).await?;

   tracing::info!(user.id = %id, "ユーザーを削除しました");
   Ok(StatusCode::NO_CONTENT)
}
