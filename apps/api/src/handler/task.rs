//! # タスク API ハンドラ
//!
//! 作成・更新の応答では `assignedUser` をユーザー ID のまま返し、
//! 一覧・詳細の応答では参照先ユーザーの一部項目に展開する。
//! 参照先が存在しない場合は展開せず ID のまま返す。

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
    task::Task,
    user::User,
    validation::{parse_task_list_query, validate_task_create, validate_task_update},
};
use taskboard_shared::{ApiResponse, ListResponse};

use super::parse_path_id;
use crate::{
    error::CoreError,
    usecase::{TaskUseCaseImpl, TaskWithAssignee},
};

/// タスクハンドラーの State
pub struct TaskState {
    pub usecase: TaskUseCaseImpl,
}

/// 展開された担当者（ユーザーの一部項目）
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeDto {
    pub id:         String,
    pub first_name: String,
    pub last_name:  String,
    pub email:      String,
}

impl From<&User> for AssigneeDto {
    fn from(user: &User) -> Self {
        Self {
            id:         user.id().to_hex(),
            first_name: user.first_name().to_string(),
            last_name:  user.last_name().to_string(),
            email:      user.email().as_str().to_string(),
        }
    }
}

/// `assignedUser` の表現
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AssignedUserDto {
    Populated(AssigneeDto),
    Id(String),
}

/// タスク DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id:            String,
    pub title:         String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description:   Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date:      Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<AssignedUserDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed:     Option<bool>,
    pub created_at:    DateTime<Utc>,
    pub updated_at:    DateTime<Utc>,
}

impl TaskDto {
    fn build(task: &Task, assignee: Option<&User>) -> Self {
        let assigned_user = task.assigned_user().map(|id| match assignee {
            Some(user) if user.id() == id => AssignedUserDto::Populated(AssigneeDto::from(user)),
            _ => AssignedUserDto::Id(id.to_hex()),
        });

        Self {
            id: task.id().to_hex(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            due_date: task.due_date(),
            assigned_user,
            completed: task.completed(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

impl From<&Task> for TaskDto {
    fn from(task: &Task) -> Self {
        Self::build(task, None)
    }
}

impl From<&TaskWithAssignee> for TaskDto {
    fn from(expanded: &TaskWithAssignee) -> Self {
        Self::build(&expanded.task, expanded.assignee.as_ref())
    }
}

/// POST /tasks
#[tracing::instrument(skip_all)]
pub async fn create_task(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TaskDto>>), CoreError> {
    let Json(payload) = payload?;
    let draft = validate_task_create(&payload)?;

    let task = state.usecase.create_task(draft).await?;

    tracing::info!(task.id = %task.id(), "タスクを作成しました");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(TaskDto::from(&task))),
    ))
}

/// GET /tasks
#[tracing::instrument(skip_all)]
pub async fn list_tasks(
    State(state): State<Arc<TaskState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse<TaskDto>>, CoreError> {
    let query = parse_task_list_query(&params)?;

    let listing = state.usecase.list_tasks(&query).await?;

    let data = listing.items.iter().map(TaskDto::from).collect();
    Ok(Json(ListResponse::new(data, listing.total)))
}

/// GET /tasks/{id}
#[tracing::instrument(skip_all)]
pub async fn get_task(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TaskDto>>, CoreError> {
    let id = parse_path_id(&id)?;

    let expanded = state.usecase.get_task(&id).await?;

    Ok(Json(ApiResponse::new(TaskDto::from(&expanded))))
}

/// PUT /tasks/{id}
#[tracing::instrument(skip_all)]
pub async fn update_task(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<TaskDto>>, CoreError> {
    let id = parse_path_id(&id)?;
    let Json(payload) = payload?;
    let patch = validate_task_update(&payload)?;

    let task = state.usecase.update_task(&id, patch).await?;

    Ok(Json(ApiResponse::new(TaskDto::from(&task))))
}

/// DELETE /tasks/{id}
#[tracing::instrument(skip_all)]
pub async fn delete_task(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, CoreError> {
    let id = parse_path_id(&id)?;

    state.usecase.delete_task(&id).await?;

    tracing::info!(task.id = %id, "タスクを削除しました");
    Ok(StatusCode::NO_CONTENT)
}
