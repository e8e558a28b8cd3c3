//! # 入力検証
//!
//! 型のない JSON ペイロード・クエリ文字列を、検証済みの型に変換する。
//!
//! ## 規則
//!
//! - フィールドは宣言順に検証し、最初に失敗したフィールドのメッセージだけを返す
//! - 宣言されたフィールドがすべて通った後、未知のキーを拒否する
//! - `null` はどのフィールドでも不正な値として扱う
//! - メッセージはフィールド名をダブルクォートで囲む（例: `"title" は必須です`）
//!
//! | エンティティ | フィールド | 作成 | 更新 | 規則 |
//! |---|---|---|---|---|
//! | User | `firstName` | 必須 | 任意 | 空でない文字列 |
//! | User | `lastName` | 必須 | 任意 | 空でない文字列 |
//! | User | `email` | 必須 | 任意 | 有効なメールアドレス |
//! | User | `phone` | 任意 | 任意 | 空でない文字列 |
//! | User | `address` | 任意 | 任意 | 空でない文字列 |
//! | User | `role` | 任意 | 任意 | `admin` / `user` |
//! | Task | `title` | 必須 | 任意 | 空でない文字列 |
//! | Task | `description` | 任意 | 任意 | 空でない文字列 |
//! | Task | `dueDate` | 任意 | 任意 | ISO-8601 文字列またはエポックミリ秒 |
//! | Task | `assignedUser` | 任意 | 任意 | 16進数のみ、かつ 24 文字 |
//! | Task | `completed` | 任意 | 任意 | 真偽値（文字列 `"true"` / `"false"` も可） |
//!
//! 検証は副作用を持たず、永続化層には触れない。

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::{
    DomainError,
    ObjectId,
    object_id::OBJECT_ID_HEX_LEN,
    query::{ListQuery, MAX_LIMIT, Page, TaskFilter, UserFilter},
    task::{TaskDraft, TaskPatch},
    user::{Email, UserDraft, UserPatch, UserRole},
};

const USER_FIELDS: [&str; 6] = ["firstName", "lastName", "email", "phone", "address", "role"];
const TASK_FIELDS: [&str; 5] = ["title", "description", "dueDate", "assignedUser", "completed"];

// ===== 公開 API =====

/// ユーザー作成ペイロードを検証する
pub fn validate_user_create(payload: &Value) -> Result<UserDraft, DomainError> {
    let fields = Fields::from_value(payload)?;
    let draft = UserDraft {
        first_name: fields.required("firstName", parse_string)?,
        last_name:  fields.required("lastName", parse_string)?,
        email:      fields.required("email", parse_email)?,
        phone:      fields.optional("phone", parse_string)?,
        address:    fields.optional("address", parse_string)?,
        role:       fields.optional("role", parse_role)?,
    };
    fields.deny_unknown(&USER_FIELDS)?;
    Ok(draft)
}

/// ユーザー更新ペイロードを検証する（全フィールド任意）
pub fn validate_user_update(payload: &Value) -> Result<UserPatch, DomainError> {
    let fields = Fields::from_value(payload)?;
    let patch = UserPatch {
        first_name: fields.optional("firstName", parse_string)?,
        last_name:  fields.optional("lastName", parse_string)?,
        email:      fields.optional("email", parse_email)?,
        phone:      fields.optional("phone", parse_string)?,
        address:    fields.optional("address", parse_string)?,
        role:       fields.optional("role", parse_role)?,
    };
    fields.deny_unknown(&USER_FIELDS)?;
    Ok(patch)
}

/// タスク作成ペイロードを検証する
pub fn validate_task_create(payload: &Value) -> Result<TaskDraft, DomainError> {
    let fields = Fields::from_value(payload)?;
    let draft = TaskDraft {
        title:         fields.required("title", parse_string)?,
        description:   fields.optional("description", parse_string)?,
        due_date:      fields.optional("dueDate", parse_date)?,
        assigned_user: fields.optional("assignedUser", parse_object_id)?,
        completed:     fields.optional("completed", parse_bool)?,
    };
    fields.deny_unknown(&TASK_FIELDS)?;
    Ok(draft)
}

/// タスク更新ペイロードを検証する（全フィールド任意）
pub fn validate_task_update(payload: &Value) -> Result<TaskPatch, DomainError> {
    let fields = Fields::from_value(payload)?;
    let patch = TaskPatch {
        title:         fields.optional("title", parse_string)?,
        description:   fields.optional("description", parse_string)?,
        due_date:      fields.optional("dueDate", parse_date)?,
        assigned_user: fields.optional("assignedUser", parse_object_id)?,
        completed:     fields.optional("completed", parse_bool)?,
    };
    fields.deny_unknown(&TASK_FIELDS)?;
    Ok(patch)
}

/// `GET /users` のクエリを検証する
///
/// 対応パラメータ: `role`, `search`, `page`, `limit`。それ以外は無視する。
pub fn parse_user_list_query(
    params: &HashMap<String, String>,
) -> Result<ListQuery<UserFilter>, DomainError> {
    let role = params
        .get("role")
        .map(|value| value.parse::<UserRole>().map_err(|_| role_error("role")))
        .transpose()?;
    let search = params
        .get("search")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Ok(ListQuery {
        filter: UserFilter { role, search },
        page:   parse_page(params)?,
    })
}

/// `GET /tasks` のクエリを検証する
///
/// 対応パラメータ: `completed`, `assignedUser`, `page`, `limit`。それ以外は無視する。
pub fn parse_task_list_query(
    params: &HashMap<String, String>,
) -> Result<ListQuery<TaskFilter>, DomainError> {
    let completed = params
        .get("completed")
        .map(|value| bool_from_str(value).ok_or_else(|| bool_error("completed")))
        .transpose()?;
    let assigned_user = params
        .get("assignedUser")
        .map(|value| object_id_from_str("assignedUser", value))
        .transpose()?;

    Ok(ListQuery {
        filter: TaskFilter {
            completed,
            assigned_user,
        },
        page:   parse_page(params)?,
    })
}

// ===== ペイロード走査 =====

/// JSON オブジェクトのフィールドアクセサ
struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn from_value(value: &'a Value) -> Result<Self, DomainError> {
        value.as_object().map(|map| Self { map }).ok_or_else(|| {
            invalid("リクエストボディは JSON オブジェクトである必要があります".to_string())
        })
    }

    fn required<T>(
        &self,
        name: &str,
        parse: impl Fn(&str, &Value) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        match self.map.get(name) {
            Some(value) => parse(name, value),
            None => Err(invalid(format!("\"{name}\" は必須です"))),
        }
    }

    fn optional<T>(
        &self,
        name: &str,
        parse: impl Fn(&str, &Value) -> Result<T, DomainError>,
    ) -> Result<Option<T>, DomainError> {
        self.map
            .get(name)
            .map(|value| parse(name, value))
            .transpose()
    }

    /// 許可されていないキーを拒否する
    ///
    /// 複数ある場合はキーの辞書順で最初のものを報告する。
    fn deny_unknown(&self, allowed: &[&str]) -> Result<(), DomainError> {
        match self.map.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(key) => Err(invalid(format!("\"{key}\" は許可されていません"))),
            None => Ok(()),
        }
    }
}

// ===== フィールドパーサ =====

fn parse_string(name: &str, value: &Value) -> Result<String, DomainError> {
    match value {
        Value::String(s) if s.is_empty() => Err(invalid(format!("\"{name}\" は空にできません"))),
        Value::String(s) => Ok(s.clone()),
        _ => Err(invalid(format!("\"{name}\" は文字列である必要があります"))),
    }
}

fn parse_email(name: &str, value: &Value) -> Result<Email, DomainError> {
    let raw = parse_string(name, value)?;
    Email::new(raw).map_err(|_| {
        invalid(format!(
            "\"{name}\" は有効なメールアドレスである必要があります"
        ))
    })
}

fn parse_role(name: &str, value: &Value) -> Result<UserRole, DomainError> {
    value
        .as_str()
        .and_then(|s| s.parse::<UserRole>().ok())
        .ok_or_else(|| role_error(name))
}

fn parse_date(name: &str, value: &Value) -> Result<DateTime<Utc>, DomainError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => date_from_str(s.trim()),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(format!("\"{name}\" は有効な日付である必要があります")))
}

fn parse_object_id(name: &str, value: &Value) -> Result<ObjectId, DomainError> {
    let raw = parse_string(name, value)?;
    object_id_from_str(name, &raw)
}

fn parse_bool(name: &str, value: &Value) -> Result<bool, DomainError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => bool_from_str(s).ok_or_else(|| bool_error(name)),
        _ => Err(bool_error(name)),
    }
}

// ===== 文字列ヘルパー（ペイロード・クエリ共通） =====

/// ISO-8601 の日時・日付、またはエポックミリ秒の数字列を受け付ける
///
/// タイムゾーンのない日時は UTC とみなす。
fn date_from_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
}

fn object_id_from_str(name: &str, s: &str) -> Result<ObjectId, DomainError> {
    if !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid(format!(
            "\"{name}\" は16進数の文字のみを含む必要があります"
        )));
    }
    if s.len() != OBJECT_ID_HEX_LEN {
        return Err(invalid(format!(
            "\"{name}\" は{OBJECT_ID_HEX_LEN}文字である必要があります"
        )));
    }
    ObjectId::parse(s).map_err(|e| invalid(e.to_string()))
}

fn bool_from_str(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_page(params: &HashMap<String, String>) -> Result<Page, DomainError> {
    let page = params
        .get("page")
        .map(|value| positive_from_str("page", value))
        .transpose()?
        .unwrap_or(1);
    let limit = params
        .get("limit")
        .map(|value| {
            let limit = positive_from_str("limit", value)?;
            if limit > MAX_LIMIT {
                return Err(invalid(format!(
                    "\"limit\" は{MAX_LIMIT}以下である必要があります"
                )));
            }
            Ok(limit)
        })
        .transpose()?;
    Ok(Page::new(page, limit))
}

fn positive_from_str(name: &str, s: &str) -> Result<u32, DomainError> {
    s.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| invalid(format!("\"{name}\" は1以上の整数である必要があります")))
}

// ===== エラー生成 =====

fn invalid(message: String) -> DomainError {
    DomainError::Validation(message)
}

fn role_error(name: &str) -> DomainError {
    invalid(format!(
        "\"{name}\" は [admin, user] のいずれかである必要があります"
    ))
}

fn bool_error(name: &str) -> DomainError {
    invalid(format!("\"{name}\" は真偽値である必要があります"))
}
