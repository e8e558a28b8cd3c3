//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **不変性**: エンティティフィールドは非公開、変更は差分適用メソッド経由
//! - **バリデーション**: [`Email`] は生成時に形式を検証する
//! - **時刻の注入**: `created_at` / `updated_at` は呼び出し元から受け取る
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use taskboard_domain::{
//!     ObjectId,
//!     user::{Email, User, UserDraft, UserRole},
//! };
//!
//! let draft = UserDraft {
//!     first_name: "Ada".to_string(),
//!     last_name:  "Lovelace".to_string(),
//!     email:      Email::new("ada@example.com")?,
//!     phone:      None,
//!     address:    None,
//!     role:       None,
//! };
//! let user = User::new(ObjectId::new(), draft, chrono::Utc::now());
//!
//! assert_eq!(user.role(), UserRole::User);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use validator::ValidateEmail;

use crate::{DomainError, ObjectId};

/// メールアドレス（値オブジェクト）
///
/// `local@domain.tld` の形式を要求する。ドメインには少なくとも 1 つの `.` と、
/// 2 文字以上の英字からなるトップレベルドメインが必要。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(try_from = "String", into = "String")]
#[display("{_0}")]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # エラー
    ///
    /// 形式が不正な場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if !value.validate_email() {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        let has_tld = value
            .rsplit_once('@')
            .and_then(|(_, domain)| domain.rsplit_once('.'))
            .is_some_and(|(host, tld)| {
                !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
            });
        if !has_tld {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// ユーザーロール
///
/// 省略時は [`UserRole::User`]。
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

/// 作成用の検証済み入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name:  String,
    pub email:      Email,
    pub phone:      Option<String>,
    pub address:    Option<String>,
    pub role:       Option<UserRole>,
}

/// 更新用の検証済み差分
///
/// `None` のフィールドは変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name:  Option<String>,
    pub email:      Option<Email>,
    pub phone:      Option<String>,
    pub address:    Option<String>,
    pub role:       Option<UserRole>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// ユーザーエンティティ
///
/// # 不変条件
///
/// - `email` は全ユーザーで一意（永続化層の一意制約で保証）
/// - `updated_at >= created_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: ObjectId,
    first_name: String,
    last_name: String,
    email: Email,
    phone: Option<String>,
    address: Option<String>,
    role: UserRole,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// 検証済み入力から新しいユーザーを作成する
    ///
    /// ロール未指定の場合は `user` になる。
    pub fn new(id: ObjectId, draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            role: draft.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータからユーザーを復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: ObjectId,
        first_name: String,
        last_name: String,
        email: Email,
        phone: Option<String>,
        address: Option<String>,
        role: UserRole,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            phone,
            address,
            role,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 差分を適用した新しいインスタンスを返す
    ///
    /// 差分が空でも `updated_at` は更新する。
    pub fn with_patch(self, patch: UserPatch, now: DateTime<Utc>) -> Self {
        Self {
            first_name: patch.first_name.unwrap_or(self.first_name),
            last_name: patch.last_name.unwrap_or(self.last_name),
            email: patch.email.unwrap_or(self.email),
            phone: patch.phone.or(self.phone),
            address: patch.address.or(self.address),
            role: patch.role.unwrap_or(self.role),
            updated_at: now,
            ..self
        }
    }
}
