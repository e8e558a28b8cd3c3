//! # エンティティ識別子
//!
//! ユーザー・タスクの `id` に使う 12 バイトの識別子。
//! 外部表現は 24 桁の小文字16進数文字列。
//!
//! ## バイト構成
//!
//! | オフセット | 長さ | 内容 |
//! |-----------|------|------|
//! | 0 | 4 | 生成時刻（UNIX 秒、ビッグエンディアン） |
//! | 4 | 5 | プロセスごとの乱数 |
//! | 9 | 3 | プロセス内カウンタ（初期値は乱数） |
//!
//! 先頭が時刻のため、バイト列の辞書順はおおよそ生成順になる。

use std::{
    fmt,
    str::FromStr,
    sync::{
        OnceLock,
        atomic::{AtomicU32, Ordering},
    },
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::DomainError;

/// 16進数表現の文字数
pub const OBJECT_ID_HEX_LEN: usize = 24;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// 12 バイトの識別子
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// 現在時刻で新しい識別子を生成する
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// 指定した時刻を先頭 4 バイトに埋め込んで識別子を生成する
    pub fn with_timestamp(at: DateTime<Utc>) -> Self {
        let seconds = u32::try_from(at.timestamp().max(0)).unwrap_or(u32::MAX);
        let process = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
            .fetch_add(1, Ordering::Relaxed)
            & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// 16進数文字列から識別子を復元する
    ///
    /// 大文字・小文字どちらも受け付ける。
    ///
    /// # エラー
    ///
    /// 24 桁の16進数でない場合は `DomainError::InvalidIdentifier` を返す。
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.len() != OBJECT_ID_HEX_LEN {
            return Err(DomainError::InvalidIdentifier(value.to_string()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(value, &mut bytes)
            .map_err(|_| DomainError::InvalidIdentifier(value.to_string()))?;
        Ok(Self(bytes))
    }

    /// 生成時刻（秒精度）
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(seconds), 0).unwrap_or_default()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(de::Error::custom)
    }
}
