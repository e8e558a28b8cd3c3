//! # Clock（時刻プロバイダ）
//!
//! `createdAt` / `updatedAt` の採番に使う現在時刻の抽象化。
//! ユースケースは `Utc::now()` を直接呼ばず、この trait 経由で時刻を得る。

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
   fn now(&self) -> DateTime<Utc>;
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
   fn now(&self) -> DateTime<Utc> {
      Utc::now()
   }
}

/// 固定時刻を返すテスト用実装
///
/// `advance` で時刻を進められるため、更新時に `updated_at` が
/// 変化することを検証できる。
pub struct FixedClock {
   now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
   pub fn new(now: DateTime<Utc>) -> Self {
      Self {
         now: Mutex::new(now),
      }
   }

   /// 時刻を指定した秒数だけ進める
   pub fn advance(&self, seconds: i64) {
      let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
      *now += TimeDelta::seconds(seconds);
   }
}

impl Clock for FixedClock {
   fn now(&self) -> DateTime<Utc> {
      *self.now.lock().unwrap_or_else(PoisonError::into_inner)
   }
}
