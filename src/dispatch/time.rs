//! 事件时间
//!
//! 回放中事件的逻辑时间戳，与墙上时间无关。

use serde::Serialize;

/// 逻辑时间（纳秒）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct EventTime(pub u64);

impl EventTime {
    pub const ZERO: EventTime = EventTime(0);

    pub fn from_micros(us: u64) -> EventTime {
        EventTime(us.saturating_mul(1_000))
    }

    pub fn from_millis(ms: u64) -> EventTime {
        EventTime(ms.saturating_mul(1_000_000))
    }

    pub fn as_nanos(&self) -> u64 {
        self.0
    }
}
