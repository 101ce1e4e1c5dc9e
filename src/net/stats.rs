//! 统计信息
//!
//! 控制器运行期间的计数器。处理函数可能被多个分发线程并发调用，计数用原子量。

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// 控制器计数器
#[derive(Debug, Default)]
pub struct Stats {
    pub events: AtomicU64,
    pub hosts_learned: AtomicU64,
    pub hosts_relocated: AtomicU64,
    pub arp_replies: AtomicU64,
    pub arp_unresolved: AtomicU64,
    pub flows_routed: AtomicU64,
    pub flow_mods: AtomicU64,
    pub packet_outs: AtomicU64,
    pub no_path: AtomicU64,
    pub aborted: AtomicU64,
    pub ignored_frames: AtomicU64,
}

impl Stats {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// 读取当前计数
    pub fn snapshot(&self) -> StatsSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            events: get(&self.events),
            hosts_learned: get(&self.hosts_learned),
            hosts_relocated: get(&self.hosts_relocated),
            arp_replies: get(&self.arp_replies),
            arp_unresolved: get(&self.arp_unresolved),
            flows_routed: get(&self.flows_routed),
            flow_mods: get(&self.flow_mods),
            packet_outs: get(&self.packet_outs),
            no_path: get(&self.no_path),
            aborted: get(&self.aborted),
            ignored_frames: get(&self.ignored_frames),
        }
    }
}

/// 计数器的某一时刻取值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub events: u64,
    pub hosts_learned: u64,
    pub hosts_relocated: u64,
    pub arp_replies: u64,
    pub arp_unresolved: u64,
    pub flows_routed: u64,
    pub flow_mods: u64,
    pub packet_outs: u64,
    pub no_path: u64,
    pub aborted: u64,
    pub ignored_frames: u64,
}
