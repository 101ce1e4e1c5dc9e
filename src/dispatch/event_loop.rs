//! 事件循环
//!
//! 单线程、按时间排序的事件分发器。它独占 `World`，外部只能通过投递事件来修改状态，
//! 在回放与测试中扮演外部控制器框架的分发循环。

use super::time::EventTime;
use super::world::{Event, World};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 队列中的一项；`seq` 是入队序号，保证同一时刻先投递先执行
struct Pending {
    at: EventTime,
    seq: u64,
    ev: Box<dyn Event>,
}

impl Pending {
    fn key(&self) -> (EventTime, u64) {
        (self.at, self.seq)
    }
}

// 最早的一项必须排在 max-heap 堆顶
impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

#[derive(Default)]
pub struct EventLoop {
    now: EventTime,
    next_seq: u64,
    queue: BinaryHeap<Pending>,
}

impl EventLoop {
    /// 当前逻辑时间
    pub fn now(&self) -> EventTime {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// 投递事件，在 `at` 时刻执行
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: EventTime, ev: E) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        trace!(now = ?self.now, seq, "事件入队");
        self.queue.push(Pending {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    /// 执行队首事件，返回是否执行了事件
    fn step(&mut self, world: &mut dyn World) -> bool {
        let Some(item) = self.queue.pop() else {
            return false;
        };
        self.now = item.at;
        debug!(now = ?self.now, seq = item.seq, remaining = self.queue.len(), "执行事件");
        item.ev.execute(self, world);
        world.on_tick(self);
        true
    }

    /// 运行直到队列为空或下一事件晚于 `until`。
    pub fn run_until(&mut self, until: EventTime, world: &mut dyn World) {
        while self.queue.peek().is_some_and(|top| top.at <= until) {
            self.step(world);
        }
        self.now = self.now.max(until);
    }

    /// 运行直到队列为空，返回执行的事件数。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) -> u64 {
        info!(queued = self.queue.len(), "▶️  开始分发事件");
        let mut executed = 0u64;
        while self.step(world) {
            executed += 1;
        }
        info!(executed, final_time = ?self.now, "✅ 事件分发完成");
        executed
    }
}
