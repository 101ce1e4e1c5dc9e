//! 事件分发模块
//!
//! 单线程事件循环（时间有序队列、事件、世界）以及 JSON 场景格式。

mod event_loop;
mod scenario;
mod time;
mod world;

pub use event_loop::EventLoop;
pub use scenario::{HostSpec, LinkSpec, ScenarioError, ScenarioSpec, SwitchSpec, TopologySpec, TrafficSpec};
pub use time::EventTime;
pub use world::{Event, World};
