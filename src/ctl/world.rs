//! 控制器世界
//!
//! 把控制器挂到事件循环上：`Deliver` 事件把一个控制器事件交给控制器处理，
//! 每个事件执行后把交换机收到的命令打上时间戳记入轨迹。

use std::any::Any;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use super::controller::Controller;
use super::event::{ControllerEvent, EventOutcome};
use super::registry::{RecordingRegistry, SwitchCommand};
use crate::dispatch::{Event, EventLoop, EventTime, World};

/// 轨迹中的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    pub t_ns: EventTime,
    #[serde(flatten)]
    pub command: SwitchCommand,
}

/// 持有控制器与记录型交换机注册表的世界
pub struct ControllerWorld {
    pub controller: Controller,
    pub registry: Arc<RecordingRegistry>,
    pub trace: Vec<TraceRecord>,
    pub outcomes: Vec<(EventTime, EventOutcome)>,
    pub failed: u64,
}

impl ControllerWorld {
    pub fn new(controller: Controller, registry: Arc<RecordingRegistry>) -> Self {
        Self {
            controller,
            registry,
            trace: Vec::new(),
            outcomes: Vec::new(),
            failed: 0,
        }
    }
}

impl World for ControllerWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, ev_loop: &mut EventLoop) {
        let now = ev_loop.now();
        for command in self.registry.drain() {
            trace!(t = ?now, switch = %command.switch(), ?command, "记录命令");
            self.trace.push(TraceRecord { t_ns: now, command });
        }
    }
}

/// 事件：把一个控制器事件交给控制器处理
#[derive(Debug)]
pub struct Deliver(pub ControllerEvent);

impl Event for Deliver {
    fn execute(self: Box<Self>, ev_loop: &mut EventLoop, world: &mut dyn World) {
        let Some(w) = world.as_any_mut().downcast_mut::<ControllerWorld>() else {
            debug!("world 不是 ControllerWorld，忽略事件");
            return;
        };
        match w.controller.dispatch(self.0) {
            Some(outcome) => w.outcomes.push((ev_loop.now(), outcome)),
            None => w.failed += 1,
        }
    }
}
