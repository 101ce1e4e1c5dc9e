//! 事件与世界
//!
//! `World` 是事件循环独占的状态（回放中是控制器加上命令轨迹），
//! `Event` 是投递给它的一条消息；世界只在事件执行时被修改。

use super::event_loop::EventLoop;
use std::any::Any;

/// 投递到事件循环上的消息。按值取走 `self`，帧之类的负载无需克隆。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, ev_loop: &mut EventLoop, world: &mut dyn World);
}

pub trait World: Any {
    /// 供事件把世界还原成具体类型
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每个事件执行完后调用，可用于收集该事件产生的副作用
    fn on_tick(&mut self, _ev_loop: &mut EventLoop) {}
}
