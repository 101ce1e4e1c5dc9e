//! 控制器模块
//!
//! ARP 代理、流表安装、交换机引导状态机以及把它们串起来的事件分派。

mod arp;
mod bootstrap;
mod config;
mod controller;
mod event;
mod flow;
mod registry;
mod world;

pub use arp::{ArpAction, ArpOutcome, ArpProxy};
pub use bootstrap::{BootstrapState, SwitchBootstrap, table_miss};
pub use config::{ConfigError, ControllerConfig};
pub use controller::Controller;
pub use event::{ControllerEvent, EventOutcome};
pub use flow::FlowInstaller;
pub use registry::{
    FlowAction, FlowMatch, FlowMod, RecordingRegistry, SwitchChannel, SwitchCommand,
    SwitchRegistry,
};
pub use world::{ControllerWorld, Deliver, TraceRecord};
