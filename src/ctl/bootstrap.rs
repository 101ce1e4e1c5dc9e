//! 交换机引导状态机
//!
//! 每台交换机一个实例。收到特性/能力通告时下发一条最低优先级、匹配一切、
//! 送往控制器的 table-miss 规则，然后进入 `TableMissInstalled`。
//! 下发是 fire-and-forget，不重试。

use tracing::debug;

use super::registry::{FlowAction, FlowMatch, FlowMod, SwitchChannel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BootstrapState {
    #[default]
    Unconfigured,
    TableMissInstalled,
}

#[derive(Debug, Default)]
pub struct SwitchBootstrap {
    state: BootstrapState,
}

impl SwitchBootstrap {
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// 特性通告到达：下发 table-miss 规则。
    ///
    /// 每次连接握手只有一次通告，所以重复通告意味着重新连接，规则会再次下发。
    /// 返回通告前的状态。
    pub fn on_features(&mut self, channel: &dyn SwitchChannel, priority: u16) -> BootstrapState {
        channel.install_flow(table_miss(priority));
        let prev = std::mem::replace(&mut self.state, BootstrapState::TableMissInstalled);
        debug!(?prev, priority, "table-miss 规则已下发");
        prev
    }
}

/// 匹配一切、送往控制器的规则
pub fn table_miss(priority: u16) -> FlowMod {
    FlowMod {
        priority,
        matches: FlowMatch::any(),
        action: FlowAction::Controller,
    }
}
