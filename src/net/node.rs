//! 节点与边的属性
//!
//! 拓扑图中交换机节点、主机节点以及有向边携带的数据。

use std::collections::BTreeSet;

use serde::Serialize;

use super::id::{MacAddr, PortNo, SwitchId};

/// 交换机节点：拓扑发现事件上报的端口集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwitchNode {
    pub ports: BTreeSet<PortNo>,
}

/// 主机节点：由 ARP 学习得到的 MAC 与接入位置（后写覆盖）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostNode {
    pub mac: MacAddr,
    pub switch: SwitchId,
    pub port: PortNo,
}

/// 有向边属性：权重与 `from` 一侧的出端口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub weight: u32,
    pub out_port: PortNo,
}

/// `UpsertHost` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostUpdate {
    /// 首次出现
    Learned,
    /// 从另一台交换机/端口重新出现
    Relocated { from: SwitchId, port: PortNo },
    /// 位置不变，但 MAC 变了
    Refreshed,
    /// 参数完全相同，图没有变化
    Unchanged,
}

impl HostUpdate {
    /// 是否修改了拓扑图
    pub fn changed(&self) -> bool {
        !matches!(self, HostUpdate::Unchanged)
    }
}
