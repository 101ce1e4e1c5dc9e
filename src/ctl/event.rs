//! 控制器事件
//!
//! 外部控制器框架投递给核心的事件（与传输无关的逻辑形态），以及每个事件的处理结论。

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::net::{HostUpdate, PortNo, SwitchId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    SwitchConnected {
        switch: SwitchId,
        ports: Vec<PortNo>,
    },
    LinkDiscovered {
        src: SwitchId,
        src_port: PortNo,
        dst: SwitchId,
        dst_port: PortNo,
    },
    SwitchFeaturesReady {
        switch: SwitchId,
    },
    PacketIn {
        switch: SwitchId,
        in_port: PortNo,
        frame: Vec<u8>,
    },
}

impl ControllerEvent {
    /// 事件所属（或发起）的交换机
    pub fn switch(&self) -> SwitchId {
        match self {
            ControllerEvent::SwitchConnected { switch, .. }
            | ControllerEvent::SwitchFeaturesReady { switch }
            | ControllerEvent::PacketIn { switch, .. } => *switch,
            ControllerEvent::LinkDiscovered { src, .. } => *src,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ControllerEvent::SwitchConnected { .. } => "switch_connected",
            ControllerEvent::LinkDiscovered { .. } => "link_discovered",
            ControllerEvent::SwitchFeaturesReady { .. } => "switch_features_ready",
            ControllerEvent::PacketIn { .. } => "packet_in",
        }
    }
}

/// 一个事件被成功处理后的结论
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    TopologyUpdated,
    TableMissInstalled,
    /// ARP 包只用于学习
    HostLearned { ip: Ipv4Addr, changed: bool },
    /// 代答了 ARP 请求
    ArpReplied { target: Ipv4Addr },
    /// 路径已安装，`flow_mods` 为下发的规则数
    FlowInstalled { src: Ipv4Addr, dst: Ipv4Addr, flow_mods: usize },
    /// 非 ARP/IPv4 帧
    Ignored { ethertype: u16 },
}

impl EventOutcome {
    pub(crate) fn learned(ip: Ipv4Addr, update: Option<HostUpdate>) -> Self {
        EventOutcome::HostLearned {
            ip,
            changed: update.is_some_and(|u| u.changed()),
        }
    }
}
