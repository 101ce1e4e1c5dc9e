//! 错误类型
//!
//! 所有错误都只影响一次流建立尝试（一次 ARP 交换或一个 IPv4 包的路径安装），
//! 不会对控制器进程造成致命影响。

use std::net::Ipv4Addr;

use thiserror::Error;

use super::id::{NodeId, SwitchId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// ARP 目标或流目的地址尚未学习到；请求被丢弃。
    #[error("unknown host {0}")]
    UnknownHost(Ipv4Addr),

    /// 拓扑中两端点之间不存在路径；数据包被丢弃。
    #[error("no path from {src} to {dst}")]
    NoPath { src: NodeId, dst: NodeId },

    /// 遍历或安装过程中的内部查找失败；中止本次尝试。
    #[error("no edge from {from} to {to}")]
    NoSuchEdge { from: NodeId, to: NodeId },

    /// 需要下发规则的交换机没有可用的控制通道；中止剩余安装，已下发的规则保留。
    #[error("switch {0} unavailable")]
    SwitchUnavailable(SwitchId),

    #[error("node {0} on path is not a switch")]
    NotASwitch(NodeId),

    #[error("path of {len} node(s) is too short to install")]
    PathTooShort { len: usize },

    #[error("malformed frame: {0}")]
    MalformedFrame(smoltcp::wire::Error),
}

impl From<smoltcp::wire::Error> for ControllerError {
    fn from(err: smoltcp::wire::Error) -> Self {
        ControllerError::MalformedFrame(err)
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;
