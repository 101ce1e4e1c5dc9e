//! 标识符类型
//!
//! 定义交换机、端口、主机 MAC 以及拓扑图节点的标识符。

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 交换机标识符（datapath id）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchId(pub u64);

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// 交换机端口号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortNo(pub u32);

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 拓扑图节点标识符
///
/// 排序规则：所有交换机排在主机之前；交换机按 datapath id，主机按 IPv4 数值。
/// 最短路径的平局裁决依赖这个顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    Switch(SwitchId),
    Host(Ipv4Addr),
}

impl NodeId {
    /// 若是交换机节点，返回其 id
    pub fn as_switch(&self) -> Option<SwitchId> {
        match self {
            NodeId::Switch(id) => Some(*id),
            NodeId::Host(_) => None,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, NodeId::Host(_))
    }
}

impl From<SwitchId> for NodeId {
    fn from(id: SwitchId) -> Self {
        NodeId::Switch(id)
    }
}

impl From<Ipv4Addr> for NodeId {
    fn from(ip: Ipv4Addr) -> Self {
        NodeId::Host(ip)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Switch(id) => write!(f, "{id}"),
            NodeId::Host(ip) => write!(f, "{ip}"),
        }
    }
}

/// 以太网 MAC 地址，文本形式为 `aa:bb:cc:dd:ee:ff`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);
    pub const ZERO: MacAddr = MacAddr([0; 6]);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MAC address: {0:?}")]
pub struct ParseMacError(String);

impl FromStr for MacAddr {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for slot in octets.iter_mut() {
            let part = parts.next().ok_or_else(|| ParseMacError(s.to_string()))?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseMacError(s.to_string()));
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseMacError(s.to_string()));
        }
        Ok(MacAddr(octets))
    }
}

impl TryFrom<String> for MacAddr {
    type Error = ParseMacError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddr> for String {
    fn from(mac: MacAddr) -> Self {
        mac.to_string()
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
