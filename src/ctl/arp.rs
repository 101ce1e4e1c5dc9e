//! ARP 代理
//!
//! 每个 ARP 包都先用于学习发送方的位置；请求若能在拓扑中解析，则由控制器
//! 代为应答，原请求被完全消费。控制器从不泛洪 ARP：无法解析的请求直接丢弃。

use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::net::{ArpMessage, ArpOp, HostUpdate, MacAddr, PortNo, SwitchId, TopologyStore, arp_reply_for};

/// 代理对一个 ARP 包的处理结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArpAction {
    /// 合成的应答帧，应从收到请求的交换机入端口发出
    Reply { frame: Vec<u8>, resolved: MacAddr },
    /// 仅用于学习（应答包、免费 ARP）
    LearnOnly,
    /// 目标尚未学习到；请求被丢弃，不泛洪
    Unresolved(Ipv4Addr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpOutcome {
    /// 发送方学习结果；源地址未指定（0.0.0.0 探测）时为 `None`
    pub learned: Option<HostUpdate>,
    pub action: ArpAction,
}

#[derive(Debug, Clone)]
pub struct ArpProxy {
    topology: Arc<TopologyStore>,
}

impl ArpProxy {
    pub fn new(topology: Arc<TopologyStore>) -> Self {
        Self { topology }
    }

    /// 处理在 `switch` 的 `in_port` 上收到的 ARP 消息
    #[tracing::instrument(skip(self, msg), fields(switch = %switch, in_port = %in_port, op = ?msg.op, sender = %msg.sender_ip, target = %msg.target_ip))]
    pub fn handle(&self, switch: SwitchId, in_port: PortNo, msg: &ArpMessage) -> ArpOutcome {
        let learned = if msg.sender_ip.is_unspecified() {
            trace!("源地址未指定，跳过学习");
            None
        } else {
            Some(
                self.topology
                    .upsert_host(msg.sender_ip, msg.sender_mac, switch, in_port),
            )
        };

        let answer = match msg.op {
            ArpOp::Reply => false,
            ArpOp::Request if msg.target_ip == msg.sender_ip => {
                trace!("免费 ARP，不应答");
                false
            }
            ArpOp::Request => true,
        };
        if !answer {
            return ArpOutcome {
                learned,
                action: ArpAction::LearnOnly,
            };
        }

        let action = match self.topology.host(msg.target_ip) {
            Some(target) => {
                debug!(resolved = %target.mac, "📮 代答 ARP 请求");
                ArpAction::Reply {
                    frame: arp_reply_for(msg, target.mac),
                    resolved: target.mac,
                }
            }
            None => {
                debug!("ARP 目标未知，丢弃请求");
                ArpAction::Unresolved(msg.target_ip)
            }
        };

        ArpOutcome { learned, action }
    }
}
