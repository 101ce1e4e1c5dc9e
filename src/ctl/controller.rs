//! 控制器
//!
//! 把外部框架投递的事件分派给拓扑存储、ARP 代理、路径计算与流表安装。
//! 处理函数只接收 `&self`：拓扑由一把粗粒度锁保护，不同交换机的事件可以并发处理。

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, trace, warn};

use super::arp::{ArpAction, ArpProxy};
use super::bootstrap::{BootstrapState, SwitchBootstrap};
use super::config::ControllerConfig;
use super::event::{ControllerEvent, EventOutcome};
use super::flow::FlowInstaller;
use super::registry::{FlowMatch, SwitchRegistry};
use crate::net::{
    ArpMessage, ControllerError, Frame, HostUpdate, NodeId, PortNo, Result, Stats, StatsSnapshot,
    SwitchId, TopologyStore, parse_frame, shortest_path,
};

pub struct Controller {
    config: ControllerConfig,
    topology: Arc<TopologyStore>,
    registry: Arc<dyn SwitchRegistry>,
    arp: ArpProxy,
    installer: FlowInstaller,
    bootstrap: Mutex<BTreeMap<SwitchId, SwitchBootstrap>>,
    stats: Stats,
}

impl Controller {
    pub fn new(config: ControllerConfig, registry: Arc<dyn SwitchRegistry>) -> Self {
        let topology = Arc::new(TopologyStore::new());
        Self {
            arp: ArpProxy::new(Arc::clone(&topology)),
            installer: FlowInstaller::new(Arc::clone(&registry), config.flow_priority),
            config,
            topology,
            registry,
            bootstrap: Mutex::new(BTreeMap::new()),
            stats: Stats::default(),
        }
    }

    pub fn topology(&self) -> &TopologyStore {
        &self.topology
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn bootstrap_state(&self, switch: SwitchId) -> BootstrapState {
        self.bootstrap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&switch)
            .map(SwitchBootstrap::state)
            .unwrap_or_default()
    }

    /// 处理事件；失败只影响这一次尝试，由调用方决定如何记录。
    pub fn handle(&self, event: ControllerEvent) -> Result<EventOutcome> {
        Stats::bump(&self.stats.events);
        match event {
            ControllerEvent::SwitchConnected { switch, ports } => {
                self.topology.add_switch(switch, &ports);
                Ok(EventOutcome::TopologyUpdated)
            }
            ControllerEvent::LinkDiscovered {
                src,
                src_port,
                dst,
                dst_port,
            } => {
                trace!(%dst_port, "对端端口由反向链路事件记录");
                self.topology
                    .add_link(src, dst, src_port, self.config.link_weight);
                Ok(EventOutcome::TopologyUpdated)
            }
            ControllerEvent::SwitchFeaturesReady { switch } => self.on_features(switch),
            ControllerEvent::PacketIn {
                switch,
                in_port,
                frame,
            } => self.on_packet_in(switch, in_port, frame),
        }
    }

    /// 处理事件并按错误分类记录日志；任何错误都不会向外传播。
    #[tracing::instrument(skip(self, event), fields(kind = event.kind(), switch = %event.switch()))]
    pub fn dispatch(&self, event: ControllerEvent) -> Option<EventOutcome> {
        match self.handle(event) {
            Ok(outcome) => {
                trace!(?outcome, "事件处理完成");
                Some(outcome)
            }
            Err(err) => {
                match &err {
                    ControllerError::UnknownHost(ip) => debug!(%ip, "主机未知，丢弃"),
                    ControllerError::NoPath { .. } => {
                        Stats::bump(&self.stats.no_path);
                        info!(error = %err, "🚫 无可达路径，丢弃数据包");
                    }
                    ControllerError::MalformedFrame(_) => {
                        Stats::bump(&self.stats.ignored_frames);
                        debug!(error = %err, "无法解析的帧");
                    }
                    ControllerError::NoSuchEdge { .. }
                    | ControllerError::SwitchUnavailable(_)
                    | ControllerError::NotASwitch(_)
                    | ControllerError::PathTooShort { .. } => {
                        Stats::bump(&self.stats.aborted);
                        warn!(error = %err, "⚠️ 中止本次尝试");
                    }
                }
                None
            }
        }
    }

    fn on_features(&self, switch: SwitchId) -> Result<EventOutcome> {
        let channel = self
            .registry
            .channel(switch)
            .ok_or(ControllerError::SwitchUnavailable(switch))?;
        let mut bootstrap = self.bootstrap.lock().unwrap_or_else(PoisonError::into_inner);
        let prev = bootstrap
            .entry(switch)
            .or_default()
            .on_features(channel.as_ref(), self.config.table_miss_priority);
        if prev == BootstrapState::TableMissInstalled {
            debug!(%switch, "重复的特性通告，table-miss 规则已重新下发");
        }
        Ok(EventOutcome::TableMissInstalled)
    }

    fn on_packet_in(&self, switch: SwitchId, in_port: PortNo, frame: Vec<u8>) -> Result<EventOutcome> {
        match parse_frame(&frame)? {
            Frame::Arp(msg) => self.on_arp(switch, in_port, &msg),
            Frame::Ipv4 { src, dst } => self.route_ipv4(switch, in_port, src, dst, &frame),
            Frame::Other { ethertype } => {
                Stats::bump(&self.stats.ignored_frames);
                trace!(ethertype, "忽略非 ARP/IPv4 帧");
                Ok(EventOutcome::Ignored { ethertype })
            }
        }
    }

    fn on_arp(&self, switch: SwitchId, in_port: PortNo, msg: &ArpMessage) -> Result<EventOutcome> {
        let outcome = self.arp.handle(switch, in_port, msg);
        match outcome.learned {
            Some(HostUpdate::Learned) => Stats::bump(&self.stats.hosts_learned),
            Some(HostUpdate::Relocated { .. }) => Stats::bump(&self.stats.hosts_relocated),
            _ => {}
        }

        match outcome.action {
            ArpAction::LearnOnly => Ok(EventOutcome::learned(msg.sender_ip, outcome.learned)),
            ArpAction::Unresolved(target) => {
                Stats::bump(&self.stats.arp_unresolved);
                Err(ControllerError::UnknownHost(target))
            }
            ArpAction::Reply { frame, .. } => {
                let channel = self
                    .registry
                    .channel(switch)
                    .ok_or(ControllerError::SwitchUnavailable(switch))?;
                channel.send_packet_out(in_port, frame);
                Stats::bump(&self.stats.arp_replies);
                Stats::bump(&self.stats.packet_outs);
                Ok(EventOutcome::ArpReplied {
                    target: msg.target_ip,
                })
            }
        }
    }

    /// 为新流的首包计算路径并安装规则；路径与规则基于同一份快照。
    #[tracing::instrument(skip(self, frame), fields(switch = %switch, in_port = %in_port, src = %src, dst = %dst))]
    fn route_ipv4(
        &self,
        switch: SwitchId,
        in_port: PortNo,
        src: Ipv4Addr,
        dst: Ipv4Addr,
        frame: &[u8],
    ) -> Result<EventOutcome> {
        let snapshot = self.topology.snapshot();
        let dst_host = snapshot
            .host(dst)
            .copied()
            .ok_or(ControllerError::UnknownHost(dst))?;

        // 入口交换机就是目的主机的接入交换机时，路径直接到主机，首包从主机端口送出。
        let target = if dst_host.switch == switch {
            NodeId::Host(dst)
        } else {
            NodeId::Switch(dst_host.switch)
        };
        let path = shortest_path(&snapshot, NodeId::Switch(switch), target)?;
        debug!(path = ?path, "计算得到路径");

        let flow_mods =
            self.installer
                .install_path(&snapshot, &path, &FlowMatch::ipv4(src, dst), frame)?;

        Stats::bump(&self.stats.flows_routed);
        Stats::add(&self.stats.flow_mods, flow_mods as u64);
        Stats::bump(&self.stats.packet_outs);
        Ok(EventOutcome::FlowInstalled {
            src,
            dst,
            flow_mods,
        })
    }
}
