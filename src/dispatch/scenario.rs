use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::event_loop::EventLoop;
use super::time::EventTime;
use crate::ctl::{ConfigError, ControllerConfig, ControllerEvent, Deliver};
use crate::net::{MacAddr, PortNo, SwitchId, arp_request, ipv4_frame};
use crate::topo::Topo;
use crate::topo::line::build_line;
use crate::topo::square::build_square;
use crate::topo::geant::build_geant;
use crate::topo::ssp::build_ssp;

pub const SCHEMA_VERSION: u32 = 1;

/// Payload carried by synthesised IPv4 frames.
const IPV4_PAYLOAD: &[u8] = b"sdnroute";

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("controller config: {0}")]
    Config(#[from] ConfigError),

    #[error("unsupported schema_version {0}")]
    UnsupportedSchema(u32),

    #[error("traffic references unknown host {0:?}")]
    UnknownHost(String),

    #[error("host {0:?} defined twice")]
    DuplicateHost(String),

    #[error("topology references undeclared switch {0}")]
    UnknownSwitch(SwitchId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub controller: Option<ControllerConfig>,
    pub topology: TopologySpec,
    #[serde(default)]
    pub hosts: Vec<HostSpec>,
    #[serde(default)]
    pub traffic: Vec<TrafficSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySpec {
    Line {
        switches: u64,
    },
    Square,
    Ssp,
    Geant,
    Custom {
        switches: Vec<SwitchSpec>,
        #[serde(default)]
        links: Vec<LinkSpec>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSpec {
    pub id: SwitchId,
    #[serde(default)]
    pub ports: Vec<PortNo>,
}

/// A bidirectional switch-switch link; replay reports each direction separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub src: SwitchId,
    pub src_port: PortNo,
    pub dst: SwitchId,
    pub dst_port: PortNo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpec {
    pub name: String,
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    pub switch: SwitchId,
    pub port: PortNo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrafficSpec {
    /// `from` broadcasts an ARP request for `target`.
    ArpRequest {
        #[serde(default)]
        at_us: u64,
        from: String,
        target: Ipv4Addr,
    },
    /// `from` sends one IPv4 packet to `to`.
    Ipv4 {
        #[serde(default)]
        at_us: u64,
        from: String,
        to: String,
    },
}

impl ScenarioSpec {
    pub fn parse(raw: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCHEMA_VERSION {
            return Err(ScenarioError::UnsupportedSchema(spec.schema_version));
        }
        Ok(spec)
    }

    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Controller settings from the `controller` block, validated.
    pub fn controller_config(&self) -> Result<ControllerConfig, ScenarioError> {
        let config = self.controller.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Built-in topology plus the hosts listed in the scenario.
    ///
    /// Fails with `UnknownSwitch` when a link or host names a switch the
    /// topology does not declare.
    pub fn build_topology(&self) -> Result<Topo, ScenarioError> {
        let mut topo = match &self.topology {
            TopologySpec::Line { switches } => build_line(*switches),
            TopologySpec::Square => build_square(),
            TopologySpec::Ssp => build_ssp(),
            TopologySpec::Geant => build_geant(),
            TopologySpec::Custom { switches, links } => Topo {
                switches: switches.clone(),
                links: links.clone(),
                hosts: Vec::new(),
            },
        };
        for host in &self.hosts {
            if topo.hosts.iter().any(|h| h.name == host.name) {
                return Err(ScenarioError::DuplicateHost(host.name.clone()));
            }
            topo.hosts.push(host.clone());
        }

        // 链路与主机只能挂在声明过的交换机上，否则该交换机没有控制通道。
        let declared: BTreeSet<SwitchId> = topo.switches.iter().map(|s| s.id).collect();
        let referenced = topo
            .links
            .iter()
            .flat_map(|l| [l.src, l.dst])
            .chain(topo.hosts.iter().map(|h| h.switch));
        for id in referenced {
            if !declared.contains(&id) {
                return Err(ScenarioError::UnknownSwitch(id));
            }
        }
        Ok(topo)
    }

    /// Queue the whole scenario on `ev_loop`; returns the number of events.
    ///
    /// At t=0 every switch announces its features and connects, and every link
    /// is discovered in both directions. Traffic follows at its `at_us`.
    pub fn schedule(&self, ev_loop: &mut EventLoop) -> Result<usize, ScenarioError> {
        let topo = self.build_topology()?;
        let hosts: BTreeMap<&str, &HostSpec> =
            topo.hosts.iter().map(|h| (h.name.as_str(), h)).collect();
        let lookup = |name: &str| {
            hosts
                .get(name)
                .copied()
                .ok_or_else(|| ScenarioError::UnknownHost(name.to_string()))
        };

        // Resolve every traffic item first so a bad reference schedules nothing.
        let mut packets = Vec::with_capacity(self.traffic.len());
        for item in &self.traffic {
            let (at_us, sender, frame) = match item {
                TrafficSpec::ArpRequest { at_us, from, target } => {
                    let h = lookup(from.as_str())?;
                    (*at_us, h, arp_request(h.mac, h.ip, *target))
                }
                TrafficSpec::Ipv4 { at_us, from, to } => {
                    let (a, b) = (lookup(from.as_str())?, lookup(to.as_str())?);
                    (*at_us, a, ipv4_frame(a.mac, b.mac, a.ip, b.ip, IPV4_PAYLOAD))
                }
            };
            packets.push((
                EventTime::from_micros(at_us),
                ControllerEvent::PacketIn {
                    switch: sender.switch,
                    in_port: sender.port,
                    frame,
                },
            ));
        }

        let mut events = Vec::new();
        for sw in &topo.switches {
            events.push((EventTime::ZERO, ControllerEvent::SwitchFeaturesReady { switch: sw.id }));
            events.push((
                EventTime::ZERO,
                ControllerEvent::SwitchConnected {
                    switch: sw.id,
                    ports: sw.ports.clone(),
                },
            ));
        }
        for link in &topo.links {
            events.push((
                EventTime::ZERO,
                ControllerEvent::LinkDiscovered {
                    src: link.src,
                    src_port: link.src_port,
                    dst: link.dst,
                    dst_port: link.dst_port,
                },
            ));
            events.push((
                EventTime::ZERO,
                ControllerEvent::LinkDiscovered {
                    src: link.dst,
                    src_port: link.dst_port,
                    dst: link.src,
                    dst_port: link.src_port,
                },
            ));
        }
        debug!(
            switches = topo.switches.len(),
            links = topo.links.len(),
            hosts = topo.hosts.len(),
            "拓扑事件已生成"
        );
        events.extend(packets);

        let count = events.len();
        for (at, ev) in events {
            ev_loop.schedule(at, Deliver(ev));
        }
        info!(events = count, "📋 场景已入队");
        Ok(count)
    }
}
