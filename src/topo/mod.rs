//! 参考拓扑
//!
//! 实验脚本使用的几种拓扑，端口号按 Mininet 的 `addLink` 顺序分配。

pub mod geant;
pub mod line;
pub mod square;
pub mod ssp;

use std::net::Ipv4Addr;

use crate::dispatch::{HostSpec, LinkSpec, SwitchSpec};
use crate::net::{MacAddr, PortNo, SwitchId};

/// 交换机、链路与主机的静态描述
#[derive(Debug, Clone, Default)]
pub struct Topo {
    pub switches: Vec<SwitchSpec>,
    pub links: Vec<LinkSpec>,
    pub hosts: Vec<HostSpec>,
}

impl Topo {
    fn switch_mut(&mut self, id: SwitchId) -> &mut SwitchSpec {
        let idx = match self.switches.iter().position(|s| s.id == id) {
            Some(idx) => idx,
            None => {
                self.switches.push(SwitchSpec { id, ports: Vec::new() });
                self.switches.len() - 1
            }
        };
        &mut self.switches[idx]
    }

    fn add_port(&mut self, id: SwitchId, port: PortNo) {
        let sw = self.switch_mut(id);
        if !sw.ports.contains(&port) {
            sw.ports.push(port);
            sw.ports.sort();
        }
    }

    /// 添加交换机（无端口时也会出现在拓扑中）
    pub fn switch(&mut self, id: u64) -> &mut Self {
        self.switch_mut(SwitchId(id));
        self
    }

    /// 交换机上下一个未使用的端口号（Mininet 按 `addLink` 顺序从 1 开始分配）
    pub fn next_port(&self, id: u64) -> u32 {
        self.switches
            .iter()
            .find(|s| s.id == SwitchId(id))
            .and_then(|s| s.ports.last())
            .map_or(1, |p| p.0 + 1)
    }

    /// 添加一条双向链路
    pub fn link(&mut self, a: u64, a_port: u32, b: u64, b_port: u32) -> &mut Self {
        let (src, src_port, dst, dst_port) = (SwitchId(a), PortNo(a_port), SwitchId(b), PortNo(b_port));
        self.add_port(src, src_port);
        self.add_port(dst, dst_port);
        self.links.push(LinkSpec {
            src,
            src_port,
            dst,
            dst_port,
        });
        self
    }

    /// 添加主机，MAC 由 IP 最后一个字节派生
    pub fn host(&mut self, name: &str, ip: Ipv4Addr, switch: u64, port: u32) -> &mut Self {
        self.add_port(SwitchId(switch), PortNo(port));
        self.hosts.push(HostSpec {
            name: name.to_string(),
            ip,
            mac: mac_for(ip),
            switch: SwitchId(switch),
            port: PortNo(port),
        });
        self
    }
}

/// `10.0.0.11` -> `00:00:00:00:00:0b`
pub fn mac_for(ip: Ipv4Addr) -> MacAddr {
    let [_, _, _, last] = ip.octets();
    MacAddr([0, 0, 0, 0, 0, last])
}
