//! 拓扑存储
//!
//! 交换机、已发现主机以及带权有向边的唯一数据源。拓扑只增不减：
//! 没有任何操作删除节点或边，控制器重启后一切从事件重新学习。

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, trace};

use super::error::{ControllerError, Result};
use super::id::{MacAddr, NodeId, PortNo, SwitchId};
use super::node::{Edge, HostNode, HostUpdate, SwitchNode};

/// 主机与交换机之间边的固定权重
pub const HOST_EDGE_WEIGHT: u32 = 1;

/// 拓扑图（纯数据结构，不带锁）
///
/// 所有集合都是有序的，遍历顺序与插入顺序无关。
#[derive(Debug, Clone, Default)]
pub struct Topology {
    switches: BTreeMap<SwitchId, SwitchNode>,
    hosts: BTreeMap<Ipv4Addr, HostNode>,
    edges: BTreeMap<NodeId, BTreeMap<NodeId, Edge>>,
}

impl Topology {
    /// 添加交换机（幂等），并合并上报的端口
    pub fn add_switch(&mut self, id: SwitchId, ports: &[PortNo]) -> bool {
        let created = !self.switches.contains_key(&id);
        let node = self.switches.entry(id).or_default();
        node.ports.extend(ports.iter().copied());
        created
    }

    /// 插入或更新一条交换机之间的有向边，缺失的端点会被创建
    pub fn add_link(&mut self, from: SwitchId, to: SwitchId, out_port: PortNo, weight: u32) {
        self.add_switch(from, &[out_port]);
        self.add_switch(to, &[]);
        self.insert_edge(NodeId::Switch(from), NodeId::Switch(to), Edge { weight, out_port });
    }

    /// 创建或覆盖主机，并（重新）建立主机与交换机之间的双向边
    pub fn upsert_host(
        &mut self,
        ip: Ipv4Addr,
        mac: MacAddr,
        switch: SwitchId,
        port: PortNo,
    ) -> HostUpdate {
        let next = HostNode { mac, switch, port };
        let update = match self.hosts.get(&ip) {
            None => HostUpdate::Learned,
            Some(prev) if *prev == next => return HostUpdate::Unchanged,
            Some(prev) if prev.switch != switch || prev.port != port => HostUpdate::Relocated {
                from: prev.switch,
                port: prev.port,
            },
            Some(_) => HostUpdate::Refreshed,
        };

        self.hosts.insert(ip, next);
        self.add_switch(switch, &[port]);
        let edge = Edge {
            weight: HOST_EDGE_WEIGHT,
            out_port: port,
        };
        self.insert_edge(NodeId::Host(ip), NodeId::Switch(switch), edge);
        self.insert_edge(NodeId::Switch(switch), NodeId::Host(ip), edge);
        update
    }

    fn insert_edge(&mut self, from: NodeId, to: NodeId, edge: Edge) {
        trace!(%from, %to, weight = edge.weight, out_port = %edge.out_port, "写入边");
        self.edges.entry(from).or_default().insert(to, edge);
    }

    /// 查询有向边 `(u, v)`
    pub fn edge(&self, u: NodeId, v: NodeId) -> Result<Edge> {
        self.edges
            .get(&u)
            .and_then(|out| out.get(&v))
            .copied()
            .ok_or(ControllerError::NoSuchEdge { from: u, to: v })
    }

    /// `u` 的出边（按邻居标识有序）
    pub fn neighbors(&self, u: NodeId) -> impl Iterator<Item = (NodeId, Edge)> + '_ {
        self.edges
            .get(&u)
            .into_iter()
            .flat_map(|out| out.iter().map(|(v, e)| (*v, *e)))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        match node {
            NodeId::Switch(id) => self.switches.contains_key(&id),
            NodeId::Host(ip) => self.hosts.contains_key(&ip),
        }
    }

    pub fn host(&self, ip: Ipv4Addr) -> Option<&HostNode> {
        self.hosts.get(&ip)
    }

    pub fn switch(&self, id: SwitchId) -> Option<&SwitchNode> {
        self.switches.get(&id)
    }

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }
}

/// 一次流建立尝试使用的只读拓扑视图
///
/// 之后发生的更新不会影响已经取出的快照。
#[derive(Debug, Clone)]
pub struct TopologySnapshot(Arc<Topology>);

impl Deref for TopologySnapshot {
    type Target = Topology;

    fn deref(&self) -> &Topology {
        &self.0
    }
}

/// 线程安全的拓扑存储：一把粗粒度锁包住每个操作
///
/// 写时复制：持有中的快照不受后续修改影响，修改时若仍有快照存活才会克隆图。
#[derive(Debug, Default)]
pub struct TopologyStore {
    graph: Mutex<Arc<Topology>>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_graph<R>(&self, f: impl FnOnce(&mut Arc<Topology>) -> R) -> R {
        // 任何操作都不会在持锁期间 panic 后留下半写状态，因此中毒后照常使用。
        let mut guard = self.graph.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// 添加交换机（幂等）
    #[tracing::instrument(skip(self, ports), fields(switch = %id, ports = ports.len()))]
    pub fn add_switch(&self, id: SwitchId, ports: &[PortNo]) {
        let created = self.with_graph(|g| {
            let known = g.switch(id).is_some_and(|node| ports.iter().all(|p| node.ports.contains(p)));
            if known {
                return false;
            }
            Arc::make_mut(g).add_switch(id, ports)
        });
        if created {
            info!("🔌 新交换机加入拓扑");
        } else {
            trace!("交换机已存在");
        }
    }

    /// 插入或更新交换机之间的有向边（幂等）
    #[tracing::instrument(skip(self), fields(from = %from, to = %to, out_port = %out_port))]
    pub fn add_link(&self, from: SwitchId, to: SwitchId, out_port: PortNo, weight: u32) {
        let changed = self.with_graph(|g| {
            let same = g.edge(from.into(), to.into()).ok() == Some(Edge { weight, out_port });
            if same {
                return false;
            }
            Arc::make_mut(g).add_link(from, to, out_port, weight);
            true
        });
        if changed {
            debug!(weight, "🔗 链路写入拓扑");
        }
    }

    /// 创建或更新主机位置
    #[tracing::instrument(skip(self), fields(ip = %ip, mac = %mac, switch = %switch, port = %port))]
    pub fn upsert_host(&self, ip: Ipv4Addr, mac: MacAddr, switch: SwitchId, port: PortNo) -> HostUpdate {
        let update = self.with_graph(|g| {
            let unchanged = g.host(ip) == Some(&HostNode { mac, switch, port });
            if unchanged {
                return HostUpdate::Unchanged;
            }
            Arc::make_mut(g).upsert_host(ip, mac, switch, port)
        });
        match update {
            HostUpdate::Learned => info!("🖥️  学习到新主机"),
            HostUpdate::Relocated { from, port } => {
                info!(prev_switch = %from, prev_port = %port, "主机位置变化")
            }
            HostUpdate::Refreshed => debug!("主机 MAC 更新"),
            HostUpdate::Unchanged => trace!("主机信息未变化"),
        }
        update
    }

    /// 查询有向边
    pub fn edge(&self, u: NodeId, v: NodeId) -> Result<Edge> {
        self.with_graph(|g| g.edge(u, v))
    }

    /// 查询主机
    pub fn host(&self, ip: Ipv4Addr) -> Option<HostNode> {
        self.with_graph(|g| g.host(ip).copied())
    }

    /// 获取一致的只读快照
    pub fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot(self.with_graph(|g| Arc::clone(g)))
    }
}
