//! 最短路径计算
//!
//! 在拓扑快照上从 `src` 做单源 Dijkstra，边权取存储值（非负整数）。
//! 不做缓存：每条新流的首包都会重新计算。
//!
//! 平局裁决：节点按 `(距离, NodeId)` 升序出堆，只有严格更短的距离才会替换
//! 前驱，因此多条等价路径中，前驱最先出堆的那条胜出。结果与边的插入顺序无关。

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use tracing::{debug, trace};

use super::error::{ControllerError, Result};
use super::id::NodeId;
use super::topology::Topology;

/// 计算 `src` 到 `dst` 的最小权重路径（含两端）。
///
/// 主机节点只在作为源点时展开，不会被用作中继。
#[tracing::instrument(skip(topo), fields(src = %src, dst = %dst))]
pub fn shortest_path(topo: &Topology, src: NodeId, dst: NodeId) -> Result<Vec<NodeId>> {
    let no_path = ControllerError::NoPath { src, dst };
    if !topo.contains(src) || !topo.contains(dst) {
        debug!("端点不在拓扑中");
        return Err(no_path);
    }
    if src == dst {
        return Ok(vec![src]);
    }

    let mut dist: BTreeMap<NodeId, u64> = BTreeMap::new();
    let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(src, 0);
    heap.push(Reverse((0u64, src)));

    while let Some(Reverse((d, u))) = heap.pop() {
        if dist.get(&u).is_some_and(|&best| d > best) {
            continue; // 过期条目
        }
        if u == dst {
            break;
        }
        if u.is_host() && u != src {
            continue;
        }
        for (v, edge) in topo.neighbors(u) {
            let nd = d.saturating_add(edge.weight as u64);
            let better = dist.get(&v).is_none_or(|&cur| nd < cur);
            if better {
                trace!(from = %u, to = %v, dist = nd, "松弛");
                dist.insert(v, nd);
                prev.insert(v, u);
                heap.push(Reverse((nd, v)));
            }
        }
    }

    let Some(&total) = dist.get(&dst) else {
        debug!("目的不可达");
        return Err(no_path);
    };

    let mut path = vec![dst];
    let mut cur = dst;
    while let Some(&p) = prev.get(&cur) {
        path.push(p);
        cur = p;
    }
    path.reverse();

    debug!(hops = path.len() - 1, total_weight = total, "🧭 最短路径");
    Ok(path)
}

/// 路径上各边权重之和
pub fn path_weight(topo: &Topology, path: &[NodeId]) -> Result<u64> {
    path.windows(2).try_fold(0u64, |acc, hop| {
        let edge = topo.edge(hop[0], hop[1])?;
        Ok(acc.saturating_add(edge.weight as u64))
    })
}
