//! 流表安装
//!
//! 把一条计算好的路径变成逐交换机的转发规则，并把触发本次计算的首包沿路径注入。
//! 规则先从头到尾全部下发，再回放首包，以降低（但不能消除）首包先于规则到达的概率。
//! 下发不等待交换机确认；中途失败时已下发的规则不回滚。

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::registry::{FlowAction, FlowMatch, FlowMod, SwitchChannel, SwitchRegistry};
use crate::net::{ControllerError, NodeId, PortNo, Result, SwitchId, Topology};

pub struct FlowInstaller {
    registry: Arc<dyn SwitchRegistry>,
    priority: u16,
}

impl FlowInstaller {
    pub fn new(registry: Arc<dyn SwitchRegistry>, priority: u16) -> Self {
        Self { registry, priority }
    }

    fn channel(&self, id: SwitchId) -> Result<Arc<dyn SwitchChannel>> {
        self.registry
            .channel(id)
            .ok_or(ControllerError::SwitchUnavailable(id))
    }

    /// 沿 `path` 安装规则并注入 `frame`，返回下发的 flow-mod 数量。
    ///
    /// 对 N 个节点的路径：中间 N-2 个交换机各一条 flow-mod，随后在首节点朝下一跳的
    /// 出端口上发送恰好一个 packet-out。所有出端口都在下发前基于同一拓扑快照解析，
    /// 因此 `NoSuchEdge` 发生时不会有任何命令发出。
    #[tracing::instrument(skip(self, topo, path, frame), fields(nodes = path.len(), src = ?matches.ipv4_src, dst = ?matches.ipv4_dst))]
    pub fn install_path(
        &self,
        topo: &Topology,
        path: &[NodeId],
        matches: &FlowMatch,
        frame: &[u8],
    ) -> Result<usize> {
        if path.len() < 2 {
            return Err(ControllerError::PathTooShort { len: path.len() });
        }

        // hops[i] = (path[i] 对应的交换机, 朝 path[i+1] 的出端口)，不含最后一个节点
        let hops = path
            .windows(2)
            .map(|pair| {
                let switch = pair[0].as_switch().ok_or(ControllerError::NotASwitch(pair[0]))?;
                let edge = topo.edge(pair[0], pair[1])?;
                Ok((switch, edge.out_port))
            })
            .collect::<Result<Vec<(SwitchId, PortNo)>>>()?;

        let mut installed = 0;
        for &(switch, out_port) in &hops[1..] {
            let channel = match self.channel(switch) {
                Ok(ch) => ch,
                Err(err) => {
                    warn!(%switch, installed, "⚠️ 交换机不可用，中止剩余安装");
                    return Err(err);
                }
            };
            channel.install_flow(FlowMod {
                priority: self.priority,
                matches: *matches,
                action: FlowAction::Output(out_port),
            });
            debug!(%switch, %out_port, "下发 flow-mod");
            installed += 1;
        }

        let (first, first_port) = hops[0];
        self.channel(first)?
            .send_packet_out(first_port, frame.to_vec());
        info!(installed, first = %first, out_port = %first_port, "✅ 路径规则已下发，首包已注入");
        Ok(installed)
    }
}
