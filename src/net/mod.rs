//! 网络拓扑模块
//!
//! 此模块包含控制器的拓扑存储、最短路径计算、帧编解码以及错误分类。

// 子模块声明
mod error;
mod id;
mod node;
mod packet;
mod routing;
mod stats;
mod topology;

// 重新导出公共接口
pub use error::{ControllerError, Result};
pub use id::{MacAddr, NodeId, ParseMacError, PortNo, SwitchId};
pub use node::{Edge, HostNode, HostUpdate, SwitchNode};
pub use packet::{
    ARP_PACKET_SIZE, ArpMessage, ArpOp, ETH_TYPE_IPV4, ETHERNET_HEADER_SIZE, Frame, arp_reply_for,
    arp_request, build_arp_frame, ipv4_frame, parse_frame,
};
pub use routing::{path_weight, shortest_path};
pub use stats::{Stats, StatsSnapshot};
pub use topology::{HOST_EDGE_WEIGHT, Topology, TopologySnapshot, TopologyStore};
