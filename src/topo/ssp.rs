//! SSP 拓扑
//!
//! R1 与 R4 之间有一条直连和两条经 R2 / R3 的两跳路径。H1、H3 挂在 R1，H2、H4 挂在 R4。

use std::net::Ipv4Addr;

use super::Topo;

pub fn build_ssp() -> Topo {
    let mut topo = Topo::default();
    topo.link(1, 1, 2, 1)
        .link(1, 2, 3, 1)
        .link(1, 3, 4, 1)
        .link(2, 2, 4, 2)
        .link(3, 2, 4, 3)
        .host("H1", Ipv4Addr::new(10, 0, 0, 1), 1, 4)
        .host("H3", Ipv4Addr::new(10, 0, 0, 3), 1, 5)
        .host("H2", Ipv4Addr::new(10, 0, 0, 2), 4, 4)
        .host("H4", Ipv4Addr::new(10, 0, 0, 4), 4, 5);
    topo
}
