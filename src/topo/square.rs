//! Square 拓扑
//!
//! s1 - s2 - s3 - s4 - s1 环，s1 与 s4 各挂两台主机。

use std::net::Ipv4Addr;

use super::Topo;

pub fn build_square() -> Topo {
    let mut topo = Topo::default();
    topo.link(1, 1, 2, 1)
        .link(2, 2, 3, 1)
        .link(3, 2, 4, 1)
        .link(4, 2, 1, 2)
        .host("h1_1", Ipv4Addr::new(10, 0, 0, 11), 1, 3)
        .host("h1_2", Ipv4Addr::new(10, 0, 0, 12), 1, 4)
        .host("h4_1", Ipv4Addr::new(10, 0, 0, 41), 4, 3)
        .host("h4_2", Ipv4Addr::new(10, 0, 0, 42), 4, 4);
    topo
}
