//! GEANT 拓扑
//!
//! 23 台交换机的 GEANT 骨干网，每台交换机 sN 挂一台主机 hN（10.0.0.N）。
//! 端口按 `addLink` 顺序分配：先是主机接入链路（端口 1），再按下表顺序分配骨干链路。

use std::net::Ipv4Addr;

use super::Topo;

pub const SWITCHES: u64 = 23;

/// 骨干链路，顺序决定端口号
pub const CORE_LINKS: [(u64, u64); 30] = [
    (1, 7),
    (2, 4),
    (2, 7),
    (2, 18),
    (2, 23),
    (2, 11),
    (2, 6),
    (3, 21),
    (4, 14),
    (4, 20),
    (5, 8),
    (5, 16),
    (5, 11),
    (6, 19),
    (6, 13),
    (6, 18),
    (7, 21),
    (7, 18),
    (8, 9),
    (8, 20),
    (10, 16),
    (11, 20),
    (11, 21),
    (11, 22),
    (11, 16),
    (12, 22),
    (15, 20),
    (17, 23),
    (18, 21),
    (22, 23),
];

pub fn build_geant() -> Topo {
    let mut topo = Topo::default();
    for id in 1..=SWITCHES {
        let last = id as u8;
        topo.host(&format!("h{id}"), Ipv4Addr::new(10, 0, 0, last), id, 1);
    }
    for (a, b) in CORE_LINKS {
        let (a_port, b_port) = (topo.next_port(a), topo.next_port(b));
        topo.link(a, a_port, b, b_port);
    }
    topo
}
