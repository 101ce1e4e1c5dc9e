//! 线形拓扑
//!
//! s1 - s2 - ... - sN。每台交换机：端口 1 留给主机，端口 2 朝西，端口 3 朝东。

use super::Topo;

pub const HOST_PORT: u32 = 1;
pub const WEST_PORT: u32 = 2;
pub const EAST_PORT: u32 = 3;

/// 构建 `n` 台交换机的线形拓扑（不含主机）
pub fn build_line(n: u64) -> Topo {
    let mut topo = Topo::default();
    for id in 1..=n {
        topo.switch(id);
    }
    for id in 1..n {
        topo.link(id, EAST_PORT, id + 1, WEST_PORT);
    }
    topo
}
