use crate::net::{
    ControllerError, MacAddr, NodeId, PortNo, SwitchId, Topology, path_weight, shortest_path,
};
use std::net::Ipv4Addr;

fn sw(id: u64) -> NodeId {
    NodeId::Switch(SwitchId(id))
}

fn host(last: u8) -> NodeId {
    NodeId::Host(Ipv4Addr::new(10, 0, 0, last))
}

/// Both directions of a switch-switch link with the same weight.
fn link(topo: &mut Topology, a: u64, a_port: u32, b: u64, b_port: u32, weight: u32) {
    topo.add_link(SwitchId(a), SwitchId(b), PortNo(a_port), weight);
    topo.add_link(SwitchId(b), SwitchId(a), PortNo(b_port), weight);
}

fn attach(topo: &mut Topology, last: u8, switch: u64, port: u32) {
    topo.upsert_host(
        Ipv4Addr::new(10, 0, 0, last),
        MacAddr([0, 0, 0, 0, 0, last]),
        SwitchId(switch),
        PortNo(port),
    );
}

/// s1 - s2 - s3 with H1 on s1 and H2 on s3.
fn line3() -> Topology {
    let mut topo = Topology::default();
    link(&mut topo, 1, 3, 2, 2, 1);
    link(&mut topo, 2, 3, 3, 2, 1);
    attach(&mut topo, 1, 1, 1);
    attach(&mut topo, 2, 3, 1);
    topo
}

#[test]
fn line_path_between_hosts() {
    let topo = line3();
    let path = shortest_path(&topo, host(1), host(2)).expect("path");
    assert_eq!(path, vec![host(1), sw(1), sw(2), sw(3), host(2)]);
    assert_eq!(path_weight(&topo, &path), Ok(4));
}

#[test]
fn line_path_between_switches() {
    let topo = line3();
    assert_eq!(
        shortest_path(&topo, sw(1), sw(3)),
        Ok(vec![sw(1), sw(2), sw(3)])
    );
    assert_eq!(
        shortest_path(&topo, sw(3), sw(1)),
        Ok(vec![sw(3), sw(2), sw(1)])
    );
}

#[test]
fn same_endpoint_is_a_single_node_path() {
    let topo = line3();
    assert_eq!(shortest_path(&topo, sw(2), sw(2)), Ok(vec![sw(2)]));
    assert_eq!(path_weight(&topo, &[sw(2)]), Ok(0));
}

#[test]
fn weights_beat_hop_count() {
    // s1 -10- s4 directly, or s1 -1- s2 -1- s3 -1- s4.
    let mut topo = Topology::default();
    link(&mut topo, 1, 1, 4, 1, 10);
    link(&mut topo, 1, 2, 2, 1, 1);
    link(&mut topo, 2, 2, 3, 1, 1);
    link(&mut topo, 3, 2, 4, 2, 1);

    let path = shortest_path(&topo, sw(1), sw(4)).expect("path");
    assert_eq!(path, vec![sw(1), sw(2), sw(3), sw(4)]);
    assert_eq!(path_weight(&topo, &path), Ok(3));
}

#[test]
fn unknown_endpoint_is_no_path() {
    let topo = line3();
    assert_eq!(
        shortest_path(&topo, sw(1), sw(9)),
        Err(ControllerError::NoPath {
            src: sw(1),
            dst: sw(9)
        })
    );
    assert_eq!(
        shortest_path(&topo, host(7), sw(1)),
        Err(ControllerError::NoPath {
            src: host(7),
            dst: sw(1)
        })
    );
}

#[test]
fn disconnected_components_are_no_path() {
    let mut topo = line3();
    link(&mut topo, 8, 1, 9, 1, 1);
    assert_eq!(
        shortest_path(&topo, sw(1), sw(9)),
        Err(ControllerError::NoPath {
            src: sw(1),
            dst: sw(9)
        })
    );
}

#[test]
fn one_way_link_is_not_traversed_backwards() {
    let mut topo = Topology::default();
    topo.add_link(SwitchId(1), SwitchId(2), PortNo(1), 1);
    assert_eq!(shortest_path(&topo, sw(1), sw(2)), Ok(vec![sw(1), sw(2)]));
    assert!(matches!(
        shortest_path(&topo, sw(2), sw(1)),
        Err(ControllerError::NoPath { .. })
    ));
}

#[test]
fn hosts_are_never_used_as_relays() {
    // s1 and s2 share no link, but a host is (mis)learned on both.
    let mut topo = Topology::default();
    topo.add_switch(SwitchId(1), &[PortNo(1)]);
    topo.add_switch(SwitchId(2), &[PortNo(1)]);
    attach(&mut topo, 5, 1, 1);
    topo.upsert_host(
        Ipv4Addr::new(10, 0, 0, 5),
        MacAddr([0, 0, 0, 0, 0, 5]),
        SwitchId(2),
        PortNo(1),
    );

    assert!(matches!(
        shortest_path(&topo, sw(1), sw(2)),
        Err(ControllerError::NoPath { .. })
    ));
    // The host itself may still start a path.
    assert_eq!(shortest_path(&topo, host(5), sw(2)), Ok(vec![host(5), sw(2)]));
}

#[test]
fn equal_cost_tie_goes_to_lowest_switch_id() {
    // Diamond: s1 -> {s3, s2} -> s4, all weight 1. Links to s3 are added first.
    let mut topo = Topology::default();
    link(&mut topo, 1, 1, 3, 1, 1);
    link(&mut topo, 3, 2, 4, 1, 1);
    link(&mut topo, 1, 2, 2, 1, 1);
    link(&mut topo, 2, 2, 4, 2, 1);

    for _ in 0..3 {
        assert_eq!(
            shortest_path(&topo, sw(1), sw(4)),
            Ok(vec![sw(1), sw(2), sw(4)])
        );
    }
}

#[test]
fn tie_break_does_not_depend_on_insertion_order() {
    let mut a = Topology::default();
    link(&mut a, 1, 1, 2, 1, 1);
    link(&mut a, 1, 2, 3, 1, 1);
    link(&mut a, 2, 2, 4, 1, 1);
    link(&mut a, 3, 2, 4, 2, 1);

    let mut b = Topology::default();
    link(&mut b, 3, 2, 4, 2, 1);
    link(&mut b, 2, 2, 4, 1, 1);
    link(&mut b, 1, 2, 3, 1, 1);
    link(&mut b, 1, 1, 2, 1, 1);

    assert_eq!(shortest_path(&a, sw(1), sw(4)), shortest_path(&b, sw(1), sw(4)));
}

#[test]
fn ssp_prefers_direct_link() {
    // R1 has a direct link to R4 plus two 2-hop detours.
    let mut topo = Topology::default();
    link(&mut topo, 1, 1, 2, 1, 1);
    link(&mut topo, 1, 2, 3, 1, 1);
    link(&mut topo, 1, 3, 4, 1, 1);
    link(&mut topo, 2, 2, 4, 2, 1);
    link(&mut topo, 3, 2, 4, 3, 1);
    attach(&mut topo, 1, 1, 4);
    attach(&mut topo, 2, 4, 4);

    assert_eq!(
        shortest_path(&topo, host(1), host(2)),
        Ok(vec![host(1), sw(1), sw(4), host(2)])
    );
}

#[test]
fn path_weight_reports_missing_edge() {
    let topo = line3();
    assert_eq!(
        path_weight(&topo, &[sw(1), sw(3)]),
        Err(ControllerError::NoSuchEdge {
            from: sw(1),
            to: sw(3)
        })
    );
}

/// Minimum over all simple switch paths, by exhaustive search.
fn brute_force_min(topo: &Topology, at: NodeId, dst: NodeId, seen: &mut Vec<NodeId>) -> Option<u64> {
    if at == dst {
        return Some(0);
    }
    let mut best: Option<u64> = None;
    for (next, edge) in topo.neighbors(at) {
        if seen.contains(&next) || (next.is_host() && next != dst) {
            continue;
        }
        seen.push(next);
        if let Some(rest) = brute_force_min(topo, next, dst, seen) {
            let total = rest + edge.weight as u64;
            best = Some(best.map_or(total, |b| b.min(total)));
        }
        seen.pop();
    }
    best
}

#[test]
fn dijkstra_matches_exhaustive_search() {
    // Small mesh with uneven weights, including a zero-weight link.
    let mut topo = Topology::default();
    let links: [(u64, u64, u32); 9] = [
        (1, 2, 4),
        (1, 3, 1),
        (3, 2, 1),
        (2, 4, 5),
        (3, 4, 8),
        (3, 5, 0),
        (5, 4, 3),
        (4, 6, 2),
        (5, 6, 9),
    ];
    for (i, &(a, b, w)) in links.iter().enumerate() {
        let port = i as u32 + 1;
        link(&mut topo, a, port, b, port, w);
    }

    for src in 1..=6 {
        for dst in 1..=6 {
            let path = shortest_path(&topo, sw(src), sw(dst)).expect("connected mesh");
            assert_eq!(path.first(), Some(&sw(src)));
            assert_eq!(path.last(), Some(&sw(dst)));
            let expected = brute_force_min(&topo, sw(src), sw(dst), &mut vec![sw(src)]);
            assert_eq!(path_weight(&topo, &path).ok(), expected, "{src} -> {dst}");
        }
    }
}
