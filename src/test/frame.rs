use crate::net::{
    ARP_PACKET_SIZE, ArpMessage, ArpOp, ControllerError, ETHERNET_HEADER_SIZE, Frame, MacAddr,
    arp_reply_for, arp_request, build_arp_frame, ipv4_frame, parse_frame,
};
use std::net::Ipv4Addr;

const H1_MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
const H2_MAC: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x02]);
const H1_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const H2_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

#[test]
fn arp_request_is_broadcast_and_parses_back() {
    let frame = arp_request(H1_MAC, H1_IP, H2_IP);
    assert_eq!(frame.len(), ETHERNET_HEADER_SIZE + ARP_PACKET_SIZE);
    assert_eq!(&frame[..6], &MacAddr::BROADCAST.0);
    assert_eq!(&frame[6..12], &H1_MAC.0);

    let Frame::Arp(msg) = parse_frame(&frame).expect("parse") else {
        panic!("expected ARP");
    };
    assert_eq!(msg.op, ArpOp::Request);
    assert_eq!(msg.sender_mac, H1_MAC);
    assert_eq!(msg.sender_ip, H1_IP);
    assert_eq!(msg.target_mac, MacAddr::ZERO);
    assert_eq!(msg.target_ip, H2_IP);
}

#[test]
fn arp_reply_swaps_roles_and_is_unicast_to_requester() {
    let Frame::Arp(request) = parse_frame(&arp_request(H1_MAC, H1_IP, H2_IP)).expect("parse")
    else {
        panic!("expected ARP");
    };
    let reply = arp_reply_for(&request, H2_MAC);
    assert_eq!(&reply[..6], &H1_MAC.0);
    assert_eq!(&reply[6..12], &H2_MAC.0);

    assert_eq!(
        parse_frame(&reply),
        Ok(Frame::Arp(ArpMessage {
            op: ArpOp::Reply,
            sender_mac: H2_MAC,
            sender_ip: H2_IP,
            target_mac: H1_MAC,
            target_ip: H1_IP,
        }))
    );
}

#[test]
fn ipv4_frame_exposes_addresses() {
    let frame = ipv4_frame(H1_MAC, H2_MAC, H1_IP, H2_IP, b"hello");
    assert_eq!(
        parse_frame(&frame),
        Ok(Frame::Ipv4 {
            src: H1_IP,
            dst: H2_IP
        })
    );
    assert!(frame.ends_with(b"hello"));
}

#[test]
fn unknown_ethertype_is_other() {
    let mut frame = ipv4_frame(H1_MAC, H2_MAC, H1_IP, H2_IP, b"");
    // LLDP
    frame[12] = 0x88;
    frame[13] = 0xcc;
    assert_eq!(parse_frame(&frame), Ok(Frame::Other { ethertype: 0x88cc }));
}

#[test]
fn truncated_frames_are_malformed() {
    assert!(matches!(
        parse_frame(&[0u8; 6]),
        Err(ControllerError::MalformedFrame(_))
    ));

    let arp = build_arp_frame(
        H1_MAC,
        MacAddr::BROADCAST,
        &ArpMessage {
            op: ArpOp::Request,
            sender_mac: H1_MAC,
            sender_ip: H1_IP,
            target_mac: MacAddr::ZERO,
            target_ip: H2_IP,
        },
    );
    assert!(matches!(
        parse_frame(&arp[..ETHERNET_HEADER_SIZE + 10]),
        Err(ControllerError::MalformedFrame(_))
    ));
}

#[test]
fn mac_text_form() {
    let mac: MacAddr = "aa:bb:cc:00:01:ff".parse().expect("valid mac");
    assert_eq!(mac, MacAddr([0xaa, 0xbb, 0xcc, 0x00, 0x01, 0xff]));
    assert_eq!(mac.to_string(), "aa:bb:cc:00:01:ff");

    assert!("aa:bb:cc:00:01".parse::<MacAddr>().is_err());
    assert!("aa:bb:cc:00:01:ff:00".parse::<MacAddr>().is_err());
    assert!("aa:bb:cc:00:01:zz".parse::<MacAddr>().is_err());
    assert!("a:bb:cc:00:01:ff".parse::<MacAddr>().is_err());
    assert!("+a:00:00:00:00:01".parse::<MacAddr>().is_err());
    assert!("aa:bb:cc:00:01:-f".parse::<MacAddr>().is_err());

    let json = serde_json::to_string(&mac).expect("serialize");
    assert_eq!(json, "\"aa:bb:cc:00:01:ff\"");
    let back: MacAddr = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, mac);
}
