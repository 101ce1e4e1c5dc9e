//! Ethernet frame codec.
//!
//! Packet-in payloads are raw ethernet frames. Only the pieces the controller
//! acts on are decoded: ARP (host learning / proxy replies) and the IPv4
//! source/destination pair (flow match). Frames are parsed and emitted with
//! `smoltcp::wire`.

use std::net::Ipv4Addr;

use smoltcp::phy::ChecksumCapabilities;
use smoltcp::wire::{
    ArpOperation, ArpPacket, ArpRepr, EthernetAddress, EthernetFrame, EthernetProtocol,
    EthernetRepr, IpProtocol, Ipv4Packet, Ipv4Repr,
};

use super::error::Result;
use super::id::MacAddr;

/// Ethernet header size.
pub const ETHERNET_HEADER_SIZE: usize = 14;

/// ARP payload size for Ethernet + IPv4.
pub const ARP_PACKET_SIZE: usize = 28;

const IPV4_HEADER_SIZE: usize = 20;

/// EtherType carried in IPv4 flow matches.
pub const ETH_TYPE_IPV4: u16 = 0x0800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOp {
    Request,
    Reply,
}

/// Decoded Ethernet/IPv4 ARP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpMessage {
    pub op: ArpOp,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

/// What a packet-in frame turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Arp(ArpMessage),
    Ipv4 { src: Ipv4Addr, dst: Ipv4Addr },
    /// Anything else (LLDP, IPv6, ARP with other hardware types, ...).
    Other { ethertype: u16 },
}

/// Classify a raw ethernet frame.
pub fn parse_frame(raw: &[u8]) -> Result<Frame> {
    let eth = EthernetFrame::new_checked(raw)?;
    match eth.ethertype() {
        EthernetProtocol::Arp => {
            let packet = ArpPacket::new_checked(eth.payload())?;
            match ArpRepr::parse(&packet)? {
                ArpRepr::EthernetIpv4 {
                    operation,
                    source_hardware_addr,
                    source_protocol_addr,
                    target_hardware_addr,
                    target_protocol_addr,
                } => {
                    let op = match operation {
                        ArpOperation::Request => ArpOp::Request,
                        ArpOperation::Reply => ArpOp::Reply,
                        _ => return Ok(Frame::Other { ethertype: eth.ethertype().into() }),
                    };
                    Ok(Frame::Arp(ArpMessage {
                        op,
                        sender_mac: MacAddr(source_hardware_addr.0),
                        sender_ip: source_protocol_addr,
                        target_mac: MacAddr(target_hardware_addr.0),
                        target_ip: target_protocol_addr,
                    }))
                }
                #[allow(unreachable_patterns)]
                _ => Ok(Frame::Other { ethertype: eth.ethertype().into() }),
            }
        }
        EthernetProtocol::Ipv4 => {
            let ip = Ipv4Packet::new_checked(eth.payload())?;
            Ok(Frame::Ipv4 {
                src: ip.src_addr(),
                dst: ip.dst_addr(),
            })
        }
        other => Ok(Frame::Other { ethertype: other.into() }),
    }
}

/// Build a complete ethernet frame carrying `msg`.
pub fn build_arp_frame(eth_src: MacAddr, eth_dst: MacAddr, msg: &ArpMessage) -> Vec<u8> {
    let mut frame = vec![0u8; ETHERNET_HEADER_SIZE + ARP_PACKET_SIZE];

    let eth_repr = EthernetRepr {
        src_addr: EthernetAddress(eth_src.0),
        dst_addr: EthernetAddress(eth_dst.0),
        ethertype: EthernetProtocol::Arp,
    };
    let mut eth = EthernetFrame::new_unchecked(&mut frame[..]);
    eth_repr.emit(&mut eth);

    let arp_repr = ArpRepr::EthernetIpv4 {
        operation: match msg.op {
            ArpOp::Request => ArpOperation::Request,
            ArpOp::Reply => ArpOperation::Reply,
        },
        source_hardware_addr: EthernetAddress(msg.sender_mac.0),
        source_protocol_addr: msg.sender_ip,
        target_hardware_addr: EthernetAddress(msg.target_mac.0),
        target_protocol_addr: msg.target_ip,
    };
    let mut arp = ArpPacket::new_unchecked(eth.payload_mut());
    arp_repr.emit(&mut arp);

    frame
}

/// Broadcast ARP request from `sender` asking for `target_ip`.
pub fn arp_request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Vec<u8> {
    build_arp_frame(
        sender_mac,
        MacAddr::BROADCAST,
        &ArpMessage {
            op: ArpOp::Request,
            sender_mac,
            sender_ip,
            target_mac: MacAddr::ZERO,
            target_ip,
        },
    )
}

/// Reply answering `request` on behalf of the host owning `resolved_mac`.
pub fn arp_reply_for(request: &ArpMessage, resolved_mac: MacAddr) -> Vec<u8> {
    build_arp_frame(
        resolved_mac,
        request.sender_mac,
        &ArpMessage {
            op: ArpOp::Reply,
            sender_mac: resolved_mac,
            sender_ip: request.target_ip,
            target_mac: request.sender_mac,
            target_ip: request.sender_ip,
        },
    )
}

/// IPv4 frame (protocol 253, "experimental") wrapping an opaque payload.
pub fn ipv4_frame(
    src_mac: MacAddr,
    dst_mac: MacAddr,
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
    payload: &[u8],
) -> Vec<u8> {
    let mut frame = vec![0u8; ETHERNET_HEADER_SIZE + IPV4_HEADER_SIZE + payload.len()];

    let eth_repr = EthernetRepr {
        src_addr: EthernetAddress(src_mac.0),
        dst_addr: EthernetAddress(dst_mac.0),
        ethertype: EthernetProtocol::Ipv4,
    };
    let mut eth = EthernetFrame::new_unchecked(&mut frame[..]);
    eth_repr.emit(&mut eth);

    let ip_repr = Ipv4Repr {
        src_addr: src_ip,
        dst_addr: dst_ip,
        next_header: IpProtocol::Unknown(253),
        payload_len: payload.len(),
        hop_limit: 64,
    };
    let mut ip = Ipv4Packet::new_unchecked(eth.payload_mut());
    ip_repr.emit(&mut ip, &ChecksumCapabilities::default());
    ip.payload_mut().copy_from_slice(payload);

    frame
}
