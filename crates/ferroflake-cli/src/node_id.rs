use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use anyhow::{Context, bail};
use ferroflake::MAX_NODE_ID;

// Never sent to: connecting a UDP socket only selects the outbound interface.
const ROUTE_LOOKUP_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 0, 2, 1), 9);

/// Derives a node ID from the private IPv4 address of the outbound interface.
pub fn from_private_ip() -> anyhow::Result<u16> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).context("failed to bind UDP socket")?;
    socket
        .connect(ROUTE_LOOKUP_ADDR)
        .context("no IPv4 route to determine the local address")?;

    let ip = match socket.local_addr()?.ip() {
        IpAddr::V4(ip) => ip,
        IpAddr::V6(ip) => bail!("local address {ip} is not IPv4"),
    };
    match from_ipv4(ip) {
        Some(node_id) => Ok(node_id),
        None => bail!("local address {ip} is not a private IPv4 address"),
    }
}

/// The low 10 bits of a private (RFC 1918) address, `None` otherwise.
///
/// Hosts on one `/22` get distinct node IDs.
pub fn from_ipv4(ip: Ipv4Addr) -> Option<u16> {
    if !ip.is_private() {
        return None;
    }
    let [_, _, hi, lo] = ip.octets();
    Some(u16::from_be_bytes([hi, lo]) & MAX_NODE_ID)
}
