//! Converters for standard library value types.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::sync::Arc;
use std::time::Duration;

use super::primitive::LittleEndian;
use crate::allocator::Allocator;
use crate::converter::{Converter, exact_span};
use crate::describe::Describe;
use crate::error::{Result, TagwireError};
use crate::generator::Context;

fn exact<const N: usize>(span: &[u8]) -> Result<[u8; N]> {
    exact_span(span, N)?
        .try_into()
        .map_err(|_| TagwireError::not_enough(N, span.len()))
}

/// `Duration` as `u64` seconds followed by `u32` nanoseconds.
#[derive(Debug, Default)]
pub struct DurationConverter;

impl Converter<Duration> for DurationConverter {
    fn fixed_length(&self) -> usize {
        12
    }

    fn encode(&self, allocator: &mut Allocator, item: &Duration) -> Result<()> {
        let out = allocator.reserve(12)?;
        item.as_secs().write_le(&mut out[..8]);
        item.subsec_nanos().write_le(&mut out[8..]);
        Ok(())
    }

    fn decode(&self, span: &[u8]) -> Result<Duration> {
        let bytes: [u8; 12] = exact(span)?;
        let secs = u64::read_le(&bytes[..8]);
        let nanos = u32::read_le(&bytes[8..]);
        if nanos >= 1_000_000_000 {
            return Err(TagwireError::InvalidData(format!(
                "duration nanoseconds out of range: {nanos}"
            )));
        }
        Ok(Duration::new(secs, nanos))
    }
}

/// `Ipv4Addr` as its 4 octets.
#[derive(Debug, Default)]
pub struct Ipv4Converter;

impl Converter<Ipv4Addr> for Ipv4Converter {
    fn fixed_length(&self) -> usize {
        4
    }

    fn encode(&self, allocator: &mut Allocator, item: &Ipv4Addr) -> Result<()> {
        allocator.append(&item.octets())
    }

    fn decode(&self, span: &[u8]) -> Result<Ipv4Addr> {
        Ok(Ipv4Addr::from(exact::<4>(span)?))
    }
}

/// `Ipv6Addr` as its 16 octets.
#[derive(Debug, Default)]
pub struct Ipv6Converter;

impl Converter<Ipv6Addr> for Ipv6Converter {
    fn fixed_length(&self) -> usize {
        16
    }

    fn encode(&self, allocator: &mut Allocator, item: &Ipv6Addr) -> Result<()> {
        allocator.append(&item.octets())
    }

    fn decode(&self, span: &[u8]) -> Result<Ipv6Addr> {
        Ok(Ipv6Addr::from(exact::<16>(span)?))
    }
}

fn decode_ip(bytes: &[u8]) -> Result<IpAddr> {
    match bytes.len() {
        4 => Ok(IpAddr::V4(Ipv4Addr::from(exact::<4>(bytes)?))),
        16 => Ok(IpAddr::V6(Ipv6Addr::from(exact::<16>(bytes)?))),
        n => Err(TagwireError::InvalidData(format!(
            "ip address must be 4 or 16 bytes, got {n}"
        ))),
    }
}

fn encode_ip(allocator: &mut Allocator, ip: &IpAddr) -> Result<()> {
    match ip {
        IpAddr::V4(v4) => allocator.append(&v4.octets()),
        IpAddr::V6(v6) => allocator.append(&v6.octets()),
    }
}

/// `IpAddr` as 4 or 16 octets; the width tells the family apart.
#[derive(Debug, Default)]
pub struct IpAddrConverter;

impl Converter<IpAddr> for IpAddrConverter {
    fn fixed_length(&self) -> usize {
        0
    }

    fn encode(&self, allocator: &mut Allocator, item: &IpAddr) -> Result<()> {
        encode_ip(allocator, item)
    }

    fn decode(&self, span: &[u8]) -> Result<IpAddr> {
        decode_ip(span)
    }
}

const SOCKET_V4_LEN: usize = 4 + 2;
const SOCKET_V6_LEN: usize = 16 + 2 + 4 + 4;

/// `SocketAddr` as the address octets followed by the little-endian port.
///
/// IPv6 addresses are followed by the little-endian `u32` flow info and scope id, so
/// a V4 address takes 6 bytes and a V6 address 26.
#[derive(Debug, Default)]
pub struct SocketAddrConverter;

impl Converter<SocketAddr> for SocketAddrConverter {
    fn fixed_length(&self) -> usize {
        0
    }

    fn encode(&self, allocator: &mut Allocator, item: &SocketAddr) -> Result<()> {
        match item {
            SocketAddr::V4(v4) => {
                let out = allocator.reserve(SOCKET_V4_LEN)?;
                out[..4].copy_from_slice(&v4.ip().octets());
                v4.port().write_le(&mut out[4..]);
            }
            SocketAddr::V6(v6) => {
                let out = allocator.reserve(SOCKET_V6_LEN)?;
                out[..16].copy_from_slice(&v6.ip().octets());
                v6.port().write_le(&mut out[16..18]);
                v6.flowinfo().write_le(&mut out[18..22]);
                v6.scope_id().write_le(&mut out[22..]);
            }
        }
        Ok(())
    }

    fn decode(&self, span: &[u8]) -> Result<SocketAddr> {
        match span.len() {
            SOCKET_V4_LEN => {
                let ip = Ipv4Addr::from(exact::<4>(&span[..4])?);
                Ok(SocketAddrV4::new(ip, u16::read_le(&span[4..])).into())
            }
            SOCKET_V6_LEN => {
                let ip = Ipv6Addr::from(exact::<16>(&span[..16])?);
                let port = u16::read_le(&span[16..18]);
                let flowinfo = u32::read_le(&span[18..22]);
                let scope_id = u32::read_le(&span[22..]);
                Ok(SocketAddrV6::new(ip, port, flowinfo, scope_id).into())
            }
            n => Err(TagwireError::InvalidData(format!(
                "socket address must be {SOCKET_V4_LEN} or {SOCKET_V6_LEN} bytes, got {n}"
            ))),
        }
    }
}

macro_rules! impl_describe_with {
    ($($t:ty => $converter:expr),* $(,)?) => {
        $(
            impl Describe for $t {
                fn describe(_: &mut Context<'_>) -> Result<Arc<dyn Converter<Self>>> {
                    Ok(Arc::new($converter))
                }
            }
        )*
    }
}

impl_describe_with!(
    Duration => DurationConverter,
    Ipv4Addr => Ipv4Converter,
    Ipv6Addr => Ipv6Converter,
    IpAddr => IpAddrConverter,
    SocketAddr => SocketAddrConverter,
);
