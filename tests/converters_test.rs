#![allow(missing_docs)]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV6};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tagwire::converters::BincodeConverter;
use tagwire::{Context, Converter, Describe, Generator, Tagwire, TagwireError};

fn round_trip<T: Describe + PartialEq + std::fmt::Debug>(value: T) -> tagwire::Result<()> {
    let bytes = Tagwire::encode(&value)?;
    assert_eq!(Tagwire::decode::<T>(&bytes)?, value);
    let framed = Tagwire::encode_auto(&value)?;
    assert_eq!(Tagwire::decode_auto::<T>(&framed)?, value);
    Ok(())
}

// --- PRIMITIVES ---

#[test]
fn test_primitive_layouts() -> tagwire::Result<()> {
    assert_eq!(Tagwire::encode(&0x0102_0304u32)?, vec![0x04, 0x03, 0x02, 0x01]);
    assert_eq!(Tagwire::encode(&-2i16)?, vec![0xFE, 0xFF]);
    assert_eq!(Tagwire::encode(&1.0f32)?, 1.0f32.to_le_bytes().to_vec());
    assert_eq!(Tagwire::encode(&true)?, vec![1]);
    assert_eq!(Tagwire::encode(&'A')?, vec![0x41, 0, 0, 0]);
    assert_eq!(Tagwire::encode(&String::from("hé"))?, "hé".as_bytes().to_vec());
    Ok(())
}

#[test]
fn test_primitive_round_trips() -> tagwire::Result<()> {
    round_trip(u8::MAX)?;
    round_trip(i8::MIN)?;
    round_trip(u64::MAX)?;
    round_trip(i128::MIN)?;
    round_trip(u128::MAX)?;
    round_trip(f64::EPSILON)?;
    round_trip(false)?;
    round_trip('🦀')?;
    round_trip(String::new())?;
    round_trip("x".repeat(70_000))?;
    Ok(())
}

#[test]
fn test_invalid_primitive_bytes() {
    assert!(matches!(Tagwire::decode::<bool>(&[2]), Err(TagwireError::InvalidData(_))));
    assert!(matches!(
        Tagwire::decode::<char>(&[0x00, 0xD8, 0x00, 0x00]),
        Err(TagwireError::InvalidData(_))
    ));
    assert!(matches!(
        Tagwire::decode::<String>(&[0xFF, 0xFE]),
        Err(TagwireError::InvalidData(_))
    ));
    assert!(matches!(
        Tagwire::decode::<u64>(&[1, 2, 3]),
        Err(TagwireError::NotEnoughBytes { needed: 8, available: 3 })
    ));
}

// --- NULLABLE ---

#[test]
fn test_nullable_frames() -> tagwire::Result<()> {
    assert_eq!(Tagwire::encode(&None::<i32>)?, vec![0x00]);
    assert_eq!(Tagwire::encode(&Some(7i32))?, vec![0x01, 0x07, 0x00, 0x00, 0x00]);
    assert_eq!(Tagwire::decode::<Option<i32>>(&[0x00])?, None);
    assert_eq!(Tagwire::decode::<Option<i32>>(&[0x01, 0x07, 0, 0, 0])?, Some(7));
    assert_eq!(Tagwire::decode::<Option<String>>(&[])?, None);
    Ok(())
}

#[test]
fn test_nullable_bad_tag() {
    assert!(matches!(
        Tagwire::decode::<Option<i32>>(&[0x02, 0, 0, 0, 0]),
        Err(TagwireError::InvalidNullableTag(0x02))
    ));
}

#[test]
fn test_nested_nullables() -> tagwire::Result<()> {
    round_trip(Some(Some(3u8)))?;
    round_trip(Some(None::<u8>))?;
    round_trip(None::<Option<u8>>)?;
    round_trip(vec![Some(String::from("a")), None, Some(String::new())])?;
    Ok(())
}

// --- COLLECTIONS ---

#[test]
fn test_sequence_layouts() -> tagwire::Result<()> {
    assert_eq!(Tagwire::encode(&vec![1u8, 2, 3])?, vec![1, 2, 3]);
    assert_eq!(
        Tagwire::encode(&vec![String::from("a"), String::from("bc")])?,
        vec![0x01, b'a', 0x02, b'b', b'c']
    );
    assert!(Tagwire::encode(&Vec::<u32>::new())?.is_empty());
    assert_eq!(Tagwire::decode::<Vec<u32>>(&[])?, Vec::<u32>::new());
    Ok(())
}

#[test]
fn test_collection_round_trips() -> tagwire::Result<()> {
    round_trip((0..1000u32).collect::<Vec<_>>())?;
    round_trip(VecDeque::from(vec![-1i64, 0, 1]))?;
    round_trip(["x", "y", "z"].iter().map(|s| s.to_string()).collect::<HashSet<_>>())?;
    round_trip((0..50u16).collect::<BTreeSet<_>>())?;
    round_trip(vec![vec![1u8], vec![], vec![2, 3]])?;

    let mut map = HashMap::new();
    map.insert(String::from("one"), 1u32);
    map.insert(String::from("two"), 2u32);
    round_trip(map)?;

    let mut nested = BTreeMap::new();
    nested.insert(1u8, vec![String::from("a")]);
    nested.insert(2u8, Vec::new());
    round_trip(nested)?;
    Ok(())
}

#[test]
fn test_truncated_sequence() {
    assert!(matches!(
        Tagwire::decode::<Vec<u32>>(&[1, 0, 0, 0, 2, 0]),
        Err(TagwireError::NotEnoughBytes { .. })
    ));
}

// --- TUPLES AND BOXES ---

#[test]
fn test_rust_tuples() -> tagwire::Result<()> {
    assert_eq!(Tagwire::encode(&(1u8, 2u16))?, vec![1, 2, 0]);
    assert_eq!(
        Generator::new().get_converter::<(u8, u16, u32)>()?.fixed_length(),
        7
    );
    round_trip((String::from("a"),))?;
    round_trip((1u8, String::from("mid"), vec![4u16], Some(true)))?;
    round_trip((1u8, 2u8, 3u8, 4u8, 5u8, 6u8, 7u8, String::from("eight")))?;
    Ok(())
}

#[test]
fn test_box_is_transparent() -> tagwire::Result<()> {
    assert_eq!(Tagwire::encode(&Box::new(5u16))?, vec![5, 0]);
    round_trip(Box::new(String::from("boxed")))?;
    Ok(())
}

// --- WELL-KNOWN TYPES ---

#[test]
fn test_well_known_types() -> tagwire::Result<()> {
    round_trip(Duration::new(90, 500))?;
    round_trip(Ipv4Addr::new(10, 0, 0, 1))?;
    round_trip(Ipv6Addr::LOCALHOST)?;
    round_trip(IpAddr::from([192, 168, 1, 1]))?;
    round_trip(IpAddr::V6(Ipv6Addr::UNSPECIFIED))?;
    round_trip(SocketAddr::from(([127, 0, 0, 1], 8080)))?;
    round_trip(SocketAddr::from((Ipv6Addr::LOCALHOST, 443)))?;
    round_trip(SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 80, 7, 3)))?;

    assert_eq!(Tagwire::encode(&Ipv4Addr::new(1, 2, 3, 4))?, vec![1, 2, 3, 4]);
    assert_eq!(
        Tagwire::encode(&SocketAddr::from(([1, 2, 3, 4], 0x0102)))?,
        vec![1, 2, 3, 4, 0x02, 0x01]
    );

    let scoped = SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 80, 7, 3));
    let bytes = Tagwire::encode(&scoped)?;
    assert_eq!(bytes.len(), 26);
    assert_eq!(&bytes[16..], &[80, 0, 7, 0, 0, 0, 3, 0, 0, 0]);
    Ok(())
}

#[test]
fn test_invalid_well_known_bytes() {
    let mut bad_nanos = 1u64.to_le_bytes().to_vec();
    bad_nanos.extend_from_slice(&1_000_000_000u32.to_le_bytes());
    assert!(matches!(
        Tagwire::decode::<Duration>(&bad_nanos),
        Err(TagwireError::InvalidData(_))
    ));
    assert!(matches!(
        Tagwire::decode::<IpAddr>(&[1, 2, 3]),
        Err(TagwireError::InvalidData(_))
    ));
    // An IPv6 address and port without flow info and scope id.
    assert!(matches!(
        Tagwire::decode::<SocketAddr>(&[0; 18]),
        Err(TagwireError::InvalidData(_))
    ));
}

// --- EXACT SPANS ---

#[test]
fn test_fixed_width_rejects_trailing_bytes() {
    assert!(matches!(
        Tagwire::decode::<u32>(&[1, 0, 0, 0, 0xFF, 0xFF]),
        Err(TagwireError::InvalidData(_))
    ));
    assert!(matches!(Tagwire::decode::<bool>(&[1, 0]), Err(TagwireError::InvalidData(_))));
    assert!(matches!(
        Tagwire::decode::<char>(&[0x41, 0, 0, 0, 0]),
        Err(TagwireError::InvalidData(_))
    ));
    assert!(matches!(Tagwire::decode::<bool>(&[]), Err(TagwireError::NotEnoughBytes { .. })));

    let mut duration = Tagwire::encode(&Duration::from_secs(1)).unwrap_or_default();
    duration.push(0);
    assert!(matches!(
        Tagwire::decode::<Duration>(&duration),
        Err(TagwireError::InvalidData(_))
    ));
    assert!(matches!(
        Tagwire::decode::<Ipv4Addr>(&[1, 2, 3, 4, 5]),
        Err(TagwireError::InvalidData(_))
    ));
    assert!(matches!(
        Tagwire::decode::<(u8, u16)>(&[1, 2, 0, 9]),
        Err(TagwireError::InvalidData(_))
    ));
}

#[test]
fn test_nullable_payload_with_trailing_garbage() {
    assert!(matches!(
        Tagwire::decode::<Option<u32>>(&[1, 7, 0, 0, 0, 9, 9]),
        Err(TagwireError::InvalidData(_))
    ));
    assert!(matches!(
        Tagwire::decode::<Option<u32>>(&[0, 9]),
        Err(TagwireError::InvalidData(_))
    ));
}

#[test]
fn test_packed_fixed_items_still_decode() -> tagwire::Result<()> {
    assert_eq!(Tagwire::decode::<Vec<u16>>(&[1, 0, 2, 0])?, vec![1, 2]);
    assert_eq!(Tagwire::decode::<Vec<(u8, u16)>>(&[1, 2, 0, 3, 4, 0])?, vec![(1, 2), (3, 4)]);
    Ok(())
}

// --- SERDE BRIDGE ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Legacy {
    id: u32,
    tags: Vec<String>,
    ratio: Option<f64>,
}

impl Describe for Legacy {
    fn describe(_: &mut Context<'_>) -> tagwire::Result<Arc<dyn Converter<Self>>> {
        Ok(Arc::new(BincodeConverter::new()))
    }
}

#[test]
fn test_bincode_bridge() -> tagwire::Result<()> {
    let legacy = Legacy {
        id: 4,
        tags: vec!["old".into(), "format".into()],
        ratio: Some(0.5),
    };
    let bytes = Tagwire::encode(&legacy)?;
    let expected = bincode::serde::encode_to_vec(&legacy, bincode::config::standard())
        .map_err(|e| TagwireError::Serialization(e.to_string()))?;
    assert_eq!(bytes, expected);
    round_trip(legacy.clone())?;
    round_trip(vec![legacy.clone(), legacy])?;
    Ok(())
}

#[test]
fn test_bincode_bridge_rejects_garbage() {
    assert!(matches!(
        Tagwire::decode::<Legacy>(&[0xFF]),
        Err(TagwireError::Serialization(_))
    ));
    let mut trailing = Tagwire::encode(&Legacy {
        id: 1,
        tags: Vec::new(),
        ratio: None,
    })
    .unwrap_or_default();
    trailing.push(0);
    assert!(matches!(
        Tagwire::decode::<Legacy>(&trailing),
        Err(TagwireError::InvalidData(_))
    ));
}
