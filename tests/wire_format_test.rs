#![allow(missing_docs)]

use std::io::Write;

use tagwire::varint::{
    decode_fixed, decode_length, encode_fixed, encode_length, encoded_width,
    split_length_prefixed,
};
use tagwire::{Allocator, Generator, Tagwire, TagwireError};

fn encoded(n: usize) -> tagwire::Result<Vec<u8>> {
    let (buf, width) = encode_length(n)?;
    Ok(buf[..width].to_vec())
}

// --- LENGTH PREFIX ---

#[test]
fn test_length_prefix_examples() -> tagwire::Result<()> {
    assert_eq!(encoded(5)?, vec![0x05]);
    assert_eq!(encoded(1000)?, vec![0x43, 0xE8]);

    let large = encoded(100_000)?;
    assert_eq!(large.len(), 4);
    assert_ne!(large[0] & 0x80, 0);
    assert_eq!(large, vec![0x80, 0x01, 0x86, 0xA0]);
    Ok(())
}

#[test]
fn test_length_prefix_width_boundaries() -> tagwire::Result<()> {
    assert_eq!(encoded(0x3F)?, vec![0x3F]);
    assert_eq!(encoded(0x40)?, vec![0x40, 0x40]);
    assert_eq!(encoded(0x3FFF)?, vec![0x7F, 0xFF]);
    assert_eq!(encoded(0x4000)?, vec![0x80, 0x00, 0x40, 0x00]);
    assert_eq!(encoded(0x7FFF_FFFF)?, vec![0xFF, 0xFF, 0xFF, 0xFF]);

    for n in [0, 1, 0x3F, 0x40, 0x3FFF, 0x4000, 0xFFFF, 0x7FFF_FFFF] {
        let bytes = encoded(n)?;
        assert_eq!(bytes.len(), encoded_width(n));
        assert_eq!(decode_length(&bytes)?, (n, encoded_width(n)));
    }
    Ok(())
}

#[test]
fn test_length_prefix_rejects_oversized_values() {
    let result = encode_length(0x8000_0000);
    assert!(matches!(result, Err(TagwireError::InvalidArgument(_))));
}

#[test]
fn test_fixed_slot_is_readable_for_any_value() -> tagwire::Result<()> {
    let slot = encode_fixed(5)?;
    assert_eq!(slot, [0x80, 0x00, 0x00, 0x05]);
    assert_eq!(decode_fixed(&slot)?, 5);
    assert_eq!(decode_length(&slot)?, (5, 4));
    Ok(())
}

#[test]
fn test_fixed_slot_requires_tag() {
    let result = decode_fixed(&[0x05, 0x00, 0x00, 0x00]);
    assert!(matches!(result, Err(TagwireError::InvalidLengthPrefixTag(0x05))));
}

#[test]
fn test_truncated_prefixes() {
    assert!(matches!(
        decode_length(&[]),
        Err(TagwireError::NotEnoughBytes { needed: 1, available: 0 })
    ));
    assert!(matches!(
        decode_length(&[0x41]),
        Err(TagwireError::NotEnoughBytes { needed: 2, available: 1 })
    ));
    assert!(matches!(
        decode_length(&[0x80, 0x00]),
        Err(TagwireError::NotEnoughBytes { needed: 4, available: 2 })
    ));
}

#[test]
fn test_split_length_prefixed_advances_span() -> tagwire::Result<()> {
    let data = [0x02, b'h', b'i', 0x01, b'!', 0xFF];
    let mut span = &data[..];
    assert_eq!(split_length_prefixed(&mut span)?, b"hi");
    assert_eq!(split_length_prefixed(&mut span)?, b"!");
    assert_eq!(span, &[0xFF]);

    let mut truncated = &[0x05, b'a'][..];
    assert!(matches!(
        split_length_prefixed(&mut truncated),
        Err(TagwireError::NotEnoughBytes { needed: 5, available: 1 })
    ));
    Ok(())
}

// --- ALLOCATOR ---

#[test]
fn test_allocator_capacity_ceiling() -> tagwire::Result<()> {
    let mut over = Allocator::with_max_capacity(10);
    let result = over.reserve(11);
    assert!(matches!(
        result,
        Err(TagwireError::AllocatorOverflow { requested: 11, max_capacity: 10 })
    ));

    let mut exact = Allocator::with_max_capacity(10);
    exact.reserve(10)?;
    assert_eq!(exact.len(), 10);
    assert!(matches!(exact.push(0), Err(TagwireError::AllocatorOverflow { .. })));
    Ok(())
}

#[test]
fn test_anchor_patch_both_branches() -> tagwire::Result<()> {
    for length in [0usize, 1, 31, 32, 33, 0x3F, 0x40, 500] {
        let payload = vec![0xAB; length];

        let mut compact = Allocator::new();
        let anchor = compact.anchor_length_prefix()?;
        compact.append(&payload)?;
        compact.close_length_prefix(anchor, true)?;
        let (decoded, width) = decode_length(compact.as_slice())?;
        assert_eq!(decoded, length);
        assert_eq!(width, if length < 32 { 1 } else { 4 });
        assert_eq!(&compact.as_slice()[width..], payload.as_slice());

        let mut wide = Allocator::new();
        let anchor = wide.anchor_length_prefix()?;
        wide.append(&payload)?;
        wide.close_length_prefix(anchor, false)?;
        assert_eq!(decode_length(wide.as_slice())?, (length, 4));
        assert_eq!(wide.len(), 4 + length);
    }
    Ok(())
}

#[test]
fn test_nested_anchors_close_inside_out() -> tagwire::Result<()> {
    let mut allocator = Allocator::new();
    let outer = allocator.anchor_length_prefix()?;
    allocator.push(0x01)?;
    let inner = allocator.anchor_length_prefix()?;
    allocator.append(b"xyz")?;
    allocator.close_length_prefix(inner, true)?;
    allocator.close_length_prefix(outer, true)?;
    assert_eq!(allocator.as_slice(), &[0x05, 0x01, 0x03, b'x', b'y', b'z']);
    Ok(())
}

#[test]
fn test_anchor_from_other_allocator_is_rejected() -> tagwire::Result<()> {
    let mut first = Allocator::new();
    let mut second = Allocator::new();
    first.append(&[0; 8])?;
    second.append(&[0; 8])?;
    let anchor = first.anchor_length_prefix()?;
    let result = second.close_length_prefix(anchor, true);
    assert!(matches!(result, Err(TagwireError::InvalidAnchor(_))));
    Ok(())
}

#[test]
fn test_anchor_left_behind_by_compaction_is_rejected() -> tagwire::Result<()> {
    let mut allocator = Allocator::new();
    let outer = allocator.anchor_length_prefix()?;
    let inner = allocator.anchor_length_prefix()?;
    // Closing the outer anchor first shrinks its prefix and pulls the cursor back
    // past the inner anchor.
    allocator.close_length_prefix(outer, true)?;
    let result = allocator.close_length_prefix(inner, true);
    assert!(matches!(result, Err(TagwireError::InvalidAnchor(_))));
    Ok(())
}

#[test]
fn test_anchor_inside_compacted_payload_is_rejected() -> tagwire::Result<()> {
    let mut allocator = Allocator::new();
    let outer = allocator.anchor_length_prefix()?;
    let inner = allocator.anchor_length_prefix()?;
    allocator.append(&[1, 2, 3, 4, 5])?;
    allocator.close_length_prefix(outer, true)?;
    let compacted = vec![9, 0, 0, 0, 0, 1, 2, 3, 4, 5];
    assert_eq!(allocator.as_slice(), compacted.as_slice());

    // The inner slot moved with the payload; patching it now would clobber data.
    let result = allocator.close_length_prefix(inner, false);
    assert!(matches!(result, Err(TagwireError::InvalidAnchor(_))));
    assert_eq!(allocator.as_slice(), compacted.as_slice());
    Ok(())
}

#[test]
fn test_anchors_survive_unrelated_compaction() -> tagwire::Result<()> {
    let mut allocator = Allocator::new();
    let outer = allocator.anchor_length_prefix()?;
    let first = allocator.anchor_length_prefix()?;
    allocator.push(0xAA)?;
    allocator.close_length_prefix(first, true)?;
    let second = allocator.anchor_length_prefix()?;
    allocator.push(0xBB)?;
    allocator.close_length_prefix(second, false)?;
    allocator.close_length_prefix(outer, false)?;
    assert_eq!(
        allocator.as_slice(),
        &[0x80, 0, 0, 7, 0x01, 0xAA, 0x80, 0, 0, 1, 0xBB]
    );
    Ok(())
}

#[test]
fn test_extract_and_io_write() -> tagwire::Result<()> {
    let empty = Allocator::new();
    assert!(empty.extract().is_empty());
    assert_eq!(empty.capacity(), 0);

    let mut allocator = Allocator::with_max_capacity(4);
    allocator.write_all(b"abc")?;
    assert_eq!(allocator.extract(), b"abc".to_vec());
    let err = allocator.write_all(b"de");
    assert!(err.is_err());
    Ok(())
}

// --- TOP LEVEL FRAMING ---

#[test]
fn test_top_level_auto_framing() -> tagwire::Result<()> {
    assert_eq!(Tagwire::encode(&String::from("abc"))?, b"abc".to_vec());
    assert_eq!(
        Tagwire::encode_auto(&String::from("abc"))?,
        vec![0x03, b'a', b'b', b'c']
    );
    assert_eq!(Tagwire::encode_auto(&7u32)?, vec![7, 0, 0, 0]);

    let framed = Tagwire::encode_auto(&vec![1u16, 2, 3])?;
    assert_eq!(framed, vec![0x06, 1, 0, 2, 0, 3, 0]);
    assert_eq!(Tagwire::decode_auto::<Vec<u16>>(&framed)?, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_generator_capacity_limit_fails_whole_encode() {
    let generator = Generator::builder().max_capacity(8).build();
    let result = generator.encode(&"x".repeat(20));
    assert!(matches!(
        result,
        Err(TagwireError::AllocatorOverflow { max_capacity: 8, .. })
    ));

    let unpooled = Generator::builder().max_capacity(8).use_scratch_pool(false).build();
    assert!(unpooled.encode(&"x".repeat(20)).is_err());
    assert!(unpooled.encode(&"x".repeat(8)).is_ok());
}
