#![allow(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use rayon::prelude::*;
use tagwire::inspector::NodeKind;
use tagwire::{Context, Converter, Describe, Generator, Tagwire, TagwireError, TokenInspector};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq)]
struct Limits {
    cpu: u32,
    memory: u64,
}

impl Describe for Limits {
    fn describe(context: &mut Context<'_>) -> tagwire::Result<Arc<dyn Converter<Self>>> {
        context
            .named_object::<Self>()
            .field("cpu", |l| &l.cpu)
            .field("memory", |l| &l.memory)
            .construct(|m| {
                Ok(Limits {
                    cpu: m.take()?,
                    memory: m.take()?,
                })
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Service {
    name: String,
    replicas: u16,
    limits: Limits,
    labels: Vec<String>,
    owner: Option<String>,
}

impl Describe for Service {
    fn describe(context: &mut Context<'_>) -> tagwire::Result<Arc<dyn Converter<Self>>> {
        context
            .named_object::<Self>()
            .field("name", |s| &s.name)
            .field("replicas", |s| &s.replicas)
            .field("limits", |s| &s.limits)
            .field("labels", |s| &s.labels)
            .optional("owner", |s| &s.owner)
            .construct(|m| {
                Ok(Service {
                    name: m.take()?,
                    replicas: m.take()?,
                    limits: m.take()?,
                    labels: m.take()?,
                    owner: m.take()?,
                })
            })
    }
}

fn sample() -> Service {
    Service {
        name: "api".into(),
        replicas: 3,
        limits: Limits {
            cpu: 2,
            memory: 1 << 30,
        },
        labels: vec!["tier=web".into(), "zone=a".into()],
        owner: None,
    }
}

#[test]
fn test_navigate_and_decode_leaves() -> tagwire::Result<()> {
    let bytes = Tagwire::encode(&sample())?;
    let token = Tagwire::token(bytes);

    assert_eq!(token.navigate("name")?.decode_as::<String>()?, "api");
    assert_eq!(token.navigate("replicas")?.decode_as::<u16>()?, 3);
    assert_eq!(
        token.navigate("limits")?.navigate("memory")?.decode_as::<u64>()?,
        1 << 30
    );
    assert_eq!(
        token.navigate("labels")?.decode_as::<Vec<String>>()?,
        vec!["tier=web".to_string(), "zone=a".to_string()]
    );
    assert_eq!(token.decode_as::<Service>()?, sample());
    Ok(())
}

#[test]
fn test_missing_keys() -> tagwire::Result<()> {
    let token = Tagwire::token(Tagwire::encode(&sample())?);
    // Optional members at their default are not written at all.
    match token.navigate("owner") {
        Err(TagwireError::KeyNotFound(key)) => assert_eq!(key, "owner"),
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
    assert!(token.get("owner").is_none());
    assert!(token.get("name").is_some());
    Ok(())
}

#[test]
fn test_children_are_split_once() -> tagwire::Result<()> {
    let token = Tagwire::token(Tagwire::encode(&sample())?);
    let first = token.children()?;
    let second = token.children()?;
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.len(), 4);

    let limits = token.navigate("limits")?;
    assert!(std::ptr::eq(limits, token.navigate("limits")?));
    assert_eq!(limits.children()?.len(), 2);
    Ok(())
}

#[test]
fn test_child_spans_are_exact() -> tagwire::Result<()> {
    let token = Tagwire::token(Tagwire::encode(&sample())?);
    let cpu = token.navigate("limits")?.navigate("cpu")?;
    assert_eq!(cpu.len(), 4);
    assert_eq!(cpu.as_bytes(), &[2, 0, 0, 0]);
    assert!(token.len() > cpu.len());
    Ok(())
}

#[test]
fn test_empty_token() -> tagwire::Result<()> {
    let token = Tagwire::token(Vec::<u8>::new());
    assert!(token.is_empty());
    assert!(token.children()?.is_empty());
    assert_eq!(token.decode_as::<Option<String>>()?, None);
    assert!(matches!(token.navigate("x"), Err(TagwireError::KeyNotFound(_))));
    Ok(())
}

#[test]
fn test_malformed_token_error_is_remembered() {
    // A u32 read as a named object: key length 4, then 3 bytes left.
    let token = Tagwire::token(vec![0x04u8, 0x00, 0x00, 0x00]);
    assert!(matches!(token.children(), Err(TagwireError::NotEnoughBytes { .. })));
    assert!(matches!(token.children(), Err(TagwireError::NotEnoughBytes { .. })));
    assert!(token.get("anything").is_none());
}

#[test]
fn test_token_key_errors() {
    let repeated = vec![0x01, b'a', 0x01, 0x07, 0x01, b'a', 0x01, 0x08];
    assert!(matches!(
        Tagwire::token(repeated).children(),
        Err(TagwireError::DuplicateKey { .. })
    ));

    let not_utf8 = vec![0x01, 0xFF, 0x01, 0x07];
    assert!(matches!(
        Tagwire::token(not_utf8).children(),
        Err(TagwireError::InvalidData(_))
    ));
}

#[test]
fn test_memory_mapped_token() -> tagwire::Result<()> {
    let generator = Generator::new();
    let mut file = NamedTempFile::new()?;
    file.write_all(&generator.encode(&sample())?)?;
    file.flush()?;

    let token = generator.open_token(file.path())?;
    assert_eq!(token.navigate("name")?.decode_as::<String>()?, "api");
    assert_eq!(
        token.navigate("limits")?.decode_as::<Limits>()?,
        sample().limits
    );
    Ok(())
}

#[test]
fn test_open_missing_file() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => panic!("tempdir: {e}"),
    };
    let result = Tagwire::open_token(dir.path().join("absent.tw"));
    assert!(matches!(result, Err(TagwireError::Io(_))));
}

#[test]
fn test_concurrent_first_access() -> tagwire::Result<()> {
    let bytes = Tagwire::encode(&sample())?;
    let token = Tagwire::token(bytes);
    let names: Vec<tagwire::Result<String>> = (0..64)
        .into_par_iter()
        .map(|_| token.navigate("name")?.decode_as::<String>())
        .collect();
    for name in names {
        assert_eq!(name?, "api");
    }

    let pointers: Vec<usize> = (0..64)
        .into_par_iter()
        .map(|_| {
            token
                .children()
                .map(|c| c as *const _ as usize)
                .unwrap_or_default()
        })
        .collect();
    assert!(pointers.windows(2).all(|w| w[0] == w[1] && w[0] != 0));
    Ok(())
}

// --- INSPECTOR ---

#[test]
fn test_inspector_report() -> tagwire::Result<()> {
    let bytes = Tagwire::encode(&sample())?;
    let total = bytes.len();
    let token = Tagwire::token(bytes);

    let report = TokenInspector::inspect(&token, 1);
    assert_eq!(report.kind, NodeKind::NamedObject);
    assert_eq!(report.length, total);
    let keys: Vec<&str> = report.children.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["labels", "limits", "name", "replicas"]);
    assert!(report.children.iter().all(|(_, c)| c.kind == NodeKind::Leaf));

    let deep = TokenInspector::inspect(&token, 4);
    let limits = deep
        .children
        .iter()
        .find(|(k, _)| k == "limits")
        .map(|(_, c)| c);
    assert!(matches!(limits, Some(c) if c.kind == NodeKind::NamedObject && c.children.len() == 2));

    let rendered = deep.to_string();
    assert!(rendered.contains("TAGWIRE INSPECTOR REPORT"));
    assert!(rendered.contains("memory"));
    Ok(())
}

#[test]
fn test_inspector_on_scalar() -> tagwire::Result<()> {
    let token = Tagwire::token(Tagwire::encode(&7u8)?);
    let report = TokenInspector::inspect(&token, 8);
    assert_eq!(report.kind, NodeKind::Leaf);
    assert_eq!(report.length, 1);
    assert!(report.children.is_empty());
    Ok(())
}
