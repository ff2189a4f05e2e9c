// Copyright (c) 2025 Makai Trie Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Integration tests for the registry under concurrency and across restarts.
//! Exercises the full write path (registry -> trie -> AOF) and the recovery
//! path (AOF -> replay -> fresh registry).

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use makai_trie_lib::aof::{load, AofWriter, FsyncPolicy};
use makai_trie_lib::store::Registry;

/// Many concurrent writers into one namespace: no lost keys, exact counters.
#[test]
fn test_concurrent_writers_converge() -> Result<()> {
    const WRITERS: usize = 100;
    const KEYS_PER_WRITER: usize = 1000;

    let registry = Arc::new(Registry::new());
    registry.create_namespace("load");

    let mut handles = Vec::with_capacity(WRITERS);
    for writer_id in 0..WRITERS {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || -> Result<()> {
            for i in 0..KEYS_PER_WRITER {
                let key = format!("w{writer_id:03}k{i:04}");
                registry.insert("load", key.as_bytes(), Some(key.as_bytes()))?;
            }
            Ok(())
        }));
    }
    for handle in handles {
        handle.join().expect("writer thread panicked")?;
    }

    let stats = registry.stats("load")?;
    assert_eq!(stats.number_key, (WRITERS * KEYS_PER_WRITER) as u64);

    for writer_id in 0..WRITERS {
        for i in 0..KEYS_PER_WRITER {
            let key = format!("w{writer_id:03}k{i:04}");
            assert_eq!(
                registry.find("load", key.as_bytes())?,
                Some(key.as_bytes().to_vec()),
                "lost key {key}"
            );
        }
    }

    Ok(())
}

/// With the 1 Hz durability schedule, an insert that has survived one tick is
/// recoverable even when the process never shuts down cleanly.
#[tokio::test]
async fn test_every_second_durability_survives_crash() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("aof.log");

    {
        let writer = Arc::new(AofWriter::open(&path, FsyncPolicy::EverySecond)?);
        let registry = Registry::with_aof(Arc::clone(&writer));
        registry.create_namespace("n1");
        registry.insert("n1", b"k1", Some(b"v1"))?;

        writer.spawn_ticker();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(writer.sync_offset() > 0, "tick should have flushed");

        // Simulated crash: the writer is dropped without close().
    }

    let recovered = Registry::new();
    let applied = load(&path, &recovered)?;
    assert_eq!(applied, 1);
    assert_eq!(recovered.find("n1", b"k1")?, Some(b"v1".to_vec()));

    Ok(())
}

/// A clean shutdown flushes whatever the ticker had not yet written.
#[tokio::test]
async fn test_clean_shutdown_preserves_tail() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("aof.log");

    {
        let writer = Arc::new(AofWriter::open(&path, FsyncPolicy::EverySecond)?);
        let registry = Registry::with_aof(Arc::clone(&writer));
        registry.create_namespace("n1");
        writer.spawn_ticker();

        for i in 0..32 {
            let key = format!("key{i}");
            registry.insert("n1", key.as_bytes(), None)?;
        }
        registry.remove("n1", b"key0")?;

        writer.close().await;
    }

    let recovered = Registry::new();
    assert_eq!(load(&path, &recovered)?, 33);
    assert_eq!(recovered.stats("n1")?.number_key, 31);
    assert_eq!(recovered.find("n1", b"key0")?, None);
    assert_eq!(recovered.find("n1", b"key31")?, Some(Vec::new()));

    Ok(())
}
