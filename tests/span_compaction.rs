#![cfg(feature = "tokio")]

mod common;

use bytes::Bytes;
use common::{key, RecordingCompactor};
use keyspan_compaction::{
    engine::EngineError, CompactionOptions, CompactionRange, Engine, EngineOptions,
    FileDescriptor,
};

async fn engine_with_level(
    options: EngineOptions,
    level: usize,
    files: &[(u32, u32, u64)],
) -> Engine {
    let engine = Engine::open(options).await.expect("open");
    for &(smallest, largest, size) in files {
        engine
            .add_file(level, FileDescriptor::new(key(smallest), key(largest), size))
            .await
            .expect("add file");
    }
    engine
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_stats_close_on_disk() {
    let tmpdir = tempfile::tempdir().expect("temp dir");
    let dir = tmpdir.path().join("engine");
    let engine = Engine::open(EngineOptions::from(&dir)).await.expect("open");
    assert!(dir.is_dir(), "open creates the data directory");

    let stats = engine.env_stats().await.expect("stats");
    assert_eq!(stats.encryption_status, None);
    assert_eq!(stats.total_files, 0);
    assert_eq!(stats.total_bytes, 0);
    engine.close();
}

#[tokio::test]
async fn stats_fail_when_data_dir_disappears() {
    let tmpdir = tempfile::tempdir().expect("temp dir");
    let dir = tmpdir.path().join("gone");
    let engine = Engine::open(EngineOptions::from(&dir)).await.expect("open");
    std::fs::remove_dir_all(&dir).expect("remove dir");

    let err = engine.env_stats().await.expect_err("stats must fail");
    assert!(matches!(err, EngineError::Io(_)));
}

#[tokio::test]
async fn specialized_hook_accepts_extra_options() {
    let options = EngineOptions::default().extra_options("encryption=aes256");
    assert!(matches!(
        Engine::open(options.clone()).await,
        Err(EngineError::ExtraOptions)
    ));

    let hook = |options: &EngineOptions| {
        if options.extra().starts_with(b"encryption=") {
            Ok(())
        } else {
            Err(EngineError::Hook("unsupported extra option".into()))
        }
    };
    let engine = Engine::open_with_hook(options, &hook).await.expect("open");
    assert_eq!(engine.options().extra().as_ref(), b"encryption=aes256");
    engine.close();
}

#[tokio::test]
async fn compacts_bottommost_level_in_target_sized_ranges() {
    let options =
        EngineOptions::default().compaction(CompactionOptions::default().target_size(20));
    let engine = engine_with_level(
        options,
        6,
        &[(10, 20, 10), (20, 30, 10), (30, 40, 10), (40, 50, 10), (60, 70, 10)],
    )
    .await;
    // Upper-level data does not influence boundaries.
    engine
        .add_file(2, FileDescriptor::new(key(0), key(99), 1_000))
        .await
        .expect("add");

    let stats = engine.env_stats().await.expect("stats");
    assert_eq!(stats.total_files, 6);
    assert_eq!(stats.total_bytes, 1_050);
    assert_eq!(stats.level_files[6], 5);

    let compactor = RecordingCompactor::default();
    let plan = engine
        .compact_span(&compactor, Bytes::new(), Bytes::new())
        .await
        .expect("compact");
    assert_eq!(plan.input_files, 5);
    assert_eq!(plan.input_bytes, 50);
    assert_eq!(
        plan.ranges,
        vec![
            CompactionRange::new("", key(30)),
            CompactionRange::new(key(30), key(50)),
            CompactionRange::new(key(50), ""),
        ]
    );
    assert_eq!(compactor.ranges(), plan.ranges);
    engine.close();
}

#[tokio::test]
async fn bounded_span_only_sees_intersecting_tables() {
    let options =
        EngineOptions::default().compaction(CompactionOptions::default().target_size(10));
    let engine = engine_with_level(options, 1, &[(10, 20, 10), (30, 40, 10), (50, 60, 10)]).await;

    let compactor = RecordingCompactor::default();
    let plan = engine
        .compact_span(&compactor, Bytes::from(key(35)), Bytes::from(key(55)))
        .await
        .expect("compact");
    assert_eq!(plan.input_files, 2);
    assert_eq!(
        plan.ranges,
        vec![
            CompactionRange::new(key(35), key(40)),
            CompactionRange::new(key(40), key(55)),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_span_compaction_covers_every_range() {
    let files: Vec<_> = (0..16).map(|i| (i * 10, i * 10 + 5, 10)).collect();
    let options = EngineOptions::default().compaction(
        CompactionOptions::default()
            .target_size(10)
            .max_concurrency(4),
    );
    let engine = engine_with_level(options, 1, &files).await;

    let compactor = RecordingCompactor::default();
    let plan = engine
        .compact_span(&compactor, Bytes::new(), Bytes::new())
        .await
        .expect("compact");
    assert_eq!(plan.ranges.len(), 16);

    let mut seen = compactor.ranges();
    seen.sort_by(|a, b| a.start().cmp(b.start()));
    assert_eq!(seen, plan.ranges);
}

#[tokio::test]
async fn empty_engine_compacts_whole_keyspace_once() {
    let engine = Engine::open(EngineOptions::default()).await.expect("open");
    let compactor = RecordingCompactor::default();
    let plan = engine
        .compact_span(&compactor, Bytes::new(), Bytes::new())
        .await
        .expect("compact");
    assert_eq!(plan.ranges, vec![CompactionRange::unbounded()]);
    assert_eq!(compactor.ranges(), vec![CompactionRange::unbounded()]);
}
