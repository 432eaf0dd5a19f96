mod support;

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use common::storage::in_memory::InMemoryStorage;
use common::{Record, SeqBlock, Storage, StorageRead};
use journal::{Error, JournalDb, JournalRead, Scope, WriterConfig};

use support::{FaultyStorage, INJECTED_FAILURE, SlowStorage};

fn scope(id: &str) -> Scope {
    Scope::new(id).unwrap()
}

fn in_memory() -> Arc<dyn Storage> {
    Arc::new(InMemoryStorage::new())
}

async fn values(journal: &JournalDb, scope: &Scope) -> Vec<String> {
    journal
        .entries(scope)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.entry.value)
        .collect()
}

#[tokio::test]
async fn should_read_back_appended_entries_per_scope() {
    // given
    let journal = JournalDb::new(in_memory(), WriterConfig::default()).unwrap();
    let mut writer = journal.writer(scope("abc")).await.unwrap();
    writer.append("hello");
    writer.append("world");
    writer.finalize().await.unwrap();

    // when
    let abc = values(&journal, &scope("abc")).await;
    let xyz = values(&journal, &scope("xyz")).await;

    // then
    assert_eq!(abc, vec!["hello", "world"]);
    assert!(xyz.is_empty());
}

#[tokio::test]
async fn should_preserve_append_order_for_many_entries() {
    // given
    let journal = JournalDb::new(in_memory(), WriterConfig::default()).unwrap();
    let mut writer = journal.writer(scope("bulk")).await.unwrap();
    let expected: Vec<String> = (0..1_000).map(|i| format!("entry {}", i)).collect();

    // when
    let sequences: Vec<_> = expected
        .iter()
        .map(|v| writer.append(v.as_str()).unwrap())
        .collect();
    writer.finalize().await.unwrap();

    // then
    assert!(sequences.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(values(&journal, &scope("bulk")).await, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_allocate_disjoint_sequences_to_concurrent_writers() {
    // given
    let journal = Arc::new(
        JournalDb::new(
            in_memory(),
            WriterConfig {
                lease_block_size: 100,
                ..Default::default()
            },
        )
        .unwrap(),
    );

    // when
    let mut handles = Vec::new();
    for w in 0..8 {
        let journal = Arc::clone(&journal);
        handles.push(tokio::spawn(async move {
            let mut writer = journal.writer(scope("shared")).await.unwrap();
            for i in 0..50 {
                writer.append(format!("w{}-{}", w, i)).unwrap();
                tokio::task::yield_now().await;
            }
            writer.finalize().await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // then
    let entries = journal.entries(&scope("shared")).await.unwrap();
    assert_eq!(entries.len(), 400);
    let sequences: HashSet<_> = entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences.len(), 400);
    assert!(entries.windows(2).all(|w| w[0].sequence < w[1].sequence));
    for w in 0..8 {
        let prefix = format!("w{}-", w);
        let own: Vec<_> = entries
            .iter()
            .filter(|e| e.entry.value.starts_with(&prefix))
            .map(|e| e.entry.value.clone())
            .collect();
        let expected: Vec<_> = (0..50).map(|i| format!("w{}-{}", w, i)).collect();
        assert_eq!(own, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_allocate_disjoint_sequences_to_journals_sharing_a_store() {
    // given
    let storage: Arc<dyn Storage> = Arc::new(SlowStorage::new());
    let first = JournalDb::new(Arc::clone(&storage), WriterConfig::default()).unwrap();
    let second = JournalDb::new(Arc::clone(&storage), WriterConfig::default()).unwrap();

    // when
    let (a, b) = tokio::join!(
        async {
            let mut writer = first.writer(scope("abc")).await.unwrap();
            let seq = writer.append("from-a");
            writer.finalize().await.unwrap();
            seq
        },
        async {
            let mut writer = second.writer(scope("abc")).await.unwrap();
            let seq = writer.append("from-b");
            writer.finalize().await.unwrap();
            seq
        }
    );

    // then
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a, b);
    let mut stored = values(&first, &scope("abc")).await;
    stored.sort();
    assert_eq!(stored, vec!["from-a", "from-b"]);
}

#[tokio::test]
async fn should_not_show_entries_committed_after_scan_started() {
    // given
    let journal = JournalDb::new(in_memory(), WriterConfig::default()).unwrap();
    let mut earlier = journal.writer(scope("abc")).await.unwrap();
    earlier.append("before");
    earlier.finalize().await.unwrap();

    let mut writer = journal.writer(scope("abc")).await.unwrap();
    writer.append("after");
    let mut iter = journal.scan(&scope("abc")).await.unwrap();

    // when
    writer.finalize().await.unwrap();

    // then
    let mut seen = Vec::new();
    while let Some(entry) = iter.next().await.unwrap() {
        seen.push(entry.entry.value);
    }
    assert_eq!(seen, vec!["before"]);
    assert_eq!(values(&journal, &scope("abc")).await, vec!["before", "after"]);
}

async fn seed_seq_block(storage: &Arc<dyn Storage>, scope: &str, block: SeqBlock) {
    storage
        .put(vec![Record::new(
            Bytes::from(format!("sequence/{}", scope)),
            block.serialize(),
        )])
        .await
        .unwrap();
}

#[tokio::test]
async fn should_refuse_sequences_beyond_narrow_key_width() {
    // given
    let storage = in_memory();
    seed_seq_block(&storage, "edge", SeqBlock::new(0, 99_990)).await;
    let journal = JournalDb::new(
        storage,
        WriterConfig {
            key_width: 5,
            lease_block_size: 20,
            ..Default::default()
        },
    )
    .unwrap();
    let mut writer = journal.writer(scope("edge")).await.unwrap();

    // when
    let results: Vec<_> = (0..20).map(|i| writer.try_append(format!("e{}", i))).collect();
    writer.finalize().await.unwrap();

    // then
    assert!(results[..10].iter().all(|r| r.is_ok()));
    assert_eq!(results[9], Ok(99_999));
    assert_eq!(
        results[10],
        Err(Error::SequenceOverflow {
            sequence: 100_000,
            width: 5
        })
    );
    let entries = journal.entries(&scope("edge")).await.unwrap();
    let sequences: Vec<_> = entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, (99_990..100_000).collect::<Vec<_>>());
}

#[tokio::test]
async fn should_keep_order_across_digit_boundary_with_default_width() {
    // given
    let storage = in_memory();
    seed_seq_block(&storage, "edge", SeqBlock::new(0, 99_990)).await;
    let journal = JournalDb::new(storage, WriterConfig::default()).unwrap();
    let mut writer = journal.writer(scope("edge")).await.unwrap();

    // when
    for i in 0..20 {
        writer.try_append(format!("e{}", i)).unwrap();
    }
    writer.finalize().await.unwrap();

    // then
    let entries = journal.entries(&scope("edge")).await.unwrap();
    let sequences: Vec<_> = entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, (99_990..100_010).collect::<Vec<_>>());
    let expected: Vec<_> = (0..20).map(|i| format!("e{}", i)).collect();
    assert_eq!(values(&journal, &scope("edge")).await, expected);
}

#[tokio::test]
async fn should_keep_first_key_width_of_scope_when_config_changes() {
    // given
    let storage = in_memory();
    let narrow = JournalDb::new(
        Arc::clone(&storage),
        WriterConfig {
            key_width: 5,
            ..Default::default()
        },
    )
    .unwrap();
    let mut writer = narrow.writer(scope("abc")).await.unwrap();
    for value in ["e0", "e1", "e2"] {
        writer.append(value);
    }
    writer.finalize().await.unwrap();

    // when
    let wide = JournalDb::new(Arc::clone(&storage), WriterConfig::default()).unwrap();
    let mut writer = wide.writer(scope("abc")).await.unwrap();
    writer.append("e3");
    writer.finalize().await.unwrap();

    // then
    let entries = wide.entries(&scope("abc")).await.unwrap();
    let stored: Vec<_> = entries
        .iter()
        .map(|e| (e.sequence, e.entry.value.as_str()))
        .collect();
    assert_eq!(stored, vec![(0, "e0"), (1, "e1"), (2, "e2"), (3, "e3")]);
    let key = storage
        .get(Bytes::from("prefix/abc/00003"))
        .await
        .unwrap();
    assert!(key.is_some());
}

#[tokio::test]
async fn should_fail_append_not_writer_when_lease_exhausted() {
    // given
    let journal = JournalDb::new(
        in_memory(),
        WriterConfig {
            lease_block_size: 3,
            ..Default::default()
        },
    )
    .unwrap();
    let mut writer = journal.writer(scope("small")).await.unwrap();

    // when
    let appended: Vec<_> = (0..5).map(|i| writer.append(format!("e{}", i))).collect();
    let summary = writer.finalize().await.unwrap();

    // then
    assert_eq!(appended, vec![Some(0), Some(1), Some(2), None, None]);
    assert_eq!(summary.entries, 3);
    assert_eq!(values(&journal, &scope("small")).await, vec!["e0", "e1", "e2"]);
}

#[tokio::test]
async fn should_hand_unused_numbers_to_next_writer() {
    // given
    let journal = JournalDb::new(in_memory(), WriterConfig::default()).unwrap();
    let mut first = journal.writer(scope("abc")).await.unwrap();
    first.append("one");
    first.finalize().await.unwrap();

    // when
    let mut second = journal.writer(scope("abc")).await.unwrap();
    let seq = second.append("two");
    second.finalize().await.unwrap();

    // then
    assert_eq!(seq, Some(1));
}

#[tokio::test]
async fn should_not_reuse_numbers_of_newer_lease_on_release() {
    // given
    let journal = JournalDb::new(in_memory(), WriterConfig::default()).unwrap();
    let mut older = journal.writer(scope("abc")).await.unwrap();
    let mut newer = journal.writer(scope("abc")).await.unwrap();
    older.append("older");
    newer.append("newer");

    // when
    older.finalize().await.unwrap();
    let mut third = journal.writer(scope("abc")).await.unwrap();
    let third_seq = third.append("third");
    newer.finalize().await.unwrap();
    third.finalize().await.unwrap();

    // then
    assert_eq!(third_seq, Some(20_000));
    let sequences: Vec<_> = journal
        .entries(&scope("abc"))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.sequence)
        .collect();
    assert_eq!(sequences, vec![0, 10_000, 20_000]);
}

#[tokio::test]
async fn should_return_placeholder_for_corrupt_entry() {
    // given
    let storage = in_memory();
    let journal = JournalDb::new(Arc::clone(&storage), WriterConfig::default()).unwrap();
    let mut writer = journal.writer(scope("abc")).await.unwrap();
    writer.append("good");
    writer.finalize().await.unwrap();
    storage
        .put(vec![Record::new(
            Bytes::from("prefix/abc/00000000000000000001"),
            Bytes::from_static(b"\xff\xfe not json"),
        )])
        .await
        .unwrap();

    // when
    let entries = journal.entries(&scope("abc")).await.unwrap();

    // then
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].entry.value, "good");
    assert!(entries[1].is_placeholder());
    assert!(entries[1].entry.value.starts_with("error: "));
}

#[tokio::test]
async fn should_report_combined_failure_from_finalize() {
    // given
    let storage = Arc::new(FaultyStorage::new());
    let journal = JournalDb::new(storage.clone(), WriterConfig::default()).unwrap();
    let mut writer = journal.writer(scope("abc")).await.unwrap();
    writer.append("doomed");

    // when
    storage.fail_writes(true);
    let result = writer.finalize().await;

    // then
    match result {
        Err(Error::Finalize {
            scope,
            release,
            commit,
        }) => {
            assert_eq!(scope, "abc");
            assert!(release.unwrap().contains(INJECTED_FAILURE));
            assert!(commit.unwrap().contains(INJECTED_FAILURE));
        }
        other => panic!("expected finalize error, got {:?}", other),
    }
    storage.fail_writes(false);
    assert!(values(&journal, &scope("abc")).await.is_empty());
}

#[tokio::test]
async fn should_fail_writer_open_when_lease_cannot_be_acquired() {
    // given
    let storage = Arc::new(FaultyStorage::new());
    let journal = JournalDb::new(storage.clone(), WriterConfig::default()).unwrap();
    storage.fail_writes(true);

    // when
    let result = journal.writer(scope("abc")).await;

    // then
    assert!(matches!(result, Err(Error::Storage(_))));
}

#[tokio::test]
async fn should_abort_scan_on_storage_failure() {
    // given
    let storage = Arc::new(FaultyStorage::new());
    let journal = JournalDb::new(storage.clone(), WriterConfig::default()).unwrap();
    storage.fail_reads(true);

    // when
    let result = journal.entries(&scope("abc")).await;

    // then
    assert!(matches!(result, Err(Error::Storage(_))));
}

#[tokio::test]
async fn should_share_storage_with_reader() {
    // given
    let journal = JournalDb::new(in_memory(), WriterConfig::default()).unwrap();
    let reader = journal.reader();

    // when
    let mut writer = journal.writer_for(Some("req-1")).await.unwrap();
    writer.append_fmt(format_args!("status={}", 200));
    writer.finalize().await.unwrap();

    // then
    let entries = reader.entries(&scope("req-1")).await.unwrap();
    assert_eq!(entries[0].entry.value, "status=200");
}
