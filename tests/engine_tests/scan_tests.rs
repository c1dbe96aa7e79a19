//! Prefix scans and tombstones across memtable and SSTables

use tempfile::TempDir;

use crate::common::{age_of, keys, open, remove, save, scan_kind};

#[test]
fn test_scan_stays_inside_kind_partition() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);

    save(&engine, "user", "b", 20);
    save(&engine, "org", "1", 50);
    save(&engine, "user", "a", 30);
    save(&engine, "users", "x", 40);

    assert_eq!(keys(&scan_kind(&engine, "user")), ["user_a", "user_b"]);
    assert_eq!(keys(&scan_kind(&engine, "org")), ["org_1"]);
    assert!(scan_kind(&engine, "team").is_empty());
}

#[test]
fn test_empty_prefix_returns_whole_keyspace_sorted() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);

    save(&engine, "user", "1", 30);
    save(&engine, "org", "1", 50);
    engine.flush().unwrap();
    save(&engine, "account", "1", 10);

    let all: Vec<_> = engine
        .scan(b"")
        .unwrap()
        .into_iter()
        .map(|(k, _)| String::from_utf8(k).unwrap())
        .collect();
    assert_eq!(all, ["account_1", "org_1", "user_1"]);
}

#[test]
fn test_scan_newest_version_wins_across_layers() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);

    save(&engine, "user", "1", 30);
    save(&engine, "user", "2", 25);
    engine.flush().unwrap();

    save(&engine, "user", "1", 31);
    engine.flush().unwrap();

    // Still in the memtable
    save(&engine, "user", "2", 26);
    save(&engine, "user", "3", 40);

    assert_eq!(engine.sstable_count(), 2);
    assert_eq!(
        scan_kind(&engine, "user"),
        [
            ("user_1".to_string(), 31),
            ("user_2".to_string(), 26),
            ("user_3".to_string(), 40),
        ]
    );
    assert_eq!(age_of(&engine, "user", "1"), Some(31));
}

#[test]
fn test_memtable_tombstone_hides_flushed_record() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);

    save(&engine, "user", "1", 30);
    save(&engine, "user", "2", 25);
    engine.flush().unwrap();

    remove(&engine, "user", "1");

    assert_eq!(age_of(&engine, "user", "1"), None);
    assert_eq!(keys(&scan_kind(&engine, "user")), ["user_2"]);
}

#[test]
fn test_flushed_tombstone_keeps_hiding_older_table() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);

    save(&engine, "user", "1", 30);
    engine.flush().unwrap();
    remove(&engine, "user", "1");
    engine.flush().unwrap();

    assert_eq!(engine.memtable_entry_count(), 0);
    assert_eq!(age_of(&engine, "user", "1"), None);
    assert!(scan_kind(&engine, "user").is_empty());

    // A later save resurrects the key
    save(&engine, "user", "1", 32);
    assert_eq!(age_of(&engine, "user", "1"), Some(32));
}

#[test]
fn test_delete_of_absent_key_succeeds() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);

    remove(&engine, "user", "ghost");
    assert!(scan_kind(&engine, "user").is_empty());
}
