use kindstore::memtable::MemTable;
use kindstore::storage::StorageManager;
use tempfile::TempDir;

fn memtable(entries: &[(&str, Option<&str>)]) -> MemTable {
    let table = MemTable::new();
    for (key, value) in entries {
        match value {
            Some(v) => table.put(key.as_bytes().to_vec(), v.as_bytes().to_vec()),
            None => table.delete(key.as_bytes().to_vec()),
        };
    }
    table
}

#[test]
fn test_newest_table_wins_for_get_and_scan() {
    let dir = TempDir::new().unwrap();
    let manager = StorageManager::open(dir.path()).unwrap();

    manager
        .flush(&memtable(&[
            ("user_1", Some(r#"{"age":30}"#)),
            ("user_2", Some(r#"{"age":25}"#)),
        ]))
        .unwrap();
    manager
        .flush(&memtable(&[("user_1", Some(r#"{"age":31}"#)), ("user_2", None)]))
        .unwrap();

    assert_eq!(manager.get(b"user_1").unwrap(), Some(br#"{"age":31}"#.to_vec()));
    assert_eq!(manager.get(b"user_2").unwrap(), None);

    let merged = manager.scan_prefix(b"user_").unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[&b"user_1".to_vec()], Some(br#"{"age":31}"#.to_vec()));
    assert_eq!(merged[&b"user_2".to_vec()], None);
}

#[test]
fn test_reopen_discovers_tables_and_continues_ids() {
    let dir = TempDir::new().unwrap();
    {
        let manager = StorageManager::open(dir.path()).unwrap();
        manager.flush(&memtable(&[("org_1", Some("a"))])).unwrap();
        manager.flush(&memtable(&[("org_1", Some("b"))])).unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let manager = StorageManager::open(dir.path()).unwrap();
    assert_eq!(manager.sstable_count(), 2);
    assert_eq!(manager.next_sstable_id(), 3);
    assert_eq!(manager.get(b"org_1").unwrap(), Some(b"b".to_vec()));
}

#[test]
fn test_flush_of_empty_memtable_fails() {
    let dir = TempDir::new().unwrap();
    let manager = StorageManager::open(dir.path()).unwrap();

    assert!(manager.flush(&MemTable::new()).is_err());
    assert_eq!(manager.sstable_count(), 0);
}

#[test]
fn test_clear_unlinks_every_table() {
    let dir = TempDir::new().unwrap();
    let manager = StorageManager::open(dir.path()).unwrap();
    manager.flush(&memtable(&[("user_1", Some("x"))])).unwrap();
    manager.flush(&memtable(&[("org_1", Some("y"))])).unwrap();

    manager.clear().unwrap();

    assert_eq!(manager.sstable_count(), 0);
    assert!(manager.scan_prefix(b"").unwrap().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
