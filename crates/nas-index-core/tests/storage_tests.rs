use nas_index_core::storage::models::*;
use nas_index_core::storage::Database;

fn make_test_record(path: &str, size: i64, hash: Option<&str>) -> FileRecord {
    FileRecord {
        id: 0,
        path: path.to_string(),
        size,
        mtime_ns: 1_700_000_000_000_000_000,
        atime_ns: 1_700_000_000_000_000_000,
        ctime_ns: 1_700_000_000_000_000_000,
        mode: 0o100644,
        uid: 1000,
        gid: 1000,
        dev: 66306,
        inode: 424242,
        content_hash: hash.map(|h| h.to_string()),
        mime: Some("text/plain".to_string()),
        attrs: None,
        error: None,
        scanned_at: "2026-08-30T12:00:00+00:00".to_string(),
    }
}

#[test]
fn test_upsert_and_lookup_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let record = make_test_record("/nas/data/a.txt", 100, Some("aa11"));
    db.upsert_file(&record).unwrap();

    let found = db.lookup_file("/nas/data/a.txt").unwrap().unwrap();
    assert_eq!(found.path, "/nas/data/a.txt");
    assert_eq!(found.size, 100);
    assert_eq!(found.mtime_ns, 1_700_000_000_000_000_000);
    assert_eq!(found.mode, 0o100644);
    assert_eq!(found.uid, 1000);
    assert_eq!(found.dev, 66306);
    assert_eq!(found.inode, 424242);
    assert_eq!(found.content_hash.as_deref(), Some("aa11"));
    assert_eq!(found.mime.as_deref(), Some("text/plain"));
    assert!(found.error.is_none());
}

#[test]
fn test_lookup_missing_path() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.lookup_file("/nas/missing").unwrap().is_none());
}

#[test]
fn test_upsert_is_idempotent_by_path() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_file(&make_test_record("/nas/x", 100, None)).unwrap();
    db.upsert_file(&make_test_record("/nas/x", 100, None)).unwrap();
    assert_eq!(db.file_count().unwrap(), 1);

    // An update replaces the row content, never duplicates it.
    let mut updated = make_test_record("/nas/x", 250, Some("bb22"));
    updated.mtime_ns += 5;
    db.upsert_file(&updated).unwrap();
    assert_eq!(db.file_count().unwrap(), 1);

    let found = db.lookup_file("/nas/x").unwrap().unwrap();
    assert_eq!(found.size, 250);
    assert_eq!(found.content_hash.as_deref(), Some("bb22"));
}

#[test]
fn test_find_duplicates_groups_and_orders_by_path() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_file(&make_test_record("/nas/b", 10, Some("dupe1"))).unwrap();
    db.upsert_file(&make_test_record("/nas/a", 10, Some("dupe1"))).unwrap();
    db.upsert_file(&make_test_record("/nas/c", 20, Some("solo"))).unwrap();
    db.upsert_file(&make_test_record("/nas/d", 30, None)).unwrap();
    db.upsert_file(&make_test_record("/nas/e", 40, Some("dupe2"))).unwrap();
    db.upsert_file(&make_test_record("/nas/f", 40, Some("dupe2"))).unwrap();
    db.upsert_file(&make_test_record("/nas/g", 40, Some("dupe2"))).unwrap();

    let groups = db.find_duplicates().unwrap();
    assert_eq!(groups.len(), 2, "singleton and null hashes must be excluded");

    let dupe1 = groups.iter().find(|g| g.content_hash == "dupe1").unwrap();
    let paths: Vec<&str> = dupe1.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["/nas/a", "/nas/b"], "members sorted by path");
    assert_eq!(dupe1.files[0].size, 10);

    let dupe2 = groups.iter().find(|g| g.content_hash == "dupe2").unwrap();
    assert_eq!(dupe2.files.len(), 3);
}

#[test]
fn test_error_marker_persisted() {
    let db = Database::open_in_memory().unwrap();
    let mut record = make_test_record("/nas/broken.nc", 64, None);
    record.error = Some("mime: unreadable header".to_string());
    db.upsert_file(&record).unwrap();

    let found = db.lookup_file("/nas/broken.nc").unwrap().unwrap();
    assert_eq!(found.error.as_deref(), Some("mime: unreadable header"));
    assert_eq!(found.size, 64, "base fields survive an extraction failure");
}

#[test]
fn test_attrs_json_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let mut record = make_test_record("/nas/grid.nc", 2048, None);
    record.attrs = Some(r#"{"producer":"ECMWF","variables":"t2m"}"#.to_string());
    db.upsert_file(&record).unwrap();

    let found = db.lookup_file("/nas/grid.nc").unwrap().unwrap();
    let attrs: serde_json::Value = serde_json::from_str(found.attrs.as_deref().unwrap()).unwrap();
    assert_eq!(attrs["producer"], "ECMWF");
}

#[test]
fn test_truncate_all() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_file(&make_test_record("/nas/t", 1, None)).unwrap();
    db.truncate_all().unwrap();
    assert_eq!(db.file_count().unwrap(), 0);
}

#[test]
fn test_reopen_preserves_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("index.db");

    {
        let db = Database::open(&db_path).unwrap();
        db.upsert_file(&make_test_record("/nas/persist", 7, Some("cafe"))).unwrap();
    }

    let db = Database::open(&db_path).unwrap();
    let found = db.lookup_file("/nas/persist").unwrap().unwrap();
    assert_eq!(found.content_hash.as_deref(), Some("cafe"));
}
