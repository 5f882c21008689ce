use super::models::*;
use super::sqlite::Database;
use rusqlite::{params, Result, Row};
use tracing::trace;

fn record_from_row(row: &Row<'_>) -> Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        size: row.get(2)?,
        mtime_ns: row.get(3)?,
        atime_ns: row.get(4)?,
        ctime_ns: row.get(5)?,
        mode: row.get(6)?,
        uid: row.get(7)?,
        gid: row.get(8)?,
        dev: row.get(9)?,
        inode: row.get(10)?,
        content_hash: row.get(11)?,
        mime: row.get(12)?,
        attrs: row.get(13)?,
        error: row.get(14)?,
        scanned_at: row.get(15)?,
    })
}

const RECORD_COLUMNS: &str = "id, path, size, mtime_ns, atime_ns, ctime_ns, mode, uid, gid, \
                              dev, inode, content_hash, mime, attrs, error, scanned_at";

impl Database {
    // ── File records ─────────────────────────────────────────────

    /// Idempotent upsert keyed by path. A single statement is a single
    /// durable transaction, so a crash never leaves a half-written row.
    pub fn upsert_file(&self, record: &FileRecord) -> Result<()> {
        let mut stmt = self.connection().prepare_cached(
            "INSERT INTO file_record \
             (path, size, mtime_ns, atime_ns, ctime_ns, mode, uid, gid, \
              dev, inode, content_hash, mime, attrs, error, scanned_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15) \
             ON CONFLICT(path) DO UPDATE SET \
                 size = excluded.size, \
                 mtime_ns = excluded.mtime_ns, \
                 atime_ns = excluded.atime_ns, \
                 ctime_ns = excluded.ctime_ns, \
                 mode = excluded.mode, \
                 uid = excluded.uid, \
                 gid = excluded.gid, \
                 dev = excluded.dev, \
                 inode = excluded.inode, \
                 content_hash = excluded.content_hash, \
                 mime = excluded.mime, \
                 attrs = excluded.attrs, \
                 error = excluded.error, \
                 scanned_at = excluded.scanned_at",
        )?;
        stmt.execute(params![
            record.path,
            record.size,
            record.mtime_ns,
            record.atime_ns,
            record.ctime_ns,
            record.mode,
            record.uid,
            record.gid,
            record.dev,
            record.inode,
            record.content_hash,
            record.mime,
            record.attrs,
            record.error,
            record.scanned_at,
        ])?;
        trace!("Upserted {}", record.path);
        Ok(())
    }

    /// Point lookup by path, used by the resume check.
    pub fn lookup_file(&self, path: &str) -> Result<Option<FileRecord>> {
        let mut stmt = self.connection().prepare_cached(&format!(
            "SELECT {RECORD_COLUMNS} FROM file_record WHERE path = ?1"
        ))?;
        match stmt.query_row(params![path], record_from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn file_count(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM file_record", [], |row| row.get(0))
    }

    // ── Duplicate detection ──────────────────────────────────────

    /// Group rows with a non-null content hash by hash value, keeping only
    /// groups with two or more members. Members are sorted by path for
    /// deterministic output.
    pub fn find_duplicates(&self) -> Result<Vec<DuplicateGroup>> {
        let mut hash_stmt = self.connection().prepare(
            "SELECT content_hash, COUNT(*) AS members FROM file_record \
             WHERE content_hash IS NOT NULL \
             GROUP BY content_hash HAVING members > 1 \
             ORDER BY content_hash",
        )?;
        let hashes = hash_stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>>>()?;

        let mut member_stmt = self.connection().prepare(
            "SELECT path, size, mtime_ns FROM file_record \
             WHERE content_hash = ?1 ORDER BY path",
        )?;

        let mut groups = Vec::with_capacity(hashes.len());
        for content_hash in hashes {
            let files = member_stmt
                .query_map(params![content_hash], |row| {
                    Ok(DuplicateMember {
                        path: row.get(0)?,
                        size: row.get(1)?,
                        mtime_ns: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>>>()?;
            groups.push(DuplicateGroup {
                content_hash,
                files,
            });
        }
        Ok(groups)
    }
}
