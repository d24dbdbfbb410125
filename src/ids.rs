//! Identifier generation.
//!
//! Two policies are used across the crate. Incremental sessions seed ids from
//! the clock and probe the table for collisions, so entities created within
//! the same millisecond still get distinct, monotonic ids. Bulk construction
//! uses a running counter that honors caller-supplied ids when they are above
//! the high-water mark and synthesizes the next free id otherwise. Both are
//! deterministic for a fixed input sequence.

use rusqlite::{params, Connection, OptionalExtension};

/// Return `seed` unless `table.column` already holds a value >= `seed`, in
/// which case return one past the current maximum.
pub(crate) fn probe_next(
    conn: &Connection,
    table: &str,
    column: &str,
    seed: i64,
) -> rusqlite::Result<i64> {
    let sql =
        format!("SELECT {column} FROM {table} WHERE {column} >= ?1 ORDER BY {column} DESC LIMIT 1");
    let existing: Option<i64> = conn
        .query_row(&sql, params![seed], |row| row.get(0))
        .optional()?;
    Ok(match existing {
        Some(max) => max + 1,
        None => seed,
    })
}

/// Running-counter id allocator for bulk construction.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    mark: i64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the high-water mark above a range of reserved ids.
    pub fn starting_at(mark: i64) -> Self {
        Self { mark }
    }

    /// Honor `candidate` when it is above the high-water mark, otherwise
    /// synthesize the next free id.
    pub fn next(&mut self, candidate: i64) -> i64 {
        if candidate > self.mark {
            self.mark = candidate;
            candidate
        } else {
            self.mark += 1;
            self.mark
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_honors_non_colliding_ids() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(5), 5);
        assert_eq!(ids.next(10), 10);
    }

    #[test]
    fn allocator_synthesizes_on_collision() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(5), 5);
        assert_eq!(ids.next(5), 6);
        assert_eq!(ids.next(0), 7);
        assert_eq!(ids.next(100), 100);
    }

    #[test]
    fn allocator_with_reserved_range() {
        let mut ids = IdAllocator::starting_at(1);
        assert_eq!(ids.next(0), 2);
        assert_eq!(ids.next(1), 3);
    }

    #[test]
    fn probe_returns_seed_on_empty_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, mid INTEGER NOT NULL)")
            .unwrap();
        assert_eq!(probe_next(&conn, "notes", "id", 123).unwrap(), 123);

        conn.execute("INSERT INTO notes VALUES (123, 1)", []).unwrap();
        assert_eq!(probe_next(&conn, "notes", "id", 123).unwrap(), 124);

        // Values below the seed are not collisions.
        assert_eq!(probe_next(&conn, "notes", "id", 500).unwrap(), 500);
    }
}
