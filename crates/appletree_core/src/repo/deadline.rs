//! Deadline scoping for single store interactions.
//!
//! A deadline installs a SQLite progress handler that interrupts the running
//! statement once the budget is spent, and caps the connection's lock wait at
//! the same budget. Both are restored on drop.

use rusqlite::{Connection, ErrorCode};
use std::time::{Duration, Instant};

/// VM instructions between deadline checks.
const PROGRESS_CHECK_INTERVAL: i32 = 1_000;

pub(crate) struct Deadline<'conn> {
    conn: &'conn Connection,
    previous_lock_wait: Duration,
    lock_wait_capped: bool,
}

impl<'conn> Deadline<'conn> {
    pub(crate) fn start(conn: &'conn Connection, budget: Duration) -> rusqlite::Result<Self> {
        let previous_ms: i64 = conn.query_row("PRAGMA busy_timeout;", [], |row| row.get(0))?;
        let previous_lock_wait = Duration::from_millis(previous_ms.max(0) as u64);

        let lock_wait_capped = budget <= previous_lock_wait;
        if lock_wait_capped {
            conn.busy_timeout(ceil_millis(budget))?;
        }

        match Instant::now().checked_add(budget) {
            Some(expires_at) => conn.progress_handler(
                PROGRESS_CHECK_INTERVAL,
                Some(move || Instant::now() >= expires_at),
            ),
            None => conn.progress_handler(PROGRESS_CHECK_INTERVAL, None::<fn() -> bool>),
        }

        Ok(Self {
            conn,
            previous_lock_wait,
            lock_wait_capped,
        })
    }

    /// Returns whether `err` means the budget ran out, either mid-statement
    /// or while waiting on a lock held by another connection.
    pub(crate) fn expired_by(&self, err: &rusqlite::Error) -> bool {
        match err.sqlite_error_code() {
            Some(ErrorCode::OperationInterrupted) => true,
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => self.lock_wait_capped,
            _ => false,
        }
    }
}

impl Drop for Deadline<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
        if self.lock_wait_capped {
            let _ = self.conn.busy_timeout(self.previous_lock_wait);
        }
    }
}

fn ceil_millis(budget: Duration) -> Duration {
    let millis = budget.as_millis() + u128::from(budget.subsec_nanos() % 1_000_000 != 0);
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}
