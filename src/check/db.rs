//! Storage of checks.

use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, check::Check};

/// Handles the creation and retrieval of checks.
pub trait CheckStore {
    /// Add a new check to the store.
    ///
    /// # Errors
    ///
    /// Returns [Error::DuplicateCheckNumber] if a check with the same check
    /// number already exists. Existing checks are never overwritten.
    fn insert_unique(&self, check: Check) -> Result<Check, Error>;

    /// Whether a check with `check_number` exists in the store.
    fn contains_check_number(&self, check_number: &str) -> Result<bool, Error>;

    /// Retrieve the checks for `customer_id` issued within `issuance_range` (inclusive).
    ///
    /// Checks are ordered by issuance time, then by insertion order.
    fn find_by_customer_and_range(
        &self,
        customer_id: &str,
        issuance_range: &RangeInclusive<OffsetDateTime>,
    ) -> Result<Vec<Check>, Error>;
}

/// Stores checks in a SQLite database.
///
/// The `checks` table must exist, see [create_check_table].
#[derive(Debug, Clone)]
pub struct SQLiteCheckStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCheckStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl CheckStore for SQLiteCheckStore {
    fn insert_unique(&self, check: Check) -> Result<Check, Error> {
        let connection = self.lock()?;

        connection.execute(
            "INSERT INTO checks \
                (check_number, check_issuance_time, issued_at, total, customer_id, pos_id) \
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                &check.check_number,
                check.check_issuance_time,
                unix_timestamp_micros(&check.check_issuance_time),
                check.total,
                &check.customer_id,
                &check.pos_id,
            ),
        )?;

        Ok(check)
    }

    fn contains_check_number(&self, check_number: &str) -> Result<bool, Error> {
        let connection = self.lock()?;

        let exists = connection
            .prepare("SELECT EXISTS(SELECT 1 FROM checks WHERE check_number = ?1)")?
            .query_row([check_number], |row| row.get(0))?;

        Ok(exists)
    }

    fn find_by_customer_and_range(
        &self,
        customer_id: &str,
        issuance_range: &RangeInclusive<OffsetDateTime>,
    ) -> Result<Vec<Check>, Error> {
        let connection = self.lock()?;

        let checks: Result<Vec<Check>, Error> = connection
            .prepare(
                "SELECT check_number, check_issuance_time, total, customer_id, pos_id \
                FROM checks \
                WHERE customer_id = ?1 AND issued_at BETWEEN ?2 AND ?3 \
                ORDER BY issued_at ASC, id ASC",
            )?
            .query_map(
                (
                    customer_id,
                    unix_timestamp_micros(issuance_range.start()),
                    unix_timestamp_micros(issuance_range.end()),
                ),
                map_row,
            )?
            .map(|maybe_check| maybe_check.map_err(Error::from))
            .collect();

        checks
    }
}

/// Initialize the check table and indexes.
///
/// The issuance time is stored twice: as text that keeps the submitted UTC
/// offset, and as microseconds since the Unix epoch for range queries.
pub fn create_check_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS checks (
            id INTEGER PRIMARY KEY,
            check_number TEXT NOT NULL UNIQUE,
            check_issuance_time TEXT NOT NULL,
            issued_at INTEGER NOT NULL,
            total INTEGER NOT NULL,
            customer_id TEXT NOT NULL,
            pos_id TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_checks_customer_issued_at ON checks(customer_id, issued_at);",
    )?;

    Ok(())
}

fn unix_timestamp_micros(date_time: &OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000) as i64
}

fn map_row(row: &Row) -> Result<Check, rusqlite::Error> {
    Ok(Check {
        check_number: row.get(0)?,
        check_issuance_time: row.get(1)?,
        total: row.get(2)?,
        customer_id: row.get(3)?,
        pos_id: row.get(4)?,
    })
}
