//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error, check::SQLiteCheckStore, db::initialize, pagination::PaginationConfig,
    timezone::LocalTimezone,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<C>
where
    C: Clone + Send + Sync,
{
    /// The store for checks.
    pub check_store: C,

    /// The timezone used for datetimes submitted without an offset.
    pub local_timezone: LocalTimezone,

    /// The config that controls how to split reports into pages.
    pub pagination_config: PaginationConfig,
}

impl<C> AppState<C>
where
    C: Clone + Send + Sync,
{
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Europe/Moscow".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if `local_timezone` is not a known timezone.
    pub fn new(
        check_store: C,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            check_store,
            local_timezone: LocalTimezone::new(local_timezone)?,
            pagination_config,
        })
    }
}

impl AppState<SQLiteCheckStore> {
    /// Create a new [AppState] backed by a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the timezone is invalid.
    pub fn with_sqlite(
        db_connection: Connection,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Self::new(
            SQLiteCheckStore::new(connection),
            local_timezone,
            pagination_config,
        )
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{AppState, Error, pagination::PaginationConfig};

    #[test]
    fn rejects_unknown_timezone() {
        let connection = Connection::open_in_memory().unwrap();

        let got =
            AppState::with_sqlite(connection, "Mars/Olympus_Mons", PaginationConfig::default());

        assert_eq!(
            got.map(|_| ()),
            Err(Error::InvalidTimezone("Mars/Olympus_Mons".to_owned()))
        );
    }

    #[test]
    fn resolves_timezone() {
        let connection = Connection::open_in_memory().unwrap();

        let state =
            AppState::with_sqlite(connection, "Europe/Moscow", PaginationConfig::default())
                .unwrap();

        assert_eq!(state.local_timezone.name(), "Europe/Moscow");
    }
}
