#![allow(missing_docs)]

pub(crate) mod http;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{AppState, SQLiteCheckStore, db::initialize, pagination::PaginationConfig};

pub(crate) use http::{get_header, parse_json_body};

/// An in-memory database with every table created.
pub(crate) fn test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// App state backed by an in-memory database, using UTC as the local timezone.
pub(crate) fn test_state() -> AppState<SQLiteCheckStore> {
    AppState::new(
        SQLiteCheckStore::new(Arc::new(Mutex::new(test_connection()))),
        "Etc/UTC",
        PaginationConfig::default(),
    )
    .expect("Could not create app state")
}
