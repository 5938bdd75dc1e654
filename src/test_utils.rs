//! Helpers shared by the HTTP endpoint tests.

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{AppState, build_router};

/// Create a test server for the full router backed by an in-memory database.
pub(crate) fn get_test_server() -> TestServer {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database.");
    let state = AppState::new(connection).expect("Could not create app state.");

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}
