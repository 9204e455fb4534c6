use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &str) -> Result<Connection, error::MortydexError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::MortydexError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::MortydexError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::MortydexError::RusqliteError)?;
    Ok(conn)
}

pub fn catalog_db_path(root: &Path) -> PathBuf {
    root.join(schemas::CATALOG_DB_NAME)
}

pub fn initialize_catalog_db(root: &Path) -> Result<(), error::MortydexError> {
    let db_path = catalog_db_path(root);
    fs::create_dir_all(root).map_err(error::MortydexError::IoError)?;

    let broker = DbBroker::new(root);
    broker.with_conn(&db_path, "mortydex", None, "catalog.init", |conn| {
        for statement in schemas::CATALOG_DB_STATEMENTS {
            conn.execute(statement, [])?;
        }
        Ok(())
    })?;

    Ok(())
}
