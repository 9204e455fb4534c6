//! Store handle for the mortydex data directory.

use std::path::PathBuf;

/// A Store is the directory holding the catalog database and the broker
/// audit log, normally `<project>/.mortydex/data`.
#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute path to the store root directory
    pub root: PathBuf,
}

impl Store {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}
