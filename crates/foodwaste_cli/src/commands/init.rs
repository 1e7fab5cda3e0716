//! Init command implementation.

use foodwaste_core::schema::SQLITE_SCHEMA;
use foodwaste_store::SqliteAccessor;
use std::path::Path;
use tracing::info;

/// Creates every table. Existing tables are left alone.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let accessor = SqliteAccessor::open(super::config(path))?;
    accessor.execute_script(SQLITE_SCHEMA)?;
    info!(path = %path.display(), "schema created");
    println!("Initialized {}", path.display());
    Ok(())
}
