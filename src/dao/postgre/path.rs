use std::{fs, path::PathBuf};

use crate::error::Error;

/// Reads a migration file from `<dir>/migration/postgresql/<file>`.
pub fn get_path(dir: &str, file: &str) -> Result<String, Error> {
    let mut buf = PathBuf::new();

    for chunk in [dir, "migration", "postgresql", file] {
        buf.push(chunk);
    }

    Ok(fs::read_to_string(buf)?)
}
