//! Runtime configuration shared by the FFI bridge and the smoke-check CLI.

use std::ffi::OsStr;
use std::path::PathBuf;

/// Environment variable selecting the medication database file.
pub const DB_PATH_ENV: &str = "MEDTRACK_DB_PATH";
/// File name used under the temp dir when `DB_PATH_ENV` is unset or blank.
pub const DEFAULT_DB_FILE_NAME: &str = "medtrack.sqlite3";

/// Resolves the database path from `MEDTRACK_DB_PATH`.
pub fn db_path_from_env() -> PathBuf {
    db_path_from(std::env::var_os(DB_PATH_ENV).as_deref())
}

/// Uses `raw` when it is non-blank after trimming, else the temp-dir default.
///
/// Non-UTF-8 values are used verbatim.
pub fn db_path_from(raw: Option<&OsStr>) -> PathBuf {
    match raw {
        Some(value) => match value.to_str() {
            Some(text) if text.trim().is_empty() => default_db_path(),
            Some(text) => PathBuf::from(text.trim()),
            None => PathBuf::from(value),
        },
        None => default_db_path(),
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{db_path_from, DEFAULT_DB_FILE_NAME};
    use std::ffi::OsStr;
    use std::path::PathBuf;

    #[test]
    fn blank_or_missing_values_fall_back_to_temp_dir() {
        let fallback = std::env::temp_dir().join(DEFAULT_DB_FILE_NAME);
        assert_eq!(db_path_from(None), fallback);
        assert_eq!(db_path_from(Some(OsStr::new(""))), fallback);
        assert_eq!(db_path_from(Some(OsStr::new("  \t"))), fallback);
    }

    #[test]
    fn configured_value_is_trimmed() {
        assert_eq!(
            db_path_from(Some(OsStr::new(" /data/meds.sqlite3 "))),
            PathBuf::from("/data/meds.sqlite3")
        );
    }
}
