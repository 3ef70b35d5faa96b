//! Seed file loading.
//!
//! A seed file is the JSON form of [`ManagerConfig`]:
//!
//! ```json
//! {
//!   "old_seeds": ["..."],
//!   "current_seeds": ["..."],
//!   "new_seeds": [],
//!   "policy": "first_configured"
//! }
//! ```
//!
//! Every key is optional; missing lists are empty.

use std::{fs, path::Path};

use ticketseed_core::ManagerConfig;

use crate::error::CliError;

/// Read a manager configuration from a JSON seed file.
pub fn load_seed_file(path: &Path) -> Result<ManagerConfig, CliError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    let config: ManagerConfig = serde_json::from_str(&contents)
        .map_err(|source| CliError::Parse { path: path.to_path_buf(), source })?;

    tracing::debug!(
        path = %path.display(),
        old = config.seeds.old_seeds.len(),
        current = config.seeds.current_seeds.len(),
        new = config.seeds.new_seeds.len(),
        "Loaded seed file"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ticketseed_core::EncryptionKeyPolicy;

    use super::*;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_full_record() {
        let file = write(
            r#"{ "old_seeds": ["a"], "current_seeds": ["b"], "new_seeds": ["c"],
                 "policy": "spread_current" }"#,
        );

        let config = load_seed_file(file.path()).unwrap();

        assert_eq!(config.seeds.old_seeds, vec!["a"]);
        assert_eq!(config.seeds.current_seeds, vec!["b"]);
        assert_eq!(config.seeds.new_seeds, vec!["c"]);
        assert_eq!(config.policy, EncryptionKeyPolicy::SpreadCurrent);
    }

    #[test]
    fn missing_keys_default() {
        let file = write(r#"{ "current_seeds": ["b"] }"#);

        let config = load_seed_file(file.path()).unwrap();

        assert!(config.seeds.old_seeds.is_empty());
        assert_eq!(config.policy, EncryptionKeyPolicy::FirstConfigured);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write("{ current_seeds: ");
        assert!(matches!(load_seed_file(file.path()), Err(CliError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_seed_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(CliError::Read { .. })));
    }
}
