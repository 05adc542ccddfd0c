//! Fact directory loading

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::error::FactError;

/// Key the setup module wraps its payload under
const ANSIBLE_FACTS: &str = "ansible_facts";

/// Loads per-host fact files from configured directories
///
/// Each regular file in a fact directory is one host: the filename is the
/// hostname, the content is the setup module's JSON output (either the bare
/// facts object or wrapped under `ansible_facts`).
pub struct FactLoader {
    fact_dirs: Vec<PathBuf>,
}

impl FactLoader {
    /// Create a loader over the given fact directories
    pub fn new(fact_dirs: Vec<PathBuf>) -> Self {
        Self { fact_dirs }
    }

    /// Load facts for every host found in the configured directories
    ///
    /// Malformed or unreadable files are logged and skipped. A later
    /// directory wins over an earlier one for the same hostname.
    ///
    /// # Errors
    /// Returns an error if a configured directory cannot be read.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<BTreeMap<String, Map<String, Value>>, FactError> {
        let mut facts = BTreeMap::new();

        for dir in &self.fact_dirs {
            debug!(dir = %dir.display(), "reading fact directory");

            let entries = fs::read_dir(dir)
                .map_err(|e| FactError::DirUnreadable(format!("{}: {e}", dir.display())))?;

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                        continue;
                    }
                };

                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(hostname) = path.file_name().and_then(|n| n.to_str()) else {
                    warn!(path = %path.display(), "skipping file with non-UTF-8 name");
                    continue;
                };

                match read_fact_file(&path) {
                    Ok(host_facts) => {
                        debug!(host = %hostname, "loaded facts");
                        facts.insert(hostname.to_string(), host_facts);
                    }
                    Err(reason) => {
                        warn!(path = %path.display(), reason = %reason, "skipping fact file");
                    }
                }
            }
        }

        debug!(hosts = facts.len(), "fact loading completed");

        Ok(facts)
    }
}

/// Parse one setup-module output file
fn read_fact_file(path: &Path) -> Result<Map<String, Value>, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;

    let Value::Object(mut obj) = value else {
        return Err("not a JSON object".to_string());
    };

    // `ansible -m setup --tree` wraps the payload
    if let Some(wrapped) = obj.remove(ANSIBLE_FACTS) {
        return match wrapped {
            Value::Object(inner) => Ok(inner),
            _ => Err("ansible_facts is not an object".to_string()),
        };
    }

    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_bare_fact_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "web1", r#"{"kernel": "6.8.0"}"#);

        let loader = FactLoader::new(vec![dir.path().to_path_buf()]);
        let facts = loader.load().unwrap();

        assert_eq!(facts["web1"]["kernel"], "6.8.0");
    }

    #[test]
    fn test_load_wrapped_fact_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "web1",
            r#"{"ansible_facts": {"kernel": "6.8.0"}}"#,
        );

        let loader = FactLoader::new(vec![dir.path().to_path_buf()]);
        let facts = loader.load().unwrap();

        assert_eq!(facts["web1"]["kernel"], "6.8.0");
    }

    #[test]
    fn test_malformed_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "web1", r#"{"kernel": "6.8.0"}"#);
        write_file(dir.path(), "broken", "not json at all");
        write_file(dir.path(), "scalar", r#""just a string""#);

        let loader = FactLoader::new(vec![dir.path().to_path_buf()]);
        let facts = loader.load().unwrap();

        assert_eq!(facts.len(), 1);
        assert!(facts.contains_key("web1"));
    }

    #[test]
    fn test_later_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_file(first.path(), "web1", r#"{"kernel": "6.8.0"}"#);
        write_file(second.path(), "web1", r#"{"kernel": "6.9.1"}"#);

        let loader = FactLoader::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let facts = loader.load().unwrap();

        assert_eq!(facts["web1"]["kernel"], "6.9.1");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let loader = FactLoader::new(vec![missing]);
        let result = loader.load();

        assert!(matches!(result, Err(FactError::DirUnreadable(_))));
    }

    #[test]
    fn test_subdirectories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_file(dir.path(), "web1", r#"{"kernel": "6.8.0"}"#);

        let loader = FactLoader::new(vec![dir.path().to_path_buf()]);
        let facts = loader.load().unwrap();

        assert_eq!(facts.len(), 1);
    }
}
