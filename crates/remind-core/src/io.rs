use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory,
/// creating parent directories as needed.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Serialize `value` as YAML and write it atomically.
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_yaml::to_string(value)?;
    atomic_write(path, data.as_bytes())
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".remind/avatars/grandma.yaml");
        atomic_write(&path, b"id: grandma").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id: grandma");
    }

    #[test]
    fn atomic_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        atomic_write(&path, b"version: 1").unwrap();
        atomic_write(&path, b"version: 2").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 2");
    }

    #[test]
    fn yaml_helpers_share_a_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("steps.yaml");
        let value: BTreeMap<String, u32> = [("see".to_string(), 5), ("touch".to_string(), 4)]
            .into_iter()
            .collect();
        write_yaml(&path, &value).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("see: 5"));
        let back: BTreeMap<String, u32> = read_yaml(&path).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn read_yaml_reports_bad_documents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "id: [unclosed").unwrap();
        let result: Result<BTreeMap<String, String>> = read_yaml(&path);
        assert!(matches!(result, Err(crate::RemindError::Yaml(_))));
    }
}
