//! @ai:module:intent Load canned extraction payloads from a fixtures directory
//! @ai:module:layer infrastructure
//! @ai:module:public_api load_fixtures, fixture_factory
//! @ai:module:stateless true

use crate::browser::MockSessionFactory;
use crate::error::{EvalError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// @ai:intent Parse one fixture file
/// @ai:pre path points to a JSON file
/// @ai:effects fs:read
fn parse_fixture(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// @ai:intent Read every `<task_name>.json` file below a directory
/// @ai:effects fs:read
pub fn load_fixtures(dir: &Path) -> Result<BTreeMap<String, serde_json::Value>> {
    if !dir.is_dir() {
        return Err(EvalError::Config {
            path: dir.to_path_buf(),
            message: "fixtures directory does not exist".to_string(),
        });
    }

    let mut fixtures = BTreeMap::new();

    let files = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false));

    for entry in files {
        let path = entry.path();
        let Some(task_name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        match parse_fixture(path) {
            Ok(payload) => {
                fixtures.insert(task_name.to_string(), payload);
            }
            Err(e) => {
                tracing::warn!("Skipping invalid fixture {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!("Loaded {} fixtures from {}", fixtures.len(), dir.display());
    Ok(fixtures)
}

/// @ai:intent Build a mock collaborator answering with the fixtures in a directory
/// @ai:effects fs:read
pub fn fixture_factory(dir: &Path) -> Result<MockSessionFactory> {
    let factory = load_fixtures(dir)?
        .into_iter()
        .fold(MockSessionFactory::new(), |factory, (task, payload)| {
            factory.with_response(task, payload)
        });

    Ok(factory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_loads_json_files_by_stem() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("extract_capacitor_info.json"),
            r#"{ "ECCN_code": "EAR99" }"#,
        )
        .unwrap();
        std::fs::create_dir_all(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("nested/other.json"), "[]").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let fixtures = load_fixtures(temp.path()).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures["extract_capacitor_info"]["ECCN_code"], "EAR99");
    }

    #[test]
    fn test_invalid_json_is_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("broken.json"), "{ not json").unwrap();

        let fixtures = load_fixtures(temp.path()).unwrap();
        assert!(fixtures.is_empty());
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let err = load_fixtures(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, EvalError::Config { .. }));
    }
}
