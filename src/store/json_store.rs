use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::session::workout::PlanTemplate;
use crate::store::plan_store::{PlanStore, StoreError};
use crate::store::schema::PlansData;

/// One JSON document per user under `<base_dir>/plans/`.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self, StoreError> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("liftdeck");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(base_dir.join("plans"))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, user: &str) -> PathBuf {
        self.base_dir
            .join("plans")
            .join(format!("{}.json", encode_user(user)))
    }

    /// Missing files and unparsable content both read as the default.
    fn load<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T, StoreError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(%e, path = %path.display(), "discarding unreadable plans file");
                T::default()
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save<T: Serialize>(&self, path: &Path, data: &T) -> Result<(), StoreError> {
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn load_user(&self, user: &str) -> Result<PlansData, StoreError> {
        let data: PlansData = self.load(&self.file_path(user))?;
        if data.needs_reset() {
            tracing::warn!(
                user,
                version = data.schema_version,
                "plans file has a stale schema, starting fresh"
            );
            return Ok(PlansData::default());
        }
        Ok(data)
    }
}

impl PlanStore for JsonStore {
    fn load_plan(&self, user: &str, day: &str) -> Result<Option<PlanTemplate>, StoreError> {
        Ok(self.load_user(user)?.plans.remove(day))
    }

    fn save_plan(&self, user: &str, day: &str, plan: &PlanTemplate) -> Result<(), StoreError> {
        let mut data = self.load_user(user)?;
        data.plans.insert(day.to_string(), plan.clone());
        self.save(&self.file_path(user), &data)?;
        tracing::debug!(user, day, "saved plan");
        Ok(())
    }

    fn load_all(&self, user: &str) -> Result<BTreeMap<String, PlanTemplate>, StoreError> {
        Ok(self.load_user(user)?.plans)
    }
}

/// File stem for a user id. Bytes outside `[A-Za-z0-9_-]` are
/// percent-encoded, so distinct ids never share a file and none can escape
/// the plans directory. The empty id becomes a bare `%`, which no
/// encoded id can produce.
fn encode_user(user: &str) -> String {
    if user.is_empty() {
        return "%".to_string();
    }
    let mut stem = String::with_capacity(user.len());
    for byte in user.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::workout::{ExerciseRecord, Set};
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn push_day() -> PlanTemplate {
        PlanTemplate::new(
            "Push",
            vec![ExerciseRecord::new("Bench Press", vec![Set::new(8, 60.0)])],
        )
    }

    #[test]
    fn test_save_then_load_plan() {
        let (_dir, store) = make_test_store();
        store.save_plan("alice", "monday", &push_day()).unwrap();
        assert_eq!(store.load_plan("alice", "monday").unwrap(), Some(push_day()));
        assert_eq!(store.load_plan("alice", "tuesday").unwrap(), None);
    }

    #[test]
    fn test_save_overwrites_only_that_day() {
        let (_dir, store) = make_test_store();
        store.save_plan("alice", "monday", &push_day()).unwrap();
        store.save_plan("alice", "tuesday", &PlanTemplate::rest()).unwrap();
        store.save_plan("alice", "monday", &PlanTemplate::rest()).unwrap();

        let all = store.load_all("alice").unwrap();
        assert_eq!(all.len(), 2);
        assert!(all["monday"].is_rest());
    }

    #[test]
    fn test_missing_user_loads_empty() {
        let (_dir, store) = make_test_store();
        assert!(store.load_all("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path("alice"), "{ not json").unwrap();
        assert!(store.load_all("alice").unwrap().is_empty());

        // The next write replaces the corrupt document.
        store.save_plan("alice", "monday", &push_day()).unwrap();
        assert_eq!(store.load_all("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_stale_schema_reads_as_empty() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path("alice"),
            r#"{"schema_version": 99, "plans": {"monday": {"type": "Rest"}}}"#,
        )
        .unwrap();
        assert!(store.load_all("alice").unwrap().is_empty());
    }

    #[test]
    fn test_no_tmp_files_left_after_save() {
        let (_dir, store) = make_test_store();
        store.save_plan("alice", "monday", &push_day()).unwrap();
        let leftovers: Vec<_> = fs::read_dir(store.base_dir().join("plans"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_user_ids_encode_to_safe_distinct_stems() {
        assert_eq!(encode_user("user-1_a"), "user-1_a");
        assert_eq!(encode_user("../etc/passwd"), "%2E%2E%2Fetc%2Fpasswd");
        assert_eq!(encode_user("a.b"), "a%2Eb");
        assert_eq!(encode_user("a%2Eb"), "a%252Eb");
        assert_eq!(encode_user("jö"), "j%C3%B6");
        assert_eq!(encode_user(""), "%");
        assert_ne!(encode_user("a.b"), encode_user("a_b"));
    }

    #[test]
    fn test_similar_user_ids_keep_separate_plans() {
        let (_dir, store) = make_test_store();
        store
            .save_plan("a.b", "monday", &PlanTemplate::rest())
            .unwrap();
        assert!(store.load_plan("a_b", "monday").unwrap().is_none());
        assert!(store.load_plan("a.b", "monday").unwrap().is_some());
    }

    #[test]
    fn test_seed_defaults_persists_week() {
        let (_dir, store) = make_test_store();
        let seeded = store.seed_defaults("bob").unwrap();
        assert_eq!(seeded.len(), 7);
        assert_eq!(store.load_all("bob").unwrap(), seeded);
    }
}
