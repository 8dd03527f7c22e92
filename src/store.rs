// Record store mirrored to a single key-value slot

use crate::kv::PersistentKv;
use crate::record::Record;
use tracing::{debug, info, warn};

/// Ordered in-memory records, rewritten in full to persistent storage on every mutation
///
/// Persistence is optimistic: a failed write is logged and the in-memory
/// sequence is kept as is. The next successful write brings storage back in
/// line, and [`is_synced`](Self::is_synced) reports which side of that the store is on.
pub struct RecordStore<T: Record, K: PersistentKv> {
    kv: K,
    records: Vec<T>,
    synced: bool,
}

impl<T: Record, K: PersistentKv> RecordStore<T, K> {
    /// Create an empty store over `kv` without reading it
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            records: Vec::new(),
            synced: true,
        }
    }

    /// Create a store and hydrate it from `kv`
    pub fn open(kv: K) -> Self {
        let mut store = Self::new(kv);
        store.load();
        store
    }

    /// Read the persisted collection into memory
    ///
    /// An absent slot loads as empty. A slot that cannot be read or parsed is
    /// logged and leaves the in-memory records untouched.
    pub fn load(&mut self) -> &[T] {
        let key = T::storage_key();

        match self.kv.get(key) {
            Ok(None) => {
                debug!(key, "No persisted records, starting empty");
                self.records.clear();
                self.synced = true;
            }
            Ok(Some(blob)) => match serde_json::from_str::<Vec<T>>(&blob) {
                Ok(records) => {
                    info!(key, count = records.len(), "Loaded persisted records");
                    self.records = records;
                    self.synced = true;
                }
                Err(e) => {
                    warn!(key, error = ?e, "Failed to parse persisted records, keeping in-memory state");
                }
            },
            Err(e) => {
                warn!(key, error = ?e, "Failed to read persisted records, keeping in-memory state");
            }
        }

        &self.records
    }

    /// Overwrite the persisted slot with the full in-memory sequence
    pub fn persist(&mut self) {
        let key = T::storage_key();

        let blob = match serde_json::to_string(&self.records) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(key, error = ?e, "Failed to serialize records");
                self.synced = false;
                return;
            }
        };

        match self.kv.set(key, &blob) {
            Ok(()) => {
                debug!(key, count = self.records.len(), "Persisted records");
                self.synced = true;
            }
            Err(e) => {
                warn!(key, error = ?e, "Failed to persist records");
                self.synced = false;
            }
        }
    }

    /// Append a record
    pub fn add(&mut self, record: T) -> &[T] {
        debug!(id = record.id(), "add: called");
        self.records.push(record);
        self.persist();
        &self.records
    }

    /// Replace the record with `id` by one built from `fields`, keeping its position
    ///
    /// Unknown ids leave the sequence unchanged.
    pub fn update(&mut self, id: &str, fields: T::Fields) -> &[T] {
        match self.records.iter().position(|r| r.id() == id) {
            Some(pos) => {
                debug!(id, pos, "update: replacing record");
                self.records[pos] = T::from_fields(id.to_string(), fields);
            }
            None => debug!(id, "update: no matching record"),
        }
        self.persist();
        &self.records
    }

    /// Remove the record with `id`, if any
    pub fn remove(&mut self, id: &str) -> &[T] {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        debug!(id, removed = before - self.records.len(), "remove: called");
        self.persist();
        &self.records
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the last load or persist left storage equal to memory
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Drop the in-memory state and hand back the storage
    pub fn into_kv(self) -> K {
        self.kv
    }
}

// Helper function for timestamps
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryKv, SqliteKv};
    use crate::record::{Student, StudentForm};
    use eyre::{Result, eyre};
    use tempfile::TempDir;

    fn student(id: &str, first_name: &str) -> Student {
        Student {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: String::new(),
            email: format!("{}@x.com", first_name.to_lowercase()),
            age: "10".to_string(),
            grade: "5".to_string(),
        }
    }

    fn ids(records: &[Student]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    /// Storage whose writes always fail, and whose reads fail when `fail_reads` is set
    struct FailingKv {
        value: Option<String>,
        fail_reads: bool,
    }

    impl PersistentKv for FailingKv {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            if self.fail_reads {
                return Err(eyre!("storage unavailable"));
            }
            Ok(self.value.clone())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(eyre!("disk full"))
        }
    }

    #[test]
    fn test_load_absent_slot_is_empty() {
        let mut store: RecordStore<Student, _> = RecordStore::new(MemoryKv::new());
        assert!(store.load().is_empty());
        assert!(store.is_synced());
    }

    #[test]
    fn test_add_appends_in_order_and_persists() {
        let mut store = RecordStore::new(MemoryKv::new());
        store.add(student("1", "Ann"));
        let records = store.add(student("2", "Bo"));
        assert_eq!(ids(records), vec!["1", "2"]);

        let blob = store.kv().get("students").unwrap().unwrap();
        let persisted: Vec<Student> = serde_json::from_str(&blob).unwrap();
        assert_eq!(persisted, store.records());
    }

    #[test]
    fn test_update_keeps_position_and_id() {
        let mut store = RecordStore::new(MemoryKv::new());
        store.add(student("1", "Ann"));
        store.add(student("2", "Bo"));
        store.add(student("3", "Cy"));

        let mut form = store.get("2").unwrap().form();
        form.grade = "6".to_string();
        let records = store.update("2", form);

        assert_eq!(ids(records), vec!["1", "2", "3"]);
        assert_eq!(records[1].grade, "6");
        assert_eq!(records[1].first_name, "Bo");
        assert_eq!(records[0].grade, "5");
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = RecordStore::new(MemoryKv::new());
        store.add(student("1", "Ann"));

        let records = store.update("missing", StudentForm::default());
        assert_eq!(records, &[student("1", "Ann")][..]);
    }

    #[test]
    fn test_remove_then_reload_drops_id() {
        let mut store = RecordStore::new(MemoryKv::new());
        store.add(student("1", "Ann"));
        store.add(student("2", "Bo"));
        store.remove("1");
        assert_eq!(ids(store.records()), vec!["2"]);

        // Simulated restart
        let mut reopened: RecordStore<Student, _> = RecordStore::new(store.into_kv());
        let records = reopened.load();
        assert_eq!(ids(records), vec!["2"]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut store = RecordStore::new(MemoryKv::new());
        store.add(student("1", "Ann"));
        assert_eq!(store.remove("nope").len(), 1);
    }

    #[test]
    fn test_persist_load_round_trip_sqlite() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("rollbook.db");

        let written = vec![student("1", "Ann"), student("2", "Bo"), student("3", "Cy")];
        {
            let mut store = RecordStore::new(SqliteKv::open(&db_path).unwrap());
            for record in written.clone() {
                store.add(record);
            }
            store.persist();
            assert!(store.is_synced());
        }

        let store: RecordStore<Student, _> = RecordStore::open(SqliteKv::open(&db_path).unwrap());
        assert_eq!(store.records(), written.as_slice());
    }

    #[test]
    fn test_load_malformed_keeps_previous_state() {
        let mut store = RecordStore::new(MemoryKv::new());
        store.add(student("1", "Ann"));

        let mut store: RecordStore<Student, _> =
            RecordStore { kv: MemoryKv::new().with_value("students", "{not json"), ..store };
        let records = store.load();
        assert_eq!(ids(records), vec!["1"]);
    }

    #[test]
    fn test_load_read_error_keeps_previous_state() {
        let mut store = RecordStore::new(FailingKv {
            value: None,
            fail_reads: false,
        });
        store.add(student("1", "Ann"));
        store.add(student("2", "Bo"));

        let mut store = RecordStore {
            kv: FailingKv {
                value: None,
                fail_reads: true,
            },
            ..store
        };
        let records = store.load();
        assert_eq!(ids(records), vec!["1", "2"]);
    }

    #[test]
    fn test_open_malformed_starts_empty() {
        let kv = MemoryKv::new().with_value("students", "[{\"id\":1}]");
        let store: RecordStore<Student, _> = RecordStore::open(kv);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_persist_keeps_memory_and_reports_unsynced() {
        let mut store = RecordStore::open(FailingKv {
            value: None,
            fail_reads: false,
        });
        let records = store.add(student("1", "Ann"));
        assert_eq!(ids(records), vec!["1"]);
        assert!(!store.is_synced());

        store.remove("1");
        assert!(store.is_empty());
        assert!(!store.is_synced());
    }

    #[test]
    fn test_now_ms_is_positive() {
        assert!(now_ms() > 1_600_000_000_000);
    }
}
