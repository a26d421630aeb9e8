//! redb-backed registry store.

use crate::error::RollcallError;
use crate::registry::{IdCounters, Registry, RegistrySnapshot};
use crate::settings::UserSettings;
use crate::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

type RecordTable = TableDefinition<'static, u64, &'static [u8]>;
type NamedTable = TableDefinition<'static, &'static str, &'static [u8]>;

const COURSES: RecordTable = TableDefinition::new("courses");
const STUDENTS: RecordTable = TableDefinition::new("students");
const STAFF: RecordTable = TableDefinition::new("staff");
const MODULES: RecordTable = TableDefinition::new("modules");
const LECTURES: RecordTable = TableDefinition::new("lectures");
const ATTENDANCES: RecordTable = TableDefinition::new("attendances");
const FEEDBACK: RecordTable = TableDefinition::new("feedback");

const ADMINS: NamedTable = TableDefinition::new("admins");
const SETTINGS: NamedTable = TableDefinition::new("settings");
const META: NamedTable = TableDefinition::new("meta");

const RECORD_TABLES: [RecordTable; 7] =
    [COURSES, STUDENTS, STAFF, MODULES, LECTURES, ATTENDANCES, FEEDBACK];
const NAMED_TABLES: [NamedTable; 3] = [ADMINS, SETTINGS, META];

const COUNTERS_KEY: &str = "counters";
const SCHEMA_KEY: &str = "schema";
const SCHEMA_VERSION: u8 = 1;

/// Registry stored in a redb database file.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open the database, creating the file and every table if missing.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        for def in RECORD_TABLES {
            txn.open_table(def)?;
        }
        for def in NAMED_TABLES {
            txn.open_table(def)?;
        }
        {
            let mut meta = txn.open_table(META)?;
            if meta.get(SCHEMA_KEY)?.is_none() {
                meta.insert(SCHEMA_KEY, [SCHEMA_VERSION].as_slice())?;
            }
        }
        txn.commit()?;
        Ok(Self { db })
    }

    /// Replace the stored registry with `registry`.
    pub fn save(&self, registry: &Registry) -> Result<()> {
        let snapshot = registry.snapshot();
        let txn = self.db.begin_write()?;

        for def in RECORD_TABLES {
            txn.delete_table(def)?;
        }
        txn.delete_table(ADMINS)?;
        txn.delete_table(SETTINGS)?;

        write_records(&txn, COURSES, snapshot.courses.iter().map(|r| (r.id.0, r)))?;
        write_records(&txn, STUDENTS, snapshot.students.iter().map(|r| (r.id.0, r)))?;
        write_records(&txn, STAFF, snapshot.staff.iter().map(|r| (r.id.0, r)))?;
        write_records(&txn, MODULES, snapshot.modules.iter().map(|r| (r.id.0, r)))?;
        write_records(&txn, LECTURES, snapshot.lectures.iter().map(|r| (r.id.0, r)))?;
        write_records(
            &txn,
            ATTENDANCES,
            snapshot.attendances.iter().map(|r| (r.id.0, r)),
        )?;
        write_records(&txn, FEEDBACK, snapshot.feedback.iter().map(|r| (r.id.0, r)))?;

        write_named(
            &txn,
            ADMINS,
            snapshot.admins.iter().map(|a| (a.username.as_str(), a)),
        )?;
        write_named(
            &txn,
            SETTINGS,
            snapshot.settings.iter().map(|(name, s)| (name.as_str(), s)),
        )?;
        write_named(&txn, META, [(COUNTERS_KEY, &snapshot.counters)])?;

        txn.commit()?;
        Ok(())
    }

    /// Rebuild the registry from the stored tables.
    pub fn load(&self) -> Result<Registry> {
        let txn = self.db.begin_read()?;

        let read_records = |def: RecordTable| -> Result<Vec<Vec<u8>>> {
            let table = txn.open_table(def)?;
            let mut values = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                values.push(value.value().to_vec());
            }
            Ok(values)
        };
        let read_named = |def: NamedTable| -> Result<Vec<(String, Vec<u8>)>> {
            let table = txn.open_table(def)?;
            let mut values = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                values.push((key.value().to_string(), value.value().to_vec()));
            }
            Ok(values)
        };

        let counters: IdCounters = match read_named(META)?
            .into_iter()
            .find(|(key, _)| key == COUNTERS_KEY)
        {
            Some((_, bytes)) => decode(&bytes)?,
            None => IdCounters::default(),
        };

        let snapshot = RegistrySnapshot {
            courses: decode_all(read_records(COURSES)?)?,
            students: decode_all(read_records(STUDENTS)?)?,
            staff: decode_all(read_records(STAFF)?)?,
            admins: decode_all(read_named(ADMINS)?.into_iter().map(|(_, v)| v).collect())?,
            modules: decode_all(read_records(MODULES)?)?,
            lectures: decode_all(read_records(LECTURES)?)?,
            attendances: decode_all(read_records(ATTENDANCES)?)?,
            feedback: decode_all(read_records(FEEDBACK)?)?,
            settings: read_named(SETTINGS)?
                .into_iter()
                .map(|(name, bytes)| -> Result<(String, UserSettings)> {
                    Ok((name, decode(&bytes)?))
                })
                .collect::<Result<_>>()?,
            counters,
        };

        Ok(Registry::from_snapshot(snapshot))
    }
}

fn write_records<'r, T, I>(txn: &WriteTransaction, def: RecordTable, records: I) -> Result<()>
where
    T: Serialize + 'r,
    I: IntoIterator<Item = (u64, &'r T)>,
{
    let mut table = txn.open_table(def)?;
    for (id, record) in records {
        let bytes = postcard::to_allocvec(record)?;
        table.insert(id, bytes.as_slice())?;
    }
    Ok(())
}

fn write_named<'r, T, I>(txn: &WriteTransaction, def: NamedTable, records: I) -> Result<()>
where
    T: Serialize + 'r,
    I: IntoIterator<Item = (&'r str, &'r T)>,
{
    let mut table = txn.open_table(def)?;
    for (key, record) in records {
        let bytes = postcard::to_allocvec(record)?;
        table.insert(key, bytes.as_slice())?;
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    postcard::from_bytes(bytes).map_err(|e| RollcallError::Storage(format!("corrupt record: {e}")))
}

fn decode_all<T: DeserializeOwned>(values: Vec<Vec<u8>>) -> Result<Vec<T>> {
    values.iter().map(|bytes| decode(bytes)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::model::Person;

    fn sample() -> Registry {
        let mut registry = Registry::new();
        registry.add_admin("admin", "admin@uni.ac.uk").unwrap();
        let course = registry.add_course("Computing").unwrap();
        let module = registry.add_module("COM101", "12345").unwrap();
        let student = registry
            .add_student(Person::new("B00112233", "Ada", "L", "a@uni.ac.uk"), "10519C", course)
            .unwrap();
        registry.enrol(module, student).unwrap();
        let (lecture, _) = registry
            .lecture_for(module, "S1", chrono::NaiveDate::default())
            .unwrap();
        registry.record_attendance(student, lecture, true).unwrap();
        registry.settings_mut("admin").range_caps = [10, 20, 30];
        registry
    }

    #[test]
    fn empty_store_loads_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("empty.redb")).unwrap();
        assert_eq!(store.load().unwrap().stats(), Registry::new().stats());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.redb");
        let registry = sample();

        RedbStore::open(&path).unwrap().save(&registry).unwrap();

        // reopen to read from disk
        let loaded = RedbStore::open(&path).unwrap().load().unwrap();
        assert_eq!(loaded.snapshot(), registry.snapshot());
        assert_eq!(loaded.stats().attendances, 1);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("store.redb")).unwrap();
        store.save(&sample()).unwrap();
        store.save(&Registry::new()).unwrap();
        assert_eq!(store.load().unwrap().stats().students, 0);
    }
}
