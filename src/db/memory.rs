//! In-process storage engine with JSON file persistence.
//!
//! Every table keeps two hash indexes next to its rows, rebuilt on load:
//!
//! - one set of present tuples per unique key, so inserts check
//!   constraints without a scan;
//! - value → row postings for `id` and each declared index column, so
//!   equality filters only visit matching rows.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Database, DbError, Row, Where, as_number};

/// Columns indexed on every table.
const ALWAYS_INDEXED: &str = "id";

/// Serialized form of one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredTable {
    /// Unique keys (each a list of columns).
    #[serde(default)]
    unique: Vec<Vec<String>>,
    #[serde(default)]
    indexed: Vec<String>,
    /// Last assigned auto-increment id.
    #[serde(default)]
    last_id: u64,
    #[serde(default)]
    rows: Vec<Row>,
}

/// Hash key of a cell, equal for values that [`super::values_match`].
fn cell_key(value: Option<&Value>) -> String {
    let value = value.unwrap_or(&Value::Null);
    match as_number(value) {
        Some(n) if n == 0.0 => "#0".to_string(),
        Some(n) => format!("#{n}"),
        None => match value {
            Value::String(s) => format!("s{s}"),
            other => other.to_string(),
        },
    }
}

fn tuple(key: &[String], row: &Row) -> Vec<String> {
    key.iter().map(|column| cell_key(row.get(column))).collect()
}

/// One named table. Rows are keyed by insertion sequence.
#[derive(Debug, Default)]
struct Table {
    unique: Vec<Vec<String>>,
    indexed: Vec<String>,
    last_id: u64,
    next_slot: u64,
    rows: BTreeMap<u64, Row>,
    /// Present tuples, one set per unique key.
    taken: Vec<FxHashSet<Vec<String>>>,
    /// Column → cell key → slots.
    postings: FxHashMap<String, FxHashMap<String, BTreeSet<u64>>>,
}

impl Table {
    fn new() -> Self {
        let mut table = Self::default();
        table.add_index(ALWAYS_INDEXED);
        table
    }

    fn from_stored(stored: StoredTable) -> Self {
        let mut table = Self::new();
        for key in stored.unique {
            table.add_unique(key);
        }
        for column in &stored.indexed {
            table.add_index(column);
        }
        table.last_id = stored.last_id;
        for row in stored.rows {
            table.push(row);
        }
        table
    }

    fn to_stored(&self) -> StoredTable {
        StoredTable {
            unique: self.unique.clone(),
            indexed: self
                .indexed
                .iter()
                .filter(|c| c.as_str() != ALWAYS_INDEXED)
                .cloned()
                .collect(),
            last_id: self.last_id,
            rows: self.rows.values().cloned().collect(),
        }
    }

    fn add_unique(&mut self, key: Vec<String>) {
        if self.unique.contains(&key) {
            return;
        }
        let taken = self.rows.values().map(|row| tuple(&key, row)).collect();
        self.unique.push(key);
        self.taken.push(taken);
    }

    fn add_index(&mut self, column: &str) {
        if self.indexed.iter().any(|c| c == column) {
            return;
        }
        let mut postings: FxHashMap<String, BTreeSet<u64>> = FxHashMap::default();
        for (slot, row) in &self.rows {
            postings
                .entry(cell_key(row.get(column)))
                .or_default()
                .insert(*slot);
        }
        self.indexed.push(column.to_string());
        self.postings.insert(column.to_string(), postings);
    }

    fn violates_unique(&self, candidate: &Row) -> Option<&[String]> {
        self.unique
            .iter()
            .zip(&self.taken)
            .find(|(key, taken)| taken.contains(&tuple(key, candidate)))
            .map(|(key, _)| key.as_slice())
    }

    fn push(&mut self, row: Row) {
        let slot = self.next_slot;
        self.next_slot += 1;

        for (key, taken) in self.unique.iter().zip(&mut self.taken) {
            taken.insert(tuple(key, &row));
        }
        for (column, postings) in &mut self.postings {
            postings
                .entry(cell_key(row.get(column)))
                .or_default()
                .insert(slot);
        }
        self.rows.insert(slot, row);
    }

    fn remove(&mut self, slot: u64) {
        let Some(row) = self.rows.remove(&slot) else {
            return;
        };
        for (key, taken) in self.unique.iter().zip(&mut self.taken) {
            taken.remove(&tuple(key, &row));
        }
        for (column, postings) in &mut self.postings {
            let cell = cell_key(row.get(column));
            if let Some(slots) = postings.get_mut(&cell) {
                slots.remove(&slot);
                if slots.is_empty() {
                    postings.remove(&cell);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.taken.iter_mut().for_each(|taken| taken.clear());
        self.postings.values_mut().for_each(|postings| postings.clear());
        self.last_id = 0;
        self.next_slot = 0;
    }

    /// Slots of the rows matching `filter`, in insertion order.
    fn matching(&self, filter: &Where) -> Vec<u64> {
        let narrowed = self.indexed.iter().find_map(|column| {
            let value = filter.eq_value(column)?;
            let slots = self.postings.get(column)?.get(&cell_key(Some(value)));
            Some(slots.map(|s| s.iter().copied().collect::<Vec<_>>()).unwrap_or_default())
        });

        match narrowed {
            Some(slots) => slots
                .into_iter()
                .filter(|slot| self.rows.get(slot).is_some_and(|row| filter.matches(row)))
                .collect(),
            None => self
                .rows
                .iter()
                .filter(|(_, row)| filter.matches(row))
                .map(|(slot, _)| *slot)
                .collect(),
        }
    }
}

/// Serialized file layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    tables: BTreeMap<String, StoredTable>,
}

/// Thread-safe table storage.
///
/// Writes go to memory; [`MemoryDatabase::flush`] persists the whole
/// snapshot to the file given to [`MemoryDatabase::open`].
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<BTreeMap<String, Table>>,
    path: Option<PathBuf>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a storage file. A missing file starts an empty database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|err| DbError::Io(path.clone(), err))?;
            if content.trim().is_empty() {
                Snapshot::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Snapshot::default()
        };

        let tables = snapshot
            .tables
            .into_iter()
            .map(|(name, stored)| (name, Table::from_stored(stored)))
            .collect();
        Ok(Self {
            tables: RwLock::new(tables),
            path: Some(path),
        })
    }

    /// Write all tables to the storage file (no-op for unbacked databases).
    pub fn flush(&self) -> Result<(), DbError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot = Snapshot {
            tables: self
                .tables
                .read()
                .iter()
                .map(|(name, table)| (name.clone(), table.to_stored()))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| DbError::Io(parent.to_path_buf(), err))?;
        }
        fs::write(path, json).map_err(|err| DbError::Io(path.clone(), err))
    }

    /// Create `table` if needed and insert every row in order.
    #[cfg(test)]
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) -> Result<(), DbError> {
        self.create_table(table, &[])?;
        for row in rows {
            let Value::Object(row) = row else {
                return Err(DbError::Malformed {
                    table: table.to_string(),
                    message: "row is not an object".into(),
                });
            };
            self.insert(table, row)?;
        }
        Ok(())
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }
}

impl Database for MemoryDatabase {
    fn create_table(&self, table: &str, unique: &[&[&str]]) -> Result<(), DbError> {
        let mut tables = self.tables.write();
        let entry = tables.entry(table.to_string()).or_insert_with(Table::new);
        for key in unique {
            entry.add_unique(key.iter().map(|c| (*c).to_string()).collect());
        }
        Ok(())
    }

    fn create_index(&self, table: &str, column: &str) -> Result<(), DbError> {
        let mut tables = self.tables.write();
        tables
            .get_mut(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))?
            .add_index(column);
        Ok(())
    }

    fn insert(&self, table: &str, mut row: Row) -> Result<Row, DbError> {
        let mut tables = self.tables.write();
        let target = tables
            .get_mut(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))?;

        let explicit_id = super::column_u64(&row, "id");
        let id = explicit_id.unwrap_or(target.last_id + 1);
        row.insert("id".into(), Value::from(id));

        if let Some(key) = target.violates_unique(&row) {
            return Err(DbError::Constraint {
                table: table.to_string(),
                columns: key.join(", "),
            });
        }

        target.last_id = target.last_id.max(id);
        target.push(row.clone());
        Ok(row)
    }

    fn select(&self, table: &str, filter: &Where) -> Result<Vec<Row>, DbError> {
        let tables = self.tables.read();
        let target = tables
            .get(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))?;

        Ok(target
            .matching(filter)
            .into_iter()
            .filter_map(|slot| target.rows.get(&slot).cloned())
            .collect())
    }

    fn delete(&self, table: &str, filter: &Where) -> Result<usize, DbError> {
        let mut tables = self.tables.write();
        let target = tables
            .get_mut(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))?;

        let slots = target.matching(filter);
        for &slot in &slots {
            target.remove(slot);
        }
        Ok(slots.len())
    }

    fn truncate(&self, table: &str) -> Result<(), DbError> {
        let mut tables = self.tables.write();
        tables
            .get_mut(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))?
            .clear();
        Ok(())
    }
}
