//! The shared table / cross-section store and its disk persistence.

use super::types::CacheError;
use crate::data::{parse_xsc, Column, CrossSection, CrossSectionMeta, Table, TableHeader};
use dashmap::DashMap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Process-wide store of line tables and cross-sections.
///
/// Entries are kept behind `Arc` so readers hold a consistent snapshot of a
/// table while a newer version replaces it in the map. Every `put` also
/// writes the backing artifacts under the data directory:
/// `{name}.header` (JSON header), `{name}.data` (JSON columns) for tables,
/// and the raw `{name}` text file for cross-sections.
pub struct DataCache {
    data_dir: PathBuf,
    tables: DashMap<String, Arc<Table>>,
    cross_sections: DashMap<String, Arc<CrossSection>>,
    /// Per-name write locks; writes to the same name never interleave.
    write_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DataCache {
    /// Creates a cache over the given data directory, creating it if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .map_err(|e| CacheError::io(&data_dir.to_string_lossy(), e))?;
        Ok(Self {
            data_dir,
            tables: DashMap::new(),
            cross_sections: DashMap::new(),
            write_locks: DashMap::new(),
        })
    }

    /// The directory backing this cache.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn write_lock(&self, name: &str) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn header_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.header", name))
    }

    fn data_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.data", name))
    }

    /// Looks up a table. No side effects.
    pub fn get_table(&self, name: &str) -> Option<Arc<Table>> {
        self.tables.get(name).map(|entry| entry.value().clone())
    }

    /// Inserts a table, silently overwriting any previous entry, and
    /// durably writes its header/data artifacts.
    ///
    /// A disk failure is reported to the caller; the in-memory entry is not
    /// inserted in that case, and any partial write is left in place.
    pub fn put_table(&self, table: Table) -> Result<(), CacheError> {
        let name = table.name.clone();
        let lock = self.write_lock(&name);
        let _guard = lock.lock().unwrap();

        let header = serde_json::to_string(&table.header)
            .map_err(|e| CacheError::Corrupt {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let data = serde_json::to_string(&table.data).map_err(|e| CacheError::Corrupt {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        fs::write(self.header_path(&name), header).map_err(|e| CacheError::io(&name, e))?;
        fs::write(self.data_path(&name), data).map_err(|e| CacheError::io(&name, e))?;

        debug!(table = %name, rows = table.rows(), "table cached");
        self.tables.insert(name, Arc::new(table));
        Ok(())
    }

    /// Removes a table from the store. The on-disk artifacts stay behind
    /// and will be picked up again by [`DataCache::warm_start`].
    pub fn remove_table(&self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }

    /// All known names: the union of table and cross-section names as of
    /// this call. Under concurrent mutation this is not a snapshot.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.extend(self.cross_sections.iter().map(|e| e.key().clone()));
        names
    }

    /// Adds a cross-section to the store, replacing any prior entry.
    ///
    /// With `content`, the bytes are decoded as UTF-8 and persisted to the
    /// name-derived file first; without, the existing file is read. Either
    /// way the text is parsed and the result inserted. I/O and parse
    /// failures are returned as values; a file written before a parse
    /// failure is not rolled back.
    pub fn add_cross_section(
        &self,
        name: &str,
        content: Option<&[u8]>,
    ) -> Result<(), CacheError> {
        let lock = self.write_lock(name);
        let _guard = lock.lock().unwrap();

        let path = self.data_dir.join(name);
        let text = match content {
            Some(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| CacheError::Utf8 {
                        name: name.to_string(),
                    })?
                    .to_string();
                fs::write(&path, &text).map_err(|e| CacheError::io(name, e))?;
                text
            }
            None => fs::read_to_string(&path).map_err(|e| CacheError::io(name, e))?,
        };

        let xsc = parse_xsc(name, &text)?;
        debug!(xsc = %name, points = xsc.len, "cross-section cached");
        self.cross_sections.insert(name.to_string(), Arc::new(xsc));
        Ok(())
    }

    /// Looks up a cross-section. No side effects.
    pub fn get_cross_section(&self, name: &str) -> Option<Arc<CrossSection>> {
        self.cross_sections
            .get(name)
            .map(|entry| entry.value().clone())
    }

    /// Wavenumber bounds and length of a cached cross-section.
    pub fn cross_section_meta(&self, name: &str) -> Option<CrossSectionMeta> {
        self.get_cross_section(name).map(|xsc| xsc.meta())
    }

    /// Loads every table and cross-section found in the data directory.
    ///
    /// Entries that fail to load are logged and skipped; the scan itself
    /// only fails if the directory cannot be read. Returns the names that
    /// were loaded.
    pub fn warm_start(&self) -> Result<Vec<String>, CacheError> {
        let entries = fs::read_dir(&self.data_dir)
            .map_err(|e| CacheError::io(&self.data_dir.to_string_lossy(), e))?;

        let mut loaded = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(name) = file_name.strip_suffix(".header") {
                match self.load_table_files(name) {
                    Ok(table) => {
                        self.tables.insert(name.to_string(), Arc::new(table));
                        loaded.push(name.to_string());
                    }
                    Err(e) => warn!(table = name, error = %e, "skipping unreadable table"),
                }
            } else if file_name.ends_with(".xsc") {
                match self.add_cross_section(&file_name, None) {
                    Ok(()) => loaded.push(file_name),
                    Err(e) => {
                        warn!(xsc = %file_name, error = %e, "skipping unreadable cross-section")
                    }
                }
            }
        }

        info!(count = loaded.len(), dir = %self.data_dir.display(), "cache warmed");
        Ok(loaded)
    }

    fn load_table_files(&self, name: &str) -> Result<Table, CacheError> {
        let header_text =
            fs::read_to_string(self.header_path(name)).map_err(|e| CacheError::io(name, e))?;
        let data_text =
            fs::read_to_string(self.data_path(name)).map_err(|e| CacheError::io(name, e))?;

        let header: TableHeader =
            serde_json::from_str(&header_text).map_err(|e| CacheError::Corrupt {
                name: name.to_string(),
                reason: format!("header: {}", e),
            })?;
        let data: HashMap<String, Column> =
            serde_json::from_str(&data_text).map_err(|e| CacheError::Corrupt {
                name: name.to_string(),
                reason: format!("data: {}", e),
            })?;

        for (column, values) in &data {
            if values.len() != header.number_of_rows {
                return Err(CacheError::Corrupt {
                    name: name.to_string(),
                    reason: format!(
                        "column '{}' has {} rows, header says {}",
                        column,
                        values.len(),
                        header.number_of_rows
                    ),
                });
            }
        }

        Ok(Table {
            name: name.to_string(),
            header,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const XSC_TEXT: &str = "O3 600.0 700.0 3 296.0 760.0\n1.0e-21 2.0e-21 3.0e-21\n";

    fn cache() -> (TempDir, DataCache) {
        let dir = TempDir::new().unwrap();
        let cache = DataCache::new(dir.path()).unwrap();
        (dir, cache)
    }

    fn small_table(name: &str) -> Table {
        Table::new(
            name,
            vec![
                ("nu".to_string(), Column::Float(vec![640.0, 641.5])),
                ("sw".to_string(), Column::Float(vec![1e-20, 3e-21])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_put_then_get_table() {
        let (_dir, cache) = cache();
        cache.put_table(small_table("co2")).unwrap();
        let got = cache.get_table("co2").unwrap();
        assert_eq!(got.rows(), 2);
        assert!(cache.get_table("h2o").is_none());
    }

    #[test]
    fn test_put_table_writes_artifacts() {
        let (dir, cache) = cache();
        cache.put_table(small_table("co2")).unwrap();
        assert!(dir.path().join("co2.header").exists());
        assert!(dir.path().join("co2.data").exists());
    }

    #[test]
    fn test_put_overwrites_silently() {
        let (_dir, cache) = cache();
        cache.put_table(small_table("co2")).unwrap();
        let mut replacement = small_table("co2");
        replacement.data.insert(
            "nu".to_string(),
            Column::Float(vec![100.0, 200.0]),
        );
        cache.put_table(replacement).unwrap();
        let got = cache.get_table("co2").unwrap();
        assert_eq!(got.float_column("nu").unwrap(), &[100.0, 200.0]);
        assert_eq!(cache.table_names().len(), 1);
    }

    #[test]
    fn test_cross_section_round_trip() {
        let (_dir, cache) = cache();
        cache
            .add_cross_section("foo.xsc", Some(XSC_TEXT.as_bytes()))
            .unwrap();
        assert!(cache.table_names().contains(&"foo.xsc".to_string()));

        // Re-adding replaces rather than duplicates.
        cache
            .add_cross_section("foo.xsc", Some(XSC_TEXT.as_bytes()))
            .unwrap();
        let names: Vec<_> = cache
            .table_names()
            .into_iter()
            .filter(|n| n == "foo.xsc")
            .collect();
        assert_eq!(names.len(), 1);

        let meta = cache.cross_section_meta("foo.xsc").unwrap();
        assert_eq!(meta.numin, 600.0);
        assert_eq!(meta.numax, 700.0);
        assert_eq!(meta.length, 3);
    }

    #[test]
    fn test_add_cross_section_from_existing_file() {
        let (dir, cache) = cache();
        fs::write(dir.path().join("disk.xsc"), XSC_TEXT).unwrap();
        cache.add_cross_section("disk.xsc", None).unwrap();
        assert!(cache.get_cross_section("disk.xsc").is_some());
    }

    #[test]
    fn test_add_cross_section_missing_file_fails() {
        let (_dir, cache) = cache();
        assert!(cache.add_cross_section("nope.xsc", None).is_err());
    }

    #[test]
    fn test_add_cross_section_rejects_bad_utf8() {
        let (_dir, cache) = cache();
        let err = cache
            .add_cross_section("bin.xsc", Some(&[0xff, 0xfe, 0x00]))
            .unwrap_err();
        assert!(matches!(err, CacheError::Utf8 { .. }));
    }

    #[test]
    fn test_table_names_union() {
        let (_dir, cache) = cache();
        cache.put_table(small_table("co2")).unwrap();
        cache
            .add_cross_section("foo.xsc", Some(XSC_TEXT.as_bytes()))
            .unwrap();
        let mut names = cache.table_names();
        names.sort();
        assert_eq!(names, vec!["co2", "foo.xsc"]);
    }

    #[test]
    fn test_remove_table() {
        let (_dir, cache) = cache();
        cache.put_table(small_table("co2")).unwrap();
        assert!(cache.remove_table("co2"));
        assert!(!cache.remove_table("co2"));
        assert!(cache.get_table("co2").is_none());
    }

    #[test]
    fn test_warm_start_reloads_everything() {
        let dir = TempDir::new().unwrap();
        {
            let cache = DataCache::new(dir.path()).unwrap();
            cache.put_table(small_table("co2")).unwrap();
            cache
                .add_cross_section("foo.xsc", Some(XSC_TEXT.as_bytes()))
                .unwrap();
        }

        let fresh = DataCache::new(dir.path()).unwrap();
        assert!(fresh.table_names().is_empty());
        let mut loaded = fresh.warm_start().unwrap();
        loaded.sort();
        assert_eq!(loaded, vec!["co2", "foo.xsc"]);
        assert_eq!(fresh.get_table("co2").unwrap().rows(), 2);
        assert!(fresh.get_cross_section("foo.xsc").is_some());
    }

    #[test]
    fn test_warm_start_skips_corrupt_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.header"), "not json").unwrap();
        fs::write(dir.path().join("bad.data"), "{}").unwrap();
        let cache = DataCache::new(dir.path()).unwrap();
        let loaded = cache.warm_start().unwrap();
        assert!(loaded.is_empty());
        assert!(cache.get_table("bad").is_none());
    }
}
