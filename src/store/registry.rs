//! Monster Registry
//! Mission: Keyed bestiary (name -> type, weakness) persisted as a JSON object
//!
//! Entries keep insertion order on disk and in search results.

use super::{DocumentStore, StoreError};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    #[serde(rename = "type")]
    pub kind: String,
    pub weakness: String,
}

/// Insertion-ordered name -> monster mapping.
///
/// Lookups are linear; the registry is a hand-curated list, not a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bestiary {
    entries: Vec<(String, Monster)>,
}

impl Bestiary {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Monster> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Monster)> {
        self.entries.iter().map(|(n, m)| (n.as_str(), m))
    }

    /// Insert only if `name` is new. Returns false on an existing key.
    pub fn insert_new(&mut self, name: &str, monster: Monster) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name.to_string(), monster));
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Monster> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Case-insensitive substring match on weakness, as `(name, type)` pairs.
    pub fn search_by_weakness(&self, query: &str) -> Vec<(String, String)> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|(_, m)| m.weakness.to_lowercase().contains(&needle))
            .map(|(n, m)| (n.clone(), m.kind.clone()))
            .collect()
    }
}

impl Serialize for Bestiary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, monster) in &self.entries {
            map.serialize_entry(name, monster)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Bestiary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BestiaryVisitor;

        impl<'de> Visitor<'de> for BestiaryVisitor {
            type Value = Bestiary;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of monster name to {type, weakness}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Bestiary, A::Error> {
                let mut bestiary = Bestiary::default();
                while let Some((name, monster)) = access.next_entry::<String, Monster>()? {
                    // Repeated keys: first position, last value
                    match bestiary.position(&name) {
                        Some(i) => bestiary.entries[i].1 = monster,
                        None => bestiary.entries.push((name, monster)),
                    }
                }
                Ok(bestiary)
            }
        }

        deserializer.deserialize_map(BestiaryVisitor)
    }
}

/// Registry file handle.
#[derive(Clone)]
pub struct RegistryCollection {
    store: DocumentStore<Bestiary>,
}

impl RegistryCollection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: DocumentStore::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Add a monster. An existing name is reported as `DuplicateKey` and
    /// the stored entry is left as it was. Names are trimmed before use.
    pub fn add(&self, name: &str, kind: &str, weakness: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "monster name must not be blank".to_string(),
            ));
        }

        let monster = Monster {
            kind: kind.to_string(),
            weakness: weakness.to_string(),
        };

        let total = self.store.update(|bestiary| {
            if !bestiary.insert_new(name, monster) {
                return Err(StoreError::DuplicateKey(name.to_string()));
            }
            Ok(bestiary.len())
        })?;

        info!(monster = name, total, "➕ Monster added");
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<Monster, StoreError> {
        let name = name.trim();
        let removed = self.store.update(|bestiary| {
            bestiary
                .remove(name)
                .ok_or_else(|| StoreError::NotFound(name.to_string()))
        })?;

        info!(monster = name, "🗑️  Monster removed");
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> Result<Option<Monster>, StoreError> {
        Ok(self.store.load()?.get(name.trim()).cloned())
    }

    pub fn search_by_weakness(&self, query: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.store.load()?.search_by_weakness(query))
    }

    pub fn list_all(&self) -> Result<Bestiary, StoreError> {
        self.store.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_registry() -> (RegistryCollection, TempDir) {
        let dir = TempDir::new().unwrap();
        let registry = RegistryCollection::new(dir.path().join("bestiary.json"));
        (registry, dir)
    }

    #[test]
    fn test_add_and_get() {
        let (registry, _dir) = create_test_registry();

        registry.add("Drowner", "beast", "Igni").unwrap();

        let drowner = registry.get("Drowner").unwrap().unwrap();
        assert_eq!(drowner.kind, "beast");
        assert_eq!(drowner.weakness, "Igni");
        assert!(registry.get("Leshen").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_add_does_not_overwrite() {
        let (registry, _dir) = create_test_registry();
        registry.add("Drowner", "beast", "Igni").unwrap();
        let before = fs::read(registry.path()).unwrap();

        let err = registry.add("Drowner", "necrophage", "Silver").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref n) if n == "Drowner"));

        let drowner = registry.get("Drowner").unwrap().unwrap();
        assert_eq!(drowner.kind, "beast");
        assert_eq!(drowner.weakness, "Igni");
        assert_eq!(fs::read(registry.path()).unwrap(), before);
    }

    #[test]
    fn test_names_are_trimmed() {
        let (registry, _dir) = create_test_registry();
        registry.add(" Drowner ", "beast", "Igni").unwrap();

        let err = registry.add("Drowner", "necrophage", "Silver").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref n) if n == "Drowner"));
        assert!(matches!(
            registry.add("  ", "beast", "Igni"),
            Err(StoreError::Validation(_))
        ));

        let bestiary = registry.list_all().unwrap();
        assert_eq!(bestiary.len(), 1);
        assert!(bestiary.contains("Drowner"));
        assert!(registry.get("  Drowner").unwrap().is_some());

        registry.remove("Drowner\t").unwrap();
        assert!(registry.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_bestiary_file_round_trip_is_byte_stable() {
        let (registry, _dir) = create_test_registry();
        registry.add("Утопец", "трупоед", "Игни").unwrap();
        registry.add("Ghoul", "necrophage", "Silver").unwrap();
        let original = fs::read(registry.path()).unwrap();

        let store: DocumentStore<Bestiary> = DocumentStore::new(registry.path());
        store.save(&store.load().unwrap()).unwrap();

        assert_eq!(fs::read(registry.path()).unwrap(), original);
    }

    #[test]
    fn test_remove_unknown_leaves_file_unchanged() {
        let (registry, _dir) = create_test_registry();
        registry.add("Ghoul", "necrophage", "Silver").unwrap();
        let before = fs::read(registry.path()).unwrap();

        let err = registry.remove("Kikimore").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(fs::read(registry.path()).unwrap(), before);
    }

    #[test]
    fn test_remove_on_missing_file_does_not_create_it() {
        let (registry, _dir) = create_test_registry();

        assert!(registry.remove("Ghoul").is_err());
        assert!(!registry.path().exists());
    }

    #[test]
    fn test_remove_existing() {
        let (registry, _dir) = create_test_registry();
        registry.add("Ghoul", "necrophage", "Silver").unwrap();
        registry.add("Wraith", "specter", "Moon Dust").unwrap();

        let removed = registry.remove("Ghoul").unwrap();
        assert_eq!(removed.kind, "necrophage");

        let remaining = registry.list_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining.contains("Wraith"));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let (registry, _dir) = create_test_registry();
        registry.add("Drowner", "beast", "Igni").unwrap();

        assert_eq!(
            registry.search_by_weakness("ign").unwrap(),
            vec![("Drowner".to_string(), "beast".to_string())]
        );
        assert!(registry.search_by_weakness("quen").unwrap().is_empty());
    }

    #[test]
    fn test_search_keeps_insertion_order_and_unicode_case() {
        let (registry, _dir) = create_test_registry();
        registry.add("Утопец", "трупоед", "Игни, серебро").unwrap();
        registry.add("Гуль", "трупоед", "Серебро").unwrap();
        registry.add("Леший", "реликт", "Огонь").unwrap();

        let hits = registry.search_by_weakness("СЕРЕБРО").unwrap();
        let names: Vec<_> = hits.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Утопец", "Гуль"]);
    }

    #[test]
    fn test_file_is_name_keyed_object_in_insertion_order() {
        let (registry, _dir) = create_test_registry();
        registry.add("Zeugl", "ogroid", "Dimeritium").unwrap();
        registry.add("Arachas", "insectoid", "Igni").unwrap();

        let raw = fs::read_to_string(registry.path()).unwrap();
        assert!(raw.find("Zeugl").unwrap() < raw.find("Arachas").unwrap());

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["Arachas"]["type"], "insectoid");
        assert_eq!(value["Zeugl"]["weakness"], "Dimeritium");
    }

    #[test]
    fn test_duplicate_keys_in_file_keep_first_position() {
        let raw = r#"{"A": {"type": "x", "weakness": "1"}, "B": {"type": "y", "weakness": "2"}, "A": {"type": "z", "weakness": "3"}}"#;
        let bestiary: Bestiary = serde_json::from_str(raw).unwrap();

        let names: Vec<_> = bestiary.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(bestiary.get("A").unwrap().kind, "z");
    }

    #[test]
    fn test_corrupt_registry_is_not_treated_as_empty() {
        let (registry, _dir) = create_test_registry();
        fs::write(registry.path(), r#"["not", "a", "map"]"#).unwrap();

        assert!(matches!(
            registry.add("Ghoul", "necrophage", "Silver"),
            Err(StoreError::CorruptStore { .. })
        ));
        assert_eq!(
            fs::read_to_string(registry.path()).unwrap(),
            r#"["not", "a", "map"]"#
        );
    }
}
