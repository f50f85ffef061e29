//! Patches over key-value maps with nested value patches.
//!
//! A map patch delegates value-level changes to a [`Differ`] for the value
//! type, so maps of maps (or of any diffable value) are patched
//! incrementally instead of replacing whole values.

use std::fmt;
use std::marker::PhantomData;

use mutandis_core::{ApplyConfig, Differ, Edits, Iter, PatchError, PatchResult};
use tracing::{debug, trace};

use crate::snapshot::MapSnapshot;

/// Elementary edit of a [`MapPatch`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapEdit<K, V, P> {
    /// The key is newly present; the edit carries its value.
    Insert(K, V),
    /// The key is present on both sides with different values; the edit
    /// carries the value-level patch.
    Update(K, P),
    /// The key is present in the old snapshot and absent from the new.
    Remove(K),
}

impl<K, V, P> MapEdit<K, V, P> {
    /// The key this edit targets.
    pub fn key(&self) -> &K {
        match self {
            Self::Insert(key, _) | Self::Update(key, _) | Self::Remove(key) => key,
        }
    }
}

/// An immutable, composable description of changes to a map whose values
/// are patched by `P`.
#[derive(Debug, PartialEq, Eq)]
pub struct MapPatch<K, V, P> {
    edits: Edits<MapEdit<K, V, P>>,
}

impl<K, V, P> MapPatch<K, V, P> {
    /// The patch that changes nothing.
    pub const fn empty() -> Self {
        Self {
            edits: Edits::empty(),
        }
    }

    /// A patch storing `value` under `key`.
    pub fn insert(key: K, value: V) -> Self {
        Self {
            edits: Edits::edit(MapEdit::Insert(key, value)),
        }
    }

    /// A patch applying `patch` to the value under `key`.
    pub fn update(key: K, patch: P) -> Self {
        Self {
            edits: Edits::edit(MapEdit::Update(key, patch)),
        }
    }

    /// A patch removing `key`.
    pub fn remove(key: K) -> Self {
        Self {
            edits: Edits::edit(MapEdit::Remove(key)),
        }
    }

    /// Apply `self`, then `next`. Constant time.
    pub fn and_then(self, next: Self) -> Self {
        Self {
            edits: self.edits.and_then(next.edits),
        }
    }

    /// Number of elementary edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// The edits in application order.
    pub fn edits(&self) -> Iter<'_, MapEdit<K, V, P>> {
        self.edits.iter()
    }

    /// The underlying instruction tree.
    pub fn as_edits(&self) -> &Edits<MapEdit<K, V, P>> {
        &self.edits
    }
}

impl<K: Clone, V: Clone, P> MapPatch<K, V, P> {
    /// Compute the patch that turns `old` into `new`, diffing values that
    /// differ with `values`.
    ///
    /// Keys whose values are equal produce no edit. Each distinct key
    /// produces at most one edit.
    pub fn diff<M, D>(old: &M, new: &M, values: &D) -> Self
    where
        M: MapSnapshot<Key = K, Value = V>,
        D: Differ<Value = V, Patch = P>,
        V: PartialEq,
    {
        let (remainder, patch) = new.fold(
            (old.clone(), Self::empty()),
            |(mut remainder, patch), key, new_value| match remainder.remove(key) {
                Some(old_value) if old_value == *new_value => (remainder, patch),
                Some(old_value) => {
                    let value_patch = values.diff(&old_value, new_value);
                    (remainder, patch.and_then(Self::update(key.clone(), value_patch)))
                }
                None => (
                    remainder,
                    patch.and_then(Self::insert(key.clone(), new_value.clone())),
                ),
            },
        );
        let patch = remainder.fold(patch, |patch, key, _| {
            patch.and_then(Self::remove(key.clone()))
        });
        debug!(edits = patch.len(), "computed map diff");
        patch
    }

    /// Replay this patch on `old`, patching nested values with `values`.
    ///
    /// Updating or removing an absent key is a no-op; inserting over a
    /// present key overwrites it.
    pub fn apply<M, D>(&self, old: &M, values: &D) -> M
    where
        M: MapSnapshot<Key = K, Value = V>,
        D: Differ<Value = V, Patch = P>,
    {
        let mut map = old.clone();
        for edit in self.edits.iter() {
            match edit {
                MapEdit::Insert(key, value) => {
                    map.set(key.clone(), value.clone());
                }
                MapEdit::Update(key, patch) => {
                    match map.lookup(key).map(|current| values.patch(current, patch)) {
                        Some(updated) => {
                            map.set(key.clone(), updated);
                        }
                        None => trace!("map update of absent key skipped"),
                    }
                }
                MapEdit::Remove(key) => {
                    if map.remove(key).is_none() {
                        trace!("map removal of absent key skipped");
                    }
                }
            }
        }
        debug!(edits = self.len(), size = map.size(), "applied map patch");
        map
    }
}

impl<K: Clone + fmt::Debug, V: Clone, P> MapPatch<K, V, P> {
    /// Replay this patch on `old` under `config`.
    ///
    /// In strict mode, inserting a present key, updating an absent key or
    /// removing an absent key aborts with an error. Nested values are
    /// patched with `values.try_patch` under the same `config`.
    pub fn try_apply<M, D>(&self, old: &M, values: &D, config: &ApplyConfig) -> PatchResult<M>
    where
        M: MapSnapshot<Key = K, Value = V>,
        D: Differ<Value = V, Patch = P>,
    {
        config.check_len(self.len())?;
        let strict = config.is_strict();
        let mut map = old.clone();
        for edit in self.edits.iter_with_capacity(config.worklist_capacity) {
            match edit {
                MapEdit::Insert(key, value) => {
                    if map.set(key.clone(), value.clone()).is_some() && strict {
                        return Err(PatchError::insert_present(key));
                    }
                }
                MapEdit::Update(key, patch) => {
                    match map
                        .lookup(key)
                        .map(|current| values.try_patch(current, patch, config))
                    {
                        Some(updated) => {
                            map.set(key.clone(), updated?);
                        }
                        None if strict => return Err(PatchError::update_absent(key)),
                        None => {}
                    }
                }
                MapEdit::Remove(key) => {
                    if map.remove(key).is_none() && strict {
                        return Err(PatchError::remove_absent(key));
                    }
                }
            }
        }
        debug!(edits = self.len(), size = map.size(), strict, "applied map patch");
        Ok(map)
    }
}

impl<K, V, P> Clone for MapPatch<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            edits: self.edits.clone(),
        }
    }
}

impl<K, V, P> Default for MapPatch<K, V, P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V, P> FromIterator<MapEdit<K, V, P>> for MapPatch<K, V, P> {
    fn from_iter<I: IntoIterator<Item = MapEdit<K, V, P>>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// [`Differ`] over any [`MapSnapshot`], delegating values to `D`.
pub struct MapDiffer<M, D> {
    values: D,
    _map: PhantomData<fn() -> M>,
}

impl<M, D> MapDiffer<M, D> {
    pub const fn new(values: D) -> Self {
        Self {
            values,
            _map: PhantomData,
        }
    }

    /// The differ used for values.
    pub fn values(&self) -> &D {
        &self.values
    }
}

impl<M, D: Default> Default for MapDiffer<M, D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<M, D: Clone> Clone for MapDiffer<M, D> {
    fn clone(&self) -> Self {
        Self::new(self.values.clone())
    }
}

impl<M, D: fmt::Debug> fmt::Debug for MapDiffer<M, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapDiffer")
            .field("values", &self.values)
            .finish()
    }
}

impl<M, D> Differ for MapDiffer<M, D>
where
    M: MapSnapshot,
    M::Key: Clone + fmt::Debug,
    M::Value: Clone + PartialEq,
    D: Differ<Value = M::Value>,
{
    type Value = M;
    type Patch = MapPatch<M::Key, M::Value, D::Patch>;

    fn empty(&self) -> Self::Patch {
        MapPatch::empty()
    }

    fn diff(&self, old: &M, new: &M) -> Self::Patch {
        MapPatch::diff(old, new, &self.values)
    }

    fn combine(&self, first: Self::Patch, second: Self::Patch) -> Self::Patch {
        first.and_then(second)
    }

    fn patch(&self, old: &M, patch: &Self::Patch) -> M {
        patch.apply(old, &self.values)
    }

    /// Checked application, see [`MapPatch::try_apply`].
    fn try_patch(&self, old: &M, patch: &Self::Patch, config: &ApplyConfig) -> PatchResult<M> {
        patch.try_apply(old, &self.values, config)
    }
}

/// Differ over [`im::HashMap`] whose values are diffed by `values`.
pub fn hash_map<K, D: Differ>(values: D) -> MapDiffer<im::HashMap<K, D::Value>, D> {
    MapDiffer::new(values)
}

/// Differ over [`im::OrdMap`] whose values are diffed by `values`.
pub fn ord_map<K, D: Differ>(values: D) -> MapDiffer<im::OrdMap<K, D::Value>, D> {
    MapDiffer::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutandis_core::{Update, UpdateDiffer};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    type Flat = im::HashMap<&'static str, i32>;

    fn map(pairs: &[(&'static str, i32)]) -> Flat {
        pairs.iter().copied().collect()
    }

    fn flat() -> MapDiffer<Flat, UpdateDiffer<i32>> {
        hash_map(UpdateDiffer::new())
    }

    #[test]
    fn unchanged_key_produces_no_edit() {
        let old = map(&[("a", 1), ("b", 2)]);
        let new = map(&[("a", 1), ("b", 3), ("c", 4)]);
        let differ = flat();
        let patch = differ.diff(&old, &new);

        assert_eq!(patch.len(), 2);
        assert!(patch.edits().all(|e| *e.key() != "a"));
        let edits: Vec<_> = patch.edits().cloned().collect();
        assert!(edits.contains(&MapEdit::Update("b", Update::Replace(3))));
        assert!(edits.contains(&MapEdit::Insert("c", 4)));
        assert_eq!(differ.patch(&old, &patch), new);
    }

    #[test]
    fn identical_maps_produce_empty_patch() {
        let m = map(&[("x", 1)]);
        let patch = flat().diff(&m, &m);
        assert!(patch.is_empty());
        assert_eq!(flat().patch(&m, &patch), m);
    }

    #[test]
    fn missing_keys_are_removed() {
        let old = map(&[("gone", 1), ("kept", 2)]);
        let new = map(&[("kept", 2)]);
        let patch = flat().diff(&old, &new);
        assert_eq!(
            patch.edits().cloned().collect::<Vec<_>>(),
            vec![MapEdit::Remove("gone")]
        );
        assert_eq!(flat().patch(&old, &patch), new);
    }

    #[test]
    fn one_edit_per_key() {
        let old = map(&[("a", 1), ("b", 2), ("c", 3)]);
        let new = map(&[("a", 10), ("c", 3), ("d", 4)]);
        let patch = flat().diff(&old, &new);
        let mut keys: Vec<_> = patch.edits().map(|e| *e.key()).collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "d"]);
    }

    #[test]
    fn update_of_absent_key_is_noop() {
        let patch: MapPatch<&str, i32, Update<i32>> = MapPatch::update("ghost", Update::Replace(1));
        let base = map(&[("a", 1)]);
        assert_eq!(patch.apply(&base, &UpdateDiffer::new()), base);
    }

    #[test]
    fn removing_absent_key_is_noop() {
        let patch: MapPatch<&str, i32, Update<i32>> = MapPatch::remove("ghost");
        let base = map(&[("a", 1)]);
        assert_eq!(patch.apply(&base, &UpdateDiffer::new()), base);
    }

    #[test]
    fn insert_overwrites_present_key() {
        let patch: MapPatch<&str, i32, Update<i32>> = MapPatch::insert("a", 9);
        let base = map(&[("a", 1)]);
        assert_eq!(patch.apply(&base, &UpdateDiffer::new()), map(&[("a", 9)]));
    }

    #[test]
    fn nested_maps_patch_incrementally() {
        type Inner = im::HashMap<&'static str, i32>;
        type Outer = im::HashMap<&'static str, Inner>;

        let differ = hash_map::<&'static str, _>(hash_map::<&'static str, _>(
            UpdateDiffer::<i32>::new(),
        ));

        let old: Outer = [("svc", map(&[("port", 80), ("workers", 4)]))]
            .into_iter()
            .collect();
        let new: Outer = [
            ("svc", map(&[("port", 8080), ("workers", 4)])),
            ("db", map(&[("pool", 10)])),
        ]
        .into_iter()
        .collect();

        let patch = differ.diff(&old, &new);
        assert_eq!(patch.len(), 2);

        let update = patch
            .edits()
            .find_map(|e| match e {
                MapEdit::Update(key, inner) => Some((*key, inner.clone())),
                _ => None,
            })
            .expect("svc should be updated in place");
        assert_eq!(update.0, "svc");
        let inner_edits: Vec<_> = update.1.edits().cloned().collect();
        assert_eq!(inner_edits, vec![MapEdit::Update("port", Update::Replace(8080))]);

        assert_eq!(differ.patch(&old, &patch), new);
    }

    #[test]
    fn nested_update_merges_into_diverged_value() {
        let differ = hash_map::<&'static str, _>(hash_map::<&'static str, _>(
            UpdateDiffer::<i32>::new(),
        ));
        let old: im::HashMap<_, _> = [("svc", map(&[("port", 80)]))].into_iter().collect();
        let new: im::HashMap<_, _> = [("svc", map(&[("port", 81)]))].into_iter().collect();
        let patch = differ.diff(&old, &new);

        // Another base whose inner map carries an extra entry keeps it.
        let other: im::HashMap<_, _> = [("svc", map(&[("port", 80), ("tls", 1)]))]
            .into_iter()
            .collect();
        let expected: im::HashMap<_, _> = [("svc", map(&[("port", 81), ("tls", 1)]))]
            .into_iter()
            .collect();
        assert_eq!(differ.patch(&other, &patch), expected);
    }

    #[test]
    fn json_values_over_btree_map() {
        let differ: MapDiffer<BTreeMap<String, Value>, _> = MapDiffer::new(UpdateDiffer::<Value>::new());
        let old: BTreeMap<String, Value> = [
            ("config".to_string(), json!({"debug": false})),
            ("name".to_string(), json!("svc")),
        ]
        .into_iter()
        .collect();
        let new: BTreeMap<String, Value> = [
            ("config".to_string(), json!({"debug": true})),
            ("name".to_string(), json!("svc")),
            ("tags".to_string(), json!(["a"])),
        ]
        .into_iter()
        .collect();

        let patch = differ.diff(&old, &new);
        // BTreeMap folds in key order.
        assert_eq!(
            patch.edits().cloned().collect::<Vec<_>>(),
            vec![
                MapEdit::Update("config".to_string(), Update::Replace(json!({"debug": true}))),
                MapEdit::Insert("tags".to_string(), json!(["a"])),
            ]
        );
        assert_eq!(differ.patch(&old, &patch), new);
    }

    #[test]
    fn strict_accepts_honest_history() {
        let differ = flat();
        let a = map(&[("a", 1), ("b", 2)]);
        let b = map(&[("b", 3), ("c", 4)]);
        let c = map(&[("a", 5), ("c", 4)]);
        let patch = differ.combine(differ.diff(&a, &b), differ.diff(&b, &c));
        assert_eq!(differ.try_patch(&a, &patch, &ApplyConfig::strict()), Ok(c));
    }

    #[test]
    fn strict_rejects_divergent_base() {
        let differ = flat();
        let strict = ApplyConfig::strict();

        let insert = differ.diff(&map(&[]), &map(&[("a", 1)]));
        assert_eq!(
            differ.try_patch(&map(&[("a", 7)]), &insert, &strict),
            Err(PatchError::InsertPresent { target: "\"a\"".into() })
        );

        let update = differ.diff(&map(&[("a", 1)]), &map(&[("a", 2)]));
        assert_eq!(
            differ.try_patch(&map(&[]), &update, &strict),
            Err(PatchError::UpdateAbsent { target: "\"a\"".into() })
        );

        let remove = differ.diff(&map(&[("a", 1)]), &map(&[]));
        assert_eq!(
            differ.try_patch(&map(&[]), &remove, &strict),
            Err(PatchError::RemoveAbsent { target: "\"a\"".into() })
        );
    }

    #[test]
    fn strict_rejects_divergent_nested_base() {
        let differ = hash_map::<&'static str, _>(flat());
        let a: im::HashMap<_, _> = [("svc", map(&[("port", 1)]))].into_iter().collect();
        let b: im::HashMap<_, _> = [("svc", map(&[("port", 2)]))].into_iter().collect();
        let patch = differ.diff(&a, &b);

        let diverged: im::HashMap<_, _> = [("svc", map(&[]))].into_iter().collect();
        assert_eq!(
            differ.try_patch(&diverged, &patch, &ApplyConfig::strict()),
            Err(PatchError::UpdateAbsent { target: "\"port\"".into() })
        );
        assert_eq!(differ.try_patch(&a, &patch, &ApplyConfig::strict()), Ok(b));
        assert_eq!(
            differ.try_patch(&diverged, &patch, &ApplyConfig::default()),
            Ok(diverged.clone())
        );
    }

    #[test]
    fn nested_edit_limit_applies_per_value() {
        let differ = hash_map::<&'static str, _>(flat());
        let a: im::HashMap<_, _> = [("svc", map(&[]))].into_iter().collect();
        let b: im::HashMap<_, _> = [("svc", map(&[("port", 1), ("tls", 1)]))]
            .into_iter()
            .collect();
        let patch = differ.diff(&a, &b);
        assert_eq!(patch.len(), 1);
        assert_eq!(
            differ.try_patch(&a, &patch, &ApplyConfig::default().with_max_edits(1)),
            Err(PatchError::EditLimit { len: 2, limit: 1 })
        );
    }

    #[test]
    fn value_differ_builds_hand_made_updates() {
        let differ = hash_map::<&'static str, _>(flat());
        let inner = differ.values().diff(&map(&[("port", 80)]), &map(&[("port", 443)]));
        let patch = MapPatch::update("svc", inner).and_then(MapPatch::remove("old"));

        let base: im::HashMap<_, _> = [("svc", map(&[("port", 80)])), ("old", map(&[]))]
            .into_iter()
            .collect();
        let expected: im::HashMap<_, _> = [("svc", map(&[("port", 443)]))].into_iter().collect();
        assert_eq!(differ.patch(&base, &patch), expected);
        assert_eq!(differ.try_patch(&base, &patch, &ApplyConfig::strict()), Ok(expected));
    }

    #[test]
    fn lenient_try_apply_matches_apply() {
        let differ = flat();
        let patch = differ.diff(&map(&[("a", 1)]), &map(&[("a", 2), ("b", 3)]));
        let base = map(&[("b", 0)]);
        assert_eq!(
            differ.try_patch(&base, &patch, &ApplyConfig::default()),
            Ok(differ.patch(&base, &patch))
        );
    }

    #[test]
    fn edit_limit_rejects_large_patch() {
        let differ = flat();
        let patch = differ.diff(&map(&[]), &map(&[("a", 1), ("b", 2)]));
        let config = ApplyConfig::default().with_max_edits(1);
        assert_eq!(
            differ.try_patch(&map(&[]), &patch, &config),
            Err(PatchError::EditLimit { len: 2, limit: 1 })
        );
    }

    #[test]
    fn ord_map_differ_is_deterministic() {
        let differ = ord_map::<u8, _>(UpdateDiffer::<char>::new());
        let old: im::OrdMap<u8, char> = [(1, 'a'), (2, 'b')].into_iter().collect();
        let new: im::OrdMap<u8, char> = [(2, 'c'), (3, 'd')].into_iter().collect();
        let patch = differ.diff(&old, &new);
        assert_eq!(
            patch.edits().cloned().collect::<Vec<_>>(),
            vec![
                MapEdit::Update(2, Update::Replace('c')),
                MapEdit::Insert(3, 'd'),
                MapEdit::Remove(1),
            ]
        );
        assert_eq!(differ.patch(&old, &patch), new);
    }
}
