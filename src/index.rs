// 🗂️ MultiValueIndex - keyed store allowing 0..N entries per key
// Collisions are explicit Multiple buckets, never silent overwrites.
// The tagged Single/Multiple shape rules out the "could be scalar or
// could be a list" class of bugs.

use crate::entry::Entry;
use indexmap::IndexMap;

// ============================================================================
// SLOT
// ============================================================================

/// Value stored under one index key.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Exactly one entry has this key
    Single(Entry),

    /// Two or more entries collide on this key
    Multiple(Vec<Entry>),
}

impl Slot {
    /// Number of entries in the slot.
    pub fn len(&self) -> usize {
        match self {
            Slot::Single(_) => 1,
            Slot::Multiple(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the slot's entries (one for `Single`).
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        match self {
            Slot::Single(entry) => std::slice::from_ref(entry).iter(),
            Slot::Multiple(entries) => entries.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entry> {
        match self {
            Slot::Single(entry) => std::slice::from_mut(entry).iter_mut(),
            Slot::Multiple(entries) => entries.iter_mut(),
        }
    }

    /// Appends an entry, converting `Single` to `Multiple` on first
    /// collision. Never drops the colliding entry.
    fn push(&mut self, entry: Entry) {
        let current = std::mem::replace(self, Slot::Multiple(Vec::new()));
        *self = match current {
            Slot::Single(first) => Slot::Multiple(vec![first, entry]),
            Slot::Multiple(mut bucket) => {
                bucket.push(entry);
                Slot::Multiple(bucket)
            }
        };
    }
}

// ============================================================================
// KEY PROJECTIONS
// ============================================================================

/// Normalizes a spelling into an index key: drops `/ \ & = '` and maps
/// whitespace runs to `_`.
pub fn normalize_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut previous_was_whitespace = false;

    for c in text.chars() {
        if matches!(c, '/' | '\\' | '&' | '=' | '\'') {
            continue;
        }
        if c.is_whitespace() {
            if !previous_was_whitespace {
                key.push('_');
            }
            previous_was_whitespace = true;
        } else {
            key.push(c);
            previous_was_whitespace = false;
        }
    }

    key
}

/// Projection used during imports: entries are looked up by citation form.
pub fn lemma_key(entry: &Entry) -> String {
    normalize_key(&entry.lemma.text)
}

/// Projection used during aggregation: entries are keyed by headword.
pub fn head_key(entry: &Entry) -> String {
    normalize_key(&entry.head.text)
}

// ============================================================================
// MULTI-VALUE INDEX
// ============================================================================

/// Keyed store of entries with explicit collision buckets.
///
/// Keys are computed by a caller-supplied projection at insertion time.
/// Iteration order is insertion order, so a rebuilt index reproduces the
/// same flattened sequence run after run.
#[derive(Debug)]
pub struct MultiValueIndex {
    key_fn: fn(&Entry) -> String,
    slots: IndexMap<String, Slot>,
    next_uid: u64,
}

impl MultiValueIndex {
    /// Creates an empty index with the given key projection.
    pub fn new(key_fn: fn(&Entry) -> String) -> Self {
        MultiValueIndex {
            key_fn,
            slots: IndexMap::new(),
            next_uid: 1,
        }
    }

    /// Builds an index over existing entries, preserving their order.
    pub fn from_entries(entries: Vec<Entry>, key_fn: fn(&Entry) -> String) -> Self {
        let mut index = MultiValueIndex::new(key_fn);
        for entry in entries {
            index.add(entry);
        }
        index
    }

    /// Looks up the slot stored under a key.
    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Slot> {
        self.slots.get_mut(key)
    }

    /// Adds an entry under its projected key, assigning its transient uid.
    /// Returns the uid.
    pub fn add(&mut self, mut entry: Entry) -> u64 {
        entry.uid = self.next_uid;
        self.next_uid += 1;
        let uid = entry.uid;

        let key = (self.key_fn)(&entry);
        match self.slots.get_mut(&key) {
            Some(slot) => slot.push(entry),
            None => {
                self.slots.insert(key, Slot::Single(entry));
            }
        }

        uid
    }

    /// Removes the whole slot stored under a key. Returns how many entries
    /// were cleared.
    pub fn remove(&mut self, key: &str) -> usize {
        self.slots.shift_remove(key).map_or(0, |slot| slot.len())
    }

    /// Removes a single entry by its transient uid, leaving co-keyed
    /// entries in place. A bucket left with one entry collapses back to
    /// `Single`. Returns whether anything was removed.
    pub fn remove_uid(&mut self, uid: u64) -> bool {
        let Some(position) = self
            .slots
            .values()
            .position(|slot| slot.iter().any(|e| e.uid == uid))
        else {
            return false;
        };

        let Some((key, slot)) = self.slots.shift_remove_index(position) else {
            return false;
        };

        let mut remaining: Vec<Entry> = match slot {
            Slot::Single(entry) => {
                if entry.uid == uid {
                    Vec::new()
                } else {
                    vec![entry]
                }
            }
            Slot::Multiple(bucket) => bucket.into_iter().filter(|e| e.uid != uid).collect(),
        };

        match remaining.len() {
            0 => {}
            1 => {
                if let Some(last) = remaining.pop() {
                    self.slots.shift_insert(position, key, Slot::Single(last));
                }
            }
            _ => {
                self.slots
                    .shift_insert(position, key, Slot::Multiple(remaining));
            }
        }

        true
    }

    /// Finds an entry by its transient uid.
    pub fn find_uid(&self, uid: u64) -> Option<&Entry> {
        self.values().find(|e| e.uid == uid)
    }

    pub fn find_uid_mut(&mut self, uid: u64) -> Option<&mut Entry> {
        self.values_mut().find(|e| e.uid == uid)
    }

    /// Flattened sequence of all stored entries, in insertion order.
    /// Lazy, finite, restartable.
    pub fn values(&self) -> impl Iterator<Item = &Entry> {
        self.slots.values().flat_map(Slot::iter)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.slots.values_mut().flat_map(Slot::iter_mut)
    }

    /// Iterates (key, slot) pairs.
    pub fn slots(&self) -> impl Iterator<Item = (&String, &Slot)> {
        self.slots.iter()
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = (&String, &mut Slot)> {
        self.slots.iter_mut()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of stored entries across all slots.
    pub fn entry_count(&self) -> usize {
        self.slots.values().map(Slot::len).sum()
    }

    /// Flattens the index back into its entries, in insertion order.
    pub fn into_entries(self) -> Vec<Entry> {
        let mut entries = Vec::with_capacity(self.entry_count());
        for (_, slot) in self.slots {
            match slot {
                Slot::Single(entry) => entries.push(entry),
                Slot::Multiple(bucket) => entries.extend(bucket),
            }
        }
        entries
    }
}

// ============================================================================
// TESTS
// ============================================================================
