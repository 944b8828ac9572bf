use std::mem;

use crate::{Str, Value};

const INITIAL_CAPACITY: usize = 8;

/// A string-keyed hash table with open addressing and linear probing, used
/// for interned strings, global bindings, instance fields, and class method
/// tables.
///
/// Capacity is always a power of two and grows once three quarters of the
/// buckets are used. Deletions leave tombstones so probe sequences stay
/// unbroken; tombstones count toward the load factor and are dropped on the
/// next growth.
#[derive(Debug, Default)]
pub struct Table {
    entries: Vec<Entry>,
    count: usize,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: Option<Str>,
    value: Value,
}

impl Entry {
    // An empty bucket holds nil; a tombstone holds true.
    const EMPTY: Self = Self {
        key: None,
        value: Value::Nil,
    };
    const TOMBSTONE: Self = Self {
        key: None,
        value: Value::Bool(true),
    };

    fn is_tombstone(&self) -> bool {
        self.key.is_none() && !matches!(self.value, Value::Nil)
    }
}

impl Table {
    /// Look up the value bound to the key.
    pub fn get(&self, key: Str) -> Option<Value> {
        if self.count == 0 {
            return None;
        }
        let entry = &self.entries[self.find_entry(key)];
        entry.key.map(|_| entry.value)
    }

    /// Bind a value to the key, returning true when the key was not
    /// previously present.
    pub fn set(&mut self, key: Str, value: Value) -> bool {
        if (self.count + 1) * 4 > self.entries.len() * 3 {
            self.grow();
        }
        let idx = self.find_entry(key);
        let entry = &mut self.entries[idx];
        let is_new = entry.key.is_none();
        // Claiming a tombstone does not change the load; it was counted when
        // the deleted key was inserted.
        if is_new && !entry.is_tombstone() {
            self.count += 1;
        }
        *entry = Entry {
            key: Some(key),
            value,
        };
        is_new
    }

    /// Remove the key, leaving a tombstone. Returns true when the key was
    /// present.
    pub fn delete(&mut self, key: Str) -> bool {
        if self.count == 0 {
            return false;
        }
        let idx = self.find_entry(key);
        if self.entries[idx].key.is_none() {
            return false;
        }
        self.entries[idx] = Entry::TOMBSTONE;
        true
    }

    /// Iterate over the live entries.
    pub fn iter(&self) -> impl Iterator<Item = (Str, Value)> + '_ {
        self.entries
            .iter()
            .filter_map(|entry| entry.key.map(|key| (key, entry.value)))
    }

    /// Probe for an interned string by content. `resolve` maps a stored key
    /// to its character data.
    pub fn find_string<'a, F>(&self, text: &str, hash: u32, resolve: F) -> Option<Str>
    where
        F: Fn(Str) -> &'a str,
    {
        if self.count == 0 {
            return None;
        }
        let mask = self.entries.len() - 1;
        let mut idx = hash as usize & mask;
        loop {
            let entry = &self.entries[idx];
            match entry.key {
                None => {
                    if !entry.is_tombstone() {
                        return None;
                    }
                }
                Some(key) => {
                    if key.hash == hash && resolve(key) == text {
                        return Some(key);
                    }
                }
            }
            idx = (idx + 1) & mask;
        }
    }

    /// Rough number of bytes held by the bucket array.
    pub fn byte_estimate(&self) -> usize {
        self.entries.len() * mem::size_of::<Entry>()
    }

    /// Index of the entry for the key: its current bucket if present,
    /// otherwise the bucket an insertion would claim. The caller ensures the
    /// table is non-empty.
    fn find_entry(&self, key: Str) -> usize {
        let mask = self.entries.len() - 1;
        let mut idx = key.hash as usize & mask;
        let mut tombstone = None;
        loop {
            let entry = &self.entries[idx];
            match entry.key {
                None => {
                    if entry.is_tombstone() {
                        tombstone.get_or_insert(idx);
                    } else {
                        return tombstone.unwrap_or(idx);
                    }
                }
                Some(existing) if existing == key => return idx,
                Some(_) => {}
            }
            idx = (idx + 1) & mask;
        }
    }

    // Double the bucket array, re-inserting live entries and dropping
    // tombstones.
    fn grow(&mut self) {
        let capacity = (self.entries.len() * 2).max(INITIAL_CAPACITY);
        let old = mem::replace(&mut self.entries, vec![Entry::EMPTY; capacity]);
        self.count = 0;
        let mask = capacity - 1;
        for entry in old {
            let Some(key) = entry.key else { continue };
            let mut idx = key.hash as usize & mask;
            while self.entries[idx].key.is_some() {
                idx = (idx + 1) & mask;
            }
            self.entries[idx] = entry;
            self.count += 1;
        }
    }
}

/// The 32-bit FNV-1a hash of a string, the hash function every string is
/// interned under.
pub fn hash_str(text: &str) -> u32 {
    let mut hash = 2166136261u32;
    for byte in text.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16777619);
    }
    hash
}
