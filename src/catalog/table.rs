//! Ordered, id-indexed storage for one reference table.

use crate::catalog::model::Record;
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;

/// Records in file order plus an id index.
///
/// Insertion order is the only ordering callers observe; ids are unique so
/// it is total.
#[derive(Debug)]
pub struct Table<T> {
    records: Vec<T>,
    by_id: BTreeMap<String, usize>,
}

/// One window of a search result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    /// Number of matches before pagination.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.items.len()) < self.total
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

impl<T: Record> Table<T> {
    pub(crate) fn build(records: Vec<T>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for (position, record) in records.iter().enumerate() {
            let id = record.id();
            if id.trim().is_empty() {
                bail!("{} contains a record with an empty id", record.table());
            }
            if by_id.insert(id.to_string(), position).is_some() {
                bail!("duplicate {} id {}", record.table(), id);
            }
        }
        Ok(Self { records, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).map(|&position| &self.records[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn all(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive substring search over each record's display label.
    pub fn search(&self, query: &str, offset: usize, limit: usize) -> Page<&T> {
        self.search_where(query, offset, limit, |_| true)
    }

    /// Same as [`Table::search`] with an extra record predicate applied before
    /// counting.
    pub fn search_where<F>(&self, query: &str, offset: usize, limit: usize, keep: F) -> Page<&T>
    where
        F: Fn(&T) -> bool,
    {
        let needle = query.trim().to_lowercase();
        let matches: Vec<&T> = self
            .records
            .iter()
            .filter(|record| keep(record))
            .filter(|record| label_matches(record.label(), &needle))
            .collect();
        let total = matches.len();
        let items = matches.into_iter().skip(offset).take(limit).collect();
        Page {
            total,
            offset,
            limit,
            items,
        }
    }
}

pub(crate) fn label_matches(label: &str, needle: &str) -> bool {
    needle.is_empty() || label.to_lowercase().contains(needle)
}
