//! Query Builder
//!
//! `store.query()` starts from the insertion-order snapshot. Filters run
//! first (stable, ANDed in the order added), then an optional stable sort.
//! `reverse()` flips the comparison rather than the output, so records with
//! equal keys keep their relative order. Nothing here mutates the store.

use crate::error::Result;
use crate::store::MemoryStore;
use crate::types::Identity;
use smallvec::SmallVec;
use std::cmp::Ordering;

type Row<'s, R> = (&'s Identity, &'s R);
type Predicate<'s, R> = Box<dyn Fn(&R) -> Result<bool> + 's>;
type Sorter<'s, R> = Box<dyn Fn(&mut Vec<Row<'s, R>>, bool) -> Result<()> + 's>;

pub struct Query<'s, R> {
    store: &'s MemoryStore<R>,
    filters: SmallVec<[Predicate<'s, R>; 2]>,
    sorter: Option<Sorter<'s, R>>,
    reverse: bool,
}

fn compare<K: Ord>(a: &K, b: &K, reverse: bool) -> Ordering {
    if reverse { b.cmp(a) } else { a.cmp(b) }
}

fn sort_by_identity<R>(rows: &mut [Row<'_, R>], reverse: bool) {
    rows.sort_by(|a, b| compare(a.0, b.0, reverse));
}

impl<'s, R> Query<'s, R> {
    pub(crate) fn new(store: &'s MemoryStore<R>) -> Self {
        Self { store, filters: SmallVec::new(), sorter: None, reverse: false }
    }

    /// Keep records for which `predicate` returns true.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + 's,
    {
        self.try_filter(move |record: &R| Ok(predicate(record)))
    }

    /// Like `filter`, but the first `Err` aborts the query.
    pub fn try_filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> Result<bool> + 's,
    {
        self.filters.push(Box::new(predicate));
        self
    }

    /// Stable sort by `key`. Replaces any earlier sort.
    pub fn sort_by_key<K, F>(self, key: F) -> Self
    where
        K: Ord + 's,
        F: Fn(&R) -> K + 's,
    {
        self.try_sort_by_key(move |record: &R| Ok(key(record)))
    }

    /// Like `sort_by_key`, but keys may fail. Keys are computed once per
    /// record before sorting; the first `Err` aborts the query.
    pub fn try_sort_by_key<K, F>(mut self, key: F) -> Self
    where
        K: Ord + 's,
        F: Fn(&R) -> Result<K> + 's,
    {
        self.sorter = Some(Box::new(move |rows: &mut Vec<Row<'s, R>>, reverse: bool| -> Result<()> {
            let keys = rows.iter().map(|(_, record)| key(*record)).collect::<Result<Vec<K>>>()?;
            let mut keyed: Vec<(K, Row<'s, R>)> = keys.into_iter().zip(rows.drain(..)).collect();
            keyed.sort_by(|a, b| compare(&a.0, &b.0, reverse));
            rows.extend(keyed.into_iter().map(|(_, row)| row));
            Ok(())
        }));
        self
    }

    /// Stable sort by the records' own ordering.
    pub fn sort(mut self) -> Self
    where
        R: Ord,
    {
        self.sorter = Some(Box::new(|rows: &mut Vec<Row<'s, R>>, reverse: bool| -> Result<()> {
            rows.sort_by(|a, b| compare(a.1, b.1, reverse));
            Ok(())
        }));
        self
    }

    /// Stable sort by the stored identities.
    pub fn sort_by_identity(mut self) -> Self {
        self.sorter = Some(Box::new(|rows: &mut Vec<Row<'s, R>>, reverse: bool| -> Result<()> {
            sort_by_identity(rows, reverse);
            Ok(())
        }));
        self
    }

    /// Sort descending. Without a key or `sort()` the identities are the key.
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    fn matches(&self, record: &R) -> Result<bool> {
        for predicate in &self.filters {
            if !predicate(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn rows(&self) -> Result<Vec<Row<'s, R>>> {
        let mut rows = Vec::with_capacity(self.store.len());
        for row in self.store.iter() {
            if self.matches(row.1)? {
                rows.push(row);
            }
        }
        match &self.sorter {
            Some(sort) => sort(&mut rows, self.reverse)?,
            None if self.reverse => sort_by_identity(&mut rows, true),
            None => {}
        }
        Ok(rows)
    }

    /// Run the query. Always a new `Vec`; the store is untouched.
    pub fn collect(self) -> Result<Vec<&'s R>> {
        Ok(self.rows()?.into_iter().map(|(_, record)| record).collect())
    }

    /// Run the query keeping each record's identity.
    pub fn entries(self) -> Result<Vec<(&'s Identity, &'s R)>> {
        self.rows()
    }

    /// Number of records the query yields. Sort keys are still computed, so
    /// a failing key fails here as it would in `collect()`.
    pub fn count(self) -> Result<usize> {
        Ok(self.rows()?.len())
    }

    pub fn first(self) -> Result<Option<&'s R>> {
        Ok(self.rows()?.into_iter().next().map(|(_, record)| record))
    }
}
