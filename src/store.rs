//! Memory Store
//!
//! Build-once, order-preserving index of records by identity.
//!
//! - Iteration follows first-occurrence order of the input
//! - `FirstWins` keeps the earliest record for a repeated identity
//! - `Strict` aborts construction on the first repeat; nothing is returned
//! - No insert/remove after construction

use crate::error::{Result, StoreError};
use crate::identity::{Extractor, IdentitySpec};
use crate::options::StoreOptions;
use crate::query::Query;
use crate::record::Record;
use crate::types::{DuplicatePolicy, Identity};
use ahash::RandomState;
use indexmap::map::{Entry, IndexMap, Iter, Keys, Values};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct MemoryStore<R> {
    extractor: Extractor,
    policy: DuplicatePolicy,
    /// identity → record, in first-occurrence order
    entries: IndexMap<Identity, R, RandomState>,
}

impl<R: Record> MemoryStore<R> {
    /// Build with the default `FirstWins` policy.
    pub fn new<I>(records: I, identity: impl Into<IdentitySpec>) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
    {
        Self::with_policy(records, identity, DuplicatePolicy::FirstWins)
    }

    /// Build with the `Strict` policy.
    pub fn strict<I>(records: I, identity: impl Into<IdentitySpec>) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
    {
        Self::with_policy(records, identity, DuplicatePolicy::Strict)
    }

    pub fn from_options<I>(records: I, options: &StoreOptions) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
    {
        Self::with_policy(records, options.identity.clone(), options.duplicates)
    }

    /// Consume `records` in one pass. The identity specification is validated
    /// before the first record is read.
    pub fn with_policy<I>(
        records: I,
        identity: impl Into<IdentitySpec>,
        policy: DuplicatePolicy,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
    {
        let extractor = Extractor::new(identity.into())?;
        let records = records.into_iter();
        let mut entries =
            IndexMap::with_capacity_and_hasher(records.size_hint().0, RandomState::new());

        for record in records {
            let key = extractor.extract(&record)?;
            match entries.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(slot) if policy.is_strict() => {
                    let key = slot.key().clone();
                    debug!(%key, identity = %extractor.spec(), "duplicate identity, construction aborted");
                    return Err(StoreError::DuplicateKey { key });
                }
                Entry::Occupied(_) => {}
            }
        }

        debug!(
            identity = %extractor.spec(),
            %policy,
            records = entries.len(),
            "memory store built"
        );
        Ok(Self { extractor, policy, entries })
    }
}

impl<R> MemoryStore<R> {
    pub fn identity_spec(&self) -> &IdentitySpec {
        self.extractor.spec()
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn is_strict(&self) -> bool {
        self.policy.is_strict()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all records in insertion order.
    pub fn records(&self) -> Vec<&R> {
        self.entries.values().collect()
    }

    pub fn into_records(self) -> Vec<R> {
        self.entries.into_values().collect()
    }

    pub fn iter(&self) -> Iter<'_, Identity, R> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Keys<'_, Identity, R> {
        self.entries.keys()
    }

    pub fn values(&self) -> Values<'_, Identity, R> {
        self.entries.values()
    }

    /// O(1) lookup. A missing identity is `None`, never an error.
    pub fn get(&self, identity: impl Into<Identity>) -> Option<&R> {
        self.entries.get(&identity.into())
    }

    pub fn contains_key(&self, identity: impl Into<Identity>) -> bool {
        self.entries.contains_key(&identity.into())
    }

    /// Entry at `position` in insertion order.
    pub fn get_index(&self, position: usize) -> Option<(&Identity, &R)> {
        self.entries.get_index(position)
    }

    /// Insertion position of `identity`.
    pub fn position_of(&self, identity: impl Into<Identity>) -> Option<usize> {
        self.entries.get_index_of(&identity.into())
    }

    /// Identity of any record under this store's rule. The record does not
    /// have to be stored here.
    pub fn identity_of<Q: Record + ?Sized>(&self, record: &Q) -> Result<Identity> {
        self.extractor.extract(record)
    }

    /// `identity_of` as a function value, e.g. for `try_sort_by_key`.
    pub fn identity_fn(&self) -> impl Fn(&R) -> Result<Identity> + '_
    where
        R: Record,
    {
        self.extractor.as_fn::<R>()
    }

    /// Start a filter/sort query over the stored records.
    pub fn query(&self) -> Query<'_, R> {
        Query::new(self)
    }
}

impl<'s, R> IntoIterator for &'s MemoryStore<R> {
    type Item = (&'s Identity, &'s R);
    type IntoIter = Iter<'s, Identity, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
