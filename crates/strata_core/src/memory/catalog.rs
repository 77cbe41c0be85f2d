//! # Bucketed Catalog
//!
//! Tag-keyed storage whose payloads never move. Each entry lives in its own
//! heap bucket; buckets are chained into a doubly-linked list for teardown
//! and indexed by tag for O(1) lookup and removal.
//!
//! ```text
//! index: { "grass" -> 2, "rock" -> 0, "sky" -> 1 }
//!
//! head -> [2: grass] <-> [1: sky] <-> [0: rock] -> None
//! ```
//!
//! Use this instead of [`crate::Pool`] when other systems cache the address
//! of a payload, e.g. a renderer holding on to a mesh.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use crate::error::{CatalogError, CatalogResult};

/// Bounded-length catalog key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    /// Longest accepted tag, in bytes.
    pub const MAX_LEN: usize = 64;

    /// Validates and wraps a tag.
    pub fn new(tag: &str) -> CatalogResult<Self> {
        if tag.is_empty() {
            return Err(CatalogError::EmptyTag);
        }
        if tag.len() > Self::MAX_LEN {
            return Err(CatalogError::TagTooLong {
                len: tag.len(),
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(tag.to_owned()))
    }

    /// The tag text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type BucketKey = usize;

struct Bucket<T> {
    tag: Tag,
    prev: Option<BucketKey>,
    next: Option<BucketKey>,
    value: T,
}

/// A bucket that has been allocated and filled but not yet made visible.
///
/// Worker threads build these off the owning thread; only
/// [`Catalog::commit`] on the owning thread links one in. The payload keeps
/// its heap address through the commit.
pub struct PendingBucket<T> {
    bucket: Box<Bucket<T>>,
}

impl<T> PendingBucket<T> {
    /// Allocates a bucket holding `value` under `tag`.
    #[must_use]
    pub fn new(tag: Tag, value: T) -> Self {
        Self {
            bucket: Box::new(Bucket {
                tag,
                prev: None,
                next: None,
                value,
            }),
        }
    }

    /// Tag the bucket will be committed under.
    #[must_use]
    pub fn tag(&self) -> &Tag {
        &self.bucket.tag
    }

    /// The payload.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.bucket.value
    }

    /// The payload, for population before commit.
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.bucket.value
    }

    /// Discards the bucket, returning its payload.
    #[must_use]
    pub fn into_value(self) -> T {
        self.bucket.value
    }
}

impl<T: fmt::Debug> fmt::Debug for PendingBucket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBucket")
            .field("tag", &self.bucket.tag)
            .field("value", &self.bucket.value)
            .finish()
    }
}

/// Tag-keyed, address-stable storage for payloads of type `T`.
///
/// # Thread Safety
///
/// Not internally synchronized. Mutate only from the owning thread; see
/// [`PendingBucket`] for off-thread population.
///
/// # Example
///
/// ```rust
/// use strata_core::Catalog;
///
/// let mut meshes: Catalog<Vec<f32>> = Catalog::new();
/// meshes.create("cube").unwrap().extend([0.0, 1.0]);
///
/// assert_eq!(meshes.get("cube").map(Vec::len), Some(2));
/// assert!(meshes.create("cube").is_err());
/// ```
pub struct Catalog<T> {
    buckets: Vec<Option<Box<Bucket<T>>>>,
    vacant: Vec<BucketKey>,
    head: Option<BucketKey>,
    index: HashMap<Tag, BucketKey>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Catalog<T> {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty catalog with room for `capacity` tags before its
    /// bookkeeping reallocates. Buckets themselves are allocated per tag.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: Vec::with_capacity(capacity),
            vacant: Vec::new(),
            head: None,
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of tags.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if the catalog holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// True if `tag` is present.
    #[inline]
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// Creates a default-constructed payload under `tag`.
    pub fn create(&mut self, tag: &str) -> CatalogResult<&mut T>
    where
        T: Default,
    {
        self.insert(tag, T::default())
    }

    /// Stores `value` under `tag`.
    ///
    /// Fails without touching existing entries if the tag is taken or malformed.
    pub fn insert(&mut self, tag: &str, value: T) -> CatalogResult<&mut T> {
        let tag = Tag::new(tag)?;
        self.commit(PendingBucket::new(tag, value))
    }

    /// Links a pre-built bucket into the catalog.
    ///
    /// On a duplicate tag the pending bucket is dropped and the existing
    /// entry is left as it was.
    pub fn commit(&mut self, pending: PendingBucket<T>) -> CatalogResult<&mut T> {
        let mut bucket = pending.bucket;

        if self.index.contains_key(&bucket.tag) {
            tracing::warn!("Rejected duplicate catalog tag '{}'", bucket.tag);
            return Err(CatalogError::DuplicateTag(bucket.tag.0));
        }

        let key = match self.vacant.pop() {
            Some(key) => key,
            None => {
                self.buckets.push(None);
                self.buckets.len() - 1
            }
        };

        bucket.prev = None;
        bucket.next = self.head;
        if let Some(old_head) = self.head {
            self.bucket_mut(old_head).prev = Some(key);
        }
        self.head = Some(key);

        tracing::debug!("Committed catalog bucket '{}' at {}", bucket.tag, key);
        self.index.insert(bucket.tag.clone(), key);
        let slot = self.buckets[key].insert(bucket);
        Ok(&mut slot.value)
    }

    /// Gets the payload under `tag`.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&T> {
        let key = *self.index.get(tag)?;
        self.buckets[key].as_ref().map(|bucket| &bucket.value)
    }

    /// Gets the payload under `tag` mutably.
    pub fn get_mut(&mut self, tag: &str) -> Option<&mut T> {
        let key = *self.index.get(tag)?;
        self.buckets[key].as_mut().map(|bucket| &mut bucket.value)
    }

    /// Removes `tag`, returning its payload and freeing its bucket.
    ///
    /// No other bucket moves.
    pub fn remove(&mut self, tag: &str) -> CatalogResult<T> {
        let Some(key) = self.index.remove(tag) else {
            tracing::warn!("Tried to remove unknown catalog tag '{}'", tag);
            return Err(CatalogError::UnknownTag(tag.to_owned()));
        };

        let bucket = self.unlink(key);
        tracing::debug!("Removed catalog bucket '{}' from {}", bucket.tag, key);
        Ok(bucket.value)
    }

    /// Iterates from the most recently inserted tag to the oldest.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            catalog: self,
            cursor: self.head,
        }
    }

    /// Destroys every bucket, walking the list from the head.
    pub fn clear(&mut self) {
        let mut released = 0usize;
        while let Some(key) = self.head {
            let bucket = self.unlink(key);
            self.index.remove(bucket.tag.as_str());
            released += 1;
        }
        self.buckets.clear();
        self.vacant.clear();

        if released > 0 {
            tracing::debug!("Cleared {} catalog buckets", released);
        }
    }

    fn unlink(&mut self, key: BucketKey) -> Box<Bucket<T>> {
        let bucket = self.buckets[key]
            .take()
            .unwrap_or_else(|| panic!("catalog index points at empty bucket {key}"));

        match bucket.prev {
            Some(prev) => self.bucket_mut(prev).next = bucket.next,
            None => self.head = bucket.next,
        }
        if let Some(next) = bucket.next {
            self.bucket_mut(next).prev = bucket.prev;
        }

        self.vacant.push(key);
        bucket
    }

    fn bucket_mut(&mut self, key: BucketKey) -> &mut Bucket<T> {
        self.buckets[key]
            .as_deref_mut()
            .unwrap_or_else(|| panic!("catalog link points at empty bucket {key}"))
    }
}

impl<T: fmt::Debug> fmt::Debug for Catalog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over a [`Catalog`], newest tag first.
pub struct Iter<'a, T> {
    catalog: &'a Catalog<T>,
    cursor: Option<BucketKey>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a Tag, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let catalog = self.catalog;
        let bucket = catalog.buckets[self.cursor?].as_deref()?;
        self.cursor = bucket.next;
        Some((&bucket.tag, &bucket.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags<T>(catalog: &Catalog<T>) -> Vec<&str> {
        catalog.iter().map(|(tag, _)| tag.as_str()).collect()
    }

    #[test]
    fn test_create_get_remove() {
        let mut catalog: Catalog<u32> = Catalog::new();
        *catalog.create("alpha").unwrap() = 3;

        assert_eq!(catalog.get("alpha"), Some(&3));
        assert_eq!(catalog.remove("alpha"), Ok(3));
        assert!(catalog.get("alpha").is_none());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_iteration_is_newest_first() {
        let mut catalog: Catalog<u8> = Catalog::new();
        for tag in ["a", "b", "c"] {
            catalog.create(tag).unwrap();
        }
        assert_eq!(tags(&catalog), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_unlink_head_middle_tail() {
        let mut catalog: Catalog<u8> = Catalog::new();
        for tag in ["a", "b", "c", "d"] {
            catalog.create(tag).unwrap();
        }

        catalog.remove("c").unwrap();
        assert_eq!(tags(&catalog), vec!["d", "b", "a"]);
        catalog.remove("d").unwrap();
        assert_eq!(tags(&catalog), vec!["b", "a"]);
        catalog.remove("a").unwrap();
        assert_eq!(tags(&catalog), vec!["b"]);
        catalog.remove("b").unwrap();
        assert!(tags(&catalog).is_empty());
    }

    #[test]
    fn test_vacant_keys_reused() {
        let mut catalog: Catalog<u8> = Catalog::new();
        catalog.create("a").unwrap();
        catalog.create("b").unwrap();
        catalog.remove("a").unwrap();
        catalog.create("c").unwrap();

        assert_eq!(catalog.buckets.len(), 2);
        assert_eq!(tags(&catalog), vec!["c", "b"]);
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut catalog: Catalog<u32> = Catalog::new();
        catalog.insert("tree", 1).unwrap();

        let err = catalog.insert("tree", 2).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateTag("tree".to_string()));
        assert_eq!(catalog.get("tree"), Some(&1));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_address_stable_across_other_mutation() {
        let mut catalog: Catalog<[u64; 8]> = Catalog::new();
        catalog.create("keep").unwrap();
        let before: *const [u64; 8] = catalog.get("keep").unwrap();

        for i in 0..100 {
            catalog.create(&format!("other{i}")).unwrap();
        }
        for i in (0..100).step_by(2) {
            catalog.remove(&format!("other{i}")).unwrap();
        }

        let after: *const [u64; 8] = catalog.get("keep").unwrap();
        assert!(std::ptr::eq(before, after));
    }

    #[test]
    fn test_pending_bucket_keeps_address() {
        let mut catalog: Catalog<u64> = Catalog::new();
        let pending = PendingBucket::new(Tag::new("late").unwrap(), 9);
        let before: *const u64 = pending.value();

        let committed: *const u64 = catalog.commit(pending).unwrap();
        assert!(std::ptr::eq(before, committed));
    }

    #[test]
    fn test_tag_bounds() {
        assert_eq!(Tag::new(""), Err(CatalogError::EmptyTag));
        let long = "x".repeat(Tag::MAX_LEN + 1);
        assert!(matches!(
            Tag::new(&long),
            Err(CatalogError::TagTooLong { len: 65, max: 64 })
        ));
        assert!(Tag::new(&"x".repeat(Tag::MAX_LEN)).is_ok());
    }

    #[test]
    fn test_remove_unknown() {
        let mut catalog: Catalog<u8> = Catalog::new();
        assert_eq!(
            catalog.remove("ghost"),
            Err(CatalogError::UnknownTag("ghost".to_string()))
        );
    }

    #[test]
    fn test_clear_drops_everything() {
        use std::rc::Rc;

        let tracker = Rc::new(());
        let mut catalog: Catalog<Rc<()>> = Catalog::new();
        for i in 0..5 {
            catalog.insert(&i.to_string(), Rc::clone(&tracker)).unwrap();
        }
        catalog.clear();

        assert_eq!(Rc::strong_count(&tracker), 1);
        assert!(catalog.is_empty());
        assert!(catalog.iter().next().is_none());
    }
}
