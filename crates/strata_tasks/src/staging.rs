//! # Asset Staging
//!
//! Workers allocate and fill catalog buckets; the owning thread links them
//! in. Payload addresses do not change across the commit, so a worker may
//! build self-referencing or GPU-mapped data before handing it over.

use std::sync::Arc;

use strata_core::{Asset, AssetCatalogs, CatalogError, CatalogResult, PendingBucket, Tag};

use crate::stack::HandoffStack;

/// Outcome of one [`AssetStaging::commit_into`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitReport {
    /// Buckets linked into the catalog.
    pub committed: usize,
    /// Buckets dropped, with the reason.
    pub rejected: Vec<CatalogError>,
}

impl CommitReport {
    /// True if every staged bucket was committed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Owner side of the staging area for asset type `A`.
pub struct AssetStaging<A> {
    staged: Arc<HandoffStack<PendingBucket<A>>>,
}

/// Worker side of the staging area. Cheap to clone.
pub struct StagingSender<A> {
    staged: Arc<HandoffStack<PendingBucket<A>>>,
}

impl<A> Clone for StagingSender<A> {
    fn clone(&self) -> Self {
        Self {
            staged: Arc::clone(&self.staged),
        }
    }
}

impl<A: Asset> Default for AssetStaging<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Asset> AssetStaging<A> {
    /// Creates an empty staging area.
    #[must_use]
    pub fn new() -> Self {
        Self {
            staged: Arc::new(HandoffStack::new()),
        }
    }

    /// A sender for worker threads.
    #[must_use]
    pub fn sender(&self) -> StagingSender<A> {
        StagingSender {
            staged: Arc::clone(&self.staged),
        }
    }

    /// Buckets waiting to be committed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// True if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Links every staged bucket into `assets`, in submission order.
    ///
    /// A bucket whose tag is already present is dropped and reported; the
    /// existing asset is left alone.
    pub fn commit_into(&self, assets: &mut AssetCatalogs) -> CommitReport {
        let mut report = CommitReport::default();

        for pending in self.staged.pop_all().into_iter().rev() {
            match assets.commit(pending) {
                Ok(_) => report.committed += 1,
                Err(err) => report.rejected.push(err),
            }
        }

        if report.committed > 0 || !report.rejected.is_empty() {
            tracing::debug!(
                "Committed {} staged {} assets, rejected {}",
                report.committed,
                A::NAME,
                report.rejected.len()
            );
        }
        report
    }
}

impl<A: Asset> StagingSender<A> {
    /// Wraps `value` in a bucket under `tag` and stages it.
    pub fn submit(&self, tag: &str, value: A) -> CatalogResult<()> {
        let tag = Tag::new(tag)?;
        self.staged.push(PendingBucket::new(tag, value));
        Ok(())
    }

    /// Stages a bucket the worker has already built.
    pub fn submit_bucket(&self, pending: PendingBucket<A>) {
        self.staged.push(pending);
    }
}

impl<A> std::fmt::Debug for AssetStaging<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStaging")
            .field("staged", &self.staged.len())
            .finish()
    }
}

impl<A> std::fmt::Debug for StagingSender<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingSender").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Clip(Vec<u8>);

    impl Asset for Clip {
        const ID: u8 = 7;
        const NAME: &'static str = "clip";
    }

    #[test]
    fn test_commit_in_submission_order() {
        let staging = AssetStaging::<Clip>::new();
        let sender = staging.sender();
        sender.submit("a", Clip(vec![1])).unwrap();
        sender.submit("a", Clip(vec![2])).unwrap();
        sender.submit("b", Clip(vec![3])).unwrap();
        assert_eq!(staging.len(), 3);

        let mut assets = AssetCatalogs::default();
        let report = staging.commit_into(&mut assets);

        assert_eq!(report.committed, 2);
        assert_eq!(report.rejected, vec![CatalogError::DuplicateTag("a".into())]);
        assert!(!report.is_clean());
        assert_eq!(assets.get::<Clip>("a").map(|c| c.0[0]), Some(1));
        assert!(staging.is_empty());
    }

    #[test]
    fn test_prebuilt_bucket_keeps_address() {
        let staging = AssetStaging::<Clip>::new();
        let mut pending = PendingBucket::new(Tag::new("big").unwrap(), Clip(Vec::new()));
        pending.value_mut().0.extend_from_slice(&[9; 16]);
        let address = pending.value() as *const Clip;
        staging.sender().submit_bucket(pending);

        let mut assets = AssetCatalogs::default();
        assert!(staging.commit_into(&mut assets).is_clean());
        let committed = assets.get::<Clip>("big").unwrap();
        assert_eq!(committed as *const Clip, address);
        assert_eq!(committed.0.len(), 16);
    }

    #[test]
    fn test_bad_tag_rejected_at_submit() {
        let staging = AssetStaging::<Clip>::new();
        assert_eq!(
            staging.sender().submit("", Clip(Vec::new())),
            Err(CatalogError::EmptyTag)
        );
        assert!(staging.is_empty());
    }
}
