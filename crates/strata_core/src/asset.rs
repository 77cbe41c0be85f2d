//! # Asset Catalogs
//!
//! One [`Catalog`] per asset type, indexed by [`Asset::ID`]. The importer
//! that reads asset descriptors resolves a type name to an ID with
//! [`AssetCatalogs::kind_id`] and can unload by name without knowing the
//! Rust type.

use std::any::{Any, TypeId};
use std::marker::PhantomData;

use crate::error::{CatalogError, CatalogResult};
use crate::memory::{Catalog, PendingBucket};

/// Number of distinct asset types a context can hold.
pub const MAX_ASSET_KINDS: usize = 64;

/// A loadable asset type.
///
/// # Example
///
/// ```rust
/// use strata_core::Asset;
///
/// #[derive(Default)]
/// struct Texture {
///     width: u32,
///     height: u32,
/// }
///
/// impl Asset for Texture {
///     const ID: u8 = 0;
///     const NAME: &'static str = "texture";
/// }
/// ```
///
/// An `ID` of 64 or more fails to compile once the type reaches a catalog:
///
/// ```compile_fail
/// use strata_core::{Asset, AssetCatalogs};
///
/// struct Oversized;
///
/// impl Asset for Oversized {
///     const ID: u8 = 64;
///     const NAME: &'static str = "oversized";
/// }
///
/// let mut assets = AssetCatalogs::default();
/// let _ = assets.insert("big", Oversized);
/// ```
pub trait Asset: Send + 'static {
    /// Dense identifier (0-63) selecting the catalog.
    const ID: u8;

    /// Type name used by asset descriptors.
    const NAME: &'static str;
}

struct AssetSlot<A>(PhantomData<A>);

impl<A: Asset> AssetSlot<A> {
    const INDEX: usize = {
        assert!(
            (A::ID as usize) < MAX_ASSET_KINDS,
            "Asset::ID must be below MAX_ASSET_KINDS"
        );
        A::ID as usize
    };
}

type ErasedCatalog = Box<dyn Any + Send>;

struct CatalogEntry {
    type_id: TypeId,
    type_name: &'static str,
    name: &'static str,
    catalog: ErasedCatalog,
    remove: fn(&mut ErasedCatalog, &str) -> CatalogResult<()>,
    len: fn(&ErasedCatalog) -> usize,
}

fn remove_asset<A: Asset>(catalog: &mut ErasedCatalog, tag: &str) -> CatalogResult<()> {
    let catalog = catalog
        .downcast_mut::<Catalog<A>>()
        .unwrap_or_else(|| panic!("asset table entry is not a Catalog<{}>", A::NAME));
    catalog.remove(tag).map(drop)
}

fn catalog_len<A: Asset>(catalog: &ErasedCatalog) -> usize {
    catalog.downcast_ref::<Catalog<A>>().map_or(0, Catalog::len)
}

/// Asset catalogs keyed by asset ID.
pub struct AssetCatalogs {
    entries: Vec<Option<CatalogEntry>>,
    reserve: usize,
}

impl Default for AssetCatalogs {
    fn default() -> Self {
        Self::new(0)
    }
}

impl AssetCatalogs {
    /// Creates an empty set; each catalog reserves room for `reserve` tags
    /// when first used.
    #[must_use]
    pub fn new(reserve: usize) -> Self {
        Self {
            entries: (0..MAX_ASSET_KINDS).map(|_| None).collect(),
            reserve,
        }
    }

    /// The catalog for `A`, if one has been created.
    #[must_use]
    pub fn catalog<A: Asset>(&self) -> Option<&Catalog<A>> {
        self.entries[AssetSlot::<A>::INDEX]
            .as_ref()?
            .catalog
            .downcast_ref::<Catalog<A>>()
    }

    /// The catalog for `A`, created if missing.
    ///
    /// # Panics
    ///
    /// Panics if another type already claimed `A::ID` or `A::NAME`.
    pub fn catalog_mut<A: Asset>(&mut self) -> &mut Catalog<A> {
        let index = AssetSlot::<A>::INDEX;
        if self.entries[index].is_none() {
            self.register::<A>(index);
        }

        let entry = self.entries[index]
            .as_mut()
            .unwrap_or_else(|| panic!("asset catalog {index} vanished after registration"));
        assert!(
            entry.type_id == TypeId::of::<A>(),
            "asset id {index} claimed by both {} and {}",
            entry.type_name,
            std::any::type_name::<A>()
        );
        entry
            .catalog
            .downcast_mut::<Catalog<A>>()
            .unwrap_or_else(|| panic!("asset catalog {index} has the wrong type"))
    }

    /// Creates a default-constructed `A` under `tag`.
    pub fn create<A: Asset + Default>(&mut self, tag: &str) -> CatalogResult<&mut A> {
        self.catalog_mut::<A>().create(tag)
    }

    /// Stores `value` under `tag`.
    pub fn insert<A: Asset>(&mut self, tag: &str, value: A) -> CatalogResult<&mut A> {
        self.catalog_mut::<A>().insert(tag, value)
    }

    /// Makes a bucket built off-thread visible.
    pub fn commit<A: Asset>(&mut self, pending: PendingBucket<A>) -> CatalogResult<&mut A> {
        self.catalog_mut::<A>().commit(pending)
    }

    /// Gets the `A` stored under `tag`.
    #[must_use]
    pub fn get<A: Asset>(&self, tag: &str) -> Option<&A> {
        self.catalog::<A>()?.get(tag)
    }

    /// Gets the `A` stored under `tag` mutably.
    pub fn get_mut<A: Asset>(&mut self, tag: &str) -> Option<&mut A> {
        self.entries[AssetSlot::<A>::INDEX]
            .as_mut()?
            .catalog
            .downcast_mut::<Catalog<A>>()?
            .get_mut(tag)
    }

    /// Removes the `A` stored under `tag`.
    pub fn remove<A: Asset>(&mut self, tag: &str) -> CatalogResult<A> {
        match self.entries[AssetSlot::<A>::INDEX].as_mut() {
            Some(entry) => entry
                .catalog
                .downcast_mut::<Catalog<A>>()
                .ok_or_else(|| CatalogError::UnknownKind(A::NAME.to_owned()))?
                .remove(tag),
            None => Err(CatalogError::UnknownTag(tag.to_owned())),
        }
    }

    /// Asset ID registered under `name`.
    #[must_use]
    pub fn kind_id(&self, name: &str) -> Option<u8> {
        self.entries
            .iter()
            .zip(0..)
            .find_map(|(entry, id)| entry.as_ref().filter(|e| e.name == name).map(|_| id))
    }

    /// Removes `tag` from the catalog registered under `kind`.
    pub fn remove_by_kind(&mut self, kind: &str, tag: &str) -> CatalogResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .flatten()
            .find(|entry| entry.name == kind)
            .ok_or_else(|| CatalogError::UnknownKind(kind.to_owned()))?;
        (entry.remove)(&mut entry.catalog, tag)
    }

    /// `(id, name, tag count)` for every created catalog.
    pub fn registered(&self) -> impl Iterator<Item = (u8, &'static str, usize)> + '_ {
        self.entries.iter().zip(0..).filter_map(|(entry, id)| {
            entry
                .as_ref()
                .map(|entry| (id, entry.name, (entry.len)(&entry.catalog)))
        })
    }

    /// Drops every catalog and every asset in them.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            if let Some(entry) = entry.take() {
                tracing::debug!(
                    "Released {} {} assets",
                    (entry.len)(&entry.catalog),
                    entry.name
                );
            }
        }
    }

    fn register<A: Asset>(&mut self, index: usize) {
        if let Some(existing) = self.entries.iter().flatten().find(|e| e.name == A::NAME) {
            panic!(
                "asset name {} claimed by both {} and {}",
                A::NAME,
                existing.type_name,
                std::any::type_name::<A>()
            );
        }

        tracing::debug!("Created catalog for asset {} ({})", index, A::NAME);
        self.entries[index] = Some(CatalogEntry {
            type_id: TypeId::of::<A>(),
            type_name: std::any::type_name::<A>(),
            name: A::NAME,
            catalog: Box::new(Catalog::<A>::with_capacity(self.reserve)),
            remove: remove_asset::<A>,
            len: catalog_len::<A>,
        });
    }
}

impl std::fmt::Debug for AssetCatalogs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.registered()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Sound {
        samples: Vec<i16>,
    }

    impl Asset for Sound {
        const ID: u8 = 1;
        const NAME: &'static str = "sound";
    }

    #[derive(Debug, Default, PartialEq)]
    struct Font(u32);

    impl Asset for Font {
        const ID: u8 = 2;
        const NAME: &'static str = "font";
    }

    #[derive(Debug, Default)]
    struct Echo(u8);

    impl Asset for Echo {
        const ID: u8 = 3;
        const NAME: &'static str = "sound";
    }

    #[test]
    fn test_create_and_lookup() {
        let mut assets = AssetCatalogs::default();
        assets.create::<Sound>("jump").unwrap().samples.push(7);
        assets.insert("mono", Font(12)).unwrap();

        assert_eq!(assets.get::<Sound>("jump").map(|s| s.samples.len()), Some(1));
        assert_eq!(assets.get::<Font>("mono").map(|f| f.0), Some(12));
        assert!(assets.get::<Font>("jump").is_none());
    }

    #[test]
    fn test_kind_lookup_and_remove_by_kind() {
        let mut assets = AssetCatalogs::default();
        assets.insert("jump", Sound { samples: vec![1, 2] }).unwrap();

        assert_eq!(assets.kind_id("sound"), Some(1));
        assert_eq!(assets.kind_id("mesh"), None);

        assets.remove_by_kind("sound", "jump").unwrap();
        assert!(assets.get::<Sound>("jump").is_none());
        assert_eq!(
            assets.remove_by_kind("mesh", "jump"),
            Err(CatalogError::UnknownKind("mesh".to_string()))
        );
    }

    #[test]
    fn test_remove_without_catalog() {
        let mut assets = AssetCatalogs::default();
        assert!(matches!(
            assets.remove::<Font>("mono"),
            Err(CatalogError::UnknownTag(_))
        ));
    }

    #[test]
    fn test_registered_counts() {
        let mut assets = AssetCatalogs::new(4);
        assets.create::<Font>("a").unwrap();
        assets.create::<Font>("b").unwrap();

        let registered: Vec<_> = assets.registered().collect();
        assert_eq!(registered, vec![(2, "font", 2)]);

        assets.clear();
        assert_eq!(assets.registered().count(), 0);
    }

    #[test]
    #[should_panic(expected = "claimed by both")]
    fn test_duplicate_name_panics() {
        let mut assets = AssetCatalogs::default();
        assets.create::<Sound>("a").unwrap();
        let _ = assets.insert("b", Echo(1)).map(|echo| echo.0);
    }
}
