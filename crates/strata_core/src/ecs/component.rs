//! # Component Identity
//!
//! Components are plain data attached to entities. Each component type
//! carries a small, dense integer ID that is both its archetype bit and its
//! slot in the pool table.

use std::marker::PhantomData;

/// Dense component type identifier, `0..MAX_COMPONENT_TYPES`.
pub type ComponentId = u8;

/// Number of distinct component types an entity directory can track.
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Marker trait for ECS components.
///
/// # Example
///
/// ```rust
/// use strata_core::Component;
///
/// #[derive(Default)]
/// struct Health(u32);
///
/// impl Component for Health {
///     const ID: u8 = 3;
/// }
/// ```
///
/// An `ID` of 64 or more fails to compile as soon as the type is used with
/// the directory:
///
/// ```compile_fail
/// use strata_core::{Component, EntityDirectory};
///
/// struct Oversized;
///
/// impl Component for Oversized {
///     const ID: u8 = 64;
/// }
///
/// let mut entities = EntityDirectory::new();
/// let id = entities.create();
/// entities.insert(id, Oversized);
/// ```
pub trait Component: Send + 'static {
    /// Unique identifier for this component type (0-63).
    ///
    /// This ID is used for the archetype bitmask and pool dispatch.
    const ID: ComponentId;
}

/// Compile-time bound check on [`Component::ID`].
pub(crate) struct ComponentBit<C>(PhantomData<C>);

impl<C: Component> ComponentBit<C> {
    /// `C::ID`, rejected during monomorphization if it does not fit the mask.
    pub(crate) const BIT: ComponentId = {
        assert!(
            (C::ID as usize) < MAX_COMPONENT_TYPES,
            "Component::ID must be below MAX_COMPONENT_TYPES"
        );
        C::ID
    };
}
