//! Issuance of the opaque identifiers attached to each entity.
//!
//! Physics handles and feature hashes belong to external systems. The
//! pipeline asks an [`IdentityIssuer`] for them once per entity and stores
//! the strings untouched. Any `Fn(EntityId, &FittedShape) -> EntityIdentity`
//! closure is an issuer.

use scan_types::EntityId;

use crate::fit::FittedShape;

/// Opaque identifiers for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityIdentity {
    /// Handle understood by a physics engine.
    pub physics_handle: String,
    /// Hash understood by a recognition system.
    pub feature_hash: String,
}

/// Source of opaque entity identifiers.
pub trait IdentityIssuer {
    /// Issues identifiers for the entity `id` with fitted geometry `shape`.
    fn issue(&self, id: EntityId, shape: &FittedShape) -> EntityIdentity;
}

impl<F> IdentityIssuer for F
where
    F: Fn(EntityId, &FittedShape) -> EntityIdentity,
{
    fn issue(&self, id: EntityId, shape: &FittedShape) -> EntityIdentity {
        self(id, shape)
    }
}

/// Default issuer producing `physics_<id>` and `feature_<id>`.
///
/// The strings are unique per entity within a package and carry no other meaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderIssuer;

impl IdentityIssuer for PlaceholderIssuer {
    fn issue(&self, id: EntityId, _shape: &FittedShape) -> EntityIdentity {
        EntityIdentity {
            physics_handle: format!("physics_{id}"),
            feature_hash: format!("feature_{id}"),
        }
    }
}
