//! Spatial relationships between entities.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// The kind of a directed spatial relation `source → target`.
///
/// Each variant reads as "source *kind* target", e.g. `Above` means the
/// source entity sits above the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RelationKind {
    /// Target's center lies inside the source's box.
    Contains,
    /// Source's center lies inside the target's box.
    ContainedBy,
    /// Centers are closer than the adjacency threshold.
    AdjacentTo,
    /// Source is higher along the vertical axis.
    Above,
    /// Source is lower along the vertical axis.
    Below,
    /// Source is further toward negative lateral.
    LeftOf,
    /// Source is further toward positive lateral.
    RightOf,
    /// Source is further toward positive depth.
    FrontOf,
    /// Source is further toward negative depth.
    Behind,
}

impl RelationKind {
    /// Every kind, in evaluation priority order.
    pub const ALL: [Self; 9] = [
        Self::Contains,
        Self::ContainedBy,
        Self::AdjacentTo,
        Self::Above,
        Self::Below,
        Self::LeftOf,
        Self::RightOf,
        Self::FrontOf,
        Self::Behind,
    ];

    /// Stable snake-case name, e.g. `"left_of"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::ContainedBy => "contained_by",
            Self::AdjacentTo => "adjacent_to",
            Self::Above => "above",
            Self::Below => "below",
            Self::LeftOf => "left_of",
            Self::RightOf => "right_of",
            Self::FrontOf => "front_of",
            Self::Behind => "behind",
        }
    }

    /// The kind describing the same configuration from the target's side.
    ///
    /// # Example
    ///
    /// ```
    /// use scan_types::RelationKind;
    ///
    /// assert_eq!(RelationKind::Above.inverse(), RelationKind::Below);
    /// assert_eq!(RelationKind::AdjacentTo.inverse(), RelationKind::AdjacentTo);
    /// ```
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Contains => Self::ContainedBy,
            Self::ContainedBy => Self::Contains,
            Self::AdjacentTo => Self::AdjacentTo,
            Self::Above => Self::Below,
            Self::Below => Self::Above,
            Self::LeftOf => Self::RightOf,
            Self::RightOf => Self::LeftOf,
            Self::FrontOf => Self::Behind,
            Self::Behind => Self::FrontOf,
        }
    }

    /// Returns `true` for the six purely directional kinds.
    #[must_use]
    pub const fn is_directional(self) -> bool {
        matches!(
            self,
            Self::Above | Self::Below | Self::LeftOf | Self::RightOf | Self::FrontOf | Self::Behind
        )
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relation between two entities of the same package.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialRelationship {
    /// Entity the relation is stated about.
    pub source: EntityId,
    /// Entity the source is related to.
    pub target: EntityId,
    /// Relation kind.
    pub kind: RelationKind,
    /// Confidence in `[0, 1]`. Encodes rule priority, not a calibrated probability.
    pub confidence: f64,
}

impl SpatialRelationship {
    /// Creates a relation, clamping `confidence` into `[0, 1]`.
    #[must_use]
    pub fn new(source: EntityId, target: EntityId, kind: RelationKind, confidence: f64) -> Self {
        Self {
            source,
            target,
            kind,
            confidence: if confidence.is_nan() {
                0.0
            } else {
                confidence.clamp(0.0, 1.0)
            },
        }
    }
}

impl fmt::Display for SpatialRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({:.2})",
            self.source, self.kind, self.target, self.confidence
        )
    }
}
