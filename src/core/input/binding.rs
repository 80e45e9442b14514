//=========================================================================
// Input Bindings
//=========================================================================
//
// Identifiers and records for the logical inputs known to the engine.
//
// Architecture:
// ```text
//   InputGroup  (namespace: "gameplay", "ui", ...)
//     ├─ InputAction  (discrete: Pressed / Released)
//     └─ InputAxis    (continuous: f32 mapped through an AxisRange)
// ```
//
// Ids are 64-bit FNV-1a hashes of the binding name, so a name keeps its id
// across binding reloads. Actions, axes and groups live in three disjoint
// id spaces. Id 0 is reserved as null.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Constants ===========================================================

/// Size of the fixed name buffers used at the host boundary (NUL included).
pub const NAME_BUFFER_LEN: usize = 128;

/// Longest name (in bytes) that survives a boundary round-trip.
pub const MAX_NAME_LEN: usize = NAME_BUFFER_LEN - 1;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash of a binding name.
pub const fn name_hash(name: &str) -> u64 {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

//=== Identifiers =========================================================

macro_rules! binding_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// The null id. Never bound.
            pub const NULL: Self = Self(0);

            /// Derives the stable id of a binding name.
            pub const fn from_name(name: &str) -> Self {
                Self(name_hash(name))
            }

            #[inline]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn to_raw(self) -> u64 {
                self.0
            }

            #[inline]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:016X}", self.0)
            }
        }
    };
}

binding_id!(
    /// Stable identifier of an [`InputAction`].
    ActionId
);
binding_id!(
    /// Stable identifier of an [`InputAxis`].
    AxisId
);
binding_id!(
    /// Stable identifier of an [`InputGroup`].
    GroupId
);

//=== BindingKind =========================================================

/// The three disjoint kinds of binding records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Action,
    Axis,
    Group,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => f.write_str("action"),
            Self::Axis => f.write_str("axis"),
            Self::Group => f.write_str("group"),
        }
    }
}

/// Typed key for a point lookup in the binding database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKey {
    Action(ActionId),
    Axis(AxisId),
    Group(GroupId),
}

impl BindingKey {
    pub fn kind(&self) -> BindingKind {
        match self {
            Self::Action(_) => BindingKind::Action,
            Self::Axis(_) => BindingKind::Axis,
            Self::Group(_) => BindingKind::Group,
        }
    }

    pub fn to_raw(&self) -> u64 {
        match self {
            Self::Action(id) => id.to_raw(),
            Self::Axis(id) => id.to_raw(),
            Self::Group(id) => id.to_raw(),
        }
    }
}

//=== BindingError ========================================================

/// Errors raised while building, loading or querying bindings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("{kind} {id:016X} is not bound")]
    NotFound { kind: BindingKind, id: u64 },

    #[error("binding names must not be empty")]
    EmptyName,

    #[error("binding name '{name}' is {len} bytes long (limit 127)")]
    NameTooLong { name: String, len: usize },

    #[error("binding name contains a NUL byte")]
    InteriorNul,

    #[error("{kind} '{name}' is already bound")]
    Duplicate { kind: BindingKind, name: String },

    #[error("{kind} '{name}' collides with '{existing}' (same id)")]
    IdCollision {
        kind: BindingKind,
        name: String,
        existing: String,
    },

    #[error("{kind} '{name}' hashes to the reserved null id")]
    ReservedId { kind: BindingKind, name: String },

    #[error("axis '{name}' has an unusable range {range:?}")]
    InvalidRange { name: String, range: AxisRange },

    #[error("{kind} '{owner}' references unknown group '{group}'")]
    UnknownGroup {
        kind: BindingKind,
        owner: String,
        group: String,
    },
}

//=== BindingName =========================================================

/// Bounded-length binding name (at most [`MAX_NAME_LEN`] bytes, no NUL).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingName(String);

impl BindingName {
    pub fn new(name: &str) -> Result<Self, BindingError> {
        if name.is_empty() {
            return Err(BindingError::EmptyName);
        }
        if name.len() > MAX_NAME_LEN {
            return Err(BindingError::NameTooLong {
                name: name.to_string(),
                len: name.len(),
            });
        }
        if name.contains('\0') {
            return Err(BindingError::InteriorNul);
        }
        Ok(Self(name.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Copies the name into a NUL-terminated boundary buffer.
    pub fn to_buffer(&self) -> [u8; NAME_BUFFER_LEN] {
        let mut buffer = [0u8; NAME_BUFFER_LEN];
        let bytes = self.0.as_bytes();
        buffer[..bytes.len()].copy_from_slice(bytes);
        buffer
    }
}

impl fmt::Display for BindingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=== AxisRange ===========================================================

/// Mapping applied to raw axis values before they reach live state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisRange {
    /// Clamp into `[min, max]`.
    Clamped { min: f32, max: f32 },

    /// Divide by `norm`.
    Normalized { norm: f32 },

    /// Clamp into `[min, max]`, then divide by `norm`.
    ClampedNormalized { min: f32, max: f32, norm: f32 },

    /// Pass through unchanged.
    #[default]
    Infinite,
}

impl AxisRange {
    /// Finite bounds with `min <= max` and a finite, non-zero `norm`.
    pub fn is_valid(&self) -> bool {
        let bounds = |min: f32, max: f32| min.is_finite() && max.is_finite() && min <= max;
        let norm = |norm: f32| norm.is_finite() && norm != 0.0;

        match *self {
            Self::Clamped { min, max } => bounds(min, max),
            Self::Normalized { norm: n } => norm(n),
            Self::ClampedNormalized { min, max, norm: n } => bounds(min, max) && norm(n),
            Self::Infinite => true,
        }
    }

    pub fn apply(&self, value: f32) -> f32 {
        match *self {
            Self::Clamped { min, max } => value.max(min).min(max),
            Self::Normalized { norm } => value / norm,
            Self::ClampedNormalized { min, max, norm } => value.max(min).min(max) / norm,
            Self::Infinite => value,
        }
    }
}

//=== Records =============================================================

/// Named namespace for actions and axes.
#[derive(Debug, Clone, PartialEq)]
pub struct InputGroup {
    pub id: GroupId,
    pub name: BindingName,
}

/// Named discrete input.
#[derive(Debug, Clone, PartialEq)]
pub struct InputAction {
    pub id: ActionId,
    pub name: BindingName,
    pub group: GroupId,
}

/// Named continuous input.
#[derive(Debug, Clone, PartialEq)]
pub struct InputAxis {
    pub id: AxisId,
    pub name: BindingName,
    pub group: GroupId,
    pub range: AxisRange,
}

/// Result of a point lookup by [`BindingKey`].
#[derive(Debug, Clone, PartialEq)]
pub enum BindingRecord {
    Action(InputAction),
    Axis(InputAxis),
    Group(InputGroup),
}

impl BindingRecord {
    pub fn name(&self) -> &BindingName {
        match self {
            Self::Action(action) => &action.name,
            Self::Axis(axis) => &axis.name,
            Self::Group(group) => &group.name,
        }
    }

    /// Owning group id (`None` for groups themselves).
    pub fn group(&self) -> Option<GroupId> {
        match self {
            Self::Action(action) => Some(action.group),
            Self::Axis(axis) => Some(axis.group),
            Self::Group(_) => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
