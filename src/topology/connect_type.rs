//! Neighbor adjacency classes.
//!
//! Several consumers of a connectivity care about how entities count as
//! adjacent: across faces only, across faces and edges, or across faces,
//! edges, and corners. The integer values are part of the on-disk and
//! inter-process ABI and must not change.

use serde::{Deserialize, Serialize};

use crate::forest_error::ForestMeshError;

/// Which entity classes make two trees or octants adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ConnectType {
    /// Adjacent when sharing a face.
    Face = 31,
    /// Adjacent when sharing a face or an edge.
    Edge = 32,
    /// Adjacent when sharing a face, an edge, or a corner.
    Corner = 33,
}

impl ConnectType {
    /// The default adjacency used by balance-style algorithms.
    pub const DEFAULT: ConnectType = ConnectType::Edge;
    /// Full adjacency including corners.
    pub const FULL: ConnectType = ConnectType::Corner;

    /// The number of entity classes included: 1, 2, or 3.
    #[inline]
    pub fn as_int(self) -> i32 {
        match self {
            ConnectType::Face => 1,
            ConnectType::Edge => 2,
            ConnectType::Corner => 3,
        }
    }

    /// A stable display name.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectType::Face => "FACE",
            ConnectType::Edge => "EDGE",
            ConnectType::Corner => "CORNER",
        }
    }
}

impl TryFrom<i32> for ConnectType {
    type Error = ForestMeshError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            31 => Ok(ConnectType::Face),
            32 => Ok(ConnectType::Edge),
            33 => Ok(ConnectType::Corner),
            other => Err(ForestMeshError::UnknownConnectType(other)),
        }
    }
}

impl std::fmt::Display for ConnectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
