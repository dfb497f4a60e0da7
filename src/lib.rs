//! # forest-mesh
//!
//! forest-mesh is the connectivity and reference-geometry core of a
//! forest-of-octrees library. It answers two questions that every
//! higher-level octree algorithm depends on: how a macro-mesh of cubic
//! trees is glued together at faces, edges, and corners (with arbitrary
//! orientations and periodic identifications), and where a point in a
//! tree's reference cube lands under a built-in curvilinear mapping.
//!
//! ## Features
//! - [`Connectivity`](topology::connectivity::Connectivity): the
//!   macro-mesh graph with compressed edge/corner tables
//! - Transform queries decoding face, edge, and corner neighbor
//!   relations into reusable descriptors
//! - A validator enforcing the full web of structural invariants, and a
//!   completer deriving edge/corner tables from shared vertices
//! - Factories for canonical meshes: unit cube, periodic cube, rotwrap,
//!   twocubes, twowrap, rotcubes, brick, shell, and sphere
//! - Built-in geometries (identity, spherical shell, solid sphere) with
//!   analytic Jacobians and a shared cofactor inverse-transpose path
//! - A little-endian on-disk format with validated loading
//!
//! The core is purely synchronous: a connectivity is immutable after
//! construction, so read-only queries may run from any number of
//! threads without synchronization.
//!
//! ## Example
//! ```rust
//! use forest_mesh::prelude::*;
//!
//! let conn = forest_mesh::topology::builtin::brick(2, 1, 1, false, false, false)?;
//! assert!(conn.is_valid());
//! let ft = find_face_transform(&conn, 0, 1).expect("interior face");
//! assert_eq!(ft.ntree, 1);
//! # Ok::<(), forest_mesh::ForestMeshError>(())
//! ```

pub mod forest_error;
pub mod geometry;
pub mod io;
pub mod topology;

pub use forest_error::ForestMeshError;

/// The most-used types and functions in one import.
pub mod prelude {
    pub use crate::forest_error::ForestMeshError;
    pub use crate::geometry::{Geometry, IdentityGeometry, ShellGeometry, SphereGeometry};
    pub use crate::topology::complete::complete;
    pub use crate::topology::connect_type::ConnectType;
    pub use crate::topology::connectivity::{Connectivity, TopIdx};
    pub use crate::topology::transform::{
        find_corner_transform, find_edge_transform, find_face_transform, CornerInfo,
        CornerTransform, EdgeInfo, EdgeTransform, FaceTransform,
    };
}
