//! Layout and serialization guarantees of the plain-value descriptors.

use forest_mesh::prelude::*;
use forest_mesh::topology::builtin;
use static_assertions::const_assert_eq;

// descriptors are compact plain data
const_assert_eq!(std::mem::size_of::<CornerTransform>(), 8);
const_assert_eq!(std::mem::size_of::<ConnectType>(), 4);

#[test]
fn connect_type_serializes_by_name() {
    let json = serde_json::to_string(&ConnectType::Edge).unwrap();
    assert_eq!(json, "\"Edge\"");
    let back: ConnectType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ConnectType::Edge);
}

#[test]
fn transforms_survive_serialization() {
    let conn = builtin::periodic();
    let info = find_edge_transform(&conn, 0, 0);
    let json = serde_json::to_string(&info).unwrap();
    let back: EdgeInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back, info);

    let ft = find_face_transform(&conn, 0, 2).unwrap();
    let json = serde_json::to_string(&ft).unwrap();
    let back: FaceTransform = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ft);
}

#[test]
fn descriptors_outlive_the_connectivity() {
    let info = {
        let conn = builtin::periodic();
        find_corner_transform(&conn, 0, 0)
    };
    assert_eq!(info.transforms.len(), 1);
    assert_eq!(info.transforms[0].ncorner, 7);
}
