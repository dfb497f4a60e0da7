//! Save/load round trips for every built-in connectivity.

use forest_mesh::io;
use forest_mesh::prelude::*;
use forest_mesh::topology::builtin;

fn all_builtins() -> Vec<(&'static str, Connectivity)> {
    vec![
        ("unitcube", builtin::unitcube()),
        ("periodic", builtin::periodic()),
        ("rotwrap", builtin::rotwrap()),
        ("twocubes", builtin::twocubes()),
        ("twowrap", builtin::twowrap()),
        ("rotcubes", builtin::rotcubes()),
        ("brick", builtin::brick(3, 2, 2, true, false, false).unwrap()),
        ("shell", builtin::shell()),
        ("sphere", builtin::sphere()),
    ]
}

#[test]
fn memory_round_trip_preserves_equality() {
    for (name, conn) in all_builtins() {
        let mut blob = Vec::new();
        io::save_to(&mut blob, &conn).unwrap();
        let loaded = io::load_from(&mut blob.as_slice()).unwrap();
        assert!(loaded.is_valid(), "{name}");
        assert!(loaded.is_equal(&conn), "{name}");
        assert_eq!(loaded, conn, "{name}");
    }
}

#[test]
fn file_round_trip_preserves_equality() {
    let dir = tempfile::tempdir().unwrap();
    for (name, conn) in all_builtins() {
        let path = dir.path().join(format!("{name}.fmconn"));
        io::save(&path, &conn).unwrap();
        let loaded = io::load(&path).unwrap();
        assert!(loaded.is_equal(&conn), "{name}");
    }
}

#[test]
fn trailing_garbage_is_tolerated_but_short_reads_are_not() {
    let conn = builtin::sphere();
    let mut blob = Vec::new();
    io::save_to(&mut blob, &conn).unwrap();

    let mut padded = blob.clone();
    padded.extend_from_slice(&[0xab; 16]);
    assert!(io::load_from(&mut padded.as_slice()).unwrap().is_equal(&conn));

    for cut in [1, 4, blob.len() / 2] {
        let mut short = blob.clone();
        short.truncate(blob.len() - cut);
        assert!(matches!(
            io::load_from(&mut short.as_slice()),
            Err(ForestMeshError::CorruptFile(_))
        ));
    }
}

#[test]
fn missing_file_reports_io_error() {
    let err = io::load("/nonexistent/forest-mesh.conn").unwrap_err();
    assert!(matches!(err, ForestMeshError::Io(_)));
}

#[test]
fn blob_sizes_reflect_counts() {
    let mut unit = Vec::new();
    io::save_to(&mut unit, &builtin::unitcube()).unwrap();
    // header + counts + 8 vertices + tree_to_vertex + tree_to_tree
    // + tree_to_face; no edge or corner payload
    let expected = 8 + 4 + 6 * 4 + 8 * 24 + 8 * 4 + 6 * 4 + 6;
    assert_eq!(unit.len(), expected);

    let mut periodic = Vec::new();
    io::save_to(&mut periodic, &builtin::periodic()).unwrap();
    let edges = 12 * 4 + 4 * 4 + 12 * 4 + 12;
    let corners = 8 * 4 + 2 * 4 + 8 * 4 + 8;
    assert_eq!(periodic.len(), expected + edges + corners);
}
