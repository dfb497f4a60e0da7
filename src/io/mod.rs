//! On-disk serialization of a connectivity.
//!
//! The format is a single little-endian blob: an 8-byte magic string, a
//! 32-bit format version, the six counts, then the arrays in a fixed
//! order with their natural element sizes. Arrays whose count is zero
//! are omitted. Loading validates the result before returning it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::forest_error::ForestMeshError;
use crate::topology::connectivity::{Connectivity, TopIdx};
use crate::topology::constants::{MAGIC, ONDISK_FORMAT};

/// Save a connectivity to a file.
///
/// The connectivity must be valid; the tree attribute array is not part
/// of the format and is not saved.
pub fn save(path: impl AsRef<Path>, conn: &Connectivity) -> Result<(), ForestMeshError> {
    let mut file = BufWriter::new(File::create(path)?);
    save_to(&mut file, conn)?;
    file.flush()?;
    Ok(())
}

/// Load a connectivity from a file.
pub fn load(path: impl AsRef<Path>) -> Result<Connectivity, ForestMeshError> {
    load_from(&mut BufReader::new(File::open(path)?))
}

/// Write the on-disk encoding to an arbitrary sink.
pub fn save_to(out: &mut impl Write, conn: &Connectivity) -> Result<(), ForestMeshError> {
    debug_assert!(conn.is_valid());
    out.write_all(MAGIC)?;
    out.write_all(&ONDISK_FORMAT.to_le_bytes())?;
    for count in [
        conn.num_vertices(),
        conn.num_trees(),
        conn.num_edges(),
        conn.num_ett(),
        conn.num_corners(),
        conn.num_ctt(),
    ] {
        out.write_all(&count.to_le_bytes())?;
    }

    for vertex in &conn.vertices {
        for coord in vertex {
            out.write_all(&coord.to_le_bytes())?;
        }
    }
    write_topidx(out, conn.tree_to_vertex.iter().flatten())?;
    write_topidx(out, conn.tree_to_tree.iter().flatten())?;
    write_bytes(out, conn.tree_to_face.iter().flatten())?;
    if conn.num_edges() > 0 {
        write_topidx(out, conn.tree_to_edge.iter().flatten())?;
        write_topidx(out, &conn.ett_offset)?;
        write_topidx(out, &conn.edge_to_tree)?;
        write_bytes(out, &conn.edge_to_edge)?;
    }
    if conn.num_corners() > 0 {
        write_topidx(out, conn.tree_to_corner.iter().flatten())?;
        write_topidx(out, &conn.ctt_offset)?;
        write_topidx(out, &conn.corner_to_tree)?;
        write_bytes(out, &conn.corner_to_corner)?;
    }
    Ok(())
}

/// Read the on-disk encoding from an arbitrary source.
///
/// Fails with [`ForestMeshError::CorruptFile`] on a magic or version
/// mismatch or a short read, and with
/// [`ForestMeshError::InvalidConnectivity`] when the decoded structure
/// does not validate.
pub fn load_from(input: &mut impl Read) -> Result<Connectivity, ForestMeshError> {
    let mut magic = [0u8; 8];
    read_exact(input, &mut magic)?;
    if &magic != MAGIC {
        return Err(ForestMeshError::CorruptFile("bad magic string".into()));
    }
    let version = u32::from_le_bytes(read_array(input)?);
    if version != ONDISK_FORMAT {
        return Err(ForestMeshError::CorruptFile(format!(
            "unsupported format version {version:#010x}"
        )));
    }

    let mut counts = [0 as TopIdx; 6];
    for count in &mut counts {
        *count = TopIdx::from_le_bytes(read_array(input)?);
        if *count < 0 {
            return Err(ForestMeshError::CorruptFile("negative count".into()));
        }
    }
    let [num_vertices, num_trees, num_edges, num_ett, num_corners, num_ctt] =
        counts.map(|c| c as usize);

    let mut conn = Connectivity::new(
        num_vertices as TopIdx,
        num_trees as TopIdx,
        num_edges as TopIdx,
        num_ett as TopIdx,
        num_corners as TopIdx,
        num_ctt as TopIdx,
    );

    for vertex in &mut conn.vertices {
        for coord in vertex.iter_mut() {
            *coord = f64::from_le_bytes(read_array(input)?);
        }
    }
    if num_vertices > 0 {
        read_topidx(input, conn.tree_to_vertex.iter_mut().flatten())?;
    }
    read_topidx(input, conn.tree_to_tree.iter_mut().flatten())?;
    read_bytes(input, conn.tree_to_face.iter_mut().flatten())?;
    if num_edges > 0 {
        read_topidx(input, conn.tree_to_edge.iter_mut().flatten())?;
        read_topidx(input, conn.ett_offset.iter_mut())?;
        read_topidx(input, conn.edge_to_tree.iter_mut())?;
        read_bytes(input, conn.edge_to_edge.iter_mut())?;
    }
    if num_corners > 0 {
        read_topidx(input, conn.tree_to_corner.iter_mut().flatten())?;
        read_topidx(input, conn.ctt_offset.iter_mut())?;
        read_topidx(input, conn.corner_to_tree.iter_mut())?;
        read_bytes(input, conn.corner_to_corner.iter_mut())?;
    }

    match conn.validate() {
        Ok(()) => Ok(conn),
        Err(reason) => Err(ForestMeshError::InvalidConnectivity(reason)),
    }
}

fn write_topidx<'a>(
    out: &mut impl Write,
    values: impl IntoIterator<Item = &'a TopIdx>,
) -> Result<(), ForestMeshError> {
    for value in values {
        out.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

fn write_bytes<'a>(
    out: &mut impl Write,
    values: impl IntoIterator<Item = &'a i8>,
) -> Result<(), ForestMeshError> {
    for &value in values {
        out.write_all(&[value as u8])?;
    }
    Ok(())
}

fn read_topidx<'a>(
    input: &mut impl Read,
    values: impl IntoIterator<Item = &'a mut TopIdx>,
) -> Result<(), ForestMeshError> {
    for value in values {
        *value = TopIdx::from_le_bytes(read_array(input)?);
    }
    Ok(())
}

fn read_bytes<'a>(
    input: &mut impl Read,
    values: impl IntoIterator<Item = &'a mut i8>,
) -> Result<(), ForestMeshError> {
    for value in values {
        let mut byte = [0u8; 1];
        read_exact(input, &mut byte)?;
        *value = byte[0] as i8;
    }
    Ok(())
}

fn read_array<const N: usize>(input: &mut impl Read) -> Result<[u8; N], ForestMeshError> {
    let mut buf = [0u8; N];
    read_exact(input, &mut buf)?;
    Ok(buf)
}

fn read_exact(input: &mut impl Read, buf: &mut [u8]) -> Result<(), ForestMeshError> {
    input.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ForestMeshError::CorruptFile("truncated payload".into())
        } else {
            ForestMeshError::Io(e)
        }
    })
}
