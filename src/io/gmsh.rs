//! Gmsh MSH 4.1 writers.
//!
//! Section writers for the MSH format pieces the grids need (`$Nodes`,
//! `$Elements`, per-element `$ElementData`, per-node `$NodeData`) plus the
//! two file-level entry points [`save_grid`] and [`save_grid_and_field`].
//!
//! Format reference: <https://gmsh.info/doc/texinfo/gmsh.html#MSH-file-format>

use crate::error::{Error, Result};
use crate::grid::{Grid, GridTopology};
use crate::numeric::NUMERICAL_ZERO;
use nalgebra::DMatrix;
use std::io::Write;
use std::path::Path;

/// Write the `$MeshFormat` header.
pub fn write_gmsh_header<W: Write>(writer: &mut W) -> Result<()> {
    write!(writer, "$MeshFormat\n4.1 0 8\n$EndMeshFormat")?;

    Ok(())
}

/// Write the `$Nodes` section with 1-based node tags.
///
/// 2D grids are written with z = 0.
pub fn write_gmsh_nodes<W: Write, E: GridTopology>(writer: &mut W, grid: &Grid<E>) -> Result<()> {
    let num_nodes = grid.num_nodes();

    writeln!(writer, "$Nodes")?;
    writeln!(writer, "1 {} 1 {}", num_nodes, num_nodes)?;
    writeln!(writer, "{} 1 0 {}", E::DIM, num_nodes)?;

    for tag in 1..=num_nodes {
        writeln!(writer, "{}", tag)?;
    }

    for i in 0..num_nodes {
        let node = grid.node(i)?;

        let z = if E::DIM == 3 { node[2] } else { 0.0 };
        writeln!(writer, "{} {} {}", node[0], node[1], z)?;
    }

    write!(writer, "$EndNodes")?;

    Ok(())
}

/// Write the `$Elements` section with the kind-specific element type id and
/// node ordering.
pub fn write_gmsh_elements<W: Write, E: GridTopology>(
    writer: &mut W,
    grid: &Grid<E>,
) -> Result<()> {
    let num_elements = grid.num_elements();

    writeln!(writer, "$Elements")?;
    writeln!(writer, "1 {} 1 {}", num_elements, num_elements)?;
    writeln!(
        writer,
        "{} 1 {} {}",
        E::DIM,
        E::gmsh_element_type(),
        num_elements
    )?;

    let ordering = E::gmsh_node_ordering();

    for i in 0..num_elements {
        let element = grid.element(i)?;

        write!(writer, "{}", i + 1)?;
        for &j in &ordering {
            write!(writer, " {}", element[j] + 1)?;
        }
        writeln!(writer)?;
    }

    write!(writer, "$EndElements")?;

    Ok(())
}

/// Write the `$ElementData` section carrying per-element densities.
///
/// Densities at the numerical zero floor are reported as 0.
pub fn write_gmsh_densities<W: Write, E: GridTopology>(
    writer: &mut W,
    grid: &Grid<E>,
) -> Result<()> {
    writeln!(writer, "$ElementData")?;
    writeln!(writer, "1")?;
    writeln!(writer, "\"Density\"")?;
    writeln!(writer, "0")?;
    writeln!(writer, "3")?;
    writeln!(writer, "0")?;
    writeln!(writer, "1")?;
    writeln!(writer, "{}", grid.num_elements())?;

    for i in 0..grid.num_elements() {
        let mut value = grid.density(i)?;
        if value <= NUMERICAL_ZERO {
            value = 0.0;
        }

        writeln!(writer, "{} {}", i + 1, value)?;
    }

    write!(writer, "$EndElementData")?;

    Ok(())
}

/// Write a `$NodeData` section carrying a scalar (N×1) or vector (N×2,
/// N×3) nodal field; 2-vectors are padded with a trailing zero.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if the field is not 1-, 2-, or 3-column.
pub fn write_gmsh_nodal_field<W: Write>(
    writer: &mut W,
    field: &DMatrix<f64>,
    name: &str,
) -> Result<()> {
    if !(1..=3).contains(&field.ncols()) {
        return Err(Error::InvalidArgument(format!(
            "field number of columns ({}) must be 1, 2, or 3",
            field.ncols()
        )));
    }

    writeln!(writer, "$NodeData")?;

    if name.is_empty() {
        writeln!(writer, "0")?;
    } else {
        writeln!(writer, "1")?;
        writeln!(writer, "\"{}\"", name)?;
    }

    writeln!(writer, "0")?;
    writeln!(writer, "3")?;
    writeln!(writer, "0")?;
    writeln!(writer, "{}", if field.ncols() == 1 { 1 } else { 3 })?;
    writeln!(writer, "{}", field.nrows())?;

    for i in 0..field.nrows() {
        write!(writer, "{}", i + 1)?;
        for j in 0..field.ncols() {
            write!(writer, " {}", field[(i, j)])?;
        }
        if field.ncols() == 2 {
            write!(writer, " 0")?;
        }
        writeln!(writer)?;
    }

    write!(writer, "$EndNodeData")?;

    Ok(())
}

fn check_msh_extension(path: &Path) -> Result<()> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("msh") {
        return Err(Error::InvalidArgument(format!(
            "file extension of {} must be \".msh\"",
            path.display()
        )));
    }

    Ok(())
}

/// Write a grid to a Gmsh file, optionally including densities.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if the extension is not `.msh`;
/// [`Error::Io`] if the file cannot be written.
pub fn save_grid<P: AsRef<Path>, E: GridTopology>(
    grid: &Grid<E>,
    path: P,
    save_densities: bool,
) -> Result<()> {
    let path = path.as_ref();
    check_msh_extension(path)?;

    let mut file = std::fs::File::create(path)?;

    write_gmsh_header(&mut file)?;
    write!(file, "\n\n")?;
    write_gmsh_nodes(&mut file, grid)?;
    write!(file, "\n\n")?;
    write_gmsh_elements(&mut file, grid)?;

    if save_densities {
        write!(file, "\n\n")?;
        write_gmsh_densities(&mut file, grid)?;
    }

    writeln!(file)?;

    Ok(())
}

/// Write a grid and one nodal field to a Gmsh file.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if the extension is not `.msh` or the field
/// row count does not equal the node count; [`Error::Io`] on write failure.
pub fn save_grid_and_field<P: AsRef<Path>, E: GridTopology>(
    grid: &Grid<E>,
    field: &DMatrix<f64>,
    path: P,
    name: &str,
) -> Result<()> {
    let path = path.as_ref();
    check_msh_extension(path)?;

    if field.nrows() != grid.num_nodes() {
        return Err(Error::InvalidArgument(format!(
            "field size ({}) must equal number of grid nodes ({})",
            field.nrows(),
            grid.num_nodes()
        )));
    }

    let mut file = std::fs::File::create(path)?;

    write_gmsh_header(&mut file)?;
    write!(file, "\n\n")?;
    write_gmsh_nodes(&mut file, grid)?;
    write!(file, "\n\n")?;
    write_gmsh_elements(&mut file, grid)?;
    write!(file, "\n\n")?;
    write_gmsh_nodal_field(&mut file, field, name)?;
    writeln!(file)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Hex20Grid, Hex8Grid, Quad4Grid, Quad8Grid};

    fn to_string(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header() {
        let mut buffer = Vec::new();
        write_gmsh_header(&mut buffer).unwrap();
        assert_eq!(to_string(buffer), "$MeshFormat\n4.1 0 8\n$EndMeshFormat");
    }

    #[test]
    fn test_nodes_pad_2d_with_zero_z() {
        let grid = Quad4Grid::new(&[1, 1], &[2.0, 2.0]).unwrap();

        let mut buffer = Vec::new();
        write_gmsh_nodes(&mut buffer, &grid).unwrap();
        let text = to_string(buffer);

        assert!(text.starts_with("$Nodes\n1 4 1 4\n2 1 0 4\n"));
        assert!(text.contains("\n0 0 0\n"));
        assert!(text.contains("\n2 2 0\n"));
        assert!(text.ends_with("$EndNodes"));
    }

    #[test]
    fn test_element_type_ids_and_ordering() {
        // Quad4 (type 3): identity ordering
        let grid = Quad4Grid::new(&[1, 1], &[1.0, 1.0]).unwrap();
        let mut buffer = Vec::new();
        write_gmsh_elements(&mut buffer, &grid).unwrap();
        let text = to_string(buffer);
        assert!(text.contains("\n2 1 3 1\n"));
        assert!(text.contains("\n1 1 2 4 3\n"));

        // Quad8 (type 16): identity ordering
        let grid = Quad8Grid::new(&[1, 1], &[1.0, 1.0]).unwrap();
        let mut buffer = Vec::new();
        write_gmsh_elements(&mut buffer, &grid).unwrap();
        let text = to_string(buffer);
        assert!(text.contains("\n2 1 16 1\n"));
        assert!(text.contains("\n1 1 2 4 3 5 8 6 7\n"));

        // Hex8 (type 5): permuted ordering {0,1,5,4,3,2,6,7}
        let grid = Hex8Grid::new(&[1, 1, 1], &[1.0, 1.0, 1.0]).unwrap();
        let mut buffer = Vec::new();
        write_gmsh_elements(&mut buffer, &grid).unwrap();
        let text = to_string(buffer);
        assert!(text.contains("\n3 1 5 1\n"));
        assert!(text.contains("\n1 1 2 6 5 3 4 8 7\n"));

        // Hex20 (type 17)
        let grid = Hex20Grid::new(&[1, 1, 1], &[1.0, 1.0, 1.0]).unwrap();
        let mut buffer = Vec::new();
        write_gmsh_elements(&mut buffer, &grid).unwrap();
        let text = to_string(buffer);
        assert!(text.contains("\n3 1 17 1\n"));
    }

    #[test]
    fn test_densities_report_floor_as_zero() {
        let mut grid = Quad4Grid::new(&[2, 1], &[1.0, 1.0]).unwrap();
        grid.set_density(1, 0.5).unwrap();

        let mut buffer = Vec::new();
        write_gmsh_densities(&mut buffer, &grid).unwrap();
        let text = to_string(buffer);

        assert!(text.contains("\"Density\""));
        assert!(text.contains("\n1 0\n"));
        assert!(text.contains("\n2 0.5\n"));
    }

    #[test]
    fn test_nodal_field_shapes() {
        // Scalar field
        let field = DMatrix::from_column_slice(2, 1, &[1.5, 2.5]);
        let mut buffer = Vec::new();
        write_gmsh_nodal_field(&mut buffer, &field, "potential").unwrap();
        let text = to_string(buffer);
        assert!(text.contains("\"potential\""));
        assert!(text.contains("\n1\n2\n1 1.5\n2 2.5\n"));

        // 2-vector field is padded to 3D
        let field = DMatrix::from_row_slice(1, 2, &[0.5, -0.5]);
        let mut buffer = Vec::new();
        write_gmsh_nodal_field(&mut buffer, &field, "").unwrap();
        let text = to_string(buffer);
        assert!(text.contains("\n3\n1\n1 0.5 -0.5 0\n"));

        // Too many columns
        let field = DMatrix::zeros(1, 4);
        assert!(write_gmsh_nodal_field(&mut Vec::new(), &field, "").is_err());
    }

    #[test]
    fn test_save_grid_rejects_bad_extension() {
        let grid = Quad4Grid::new(&[1, 1], &[1.0, 1.0]).unwrap();
        let path = std::env::temp_dir().join("unicell_grid.txt");

        assert!(matches!(
            save_grid(&grid, &path, false),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_save_grid_and_field_round_trip() {
        let grid = Quad4Grid::new(&[1, 1], &[1.0, 1.0]).unwrap();
        let path = std::env::temp_dir().join("unicell_grid_field.msh");

        // Field row count must match the node count
        let bad = DMatrix::zeros(3, 1);
        assert!(save_grid_and_field(&grid, &bad, &path, "phi").is_err());

        let field = DMatrix::from_column_slice(4, 1, &[0.0, 1.0, 2.0, 3.0]);
        save_grid_and_field(&grid, &field, &path, "phi").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("$MeshFormat"));
        assert!(text.contains("$Nodes"));
        assert!(text.contains("$Elements"));
        assert!(text.contains("$NodeData"));
        assert!(text.contains("\"phi\""));

        std::fs::remove_file(&path).ok();
    }
}
