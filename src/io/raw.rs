/// Read / write grids as raw binary: two little-endian `u32`s (rows, columns)
/// followed by the values as little-endian `f32`s in row-major order.

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};
use std::path::Path;

use super::{Error, Result};
use crate::Grid;

pub fn write(grid: &Grid, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    let (rows, cols) = grid.dim();
    for n in [rows, cols] {
        let n = u32::try_from(n).map_err(|_| Error::Format(format!("grid dimension {n} too large")))?;
        buf.write_all(&n.to_le_bytes())?;
    }
    for &datum in grid.iter() {
        buf.write_all(&(datum as f32).to_le_bytes())?;
    }
    buf.flush()?;
    Ok(())
}

pub fn read(path: &Path) -> Result<Grid> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let mut buffer = [0; 4];

    let mut read_u32 = |buf: &mut BufReader<File>| -> Result<usize> {
        buf.read_exact(&mut buffer)?;
        Ok(u32::from_le_bytes(buffer) as usize)
    };
    let rows = read_u32(&mut buf)?;
    let cols = read_u32(&mut buf)?;

    let mut bytes = Vec::new();
    buf.read_to_end(&mut bytes)?;
    let expected = rows.checked_mul(cols).and_then(|n| n.checked_mul(4))
        .ok_or_else(|| Error::Format(format!("grid of {rows} x {cols} values is too large")))?;
    if bytes.len() != expected {
        return Err(Error::Format(format!("expected {expected} bytes for a {rows} x {cols} grid, found {}",
                                         bytes.len())));
    }
    let data = bytes.chunks_exact(4)
        .map(|chunk| {
            let mut value = [0; 4];
            value.copy_from_slice(chunk);
            f32::from_le_bytes(value) as f64
        })
        .collect();
    Grid::from_shape_vec((rows, cols), data).map_err(|e| Error::Format(e.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn raw_io_roundtrip() -> Result<()> {
        use tempfile::tempdir;
        #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

        // Harmless temporary location for output file
        let dir = tempdir()?;
        let file_path = dir.path().join("test.bin");

        // Some test data, exactly representable as f32
        let original = ndarray::array![[1.25, 4.5, 7.75], [-2.0, 0.0, 1e3]];

        write(&original, &file_path)?;
        let reloaded = read(&file_path)?;

        assert_eq!(original, reloaded);
        Ok(())
    }

    #[test]
    fn truncated_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join("short.bin");
        let mut bytes = Vec::new();
        bytes.extend(2_u32.to_le_bytes());
        bytes.extend(2_u32.to_le_bytes());
        bytes.extend(1.0_f32.to_le_bytes());
        std::fs::write(&file_path, bytes)?;
        assert!(matches!(read(&file_path), Err(Error::Format(_))));
        Ok(())
    }

    #[test]
    fn oversized_header() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join("huge.bin");
        let mut bytes = Vec::new();
        bytes.extend(u32::MAX.to_le_bytes());
        bytes.extend(u32::MAX.to_le_bytes());
        std::fs::write(&file_path, bytes)?;
        assert!(matches!(read(&file_path), Err(Error::Format(_))));
        Ok(())
    }
}
