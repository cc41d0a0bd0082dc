//! Plain-text greyscale images (netpbm `P2`)
//!
//! Values are written rounded to the nearest integer, with negative values
//! clipped to 0. Rows of the grid are rows of the image.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;

use super::{Error, Result};
use crate::utils::max_value;
use crate::Grid;

pub fn write(grid: &Grid, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_to(grid, &mut out)?;
    out.flush()?;
    Ok(())
}

pub fn write_to(grid: &Grid, out: &mut impl Write) -> Result<()> {
    let (rows, cols) = grid.dim();
    let max = max_value(grid).max(0.0).round() as u64;
    writeln!(out, "P2")?;
    writeln!(out, "{cols} {rows}")?;
    writeln!(out, "{max}")?;
    for row in grid.rows() {
        let line = row.iter()
            .map(|v| v.max(0.0).round() as u64)
            .join(" ");
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub fn read(path: &Path) -> Result<Grid> {
    read_from(BufReader::new(File::open(path)?))
}

/// Parse a `P2` image. Everything following `#` on a line is ignored.
pub fn read_from(input: impl BufRead) -> Result<Grid> {
    let mut tokens = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("");
        tokens.extend(content.split_whitespace().map(|t| (index + 1, t.to_string())));
    }
    let mut tokens = tokens.into_iter();

    match tokens.next() {
        Some((_, magic)) if magic == "P2" => {},
        Some((line, other)) => return Err(Error::Parse { line, message: format!("expected `P2`, found `{other}`") }),
        None => return Err(Error::Format("empty file".into())),
    }
    let mut dimension = |what: &str| -> Result<usize> {
        let (line, token) = tokens.next()
            .ok_or_else(|| Error::Format(format!("file ends before {what}")))?;
        token.parse::<usize>()
            .map_err(|e| Error::Parse { line, message: format!("{what} `{token}`: {e}") })
    };
    let cols = dimension("width" )?;
    let rows = dimension("height")?;
    let size = rows.checked_mul(cols)
        .ok_or_else(|| Error::Format(format!("image of {cols} x {rows} pixels is too large")))?;

    let mut number = |what: &str| -> Result<f64> {
        let (line, token) = tokens.next()
            .ok_or_else(|| Error::Format(format!("file ends before {what}")))?;
        token.parse::<f64>()
            .map_err(|e| Error::Parse { line, message: format!("{what} `{token}`: {e}") })
    };
    let _max = number("maximum value")?;

    let data = (0..size)
        .map(|_| number("pixel value"))
        .collect::<Result<Vec<_>>>()?;
    if let Some((line, extra)) = tokens.next() {
        return Err(Error::Parse { line, message: format!("unexpected trailing `{extra}`") });
    }
    Grid::from_shape_vec((rows, cols), data).map_err(|e| Error::Format(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_rounds_and_clips() -> Result<()> {
        let grid = array![[0.4, 2.6, -3.0],
                          [7.0, 1.5, 0.0]];
        let mut out = Vec::new();
        write_to(&grid, &mut out)?;
        let text = String::from_utf8(out).map_err(|e| Error::Format(e.to_string()))?;
        assert_eq!(text, "P2\n3 2\n7\n0 3 0\n7 2 0\n");
        Ok(())
    }

    #[test]
    fn read_with_comments() -> Result<()> {
        let text = "P2\n# made by hand\n2 3 # width height\n9\n1 2\n3 4\n5 9\n";
        let grid = read_from(text.as_bytes())?;
        assert_eq!(grid, array![[1.0, 2.0], [3.0, 4.0], [5.0, 9.0]]);
        Ok(())
    }

    #[test]
    fn file_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("image.pgm");
        let grid = array![[0.0, 10.0, 20.0], [30.0, 40.0, 255.0]];
        write(&grid, &path)?;
        assert_eq!(read(&path)?, grid);
        Ok(())
    }

    #[test]
    fn reject_bad_input() {
        assert!(matches!(read_from("P5\n1 1\n1\n0\n".as_bytes()), Err(Error::Parse { line: 1, .. })));
        assert!(matches!(read_from("P2\n2 2\n1\n0 1\nx 1\n".as_bytes()), Err(Error::Parse { line: 5, .. })));
        assert!(matches!(read_from("P2\n2 2\n1\n0 1\n".as_bytes()), Err(Error::Format(_))));
        assert!(matches!(read_from("".as_bytes()), Err(Error::Format(_))));
    }

    #[test]
    fn reject_bad_dimensions() {
        assert!(matches!(read_from("P2\n1e19 1e19\n1\n0\n".as_bytes()), Err(Error::Parse { line: 2, .. })));
        assert!(matches!(read_from("P2\n-2 2\n1\n0 1\n0 1\n".as_bytes()), Err(Error::Parse { line: 2, .. })));
        let huge = format!("P2\n{} {}\n1\n0\n", usize::MAX, 2);
        assert!(matches!(read_from(huge.as_bytes()), Err(Error::Format(_))));
    }
}
