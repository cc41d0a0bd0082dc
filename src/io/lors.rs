//! Whitespace-separated LOR lists: one coincidence per line, written as
//! `x1 y1 z1 t1 x2 y2 z2 t2` (cm and ps). Blank lines and lines starting with
//! `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Error, Result};
use crate::lor::{Hit, Lor};

pub fn read(path: &Path) -> Result<Vec<Lor>> {
    read_from(BufReader::new(File::open(path)?))
}

pub fn read_from(input: impl BufRead) -> Result<Vec<Lor>> {
    let mut lors = vec![];
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue }
        lors.push(parse_lor(line).map_err(|message| Error::Parse { line: index + 1, message })?);
    }
    Ok(lors)
}

fn parse_lor(s: &str) -> std::result::Result<Lor, String> {
    let n = s.split_whitespace()
        .map(|t| t.parse::<f32>().map_err(|e| format!("`{t}`: {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if n.len() != 8 {
        return Err(format!("expected 8 numbers, found {}", n.len()));
    }
    let p1 = Hit { x: n[0], y: n[1], z: n[2], t: n[3] };
    let p2 = Hit { x: n[4], y: n[5], z: n[6], t: n[7] };
    Ok(Lor::new(p1, p2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_lor_list() -> Result<()> {
        let text = "# x1 y1 z1 t1 x2 y2 z2 t2\n\
                    1 2 3 4 5 6 7 8\n\
                    \n\
                    -1.5 0 0 100   1.5 0 0 -100\n";
        let lors = read_from(text.as_bytes())?;
        assert_eq!(lors.len(), 2);
        assert_eq!(lors[0].p2, Hit { x: 5.0, y: 6.0, z: 7.0, t: 8.0 });
        assert_eq!(lors[1].p1, Hit { x: -1.5, y: 0.0, z: 0.0, t: 100.0 });
        Ok(())
    }

    #[test]
    fn report_bad_line() {
        let text = "1 2 3 4 5 6 7 8\n1 2 3\n";
        assert!(matches!(read_from(text.as_bytes()), Err(Error::Parse { line: 2, .. })));
        let text = "1 2 3 4 5 6 7 eight\n";
        assert!(matches!(read_from(text.as_bytes()), Err(Error::Parse { line: 1, .. })));
    }

    #[test]
    fn read_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lors.txt");
        std::fs::write(&path, "0 0 0 0 1 1 1 1\n")?;
        assert_eq!(read(&path)?.len(), 1);
        Ok(())
    }
}
