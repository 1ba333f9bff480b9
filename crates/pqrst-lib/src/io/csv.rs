use super::text::parse_voltage;
use crate::signal::Sample;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

/// Read `(time, voltage)` pairs from a two-column CSV. A header row is
/// detected by a non-numeric first field. Empty or `nan`/`null` voltages
/// mark missing samples.
pub fn read_pairs<R: Read>(reader: R) -> Result<Vec<Sample>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader);
    let mut out = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading row {}", idx + 1))?;
        let Some(time_field) = record.get(0) else {
            continue;
        };
        let time = match time_field.parse::<f64>() {
            Ok(time) => time,
            Err(_) if idx == 0 => continue,
            Err(_) => anyhow::bail!("row {} has a non-numeric time: {}", idx + 1, time_field),
        };
        let voltage = parse_voltage(record.get(1).unwrap_or(""))
            .with_context(|| format!("row {} has a non-numeric voltage", idx + 1))?;
        out.push(Sample::new(time, voltage));
    }
    if out.is_empty() {
        anyhow::bail!("no samples found");
    }
    Ok(out)
}

/// Read `(time, voltage)` pairs from a CSV file.
pub fn read_pairs_file(path: &Path) -> Result<Vec<Sample>> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_pairs(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_pairs_with_header_and_gaps() {
        let text = "time,voltage\n0,0.1\n1, 0.2\n2,\n3,nan\n4,-0.3\n";
        let pairs = read_pairs(text.as_bytes()).expect("read");
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[1], Sample::new(1.0, 0.2));
        assert!(pairs[2].is_missing());
        assert!(pairs[3].is_missing());
        assert_eq!(pairs[4].voltage, -0.3);
    }

    #[test]
    fn rejects_bad_rows() {
        assert!(read_pairs("0,0.1\nx,0.2\n".as_bytes()).is_err());
        assert!(read_pairs("0,abc\n".as_bytes()).is_err());
        assert!(read_pairs("time,voltage\n".as_bytes()).is_err());
    }
}
