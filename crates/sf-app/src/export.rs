//! CSV export of output signals.

use std::io::Write;
use std::path::{Path, PathBuf};

use sf_signal::Signal;

use crate::error::{AppError, AppResult};

/// Write `signal` as CSV: a header `x,ch0,ch1,...` then one row per sample.
pub fn write_csv<W: Write>(signal: &Signal, mut writer: W) -> AppResult<()> {
    write!(writer, "x")?;
    for ch in 0..signal.channels() {
        write!(writer, ",ch{ch}")?;
    }
    writeln!(writer)?;

    for k in 0..signal.len() {
        write!(writer, "{}", signal.x_at(k))?;
        for value in signal.row(k) {
            write!(writer, ",{value}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every output of a run to `dir` as `<system_id>_out<i>.csv`.
pub fn write_outputs_csv(dir: &Path, system_id: &str, outputs: &[Signal]) -> AppResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(outputs.len());
    for (i, signal) in outputs.iter().enumerate() {
        let path = dir.join(format!("{system_id}_out{i}.csv"));
        let file = std::fs::File::create(&path).map_err(|source| AppError::OutputWrite {
            path: path.clone(),
            source,
        })?;
        write_csv(signal, std::io::BufWriter::new(file))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_and_rows() {
        let signal = Signal::from_samples(0.0, 0.5, Default::default(), 2, vec![1.0, -1.0, 2.5, 0.0])
            .unwrap();
        let mut buf = Vec::new();
        write_csv(&signal, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "x,ch0,ch1\n0,1,-1\n0.5,2.5,0\n");
    }
}
