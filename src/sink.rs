use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::scanner::AddressList;

#[derive(Serialize)]
struct JsonRecord<'a> {
    ip: &'a str,
    hostname: Option<&'a str>,
    status: &'static str,
}

/// Append every record of `list`, in list order, to the file at `path`.
///
/// The file is created if missing. CSV output gets a header only when the
/// file starts out empty. Returns the number of records written.
pub fn dump(list: &AddressList, path: &Path, format: OutputFormat) -> Result<usize> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Output {
            path: path.to_path_buf(),
            source,
        })?;

    // Check whether anything was written before this run
    let fresh = file.metadata().map(|m| m.len() == 0).unwrap_or(false);

    let mut out = BufWriter::new(file);
    let written = write_records(list, &mut out, format, fresh)?;
    out.flush()?;

    Ok(written)
}

/// Serialize `list` to `out`. Output depends only on the records, so writing
/// the same list twice produces the same bytes.
pub fn write_records<W: Write>(
    list: &AddressList,
    mut out: W,
    format: OutputFormat,
    with_header: bool,
) -> Result<usize> {
    match format {
        OutputFormat::Text => {
            for record in list {
                writeln!(
                    out,
                    "{} -> ({})",
                    record.as_str(),
                    record.hostname().display()
                )?;
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(out);

            if with_header {
                wtr.write_record(["ip", "hostname", "status"])?;
            }

            for record in list {
                wtr.write_record([
                    record.as_str(),
                    record.hostname().display(),
                    record.hostname().status(),
                ])?;
            }

            wtr.flush()?;
        }
        OutputFormat::Jsonl => {
            for record in list {
                let line = JsonRecord {
                    ip: record.as_str(),
                    hostname: record.hostname().name(),
                    status: record.hostname().status(),
                };
                serde_json::to_writer(&mut out, &line)?;
                out.write_all(b"\n")?;
            }
        }
    }

    Ok(list.len())
}
