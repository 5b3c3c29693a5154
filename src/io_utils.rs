//! I/O utilities for delimited text reading and encoding fallback.
//!
//! All delimited-text input flows through this module. It provides:
//!
//! - **Encoding fallback**: strict decoding against an ordered list of
//!   candidate encodings (UTF-8 first, then GBK) via `encoding_rs`,
//!   with a lossy UTF-8 pass as the last resort.
//! - **Reader construction**: `open_csv_reader` with a fixed, flexible layout
//!   so short records can be padded by the caller.
//! - **Record collection**: header and body rows as owned strings.

use std::{borrow::Cow, fs, io::Read, path::Path};

use anyhow::{Context, Result};
use encoding_rs::{Encoding, GBK, UTF_8};
use log::{debug, warn};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Candidate encodings for CSV input, tried in order. `encoding_rs` decodes
/// GBK with the full gb18030 decoder and maps the gb2312 label onto it, so a
/// single entry covers the whole GBK family.
pub const CSV_ENCODINGS: &[&Encoding] = &[UTF_8, GBK];

pub fn read_input_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Opening input file {path:?}"))
}

/// Decodes `bytes` without replacement, returning `None` when any sequence is
/// invalid for `encoding`. A leading BOM is removed.
pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| strip_bom(text).into_owned())
}

/// Decodes `bytes` as UTF-8, replacing undecodable sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_without_bom_handling(bytes);
    if had_errors {
        warn!("Replaced undecodable bytes while reading input as UTF-8");
    }
    strip_bom(text).into_owned()
}

/// Tries each candidate encoding in order and falls back to lossy UTF-8.
/// Returns the decoded text and the name of the encoding that produced it.
pub fn decode_with_fallback(
    bytes: &[u8],
    encodings: &[&'static Encoding],
) -> (String, &'static str) {
    for encoding in encodings {
        if let Some(text) = decode_strict(bytes, encoding) {
            debug!("Decoded input as {}", encoding.name());
            return (text, encoding.name());
        }
        debug!("Input is not valid {}", encoding.name());
    }
    (decode_lossy(bytes), UTF_8.name())
}

fn strip_bom(text: Cow<'_, str>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
        Cow::Owned(s) => match s.strip_prefix('\u{feff}') {
            Some(stripped) => Cow::Owned(stripped.to_string()),
            None => Cow::Owned(s),
        },
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Reads the header and every record of delimited `text`.
pub fn read_delimited(text: &str, delimiter: u8) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = open_csv_reader(text.as_bytes(), delimiter);
    let headers = reader
        .headers()
        .context("Reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok((headers, rows))
}
