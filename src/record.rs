// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};

use csv::{ReaderBuilder, StringRecord, Trim};

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const FIELDS: usize = 3;

/// One benchmark run: `lane_count,thread_count,elapsed_nanoseconds`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BenchmarkRecord {
    lane_count: u64,
    thread_count: u64,
    elapsed_ns: f64,
}

impl BenchmarkRecord {
    pub fn new(lane_count: u64, thread_count: u64, elapsed_ns: f64) -> Self {
        Self {
            lane_count,
            thread_count,
            elapsed_ns,
        }
    }

    pub fn lane_count(&self) -> u64 {
        self.lane_count
    }

    pub fn thread_count(&self) -> u64 {
        self.thread_count
    }

    pub fn elapsed_ns(&self) -> f64 {
        self.elapsed_ns
    }
}

/// Reads every record from the file at `path`.
pub fn load(path: &Path) -> Result<Vec<BenchmarkRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::from(e),
    })?;
    read(file)
}

/// Reads headerless comma separated records. Zero records is an error.
pub fn read<R: Read>(reader: R) -> Result<Vec<BenchmarkRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(csv_error)?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);
        records.push(parse(&row, line)?);
    }

    if records.is_empty() {
        return Err(Error::MalformedInput {
            line: None,
            reason: "no benchmark records".to_owned(),
        });
    }

    Ok(records)
}

fn parse(row: &StringRecord, line: u64) -> Result<BenchmarkRecord> {
    if row.len() != FIELDS {
        return Err(Error::malformed(
            line,
            format!("expected {} fields, found {}", FIELDS, row.len()),
        ));
    }

    let lane_count = field(row, 0, "lane count", line)?;
    let thread_count = field(row, 1, "thread count", line)?;
    let elapsed_ns: f64 = field(row, 2, "elapsed time", line)?;

    if !elapsed_ns.is_finite() || elapsed_ns <= 0.0 {
        return Err(Error::malformed(
            line,
            format!("elapsed time must be positive, got {}", elapsed_ns),
        ));
    }

    Ok(BenchmarkRecord::new(lane_count, thread_count, elapsed_ns))
}

fn field<T: std::str::FromStr>(
    row: &StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<T> {
    let value = &row[index];
    value
        .parse()
        .map_err(|_| Error::malformed(line, format!("invalid {}: {:?}", name, value)))
}

fn csv_error(e: csv::Error) -> Error {
    let line = e.position().map(|p| p.line());
    let reason = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(e) => Error::from(e),
        _ => Error::MalformedInput { line, reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(data: &str) -> Result<Vec<BenchmarkRecord>> {
        read(data.as_bytes())
    }

    fn malformed_line(result: Result<Vec<BenchmarkRecord>>) -> Option<u64> {
        match result {
            Err(Error::MalformedInput { line, .. }) => line,
            other => panic!("expected malformed input, got: {:?}", other),
        }
    }

    #[test]
    fn reads_rows_in_order() {
        let records = read_str("1,1,1000000000\n1,2,500000000\n2,1,2000000000\n").unwrap();
        assert_eq!(
            records,
            vec![
                BenchmarkRecord::new(1, 1, 1e9),
                BenchmarkRecord::new(1, 2, 5e8),
                BenchmarkRecord::new(2, 1, 2e9),
            ]
        );
    }

    #[test]
    fn tolerates_whitespace_and_exponents() {
        let records = read_str(" 8 , 4 , 1e9 \n\n16,4,2.5e9").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], BenchmarkRecord::new(8, 4, 1e9));
        assert_eq!(records[1].elapsed_ns(), 2.5e9);
    }

    #[test]
    fn wrong_field_count() {
        assert_eq!(malformed_line(read_str("1,1,100\n1,2\n")), Some(2));
        assert_eq!(malformed_line(read_str("1,1,100,7\n")), Some(1));
    }

    #[test]
    fn non_numeric_field() {
        assert_eq!(malformed_line(read_str("1,1,100\n2,two,100\n")), Some(2));
        assert_eq!(malformed_line(read_str("lanes,threads,nanos\n")), Some(1));
        assert_eq!(malformed_line(read_str("-1,1,100\n")), Some(1));
    }

    #[test]
    fn non_positive_elapsed() {
        assert_eq!(malformed_line(read_str("1,1,0\n")), Some(1));
        assert_eq!(malformed_line(read_str("1,1,-5\n")), Some(1));
        assert_eq!(malformed_line(read_str("1,1,NaN\n")), Some(1));
    }

    #[test]
    fn empty_input() {
        assert_eq!(malformed_line(read_str("")), None);
        assert_eq!(malformed_line(read_str("\n\n")), None);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        match load(&path) {
            Err(Error::InputNotFound { path: missing }) => assert_eq!(missing, path),
            other => panic!("expected input not found, got: {:?}", other),
        }
    }
}
