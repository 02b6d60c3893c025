// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input not found: {}", .path.display())]
    InputNotFound { path: PathBuf },
    #[error("failed to read input: {source}")]
    InputUnreadable {
        #[from]
        source: std::io::Error,
    },
    #[error("malformed input{}: {}", at_line(.line), .reason)]
    MalformedInput { line: Option<u64>, reason: String },
    #[error("failed to write {}: {}", .path.display(), .reason)]
    OutputWriteError { path: PathBuf, reason: String },
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl Error {
    pub(crate) fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            line: Some(line),
            reason: reason.into(),
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::OutputWriteError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

fn at_line(line: &Option<u64>) -> String {
    match line {
        Some(line) => format!(" at line {}", line),
        None => String::new(),
    }
}
