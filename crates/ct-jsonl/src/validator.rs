use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use ct_core::core::{validate_record, LineOutcome, RecordError};

use crate::encoding::{has_bom, UTF8_BOM};

/// Fewest valid examples the fine-tuning service accepts.
pub const DEFAULT_MIN_EXAMPLES: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// A rejected line, numbered from 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineError {
    pub line: usize,
    pub error: RecordError,
}

impl LineError {
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}

/// Per-line counts from one pass over a file. Errors stay in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineTally {
    pub total_lines: usize,
    pub valid_count: usize,
    pub blank_count: usize,
    pub errors: Vec<LineError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub has_bom: bool,
    pub total_lines: usize,
    pub valid_count: usize,
    pub blank_count: usize,
    pub errors: Vec<LineError>,
}

impl ValidationReport {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn recommendation(&self, min_examples: usize) -> Recommendation {
        recommend(self.has_bom, self.valid_count, min_examples)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recommendation {
    ResaveWithBom,
    InsufficientExamples { found: usize, required: usize },
    Passes,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::ResaveWithBom => f.write_str(
                "Re-save the file using UTF-8 with BOM encoding before uploading for fine-tuning.",
            ),
            Recommendation::InsufficientExamples { found, required } => write!(
                f,
                "Fewer than {required} examples ({found} valid); the fine-tuning service will reject this file."
            ),
            Recommendation::Passes => {
                f.write_str("File passes validation and is suitable for fine-tuning upload.")
            }
        }
    }
}

/// Missing BOM outranks a low example count.
pub fn recommend(has_bom: bool, valid_count: usize, min_examples: usize) -> Recommendation {
    if !has_bom {
        Recommendation::ResaveWithBom
    } else if valid_count < min_examples {
        Recommendation::InsufficientExamples {
            found: valid_count,
            required: min_examples,
        }
    } else {
        Recommendation::Passes
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate every line of a training file in one sequential pass.
///
/// The file is only read. A leading BOM is reported, then stripped before the
/// first line is parsed.
pub fn validate_file(path: &Path) -> Result<ValidationReport, JsonlError> {
    let io_err = |source: io::Error| JsonlError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size_bytes = fs::metadata(path).map_err(io_err)?.len();
    let bom = has_bom(path).map_err(io_err)?;
    let file = File::open(path).map_err(io_err)?;
    let tally = validate_lines(BufReader::new(file)).map_err(io_err)?;

    Ok(ValidationReport {
        path: path.to_path_buf(),
        size_bytes,
        has_bom: bom,
        total_lines: tally.total_lines,
        valid_count: tally.valid_count,
        blank_count: tally.blank_count,
        errors: tally.errors,
    })
}

/// Validate newline-delimited records from any reader.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
pub fn validate_lines<R: BufRead>(reader: R) -> io::Result<LineTally> {
    let mut tally = LineTally::default();

    for (index, chunk) in reader.split(b'\n').enumerate() {
        let mut bytes = chunk?;
        if index == 0 && bytes.starts_with(&UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }

        for raw in bytes.split(|b| *b == b'\r') {
            tally.total_lines += 1;
            let line = tally.total_lines;

            let outcome = match std::str::from_utf8(raw) {
                Ok(text) => validate_record(text),
                Err(err) => LineOutcome::Invalid(RecordError::InvalidUtf8(err.to_string())),
            };

            match outcome {
                LineOutcome::Blank => tally.blank_count += 1,
                LineOutcome::Valid(_) => tally.valid_count += 1,
                LineOutcome::Invalid(error) => tally.errors.push(LineError { line, error }),
            }
        }
    }

    Ok(tally)
}
