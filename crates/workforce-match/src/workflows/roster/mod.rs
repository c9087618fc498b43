mod parser;

use crate::workflows::matching::Candidate;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read candidate roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid candidate roster CSV: {}", err),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads the recruiter's candidate roster export.
pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Candidate>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows without an id are skipped; for repeated ids the first row wins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Candidate>, RosterImportError> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for record in parser::parse_records(reader)? {
            let Some(candidate) = record.candidate else {
                debug!(line = record.line, "skipping roster row without an id");
                continue;
            };

            if !seen.insert(candidate.id.clone()) {
                debug!(line = record.line, candidate = %candidate.id, "skipping duplicate roster row");
                continue;
            }

            candidates.push(candidate);
        }

        Ok(candidates)
    }
}
