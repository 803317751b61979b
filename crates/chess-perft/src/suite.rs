//! Perft suites loaded from TOML files.
//!
//! A suite is a list of `[[position]]` tables, each naming a FEN, the
//! variant to interpret it in and the expected node counts from depth 1
//! upwards.

use chess_core::{parse_fen, FenError};
use chess_rules::{perft, Position, PositionError, Rules};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur when loading a suite or setting up its positions.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// Failed to read the suite file from disk.
    #[error("Failed to read suite file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the suite file as valid TOML.
    #[error("Failed to parse suite: {0}")]
    ParseError(#[from] toml::de::Error),
    /// An entry's FEN does not parse.
    #[error("{name}: invalid FEN: {source}")]
    Fen {
        name: String,
        #[source]
        source: FenError,
    },
    /// An entry's FEN parses but is not a legal position for its variant.
    #[error("{name}: {source}")]
    Position {
        name: String,
        #[source]
        source: PositionError,
    },
}

/// One position with its expected perft counts.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SuiteEntry {
    pub name: String,
    /// Variant name as accepted by [`Rules`]. Defaults to "chess".
    #[serde(default = "default_variant")]
    pub variant: String,
    pub fen: String,
    /// Expected node counts, `counts[0]` being depth 1.
    #[serde(default)]
    pub counts: Vec<u64>,
}

fn default_variant() -> String {
    "chess".to_string()
}

/// A list of suite entries.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Suite {
    #[serde(default, rename = "position")]
    pub positions: Vec<SuiteEntry>,
}

/// A depth whose node count disagrees with the suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub name: String,
    pub depth: u32,
    pub expected: u64,
    pub actual: u64,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} depth {}: expected {}, got {}",
            self.name, self.depth, self.expected, self.actual
        )
    }
}

impl Suite {
    /// Loads a suite from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses a suite from TOML text.
    pub fn parse(content: &str) -> Result<Self, SuiteError> {
        Ok(toml::from_str(content)?)
    }

    /// Runs every entry up to `max_depth` (or all listed depths) and
    /// collects the mismatches.
    pub fn run(&self, max_depth: Option<u32>) -> Result<Vec<Mismatch>, SuiteError> {
        let mut mismatches = Vec::new();
        for entry in &self.positions {
            mismatches.extend(entry.run(max_depth)?);
        }
        Ok(mismatches)
    }
}

impl SuiteEntry {
    /// The variant this entry is played in.
    pub fn rules(&self) -> Result<Rules, SuiteError> {
        self.variant.parse().map_err(|source| SuiteError::Position {
            name: self.name.clone(),
            source,
        })
    }

    /// Builds the entry's position.
    pub fn position(&self) -> Result<Position, SuiteError> {
        let rules = self.rules()?;
        let setup = parse_fen(&self.fen).map_err(|source| SuiteError::Fen {
            name: self.name.clone(),
            source,
        })?;
        Position::from_setup(&setup, rules).map_err(|source| SuiteError::Position {
            name: self.name.clone(),
            source,
        })
    }

    /// Counts nodes for each listed depth, stopping after `max_depth`.
    pub fn run(&self, max_depth: Option<u32>) -> Result<Vec<Mismatch>, SuiteError> {
        let pos = self.position()?;
        let mut mismatches = Vec::new();

        for (depth, &expected) in (1u32..).zip(&self.counts) {
            if max_depth.is_some_and(|max| depth > max) {
                break;
            }
            let start = Instant::now();
            let actual = perft(&pos, depth);
            tracing::debug!(
                name = %self.name,
                depth,
                nodes = actual,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "perft"
            );
            if actual != expected {
                tracing::warn!(name = %self.name, depth, expected, actual, "node count mismatch");
                mismatches.push(Mismatch {
                    name: self.name.clone(),
                    depth,
                    expected,
                    actual,
                });
            }
        }

        tracing::info!(
            name = %self.name,
            variant = %pos.rules(),
            ok = mismatches.is_empty(),
            "finished"
        );
        Ok(mismatches)
    }
}
