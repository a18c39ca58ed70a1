// SPDX-License-Identifier: AGPL-3.0-or-later
//! Parser and Renderer traits for format handlers, plus shared configuration

use crate::model::{FamilyGraph, ParseOutcome};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Error type for the crate
///
/// Malformed input is never an error: it degrades to a partial graph plus
/// diagnostics. Only invalid configuration and I/O fail.
#[derive(Debug, thiserror::Error)]
pub enum KindredError {
    #[error("Invalid configuration: {field} must be a positive finite number, got {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for KindredError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KindredError>;

/// Configuration for parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Re-scan raw lines for union records when the structured pass finds none
    pub structural_recovery: bool,
    /// Keep raw source on the graph
    pub preserve_raw_source: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            structural_recovery: true,
            preserve_raw_source: false,
        }
    }
}

/// Configuration for rendering a graph back to text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Emit a `HEAD` record
    pub header: bool,
    /// Emit a closing `TRLR` record
    pub trailer: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            header: true,
            trailer: true,
        }
    }
}

/// Parser trait: convert source text to a validated graph
pub trait Parser: Send + Sync {
    /// Parse a string. Never fails; problems are reported as diagnostics.
    fn parse(&self, input: &str, config: &ParseConfig) -> ParseOutcome;
}

/// Renderer trait: convert a graph to source text
pub trait Renderer: Send + Sync {
    fn render(&self, graph: &FamilyGraph, config: &RenderConfig) -> Result<String>;
}

/// Extension trait for streaming operations (not dyn-compatible)
pub trait ParserExt: Parser {
    /// Parse from a reader
    fn parse_reader<R: Read>(&self, reader: R, config: &ParseConfig) -> Result<ParseOutcome> {
        let mut input = String::new();
        let mut reader = reader;
        reader.read_to_string(&mut input)?;
        Ok(self.parse(&input, config))
    }
}

/// Extension trait for streaming operations (not dyn-compatible)
pub trait RendererExt: Renderer {
    /// Render to a writer
    fn render_writer<W: Write>(
        &self,
        graph: &FamilyGraph,
        writer: &mut W,
        config: &RenderConfig,
    ) -> Result<()> {
        let output = self.render(graph, config)?;
        writer.write_all(output.as_bytes())?;
        Ok(())
    }
}

// Blanket implementations
impl<T: Parser> ParserExt for T {}
impl<T: Renderer> RendererExt for T {}
