//! Output formatting for CLI commands.
//!
//! Provides abstraction layer for outputting results in text or JSON format.

use anyhow::Result;
use mfs_core::{Hash, StatOutput};
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// The `data` parameter must be a serializable struct that includes
    /// `success: bool` and `result_code: u8` fields.
    ///
    /// The `text_fn` closure is called only in text mode to generate the
    /// human-readable output.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(&self.stdout, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(&self.stdout, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Write an error message to stderr.
    ///
    /// In JSON mode, writes a JSON error object with success=false.
    /// In text mode, writes the error chain on one line.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for `init` command.
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub result_code: u8,
    pub store: String,
    pub algorithm: String,
    pub format: String,
    pub mfs_root: Hash,
}

/// Object added during `add` command.
#[derive(Debug, Clone, Serialize)]
pub struct AddedObject {
    pub hash: Hash,
    pub path: String,
    pub size: u64,
}

/// Output for `add` command.
#[derive(Debug, Serialize)]
pub struct AddOutput {
    pub success: bool,
    pub result_code: u8,
    pub objects: Vec<AddedObject>,
}

/// Output for `cp` command.
#[derive(Debug, Serialize)]
pub struct CopyOutput {
    pub success: bool,
    pub result_code: u8,
    pub sources: Vec<String>,
    pub destination: String,
    pub mfs_root: Hash,
    pub flushed: bool,
}

/// Output for `stat` command.
#[derive(Debug, Serialize)]
pub struct StatCommandOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    #[serde(flatten)]
    pub stat: StatOutput,
}

/// Output for `mkdir` command.
#[derive(Debug, Serialize)]
pub struct MkdirOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    pub mfs_root: Hash,
}

/// Output for `root` command.
#[derive(Debug, Serialize)]
pub struct RootOutput {
    pub success: bool,
    pub result_code: u8,
    pub mfs_root: Hash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Hash>>,
}
