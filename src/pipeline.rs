//! Compilation Pipeline - Validated Entry Point
//!
//! CRITICAL: compile_book MUST call validate_book internally. No bypass.
//! The layout core below it never validates; this is the construction
//! step that does.

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::book::{BookSummary, GeneratedBook};
use crate::compiler::compile;
use crate::export::suggested_file_name;
use crate::hashing::{compute_book_hash, compute_manifest_hash};
use crate::layout::Document;
use crate::render::RandomShuffle;
use crate::validation::{FailureMode, ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read book: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Parse a book from its JSON form. Enum membership (trim size, level,
/// book type, exercise types) is enforced here.
pub fn parse_book(json: &str) -> Result<GeneratedBook, PipelineError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a book from a JSON file, or from stdin when `path` is `-`.
pub fn load_book(path: &Path) -> Result<GeneratedBook, PipelineError> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };
    parse_book(&content)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Seed for the matching display shuffle. Fresh entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub failure_mode: FailureMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledDocument {
    pub id: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub book_hash: String,
    pub manifest_hash: String,
    pub file_name: String,
    pub summary: BookSummary,
    pub validation: ValidationResult,
    pub document: Document,
}

/// The compilation pipeline - single entry point for validated compiles
pub struct CompilationPipeline {
    validator: Validator,
}

impl CompilationPipeline {
    pub fn new() -> Self {
        Self { validator: Validator::new() }
    }

    /// Validate a book's construction constraints
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_book(
        &self,
        book: &GeneratedBook,
        failure_mode: FailureMode,
    ) -> ValidationResult {
        self.validator.validate(book, failure_mode)
    }

    /// Compile a book into a document with its manifest
    ///
    /// CRITICAL: This ALWAYS calls validate_book first. No bypass possible.
    pub fn compile_book(
        &self,
        book: &GeneratedBook,
        options: &CompileOptions,
    ) -> Result<CompiledDocument, PipelineError> {
        // MANDATORY: Validation is always called. This is non-negotiable.
        let validation = self.validate_book(book, options.failure_mode);

        if !validation.valid {
            let messages: Vec<_> = validation
                .violations
                .iter()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .collect();
            return Err(PipelineError::ValidationFailed(messages.join("; ")));
        }

        // Seeded per call, never reused.
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let document = compile(book, &mut RandomShuffle(rng));

        let book_hash = compute_book_hash(book)?;
        info!(
            title = %book.config.title,
            pages = document.page_count(),
            book_hash = %book_hash,
            "compiled book"
        );

        let mut compiled = CompiledDocument {
            id: Uuid::new_v4().to_string(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            book_hash,
            manifest_hash: String::new(), // Computed after
            file_name: suggested_file_name(&book.config.title),
            summary: book.summary(),
            validation,
            document,
        };

        // Compute manifest hash (includes everything)
        compiled.manifest_hash = compute_manifest_hash(&compiled)?;

        Ok(compiled)
    }
}

impl Default for CompilationPipeline {
    fn default() -> Self {
        Self::new()
    }
}
