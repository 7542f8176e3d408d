//! Workbook Core - Workbook Layout Compiler
//!
//! # The Layout Rules (Non-Negotiable)
//! 1. Geometry Comes From The Trim Size
//! 2. Margins Mirror By Page Parity
//! 3. Input Order Is Output Order
//! 4. Answers Never Depend On Presentation
//! 5. One Bad Exercise Never Breaks The Book
//! 6. Randomness Is Injected, Never Ambient

pub mod book;
pub mod print;
pub mod layout;
pub mod render;
pub mod answers;
pub mod assembler;
pub mod compiler;
pub mod validation;
pub mod hashing;
pub mod export;
pub mod pipeline;

pub use book::{
    BookConfig, BookSection, BookType, CefrLevel, Exercise, ExerciseBody, ExerciseType,
    GeneratedBook, PrintableItem, TrimSize,
};
pub use print::{resolve, Margins, PageGeometry, PageParity};
pub use layout::{Block, Document, Page, PageKind, TextStyle};
pub use render::{render_exercise, ColumnShuffle, KeepOrder, RandomShuffle};
pub use answers::{answer_key, extract_answer, AnswerEntry, AnswerSection};
pub use compiler::{compile, compile_random, compile_seeded};
pub use validation::{
    FailureMode, ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity,
};
pub use hashing::{canonical_json, compute_book_hash, compute_manifest_hash};
pub use export::{suggested_file_name, text_proof};
pub use pipeline::{CompilationPipeline, CompileOptions, CompiledDocument, PipelineError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
