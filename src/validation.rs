//! Validation System - Rule/Policy Separation
//!
//! Construction-time checks on a book before it reaches the compiler.
//! Rules produce structured violations.
//! Policy maps violations to actions.

use serde::{Deserialize, Serialize};

use crate::book::{ChoiceQuestion, ExerciseBody, GeneratedBook, PrintableItem};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Block,
    Warn,
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub book_title: String,
}

impl ValidationResult {
    pub fn success(book: &GeneratedBook) -> Self {
        Self::with(book, true, vec![])
    }

    pub fn failure(book: &GeneratedBook, violations: Vec<ValidationViolation>) -> Self {
        Self::with(book, false, violations)
    }

    fn with(book: &GeneratedBook, valid: bool, violations: Vec<ValidationViolation>) -> Self {
        Self { valid, violations, book_title: book.config.title.clone() }
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, book: &GeneratedBook) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

/// Character-count bounds on one config field.
pub struct LengthRule {
    name: &'static str,
    field: fn(&GeneratedBook) -> &str,
    min: usize,
    max: usize,
}

impl LengthRule {
    pub fn title() -> Self {
        Self { name: "title_length", field: |b| b.config.title.as_str(), min: 3, max: 100 }
    }

    pub fn topic() -> Self {
        Self { name: "topic_length", field: |b| b.config.topic.as_str(), min: 3, max: 200 }
    }

    pub fn author_name() -> Self {
        Self {
            name: "author_name_length",
            field: |b| b.config.author_name.as_str(),
            min: 1,
            max: 100,
        }
    }
}

impl ValidationRule for LengthRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&self, book: &GeneratedBook) -> Vec<ValidationViolation> {
        let len = (self.field)(book).chars().count();
        if (self.min..=self.max).contains(&len) {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message: "Field length out of range".to_string(),
            expected: Some(format!("{}-{} characters", self.min, self.max)),
            actual: Some(format!("{} characters", len)),
            remediation: vec!["Shorten or extend the field to fit the range".to_string()],
        }]
    }
}

pub struct PageCountRule;

impl ValidationRule for PageCountRule {
    fn name(&self) -> &'static str {
        "page_count"
    }

    fn validate(&self, book: &GeneratedBook) -> Vec<ValidationViolation> {
        let count = book.config.page_count;
        if (20..=200).contains(&count) {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message: "Page count out of range".to_string(),
            expected: Some("20-200 pages".to_string()),
            actual: Some(format!("{} pages", count)),
            remediation: vec!["Choose a page count between 20 and 200".to_string()],
        }]
    }
}

pub struct ExerciseTypesRule;

impl ValidationRule for ExerciseTypesRule {
    fn name(&self) -> &'static str {
        "exercise_types"
    }

    fn validate(&self, book: &GeneratedBook) -> Vec<ValidationViolation> {
        let count = book.config.exercise_types.len();
        if (2..=10).contains(&count) {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message: "Wrong number of exercise types".to_string(),
            expected: Some("2-10 exercise types".to_string()),
            actual: Some(format!("{} exercise types", count)),
            remediation: vec!["Select between 2 and 10 exercise types".to_string()],
        }]
    }
}

/// Content that will print degraded. Never blocks.
pub struct ContentShapeRule;

impl ContentShapeRule {
    fn warning(&self, message: String, remediation: &str) -> ValidationViolation {
        ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Warning,
            message,
            expected: None,
            actual: None,
            remediation: vec![remediation.to_string()],
        }
    }
}

impl ValidationRule for ContentShapeRule {
    fn name(&self) -> &'static str {
        "content_shape"
    }

    fn validate(&self, book: &GeneratedBook) -> Vec<ValidationViolation> {
        let mut violations = vec![];

        for section in &book.sections {
            if section.exercises.is_empty() {
                violations.push(self.warning(
                    format!("Section '{}' has no exercises", section.title),
                    "Regenerate the section content",
                ));
            }

            for exercise in &section.exercises {
                match &exercise.body {
                    ExerciseBody::MultipleChoice(mc) => {
                        for (i, q) in mc.questions.iter().enumerate() {
                            if !q.is_printable() {
                                violations.push(self.warning(
                                    format!(
                                        "'{}' question {} needs text and {} options, has {}",
                                        exercise.title,
                                        i + 1,
                                        ChoiceQuestion::OPTION_COUNT,
                                        q.options.len()
                                    ),
                                    "Question will be omitted from the page",
                                ));
                            } else if q.correct_letter().is_none() {
                                violations.push(self.warning(
                                    format!(
                                        "'{}' question {} has no correct option in 0-3",
                                        exercise.title,
                                        i + 1
                                    ),
                                    "Question will be omitted from the answer key",
                                ));
                            }
                        }
                    }
                    ExerciseBody::Unrecognized { tag, .. } => {
                        violations.push(self.warning(
                            format!("'{}' has unrecognized type '{}'", exercise.title, tag),
                            "Only the exercise header will be printed",
                        ));
                    }
                    _ => {}
                }
            }
        }

        violations
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(LengthRule::title()),
                Box::new(LengthRule::topic()),
                Box::new(LengthRule::author_name()),
                Box::new(PageCountRule),
                Box::new(ExerciseTypesRule),
                Box::new(ContentShapeRule),
            ],
        }
    }

    pub fn validate(&self, book: &GeneratedBook, failure_mode: FailureMode) -> ValidationResult {
        let violations: Vec<_> = self.rules.iter().flat_map(|rule| rule.validate(book)).collect();
        if violations.is_empty() {
            return ValidationResult::success(book);
        }

        // Apply failure mode policy
        let has_errors = violations.iter().any(|v| v.severity == ViolationSeverity::Error);

        match failure_mode {
            FailureMode::Block if has_errors => ValidationResult::failure(book, violations),
            FailureMode::Block | FailureMode::Warn | FailureMode::Log => {
                // Warnings never block; Warn and Log only record
                ValidationResult::with(book, true, violations)
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
