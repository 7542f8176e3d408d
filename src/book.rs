//! Book Model - The Generation Contract
//!
//! The typed shape every generated workbook must arrive in. The layout
//! core reads these values and never mutates them.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookType {
    GrammarWorkbook,
    VocabularyBuilder,
    ReadingComprehension,
    MixedSkills,
}

impl BookType {
    pub fn label(self) -> &'static str {
        match self {
            Self::GrammarWorkbook => "Grammar Workbook",
            Self::VocabularyBuilder => "Vocabulary Builder",
            Self::ReadingComprehension => "Reading Comprehension",
            Self::MixedSkills => "Mixed Skills",
        }
    }
}

/// CEFR difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub fn code(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::A1 => "A1 - Beginner",
            Self::A2 => "A2 - Elementary",
            Self::B1 => "B1 - Intermediate",
            Self::B2 => "B2 - Upper Intermediate",
            Self::C1 => "C1 - Advanced",
            Self::C2 => "C2 - Proficiency",
        }
    }
}

/// Physical trim size of the printed book.
///
/// The geometry for each value lives in [`crate::print`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrimSize {
    #[serde(rename = "6x9")]
    SixByNine,
    #[default]
    #[serde(rename = "8.5x11")]
    Letter,
}

impl TrimSize {
    pub const ALL: [TrimSize; 2] = [TrimSize::SixByNine, TrimSize::Letter];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SixByNine => "6x9",
            Self::Letter => "8.5x11",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    FillInBlank,
    MultipleChoice,
    Matching,
    WordSearch,
    SentenceReorder,
    ErrorCorrection,
    ReadingPassage,
    TrueFalse,
    ShortAnswer,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 9] = [
        ExerciseType::FillInBlank,
        ExerciseType::MultipleChoice,
        ExerciseType::Matching,
        ExerciseType::WordSearch,
        ExerciseType::SentenceReorder,
        ExerciseType::ErrorCorrection,
        ExerciseType::ReadingPassage,
        ExerciseType::TrueFalse,
        ExerciseType::ShortAnswer,
    ];

    /// Wire tag, as found in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FillInBlank => "fill_in_blank",
            Self::MultipleChoice => "multiple_choice",
            Self::Matching => "matching",
            Self::WordSearch => "word_search",
            Self::SentenceReorder => "sentence_reorder",
            Self::ErrorCorrection => "error_correction",
            Self::ReadingPassage => "reading_passage",
            Self::TrueFalse => "true_false",
            Self::ShortAnswer => "short_answer",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FillInBlank => "Fill in the Blank",
            Self::MultipleChoice => "Multiple Choice",
            Self::Matching => "Matching",
            Self::WordSearch => "Word Search",
            Self::SentenceReorder => "Sentence Reorder",
            Self::ErrorCorrection => "Error Correction",
            Self::ReadingPassage => "Reading Passage",
            Self::TrueFalse => "True / False",
            Self::ShortAnswer => "Short Answer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookConfig {
    pub title: String,
    pub book_type: BookType,
    pub level: CefrLevel,
    pub topic: String,
    /// Advisory only. Drives section count upstream, never read by layout.
    pub page_count: u32,
    #[serde(default)]
    pub trim_size: TrimSize,
    pub exercise_types: Vec<ExerciseType>,
    #[serde(default = "default_true")]
    pub include_answer_key: bool,
    pub author_name: String,
}

fn default_true() -> bool {
    true
}

impl BookConfig {
    /// Number of sections the generator is asked for.
    pub fn planned_section_count(&self) -> usize {
        std::cmp::max(3, (self.page_count / 10) as usize)
    }
}

// --- Exercise payloads ---
//
// Every field defaults so partially formed content still deserializes.
// Item lists decode element by element: an element that fails keeps its
// slot as an empty item, so its siblings survive and keep their numbers.

/// One numbered entry of an exercise body.
///
/// The renderer prints an item only when it is printable, and the answer
/// extractor never reports an answer for an item that was not printed.
pub trait PrintableItem {
    fn is_printable(&self) -> bool;
}

fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(vec![]),
        other => {
            warn!(found = %other, "expected a list of items, using none");
            return Ok(vec![]);
        }
    };
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                warn!(item = i + 1, error = %e, "malformed item, leaving it blank");
                T::default()
            })
        })
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillInBlank {
    #[serde(deserialize_with = "lenient_items")]
    pub sentences: Vec<BlankSentence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlankSentence {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl PrintableItem for BlankSentence {
    fn is_printable(&self) -> bool {
        !self.text.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultipleChoice {
    #[serde(deserialize_with = "lenient_items")]
    pub questions: Vec<ChoiceQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoiceQuestion {
    pub question: String,
    /// Exactly [`ChoiceQuestion::OPTION_COUNT`] when well formed.
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
}

impl ChoiceQuestion {
    pub const OPTION_COUNT: usize = 4;
    pub const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

    pub fn has_valid_options(&self) -> bool {
        self.options.len() == Self::OPTION_COUNT
    }

    pub fn correct_letter(&self) -> Option<char> {
        if !self.has_valid_options() {
            return None;
        }
        self.correct_index.and_then(|i| Self::LETTERS.get(i).copied())
    }
}

impl PrintableItem for ChoiceQuestion {
    fn is_printable(&self) -> bool {
        !self.question.is_empty() && self.has_valid_options()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Matching {
    #[serde(deserialize_with = "lenient_items")]
    pub pairs: Vec<MatchPair>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

impl PrintableItem for MatchPair {
    fn is_printable(&self) -> bool {
        !self.left.is_empty() && !self.right.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrueFalse {
    #[serde(deserialize_with = "lenient_items")]
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statement {
    pub statement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_true: Option<bool>,
}

impl PrintableItem for Statement {
    fn is_printable(&self) -> bool {
        !self.statement.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceReorder {
    #[serde(deserialize_with = "lenient_items")]
    pub sentences: Vec<ScrambledSentence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrambledSentence {
    pub scrambled: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<String>,
}

impl PrintableItem for ScrambledSentence {
    fn is_printable(&self) -> bool {
        !self.scrambled.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorCorrection {
    #[serde(deserialize_with = "lenient_items")]
    pub sentences: Vec<FaultySentence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaultySentence {
    pub incorrect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl PrintableItem for FaultySentence {
    fn is_printable(&self) -> bool {
        !self.incorrect.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingPassage {
    pub passage: String,
    #[serde(deserialize_with = "lenient_items")]
    pub questions: Vec<ComprehensionQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComprehensionQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl PrintableItem for ComprehensionQuestion {
    fn is_printable(&self) -> bool {
        !self.question.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortAnswer {
    #[serde(deserialize_with = "lenient_items")]
    pub questions: Vec<OpenQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_answer: Option<String>,
}

impl PrintableItem for OpenQuestion {
    fn is_printable(&self) -> bool {
        !self.question.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WordSearch {
    #[serde(deserialize_with = "lenient_items")]
    pub words: Vec<String>,
    /// Side length of the letter grid built by the print step.
    #[serde(deserialize_with = "lenient_grid_size")]
    pub grid_size: u8,
}

impl WordSearch {
    pub const DEFAULT_GRID_SIZE: u8 = 12;
}

impl Default for WordSearch {
    fn default() -> Self {
        Self { words: vec![], grid_size: Self::DEFAULT_GRID_SIZE }
    }
}

fn lenient_grid_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "malformed grid size, using default");
        WordSearch::DEFAULT_GRID_SIZE
    }))
}

/// Variant-specific part of an exercise.
///
/// `Unrecognized` keeps a tag this build does not know so the header can
/// still be printed and the content survives a round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseBody {
    FillInBlank(FillInBlank),
    MultipleChoice(MultipleChoice),
    Matching(Matching),
    TrueFalse(TrueFalse),
    SentenceReorder(SentenceReorder),
    ErrorCorrection(ErrorCorrection),
    ReadingPassage(ReadingPassage),
    ShortAnswer(ShortAnswer),
    WordSearch(WordSearch),
    Unrecognized { tag: String, content: Value },
}

impl ExerciseBody {
    pub fn kind(&self) -> Option<ExerciseType> {
        Some(match self {
            Self::FillInBlank(_) => ExerciseType::FillInBlank,
            Self::MultipleChoice(_) => ExerciseType::MultipleChoice,
            Self::Matching(_) => ExerciseType::Matching,
            Self::TrueFalse(_) => ExerciseType::TrueFalse,
            Self::SentenceReorder(_) => ExerciseType::SentenceReorder,
            Self::ErrorCorrection(_) => ExerciseType::ErrorCorrection,
            Self::ReadingPassage(_) => ExerciseType::ReadingPassage,
            Self::ShortAnswer(_) => ExerciseType::ShortAnswer,
            Self::WordSearch(_) => ExerciseType::WordSearch,
            Self::Unrecognized { .. } => return None,
        })
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Unrecognized { tag, .. } => tag.as_str(),
            other => other.kind().map_or("", ExerciseType::as_str),
        }
    }

    fn decode(tag: String, content: Value) -> Self {
        let Some(kind) = ExerciseType::from_tag(&tag) else {
            return Self::Unrecognized { tag, content };
        };
        match kind {
            ExerciseType::FillInBlank => Self::FillInBlank(decode_payload(&tag, content)),
            ExerciseType::MultipleChoice => Self::MultipleChoice(decode_payload(&tag, content)),
            ExerciseType::Matching => Self::Matching(decode_payload(&tag, content)),
            ExerciseType::TrueFalse => Self::TrueFalse(decode_payload(&tag, content)),
            ExerciseType::SentenceReorder => Self::SentenceReorder(decode_payload(&tag, content)),
            ExerciseType::ErrorCorrection => Self::ErrorCorrection(decode_payload(&tag, content)),
            ExerciseType::ReadingPassage => Self::ReadingPassage(decode_payload(&tag, content)),
            ExerciseType::ShortAnswer => Self::ShortAnswer(decode_payload(&tag, content)),
            ExerciseType::WordSearch => Self::WordSearch(decode_payload(&tag, content)),
        }
    }

    fn content(&self) -> Value {
        let encoded = match self {
            Self::FillInBlank(p) => serde_json::to_value(p),
            Self::MultipleChoice(p) => serde_json::to_value(p),
            Self::Matching(p) => serde_json::to_value(p),
            Self::TrueFalse(p) => serde_json::to_value(p),
            Self::SentenceReorder(p) => serde_json::to_value(p),
            Self::ErrorCorrection(p) => serde_json::to_value(p),
            Self::ReadingPassage(p) => serde_json::to_value(p),
            Self::ShortAnswer(p) => serde_json::to_value(p),
            Self::WordSearch(p) => serde_json::to_value(p),
            Self::Unrecognized { content, .. } => return content.clone(),
        };
        encoded.unwrap_or(Value::Null)
    }
}

fn decode_payload<T: DeserializeOwned + Default>(tag: &str, content: Value) -> T {
    match serde_json::from_value(content) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(
                exercise_type = tag,
                error = %e,
                "malformed exercise content, using empty payload"
            );
            T::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawExercise", into = "RawExercise")]
pub struct Exercise {
    pub title: String,
    pub instructions: String,
    pub body: ExerciseBody,
}

impl Exercise {
    pub fn new(
        title: impl Into<String>,
        instructions: impl Into<String>,
        body: ExerciseBody,
    ) -> Self {
        Self { title: title.into(), instructions: instructions.into(), body }
    }

    pub fn kind(&self) -> Option<ExerciseType> {
        self.body.kind()
    }

    /// Label printed under the exercise title.
    pub fn type_label(&self) -> &str {
        match self.body.kind() {
            Some(kind) => kind.label(),
            None => self.body.tag(),
        }
    }
}

/// Wire shape of an exercise: `{ type, title, instructions, content }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExercise {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub content: Value,
}

impl From<RawExercise> for Exercise {
    fn from(raw: RawExercise) -> Self {
        Self {
            title: raw.title,
            instructions: raw.instructions,
            body: ExerciseBody::decode(raw.kind, raw.content),
        }
    }
}

impl From<Exercise> for RawExercise {
    fn from(exercise: Exercise) -> Self {
        Self {
            kind: exercise.body.tag().to_string(),
            content: exercise.body.content(),
            title: exercise.title,
            instructions: exercise.instructions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSection {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// The sole input of the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedBook {
    pub config: BookConfig,
    #[serde(default)]
    pub sections: Vec<BookSection>,
}

impl GeneratedBook {
    pub fn exercise_count(&self) -> usize {
        self.sections.iter().map(|s| s.exercises.len()).sum()
    }

    pub fn summary(&self) -> BookSummary {
        let mut exercises_by_type = BTreeMap::new();
        for exercise in self.sections.iter().flat_map(|s| &s.exercises) {
            *exercises_by_type.entry(exercise.body.tag().to_string()).or_insert(0) += 1;
        }
        BookSummary {
            title: self.config.title.clone(),
            author_name: self.config.author_name.clone(),
            level: self.config.level,
            topic: self.config.topic.clone(),
            book_type: self.config.book_type,
            section_count: self.sections.len(),
            exercise_count: self.exercise_count(),
            exercises_by_type,
        }
    }
}

/// Listing metadata for a finished book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub title: String,
    pub author_name: String,
    pub level: CefrLevel,
    pub topic: String,
    pub book_type: BookType,
    pub section_count: usize,
    pub exercise_count: usize,
    pub exercises_by_type: BTreeMap<String, usize>,
}
