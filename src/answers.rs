//! Answer Extractor
//!
//! Reads the fields the renderer withholds. Independent of rendering:
//! matching answers always come from the stored pairs, never from a
//! display order.

use serde::{Deserialize, Serialize};

use crate::book::{BookSection, Exercise, ExerciseBody, PrintableItem};

/// Separator for answers short enough to share a line.
const INLINE: &str = "  ";
/// Separator for sentence-length answers.
const STACKED: &str = "\n";

/// Canonical answer text for `exercise`, or `None` when it has none.
///
/// Only items the renderer prints are answered. Items missing their answer
/// field are skipped and keep their number.
pub fn extract_answer(exercise: &Exercise) -> Option<String> {
    match &exercise.body {
        ExerciseBody::FillInBlank(c) => join(INLINE, &c.sentences, |s| s.blank.clone()),
        ExerciseBody::MultipleChoice(c) => {
            join(INLINE, &c.questions, |q| q.correct_letter().map(String::from))
        }
        ExerciseBody::TrueFalse(c) => join(INLINE, &c.statements, |s| {
            s.is_true.map(|t| String::from(if t { "True" } else { "False" }))
        }),
        ExerciseBody::SentenceReorder(c) => join(STACKED, &c.sentences, |s| s.correct.clone()),
        ExerciseBody::ErrorCorrection(c) => join(STACKED, &c.sentences, |s| {
            s.correct.as_ref().map(|correct| match s.error_type.as_deref() {
                Some(kind) if !kind.is_empty() => format!("{} ({})", correct, kind),
                _ => correct.clone(),
            })
        }),
        ExerciseBody::ReadingPassage(c) => join(STACKED, &c.questions, |q| q.answer.clone()),
        ExerciseBody::Matching(c) => join(INLINE, &c.pairs, |p| {
            Some(format!("{} \u{2192} {}", p.left, p.right))
        }),
        ExerciseBody::ShortAnswer(c) => join(STACKED, &c.questions, |q| q.sample_answer.clone()),
        ExerciseBody::WordSearch(_) | ExerciseBody::Unrecognized { .. } => None,
    }
}

fn join<T: PrintableItem>(
    sep: &str,
    items: &[T],
    answer: impl Fn(&T) -> Option<String>,
) -> Option<String> {
    let parts: Vec<String> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_printable())
        .filter_map(|(i, item)| {
            answer(item).filter(|a| !a.is_empty()).map(|a| format!("{}. {}", i + 1, a))
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(sep))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    /// Zero-based position of the exercise in its section.
    pub ordinal: usize,
    pub title: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSection {
    pub title: String,
    pub entries: Vec<AnswerEntry>,
}

/// Answer key in section/exercise order. Sections with nothing to
/// extract are left out.
pub fn answer_key(sections: &[BookSection]) -> Vec<AnswerSection> {
    sections
        .iter()
        .filter_map(|section| {
            let entries: Vec<AnswerEntry> = section
                .exercises
                .iter()
                .enumerate()
                .filter_map(|(ordinal, ex)| {
                    let answer = extract_answer(ex)?;
                    Some(AnswerEntry { ordinal, title: ex.title.clone(), answer })
                })
                .collect();
            (!entries.is_empty()).then(|| AnswerSection { title: section.title.clone(), entries })
        })
        .collect()
}
