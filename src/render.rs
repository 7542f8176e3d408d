//! Exercise Renderer
//!
//! Turns one exercise into a layout block. Pure except for the matching
//! right column, which draws its order from an injected [`ColumnShuffle`].
//!
//! Answers are never printed here; see [`crate::answers`].

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::book::{
    ChoiceQuestion, ErrorCorrection, Exercise, ExerciseBody, FillInBlank, Matching, MultipleChoice,
    PrintableItem, ReadingPassage, SentenceReorder, ShortAnswer, TrueFalse, WordSearch,
};
use crate::layout::{Block, TextStyle};

/// Blank marker the generator writes into fill-in-blank sentences.
pub const BLANK_MARKER: &str = "___";
/// What the marker is widened to for handwriting.
pub const PRINT_BLANK: &str = "________";

const WORD_SEARCH_COLUMNS: u8 = 3;

/// Source of the matching exercise's display order.
pub trait ColumnShuffle {
    /// A permutation of `0..len`.
    fn permutation(&mut self, len: usize) -> Vec<usize>;
}

/// Production shuffle backed by any `rand` generator.
pub struct RandomShuffle<R: Rng>(pub R);

impl<R: Rng> ColumnShuffle for RandomShuffle<R> {
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.0);
        order
    }
}

/// Identity order. Prints the right column unshuffled.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOrder;

impl ColumnShuffle for KeepOrder {
    fn permutation(&mut self, len: usize) -> Vec<usize> {
        (0..len).collect()
    }
}

/// Render `exercise` as the `ordinal`-th (zero-based) exercise of its section.
pub fn render_exercise(
    exercise: &Exercise,
    ordinal: usize,
    shuffle: &mut dyn ColumnShuffle,
) -> Block {
    let mut children = vec![
        Block::text(TextStyle::ExerciseTitle, format!("{}. {}", ordinal + 1, exercise.title)),
        Block::text(TextStyle::ExerciseType, exercise.type_label()),
        Block::text(TextStyle::Instructions, exercise.instructions.as_str()),
    ];

    let body = match &exercise.body {
        ExerciseBody::FillInBlank(c) => fill_in_blank(c),
        ExerciseBody::MultipleChoice(c) => multiple_choice(c),
        ExerciseBody::Matching(c) => matching(c, shuffle),
        ExerciseBody::TrueFalse(c) => true_false(c),
        ExerciseBody::SentenceReorder(c) => sentence_reorder(c),
        ExerciseBody::ErrorCorrection(c) => error_correction(c),
        ExerciseBody::ReadingPassage(c) => reading_passage(c),
        ExerciseBody::ShortAnswer(c) => short_answer(c),
        ExerciseBody::WordSearch(c) => word_search(c),
        ExerciseBody::Unrecognized { tag, .. } => {
            warn!(
                exercise_type = %tag,
                title = %exercise.title,
                "unrecognized exercise type, printing header only"
            );
            vec![]
        }
    };

    children.extend(body);
    Block::unbreakable(children)
}

fn numbered(n: usize, text: &str) -> String {
    format!("{}. {}", n + 1, text)
}

fn item(text: String) -> Block {
    Block::text(TextStyle::Item, text)
}

/// Pairs each printable item with its index; the rest are logged and dropped.
fn printable<'a, T: PrintableItem + 'a>(
    kind: &'a str,
    items: &'a [T],
) -> impl Iterator<Item = (usize, &'a T)> + 'a {
    items.iter().enumerate().filter(move |(i, item)| {
        if !item.is_printable() {
            warn!(exercise_type = kind, item = i + 1, "skipping malformed item");
        }
        item.is_printable()
    })
}

fn fill_in_blank(c: &FillInBlank) -> Vec<Block> {
    printable("fill_in_blank", &c.sentences)
        .map(|(i, s)| {
            let mut line = numbered(i, &s.text.replacen(BLANK_MARKER, PRINT_BLANK, 1));
            if let Some(hint) = s.hint.as_deref().filter(|h| !h.is_empty()) {
                line.push_str(&format!(" ({})", hint));
            }
            item(line)
        })
        .collect()
}

fn multiple_choice(c: &MultipleChoice) -> Vec<Block> {
    printable("multiple_choice", &c.questions)
        .map(|(i, q)| {
            let mut lines = vec![item(numbered(i, &q.question))];
            lines.extend(
                ChoiceQuestion::LETTERS
                    .iter()
                    .zip(&q.options)
                    .map(|(letter, option)| option_line(*letter, option)),
            );
            Block::stack(lines)
        })
        .collect()
}

fn option_line(letter: char, option: &str) -> Block {
    Block::text(TextStyle::Option, format!("{}) {}", letter, option))
}

/// Spreadsheet-style column label: A..Z, AA, AB, ...
pub fn column_label(mut i: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (i % 26) as u8);
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

// The right column is read through an independent permutation, so row
// labels do not line up with the answer pairing.
fn matching(c: &Matching, shuffle: &mut dyn ColumnShuffle) -> Vec<Block> {
    let rows: Vec<_> = printable("matching", &c.pairs).collect();
    let order = shuffle.permutation(rows.len());
    rows.iter()
        .enumerate()
        .map(|(row, &(i, pair))| {
            let right = order
                .get(row)
                .and_then(|&j| rows.get(j))
                .map_or("", |(_, p)| p.right.as_str());
            Block::Row {
                cells: vec![
                    item(numbered(i, &pair.left)),
                    Block::text(TextStyle::Item, BLANK_MARKER),
                    item(format!("{}. {}", column_label(row), right)),
                ],
            }
        })
        .collect()
}

fn true_false(c: &TrueFalse) -> Vec<Block> {
    printable("true_false", &c.statements)
        .map(|(i, s)| item(format!("{}   True / False", numbered(i, &s.statement))))
        .collect()
}

fn sentence_reorder(c: &SentenceReorder) -> Vec<Block> {
    printable("sentence_reorder", &c.sentences)
        .map(|(i, s)| {
            Block::stack(vec![item(numbered(i, &s.scrambled.join(" / "))), Block::write_in()])
        })
        .collect()
}

fn error_correction(c: &ErrorCorrection) -> Vec<Block> {
    printable("error_correction", &c.sentences)
        .map(|(i, s)| {
            let line = item(numbered(i, &s.incorrect));
            Block::stack(vec![line, Block::labelled_write_in("Corrected:")])
        })
        .collect()
}

fn reading_passage(c: &ReadingPassage) -> Vec<Block> {
    let mut blocks = vec![];
    if !c.passage.is_empty() {
        blocks.push(Block::text(TextStyle::Passage, c.passage.as_str()));
    }
    blocks.extend(
        printable("reading_passage", &c.questions)
            .map(|(i, q)| Block::stack(vec![item(numbered(i, &q.question)), Block::write_in()])),
    );
    blocks
}

fn short_answer(c: &ShortAnswer) -> Vec<Block> {
    printable("short_answer", &c.questions)
        .map(|(i, q)| {
            Block::stack(vec![item(numbered(i, &q.question)), Block::write_in(), Block::write_in()])
        })
        .collect()
}

fn word_search(c: &WordSearch) -> Vec<Block> {
    let words: Vec<Block> = c
        .words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| Block::text(TextStyle::Item, format!("\u{2022} {}", w)))
        .collect();
    if words.is_empty() {
        return vec![];
    }
    vec![
        Block::text(TextStyle::Note, "Find these words in the grid:"),
        Block::Columns { count: WORD_SEARCH_COLUMNS, items: words },
        Block::text(TextStyle::Note, "(Word search grid will be generated in print version)"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{BlankSentence, MatchPair, Statement};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    fn exercise(value: serde_json::Value) -> Exercise {
        serde_json::from_value(value).unwrap()
    }

    fn texts(block: &Block) -> Vec<String> {
        block.texts().into_iter().map(|(_, t)| t.to_string()).collect()
    }

    struct Reverse;

    impl ColumnShuffle for Reverse {
        fn permutation(&mut self, len: usize) -> Vec<usize> {
            (0..len).rev().collect()
        }
    }

    #[test]
    fn test_header_order() {
        let body = ExerciseBody::FillInBlank(FillInBlank::default());
        let ex = Exercise::new("Blanks", "Fill them in.", body);
        let block = render_exercise(&ex, 2, &mut KeepOrder);
        let runs = block.texts();
        assert_eq!(runs[0], (TextStyle::ExerciseTitle, "3. Blanks"));
        assert_eq!(runs[1], (TextStyle::ExerciseType, "Fill in the Blank"));
        assert_eq!(runs[2], (TextStyle::Instructions, "Fill them in."));
        assert!(matches!(block, Block::Stack { keep_together: true, .. }));
    }

    #[test]
    fn test_fill_in_blank_widens_marker_and_hint() {
        let ex = Exercise::new(
            "Blanks",
            "",
            ExerciseBody::FillInBlank(FillInBlank {
                sentences: vec![BlankSentence {
                    text: "I ___ to school.".into(),
                    blank: Some("go".into()),
                    hint: Some("verb".into()),
                }],
            }),
        );
        let lines = texts(&render_exercise(&ex, 0, &mut KeepOrder));
        assert_eq!(lines[3], "1. I ________ to school. (verb)");
        assert!(!lines.iter().any(|l| l.contains("go")));
    }

    #[test]
    fn test_multiple_choice_keeps_option_order() {
        let ex = exercise(json!({
            "type": "multiple_choice", "title": "MC", "instructions": "",
            "content": { "questions": [
                { "question": "Pick", "options": ["a", "b", "c", "d"], "correctIndex": 2 }
            ]}
        }));
        let lines = texts(&render_exercise(&ex, 0, &mut KeepOrder));
        assert_eq!(&lines[3..], &["1. Pick", "A) a", "B) b", "C) c", "D) d"]);
    }

    #[test]
    fn test_multiple_choice_without_four_options_is_skipped() {
        let ex = exercise(json!({
            "type": "multiple_choice", "title": "MC", "instructions": "",
            "content": { "questions": [
                { "question": "Broken", "options": [] },
                { "question": "Fine", "options": ["w", "x", "y", "z"], "correctIndex": 0 }
            ]}
        }));
        let lines = texts(&render_exercise(&ex, 0, &mut KeepOrder));
        assert!(!lines.iter().any(|l| l.contains("Broken")));
        assert!(lines.contains(&"2. Fine".to_string()));
    }

    #[test]
    fn test_malformed_item_does_not_hide_siblings() {
        let ex = exercise(json!({
            "type": "multiple_choice", "title": "MC", "instructions": "",
            "content": { "questions": [
                { "question": "Good one", "options": ["a", "b", "c", "d"], "correctIndex": 1 },
                { "question": "Bad one", "options": ["a", "b", "c", "d"], "correctIndex": -1 },
                { "question": "Last", "options": ["e", "f", "g", "h"], "correctIndex": 0 }
            ]}
        }));
        let lines = texts(&render_exercise(&ex, 0, &mut KeepOrder));
        assert!(lines.contains(&"1. Good one".to_string()));
        assert!(lines.contains(&"3. Last".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Bad one")));
    }

    #[test]
    fn test_matching_skips_incomplete_pairs() {
        let ex = exercise(json!({
            "type": "matching", "title": "M", "instructions": "",
            "content": { "pairs": [
                { "left": "cat", "right": "gato" },
                { "left": "dog" },
                { "left": "bird", "right": "pajaro" }
            ]}
        }));
        let lines = texts(&render_exercise(&ex, 0, &mut KeepOrder));
        assert_eq!(&lines[3..], &["1. cat", "___", "A. gato", "3. bird", "___", "B. pajaro"]);
    }

    #[test]
    fn test_matching_right_column_follows_shuffle() {
        let ex = Exercise::new(
            "Match",
            "",
            ExerciseBody::Matching(Matching {
                pairs: vec![
                    MatchPair { left: "cat".into(), right: "gato".into() },
                    MatchPair { left: "dog".into(), right: "perro".into() },
                    MatchPair { left: "bird".into(), right: "pajaro".into() },
                ],
            }),
        );
        let lines = texts(&render_exercise(&ex, 0, &mut Reverse));
        assert_eq!(&lines[3..6], &["1. cat", "___", "A. pajaro"]);
        assert_eq!(&lines[6..9], &["2. dog", "___", "B. perro"]);
        assert_eq!(&lines[9..12], &["3. bird", "___", "C. gato"]);
    }

    #[test]
    fn test_matching_seeded_shuffle_is_reproducible() {
        let pairs: Vec<MatchPair> = (0..8)
            .map(|i| MatchPair { left: format!("l{}", i), right: format!("r{}", i) })
            .collect();
        let body = ExerciseBody::Matching(Matching { pairs: pairs.clone() });
        let ex = Exercise::new("Match", "", body);

        let a = render_exercise(&ex, 0, &mut RandomShuffle(ChaCha8Rng::seed_from_u64(42)));
        let b = render_exercise(&ex, 0, &mut RandomShuffle(ChaCha8Rng::seed_from_u64(42)));
        assert_eq!(a, b);

        // Every right item still appears exactly once.
        let lines = texts(&a);
        for pair in &pairs {
            let hits = lines.iter().filter(|l| l.ends_with(&format!(". {}", pair.right))).count();
            assert_eq!(hits, 1);
        }
        assert_eq!(ex.body, ExerciseBody::Matching(Matching { pairs }));
    }

    #[test]
    fn test_true_false_hides_answer() {
        let ex = Exercise::new(
            "TF",
            "",
            ExerciseBody::TrueFalse(TrueFalse {
                statements: vec![Statement {
                    statement: "The sky is blue.".into(),
                    is_true: Some(true),
                }],
            }),
        );
        let lines = texts(&render_exercise(&ex, 0, &mut KeepOrder));
        assert_eq!(lines[3], "1. The sky is blue.   True / False");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_sentence_reorder_and_error_correction_withhold_answers() {
        let reorder = exercise(json!({
            "type": "sentence_reorder", "title": "R", "instructions": "",
            "content": { "sentences": [
                { "scrambled": ["is", "This", "fine"], "correct": "This is fine" }
            ]}
        }));
        let block = render_exercise(&reorder, 0, &mut KeepOrder);
        assert_eq!(texts(&block)[3], "1. is / This / fine");
        assert!(!texts(&block).iter().any(|l| l == "This is fine"));

        let fix = exercise(json!({
            "type": "error_correction", "title": "E", "instructions": "",
            "content": { "sentences": [
                { "incorrect": "He go home.", "correct": "He goes home.", "errorType": "agreement" }
            ]}
        }));
        let block = render_exercise(&fix, 0, &mut KeepOrder);
        let mut labels = vec![];
        block.visit(&mut |b| {
            if let Block::WriteIn { label } = b {
                labels.push(label.clone());
            }
        });
        assert_eq!(labels, vec![Some("Corrected:".to_string())]);
        assert!(!texts(&block).iter().any(|l| l.contains("goes")));
    }

    #[test]
    fn test_short_answer_has_two_write_in_lines() {
        let ex = exercise(json!({
            "type": "short_answer", "title": "S", "instructions": "",
            "content": { "questions": [ { "question": "Why?", "sampleAnswer": "Because." } ] }
        }));
        let block = render_exercise(&ex, 0, &mut KeepOrder);
        let mut write_ins = 0;
        block.visit(&mut |b| {
            if matches!(b, Block::WriteIn { .. }) {
                write_ins += 1;
            }
        });
        assert_eq!(write_ins, 2);
        assert!(!texts(&block).iter().any(|l| l.contains("Because")));
    }

    #[test]
    fn test_reading_passage_prints_passage_first() {
        let ex = exercise(json!({
            "type": "reading_passage", "title": "P", "instructions": "",
            "content": {
                "passage": "Once upon a time.",
                "questions": [ { "question": "When?", "answer": "Once." } ]
            }
        }));
        let binding = render_exercise(&ex, 0, &mut KeepOrder);
        let runs = binding.texts();
        assert_eq!(runs[3], (TextStyle::Passage, "Once upon a time."));
        assert_eq!(runs[4], (TextStyle::Item, "1. When?"));
    }

    #[test]
    fn test_word_search_lists_words() {
        let ex = exercise(json!({
            "type": "word_search", "title": "W", "instructions": "",
            "content": { "words": ["apple", "pear"] }
        }));
        let lines = texts(&render_exercise(&ex, 0, &mut KeepOrder));
        assert!(lines.contains(&"\u{2022} apple".to_string()));
        assert!(lines.contains(&"\u{2022} pear".to_string()));
        assert!(lines.iter().any(|l| l.contains("generated in print version")));
    }

    #[test]
    fn test_unrecognized_type_renders_header_only() {
        let ex = exercise(json!({
            "type": "crossword", "title": "X", "instructions": "Solve.", "content": { "clues": [1] }
        }));
        let lines = texts(&render_exercise(&ex, 0, &mut KeepOrder));
        assert_eq!(lines, vec!["1. X", "crossword", "Solve."]);
    }

    #[test]
    fn test_column_labels() {
        assert_eq!(column_label(0), "A");
        assert_eq!(column_label(25), "Z");
        assert_eq!(column_label(26), "AA");
        assert_eq!(column_label(27), "AB");
    }
}
