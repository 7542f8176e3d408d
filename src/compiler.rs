//! Document Compiler - Single Entry Point
//!
//! `GeneratedBook` in, `Document` out. No I/O, no validation, no state
//! kept between calls.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assembler::PageAssembler;
use crate::book::GeneratedBook;
use crate::layout::Document;
use crate::render::{ColumnShuffle, RandomShuffle};

/// Compile `book` with an explicit shuffle source for matching exercises.
pub fn compile(book: &GeneratedBook, shuffle: &mut dyn ColumnShuffle) -> Document {
    let mut assembler = PageAssembler::new(&book.config);

    assembler.title_page();
    assembler.contents_page(&book.sections);
    for (index, section) in book.sections.iter().enumerate() {
        assembler.section_page(index, section, shuffle);
    }
    if book.config.include_answer_key {
        assembler.answer_key_page(&book.sections);
    }

    assembler.finish()
}

/// Reproducible compile: the same seed always yields the same document.
pub fn compile_seeded(book: &GeneratedBook, seed: u64) -> Document {
    compile(book, &mut RandomShuffle(StdRng::seed_from_u64(seed)))
}

/// Compile with a generator freshly seeded from OS entropy.
pub fn compile_random(book: &GeneratedBook) -> Document {
    compile(book, &mut RandomShuffle(StdRng::from_entropy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageKind;
    use serde_json::json;

    fn book(include_answer_key: bool) -> GeneratedBook {
        serde_json::from_value(json!({
            "config": {
                "title": "Kitchen Words",
                "bookType": "vocabulary_builder",
                "level": "A1",
                "topic": "Cooking",
                "pageCount": 20,
                "trimSize": "8.5x11",
                "exerciseTypes": ["matching", "word_search"],
                "includeAnswerKey": include_answer_key,
                "authorName": "K. Lee"
            },
            "sections": [
                { "title": "Tools", "exercises": [
                    { "type": "matching", "title": "Pairs", "instructions": "Match.",
                      "content": { "pairs": [
                        { "left": "knife", "right": "cut" },
                        { "left": "pan", "right": "fry" },
                        { "left": "pot", "right": "boil" }
                    ]}}
                ]},
                { "title": "Food", "exercises": [
                    { "type": "word_search", "title": "Find", "instructions": "Look.",
                      "content": { "words": ["egg"] } }
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_page_sequence() {
        let doc = compile_seeded(&book(true), 7);
        let kinds: Vec<_> = doc.pages.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PageKind::Title,
                PageKind::Contents,
                PageKind::Section { index: 0 },
                PageKind::Section { index: 1 },
                PageKind::AnswerKey,
            ]
        );
    }

    #[test]
    fn test_seeded_compile_is_deterministic() {
        let b = book(true);
        assert_eq!(compile_seeded(&b, 99), compile_seeded(&b, 99));
    }

    #[test]
    fn test_random_compile_keeps_structure() {
        let b = book(false);
        let doc = compile_random(&b);
        assert_eq!(doc.page_count(), 4);
        assert!(doc.answer_key().is_none());
    }
}
