//! Pagination Assembler
//!
//! Opens pages in a fixed sequence: title, contents, one page per
//! section, then the optional answer key. Owns the running page index,
//! which decides margin parity and footer numbers.

use tracing::debug;

use crate::answers::answer_key;
use crate::book::{BookConfig, BookSection};
use crate::layout::{Block, Document, Page, PageKind, TextStyle};
use crate::print::{resolve, PageParity};
use crate::render::{render_exercise, ColumnShuffle};

pub const CONTENTS_TITLE: &str = "Table of Contents";
pub const ANSWER_KEY_TITLE: &str = "Answer Key";

pub struct PageAssembler<'a> {
    config: &'a BookConfig,
    next_index: usize,
    pages: Vec<Page>,
}

impl<'a> PageAssembler<'a> {
    pub fn new(config: &'a BookConfig) -> Self {
        Self { config, next_index: 0, pages: vec![] }
    }

    /// Open the next physical page. Geometry is resolved from the index
    /// the page is opened at.
    fn open_page(&mut self, kind: PageKind, wrap: bool, body: Vec<Block>) {
        let index = self.next_index;
        self.next_index += 1;

        let geometry = resolve(self.config.trim_size, index);
        debug!(?kind, index, parity = ?PageParity::of(index), "opened page");

        self.pages.push(Page {
            index,
            kind,
            geometry,
            page_number: (index > 0).then_some(index + 1),
            wrap,
            body,
        });
    }

    pub fn title_page(&mut self) {
        let c = self.config;
        let body = vec![Block::stack(vec![
            Block::text(TextStyle::BookTitle, c.title.as_str()),
            Block::text(TextStyle::BookSubtitle, format!("{} | {}", c.level.code(), c.topic)),
            Block::text(TextStyle::AuthorName, c.author_name.as_str()),
        ])];
        self.open_page(PageKind::Title, false, body);
    }

    pub fn contents_page(&mut self, sections: &[BookSection]) {
        let mut body = vec![Block::text(TextStyle::TocTitle, CONTENTS_TITLE)];
        body.extend(sections.iter().map(|s| Block::text(TextStyle::TocEntry, s.title.as_str())));
        if self.config.include_answer_key {
            body.push(Block::text(TextStyle::TocEntry, ANSWER_KEY_TITLE));
        }
        self.open_page(PageKind::Contents, false, body);
    }

    pub fn section_page(
        &mut self,
        index: usize,
        section: &BookSection,
        shuffle: &mut dyn ColumnShuffle,
    ) {
        let mut body = vec![Block::text(TextStyle::SectionTitle, section.title.as_str())];
        if let Some(description) = section.description.as_deref().filter(|d| !d.is_empty()) {
            body.push(Block::text(TextStyle::SectionDescription, description));
        }
        body.extend(
            section
                .exercises
                .iter()
                .enumerate()
                .map(|(ordinal, exercise)| render_exercise(exercise, ordinal, shuffle)),
        );
        self.open_page(PageKind::Section { index }, true, body);
    }

    pub fn answer_key_page(&mut self, sections: &[BookSection]) {
        let mut body = vec![Block::text(TextStyle::AnswerKeyTitle, ANSWER_KEY_TITLE)];
        for section in answer_key(sections) {
            let mut group = vec![Block::text(TextStyle::AnswerSectionTitle, section.title)];
            group.extend(section.entries.into_iter().map(|entry| {
                let heading = format!("{}. {}", entry.ordinal + 1, entry.title);
                Block::stack(vec![
                    Block::text(TextStyle::AnswerExerciseTitle, heading),
                    Block::text(TextStyle::AnswerText, entry.answer),
                ])
            }));
            body.push(Block::stack(group));
        }
        self.open_page(PageKind::AnswerKey, true, body);
    }

    pub fn finish(self) -> Document {
        Document {
            title: self.config.title.clone(),
            author: self.config.author_name.clone(),
            trim_size: self.config.trim_size,
            pages: self.pages,
        }
    }
}
