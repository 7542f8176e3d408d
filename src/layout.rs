//! Document Model - The Render Tree
//!
//! Output of the compiler. A downstream renderer turns this into a
//! binary print file; nothing here knows about bytes.

use serde::{Deserialize, Serialize};

use crate::book::TrimSize;
use crate::print::PageGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    BookTitle,
    BookSubtitle,
    AuthorName,
    TocTitle,
    TocEntry,
    SectionTitle,
    SectionDescription,
    ExerciseTitle,
    ExerciseType,
    Instructions,
    Item,
    Option,
    Passage,
    Note,
    AnswerKeyTitle,
    AnswerSectionTitle,
    AnswerExerciseTitle,
    AnswerText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Text { style: TextStyle, text: String },
    /// Vertical group. `keep_together` asks the renderer not to split it.
    Stack { keep_together: bool, children: Vec<Block> },
    /// Horizontal cells laid out left to right.
    Row { cells: Vec<Block> },
    /// Blank line for a handwritten response, with an optional lead-in.
    WriteIn { label: Option<String> },
    /// Items wrapped into a fixed number of columns.
    Columns { count: u8, items: Vec<Block> },
}

impl Block {
    pub fn text(style: TextStyle, text: impl Into<String>) -> Self {
        Block::Text { style, text: text.into() }
    }

    pub fn stack(children: Vec<Block>) -> Self {
        Block::Stack { keep_together: false, children }
    }

    pub fn unbreakable(children: Vec<Block>) -> Self {
        Block::Stack { keep_together: true, children }
    }

    pub fn write_in() -> Self {
        Block::WriteIn { label: None }
    }

    pub fn labelled_write_in(label: impl Into<String>) -> Self {
        Block::WriteIn { label: Some(label.into()) }
    }

    /// Depth-first walk over this block and its descendants.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Block)) {
        f(self);
        let children = match self {
            Block::Stack { children, .. } => children,
            Block::Row { cells } => cells,
            Block::Columns { items, .. } => items,
            Block::Text { .. } | Block::WriteIn { .. } => return,
        };
        for child in children {
            child.visit(f);
        }
    }

    /// Text runs in reading order.
    pub fn texts(&self) -> Vec<(TextStyle, &str)> {
        let mut out = vec![];
        self.visit(&mut |b| {
            if let Block::Text { style, text } = b {
                out.push((*style, text.as_str()));
            }
        });
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageKind {
    Title,
    Contents,
    /// Zero-based position of the section in the book.
    Section { index: usize },
    AnswerKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based position in the physical page stream.
    pub index: usize,
    pub kind: PageKind,
    pub geometry: PageGeometry,
    /// Footer number; absent on the title page.
    pub page_number: Option<usize>,
    /// Whether content may flow onto continuation pages.
    pub wrap: bool,
    pub body: Vec<Block>,
}

impl Page {
    pub fn texts(&self) -> Vec<(TextStyle, &str)> {
        self.body.iter().flat_map(Block::texts).collect()
    }

    pub fn texts_with_style(&self, style: TextStyle) -> Vec<&str> {
        self.texts().into_iter().filter(|(s, _)| *s == style).map(|(_, t)| t).collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|(_, t)| t.contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    pub author: String,
    pub trim_size: TrimSize,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages_of_kind(&self, kind: PageKind) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(move |p| p.kind == kind)
    }

    pub fn contents_entries(&self) -> Vec<&str> {
        self.pages_of_kind(PageKind::Contents)
            .flat_map(|p| p.texts_with_style(TextStyle::TocEntry))
            .collect()
    }

    pub fn answer_key(&self) -> Option<&Page> {
        self.pages_of_kind(PageKind::AnswerKey).next()
    }
}
