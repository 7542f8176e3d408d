//! Export Helpers
//!
//! What the downstream print step needs besides the document itself: a
//! file name, and a plain-text proof for reviewing layout without a PDF
//! renderer.

use std::fmt::Write;

use crate::layout::{Block, Document, PageKind, TextStyle};

/// File name for the exported book: runs of non-alphanumeric characters
/// become one hyphen, everything lower-cased, `.pdf` appended.
pub fn suggested_file_name(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_gap = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            in_gap = false;
        } else if !in_gap {
            slug.push('-');
            in_gap = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("workbook");
    }
    slug + ".pdf"
}

/// Plain-text rendering of the page stream.
pub fn text_proof(document: &Document) -> String {
    let mut out = String::new();
    for page in &document.pages {
        let label = match page.kind {
            PageKind::Title => "title".to_string(),
            PageKind::Contents => "contents".to_string(),
            PageKind::Section { index } => format!("section {}", index + 1),
            PageKind::AnswerKey => "answer key".to_string(),
        };
        let m = page.geometry.margins;
        let _ = writeln!(
            out,
            "=== page {} ({}) {}x{}pt margins L{} R{} T{} B{} ===",
            page.index + 1,
            label,
            page.geometry.width,
            page.geometry.height,
            m.left,
            m.right,
            m.top,
            m.bottom
        );
        for block in &page.body {
            write_block(&mut out, block);
        }
        if let Some(number) = page.page_number {
            let _ = writeln!(out, "{:^40}", number);
        }
        out.push('\n');
    }
    out
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Text { style, text } => {
            let text = match style {
                TextStyle::Instructions => format!("_{}_", text),
                TextStyle::Option => format!("   {}", text),
                _ => text.clone(),
            };
            for line in text.lines() {
                let _ = writeln!(out, "{}", line);
            }
        }
        Block::Stack { children, .. } => {
            for child in children {
                write_block(out, child);
            }
        }
        Block::Row { cells } => {
            let row: Vec<String> = cells.iter().map(flatten).collect();
            let _ = writeln!(out, "{}", row.join("    "));
        }
        Block::WriteIn { label } => {
            let lead = label.as_deref().map_or(String::new(), |l| format!("{} ", l));
            let _ = writeln!(out, "{}_______________________________", lead);
        }
        Block::Columns { count, items } => {
            let cells: Vec<String> = items.iter().map(flatten).collect();
            for chunk in cells.chunks((*count).max(1) as usize) {
                let _ = writeln!(out, "{}", chunk.join("    "));
            }
        }
    }
}

fn flatten(block: &Block) -> String {
    block.texts().into_iter().map(|(_, t)| t).collect::<Vec<_>>().join(" ")
}
