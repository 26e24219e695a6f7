//! PDF builders for tests
//!
//! Generates small text PDFs at test time so no binary fixtures are checked
//! in. Text must be ASCII; each page is wrapped into fixed-width lines.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

const LINE_WIDTH: usize = 90;
const WORDS: [&str; 12] = [
    "digital", "transformation", "customer", "platform", "automation", "analytics",
    "workforce", "cloud", "revenue", "efficiency", "initiative", "strategy",
];

/// Deterministic filler text of at least `min_chars` characters
pub fn filler_text(min_chars: usize) -> String {
    let mut text = String::with_capacity(min_chars + 16);
    let mut i = 0;
    while text.len() < min_chars {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(WORDS[i % WORDS.len()]);
        i += 1;
    }
    text
}

/// Write a PDF with one page per entry of `pages`
pub fn write_pdf(path: &Path, pages: &[String]) -> Result<(), lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_text in pages {
        let mut operations = Vec::new();
        let mut y: i64 = 800;
        for line in wrap(page_text) {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 8.into()]));
            operations.push(Operation::new("Td", vec![20.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
            operations.push(Operation::new("ET", vec![]));
            y -= 10;
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}

/// Write a PDF of `page_count` pages, each with about `chars_per_page` characters
pub fn write_filler_pdf(path: &Path, page_count: usize, chars_per_page: usize) -> Result<(), lopdf::Error> {
    let pages: Vec<String> = (1..=page_count)
        .map(|n| format!("Page {} {}", n, filler_text(chars_per_page)))
        .collect();
    write_pdf(path, &pages)
}

fn wrap(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > LINE_WIDTH {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
