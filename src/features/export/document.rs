//! Paginated plain-text document export
//!
//! Markdown is flattened, text is wrapped to [`PAGE_WIDTH`] columns and split
//! into pages of [`PAGE_LINES`] body lines, each closed by a centered
//! `Page n of m` footer. Pages are separated by a form feed.

use super::text::{message_body, speaker_label};
use crate::core::{strip_markdown, wrap_text};
use crate::features::sessions::ChatSession;

pub const PAGE_WIDTH: usize = 80;
pub const PAGE_LINES: usize = 56;
const FORM_FEED: char = '\u{000C}';

fn centered(text: &str) -> String {
    format!("{text:^PAGE_WIDTH$}").trim_end().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedDocument {
    pages: Vec<Vec<String>>,
}

impl PaginatedDocument {
    pub fn build(session: &ChatSession, exported_at: &str) -> Self {
        let mut doc = Self { pages: vec![Vec::new()] };

        for line in wrap_text(&session.title, PAGE_WIDTH) {
            doc.push(centered(&line));
        }
        doc.push(centered(&format!("Exported on: {exported_at}")));
        doc.push(String::new());

        for message in &session.messages {
            // keep a speaker label together with at least one line of its text
            doc.ensure_room(2);
            doc.push(format!("{}:", speaker_label(message.role)));

            let plain = strip_markdown(&message_body(message, "\n\n"));
            for line in wrap_text(&plain, PAGE_WIDTH) {
                doc.push(line);
            }
            doc.push(String::new());
        }

        doc
    }

    fn current(&mut self) -> &mut Vec<String> {
        if self.pages.last().map_or(true, |page| page.len() >= PAGE_LINES) {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn push(&mut self, line: String) {
        self.current().push(line);
    }

    fn ensure_room(&mut self, lines: usize) {
        let used = self.pages.last().map_or(0, Vec::len);
        if used > 0 && used + lines > PAGE_LINES {
            self.pages.push(Vec::new());
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Vec<String>] {
        &self.pages
    }

    pub fn render(&self) -> String {
        let total = self.pages.len();
        let mut out = String::new();

        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                out.push(FORM_FEED);
            }
            for line in page {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&centered(&format!("Page {} of {}", i + 1, total)));
            out.push('\n');
        }
        out
    }
}
