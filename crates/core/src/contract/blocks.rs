//! Typed block decomposition of hydrated contract HTML.
//!
//! Non-HTML rendering surfaces (typeset PDF, plain-text preview) consume a
//! flat sequence of headings, paragraphs, rich-text runs, and lists instead
//! of markup. The scanner here is deliberately small: contract templates
//! are back-office authored HTML, not arbitrary web pages.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::contract::contains_terms_phrase;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Paragraph(String),
    RichText(Vec<TextRun>),
    List { ordered: bool, items: Vec<String> },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct InlineStyle {
    bold: bool,
    italic: bool,
    underline: bool,
}

enum Token<'a> {
    Open { name: String, attrs: &'a str },
    Close { name: String },
    Text(&'a str),
}

/// Decomposes hydrated HTML into typed blocks.
///
/// When the document mentions "terms and conditions" anywhere
/// (case-insensitive), emission is suppressed until a heading carrying that
/// phrase, so decorative pre-terms markup stays out of the legal rendering.
/// Documents without the phrase are captured from the start.
pub fn parse_blocks(html: &str) -> Vec<ContentBlock> {
    let mut parser = BlockParser::new(!contains_terms_phrase(html));
    for token in tokenize(html) {
        parser.feed(token);
    }
    parser.finish()
}

struct ListState {
    ordered: bool,
    items: Vec<String>,
    current: Option<String>,
    depth: usize,
}

struct BlockParser {
    blocks: Vec<ContentBlock>,
    capturing: bool,
    style_stack: Vec<InlineStyle>,
    runs: Vec<TextRun>,
    heading: Option<(u8, String)>,
    list: Option<ListState>,
    skip_depth: usize,
}

impl BlockParser {
    fn new(capturing: bool) -> Self {
        Self {
            blocks: Vec::new(),
            capturing,
            style_stack: vec![InlineStyle::default()],
            runs: Vec::new(),
            heading: None,
            list: None,
            skip_depth: 0,
        }
    }

    fn current_style(&self) -> InlineStyle {
        *self.style_stack.last().unwrap_or(&InlineStyle::default())
    }

    fn feed(&mut self, token: Token<'_>) {
        match token {
            Token::Open { name, attrs } => self.open(&name, attrs),
            Token::Close { name } => self.close(&name),
            Token::Text(raw) => self.text(raw),
        }
    }

    fn open(&mut self, name: &str, attrs: &str) {
        if self.skip_depth > 0 {
            if !is_void(name) {
                self.skip_depth += 1;
            }
            return;
        }

        match name {
            "script" | "style" => {
                self.skip_depth = 1;
                return;
            }
            "br" => {
                self.append_text(" ");
                return;
            }
            _ if is_void(name) => return,
            _ => {}
        }

        let style = derive_style(self.current_style(), name, attrs);
        self.style_stack.push(style);

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush_paragraph();
                let level = name.as_bytes()[1] - b'0';
                self.heading = Some((level, String::new()));
            }
            "p" | "div" | "table" | "tr" | "blockquote" => self.flush_paragraph(),
            "ul" | "ol" => {
                self.flush_paragraph();
                match &mut self.list {
                    Some(list) => list.depth += 1,
                    None => {
                        self.list = Some(ListState {
                            ordered: name == "ol",
                            items: Vec::new(),
                            current: None,
                            depth: 1,
                        });
                    }
                }
            }
            "li" => {
                if let Some(list) = &mut self.list {
                    if let Some(item) = list.current.take() {
                        push_item(&mut list.items, item);
                    }
                    list.current = Some(String::new());
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }

        if is_void(name) {
            return;
        }
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if let Some((level, text)) = self.heading.take() {
                    self.emit_heading(level, text.trim().to_string());
                }
            }
            "p" | "blockquote" => self.flush_paragraph(),
            "li" => {
                if let Some(list) = &mut self.list {
                    if let Some(item) = list.current.take() {
                        push_item(&mut list.items, item);
                    }
                }
            }
            "ul" | "ol" => {
                let finished = match &mut self.list {
                    Some(list) => {
                        if let Some(item) = list.current.take() {
                            push_item(&mut list.items, item);
                        }
                        list.depth -= 1;
                        list.depth == 0
                    }
                    None => false,
                };
                if finished {
                    let list = self.list.take().expect("list state present");
                    if !list.items.is_empty() && self.capturing {
                        self.blocks
                            .push(ContentBlock::List { ordered: list.ordered, items: list.items });
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        if self.skip_depth > 0 {
            return;
        }
        let decoded = decode_entities(raw);
        let normalized = collapse_whitespace(&decoded);
        if normalized.is_empty() {
            return;
        }
        self.append_text(&normalized);
    }

    fn append_text(&mut self, text: &str) {
        if let Some((_, heading_text)) = &mut self.heading {
            append_normalized(heading_text, text);
            return;
        }
        if let Some(list) = &mut self.list {
            if let Some(item) = &mut list.current {
                append_normalized(item, text);
            }
            return;
        }

        let style = self.current_style();
        match self.runs.last_mut() {
            Some(last)
                if last.bold == style.bold
                    && last.italic == style.italic
                    && last.underline == style.underline =>
            {
                append_normalized(&mut last.text, text);
            }
            _ => {
                let trimmed = if self.runs.is_empty() { text.trim_start() } else { text };
                if !trimmed.is_empty() {
                    self.runs.push(TextRun {
                        text: trimmed.to_string(),
                        bold: style.bold,
                        italic: style.italic,
                        underline: style.underline,
                    });
                }
            }
        }
    }

    fn emit_heading(&mut self, level: u8, text: String) {
        if text.is_empty() {
            return;
        }
        if !self.capturing {
            if contains_terms_phrase(&text) {
                self.capturing = true;
            } else {
                return;
            }
        }
        self.blocks.push(ContentBlock::Heading { level, text });
    }

    fn flush_paragraph(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        let mut runs = std::mem::take(&mut self.runs);
        if let Some(last) = runs.last_mut() {
            last.text.truncate(last.text.trim_end().len());
        }
        runs.retain(|run| !run.text.is_empty());
        if runs.is_empty() || !self.capturing {
            return;
        }

        let plain = runs.iter().all(|run| !run.bold && !run.italic && !run.underline);
        if plain {
            let text = runs.into_iter().map(|run| run.text).collect::<String>();
            self.blocks.push(ContentBlock::Paragraph(text));
        } else {
            self.blocks.push(ContentBlock::RichText(runs));
        }
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        self.flush_paragraph();
        self.blocks
    }
}

fn push_item(items: &mut Vec<String>, item: String) {
    let trimmed = item.trim();
    if !trimmed.is_empty() {
        items.push(trimmed.to_string());
    }
}

/// Appends already-normalized text, collapsing the join boundary so
/// `"foo " + " bar"` never produces a double space.
fn append_normalized(buffer: &mut String, text: &str) {
    if buffer.ends_with(' ') && text.starts_with(' ') {
        buffer.push_str(text.trim_start());
    } else if buffer.is_empty() {
        buffer.push_str(text.trim_start());
    } else {
        buffer.push_str(text);
    }
}

fn is_void(name: &str) -> bool {
    matches!(name, "br" | "hr" | "img" | "input" | "meta" | "link" | "col" | "wbr")
}

fn style_attr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)style\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("style attr pattern is a valid literal regex")
    })
}

/// Inline style for a child element: inherited from the parent, widened by
/// the tag itself and any `style` attribute. Styles only ever turn on going
/// down the tree, so nested emphasis composes.
fn derive_style(parent: InlineStyle, name: &str, attrs: &str) -> InlineStyle {
    let mut style = parent;
    match name {
        "strong" | "b" => style.bold = true,
        "em" | "i" => style.italic = true,
        "u" => style.underline = true,
        _ => {}
    }

    if let Some(caps) = style_attr_pattern().captures(attrs) {
        let css = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or("");
        for declaration in css.split(';') {
            let Some((property, value)) = declaration.split_once(':') else { continue };
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            match property.as_str() {
                "font-weight" => {
                    if let Ok(weight) = value.parse::<u32>() {
                        if weight >= 500 {
                            style.bold = true;
                        }
                    } else if value == "bold" || value == "bolder" {
                        style.bold = true;
                    }
                }
                "font-style" if value.contains("italic") => style.italic = true,
                "text-decoration" | "text-decoration-line" if value.contains("underline") => {
                    style.underline = true;
                }
                _ => {}
            }
        }
    }

    style
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = html.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(open) = html[pos..].find('<').map(|i| pos + i) else {
            tokens.push(Token::Text(&html[pos..]));
            break;
        };
        if open > pos {
            tokens.push(Token::Text(&html[pos..open]));
        }

        let rest = &html[open..];
        if let Some(comment) = rest.strip_prefix("<!--") {
            pos = match comment.find("-->") {
                Some(end) => open + 4 + end + 3,
                None => bytes.len(),
            };
            continue;
        }

        let Some(close) = rest.find('>') else {
            // Unterminated tag: emit the remainder as text rather than drop it.
            tokens.push(Token::Text(rest));
            break;
        };
        let inner = &rest[1..close];
        pos = open + close + 1;

        if inner.starts_with('!') || inner.starts_with('?') {
            continue;
        }
        if let Some(name_part) = inner.strip_prefix('/') {
            let name = tag_name(name_part);
            if !name.is_empty() {
                tokens.push(Token::Close { name });
            }
            continue;
        }

        let inner = inner.trim_start();
        let name = tag_name(inner);
        if name.is_empty() {
            continue;
        }
        let attrs = inner[name.len()..].trim_end_matches('/');
        let self_closing = inner.trim_end().ends_with('/');
        tokens.push(Token::Open { name: name.clone(), attrs });
        if self_closing && !is_void(&name) {
            tokens.push(Token::Close { name });
        }
    }

    tokens
}

fn tag_name(tag: &str) -> String {
    tag.trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '&' {
            out.push(ch);
            continue;
        }

        let rest = &text[start + 1..];
        let Some(end) = rest.find(';').filter(|end| *end <= 8) else {
            out.push('&');
            continue;
        };
        let entity = &rest[..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            "#39" => Some('\''),
            _ => None,
        };

        match decoded {
            Some(replacement) => {
                out.push(replacement);
                for _ in 0..=end {
                    chars.next();
                }
            }
            None => out.push('&'),
        }
    }

    out
}
