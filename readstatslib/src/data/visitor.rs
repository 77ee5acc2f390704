//! Document tree visitor for word and syllable counting.
//!
//! The visitor walks a [`Document`] with a fixed dispatch over node kinds:
//!
//! - **Counted**: `Str` text inside paragraphs, plain blocks, headings,
//!   quotes, emphasis, spans, link text, image alt text, list items, figure
//!   content and table captions
//! - **Skipped**: inline code, code blocks, raw HTML/LaTeX, table cells, and
//!   any node kind it does not know
//! - **Pruned**: divs matching the skip rules (site navigation, external
//!   reference lists) together with everything inside them
//!
//! The title, subtitle and description from the metadata are counted before
//! the body.

use crate::ast::{Attr, Block, Document, Inline};

use super::stats::Counts;
use super::syllables::SyllableCounter;

/// Metadata fields whose text is read along with the body.
pub const META_FIELDS: [&str; 3] = ["title", "subtitle", "description"];

/// Divs that are pruned from the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRules {
    /// Div identifiers to skip
    pub ids: Vec<String>,
    /// Div classes to skip
    pub classes: Vec<String>,
}

impl Default for SkipRules {
    fn default() -> Self {
        Self {
            ids: vec!["quarto-navigation-envelope".to_string()],
            classes: vec!["external-refs".to_string()],
        }
    }
}

impl SkipRules {
    /// No div is ever skipped.
    pub fn none() -> Self {
        Self {
            ids: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn skips(&self, attr: &Attr) -> bool {
        self.ids.iter().any(|id| *id == attr.id) || attr.has_any_class(&self.classes)
    }
}

/// Restricts body counting to marked regions.
///
/// When any `Div` or `Span` in the body carries one of `classes`, only text
/// inside such regions is counted. A document without a marked region is
/// counted in full, and so is every document when `classes` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusRule {
    pub classes: Vec<String>,
}

impl FocusRule {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.classes.is_empty()
    }

    fn marks(&self, attr: &Attr) -> bool {
        attr.has_any_class(&self.classes)
    }

    /// Whether the rule selects anything in `blocks`.
    pub fn applies_to(&self, blocks: &[Block]) -> bool {
        self.is_enabled() && blocks.iter().any(|b| self.block_has_focus(b))
    }

    fn block_has_focus(&self, block: &Block) -> bool {
        match block {
            Block::Div { attr, content } => {
                self.marks(attr) || content.iter().any(|b| self.block_has_focus(b))
            }
            Block::Plain(inlines) | Block::Para(inlines) => self.inlines_have_focus(inlines),
            Block::Header { content, .. } => self.inlines_have_focus(content),
            Block::BlockQuote(blocks) | Block::Figure { content: blocks, .. } => {
                blocks.iter().any(|b| self.block_has_focus(b))
            }
            Block::BulletList(items) | Block::OrderedList(items) => items
                .iter()
                .any(|item| item.iter().any(|b| self.block_has_focus(b))),
            Block::Table { caption } => caption.iter().any(|b| self.block_has_focus(b)),
            Block::CodeBlock(_) | Block::RawBlock { .. } | Block::Other(_) => false,
        }
    }

    fn inlines_have_focus(&self, inlines: &[Inline]) -> bool {
        inlines.iter().any(|inline| match inline {
            Inline::Span { attr, content } => {
                self.marks(attr) || self.inlines_have_focus(content)
            }
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Quoted(inner)
            | Inline::Link(inner)
            | Inline::Image(inner) => self.inlines_have_focus(inner),
            _ => false,
        })
    }
}

/// Words and totals produced by a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountReport {
    pub counts: Counts,
    /// Counted words in document order, punctuation preserved
    pub words: Vec<String>,
}

impl CountReport {
    /// Counted words with ASCII punctuation removed; words that end up empty
    /// are dropped.
    pub fn words_without_punctuation(&self) -> Vec<String> {
        self.words
            .iter()
            .map(|w| w.chars().filter(|c| !c.is_ascii_punctuation()).collect::<String>())
            .filter(|w| !w.is_empty())
            .collect()
    }

    /// Counted words joined by single spaces.
    pub fn to_text(&self, punctuation: bool) -> String {
        if punctuation {
            self.words.join(" ")
        } else {
            self.words_without_punctuation().join(" ")
        }
    }
}

/// A visitor that walks one document and accumulates counts.
pub struct Visitor<'a> {
    syllables: &'a SyllableCounter,
    skip: &'a SkipRules,
    focus: &'a FocusRule,
    focus_active: bool,
    report: CountReport,
}

impl<'a> Visitor<'a> {
    pub fn new(syllables: &'a SyllableCounter, skip: &'a SkipRules, focus: &'a FocusRule) -> Self {
        Self {
            syllables,
            skip,
            focus,
            focus_active: false,
            report: CountReport::default(),
        }
    }

    /// Visit the document and return its counts.
    pub fn visit_document(mut self, doc: &Document) -> CountReport {
        for key in META_FIELDS {
            if let Some(value) = doc.meta.get(key) {
                self.visit_inlines(&value.to_inlines(), true);
            }
        }

        self.focus_active = self.focus.applies_to(&doc.blocks);
        self.visit_blocks(&doc.blocks, false);
        self.report
    }

    fn visit_blocks(&mut self, blocks: &[Block], in_focus: bool) {
        for block in blocks {
            self.visit_block(block, in_focus);
        }
    }

    fn visit_block(&mut self, block: &Block, in_focus: bool) {
        match block {
            Block::Div { attr, content } => {
                if self.skip.skips(attr) {
                    return;
                }
                let in_focus = in_focus || self.focus.marks(attr);
                self.visit_blocks(content, in_focus);
            }
            Block::Plain(inlines) | Block::Para(inlines) => self.visit_inlines(inlines, in_focus),
            Block::Header { content, .. } => self.visit_inlines(content, in_focus),
            Block::BlockQuote(blocks) | Block::Figure { content: blocks, .. } => {
                self.visit_blocks(blocks, in_focus)
            }
            Block::BulletList(items) | Block::OrderedList(items) => {
                for item in items {
                    self.visit_blocks(item, in_focus);
                }
            }
            Block::Table { caption } => {
                for block in caption {
                    if let Block::Plain(inlines) | Block::Para(inlines) = block {
                        self.visit_inlines(inlines, in_focus);
                    }
                }
            }
            Block::CodeBlock(_) | Block::RawBlock { .. } | Block::Other(_) => {}
        }
    }

    fn visit_inlines(&mut self, inlines: &[Inline], in_focus: bool) {
        for inline in inlines {
            match inline {
                Inline::Str(text) => {
                    if !self.focus_active || in_focus {
                        self.visit_text(text);
                    }
                }
                Inline::Emph(inner)
                | Inline::Strong(inner)
                | Inline::Quoted(inner)
                | Inline::Link(inner)
                | Inline::Image(inner) => self.visit_inlines(inner, in_focus),
                Inline::Span { attr, content } => {
                    let in_focus = in_focus || self.focus.marks(attr);
                    self.visit_inlines(content, in_focus);
                }
                Inline::Code(_)
                | Inline::Space
                | Inline::SoftBreak
                | Inline::LineBreak
                | Inline::RawInline { .. }
                | Inline::Other(_) => {}
            }
        }
    }

    fn visit_text(&mut self, text: &str) {
        for tok in text.split_whitespace() {
            if let Some(counted) = self.syllables.count_token(tok) {
                self.report.counts.syllables += counted.syllables;
                self.report.counts.words += 1;
                self.report.words.push(counted.word);
            }
        }
    }
}

/// Count a document with the default vowels and skip rules and no focus rule.
pub fn gather_stats(doc: &Document) -> CountReport {
    let syllables = SyllableCounter::default();
    let skip = SkipRules::default();
    let focus = FocusRule::default();
    Visitor::new(&syllables, &skip, &focus).visit_document(doc)
}
