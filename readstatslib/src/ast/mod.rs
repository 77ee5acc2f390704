//! Pandoc document tree.
//!
//! Markdown is never parsed here. Documents come from Pandoc's JSON writer
//! (`pandoc -t json`) and are decoded into the small typed tree below, which
//! keeps only what the counters look at. Every node kind the counters do not
//! understand survives as `Other(tag)` so that the walk can skip it.

pub mod decode;
pub mod loader;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::Result;

pub use loader::{AstLoader, AutoLoader, JsonLoader, PandocLoader, PANDOC_READER_FORMAT};

/// Element attributes: `[identifier, [classes], [[key, value]]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attr {
    pub id: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
}

impl Attr {
    /// Attributes with only an identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Attributes with only classes.
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Whether any class is in `names`.
    pub fn has_any_class(&self, names: &[String]) -> bool {
        self.classes.iter().any(|c| names.iter().any(|n| n == c))
    }
}

/// Inline elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Str(String),
    Emph(Vec<Inline>),
    Strong(Vec<Inline>),
    Span { attr: Attr, content: Vec<Inline> },
    Quoted(Vec<Inline>),
    /// Link text; the target is irrelevant for counting.
    Link(Vec<Inline>),
    /// Image alt text.
    Image(Vec<Inline>),
    Code(String),
    Space,
    SoftBreak,
    LineBreak,
    RawInline { format: String, text: String },
    Other(String),
}

/// Block elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Plain(Vec<Inline>),
    Para(Vec<Inline>),
    Header {
        level: u8,
        attr: Attr,
        content: Vec<Inline>,
    },
    BlockQuote(Vec<Block>),
    Div {
        attr: Attr,
        content: Vec<Block>,
    },
    Figure {
        attr: Attr,
        content: Vec<Block>,
    },
    BulletList(Vec<Vec<Block>>),
    OrderedList(Vec<Vec<Block>>),
    /// Only the caption survives decoding; cells are never counted.
    Table {
        caption: Vec<Block>,
    },
    CodeBlock(String),
    RawBlock {
        format: String,
        text: String,
    },
    Other(String),
}

/// Metadata values that matter for counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Inlines(Vec<Inline>),
    String(String),
    Other,
}

impl MetaValue {
    /// The value as inline content, if it has any.
    pub fn to_inlines(&self) -> Vec<Inline> {
        match self {
            MetaValue::Inlines(inlines) => inlines.clone(),
            MetaValue::String(s) => vec![Inline::Str(s.clone())],
            MetaValue::Other => Vec::new(),
        }
    }
}

/// A whole Pandoc document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub meta: BTreeMap<String, MetaValue>,
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a document from body blocks.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            meta: BTreeMap::new(),
            blocks,
        }
    }

    /// Builder: set a metadata field.
    pub fn with_meta(mut self, key: impl Into<String>, value: MetaValue) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Decode a document from Pandoc JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Decode a document from an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self> {
        decode::document(value)
    }
}
