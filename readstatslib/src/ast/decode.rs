//! Decoding of Pandoc's JSON encoding into [`Document`].
//!
//! Pandoc encodes every element as `{"t": tag, "c": content}`. Decoding is
//! forgiving: a known tag with unexpected content yields an empty node and an
//! unknown tag yields `Other`, so documents produced by newer or older pandoc
//! versions still count.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ReadstatsError;
use crate::Result;

use super::{Attr, Block, Document, Inline, MetaValue};

/// Decode a top-level document.
pub fn document(value: &Value) -> Result<Document> {
    let obj = value
        .as_object()
        .ok_or_else(|| ReadstatsError::InvalidAst("document is not a JSON object".into()))?;

    let blocks = match obj.get("blocks") {
        Some(Value::Array(items)) => blocks(items),
        Some(_) => {
            return Err(ReadstatsError::InvalidAst(
                "'blocks' is not an array".into(),
            ))
        }
        None => Vec::new(),
    };

    let meta = obj
        .get("meta")
        .and_then(Value::as_object)
        .map(meta_map)
        .unwrap_or_default();

    Ok(Document { meta, blocks })
}

fn meta_map(obj: &Map<String, Value>) -> BTreeMap<String, MetaValue> {
    obj.iter()
        .map(|(key, value)| (key.clone(), meta_value(value)))
        .collect()
}

fn meta_value(value: &Value) -> MetaValue {
    match tagged(value) {
        Some(("MetaInlines", Some(Value::Array(items)))) => MetaValue::Inlines(inlines(items)),
        Some(("MetaString", Some(Value::String(s)))) => MetaValue::String(s.clone()),
        _ => MetaValue::Other,
    }
}

/// Split an element into its tag and optional content.
fn tagged(value: &Value) -> Option<(&str, Option<&Value>)> {
    let obj = value.as_object()?;
    let tag = obj.get("t")?.as_str()?;
    Some((tag, obj.get("c")))
}

fn array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn string(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

fn attr(value: Option<&Value>) -> Attr {
    let parts = array(value);
    let classes = array(parts.get(1))
        .iter()
        .filter_map(|c| c.as_str().map(str::to_string))
        .collect();
    let attributes = array(parts.get(2))
        .iter()
        .filter_map(|kv| match kv.as_array().map(Vec::as_slice) {
            Some([Value::String(k), Value::String(v)]) => Some((k.clone(), v.clone())),
            _ => None,
        })
        .collect();

    Attr {
        id: string(parts.first()),
        classes,
        attributes,
    }
}

/// Decode a list of inline elements.
pub fn inlines(items: &[Value]) -> Vec<Inline> {
    items.iter().map(inline).collect()
}

/// Decode a list of block elements.
pub fn blocks(items: &[Value]) -> Vec<Block> {
    items.iter().map(block).collect()
}

fn inline(value: &Value) -> Inline {
    let Some((tag, content)) = tagged(value) else {
        return Inline::Other(String::new());
    };
    let parts = array(content);

    match tag {
        "Str" => Inline::Str(string(content)),
        "Emph" => Inline::Emph(inlines(parts)),
        "Strong" => Inline::Strong(inlines(parts)),
        "Span" => Inline::Span {
            attr: attr(parts.first()),
            content: inlines(array(parts.get(1))),
        },
        "Quoted" => Inline::Quoted(if parts.len() == 2 {
            inlines(array(parts.get(1)))
        } else {
            Vec::new()
        }),
        "Link" => Inline::Link(link_text(parts)),
        "Image" => Inline::Image(link_text(parts)),
        "Code" => Inline::Code(string(parts.get(1))),
        "Space" => Inline::Space,
        "SoftBreak" => Inline::SoftBreak,
        "LineBreak" => Inline::LineBreak,
        "RawInline" => Inline::RawInline {
            format: string(parts.first()),
            text: string(parts.get(1)),
        },
        other => Inline::Other(other.to_string()),
    }
}

/// Text of a link or image: `[attr, inlines, target]`, or the older
/// `[inlines, target]`.
fn link_text(parts: &[Value]) -> Vec<Inline> {
    [parts.get(1), parts.first()]
        .into_iter()
        .flatten()
        .find_map(|candidate| match candidate {
            Value::Array(items) if items.iter().all(Value::is_object) => Some(inlines(items)),
            _ => None,
        })
        .unwrap_or_default()
}

fn block(value: &Value) -> Block {
    let Some((tag, content)) = tagged(value) else {
        return Block::Other(String::new());
    };
    let parts = array(content);

    match tag {
        "Plain" => Block::Plain(inlines(parts)),
        "Para" => Block::Para(inlines(parts)),
        "Header" => Block::Header {
            level: parts
                .first()
                .and_then(Value::as_u64)
                .map(|l| l.min(u8::MAX as u64) as u8)
                .unwrap_or(1),
            attr: attr(parts.get(1)),
            content: inlines(array(parts.get(2))),
        },
        "BlockQuote" => Block::BlockQuote(blocks(parts)),
        "Div" => Block::Div {
            attr: attr(parts.first()),
            content: blocks(array(parts.get(1))),
        },
        "Figure" => figure(parts),
        "BulletList" => Block::BulletList(list_items(parts)),
        "OrderedList" => Block::OrderedList(list_items(array(parts.get(1)))),
        "Table" => Block::Table {
            caption: table_caption(parts),
        },
        "CodeBlock" => Block::CodeBlock(string(parts.get(1))),
        "RawBlock" => Block::RawBlock {
            format: string(parts.first()),
            text: string(parts.get(1)),
        },
        other => Block::Other(other.to_string()),
    }
}

/// `Figure [attr, caption, blocks]`. When the content is not in the third
/// slot, any element-shaped values in the node are taken as its blocks.
fn figure(parts: &[Value]) -> Block {
    let content = match parts.get(2) {
        Some(Value::Array(items)) => blocks(items),
        _ => parts
            .iter()
            .filter(|v| tagged(v).is_some())
            .map(block)
            .collect(),
    };

    Block::Figure {
        attr: attr(parts.first()),
        content,
    }
}

fn list_items(items: &[Value]) -> Vec<Vec<Block>> {
    items.iter().map(|item| blocks(array(Some(item)))).collect()
}

/// Long caption blocks of a table.
///
/// Current pandoc writes `Table [attr, [short, blocks], ...]`; older output
/// carried a `{"t": "Caption", "c": [short, blocks]}` object up front.
fn table_caption(parts: &[Value]) -> Vec<Block> {
    if let Some(("Caption", Some(Value::Array(caption)))) = parts.first().and_then(tagged) {
        return blocks(array(caption.get(1)));
    }

    match parts.get(1) {
        Some(Value::Array(caption)) if caption.len() == 2 => blocks(array(caption.get(1))),
        _ => Vec::new(),
    }
}
