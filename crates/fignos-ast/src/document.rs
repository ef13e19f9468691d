//! Block and inline node types.
//!
//! Every type serializes exactly as pandoc's JSON writer emits it, so a
//! document that passes through unmodified is returned byte-for-byte
//! equivalent (modulo key order).

use serde::{Deserialize, Serialize};

/// Element attributes: identifier, classes and ordered key/value pairs.
///
/// Serialized as the pandoc triple `[id, [classes], [[key, value], ...]]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(String, Vec<String>, Vec<(String, String)>)",
    into = "(String, Vec<String>, Vec<(String, String)>)"
)]
pub struct Attr {
    /// Element identifier (empty when absent).
    pub id: String,
    /// Class names in document order.
    pub classes: Vec<String>,
    /// Key/value attributes in document order.
    pub attributes: Vec<(String, String)>,
}

impl Attr {
    /// Create attributes with only an identifier.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// True when the identifier, classes and key/value pairs are all empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.classes.is_empty() && self.attributes.is_empty()
    }

    /// Look up a key/value attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl From<(String, Vec<String>, Vec<(String, String)>)> for Attr {
    fn from((id, classes, attributes): (String, Vec<String>, Vec<(String, String)>)) -> Self {
        Self {
            id,
            classes,
            attributes,
        }
    }
}

impl From<Attr> for (String, Vec<String>, Vec<(String, String)>) {
    fn from(attr: Attr) -> Self {
        (attr.id, attr.classes, attr.attributes)
    }
}

/// Link or image target: URL and title.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Target {
    /// Destination URL.
    pub url: String,
    /// Title; pandoc marks implicit figures with a `fig:` title prefix.
    pub title: String,
}

impl Target {
    /// Create a target from a URL and title.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

impl From<(String, String)> for Target {
    fn from((url, title): (String, String)) -> Self {
        Self { url, title }
    }
}

impl From<Target> for (String, String) {
    fn from(target: Target) -> Self {
        (target.url, target.title)
    }
}

/// Block-level node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Block {
    Plain(Vec<Inline>),
    Para(Vec<Inline>),
    LineBlock(Vec<Vec<Inline>>),
    CodeBlock(Attr, String),
    /// Raw content for one output format (e.g. `tex`, `html`, `openxml`).
    RawBlock(String, String),
    BlockQuote(Vec<Block>),
    OrderedList(ListAttributes, Vec<Vec<Block>>),
    BulletList(Vec<Vec<Block>>),
    DefinitionList(Vec<(Vec<Inline>, Vec<Vec<Block>>)>),
    Header(i64, Attr, Vec<Inline>),
    HorizontalRule,
    Table(
        Attr,
        Caption,
        Vec<ColSpec>,
        TableHead,
        Vec<TableBody>,
        TableFoot,
    ),
    /// Explicit figure block (pandoc API 1.23).
    Figure(Attr, Caption, Vec<Block>),
    Div(Attr, Vec<Block>),
    Null,
}

impl Block {
    /// Create a raw block for the given format.
    #[must_use]
    pub fn raw(format: &str, text: impl Into<String>) -> Self {
        Self::RawBlock(format.to_owned(), text.into())
    }
}

/// Inline-level node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Inline {
    Str(String),
    Emph(Vec<Inline>),
    Underline(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikeout(Vec<Inline>),
    Superscript(Vec<Inline>),
    Subscript(Vec<Inline>),
    SmallCaps(Vec<Inline>),
    Quoted(QuoteType, Vec<Inline>),
    Cite(Vec<Citation>, Vec<Inline>),
    Code(Attr, String),
    Space,
    SoftBreak,
    LineBreak,
    Math(MathType, String),
    RawInline(String, String),
    Link(Attr, Vec<Inline>, Target),
    Image(Attr, Vec<Inline>, Target),
    Note(Vec<Block>),
    Span(Attr, Vec<Inline>),
}

impl Inline {
    /// Create a `Str` inline.
    #[must_use]
    pub fn str(text: impl Into<String>) -> Self {
        Self::Str(text.into())
    }

    /// Create a raw inline for the given format.
    #[must_use]
    pub fn raw(format: &str, text: impl Into<String>) -> Self {
        Self::RawInline(format.to_owned(), text.into())
    }

    /// Create an inline math element.
    #[must_use]
    pub fn inline_math(text: impl Into<String>) -> Self {
        Self::Math(MathType::InlineMath, text.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum QuoteType {
    SingleQuote,
    DoubleQuote,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum MathType {
    DisplayMath,
    InlineMath,
}

/// One citation inside a `Cite` element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub citation_id: String,
    pub citation_prefix: Vec<Inline>,
    pub citation_suffix: Vec<Inline>,
    pub citation_mode: CitationMode,
    pub citation_note_num: i64,
    pub citation_hash: i64,
}

impl Citation {
    /// Create an in-text citation (`@id`) with no prefix or suffix.
    #[must_use]
    pub fn author_in_text(id: impl Into<String>) -> Self {
        Self {
            citation_id: id.into(),
            citation_prefix: Vec::new(),
            citation_suffix: Vec::new(),
            citation_mode: CitationMode::AuthorInText,
            citation_note_num: 0,
            citation_hash: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum CitationMode {
    AuthorInText,
    SuppressAuthor,
    NormalCitation,
}

/// Ordered list start number, style and delimiter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAttributes(pub i64, pub ListNumberStyle, pub ListNumberDelim);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum ListNumberStyle {
    DefaultStyle,
    Example,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum ListNumberDelim {
    DefaultDelim,
    Period,
    OneParen,
    TwoParens,
}

/// Table or figure caption: optional short caption and the caption body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Caption(pub Option<Vec<Inline>>, pub Vec<Block>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColSpec(pub Alignment, pub ColWidth);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Alignment {
    AlignLeft,
    AlignRight,
    AlignCenter,
    AlignDefault,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum ColWidth {
    ColWidth(f64),
    ColWidthDefault,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableHead(pub Attr, pub Vec<Row>);

/// Table body: attributes, row-head column count, intermediate head rows
/// and body rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableBody(pub Attr, pub i64, pub Vec<Row>, pub Vec<Row>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableFoot(pub Attr, pub Vec<Row>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row(pub Attr, pub Vec<Cell>);

/// Table cell: attributes, alignment, row span, column span and content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell(pub Attr, pub Alignment, pub i64, pub i64, pub Vec<Block>);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_attr_serializes_as_triple() {
        let attr = Attr {
            id: "fig:one".to_owned(),
            classes: vec!["wide".to_owned()],
            attributes: vec![("tag".to_owned(), "A".to_owned())],
        };
        assert_eq!(
            serde_json::to_value(&attr).unwrap(),
            json!(["fig:one", ["wide"], [["tag", "A"]]])
        );
    }

    #[test]
    fn test_attr_get() {
        let attr: Attr = serde_json::from_value(json!(["", [], [["secno", "2"]]])).unwrap();
        assert_eq!(attr.get("secno"), Some("2"));
        assert_eq!(attr.get("tag"), None);
        assert!(!attr.is_empty());
        assert!(Attr::default().is_empty());
    }

    #[test]
    fn test_image_figure_paragraph() {
        let value = json!({
            "t": "Para",
            "c": [{
                "t": "Image",
                "c": [["fig:one", [], []], [{"t": "Str", "c": "Caption"}], ["img.png", "fig:"]]
            }]
        });
        let block: Block = serde_json::from_value(value.clone()).unwrap();
        let Block::Para(inlines) = &block else {
            panic!("expected Para");
        };
        let Inline::Image(attr, caption, target) = &inlines[0] else {
            panic!("expected Image");
        };
        assert_eq!(attr.id, "fig:one");
        assert_eq!(caption, &vec![Inline::str("Caption")]);
        assert_eq!(target.title, "fig:");
        assert_eq!(serde_json::to_value(&block).unwrap(), value);
    }

    #[test]
    fn test_unit_variants() {
        assert_eq!(serde_json::to_value(Inline::Space).unwrap(), json!({"t": "Space"}));
        let math: Inline =
            serde_json::from_value(json!({"t": "Math", "c": [{"t": "InlineMath"}, "x^2"]}))
                .unwrap();
        assert_eq!(math, Inline::inline_math("x^2"));
    }

    #[test]
    fn test_citation_fields_are_camel_case() {
        let cite = Inline::Cite(
            vec![Citation::author_in_text("fig:one")],
            vec![Inline::str("@fig:one")],
        );
        assert_eq!(
            serde_json::to_value(&cite).unwrap(),
            json!({
                "t": "Cite",
                "c": [[{
                    "citationId": "fig:one",
                    "citationPrefix": [],
                    "citationSuffix": [],
                    "citationMode": {"t": "AuthorInText"},
                    "citationNoteNum": 0,
                    "citationHash": 0
                }], [{"t": "Str", "c": "@fig:one"}]]
            })
        );
    }

    #[test]
    fn test_table_round_trip() {
        let value = json!({
            "t": "Table",
            "c": [
                ["", [], []],
                [null, [{"t": "Plain", "c": [{"t": "Str", "c": "Caption"}]}]],
                [[{"t": "AlignDefault"}, {"t": "ColWidthDefault"}],
                 [{"t": "AlignLeft"}, {"t": "ColWidth", "c": 0.5}]],
                [["", [], []], []],
                [[["", [], []], 0, [], [[["", [], []], [
                    [["", [], []], {"t": "AlignDefault"}, 1, 1, [{"t": "Plain", "c": [{"t": "Str", "c": "x"}]}]]
                ]]]]],
                [["", [], []], []]
            ]
        });
        let block: Block = serde_json::from_value(value.clone()).unwrap();
        assert!(matches!(block, Block::Table(..)));
        assert_eq!(serde_json::to_value(&block).unwrap(), value);
    }
}
