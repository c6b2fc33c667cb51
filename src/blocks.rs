use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Closed catalog of block variants. Converting a block to another type never
/// changes its identity, only its `block_type` (and possibly its properties).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    Todo,
    Code,
    Quote,
    Callout,
    Banner,
    Toggle,
    Table,
    Divider,
    Image,
    File,
    Link,
    Page,
    Bookmark,
    Date,
    Tag,
    Column,
    Row,
    Embed,
    Video,
    Diagram,
}

/// Property shape classes. Conversion between types in the same class keeps
/// the `properties` map; crossing classes resets everything but style keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PropShape {
    PlainText,
    Todo,
    Code,
    Table,
    Reference,
    Embed,
    Layout,
    Inert,
}

impl BlockType {
    pub const ALL: &'static [BlockType] = &[
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::BulletList,
        BlockType::NumberedList,
        BlockType::Todo,
        BlockType::Code,
        BlockType::Quote,
        BlockType::Callout,
        BlockType::Banner,
        BlockType::Toggle,
        BlockType::Table,
        BlockType::Divider,
        BlockType::Image,
        BlockType::File,
        BlockType::Link,
        BlockType::Page,
        BlockType::Bookmark,
        BlockType::Date,
        BlockType::Tag,
        BlockType::Column,
        BlockType::Row,
        BlockType::Embed,
        BlockType::Video,
        BlockType::Diagram,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "Text",
            BlockType::Heading1 => "Heading 1",
            BlockType::Heading2 => "Heading 2",
            BlockType::Heading3 => "Heading 3",
            BlockType::BulletList => "Bulleted list",
            BlockType::NumberedList => "Numbered list",
            BlockType::Todo => "To-do",
            BlockType::Code => "Code block",
            BlockType::Quote => "Quote",
            BlockType::Callout => "Callout",
            BlockType::Banner => "Banner",
            BlockType::Toggle => "Toggle list",
            BlockType::Table => "Table",
            BlockType::Divider => "Divider",
            BlockType::Image => "Image",
            BlockType::File => "File",
            BlockType::Link => "Link",
            BlockType::Page => "Page",
            BlockType::Bookmark => "Bookmark",
            BlockType::Date => "Date",
            BlockType::Tag => "Tag",
            BlockType::Column => "Column",
            BlockType::Row => "Row",
            BlockType::Embed => "Embed",
            BlockType::Video => "Video",
            BlockType::Diagram => "Diagram",
        }
    }

    /// Only containers may be referenced by `parent_block_id`.
    pub fn is_container(&self) -> bool {
        matches!(self, BlockType::Column)
    }

    /// Whether `content` holds user-editable plain text. Code content is
    /// source text owned by the code sub-editor, not the block input.
    pub fn accepts_text_content(&self) -> bool {
        !matches!(self, BlockType::Divider | BlockType::Table | BlockType::Code)
    }

    pub(crate) fn prop_shape(&self) -> PropShape {
        match self {
            BlockType::Paragraph
            | BlockType::Heading1
            | BlockType::Heading2
            | BlockType::Heading3
            | BlockType::BulletList
            | BlockType::NumberedList
            | BlockType::Quote
            | BlockType::Callout
            | BlockType::Banner
            | BlockType::Toggle
            | BlockType::Date
            | BlockType::Tag => PropShape::PlainText,
            BlockType::Todo => PropShape::Todo,
            BlockType::Code => PropShape::Code,
            BlockType::Table => PropShape::Table,
            BlockType::Image | BlockType::File | BlockType::Link | BlockType::Page => {
                PropShape::Reference
            }
            BlockType::Bookmark | BlockType::Embed | BlockType::Video | BlockType::Diagram => {
                PropShape::Embed
            }
            BlockType::Column | BlockType::Row => PropShape::Layout,
            BlockType::Divider => PropShape::Inert,
        }
    }
}

/// Free-form style overrides survive any type conversion.
pub(crate) const STYLE_KEYS: &[&str] = &["background_color", "text_color", "alignment", "spacing"];

pub(crate) const PROP_CHECKED: &str = "checked";
pub(crate) const PROP_LANGUAGE: &str = "language";
pub(crate) const PROP_URL: &str = "url";
pub(crate) const PROP_TABLE_DATA: &str = "table_data";
pub(crate) const PROP_WIDTH: &str = "width";
pub(crate) const PROP_COLLAPSED: &str = "collapsed";
pub(crate) const PROP_LOCKED: &str = "locked";

/// One unit of document content. Sequence position in the store is the sole
/// source of truth for render order; there is no persisted index field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_block_id: Option<String>,
}

impl Block {
    pub fn new(block_type: BlockType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            block_type,
            content: String::new(),
            properties: Map::new(),
            parent_block_id: None,
        }
    }

    pub fn paragraph() -> Self {
        Self::new(BlockType::Paragraph)
    }

    pub fn with_parent(mut self, parent_block_id: Option<&str>) -> Self {
        self.parent_block_id = parent_block_id.map(str::to_string);
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    /// Typed view over the open `properties` map for this block's variant.
    pub fn props(&self) -> BlockProps {
        BlockProps::read(self)
    }
}

/// Typed projections of the `properties` bag, one per shape class that
/// carries state. Reading is total: missing or mistyped keys fall back to
/// defaults rather than failing.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockProps {
    Todo {
        checked: bool,
    },
    Code {
        language: Option<String>,
    },
    Embed {
        url: Option<String>,
    },
    Table {
        table_data: Option<Value>,
    },
    Column {
        width: Option<f64>,
        collapsed: bool,
        locked: bool,
    },
    Plain,
}

impl BlockProps {
    pub fn read(block: &Block) -> Self {
        let props = &block.properties;
        match block.block_type {
            BlockType::Todo => BlockProps::Todo {
                checked: props
                    .get(PROP_CHECKED)
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            BlockType::Code => BlockProps::Code {
                language: props
                    .get(PROP_LANGUAGE)
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            BlockType::Bookmark | BlockType::Embed | BlockType::Video | BlockType::Diagram => {
                BlockProps::Embed {
                    url: props
                        .get(PROP_URL)
                        .and_then(Value::as_str)
                        .map(str::to_string),
                }
            }
            BlockType::Table => BlockProps::Table {
                table_data: props.get(PROP_TABLE_DATA).cloned(),
            },
            BlockType::Column => BlockProps::Column {
                width: props.get(PROP_WIDTH).and_then(Value::as_f64),
                collapsed: props
                    .get(PROP_COLLAPSED)
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                locked: props
                    .get(PROP_LOCKED)
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            _ => BlockProps::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&BlockType::BulletList).unwrap(),
            "\"bullet_list\""
        );
        // serde's snake_case does not insert an underscore before a digit.
        assert_eq!(
            serde_json::to_string(&BlockType::Heading1).unwrap(),
            "\"heading1\""
        );
        assert_eq!(
            serde_json::from_str::<BlockType>("\"heading1\"").unwrap(),
            BlockType::Heading1
        );
    }

    #[test]
    fn only_column_is_container() {
        for block_type in BlockType::ALL {
            assert_eq!(
                block_type.is_container(),
                *block_type == BlockType::Column,
                "{block_type:?}"
            );
        }
    }

    #[test]
    fn text_content_flag_excludes_divider_table_code() {
        assert!(!BlockType::Divider.accepts_text_content());
        assert!(!BlockType::Table.accepts_text_content());
        assert!(!BlockType::Code.accepts_text_content());
        assert!(BlockType::Paragraph.accepts_text_content());
        assert!(BlockType::Quote.accepts_text_content());
    }

    #[test]
    fn new_block_has_fresh_id_and_defaults() {
        let a = Block::paragraph();
        let b = Block::paragraph();
        assert_ne!(a.id, b.id);
        assert_eq!(a.block_type, BlockType::Paragraph);
        assert!(a.content.is_empty());
        assert!(a.properties.is_empty());
        assert!(a.parent_block_id.is_none());
    }

    #[test]
    fn todo_props_default_unchecked() {
        let block = Block::new(BlockType::Todo);
        assert_eq!(block.props(), BlockProps::Todo { checked: false });

        let mut checked = Block::new(BlockType::Todo);
        checked.properties.insert(PROP_CHECKED.into(), json!(true));
        assert_eq!(checked.props(), BlockProps::Todo { checked: true });
    }

    #[test]
    fn props_tolerate_mistyped_values() {
        let mut block = Block::new(BlockType::Todo);
        block.properties.insert(PROP_CHECKED.into(), json!("yes"));
        assert_eq!(block.props(), BlockProps::Todo { checked: false });
    }

    #[test]
    fn block_round_trips_through_json() {
        let mut block = Block::new(BlockType::Code).with_content("fn main() {}");
        block
            .properties
            .insert(PROP_LANGUAGE.into(), json!("rust"));
        let text = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&text).unwrap();
        assert_eq!(back, block);
    }
}
