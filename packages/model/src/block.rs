//! # Blocks
//!
//! A block is one typed, independently addressable unit of page content.
//!
//! The set of block types is closed. Each type has exactly one payload struct
//! and one default payload, declared together in `block_registry!` so that a
//! type without a payload (or a payload without a default) fails to compile.
//!
//! ## Wire format
//!
//! ```text
//! { "id": "3f2a9c1e-b4", "type": "faq", "data": { "question": "", "answer": "" }, "order": 2 }
//! ```
//!
//! Payload fields are camelCase and every field is defaulted, so documents
//! persisted with older payload shapes still load.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

macro_rules! block_registry {
    ($( $variant:ident => $name:literal, $label:literal, $payload:ident; )*) => {
        /// Closed set of block types
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum BlockType {
            $( $variant, )*
        }

        impl BlockType {
            /// Every block type, in palette order
            pub const ALL: &'static [BlockType] = &[ $( BlockType::$variant, )* ];

            /// Wire name (`"hero"`, `"info_box"`, ...)
            pub fn as_str(self) -> &'static str {
                match self {
                    $( BlockType::$variant => $name, )*
                }
            }

            /// Human-readable name for block palettes
            pub fn label(self) -> &'static str {
                match self {
                    $( BlockType::$variant => $label, )*
                }
            }

            /// Default payload for a freshly added block of this type
            pub fn default_data(self) -> BlockData {
                match self {
                    $( BlockType::$variant => BlockData::$variant($payload::default()), )*
                }
            }
        }

        impl FromStr for BlockType {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(BlockType::$variant), )*
                    other => Err(ModelError::UnknownBlockType(other.to_string())),
                }
            }
        }

        /// Typed block payload, one variant per [`BlockType`]
        #[derive(Debug, Clone, PartialEq)]
        pub enum BlockData {
            $( $variant($payload), )*
        }

        impl BlockData {
            pub fn block_type(&self) -> BlockType {
                match self {
                    $( BlockData::$variant(_) => BlockType::$variant, )*
                }
            }

            /// Serialize the payload alone (the `data` member on the wire)
            pub fn to_value(&self) -> Result<Value, serde_json::Error> {
                match self {
                    $( BlockData::$variant(payload) => serde_json::to_value(payload), )*
                }
            }

            /// Decode a payload for the given type
            pub fn from_value(block_type: BlockType, value: Value) -> Result<Self, serde_json::Error> {
                match block_type {
                    $( BlockType::$variant => serde_json::from_value(value).map(BlockData::$variant), )*
                }
            }
        }
    };
}

block_registry! {
    Hero => "hero", "Hero", HeroData;
    Heading => "heading", "Heading", HeadingData;
    Text => "text", "Text", TextData;
    Image => "image", "Image", ImageData;
    Gallery => "gallery", "Gallery", GalleryData;
    Video => "video", "Video", VideoData;
    Quote => "quote", "Quote", QuoteData;
    Faq => "faq", "FAQ", FaqData;
    Highlights => "highlights", "Highlights", HighlightsData;
    Tips => "tips", "Tips", TipsData;
    Cta => "cta", "Call to action", CtaData;
    Button => "button", "Button", ButtonData;
    List => "list", "List", ListData;
    Table => "table", "Table", TableData;
    Divider => "divider", "Divider", DividerData;
    Code => "code", "Code", CodeData;
    Embed => "embed", "Embed", EmbedData;
    Map => "map", "Map", MapData;
    Testimonial => "testimonial", "Testimonial", TestimonialData;
    InfoBox => "info_box", "Info box", InfoBoxData;
}

impl BlockType {
    /// Blocks that give the page a visible heading
    pub fn is_heading_like(self) -> bool {
        matches!(self, BlockType::Hero | BlockType::Heading)
    }

    /// Blocks that carry images
    pub fn is_media(self) -> bool {
        matches!(self, BlockType::Image | BlockType::Gallery)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroData {
    pub image: String,
    pub alt: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeadingData {
    pub text: String,
    pub level: u8,
}

impl Default for HeadingData {
    fn default() -> Self {
        Self {
            text: String::new(),
            level: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextData {
    pub contents: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageData {
    pub src: String,
    pub alt: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryImage {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryData {
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoData {
    pub url: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteData {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqData {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighlightsData {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TipsData {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaData {
    pub text: String,
    pub button_text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonData {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListData {
    pub items: Vec<String>,
    pub ordered: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DividerData {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeData {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbedData {
    pub url: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapData {
    pub address: String,
    pub zoom: u8,
}

impl Default for MapData {
    fn default() -> Self {
        Self {
            address: String::new(),
            zoom: 12,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialData {
    pub name: String,
    pub role: String,
    pub quote: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InfoBoxData {
    pub title: String,
    pub text: String,
    pub variant: String,
}

impl Default for InfoBoxData {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            variant: "info".to_string(),
        }
    }
}

impl BlockData {
    /// Shallow-merge `partial` into this payload.
    ///
    /// Top-level keys in `partial` replace the payload's keys; keys the
    /// payload schema does not know are dropped. Returns `Ok(true)` if the
    /// payload changed. On a schema mismatch (e.g. a string where a list is
    /// expected) the payload is left untouched and the error is returned.
    pub fn merge_json(&mut self, partial: &Map<String, Value>) -> Result<bool, serde_json::Error> {
        let block_type = self.block_type();
        let mut value = self.to_value()?;

        if let Value::Object(fields) = &mut value {
            for (key, field) in partial {
                fields.insert(key.clone(), field.clone());
            }
        }

        let merged = BlockData::from_value(block_type, value)?;
        if merged == *self {
            return Ok(false);
        }

        *self = merged;
        Ok(true)
    }
}

/// A single content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock", into = "RawBlock")]
pub struct Block {
    /// Unique within the document, stable across moves
    pub id: String,

    /// Typed payload
    pub data: BlockData,

    /// Position in the block sequence (always equal to the array index)
    pub order: usize,
}

impl Block {
    pub fn new(id: impl Into<String>, data: BlockData, order: usize) -> Self {
        Self {
            id: id.into(),
            data,
            order,
        }
    }

    /// Create a block with the type's default payload
    pub fn with_defaults(id: impl Into<String>, block_type: BlockType, order: usize) -> Self {
        Self::new(id, block_type.default_data(), order)
    }

    pub fn block_type(&self) -> BlockType {
        self.data.block_type()
    }
}

/// Wire shape of a block
#[derive(Serialize, Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    block_type: BlockType,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    order: usize,
}

impl TryFrom<RawBlock> for Block {
    type Error = ModelError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let data = match raw.data {
            Value::Null => raw.block_type.default_data(),
            value => BlockData::from_value(raw.block_type, value).map_err(|e| {
                ModelError::InvalidPayload {
                    block_id: raw.id.clone(),
                    message: e.to_string(),
                }
            })?,
        };

        Ok(Block {
            id: raw.id,
            data,
            order: raw.order,
        })
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let block_type = block.block_type();
        // Payload structs only hold strings, numbers, bools and lists of
        // those, which always serialize.
        let data = block.data.to_value().unwrap_or(Value::Null);

        RawBlock {
            id: block.id,
            block_type,
            data,
            order: block.order,
        }
    }
}
