//! Photo tags
//!
//! A tag is a labeled point on a photo, positioned in percent of the image
//! width and height. It either carries free text or refers to a person.

use serde::{Deserialize, Serialize};

/// Position of a tag, in percent of the image size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPosition {
    x: u8,
    y: u8,
}

impl TagPosition {
    /// Create a position, clamping both coordinates to `0..=100`
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x: x.clamp(0, 100) as u8,
            y: y.clamp(0, 100) as u8,
        }
    }

    /// Position of a click at pixel offset (`offset_x`, `offset_y`) inside an
    /// image displayed at `width` x `height` pixels
    pub fn from_click(offset_x: f64, offset_y: f64, width: f64, height: f64) -> Self {
        let percent = |offset: f64, extent: f64| -> i64 {
            if extent <= 0.0 {
                return 0;
            }
            (offset / extent * 100.0).round() as i64
        };
        Self::new(percent(offset_x, width), percent(offset_y, height))
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }
}

/// What a tag points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagKind {
    /// Free text
    Text(String),
    /// A person, by remote user id
    Person(u64),
}

/// A labeled point on a photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    label: String,
    position: TagPosition,
    kind: TagKind,
}

impl Tag {
    /// Free text tag; the text doubles as the label
    pub fn text(text: impl Into<String>, x: i64, y: i64) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            position: TagPosition::new(x, y),
            kind: TagKind::Text(text),
        }
    }

    /// Tag referring to the person with remote id `uid`
    pub fn person(uid: u64, label: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            label: label.into(),
            position: TagPosition::new(x, y),
            kind: TagKind::Person(uid),
        }
    }

    /// Create a tag at an already computed position
    pub fn at(kind: TagKind, label: impl Into<String>, position: TagPosition) -> Self {
        Self {
            label: label.into(),
            position,
            kind,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> TagPosition {
        self.position
    }

    pub fn x(&self) -> u8 {
        self.position.x
    }

    pub fn y(&self) -> u8 {
        self.position.y
    }

    pub fn kind(&self) -> &TagKind {
        &self.kind
    }

    /// The record sent to the tagging call
    pub fn to_record(&self) -> TagRecord {
        let value = match &self.kind {
            TagKind::Text(text) => TagValue::Text(text.clone()),
            TagKind::Person(uid) => TagValue::Person(*uid),
        };
        TagRecord {
            x: self.position.x,
            y: self.position.y,
            value,
        }
    }
}

/// Wire form of a tag: `{x, y, tag_text}` or `{x, y, tag_uid}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRecord {
    pub x: u8,
    pub y: u8,
    #[serde(flatten)]
    pub value: TagValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TagValue {
    #[serde(rename = "tag_text")]
    Text(String),
    #[serde(rename = "tag_uid")]
    Person(u64),
}

/// JSON array of records for a whole tag list, in insertion order
pub fn tags_to_json(tags: &[Tag]) -> serde_json::Result<String> {
    let records: Vec<TagRecord> = tags.iter().map(Tag::to_record).collect();
    serde_json::to_string(&records)
}
