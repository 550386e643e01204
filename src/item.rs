//! Label items: text blocks and QR codes placed on the printable area.
//!
//! Coordinates and sizes are in dip, relative to the top-left corner of the
//! printable area (the margin is already excluded).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{error::Error, units};

/// Positions beyond this many dots from the origin are rejected.
pub const MAX_POSITION_DOTS: f64 = i32::MAX as f64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique item identifier. Never reused, not preserved by a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        ItemId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;
pub const DEFAULT_TEXT_HEIGHT: f64 = 80.0;
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_QR_SIZE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// One or more display lines, separated by `\n` or `\r\n`.
    pub content: String,
    pub font_size: f64,
    pub bold: bool,
}

impl TextItem {
    /// Content split into display lines after normalizing `\r\n` to `\n`.
    pub fn lines(&self) -> Vec<String> {
        self.content
            .replace("\r\n", "\n")
            .split('\n')
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QrItem {
    /// Raw payload encoded into the symbol.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Text(TextItem),
    Qr(QrItem),
}

/// A positioned label item.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    id: ItemId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: ItemKind,
}

impl LayoutItem {
    /// New text item with the default 200x80 box.
    pub fn text(content: impl Into<String>, x: f64, y: f64, font_size: f64, bold: bool) -> Self {
        LayoutItem {
            id: ItemId::next(),
            x,
            y,
            width: DEFAULT_TEXT_WIDTH,
            height: DEFAULT_TEXT_HEIGHT,
            kind: ItemKind::Text(TextItem {
                content: content.into(),
                font_size,
                bold,
            }),
        }
    }

    /// New square QR item.
    pub fn qr(content: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        LayoutItem {
            id: ItemId::next(),
            x,
            y,
            width: size,
            height: size,
            kind: ItemKind::Qr(QrItem {
                content: content.into(),
            }),
        }
    }

    pub fn with_size(self, width: f64, height: f64) -> Self {
        LayoutItem {
            width,
            height,
            ..self
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn content(&self) -> &str {
        match &self.kind {
            ItemKind::Text(t) => &t.content,
            ItemKind::Qr(q) => &q.content,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ItemKind::Text(_))
    }

    pub fn is_qr(&self) -> bool {
        matches!(self.kind, ItemKind::Qr(_))
    }

    /// Check the invariants the encoder relies on.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(self.invalid(format!("position ({}, {}) is not finite", self.x, self.y)));
        }
        if units::dip_to_dots(self.x).abs() > MAX_POSITION_DOTS
            || units::dip_to_dots(self.y).abs() > MAX_POSITION_DOTS
        {
            return Err(self.invalid(format!(
                "position ({}, {}) is off any printable page",
                self.x, self.y
            )));
        }
        if !(self.width > 0.0 && self.width.is_finite())
            || !(self.height > 0.0 && self.height.is_finite())
        {
            return Err(self.invalid(format!(
                "size {}x{} must be positive",
                self.width, self.height
            )));
        }
        match &self.kind {
            ItemKind::Text(t) => {
                if !(t.font_size > 0.0 && t.font_size.is_finite()) {
                    return Err(self.invalid(format!("font size {} must be positive", t.font_size)));
                }
            }
            ItemKind::Qr(q) => {
                // the payload travels on its own line
                if q.content.contains(|c: char| c == '\n' || c == '\r') {
                    return Err(self.invalid("QR payload contains a line break".to_string()));
                }
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidItem {
            id: self.id,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = LayoutItem::text("a", 0.0, 0.0, 10.0, false);
        let b = LayoutItem::text("a", 0.0, 0.0, 10.0, false);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn defaults() {
        let t = LayoutItem::text("hello", 1.0, 2.0, DEFAULT_FONT_SIZE, false);
        assert_eq!((t.width, t.height), (200.0, 80.0));
        assert!(t.is_text());
        let q = LayoutItem::qr("payload", 0.0, 0.0, DEFAULT_QR_SIZE);
        assert_eq!((q.width, q.height), (100.0, 100.0));
        assert_eq!(q.content(), "payload");
    }

    #[test]
    fn lines_normalize_crlf() {
        let t = TextItem {
            content: "one\r\ntwo\nthree".to_string(),
            font_size: 10.0,
            bold: false,
        };
        assert_eq!(t.lines(), vec!["one", "two", "three"]);

        let empty = TextItem {
            content: String::new(),
            font_size: 10.0,
            bold: false,
        };
        assert_eq!(empty.lines(), vec![""]);
    }

    #[test]
    fn validate_rejects_broken_items() {
        assert!(LayoutItem::text("ok", 0.0, 0.0, 10.0, true).validate().is_ok());
        assert!(LayoutItem::text("x", 0.0, 0.0, 10.0, false)
            .with_size(0.0, 10.0)
            .validate()
            .is_err());
        assert!(LayoutItem::text("x", f64::NAN, 0.0, 10.0, false)
            .validate()
            .is_err());
        assert!(LayoutItem::text("x", 0.0, 0.0, 0.0, false).validate().is_err());
        assert!(LayoutItem::text("x", 1e300, 0.0, 10.0, false)
            .validate()
            .is_err());
        assert!(LayoutItem::qr("q", 0.0, -1e12, 50.0).validate().is_err());

        match LayoutItem::qr("a\nb", 0.0, 0.0, 50.0).validate() {
            Err(Error::InvalidItem { reason, .. }) => assert!(reason.contains("line break")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
