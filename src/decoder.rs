//! Rebuild a layout from a command stream.
//!
//! The stream does not store font sizes or item boxes. Font size comes back
//! from the active magnification bucket and boxes from [`TextMetrics`], so a
//! decoded layout only approximates the one that was encoded.

use log::{debug, warn};

use crate::{
    command::{self, Command},
    item::LayoutItem,
    metrics::TextMetrics,
    units, BASE_GLYPH_DOTS, QR_DOTS_PER_UNIT,
};

/// Padding added around measured text, in dip.
pub const TEXT_PADDING_WIDTH: f64 = 10.0;
pub const TEXT_PADDING_HEIGHT: f64 = 5.0;

/// Modal rendering state carried from line to line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalState {
    pub magnification: u32,
    pub bold: bool,
}

impl Default for ModalState {
    fn default() -> Self {
        ModalState {
            magnification: 1,
            bold: false,
        }
    }
}

impl ModalState {
    /// State after `command` has been seen.
    pub fn apply(self, command: &Command) -> Self {
        match *command {
            // SETMAG 0 0 is the reset to normal size
            Command::SetMag(_, v) => ModalState {
                magnification: v.max(1),
                ..self
            },
            Command::SetBold(bold) => ModalState { bold, ..self },
            _ => self,
        }
    }

    /// Font size in dip implied by the active magnification.
    pub fn font_size(&self) -> f64 {
        units::dots_to_dip((BASE_GLYPH_DOTS * self.magnification as i64) as f64)
    }
}

/// Parse a command stream back into items.
///
/// `margin_mm` must be the margin the stream was encoded with. Malformed
/// lines are skipped and a QR code without its payload line is dropped.
pub fn decode<M>(text: &str, margin_mm: f64, metrics: &M) -> Vec<LayoutItem>
where
    M: TextMetrics + ?Sized,
{
    let margin = units::mm_to_dots(margin_mm);
    let mut items = Vec::new();
    let mut state = ModalState::default();
    let mut lines = text.lines();

    while let Some(raw) = lines.next() {
        let parsed = match Command::parse(raw.trim()) {
            Some(parsed) => parsed,
            None => continue,
        };
        state = state.apply(&parsed);

        match parsed {
            Command::Text { x, y, content } => {
                let font_size = state.font_size();
                let measured = metrics.measure(&content, font_size, state.bold);
                let item = LayoutItem::text(
                    content,
                    to_dip(x, margin),
                    to_dip(y, margin),
                    font_size,
                    state.bold,
                )
                .with_size(
                    measured.width + TEXT_PADDING_WIDTH,
                    measured.height + TEXT_PADDING_HEIGHT,
                );
                items.push(item);
            }
            Command::BarcodeQr { x, y, unit } => match lines.next() {
                Some(payload) => {
                    let size = units::dots_to_dip(unit * QR_DOTS_PER_UNIT);
                    items.push(LayoutItem::qr(
                        command::qr_payload(payload),
                        to_dip(x, margin),
                        to_dip(y, margin),
                        size,
                    ));
                }
                None => warn!("QR code at ({}, {}) has no payload line", x, y),
            },
            _ => {}
        }
    }

    debug!("Decoded {} items", items.len());
    items
}

/// Subtracts in floating point so any parsed coordinate is accepted.
fn to_dip(dots: i64, margin: i64) -> f64 {
    units::dots_to_dip(dots as f64 - margin as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{item::ItemKind, metrics::Size};

    fn metrics(content: &str, font_size: f64, _bold: bool) -> Size {
        Size::new(content.chars().count() as f64 * font_size, font_size)
    }

    fn text_of(item: &LayoutItem) -> (&str, f64, bool) {
        match &item.kind {
            ItemKind::Text(t) => (t.content.as_str(), t.font_size, t.bold),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn modal_state_threads_through_lines() {
        let job = "SETBOLD 1\nSETMAG 3 3\nTEXT 7 0 0 0 big\nSETMAG 0 0\nSETBOLD 0\nTEXT 7 0 0 0 small\n";
        let items = decode(job, 0.0, &metrics);
        assert_eq!(items.len(), 2);

        let (content, font_size, bold) = text_of(&items[0]);
        assert_eq!(content, "big");
        assert_eq!(font_size, units::dots_to_dip(72.0));
        assert!(bold);

        let (content, font_size, bold) = text_of(&items[1]);
        assert_eq!(content, "small");
        assert_eq!(font_size, units::dots_to_dip(24.0));
        assert!(!bold);
    }

    #[test]
    fn text_box_is_measured_plus_padding() {
        let items = decode("TEXT 7 0 0 0 abc", 0.0, &metrics);
        let font_size = units::dots_to_dip(24.0);
        assert_eq!(items[0].width, 3.0 * font_size + TEXT_PADDING_WIDTH);
        assert_eq!(items[0].height, font_size + TEXT_PADDING_HEIGHT);
    }

    #[test]
    fn coordinates_remove_margin() {
        let items = decode("TEXT 7 0 16 37 x", 2.0, &metrics);
        assert_eq!(items[0].x, 0.0);
        assert_eq!(items[0].y, units::dots_to_dip(21.0));
    }

    #[test]
    fn qr_consumes_next_line() {
        let job = "BARCODE QR 16 16 M 2 U 6\r\nMA,TEXT 7 0 1 1 not text\r\nENDQR\r\n";
        let items = decode(job, 2.0, &metrics);
        assert_eq!(items.len(), 1);
        assert!(items[0].is_qr());
        assert_eq!(items[0].content(), "TEXT 7 0 1 1 not text");
        assert_eq!(items[0].width, units::dots_to_dip(6.0 * 33.0));
        assert_eq!(items[0].width, items[0].height);
    }

    #[test]
    fn qr_without_unit_uses_default() {
        let items = decode("BARCODE QR 0 0 M 2\nMA,x", 0.0, &metrics);
        assert_eq!(items[0].width, units::dots_to_dip(4.0 * 33.0));
    }

    #[test]
    fn truncated_qr_is_dropped() {
        let items = decode("TEXT 7 0 0 0 a\nBARCODE QR 0 0 M 2 U 3", 0.0, &metrics);
        assert_eq!(items.len(), 1);
        assert!(items[0].is_text());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let job = "TEXT 7 0 5\nSETMAG 2 two\nTEXT 7 0 0 0 ok\nGAP-SENSE\n";
        let items = decode(job, 0.0, &metrics);
        assert_eq!(items.len(), 1);
        let (_, font_size, _) = text_of(&items[0]);
        assert_eq!(font_size, units::dots_to_dip(24.0));
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let job = "TEXT 7 0 -9223372036854775808 9223372036854775807 x\nBARCODE QR -9223372036854775808 0 M 2 U 1\nMA,q";
        let items = decode(job, 2.0, &metrics);
        assert_eq!(items.len(), 2);
        assert!(items[0].x < 0.0 && items[0].x.is_finite());
        assert!(items[0].y > 0.0 && items[0].y.is_finite());
        assert!(items[1].x < 0.0 && items[1].x.is_finite());
    }

    #[test]
    fn fresh_ids() {
        let job = "TEXT 7 0 0 0 a";
        let first = decode(job, 0.0, &metrics);
        let second = decode(job, 0.0, &metrics);
        assert_ne!(first[0].id(), second[0].id());
    }
}
