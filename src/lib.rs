//! CPCL Label Layouts
//!
//! This crate converts label layouts made of text blocks and QR codes into
//! CPCL command streams for 203 dpi label printers, parses such streams back
//! into layouts, and sends them to a printer over USB.
//!
//! # Example
//!
//! ```rust
//! use cpcl_label::{decode, encode, FixedPitchMetrics, LayoutItem, MarginSetting, PageGeometry, PaperSize};
//!
//! let geometry = PageGeometry::new(PaperSize::Label60x40, MarginSetting::Standard);
//! let items = vec![
//!     LayoutItem::text("Item 42\nShelf B", 10.0, 10.0, 12.0, true),
//!     LayoutItem::qr("https://example.com/42", 120.0, 10.0, 80.0),
//! ];
//!
//! let job = encode(&items, &geometry).unwrap();
//! let decoded = decode(&job, geometry.margin_mm(), &FixedPitchMetrics);
//! assert_eq!(decoded.len(), 3);
//! ```

mod command;
mod decoder;
mod encoder;
mod error;
mod item;
mod metrics;
mod paper;
mod printer;
pub mod units;

pub use crate::{
    command::Command,
    decoder::{decode, ModalState, TEXT_PADDING_HEIGHT, TEXT_PADDING_WIDTH},
    encoder::{encode, magnification, qr_unit, LINE_ENDING},
    error::Error,
    item::{
        ItemId, ItemKind, LayoutItem, QrItem, TextItem, DEFAULT_FONT_SIZE, DEFAULT_QR_SIZE,
        DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH,
    },
    metrics::{FixedPitchMetrics, Size, TextMetrics},
    paper::{MarginSetting, PageGeometry, PaperSize},
    printer::{Printer, PrinterConfig},
};

/// Printer resolution: 203 dpi is 8 dots per millimeter.
pub const DOTS_PER_MM: f64 = 8.0;

/// Display units per millimeter at 96 dip per inch.
pub const DIP_PER_MM: f64 = 96.0 / 25.4;

/// Height in dots of the built-in font at magnification 1.
///
/// Text sizes are expressed as integer multiples of this height.
pub const BASE_GLYPH_DOTS: i64 = 24;

/// Blank dots between two lines of the same text block.
pub const LINE_GAP_DOTS: i64 = 6;

/// Largest magnification the printer font supports.
pub const MAX_MAGNIFICATION: u32 = 4;

/// Dots covered by one QR module unit at density 2. Measured on hardware.
pub const QR_DOTS_PER_UNIT: f64 = 33.0;
