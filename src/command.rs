//! CPCL command lines understood by this crate.
//!
//! Only the subset needed for text, bold, magnification, QR codes, page
//! geometry and the print trigger is modelled. Each variant maps to one
//! physical line of the job.

use std::fmt;

use log::debug;

pub const HEADER: &str = "!";
pub const PAGE_WIDTH: &str = "PAGE-WIDTH";
pub const SET_BOLD: &str = "SETBOLD";
pub const SET_MAG: &str = "SETMAG";
pub const TEXT: &str = "TEXT";
pub const BARCODE: &str = "BARCODE";
pub const QR: &str = "QR";
pub const END_QR: &str = "ENDQR";
pub const PRINT: &str = "PRINT";

/// Font slot and sub-style used for every text line.
pub const TEXT_FONT: u32 = 7;
pub const TEXT_STYLE: u32 = 0;

/// Fixed header fields: horizontal offset and resolution pair.
pub const HEADER_OFFSET: u32 = 0;
pub const HEADER_RESOLUTION: u32 = 200;

/// Error correction class and density of every emitted QR symbol.
pub const QR_ECC: &str = "M";
pub const QR_DENSITY: u32 = 2;
/// Marker prefixed to the QR payload line.
pub const QR_PAYLOAD_MARKER: &str = "MA,";
/// Module unit assumed when a QR command carries none.
pub const DEFAULT_QR_UNIT: f64 = 4.0;

/// Text content starts after this many spaces.
const TEXT_CONTENT_FIELD: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Header { height: i64, copies: u32 },
    PageWidth(i64),
    SetBold(bool),
    /// Horizontal and vertical magnification. `0` resets to normal size.
    SetMag(u32, u32),
    Text { x: i64, y: i64, content: String },
    /// `unit` is kept as a float so hand-written jobs like `U 2.5` decode.
    BarcodeQr { x: i64, y: i64, unit: f64 },
    QrPayload(String),
    EndQr,
    Print,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header { height, copies } => write!(
                f,
                "{} {} {} {} {} {}",
                HEADER, HEADER_OFFSET, HEADER_RESOLUTION, HEADER_RESOLUTION, height, copies
            ),
            Self::PageWidth(width) => write!(f, "{} {}", PAGE_WIDTH, width),
            Self::SetBold(bold) => write!(f, "{} {}", SET_BOLD, if *bold { 1 } else { 0 }),
            Self::SetMag(h, v) => write!(f, "{} {} {}", SET_MAG, h, v),
            Self::Text { x, y, content } => write!(
                f,
                "{} {} {} {} {} {}",
                TEXT, TEXT_FONT, TEXT_STYLE, x, y, content
            ),
            Self::BarcodeQr { x, y, unit } => write!(
                f,
                "{} {} {} {} {} {} U {}",
                BARCODE, QR, x, y, QR_ECC, QR_DENSITY, unit
            ),
            Self::QrPayload(payload) => write!(f, "{}{}", QR_PAYLOAD_MARKER, payload),
            Self::EndQr => write!(f, "{}", END_QR),
            Self::Print => write!(f, "{}", PRINT),
        }
    }
}

impl Command {
    /// Parse one trimmed command line.
    ///
    /// Returns `None` for lines that are malformed or carry no meaning for
    /// the layout. QR payload lines are never recognized here since they
    /// only make sense right after a `BARCODE QR` line.
    pub fn parse(line: &str) -> Option<Command> {
        let parts: Vec<&str> = line.split(' ').collect();

        match parts[0] {
            SET_MAG if parts.len() > 2 => {
                let h = parts[1].parse::<u32>().ok();
                let v = parts[2].parse::<u32>().ok();
                match v {
                    Some(v) => Some(Self::SetMag(h.unwrap_or(v), v)),
                    None => {
                        debug!("Ignoring magnification: {:?}", line);
                        None
                    }
                }
            }
            SET_BOLD => Some(Self::SetBold(parts.get(1) == Some(&"1"))),
            TEXT if parts.len() >= TEXT_CONTENT_FIELD => {
                match (parts[3].parse::<i64>(), parts[4].parse::<i64>()) {
                    (Ok(x), Ok(y)) => Some(Self::Text {
                        x,
                        y,
                        content: text_content(line).to_string(),
                    }),
                    _ => {
                        debug!("Ignoring text with bad position: {:?}", line);
                        None
                    }
                }
            }
            BARCODE if parts.len() >= 4 && parts[1] == QR => {
                match (parts[2].parse::<i64>(), parts[3].parse::<i64>()) {
                    (Ok(x), Ok(y)) => Some(Self::BarcodeQr {
                        x,
                        y,
                        unit: qr_unit(&parts),
                    }),
                    _ => {
                        debug!("Ignoring QR code with bad position: {:?}", line);
                        None
                    }
                }
            }
            HEADER | PAGE_WIDTH | END_QR | PRINT => None,
            TEXT | SET_MAG | BARCODE => {
                debug!("Malformed command: {:?}", line);
                None
            }
            _ => {
                debug!("Unknown command: {:?}", line);
                None
            }
        }
    }
}

/// Everything after the fifth space, spaces included. Empty if the line has
/// fewer fields.
fn text_content(line: &str) -> &str {
    line.match_indices(' ')
        .nth(TEXT_CONTENT_FIELD - 1)
        .map(|(i, _)| &line[i + 1..])
        .unwrap_or("")
}

/// Value following the `U` token, or the default unit.
fn qr_unit(parts: &[&str]) -> f64 {
    parts
        .iter()
        .position(|p| *p == "U")
        .and_then(|i| parts.get(i + 1))
        .and_then(|u| u.parse::<f64>().ok())
        .filter(|u| u.is_finite() && *u > 0.0)
        .unwrap_or(DEFAULT_QR_UNIT)
}

/// Strip the payload marker from the line following a QR command.
pub fn qr_payload(line: &str) -> &str {
    line.strip_prefix(QR_PAYLOAD_MARKER).unwrap_or(line)
}
