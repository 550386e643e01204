use log::debug;

use crate::{
    command::Command,
    error::Error,
    item::{ItemKind, LayoutItem, QrItem, TextItem},
    paper::PageGeometry,
    units, BASE_GLYPH_DOTS, LINE_GAP_DOTS, MAX_MAGNIFICATION, QR_DOTS_PER_UNIT,
};

/// Lines of a job are terminated the way the printer expects.
pub const LINE_ENDING: &str = "\r\n";

/// Magnification bucket for a font size in dip, in `1..=4`.
pub fn magnification(font_size: f64) -> u32 {
    let target = units::dip_to_dots(font_size) as i64;
    let mag = if target > BASE_GLYPH_DOTS {
        target / BASE_GLYPH_DOTS
    } else {
        1
    };
    mag.min(MAX_MAGNIFICATION as i64) as u32
}

/// QR module unit for a symbol `width` dip wide, at least 1.
pub fn qr_unit(width: f64) -> i64 {
    units::round_dots(units::dip_to_dots(width) / QR_DOTS_PER_UNIT).max(1)
}

/// Build the command stream for `items` on the given page.
///
/// Items are emitted in order. Every item is validated first so a broken
/// layout never produces a partial job.
pub fn encode(items: &[LayoutItem], geometry: &PageGeometry) -> Result<String, Error> {
    geometry.validate()?;
    for item in items {
        item.validate()?;
    }

    let mut commands = vec![
        Command::Header {
            height: geometry.height_dots(),
            copies: geometry.copies_count(),
        },
        Command::PageWidth(geometry.width_dots()),
    ];

    let margin = geometry.margin_dots();
    for item in items {
        let x = origin(item.x, margin);
        let y = origin(item.y, margin);

        match &item.kind {
            ItemKind::Text(text) => encode_text(&mut commands, text, x, y),
            ItemKind::Qr(qr) => encode_qr(&mut commands, qr, item.width, x, y),
        }
    }
    commands.push(Command::Print);

    let mut job = String::new();
    for command in &commands {
        job.push_str(&command.to_string());
        job.push_str(LINE_ENDING);
    }
    debug!("Encoded {} items into {} lines", items.len(), commands.len());
    Ok(job)
}

fn origin(dip: f64, margin: i64) -> i64 {
    units::round_dots(units::dip_to_dots(dip))
        .saturating_add(margin)
        .max(0)
}

fn encode_text(commands: &mut Vec<Command>, text: &TextItem, x: i64, y: i64) {
    let mag = magnification(text.font_size);
    debug!("Font size {} -> magnification {}", text.font_size, mag);

    if text.bold {
        commands.push(Command::SetBold(true));
    }
    if mag > 1 {
        commands.push(Command::SetMag(mag, mag));
    }

    let line_height = BASE_GLYPH_DOTS * mag as i64 + LINE_GAP_DOTS;
    let mut cursor = y;
    for line in text.lines() {
        commands.push(Command::Text {
            x,
            y: cursor,
            content: line,
        });
        cursor = cursor.saturating_add(line_height);
    }

    if mag > 1 {
        commands.push(Command::SetMag(0, 0));
    }
    if text.bold {
        commands.push(Command::SetBold(false));
    }
}

fn encode_qr(commands: &mut Vec<Command>, qr: &QrItem, width: f64, x: i64, y: i64) {
    let unit = qr_unit(width);
    debug!("QR width {} -> unit {}", width, unit);

    commands.push(Command::BarcodeQr {
        x,
        y,
        unit: unit as f64,
    });
    commands.push(Command::QrPayload(qr.content.clone()));
    commands.push(Command::EndQr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MarginSetting, PaperSize};

    fn page() -> PageGeometry {
        PageGeometry::new(PaperSize::Label60x40, MarginSetting::Standard)
    }

    fn font_for_dots(dots: f64) -> f64 {
        units::dots_to_dip(dots)
    }

    #[test]
    fn magnification_buckets() {
        assert_eq!(magnification(font_for_dots(24.0)), 1);
        assert_eq!(magnification(font_for_dots(10.0)), 1);
        assert_eq!(magnification(font_for_dots(48.5)), 2);
        assert_eq!(magnification(font_for_dots(72.5)), 3);
        assert_eq!(magnification(font_for_dots(96.5)), 4);
        assert_eq!(magnification(font_for_dots(500.0)), 4);
        // 24 dip is about 50.8 dots
        assert_eq!(magnification(24.0), 2);
    }

    #[test]
    fn magnification_is_monotonic() {
        let mut last = 1;
        for step in 0..400 {
            let mag = magnification(step as f64 * 0.25 + 0.25);
            assert!(mag >= last);
            last = mag;
        }
        assert_eq!(last, 4);
    }

    #[test]
    fn qr_unit_never_zero() {
        assert_eq!(qr_unit(1.0), 1);
        assert_eq!(qr_unit(0.001), 1);
        // 100 dip is about 211.7 dots, 6.4 units
        assert_eq!(qr_unit(100.0), 6);
    }

    #[test]
    fn header_and_trailer() {
        let job = encode(&[], &page().copies(2)).unwrap();
        let lines: Vec<&str> = job.lines().collect();
        assert_eq!(lines, vec!["! 0 200 200 320 2", "PAGE-WIDTH 480", "PRINT"]);
        assert!(job.ends_with("PRINT\r\n"));
    }

    #[test]
    fn bold_magnified_text_is_wrapped_in_modal_commands() {
        let item = LayoutItem::text("Line1\nLine2", 0.0, 0.0, font_for_dots(48.5), true);
        let job = encode(&[item], &page()).unwrap();
        let lines: Vec<&str> = job.lines().collect();
        assert_eq!(
            &lines[2..9],
            &[
                "SETBOLD 1",
                "SETMAG 2 2",
                "TEXT 7 0 16 16 Line1",
                "TEXT 7 0 16 70 Line2",
                "SETMAG 0 0",
                "SETBOLD 0",
                "PRINT",
            ]
        );
    }

    #[test]
    fn plain_text_has_no_modal_commands() {
        let item = LayoutItem::text("AB", 10.0, 10.0, font_for_dots(24.0), false);
        let job = encode(&[item], &page()).unwrap();
        let lines: Vec<&str> = job.lines().collect();
        // 10 dip = 21.17 dots, plus 16 dots margin
        assert_eq!(lines[2], "TEXT 7 0 37 37 AB");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn qr_block() {
        let item = LayoutItem::qr("https://example.com/a b", 0.0, 0.0, 100.0);
        let job = encode(&[item], &page()).unwrap();
        let lines: Vec<&str> = job.lines().collect();
        assert_eq!(
            &lines[2..5],
            &[
                "BARCODE QR 16 16 M 2 U 6",
                "MA,https://example.com/a b",
                "ENDQR"
            ]
        );
    }

    #[test]
    fn negative_origin_clamps_at_zero() {
        let item = LayoutItem::text("x", -50.0, 1.0, 10.0, false);
        let job = encode(&[item], &page()).unwrap();
        assert!(job.contains("TEXT 7 0 0 18 x"));
    }

    #[test]
    fn huge_margin_saturates() {
        let geometry = PageGeometry::new(PaperSize::Label60x40, MarginSetting::Custom(1e300));
        let item = LayoutItem::text("x", 10.0, 10.0, 10.0, false);
        let job = encode(&[item], &geometry).unwrap();
        assert!(job.contains(&format!("TEXT 7 0 {} {} x", i64::MAX, i64::MAX)));
    }

    #[test]
    fn invalid_input_is_reported() {
        let broken = LayoutItem::qr("a", 0.0, 0.0, 0.0);
        assert!(matches!(
            encode(&[broken], &page()),
            Err(Error::InvalidItem { .. })
        ));
        let far = LayoutItem::text("x", 1e300, 0.0, 10.0, false);
        assert!(matches!(
            encode(&[far], &page()),
            Err(Error::InvalidItem { .. })
        ));
        assert!(matches!(
            encode(&[], &page().copies(0)),
            Err(Error::InvalidConfig(_))
        ));
    }
}
