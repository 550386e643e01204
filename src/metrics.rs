//! Text measurement used to rebuild item boxes while decoding.

/// Width and height in dip.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

/// Measures a single line of rendered text.
///
/// Implementations must be safe to call from several decoders at once.
pub trait TextMetrics {
    fn measure(&self, content: &str, font_size: f64, bold: bool) -> Size;
}

impl<F> TextMetrics for F
where
    F: Fn(&str, f64, bool) -> Size,
{
    fn measure(&self, content: &str, font_size: f64, bold: bool) -> Size {
        self(content, font_size, bold)
    }
}

const NARROW_ADVANCE: f64 = 0.55;
const WIDE_ADVANCE: f64 = 1.0;
const BOLD_SPREAD: f64 = 1.05;
const LINE_HEIGHT: f64 = 1.32;

/// Approximate metrics without a font rasterizer.
///
/// ASCII characters advance 0.55 em and everything else (CJK in practice)
/// a full em. Bold text is 5% wider.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPitchMetrics;

impl TextMetrics for FixedPitchMetrics {
    fn measure(&self, content: &str, font_size: f64, bold: bool) -> Size {
        if content.is_empty() {
            return Size::default();
        }

        let ems: f64 = content
            .chars()
            .map(|c| if c.is_ascii() { NARROW_ADVANCE } else { WIDE_ADVANCE })
            .sum();
        let spread = if bold { BOLD_SPREAD } else { 1.0 };

        Size::new(ems * font_size * spread, font_size * LINE_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_size() {
        assert_eq!(FixedPitchMetrics.measure("", 20.0, true), Size::default());
    }

    #[test]
    fn wide_characters_take_a_full_em() {
        let narrow = FixedPitchMetrics.measure("ab", 10.0, false);
        let wide = FixedPitchMetrics.measure("标签", 10.0, false);
        assert!((narrow.width - 11.0).abs() < 1e-9);
        assert!((wide.width - 20.0).abs() < 1e-9);
        assert!((wide.height - 13.2).abs() < 1e-9);
    }

    #[test]
    fn bold_is_wider() {
        let regular = FixedPitchMetrics.measure("label", 12.0, false);
        let bold = FixedPitchMetrics.measure("label", 12.0, true);
        assert!(bold.width > regular.width);
        assert_eq!(bold.height, regular.height);
    }

    #[test]
    fn closures_are_metrics() {
        let fixed = |_: &str, _: f64, _: bool| Size::new(3.0, 4.0);
        assert_eq!(fixed.measure("x", 1.0, false), Size::new(3.0, 4.0));
    }
}
