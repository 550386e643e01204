use std::str::FromStr;

use log::debug;

use crate::{error::Error, units};

/// Label stock sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaperSize {
    Label60x40,
    Label50x30,
    Label40x30,
    Custom { width_mm: f64, height_mm: f64 },
}

impl PaperSize {
    /// `(width, height)` in millimeters.
    pub fn size_mm(&self) -> (f64, f64) {
        match *self {
            Self::Label60x40 => (60.0, 40.0),
            Self::Label50x30 => (50.0, 30.0),
            Self::Label40x30 => (40.0, 30.0),
            Self::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::Label60x40, Self::Label50x30, Self::Label40x30]
    }
}

impl FromStr for PaperSize {
    type Err = Error;

    /// Accepts `WxH` in millimeters, e.g. `60x40` or `57.5x30`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .to_lowercase()
            .split_once(|c: char| c == 'x' || c == '*')
            .map(|(w, h)| (w.trim().parse::<f64>(), h.trim().parse::<f64>()))
            .ok_or_else(|| Error::InvalidConfig(format!("paper size '{}' is not WxH", s)))?;

        match (w, h) {
            (Ok(w), Ok(h)) => {
                let paper = Self::presets()
                    .into_iter()
                    .find(|p| p.size_mm() == (w, h))
                    .unwrap_or(Self::Custom {
                        width_mm: w,
                        height_mm: h,
                    });
                Ok(paper)
            }
            _ => Err(Error::InvalidConfig(format!(
                "paper size '{}' is not WxH",
                s
            ))),
        }
    }
}

/// Blank border kept around the printable area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginSetting {
    None,
    Narrow,
    Standard,
    Custom(f64),
}

impl MarginSetting {
    pub fn mm(&self) -> f64 {
        match *self {
            Self::None => 0.0,
            Self::Narrow => 1.0,
            Self::Standard => 2.0,
            Self::Custom(mm) => mm,
        }
    }
}

impl FromStr for MarginSetting {
    type Err = Error;

    /// Accepts `none`, `narrow`, `standard` or a value in millimeters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "narrow" => Ok(Self::Narrow),
            "standard" => Ok(Self::Standard),
            other => other
                .parse::<f64>()
                .map(Self::Custom)
                .map_err(|_| Error::InvalidConfig(format!("margin '{}' is not a number", s))),
        }
    }
}

/// Page setup sent in the job header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    paper: PaperSize,
    margin: MarginSetting,
    copies: u32,
}

impl PageGeometry {
    /// Initialize the page with a single copy.
    ///
    /// # Example
    ///
    /// ```
    /// use cpcl_label::{MarginSetting, PageGeometry, PaperSize};
    ///
    /// let geometry = PageGeometry::new(PaperSize::Label60x40, MarginSetting::Standard).copies(3);
    /// assert_eq!(geometry.copies_count(), 3);
    /// ```
    pub fn new(paper: PaperSize, margin: MarginSetting) -> Self {
        PageGeometry {
            paper,
            margin,
            copies: 1,
        }
    }

    pub fn copies(self, copies: u32) -> Self {
        PageGeometry { copies, ..self }
    }

    pub fn paper(&self) -> PaperSize {
        self.paper
    }

    pub fn paper_width_mm(&self) -> f64 {
        self.paper.size_mm().0
    }

    pub fn paper_height_mm(&self) -> f64 {
        self.paper.size_mm().1
    }

    pub fn margin_mm(&self) -> f64 {
        self.margin.mm()
    }

    pub fn copies_count(&self) -> u32 {
        self.copies
    }

    pub fn width_dots(&self) -> i64 {
        units::mm_to_dots(self.paper_width_mm())
    }

    pub fn height_dots(&self) -> i64 {
        units::mm_to_dots(self.paper_height_mm())
    }

    pub fn margin_dots(&self) -> i64 {
        units::mm_to_dots(self.margin_mm())
    }

    /// Printable area in dip: `(margin, width, height)`.
    pub fn printable_area(&self) -> (f64, f64, f64) {
        units::printable_area(
            self.paper_width_mm(),
            self.paper_height_mm(),
            self.margin_mm(),
        )
    }

    pub fn validate(&self) -> Result<(), Error> {
        let (w, h) = self.paper.size_mm();
        if !(w > 0.0 && w.is_finite()) || !(h > 0.0 && h.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "paper size {}x{}mm must be positive",
                w, h
            )));
        }

        let m = self.margin_mm();
        if !(m >= 0.0 && m.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "margin {}mm must not be negative",
                m
            )));
        }

        if self.copies == 0 {
            return Err(Error::InvalidConfig("copies must be at least 1".to_string()));
        }

        debug!("Page geometry: {:?}", self);
        Ok(())
    }
}
