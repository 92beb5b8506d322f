//! Map annotation data derived from earthquakes.
//!
//! Rendering belongs to the consumer; this module only decides where a pin
//! goes, what it says and which color bucket it falls in.
use serde::Serialize;

use crate::model::Earthquake;

/// Pin tint by magnitude bucket.
///
/// | magnitude   | color   |
/// |-------------|---------|
/// | [0, 0.5)    | green   |
/// | [0.5, 1)    | blue    |
/// | [1, 1.5)    | yellow  |
/// | [1.5, 2)    | magenta |
/// | [2, 3)      | orange  |
/// | anything else | red   |
///
/// "Anything else" covers magnitudes of 3 and above as well as negative
/// values and NaN, so every `f64` lands in exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinColor {
    Green,
    Blue,
    Yellow,
    Magenta,
    Orange,
    Red,
}

impl PinColor {
    /// ```
    /// use quake_core::PinColor;
    ///
    /// assert_eq!(PinColor::for_magnitude(2.3), PinColor::Orange);
    /// assert_eq!(PinColor::for_magnitude(0.5), PinColor::Blue);
    /// assert_eq!(PinColor::for_magnitude(7.1), PinColor::Red);
    /// ```
    pub fn for_magnitude(magnitude: f64) -> Self {
        match magnitude {
            m if (0.0..0.5).contains(&m) => PinColor::Green,
            m if (0.5..1.0).contains(&m) => PinColor::Blue,
            m if (1.0..1.5).contains(&m) => PinColor::Yellow,
            m if (1.5..2.0).contains(&m) => PinColor::Magenta,
            m if (2.0..3.0).contains(&m) => PinColor::Orange,
            _ => PinColor::Red,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PinColor::Green => "green",
            PinColor::Blue => "blue",
            PinColor::Yellow => "yellow",
            PinColor::Magenta => "magenta",
            PinColor::Orange => "orange",
            PinColor::Red => "red",
        }
    }

    /// 8-bit RGB matching the usual system palette for each name.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            PinColor::Green => (0, 255, 0),
            PinColor::Blue => (0, 0, 255),
            PinColor::Yellow => (255, 255, 0),
            PinColor::Magenta => (255, 0, 255),
            PinColor::Orange => (255, 128, 0),
            PinColor::Red => (255, 0, 0),
        }
    }
}

impl std::fmt::Display for PinColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything a map needs to draw one earthquake.
#[derive(Debug, Clone, Copy)]
pub struct Annotation<'a> {
    earthquake: &'a Earthquake,
}

impl<'a> Annotation<'a> {
    pub fn new(earthquake: &'a Earthquake) -> Self {
        Self { earthquake }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.earthquake.latitude(),
            longitude: self.earthquake.longitude(),
        }
    }

    /// `"Mag: 2.30"`
    pub fn title(&self) -> String {
        format!("Mag: {:.2}", self.earthquake.magnitude())
    }

    pub fn subtitle(&self) -> &'a str {
        self.earthquake.place()
    }

    pub fn color(&self) -> PinColor {
        PinColor::for_magnitude(self.earthquake.magnitude())
    }

    /// Placemark for handing the pin to a maps app. An empty place reads as
    /// `"no info"`.
    pub fn map_item(&self) -> MapItem {
        let place = self.subtitle();
        let street = if place.is_empty() { NO_INFO } else { place };
        MapItem {
            name: self.title(),
            street: street.to_string(),
            coordinate: self.coordinate(),
        }
    }
}

const NO_INFO: &str = "no info";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapItem {
    pub name: String,
    pub street: String,
    pub coordinate: Coordinate,
}

pub fn annotations(earthquakes: &[Earthquake]) -> Vec<Annotation<'_>> {
    earthquakes.iter().map(Annotation::new).collect()
}
