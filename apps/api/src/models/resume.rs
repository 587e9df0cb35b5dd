use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::models::section::Section;

/// The three closed visual layouts a document can be projected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    Modern,
    Classic,
    Minimal,
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modern" => Ok(Template::Modern),
            "classic" => Ok(Template::Classic),
            "minimal" => Ok(Template::Minimal),
            other => Err(format!("unknown template '{other}'")),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Template::Modern => "modern",
            Template::Classic => "classic",
            Template::Minimal => "minimal",
        };
        f.write_str(name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Color
// ────────────────────────────────────────────────────────────────────────────

/// An opaque sRGB color, written as `#rrggbb` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const GRAY_100: Color = Color::rgb(0xf3, 0xf4, 0xf6);
    pub const GRAY_300: Color = Color::rgb(0xd1, 0xd5, 0xdb);
    pub const GRAY_400: Color = Color::rgb(0x9c, 0xa3, 0xaf);
    pub const GRAY_500: Color = Color::rgb(0x6b, 0x72, 0x80);
    pub const GRAY_600: Color = Color::rgb(0x4b, 0x55, 0x63);
    pub const GRAY_700: Color = Color::rgb(0x37, 0x41, 0x51);
    pub const GRAY_800: Color = Color::rgb(0x1f, 0x29, 0x37);
    pub const GRAY_900: Color = Color::rgb(0x11, 0x18, 0x27);
    pub const BLUE_300: Color = Color::rgb(0x93, 0xc5, 0xfd);
    pub const BLUE_600: Color = Color::rgb(0x25, 0x63, 0xeb);
}

impl Default for Color {
    fn default() -> Self {
        Color::GRAY_800
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `#rgb` and `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{s}': non-hex digit"));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(format!("invalid color '{s}': expected #rgb or #rrggbb")),
        };
        // All ASCII hex digits from here on, so byte offsets are char boundaries.
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| format!("invalid color '{s}': non-hex digit"))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Content scale
// ────────────────────────────────────────────────────────────────────────────

/// Uniform density factor, always inside `[MIN, MAX]`.
///
/// Construction clamps: out-of-range input is a caller contract violation, not
/// a runtime fault, so it never reaches layout.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ContentScale(f32);

impl ContentScale {
    pub const MIN: f32 = 0.75;
    pub const MAX: f32 = 1.30;
    pub const IDENTITY: ContentScale = ContentScale(1.0);

    /// Clamps into range. Returns `None` for NaN or infinities.
    ///
    /// Takes `f64` so values beyond `f32::MAX` clamp instead of narrowing to
    /// infinity first.
    pub fn clamped(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let clamped = value.clamp(f64::from(Self::MIN), f64::from(Self::MAX));
        Some(ContentScale(clamped as f32))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ContentScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl<'de> Deserialize<'de> for ContentScale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        ContentScale::clamped(raw)
            .ok_or_else(|| serde::de::Error::custom("content scale must be a finite number"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Personal info
// ────────────────────────────────────────────────────────────────────────────

/// Key of a photo held in the session photo store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoHandle(Uuid);

impl PhotoHandle {
    pub fn generate() -> Self {
        PhotoHandle(Uuid::new_v4())
    }
}

impl fmt::Display for PhotoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where the profile photo comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PhotoRef {
    /// Fetched over the network at export time, subject to the remote-image policy.
    Remote { url: String },
    /// Uploaded bytes owned by the session photo store.
    Local { handle: PhotoHandle },
}

impl PhotoRef {
    pub fn local_handle(&self) -> Option<PhotoHandle> {
        match self {
            PhotoRef::Local { handle } => Some(*handle),
            PhotoRef::Remote { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub photo: Option<PhotoRef>,
    pub summary: String,
}

/// Text fields of [`PersonalInfo`] that the editor can set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalField {
    FullName,
    Title,
    Email,
    Phone,
    Address,
    Linkedin,
    Summary,
}

impl FromStr for PersonalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown personal field '{s}'"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document root
// ────────────────────────────────────────────────────────────────────────────

/// The canonical resume. Owned by the editing session and replaced wholesale on
/// every edit; see `document::ops` for the mutation operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub sections: Vec<Section>,
    pub template: Template,
    pub primary_color: Color,
    pub content_scale: ContentScale,
}
