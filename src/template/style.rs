use serde::{Deserialize, Serialize};

use crate::geometry::Color;

pub const FONT_SIZE_MIN: u8 = 8;
pub const FONT_SIZE_MAX: u8 = 100;
pub const DEFAULT_FONT_SIZE: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Cairo,
    Amiri,
    Tajawal,
    #[serde(rename = "Noto Kufi Arabic")]
    NotoKufiArabic,
    Arial,
}

impl FontFamily {
    pub const ALL: [FontFamily; 5] = [
        Self::Cairo,
        Self::Amiri,
        Self::Tajawal,
        Self::NotoKufiArabic,
        Self::Arial,
    ];

    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Cairo => "Cairo",
            Self::Amiri => "Amiri",
            Self::Tajawal => "Tajawal",
            Self::NotoKufiArabic => "Noto Kufi Arabic",
            Self::Arial => "Arial",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|family| family.css_name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal alignment within the element box. Right is the default for
/// right-to-left certificate copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    #[default]
    Right,
}

/// Typography shared by every text-like element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: u8,
    pub color: Color,
    pub font_family: FontFamily,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            color: Color::BLACK,
            font_family: FontFamily::default(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_align: TextAlign::Right,
        }
    }
}

impl TextStyle {
    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = clamp_font_size(size);
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_font_family(&mut self, family: FontFamily) {
        self.font_family = family;
    }

    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.font_weight = weight;
    }

    pub fn set_font_style(&mut self, style: FontStyle) {
        self.font_style = style;
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.text_align = align;
    }
}

pub(crate) fn clamp_font_size(size: f64) -> u8 {
    let size = size.round();
    if size <= f64::from(FONT_SIZE_MIN) {
        FONT_SIZE_MIN
    } else if size >= f64::from(FONT_SIZE_MAX) {
        FONT_SIZE_MAX
    } else {
        size as u8
    }
}
