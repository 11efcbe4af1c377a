//! Capture metadata and the overlay caption derived from it.
//!
//! The caption is a pure function of [`ExifMetadata`]. Numeric EXIF fields are
//! stored as rationals such as `28/10`; they are evaluated with
//! [`parse_fraction`], which accepts numeric fraction syntax and nothing else.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Rendered in place of a field that is missing or unparseable.
pub const FIELD_PLACEHOLDER: &str = "N/A";

/// Caption used when metadata extraction failed altogether.
pub const METADATA_UNAVAILABLE: &str = "metadata unavailable";

/// Key prefix used by ImageMagick's `%[EXIF:*]` output.
pub const EXIF_KEY_PREFIX: &str = "exif:";

// Fixed spacing keeps the three caption groups aligned across slides.
const LENS_SEPARATOR: &str = "           ";
const TIMESTAMP_SEPARATOR: &str = "                  ";

/// EXIF fields shown in the caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExifField {
    Iso,
    FNumber,
    FocalLength,
    ExposureTime,
    LensModel,
    CapturedAt,
}

impl ExifField {
    pub const ALL: [ExifField; 6] = [
        ExifField::Iso,
        ExifField::FNumber,
        ExifField::FocalLength,
        ExifField::ExposureTime,
        ExifField::LensModel,
        ExifField::CapturedAt,
    ];

    /// EXIF tag name as reported by the extraction tool.
    pub fn key(&self) -> &'static str {
        match self {
            ExifField::Iso => "PhotographicSensitivity",
            ExifField::FNumber => "FNumber",
            ExifField::FocalLength => "FocalLength",
            ExifField::ExposureTime => "ExposureTime",
            ExifField::LensModel => "LensModel",
            ExifField::CapturedAt => "DateTimeOriginal",
        }
    }

    /// Look up a field by tag name, with or without the `exif:` prefix.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        let key = key.strip_prefix(EXIF_KEY_PREFIX).unwrap_or(key);
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Raw capture metadata of one photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExifMetadata {
    pub iso: Option<String>,
    pub f_number: Option<String>,
    pub focal_length: Option<String>,
    pub exposure_time: Option<String>,
    pub lens_model: Option<String>,
    pub captured_at: Option<String>,
}

impl ExifMetadata {
    /// Parse line-oriented `key=value` output.
    ///
    /// Lines without `=` and unknown keys are ignored. The value is everything
    /// after the first `=`, trimmed; empty values count as missing.
    pub fn parse(output: &str) -> Self {
        let mut metadata = Self::default();
        for line in output.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let Some(field) = ExifField::from_key(key) else {
                continue;
            };
            let value = value.trim();
            if !value.is_empty() {
                metadata.set(field, value);
            }
        }
        metadata
    }

    /// Set a field value.
    pub fn set(&mut self, field: ExifField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            ExifField::Iso => self.iso = value,
            ExifField::FNumber => self.f_number = value,
            ExifField::FocalLength => self.focal_length = value,
            ExifField::ExposureTime => self.exposure_time = value,
            ExifField::LensModel => self.lens_model = value,
            ExifField::CapturedAt => self.captured_at = value,
        }
    }

    pub fn get(&self, field: ExifField) -> Option<&str> {
        match field {
            ExifField::Iso => self.iso.as_deref(),
            ExifField::FNumber => self.f_number.as_deref(),
            ExifField::FocalLength => self.focal_length.as_deref(),
            ExifField::ExposureTime => self.exposure_time.as_deref(),
            ExifField::LensModel => self.lens_model.as_deref(),
            ExifField::CapturedAt => self.captured_at.as_deref(),
        }
    }

    /// Build the caption.
    pub fn label(&self) -> OverlayLabel {
        let mut unresolved = Vec::new();

        let mut verbatim = |field: ExifField| match self.get(field) {
            Some(value) => value.to_string(),
            None => {
                unresolved.push(field);
                FIELD_PLACEHOLDER.to_string()
            }
        };
        let iso = verbatim(ExifField::Iso);
        let exposure = verbatim(ExifField::ExposureTime);
        let lens = verbatim(ExifField::LensModel);
        let captured_at = verbatim(ExifField::CapturedAt);

        let focal = match self.focal_length.as_deref().map(parse_fraction) {
            Some(Ok(value)) => format!("{}", value.trunc() as u64),
            _ => {
                unresolved.push(ExifField::FocalLength);
                FIELD_PLACEHOLDER.to_string()
            }
        };
        let f_number = match self.f_number.as_deref().map(parse_fraction) {
            Some(Ok(value)) => format_aperture(value),
            _ => {
                unresolved.push(ExifField::FNumber);
                FIELD_PLACEHOLDER.to_string()
            }
        };

        OverlayLabel {
            text: format!(
                "ISO {iso} {focal}mm f/{f_number} {exposure} sec{LENS_SEPARATOR}{lens}{TIMESTAMP_SEPARATOR}{captured_at}"
            ),
            unresolved,
        }
    }
}

/// Caption burned onto a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayLabel {
    /// Single-line caption text
    pub text: String,
    /// Fields rendered as [`FIELD_PLACEHOLDER`]
    pub unresolved: Vec<ExifField>,
}

impl OverlayLabel {
    /// Caption for a photo whose metadata could not be extracted.
    pub fn unavailable() -> Self {
        Self {
            text: METADATA_UNAVAILABLE.to_string(),
            unresolved: ExifField::ALL.to_vec(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Evaluate a numeric fraction such as `28/10`, `50/1` or `5.6`.
///
/// Both sides must be unsigned decimal numbers. Signs, exponents, whitespace
/// inside a number, nested fractions and zero denominators are rejected.
pub fn parse_fraction(raw: &str) -> ModelResult<f64> {
    let trimmed = raw.trim();
    let (numerator, denominator) = match trimmed.split_once('/') {
        Some((num, den)) => (num.trim(), Some(den.trim())),
        None => (trimmed, None),
    };

    let numerator = parse_unsigned_decimal(numerator).ok_or_else(|| ModelError::invalid_fraction(raw))?;
    let denominator = match denominator {
        Some(den) => parse_unsigned_decimal(den).ok_or_else(|| ModelError::invalid_fraction(raw))?,
        None => 1.0,
    };
    if denominator == 0.0 {
        return Err(ModelError::invalid_fraction(raw));
    }

    Ok(numerator / denominator)
}

fn parse_unsigned_decimal(s: &str) -> Option<f64> {
    let has_digit = s.bytes().any(|b| b.is_ascii_digit());
    let only_digits_and_dot = s.bytes().all(|b| b.is_ascii_digit() || b == b'.');
    let dots = s.bytes().filter(|&b| b == b'.').count();
    if !has_digit || !only_digits_and_dot || dots > 1 {
        return None;
    }
    s.parse().ok()
}

/// Whole apertures keep one decimal place (`f/4.0`).
fn format_aperture(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
