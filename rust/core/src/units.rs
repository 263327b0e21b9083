// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit, coordinate, angle, percentage and color conversions between the
//! scene file convention and the host document convention.
//!
//! The scene format stores lengths in centimeters with a screen-like,
//! clockwise-positive coordinate system; the host document uses millimeters
//! and a right-handed, counter-clockwise-positive system. Every conversion
//! here is its own exact inverse up to floating-point rounding.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scale between source units (cm) and host units (mm).
pub const FACTOR: f64 = 10.0;

/// Coordinate tolerance, in source units, used for endpoint quantization.
pub const TOLERANCE: f64 = 0.1;

/// Nominal wall thickness in host units, used when an opening cannot be
/// matched to a host wall.
pub const DEFAULT_WALL_THICKNESS: f64 = 100.0;

/// Convert a source dimension (cm) to a host dimension (mm).
#[inline]
pub fn dim_to_host(dimension: f64) -> f64 {
    dimension * FACTOR
}

/// Convert a host dimension (mm) to a source dimension (cm).
#[inline]
pub fn dim_to_source(dimension: f64) -> f64 {
    dimension / FACTOR
}

/// Convert a source coordinate to a host coordinate.
///
/// The y axis flips sign: the source system is screen-like (y grows
/// downward) while the host system is right-handed.
#[inline]
pub fn coord_to_host(p: Point3<f64>) -> Point3<f64> {
    Point3::new(p.x * FACTOR, -p.y * FACTOR, p.z * FACTOR)
}

/// Convert a host coordinate to a source coordinate.
#[inline]
pub fn coord_to_source(p: Point3<f64>) -> Point3<f64> {
    Point3::new(p.x / FACTOR, -p.y / FACTOR, p.z / FACTOR)
}

/// Convert a source angle to a host angle.
///
/// Source angles are clockwise positive, host angles counter-clockwise
/// positive. Negation is its own inverse.
#[inline]
pub fn angle_to_host(angle: f64) -> f64 {
    -angle
}

/// Convert a host angle to a source angle.
#[inline]
pub fn angle_to_source(angle: f64) -> f64 {
    -angle
}

/// Convert a source percentage (0..1) to a host percentage (0..100).
#[inline]
pub fn percent_to_host(percent: f64) -> f64 {
    percent * 100.0
}

/// Convert a host percentage (0..100) to a source percentage (0..1).
#[inline]
pub fn percent_to_source(percent: f64) -> f64 {
    percent / 100.0
}

/// An RGB color with optional alpha.
///
/// The source format writes colors as `RRGGBB` or `AARRGGBB` hex strings;
/// whether alpha was present is remembered so that 6-digit strings
/// round-trip to 6-digit strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: Option<u8>,
}

impl Color {
    /// Parse a source hex string (`RRGGBB` or `AARRGGBB`).
    pub fn from_source_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim();
        let parse = |s: &str| u8::from_str_radix(s, 16).map_err(|_| Error::InvalidColor(hex.to_string()));
        match digits.len() {
            6 => Ok(Self {
                r: parse(&digits[0..2])?,
                g: parse(&digits[2..4])?,
                b: parse(&digits[4..6])?,
                alpha: None,
            }),
            8 => Ok(Self {
                alpha: Some(parse(&digits[0..2])?),
                r: parse(&digits[2..4])?,
                g: parse(&digits[4..6])?,
                b: parse(&digits[6..8])?,
            }),
            _ => Err(Error::InvalidColor(hex.to_string())),
        }
    }

    /// Serialize back to the source hex form (`AARRGGBB`, or `RRGGBB` when
    /// no alpha was recorded).
    pub fn to_source_hex(&self) -> String {
        match self.alpha {
            Some(a) => format!("{:02X}{:02X}{:02X}{:02X}", a, self.r, self.g, self.b),
            None => format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b),
        }
    }

    /// Build a color from normalized host channels (`[r, g, b]` or
    /// `[r, g, b, a]`, each in 0..1, rounded to the nearest of 255).
    ///
    /// Any other channel count is a type mismatch, not a silent coercion.
    pub fn from_host_channels(channels: &[f64]) -> Result<Self> {
        let quantize = |f: f64| (f.clamp(0.0, 1.0) * 255.0).round() as u8;
        match channels {
            [r, g, b] => Ok(Self {
                r: quantize(*r),
                g: quantize(*g),
                b: quantize(*b),
                alpha: None,
            }),
            [r, g, b, a] => Ok(Self {
                r: quantize(*r),
                g: quantize(*g),
                b: quantize(*b),
                alpha: Some(quantize(*a)),
            }),
            other => Err(Error::ColorChannelCount(other.len())),
        }
    }

    /// Build a color from a packed host integer (`0xRRGGBBAA`).
    pub fn from_host_packed(packed: u32) -> Self {
        Self {
            r: (packed >> 24) as u8,
            g: (packed >> 16) as u8,
            b: (packed >> 8) as u8,
            alpha: Some(packed as u8),
        }
    }

    /// Pack into the host integer form (`0xRRGGBBAA`, alpha opaque when absent).
    pub fn to_host_packed(&self) -> u32 {
        ((self.r as u32) << 24)
            | ((self.g as u32) << 16)
            | ((self.b as u32) << 8)
            | self.alpha.unwrap_or(0xFF) as u32
    }

    /// Normalized host channels; alpha defaults to opaque.
    pub fn to_host_channels(&self) -> [f64; 4] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            self.alpha.unwrap_or(0xFF) as f64 / 255.0,
        ]
    }
}
