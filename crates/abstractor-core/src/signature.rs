use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Typographic fingerprint of a text run: font name, size rounded to one
/// decimal, and the PDF style flags bitfield.
///
/// The size is stored in tenths of a point so that two runs whose sizes round
/// to the same value compare (and hash) equal. The canonical string form is
/// `"{font}_{size:.1}_{flags}"`, e.g. `STIX-Bold_8.5_20`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature {
    font: String,
    size_tenths: u32,
    flags: u32,
}

impl Signature {
    pub fn new(font: impl Into<String>, size: f64, flags: u32) -> Self {
        let size_tenths = if size.is_finite() && size > 0.0 {
            (size * 10.0).round() as u32
        } else {
            0
        };
        Self {
            font: font.into(),
            size_tenths,
            flags,
        }
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    /// Font size, rounded to one decimal.
    pub fn size(&self) -> f64 {
        f64::from(self.size_tenths) / 10.0
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Canonical key used in documents and style profiles.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}.{}_{}",
            self.font,
            self.size_tenths / 10,
            self.size_tenths % 10,
            self.flags
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid signature key `{0}`")]
pub struct ParseSignatureError(pub String);

impl FromStr for Signature {
    type Err = ParseSignatureError;

    /// Parse `font_size_flags`. The font itself may contain underscores, so
    /// the key is split from the right.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSignatureError(s.to_string());
        let mut parts = s.rsplitn(3, '_');
        let flags = parts.next().ok_or_else(err)?;
        let size = parts.next().ok_or_else(err)?;
        let font = parts.next().filter(|f| !f.is_empty()).ok_or_else(err)?;

        let flags: u32 = flags.parse().map_err(|_| err())?;
        let size: f64 = size.parse().map_err(|_| err())?;
        if !size.is_finite() || size < 0.0 {
            return Err(err());
        }
        Ok(Signature::new(font, size, flags))
    }
}

impl TryFrom<String> for Signature {
    type Error = ParseSignatureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(
            Signature::new("STIX-Bold", 8.5, 20).key(),
            "STIX-Bold_8.5_20"
        );
        assert_eq!(
            Signature::new("MyriadPro-Bold", 12.0, 20).key(),
            "MyriadPro-Bold_12.0_20"
        );
    }

    #[test]
    fn test_size_rounding_collapses_nearby_sizes() {
        let a = Signature::new("STIX-Regular", 8.4999, 4);
        let b = Signature::new("STIX-Regular", 8.5201, 4);
        assert_eq!(a, b);
        assert_eq!(a.size(), 8.5);
    }

    #[test]
    fn test_parse_font_with_underscores() {
        let sig: Signature = "Font_With_Underscore_5.9_4".parse().unwrap();
        assert_eq!(sig.font(), "Font_With_Underscore");
        assert_eq!(sig.size(), 5.9);
        assert_eq!(sig.flags(), 4);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("STIX-Bold".parse::<Signature>().is_err());
        assert!("STIX-Bold_big_20".parse::<Signature>().is_err());
        assert!("_8.5_20".parse::<Signature>().is_err());
        let err = "STIX-Bold".parse::<Signature>().unwrap_err();
        assert_eq!(err.to_string(), "invalid signature key `STIX-Bold`");
    }

    #[test]
    fn test_serde_as_string() {
        let sig = Signature::new("SymbolMT", 8.5, 0);
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, "\"SymbolMT_8.5_0\"");
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
