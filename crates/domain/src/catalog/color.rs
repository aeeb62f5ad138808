//! Catalog color referenced by SKU variant attributes.

use std::sync::LazyLock;

use common::ColorId;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, require_text};

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid regex"));

/// A named swatch with its `#RRGGBB` code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    id: ColorId,
    name: String,
    hex: String,
}

impl Color {
    /// Creates a color; the hex code is normalised to uppercase.
    pub fn new(id: ColorId, name: &str, hex: &str) -> Result<Self, DomainError> {
        let name = require_text("color name", name, 50)?;
        let hex = hex.trim();
        if !HEX_COLOR.is_match(hex) {
            return Err(DomainError::invalid_field(
                "hex color",
                format!("'{hex}' is not in #RRGGBB form"),
            ));
        }
        Ok(Self {
            id,
            name,
            hex: hex.to_ascii_uppercase(),
        })
    }

    pub fn id(&self) -> ColorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_code_is_validated_and_normalised() {
        let id = ColorId::new(1).unwrap();
        let color = Color::new(id, "Charcoal", "#3a3a3a").unwrap();
        assert_eq!(color.hex(), "#3A3A3A");

        for bad in ["3a3a3a", "#3a3a3", "#3a3a3g", ""] {
            assert!(matches!(
                Color::new(id, "Charcoal", bad),
                Err(DomainError::InvalidField { .. })
            ));
        }
        assert!(Color::new(id, "", "#FFFFFF").is_err());
    }
}
