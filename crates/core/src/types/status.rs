//! Status enums for inventory records.

use serde::{Deserialize, Serialize};

/// Stock level of an inventory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    #[default]
    InStock,
    Low,
    OutOfStock,
}

impl StockStatus {
    /// Canonical wire/storage spelling of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "IN_STOCK",
            Self::Low => "LOW",
            Self::OutOfStock => "OUT_OF_STOCK",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IN_STOCK" => Ok(Self::InStock),
            "LOW" => Ok(Self::Low),
            "OUT_OF_STOCK" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid stock status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for status in [StockStatus::InStock, StockStatus::Low, StockStatus::OutOfStock] {
            assert_eq!(status.as_str().parse::<StockStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_serde_wire_format() {
        let json = serde_json::to_string(&StockStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"OUT_OF_STOCK\"");
    }

    #[test]
    fn test_default() {
        assert_eq!(StockStatus::default(), StockStatus::InStock);
    }
}
