//! Dimension orders.
//!
//! A dimension order names the nesting of the five axes of a series, fastest
//! varying first. X and Y always occupy the first two slots (a plane is an
//! XY slice); the remaining three positions define how a linear plane index
//! is rasterised over Z, C and T.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, ReaderResult};

// =============================================================================
// Axis
// =============================================================================

/// One of the five axes of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    C,
    T,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 5] = [Axis::X, Axis::Y, Axis::Z, Axis::C, Axis::T];

    /// The single-letter symbol of this axis.
    pub const fn symbol(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
            Axis::C => 'C',
            Axis::T => 'T',
        }
    }

    /// Parse an axis symbol (case-insensitive).
    pub fn from_symbol(symbol: char) -> Option<Axis> {
        match symbol.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            'C' => Some(Axis::C),
            'T' => Some(Axis::T),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// =============================================================================
// DimensionOrder
// =============================================================================

/// A validated permutation of `XYZCT` with X and Y in the first two slots.
///
/// Serialises as its five-letter string form (e.g. `"XYCZT"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DimensionOrder([Axis; 5]);

impl DimensionOrder {
    pub const XYZCT: DimensionOrder = DimensionOrder([Axis::X, Axis::Y, Axis::Z, Axis::C, Axis::T]);
    pub const XYZTC: DimensionOrder = DimensionOrder([Axis::X, Axis::Y, Axis::Z, Axis::T, Axis::C]);
    pub const XYCZT: DimensionOrder = DimensionOrder([Axis::X, Axis::Y, Axis::C, Axis::Z, Axis::T]);
    pub const XYCTZ: DimensionOrder = DimensionOrder([Axis::X, Axis::Y, Axis::C, Axis::T, Axis::Z]);
    pub const XYTZC: DimensionOrder = DimensionOrder([Axis::X, Axis::Y, Axis::T, Axis::Z, Axis::C]);
    pub const XYTCZ: DimensionOrder = DimensionOrder([Axis::X, Axis::Y, Axis::T, Axis::C, Axis::Z]);

    /// Parse and validate a dimension order string.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::InvalidDimensionOrder`] if the string is not
    /// five symbols long, contains an unknown or repeated symbol, or does not
    /// start with `XY` / `YX`.
    pub fn parse(order: &str) -> ReaderResult<Self> {
        let symbols: Vec<char> = order.chars().collect();
        if symbols.len() != 5 {
            return Err(ReaderError::invalid_order(
                order,
                format!("expected 5 symbols, got {}", symbols.len()),
            ));
        }

        let mut axes = [Axis::X; 5];
        for (slot, symbol) in axes.iter_mut().zip(symbols) {
            *slot = Axis::from_symbol(symbol).ok_or_else(|| {
                ReaderError::invalid_order(order, format!("unknown axis '{}'", symbol))
            })?;
        }

        Self::from_axes(axes).map_err(|err| match err {
            ReaderError::InvalidDimensionOrder { reason, .. } => {
                ReaderError::invalid_order(order, reason)
            }
            other => other,
        })
    }

    /// Build an order from five axes, validating it.
    pub fn from_axes(axes: [Axis; 5]) -> ReaderResult<Self> {
        let rendered: String = axes.iter().map(|a| a.symbol()).collect();

        for axis in Axis::ALL {
            let count = axes.iter().filter(|&&a| a == axis).count();
            if count != 1 {
                return Err(ReaderError::invalid_order(
                    rendered,
                    format!("axis {} appears {} times", axis, count),
                ));
            }
        }

        let planar = |a: Axis| a == Axis::X || a == Axis::Y;
        if !planar(axes[0]) || !planar(axes[1]) {
            return Err(ReaderError::invalid_order(
                rendered,
                "X and Y must occupy the first two positions",
            ));
        }

        Ok(DimensionOrder(axes))
    }

    /// The five axes, fastest varying first.
    pub fn axes(&self) -> [Axis; 5] {
        self.0
    }

    /// Position (0..5) of `axis` in this order.
    pub fn position(&self, axis: Axis) -> usize {
        // Every axis is present exactly once by construction.
        self.0.iter().position(|&a| a == axis).unwrap_or(0)
    }

    /// Axis stored at `position`.
    pub fn axis_at(&self, position: usize) -> Option<Axis> {
        self.0.get(position).copied()
    }

    /// The three non-planar axes in rasterisation order.
    pub fn rasterization(&self) -> [Axis; 3] {
        [self.0[2], self.0[3], self.0[4]]
    }

    /// Returns this order with C moved to the packed slot (position 2).
    ///
    /// C is swapped with its left neighbour until it sits right after the
    /// planar axes, so the relative order of the other axes is preserved:
    /// `XYZTC` becomes `XYCZT`, `XYTZC` becomes `XYCTZ`.
    pub fn with_channel_packed(self) -> Self {
        let mut axes = self.0;
        let mut pos = self.position(Axis::C);
        while pos > 2 {
            axes.swap(pos - 1, pos);
            pos -= 1;
        }
        DimensionOrder(axes)
    }
}

impl Default for DimensionOrder {
    fn default() -> Self {
        DimensionOrder::XYZCT
    }
}

impl fmt::Display for DimensionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.0 {
            write!(f, "{}", axis.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for DimensionOrder {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DimensionOrder::parse(s)
    }
}

impl TryFrom<String> for DimensionOrder {
    type Error = ReaderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DimensionOrder::parse(&value)
    }
}

impl From<DimensionOrder> for String {
    fn from(order: DimensionOrder) -> Self {
        order.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_standard_orders() {
        for s in ["XYZCT", "XYZTC", "XYCZT", "XYCTZ", "XYTZC", "XYTCZ"] {
            let order = DimensionOrder::parse(s).unwrap();
            assert_eq!(order.to_string(), s);
        }
    }

    #[test]
    fn test_parse_yx_leading() {
        let order = DimensionOrder::parse("YXCZT").unwrap();
        assert_eq!(order.position(Axis::Y), 0);
        assert_eq!(order.position(Axis::X), 1);
    }

    #[test]
    fn test_parse_lowercase() {
        assert_eq!(DimensionOrder::parse("xyczt").unwrap(), DimensionOrder::XYCZT);
    }

    #[test]
    fn test_parse_rejects_planar_axes_out_of_place() {
        let err = DimensionOrder::parse("ZXYCT").unwrap_err();
        assert!(matches!(err, ReaderError::InvalidDimensionOrder { .. }));
        assert!(err.to_string().contains("ZXYCT"));

        assert!(DimensionOrder::parse("XZYCT").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(DimensionOrder::parse("XYZC").is_err());
        assert!(DimensionOrder::parse("XYZCTT").is_err());
        assert!(DimensionOrder::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_duplicates_and_unknown() {
        assert!(DimensionOrder::parse("XYZZT").is_err());
        assert!(DimensionOrder::parse("XYZCQ").is_err());
    }

    #[test]
    fn test_with_channel_packed() {
        assert_eq!(
            DimensionOrder::XYZTC.with_channel_packed(),
            DimensionOrder::XYCZT
        );
        assert_eq!(
            DimensionOrder::XYTZC.with_channel_packed(),
            DimensionOrder::XYCTZ
        );
        assert_eq!(
            DimensionOrder::XYZCT.with_channel_packed(),
            DimensionOrder::XYCZT
        );
        assert_eq!(
            DimensionOrder::XYCTZ.with_channel_packed(),
            DimensionOrder::XYCTZ
        );
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let json = serde_json::to_string(&DimensionOrder::XYTCZ).unwrap();
        assert_eq!(json, "\"XYTCZ\"");
        let back: DimensionOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DimensionOrder::XYTCZ);
        assert!(serde_json::from_str::<DimensionOrder>("\"CZTXY\"").is_err());
    }
}
