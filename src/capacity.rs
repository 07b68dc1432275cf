use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const LOW_CAPACITY: usize = 2_900;
const MEDIUM_CAPACITY: usize = 2_300;
const QUARTILE_CAPACITY: usize = 1_600;
const HIGH_CAPACITY: usize = 1_200;

/// QR error-correction level.
///
/// Higher levels survive more damage to the printed symbol but leave less
/// room for payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ErrorCorrection {
    /// ~7% of codewords can be restored
    Low,
    /// ~15% of codewords can be restored
    #[default]
    Medium,
    /// ~25% of codewords can be restored
    Quartile,
    /// ~30% of codewords can be restored
    High,
}

impl ErrorCorrection {
    /// All levels, lowest redundancy first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::Quartile, Self::High];

    /// Returns the payload budget in bytes for a single symbol.
    ///
    /// These sit below the byte-mode maxima of a version 40 symbol
    /// (2953 / 2331 / 1663 / 1273) so that a marked part still fits.
    #[must_use]
    pub const fn capacity(self) -> usize {
        match self {
            Self::Low => LOW_CAPACITY,
            Self::Medium => MEDIUM_CAPACITY,
            Self::Quartile => QUARTILE_CAPACITY,
            Self::High => HIGH_CAPACITY,
        }
    }

    /// Largest byte-mode payload a version 40 symbol holds at this level.
    #[must_use]
    pub const fn symbol_limit(self) -> usize {
        match self {
            Self::Low => 2_953,
            Self::Medium => 2_331,
            Self::Quartile => 1_663,
            Self::High => 1_273,
        }
    }

    /// Returns the single-letter code (`L`, `M`, `Q`, `H`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Low => 'L',
            Self::Medium => 'M',
            Self::Quartile => 'Q',
            Self::High => 'H',
        }
    }

    /// Approximate share of the symbol that can be restored.
    #[must_use]
    pub const fn recovery_percent(self) -> u8 {
        match self {
            Self::Low => 7,
            Self::Medium => 15,
            Self::Quartile => 25,
            Self::High => 30,
        }
    }

    pub(crate) const fn to_ec_level(self) -> qrcode::EcLevel {
        match self {
            Self::Low => qrcode::EcLevel::L,
            Self::Medium => qrcode::EcLevel::M,
            Self::Quartile => qrcode::EcLevel::Q,
            Self::High => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0; 4];
        f.pad(self.letter().encode_utf8(&mut buf))
    }
}

impl FromStr for ErrorCorrection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Self::Low),
            "m" | "medium" => Ok(Self::Medium),
            "q" | "quartile" => Ok(Self::Quartile),
            "h" | "high" => Ok(Self::High),
            _ => Err(Error::config(format!(
                "unknown error-correction level '{s}', expected one of L, M, Q, H"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_table() {
        assert_eq!(ErrorCorrection::Low.capacity(), 2900);
        assert_eq!(ErrorCorrection::Medium.capacity(), 2300);
        assert_eq!(ErrorCorrection::Quartile.capacity(), 1600);
        assert_eq!(ErrorCorrection::High.capacity(), 1200);
    }

    #[test]
    fn test_capacity_decreases_with_redundancy() {
        for pair in ErrorCorrection::ALL.windows(2) {
            assert!(pair[0].capacity() > pair[1].capacity());
        }
    }

    #[test]
    fn test_budget_leaves_room_below_symbol_limit() {
        for level in ErrorCorrection::ALL {
            assert!(level.capacity() < level.symbol_limit());
        }
    }

    #[test]
    fn test_parse_letters_and_names() {
        assert_eq!("L".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Low);
        assert_eq!("m".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Medium);
        assert_eq!("Quartile".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Quartile);
        assert_eq!(" high ".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::High);
    }

    #[test]
    fn test_parse_unknown_level() {
        let err = "X".parse::<ErrorCorrection>().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("'X'"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for level in ErrorCorrection::ALL {
            assert_eq!(level.to_string().parse::<ErrorCorrection>().unwrap(), level);
        }
    }

    #[test]
    fn test_default_is_medium() {
        assert_eq!(ErrorCorrection::default(), ErrorCorrection::Medium);
    }
}
