//! Single-position bookkeeping for the signal engine.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Flat,
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Flat => write!(f, "flat"),
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// At most one open position. The entry price lives inside the open
/// variants, so it exists exactly when a position does.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long {
        entry_price: f64,
    },
    Short {
        entry_price: f64,
    },
}

impl PositionState {
    pub fn side(&self) -> Side {
        match self {
            PositionState::Flat => Side::Flat,
            PositionState::Long { .. } => Side::Long,
            PositionState::Short { .. } => Side::Short,
        }
    }

    pub fn entry_price(&self) -> Option<f64> {
        match *self {
            PositionState::Flat => None,
            PositionState::Long { entry_price } | PositionState::Short { entry_price } => {
                Some(entry_price)
            }
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, PositionState::Flat)
    }

    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long { .. })
    }

    pub fn is_short(&self) -> bool {
        matches!(self, PositionState::Short { .. })
    }

    pub fn open_long(&mut self, price: f64) {
        debug_assert!(!self.is_open(), "open_long while a position is open");
        *self = PositionState::Long { entry_price: price };
    }

    pub fn open_short(&mut self, price: f64) {
        debug_assert!(!self.is_open(), "open_short while a position is open");
        *self = PositionState::Short { entry_price: price };
    }

    pub fn close(&mut self) {
        *self = PositionState::Flat;
    }

    /// Price move relative to entry, signed so that a gain is positive.
    pub fn unrealized_return_pct(&self, price: f64) -> Option<f64> {
        match *self {
            PositionState::Flat => None,
            PositionState::Long { entry_price } => {
                Some((price - entry_price) / entry_price * 100.0)
            }
            PositionState::Short { entry_price } => {
                Some((entry_price - price) / entry_price * 100.0)
            }
        }
    }
}
