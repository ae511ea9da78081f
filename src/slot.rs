// Copyright (C) 2021 Quentin Kniep <hello@quentinkniep.com>
// Distributed under terms of the MIT license.

//! Global indexing over the two rows of a Lamport key.

use std::fmt;

use crate::lamport::BITS;

/// Total number of commitments (and secret preimages) in a key.
pub const SLOTS: usize = 2 * BITS;

/// The message bit value a key row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Row {
    Zero,
    One,
}

impl Row {
    pub const BOTH: [Row; 2] = [Row::Zero, Row::One];
}

/// Index into all `SLOTS` commitments of a key.
/// `0..BITS` addresses the zero row, `BITS..SLOTS` addresses the one row at `index - BITS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// Returns `None` if `index` is not below `SLOTS`.
    pub fn new(index: usize) -> Option<Self> {
        if index < SLOTS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Panics if `position` is not below `BITS`.
    pub fn from_parts(row: Row, position: usize) -> Self {
        assert!(position < BITS, "bit position {} out of range", position);
        match row {
            Row::Zero => Self(position),
            Row::One => Self(BITS + position),
        }
    }

    pub fn row(self) -> Row {
        if self.0 < BITS {
            Row::Zero
        } else {
            Row::One
        }
    }

    /// Bit position within the row.
    pub fn position(self) -> usize {
        self.0 % BITS
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// All slots in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOTS).map(SlotIndex)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_positions() {
        let zero = SlotIndex::from_parts(Row::Zero, 17);
        let one = SlotIndex::from_parts(Row::One, 17);
        assert_eq!(zero.get(), 17);
        assert_eq!(one.get(), BITS + 17);
        assert_eq!(zero.row(), Row::Zero);
        assert_eq!(one.row(), Row::One);
        assert_eq!(zero.position(), one.position());
    }

    #[test]
    fn boundaries() {
        assert_eq!(SlotIndex::new(BITS - 1).unwrap().row(), Row::Zero);
        assert_eq!(SlotIndex::new(BITS).unwrap().row(), Row::One);
        assert_eq!(SlotIndex::new(BITS).unwrap().position(), 0);
        assert_eq!(SlotIndex::new(SLOTS - 1).unwrap().position(), BITS - 1);
        assert_eq!(SlotIndex::new(SLOTS), None);
        assert_eq!(SlotIndex::all().count(), SLOTS);
    }

    #[test]
    #[should_panic]
    fn position_out_of_range() {
        SlotIndex::from_parts(Row::One, BITS);
    }
}
