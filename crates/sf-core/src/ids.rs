use core::fmt;
use core::num::NonZeroU32;

use crate::error::SfError;

/// Compact, stable identifier used across the signal-flow graph.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Largest index an Id can hold.
    pub const MAX_INDEX: u32 = u32::MAX - 1;

    /// Create an Id from a 0-based index by storing index+1.
    ///
    /// Indices above [`Id::MAX_INDEX`] clamp to it.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Create an Id from a `usize` position in an insertion-ordered list.
    ///
    /// Positions above [`Id::MAX_INDEX`] clamp to it rather than wrapping;
    /// use `Id::try_from` where that can happen.
    pub fn from_usize(index: usize) -> Self {
        Self::from_index(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Recover the 0-based index as a `usize`, ready for slice indexing.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

impl TryFrom<usize> for Id {
    type Error = SfError;

    fn try_from(index: usize) -> Result<Self, SfError> {
        match u32::try_from(index) {
            Ok(index) if index <= Self::MAX_INDEX => Ok(Self::from_index(index)),
            _ => Err(SfError::InvalidArg {
                what: "position does not fit in an Id",
            }),
        }
    }
}

/// Domain-specific ID aliases for clarity (no runtime cost).
pub type CompId = Id;
pub type ConnectorId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i);
            assert_eq!(id.slot(), i as usize);
        }
    }

    #[test]
    fn large_positions_clamp_instead_of_wrapping() {
        let max = Id::MAX_INDEX as usize;
        assert_eq!(Id::from_usize(max).index(), Id::MAX_INDEX);
        assert_eq!(Id::try_from(max).map(Id::index), Ok(Id::MAX_INDEX));
        assert!(Id::try_from(max + 1).is_err());

        #[cfg(target_pointer_width = "64")]
        {
            let wrapped = (1_usize << 32) + 5;
            assert_eq!(Id::from_usize(wrapped).index(), Id::MAX_INDEX);
            assert!(Id::try_from(wrapped).is_err());
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }

    #[test]
    fn display_uses_index() {
        assert_eq!(Id::from_usize(7).to_string(), "7");
        assert_eq!(format!("{:?}", Id::from_index(3)), "Id(3)");
    }
}
