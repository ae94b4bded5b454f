//! Amplitude domain metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric family of a signal's amplitude values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CodomainKind {
    #[default]
    Real,
    Integer,
    Unsigned,
}

/// Amplitude domain of a signal: kind plus bit width.
///
/// Purely descriptive. The engine computes every sample in `f64`; the codomain
/// travels with the signal so importers and exporters can restore the
/// original representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Codomain {
    pub kind: CodomainKind,
    pub bits: u16,
}

impl Codomain {
    pub const REAL64: Self = Self {
        kind: CodomainKind::Real,
        bits: 64,
    };

    pub fn new(kind: CodomainKind, bits: u16) -> Self {
        Self { kind, bits }
    }

    /// 16-bit signed integers, the usual PCM audio codomain.
    pub fn pcm16() -> Self {
        Self::new(CodomainKind::Integer, 16)
    }
}

impl Default for Codomain {
    fn default() -> Self {
        Self::REAL64
    }
}

impl fmt::Display for Codomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            CodomainKind::Real => "real",
            CodomainKind::Integer => "int",
            CodomainKind::Unsigned => "uint",
        };
        write!(f, "{kind}{}", self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_real64() {
        assert_eq!(Codomain::default(), Codomain::REAL64);
        assert_eq!(Codomain::default().to_string(), "real64");
        assert_eq!(Codomain::pcm16().to_string(), "int16");
    }
}
