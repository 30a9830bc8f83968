//! Seed label alphabet and class-granularity remapping
//!
//! Raw seed labels form a closed six-symbol alphabet: five hand-curated
//! vitality classes plus "unlabeled". A [`Granularity`] coarsens that
//! alphabet into 2, 3 or 4 consensus classes through fixed lookup tables;
//! granularity 5 keeps the raw alphabet. Invalid raw labels are rejected
//! at parse time, not at lookup.

use crate::{Error, Result};

/// Raw seed label for a record.
///
/// `Unlabeled` is the implicit `-` value: the record carries no
/// hand-curated ground truth and is never eligible for sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedLabel {
    /// Global language
    G,
    /// Thriving language
    T,
    /// Vital language
    V,
    /// Historic language
    H,
    /// Still (extinct) language
    S,
    /// No seed label
    Unlabeled,
}

impl SeedLabel {
    /// Parse a raw seed label cell. Empty cells and `-` are unlabeled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] for any symbol outside {g,t,v,h,s,-}.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "g" => Ok(Self::G),
            "t" => Ok(Self::T),
            "v" => Ok(Self::V),
            "h" => Ok(Self::H),
            "s" => Ok(Self::S),
            "" | "-" => Ok(Self::Unlabeled),
            other => Err(Error::Storage(format!(
                "invalid seed label '{other}' (expected one of g, t, v, h, s, -)"
            ))),
        }
    }

    /// The raw single-character form.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::G => 'g',
            Self::T => 't',
            Self::V => 'v',
            Self::H => 'h',
            Self::S => 's',
            Self::Unlabeled => '-',
        }
    }

    /// Whether the record is eligible for seed sampling.
    #[must_use]
    pub const fn is_seed(self) -> bool {
        !matches!(self, Self::Unlabeled)
    }
}

/// Number of output classes after coarsening the raw seed alphabet.
///
/// Exactly one granularity is active per experiment batch and is applied
/// uniformly to every sampled seed in that batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// still/historic vs. vital/thriving/global
    Two,
    /// still/historic vs. vital vs. thriving/global
    Three,
    /// still vs. historic vs. vital vs. thriving/global
    Four,
    /// Raw alphabet, no coarsening
    Five,
}

impl Granularity {
    /// Construct from a class count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless `classes` is one of {2,3,4,5}.
    pub fn from_classes(classes: u8) -> Result<Self> {
        match classes {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            other => Err(Error::Config(format!(
                "invalid class granularity {other} (expected 2, 3, 4 or 5)"
            ))),
        }
    }

    /// Map a raw seed label into this granularity's alphabet.
    ///
    /// Pure lookup, total over the raw alphabet. `Unlabeled` always maps
    /// to `"-"`, so re-mapping an undetermined value is a no-op.
    #[must_use]
    pub const fn map(self, label: SeedLabel) -> &'static str {
        use SeedLabel::{Unlabeled, G, H, S, T, V};
        match (self, label) {
            (_, Unlabeled) => "-",
            (Self::Two, S | H) => "sh",
            (Self::Two, V | T | G) => "vtg",
            (Self::Three, S | H) => "sh",
            (Self::Three | Self::Four, V) => "v",
            (Self::Three | Self::Four, T | G) => "tg",
            (Self::Four, S) => "s",
            (Self::Four, H) => "h",
            (Self::Five, S) => "s",
            (Self::Five, H) => "h",
            (Self::Five, V) => "v",
            (Self::Five, T) => "t",
            (Self::Five, G) => "g",
        }
    }
}
