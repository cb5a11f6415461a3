//! Order keys: fractional indexing for sibling ordering.
//!
//! An order key is a non-empty string over a small, totally ordered alphabet.
//! Siblings are displayed in plain byte-wise (lexicographic) key order, and a
//! new key can always be derived strictly above, below or between existing
//! keys without touching them.
//!
//! Two bounds cannot be subdivided: nothing sorts below a key made only of
//! base digits (`"a"`, `"aa"`), and nothing sorts between `k` and `k` followed
//! by base digits (`"b"` / `"ba"`). Keys produced here never end in the base
//! digit, apart from the first key of an empty group.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};

/// Lowest digit of the reference alphabet; also the first key.
pub const BASE: char = 'a';
/// Branch digit used when a position cannot be subdivided.
pub const MID: char = 'm';
/// Highest digit of the reference alphabet.
pub const MAX: char = 'z';

/// Contiguous ASCII digit range used to spell order keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alphabet {
    base: u8,
    mid: u8,
    max: u8,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Alphabet {
    /// `a`..`z` with `m` as the branch digit.
    pub const DEFAULT: Alphabet = Alphabet {
        base: BASE as u8,
        mid: MID as u8,
        max: MAX as u8,
    };

    pub fn new(base: char, mid: char, max: char) -> DomainResult<Self> {
        if ![base, mid, max].iter().all(char::is_ascii_graphic) {
            return Err(DomainError::InvalidAlphabet(format!(
                "digits must be printable ASCII, got {base:?} {mid:?} {max:?}"
            )));
        }
        if !(base < mid && mid < max) {
            return Err(DomainError::InvalidAlphabet(format!(
                "expected base < mid < max, got {base:?} {mid:?} {max:?}"
            )));
        }
        Ok(Self {
            base: base as u8,
            mid: mid as u8,
            max: max as u8,
        })
    }

    pub fn base(&self) -> char {
        char::from(self.base)
    }

    pub fn max(&self) -> char {
        char::from(self.max)
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && (self.base..=self.max).contains(&(c as u8))
    }

    /// Checks that `key` is non-empty and spelled with digits of this alphabet.
    pub fn validate(&self, key: &str) -> DomainResult<()> {
        if key.is_empty() {
            return Err(DomainError::InvalidKey {
                key: key.to_string(),
                reason: "key is empty".to_string(),
            });
        }
        if let Some(c) = key.chars().find(|&c| !self.contains(c)) {
            return Err(DomainError::InvalidKey {
                key: key.to_string(),
                reason: format!(
                    "character {c:?} outside {:?}..={:?}",
                    self.base(),
                    self.max()
                ),
            });
        }
        Ok(())
    }

    /// True if every digit of `key` is the base digit.
    pub fn is_floor(&self, key: &str) -> bool {
        key.bytes().all(|b| b == self.base)
    }
}

/// Sortable position of a node among its siblings.
///
/// Compared with plain lexicographic string ordering. Deserialized keys are
/// not validated; the engine checks every key it is handed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(String);

impl OrderKey {
    /// Parse a key spelled with the default alphabet.
    pub fn parse(key: &str) -> DomainResult<Self> {
        Alphabet::DEFAULT.validate(key)?;
        Ok(Self(key.to_string()))
    }

    /// Parse a key spelled with `alphabet`.
    pub fn parse_with(key: &str, alphabet: &Alphabet) -> DomainResult<Self> {
        alphabet.validate(key)?;
        Ok(Self(key.to_string()))
    }

    // Callers only pass ASCII digits of a validated alphabet.
    fn from_digits(digits: Vec<u8>) -> Self {
        Self(digits.into_iter().map(char::from).collect())
    }

    fn digits(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Stateless key generator bound to one alphabet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderKeyEngine {
    alphabet: Alphabet,
}

impl OrderKeyEngine {
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Key of the first node in an empty sibling group.
    pub fn first(&self) -> OrderKey {
        OrderKey::from_digits(vec![self.alphabet.base])
    }

    pub fn validate(&self, key: &OrderKey) -> DomainResult<()> {
        self.alphabet.validate(key.as_str())
    }

    /// Generate a key strictly between `before` and `after`.
    ///
    /// An absent bound is open: `(None, Some(k))` inserts at the head of a
    /// group, `(Some(k), None)` appends at the tail, `(None, None)` returns
    /// the first key.
    ///
    /// # Errors
    /// - `InvalidKey` if a bound is empty or uses foreign characters
    /// - `OutOfOrder` if `before >= after`
    /// - `NoRoomBefore` / `NoRoomBetween` if no key exists in the interval
    #[instrument(level = "trace", skip(self))]
    pub fn generate(
        &self,
        before: Option<&OrderKey>,
        after: Option<&OrderKey>,
    ) -> DomainResult<OrderKey> {
        for key in before.into_iter().chain(after) {
            self.validate(key)?;
        }

        let digits = match (before, after) {
            (None, None) => vec![self.alphabet.base],
            (None, Some(after)) => self
                .below(after.digits())
                .ok_or_else(|| DomainError::NoRoomBefore(after.to_string()))?,
            (Some(before), None) => self.above(before.digits()),
            (Some(before), Some(after)) => {
                if before >= after {
                    return Err(DomainError::OutOfOrder {
                        before: before.to_string(),
                        after: after.to_string(),
                    });
                }
                self.between(before.digits(), after.digits())
                    .ok_or_else(|| DomainError::NoRoomBetween {
                        before: before.to_string(),
                        after: after.to_string(),
                    })?
            }
        };

        let key = OrderKey::from_digits(digits);
        debug_assert!(before.map_or(true, |b| *b < key));
        debug_assert!(after.map_or(true, |a| key < *a));
        trace!(%key, "generated order key");
        Ok(key)
    }

    /// Decrement the last digit that can go lower, then branch at `mid`.
    fn below(&self, key: &[u8]) -> Option<Vec<u8>> {
        let pos = key.iter().rposition(|&d| d > self.alphabet.base)?;
        let mut out = key[..pos].to_vec();
        out.push(key[pos] - 1);
        out.push(self.alphabet.mid);
        Some(out)
    }

    /// Increment the last digit, or go one digit deeper once it is saturated.
    fn above(&self, key: &[u8]) -> Vec<u8> {
        let mut out = key.to_vec();
        match out.last_mut() {
            Some(last) if *last < self.alphabet.max => *last += 1,
            _ => out.push(self.alphabet.mid),
        }
        out
    }

    /// Requires `lo < hi`.
    fn between(&self, lo: &[u8], hi: &[u8]) -> Option<Vec<u8>> {
        let mid = [self.alphabet.mid];
        let n = lo.iter().zip(hi).take_while(|(a, b)| a == b).count();

        // lo is a strict prefix of hi: extend lo with something below hi's remainder.
        if n == lo.len() {
            let rest = &hi[n..];
            let mut out = lo.to_vec();
            if rest > &mid[..] {
                out.push(self.alphabet.mid);
            } else {
                out.extend(self.below(rest)?);
            }
            return Some(out);
        }
        debug_assert!(n < hi.len());

        let (low, high) = (lo[n], hi[n]);
        if high - low > 1 {
            let mut out = lo[..n].to_vec();
            out.push(low + (high - low) / 2);
            return Some(out);
        }

        // Adjacent digits: stay on lo's branch, anything above lo's remainder fits.
        let rest = &lo[n + 1..];
        let mut out = lo[..=n].to_vec();
        if rest < &mid[..] {
            out.push(self.alphabet.mid);
        } else {
            out.extend(self.above(rest));
        }
        Some(out)
    }
}

/// [`OrderKeyEngine::generate`] with the default alphabet.
pub fn generate(before: Option<&OrderKey>, after: Option<&OrderKey>) -> DomainResult<OrderKey> {
    OrderKeyEngine::default().generate(before, after)
}
