//! Fixed-size bit sets, the lattice values of every analysis in this crate.

use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, PartialOrd};
use std::fmt;

const WORD_BITS: usize = 64;

/// A set of positions in `[0, len)`, one bit per tracked entity.
///
/// The length is fixed at construction. Combining or comparing two sets of
/// different lengths is a programming error and panics.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    /// A set of `len` positions with none set.
    pub fn new_empty(len: usize) -> BitSet {
        BitSet {
            words: vec![0; (len + WORD_BITS - 1) / WORD_BITS],
            len,
        }
    }

    /// A set of `len` positions with all set.
    pub fn new_full(len: usize) -> BitSet {
        let mut set = BitSet::new_empty(len);
        for word in &mut set.words {
            *word = !0;
        }
        // Unused bits in the last word stay clear, so equality and counting
        // only see real positions.
        let rem = len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = set.words.last_mut() {
                *last &= (1_u64 << rem) - 1;
            }
        }
        set
    }

    /// The size of the universe, not the number of members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no position is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// Returns true if every position is set.
    pub fn is_full(&self) -> bool {
        *self == BitSet::new_full(self.len)
    }

    pub fn count(&self) -> usize {
        self.words
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.check_position(position);
        (self.words[position / WORD_BITS] >> (position % WORD_BITS)) & 1 == 1
    }

    pub fn insert(&mut self, position: usize) {
        self.check_position(position);
        self.words[position / WORD_BITS] |= 1_u64 << (position % WORD_BITS);
    }

    pub fn remove(&mut self, position: usize) {
        self.check_position(position);
        self.words[position / WORD_BITS] &= !(1_u64 << (position % WORD_BITS));
    }

    /// Set or clear a position.
    pub fn set(&mut self, position: usize, value: bool) {
        if value {
            self.insert(position)
        } else {
            self.remove(position)
        }
    }

    /// `self = self | other`
    pub fn union_with(&mut self, other: &BitSet) {
        self.check_len(other);
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= *b;
        }
    }

    /// `self = self & other`
    pub fn intersect_with(&mut self, other: &BitSet) {
        self.check_len(other);
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a &= *b;
        }
    }

    /// `self = self & !other`
    pub fn subtract_with(&mut self, other: &BitSet) {
        self.check_len(other);
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a &= !*b;
        }
    }

    pub fn union(mut self, other: &BitSet) -> BitSet {
        self.union_with(other);
        self
    }

    pub fn intersection(mut self, other: &BitSet) -> BitSet {
        self.intersect_with(other);
        self
    }

    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.check_len(other);
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & !b == 0)
    }

    /// Set positions, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |position| self.contains(*position))
    }

    fn check_len(&self, other: &BitSet) {
        assert_eq!(
            self.len, other.len,
            "bit sets over different universes ({} and {} entities)",
            self.len, other.len
        );
    }

    fn check_position(&self, position: usize) {
        assert!(
            position < self.len,
            "bit position {} out of range for a universe of {} entities",
            position,
            self.len
        );
    }
}

/// Inclusion order. Sets which are not subsets of one another are
/// incomparable.
impl PartialOrd for BitSet {
    fn partial_cmp(&self, rhs: &BitSet) -> Option<Ordering> {
        match (self.is_subset(rhs), rhs.is_subset(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{ ")?;
        for position in self.iter() {
            write!(f, "{} ", position)?;
        }
        write!(f, "}}")
    }
}
