//! Symbol sets
//!
//! Default token set over interned `u32` symbols, kept as a sorted,
//! deduplicated vector so that union and difference are linear merges.
//!
//! # Performance Characteristics
//! - Insert: O(n) (binary search + shift)
//! - Contains: O(log n)
//! - Union / Difference: O(n + m) merge

use crate::features::propagation::ports::TokenSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Interned abstract value
pub type Symbol = u32;

/// Sorted set of symbols
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolSet {
    elements: Vec<Symbol>,
}

impl SymbolSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn singleton(symbol: Symbol) -> Self {
        Self {
            elements: vec![symbol],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.elements.iter().copied()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.elements
    }

    /// Keep only the symbols satisfying `keep`
    pub fn retain(&mut self, keep: impl FnMut(&Symbol) -> bool) {
        self.elements.retain(keep);
    }

    /// Whether every symbol of `self` is in `other`
    pub fn is_subset_of(&self, other: &SymbolSet) -> bool {
        self.diff(other).is_empty()
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut elements: Vec<Symbol> = iter.into_iter().collect();
        elements.sort_unstable();
        elements.dedup();
        Self { elements }
    }
}

impl TokenSet for SymbolSet {
    type Token = Symbol;

    fn add_all(&mut self, other: &Self) {
        if other.elements.is_empty() {
            return;
        }
        if self.elements.is_empty() {
            self.elements = other.elements.clone();
            return;
        }

        // Merge two sorted arrays
        let mut result = Vec::with_capacity(self.elements.len() + other.elements.len());
        let mut i = 0;
        let mut j = 0;

        while i < self.elements.len() && j < other.elements.len() {
            match self.elements[i].cmp(&other.elements[j]) {
                Ordering::Less => {
                    result.push(self.elements[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    result.push(other.elements[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    result.push(self.elements[i]);
                    i += 1;
                    j += 1;
                }
            }
        }

        result.extend_from_slice(&self.elements[i..]);
        result.extend_from_slice(&other.elements[j..]);

        self.elements = result;
    }

    fn diff(&self, other: &Self) -> Self {
        if other.elements.is_empty() {
            return self.clone();
        }

        let mut result = Vec::new();
        let mut j = 0;

        for &elem in &self.elements {
            while j < other.elements.len() && other.elements[j] < elem {
                j += 1;
            }
            if j >= other.elements.len() || other.elements[j] != elem {
                result.push(elem);
            }
        }

        Self { elements: result }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    fn contains(&self, token: &Symbol) -> bool {
        self.elements.binary_search(token).is_ok()
    }

    fn insert(&mut self, token: Symbol) -> bool {
        match self.elements.binary_search(&token) {
            Ok(_) => false,
            Err(pos) => {
                self.elements.insert(pos, token);
                true
            }
        }
    }

    fn values(&self) -> Vec<Symbol> {
        self.elements.clone()
    }

    fn from_tokens(tokens: impl IntoIterator<Item = Symbol>) -> Self {
        tokens.into_iter().collect()
    }
}
