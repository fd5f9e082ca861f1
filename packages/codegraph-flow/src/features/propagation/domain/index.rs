//! Variant indices
//!
//! An index is the `(entity, context)` key under which a variant is
//! registered. Equality is structural; canonicalization (sharing one
//! allocation among equal indices) is left to the index manager.

use super::context::Context;
use std::rc::Rc;

/// Contextualized entity key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Index<E> {
    pub entity: E,
    pub context: Context<E>,
}

impl<E> Index<E> {
    pub fn new(entity: E, context: Context<E>) -> Self {
        Self { entity, context }
    }
}

/// Shared handle to an index
pub type IndexRef<E> = Rc<Index<E>>;
