//! Analysis contexts
//!
//! A context captures the sensitivity under which an entity is analyzed:
//! - **Entry point**: the root the current exploration started from
//! - **Call stack**: k-limited call string, innermost call last
//! - **Program point**: the statement/expression being processed
//! - **Allocation site**: the abstract object a receiver came from
//!
//! Contexts are plain values. Every variant keeps its own copy.

use serde::{Deserialize, Serialize};

/// Which context components participate in an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sensitivity {
    pub entry_point: bool,
    pub call_stack: bool,
    pub program_point: bool,
    pub allocation_site: bool,
}

impl Sensitivity {
    /// One variant per entity (fields, statics)
    pub const INSENSITIVE: Self = Self {
        entry_point: false,
        call_stack: false,
        program_point: false,
        allocation_site: false,
    };

    /// k-CFA style: locals, parameters, methods
    pub const CALL_STRING: Self = Self {
        entry_point: false,
        call_stack: true,
        program_point: false,
        allocation_site: false,
    };

    /// Object sensitivity: instance fields, array components
    pub const OBJECT: Self = Self {
        entry_point: false,
        call_stack: false,
        program_point: false,
        allocation_site: true,
    };

    /// Every component
    pub const FULL: Self = Self {
        entry_point: true,
        call_stack: true,
        program_point: true,
        allocation_site: true,
    };
}

impl Default for Sensitivity {
    fn default() -> Self {
        Sensitivity::FULL
    }
}

/// Analysis context over entities `E`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context<E> {
    entry_point: Option<E>,
    call_stack: Vec<E>,
    program_point: Option<E>,
    allocation_site: Option<E>,
}

impl<E> Default for Context<E> {
    fn default() -> Self {
        Self {
            entry_point: None,
            call_stack: Vec::new(),
            program_point: None,
            allocation_site: None,
        }
    }
}

impl<E: Clone> Context<E> {
    /// Create empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context used to seed a root entity
    pub fn for_entry(root: E) -> Self {
        Self {
            entry_point: Some(root.clone()),
            call_stack: vec![root],
            program_point: None,
            allocation_site: None,
        }
    }

    /// Push a call (with k-limiting, `max_depth == 0` keeps everything)
    pub fn push_call(&self, site: E, max_depth: usize) -> Self {
        let mut call_stack = self.call_stack.clone();
        call_stack.push(site);

        if max_depth > 0 && call_stack.len() > max_depth {
            let excess = call_stack.len() - max_depth;
            call_stack.drain(..excess);
        }

        Self {
            call_stack,
            ..self.clone()
        }
    }

    /// Drop the innermost call
    pub fn pop_call(&self) -> Self {
        let mut ctx = self.clone();
        ctx.call_stack.pop();
        ctx
    }

    pub fn with_program_point(&self, point: E) -> Self {
        Self {
            program_point: Some(point),
            ..self.clone()
        }
    }

    pub fn with_allocation_site(&self, site: E) -> Self {
        Self {
            allocation_site: Some(site),
            ..self.clone()
        }
    }

    /// Keep only the components selected by `sensitivity`
    pub fn project(&self, sensitivity: Sensitivity) -> Self {
        Self {
            entry_point: if sensitivity.entry_point {
                self.entry_point.clone()
            } else {
                None
            },
            call_stack: if sensitivity.call_stack {
                self.call_stack.clone()
            } else {
                Vec::new()
            },
            program_point: if sensitivity.program_point {
                self.program_point.clone()
            } else {
                None
            },
            allocation_site: if sensitivity.allocation_site {
                self.allocation_site.clone()
            } else {
                None
            },
        }
    }
}

impl<E> Context<E> {
    /// Method currently being analyzed (innermost call)
    pub fn current_method(&self) -> Option<&E> {
        self.call_stack.last()
    }

    pub fn entry_point(&self) -> Option<&E> {
        self.entry_point.as_ref()
    }

    pub fn call_stack(&self) -> &[E] {
        &self.call_stack
    }

    pub fn program_point(&self) -> Option<&E> {
        self.program_point.as_ref()
    }

    pub fn allocation_site(&self) -> Option<&E> {
        self.allocation_site.as_ref()
    }

    /// Depth of the call string
    pub fn depth(&self) -> usize {
        self.call_stack.len()
    }
}
