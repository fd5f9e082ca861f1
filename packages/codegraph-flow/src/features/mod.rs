//! Vertical feature slices

pub mod propagation;
