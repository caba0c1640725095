//! # Models
//!
//! Parametric view of the `A -> B -> C` chain: the four-conditional parameter
//! set with its closed-form interventional oracle, and the EM routine that
//! recovers those parameters when the mediator is partially missing.

pub mod chain;
pub mod em;
