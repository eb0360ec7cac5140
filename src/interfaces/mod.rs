//! Operator-facing surfaces of the dispatcher.

pub mod csv;
