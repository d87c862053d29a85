//! Crate-internal test support and end-to-end resolution scenarios.

pub(crate) mod support;
