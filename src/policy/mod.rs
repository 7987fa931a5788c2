//! Admission policies.

pub mod two_q;
