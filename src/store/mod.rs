//! Value storage for the frequent tier.

pub mod frequent;

pub use frequent::{FrequentStore, Promotion};
