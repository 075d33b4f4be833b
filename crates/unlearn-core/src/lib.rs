//! # unlearn-core
//!
//! Core data model and index algebra for unlearn.
//!
//! This crate provides:
//! - [`LabeledArray`] — index-aligned sample data and integer labels
//! - [`Shape`] — per-sample shape
//! - [`index`] — pure index-set functions (class membership, complement,
//!   seeded sampling)
//! - [`Error`] / [`Result`] — the error type shared by the workspace

pub mod array;
pub mod error;
pub mod index;
pub mod shape;

pub use array::LabeledArray;
pub use error::{Error, Result};
pub use shape::Shape;
