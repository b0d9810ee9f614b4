//! # rxngraph-core
//!
//! Core types shared by the rxngraph crates.
//!
//! This crate provides:
//! - [`Error`] / [`Result`] — the single error type used across rxngraph
//! - [`DType`] / [`WithDType`] — element types of stored arrays
//! - [`Shape`] — array dimensions
//! - [`AttrTable`] / [`AttrView`] — row-major f32 attribute tables

pub mod dtype;
pub mod error;
pub mod shape;
pub mod table;

pub use dtype::{DType, WithDType};
pub use error::{Error, Result};
pub use shape::Shape;
pub use table::{AttrTable, AttrView};
