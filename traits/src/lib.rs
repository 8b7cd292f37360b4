//! Trait definitions for the cartfmm library
#![cfg_attr(feature = "strict", deny(warnings))]
pub mod field;
pub mod fmm;
pub mod kernel;
pub mod types;
