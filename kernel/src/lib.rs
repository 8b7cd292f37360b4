//! Cartesian Taylor expansion kernels
//!
//! Implements the multipole and local expansion engine used by a
//! hierarchical N-body solver for the 3D Laplace potential
//! `K(t, s) = 1 / |s - t|` and its force field `(s - t) / |s - t|^3`.
//! Expansions are truncated cartesian Taylor series of a fixed order; the
//! six translation and evaluation operators (P2M, M2M, M2L, M2P, L2L, L2P)
//! are exposed by [laplace_cartesian::LaplaceCartesianKernel].

#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod constants;
pub mod derivative;
pub mod expansion;
pub mod helpers;
pub mod laplace_cartesian;
pub mod monomial;
