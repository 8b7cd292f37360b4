//! General type definitions

// Definition of scalar types.
// For now we simply derive from the `cauchy::Scalar` type.
pub use cauchy::Scalar;

/// Generic error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The requested expansion order is outside the supported range.
    #[error("Invalid expansion order: {0}")]
    InvalidExpansionOrder(usize),
    /// Generic error
    #[error("Kernel Error: {0}")]
    Generic(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Evaluation Mode.
///
/// - `Value`: Declares that only values required.
/// - `ValueDeriv` Both values and derivatives required.
#[derive(Clone, Copy)]
pub enum EvalType {
    /// Only values required
    Value,
    /// Both values and derivatives required
    ValueDeriv,
}

/// This enum defines the type of the kernel.
#[derive(Clone, Copy)]
pub enum KernelType {
    /// The Laplace kernel defined as g(x, y) = 1 / | x - y |
    Laplace,
}
