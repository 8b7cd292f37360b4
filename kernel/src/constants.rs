//! Crate wide constants

/// The dimension of the space in which the kernels operate.
pub const DIMENSION: usize = 3;

/// Squared distance below which a source/target pair is treated as the same
/// particle and the kernel evaluates to zero.
pub const SELF_INTERACTION_THRESHOLD: f64 = 1e-8;

/// Largest supported expansion order. Bounded so that every multi-index
/// weight `nx! * ny! * nz!` stays exactly representable in an IEEE-754
/// binary64 mantissa (16! < 2^53).
pub const MAX_EXPANSION_ORDER: usize = 16;

/// Largest expansion order validated for double precision with well
/// separated boxes. Beyond this the (1 - 2n) coefficients of the
/// derivative recursion start to lose accuracy to cancellation.
pub const VALIDATED_EXPANSION_ORDER: usize = 10;
