//! Trait for Green's function kernels
use crate::types::{EvalType, KernelType, Scalar};

use rayon::ThreadPool;

/// Direct evaluation of a Green's function kernel over point clouds.
///
/// Coordinate slices are laid out struct-of-arrays,
/// `[x_0, ..., x_{n-1}, y_0, ..., y_{n-1}, z_0, ..., z_{n-1}]`, and results
/// are grouped per target with `range_component_count` entries each.
pub trait Kernel {
    /// Coefficient scalar type.
    type T: Scalar;

    /// Single threaded evaluation of Green's functions.
    ///
    /// # Arguments
    /// * `eval_type` - Either [EvalType::Value] to evaluate potentials, or
    ///   [EvalType::ValueDeriv] for potentials and derivatives.
    /// * `sources` - Source coordinates.
    /// * `targets` - Target coordinates.
    /// * `charges` - Charge at each source.
    /// * `result` - Container to accumulate evaluated potentials into.
    fn evaluate_st(
        &self,
        eval_type: EvalType,
        sources: &[<Self::T as Scalar>::Real],
        targets: &[<Self::T as Scalar>::Real],
        charges: &[Self::T],
        result: &mut [Self::T],
    );

    /// Multithreaded evaluation of Green's functions, distributing targets
    /// over a user-provided thread pool.
    fn evaluate_mt(
        &self,
        eval_type: EvalType,
        sources: &[<Self::T as Scalar>::Real],
        targets: &[<Self::T as Scalar>::Real],
        charges: &[Self::T],
        result: &mut [Self::T],
        thread_pool: &ThreadPool,
    );

    /// The type of the kernel.
    fn kernel_type(&self) -> &KernelType;

    /// The number of components of the input charges.
    fn domain_component_count(&self) -> usize;

    /// The dimension of the space in which the kernel operates.
    fn space_dimension(&self) -> usize;

    /// The number of components of the result per target.
    fn range_component_count(&self, eval_type: EvalType) -> usize;
}
