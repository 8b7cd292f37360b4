//! Implementation of the Laplace kernel with cartesian expansions.
//!
//! K(t,s) = 1 / |s-t|        Laplace potential
//! K(t,s) = (s-t) / |s-t|^3  Laplace force
use std::cmp;

use itertools::{iproduct, Itertools};
use num::Float;
use rayon::prelude::*;

use cartfmm_traits::{
    field::SourceToTarget,
    fmm::{Expansion, SourceTranslation, TargetTranslation},
    kernel::Kernel,
    types::{Error, EvalType, KernelType, Result, Scalar},
};

use crate::constants::{
    DIMENSION, MAX_EXPANSION_ORDER, SELF_INTERACTION_THRESHOLD, VALIDATED_EXPANSION_ORDER,
};
use crate::derivative::derivative_series;
use crate::expansion::{power_series, Local, Multipole};
use crate::helpers::check_dimensions_evaluate;
use crate::monomial::{
    monomial_index, monomial_weight, monomials, ncoeffs_local, ncoeffs_multipole,
};

/// The Laplace kernel together with its cartesian Taylor translation
/// operators, for a fixed expansion order.
///
/// The kernel is a pure value type; expansion storage belongs to the
/// caller and every operator accumulates into its output argument. The
/// slot tables for the monomial ordering and the `alpha!` weights are
/// precomputed at construction, so the translation operators run flat
/// loops with no index arithmetic beyond table lookups.
pub struct LaplaceCartesianKernel<T>
where
    T: Scalar<Real = T> + Float,
{
    expansion_order: usize,
    kernel_type: KernelType,
    /// Slot ordered multi-indices for all degrees `0..=expansion_order`.
    indices: Vec<[usize; 3]>,
    /// Per-slot weights `alpha!`.
    weights: Vec<T>,
}

impl<T> LaplaceCartesianKernel<T>
where
    T: Scalar<Real = T> + Float,
{
    /// Create a kernel for the given expansion order.
    ///
    /// Fails for order 0 and for orders whose `alpha!` weights are not
    /// exactly representable in a binary64 mantissa. Orders beyond
    /// [VALIDATED_EXPANSION_ORDER] are accepted but logged, since the
    /// derivative recursion has only been validated for double precision
    /// up to that range.
    pub fn new(expansion_order: usize) -> Result<Self> {
        if expansion_order == 0 || expansion_order > MAX_EXPANSION_ORDER {
            return Err(Error::InvalidExpansionOrder(expansion_order));
        }
        if expansion_order > VALIDATED_EXPANSION_ORDER {
            log::warn!(
                "Expansion order {} exceeds the validated range ({}); expect cancellation in the derivative recursion.",
                expansion_order,
                VALIDATED_EXPANSION_ORDER
            );
        }

        let indices = monomials(expansion_order);
        let weights = indices
            .iter()
            .map(|alpha| num::cast::<u64, T>(monomial_weight(alpha)).unwrap())
            .collect_vec();

        Ok(Self {
            expansion_order,
            kernel_type: KernelType::Laplace,
            indices,
            weights,
        })
    }

    /// Kernel evaluation K(t, s).
    ///
    /// Returns the Laplace potential and force 4-vector on `t` from a unit
    /// charge at `s`: potential `1/|s-t|`, force `(s-t)/|s-t|^3`. The self
    /// interaction is excluded by returning zero below the squared
    /// distance threshold.
    pub fn eval(&self, target: &[T; 3], source: &[T; 3]) -> [T; 4] {
        let threshold = num::cast::<f64, T>(SELF_INTERACTION_THRESHOLD).unwrap();
        let dx = source[0] - target[0];
        let dy = source[1] - target[1];
        let dz = source[2] - target[2];
        let r2 = dx * dx + dy * dy + dz * dz;
        let inv_r2 = if r2 < threshold { T::zero() } else { T::one() / r2 };
        let inv_r = Float::sqrt(inv_r2);
        let scale = inv_r2 * inv_r;
        [inv_r, dx * scale, dy * scale, dz * scale]
    }

    /// Particle to multipole.
    ///
    /// Accumulates `multipole[alpha] += charge * (center - source)^alpha / alpha!`
    /// for all degrees below the expansion order.
    ///
    /// # Arguments
    /// * `source` - Coordinate of the source particle.
    /// * `charge` - The source's corresponding charge.
    /// * `center` - The center of the box containing the multipole expansion.
    /// * `multipole` - The multipole expansion to accumulate into.
    pub fn p2m(
        &self,
        source: &[T; 3],
        charge: T,
        center: &[T; 3],
        multipole: &mut Multipole<T>,
    ) {
        self.check_order(multipole.order());
        let dist = [
            center[0] - source[0],
            center[1] - source[1],
            center[2] - source[2],
        ];

        let mut tableau = vec![T::zero(); ncoeffs_multipole(self.expansion_order)];
        tableau[0] = charge;
        power_series(&mut tableau, &dist, &self.indices);

        for (out, term) in multipole.data_mut().iter_mut().zip(tableau) {
            *out += term;
        }
    }

    /// Multipole to multipole.
    ///
    /// Shifts a multipole from a child center to a parent center,
    /// `target[alpha] += sum over beta <= alpha of
    /// translation^(alpha-beta)/(alpha-beta)! * source[beta]`. Slot 0
    /// receives exactly `source[0]`, conserving total charge.
    ///
    /// # Arguments
    /// * `source` - The multipole expansion at the child level.
    /// * `target` - The multipole expansion to accumulate into.
    /// * `translation` - The vector from source center to target center.
    pub fn m2m(
        &self,
        source: &Multipole<T>,
        target: &mut Multipole<T>,
        translation: &[T; 3],
    ) {
        self.check_order(source.order());
        self.check_order(target.order());

        let mut tableau = vec![T::zero(); ncoeffs_multipole(self.expansion_order)];
        tableau[0] = T::one();
        power_series(&mut tableau, translation, &self.indices);

        let moments = source.data();
        let out = target.data_mut();
        for (slot, &[nx, ny, nz]) in self.indices[..out.len()].iter().enumerate() {
            let mut sum = T::zero();
            for (kx, ky, kz) in iproduct!(0..=nx, 0..=ny, 0..=nz) {
                sum = sum
                    + tableau[monomial_index(nx - kx, ny - ky, nz - kz)]
                        * moments[monomial_index(kx, ky, kz)];
            }
            out[slot] += sum;
        }
    }

    /// Multipole to local.
    ///
    /// Converts a source box multipole into a local Taylor series about the
    /// target box center,
    /// `local[alpha] += sum over beta of multipole[beta] * D[alpha + beta]`
    /// with `D` the derivative tableau of `1/|translation|` and the sum
    /// bounded by `|alpha + beta| <= order` and the multipole degrees.
    ///
    /// # Arguments
    /// * `multipole` - The multipole expansion of the source box.
    /// * `local` - The local expansion to accumulate into.
    /// * `translation` - The vector from source center to target center;
    ///   must obey the multipole acceptance criterion enforced by the tree
    ///   layer.
    pub fn m2l(&self, multipole: &Multipole<T>, local: &mut Local<T>, translation: &[T; 3]) {
        self.check_order(multipole.order());
        self.check_order(local.order());

        let r2 = translation[0] * translation[0]
            + translation[1] * translation[1]
            + translation[2] * translation[2];
        let inv_r2 = T::one() / r2;

        let mut tableau = vec![T::zero(); ncoeffs_local(self.expansion_order)];
        tableau[0] = Float::sqrt(inv_r2);
        derivative_series(&mut tableau, translation, inv_r2, &self.indices, &self.weights);

        let moments = multipole.data();
        let out = local.data_mut();
        for (slot, &[nx, ny, nz]) in self.indices[..out.len()].iter().enumerate() {
            let n = nx + ny + nz;
            let degree = cmp::min(self.expansion_order - n, self.expansion_order - 1);
            let mut sum = T::zero();
            for (source_slot, &[kx, ky, kz]) in
                self.indices[..ncoeffs_local(degree)].iter().enumerate()
            {
                sum = sum
                    + moments[source_slot]
                        * tableau[monomial_index(nx + kx, ny + ky, nz + kz)];
            }
            out[slot] += sum;
        }
    }

    /// Multipole to particle.
    ///
    /// Evaluates a source box multipole directly at a target, accumulating
    /// potential and force. Equivalent to M2L followed by L2P with the
    /// local expansion degenerated to the four slots of degree at most one.
    ///
    /// # Arguments
    /// * `multipole` - The multipole expansion of the source box.
    /// * `center` - The center of the source box.
    /// * `target` - Coordinate of the target particle.
    /// * `result` - Potential and force accumulator of the target.
    pub fn m2p(
        &self,
        multipole: &Multipole<T>,
        center: &[T; 3],
        target: &[T; 3],
        result: &mut [T; 4],
    ) {
        self.check_order(multipole.order());
        let dist = [
            target[0] - center[0],
            target[1] - center[1],
            target[2] - center[2],
        ];
        let r2 = dist[0] * dist[0] + dist[1] * dist[1] + dist[2] * dist[2];
        let inv_r2 = T::one() / r2;

        let mut tableau = vec![T::zero(); ncoeffs_local(self.expansion_order)];
        tableau[0] = Float::sqrt(inv_r2);
        derivative_series(&mut tableau, &dist, inv_r2, &self.indices, &self.weights);

        let moments = multipole.data();
        let mut sum = T::zero();
        for (moment, coefficient) in moments.iter().zip(tableau.iter()) {
            sum = sum + *moment * *coefficient;
        }
        result[0] += sum;

        for (component, offset) in [(1, [1, 0, 0]), (2, [0, 1, 0]), (3, [0, 0, 1])] {
            let mut sum = T::zero();
            for (source_slot, &[kx, ky, kz]) in
                self.indices[..moments.len()].iter().enumerate()
            {
                sum = sum
                    + moments[source_slot]
                        * tableau
                            [monomial_index(kx + offset[0], ky + offset[1], kz + offset[2])];
            }
            result[component] += sum;
        }
    }

    /// Local to local.
    ///
    /// Re-expands a local Taylor series about a new center,
    /// `target[alpha] += sum over kappa of
    /// translation^kappa/kappa! * source[alpha + kappa]`. Exact in exact
    /// arithmetic, since a degree bounded polynomial is recentred without
    /// loss.
    ///
    /// # Arguments
    /// * `source` - The local expansion at the parent level.
    /// * `target` - The local expansion to accumulate into.
    /// * `translation` - The vector from source center to target center.
    pub fn l2l(&self, source: &Local<T>, target: &mut Local<T>, translation: &[T; 3]) {
        self.check_order(source.order());
        self.check_order(target.order());

        let mut tableau = vec![T::zero(); ncoeffs_local(self.expansion_order)];
        tableau[0] = T::one();
        power_series(&mut tableau, translation, &self.indices);

        let coefficients = source.data();
        let out = target.data_mut();
        for (slot, &[nx, ny, nz]) in self.indices[..out.len()].iter().enumerate() {
            let n = nx + ny + nz;
            let degree = self.expansion_order - n;
            let mut sum = T::zero();
            for (shift_slot, &[kx, ky, kz]) in
                self.indices[..ncoeffs_local(degree)].iter().enumerate()
            {
                sum = sum
                    + tableau[shift_slot]
                        * coefficients[monomial_index(nx + kx, ny + ky, nz + kz)];
            }
            out[slot] += sum;
        }
    }

    /// Local to particle.
    ///
    /// Evaluates a local expansion and its gradient at a target inside the
    /// box, accumulating potential and force.
    ///
    /// # Arguments
    /// * `local` - The local expansion.
    /// * `center` - The center of the box with the local expansion.
    /// * `target` - Coordinate of the target particle.
    /// * `result` - Potential and force accumulator of the target.
    pub fn l2p(
        &self,
        local: &Local<T>,
        center: &[T; 3],
        target: &[T; 3],
        result: &mut [T; 4],
    ) {
        self.check_order(local.order());
        let dist = [
            target[0] - center[0],
            target[1] - center[1],
            target[2] - center[2],
        ];

        let mut tableau = vec![T::zero(); ncoeffs_local(self.expansion_order)];
        tableau[0] = T::one();
        power_series(&mut tableau, &dist, &self.indices);

        let coefficients = local.data();
        let mut sum = T::zero();
        for (coefficient, power) in coefficients.iter().zip(tableau.iter()) {
            sum = sum + *coefficient * *power;
        }
        result[0] += sum;

        let gradient_terms = ncoeffs_local(self.expansion_order - 1);
        for (component, offset) in [(1, [1, 0, 0]), (2, [0, 1, 0]), (3, [0, 0, 1])] {
            let mut sum = T::zero();
            for (shift_slot, &[kx, ky, kz]) in
                self.indices[..gradient_terms].iter().enumerate()
            {
                sum = sum
                    + tableau[shift_slot]
                        * coefficients
                            [monomial_index(kx + offset[0], ky + offset[1], kz + offset[2])];
            }
            result[component] += sum;
        }
    }

    fn check_order(&self, order: usize) {
        assert_eq!(
            order, self.expansion_order,
            "Expansion of order {} passed to a kernel of order {}.",
            order, self.expansion_order
        );
    }
}

impl<T> Expansion for LaplaceCartesianKernel<T>
where
    T: Scalar<Real = T> + Float,
{
    type T = T;
    type Multipole = Multipole<T>;
    type Local = Local<T>;

    fn expansion_order(&self) -> usize {
        self.expansion_order
    }

    fn multipole_ncoeffs(&self) -> usize {
        ncoeffs_multipole(self.expansion_order)
    }

    fn local_ncoeffs(&self) -> usize {
        ncoeffs_local(self.expansion_order)
    }

    fn init_multipole(&self) -> Multipole<T> {
        Multipole::new(self.expansion_order)
    }

    fn init_local(&self) -> Local<T> {
        Local::new(self.expansion_order)
    }
}

impl<T> SourceTranslation for LaplaceCartesianKernel<T>
where
    T: Scalar<Real = T> + Float,
{
    fn p2m(
        &self,
        source: &[T; 3],
        charge: T,
        center: &[T; 3],
        multipole: &mut Multipole<T>,
    ) {
        LaplaceCartesianKernel::p2m(self, source, charge, center, multipole)
    }

    fn m2m(&self, source: &Multipole<T>, target: &mut Multipole<T>, translation: &[T; 3]) {
        LaplaceCartesianKernel::m2m(self, source, target, translation)
    }
}

impl<T> SourceToTarget for LaplaceCartesianKernel<T>
where
    T: Scalar<Real = T> + Float,
{
    fn m2l(&self, multipole: &Multipole<T>, local: &mut Local<T>, translation: &[T; 3]) {
        LaplaceCartesianKernel::m2l(self, multipole, local, translation)
    }

    fn m2p(&self, multipole: &Multipole<T>, center: &[T; 3], target: &[T; 3], result: &mut [T; 4]) {
        LaplaceCartesianKernel::m2p(self, multipole, center, target, result)
    }
}

impl<T> TargetTranslation for LaplaceCartesianKernel<T>
where
    T: Scalar<Real = T> + Float,
{
    fn l2l(&self, source: &Local<T>, target: &mut Local<T>, translation: &[T; 3]) {
        LaplaceCartesianKernel::l2l(self, source, target, translation)
    }

    fn l2p(&self, local: &Local<T>, center: &[T; 3], target: &[T; 3], result: &mut [T; 4]) {
        LaplaceCartesianKernel::l2p(self, local, center, target, result)
    }
}

impl<T> Kernel for LaplaceCartesianKernel<T>
where
    T: Scalar<Real = T> + Float + Send + Sync,
{
    type T = T;

    fn evaluate_st(
        &self,
        eval_type: EvalType,
        sources: &[<Self::T as Scalar>::Real],
        targets: &[<Self::T as Scalar>::Real],
        charges: &[Self::T],
        result: &mut [Self::T],
    ) {
        check_dimensions_evaluate(self, eval_type, sources, targets, charges, result);
        let ntargets = targets.len() / self.space_dimension();
        let range_dim = self.range_component_count(eval_type);

        result
            .chunks_exact_mut(range_dim)
            .enumerate()
            .for_each(|(target_index, my_chunk)| {
                let target = [
                    targets[target_index],
                    targets[ntargets + target_index],
                    targets[2 * ntargets + target_index],
                ];

                evaluate_laplace_one_target(eval_type, &target, sources, charges, my_chunk)
            });
    }

    fn evaluate_mt(
        &self,
        eval_type: EvalType,
        sources: &[<Self::T as Scalar>::Real],
        targets: &[<Self::T as Scalar>::Real],
        charges: &[Self::T],
        result: &mut [Self::T],
        thread_pool: &rayon::ThreadPool,
    ) {
        check_dimensions_evaluate(self, eval_type, sources, targets, charges, result);
        let ntargets = targets.len() / self.space_dimension();
        let range_dim = self.range_component_count(eval_type);

        thread_pool.install(|| {
            result
                .par_chunks_exact_mut(range_dim)
                .enumerate()
                .for_each(|(target_index, my_chunk)| {
                    let target = [
                        targets[target_index],
                        targets[ntargets + target_index],
                        targets[2 * ntargets + target_index],
                    ];

                    evaluate_laplace_one_target(eval_type, &target, sources, charges, my_chunk)
                });
        })
    }

    fn kernel_type(&self) -> &KernelType {
        &self.kernel_type
    }

    fn domain_component_count(&self) -> usize {
        1
    }

    fn space_dimension(&self) -> usize {
        DIMENSION
    }

    fn range_component_count(&self, eval_type: EvalType) -> usize {
        laplace_component_count(eval_type)
    }
}

/// Accumulate the potentials, and optionally forces, induced at one target
/// by a cloud of charged sources.
///
/// `sources` holds coordinates struct-of-arrays,
/// `[x_0, ..., x_{n-1}, y_0, ..., z_{n-1}]`. Pairs below the squared
/// distance threshold contribute nothing.
pub fn evaluate_laplace_one_target<T>(
    eval_type: EvalType,
    target: &[T; 3],
    sources: &[T],
    charges: &[T],
    result: &mut [T],
) where
    T: Scalar<Real = T> + Float,
{
    let nsources = charges.len();
    let threshold = num::cast::<f64, T>(SELF_INTERACTION_THRESHOLD).unwrap();

    match eval_type {
        EvalType::Value => {
            let mut my_result = T::zero();
            for index in 0..nsources {
                let diff0 = sources[index] - target[0];
                let diff1 = sources[nsources + index] - target[1];
                let diff2 = sources[2 * nsources + index] - target[2];
                let r2 = diff0 * diff0 + diff1 * diff1 + diff2 * diff2;
                let inv_diff_norm = if r2 < threshold {
                    T::zero()
                } else {
                    T::one() / Float::sqrt(r2)
                };

                my_result += charges[index] * inv_diff_norm;
            }
            result[0] += my_result;
        }
        EvalType::ValueDeriv => {
            // Cannot simply use an array my_result as this is not
            // correctly auto-vectorized.

            let mut my_result0 = T::zero();
            let mut my_result1 = T::zero();
            let mut my_result2 = T::zero();
            let mut my_result3 = T::zero();

            for index in 0..nsources {
                let diff0 = sources[index] - target[0];
                let diff1 = sources[nsources + index] - target[1];
                let diff2 = sources[2 * nsources + index] - target[2];
                let r2 = diff0 * diff0 + diff1 * diff1 + diff2 * diff2;
                let inv_diff_norm = if r2 < threshold {
                    T::zero()
                } else {
                    T::one() / Float::sqrt(r2)
                };
                let inv_diff_norm_cubed = inv_diff_norm * inv_diff_norm * inv_diff_norm;

                my_result0 += charges[index] * inv_diff_norm;
                my_result1 += charges[index] * diff0 * inv_diff_norm_cubed;
                my_result2 += charges[index] * diff1 * inv_diff_norm_cubed;
                my_result3 += charges[index] * diff2 * inv_diff_norm_cubed;
            }

            result[0] += my_result0;
            result[1] += my_result1;
            result[2] += my_result2;
            result[3] += my_result3;
        }
    }
}

fn laplace_component_count(eval_type: EvalType) -> usize {
    match eval_type {
        EvalType::Value => 1,
        EvalType::ValueDeriv => 4,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_eval() {
        let kernel = LaplaceCartesianKernel::<f64>::new(4).unwrap();
        let source = [0.1, 0.2, 0.3];
        let target = [3.0, 4.0, 5.0];

        let value = kernel.eval(&target, &source);

        let diff = [
            source[0] - target[0],
            source[1] - target[1],
            source[2] - target[2],
        ];
        let r = (diff[0] * diff[0] + diff[1] * diff[1] + diff[2] * diff[2]).sqrt();
        assert_relative_eq!(value[0], 1.0 / r, epsilon = 1e-14);
        assert_relative_eq!(value[1], diff[0] / (r * r * r), epsilon = 1e-14);
        assert_relative_eq!(value[2], diff[1] / (r * r * r), epsilon = 1e-14);
        assert_relative_eq!(value[3], diff[2] / (r * r * r), epsilon = 1e-14);
    }

    #[test]
    fn test_eval_excludes_self_interaction() {
        let kernel = LaplaceCartesianKernel::<f64>::new(4).unwrap();
        let target = [0.4, -0.2, 1.7];
        assert_eq!(kernel.eval(&target, &target), [0.0; 4]);
    }

    #[test]
    fn test_invalid_expansion_order() {
        assert!(LaplaceCartesianKernel::<f64>::new(0).is_err());
        assert!(LaplaceCartesianKernel::<f64>::new(MAX_EXPANSION_ORDER + 1).is_err());
        assert!(LaplaceCartesianKernel::<f64>::new(1).is_ok());
    }

    #[test]
    fn test_p2m_slot_zero_holds_the_charge() {
        let kernel = LaplaceCartesianKernel::<f64>::new(5).unwrap();
        let mut multipole = kernel.init_multipole();

        kernel.p2m(&[0.1, -0.2, 0.05], 0.75, &[0.0, 0.0, 0.0], &mut multipole);
        kernel.p2m(&[-0.3, 0.1, 0.2], -0.25, &[0.0, 0.0, 0.0], &mut multipole);

        assert_relative_eq!(multipole.data()[0], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_evaluate_st_matches_eval() {
        let kernel = LaplaceCartesianKernel::<f64>::new(3).unwrap();

        // Struct-of-arrays coordinates for three sources and two targets.
        let sources = [0.1, -0.4, 0.7, 0.2, 0.5, -0.3, 0.3, -0.6, 0.1];
        let targets = [2.0, -1.5, 2.5, 1.0, 3.0, -2.0];
        let charges = [1.0, -0.5, 2.0];

        let mut result = vec![0.0; 8];
        kernel.evaluate_st(
            EvalType::ValueDeriv,
            &sources,
            &targets,
            &charges,
            &mut result,
        );

        for target_index in 0..2 {
            let target = [
                targets[target_index],
                targets[2 + target_index],
                targets[4 + target_index],
            ];
            let mut expected = [0.0; 4];
            for source_index in 0..3 {
                let source = [
                    sources[source_index],
                    sources[3 + source_index],
                    sources[6 + source_index],
                ];
                let value = kernel.eval(&target, &source);
                for (out, component) in expected.iter_mut().zip(value) {
                    *out += charges[source_index] * component;
                }
            }
            for component in 0..4 {
                assert_relative_eq!(
                    result[4 * target_index + component],
                    expected[component],
                    epsilon = 1e-13
                );
            }
        }
    }

    #[test]
    fn test_evaluate_mt_matches_st() {
        let kernel = LaplaceCartesianKernel::<f64>::new(3).unwrap();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap();

        let sources = [0.1, -0.4, 0.7, 0.2, 0.5, -0.3, 0.3, -0.6, 0.1];
        let targets = [2.0, -1.5, 2.5, 1.0, 3.0, -2.0];
        let charges = [1.0, -0.5, 2.0];

        let mut serial = vec![0.0; 2];
        kernel.evaluate_st(EvalType::Value, &sources, &targets, &charges, &mut serial);

        let mut parallel = vec![0.0; 2];
        kernel.evaluate_mt(
            EvalType::Value,
            &sources,
            &targets,
            &charges,
            &mut parallel,
            &pool,
        );

        for (a, b) in serial.iter().zip(parallel.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15);
        }
    }
}
