//! Derivative tableau for the Laplace kernel.
//!
//! Builds every partial derivative of `1/R` up to a fixed total degree by
//! chain recursion, the workhorse behind the M2L and M2P translations.
use num::Float;

use cartfmm_traits::types::Scalar;

use crate::monomial::monomial_index;

/// Fill `coefficients` with the partial derivatives of `1/R`: slot `I(alpha)`
/// ends up holding `D^alpha (1/R)` evaluated at `dist`.
///
/// Slot 0 must be preset by the caller to `invR = 1/|dist|`; seeding it
/// with a multiple of `invR` scales the whole tableau, since every slot is
/// linear in slot 0. The maximum degree is implied by
/// `coefficients.len()`.
///
/// Phase one ascends slots with the chain recursion
///
/// ```text
/// C[alpha] = invR2/n * sum over axes a with alpha_a >= 1 of
///            (1 - 2n) * dist_a * C[alpha - e_a]
///          + (1 - n) * C[alpha - 2 e_a]    (the latter when alpha_a >= 2)
/// ```
///
/// which is exact for the factorial-scaled tensors `d^alpha (1/R) / alpha!`.
/// Phase two multiplies each slot by its weight `alpha!`, leaving the raw
/// partial derivatives.
///
/// # Arguments
/// * `coefficients` - Tableau to fill, slot 0 preset to (a multiple of) `invR`.
/// * `dist` - The displacement vector, with `invR2 = 1 / (dist . dist)`.
/// * `inv_r2` - Reciprocal of the squared displacement length.
/// * `indices` - Slot-ordered multi-indices covering the tableau.
/// * `weights` - Per-slot weights `alpha!`.
pub fn derivative_series<T>(
    coefficients: &mut [T],
    dist: &[T; 3],
    inv_r2: T,
    indices: &[[usize; 3]],
    weights: &[T],
) where
    T: Scalar<Real = T> + Float,
{
    assert!(
        indices.len() >= coefficients.len() && weights.len() >= coefficients.len(),
        "Monomial tables of {} entries are too short for a tableau of {} coefficients.",
        indices.len().min(weights.len()),
        coefficients.len()
    );

    for slot in 1..coefficients.len() {
        let [nx, ny, nz] = indices[slot];
        let n = nx + ny + nz;
        let far = num::cast::<i64, T>(1 - 2 * n as i64).unwrap();
        let near = num::cast::<i64, T>(1 - n as i64).unwrap();

        let mut sum = T::zero();
        if nx >= 1 {
            sum = sum + far * dist[0] * coefficients[monomial_index(nx - 1, ny, nz)];
            if nx >= 2 {
                sum = sum + near * coefficients[monomial_index(nx - 2, ny, nz)];
            }
        }
        if ny >= 1 {
            sum = sum + far * dist[1] * coefficients[monomial_index(nx, ny - 1, nz)];
            if ny >= 2 {
                sum = sum + near * coefficients[monomial_index(nx, ny - 2, nz)];
            }
        }
        if nz >= 1 {
            sum = sum + far * dist[2] * coefficients[monomial_index(nx, ny, nz - 1)];
            if nz >= 2 {
                sum = sum + near * coefficients[monomial_index(nx, ny, nz - 2)];
            }
        }

        coefficients[slot] = sum * inv_r2 / num::cast::<usize, T>(n).unwrap();
    }

    for slot in 1..coefficients.len() {
        coefficients[slot] = coefficients[slot] * weights[slot];
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    use crate::monomial::{monomial_weight, monomials, ncoeffs_local};

    fn tableau(dist: [f64; 3], degree: usize) -> Vec<f64> {
        let indices = monomials(degree);
        let weights: Vec<f64> = indices
            .iter()
            .map(|alpha| monomial_weight(alpha) as f64)
            .collect();
        let r2 = dist[0] * dist[0] + dist[1] * dist[1] + dist[2] * dist[2];
        let mut coefficients = vec![0.0; ncoeffs_local(degree)];
        coefficients[0] = 1.0 / r2.sqrt();
        derivative_series(&mut coefficients, &dist, 1.0 / r2, &indices, &weights);
        coefficients
    }

    fn potential(x: f64, y: f64, z: f64) -> f64 {
        1.0 / (x * x + y * y + z * z).sqrt()
    }

    #[test]
    fn test_derivative_series_against_finite_differences() {
        let eps = 1e-5;
        let [x, y, z] = [1.1, -0.7, 2.3];
        let coefficients = tableau([x, y, z], 4);

        let d100 = (potential(x + eps, y, z) - potential(x - eps, y, z)) / (2.0 * eps);
        assert_relative_eq!(
            coefficients[monomial_index(1, 0, 0)],
            d100,
            max_relative = 1e-7
        );

        let d001 = (potential(x, y, z + eps) - potential(x, y, z - eps)) / (2.0 * eps);
        assert_relative_eq!(
            coefficients[monomial_index(0, 0, 1)],
            d001,
            max_relative = 1e-7
        );

        let d200 = (potential(x + eps, y, z) - 2.0 * potential(x, y, z)
            + potential(x - eps, y, z))
            / (eps * eps);
        assert_relative_eq!(
            coefficients[monomial_index(2, 0, 0)],
            d200,
            max_relative = 1e-4
        );

        let d110 = (potential(x + eps, y + eps, z) - potential(x + eps, y - eps, z)
            - potential(x - eps, y + eps, z)
            + potential(x - eps, y - eps, z))
            / (4.0 * eps * eps);
        assert_relative_eq!(
            coefficients[monomial_index(1, 1, 0)],
            d110,
            max_relative = 1e-4
        );
    }

    #[test]
    fn test_derivative_series_closed_forms() {
        // d/dx (1/R) = -x/R^3 and d2/dxdy (1/R) = 3xy/R^5.
        let dist = [0.9, 1.4, -0.6];
        let r2: f64 = dist.iter().map(|c| c * c).sum();
        let r = r2.sqrt();
        let coefficients = tableau(dist, 3);

        assert_relative_eq!(
            coefficients[monomial_index(1, 0, 0)],
            -dist[0] / (r2 * r),
            epsilon = 1e-13
        );
        assert_relative_eq!(
            coefficients[monomial_index(1, 1, 0)],
            3.0 * dist[0] * dist[1] / (r2 * r2 * r),
            epsilon = 1e-13
        );
        // The trace of the Hessian vanishes away from the origin.
        let laplacian = coefficients[monomial_index(2, 0, 0)]
            + coefficients[monomial_index(0, 2, 0)]
            + coefficients[monomial_index(0, 0, 2)];
        assert_relative_eq!(laplacian, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_series_axis_symmetry() {
        // A displacement along the diagonal makes the axes interchangeable.
        let coefficients = tableau([1.5, 1.5, 1.5], 4);
        assert_relative_eq!(
            coefficients[monomial_index(3, 1, 0)],
            coefficients[monomial_index(0, 1, 3)],
            epsilon = 1e-13
        );
        assert_relative_eq!(
            coefficients[monomial_index(2, 0, 0)],
            coefficients[monomial_index(0, 0, 2)],
            epsilon = 1e-13
        );
    }
}
