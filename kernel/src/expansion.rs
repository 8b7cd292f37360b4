//! Expansion containers and the monomial power tableau.
use std::ops::AddAssign;

use num::Float;

use cartfmm_traits::types::Scalar;

use crate::monomial::{monomial_index, ncoeffs_local, ncoeffs_multipole};

/// Multipole (outer) expansion attached to a box.
///
/// Carries the monomial degrees `0..order`; slot 0 holds the total charge
/// of the box, higher slots hold weighted moments of the box's sources
/// relative to the box center. Accumulated by P2M and M2M, never
/// decremented.
#[derive(Clone, Debug)]
pub struct Multipole<T>
where
    T: Scalar<Real = T> + Float,
{
    order: usize,
    coefficients: Vec<T>,
}

/// Local (inner) expansion attached to a box.
///
/// Carries the monomial degrees `0..=order`, one more than a multipole of
/// the same order. Represents the truncated Taylor series, about the box
/// center, of the field induced by distant sources; accumulated by M2L and
/// L2L and consumed by L2P.
#[derive(Clone, Debug)]
pub struct Local<T>
where
    T: Scalar<Real = T> + Float,
{
    order: usize,
    coefficients: Vec<T>,
}

impl<T> Multipole<T>
where
    T: Scalar<Real = T> + Float,
{
    /// A zeroed multipole expansion of the given order.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            coefficients: vec![T::zero(); ncoeffs_multipole(order)],
        }
    }

    /// Expansion order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// The coefficients in slot order.
    pub fn data(&self) -> &[T] {
        &self.coefficients
    }

    /// Mutable access to the coefficients in slot order.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.coefficients
    }
}

impl<T> Local<T>
where
    T: Scalar<Real = T> + Float,
{
    /// A zeroed local expansion of the given order.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            coefficients: vec![T::zero(); ncoeffs_local(order)],
        }
    }

    /// Expansion order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// The coefficients in slot order.
    pub fn data(&self) -> &[T] {
        &self.coefficients
    }

    /// Mutable access to the coefficients in slot order.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.coefficients
    }
}

impl<T> AddAssign<&Multipole<T>> for Multipole<T>
where
    T: Scalar<Real = T> + Float,
{
    fn add_assign(&mut self, other: &Multipole<T>) {
        assert_eq!(
            self.order, other.order,
            "Cannot merge multipole expansions of orders {} and {}.",
            self.order, other.order
        );
        for (out, rhs) in self.coefficients.iter_mut().zip(other.coefficients.iter()) {
            *out += *rhs;
        }
    }
}

impl<T> AddAssign<&Local<T>> for Local<T>
where
    T: Scalar<Real = T> + Float,
{
    fn add_assign(&mut self, other: &Local<T>) {
        assert_eq!(
            self.order, other.order,
            "Cannot merge local expansions of orders {} and {}.",
            self.order, other.order
        );
        for (out, rhs) in self.coefficients.iter_mut().zip(other.coefficients.iter()) {
            *out += *rhs;
        }
    }
}

/// Fill `coefficients` with the monomial power tableau of a displacement,
/// `coefficients[I(alpha)] = dist^alpha / alpha! * coefficients[0]`.
///
/// Slot 0 must be preset by the caller (1, or the charge during P2M). The
/// maximum degree is implied by `coefficients.len()`. Each slot is derived
/// from a single lower-degree slot by decrementing the last nonzero axis,
/// so one ascending walk satisfies all precedences; the divisor is the
/// decremented axis count and is never zero.
///
/// # Arguments
/// * `coefficients` - Tableau to fill, slot 0 preset.
/// * `dist` - The displacement vector.
/// * `indices` - Slot-ordered multi-indices covering the tableau.
pub fn power_series<T>(coefficients: &mut [T], dist: &[T; 3], indices: &[[usize; 3]])
where
    T: Scalar<Real = T> + Float,
{
    assert!(
        indices.len() >= coefficients.len(),
        "Monomial table of {} entries is too short for a tableau of {} coefficients.",
        indices.len(),
        coefficients.len()
    );

    for slot in 1..coefficients.len() {
        let [nx, ny, nz] = indices[slot];
        let (previous, axis, count) = if nz >= 1 {
            (monomial_index(nx, ny, nz - 1), 2, nz)
        } else if ny >= 1 {
            (monomial_index(nx, ny - 1, 0), 1, ny)
        } else {
            (monomial_index(nx - 1, 0, 0), 0, nx)
        };
        coefficients[slot] =
            coefficients[previous] * dist[axis] / num::cast::<usize, T>(count).unwrap();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    use crate::monomial::{monomial_weight, monomials};

    #[test]
    fn test_power_series() {
        let degree = 5;
        let indices = monomials(degree);
        let dist = [0.7, -1.3, 0.4];

        let mut coefficients = vec![0.0; ncoeffs_local(degree)];
        coefficients[0] = 1.0;
        power_series(&mut coefficients, &dist, &indices);

        // alpha! * C[I(alpha)] recovers the plain monomial dist^alpha.
        for (slot, alpha) in indices.iter().enumerate() {
            let expected = f64::powi(dist[0], alpha[0] as i32)
                * f64::powi(dist[1], alpha[1] as i32)
                * f64::powi(dist[2], alpha[2] as i32);
            let weight = monomial_weight(alpha) as f64;
            assert_relative_eq!(coefficients[slot] * weight, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_power_series_scales_with_slot_zero() {
        let degree = 3;
        let indices = monomials(degree);
        let dist = [0.2, 0.1, -0.5];

        let mut unit = vec![0.0; ncoeffs_local(degree)];
        unit[0] = 1.0;
        power_series(&mut unit, &dist, &indices);

        let charge = 2.5;
        let mut charged = vec![0.0; ncoeffs_local(degree)];
        charged[0] = charge;
        power_series(&mut charged, &dist, &indices);

        for (a, b) in unit.iter().zip(charged.iter()) {
            assert_relative_eq!(a * charge, *b, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_expansion_add_assign() {
        let mut a = Multipole::<f64>::new(4);
        let mut b = Multipole::<f64>::new(4);
        a.data_mut()[0] = 1.0;
        a.data_mut()[7] = -2.0;
        b.data_mut()[7] = 0.5;

        a += &b;
        assert_relative_eq!(a.data()[0], 1.0);
        assert_relative_eq!(a.data()[7], -1.5);
    }
}
