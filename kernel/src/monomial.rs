//! Multi-index bookkeeping for cartesian Taylor expansions.
//!
//! A coefficient vector stores one entry per monomial `x^nx * y^ny * z^nz`.
//! Slots are assigned degree-graded colexicographically, so all monomials
//! of total degree `d` occupy the contiguous range
//! `[d(d+1)(d+2)/6, (d+1)(d+2)(d+3)/6)`.

/// Linear slot of the multi-index `(nx, ny, nz)`.
///
/// With `n = nx + ny + nz` and `m = ny + nz` the slot is
/// `n(n+1)(n+2)/6 + m(m+1)/2 + nz`.
#[inline]
pub fn monomial_index(nx: usize, ny: usize, nz: usize) -> usize {
    let n = nx + ny + nz;
    let m = ny + nz;
    n * (n + 1) * (n + 2) / 6 + m * (m + 1) / 2 + nz
}

/// Factorial of `k`.
#[inline]
pub fn factorial(k: usize) -> u64 {
    (2..=k as u64).product()
}

/// The weight `nx! * ny! * nz!` associated with a multi-index.
#[inline]
pub fn monomial_weight(alpha: &[usize; 3]) -> u64 {
    factorial(alpha[0]) * factorial(alpha[1]) * factorial(alpha[2])
}

/// Number of coefficients in a multipole expansion of a given order.
/// Multipole expansions carry the degrees `0..order`.
///
/// # Arguments
/// * `order` - Expansion order.
pub fn ncoeffs_multipole(order: usize) -> usize {
    order * (order + 1) * (order + 2) / 6
}

/// Number of coefficients in a local expansion of a given order.
/// Local expansions carry the degrees `0..=order`.
///
/// # Arguments
/// * `order` - Expansion order.
pub fn ncoeffs_local(order: usize) -> usize {
    (order + 1) * (order + 2) * (order + 3) / 6
}

/// All multi-indices with total degree at most `degree`, in slot order.
pub fn monomials(degree: usize) -> Vec<[usize; 3]> {
    let mut indices = Vec::with_capacity(ncoeffs_local(degree));
    for n in 0..=degree {
        for m in 0..=n {
            for nz in 0..=m {
                indices.push([n - m, m - nz, nz]);
            }
        }
    }
    indices
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_monomial_index_is_a_bijection() {
        let degree = 8;
        let indices = monomials(degree);
        assert_eq!(indices.len(), ncoeffs_local(degree));

        // Enumeration order must agree with the index map, so the map is a
        // permutation of 0..ncoeffs.
        for (slot, [nx, ny, nz]) in indices.iter().enumerate() {
            assert_eq!(monomial_index(*nx, *ny, *nz), slot);
        }
    }

    #[test]
    fn test_ncoeffs() {
        // (k+1)(k+2)/2 monomials at degree k, summed over the carried range.
        for order in 1..=10 {
            let per_degree = |k: usize| (k + 1) * (k + 2) / 2;
            let multipole: usize = (0..order).map(per_degree).sum();
            let local: usize = (0..=order).map(per_degree).sum();
            assert_eq!(multipole, ncoeffs_multipole(order));
            assert_eq!(local, ncoeffs_local(order));
        }

        assert_eq!(ncoeffs_multipole(4), 20);
        assert_eq!(ncoeffs_local(4), 35);
    }

    #[test]
    fn test_monomial_weights() {
        assert_eq!(monomial_weight(&[0, 0, 0]), 1);
        assert_eq!(monomial_weight(&[3, 0, 0]), 6);
        assert_eq!(monomial_weight(&[2, 1, 3]), 12);

        for alpha in monomials(6) {
            assert!(monomial_weight(&alpha) >= 1);
        }
    }
}
