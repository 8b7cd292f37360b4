//! Traits for cartesian expansion translations
use num::Float;

use crate::types::Scalar;

/// Access to the expansion metadata of a translation-capable kernel.
///
/// A kernel implementing this trait is instantiated with a fixed expansion
/// order; the multipole and local containers it hands out are sized for
/// that order and owned by the caller (normally the tree layer, one pair
/// per box).
pub trait Expansion {
    /// Coefficient scalar type. Cartesian expansions are real valued.
    type T: Scalar + Float;

    /// Multipole (outer) expansion container.
    type Multipole;

    /// Local (inner) expansion container.
    type Local;

    /// Expansion order.
    fn expansion_order(&self) -> usize;

    /// Number of coefficients in a multipole expansion.
    fn multipole_ncoeffs(&self) -> usize;

    /// Number of coefficients in a local expansion.
    fn local_ncoeffs(&self) -> usize;

    /// Create a zeroed multipole expansion sized for this kernel.
    fn init_multipole(&self) -> Self::Multipole;

    /// Create a zeroed local expansion sized for this kernel.
    fn init_local(&self) -> Self::Local;
}

/// Interface for source box translations.
pub trait SourceTranslation: Expansion {
    /// Particle to multipole translation, applied at leaf level.
    ///
    /// # Arguments
    /// * `source` - Coordinate of the source particle.
    /// * `charge` - The source's corresponding charge.
    /// * `center` - The center of the box containing the multipole expansion.
    /// * `multipole` - The multipole expansion to accumulate into.
    fn p2m(
        &self,
        source: &[Self::T; 3],
        charge: Self::T,
        center: &[Self::T; 3],
        multipole: &mut Self::Multipole,
    );

    /// Multipole to multipole translation, applied during the upward pass.
    ///
    /// # Arguments
    /// * `source` - The multipole expansion at the child level.
    /// * `target` - The multipole expansion to accumulate into.
    /// * `translation` - The vector from source center to target center.
    fn m2m(
        &self,
        source: &Self::Multipole,
        target: &mut Self::Multipole,
        translation: &[Self::T; 3],
    );
}

/// Interface for target box translations.
pub trait TargetTranslation: Expansion {
    /// Local to local translation, applied during the downward pass.
    ///
    /// # Arguments
    /// * `source` - The local expansion at the parent level.
    /// * `target` - The local expansion to accumulate into.
    /// * `translation` - The vector from source center to target center.
    fn l2l(&self, source: &Self::Local, target: &mut Self::Local, translation: &[Self::T; 3]);

    /// Local to particle translation, applying the local expansion
    /// accumulated at a leaf box to a target particle it contains.
    ///
    /// # Arguments
    /// * `local` - The local expansion.
    /// * `center` - The center of the box with the local expansion.
    /// * `target` - Coordinate of the target particle.
    /// * `result` - Potential and force accumulator of the target.
    fn l2p(
        &self,
        local: &Self::Local,
        center: &[Self::T; 3],
        target: &[Self::T; 3],
        result: &mut [Self::T; 4],
    );
}
