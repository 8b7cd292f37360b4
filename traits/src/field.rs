//! Traits for source box to target box field translations
use crate::fmm::Expansion;

/// Interface for field translations from a source box expansion to a target
/// box expansion or particle.
pub trait SourceToTarget: Expansion {
    /// Multipole to local translation, for well separated boxes.
    ///
    /// # Arguments
    /// * `multipole` - The multipole expansion of the source box.
    /// * `local` - The local expansion to accumulate into.
    /// * `translation` - The vector from source center to target center;
    ///   must obey the multipole acceptance criterion enforced by the tree
    ///   layer.
    fn m2l(
        &self,
        multipole: &Self::Multipole,
        local: &mut Self::Local,
        translation: &[Self::T; 3],
    );

    /// Multipole to particle translation, applied when a source box is in
    /// the near field of a target leaf but small enough for its multipole
    /// expansion to converge at the target.
    ///
    /// # Arguments
    /// * `multipole` - The multipole expansion of the source box.
    /// * `center` - The center of the source box.
    /// * `target` - Coordinate of the target particle.
    /// * `result` - Potential and force accumulator of the target.
    fn m2p(
        &self,
        multipole: &Self::Multipole,
        center: &[Self::T; 3],
        target: &[Self::T; 3],
        result: &mut [Self::T; 4],
    );
}
