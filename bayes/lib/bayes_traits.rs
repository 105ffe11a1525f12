use crate::error::BayesError;
use crate::image::Shade;

/// Read-only view of a trained model. The classifier is written against
/// this trait, so it can only reach the documented query operations and
/// never a model's internal collections.
pub trait ProbabilityModel {
    /// Side length of the images the model was trained or loaded for.
    fn image_size(&self) -> usize;

    /// Distinct class identifiers in the stored, deterministic order.
    fn classes(&self) -> &[usize];

    /// Smoothed prior probability of a class.
    fn class_probability(&self, class: usize) -> Result<f64, BayesError>;

    /// Smoothed probability of a pixel having the given shade for images
    /// of a class. Only the unshaded probability is stored; the shaded one
    /// is its complement.
    fn pixel_probability(
        &self,
        class: usize,
        shade: Shade,
        row: usize,
        col: usize,
    ) -> Result<f64, BayesError>;
}
