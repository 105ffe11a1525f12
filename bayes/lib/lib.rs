pub mod bayes_traits;
pub mod classifier;
pub mod error;
pub mod image;
pub mod labels;
pub mod training_model;
