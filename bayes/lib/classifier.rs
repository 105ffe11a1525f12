use std::io::Read;
use std::path::Path;

use crate::bayes_traits::ProbabilityModel;
use crate::error::BayesError;
use crate::image::Image;
use crate::labels;

/// Classifies images against a trained or loaded model by maximum
/// log-likelihood. Holds the expected labels of a test set when accuracy
/// is being measured; classification itself is stateless.
pub struct Classifier<M> {
    model: M,
    expected_classes: Vec<usize>,
}

impl<M: ProbabilityModel> Classifier<M> {
    pub fn with_model(model: M) -> Classifier<M> {
        Classifier {
            model,
            expected_classes: Vec::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn set_model(&mut self, model: M) {
        self.model = model;
    }

    /// Log-likelihood of the image belonging to the class: the log10
    /// prior plus the log10 pixel term for every cell. Summing logs in
    /// place of multiplying probabilities avoids underflow.
    pub fn likelihood_score(&self, class: usize, image: &Image) -> Result<f64, BayesError> {
        if image.size() != self.model.image_size() {
            return Err(BayesError::ImageSizeMismatch {
                expected: self.model.image_size(),
                actual: image.size(),
            });
        }

        let mut score = self.model.class_probability(class)?.log10();
        for row in 0..image.size() {
            for col in 0..image.size() {
                score += self
                    .model
                    .pixel_probability(class, image.shade(row, col), row, col)?
                    .log10();
            }
        }
        Ok(score)
    }

    /// Scores every class and returns the one with the highest
    /// likelihood. Classes are visited in the model's stored order and a
    /// tie keeps the earliest class seen.
    pub fn classify(&self, image: &Image) -> Result<usize, BayesError> {
        let mut predicted = None;
        let mut best_score = f64::NEG_INFINITY;

        for &class in self.model.classes() {
            let score = self.likelihood_score(class, image)?;
            if score > best_score {
                best_score = score;
                predicted = Some(class);
            }
        }

        predicted.ok_or(BayesError::NotReady("the model has no classes to score"))
    }

    /// Reads the expected class of each test image, in image order.
    pub fn read_expected(&mut self, path: &Path) -> Result<(), BayesError> {
        self.expected_classes = labels::load_labels(path)?;
        Ok(())
    }

    pub fn read_expected_from<R: Read>(&mut self, source: &mut R) -> Result<(), BayesError> {
        self.expected_classes = labels::read_labels(source)?;
        Ok(())
    }

    pub fn set_expected_labels(&mut self, labels: Vec<usize>) -> Result<(), BayesError> {
        if labels.is_empty() {
            return Err(BayesError::UnreadableSource(String::from(
                "label data is empty",
            )));
        }
        self.expected_classes = labels;
        Ok(())
    }

    /// Classifies every image and returns the proportion matching the
    /// expected labels, in [0, 1].
    pub fn accuracy(&self, images: &[Image]) -> Result<f64, BayesError> {
        if self.expected_classes.is_empty() {
            return Err(BayesError::NotReady(
                "accuracy requires expected labels to be read first",
            ));
        }
        if self.expected_classes.len() != images.len() {
            return Err(BayesError::LabelCountMismatch {
                expected: self.expected_classes.len(),
                images: images.len(),
            });
        }

        let mut correct = 0usize;
        for (image, &expected) in images.iter().zip(&self.expected_classes) {
            if self.classify(image)? == expected {
                correct += 1;
            }
        }
        Ok(correct as f64 / images.len() as f64)
    }
}

#[cfg(test)]
mod classifier_tests {
    use super::*;
    use crate::image::Shade;
    use crate::training_model::TrainingModel;
    use std::io::Cursor;

    fn image(rows: &[&str]) -> Image {
        Image::from_rows(
            rows.iter()
                .map(|row| {
                    row.chars()
                        .map(|cell| {
                            if cell == ' ' {
                                Shade::Unshaded
                            } else {
                                Shade::Shaded
                            }
                        })
                        .collect()
                })
                .collect(),
        )
        .unwrap()
    }

    fn trained_model() -> TrainingModel {
        let mut model = TrainingModel::new();
        model
            .set_images(vec![
                image(&["###", "# #", "###"]),
                image(&["## ", " # ", "###"]),
                image(&[" # ", " # ", " # "]),
            ])
            .unwrap();
        model.set_labels(vec![0, 1, 1]).unwrap();
        model.train().unwrap();
        model
    }

    #[test]
    fn test_likelihood_scores_match_the_trained_estimates() {
        let classifier = Classifier::with_model(trained_model());
        let bar_with_corner = image(&["## ", " # ", " # "]);

        let score_0 = classifier.likelihood_score(0, &bar_with_corner).unwrap();
        let score_1 = classifier.likelihood_score(1, &bar_with_corner).unwrap();

        assert!((score_0 - (-3.788943)).abs() < 1e-4);
        assert!((score_1 - (-1.874583)).abs() < 1e-4);
    }

    #[test]
    fn test_likelihood_is_prior_plus_pixel_terms() {
        let model = trained_model();
        let classifier = Classifier::with_model(model);
        let vertical_bar = image(&[" # ", " # ", " # "]);

        let mut expected = classifier.model().class_probability(1).unwrap().log10();
        for row in 0..3 {
            for col in 0..3 {
                expected += classifier
                    .model()
                    .pixel_probability(1, vertical_bar.shade(row, col), row, col)
                    .unwrap()
                    .log10();
            }
        }

        let actual = classifier.likelihood_score(1, &vertical_bar).unwrap();
        assert!((actual - expected).abs() < 1e-12);
    }

    #[test]
    fn test_images_classify_as_their_most_likely_class() {
        let classifier = Classifier::with_model(trained_model());

        let bar_with_corner = image(&["## ", " # ", " # "]);
        let bordered_square = image(&["###", "# #", "###"]);
        let solid_square = image(&["###", "###", "###"]);

        assert_eq!(classifier.classify(&bar_with_corner).unwrap(), 1);
        assert_eq!(classifier.classify(&bordered_square).unwrap(), 0);
        assert_eq!(classifier.classify(&solid_square).unwrap(), 0);
    }

    #[test]
    fn test_ties_keep_the_earliest_class() {
        // Two classes trained on identical single images produce identical
        // scores for any input.
        let mut model = TrainingModel::new();
        let duplicate = image(&["# ", " #"]);
        model.set_images(vec![duplicate.clone(), duplicate]).unwrap();
        model.set_labels(vec![0, 1]).unwrap();
        model.train().unwrap();

        let classifier = Classifier::with_model(model);
        let probe = image(&["##", "  "]);
        let score_0 = classifier.likelihood_score(0, &probe).unwrap();
        let score_1 = classifier.likelihood_score(1, &probe).unwrap();
        assert_eq!(score_0, score_1);
        assert_eq!(classifier.classify(&probe).unwrap(), 0);
    }

    #[test]
    fn test_accuracy_counts_correct_classifications() {
        let mut classifier = Classifier::with_model(trained_model());
        classifier
            .read_expected_from(&mut Cursor::new("1 0 0"))
            .unwrap();

        let images = vec![
            image(&["## ", " # ", " # "]),
            image(&["###", "# #", "###"]),
            image(&["###", "###", "###"]),
        ];
        let accuracy = classifier.accuracy(&images).unwrap();
        assert!((accuracy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_exceeds_the_regression_floor_on_held_out_images() {
        // Two clearly separated 5x5 classes: left-edge bars and
        // right-edge bars. Training variants each flip one pixel of the
        // base pattern; the held-out variants flip different ones.
        let left = |extra: &[(usize, usize)]| {
            let mut rows: Vec<String> = (0..5).map(|_| String::from("##   ")).collect();
            for &(row, col) in extra {
                let flipped = if rows[row].as_bytes()[col] == b'#' { ' ' } else { '#' };
                rows[row].replace_range(col..col + 1, &flipped.to_string());
            }
            let rows: Vec<&str> = rows.iter().map(|row| row.as_str()).collect();
            image(&rows)
        };
        let right = |extra: &[(usize, usize)]| {
            let mut rows: Vec<String> = (0..5).map(|_| String::from("   ##")).collect();
            for &(row, col) in extra {
                let flipped = if rows[row].as_bytes()[col] == b'#' { ' ' } else { '#' };
                rows[row].replace_range(col..col + 1, &flipped.to_string());
            }
            let rows: Vec<&str> = rows.iter().map(|row| row.as_str()).collect();
            image(&rows)
        };

        let mut model = TrainingModel::new();
        model
            .set_images(vec![
                left(&[]),
                left(&[(0, 4)]),
                left(&[(2, 0)]),
                right(&[]),
                right(&[(4, 0)]),
                right(&[(1, 4)]),
            ])
            .unwrap();
        model.set_labels(vec![0, 0, 0, 1, 1, 1]).unwrap();
        model.train().unwrap();

        let mut classifier = Classifier::with_model(model);
        classifier.set_expected_labels(vec![0, 0, 1, 1]).unwrap();

        let held_out = vec![
            left(&[(4, 2)]),
            left(&[(1, 1)]),
            right(&[(0, 0)]),
            right(&[(3, 3)]),
        ];
        assert!(classifier.accuracy(&held_out).unwrap() > 0.7);
    }

    #[test]
    fn test_accuracy_requires_matching_label_and_image_counts() {
        let mut classifier = Classifier::with_model(trained_model());
        classifier
            .read_expected_from(&mut Cursor::new("1 0"))
            .unwrap();

        let images = vec![image(&["###", "###", "###"])];
        assert!(matches!(
            classifier.accuracy(&images),
            Err(BayesError::LabelCountMismatch {
                expected: 2,
                images: 1
            })
        ));
    }

    #[test]
    fn test_accuracy_requires_expected_labels() {
        let classifier = Classifier::with_model(trained_model());
        let images = vec![image(&["###", "###", "###"])];
        assert!(matches!(
            classifier.accuracy(&images),
            Err(BayesError::NotReady(_))
        ));
    }

    #[test]
    fn test_classifying_with_an_untrained_model_is_an_error() {
        let classifier = Classifier::with_model(TrainingModel::new());
        let probe = Image::from_rows(Vec::new()).unwrap();
        assert!(matches!(
            classifier.classify(&probe),
            Err(BayesError::NotReady(_))
        ));
    }

    #[test]
    fn test_mismatched_image_sizes_are_rejected() {
        let classifier = Classifier::with_model(trained_model());
        let wrong_size = image(&["##", "##"]);
        assert!(matches!(
            classifier.classify(&wrong_size),
            Err(BayesError::ImageSizeMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_missing_expected_label_file_is_an_error() {
        let mut classifier = Classifier::with_model(trained_model());
        assert!(matches!(
            classifier.read_expected(Path::new("IOD/dsad/d")),
            Err(BayesError::UnreadableSource(_))
        ));
    }
}
