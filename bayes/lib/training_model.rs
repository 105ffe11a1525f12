use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::str::SplitWhitespace;

use crate::bayes_traits::ProbabilityModel;
use crate::error::BayesError;
use crate::image::{Image, Shade};
use crate::labels;

/// Laplace smoothing constant used when no other value is configured.
pub const DEFAULT_SMOOTHING: f64 = 1.0;

/// Naive bayes estimates over a labeled set of binary square images.
///
/// A model is populated either by binding images and labels and calling
/// [`train`](TrainingModel::train), or by deserializing previously saved
/// probability data. Once populated it is only ever read.
#[derive(Clone, Debug)]
pub struct TrainingModel {
    image_size: usize,
    classes: Vec<usize>,
    class_counts: HashMap<usize, usize>,
    class_priors: HashMap<usize, f64>,
    // Per class, the probability of each pixel being unshaded. The shaded
    // probability is always derived as the complement, never stored.
    pixel_unshaded: HashMap<usize, Vec<Vec<f64>>>,
    image_labels: Vec<usize>,
    training_images: Vec<Image>,
    smoothing: f64,
}

impl TrainingModel {
    pub fn new() -> TrainingModel {
        TrainingModel::with_smoothing(DEFAULT_SMOOTHING)
    }

    pub fn with_smoothing(smoothing: f64) -> TrainingModel {
        TrainingModel {
            image_size: 0,
            classes: Vec::new(),
            class_counts: HashMap::new(),
            class_priors: HashMap::new(),
            pixel_unshaded: HashMap::new(),
            image_labels: Vec::new(),
            training_images: Vec::new(),
            smoothing,
        }
    }

    /// Binds the images to train on and infers the image size from the
    /// first of them. All images must share one side length.
    pub fn set_images(&mut self, images: Vec<Image>) -> Result<(), BayesError> {
        let size = match images.first() {
            Some(image) => image.size(),
            None => return Err(BayesError::NotReady("no training images were provided")),
        };
        for image in &images {
            if image.size() != size {
                return Err(BayesError::ImageSizeMismatch {
                    expected: size,
                    actual: image.size(),
                });
            }
        }
        self.image_size = size;
        self.training_images = images;
        Ok(())
    }

    /// Reads one label per image from the file at `path` and derives the
    /// class set and per-class counts.
    pub fn read_labels(&mut self, path: &Path) -> Result<(), BayesError> {
        let parsed = labels::load_labels(path)?;
        self.set_labels(parsed)
    }

    pub fn read_labels_from<R: Read>(&mut self, source: &mut R) -> Result<(), BayesError> {
        let parsed = labels::read_labels(source)?;
        self.set_labels(parsed)
    }

    /// Binds an already parsed label sequence, index-aligned with the
    /// bound images.
    pub fn set_labels(&mut self, labels: Vec<usize>) -> Result<(), BayesError> {
        if labels.is_empty() {
            return Err(BayesError::UnreadableSource(String::from(
                "label data is empty",
            )));
        }
        self.image_labels = labels;
        self.count_classes();
        Ok(())
    }

    fn count_classes(&mut self) {
        let mut classes = self.image_labels.clone();
        classes.sort_unstable();
        classes.dedup();

        let mut counts = HashMap::new();
        for &label in &self.image_labels {
            *counts.entry(label).or_insert(0usize) += 1;
        }

        self.classes = classes;
        self.class_counts = counts;
    }

    /// Estimates class priors and per-pixel conditionals from the bound
    /// images and labels. Both must be bound first, in either order.
    pub fn train(&mut self) -> Result<(), BayesError> {
        if self.training_images.is_empty() {
            return Err(BayesError::NotReady("train called before images were bound"));
        }
        if self.image_labels.is_empty() {
            return Err(BayesError::NotReady("train called before labels were read"));
        }
        if self.training_images.len() != self.image_labels.len() {
            return Err(BayesError::DatasetSizeMismatch {
                images: self.training_images.len(),
                labels: self.image_labels.len(),
            });
        }

        self.calculate_class_probability();
        self.calculate_pixel_probability();
        Ok(())
    }

    /// P(class = c) = (k + |c|) / (k * num_classes + total images).
    fn calculate_class_probability(&mut self) {
        let denominator =
            self.smoothing * self.classes.len() as f64 + self.image_labels.len() as f64;

        let mut priors = HashMap::new();
        for &class in &self.classes {
            let count = self.class_counts[&class] as f64;
            priors.insert(class, (self.smoothing + count) / denominator);
        }
        self.class_priors = priors;
    }

    /// P(F(row, col) = unshaded | class = c) = (k + dark count) / (2k + |c|).
    ///
    /// Classes accumulate independently, so the outer loop runs in
    /// parallel.
    fn calculate_pixel_probability(&mut self) {
        let grids: HashMap<usize, Vec<Vec<f64>>> = self
            .classes
            .par_iter()
            .map(|&class| (class, self.pixel_grid(class)))
            .collect();
        self.pixel_unshaded = grids;
    }

    fn pixel_grid(&self, class: usize) -> Vec<Vec<f64>> {
        let denominator = 2.0 * self.smoothing + self.class_counts[&class] as f64;

        (0..self.image_size)
            .map(|row| {
                (0..self.image_size)
                    .map(|col| {
                        let dark_count = self
                            .image_labels
                            .iter()
                            .zip(&self.training_images)
                            .filter(|(label, image)| {
                                **label == class && image.shade(row, col) == Shade::Unshaded
                            })
                            .count();
                        (self.smoothing + dark_count as f64) / denominator
                    })
                    .collect()
            })
            .collect()
    }

    /// All class priors in class order, then every stored pixel grid by
    /// class, row-major. This is the order the persisted format uses.
    pub fn probabilities(&self) -> Vec<f64> {
        let mut all = Vec::new();
        for &class in &self.classes {
            all.push(self.class_priors[&class]);
        }
        for &class in &self.classes {
            for row in &self.pixel_unshaded[&class] {
                all.extend_from_slice(row);
            }
        }
        all
    }

    /// Writes the positional text layout: image size, class count, class
    /// identifiers, class priors, then each class's pixel grid row-major.
    /// One decimal token per line; floats keep their shortest
    /// round-tripping form.
    pub fn serialize<W: Write>(&self, sink: &mut W) -> Result<(), BayesError> {
        writeln!(sink, "{}", self.image_size)?;
        writeln!(sink, "{}", self.classes.len())?;
        for &class in &self.classes {
            writeln!(sink, "{}", class)?;
        }
        for &class in &self.classes {
            writeln!(sink, "{}", self.class_priors[&class])?;
        }
        for &class in &self.classes {
            for row in &self.pixel_unshaded[&class] {
                for &probability in row {
                    writeln!(sink, "{}", probability)?;
                }
            }
        }
        Ok(())
    }

    /// Rebuilds a model from the layout `serialize` writes.
    pub fn deserialize<R: Read>(source: &mut R) -> Result<TrainingModel, BayesError> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        if text.split_whitespace().next().is_none() {
            return Err(BayesError::UnreadableSource(String::from(
                "model data is empty",
            )));
        }

        let mut tokens = text.split_whitespace();
        let image_size = next_usize(&mut tokens)?;
        let num_classes = next_usize(&mut tokens)?;

        let mut classes = Vec::with_capacity(num_classes);
        for _ in 0..num_classes {
            classes.push(next_usize(&mut tokens)?);
        }

        let mut class_priors = HashMap::new();
        for &class in &classes {
            class_priors.insert(class, next_f64(&mut tokens)?);
        }

        let mut pixel_unshaded = HashMap::new();
        for &class in &classes {
            let mut grid = Vec::with_capacity(image_size);
            for _ in 0..image_size {
                let mut row = Vec::with_capacity(image_size);
                for _ in 0..image_size {
                    row.push(next_f64(&mut tokens)?);
                }
                grid.push(row);
            }
            pixel_unshaded.insert(class, grid);
        }

        Ok(TrainingModel {
            image_size,
            classes,
            class_counts: HashMap::new(),
            class_priors,
            pixel_unshaded,
            image_labels: Vec::new(),
            training_images: Vec::new(),
            smoothing: DEFAULT_SMOOTHING,
        })
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), BayesError> {
        let mut file = match File::create(path) {
            Ok(f) => f,
            Err(_) => return Err(BayesError::UnreadableSource(path.display().to_string())),
        };
        self.serialize(&mut file)
    }

    pub fn load_from_file(path: &Path) -> Result<TrainingModel, BayesError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return Err(BayesError::UnreadableSource(path.display().to_string())),
        };
        TrainingModel::deserialize(&mut BufReader::new(file))
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn class_count(&self, class: usize) -> Result<usize, BayesError> {
        match self.class_counts.get(&class) {
            Some(&count) => Ok(count),
            None => Err(BayesError::UnknownClass(class)),
        }
    }

    /// The training labels in image order.
    pub fn labels(&self) -> &[usize] {
        &self.image_labels
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }
}

impl ProbabilityModel for TrainingModel {
    fn image_size(&self) -> usize {
        self.image_size
    }

    fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn class_probability(&self, class: usize) -> Result<f64, BayesError> {
        match self.class_priors.get(&class) {
            Some(&prior) => Ok(prior),
            None => Err(BayesError::UnknownClass(class)),
        }
    }

    fn pixel_probability(
        &self,
        class: usize,
        shade: Shade,
        row: usize,
        col: usize,
    ) -> Result<f64, BayesError> {
        if row >= self.image_size || col >= self.image_size {
            return Err(BayesError::PixelOutOfBounds {
                row,
                col,
                size: self.image_size,
            });
        }
        let grid = self
            .pixel_unshaded
            .get(&class)
            .ok_or(BayesError::UnknownClass(class))?;
        let unshaded = grid[row][col];
        Ok(match shade {
            Shade::Unshaded => unshaded,
            Shade::Shaded => 1.0 - unshaded,
        })
    }
}

fn next_usize(tokens: &mut SplitWhitespace<'_>) -> Result<usize, BayesError> {
    let token = tokens
        .next()
        .ok_or_else(|| BayesError::MalformedData(String::from("model data ended early")))?;
    token
        .parse::<usize>()
        .map_err(|_| BayesError::MalformedData(format!("expected an integer, got: {}", token)))
}

fn next_f64(tokens: &mut SplitWhitespace<'_>) -> Result<f64, BayesError> {
    let token = tokens
        .next()
        .ok_or_else(|| BayesError::MalformedData(String::from("model data ended early")))?;
    token
        .parse::<f64>()
        .map_err(|_| BayesError::MalformedData(format!("expected a probability, got: {}", token)))
}
