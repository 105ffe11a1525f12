use std::{error::Error, fmt, io};

#[derive(Debug)]
pub enum BayesError {
    UnreadableSource(String),
    MalformedData(String),
    NotReady(&'static str),
    DatasetSizeMismatch { images: usize, labels: usize },
    LabelCountMismatch { expected: usize, images: usize },
    UnknownClass(usize),
    PixelOutOfBounds { row: usize, col: usize, size: usize },
    ImageSizeMismatch { expected: usize, actual: usize },
    Io(io::Error),
}

impl Error for BayesError {}

impl fmt::Display for BayesError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BayesError::UnreadableSource(source) => {
                write!(f, "source does not exist or is blank: {}", source)
            }
            BayesError::MalformedData(reason) => write!(f, "malformed data: {}", reason),
            BayesError::NotReady(what) => write!(f, "{}", what),
            BayesError::DatasetSizeMismatch { images, labels } => write!(
                f,
                "dataset size mismatch: {} images but {} labels",
                images, labels
            ),
            BayesError::LabelCountMismatch { expected, images } => {
                write!(f, "have {} expected labels for {} images", expected, images)
            }
            BayesError::UnknownClass(class) => write!(f, "unknown class: {}", class),
            BayesError::PixelOutOfBounds { row, col, size } => write!(
                f,
                "pixel ({}, {}) is outside a {}x{} image",
                row, col, size, size
            ),
            BayesError::ImageSizeMismatch { expected, actual } => write!(
                f,
                "expected images with side length {} but got {}",
                expected, actual
            ),
            BayesError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl From<io::Error> for BayesError {
    fn from(err: io::Error) -> Self {
        BayesError::Io(err)
    }
}
