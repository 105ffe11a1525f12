use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::BayesError;

/// Parses one non-negative integer per whitespace-separated token, in
/// image order. An empty source is an error, as is a token that is not a
/// non-negative integer.
pub fn read_labels<R: Read>(source: &mut R) -> Result<Vec<usize>, BayesError> {
    let mut text = String::new();
    source.read_to_string(&mut text)?;

    let mut labels = Vec::new();
    for token in text.split_whitespace() {
        let label = token.parse::<usize>().map_err(|_| {
            BayesError::MalformedData(format!("label is not a non-negative integer: {}", token))
        })?;
        labels.push(label);
    }

    if labels.is_empty() {
        return Err(BayesError::UnreadableSource(String::from(
            "label data is empty",
        )));
    }
    Ok(labels)
}

pub fn load_labels(path: &Path) -> Result<Vec<usize>, BayesError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Err(BayesError::UnreadableSource(path.display().to_string())),
    };
    read_labels(&mut BufReader::new(file))
}
