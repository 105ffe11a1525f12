use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::prelude::*;
use std::io::Cursor;
use std::path::Path;

use bayes::error::BayesError;
use bayes::image::{Image, Shade};

/// Pixels at or above this intensity count as shaded when no threshold is
/// given.
pub const DEFAULT_SHADE_THRESHOLD: u8 = 128;

/// A decoded gzipped idx payload: the header's dimensions and the raw
/// bytes that follow them.
#[derive(Debug)]
pub struct MnistData {
    pub sizes: Vec<i32>,
    pub data: Vec<u8>,
}

impl MnistData {
    pub fn new<R: Read>(source: R) -> Result<MnistData, BayesError> {
        let mut contents: Vec<u8> = Vec::new();
        let mut gz = GzDecoder::new(source);
        gz.read_to_end(&mut contents)?;
        let mut r = Cursor::new(&contents);

        let magic_number = r.read_i32::<BigEndian>()?;

        let mut sizes: Vec<i32> = Vec::new();
        let mut data: Vec<u8> = Vec::new();

        match magic_number {
            2049 => {
                sizes.push(r.read_i32::<BigEndian>()?);
            }
            2051 => {
                sizes.push(r.read_i32::<BigEndian>()?);
                sizes.push(r.read_i32::<BigEndian>()?);
                sizes.push(r.read_i32::<BigEndian>()?);
            }
            _ => {
                return Err(BayesError::MalformedData(format!(
                    "unexpected idx magic number: {}",
                    magic_number
                )));
            }
        }

        r.read_to_end(&mut data)?;

        Ok(MnistData { sizes, data })
    }
}

/// Loads the `<prefix>-images`/`<prefix>-labels` pair from `folder`,
/// binarizing each pixel against `threshold` so the images hold only the
/// two shades the model works with.
pub fn load_mnist(
    folder: &Path,
    prefix: &str,
    threshold: u8,
) -> Result<(Vec<Image>, Vec<usize>), BayesError> {
    let label_data = MnistData::new(open(
        &folder.join(format!("{}-labels-idx1-ubyte.gz", prefix)),
    )?)?;
    let images_data = MnistData::new(open(
        &folder.join(format!("{}-images-idx3-ubyte.gz", prefix)),
    )?)?;

    if images_data.sizes.len() != 3 {
        return Err(BayesError::MalformedData(String::from(
            "image archive does not carry count, rows and columns",
        )));
    }
    let rows = images_data.sizes[1] as usize;
    let cols = images_data.sizes[2] as usize;
    if rows != cols {
        return Err(BayesError::ImageSizeMismatch {
            expected: rows,
            actual: cols,
        });
    }

    let image_shape = rows * cols;
    let mut images: Vec<Image> = Vec::new();
    for i in 0..images_data.sizes[0] as usize {
        let start = i * image_shape;
        let pixels = images_data
            .data
            .get(start..start + image_shape)
            .ok_or_else(|| {
                BayesError::MalformedData(String::from(
                    "image payload is shorter than its header promises",
                ))
            })?;
        let cells = pixels
            .chunks(cols)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&pixel| {
                        if pixel >= threshold {
                            Shade::Shaded
                        } else {
                            Shade::Unshaded
                        }
                    })
                    .collect()
            })
            .collect();
        images.push(Image::from_rows(cells)?);
    }

    let classifications: Vec<usize> = label_data.data.iter().map(|&label| label as usize).collect();
    Ok((images, classifications))
}

fn open(path: &Path) -> Result<File, BayesError> {
    match File::open(path) {
        Ok(f) => Ok(f),
        Err(_) => Err(BayesError::UnreadableSource(path.display().to_string())),
    }
}
