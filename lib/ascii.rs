use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;

use bayes::error::BayesError;
use bayes::image::{Image, Shade};

/// Reads square ascii rasters from a stream of text lines. A blank cell
/// is unshaded, any other character is shaded. Images are square, so an
/// image is complete once the accumulated row count equals the current
/// row's length.
pub fn read_images<R: BufRead>(source: R) -> Result<Vec<Image>, BayesError> {
    let mut images = Vec::new();
    let mut rows: Vec<Vec<Shade>> = Vec::new();

    for line in source.lines() {
        let line = line?;
        let cells: Vec<Shade> = line
            .chars()
            .map(|cell| {
                if cell == ' ' {
                    Shade::Unshaded
                } else {
                    Shade::Shaded
                }
            })
            .collect();
        let width = cells.len();
        rows.push(cells);

        if rows.len() == width {
            images.push(Image::from_rows(mem::take(&mut rows))?);
        }
    }

    if images.is_empty() {
        return Err(BayesError::UnreadableSource(String::from(
            "image data is empty",
        )));
    }
    Ok(images)
}

pub fn load_images(path: &Path) -> Result<Vec<Image>, BayesError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Err(BayesError::UnreadableSource(path.display().to_string())),
    };
    read_images(BufReader::new(file))
}

#[cfg(test)]
mod ascii_tests {
    use super::*;
    use std::io::Cursor;

    const THREE_IMAGES: &str = "###\n# #\n###\n## \n # \n###\n # \n # \n # \n";

    #[test]
    fn test_images_split_on_the_square_boundary() {
        let images = read_images(Cursor::new(THREE_IMAGES)).unwrap();
        assert_eq!(images.len(), 3);
        for image in &images {
            assert_eq!(image.size(), 3);
        }
    }

    #[test]
    fn test_cells_map_blank_to_unshaded() {
        let images = read_images(Cursor::new(THREE_IMAGES)).unwrap();

        // First image is a bordered square.
        for row in 0..3 {
            for col in 0..3 {
                let expected = if row == 1 && col == 1 {
                    Shade::Unshaded
                } else {
                    Shade::Shaded
                };
                assert_eq!(images[0].shade(row, col), expected);
            }
        }

        // Third image is a vertical bar down the middle column.
        for row in 0..3 {
            for col in 0..3 {
                let expected = if col == 1 {
                    Shade::Shaded
                } else {
                    Shade::Unshaded
                };
                assert_eq!(images[2].shade(row, col), expected);
            }
        }
    }

    #[test]
    fn test_row_length_decides_each_boundary() {
        let images = read_images(Cursor::new("##\n##\n###\n# #\n###\n")).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].size(), 2);
        assert_eq!(images[1].size(), 3);
    }

    #[test]
    fn test_empty_source_is_an_error() {
        assert!(matches!(
            read_images(Cursor::new("")),
            Err(BayesError::UnreadableSource(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            load_images(Path::new("fes/dw.txt")),
            Err(BayesError::UnreadableSource(_))
        ));
    }
}
