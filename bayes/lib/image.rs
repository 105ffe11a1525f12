use crate::error::BayesError;

/// Binary pixel state. A blank cell is unshaded, any marker is shaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    Unshaded,
    Shaded,
}

/// A square grid of binary cells, immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    size: usize,
    cells: Vec<Shade>,
}

impl Image {
    /// Builds an image from its rows. Every row must be as long as there
    /// are rows.
    pub fn from_rows(rows: Vec<Vec<Shade>>) -> Result<Image, BayesError> {
        let size = rows.len();
        for row in &rows {
            if row.len() != size {
                return Err(BayesError::ImageSizeMismatch {
                    expected: size,
                    actual: row.len(),
                });
            }
        }
        let cells = rows.into_iter().flatten().collect();
        Ok(Image { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shade(&self, row: usize, col: usize) -> Shade {
        self.cells[row * self.size + col]
    }
}
