use serde::{Deserialize, Serialize};

use crate::error::{Result, SeedModelError};

/// A square covariance matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    dimension: usize,
    values: Vec<f64>,
}

impl CovarianceMatrix {
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            values: vec![0.0; dimension * dimension],
        }
    }

    pub fn from_row_major(dimension: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != dimension * dimension {
            return Err(SeedModelError::Reconstruct {
                expected: dimension * dimension,
                actual: values.len(),
            });
        }
        Ok(Self { dimension, values })
    }

    /// Sample covariance (n - 1 denominator) of equally long columns.
    ///
    /// Fewer than two observations give the zero matrix.
    pub fn sample(columns: &[Vec<f64>]) -> Self {
        let dimension = columns.len();
        let n = columns.first().map(Vec::len).unwrap_or(0);
        let mut matrix = Self::zeros(dimension);
        if n < 2 {
            return matrix;
        }

        let means: Vec<f64> = columns
            .iter()
            .map(|c| c.iter().sum::<f64>() / n as f64)
            .collect();
        for i in 0..dimension {
            for j in i..dimension {
                let cov = columns[i]
                    .iter()
                    .zip(&columns[j])
                    .map(|(a, b)| (a - means[i]) * (b - means[j]))
                    .sum::<f64>()
                    / (n - 1) as f64;
                matrix.values[i * dimension + j] = cov;
                matrix.values[j * dimension + i] = cov;
            }
        }
        matrix
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.dimension + col]
    }

    pub fn row_major(&self) -> &[f64] {
        &self.values
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        if self.dimension == 0 {
            return Vec::new();
        }
        self.values
            .chunks(self.dimension)
            .map(<[f64]>::to_vec)
            .collect()
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.dimension).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }
}
