//! Dense row-major matrix with the handful of products backprop needs.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wrap row-major data, checking its length.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| IntentError::other(format!("matrix shape {rows}x{cols} overflows")))?;
        if data.len() != len {
            return Err(IntentError::other(format!(
                "matrix data has {} elements, expected {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Matrix { rows, cols, data }
    }

    /// Uniform weights in `[-range, range)`, never exactly `-range`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, range: f64, rng: &mut R) -> Self {
        let data = (0..rows * cols)
            .map(|_| loop {
                let w = rng.random_range(-range..range);
                if w != -range {
                    break w;
                }
            })
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// `self · other`. Zero entries of `self` are skipped, which matters for
    /// sparse bag-of-words inputs.
    pub fn dot(&self, other: &Matrix) -> Matrix {
        debug_assert_eq!(self.cols, other.rows);
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            let out_row = &mut out.data[i * other.cols..(i + 1) * other.cols];
            for (k, &a) in self.row(i).iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                for (o, &b) in out_row.iter_mut().zip(other.row(k)) {
                    *o += a * b;
                }
            }
        }
        out
    }

    /// `selfᵀ · other`.
    pub fn t_dot(&self, other: &Matrix) -> Matrix {
        debug_assert_eq!(self.rows, other.rows);
        let mut out = Matrix::zeros(self.cols, other.cols);
        for k in 0..self.rows {
            let rhs = other.row(k);
            for (i, &a) in self.row(k).iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                let out_row = &mut out.data[i * other.cols..(i + 1) * other.cols];
                for (o, &b) in out_row.iter_mut().zip(rhs) {
                    *o += a * b;
                }
            }
        }
        out
    }

    /// `self · otherᵀ`.
    pub fn dot_t(&self, other: &Matrix) -> Matrix {
        debug_assert_eq!(self.cols, other.cols);
        let mut out = Matrix::zeros(self.rows, other.rows);
        for i in 0..self.rows {
            let lhs = self.row(i);
            for j in 0..other.rows {
                out.data[i * other.rows + j] =
                    lhs.iter().zip(other.row(j)).map(|(a, b)| a * b).sum();
            }
        }
        out
    }

    /// Row vector times matrix.
    pub fn vec_dot(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.rows);
        let mut out = vec![0.0; self.cols];
        for (k, &a) in input.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (o, &b) in out.iter_mut().zip(self.row(k)) {
                *o += a * b;
            }
        }
        out
    }

    pub fn map(mut self, f: impl Fn(f64) -> f64) -> Matrix {
        for v in &mut self.data {
            *v = f(*v);
        }
        self
    }

    /// Element-wise combination of two equally shaped matrices.
    pub fn zip_map(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Matrix {
        debug_assert_eq!(self.shape(), other.shape());
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// `self += other * scale`.
    pub fn add_scaled(&mut self, other: &Matrix, scale: f64) {
        debug_assert_eq!(self.shape(), other.shape());
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b * scale;
        }
    }

    pub fn mean_abs(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|v| v.abs()).sum::<f64>() / self.data.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn m(rows: usize, cols: usize, data: &[f64]) -> Matrix {
        Matrix::from_vec(rows, cols, data.to_vec()).unwrap()
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Matrix::from_vec(2, 2, vec![1.0; 3]).is_err());
        assert_eq!(Matrix::from_vec(2, 3, vec![0.0; 6]).unwrap().shape(), (2, 3));
        assert!(Matrix::from_vec(usize::MAX, 2, Vec::new()).is_err());
        assert_eq!(Matrix::from_vec(0, usize::MAX, Vec::new()).unwrap().shape(), (0, usize::MAX));
    }

    #[test]
    fn test_products() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = m(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);

        assert_eq!(a.dot(&b), m(2, 2, &[58.0, 64.0, 139.0, 154.0]));

        // aᵀ·a
        let ata = a.t_dot(&a);
        assert_eq!(ata.shape(), (3, 3));
        assert_eq!(ata.get(0, 0), 17.0);
        assert_eq!(ata.get(2, 1), 3.0 * 2.0 + 6.0 * 5.0);

        // a·aᵀ
        let aat = a.dot_t(&a);
        assert_eq!(aat, m(2, 2, &[14.0, 32.0, 32.0, 77.0]));

        assert_eq!(b.vec_dot(&[1.0, 0.0, 1.0]), vec![18.0, 20.0]);
    }

    #[test]
    fn test_elementwise() {
        let a = m(1, 3, &[1.0, -2.0, 3.0]);
        let b = m(1, 3, &[1.0, 1.0, 1.0]);

        assert_eq!(a.zip_map(&b, |x, y| x - y).as_slice(), &[0.0, -3.0, 2.0]);
        assert_eq!(a.mean_abs(), 2.0);

        let mut c = a.clone();
        c.add_scaled(&b, 0.5);
        assert_eq!(c.as_slice(), &[1.5, -1.5, 3.5]);

        assert_eq!(a.map(|x| x * 2.0).as_slice(), &[2.0, -4.0, 6.0]);
    }

    #[test]
    fn test_random_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let w = Matrix::random(20, 10, 1.0, &mut rng);
        assert!(w.as_slice().iter().all(|v| (-1.0..1.0).contains(v) && *v != -1.0));

        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(Matrix::random(20, 10, 1.0, &mut rng), w);
    }
}
