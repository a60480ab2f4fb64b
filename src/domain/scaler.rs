//! Per-feature standardisation (zero mean, unit variance).
//!
//! [`StandardScaler::fit`] returns a [`FittedScaler`] value; every later
//! transform goes through that value, so test and future rows always use the
//! statistics of the rows it was fit on.

use ndarray::{Array1, Array2, ArrayView1, Axis};

pub struct StandardScaler;

#[derive(Debug, Clone, PartialEq)]
pub struct FittedScaler {
    pub means: Array1<f64>,
    /// Population standard deviations; zero-variance columns keep a scale of 1.
    pub scales: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> FittedScaler {
        let Some(means) = x.mean_axis(Axis(0)) else {
            return FittedScaler {
                means: Array1::zeros(x.ncols()),
                scales: Array1::ones(x.ncols()),
            };
        };
        let scales = x
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > 0.0 { std } else { 1.0 });

        FittedScaler { means, scales }
    }
}

impl FittedScaler {
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        (&row - &self.means) / &self.scales
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.means) / &self.scales
    }
}
