//! Ordinary least squares with intercept.
//!
//! Solves the normal equations (X'X) β = X'y with a tiny diagonal jitter,
//! first by Cholesky decomposition and, when the matrix is not positive
//! definite, by Gaussian elimination with partial pivoting.

use ndarray::{Array1, Array2, ArrayView1, Axis, concatenate, s};

const JITTER: f64 = 1e-10;
const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    pub intercept: f64,
    pub coefficients: Array1<f64>,
}

impl LinearRegression {
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Self {
        let ones = Array2::<f64>::ones((x.nrows(), 1));
        let x_design = match concatenate(Axis(1), &[ones.view(), x.view()]) {
            Ok(design) => design,
            // Row counts always agree; an empty design still yields a zero model.
            Err(_) => return Self::zero(x.ncols()),
        };

        let xt = x_design.t();
        let mut xtx = xt.dot(&x_design);
        let xty = xt.dot(y);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += JITTER;
        }

        let beta = cholesky_solve(&xtx, &xty).unwrap_or_else(|| gaussian_solve(xtx, xty));

        LinearRegression {
            intercept: beta[0],
            coefficients: beta.slice(s![1..]).to_owned(),
        }
    }

    fn zero(n_features: usize) -> Self {
        LinearRegression {
            intercept: 0.0,
            coefficients: Array1::zeros(n_features),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.coefficients) + self.intercept
    }

    pub fn predict_one(&self, features: ArrayView1<f64>) -> f64 {
        features.dot(&self.coefficients) + self.intercept
    }
}

fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Near-zero pivots leave their coefficient at zero.
fn gaussian_solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let n = a.nrows();
    let mut pivot_rows: Vec<Option<usize>> = vec![None; n];
    let mut row = 0;

    for col in 0..n {
        if row >= n {
            break;
        }
        let best = (row..n)
            .max_by(|&p, &q| a[[p, col]].abs().total_cmp(&a[[q, col]].abs()))
            .unwrap_or(row);
        if a[[best, col]].abs() < PIVOT_EPSILON {
            continue;
        }
        if best != row {
            for c in 0..n {
                a.swap([row, c], [best, c]);
            }
            b.swap(row, best);
        }

        let pivot = a.row(row).to_owned();
        for r in 0..n {
            if r == row {
                continue;
            }
            let factor = a[[r, col]] / pivot[col];
            if factor != 0.0 {
                let mut target = a.row_mut(r);
                target.scaled_add(-factor, &pivot);
                b[r] -= factor * b[row];
            }
        }
        pivot_rows[col] = Some(row);
        row += 1;
    }

    pivot_rows
        .iter()
        .enumerate()
        .map(|(col, pivot)| pivot.map_or(0.0, |r| b[r] / a[[r, col]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array, array};

    #[test]
    fn recovers_exact_linear_relation() {
        let x = Array2::from_shape_fn((20, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                (i * i) as f64 % 7.0
            }
        });
        let y: Array1<f64> = x
            .outer_iter()
            .map(|r| 3.0 + 2.0 * r[0] - 0.5 * r[1])
            .collect();

        let model = LinearRegression::fit(&x, &y);
        assert_relative_eq!(model.intercept, 3.0, epsilon = 1e-6);
        assert_relative_eq!(model.coefficients[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(model.coefficients[1], -0.5, epsilon = 1e-6);
        assert_relative_eq!(
            model.predict_one(array![10.0, 2.0].view()),
            22.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn batch_prediction_matches_rows() {
        let x = Array2::from_shape_fn((12, 1), |(i, _)| i as f64);
        let y = x.column(0).mapv(|v| 1.0 - v);
        let model = LinearRegression::fit(&x, &y);

        let batch = model.predict(&x);
        for (row, p) in x.outer_iter().zip(batch.iter()) {
            assert_relative_eq!(model.predict_one(row), *p, epsilon = 1e-12);
        }
    }

    #[test]
    fn no_features_predicts_mean() {
        let x = Array2::<f64>::zeros((3, 0));
        let model = LinearRegression::fit(&x, &array![1.0, 2.0, 6.0]);
        assert_relative_eq!(model.predict_one(Array1::zeros(0).view()), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn duplicated_column_still_fits() {
        let x = Array2::from_shape_fn((10, 2), |(i, _)| i as f64);
        let y = Array::from_iter((0..10).map(|i| 1.0 + 4.0 * i as f64));

        let model = LinearRegression::fit(&x, &y);
        for (row, target) in x.outer_iter().zip(y.iter()) {
            assert_relative_eq!(model.predict_one(row), *target, epsilon = 1e-3);
        }
    }

    #[test]
    fn gaussian_solve_handles_singular_system() {
        let x = gaussian_solve(array![[1.0, 1.0], [1.0, 1.0]], array![2.0, 2.0]);
        assert_relative_eq!(x[0], 2.0);
        assert_eq!(x[1], 0.0);
    }

    #[test]
    fn cholesky_rejects_indefinite_matrix() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        assert!(cholesky_solve(&a, &array![1.0, 1.0]).is_none());
    }
}
