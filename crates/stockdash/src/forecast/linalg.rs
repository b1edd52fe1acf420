//! Small dense solvers used by the forecast backends

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{DashError, Result};

/// Solve `(XᵀX + diag(penalty)) β = Xᵀy` by Cholesky factorisation
pub fn ridge_solve(x: &Array2<f64>, y: &Array1<f64>, penalty: &[f64]) -> Result<Array1<f64>> {
    let p = x.ncols();
    if penalty.len() != p {
        return Err(DashError::ModelFit(format!(
            "penalty has {} entries for {} columns",
            penalty.len(),
            p
        )));
    }

    let mut gram = x.t().dot(x);
    for (i, &lambda) in penalty.iter().enumerate() {
        gram[[i, i]] += lambda;
    }
    let rhs = x.t().dot(y);

    cholesky_solve(&gram, &rhs)
}

/// Solve `A x = b` for symmetric positive definite `A`
pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return Err(DashError::ModelFit(
                        "design matrix is singular; not enough distinct observations".to_string(),
                    ));
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // Forward substitution: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }

    // Back substitution: Lᵀ x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    Ok(x)
}

/// Root mean squared residual with a degrees-of-freedom correction
pub fn residual_sd(actual: ArrayView1<f64>, fitted: ArrayView1<f64>, params: usize) -> f64 {
    let n = actual.len();
    if n == 0 {
        return 0.0;
    }
    let sse: f64 = actual
        .iter()
        .zip(fitted.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    let dof = if n > params { n - params } else { n };
    (sse / dof as f64).sqrt()
}

/// Two-sided standard normal quantile for a central interval of `width`.
///
/// Uses Acklam's rational approximation of the inverse normal CDF.
pub fn interval_z(width: f64) -> f64 {
    let p = 0.5 + width.clamp(0.0, 0.999_999) / 2.0;
    inverse_normal_cdf(p)
}

fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -inverse_normal_cdf(1.0 - p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 5.0];
        let x = cholesky_solve(&a, &b).unwrap();
        assert!((x[0] - -0.5).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_matrix_is_model_fit_error() {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let b = array![1.0, 1.0];
        assert!(matches!(cholesky_solve(&a, &b), Err(DashError::ModelFit(_))));
    }

    #[test]
    fn test_ridge_recovers_line() {
        // y = 1 + 2t
        let x = array![[1.0, 0.0], [1.0, 0.5], [1.0, 1.0]];
        let y = array![1.0, 2.0, 3.0];
        let beta = ridge_solve(&x, &y, &[1e-10, 1e-10]).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-6);
        assert!((beta[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_interval_z() {
        assert!((interval_z(0.8) - 1.281_551_6).abs() < 1e-4);
        assert!((interval_z(0.95) - 1.959_964).abs() < 1e-4);
        assert!(interval_z(0.0).abs() < 1e-9);
    }

    #[test]
    fn test_residual_sd() {
        let actual = array![1.0, 2.0, 3.0];
        let fitted = array![1.0, 2.0, 3.0];
        assert_eq!(residual_sd(actual.view(), fitted.view(), 1), 0.0);
    }
}
