//! Closed-form least-squares fits over small (x, y) series
//!
//! Each solver returns `None` when the system is singular; callers decide
//! how to degrade.

/// Fitted curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fit {
    /// y = intercept + slope * x
    Linear { intercept: f64, slope: f64 },
    /// y = a * e^(b * x)
    Exponential { a: f64, b: f64 },
    /// y = c0 + c1 * x + c2 * x^2
    Quadratic { c0: f64, c1: f64, c2: f64 },
    /// y = constant
    Flat(f64),
}

impl Fit {
    pub fn evaluate(&self, x: f64) -> f64 {
        match *self {
            Fit::Linear { intercept, slope } => intercept + slope * x,
            Fit::Exponential { a, b } => a * (b * x).exp(),
            Fit::Quadratic { c0, c1, c2 } => c0 + c1 * x + c2 * x * x,
            Fit::Flat(value) => value,
        }
    }
}

const SINGULAR: f64 = 1e-12;

/// Ordinary least squares line
pub fn linear(points: &[(f64, f64)]) -> Option<Fit> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let (mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
    for &(x, y) in points {
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
    }

    let denominator = n * sxx - sx * sx;
    if denominator.abs() < SINGULAR {
        return None;
    }

    let slope = (n * sxy - sx * sy) / denominator;
    let intercept = (sy - slope * sx) / n;
    Some(Fit::Linear { intercept, slope })
}

/// Exponential fit via log-linearization.
///
/// The log-space residuals are weighted by y so large amounts are not
/// under-fitted. Points with y <= 0 have no logarithm and are skipped.
pub fn exponential(points: &[(f64, f64)]) -> Option<Fit> {
    let positive: Vec<(f64, f64)> = points.iter().copied().filter(|&(_, y)| y > 0.0).collect();
    if positive.len() < 2 {
        return None;
    }

    let (mut s_y, mut s_xy, mut s_xxy, mut s_ylny, mut s_xylny) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y) in &positive {
        let ln_y = y.ln();
        s_y += y;
        s_xy += x * y;
        s_xxy += x * x * y;
        s_ylny += y * ln_y;
        s_xylny += x * y * ln_y;
    }

    let denominator = s_y * s_xxy - s_xy * s_xy;
    if denominator.abs() < SINGULAR {
        return None;
    }

    let a = ((s_xxy * s_ylny - s_xy * s_xylny) / denominator).exp();
    let b = (s_y * s_xylny - s_xy * s_ylny) / denominator;
    Some(Fit::Exponential { a, b })
}

/// Least-squares parabola from the 3x3 normal equations
pub fn quadratic(points: &[(f64, f64)]) -> Option<Fit> {
    if points.len() < 3 {
        return None;
    }

    // power_sums[k] = sum(x^k) for k in 0..=4
    let mut power_sums = [0.0; 5];
    let mut rhs = [0.0; 3];
    for &(x, y) in points {
        let mut xk = 1.0;
        for (k, sum) in power_sums.iter_mut().enumerate() {
            *sum += xk;
            if k < 3 {
                rhs[k] += xk * y;
            }
            xk *= x;
        }
    }

    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = power_sums[i + j];
        }
    }

    let [c0, c1, c2] = solve3(matrix, rhs)?;
    Some(Fit::Quadratic { c0, c1, c2 })
}

/// Gaussian elimination with partial pivoting
fn solve3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < SINGULAR {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; 3];
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_linear_exact_line() {
        let points = [(0.0, 1.0), (1.0, 3.0), (2.0, 5.0), (3.0, 7.0)];
        let Some(Fit::Linear { intercept, slope }) = linear(&points) else {
            panic!("expected linear fit");
        };
        assert!(close(intercept, 1.0));
        assert!(close(slope, 2.0));
    }

    #[test]
    fn test_linear_needs_two_distinct_x() {
        assert!(linear(&[(0.0, 5.0)]).is_none());
        assert!(linear(&[(1.0, 5.0), (1.0, 6.0)]).is_none());
    }

    #[test]
    fn test_exponential_recovers_growth() {
        let points: Vec<(f64, f64)> = (0..5)
            .map(|i| (i as f64, 100.0 * (0.1 * i as f64).exp()))
            .collect();
        let fit = exponential(&points).unwrap();
        let Fit::Exponential { a, b } = fit else {
            panic!("expected exponential fit");
        };
        assert!(close(a, 100.0));
        assert!(close(b, 0.1));
    }

    #[test]
    fn test_exponential_constant_series_is_flat() {
        let points = [(0.0, 50.0), (1.0, 50.0), (2.0, 50.0)];
        let fit = exponential(&points).unwrap();
        assert!(close(fit.evaluate(10.0), 50.0));
    }

    #[test]
    fn test_exponential_skips_non_positive() {
        assert!(exponential(&[(0.0, 0.0), (1.0, 10.0)]).is_none());
    }

    #[test]
    fn test_quadratic_exact_parabola() {
        let points: Vec<(f64, f64)> = (0..5)
            .map(|i| {
                let x = i as f64;
                (x, 2.0 + 0.5 * x + 3.0 * x * x)
            })
            .collect();
        let Some(Fit::Quadratic { c0, c1, c2 }) = quadratic(&points) else {
            panic!("expected quadratic fit");
        };
        assert!(close(c0, 2.0));
        assert!(close(c1, 0.5));
        assert!(close(c2, 3.0));
    }

    #[test]
    fn test_quadratic_singular_with_two_points() {
        assert!(quadratic(&[(0.0, 1.0), (1.0, 2.0)]).is_none());
    }

    #[test]
    fn test_flat_evaluates_to_constant() {
        assert_eq!(Fit::Flat(42.0).evaluate(1e6), 42.0);
    }
}
