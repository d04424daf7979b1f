//! Derivative-free parameter search for model fitting.
//!
//! Both model classes estimate their parameters by minimizing an in-sample
//! sum of squares. A Nelder-Mead simplex handles this without gradients,
//! with box bounds keeping smoothing weights and AR/MA coefficients in
//! their valid ranges.

/// Options for the simplex search.
#[derive(Debug, Clone, Copy)]
pub struct SimplexOptions {
    /// Maximum iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the spread of objective values.
    pub tolerance: f64,
    /// Relative step used to build the initial simplex.
    pub step: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iter: 500,
            tolerance: 1e-8,
            step: 0.1,
        }
    }
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

fn clamp_to(point: &mut [f64], bounds: &[(f64, f64)]) {
    for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
        *x = x.clamp(lo, hi);
    }
}

/// Minimizes `objective` starting from `initial`, clamping every candidate
/// point to `bounds`. Returns the best point found.
///
/// The search is deterministic for a given starting point, which keeps
/// model fits reproducible.
///
/// # Examples
///
/// ```
/// use barge_dispatch::forecast::minimize;
///
/// let best = minimize(
///     |x| (x[0] - 0.7).powi(2),
///     &[0.2],
///     &[(0.0, 1.0)],
///     Default::default(),
/// );
/// assert!((best[0] - 0.7).abs() < 1e-3);
/// ```
pub fn minimize<F>(
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    options: SimplexOptions,
) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    assert_eq!(n, bounds.len(), "one bound pair per dimension");
    if n == 0 {
        return Vec::new();
    }

    let eval = |p: &[f64]| {
        let v = objective(p);
        if v.is_finite() {
            v
        } else {
            f64::MAX
        }
    };

    // Initial simplex: the starting point plus one perturbed vertex per axis.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    let mut start = initial.to_vec();
    clamp_to(&mut start, bounds);
    simplex.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        let delta = if vertex[i].abs() > 1e-10 {
            options.step * vertex[i].abs()
        } else {
            options.step
        };
        vertex[i] += delta;
        clamp_to(&mut vertex, bounds);
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    for _ in 0..options.max_iter {
        // Order vertices best-to-worst.
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        if (values[worst] - values[best]).abs() < options.tolerance {
            break;
        }

        // Centroid of all but the worst vertex.
        let mut centroid = vec![0.0; n];
        for &idx in order.iter().take(n) {
            for (c, x) in centroid.iter_mut().zip(&simplex[idx]) {
                *c += x / n as f64;
            }
        }

        let mut reflected: Vec<f64> = centroid
            .iter()
            .zip(&simplex[worst])
            .map(|(c, w)| c + REFLECT * (c - w))
            .collect();
        clamp_to(&mut reflected, bounds);
        let reflected_value = eval(&reflected);

        if reflected_value < values[best] {
            // Try expanding past the reflection.
            let mut expanded: Vec<f64> = centroid
                .iter()
                .zip(&reflected)
                .map(|(c, r)| c + EXPAND * (r - c))
                .collect();
            clamp_to(&mut expanded, bounds);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
        } else if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
        } else {
            let mut contracted: Vec<f64> = centroid
                .iter()
                .zip(&simplex[worst])
                .map(|(c, w)| c + CONTRACT * (w - c))
                .collect();
            clamp_to(&mut contracted, bounds);
            let contracted_value = eval(&contracted);
            if contracted_value < values[worst] {
                simplex[worst] = contracted;
                values[worst] = contracted_value;
            } else {
                // Shrink everything toward the best vertex.
                let anchor = simplex[best].clone();
                for idx in 0..=n {
                    if idx == best {
                        continue;
                    }
                    let mut shrunk: Vec<f64> = anchor
                        .iter()
                        .zip(&simplex[idx])
                        .map(|(b, x)| b + SHRINK * (x - b))
                        .collect();
                    clamp_to(&mut shrunk, bounds);
                    values[idx] = eval(&shrunk);
                    simplex[idx] = shrunk;
                }
            }
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    simplex.swap_remove(best)
}
