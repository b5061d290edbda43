//! Nelder-Mead simplex minimization for small unconstrained problems.
//!
//! Used to estimate exponential-smoothing parameters. Callers map bounded
//! parameters into unconstrained space themselves (e.g. through a cosine map).

/// Tuning knobs for the simplex search.
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadOptions {
    /// Offset applied to each coordinate of the start point to build the
    /// initial simplex.
    pub initial_step: f64,
    /// Iteration budget per dimension.
    pub max_iterations_per_dim: usize,
    /// Spread of objective values, relative to `1 + |best|`, at which the
    /// search may stop.
    pub f_tolerance: f64,
    /// Largest coordinate distance from the best vertex at which the search
    /// may stop.
    pub x_tolerance: f64,
    /// Absolute spread of objective values below which the vertices are
    /// treated as equivalent, wherever they sit.
    pub f_floor: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            initial_step: 0.5,
            max_iterations_per_dim: 1000,
            f_tolerance: 1e-10,
            x_tolerance: 1e-7,
            f_floor: 1e-20,
        }
    }
}

/// Outcome of a minimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub x: Vec<f64>,
    pub fx: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimize `f` starting from `x0`.
///
/// Non-finite objective values are treated as `+inf`, so the simplex moves
/// away from regions where the objective is undefined.
pub fn minimize<F>(f: F, x0: &[f64], options: &NelderMeadOptions) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let dim = x0.len();
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    if dim == 0 {
        return NelderMeadResult {
            x: Vec::new(),
            fx: eval(x0),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(x0.to_vec());
    for i in 0..dim {
        let mut vertex = x0.to_vec();
        vertex[i] += options.initial_step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v.as_slice())).collect();

    let max_iterations = options.max_iterations_per_dim * dim;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        order_simplex(&mut simplex, &mut values);

        let best = values[0];
        let worst = values[dim];
        let f_spread = (worst - best).abs();
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);

        let flat = f_spread <= options.f_floor;
        if best.is_finite()
            && (flat
                || (x_spread <= options.x_tolerance
                    && f_spread <= options.f_tolerance * (best.abs() + 1.0)))
        {
            converged = true;
            break;
        }

        iterations += 1;

        let centroid: Vec<f64> = (0..dim)
            .map(|j| simplex[..dim].iter().map(|v| v[j]).sum::<f64>() / dim as f64)
            .collect();
        let along = |t: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(&simplex[dim])
                .map(|(c, w)| c + t * (w - c))
                .collect()
        };

        let reflected = along(-1.0);
        let f_reflected = eval(reflected.as_slice());

        if f_reflected < values[0] {
            let expanded = along(-2.0);
            let f_expanded = eval(expanded.as_slice());
            if f_expanded < f_reflected {
                simplex[dim] = expanded;
                values[dim] = f_expanded;
            } else {
                simplex[dim] = reflected;
                values[dim] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = f_reflected;
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < values[dim] {
            let c = along(-0.5);
            let fc = eval(c.as_slice());
            (c, fc)
        } else {
            let c = along(0.5);
            let fc = eval(c.as_slice());
            (c, fc)
        };

        if f_contracted < values[dim].min(f_reflected) {
            simplex[dim] = contracted;
            values[dim] = f_contracted;
            continue;
        }

        // Shrink towards the best vertex
        let best_vertex = simplex[0].clone();
        for i in 1..=dim {
            for (x, b) in simplex[i].iter_mut().zip(&best_vertex) {
                *x = b + 0.5 * (*x - b);
            }
            values[i] = eval(simplex[i].as_slice());
        }
    }

    order_simplex(&mut simplex, &mut values);
    NelderMeadResult {
        x: simplex.swap_remove(0),
        fx: values[0],
        iterations,
        converged,
    }
}

fn order_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}
