//! Adaptive barycentric triangle sampling.
//!
//! The step size is tuned per triangle so adjacent samples along any edge sit
//! at most one grid spacing apart, then the whole surface is walked on a
//! regular barycentric grid with that step. All of it runs on exact rationals
//! so the same triangle always yields the same samples, in the same order.

use crate::math::{Fraction, Point3, Uv};

/// Interval width at which the per-edge step search stops.
fn search_threshold() -> Fraction {
    Fraction::new(1, 100_000)
}

/// Euclidean distance between two exact points.
fn distance(a: &Point3, b: &Point3) -> Fraction {
    let dx = &a[0] - &b[0];
    let dy = &a[1] - &b[1];
    let dz = &a[2] - &b[2];
    (dx.magnitude_sq() + dy.magnitude_sq() + dz.magnitude_sq()).sqrt()
}

/// Point at barycentric parameter `t` along the edge `a -> b`.
fn edge_point(a: &Point3, b: &Point3, t: &Fraction) -> Point3 {
    std::array::from_fn(|i| &a[i] + (&b[i] - &a[i]) * t)
}

/// Binary-search the largest step for one edge such that two samples one
/// step apart stay within `spacing` of each other.
///
/// The search interval is [0, 1]; a candidate whose endpoint distance still
/// exceeds the spacing shrinks the upper bound, otherwise the lower bound
/// rises. The lower bound is returned (it never under-samples); when the
/// lower bound never left zero the upper bound stands in, which at worst
/// overshoots the spacing by the search threshold.
fn edge_step(a: &Point3, b: &Point3, spacing: &Fraction) -> Fraction {
    let threshold = search_threshold();
    let half = Fraction::new(1, 2);
    let mut lo = Fraction::zero();
    let mut hi = Fraction::one();

    while &hi - &lo > threshold {
        let mid = (&lo + &hi) * &half;
        let moved = edge_point(a, b, &mid);
        if distance(a, &moved) > *spacing {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    if lo.is_zero() { hi } else { lo }
}

/// Safe barycentric step for a whole triangle: the smallest of the three
/// per-edge results, so no edge ends up under-sampled.
pub fn triangle_step(positions: &[Point3; 3], spacing: &Fraction) -> Fraction {
    let [a, b, c] = positions;
    edge_step(c, b, spacing)
        .min(edge_step(a, c, spacing))
        .min(edge_step(b, a, spacing))
}

/// Iterator over the barycentric weights of a regular triangle grid.
///
/// λA walks 0..=1 by `step`; for each λA, λB walks 0..=(1 − λA); λC is the
/// remainder. The sequence depends only on the step, so two walks with the
/// same inputs are identical — sampling is restartable.
pub struct BaryGrid {
    step: Fraction,
    lambda_a: Fraction,
    lambda_b: Fraction,
    done: bool,
}

impl BaryGrid {
    /// # Panics
    /// Panics on a zero step; [`edge_step`] never produces one.
    pub fn new(step: Fraction) -> Self {
        assert!(!step.is_zero(), "barycentric step must be positive");
        Self {
            step,
            lambda_a: Fraction::zero(),
            lambda_b: Fraction::zero(),
            done: false,
        }
    }
}

impl Iterator for BaryGrid {
    type Item = (Fraction, Fraction, Fraction);

    fn next(&mut self) -> Option<Self::Item> {
        let one = Fraction::one();
        loop {
            if self.done {
                return None;
            }
            if self.lambda_a > one {
                self.done = true;
                return None;
            }
            if &self.lambda_a + &self.lambda_b > one {
                self.lambda_a = &self.lambda_a + &self.step;
                self.lambda_b = Fraction::zero();
                continue;
            }
            let lambda_c = &one - &self.lambda_a - &self.lambda_b;
            let item = (self.lambda_a.clone(), self.lambda_b.clone(), lambda_c);
            self.lambda_b = &self.lambda_b + &self.step;
            return Some(item);
        }
    }
}

/// Weighted combination of three positions by barycentric weights.
pub fn weigh3(
    weights: &(Fraction, Fraction, Fraction),
    a: &Point3,
    b: &Point3,
    c: &Point3,
) -> Point3 {
    std::array::from_fn(|i| {
        &a[i] * &weights.0 + &b[i] * &weights.1 + &c[i] * &weights.2
    })
}

/// Weighted combination of three UV pairs by barycentric weights.
pub fn weigh2(weights: &(Fraction, Fraction, Fraction), a: &Uv, b: &Uv, c: &Uv) -> Uv {
    std::array::from_fn(|i| {
        &a[i] * &weights.0 + &b[i] * &weights.1 + &c[i] * &weights.2
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64, z: f64) -> Point3 {
        [
            Fraction::from_f64(x),
            Fraction::from_f64(y),
            Fraction::from_f64(z),
        ]
    }

    #[test]
    fn test_edge_step_respects_spacing() {
        let a = point(0.0, 0.0, 0.0);
        let b = point(10.0, 0.0, 0.0);
        let spacing = Fraction::one();

        let step = edge_step(&a, &b, &spacing);
        assert!(!step.is_zero());

        // Adjacent samples one step apart must stay within spacing plus the
        // search tolerance.
        let gap = distance(&a, &edge_point(&a, &b, &step)).to_f64();
        assert!(gap <= 1.0 + 1e-4, "gap {gap} exceeds spacing");
        // And the step is not needlessly conservative.
        assert!(gap > 0.5, "gap {gap} oversamples the edge");
    }

    #[test]
    fn test_degenerate_edge_steps_to_one() {
        let a = point(1.0, 2.0, 3.0);
        let step = edge_step(&a, &a.clone(), &Fraction::one());
        assert!(step.to_f64() > 0.99);
    }

    #[test]
    fn test_triangle_step_takes_smallest_edge() {
        // The long edge (length 20) forces a smaller step than the short ones.
        let a = point(0.0, 0.0, 0.0);
        let b = point(20.0, 0.0, 0.0);
        let c = point(10.0, 1.0, 0.0);
        let spacing = Fraction::one();

        let tri_step = triangle_step(&[a.clone(), b.clone(), c], &spacing);
        let long_edge_step = edge_step(&a, &b, &spacing);
        assert!(tri_step <= long_edge_step);
    }

    #[test]
    fn test_grid_is_deterministic_and_restartable() {
        let step = Fraction::new(1, 4);
        let first: Vec<_> = BaryGrid::new(step.clone()).collect();
        let second: Vec<_> = BaryGrid::new(step).collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_grid_weights_sum_to_one() {
        for (la, lb, lc) in BaryGrid::new(Fraction::new(1, 3)) {
            assert_eq!(la + lb + lc, Fraction::one());
        }
    }

    #[test]
    fn test_grid_covers_corners() {
        let cells: Vec<_> = BaryGrid::new(Fraction::new(1, 2)).collect();
        // Step 1/2 over the unit simplex: (0,0), (0,1/2), (0,1), (1/2,0),
        // (1/2,1/2), (1,0).
        assert_eq!(cells.len(), 6);
        assert_eq!(
            cells[0],
            (Fraction::zero(), Fraction::zero(), Fraction::one())
        );
        assert_eq!(
            cells[5],
            (Fraction::one(), Fraction::zero(), Fraction::zero())
        );
    }

    #[test]
    fn test_weigh_matches_vertices_at_corners() {
        let a = point(1.0, 0.0, 0.0);
        let b = point(0.0, 1.0, 0.0);
        let c = point(0.0, 0.0, 1.0);
        let w = (Fraction::one(), Fraction::zero(), Fraction::zero());
        assert_eq!(weigh3(&w, &a, &b, &c), a);
    }
}
