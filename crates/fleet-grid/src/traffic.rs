//! Static per-cell traffic weights.
//!
//! The field is seeded once per session: a low uniform random baseline on
//! every cell, plus a radial boost that peaks on each depot and fades
//! linearly to zero at `depot_radius`.  Overlapping boosts take the maximum,
//! not the sum.

use fleet_core::{GridBounds, GridConfig, GridPos, RandomSource};

#[derive(Clone, Debug)]
pub struct TrafficField {
    bounds:  GridBounds,
    weights: Vec<f32>,
}

impl TrafficField {
    /// Same weight on every cell.  Used by tests and flat scenarios.
    pub fn uniform(bounds: GridBounds, weight: f32) -> Self {
        Self { bounds, weights: vec![weight; bounds.cell_count()] }
    }

    pub fn seeded(
        cfg: &GridConfig,
        depots: impl IntoIterator<Item = GridPos>,
        rng: &mut impl RandomSource,
    ) -> Self {
        let bounds = cfg.bounds();
        let mut weights: Vec<f32> = (0..bounds.cell_count())
            .map(|_| rng.unit() as f32 * cfg.traffic_baseline)
            .collect();

        let radius = cfg.depot_radius.max(f32::EPSILON);
        for depot in depots {
            for (idx, w) in weights.iter_mut().enumerate() {
                let d = bounds.pos_at(idx).euclidean(depot);
                if d < radius {
                    let boost = cfg.depot_boost * (1.0 - d / radius);
                    *w = w.max(boost);
                }
            }
        }
        Self { bounds, weights }
    }

    #[inline]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Weight of `p`, or 0 outside the map.
    #[inline]
    pub fn weight(&self, p: GridPos) -> f32 {
        self.bounds.index(p).map_or(0.0, |i| self.weights[i])
    }

    pub fn set(&mut self, p: GridPos, weight: f32) {
        if let Some(i) = self.bounds.index(p) {
            self.weights[i] = weight.max(0.0);
        }
    }

    pub fn mean(&self) -> f32 {
        if self.weights.is_empty() {
            return 0.0;
        }
        self.weights.iter().sum::<f32>() / self.weights.len() as f32
    }
}
