//! `UnitPacker`: the single-unit placement search (§4.4, §4.5).
//!
//! Maintains the committed placement list for one transport unit, finds a
//! valid position/orientation for a candidate item, and — in a safe packing
//! mode — consults the axle scorer to gate the choice.

use crate::axle::{compliance_report, compliance_score, compute_axle_loads, AxleGeometry, AxleModel};
use crate::config::PackingConfig;
use crate::geometry::{intersects, rests_on, weighted_center_xy, BoundingBox, Vec3};
use crate::model::{enumerate_orientations, ComplianceReport, Item, PackingMode, Placement, UnitSpec};
use crate::numerics::HighPrecision;

#[derive(Clone, Debug)]
pub struct UnitPacker {
    pub unit_spec: UnitSpec,
    dims: Vec3,
    max_weight: HighPrecision,
    axle_geometry: Option<AxleGeometry>,
    pub placements: Vec<Placement>,
    pub notices: Vec<String>,
}

impl UnitPacker {
    pub fn new(unit_spec: UnitSpec) -> Self {
        let (l, w, h) = unit_spec.dims();
        let axle_geometry = AxleGeometry::from_unit_spec(&unit_spec);
        UnitPacker {
            max_weight: HighPrecision::from_f64(unit_spec.max_weight()),
            dims: Vec3::from_f64(l, w, h),
            axle_geometry,
            unit_spec,
            placements: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn cargo_weight(&self) -> HighPrecision {
        self.placements.iter().map(|p| p.weight).sum()
    }

    pub fn is_vehicle(&self) -> bool {
        self.unit_spec.is_vehicle()
    }

    fn axle_model(&self) -> Option<AxleModel> {
        match &self.unit_spec {
            UnitSpec::Container { .. } => None,
            UnitSpec::Vehicle { .. } => Some(AxleModel::Simple3D),
            UnitSpec::Articulated { .. } => Some(AxleModel::Articulated3D),
        }
    }

    /// Maps a requested packing mode to the axle model that must gate (or
    /// report on) it, so the model used to admit a placement always matches
    /// the model `compliance()` later builds its report from. `Density`
    /// falls back to whatever model the unit kind implies (used only for the
    /// final `compliance()` diagnostics on a unit packed without gating).
    fn model_for_mode(&self, mode: PackingMode) -> Option<AxleModel> {
        self.axle_geometry.as_ref()?;
        Some(match mode {
            PackingMode::Safe2D => AxleModel::Beam2D,
            PackingMode::Safe3DSimple => AxleModel::Simple3D,
            PackingMode::Safe3DArticulated => AxleModel::Articulated3D,
            PackingMode::Density => self.axle_model()?,
        })
    }

    /// Cargo payload ceiling (I3): for vehicles this is GVW minus curb
    /// weight, not the raw GVW carried on `UnitSpec`.
    fn payload_capacity(&self) -> HighPrecision {
        match &self.axle_geometry {
            Some(geometry) => {
                let curb_sum: HighPrecision = geometry.curb_loads.iter().copied().sum();
                (self.max_weight - curb_sum).max(HighPrecision::ZERO)
            }
            None => self.max_weight,
        }
    }

    /// Attempts to place `item`. Returns true and commits on success.
    pub fn try_place(&mut self, item: &Item, mode: PackingMode, config: &PackingConfig, tolerance_percent: HighPrecision) -> bool {
        let epsilon = config.epsilon();
        let safe_model = if mode.is_safe() { self.model_for_mode(mode) } else { None };
        let payload_capacity = self.payload_capacity();
        for orientation in enumerate_orientations(item) {
            if orientation.x > self.dims.x + epsilon
                || orientation.y > self.dims.y + epsilon
                || orientation.z > self.dims.z + epsilon
            {
                continue;
            }
            if self.cargo_weight() + item.weight > payload_capacity + epsilon {
                continue;
            }

            let candidates = self.candidate_positions(orientation, config.grid_step());

            let mut best: Option<(Vec3, HighPrecision)> = None;
            for position in candidates {
                if !self.is_valid_candidate(position, orientation, item.weight, epsilon, config) {
                    continue;
                }
                let Some(model) = safe_model else {
                    self.commit(item, position, orientation);
                    return true;
                };
                let score = self.hypothetical_score(item, position, orientation, tolerance_percent, model);
                if score >= HighPrecision::fail_sentinel() {
                    continue;
                }
                match best {
                    Some((_, best_score)) if score >= best_score => {}
                    _ => best = Some((position, score)),
                }
            }
            if let Some((position, _)) = best {
                self.commit(item, position, orientation);
                return true;
            }
        }
        false
    }

    fn hypothetical_score(&self, item: &Item, position: Vec3, dims: Vec3, tolerance_percent: HighPrecision, model: AxleModel) -> HighPrecision {
        let Some(geometry) = &self.axle_geometry else {
            return HighPrecision::ZERO;
        };
        let mut hypothetical = self.placements.clone();
        hypothetical.push(Placement {
            item_name: item.name.clone(),
            color: item.color.clone(),
            weight: item.weight,
            position,
            dims,
            constraints: item.constraints.clone(),
        });
        let state = compute_axle_loads(model, geometry, &hypothetical, self.dims.y, None);
        compliance_score(&state, geometry, tolerance_percent, self.payload_capacity())
    }

    fn commit(&mut self, item: &Item, position: Vec3, dims: Vec3) {
        self.placements.push(Placement {
            item_name: item.name.clone(),
            color: item.color.clone(),
            weight: item.weight,
            position,
            dims,
            constraints: item.constraints.clone(),
        });
    }

    /// Generates the candidate position set for one orientation (§4.4a):
    /// a grid at `config.grid_step` plus extreme points derived from every
    /// committed placement, deduplicated and sorted (z, x, y) ascending.
    fn candidate_positions(&self, dims: Vec3, step: HighPrecision) -> Vec<Vec3> {
        let max_x = (self.dims.x - dims.x).max(HighPrecision::ZERO);
        let max_y = (self.dims.y - dims.y).max(HighPrecision::ZERO);
        let max_z = (self.dims.z - dims.z).max(HighPrecision::ZERO);

        let xs = axis_positions(max_x, step);
        let ys = axis_positions(max_y, step);
        let zs = axis_positions(max_z, step);

        let mut candidates: Vec<Vec3> = Vec::new();
        for &z in &zs {
            for &x in &xs {
                for &y in &ys {
                    candidates.push(Vec3::new(x, y, z));
                }
            }
        }

        for p in &self.placements {
            let bb = p.bounding_box();
            let extra = [
                Vec3::new(bb.max.x, p.position.y, p.position.z),
                Vec3::new(p.position.x, bb.max.y, p.position.z),
                Vec3::new(p.position.x, p.position.y, bb.max.z),
                Vec3::new(p.position.x, HighPrecision::ZERO, p.position.z),
                Vec3::new(HighPrecision::ZERO, p.position.y, p.position.z),
                Vec3::new(HighPrecision::ZERO, HighPrecision::ZERO, p.position.z),
            ];
            for point in extra {
                if point.x <= max_x && point.y <= max_y && point.z <= max_z {
                    candidates.push(point);
                }
            }
        }

        dedup_sort_positions(&mut candidates);
        candidates
    }

    fn is_valid_candidate(&self, position: Vec3, dims: Vec3, weight: HighPrecision, epsilon: HighPrecision, config: &PackingConfig) -> bool {
        if position.x < -epsilon
            || position.y < -epsilon
            || position.z < -epsilon
            || position.x + dims.x > self.dims.x + epsilon
            || position.y + dims.y > self.dims.y + epsilon
            || position.z + dims.z > self.dims.z + epsilon
        {
            return false;
        }

        let candidate_bb = BoundingBox::from_position_and_dims(position, dims);
        for p in &self.placements {
            if intersects(&candidate_bb, &p.bounding_box(), epsilon) {
                return false;
            }
        }

        if position.z > epsilon && !self.check_support_and_stacking(&candidate_bb, weight, config) {
            return false;
        }

        true
    }

    /// Walks every item whose top face the candidate rests on (I4) down to its
    /// floor-resting base, and accepts if at least one such chain keeps the
    /// base's stacking constraints satisfied (I5).
    fn check_support_and_stacking(&self, candidate_bb: &BoundingBox, candidate_weight: HighPrecision, config: &PackingConfig) -> bool {
        let height_eps = config.epsilon();
        let supporters: Vec<usize> = self
            .placements
            .iter()
            .enumerate()
            .filter(|(_, p)| rests_on(candidate_bb, &p.bounding_box(), height_eps))
            .map(|(i, _)| i)
            .collect();

        if supporters.is_empty() {
            return false;
        }

        for &supporter_idx in &supporters {
            let (base_idx, above) = self.find_stack_base(supporter_idx, height_eps);
            let base = &self.placements[base_idx];

            let stack_height = candidate_bb.top_z() - base.position.z;
            // +1 for the floor-resting base itself, +1 for the candidate: `above`
            // only counts items strictly between the base and the candidate.
            let current_layers = above.len() as u32 + 2;
            let stack_load: HighPrecision =
                above.iter().map(|&i| self.placements[i].weight).sum::<HighPrecision>() + candidate_weight;

            let height_ok = base.constraints.max_stack_height.map(|limit| stack_height <= limit + height_eps).unwrap_or(true);
            let layers_ok = base.constraints.max_stack_layers.map(|limit| current_layers <= limit).unwrap_or(true);
            let load_ok = base.constraints.max_stack_load.map(|limit| stack_load <= limit + height_eps).unwrap_or(true);

            if height_ok && layers_ok && load_ok {
                return true;
            }
        }
        false
    }

    /// Walks down from `start` to the floor-resting base, returning
    /// `(base_index, items_above_base_excluding_candidate)`.
    fn find_stack_base(&self, start: usize, height_eps: HighPrecision) -> (usize, Vec<usize>) {
        let mut chain = vec![start];
        let mut current = start;
        loop {
            if self.placements[current].position.z.approx_eq(HighPrecision::ZERO, height_eps) {
                break;
            }
            let current_bb = self.placements[current].bounding_box();
            let next = self
                .placements
                .iter()
                .enumerate()
                .find(|(i, p)| *i != current && rests_on(&current_bb, &p.bounding_box(), height_eps));
            match next {
                Some((i, _)) => {
                    current = i;
                    chain.push(i);
                }
                None => break,
            }
        }
        let base = current;
        chain.retain(|&i| i != base);
        (base, chain)
    }

    /// Post-pack transverse re-centering (§4.7). Returns a notice string if
    /// the shift was rejected because it would push a placement out of bounds.
    pub fn transverse_balance(&mut self, config: &PackingConfig) -> Option<String> {
        if self.placements.is_empty() {
            return None;
        }
        let points = self.placements.iter().map(|p| {
            let c = p.centroid();
            (c.x, c.y, p.weight)
        });
        let Some((_, cg_y)) = weighted_center_xy(points) else {
            return None;
        };
        let shift = self.dims.y / HighPrecision::from_f64(2.0) - cg_y;
        if shift.abs() <= config.transverse_balance_epsilon() {
            return None;
        }

        let all_within_bounds = self.placements.iter().all(|p| {
            let new_y = p.position.y + shift;
            new_y >= HighPrecision::ZERO && new_y + p.dims.y <= self.dims.y
        });

        if all_within_bounds {
            for p in &mut self.placements {
                p.position.y = p.position.y + shift;
            }
            None
        } else {
            Some("TransverseShiftRejected: cargo CG could not be recentered without pushing a placement out of bounds".to_string())
        }
    }

    pub fn compliance(&self, mode: PackingMode, tolerance_percent: HighPrecision) -> Option<ComplianceReport> {
        let geometry = self.axle_geometry.as_ref()?;
        let model = self.model_for_mode(mode)?;
        let state = compute_axle_loads(model, geometry, &self.placements, self.dims.y, None);
        Some(compliance_report(&state, geometry, tolerance_percent))
    }
}

fn axis_positions(max_extent: HighPrecision, step: HighPrecision) -> Vec<HighPrecision> {
    if max_extent <= HighPrecision::ZERO {
        return vec![HighPrecision::ZERO];
    }
    let mut positions = Vec::new();
    let mut current = HighPrecision::ZERO;
    while current < max_extent {
        positions.push(current);
        current = current + step;
    }
    positions.push(max_extent);
    positions
}

fn dedup_sort_positions(positions: &mut Vec<Vec3>) {
    positions.sort_by(|a, b| {
        a.z.partial_cmp(&b.z)
            .unwrap()
            .then(a.x.partial_cmp(&b.x).unwrap())
            .then(a.y.partial_cmp(&b.y).unwrap())
    });
    positions.dedup_by(|a, b| a.x == b.x && a.y == b.y && a.z == b.z);
}
