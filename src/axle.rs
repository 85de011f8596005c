//! Axle-load physics: 2D beam, 3D simple, and 3D articulated models, plus
//! the regulatory compliance scorer (§4.6).

use crate::geometry::weighted_center_xy;
use crate::model::{
    AxleReport, ComplianceReason, ComplianceReport, Placement, UnitSpec, WheelLoadReport, WheelType,
};
use crate::numerics::HighPrecision;
use crate::regulatory::{gvw_limit_for_axle_count, group_total_limit_kg};

/// Which physics model to run; density mode never constructs one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxleModel {
    Beam2D,
    Simple3D,
    Articulated3D,
}

#[derive(Clone, Debug)]
pub struct AxleGeometry {
    pub positions: Vec<HighPrecision>,
    pub curb_loads: Vec<HighPrecision>,
    pub wheel_type: WheelType,
    pub track_width_front: HighPrecision,
    pub track_width_rear: HighPrecision,
    pub cg_height_empty: HighPrecision,
    pub articulated: Option<ArticulatedGeometry>,
}

#[derive(Clone, Debug)]
pub struct ArticulatedGeometry {
    pub saddle_position_x: HighPrecision,
    pub saddle_height: HighPrecision,
    pub kingpin_setback: HighPrecision,
    pub tractor_curb_weight: HighPrecision,
    pub trailer_curb_weight: HighPrecision,
}

impl AxleGeometry {
    pub fn from_unit_spec(spec: &UnitSpec) -> Option<Self> {
        match spec {
            UnitSpec::Container { .. } => None,
            UnitSpec::Vehicle {
                axle_positions,
                curb_axle_loads,
                wheel_type,
                track_width_front,
                track_width_rear,
                cg_height_empty,
                ..
            } => Some(AxleGeometry {
                positions: axle_positions.iter().map(|&v| HighPrecision::from_f64(v)).collect(),
                curb_loads: curb_axle_loads.iter().map(|&v| HighPrecision::from_f64(v)).collect(),
                wheel_type: *wheel_type,
                track_width_front: HighPrecision::from_f64(*track_width_front),
                track_width_rear: HighPrecision::from_f64(*track_width_rear),
                cg_height_empty: HighPrecision::from_f64(*cg_height_empty),
                articulated: None,
            }),
            UnitSpec::Articulated {
                axle_positions,
                curb_axle_loads,
                wheel_type,
                track_width_front,
                track_width_rear,
                cg_height_empty,
                saddle_position_x,
                saddle_height,
                kingpin_setback,
                tractor_curb_weight,
                trailer_curb_weight,
                ..
            } => Some(AxleGeometry {
                positions: axle_positions.iter().map(|&v| HighPrecision::from_f64(v)).collect(),
                curb_loads: curb_axle_loads.iter().map(|&v| HighPrecision::from_f64(v)).collect(),
                wheel_type: *wheel_type,
                track_width_front: HighPrecision::from_f64(*track_width_front),
                track_width_rear: HighPrecision::from_f64(*track_width_rear),
                cg_height_empty: HighPrecision::from_f64(*cg_height_empty),
                articulated: Some(ArticulatedGeometry {
                    saddle_position_x: HighPrecision::from_f64(*saddle_position_x),
                    saddle_height: HighPrecision::from_f64(*saddle_height),
                    kingpin_setback: HighPrecision::from_f64(*kingpin_setback),
                    tractor_curb_weight: HighPrecision::from_f64(*tractor_curb_weight),
                    trailer_curb_weight: HighPrecision::from_f64(*trailer_curb_weight),
                }),
            }),
        }
    }

    fn default_curb_sum(&self) -> HighPrecision {
        self.curb_loads.iter().copied().sum()
    }
}

/// Result of running one axle model against a hypothetical or committed state.
#[derive(Clone, Debug)]
pub struct AxleLoadState {
    pub per_axle_loads: Vec<HighPrecision>,
    pub wheel_loads: Option<Vec<(HighPrecision, HighPrecision)>>,
    pub cg_cargo: (HighPrecision, HighPrecision, HighPrecision),
    pub cargo_weight: HighPrecision,
}

fn cargo_cg(placements: &[Placement], unit_width: HighPrecision, is_2d: bool) -> (HighPrecision, HighPrecision, HighPrecision, HighPrecision) {
    let mut wx = HighPrecision::ZERO;
    let mut wz = HighPrecision::ZERO;
    let mut total = HighPrecision::ZERO;
    for p in placements {
        let c = p.centroid();
        wx = wx + c.x * p.weight;
        wz = wz + c.z * p.weight;
        total = total + p.weight;
    }
    if total.is_zero() {
        return (HighPrecision::ZERO, unit_width / HighPrecision::from_f64(2.0), HighPrecision::ZERO, HighPrecision::ZERO);
    }
    let cg_x = wx / total;
    let cg_z = wz / total;
    let cg_y = if is_2d {
        unit_width / HighPrecision::from_f64(2.0)
    } else {
        let points = placements.iter().map(|p| {
            let c = p.centroid();
            (c.x, c.y, p.weight)
        });
        weighted_center_xy(points).map(|(_, y)| y).unwrap_or(unit_width / HighPrecision::from_f64(2.0))
    };
    (cg_x, cg_y, cg_z, total)
}

/// Distributes cargo weight to the two axles bracketing `cg_x` (lever rule).
fn lever_rule_distribution(positions: &[HighPrecision], cg_x: HighPrecision, cargo_weight: HighPrecision) -> Vec<HighPrecision> {
    let n = positions.len();
    let mut loads = vec![HighPrecision::ZERO; n];
    if n == 1 {
        loads[0] = cargo_weight;
        return loads;
    }
    if cg_x <= positions[0] {
        loads[0] = cargo_weight;
        return loads;
    }
    if cg_x >= positions[n - 1] {
        loads[n - 1] = cargo_weight;
        return loads;
    }
    for i in 0..n - 1 {
        let (a, b) = (positions[i], positions[i + 1]);
        if cg_x >= a && cg_x <= b {
            let span = b - a;
            let frac_b = (cg_x - a) / span;
            let frac_a = HighPrecision::ONE - frac_b;
            loads[i] = loads[i] + cargo_weight * frac_a;
            loads[i + 1] = loads[i + 1] + cargo_weight * frac_b;
            break;
        }
    }
    loads
}

fn scaled_curb_loads(geometry: &AxleGeometry, curb_override: Option<HighPrecision>) -> Vec<HighPrecision> {
    let default_sum = geometry.default_curb_sum();
    match curb_override {
        Some(effective) if !default_sum.is_zero() => {
            let scale = effective / default_sum;
            geometry.curb_loads.iter().map(|&c| c * scale).collect()
        }
        _ => geometry.curb_loads.clone(),
    }
}

fn wheel_loads_for(
    positions: &[HighPrecision],
    totals: &[HighPrecision],
    cg_y: HighPrecision,
    cg_z: HighPrecision,
    unit_width: HighPrecision,
    cargo_weight: HighPrecision,
    track_width_front: HighPrecision,
    track_width_rear: HighPrecision,
) -> Vec<(HighPrecision, HighPrecision)> {
    let moment = cargo_weight * (cg_y - unit_width / HighPrecision::from_f64(2.0));
    let total_of_all: HighPrecision = totals.iter().copied().sum();
    positions
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let share = if total_of_all.is_zero() {
                HighPrecision::ZERO
            } else {
                moment * (totals[i] / total_of_all)
            };
            let track_width = if i == 0 { track_width_front } else { track_width_rear };
            let delta = if track_width.is_zero() {
                HighPrecision::ZERO
            } else {
                (share * cg_z) / track_width
            };
            let half = totals[i] / HighPrecision::from_f64(2.0);
            (half - delta, half + delta)
        })
        .collect()
}

/// Runs the requested axle model against `placements` (either the currently
/// committed state or a hypothetical state under evaluation).
pub fn compute_axle_loads(
    model: AxleModel,
    geometry: &AxleGeometry,
    placements: &[Placement],
    unit_width: HighPrecision,
    curb_override: Option<HighPrecision>,
) -> AxleLoadState {
    let is_2d = matches!(model, AxleModel::Beam2D);
    let (cg_x, cg_y, cg_z, cargo_weight) = cargo_cg(placements, unit_width, is_2d);
    let curb_loads = scaled_curb_loads(geometry, curb_override);

    let per_axle_loads = match model {
        AxleModel::Beam2D | AxleModel::Simple3D => {
            let cargo_dist = lever_rule_distribution(&geometry.positions, cg_x, cargo_weight);
            curb_loads.iter().zip(cargo_dist.iter()).map(|(&c, &d)| c + d).collect()
        }
        AxleModel::Articulated3D => articulated_distribution(geometry, &curb_loads, cg_x, cargo_weight),
    };

    let wheel_loads = match model {
        AxleModel::Beam2D => None,
        AxleModel::Simple3D | AxleModel::Articulated3D => Some(wheel_loads_for(
            &geometry.positions,
            &per_axle_loads,
            cg_y,
            cg_z,
            unit_width,
            cargo_weight,
            geometry.track_width_front,
            geometry.track_width_rear,
        )),
    };

    AxleLoadState {
        per_axle_loads,
        wheel_loads,
        cg_cargo: (cg_x, cg_y, cg_z),
        cargo_weight,
    }
}

fn articulated_distribution(
    geometry: &AxleGeometry,
    curb_loads: &[HighPrecision],
    cg_x_relative: HighPrecision,
    cargo_weight: HighPrecision,
) -> Vec<HighPrecision> {
    let art = geometry.articulated.as_ref().expect("articulated model requires articulated geometry");
    let saddle_x = art.saddle_position_x;
    let cargo_origin_x = saddle_x - art.kingpin_setback;
    let cg_x_absolute = cargo_origin_x + cg_x_relative;

    let trailer_idx: Vec<usize> = geometry.positions.iter().enumerate().filter(|&(_, &p)| p > saddle_x).map(|(i, _)| i).collect();
    let tractor_idx: Vec<usize> = geometry.positions.iter().enumerate().filter(|&(_, &p)| p <= saddle_x).map(|(i, _)| i).collect();

    let x_bogie = mean(trailer_idx.iter().map(|&i| geometry.positions[i]));

    let lever = x_bogie - saddle_x;
    let f_kingpin = if lever.abs().to_f64().abs() < 1e-9 {
        cargo_weight / HighPrecision::from_f64(2.0)
    } else {
        cargo_weight * (x_bogie - cg_x_absolute) / lever
    };
    let f_trailer = cargo_weight - f_kingpin;

    let mut loads = curb_loads.to_vec();
    if !trailer_idx.is_empty() {
        let per_trailer_axle = f_trailer / HighPrecision::from_i64(trailer_idx.len() as i64);
        for &i in &trailer_idx {
            loads[i] = loads[i] + per_trailer_axle;
        }
    }

    if tractor_idx.len() <= 1 {
        if let Some(&i) = tractor_idx.first() {
            loads[i] = loads[i] + f_kingpin;
        }
    } else {
        let x_front = geometry.positions[tractor_idx[0]];
        let rear_bogie_idx = &tractor_idx[1..];
        let x_rb = mean(rear_bogie_idx.iter().map(|&i| geometry.positions[i]));
        let tractor_lever = x_rb - x_front;
        let f_rear_bogie = if tractor_lever.abs().to_f64().abs() < 1e-9 {
            f_kingpin / HighPrecision::from_i64(tractor_idx.len() as i64)
        } else {
            f_kingpin * (saddle_x - x_front) / tractor_lever
        };
        let f_front = f_kingpin - f_rear_bogie;

        loads[tractor_idx[0]] = loads[tractor_idx[0]] + f_front;
        let per_rear_axle = f_rear_bogie / HighPrecision::from_i64(rear_bogie_idx.len() as i64);
        for &i in rear_bogie_idx {
            loads[i] = loads[i] + per_rear_axle;
        }
    }

    loads
}

fn mean<I: Iterator<Item = HighPrecision>>(values: I) -> HighPrecision {
    let mut total = HighPrecision::ZERO;
    let mut count = 0i64;
    for v in values {
        total = total + v;
        count += 1;
    }
    if count == 0 {
        HighPrecision::ZERO
    } else {
        total / HighPrecision::from_i64(count)
    }
}

/// Groups axle positions into regulatory groups: consecutive axles within
/// 2.5 m of the previous form one group.
fn axle_groups(positions: &[HighPrecision]) -> Vec<Vec<usize>> {
    let threshold = HighPrecision::from_f64(2.5);
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, &pos) in positions.iter().enumerate() {
        match groups.last_mut() {
            Some(group) if pos - positions[*group.last().unwrap()] <= threshold => group.push(i),
            _ => groups.push(vec![i]),
        }
    }
    groups
}

fn min_spacing(positions: &[HighPrecision], group: &[usize]) -> HighPrecision {
    if group.len() < 2 {
        return HighPrecision::ZERO;
    }
    group
        .windows(2)
        .map(|pair| positions[pair[1]] - positions[pair[0]])
        .fold(HighPrecision::from_f64(1.0e6), HighPrecision::min)
}

/// Per-axle regulatory limit (kg) derived from axle grouping (§4.6).
pub fn per_axle_limits(geometry: &AxleGeometry) -> Vec<HighPrecision> {
    let groups = axle_groups(&geometry.positions);
    let mut limits = vec![HighPrecision::ZERO; geometry.positions.len()];
    for group in &groups {
        let spacing = min_spacing(&geometry.positions, group).to_f64();
        let total_limit = group_total_limit_kg(group.len() as u32, geometry.wheel_type, spacing);
        let per_axle = HighPrecision::from_f64(total_limit as f64) / HighPrecision::from_i64(group.len() as i64);
        for &i in group {
            limits[i] = per_axle;
        }
    }
    limits
}

/// Builds the full compliance report for a state (§4.6, §6).
pub fn compliance_report(
    state: &AxleLoadState,
    geometry: &AxleGeometry,
    tolerance_percent: HighPrecision,
) -> ComplianceReport {
    let limits = per_axle_limits(geometry);
    let total_weight: HighPrecision = state.per_axle_loads.iter().copied().sum();
    let gvw_limit = gvw_limit_for_axle_count(geometry.positions.len() as u32);
    let tol_factor = HighPrecision::ONE + tolerance_percent / HighPrecision::from_f64(100.0);

    let gvw_exceeded = gvw_limit
        .map(|limit| total_weight > HighPrecision::from_f64(limit as f64) * tol_factor)
        .unwrap_or(false);

    let mut axle_exceeded = false;
    let per_axle: Vec<AxleReport> = state
        .per_axle_loads
        .iter()
        .zip(limits.iter())
        .map(|(&load, &limit)| {
            let exceeded = load > limit * tol_factor;
            axle_exceeded = axle_exceeded || exceeded;
            let deviation = load - limit;
            let deviation_percent = if limit.is_zero() {
                0.0
            } else {
                (deviation / limit).to_f64() * 100.0
            };
            AxleReport {
                load_kg: load.to_f64(),
                limit_kg: limit.to_f64(),
                deviation_kg: deviation.to_f64(),
                deviation_percent,
                exceeded,
            }
        })
        .collect();

    let reason = if gvw_exceeded {
        ComplianceReason::GvwExceeded
    } else if axle_exceeded {
        ComplianceReason::AxleExceeded
    } else {
        ComplianceReason::Compliant
    };

    let wheel_loads = state.wheel_loads.as_ref().map(|loads| {
        loads
            .iter()
            .enumerate()
            .map(|(i, &(left, right))| WheelLoadReport { axle_idx: i, left_kg: left.to_f64(), right_kg: right.to_f64() })
            .collect()
    });

    ComplianceReport {
        is_compliant: matches!(reason, ComplianceReason::Compliant),
        reason,
        per_axle,
        wheel_loads,
        cg_cargo_xyz: (state.cg_cargo.0.to_f64(), state.cg_cargo.1.to_f64(), state.cg_cargo.2.to_f64()),
    }
}

/// Ranking-only compliance score (§4.6); lower is better, never surfaced to
/// callers as a calibrated metric.
pub fn compliance_score(
    state: &AxleLoadState,
    geometry: &AxleGeometry,
    tolerance_percent: HighPrecision,
    payload_capacity: HighPrecision,
) -> HighPrecision {
    let report = compliance_report(state, geometry, tolerance_percent);
    if !report.is_compliant {
        return HighPrecision::fail_sentinel();
    }

    let n = state.per_axle_loads.len();
    if n == 0 || payload_capacity.is_zero() {
        return HighPrecision::fail_sentinel();
    }
    let mean_load = mean(state.per_axle_loads.iter().copied());
    let variance: HighPrecision = state
        .per_axle_loads
        .iter()
        .map(|&l| (l - mean_load) * (l - mean_load))
        .sum::<HighPrecision>()
        / HighPrecision::from_i64(n as i64);

    variance / HighPrecision::from_f64(1000.0)
        - HighPrecision::from_f64(1000.0) * (state.cargo_weight / payload_capacity)
}

/// Aggregate diagnostics across all units in a result (ambient, §4.6).
#[derive(Clone, Debug, Default)]
pub struct ComplianceSummary {
    pub compliant_units: u32,
    pub non_compliant_units: u32,
    pub worst_deviation_percent: f64,
}

impl ComplianceSummary {
    pub fn accumulate(&mut self, report: &ComplianceReport) {
        if report.is_compliant {
            self.compliant_units += 1;
        } else {
            self.non_compliant_units += 1;
        }
        for axle in &report.per_axle {
            if axle.deviation_percent > self.worst_deviation_percent {
                self.worst_deviation_percent = axle.deviation_percent;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EffectiveConstraints, PalletPackingMode};

    fn placement_at(x: f64, weight: f64) -> Placement {
        Placement {
            item_name: "box".into(),
            color: None,
            weight: HighPrecision::from_f64(weight),
            position: crate::geometry::Vec3::from_f64(x, 0.0, 0.0),
            dims: crate::geometry::Vec3::from_f64(1.0, 1.0, 1.0),
            constraints: EffectiveConstraints {
                allowed_orientations: None,
                max_stack_height: None,
                max_stack_layers: None,
                max_stack_load: None,
                pallet_packing_mode: PalletPackingMode::Automatic,
            },
        }
    }

    fn five_axle_geometry() -> AxleGeometry {
        AxleGeometry {
            positions: vec![0.0, 1.5, 6.0, 7.3, 8.6].into_iter().map(HighPrecision::from_f64).collect(),
            curb_loads: vec![6000.0, 5000.0, 3000.0, 3000.0, 3000.0].into_iter().map(HighPrecision::from_f64).collect(),
            wheel_type: WheelType::Dual,
            track_width_front: HighPrecision::from_f64(2.0),
            track_width_rear: HighPrecision::from_f64(1.8),
            cg_height_empty: HighPrecision::from_f64(1.0),
            articulated: None,
        }
    }

    #[test]
    fn lever_rule_splits_between_bracketing_axles() {
        let positions = vec![0.0, 2.0].into_iter().map(HighPrecision::from_f64).collect::<Vec<_>>();
        let loads = lever_rule_distribution(&positions, HighPrecision::from_f64(0.5), HighPrecision::from_f64(100.0));
        assert!((loads[0].to_f64() - 75.0).abs() < 1e-6);
        assert!((loads[1].to_f64() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn scenario_s4_axle_compliance_safe2d() {
        let geometry = five_axle_geometry();
        let placements: Vec<Placement> = (0..10).map(|i| placement_at(2.0 + i as f64 * 0.5, 1000.0)).collect();
        let state = compute_axle_loads(AxleModel::Beam2D, &geometry, &placements, HighPrecision::from_f64(2.5), None);

        let curb_sum: f64 = geometry.curb_loads.iter().map(|c| c.to_f64()).sum();
        let total: f64 = state.per_axle_loads.iter().map(|l| l.to_f64()).sum();
        assert!((total - (curb_sum + 10000.0)).abs() < 1e-6);

        let report = compliance_report(&state, &geometry, HighPrecision::ZERO);
        assert!(report.is_compliant);
    }

    #[test]
    fn scenario_s5_overweight_flags_gvw_exceeded() {
        let geometry = five_axle_geometry();
        let placements: Vec<Placement> = (0..50).map(|i| placement_at(1.0 + i as f64 * 0.15, 1000.0)).collect();
        let state = compute_axle_loads(AxleModel::Beam2D, &geometry, &placements, HighPrecision::from_f64(2.5), None);
        let report = compliance_report(&state, &geometry, HighPrecision::ZERO);
        assert!(!report.is_compliant);
    }

    #[test]
    fn axle_sum_conserves_weight_for_articulated_model() {
        let geometry = AxleGeometry {
            positions: vec![0.0, 3.5, 8.0, 9.3, 10.6].into_iter().map(HighPrecision::from_f64).collect(),
            curb_loads: vec![6000.0, 5000.0, 2500.0, 2500.0, 2500.0].into_iter().map(HighPrecision::from_f64).collect(),
            wheel_type: WheelType::Dual,
            track_width_front: HighPrecision::from_f64(2.0),
            track_width_rear: HighPrecision::from_f64(1.8),
            cg_height_empty: HighPrecision::from_f64(1.0),
            articulated: Some(ArticulatedGeometry {
                saddle_position_x: HighPrecision::from_f64(8.0),
                saddle_height: HighPrecision::from_f64(1.1),
                kingpin_setback: HighPrecision::from_f64(0.3),
                tractor_curb_weight: HighPrecision::from_f64(7000.0),
                trailer_curb_weight: HighPrecision::from_f64(11500.0),
            }),
        };
        let placements: Vec<Placement> = (0..5).map(|i| placement_at(1.0 + i as f64 * 0.5, 1000.0)).collect();
        let state = compute_axle_loads(AxleModel::Articulated3D, &geometry, &placements, HighPrecision::from_f64(2.5), None);
        let curb_sum: f64 = geometry.curb_loads.iter().map(|c| c.to_f64()).sum();
        let total: f64 = state.per_axle_loads.iter().map(|l| l.to_f64()).sum();
        assert!((total - (curb_sum + 5000.0)).abs() < 1e-6);
    }

    #[test]
    fn scorer_rewards_centering_load_on_a_symmetric_vehicle() {
        let geometry = AxleGeometry {
            positions: vec![0.0, 8.0].into_iter().map(HighPrecision::from_f64).collect(),
            curb_loads: vec![4000.0, 4000.0].into_iter().map(HighPrecision::from_f64).collect(),
            wheel_type: WheelType::Dual,
            track_width_front: HighPrecision::from_f64(2.0),
            track_width_rear: HighPrecision::from_f64(2.0),
            cg_height_empty: HighPrecision::from_f64(1.0),
            articulated: None,
        };
        let payload_capacity = HighPrecision::from_f64(30000.0);
        let tolerance = HighPrecision::from_f64(50.0);

        let off_center = vec![placement_at(1.0, 2000.0)];
        let centered = vec![placement_at(4.0, 2000.0)];

        let off_state = compute_axle_loads(AxleModel::Beam2D, &geometry, &off_center, HighPrecision::from_f64(2.5), None);
        let centered_state = compute_axle_loads(AxleModel::Beam2D, &geometry, &centered, HighPrecision::from_f64(2.5), None);

        let off_score = compliance_score(&off_state, &geometry, tolerance, payload_capacity);
        let centered_score = compliance_score(&centered_state, &geometry, tolerance, payload_capacity);

        assert!(centered_score <= off_score);
    }
}
