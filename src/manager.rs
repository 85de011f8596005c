//! `PackingManager`: top-level orchestration across a whole request (§4.8).
//!
//! Expands item templates, palletizes the ones that ask for it, sorts by
//! priority, distributes across the unit catalog (greedy-first-fit or
//! look-ahead-best-choice depending on fleet shape and packing mode), then
//! runs the post-pack transverse balance pass.

use crate::config::PackingConfig;
use crate::model::{
    enumerate_orientations, Item, ItemSpec, PackRequest, PackResult, PackingMode, PackingPriority, UnitResult,
    UnitSpec, UnpackedItem, UnpackedReason,
};
use crate::numerics::HighPrecision;
use crate::packer::UnitPacker;
use crate::palletizer;

/// One physical piece to place, paired with the spec it is reported against
/// if it never finds a home.
struct PackUnit {
    item: Item,
    origin: ItemSpec,
}

pub struct PackingManager {
    config: PackingConfig,
}

impl PackingManager {
    pub fn new(config: PackingConfig) -> Self {
        PackingManager { config }
    }

    pub fn pack(&self, request: &PackRequest) -> PackResult {
        let tolerance_percent = HighPrecision::from_f64(request.tolerance_percent);
        let mut pack_units = self.expand_and_palletize(&request.items);
        sort_pack_units(&mut pack_units, request.packing_priority, request.base_then_top);

        let homogeneous = is_homogeneous_fleet(&request.unit_catalog);
        let use_lookahead = !homogeneous && request.packing_mode == PackingMode::Density;

        let mut opened: Vec<UnitPacker> = Vec::new();
        let mut unpacked: Vec<UnpackedItem> = Vec::new();

        if use_lookahead {
            self.distribute_lookahead(pack_units, request.packing_mode, tolerance_percent, &request.unit_catalog, &mut opened, &mut unpacked);
        } else {
            let mut next_catalog_idx = 0usize;
            for unit in pack_units {
                let placed =
                    self.place_first_fit(&unit.item, request.packing_mode, tolerance_percent, &request.unit_catalog, &mut opened, &mut next_catalog_idx);
                if !placed {
                    let reason = self.classify_failure(&unit.item, request.packing_mode, &request.unit_catalog, &opened, next_catalog_idx);
                    unpacked.push(UnpackedItem { item: unit.origin, reason });
                }
            }
        }

        let mut units = Vec::with_capacity(opened.len());
        for mut packer in opened {
            if let Some(notice) = packer.transverse_balance(&self.config) {
                packer.notices.push(notice);
            }
            let compliance = packer.compliance(request.packing_mode, tolerance_percent);
            units.push(UnitResult {
                unit_spec: packer.unit_spec.clone(),
                placements: packer.placements.iter().map(crate::model::PlacementResult::from_placement).collect(),
                cargo_weight: packer.cargo_weight().to_f64(),
                compliance,
                notices: packer.notices.clone(),
            });
        }

        PackResult { units, unpacked }
    }

    /// Expands every item template and palletizes the ones that ask for it
    /// (§4.2, §4.8 step 1). Templates whose pallet assignment doesn't fit
    /// even one piece fall back to loose placement.
    fn expand_and_palletize(&self, specs: &[ItemSpec]) -> Vec<PackUnit> {
        let mut out = Vec::new();
        for spec in specs {
            if spec.on_pallet {
                if let Some(pallet) = &spec.pallet_ref {
                    let loose = Item::expand(spec);
                    match palletizer::palletize(&loose, pallet) {
                        Some(meta_items) => {
                            for meta in meta_items {
                                let pieces = match &meta.shape {
                                    crate::model::Shape::MetaPallet { manifest, .. } => manifest.pieces,
                                    _ => spec.piece_count,
                                };
                                let mut origin = spec.clone();
                                origin.piece_count = pieces;
                                out.push(PackUnit { item: meta, origin });
                            }
                            continue;
                        }
                        None => {
                            for item in loose {
                                let mut origin = spec.clone();
                                origin.piece_count = 1;
                                out.push(PackUnit { item, origin });
                            }
                            continue;
                        }
                    }
                }
            }
            for item in Item::expand(spec) {
                let mut origin = spec.clone();
                origin.piece_count = 1;
                out.push(PackUnit { item, origin });
            }
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn place_first_fit(
        &self,
        item: &Item,
        mode: PackingMode,
        tolerance_percent: HighPrecision,
        catalog: &[UnitSpec],
        opened: &mut Vec<UnitPacker>,
        next_catalog_idx: &mut usize,
    ) -> bool {
        for packer in opened.iter_mut() {
            if packer.try_place(item, mode, &self.config, tolerance_percent) {
                return true;
            }
        }
        while *next_catalog_idx < catalog.len() {
            let spec = catalog[*next_catalog_idx].clone();
            *next_catalog_idx += 1;
            let mut packer = UnitPacker::new(spec);
            if packer.try_place(item, mode, &self.config, tolerance_percent) {
                opened.push(packer);
                return true;
            }
        }
        false
    }

    /// The look-ahead best-choice loop (§4.8 step 4, heterogeneous fleet):
    /// each round, clone every open unit plus instantiate one tentative unit
    /// per catalog type, greedily fill each tentative with as many of the
    /// remaining items as it can hold, and commit whichever tentative placed
    /// the most. Repeat against the shrunk remaining list until a round
    /// places nothing, at which point what's left is unpacked.
    fn distribute_lookahead(
        &self,
        mut remaining: Vec<PackUnit>,
        mode: PackingMode,
        tolerance_percent: HighPrecision,
        catalog: &[UnitSpec],
        opened: &mut Vec<UnitPacker>,
        unpacked: &mut Vec<UnpackedItem>,
    ) {
        while !remaining.is_empty() {
            let mut best: Option<(Option<usize>, UnitPacker, Vec<usize>)> = None;

            for (i, packer) in opened.iter().enumerate() {
                let (trial, placed) = self.simulate_fill(packer.clone(), &remaining, mode, tolerance_percent);
                if best.as_ref().map(|(_, _, b)| placed.len() > b.len()).unwrap_or(true) {
                    best = Some((Some(i), trial, placed));
                }
            }
            for spec in catalog {
                let (trial, placed) = self.simulate_fill(UnitPacker::new(spec.clone()), &remaining, mode, tolerance_percent);
                if best.as_ref().map(|(_, _, b)| placed.len() > b.len()).unwrap_or(true) {
                    best = Some((None, trial, placed));
                }
            }

            let Some((slot, trial, mut placed)) = best else { break };
            if placed.is_empty() {
                break;
            }

            match slot {
                Some(i) => opened[i] = trial,
                None => opened.push(trial),
            }

            placed.sort_unstable_by(|a, b| b.cmp(a));
            for idx in placed {
                remaining.remove(idx);
            }
        }

        for unit in remaining {
            let reason = self.classify_failure(&unit.item, mode, catalog, opened, 0);
            unpacked.push(UnpackedItem { item: unit.origin, reason });
        }
    }

    /// Tries every item in `remaining`, in order, against `base`. Returns the
    /// resulting packer state plus the indices (into `remaining`) that it
    /// accepted. Leaves `base` untouched on the caller's side — it's
    /// consumed by value and returned as the trial.
    fn simulate_fill(&self, base: UnitPacker, remaining: &[PackUnit], mode: PackingMode, tolerance_percent: HighPrecision) -> (UnitPacker, Vec<usize>) {
        let mut trial = base;
        let mut placed = Vec::new();
        for (idx, unit) in remaining.iter().enumerate() {
            if trial.try_place(&unit.item, mode, &self.config, tolerance_percent) {
                placed.push(idx);
            }
        }
        (trial, placed)
    }

    fn classify_failure(
        &self,
        item: &Item,
        mode: PackingMode,
        catalog: &[UnitSpec],
        opened: &[UnitPacker],
        next_catalog_idx: usize,
    ) -> UnpackedReason {
        let epsilon = self.config.epsilon();
        if !item_fits_any_unit(item, catalog, epsilon) {
            return UnpackedReason::ItemOversized;
        }
        if mode.is_safe() && self.would_fit_in_density_mode(item, catalog, opened, next_catalog_idx) {
            return UnpackedReason::ComplianceViolation;
        }
        UnpackedReason::PlacementFailed
    }

    fn would_fit_in_density_mode(
        &self,
        item: &Item,
        catalog: &[UnitSpec],
        opened: &[UnitPacker],
        next_catalog_idx: usize,
    ) -> bool {
        for packer in opened {
            let mut trial = packer.clone();
            if trial.try_place(item, PackingMode::Density, &self.config, HighPrecision::ZERO) {
                return true;
            }
        }
        for spec in &catalog[next_catalog_idx..] {
            let mut trial = UnitPacker::new(spec.clone());
            if trial.try_place(item, PackingMode::Density, &self.config, HighPrecision::ZERO) {
                return true;
            }
        }
        false
    }
}

fn is_homogeneous_fleet(units: &[UnitSpec]) -> bool {
    units.windows(2).all(|w| w[0] == w[1])
}

fn item_fits_any_unit(item: &Item, units: &[UnitSpec], epsilon: HighPrecision) -> bool {
    let orientations = enumerate_orientations(item);
    units.iter().any(|unit| {
        let (l, w, h) = unit.dims();
        let dims = crate::geometry::Vec3::from_f64(l, w, h);
        orientations.iter().any(|o| o.x <= dims.x + epsilon && o.y <= dims.y + epsilon && o.z <= dims.z + epsilon)
    })
}

fn sort_pack_units(units: &mut [PackUnit], priority: PackingPriority, base_then_top: bool) {
    units.sort_by(|a, b| {
        let key_a = priority_key(&a.item, priority);
        let key_b = priority_key(&b.item, priority);
        key_b.cmp(&key_a)
    });
    if base_then_top {
        units.sort_by_key(|u| u.item.is_horizontal_cylinder());
    }
}

fn priority_key(item: &Item, priority: PackingPriority) -> HighPrecision {
    match priority {
        PackingPriority::Volume => item.volume(),
        PackingPriority::Weight => item.weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintsSpec, PackRequest, ShapeSpec, WheelType};

    fn boxes_spec(name: &str, count: u32, weight: f64) -> ItemSpec {
        ItemSpec::new(
            name, None, ShapeSpec::Box { l: 1.0, w: 1.0, h: 1.0 }, weight, count, None, false, None,
            ConstraintsSpec::default(),
        )
        .unwrap()
    }

    #[test]
    fn scenario_s1_all_items_fit_a_single_container() {
        let request = PackRequest::new(
            vec![boxes_spec("crate", 20, 50.0)],
            vec![UnitSpec::container(5.898, 2.352, 2.393, 28200.0).unwrap()],
            None,
            PackingPriority::Volume,
            PackingMode::Density,
            false,
            0.0,
        )
        .unwrap();
        let manager = PackingManager::new(PackingConfig::default());
        let result = manager.pack(&request);
        assert_eq!(result.unpacked.len(), 0);
        assert_eq!(result.units.len(), 1);
        assert_eq!(result.units[0].placements.len(), 20);
    }

    #[test]
    fn scenario_s2_overflow_opens_a_second_unit() {
        let request = PackRequest::new(
            vec![boxes_spec("crate", 40, 50.0)],
            vec![
                UnitSpec::container(2.0, 2.0, 2.0, 28200.0).unwrap(),
                UnitSpec::container(2.0, 2.0, 2.0, 28200.0).unwrap(),
            ],
            None,
            PackingPriority::Volume,
            PackingMode::Density,
            false,
            0.0,
        )
        .unwrap();
        let manager = PackingManager::new(PackingConfig::default());
        let result = manager.pack(&request);
        assert_eq!(result.units.len(), 2);
        let total_placed: usize = result.units.iter().map(|u| u.placements.len()).sum();
        assert_eq!(total_placed, 16);
        assert_eq!(result.unpacked.len(), 24);
    }

    #[test]
    fn oversized_item_is_reported_as_item_oversized() {
        let request = PackRequest::new(
            vec![boxes_spec("too_big", 1, 10.0)],
            vec![UnitSpec::container(0.5, 0.5, 0.5, 1000.0).unwrap()],
            None,
            PackingPriority::Volume,
            PackingMode::Density,
            false,
            0.0,
        )
        .unwrap();
        let manager = PackingManager::new(PackingConfig::default());
        let result = manager.pack(&request);
        assert_eq!(result.unpacked.len(), 1);
        assert_eq!(result.unpacked[0].reason, UnpackedReason::ItemOversized);
    }

    #[test]
    fn scenario_s6_heterogeneous_density_fleet_prefers_higher_capacity_unit() {
        // Small unit (capacity 2) listed first in the catalog, large unit
        // (capacity 4) second. Look-ahead must still fill with the large
        // unit exclusively, since it places more of the remaining batch per
        // round than the small unit ever could — catalog order must not
        // matter.
        let small_unit = UnitSpec::container(2.0, 1.0, 1.0, 10000.0).unwrap();
        let big_unit = UnitSpec::container(4.0, 1.0, 1.0, 10000.0).unwrap();
        let request = PackRequest::new(
            vec![boxes_spec("crate", 12, 10.0)],
            vec![small_unit.clone(), big_unit.clone()],
            None,
            PackingPriority::Volume,
            PackingMode::Density,
            false,
            0.0,
        )
        .unwrap();
        let manager = PackingManager::new(PackingConfig::default());
        let result = manager.pack(&request);

        assert_eq!(result.unpacked.len(), 0);
        let total_placed: usize = result.units.iter().map(|u| u.placements.len()).sum();
        assert_eq!(total_placed, 12);
        for unit in &result.units {
            assert_eq!(unit.unit_spec, big_unit, "look-ahead must not open the smaller unit despite it coming first in the catalog");
        }
    }

    #[test]
    fn place_first_fit_is_used_for_homogeneous_fleets() {
        let request = PackRequest::new(
            vec![boxes_spec("crate", 10, 20.0)],
            vec![
                UnitSpec::container(1.0, 1.0, 1.0, 1000.0).unwrap(),
                UnitSpec::vehicle(
                    10.0, 2.5, 2.5, 20000.0,
                    vec![1.0, 8.0],
                    vec![6000.0, 4000.0],
                    WheelType::Dual,
                    2.0, 2.0, 1.0,
                )
                .unwrap(),
            ],
            None,
            PackingPriority::Volume,
            PackingMode::Safe3DSimple,
            false,
            0.0,
        )
        .unwrap();
        let manager = PackingManager::new(PackingConfig::default());
        let result = manager.pack(&request);
        let total_placed: usize = result.units.iter().map(|u| u.placements.len()).sum();
        assert_eq!(total_placed + result.unpacked.len(), 10);
    }
}
