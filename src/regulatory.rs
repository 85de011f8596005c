//! Static regulatory reference data: bit-exact per §6.
//!
//! Read-only compile-time tables; never mutated (§9 Design Notes). No
//! lazy-init synchronization is needed since every table is a plain array of
//! fixed-size structs known at compile time.

use crate::model::WheelType;

/// Gross-vehicle-weight ceiling (kg) indexed by total axle count.
pub const TOTAL_WEIGHT_BY_AXLE_COUNT: &[(u32, u32)] = &[
    (2, 18_000),
    (3, 25_000),
    (4, 32_000),
    (5, 38_000),
    (6, 44_000),
    (7, 44_000),
];

pub fn gvw_limit_for_axle_count(axle_count: u32) -> Option<u32> {
    TOTAL_WEIGHT_BY_AXLE_COUNT
        .iter()
        .find(|(count, _)| *count == axle_count)
        .map(|(_, limit)| *limit)
        .or_else(|| {
            // Axle counts beyond the table ceiling share the 7-axle limit;
            // axle counts below 2 are rejected by input validation before
            // this table is ever consulted.
            if axle_count > 7 {
                TOTAL_WEIGHT_BY_AXLE_COUNT.last().map(|(_, limit)| *limit)
            } else {
                None
            }
        })
}

/// Half-open spacing range `[min, max)` in meters, group size, wheel type,
/// and the group's total weight limit in kg.
struct AxleGroupLimit {
    group_size: u32,
    wheel_type: WheelType,
    min_spacing_m: f64,
    max_spacing_m: f64,
    group_total_limit_kg: u32,
}

const AXLE_GROUP_LIMITS: &[AxleGroupLimit] = &[
    AxleGroupLimit { group_size: 1, wheel_type: WheelType::Single, min_spacing_m: 0.0, max_spacing_m: f64::INFINITY, group_total_limit_kg: 6_000 },
    AxleGroupLimit { group_size: 1, wheel_type: WheelType::Dual, min_spacing_m: 0.0, max_spacing_m: f64::INFINITY, group_total_limit_kg: 10_000 },
    AxleGroupLimit { group_size: 2, wheel_type: WheelType::Dual, min_spacing_m: 0.0, max_spacing_m: 1.0, group_total_limit_kg: 11_500 },
    AxleGroupLimit { group_size: 2, wheel_type: WheelType::Dual, min_spacing_m: 1.0, max_spacing_m: 1.3, group_total_limit_kg: 16_000 },
    AxleGroupLimit { group_size: 2, wheel_type: WheelType::Dual, min_spacing_m: 1.3, max_spacing_m: 1.8, group_total_limit_kg: 18_000 },
    AxleGroupLimit { group_size: 2, wheel_type: WheelType::Dual, min_spacing_m: 1.8, max_spacing_m: 2.5, group_total_limit_kg: 19_000 },
    AxleGroupLimit { group_size: 3, wheel_type: WheelType::Dual, min_spacing_m: 0.0, max_spacing_m: 1.3, group_total_limit_kg: 21_000 },
    AxleGroupLimit { group_size: 3, wheel_type: WheelType::Dual, min_spacing_m: 1.3, max_spacing_m: 1.8, group_total_limit_kg: 24_000 },
    AxleGroupLimit { group_size: 3, wheel_type: WheelType::Dual, min_spacing_m: 1.8, max_spacing_m: 2.5, group_total_limit_kg: 27_000 },
];

/// Looks up the group-total limit for a group of `group_size` axles of the
/// given `wheel_type`, with minimum inter-axle spacing `min_spacing_m`.
/// Falls back to `group_size * 10_000` (single-dual-axle baseline) for
/// combinations not in the table, so a lookup miss degrades to a
/// conservative limit rather than panicking.
pub fn group_total_limit_kg(group_size: u32, wheel_type: WheelType, min_spacing_m: f64) -> u32 {
    AXLE_GROUP_LIMITS
        .iter()
        .find(|row| {
            row.group_size == group_size
                && row.wheel_type == wheel_type
                && min_spacing_m >= row.min_spacing_m
                && min_spacing_m < row.max_spacing_m
        })
        .map(|row| row.group_total_limit_kg)
        .unwrap_or(group_size * 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gvw_limit_matches_table_bit_exact() {
        assert_eq!(gvw_limit_for_axle_count(2), Some(18_000));
        assert_eq!(gvw_limit_for_axle_count(3), Some(25_000));
        assert_eq!(gvw_limit_for_axle_count(4), Some(32_000));
        assert_eq!(gvw_limit_for_axle_count(5), Some(38_000));
        assert_eq!(gvw_limit_for_axle_count(6), Some(44_000));
        assert_eq!(gvw_limit_for_axle_count(7), Some(44_000));
    }

    #[test]
    fn gvw_limit_below_two_axles_is_undefined() {
        assert_eq!(gvw_limit_for_axle_count(1), None);
    }

    #[test]
    fn group_limit_uses_half_open_spacing_ranges() {
        let low = group_total_limit_kg(2, WheelType::Dual, 1.0);
        let high = group_total_limit_kg(2, WheelType::Dual, 1.29);
        assert_eq!(low, 16_000);
        assert_eq!(high, 16_000);
        let next = group_total_limit_kg(2, WheelType::Dual, 1.3);
        assert_eq!(next, 18_000);
    }
}
