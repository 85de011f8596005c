//! Cargo-loading engine: palletization, 3D placement search, and road-legal
//! axle-load verification for a fleet of containers, rigid vehicles, and
//! articulated tractor-trailers.
//!
//! The top-level entry point is [`pack`]. Everything below the public
//! interface (`model`, `axle`, `packer`, `manager`) runs in the fixed-point
//! decimal domain provided by [`numerics::HighPrecision`] — no `f64`
//! arithmetic crosses a containment, overlap, or compliance comparison.

pub mod axle;
pub mod config;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod model;
pub mod numerics;
pub mod palletizer;
pub mod packer;
pub mod regulatory;

pub use config::{EngineConfig, PackingConfig};
pub use error::PackingError;
pub use model::{
    AxleReport, ComplianceReason, ComplianceReport, ConstraintsSpec, ItemSpec, OrientationHint, PackRequest,
    PackResult, PackingMode, PackingPriority, PalletPackingMode, PalletSpec, PlacementResult, ShapeSpec, UnitResult,
    UnitSpec, UnpackedItem, UnpackedReason, WheelLoadReport, WheelType,
};
pub use numerics::HighPrecision;

use axle::ComplianceSummary;
use manager::PackingManager;

/// Runs one packing request to completion: expand, palletize, place, balance.
pub fn pack(request: &PackRequest) -> PackResult {
    PackingManager::new(PackingConfig::default()).pack(request)
}

/// Same as [`pack`], but with an explicit [`PackingConfig`] instead of the
/// library defaults (grid step, epsilon, decimal precision, ...).
pub fn pack_with_config(request: &PackRequest, config: PackingConfig) -> PackResult {
    PackingManager::new(config).pack(request)
}

/// Rolls every unit's [`ComplianceReport`] up into one summary, the way a
/// fleet dispatcher would read a multi-unit load plan at a glance.
pub fn summarize_compliance(result: &PackResult) -> ComplianceSummary {
    let mut summary = ComplianceSummary::default();
    for unit in &result.units {
        if let Some(report) = &unit.compliance {
            summary.accumulate(report);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintsSpec, ShapeSpec};

    #[test]
    fn pack_rejects_nothing_it_cannot_place_silently() {
        let items = vec![ItemSpec::new(
            "crate",
            None,
            ShapeSpec::Box { l: 1.0, w: 1.0, h: 1.0 },
            10.0,
            5,
            None,
            false,
            None,
            ConstraintsSpec::default(),
        )
        .unwrap()];
        let catalog = vec![UnitSpec::container(5.0, 5.0, 5.0, 10000.0).unwrap()];
        let request = PackRequest::new(items, catalog, None, PackingPriority::Volume, PackingMode::Density, false, 0.0).unwrap();

        let result = pack(&request);
        let placed: usize = result.units.iter().map(|u| u.placements.len()).sum();
        assert_eq!(placed + result.unpacked.len(), 5);
    }

    #[test]
    fn summarize_compliance_counts_units_by_report() {
        let result = PackResult { units: vec![], unpacked: vec![] };
        let summary = summarize_compliance(&result);
        assert_eq!(summary.compliant_units, 0);
        assert_eq!(summary.non_compliant_units, 0);
    }
}
