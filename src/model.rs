//! Data model: public input/output structs (validated eagerly at
//! construction, exactly as this codebase's `Box3D::new`/`Container::new`
//! validate) plus the internal decimal-domain representation the engine
//! actually packs.

use serde::{Deserialize, Serialize};

use crate::error::PackingError;
use crate::geometry::{Dimensional, Positioned, Vec3, Weighted};
use crate::numerics::HighPrecision;

// ---------------------------------------------------------------------
// Small shared enums
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrientationHint {
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PalletPackingMode {
    Grid,
    Staggered,
    Automatic,
}

impl Default for PalletPackingMode {
    fn default() -> Self {
        PalletPackingMode::Automatic
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackingPriority {
    Volume,
    Weight,
}

impl Default for PackingPriority {
    fn default() -> Self {
        PackingPriority::Volume
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackingMode {
    Density,
    Safe2D,
    Safe3DSimple,
    Safe3DArticulated,
}

impl Default for PackingMode {
    fn default() -> Self {
        PackingMode::Density
    }
}

impl PackingMode {
    pub fn is_safe(self) -> bool {
        !matches!(self, PackingMode::Density)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelType {
    Single,
    Dual,
}

// ---------------------------------------------------------------------
// Validation helpers (DRY, mirroring this codebase's own validation style)
// ---------------------------------------------------------------------

fn validate_dimension(value: f64, field: &str) -> Result<(), PackingError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PackingError::NonPositiveDimension { field: field.to_string() })
    }
}

fn validate_weight(value: f64, field: &str) -> Result<(), PackingError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PackingError::NonPositiveWeight { field: field.to_string() })
    }
}

fn validate_piece_count(count: u32) -> Result<(), PackingError> {
    if count >= 1 {
        Ok(())
    } else {
        Err(PackingError::InvalidPieceCount { piece_count: count })
    }
}

// ---------------------------------------------------------------------
// Shapes and items (public input)
// ---------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeSpec {
    Box { l: f64, w: f64, h: f64 },
    Cylinder { d: f64, h: f64 },
}

impl ShapeSpec {
    fn validate(&self) -> Result<(), PackingError> {
        match self {
            ShapeSpec::Box { l, w, h } => {
                validate_dimension(*l, "shape.l")?;
                validate_dimension(*w, "shape.w")?;
                validate_dimension(*h, "shape.h")?;
            }
            ShapeSpec::Cylinder { d, h } => {
                validate_dimension(*d, "shape.d")?;
                validate_dimension(*h, "shape.h")?;
            }
        }
        Ok(())
    }

    /// Footprint the shape occupies when resting vertically, used for
    /// pallet-fit pre-checks and the palletizer's layer layout math.
    fn vertical_footprint(&self) -> (f64, f64, f64) {
        match *self {
            ShapeSpec::Box { l, w, h } => (l, w, h),
            ShapeSpec::Cylinder { d, h } => (d, d, h),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConstraintsSpec {
    pub allowed_orientations: Option<Vec<(f64, f64, f64)>>,
    pub max_stack_height: Option<f64>,
    pub max_stack_layers: Option<u32>,
    pub max_stack_load: Option<f64>,
    pub pallet_packing_mode: Option<PalletPackingMode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PalletSpec {
    pub length: f64,
    pub width: f64,
    pub cargo_height: f64,
    pub depth: f64,
    pub max_weight: f64,
    pub self_weight: f64,
}

impl PalletSpec {
    pub fn new(
        length: f64,
        width: f64,
        cargo_height: f64,
        depth: f64,
        max_weight: f64,
        self_weight: f64,
    ) -> Result<Self, PackingError> {
        validate_dimension(length, "pallet.length")?;
        validate_dimension(width, "pallet.width")?;
        validate_dimension(cargo_height, "pallet.cargo_height")?;
        validate_dimension(depth, "pallet.depth")?;
        validate_weight(max_weight, "pallet.max_weight")?;
        validate_weight(self_weight, "pallet.self_weight")?;
        Ok(PalletSpec { length, width, cargo_height, depth, max_weight, self_weight })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemSpec {
    pub name: String,
    pub color: Option<String>,
    pub shape: ShapeSpec,
    pub piece_weight_kg: f64,
    pub piece_count: u32,
    pub orientation_default: Option<OrientationHint>,
    pub on_pallet: bool,
    pub pallet_ref: Option<PalletSpec>,
    pub constraints: ConstraintsSpec,
}

impl ItemSpec {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        color: Option<String>,
        shape: ShapeSpec,
        piece_weight_kg: f64,
        piece_count: u32,
        orientation_default: Option<OrientationHint>,
        on_pallet: bool,
        pallet_ref: Option<PalletSpec>,
        constraints: ConstraintsSpec,
    ) -> Result<Self, PackingError> {
        shape.validate()?;
        validate_weight(piece_weight_kg, "piece_weight_kg")?;
        validate_piece_count(piece_count)?;

        if on_pallet {
            if let Some(pallet) = &pallet_ref {
                if piece_weight_kg > pallet.max_weight {
                    return Err(PackingError::ItemExceedsPalletCapacity {
                        item_name: name.into(),
                    });
                }
                let (fl, fw, fh) = shape.vertical_footprint();
                let fits_footprint = (fl <= pallet.length && fw <= pallet.width)
                    || (fw <= pallet.length && fl <= pallet.width);
                if !fits_footprint || fh > pallet.cargo_height {
                    return Err(PackingError::ItemExceedsPalletCapacity {
                        item_name: name.into(),
                    });
                }
            }
        }

        Ok(ItemSpec {
            name: name.into(),
            color,
            shape,
            piece_weight_kg,
            piece_count,
            orientation_default,
            on_pallet,
            pallet_ref,
            constraints,
        })
    }
}

// ---------------------------------------------------------------------
// Units (public input)
// ---------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum UnitSpec {
    Container {
        length: f64,
        width: f64,
        height: f64,
        max_payload: f64,
    },
    Vehicle {
        length: f64,
        width: f64,
        height: f64,
        gvw: f64,
        axle_positions: Vec<f64>,
        curb_axle_loads: Vec<f64>,
        wheel_type: WheelType,
        track_width_front: f64,
        track_width_rear: f64,
        cg_height_empty: f64,
    },
    Articulated {
        length: f64,
        width: f64,
        height: f64,
        gvw: f64,
        axle_positions: Vec<f64>,
        curb_axle_loads: Vec<f64>,
        wheel_type: WheelType,
        track_width_front: f64,
        track_width_rear: f64,
        cg_height_empty: f64,
        saddle_position_x: f64,
        saddle_height: f64,
        kingpin_setback: f64,
        tractor_curb_weight: f64,
        trailer_curb_weight: f64,
    },
}

fn validate_axle_geometry(
    length: f64,
    axle_positions: &[f64],
    curb_axle_loads: &[f64],
    track_width_front: f64,
    track_width_rear: f64,
) -> Result<(), PackingError> {
    if axle_positions.is_empty() {
        return Err(PackingError::AxleArrayLengthMismatch { axles: 0, positions: 0 });
    }
    if axle_positions.len() != curb_axle_loads.len() {
        return Err(PackingError::AxleArrayLengthMismatch {
            axles: axle_positions.len(),
            positions: curb_axle_loads.len(),
        });
    }
    if !axle_positions.windows(2).all(|pair| pair[1] > pair[0]) {
        return Err(PackingError::AxlePositionsNotIncreasing);
    }
    if axle_positions.iter().any(|&p| p < 0.0 || p > length) {
        return Err(PackingError::AxlePositionsNotIncreasing);
    }
    validate_dimension(track_width_front, "track_width_front")
        .map_err(|_| PackingError::NonPositiveTrackWidth { field: "track_width_front".into() })?;
    validate_dimension(track_width_rear, "track_width_rear")
        .map_err(|_| PackingError::NonPositiveTrackWidth { field: "track_width_rear".into() })?;
    Ok(())
}

impl UnitSpec {
    pub fn container(length: f64, width: f64, height: f64, max_payload: f64) -> Result<Self, PackingError> {
        validate_dimension(length, "length")?;
        validate_dimension(width, "width")?;
        validate_dimension(height, "height")?;
        validate_weight(max_payload, "max_payload")?;
        Ok(UnitSpec::Container { length, width, height, max_payload })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn vehicle(
        length: f64,
        width: f64,
        height: f64,
        gvw: f64,
        axle_positions: Vec<f64>,
        curb_axle_loads: Vec<f64>,
        wheel_type: WheelType,
        track_width_front: f64,
        track_width_rear: f64,
        cg_height_empty: f64,
    ) -> Result<Self, PackingError> {
        validate_dimension(length, "length")?;
        validate_dimension(width, "width")?;
        validate_dimension(height, "height")?;
        validate_weight(gvw, "gvw")?;
        validate_axle_geometry(length, &axle_positions, &curb_axle_loads, track_width_front, track_width_rear)?;
        Ok(UnitSpec::Vehicle {
            length,
            width,
            height,
            gvw,
            axle_positions,
            curb_axle_loads,
            wheel_type,
            track_width_front,
            track_width_rear,
            cg_height_empty,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn articulated(
        length: f64,
        width: f64,
        height: f64,
        gvw: f64,
        axle_positions: Vec<f64>,
        curb_axle_loads: Vec<f64>,
        wheel_type: WheelType,
        track_width_front: f64,
        track_width_rear: f64,
        cg_height_empty: f64,
        saddle_position_x: f64,
        saddle_height: f64,
        kingpin_setback: f64,
        tractor_curb_weight: f64,
        trailer_curb_weight: f64,
    ) -> Result<Self, PackingError> {
        validate_dimension(length, "length")?;
        validate_dimension(width, "width")?;
        validate_dimension(height, "height")?;
        validate_weight(gvw, "gvw")?;
        validate_axle_geometry(length, &axle_positions, &curb_axle_loads, track_width_front, track_width_rear)?;
        if !(saddle_position_x > 0.0 && saddle_position_x < length) {
            return Err(PackingError::SaddleOutOfRange { saddle_position_x, length });
        }
        let has_tractor_axle = axle_positions.iter().any(|&p| p <= saddle_position_x);
        let has_trailer_axle = axle_positions.iter().any(|&p| p > saddle_position_x);
        if !has_tractor_axle || !has_trailer_axle {
            return Err(PackingError::NoAxleOnOneSaddleSide);
        }
        validate_weight(tractor_curb_weight, "tractor_curb_weight")?;
        validate_weight(trailer_curb_weight, "trailer_curb_weight")?;
        Ok(UnitSpec::Articulated {
            length,
            width,
            height,
            gvw,
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
        })
    }

    pub fn dims(&self) -> (f64, f64, f64) {
        match self {
            UnitSpec::Container { length, width, height, .. }
            | UnitSpec::Vehicle { length, width, height, .. }
            | UnitSpec::Articulated { length, width, height, .. } => (*length, *width, *height),
        }
    }

    pub fn max_weight(&self) -> f64 {
        match self {
            UnitSpec::Container { max_payload, .. } => *max_payload,
            UnitSpec::Vehicle { gvw, .. } | UnitSpec::Articulated { gvw, .. } => *gvw,
        }
    }

    pub fn is_vehicle(&self) -> bool {
        !matches!(self, UnitSpec::Container { .. })
    }
}

// ---------------------------------------------------------------------
// Internal decimal-domain representation
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct EffectiveConstraints {
    pub allowed_orientations: Option<Vec<Vec3>>,
    pub max_stack_height: Option<HighPrecision>,
    pub max_stack_layers: Option<u32>,
    pub max_stack_load: Option<HighPrecision>,
    pub pallet_packing_mode: PalletPackingMode,
}

impl EffectiveConstraints {
    fn from_spec(spec: &ConstraintsSpec) -> Self {
        EffectiveConstraints {
            allowed_orientations: spec.allowed_orientations.as_ref().map(|list| {
                list.iter().map(|&(x, y, z)| Vec3::from_f64(x, y, z)).collect()
            }),
            max_stack_height: spec.max_stack_height.map(HighPrecision::from_f64),
            max_stack_layers: spec.max_stack_layers,
            max_stack_load: spec.max_stack_load.map(HighPrecision::from_f64),
            pallet_packing_mode: spec.pallet_packing_mode.unwrap_or_default(),
        }
    }

    /// Intersects this record with a pallet's physical limits (§4.2 step 4).
    pub fn intersect_with_pallet(&self, pallet: &PalletSpec) -> Self {
        let pallet_load = HighPrecision::from_f64(pallet.max_weight);
        let pallet_height = HighPrecision::from_f64(pallet.cargo_height + pallet.depth);
        EffectiveConstraints {
            allowed_orientations: self.allowed_orientations.clone(),
            max_stack_height: Some(match self.max_stack_height {
                Some(h) => h.min(pallet_height),
                None => pallet_height,
            }),
            max_stack_layers: self.max_stack_layers,
            max_stack_load: Some(match self.max_stack_load {
                Some(w) => w.min(pallet_load),
                None => pallet_load,
            }),
            pallet_packing_mode: self.pallet_packing_mode,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PalletManifest {
    pub pallet: PalletSpec,
    pub inner_item_name: String,
    pub piece_weight: HighPrecision,
    pub pieces: u32,
    pub items_per_layer: u32,
    pub layers: u32,
}

#[derive(Clone, Debug)]
pub enum Shape {
    Box { l: HighPrecision, w: HighPrecision, h: HighPrecision },
    Cylinder { d: HighPrecision, h: HighPrecision },
    MetaPallet { l: HighPrecision, w: HighPrecision, h: HighPrecision, manifest: Box<PalletManifest> },
}

impl Shape {
    pub fn from_spec(spec: ShapeSpec) -> Self {
        match spec {
            ShapeSpec::Box { l, w, h } => Shape::Box {
                l: HighPrecision::from_f64(l),
                w: HighPrecision::from_f64(w),
                h: HighPrecision::from_f64(h),
            },
            ShapeSpec::Cylinder { d, h } => Shape::Cylinder {
                d: HighPrecision::from_f64(d),
                h: HighPrecision::from_f64(h),
            },
        }
    }
}

/// A single physical instance to be placed: one template expands into
/// `piece_count` of these (§3 Lifecycle).
#[derive(Clone, Debug)]
pub struct Item {
    pub name: String,
    pub color: Option<String>,
    pub shape: Shape,
    pub weight: HighPrecision,
    pub orientation_default: Option<OrientationHint>,
    pub constraints: EffectiveConstraints,
}

impl Item {
    pub fn from_spec_piece(spec: &ItemSpec) -> Self {
        Item {
            name: spec.name.clone(),
            color: spec.color.clone(),
            shape: Shape::from_spec(spec.shape),
            weight: HighPrecision::from_f64(spec.piece_weight_kg),
            orientation_default: spec.orientation_default,
            constraints: EffectiveConstraints::from_spec(&spec.constraints),
        }
    }

    /// Expands a template into `piece_count` identical instances (§4.8 step 1).
    pub fn expand(spec: &ItemSpec) -> Vec<Item> {
        (0..spec.piece_count).map(|_| Item::from_spec_piece(spec)).collect()
    }

    pub fn is_horizontal_cylinder(&self) -> bool {
        matches!(self.shape, Shape::Cylinder { .. }) && self.orientation_default == Some(OrientationHint::Horizontal)
    }

    pub fn volume(&self) -> HighPrecision {
        match &self.shape {
            Shape::Box { l, w, h } => *l * *w * *h,
            Shape::Cylinder { d, h } => {
                let r = *d / HighPrecision::from_f64(2.0);
                HighPrecision::from_f64(std::f64::consts::PI) * r * r * *h
            }
            Shape::MetaPallet { l, w, h, .. } => *l * *w * *h,
        }
    }
}

/// Ordered candidate orientations for an item (§4.3). Earlier entries have
/// priority in the position search.
pub fn enumerate_orientations(item: &Item) -> Vec<Vec3> {
    if let Some(whitelist) = &item.constraints.allowed_orientations {
        return whitelist.clone();
    }
    match &item.shape {
        Shape::Box { l, w, h } => {
            let stable = Vec3::new(*l, *w, *h);
            let mut rest = vec![
                Vec3::new(*l, *h, *w),
                Vec3::new(*w, *l, *h),
                Vec3::new(*w, *h, *l),
                Vec3::new(*h, *l, *w),
                Vec3::new(*h, *w, *l),
            ];
            rest.retain(|candidate| {
                !(candidate.x == stable.x && candidate.y == stable.y && candidate.z == stable.z)
            });
            dedup_orientations(&mut rest);
            let mut all = vec![stable];
            all.extend(rest);
            all
        }
        Shape::Cylinder { d, h } => {
            let vertical = Vec3::new(*d, *d, *h);
            let horizontal_a = Vec3::new(*h, *d, *d);
            let horizontal_b = Vec3::new(*d, *h, *d);
            match item.orientation_default {
                Some(OrientationHint::Horizontal) => vec![horizontal_a, horizontal_b, vertical],
                _ => vec![vertical, horizontal_a, horizontal_b],
            }
        }
        Shape::MetaPallet { l, w, h, .. } => vec![Vec3::new(*l, *w, *h)],
    }
}

fn dedup_orientations(candidates: &mut Vec<Vec3>) {
    let mut seen: Vec<Vec3> = Vec::new();
    candidates.retain(|candidate| {
        let is_dup = seen.iter().any(|s| s.x == candidate.x && s.y == candidate.y && s.z == candidate.z);
        if !is_dup {
            seen.push(*candidate);
        }
        !is_dup
    });
}

/// A committed placement inside one unit.
#[derive(Clone, Debug)]
pub struct Placement {
    pub item_name: String,
    pub color: Option<String>,
    pub weight: HighPrecision,
    pub position: Vec3,
    pub dims: Vec3,
    pub constraints: EffectiveConstraints,
}

impl Dimensional for Placement {
    fn dims(&self) -> Vec3 {
        self.dims
    }
}

impl Positioned for Placement {
    fn position(&self) -> Vec3 {
        self.position
    }
}

impl Weighted for Placement {
    fn weight(&self) -> HighPrecision {
        self.weight
    }
}

impl Placement {
    pub fn bounding_box(&self) -> crate::geometry::BoundingBox {
        crate::geometry::BoundingBox::from_position_and_dims(self.position, self.dims)
    }

    pub fn centroid(&self) -> Vec3 {
        self.position.add(&Vec3::new(
            self.dims.x / HighPrecision::from_f64(2.0),
            self.dims.y / HighPrecision::from_f64(2.0),
            self.dims.z / HighPrecision::from_f64(2.0),
        ))
    }
}

// ---------------------------------------------------------------------
// External interface: requests and results (§6)
// ---------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackRequest {
    pub items: Vec<ItemSpec>,
    pub unit_catalog: Vec<UnitSpec>,
    pub curb_weight_override: Option<f64>,
    #[serde(default)]
    pub packing_priority: PackingPriority,
    #[serde(default)]
    pub packing_mode: PackingMode,
    #[serde(default)]
    pub base_then_top: bool,
    #[serde(default)]
    pub tolerance_percent: f64,
}

impl PackRequest {
    pub fn new(
        items: Vec<ItemSpec>,
        unit_catalog: Vec<UnitSpec>,
        curb_weight_override: Option<f64>,
        packing_priority: PackingPriority,
        packing_mode: PackingMode,
        base_then_top: bool,
        tolerance_percent: f64,
    ) -> Result<Self, PackingError> {
        if unit_catalog.is_empty() {
            return Err(PackingError::EmptyUnitCatalog);
        }
        Ok(PackRequest {
            items,
            unit_catalog,
            curb_weight_override,
            packing_priority,
            packing_mode,
            base_then_top,
            tolerance_percent,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementResult {
    pub item_name: String,
    pub position_xyz: (f64, f64, f64),
    pub dims_xyz: (f64, f64, f64),
    pub weight: f64,
}

impl PlacementResult {
    pub fn from_placement(placement: &Placement) -> Self {
        PlacementResult {
            item_name: placement.item_name.clone(),
            position_xyz: placement.position.as_f64_tuple(),
            dims_xyz: placement.dims.as_f64_tuple(),
            weight: placement.weight.to_f64(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceReason {
    Compliant,
    GvwExceeded,
    AxleExceeded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AxleReport {
    pub load_kg: f64,
    pub limit_kg: f64,
    pub deviation_kg: f64,
    pub deviation_percent: f64,
    pub exceeded: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WheelLoadReport {
    pub axle_idx: usize,
    pub left_kg: f64,
    pub right_kg: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub is_compliant: bool,
    pub reason: ComplianceReason,
    pub per_axle: Vec<AxleReport>,
    pub wheel_loads: Option<Vec<WheelLoadReport>>,
    pub cg_cargo_xyz: (f64, f64, f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnpackedReason {
    ItemOversized,
    PlacementFailed,
    ComplianceViolation,
    PalletCapacityExceeded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnpackedItem {
    pub item: ItemSpec,
    pub reason: UnpackedReason,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitResult {
    pub unit_spec: UnitSpec,
    pub placements: Vec<PlacementResult>,
    pub cargo_weight: f64,
    pub compliance: Option<ComplianceReport>,
    pub notices: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackResult {
    pub units: Vec<UnitResult>,
    pub unpacked: Vec<UnpackedItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_spec_rejects_non_positive_dimension() {
        let err = ItemSpec::new(
            "crate",
            None,
            ShapeSpec::Box { l: 0.0, w: 1.0, h: 1.0 },
            10.0,
            1,
            None,
            false,
            None,
            ConstraintsSpec::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PackingError::NonPositiveDimension { .. }));
    }

    #[test]
    fn item_spec_rejects_oversized_pallet_item() {
        let pallet = PalletSpec::new(1.2, 0.8, 1.5, 0.15, 1500.0, 20.0).unwrap();
        let err = ItemSpec::new(
            "too_big",
            None,
            ShapeSpec::Box { l: 2.0, w: 2.0, h: 2.0 },
            10.0,
            1,
            None,
            true,
            Some(pallet),
            ConstraintsSpec::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PackingError::ItemExceedsPalletCapacity { .. }));
    }

    #[test]
    fn vehicle_requires_strictly_increasing_axle_positions() {
        let err = UnitSpec::vehicle(
            10.0, 2.5, 2.5, 20000.0,
            vec![1.0, 1.0],
            vec![1000.0, 1000.0],
            WheelType::Dual,
            2.0, 2.0, 1.0,
        )
        .unwrap_err();
        assert!(matches!(err, PackingError::AxlePositionsNotIncreasing));
    }

    #[test]
    fn articulated_requires_axle_on_each_saddle_side() {
        let err = UnitSpec::articulated(
            16.0, 2.5, 2.7, 40000.0,
            vec![8.5, 9.0, 10.0],
            vec![3000.0, 3000.0, 3000.0],
            WheelType::Dual,
            2.0, 1.8, 1.0,
            8.0, 1.1, 0.3, 7000.0, 6000.0,
        )
        .unwrap_err();
        assert!(matches!(err, PackingError::NoAxleOnOneSaddleSide));
    }

    #[test]
    fn box_orientations_include_stable_first_and_are_deduplicated() {
        let item = Item {
            name: "cube".into(),
            color: None,
            shape: Shape::Box {
                l: HighPrecision::from_f64(1.0),
                w: HighPrecision::from_f64(1.0),
                h: HighPrecision::from_f64(2.0),
            },
            weight: HighPrecision::from_f64(10.0),
            orientation_default: None,
            constraints: EffectiveConstraints::from_spec(&ConstraintsSpec::default()),
        };
        let orientations = enumerate_orientations(&item);
        assert_eq!(orientations[0], Vec3::from_f64(1.0, 1.0, 2.0));
        assert!(orientations.len() <= 6);
    }

    #[test]
    fn cylinder_orientation_respects_horizontal_hint() {
        let item = Item {
            name: "roll".into(),
            color: None,
            shape: Shape::Cylinder { d: HighPrecision::from_f64(0.5), h: HighPrecision::from_f64(1.0) },
            weight: HighPrecision::from_f64(10.0),
            orientation_default: Some(OrientationHint::Horizontal),
            constraints: EffectiveConstraints::from_spec(&ConstraintsSpec::default()),
        };
        let orientations = enumerate_orientations(&item);
        assert_eq!(orientations[0], Vec3::from_f64(1.0, 0.5, 0.5));
    }
}
