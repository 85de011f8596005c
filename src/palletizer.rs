//! Groups loose items onto pallets with geometrically optimal layer layouts
//! (§4.2).

use crate::geometry::hex_row_spacing_factor;
use crate::model::{EffectiveConstraints, Item, PalletManifest, PalletSpec, Shape};
use crate::numerics::HighPrecision;

/// Rectangular-grid vs hex-staggered layout choice for cylinders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CylinderLayout {
    Grid,
    HexAlongLength,
    HexAlongWidth,
}

fn box_items_per_layer(pallet_l: f64, pallet_w: f64, item_l: f64, item_w: f64) -> u32 {
    let direct = (pallet_l / item_l).floor() as u32 * (pallet_w / item_w).floor() as u32;
    let rotated = (pallet_l / item_w).floor() as u32 * (pallet_w / item_l).floor() as u32;
    direct.max(rotated)
}

fn cylinder_items_per_layer(pallet_l: f64, pallet_w: f64, diameter: f64) -> (u32, CylinderLayout) {
    let grid = ((pallet_l / diameter).floor() as u32) * ((pallet_w / diameter).floor() as u32);

    let row_spacing = diameter * hex_row_spacing_factor().to_f64();
    let cols_along_length = (pallet_l / diameter).floor() as u32;
    let rows_along_length = 1 + ((pallet_w - diameter) / row_spacing).max(0.0).floor() as u32;
    let hex_along_length = cols_along_length * rows_along_length;

    let cols_along_width = (pallet_w / diameter).floor() as u32;
    let rows_along_width = 1 + ((pallet_l - diameter) / row_spacing).max(0.0).floor() as u32;
    let hex_along_width = cols_along_width * rows_along_width;

    let mut best = (grid, CylinderLayout::Grid);
    if hex_along_length > best.0 {
        best = (hex_along_length, CylinderLayout::HexAlongLength);
    }
    if hex_along_width > best.0 {
        best = (hex_along_width, CylinderLayout::HexAlongWidth);
    }
    best
}

/// Computes `items_per_layer` for a given item shape on a given pallet,
/// honoring an explicit (non-automatic) packing mode override for cylinders.
fn items_per_layer_for(shape: &Shape, pallet: &PalletSpec, forced_mode: Option<CylinderLayout>) -> u32 {
    match shape {
        Shape::Box { l, w, .. } => box_items_per_layer(pallet.length, pallet.width, l.to_f64(), w.to_f64()),
        Shape::Cylinder { d, .. } => {
            let diameter = d.to_f64();
            match forced_mode {
                Some(CylinderLayout::Grid) => {
                    ((pallet.length / diameter).floor() as u32) * ((pallet.width / diameter).floor() as u32)
                }
                Some(CylinderLayout::HexAlongLength) | Some(CylinderLayout::HexAlongWidth) | None => {
                    cylinder_items_per_layer(pallet.length, pallet.width, diameter).0
                }
            }
        }
        Shape::MetaPallet { .. } => 0,
    }
}

fn item_height(shape: &Shape) -> HighPrecision {
    match shape {
        Shape::Box { h, .. } => *h,
        Shape::Cylinder { h, .. } => *h,
        Shape::MetaPallet { h, .. } => *h,
    }
}

/// Builds meta-pallet items from a list of identical items (§4.2). Returns
/// `None` when `per_pallet <= 0`, signaling the caller should fall back to
/// packing the items loose.
pub fn palletize(items: &[Item], pallet: &PalletSpec) -> Option<Vec<Item>> {
    let first = items.first()?;
    let total_pieces = items.len() as u32;
    if total_pieces == 0 {
        return Some(Vec::new());
    }

    let forced_mode = match first.constraints.pallet_packing_mode {
        crate::model::PalletPackingMode::Grid => Some(CylinderLayout::Grid),
        crate::model::PalletPackingMode::Staggered => Some(CylinderLayout::HexAlongLength),
        crate::model::PalletPackingMode::Automatic => None,
    };

    let items_per_layer = items_per_layer_for(&first.shape, pallet, forced_mode);
    if items_per_layer == 0 {
        return None;
    }

    let item_h = item_height(&first.shape);
    let layers_by_pallet_h = (HighPrecision::from_f64(pallet.cargo_height) / item_h).floor_to_u64() as u32;
    let layers_by_user_h = first
        .constraints
        .max_stack_height
        .map(|h| (h / item_h).floor_to_u64() as u32)
        .unwrap_or(u32::MAX);
    let layers_by_user_n = first.constraints.max_stack_layers.unwrap_or(u32::MAX);

    let max_layers = layers_by_pallet_h.min(layers_by_user_h).min(layers_by_user_n).max(1);
    let items_by_geometry = items_per_layer.saturating_mul(max_layers);
    let items_by_weight = (HighPrecision::from_f64(pallet.max_weight) / first.weight).floor_to_u64() as u32;
    let per_pallet = items_by_geometry.min(items_by_weight);

    if per_pallet == 0 {
        return None;
    }

    let mut meta_items = Vec::new();
    let mut remaining = total_pieces;
    while remaining > 0 {
        let pieces = remaining.min(per_pallet);
        let layers = ((pieces as f64) / (items_per_layer as f64)).ceil() as u32;
        meta_items.push(build_meta_pallet_item(first, pallet, pieces, layers, items_per_layer));
        remaining -= pieces;
    }
    Some(meta_items)
}

fn build_meta_pallet_item(
    template: &Item,
    pallet: &PalletSpec,
    pieces: u32,
    layers: u32,
    items_per_layer: u32,
) -> Item {
    let item_h = item_height(&template.shape);
    let dims_h = HighPrecision::from_f64(pallet.depth) + item_h * HighPrecision::from_i64(layers as i64);
    let weight = HighPrecision::from_f64(pallet.self_weight)
        + template.weight * HighPrecision::from_i64(pieces as i64);

    let manifest = PalletManifest {
        pallet: pallet.clone(),
        inner_item_name: template.name.clone(),
        piece_weight: template.weight,
        pieces,
        items_per_layer,
        layers,
    };

    let effective_constraints = template.constraints.intersect_with_pallet(pallet);

    Item {
        name: format!("{} (pallet)", template.name),
        color: template.color.clone(),
        shape: Shape::MetaPallet {
            l: HighPrecision::from_f64(pallet.length),
            w: HighPrecision::from_f64(pallet.width),
            h: dims_h,
            manifest: Box::new(manifest),
        },
        weight,
        orientation_default: None,
        constraints: EffectiveConstraints {
            allowed_orientations: None,
            ..effective_constraints
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintsSpec, ItemSpec, ShapeSpec};

    fn euro_pallet() -> PalletSpec {
        // cargo_height = 0.9 caps layers at 3 (0.9 / 0.3), matching S3.
        PalletSpec::new(1.2, 0.8, 0.9, 0.15, 1500.0, 20.0).unwrap()
    }

    fn boxes(count: u32) -> Vec<Item> {
        let spec = ItemSpec::new(
            "crate", None,
            ShapeSpec::Box { l: 0.4, w: 0.3, h: 0.3 },
            5.0, count, None, true, None, ConstraintsSpec::default(),
        )
        .unwrap();
        Item::expand(&spec)
    }

    #[test]
    fn scenario_s3_pallet_grouping() {
        let pallet = euro_pallet();
        let items = boxes(50);
        let meta = palletize(&items, &pallet).expect("should palletize");

        let total_pieces: u32 = meta
            .iter()
            .map(|item| match &item.shape {
                Shape::MetaPallet { manifest, .. } => manifest.pieces,
                _ => unreachable!(),
            })
            .sum();
        assert_eq!(total_pieces, 50);

        let per_layer = match &meta[0].shape {
            Shape::MetaPallet { manifest, .. } => manifest.items_per_layer,
            _ => unreachable!(),
        };
        assert_eq!(per_layer, 8);

        assert_eq!(meta.len(), 3);
        assert_eq!(meta[0].weight.to_f64(), 20.0 + 24.0 * 5.0);
        assert_eq!(meta[1].weight.to_f64(), 20.0 + 24.0 * 5.0);
        assert_eq!(meta[2].weight.to_f64(), 20.0 + 2.0 * 5.0);
    }

    #[test]
    fn falls_back_to_none_when_nothing_fits() {
        let pallet = PalletSpec::new(1.2, 0.8, 1.5, 0.15, 1500.0, 20.0).unwrap();
        let spec = ItemSpec::new(
            "huge", None,
            ShapeSpec::Box { l: 5.0, w: 5.0, h: 5.0 },
            10.0, 1, None, false, None, ConstraintsSpec::default(),
        )
        .unwrap();
        let items = Item::expand(&spec);
        assert!(palletize(&items, &pallet).is_none());
    }
}
