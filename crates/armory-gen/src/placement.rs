//! Grid placement of loose items inside containers.
//!
//! A container template declares one or more rectangular grids. Items
//! stored in a grid carry the grid name as their `slot_id` and a
//! top-left [`ItemLocation`]. Placement scans each grid row by row for the
//! first free rectangle, trying the item's natural orientation before the
//! rotated one.

use armory_types::{
    EquipmentSlot, GraphError, GridProps, InventoryGraph, InventoryItem, ItemId, ItemLocation,
};

use crate::catalog::ItemCatalog;

/// Width and height of an item in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
}

impl Footprint {
    /// Footprint of a template, `1x1` when unknown.
    pub fn of(catalog: &dyn ItemCatalog, item: &InventoryItem) -> Self {
        let (width, height) = catalog
            .lookup(&item.tpl)
            .map_or((1, 1), |t| (t.width.max(1), t.height.max(1)));
        let rotated = item.location.is_some_and(|loc| loc.rotated);
        if rotated {
            Self {
                width: height,
                height: width,
            }
        } else {
            Self { width, height }
        }
    }

    const fn rotated(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Occupancy map of a single grid.
#[derive(Debug, Clone)]
pub struct GridOccupancy {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl GridOccupancy {
    /// An empty grid.
    pub fn new(width: u32, height: u32) -> Self {
        let len = usize::try_from(u64::from(width).saturating_mul(u64::from(height))).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![false; len],
        }
    }

    /// Occupancy of `grid` inside `container`, from the items already
    /// stored there.
    pub fn from_graph(
        inventory: &InventoryGraph,
        container: ItemId,
        grid: &GridProps,
        catalog: &dyn ItemCatalog,
    ) -> Self {
        let mut occupancy = Self::new(grid.width, grid.height);
        for stored in inventory.children(container) {
            if stored.slot_id.as_deref() != Some(grid.name.as_str()) {
                continue;
            }
            let Some(location) = stored.location else {
                continue;
            };
            occupancy.mark(location.x, location.y, Footprint::of(catalog, stored));
        }
        occupancy
    }

    fn cell_index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = u64::from(y)
            .checked_mul(u64::from(self.width))?
            .checked_add(u64::from(x))?;
        usize::try_from(index).ok()
    }

    fn cells_of(&self, x: u32, y: u32, size: Footprint) -> Option<Vec<usize>> {
        let mut out = Vec::new();
        for dy in 0..size.height {
            for dx in 0..size.width {
                let cell = self.cell_index(x.checked_add(dx)?, y.checked_add(dy)?)?;
                out.push(cell);
            }
        }
        Some(out)
    }

    /// Whether `size` fits with its top-left corner at `(x, y)`.
    pub fn fits(&self, x: u32, y: u32, size: Footprint) -> bool {
        self.cells_of(x, y, size).is_some_and(|cells| {
            cells
                .into_iter()
                .all(|cell| self.cells.get(cell).is_some_and(|taken| !taken))
        })
    }

    /// Mark the rectangle as occupied. Cells outside the grid are ignored.
    pub fn mark(&mut self, x: u32, y: u32, size: Footprint) {
        for dy in 0..size.height {
            for dx in 0..size.width {
                let (Some(cx), Some(cy)) = (x.checked_add(dx), y.checked_add(dy)) else {
                    continue;
                };
                if let Some(cell) = self.cell_index(cx, cy).and_then(|i| self.cells.get_mut(i)) {
                    *cell = true;
                }
            }
        }
    }

    /// First free position for `size`, scanning rows top to bottom.
    /// Tries the natural orientation over the whole grid before rotating.
    pub fn find_free(&self, size: Footprint) -> Option<ItemLocation> {
        let orientations = if size.width == size.height {
            vec![(size, false)]
        } else {
            vec![(size, false), (size.rotated(), true)]
        };
        for (candidate, rotated) in orientations {
            for y in 0..self.height {
                for x in 0..self.width {
                    if self.fits(x, y, candidate) {
                        return Some(ItemLocation { x, y, rotated });
                    }
                }
            }
        }
        None
    }
}

/// Where an item landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Container the item now lives in.
    pub container: ItemId,
    /// Grid name.
    pub grid: String,
    /// Position in the grid.
    pub location: ItemLocation,
}

/// Ids of the items equipped in `slots`, in order, skipping empty slots.
pub fn equipped_containers(inventory: &InventoryGraph, slots: &[EquipmentSlot]) -> Vec<ItemId> {
    slots
        .iter()
        .filter_map(|&slot| inventory.equipped(slot).map(|item| item.id))
        .collect()
}

/// Find room for an item of `size` in the first container that has any.
pub fn find_placement(
    inventory: &InventoryGraph,
    containers: &[ItemId],
    size: Footprint,
    catalog: &dyn ItemCatalog,
) -> Option<Placement> {
    for &container in containers {
        let Some(template) = inventory
            .get(container)
            .and_then(|item| catalog.lookup(&item.tpl))
        else {
            continue;
        };
        for grid in &template.grids {
            let occupancy = GridOccupancy::from_graph(inventory, container, grid, catalog);
            if let Some(location) = occupancy.find_free(size) {
                return Some(Placement {
                    container,
                    grid: grid.name.clone(),
                    location,
                });
            }
        }
    }
    None
}

/// Place an item tree (root first) into the first container with room.
///
/// The root is re-parented into the chosen grid; children keep their
/// parents. Returns `Ok(None)` when nothing had room.
pub fn place_tree(
    inventory: &mut InventoryGraph,
    mut items: Vec<InventoryItem>,
    containers: &[ItemId],
    catalog: &dyn ItemCatalog,
) -> Result<Option<Placement>, GraphError> {
    let Some(root) = items.first_mut() else {
        return Ok(None);
    };
    root.location = None;
    let size = Footprint::of(catalog, root);
    let Some(placement) = find_placement(inventory, containers, size, catalog) else {
        return Ok(None);
    };
    root.parent_id = Some(placement.container);
    root.slot_id = Some(placement.grid.clone());
    root.location = Some(placement.location);
    inventory.add_tree(items)?;
    Ok(Some(placement))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use armory_types::{InventoryRoots, ItemTemplate, TemplateId};

    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn catalog() -> InMemoryCatalog {
        let mut rig = ItemTemplate::new("rig", "Rig", "class.vest");
        rig.grids = vec![
            GridProps {
                name: String::from("1"),
                width: 1,
                height: 2,
            },
            GridProps {
                name: String::from("2"),
                width: 2,
                height: 2,
            },
        ];
        let mut rifle_box = ItemTemplate::new("long", "Long item", "class.barter");
        rifle_box.width = 2;
        rifle_box.height = 1;
        let mut big = ItemTemplate::new("big", "Big item", "class.barter");
        big.width = 3;
        big.height = 3;
        [rig, rifle_box, big, ItemTemplate::new("small", "Small", "class.barter")]
            .into_iter()
            .collect()
    }

    fn setup() -> (InventoryGraph, ItemId) {
        let mut graph = InventoryGraph::new(InventoryRoots {
            equipment: ItemId::new(),
            stash: ItemId::new(),
            quest_raid_items: ItemId::new(),
            sorting_table: ItemId::new(),
        });
        let rig = ItemId::new();
        graph
            .add(InventoryItem::child_of(
                rig,
                TemplateId::from("rig"),
                graph.equipment_id(),
                "TacticalVest",
            ))
            .unwrap();
        (graph, rig)
    }

    fn loose(tpl: &str) -> Vec<InventoryItem> {
        vec![InventoryItem::new(ItemId::new(), TemplateId::from(tpl))]
    }

    #[test]
    fn fills_first_grid_first() {
        let c = catalog();
        let (mut g, rig) = setup();
        let first = place_tree(&mut g, loose("small"), &[rig], &c).unwrap().unwrap();
        assert_eq!(first.grid, "1");
        assert_eq!((first.location.x, first.location.y), (0, 0));
        let second = place_tree(&mut g, loose("small"), &[rig], &c).unwrap().unwrap();
        assert_eq!((second.grid.as_str(), second.location.y), ("1", 1));
        let third = place_tree(&mut g, loose("small"), &[rig], &c).unwrap().unwrap();
        assert_eq!(third.grid, "2");
    }

    #[test]
    fn rotates_when_only_rotated_fits() {
        let c = catalog();
        let (mut g, rig) = setup();
        // 2x1 fits the 1x2 grid only when rotated.
        let placed = place_tree(&mut g, loose("long"), &[rig], &c).unwrap().unwrap();
        assert_eq!(placed.grid, "1");
        assert!(placed.location.rotated);
    }

    #[test]
    fn too_large_items_do_not_fit() {
        let c = catalog();
        let (mut g, rig) = setup();
        let before = g.len();
        assert!(place_tree(&mut g, loose("big"), &[rig], &c).unwrap().is_none());
        assert_eq!(g.len(), before);
    }

    #[test]
    fn full_container_reports_no_room() {
        let c = catalog();
        let (mut g, rig) = setup();
        for _ in 0..6 {
            assert!(place_tree(&mut g, loose("small"), &[rig], &c).unwrap().is_some());
        }
        assert!(place_tree(&mut g, loose("small"), &[rig], &c).unwrap().is_none());
    }

    #[test]
    fn children_follow_the_root() {
        let c = catalog();
        let (mut g, rig) = setup();
        let root = ItemId::new();
        let child = ItemId::new();
        let items = vec![
            InventoryItem::new(root, TemplateId::from("small")),
            InventoryItem::child_of(child, TemplateId::from("small"), root, "mod"),
        ];
        place_tree(&mut g, items, &[rig], &c).unwrap().unwrap();
        assert_eq!(g.get(root).unwrap().parent_id, Some(rig));
        assert_eq!(g.get(child).unwrap().parent_id, Some(root));
        assert!(g.validate().is_ok());
    }

    #[test]
    fn occupancy_respects_bounds() {
        let grid = GridOccupancy::new(2, 2);
        let one = Footprint { width: 1, height: 1 };
        assert!(grid.fits(1, 1, one));
        assert!(!grid.fits(2, 0, one));
        assert!(!grid.fits(1, 0, Footprint { width: 2, height: 1 }));
    }
}
