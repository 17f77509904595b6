//! The inventory graph: an arena of item nodes linked by parent ids.
//!
//! Items form trees hanging off a handful of synthetic roots (equipment,
//! stash, ...). Edges are plain [`ItemId`] references resolved through an
//! id index; nothing holds a pointer into the arena. Every mutation keeps
//! two invariants:
//!
//! 1. item ids are unique within the graph;
//! 2. every non-root item's `parent_id` resolves to a node of the same graph.
//!
//! Removal therefore always takes a whole subtree, and re-parenting
//! refuses to create cycles.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::EquipmentSlot;
use crate::ids::{ItemId, TemplateId};

/// Template id of the synthetic equipment root.
pub const EQUIPMENT_ROOT_TEMPLATE: &str = "inventory.equipment";
/// Template id of the synthetic stash root.
pub const STASH_ROOT_TEMPLATE: &str = "inventory.stash";
/// Template id of the synthetic quest-raid-items root.
pub const QUEST_RAID_ROOT_TEMPLATE: &str = "inventory.quest_raid_items";
/// Template id of the synthetic sorting-table root.
pub const SORTING_TABLE_ROOT_TEMPLATE: &str = "inventory.sorting_table";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural violations rejected by [`InventoryGraph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An item with this id is already present.
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),

    /// The referenced parent does not exist in the graph.
    #[error("item {item} references missing parent {parent}")]
    MissingParent {
        /// The item being inserted or moved.
        item: ItemId,
        /// The unresolved parent id.
        parent: ItemId,
    },

    /// A non-root item was supplied without a parent.
    #[error("item {0} has no parent")]
    Orphan(ItemId),

    /// The requested item does not exist.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// Roots cannot be removed or moved.
    #[error("item {0} is a graph root")]
    RootItem(ItemId),

    /// Placing the item under the target would create a cycle.
    #[error("placing {item} under {target} would create a cycle")]
    Cycle {
        /// The item being moved or inserted.
        item: ItemId,
        /// The parent that closes the loop.
        target: ItemId,
    },
}

// ---------------------------------------------------------------------------
// Item nodes
// ---------------------------------------------------------------------------

/// Position of an item inside a container grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLocation {
    /// Column of the top-left cell.
    pub x: u32,
    /// Row of the top-left cell.
    pub y: u32,
    /// Whether the footprint is rotated by 90 degrees.
    pub rotated: bool,
}

/// Current and maximum durability of a degradable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durability {
    /// Current durability.
    pub current: u32,
    /// Maximum durability after repairs.
    pub max: u32,
}

/// Mutable per-instance properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProperties {
    /// Number of units in the stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_count: Option<u32>,
    /// Durability for armor and weapons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<Durability>,
    /// Free-form tags (e.g. side of a dog tag).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Marks loot generated for the current raid.
    #[serde(default)]
    pub spawned_in_session: bool,
}

/// A node in an [`InventoryGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique id within the graph.
    pub id: ItemId,
    /// Catalog template.
    pub tpl: TemplateId,
    /// Owning item; `None` only for graph roots.
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    /// Socket or grid of the parent this item occupies.
    #[serde(default)]
    pub slot_id: Option<String>,
    /// Grid position when stored in a container grid.
    #[serde(default)]
    pub location: Option<ItemLocation>,
    /// Per-instance properties.
    #[serde(default)]
    pub props: ItemProperties,
}

impl InventoryItem {
    /// Create an item without parent, slot or properties.
    pub fn new(id: ItemId, tpl: TemplateId) -> Self {
        Self {
            id,
            tpl,
            parent_id: None,
            slot_id: None,
            location: None,
            props: ItemProperties::default(),
        }
    }

    /// Create an item attached to `parent` at `slot`.
    pub fn child_of(id: ItemId, tpl: TemplateId, parent: ItemId, slot: &str) -> Self {
        Self {
            id,
            tpl,
            parent_id: Some(parent),
            slot_id: Some(String::from(slot)),
            location: None,
            props: ItemProperties::default(),
        }
    }

    /// Builder-style stack count setter.
    #[must_use]
    pub const fn with_stack(mut self, count: u32) -> Self {
        self.props.stack_count = Some(count);
        self
    }

    /// Stack count, defaulting to one.
    pub fn stack_count(&self) -> u32 {
        self.props.stack_count.unwrap_or(1)
    }
}

// ---------------------------------------------------------------------------
// Roots
// ---------------------------------------------------------------------------

/// Ids of the synthetic root nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRoots {
    /// Parent of all worn gear.
    pub equipment: ItemId,
    /// Parent of stored items.
    pub stash: ItemId,
    /// Parent of quest items picked up during a raid.
    pub quest_raid_items: ItemId,
    /// Parent of items on the sorting table.
    pub sorting_table: ItemId,
}

impl InventoryRoots {
    fn nodes(self) -> [InventoryItem; 4] {
        [
            InventoryItem::new(self.equipment, TemplateId::from(EQUIPMENT_ROOT_TEMPLATE)),
            InventoryItem::new(self.stash, TemplateId::from(STASH_ROOT_TEMPLATE)),
            InventoryItem::new(
                self.quest_raid_items,
                TemplateId::from(QUEST_RAID_ROOT_TEMPLATE),
            ),
            InventoryItem::new(self.sorting_table, TemplateId::from(SORTING_TABLE_ROOT_TEMPLATE)),
        ]
    }

    fn contains(self, id: ItemId) -> bool {
        self.equipment == id
            || self.stash == id
            || self.quest_raid_items == id
            || self.sorting_table == id
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Serialized form: roots plus a flat item list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InventoryRepr {
    roots: InventoryRoots,
    items: Vec<InventoryItem>,
}

/// Arena of inventory items indexed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InventoryRepr", into = "InventoryRepr")]
pub struct InventoryGraph {
    roots: InventoryRoots,
    items: Vec<InventoryItem>,
    index: BTreeMap<ItemId, usize>,
}

impl TryFrom<InventoryRepr> for InventoryGraph {
    type Error = GraphError;

    fn try_from(repr: InventoryRepr) -> Result<Self, Self::Error> {
        let mut graph = Self {
            roots: repr.roots,
            items: Vec::new(),
            index: BTreeMap::new(),
        };
        let non_roots: Vec<InventoryItem> = repr
            .items
            .into_iter()
            .filter(|item| !repr.roots.contains(item.id))
            .collect();
        for root in repr.roots.nodes() {
            graph.push_unchecked(root);
        }
        graph.add_tree(non_roots)?;
        Ok(graph)
    }
}

impl From<InventoryGraph> for InventoryRepr {
    fn from(graph: InventoryGraph) -> Self {
        Self {
            roots: graph.roots,
            items: graph.items,
        }
    }
}

impl InventoryGraph {
    /// Create a graph holding only the four root nodes.
    pub fn new(roots: InventoryRoots) -> Self {
        let mut graph = Self {
            roots,
            items: Vec::new(),
            index: BTreeMap::new(),
        };
        for root in roots.nodes() {
            graph.push_unchecked(root);
        }
        graph
    }

    fn push_unchecked(&mut self, item: InventoryItem) {
        self.index.insert(item.id, self.items.len());
        self.items.push(item);
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id, pos))
            .collect();
    }

    /// Root ids.
    pub const fn roots(&self) -> InventoryRoots {
        self.roots
    }

    /// Id of the equipment root.
    pub const fn equipment_id(&self) -> ItemId {
        self.roots.equipment
    }

    /// Whether `id` is one of the synthetic roots.
    pub fn is_root(&self, id: ItemId) -> bool {
        self.roots.contains(id)
    }

    /// Number of nodes, roots included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the graph holds only its roots.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| self.roots.contains(item.id))
    }

    /// Iterate all nodes in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter()
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up a node.
    pub fn get(&self, id: ItemId) -> Option<&InventoryItem> {
        self.index.get(&id).and_then(|&pos| self.items.get(pos))
    }

    /// Look up a node mutably. Structural fields must not be changed
    /// through this reference; use [`Self::reparent`] instead.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut InventoryItem> {
        let pos = *self.index.get(&id)?;
        self.items.get_mut(pos)
    }

    /// Direct children of `parent`.
    pub fn children(&self, parent: ItemId) -> impl Iterator<Item = &InventoryItem> {
        self.items
            .iter()
            .filter(move |item| item.parent_id == Some(parent))
    }

    /// Child of `parent` occupying `slot`.
    pub fn child_in_slot(&self, parent: ItemId, slot: &str) -> Option<&InventoryItem> {
        self.children(parent)
            .find(|item| item.slot_id.as_deref() == Some(slot))
    }

    /// Item worn in an equipment slot.
    pub fn equipped(&self, slot: EquipmentSlot) -> Option<&InventoryItem> {
        self.child_in_slot(self.roots.equipment, slot.as_str())
    }

    /// Ids of `id` and every node below it, parents before children.
    pub fn subtree_ids(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut frontier = vec![id];
        while let Some(next) = frontier.pop() {
            out.push(next);
            frontier.extend(self.children(next).map(|child| child.id));
        }
        out
    }

    /// Insert a single item whose parent is already present.
    pub fn add(&mut self, item: InventoryItem) -> Result<(), GraphError> {
        if self.contains(item.id) {
            return Err(GraphError::DuplicateId(item.id));
        }
        let parent = item.parent_id.ok_or(GraphError::Orphan(item.id))?;
        if !self.contains(parent) {
            return Err(GraphError::MissingParent {
                item: item.id,
                parent,
            });
        }
        self.push_unchecked(item);
        Ok(())
    }

    /// Insert a batch of items atomically. Parents may live in the graph
    /// or anywhere in the batch; on any violation nothing is inserted.
    pub fn add_tree(&mut self, items: Vec<InventoryItem>) -> Result<(), GraphError> {
        let mut batch_ids = BTreeSet::new();
        for item in &items {
            if self.contains(item.id) || !batch_ids.insert(item.id) {
                return Err(GraphError::DuplicateId(item.id));
            }
        }
        for item in &items {
            let parent = item.parent_id.ok_or(GraphError::Orphan(item.id))?;
            if !self.contains(parent) && !batch_ids.contains(&parent) {
                return Err(GraphError::MissingParent {
                    item: item.id,
                    parent,
                });
            }
        }
        // Every batch item must hang, possibly through other batch items,
        // from something already in the graph.
        let mut anchored = BTreeSet::new();
        loop {
            let before = anchored.len();
            for item in &items {
                let hangs = item
                    .parent_id
                    .is_some_and(|parent| !batch_ids.contains(&parent) || anchored.contains(&parent));
                if hangs {
                    anchored.insert(item.id);
                }
            }
            if anchored.len() == before {
                break;
            }
        }
        if let Some(item) = items.iter().find(|item| !anchored.contains(&item.id)) {
            return Err(GraphError::Cycle {
                item: item.id,
                target: item.parent_id.unwrap_or(item.id),
            });
        }
        for item in items {
            self.push_unchecked(item);
        }
        Ok(())
    }

    /// Remove an item together with everything attached to it.
    pub fn remove_subtree(&mut self, id: ItemId) -> Result<Vec<InventoryItem>, GraphError> {
        if self.roots.contains(id) {
            return Err(GraphError::RootItem(id));
        }
        if !self.contains(id) {
            return Err(GraphError::ItemNotFound(id));
        }
        let doomed: BTreeSet<ItemId> = self.subtree_ids(id).into_iter().collect();
        let (removed, kept): (Vec<_>, Vec<_>) = core::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| doomed.contains(&item.id));
        self.items = kept;
        self.reindex();
        Ok(removed)
    }

    /// Move an item (with its subtree) under a new parent.
    pub fn reparent(
        &mut self,
        id: ItemId,
        new_parent: ItemId,
        slot_id: Option<String>,
        location: Option<ItemLocation>,
    ) -> Result<(), GraphError> {
        if self.roots.contains(id) {
            return Err(GraphError::RootItem(id));
        }
        if !self.contains(new_parent) {
            return Err(GraphError::MissingParent {
                item: id,
                parent: new_parent,
            });
        }
        if self.subtree_ids(id).contains(&new_parent) {
            return Err(GraphError::Cycle {
                item: id,
                target: new_parent,
            });
        }
        let item = self.get_mut(id).ok_or(GraphError::ItemNotFound(id))?;
        item.parent_id = Some(new_parent);
        item.slot_id = slot_id;
        item.location = location;
        Ok(())
    }

    /// Check both structural invariants over the whole graph.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut seen = BTreeSet::new();
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(GraphError::DuplicateId(item.id));
            }
        }
        for item in &self.items {
            match item.parent_id {
                None if self.roots.contains(item.id) => {}
                None => return Err(GraphError::Orphan(item.id)),
                Some(parent) if !seen.contains(&parent) => {
                    return Err(GraphError::MissingParent {
                        item: item.id,
                        parent,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> InventoryRoots {
        InventoryRoots {
            equipment: ItemId::new(),
            stash: ItemId::new(),
            quest_raid_items: ItemId::new(),
            sorting_table: ItemId::new(),
        }
    }

    fn tpl(name: &str) -> TemplateId {
        TemplateId::from(name)
    }

    #[test]
    fn new_graph_has_only_roots() {
        let graph = InventoryGraph::new(roots());
        assert_eq!(graph.len(), 4);
        assert!(graph.is_empty());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn add_rejects_duplicates_and_orphans() {
        let mut graph = InventoryGraph::new(roots());
        let vest = InventoryItem::child_of(ItemId::new(), tpl("rig"), graph.equipment_id(), "TacticalVest");
        assert!(graph.add(vest.clone()).is_ok());
        assert_eq!(graph.add(vest.clone()), Err(GraphError::DuplicateId(vest.id)));

        let orphan = InventoryItem::new(ItemId::new(), tpl("bandage"));
        assert_eq!(graph.add(orphan.clone()), Err(GraphError::Orphan(orphan.id)));

        let dangling = InventoryItem::child_of(ItemId::new(), tpl("bandage"), ItemId::new(), "main");
        assert!(matches!(graph.add(dangling), Err(GraphError::MissingParent { .. })));
    }

    #[test]
    fn add_tree_accepts_parents_within_batch() {
        let mut graph = InventoryGraph::new(roots());
        let gun = InventoryItem::child_of(ItemId::new(), tpl("ak74"), graph.equipment_id(), "FirstPrimaryWeapon");
        let mag = InventoryItem::child_of(ItemId::new(), tpl("mag"), gun.id, "mod_magazine");
        // Child listed before its parent on purpose.
        assert!(graph.add_tree(vec![mag.clone(), gun.clone()]).is_ok());
        assert_eq!(graph.child_in_slot(gun.id, "mod_magazine").map(|i| i.id), Some(mag.id));
        assert_eq!(graph.equipped(EquipmentSlot::FirstPrimaryWeapon).map(|i| i.id), Some(gun.id));
    }

    #[test]
    fn add_tree_is_atomic() {
        let mut graph = InventoryGraph::new(roots());
        let gun = InventoryItem::child_of(ItemId::new(), tpl("ak74"), graph.equipment_id(), "Holster");
        let bad = InventoryItem::child_of(ItemId::new(), tpl("mag"), ItemId::new(), "mod_magazine");
        assert!(graph.add_tree(vec![gun, bad]).is_err());
        assert!(graph.is_empty());
    }

    #[test]
    fn remove_subtree_keeps_parent_closure() {
        let mut graph = InventoryGraph::new(roots());
        let bag = InventoryItem::child_of(ItemId::new(), tpl("bag"), graph.equipment_id(), "Backpack");
        let boxed = InventoryItem::child_of(ItemId::new(), tpl("ammo_box"), bag.id, "main");
        let rounds = InventoryItem::child_of(ItemId::new(), tpl("ps"), boxed.id, "cartridges");
        let bag_id = bag.id;
        assert!(graph.add_tree(vec![bag, boxed, rounds]).is_ok());

        let removed = graph.remove_subtree(bag_id);
        assert_eq!(removed.map(|r| r.len()).ok(), Some(3));
        assert!(graph.is_empty());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn roots_cannot_be_removed() {
        let mut graph = InventoryGraph::new(roots());
        let eq = graph.equipment_id();
        assert_eq!(graph.remove_subtree(eq), Err(GraphError::RootItem(eq)));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut graph = InventoryGraph::new(roots());
        let bag = InventoryItem::child_of(ItemId::new(), tpl("bag"), graph.equipment_id(), "Backpack");
        let pouch = InventoryItem::child_of(ItemId::new(), tpl("pouch"), bag.id, "main");
        let (bag_id, pouch_id) = (bag.id, pouch.id);
        assert!(graph.add_tree(vec![bag, pouch]).is_ok());

        assert!(matches!(
            graph.reparent(bag_id, pouch_id, Some(String::from("main")), None),
            Err(GraphError::Cycle { .. })
        ));
        let stash = graph.roots().stash;
        assert!(graph.reparent(pouch_id, stash, Some(String::from("hideout")), None).is_ok());
        assert_eq!(graph.get(pouch_id).and_then(|i| i.parent_id), Some(stash));
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn add_tree_rejects_detached_loops() {
        let mut graph = InventoryGraph::new(roots());
        let (a, b) = (ItemId::new(), ItemId::new());
        let first = InventoryItem::child_of(a, tpl("pouch"), b, "main");
        let second = InventoryItem::child_of(b, tpl("pouch"), a, "main");
        assert!(matches!(
            graph.add_tree(vec![first, second]),
            Err(GraphError::Cycle { .. })
        ));
        assert!(graph.is_empty());

        let selfish = InventoryItem::child_of(a, tpl("pouch"), a, "main");
        assert!(matches!(graph.add_tree(vec![selfish]), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn deserialize_rejects_cyclic_items() {
        let graph = InventoryGraph::new(roots());
        let mut repr = InventoryRepr::from(graph);
        let (a, b) = (ItemId::new(), ItemId::new());
        repr.items.push(InventoryItem::child_of(a, tpl("pouch"), b, "main"));
        repr.items.push(InventoryItem::child_of(b, tpl("pouch"), a, "main"));

        let json = serde_json::to_string(&repr).ok();
        let restored = json
            .as_deref()
            .map(serde_json::from_str::<InventoryGraph>);
        assert!(matches!(restored, Some(Err(_))));
        assert!(InventoryGraph::try_from(repr).is_err());
    }

    #[test]
    fn serde_roundtrip_rebuilds_index() {
        let mut graph = InventoryGraph::new(roots());
        let vest = InventoryItem::child_of(ItemId::new(), tpl("rig"), graph.equipment_id(), "TacticalVest")
            .with_stack(1);
        let vest_id = vest.id;
        assert!(graph.add(vest).is_ok());

        let json = serde_json::to_string(&graph).ok();
        let restored: Option<InventoryGraph> =
            json.as_deref().and_then(|j| serde_json::from_str(j).ok());
        assert_eq!(restored.as_ref().and_then(|g| g.get(vest_id)).map(|i| i.tpl.clone()), Some(tpl("rig")));
        assert_eq!(restored, Some(graph));
    }
}
