//! Resource Tree
//!
//! In-memory cache of collections, sub-collections and items with per-node
//! load state and generation counters. This is the single shared mutable
//! structure; every write is generation-checked.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::{debug, warn};

use crate::models::{
    ChildList, Collection, CollectionId, EntityRef, Item, ItemId, NodeKey, SubCollection, SubCollectionId,
};

pub type Generation = u64;

/// Tree shared by the controllers on the UI thread
pub type SharedTree = Rc<RefCell<ResourceTree>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Default)]
struct Node {
    state: LoadState,
    generation: Generation,
    /// Child ids in backend order
    children: Vec<u32>,
}

/// Read-only view of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub key: NodeKey,
    pub state: LoadState,
    pub generation: Generation,
    pub children: ChildList,
}

/// One display row
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Collection(Collection),
    SubCollection(SubCollection),
    Item(Item),
}

#[derive(Debug)]
pub struct ResourceTree {
    collections: HashMap<CollectionId, Collection>,
    sub_collections: HashMap<SubCollectionId, SubCollection>,
    items: HashMap<ItemId, Item>,
    nodes: HashMap<NodeKey, Node>,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(NodeKey::Root, Node::default());
        Self {
            collections: HashMap::new(),
            sub_collections: HashMap::new(),
            items: HashMap::new(),
            nodes,
        }
    }

    pub fn shared() -> SharedTree {
        Rc::new(RefCell::new(Self::new()))
    }

    // ========================
    // Reads
    // ========================

    /// Whether `key` is a node currently present in the tree
    pub fn knows(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    pub fn contains(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Collection(id) => self.collections.contains_key(&id),
            EntityRef::SubCollection(id) => self.sub_collections.contains_key(&id),
            EntityRef::Item(id) => self.items.contains_key(&id),
        }
    }

    pub fn collection(&self, id: CollectionId) -> Option<&Collection> {
        self.collections.get(&id)
    }

    pub fn sub_collection(&self, id: SubCollectionId) -> Option<&SubCollection> {
        self.sub_collections.get(&id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn load_state(&self, key: NodeKey) -> Option<LoadState> {
        self.nodes.get(&key).map(|n| n.state)
    }

    pub fn generation(&self, key: NodeKey) -> Option<Generation> {
        self.nodes.get(&key).map(|n| n.generation)
    }

    /// Current state and children of `key`
    pub fn snapshot(&self, key: NodeKey) -> Option<NodeSnapshot> {
        let node = self.nodes.get(&key)?;
        Some(NodeSnapshot {
            key,
            state: node.state,
            generation: node.generation,
            children: self.child_list(key, &node.children),
        })
    }

    /// Node the entity is listed under
    pub fn parent_of(&self, entity: EntityRef) -> Option<NodeKey> {
        match entity {
            EntityRef::Collection(id) => self.collections.get(&id).map(|_| NodeKey::Root),
            EntityRef::SubCollection(id) => {
                self.sub_collections.get(&id).map(|s| NodeKey::Collection(s.collection_id))
            }
            EntityRef::Item(id) => self.items.get(&id).map(|i| NodeKey::SubCollection(i.sub_collection_id)),
        }
    }

    pub fn sub_collection_count(&self, id: CollectionId) -> usize {
        self.nodes.get(&NodeKey::Collection(id)).map_or(0, |n| n.children.len())
    }

    /// Items over the collection's loaded sub-collections
    pub fn item_total(&self, id: CollectionId) -> usize {
        let Some(node) = self.nodes.get(&NodeKey::Collection(id)) else {
            return 0;
        };
        node.children
            .iter()
            .filter_map(|sid| self.nodes.get(&NodeKey::SubCollection(SubCollectionId(*sid))))
            .map(|sub| sub.children.len())
            .sum()
    }

    /// Loaded collections whose name contains `query` (case-insensitive)
    pub fn filter_collections(&self, query: &str) -> Vec<Collection> {
        let needle = query.trim().to_lowercase();
        let Some(ChildList::Collections(all)) = self.snapshot(NodeKey::Root).map(|s| s.children) else {
            return Vec::new();
        };
        all.into_iter()
            .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Rows in display order with their depth (DFS over loaded nodes)
    pub fn visible_rows(&self) -> Vec<(Row, usize)> {
        fn collect(tree: &ResourceTree, key: NodeKey, depth: usize, result: &mut Vec<(Row, usize)>) {
            let Some(node) = tree.nodes.get(&key) else {
                return;
            };
            for &id in &node.children {
                let (row, child_key) = match key {
                    NodeKey::Root => match tree.collections.get(&CollectionId(id)) {
                        Some(c) => (Row::Collection(c.clone()), Some(NodeKey::Collection(c.id))),
                        None => continue,
                    },
                    NodeKey::Collection(_) => match tree.sub_collections.get(&SubCollectionId(id)) {
                        Some(s) => (Row::SubCollection(s.clone()), Some(NodeKey::SubCollection(s.id))),
                        None => continue,
                    },
                    NodeKey::SubCollection(_) => match tree.items.get(&ItemId(id)) {
                        Some(i) => (Row::Item(i.clone()), None),
                        None => continue,
                    },
                };
                result.push((row, depth));
                // Collapsed nodes hold no children, so they end the descent
                if let Some(child_key) = child_key {
                    collect(tree, child_key, depth + 1, result);
                }
            }
        }

        let mut result = Vec::new();
        collect(self, NodeKey::Root, 0, &mut result);
        result
    }

    // ========================
    // Generation-checked writes
    // ========================

    /// Start a load that replaces the node's children: clear, bump, Loading
    pub fn begin_load(&mut self, key: NodeKey) -> Option<Generation> {
        if !self.knows(key) {
            return None;
        }
        self.clear_children(key);
        let node = self.nodes.get_mut(&key)?;
        node.generation += 1;
        node.state = LoadState::Loading;
        Some(node.generation)
    }

    /// Start a load that keeps the current children visible until it lands
    pub fn begin_refresh(&mut self, key: NodeKey) -> Option<Generation> {
        let node = self.nodes.get_mut(&key)?;
        node.generation += 1;
        node.state = LoadState::Loading;
        Some(node.generation)
    }

    /// Drop children and go back to NotLoaded without issuing a new generation
    pub fn collapse(&mut self, key: NodeKey) -> bool {
        if !self.knows(key) {
            return false;
        }
        self.clear_children(key);
        if let Some(node) = self.nodes.get_mut(&key) {
            node.state = LoadState::NotLoaded;
        }
        true
    }

    /// Clear children, reset to NotLoaded, bump generation
    pub fn invalidate(&mut self, key: NodeKey) -> Option<Generation> {
        if !self.knows(key) {
            return None;
        }
        self.clear_children(key);
        let node = self.nodes.get_mut(&key)?;
        node.generation += 1;
        node.state = LoadState::NotLoaded;
        Some(node.generation)
    }

    /// Apply a listing fetched under `generation`.
    ///
    /// Dropped (returns false) unless the node still exists, is Loading and
    /// `generation` is its current generation.
    pub fn set_children(&mut self, key: NodeKey, generation: Generation, children: ChildList) -> bool {
        if !self.accepts(key, generation) {
            return false;
        }
        if !children.fits(key) {
            warn!("[TREE] listing kind does not match {}", key);
            return false;
        }

        let mut seen = HashSet::new();
        let incoming: Vec<u32> = match &children {
            ChildList::Collections(v) => v.iter().map(|c| c.id.0).collect::<Vec<_>>(),
            ChildList::SubCollections(v) => v.iter().map(|s| s.id.0).collect::<Vec<_>>(),
            ChildList::Items(v) => v.iter().map(|i| i.id.0).collect::<Vec<_>>(),
        }
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

        let previous = self.nodes.get(&key).map(|n| n.children.clone()).unwrap_or_default();
        for old in previous.into_iter().filter(|id| !seen.contains(id)) {
            self.drop_subtree(Self::child_ref(key, old));
        }

        match (children, key) {
            (ChildList::Collections(list), _) => {
                for c in list {
                    self.nodes.entry(NodeKey::Collection(c.id)).or_default();
                    self.collections.insert(c.id, c);
                }
            }
            (ChildList::SubCollections(list), NodeKey::Collection(parent)) => {
                for mut s in list {
                    s.collection_id = parent;
                    self.detach_if_moved(EntityRef::SubCollection(s.id), key);
                    self.nodes.entry(NodeKey::SubCollection(s.id)).or_default();
                    self.sub_collections.insert(s.id, s);
                }
            }
            (ChildList::Items(list), NodeKey::SubCollection(parent)) => {
                for mut i in list {
                    i.sub_collection_id = parent;
                    self.detach_if_moved(EntityRef::Item(i.id), key);
                    self.items.insert(i.id, i);
                }
            }
            // Kind already checked by `fits`
            _ => return false,
        }

        if let Some(node) = self.nodes.get_mut(&key) {
            node.children = incoming;
            node.state = LoadState::Loaded;
        }
        true
    }

    /// Mark a load as failed, same acceptance rule as `set_children`.
    /// Children already shown (refresh) stay.
    pub fn set_failed(&mut self, key: NodeKey, generation: Generation) -> bool {
        if !self.accepts(key, generation) {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(&key) {
            node.state = LoadState::Failed;
        }
        true
    }

    /// Remove an entity and everything below it
    pub fn remove_entity(&mut self, entity: EntityRef) -> bool {
        let Some(parent) = self.parent_of(entity) else {
            return false;
        };
        let raw = Self::raw_id(entity);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|id| *id != raw);
        }
        self.drop_subtree(entity);
        true
    }

    // ========================
    // Internals
    // ========================

    fn accepts(&self, key: NodeKey, generation: Generation) -> bool {
        match self.nodes.get(&key) {
            Some(node) if node.generation == generation && node.state == LoadState::Loading => true,
            Some(node) => {
                debug!(
                    "[TREE] dropped result for {} (generation {}, current {}, {:?})",
                    key, generation, node.generation, node.state
                );
                false
            }
            None => {
                debug!("[TREE] dropped result for removed node {}", key);
                false
            }
        }
    }

    fn child_ref(key: NodeKey, id: u32) -> EntityRef {
        match key {
            NodeKey::Root => EntityRef::Collection(CollectionId(id)),
            NodeKey::Collection(_) => EntityRef::SubCollection(SubCollectionId(id)),
            NodeKey::SubCollection(_) => EntityRef::Item(ItemId(id)),
        }
    }

    fn raw_id(entity: EntityRef) -> u32 {
        match entity {
            EntityRef::Collection(id) => id.0,
            EntityRef::SubCollection(id) => id.0,
            EntityRef::Item(id) => id.0,
        }
    }

    fn child_list(&self, key: NodeKey, ids: &[u32]) -> ChildList {
        match key {
            NodeKey::Root => ChildList::Collections(
                ids.iter().filter_map(|id| self.collections.get(&CollectionId(*id)).cloned()).collect(),
            ),
            NodeKey::Collection(_) => ChildList::SubCollections(
                ids.iter().filter_map(|id| self.sub_collections.get(&SubCollectionId(*id)).cloned()).collect(),
            ),
            NodeKey::SubCollection(_) => {
                ChildList::Items(ids.iter().filter_map(|id| self.items.get(&ItemId(*id)).cloned()).collect())
            }
        }
    }

    /// An entity re-listed under a different parent leaves its old one
    fn detach_if_moved(&mut self, entity: EntityRef, new_parent: NodeKey) {
        if let Some(old_parent) = self.parent_of(entity) {
            if old_parent != new_parent {
                let raw = Self::raw_id(entity);
                if let Some(node) = self.nodes.get_mut(&old_parent) {
                    node.children.retain(|id| *id != raw);
                }
            }
        }
    }

    fn clear_children(&mut self, key: NodeKey) {
        let children = match self.nodes.get_mut(&key) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for id in children {
            self.drop_subtree(Self::child_ref(key, id));
        }
    }

    fn drop_subtree(&mut self, entity: EntityRef) {
        if let Some(key) = entity.node() {
            self.clear_children(key);
            self.nodes.remove(&key);
        }
        match entity {
            EntityRef::Collection(id) => {
                self.collections.remove(&id);
            }
            EntityRef::SubCollection(id) => {
                self.sub_collections.remove(&id);
            }
            EntityRef::Item(id) => {
                self.items.remove(&id);
            }
        }
    }
}
