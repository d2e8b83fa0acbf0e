//! Frontend Models
//!
//! Entities mirrored from the backend, plus the wire shapes they arrive in.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Backend-assigned collection id
    CollectionId
);
entity_id!(
    /// Backend-assigned sub-collection id
    SubCollectionId
);
entity_id!(
    /// Backend-assigned item id
    ItemId
);

/// Top-level grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
}

/// Second-level grouping, owned by exactly one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCollection {
    pub id: SubCollectionId,
    pub name: String,
    pub collection_id: CollectionId,
}

/// Leaf content entry, owned by exactly one sub-collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub content: String,
    pub sub_collection_id: SubCollectionId,
}

/// Address of a loadable tree node (one that has children)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// The collection listing
    Root,
    Collection(CollectionId),
    SubCollection(SubCollectionId),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Root => write!(f, "root"),
            NodeKey::Collection(id) => write!(f, "collection:{}", id),
            NodeKey::SubCollection(id) => write!(f, "sub-collection:{}", id),
        }
    }
}

/// Address of any entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Collection(CollectionId),
    SubCollection(SubCollectionId),
    Item(ItemId),
}

impl EntityRef {
    /// Node key of the entity itself, if it has children
    pub fn node(&self) -> Option<NodeKey> {
        match *self {
            EntityRef::Collection(id) => Some(NodeKey::Collection(id)),
            EntityRef::SubCollection(id) => Some(NodeKey::SubCollection(id)),
            EntityRef::Item(_) => None,
        }
    }
}

/// Children of one node, typed by level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildList {
    Collections(Vec<Collection>),
    SubCollections(Vec<SubCollection>),
    Items(Vec<Item>),
}

impl ChildList {
    /// Empty list of the kind `key` holds
    pub fn empty_for(key: NodeKey) -> Self {
        match key {
            NodeKey::Root => ChildList::Collections(Vec::new()),
            NodeKey::Collection(_) => ChildList::SubCollections(Vec::new()),
            NodeKey::SubCollection(_) => ChildList::Items(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChildList::Collections(v) => v.len(),
            ChildList::SubCollections(v) => v.len(),
            ChildList::Items(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this list is the kind of children `key` holds
    pub fn fits(&self, key: NodeKey) -> bool {
        matches!(
            (self, key),
            (ChildList::Collections(_), NodeKey::Root)
                | (ChildList::SubCollections(_), NodeKey::Collection(_))
                | (ChildList::Items(_), NodeKey::SubCollection(_))
        )
    }
}

// ========================
// Wire shapes
// ========================

/// One listing row as the backend sends it.
///
/// Rows come either as positional tuples (`[7, "Algebra"]`) or as keyed
/// records (`{"id": 7, "name": "Algebra"}`, `{"id": 3, "raw_md": "..."}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireRow {
    Tuple(u32, String),
    Record {
        id: u32,
        #[serde(alias = "name", alias = "content", alias = "raw_md", alias = "content_md")]
        text: String,
    },
}

impl WireRow {
    pub fn into_parts(self) -> (u32, String) {
        match self {
            WireRow::Tuple(id, text) => (id, text),
            WireRow::Record { id, text } => (id, text),
        }
    }
}

/// Normalize a collection listing; `null` is an empty listing.
pub fn collections_from_wire(rows: Option<Vec<WireRow>>) -> Vec<Collection> {
    rows.unwrap_or_default()
        .into_iter()
        .map(|row| {
            let (id, name) = row.into_parts();
            Collection { id: CollectionId(id), name }
        })
        .collect()
}

pub fn sub_collections_from_wire(
    collection_id: CollectionId,
    rows: Option<Vec<WireRow>>,
) -> Vec<SubCollection> {
    rows.unwrap_or_default()
        .into_iter()
        .map(|row| {
            let (id, name) = row.into_parts();
            SubCollection { id: SubCollectionId(id), name, collection_id }
        })
        .collect()
}

pub fn items_from_wire(sub_collection_id: SubCollectionId, rows: Option<Vec<WireRow>>) -> Vec<Item> {
    rows.unwrap_or_default()
        .into_iter()
        .map(|row| {
            let (id, content) = row.into_parts();
            Item { id: ItemId(id), content, sub_collection_id }
        })
        .collect()
}
