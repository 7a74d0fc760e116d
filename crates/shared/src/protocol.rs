use serde::{Deserialize, Serialize};

use crate::domain::{ItemId, ListId};

/// A single rendered row of a list page. The rank is the item's 1-based
/// position in insertion order, recomputed every time the page is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    pub item_id: ItemId,
    pub rank: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage {
    pub list_id: ListId,
    pub items: Vec<ItemRow>,
}
