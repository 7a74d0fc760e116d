use shared::{
    domain::{ItemId, ListId},
    error::{ApiError, ErrorCode},
    protocol::{ItemRow, ListPage},
};
use storage::Storage;
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Starts a new list from its first item. List and item are written in one
/// transaction, so a list never exists without the item that created it.
pub async fn new_list(ctx: &ApiContext, item_text: &str) -> Result<ListId, ApiError> {
    require_item_text(item_text)?;
    let (list_id, item_id) = ctx
        .storage
        .create_list_with_first_item(item_text)
        .await
        .map_err(internal)?;
    debug!(list_id = list_id.0, item_id = item_id.0, "started new list");
    Ok(list_id)
}

pub async fn add_to_list(
    ctx: &ApiContext,
    list_id: ListId,
    item_text: &str,
) -> Result<ItemId, ApiError> {
    require_item_text(item_text)?;
    let item_id = ctx
        .storage
        .create_item(list_id, item_text)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, "list not found"))?;
    debug!(list_id = list_id.0, item_id = item_id.0, "added item");
    Ok(item_id)
}

/// Assembles the page for one list. Ranks are 1-based positions in insertion
/// order, computed here rather than stored.
pub async fn view_list(ctx: &ApiContext, list_id: ListId) -> Result<ListPage, ApiError> {
    let list = ctx
        .storage
        .get_list(list_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, "list not found"))?;

    Ok(ListPage {
        list_id: list.list_id,
        items: list
            .items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| ItemRow {
                item_id: item.item_id,
                rank: idx + 1,
                text: item.text,
            })
            .collect(),
    })
}

fn require_item_text(item_text: &str) -> Result<(), ApiError> {
    if item_text.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "item text cannot be empty",
        ));
    }
    Ok(())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
