//! Suppliers backed by fave.getPages

use super::{DataValue, ResolveCtx};
use crate::api::VkResult;

pub const FAVE_AVATARS: &str = "fave_avatars";
pub const FAVE_TITLES: &str = "fave_titles";

pub async fn avatars(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let page = ctx.api.fave_get_pages(ctx.count).await?;
    Ok(page
        .items
        .iter()
        .filter_map(|fave| fave.best_photo())
        .map(|url| DataValue::Image {
            url: url.to_string(),
        })
        .collect())
}

pub async fn titles(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let page = ctx.api.fave_get_pages(ctx.count).await?;
    Ok(page
        .items
        .iter()
        .filter_map(|fave| fave.title())
        .map(DataValue::Text)
        .collect())
}
