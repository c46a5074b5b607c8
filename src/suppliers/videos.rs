//! Suppliers backed by video.get, all prompting for the videos' owner

use super::{DataValue, ResolveCtx};
use crate::api::{ItemsPage, Video, VkResult};

pub const VIDEO_COVERS: &str = "video_covers";
pub const VIDEO_TITLES: &str = "video_titles";
pub const VIDEO_VIEWS: &str = "video_views";

pub async fn covers(ctx: &ResolveCtx<'_>) -> VkResult<Option<Vec<DataValue>>> {
    let page = match fetch(ctx).await? {
        Some(page) => page,
        None => return Ok(None),
    };
    Ok(Some(
        page.items
            .iter()
            .filter_map(|video| video.cover_url())
            .map(|url| DataValue::Image {
                url: url.to_string(),
            })
            .collect(),
    ))
}

pub async fn titles(ctx: &ResolveCtx<'_>) -> VkResult<Option<Vec<DataValue>>> {
    let page = match fetch(ctx).await? {
        Some(page) => page,
        None => return Ok(None),
    };
    Ok(Some(
        page.items
            .iter()
            .map(|video| DataValue::Text(video.title.clone()))
            .collect(),
    ))
}

pub async fn views(ctx: &ResolveCtx<'_>) -> VkResult<Option<Vec<DataValue>>> {
    let page = match fetch(ctx).await? {
        Some(page) => page,
        None => return Ok(None),
    };
    Ok(Some(
        page.items
            .iter()
            .map(|video| DataValue::Text(views_label(video.views)))
            .collect(),
    ))
}

async fn fetch(ctx: &ResolveCtx<'_>) -> VkResult<Option<ItemsPage<Video>>> {
    let owner = match ctx.prompt_ids("Videos owner id") {
        Some(owner) => owner,
        None => return Ok(None),
    };
    Ok(Some(ctx.api.video_get(&owner, ctx.count).await?))
}

fn views_label(views: u64) -> String {
    format!("{views} views")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_become_a_label() {
        assert_eq!(views_label(0), "0 views");
        assert_eq!(views_label(1500), "1500 views");
    }
}
