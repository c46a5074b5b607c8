//! Suppliers backed by groups.get and groups.getById

use super::{DataValue, ResolveCtx};
use crate::api::{Group, VkResult};

pub const GROUP_AVATARS: &str = "group_avatars";
pub const GROUP_NAMES: &str = "group_names";
pub const GROUP_AVATARS_BY_ID: &str = "group_avatars_by_id";
pub const GROUP_NAMES_BY_ID: &str = "group_names_by_id";

pub async fn avatars(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let page = ctx.api.groups_get(ctx.count).await?;
    Ok(avatar_values(&page.items))
}

pub async fn names(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let page = ctx.api.groups_get(ctx.count).await?;
    Ok(name_values(&page.items))
}

pub async fn avatars_by_id(ctx: &ResolveCtx<'_>) -> VkResult<Option<Vec<DataValue>>> {
    let ids = match ctx.prompt_id_list("Group ids (comma separated)") {
        Some(ids) => ids,
        None => return Ok(None),
    };
    let groups = ctx.api.groups_get_by_id(&ids).await?;
    Ok(Some(avatar_values(&groups)))
}

pub async fn names_by_id(ctx: &ResolveCtx<'_>) -> VkResult<Option<Vec<DataValue>>> {
    let ids = match ctx.prompt_id_list("Group ids (comma separated)") {
        Some(ids) => ids,
        None => return Ok(None),
    };
    let groups = ctx.api.groups_get_by_id(&ids).await?;
    Ok(Some(name_values(&groups)))
}

fn avatar_values(groups: &[Group]) -> Vec<DataValue> {
    groups
        .iter()
        .filter_map(|group| group.best_photo())
        .map(|url| DataValue::Image {
            url: url.to_string(),
        })
        .collect()
}

fn name_values(groups: &[Group]) -> Vec<DataValue> {
    groups
        .iter()
        .map(|group| DataValue::Text(group.name.clone()))
        .collect()
}
