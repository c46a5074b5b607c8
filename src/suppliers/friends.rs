//! Suppliers backed by friends.get, including the coordinated random pair
//!
//! The two random suppliers work together: the first one to run draws a
//! fresh random list and records the drawn ids in settings, its counterpart
//! then resolves exactly those ids and clears the record. That way a layer
//! populated with both gets a matching avatar/name pair.

use serde_json::json;
use tracing::debug;

use super::{users, DataValue, ResolveCtx, RANDOM_ID_KEY};
use crate::api::{FriendsOrder, User, VkResult};

pub const FRIEND_AVATARS: &str = "friend_avatars";
pub const FRIEND_FIRST_NAMES: &str = "friend_first_names";
pub const FRIEND_FULL_NAMES: &str = "friend_full_names";
pub const RANDOM_FRIEND_AVATARS: &str = "random_friend_avatars";
pub const RANDOM_FRIEND_NAMES: &str = "random_friend_names";

pub async fn avatars(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let page = ctx.api.friends_get(FriendsOrder::Hints, ctx.count).await?;
    Ok(users::avatar_values(&page.items))
}

pub async fn first_names(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let page = ctx.api.friends_get(FriendsOrder::Hints, ctx.count).await?;
    Ok(page
        .items
        .iter()
        .map(|user| DataValue::Text(user.first_name.clone()))
        .collect())
}

pub async fn full_names(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let page = ctx.api.friends_get(FriendsOrder::Hints, ctx.count).await?;
    Ok(page
        .items
        .iter()
        .map(|user| DataValue::Text(user.full_name()))
        .collect())
}

pub async fn random_avatars(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let friends = random_selection(ctx).await?;
    Ok(users::avatar_values(&friends))
}

pub async fn random_names(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let friends = random_selection(ctx).await?;
    Ok(friends
        .iter()
        .map(|user| DataValue::Text(user.full_name()))
        .collect())
}

/// Two-phase selection shared by the random pair
async fn random_selection(ctx: &ResolveCtx<'_>) -> VkResult<Vec<User>> {
    if let Some(stored) = stored_selection(ctx) {
        debug!(count = stored.len(), "resolving recorded random selection");
        let users = ctx.api.users_get(&stored).await?;
        if let Err(err) = ctx.settings.remove(RANDOM_ID_KEY) {
            debug!("could not clear random selection: {err}");
        }
        return Ok(users);
    }

    let page = ctx.api.friends_get(FriendsOrder::Random, ctx.count).await?;
    let ids: Vec<String> = page.items.iter().map(|user| user.id.to_string()).collect();
    if let Err(err) = ctx.settings.set(RANDOM_ID_KEY, json!(ids)) {
        debug!("could not record random selection: {err}");
    }
    Ok(page.items)
}

fn stored_selection(ctx: &ResolveCtx<'_>) -> Option<Vec<String>> {
    let value = ctx.settings.get(RANDOM_ID_KEY)?;
    let ids: Vec<String> = serde_json::from_value(value).ok()?;
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}
