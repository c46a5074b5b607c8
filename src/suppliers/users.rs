//! Suppliers backed by users.get

use super::{DataValue, ResolveCtx};
use crate::api::{User, VkResult};

pub const MY_AVATAR: &str = "my_avatar";
pub const AVATARS_BY_ID: &str = "avatars_by_id";
pub const MY_NAME: &str = "my_name";

/// The signed-in user's avatar
pub async fn my_avatar(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let users = ctx.api.users_get(&[]).await?;
    Ok(avatar_values(&users))
}

/// Avatars for a prompted id list
pub async fn avatars_by_id(ctx: &ResolveCtx<'_>) -> VkResult<Option<Vec<DataValue>>> {
    let ids = match ctx.prompt_id_list("User ids (comma separated)") {
        Some(ids) => ids,
        None => return Ok(None),
    };
    let users = ctx.api.users_get(&ids).await?;
    Ok(Some(avatar_values(&users)))
}

/// The signed-in user's "first last" name
pub async fn my_name(ctx: &ResolveCtx<'_>) -> VkResult<Vec<DataValue>> {
    let users = ctx.api.users_get(&[]).await?;
    Ok(users
        .iter()
        .map(|user| DataValue::Text(user.full_name()))
        .collect())
}

/// Profiles without any photo are skipped rather than supplied empty
pub(super) fn avatar_values(users: &[User]) -> Vec<DataValue> {
    users
        .iter()
        .filter_map(|user| user.best_photo())
        .map(|url| DataValue::Image {
            url: url.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photoless_profiles_are_skipped() {
        let users = vec![
            User {
                id: 1,
                photo_200: Some("a".into()),
                ..Default::default()
            },
            User {
                id: 2,
                ..Default::default()
            },
            User {
                id: 3,
                photo_100: Some("c".into()),
                ..Default::default()
            },
        ];
        let values = avatar_values(&users);
        assert_eq!(
            values,
            vec![
                DataValue::Image { url: "a".into() },
                DataValue::Image { url: "c".into() },
            ]
        );
    }
}
