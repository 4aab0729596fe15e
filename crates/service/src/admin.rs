//! Admin dashboard snapshot.

use std::collections::{BTreeMap, HashSet};

use models::{Ban, CollectionPoint, Tag, User};
use serde::Serialize;

use crate::{actor::Actor, errors::ServiceError, storage::Storage, tags::TagService};

/// A user row as shown to admins; never carries the password hash.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub nickname: String,
    pub is_admin: bool,
    pub is_dev: bool,
    pub banned: bool,
    pub created_at: String,
}

impl UserSummary {
    fn new(user: User, banned: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            is_admin: user.is_admin,
            is_dev: user.is_dev,
            banned,
            created_at: user.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub users: Vec<UserSummary>,
    pub user_tags: BTreeMap<String, Vec<Tag>>,
    pub bans: Vec<Ban>,
    pub collection_points: Vec<CollectionPoint>,
}

/// Everything the moderation page shows, read in one pass. Admins only.
pub async fn dashboard(storage: &Storage, actor: &Actor) -> Result<Dashboard, ServiceError> {
    actor.require_admin("view the admin dashboard")?;
    let bans = storage.bans.list_bans().await;
    let banned: HashSet<String> = bans.iter().map(|b| b.email.trim().to_lowercase()).collect();

    let users: Vec<UserSummary> = storage
        .users
        .read_all()
        .await
        .into_iter()
        .map(|u| {
            let is_banned = banned.contains(&u.email.trim().to_lowercase());
            UserSummary::new(u, is_banned)
        })
        .collect();

    Ok(Dashboard {
        users,
        user_tags: TagService::new(storage.clone()).by_user().await,
        bans,
        collection_points: storage.collection_points.read_all().await,
    })
}
