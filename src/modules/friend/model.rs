use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::api::error;
use crate::modules::friend::schema::FriendRequestEntity;
use crate::modules::user::schema::UserEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FriendResponse {
    pub id: i64,
    pub name: String,
}

impl From<UserEntity> for FriendResponse {
    fn from(user: UserEntity) -> Self {
        FriendResponse { id: user.id, name: user.name }
    }
}

/// A friend link seen from its owner: `id` is a friend of `owner_id`.
#[derive(Debug, Clone, FromRow)]
pub struct FriendLinkRow {
    pub owner_id: i64,
    pub id: i64,
    pub name: String,
}

/// Everything the two-hop computation reads about a seed, taken from one
/// consistent view of the store.
#[derive(Debug, Clone, Default)]
pub struct TwoHopSnapshot {
    pub direct: Vec<FriendResponse>,
    pub blocked: HashSet<i64>,
    /// Links owned by each direct friend.
    pub second_hop: Vec<FriendLinkRow>,
}

/// A request after Accept or Decline, with the user who sent it as read
/// inside the same transaction.
#[derive(Debug, Clone)]
pub struct ResolvedFriendRequest {
    pub request: FriendRequestEntity,
    pub requester: FriendResponse,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    #[validate(range(min = 1, message = "Invalid friend id"))]
    pub friend_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlockBody {
    #[validate(range(min = 1, message = "Invalid block id"))]
    pub block_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1, message = "Invalid limit"))]
    pub limit: Option<i64>,
    #[validate(range(min = 1, message = "Invalid page number"))]
    pub page: Option<i64>,
}

impl PageQuery {
    /// `None` when neither parameter is given; a missing page means the first one.
    pub fn window(&self) -> Result<Option<Pagination>, error::SystemError> {
        match (self.limit, self.page) {
            (None, None) => Ok(None),
            (None, Some(_)) => Err(error::SystemError::bad_request("Invalid limit")),
            (Some(limit), page) => Pagination::from_page(limit, page.unwrap_or(1)).map(Some),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn from_page(limit: i64, page: i64) -> Result<Self, error::SystemError> {
        if limit <= 0 {
            return Err(error::SystemError::bad_request("Invalid limit"));
        }
        if page <= 0 {
            return Err(error::SystemError::bad_request("Invalid page number"));
        }
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| error::SystemError::bad_request("Invalid page number"))?;
        Ok(Pagination { limit, offset })
    }

    /// Applies the window to an already ordered list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_derived_from_one_based_page() {
        assert_eq!(Pagination::from_page(5, 1).unwrap(), Pagination { limit: 5, offset: 0 });
        assert_eq!(Pagination::from_page(5, 3).unwrap(), Pagination { limit: 5, offset: 10 });
    }

    #[test]
    fn non_positive_window_is_rejected() {
        assert!(Pagination::from_page(0, 1).is_err());
        assert!(Pagination::from_page(5, 0).is_err());
        assert!(Pagination::from_page(-1, 2).is_err());
        assert!(Pagination::from_page(i64::MAX, i64::MAX).is_err());
    }

    #[test]
    fn pages_concatenate_to_the_unpaged_prefix() {
        let all: Vec<i64> = (1..=12).collect();
        let mut joined = Vec::new();
        for page in 1..=3 {
            joined.extend(Pagination::from_page(4, page).unwrap().apply(all.clone()));
        }
        assert_eq!(joined, all);

        let past_end = Pagination::from_page(4, 9).unwrap().apply(all);
        assert!(past_end.is_empty());
    }

    #[test]
    fn page_query_window() {
        assert_eq!(PageQuery::default().window().unwrap(), None);

        let query = PageQuery { limit: Some(10), page: None };
        assert_eq!(query.window().unwrap(), Some(Pagination { limit: 10, offset: 0 }));

        let query = PageQuery { limit: None, page: Some(2) };
        assert!(query.window().is_err());

        let query = PageQuery { limit: Some(0), page: Some(1) };
        assert!(query.validate().is_err());
    }
}
