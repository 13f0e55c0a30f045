use crate::clients::api_client::ApiClient;
use crate::clients::UserError;
use crate::gateway::{Gateway, GatewayError};
use crate::model::{AuthUser, Page};
use serde::Serialize;
use tracing::{debug, instrument};

pub const USER_BASE_PATH: &str = "/api/user/user";

/// Filters for the paged user list. Pages start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

impl UserQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            keyword: None,
            role_id: None,
            status: None,
        }
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }
}

#[derive(Serialize)]
struct IdQuery {
    id: i64,
}

#[derive(Serialize)]
struct IdsQuery<'a> {
    ids: &'a [i64],
}

/// Client for the back-office user management endpoints.
#[derive(Clone, Debug)]
pub struct UserClient {
    gateway: Gateway,
}

#[async_trait::async_trait]
impl ApiClient for UserClient {
    type Error = UserError;

    fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn base_path(&self) -> &str {
        USER_BASE_PATH
    }

    fn map_error(e: GatewayError) -> Self::Error {
        UserError::from(e)
    }
}

impl UserClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self))]
    pub async fn page_users(&self, query: &UserQuery) -> Result<Page<AuthUser>, UserError> {
        let page: Page<AuthUser> = self.fetch_with("/page", query).await?;
        debug!(total = page.total, returned = page.records.len(), "Users paged");
        Ok(page)
    }

    #[instrument(skip(self, user))]
    pub async fn create_user(&self, user: &AuthUser) -> Result<(), UserError> {
        self.submit("", user).await
    }

    #[instrument(skip(self, user))]
    pub async fn update_user(&self, id: i64, user: &AuthUser) -> Result<(), UserError> {
        self.replace(&format!("/{id}"), user).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<(), UserError> {
        self.remove(&format!("/{id}")).await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<AuthUser, UserError> {
        self.fetch_with("/id", &IdQuery { id }).await
    }

    #[instrument(skip(self))]
    pub async fn get_users(&self, ids: &[i64]) -> Result<Vec<AuthUser>, UserError> {
        self.fetch_with("/ids", &IdsQuery { ids }).await
    }
}
