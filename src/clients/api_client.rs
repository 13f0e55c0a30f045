//! # ApiClient Trait
//!
//! Provides a common interface for area-specific clients, adding default typed verbs
//! built on top of the shared [`Gateway`].
use crate::gateway::{Gateway, GatewayError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for backend-area clients to inherit the standard verbs.
///
/// Implementors name their base path and how gateway errors become their own error type;
/// `fetch`, `submit`, `replace` and `remove` come for free.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// The area-specific error type.
    type Error: Send + Sync;

    /// Access the shared gateway.
    fn gateway(&self) -> &Gateway;

    /// Path prefix for every call, e.g. `/api/auth`.
    fn base_path(&self) -> &str;

    /// Map gateway errors to the area-specific error type.
    fn map_error(e: GatewayError) -> Self::Error;

    fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.base_path(), suffix)
    }

    /// GET `suffix`.
    #[tracing::instrument(skip(self))]
    async fn fetch<T>(&self, suffix: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned + Send,
    {
        tracing::debug!("Sending request");
        self.gateway()
            .get(&self.path(suffix))
            .await
            .map_err(Self::map_error)
    }

    /// GET `suffix` with query parameters.
    #[tracing::instrument(skip(self, query))]
    async fn fetch_with<T, Q>(&self, suffix: &str, query: &Q) -> Result<T, Self::Error>
    where
        T: DeserializeOwned + Send,
        Q: Serialize + Sync + ?Sized,
    {
        tracing::debug!("Sending request");
        self.gateway()
            .get_with(&self.path(suffix), query)
            .await
            .map_err(Self::map_error)
    }

    /// POST a JSON body to `suffix`.
    #[tracing::instrument(skip(self, body))]
    async fn submit<T, B>(&self, suffix: &str, body: &B) -> Result<T, Self::Error>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync + ?Sized,
    {
        tracing::debug!("Sending request");
        self.gateway()
            .post(&self.path(suffix), body)
            .await
            .map_err(Self::map_error)
    }

    /// PUT a JSON body to `suffix`.
    #[tracing::instrument(skip(self, body))]
    async fn replace<T, B>(&self, suffix: &str, body: &B) -> Result<T, Self::Error>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync + ?Sized,
    {
        tracing::debug!("Sending request");
        self.gateway()
            .put(&self.path(suffix), body)
            .await
            .map_err(Self::map_error)
    }

    /// DELETE `suffix`.
    #[tracing::instrument(skip(self))]
    async fn remove<T>(&self, suffix: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned + Send,
    {
        tracing::debug!("Sending request");
        self.gateway()
            .delete(&self.path(suffix))
            .await
            .map_err(Self::map_error)
    }
}
