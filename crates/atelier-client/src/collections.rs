//! Typed per-collection handles over the shared [`ApiClient`].
//!
//! A [`CollectionApi`] binds one collection segment to one entity type and
//! implements the console's fetcher and transport seams, so a
//! `RemoteCollection` and an `ActionDispatcher` can share a single handle.

use std::marker::PhantomData;

use async_trait::async_trait;
use atelier_api_models::{
    CourseSummary, Payout, ProductSummary, PromoCode, ReturnRequest, StatusActionRequest,
    WorkshopSummary,
};
use atelier_console::{
    ActionError, ActionResult, ActionTransport, CollectionFetcher, ListQuery, Page,
};
use serde::de::DeserializeOwned;

use crate::client::ApiClient;

/// The admin collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Video courses pending moderation.
    Courses,
    /// Physical and digital products.
    Products,
    /// Scheduled live workshops.
    Workshops,
    /// Checkout promo codes.
    PromoCodes,
    /// Customer return requests.
    Returns,
    /// Studio earning payouts.
    Payouts,
}

impl Collection {
    /// Path segment under `/api/admin/`.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Courses => "courses",
            Self::Products => "products",
            Self::Workshops => "workshops",
            Self::PromoCodes => "promo-codes",
            Self::Returns => "returns",
            Self::Payouts => "payouts",
        }
    }

    /// Parse a collection from its path segment.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "courses" => Some(Self::Courses),
            "products" => Some(Self::Products),
            "workshops" => Some(Self::Workshops),
            "promo-codes" => Some(Self::PromoCodes),
            "returns" => Some(Self::Returns),
            "payouts" => Some(Self::Payouts),
            _ => None,
        }
    }

    /// Every collection, in sidebar order.
    pub const ALL: [Self; 6] = [
        Self::Courses,
        Self::Products,
        Self::Workshops,
        Self::PromoCodes,
        Self::Returns,
        Self::Payouts,
    ];
}

impl std::fmt::Display for Collection {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.segment())
    }
}

/// A collection segment paired with its entity type.
#[derive(Debug, Clone)]
pub struct CollectionApi<T> {
    client: ApiClient,
    collection: Collection,
    _entity: PhantomData<fn() -> T>,
}

impl CollectionApi<CourseSummary> {
    /// Handle for the courses collection.
    #[must_use]
    pub const fn courses(client: ApiClient) -> Self {
        Self::bind(client, Collection::Courses)
    }
}

impl CollectionApi<ProductSummary> {
    /// Handle for the products collection.
    #[must_use]
    pub const fn products(client: ApiClient) -> Self {
        Self::bind(client, Collection::Products)
    }
}

impl CollectionApi<WorkshopSummary> {
    /// Handle for the workshops collection.
    #[must_use]
    pub const fn workshops(client: ApiClient) -> Self {
        Self::bind(client, Collection::Workshops)
    }
}

impl CollectionApi<PromoCode> {
    /// Handle for the promo codes collection.
    #[must_use]
    pub const fn promo_codes(client: ApiClient) -> Self {
        Self::bind(client, Collection::PromoCodes)
    }
}

impl CollectionApi<ReturnRequest> {
    /// Handle for the returns collection.
    #[must_use]
    pub const fn returns(client: ApiClient) -> Self {
        Self::bind(client, Collection::Returns)
    }
}

impl CollectionApi<Payout> {
    /// Handle for the payouts collection.
    #[must_use]
    pub const fn payouts(client: ApiClient) -> Self {
        Self::bind(client, Collection::Payouts)
    }
}

impl<T> CollectionApi<T> {
    const fn bind(client: ApiClient, collection: Collection) -> Self {
        Self {
            client,
            collection,
            _entity: PhantomData,
        }
    }

    /// The collection this handle is bound to.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }
}

impl<T: DeserializeOwned> CollectionApi<T> {
    /// Fetch a single entity by id.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`].
    pub async fn fetch_one(&self, id: &str) -> ActionResult<T> {
        self.client.fetch_one(self.collection.segment(), id).await
    }

    /// Create an entity and return the server's canonical copy.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`].
    pub async fn create(&self, body: &impl serde::Serialize) -> ActionResult<T> {
        self.client.create(self.collection.segment(), body).await
    }

    /// Partially update an entity and return the server's canonical copy.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`].
    pub async fn update(&self, id: &str, body: &impl serde::Serialize) -> ActionResult<T> {
        self.client
            .update(self.collection.segment(), id, body)
            .await
    }

    /// Replace an entity wholesale and return the server's canonical copy.
    ///
    /// # Errors
    ///
    /// Classified per [`ActionError`].
    pub async fn replace(&self, id: &str, body: &impl serde::Serialize) -> ActionResult<T> {
        self.client
            .replace(self.collection.segment(), id, body)
            .await
    }
}

#[async_trait]
impl<T> CollectionFetcher<T> for CollectionApi<T>
where
    T: DeserializeOwned + Send + Sync,
{
    async fn fetch(&self, query: &ListQuery) -> Result<Page<T>, ActionError> {
        let envelope = self
            .client
            .list::<T>(self.collection.segment(), query)
            .await?;
        Page::try_from_envelope(envelope, query.page_size)
            .map_err(|err| ActionError::Network(err.to_string()))
    }
}

#[async_trait]
impl<T> ActionTransport<T> for CollectionApi<T>
where
    T: DeserializeOwned + Send + Sync,
{
    async fn perform(&self, entity_id: &str, request: &StatusActionRequest) -> ActionResult<T> {
        self.client
            .perform_action(self.collection.segment(), entity_id, request)
            .await
    }

    async fn remove(&self, entity_id: &str) -> ActionResult<()> {
        self.client
            .remove(self.collection.segment(), entity_id)
            .await
    }
}
