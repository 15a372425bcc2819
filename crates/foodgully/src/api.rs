//! Typed calls for the marketplace endpoints.
//!
//! Every call goes through the shared [`HttpClient`], so it carries the
//! stored application token when there is one. Which calls need a token
//! is the backend's decision; a missing or expired one comes back as a
//! 401/403 [`TransportError::Status`].

use chrono::Utc;
use foodgully_protocol::{
    DeleteResult, Food, FoodDraft, FoodQuery, FoodRequest, FoodUpdate, InsertResult, NewFood,
    NewFoodRequest, UpdateResult, UserIdentity,
};
use foodgully_transport::{HttpClient, TransportError, resource_path};

/// Food listings and pickup requests.
#[derive(Clone)]
pub struct FoodsApi {
    http: HttpClient,
}

impl FoodsApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /foods?search=&sort=&status=`
    pub async fn list(&self, query: &FoodQuery) -> Result<Vec<Food>, TransportError> {
        self.http.get_json_with_query("/foods", &query.to_pairs()).await
    }

    /// `GET /foods/{id}`
    ///
    /// `id` is sent as one escaped path segment.
    pub async fn get(&self, id: &str) -> Result<Food, TransportError> {
        self.http.get_json(&resource_path("/foods", id)?).await
    }

    /// `GET /my-foods`: listings donated by the signed-in user.
    pub async fn mine(&self) -> Result<Vec<Food>, TransportError> {
        self.http.get_json("/my-foods").await
    }

    /// `POST /foods` with `draft` listed under `donor`.
    pub async fn add(
        &self,
        draft: FoodDraft,
        donor: &UserIdentity,
    ) -> Result<InsertResult, TransportError> {
        let listing = NewFood::listed_by(draft, donor);
        let result: InsertResult = self.http.post_json("/foods", &listing).await?;
        tracing::info!(id = ?result.inserted_id, "food listed");
        Ok(result)
    }

    /// `PATCH /foods/{id}`
    pub async fn update(
        &self,
        id: &str,
        update: &FoodUpdate,
    ) -> Result<UpdateResult, TransportError> {
        self.http
            .patch_json(&resource_path("/foods", id)?, update)
            .await
    }

    /// `DELETE /foods/{id}`
    pub async fn delete(&self, id: &str) -> Result<DeleteResult, TransportError> {
        self.http.delete_json(&resource_path("/foods", id)?).await
    }

    /// Requests `food` for pickup: `POST /requests`, then marks the
    /// listing as requested.
    ///
    /// The two calls are not atomic. If the second fails the request
    /// exists but the listing still shows as available; the error is
    /// returned so the caller can retry the update.
    pub async fn request(
        &self,
        food: &Food,
        requester: &UserIdentity,
        notes: &str,
    ) -> Result<InsertResult, TransportError> {
        // Checked before the POST so a bad id can't leave a dangling request.
        let listing = resource_path("/foods", &food.id)?;
        let body = NewFoodRequest::for_food(food, requester, notes, Utc::now());
        let inserted: InsertResult = self.http.post_json("/requests", &body).await?;
        self.http
            .patch_json::<_, UpdateResult>(&listing, &FoodUpdate::mark_requested())
            .await
            .inspect_err(|e| {
                tracing::warn!(food = %food.id, error = %e, "request stored but listing not marked")
            })?;
        tracing::info!(food = %food.id, "food requested");
        Ok(inserted)
    }

    /// `GET /my-requests`
    pub async fn my_requests(&self) -> Result<Vec<FoodRequest>, TransportError> {
        self.http.get_json("/my-requests").await
    }

    /// `DELETE /my-requests/{id}`
    pub async fn cancel_request(&self, id: &str) -> Result<DeleteResult, TransportError> {
        self.http
            .delete_json(&resource_path("/my-requests", id)?)
            .await
    }
}
