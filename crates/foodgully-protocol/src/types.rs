//! Core wire types.
//!
//! Everything here is plain data with serde derives. JSON field names follow
//! the backend, which is camelCase with MongoDB's `_id` for record ids.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Display name used when the identity provider has none on record.
const ANONYMOUS: &str = "Anonymous";

/// Shows the first few characters of a secret and hides the rest.
fn redact(secret: &str) -> String {
    let head: String = secret.chars().take(4).collect();
    format!("{head}…")
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The raw user object carried by an identity-provider notification.
///
/// This is what the provider knows about the signed-in account. It is never
/// published to views directly: the session controller turns it into a
/// [`UserIdentity`] once the backend has accepted the account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    /// The provider's stable account id.
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// The provider access token that was current when the notification
    /// fired. Possibly stale; the controller asks for a fresh one before
    /// talking to the backend.
    pub access_token: String,
}

impl fmt::Debug for ProviderUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderUser")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .field("access_token", &redact(&self.access_token))
            .finish()
    }
}

/// The identity published with an authenticated session.
///
/// An immutable snapshot: there are no setters. A profile change produces a
/// whole new value through [`with_profile`](Self::with_profile), and a new
/// sign-in produces a new value through
/// [`from_provider`](Self::from_provider).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    external_id: String,
    display_name: String,
    email: String,
    #[serde(rename = "photoURL")]
    photo_url: Option<String>,
    provider_access_token: String,
}

impl UserIdentity {
    /// Builds a snapshot from the provider's user object.
    pub fn from_provider(user: &ProviderUser) -> Self {
        Self {
            external_id: user.uid.clone(),
            display_name: user
                .display_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS.to_string()),
            email: user.email.clone(),
            photo_url: user.photo_url.clone().filter(|url| !url.is_empty()),
            provider_access_token: user.access_token.clone(),
        }
    }

    /// Returns a new snapshot with the given profile fields replaced.
    /// Fields left as `None` in the update keep their current value.
    pub fn with_profile(&self, update: &ProfileUpdate) -> Self {
        Self {
            display_name: update
                .display_name
                .clone()
                .unwrap_or_else(|| self.display_name.clone()),
            photo_url: update.photo_url.clone().or_else(|| self.photo_url.clone()),
            ..self.clone()
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    pub fn provider_access_token(&self) -> &str {
        &self.provider_access_token
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("external_id", &self.external_id)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("photo_url", &self.photo_url)
            .field("provider_access_token", &redact(&self.provider_access_token))
            .finish()
    }
}

/// A partial profile change: display name and/or avatar URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    /// Returns `true` if the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}

// ---------------------------------------------------------------------------
// Token exchange
// ---------------------------------------------------------------------------

/// Body returned by `POST /jwt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtResponse {
    pub token: String,
}

impl JwtResponse {
    /// Extracts the bearer token, rejecting an empty one.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the token is blank.
    pub fn into_token(self) -> Result<String, ProtocolError> {
        if self.token.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "jwt response carried an empty token".into(),
            ));
        }
        Ok(self.token)
    }
}

// ---------------------------------------------------------------------------
// Marketplace records
// ---------------------------------------------------------------------------

/// Whether a listed food can still be requested.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum FoodStatus {
    #[default]
    Available,
    Requested,
}

impl FoodStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Requested => "requested",
        }
    }
}

/// A food listing as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(deserialize_with = "crate::lenient::quantity::deserialize")]
    pub quantity: u32,
    pub pickup_location: String,
    #[serde(deserialize_with = "crate::lenient::date::deserialize")]
    pub expire_date: DateTime<Utc>,
    #[serde(default)]
    pub additional_notes: String,
    pub donor_name: String,
    pub donor_email: String,
    #[serde(default)]
    pub donor_photo: String,
    #[serde(default)]
    pub status: FoodStatus,
    #[serde(default)]
    pub deletable: bool,
}

/// The user-entered part of a new listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDraft {
    pub name: String,
    pub image: String,
    #[serde(deserialize_with = "crate::lenient::quantity::deserialize")]
    pub quantity: u32,
    pub pickup_location: String,
    #[serde(deserialize_with = "crate::lenient::date::deserialize")]
    pub expire_date: DateTime<Utc>,
    pub additional_notes: String,
}

/// Body of `POST /foods`: the draft plus donor details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFood {
    #[serde(flatten)]
    pub draft: FoodDraft,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_photo: String,
    pub status: FoodStatus,
    pub deletable: bool,
}

impl NewFood {
    /// A fresh, available, deletable listing donated by `donor`.
    pub fn listed_by(draft: FoodDraft, donor: &UserIdentity) -> Self {
        Self {
            draft,
            donor_name: donor.display_name().to_string(),
            donor_email: donor.email().to_string(),
            donor_photo: donor.photo_url().unwrap_or_default().to_string(),
            status: FoodStatus::Available,
            deletable: true,
        }
    }
}

/// Body of `PATCH /foods/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FoodStatus>,
}

impl FoodUpdate {
    /// The update that marks a listing as taken.
    pub fn mark_requested() -> Self {
        Self {
            status: Some(FoodStatus::Requested),
            ..Self::default()
        }
    }
}

/// Body of `POST /requests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFoodRequest {
    pub food_id: String,
    pub food_name: String,
    pub donor_name: String,
    pub donor_email: String,
    pub pickup_location: String,
    #[serde(deserialize_with = "crate::lenient::date::deserialize")]
    pub expire_date: DateTime<Utc>,
    pub requester_name: String,
    pub requester_email: String,
    #[serde(default)]
    pub requester_photo: String,
    #[serde(default)]
    pub additional_notes: String,
    pub request_date: DateTime<Utc>,
}

impl NewFoodRequest {
    /// Copies the listing details and stamps the requester.
    pub fn for_food(
        food: &Food,
        requester: &UserIdentity,
        notes: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            food_id: food.id.clone(),
            food_name: food.name.clone(),
            donor_name: food.donor_name.clone(),
            donor_email: food.donor_email.clone(),
            pickup_location: food.pickup_location.clone(),
            expire_date: food.expire_date,
            requester_name: requester.display_name().to_string(),
            requester_email: requester.email().to_string(),
            requester_photo: requester.photo_url().unwrap_or_default().to_string(),
            additional_notes: notes.into(),
            request_date: now,
        }
    }
}

/// A stored request, as returned by `GET /my-requests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub details: NewFoodRequest,
}

/// Sort direction for listings, by expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Query parameters of `GET /foods`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoodQuery {
    pub search: String,
    pub sort: SortOrder,
    pub status: Option<FoodStatus>,
}

impl FoodQuery {
    /// The listing shown on the "available foods" page.
    pub fn available(search: impl Into<String>, sort: SortOrder) -> Self {
        Self {
            search: search.into(),
            sort,
            status: Some(FoodStatus::Available),
        }
    }

    /// Query pairs in the order the backend documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("search", self.search.clone()),
            ("sort", self.sort.as_str().to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

/// Acknowledgement of an insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    #[serde(default)]
    pub inserted_id: Option<String>,
    #[serde(default)]
    pub acknowledged: bool,
}

impl InsertResult {
    pub fn is_inserted(&self) -> bool {
        self.inserted_id.is_some() || self.acknowledged
    }
}

/// Acknowledgement of an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    #[serde(default)]
    pub modified_count: u64,
}

/// Acknowledgement of a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    #[serde(default)]
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn provider_user() -> ProviderUser {
        ProviderUser {
            uid: "uid-1".into(),
            email: "alice@example.com".into(),
            display_name: Some("Alice".into()),
            photo_url: None,
            access_token: "provider-secret-token".into(),
        }
    }

    #[test]
    fn test_from_provider_copies_fields() {
        let id = UserIdentity::from_provider(&provider_user());
        assert_eq!(id.external_id(), "uid-1");
        assert_eq!(id.email(), "alice@example.com");
        assert_eq!(id.display_name(), "Alice");
        assert_eq!(id.photo_url(), None);
        assert_eq!(id.provider_access_token(), "provider-secret-token");
    }

    #[test]
    fn test_from_provider_without_name_uses_anonymous() {
        let mut user = provider_user();
        user.display_name = Some("  ".into());
        let id = UserIdentity::from_provider(&user);
        assert_eq!(id.display_name(), "Anonymous");
    }

    #[test]
    fn test_with_profile_replaces_only_given_fields() {
        let id = UserIdentity::from_provider(&provider_user());
        let updated = id.with_profile(&ProfileUpdate {
            display_name: None,
            photo_url: Some("https://img/a.png".into()),
        });

        assert_eq!(updated.display_name(), "Alice");
        assert_eq!(updated.photo_url(), Some("https://img/a.png"));
        // The original snapshot is untouched.
        assert_eq!(id.photo_url(), None);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let id = UserIdentity::from_provider(&provider_user());
        let printed = format!("{id:?} {:?}", provider_user());
        assert!(!printed.contains("provider-secret-token"));
    }

    #[test]
    fn test_into_token_rejects_blank() {
        let body = JwtResponse { token: " ".into() };
        assert!(matches!(
            body.into_token(),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_food_query_available_pairs() {
        let q = FoodQuery::available("rice", SortOrder::Desc);
        assert_eq!(
            q.to_pairs(),
            vec![
                ("search", "rice".to_string()),
                ("sort", "desc".to_string()),
                ("status", "available".to_string()),
            ]
        );
    }

    #[test]
    fn test_new_food_listed_by_fills_donor() {
        let donor = UserIdentity::from_provider(&provider_user());
        let draft = FoodDraft {
            name: "Rice".into(),
            image: String::new(),
            quantity: 3,
            pickup_location: "Dhaka".into(),
            expire_date: Utc::now(),
            additional_notes: String::new(),
        };

        let food = NewFood::listed_by(draft, &donor);

        assert_eq!(food.donor_email, "alice@example.com");
        assert_eq!(food.status, FoodStatus::Available);
        assert!(food.deletable);
        let json = serde_json::to_value(&food).unwrap();
        // The draft is flattened into the same object.
        assert_eq!(json["name"], "Rice");
        assert_eq!(json["pickupLocation"], "Dhaka");
        assert_eq!(json["donorName"], "Alice");
    }

    #[test]
    fn test_food_decodes_mongo_shape() {
        let json = r#"{
            "_id": "665f",
            "name": "Bread",
            "quantity": 2,
            "pickupLocation": "Park",
            "expireDate": "2025-06-01T00:00:00.000Z",
            "donorName": "Bob",
            "donorEmail": "bob@example.com",
            "status": "requested"
        }"#;
        let food: Food = serde_json::from_str(json).unwrap();
        assert_eq!(food.id, "665f");
        assert_eq!(food.status, FoodStatus::Requested);
        assert!(!food.deletable);
    }

    #[test]
    fn test_food_decodes_form_posted_shapes() {
        let json = r#"{
            "_id": "66a0",
            "name": "Dal",
            "quantity": "5",
            "pickupLocation": "Mirpur",
            "expireDate": "2025-06-01",
            "donorName": "Bob",
            "donorEmail": "bob@example.com"
        }"#;
        let food: Food = serde_json::from_str(json).unwrap();
        assert_eq!(food.quantity, 5);
        assert_eq!(
            food.expire_date,
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
        // Re-encoded in the typed shape.
        let out = serde_json::to_value(&food).unwrap();
        assert_eq!(out["quantity"], 5);
        assert_eq!(out["expireDate"], "2025-06-01T00:00:00Z");
    }

    #[test]
    fn test_food_list_with_one_form_record_decodes() {
        let json = r#"[
            {"_id":"a","name":"Rice","quantity":3,"pickupLocation":"Dhaka",
             "expireDate":"2026-11-01T00:00:00.000Z","donorName":"Bob","donorEmail":"b@x"},
            {"_id":"b","name":"Dal","quantity":"5","pickupLocation":"Mirpur",
             "expireDate":"2025-06-01","donorName":"Bob","donorEmail":"b@x"}
        ]"#;
        let foods: Vec<Food> = serde_json::from_str(json).unwrap();
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[1].quantity, 5);
    }

    #[test]
    fn test_food_request_decodes_date_only_expiry() {
        let json = r#"{
            "_id": "r1",
            "foodId": "a",
            "foodName": "Rice",
            "donorName": "Bob",
            "donorEmail": "b@x",
            "pickupLocation": "Dhaka",
            "expireDate": "2025-06-01",
            "requesterName": "Alice",
            "requesterEmail": "alice@example.com",
            "requestDate": "2025-05-30T10:00:00.000Z"
        }"#;
        let req: FoodRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req.details.expire_date,
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_food_update_serializes_only_set_fields() {
        let json = serde_json::to_value(FoodUpdate::mark_requested()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "requested" }));
    }

    #[test]
    fn test_insert_result_acknowledged_counts_as_inserted() {
        let r: InsertResult =
            serde_json::from_str(r#"{"acknowledged":true}"#).unwrap();
        assert!(r.is_inserted());
        assert!(!InsertResult::default().is_inserted());
    }
}
