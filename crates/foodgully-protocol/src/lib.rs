//! Wire types for the FoodGully client.
//!
//! This crate defines the data that crosses a process boundary:
//!
//! - **Identity** ([`ProviderUser`], [`UserIdentity`], [`ProfileUpdate`]):
//!   what the identity provider hands us, and the snapshot we publish.
//! - **Token exchange** ([`JwtResponse`]): the body of `POST /jwt`.
//! - **Marketplace records** ([`Food`], [`FoodRequest`], ...): the JSON
//!   shapes of the foods/requests API.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes ⇄ types.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Protocol (types) ← Transport (HTTP) ← Session (identity + token) ← Routes
//! ```
//!
//! The protocol layer knows nothing about HTTP or sessions; it only knows
//! how the data looks.

mod codec;
mod error;
mod lenient;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    DeleteResult, Food, FoodDraft, FoodQuery, FoodRequest, FoodStatus, FoodUpdate,
    InsertResult, JwtResponse, NewFood, NewFoodRequest, ProfileUpdate,
    ProviderUser, SortOrder, UpdateResult, UserIdentity,
};
