//! # Cogwheel AniList
//!
//! AniList integration for Cogwheel: a pooled, rate limited GraphQL client
//! behind the [`RemoteDataProvider`] trait, persisted OAuth credentials with an
//! in-memory cache, and renderer-agnostic profile, list and comparison cards.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod client;
pub mod credentials;
pub mod error;
pub mod models;
mod queries;

pub use card::{Card, CardField};
pub use client::{AniListClient, RemoteDataProvider};
pub use credentials::{CredentialCache, CredentialStore, SledCredentialStore};
pub use error::ProviderError;
pub use models::*;
