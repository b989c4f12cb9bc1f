//! Typed entity cache for an Instagram-style private API client.
//!
//! This crate models the client-side bookkeeping layer of a provider
//! wrapper: raw API payloads are patched into canonical in-memory [`User`]
//! entities, cached per session, and related users are resolved through
//! lazily fetched follower/following views. All provider I/O goes through
//! narrow collaborator traits; nothing here owns a socket.
//!
//! ## Layout
//!
//! - **Store**: thread-safe id → entity maps with get-or-create upsert
//! - **Entity**: wholesale profile patching, relationship views, friendship
//!   actions, direct sends
//! - **Traits**: [`FriendshipApi`] / [`FeedApi`] / [`DirectApi`] seams to
//!   the underlying transport

pub mod api;
mod cache;
mod chat;
mod client;
mod error;
mod types;
mod user;

pub use api::{DirectApi, FeedApi, FriendshipApi};
pub use cache::EntityStore;
pub use chat::Chat;
pub use client::Client;
pub use error::{ApiError, ClientError};
pub use types::{FeedPage, Message, RawUser};
pub use user::{User, UserProfile};
