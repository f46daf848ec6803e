//! In-memory micro-blogging core: profiles, posts, a hashtag index and a
//! follow graph owned by one [`Repository`], plus a thin JSON HTTP surface.

pub mod auth;
pub mod config;
pub mod core;
pub mod feed;
pub mod follow;
pub mod handlers;
pub mod hashtags;
pub mod models;
pub mod posts;
pub mod repository;
pub mod users;

pub use crate::config::RepositoryConfig;
pub use crate::core::errors::{ApiError, StoreError, StoreResult};
pub use crate::models::models::{FollowEdge, Handle, Post, Profile, RepositorySnapshot, RepositoryStats};
pub use crate::repository::Repository;
