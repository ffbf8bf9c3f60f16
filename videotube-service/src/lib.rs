//! VideoTube backend service: videos, tweets, comments, playlists, and
//! the like/subscription relationship engine behind them. Interaction
//! counts are never stored; they are derived from edge tables at read
//! time.

pub mod app_state;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod security;
pub mod services;
