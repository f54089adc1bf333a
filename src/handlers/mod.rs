//! HTTP surface (§6). One module per resource family, each exposing a
//! `pub fn routes() -> Router<AppState>` merged together in `main.rs`.

pub mod auth;
pub mod health;
pub mod inventory;
pub mod masterdata;
pub mod orders;

pub use crate::AppState;
