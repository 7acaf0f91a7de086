//! # Route Handlers
//!
//! | Prefix | Module | Auth |
//! |---|---|---|
//! | `/v1/reports`, `/v1/reports/:id/schema` | [`reports`] | bearer |
//! | `/v1/reports/:id/embed-token` | [`embed`] | bearer |
//! | `/v1/reports/:id/render` | [`render`] | embed credential |

pub mod embed;
pub mod render;
pub mod reports;
