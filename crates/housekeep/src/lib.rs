//! Business rules for a two-sided home-services marketplace.
//!
//! Requesters (homeowners) publish job posts and hire; providers (housekeepers) apply to posts
//! and publish services once their verification signals make them eligible. The
//! [`marketplace`] module tree owns every state transition; [`config`], [`error`], and
//! [`telemetry`] carry the service plumbing.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
