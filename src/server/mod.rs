//! Server binary resolution and self-update
//!
//! Decides which `ruulang-server` executable to launch and keeps a local
//! cache of downloaded releases current.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Feed     │────▶│  Resolver   │◀────│    Cache    │
//! │  (fetch)    │     │  (policy)   │     │  (storage)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │    Feeds    │     │  Platform   │
//! │  (github)   │     │  (triple)   │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Directory-backed store of version-named binaries
//! - [`error`]: Error types for feed, cache and resolution failures
//! - [`feed`]: Release feed trait and platform asset selection
//! - [`feeds`]: Concrete feed implementations (GitHub Releases)
//! - [`platform`]: `{arch}-{os}` triple of the running machine
//! - [`resolver`]: Launch-path policy with background refresh
//! - [`semver`]: `vMAJOR.MINOR.PATCH` version identifiers
//! - [`types`]: Release metadata and cached binary entries

pub mod cache;
pub mod error;
pub mod feed;
pub mod feeds;
pub mod platform;
pub mod resolver;
pub mod semver;
pub mod types;
