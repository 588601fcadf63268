//! # Panels
//!
//! A client for a comic catalog API: pages through the comics, series,
//! stories and events a character appears in, and prefetches their
//! thumbnails.
//!
//! ## Architecture
//!
//! ```text
//! RouteComposer → RequestSigner → HttpClient → wire decoding → Loader → Feed provider → UI
//! ```
//!
//! - [`api`]: URL composition, request signing and the JSON envelope
//! - [`fetcher`]: HTTP GET behind an async trait
//! - [`loader`]: typed catalog loaders over the HTTP client
//! - [`feed`]: the paginated feed state machine and its UI-thread decorator
//!
//! ## Quick Start
//!
//! ```bash
//! # Put your keys in ~/.config/panels/config.toml, then:
//! panels characters
//! panels character 1009610
//! panels feed 1009610 --kind comics --pages 3 --hero spidey.jpg
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the HTTP
/// client, the catalog loader and feed construction.
pub mod app;

/// Catalog protocol pieces.
///
/// - [`RouteComposer`](api::RouteComposer): resource URLs from a base URL
/// - [`RequestSigner`](api::RequestSigner): `apikey`/`ts`/`hash` and pagination parameters
/// - [`wire`](api::wire): response envelope decoding
pub mod api;

/// Command-line interface using clap.
///
/// - `characters [--page N]` - List characters
/// - `character <id>` - Show a character
/// - `feed <id>` - Page through a character's publications
pub mod cli;

/// Configuration loaded from `~/.config/panels/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Publication`](domain::Publication): a comic, series, story or event
/// - [`Character`](domain::Character): a catalog character
pub mod domain;

/// Publication feed.
///
/// - [`PublicationFeedProvider`](feed::PublicationFeedProvider): single-flight paginated state
/// - [`MainThreadDispatch`](feed::MainThreadDispatch): worker/UI thread placement
/// - [`UiThread`](feed::UiThread): the UI-owning thread
pub mod feed;

/// HTTP fetching.
///
/// - [`HttpClient`](fetcher::HttpClient): async trait for GET requests
/// - [`ReqwestClient`](fetcher::ReqwestClient): reqwest-based implementation
pub mod fetcher;

/// Typed catalog loaders.
///
/// - [`PublicationLoader`](loader::PublicationLoader), [`CharacterLoader`](loader::CharacterLoader)
/// - [`RemoteCatalog`](loader::RemoteCatalog): implementation over [`fetcher::HttpClient`]
pub mod loader;
