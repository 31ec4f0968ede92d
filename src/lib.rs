//! A small Rust client for the OpenStreetMap changesets API.
//!
//! The API serves changeset metadata in a few different JSON layouts
//! depending on the endpoint. This crate fetches it and normalizes every
//! layout into one [`Changeset`] record, with a [`Bounds`] that knows its
//! geodesic area on the WGS84 ellipsoid.
//!
//! ## Quick start
//! - Optionally point the client elsewhere via `OSM_API_URL` or a
//!   `.osmchangesetsrc` file (current directory or home directory).
//! - Fetch by id, by a list of ids, by filters, or the latest changesets.
//!
//! ```no_run
//! use anyhow::Result;
//! use osmchangesets::{BoundingBox, ChangesetQuery, Client};
//!
//! fn main() -> Result<()> {
//!     let client = Client::from_env()?;
//!
//!     let changeset = client.get_changeset(147937232)?;
//!     println!("{:?} covers {} m²", changeset.osm_id, changeset.bounds.area());
//!
//!     let query = ChangesetQuery::new()
//!         .display_name("mvexel")
//!         .bbox(BoundingBox::new(3.2, 50.8, 7.2, 53.6)?);
//!     for changeset in client.query_changesets(&query)? {
//!         println!("{:?}", changeset.bounds.wkt());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Responses already in hand can be parsed without a client:
//!
//! ```
//! use osmchangesets::Changeset;
//!
//! let changeset = Changeset::normalize(r#"{"elements": [{"id": 1, "changes_count": 3}]}"#)?;
//! assert_eq!(changeset.osm_id, Some(1));
//! assert_eq!(changeset.bounds.area(), 0.0);
//! # Ok::<(), osmchangesets::Error>(())
//! ```

#![forbid(unsafe_code)]

mod bounds;
mod changeset;
mod client;
mod config;
mod error;
pub mod geodesy;
mod query;
mod tag;
mod util;

pub use bounds::Bounds;
pub use changeset::{Changeset, ChangesetInput};
pub use client::{Client, ClientConfig, DEFAULT_LIMIT, MAX_LIMIT};
pub use error::{Error, Result};
pub use query::{BoundingBox, ChangesetQuery};
pub use tag::Tag;
