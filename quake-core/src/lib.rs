//! Earthquake feed loading for map consumers.
//!
//! [`QuakeLoader`] fetches one of two fixed JSON feeds, decodes every element
//! into an [`Earthquake`] with per-field defaults, swaps the stored list in one
//! step and announces progress on a typed broadcast channel. The [`pin`]
//! module turns records into map annotation data.
//!
//! ```no_run
//! use quake_config::QuakeConfig;
//! use quake_core::{LoaderEvent, QuakeLoader};
//!
//! # #[tokio::main]
//! # async fn main() -> quake_common::Result<()> {
//! let loader = QuakeLoader::from_config(&QuakeConfig::default())?;
//! let mut events = loader.subscribe();
//! loader.load().await;
//! while let Ok(event) = events.try_recv() {
//!     if event == LoaderEvent::Loaded {
//!         println!("{} earthquakes", loader.earthquakes().await.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
pub mod decode;
pub mod loader;
pub mod model;
pub mod pin;
pub mod source;

pub use loader::{Endpoints, LoadError, LoadOutcome, LoaderEvent, QuakeLoader};
pub use model::Earthquake;
pub use pin::{annotations, Annotation, Coordinate, MapItem, PinColor};
pub use quake_common::Endpoint;
pub use source::FeedSource;
