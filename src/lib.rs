//! Themed city map posters from OpenStreetMap data.
//!
//! The pipeline: geocode a city, frame a bounding box around it, fetch the
//! street network plus water and park layers (cache-first, with persistent
//! JSON caching keyed by content), classify roads into visual tiers, and
//! rasterize a print-ready poster with edge vignettes and a typographic
//! footer. [`poster::generate_batch`] drives the whole thing for a list of
//! themes; the lower layers are usable on their own.

#![forbid(unsafe_code)]

pub mod cache;
pub mod foundation;
pub mod geodata;
pub mod layout;
pub mod poster;
pub mod render;
pub mod style;

pub use foundation::error::{PosterError, PosterResult};
