//! Transport layer (HTTP).
//!
//! Extracts badge parameters from the query string, calls the Badge Service,
//! and maps results onto SVG responses with cache and CORS headers.

pub mod badge;
