//! REST implementation of the search service client.
//!
//! This module provides a concrete implementation of `SearchServiceClient`
//! over the service's HTTPS/JSON API.

mod client;
mod response;

pub use client::RestSearchClient;
