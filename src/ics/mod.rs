//! ICS document handling: inbound parsing and outbound generation.

pub mod generate;
pub mod parse;

pub use generate::{generate_feed, generate_feed_at};
pub use parse::parse_feed;
