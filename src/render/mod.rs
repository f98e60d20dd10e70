//! Message rendering.
//!
//! Turns aggregated fetch results into the Feishu card payload.

pub mod card;

pub use card::build_card;
