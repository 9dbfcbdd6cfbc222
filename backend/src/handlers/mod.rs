//! HTTP handlers

mod forecast;
mod health;
mod regions;

pub use forecast::*;
pub use health::*;
pub use regions::*;
