//! Reporting to pull-based collectors.
//!
//! - [`render`]: the [`Report`] projection and its multigraph text form
//! - [`server`]: the TCP listener serving one report per connection

pub mod render;
pub mod server;

pub use render::{format_value, Renderer, Report, SensorReport};
pub use server::ReportServer;
