//! Template expansion and logo compositing for a system-fetch tool.
//!
//! A layout is a list of lines carrying `$(command)`, `$<module.member>` and
//! `${color}` directives. [`render::Renderer`] expands them against a
//! [`registry::Registry`] of host facts and [`display::compose`] places the
//! result beside a logo.

pub mod ascii;
pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod exec;
pub mod facts;
pub mod parse;
pub mod pci;
pub mod registry;
pub mod render;

pub use config::Config;
pub use error::{FetchError, Result};
pub use registry::{FactProvider, Members, ModuleId, Registry, Value};
pub use render::{Rendered, Renderer};
