//! confgen: compiles declarative configuration sources into a merged schema,
//! menu, generated declarations and locale files, and migrates persisted user
//! configs onto the current schema.

pub mod buckets;
pub mod compile;
pub mod deep;
pub mod diagnostics;
pub mod emit;
pub mod event;
pub mod io;
pub mod literal;
pub mod migrate;
pub mod registry;
pub mod settings;
pub mod source;

pub use compile::{Generator, generate};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use migrate::ConfigUpdater;
pub use settings::Settings;
pub use source::Sources;

pub type Result<T> = anyhow::Result<T>;
