//! Emitters: compiled documents rendered into generated code and locale files.

pub mod code;
pub mod i18n;

pub use code::{CodeTarget, LiteralRenderer, render_declarations};
pub use i18n::build_i18n;
