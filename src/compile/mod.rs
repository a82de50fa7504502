//! Schema compiler.
//!
//! ```text
//!              task.yaml -+----------------> menu.json
//!          argument.yaml -+-> args.json ---> config_generated.{py,rs}
//!          override.yaml -+       |
//!           default.yaml -+       |
//!              events.md --------\|
//!               gui.yaml --------\|
//! (old) i18n/<lang>.json ---------\========> i18n/<lang>.json
//! ```
//!
//! A [`Generator`] is built once per run from loaded [`Sources`]. Every
//! derived document is computed eagerly in [`Generator::compile`], in a fixed
//! order, and held as a plain field afterwards.

pub mod argument;
pub mod events;
pub mod menu;
pub mod schema;

pub use argument::{STORAGE, build_argument_table};
pub use events::{inject_event_options, inject_packages, inject_servers};
pub use menu::{MenuEntry, build_menu, menu_document};
pub use schema::{Layer, apply_layer, bind_commands, build_schema_tree};

use crate::diagnostics::Diagnostics;
use crate::emit::{self, CodeTarget};
use crate::io;
use crate::settings::Settings;
use crate::source::Sources;
use serde_json::Value;
use std::time::Instant;
use tracing::instrument;

pub const ARGS_FILE: &str = "args.json";
pub const MENU_FILE: &str = "menu.json";

/// One compile run: sources in, every derived document out.
#[derive(Debug, Clone)]
pub struct Generator {
    pub sources: Sources,
    /// `group -> field -> spec`, with injected package/server options.
    pub argument: Value,
    /// `task -> group -> field -> spec`, the compiled schema tree.
    pub args: Value,
    pub menu: Vec<(String, MenuEntry)>,
    pub diagnostics: Diagnostics,
}

impl Generator {
    #[instrument(name = "compile", skip_all)]
    pub fn compile(sources: Sources) -> Self {
        let started = Instant::now();
        let mut diagnostics = Diagnostics::new();

        let mut argument = build_argument_table(&sources.argument);
        let mut args = build_schema_tree(
            &argument,
            &sources.task,
            &sources.dashboard,
            &mut diagnostics,
        );
        // Override strictly after Default.
        apply_layer(&mut args, &sources.default, Layer::Default, true, &mut diagnostics);
        apply_layer(&mut args, &sources.overrides, Layer::Override, true, &mut diagnostics);
        bind_commands(&mut args, &sources.task);

        inject_event_options(&mut args, &sources.events);
        inject_packages(&mut argument, &mut args, &sources.registry);
        inject_servers(&mut argument, &mut args, &sources.registry);

        let menu = build_menu(&sources.task);

        tracing::info!(
            elapsed = ?started.elapsed(),
            tasks = args.as_object().map_or(0, |m| m.len()),
            diagnostics = diagnostics.len(),
            "compiled schema"
        );

        Self {
            sources,
            argument,
            args,
            menu,
            diagnostics,
        }
    }

    pub fn menu_document(&self) -> anyhow::Result<Value> {
        menu_document(&self.menu)
    }

    /// Generated declarations for `target`.
    pub fn code(&self, target: CodeTarget) -> String {
        emit::code::render_declarations(&self.argument, target)
    }

    /// Localization document for `lang`, falling back to `old` for known text.
    pub fn i18n(&self, lang: &str, old: &Value) -> Value {
        emit::i18n::build_i18n(lang, old, self)
    }
}

/// Load sources, compile, and write every artifact described by `settings`.
#[instrument(skip_all, fields(source = %settings.source_dir.display()))]
pub fn generate(settings: &Settings) -> anyhow::Result<Generator> {
    let sources = Sources::load(&settings.source_dir)?;
    let generator = Generator::compile(sources);

    let started = Instant::now();
    io::write_json(&settings.output_dir.join(ARGS_FILE), &generator.args)?;
    io::write_json(&settings.output_dir.join(MENU_FILE), &generator.menu_document()?)?;

    let target = settings.code_target;
    io::write_text(
        &settings.output_dir.join(target.file_name()),
        &generator.code(target),
    )?;

    for lang in &settings.locales {
        let path = settings.i18n_dir.join(format!("{lang}.json"));
        let old = io::read_optional(&path)?;
        io::write_json(&path, &generator.i18n(lang, &old))?;
    }

    tracing::info!(
        elapsed = ?started.elapsed(),
        output = %settings.output_dir.display(),
        locales = settings.locales.len(),
        "wrote artifacts"
    );
    Ok(generator)
}
