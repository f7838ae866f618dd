//! Plan command

use anyhow::{Context, Result};
use cask_core::plan::NoteLevel;
use cask_core::{Action, Intent, PlanOptions, expand_home};
use cask_schema::{Arch, Version};
use std::path::{Path, PathBuf};

use crate::ui::Output;

/// Options for [`plan`].
#[derive(Debug, Clone)]
pub struct PlanArgs {
    pub appdir: PathBuf,
    pub version: Option<String>,
    pub expand_home: bool,
    pub json: bool,
}

/// Print the ordered actions for `intent`.
pub fn plan(path: &Path, intent: Intent, arch: Arch, args: &PlanArgs) -> Result<()> {
    let manifest = super::load(path)?;
    let version = args.version.as_deref().map(Version::new);
    let resolved = cask_core::resolve(&manifest, arch, version.as_ref())
        .with_context(|| format!("Failed to resolve {} for {arch}", manifest.token))?;
    let options = PlanOptions {
        appdir: args.appdir.clone(),
    };
    let mut plan = cask_core::plan(&resolved, intent, &options)
        .with_context(|| format!("Failed to plan {intent} for {}", manifest.token))?;

    if args.expand_home {
        for action in &mut plan.actions {
            if let Action::RemovePath { path } = action {
                *path = expand_home(path).display().to_string();
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let output = Output::new();
    output.header(plan.token.as_str(), plan.version.as_str());
    output.field("intent", plan.intent.as_str());
    output.field("arch", plan.arch.as_str());
    println!();
    for (i, action) in plan.actions.iter().enumerate() {
        println!("  {:>2}. {action}", i + 1);
    }
    if plan.actions.is_empty() {
        output.info("Nothing to do");
    }
    for note in &plan.notes {
        match note.level {
            NoteLevel::Info => output.info(&note.message),
            NoteLevel::Warning => output.warning(&note.message),
        }
    }
    Ok(())
}
