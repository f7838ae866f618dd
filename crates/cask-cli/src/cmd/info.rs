//! Info command

use anyhow::Result;
use cask_schema::Checksum;
use std::path::Path;

use crate::ui::Output;

/// Show a summary of a manifest.
pub fn info(path: &Path) -> Result<()> {
    let manifest = super::load(path)?;
    let output = Output::new();

    println!();
    output.header(manifest.token.as_str(), manifest.version.as_str());
    if let Some(desc) = &manifest.desc {
        println!("  {desc}");
    }
    println!();

    if manifest.display_name() != manifest.token.as_str() {
        output.field("name", &manifest.name.join(", "));
    }
    if let Some(homepage) = &manifest.homepage {
        output.field("homepage", homepage);
    }
    if let Some(app) = &manifest.app {
        output.field("app", app);
    }

    for source in &manifest.sources {
        let label = source.arch.map_or("any", |a| a.as_str());
        let checksum = match &source.checksum {
            Checksum::Sha256(_) => "sha256",
            Checksum::NoCheck => "no_check",
        };
        output.field(label, &format!("{} ({checksum})", source.url));
    }

    if let Some(livecheck) = &manifest.livecheck {
        output.field("livecheck", &format!("{} {}", livecheck.strategy, livecheck.url));
    }
    if let Some(uninstall) = &manifest.uninstall {
        output.field("quits", &uninstall.quit.join(", "));
    }
    if let Some(zap) = &manifest.zap {
        output.field("zap", &format!("{} path(s)", zap.trash.len()));
    }

    Ok(())
}
