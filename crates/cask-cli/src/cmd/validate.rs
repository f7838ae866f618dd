//! Validate command

use anyhow::{Context, Result, bail};
use cask_core::corpus::{self, ManifestFile, Problem};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::ui::Output;

#[derive(Serialize)]
struct Report<'a> {
    dir: &'a Path,
    files: usize,
    valid: Vec<&'a str>,
    problems: &'a [Problem],
}

/// Read every manifest under `dir` concurrently and validate them as a batch.
pub async fn validate(dir: &Path, json: bool) -> Result<()> {
    let paths = corpus::discover(dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    let reads: Vec<(PathBuf, std::io::Result<String>)> = stream::iter(paths)
        .map(|path| async move {
            let content = tokio::fs::read_to_string(&path).await;
            (path, content)
        })
        .buffer_unordered(num_cpus::get())
        .collect()
        .await;

    let mut files = Vec::with_capacity(reads.len());
    let mut problems = Vec::new();
    for (path, content) in reads {
        match content {
            Ok(content) => files.push(ManifestFile { path, content }),
            Err(e) => problems.push(Problem {
                kind: "io",
                message: format!("{}: {e}", path.display()),
            }),
        }
    }
    // completion order is arbitrary
    files.sort_by(|a, b| a.path.cmp(&b.path));
    problems.sort_by(|a, b| a.message.cmp(&b.message));

    let total = files.len() + problems.len();
    let batch = corpus::validate_batch(&files);
    problems.extend(batch.problems());

    if json {
        let report = Report {
            dir,
            files: total,
            valid: batch.manifests.iter().map(|m| m.token.as_str()).collect(),
            problems: &problems,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let output = Output::new();
        for problem in &problems {
            output.error(&problem.message);
        }
        output.summary_plain(batch.manifests.len(), "manifest", "valid");
    }

    if !problems.is_empty() {
        bail!("{} problem(s) in {}", problems.len(), dir.display());
    }
    Ok(())
}
