//! Load a semantic tree, lower it, render the result.

use crate::args::{CliArgs, OutputFormat};
use anyhow::{Context, Result, bail};
use declink_common::Diagnostic;
use declink_lower::dump::{self, DumpFilter};
use declink_lower::{LoweringOptions, LoweringSession};
use declink_semantic::SemanticTree;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything one run produces.
#[derive(Debug)]
pub struct LowerOutcome {
    /// Rendered declarations, in tree order.
    pub output: String,
    /// Sorted by subject, then code.
    pub diagnostics: Vec<Diagnostic>,
    /// Linkable declarations constructed by the session.
    pub declarations: usize,
}

pub fn load_tree(path: &Path) -> Result<SemanticTree> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tree: SemanticTree = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse semantic tree {}", path.display()))?;
    declink_semantic::validate(&tree)
        .with_context(|| format!("invalid semantic tree {}", path.display()))?;
    debug!(path = %path.display(), decls = tree.len(), "loaded semantic tree");
    Ok(tree)
}

pub fn load_options(path: Option<&Path>) -> Result<LoweringOptions> {
    let Some(path) = path else {
        return Ok(LoweringOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse options {}", path.display()))
}

pub fn run(args: &CliArgs) -> Result<LowerOutcome> {
    let tree = load_tree(&args.input)?;
    let options = load_options(args.options.as_deref())?;
    let filter = DumpFilter {
        classes: args.classes.clone(),
        skip_fake_overrides: args.no_fake_overrides,
    };
    match args.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("failed to build thread pool")?;
            pool.install(|| lower(tree, options, &filter, args.format))
        }
        None => lower(tree, options, &filter, args.format),
    }
}

/// Lower the selected roots in parallel and render them in tree order.
pub fn lower(
    tree: SemanticTree,
    options: LoweringOptions,
    filter: &DumpFilter,
    format: OutputFormat,
) -> Result<LowerOutcome> {
    for name in &filter.classes {
        let found = tree
            .top_level()
            .iter()
            .any(|&id| tree.class(id).is_some() && tree.decl_name(id) == name);
        if !found {
            bail!("no top-level class named `{name}`");
        }
    }

    let (session, collector) = LoweringSession::with_collector(Arc::new(tree), options);
    let roots = dump::roots(&session, &filter.classes);
    let dumps = roots
        .par_iter()
        .map(|&root| dump::dump_semantic(&session, root, filter))
        .collect::<Result<Vec<_>, _>>()
        .context("lowering failed")?;

    let output = match format {
        OutputFormat::Text => dump::render_text(&dumps),
        OutputFormat::Json => {
            let mut json = dump::render_json(&dumps).context("failed to render JSON")?;
            json.push('\n');
            json
        }
    };

    let mut diagnostics = collector.take();
    diagnostics.sort_by(|a, b| a.subject.cmp(&b.subject).then(a.code.cmp(&b.code)));
    let declarations = session.storage().len();
    info!(
        roots = roots.len(),
        declarations,
        diagnostics = diagnostics.len(),
        "lowering finished"
    );
    Ok(LowerOutcome {
        output,
        diagnostics,
        declarations,
    })
}
