use miette::{IntoDiagnostic, Result};
use npmflat_core::flatten::{read_listing, render_recipe, run_npm_ls, to_json, write_output};
use npmflat_core::{flatten_tree, Config, DependencyTree, FlatResolution, HashFetcher};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;

/// Rendering of the flattened resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Recipe `resource` stanzas
    Recipe,
    /// The full resolution as JSON
    Json,
}

#[derive(Debug)]
pub struct ResolveArgs {
    pub listing: Option<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub hash: bool,
}

pub fn run(config: &Config, args: ResolveArgs) -> Result<()> {
    info!(cwd = %config.cwd.display(), native = config.native_addons, "RESOLVE command invoked");

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let flat = runtime.block_on(resolve(config, &args))?;

    let rendered = match args.format {
        OutputFormat::Recipe => render_recipe(&flat),
        OutputFormat::Json => {
            let mut json = to_json(&flat).into_diagnostic()?;
            json.push('\n');
            json
        }
    };

    match &args.output {
        Some(path) => {
            let path = config.cwd.join(path);
            write_output(&path, &rendered).into_diagnostic()?;
            info!(path = %path.display(), resources = flat.resources.len(), "wrote resources");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

async fn resolve(config: &Config, args: &ResolveArgs) -> Result<FlatResolution> {
    let tree = load_listing(config, args.listing.as_deref()).await?;

    let fetcher = if args.hash {
        Some(
            HashFetcher::new()
                .into_diagnostic()?
                .with_max_concurrent(config.max_concurrent_fetches),
        )
    } else {
        None
    };

    flatten_tree(&tree, &config.resolve_options(), fetcher.as_ref())
        .await
        .into_diagnostic()
}

async fn load_listing(config: &Config, listing: Option<&Path>) -> Result<DependencyTree> {
    match listing {
        Some(path) if path == Path::new("-") => {
            let mut json = String::new();
            tokio::io::stdin()
                .read_to_string(&mut json)
                .await
                .into_diagnostic()?;
            DependencyTree::from_json(&json).into_diagnostic()
        }
        Some(path) => read_listing(&config.cwd.join(path)).await.into_diagnostic(),
        None => run_npm_ls(&config.cwd).await.into_diagnostic(),
    }
}
