//! Watch session: the default command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use console::style;

use crate::cli::args::WatchArgs;
use crate::compile::CompileService;
use crate::config::Settings;
use crate::pipeline::{FilePipeline, WatchTarget};
use crate::registry::{ExtensionIndex, InstalledSet, Registry};
use crate::reload::{LiveReloadServer, ReloadOptions};
use crate::watcher::SessionWatcher;

/// Build the session from settings and flags, then watch until Ctrl-C.
///
/// Every error returned from here is a startup failure.
pub async fn run(args: WatchArgs, settings: &Settings) -> anyhow::Result<()> {
    let project_root = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot read current directory")?,
    };
    let project_root = project_root
        .canonicalize()
        .with_context(|| format!("Cannot open project directory {}", project_root.display()))?;

    let ignored: Vec<PathBuf> = settings
        .watch
        .ignore
        .iter()
        .cloned()
        .chain(args.ignore)
        .collect();
    let target = WatchTarget::new(project_root, args.src, args.dist, ignored)?;

    if let Some(dist) = target.dist_root() {
        tokio::fs::create_dir_all(dist)
            .await
            .with_context(|| format!("Cannot create {}", dist.display()))?;
    }

    let registry = Registry::builtin();
    let installed = InstalledSet::load(&registry, &settings.manifest_path())
        .context("Cannot determine installed preprocessors")?;
    if installed.is_empty() {
        tracing::warn!("[session] no preprocessors installed, files will only be copied or reloaded");
    } else {
        crate::log_event!("session", "preprocessors", "{}", installed.names().join(", "));
    }

    let index = ExtensionIndex::build(&installed);
    let compiler = CompileService::from_installed(&installed, &settings.bin_dir());

    let server = LiveReloadServer::init(ReloadOptions {
        root_dir: target.output_root().to_path_buf(),
        host: settings.server.host.clone(),
        port: args.port.unwrap_or(settings.server.port),
        ui_port: args.ui_port.unwrap_or(settings.server.ui_port),
    })
    .await
    .context("Cannot start the reload server")?;

    println!(
        "{} {}",
        style("Serving").green().bold(),
        style(format!("http://{}", server.local_addr())).cyan()
    );
    println!(
        "{} {}",
        style("Status ").green().bold(),
        style(format!("http://{}", server.ui_addr())).cyan()
    );
    println!(
        "{} {}",
        style("Watching").green().bold(),
        target.watched_root().display()
    );
    if target.dist_root().is_some() {
        println!(
            "{} {}",
            style("Output  ").green().bold(),
            server.root_dir().display()
        );
    }

    let pipeline = Arc::new(FilePipeline::new(target, index, compiler, Arc::new(server)));
    let watcher = SessionWatcher::new(pipeline, settings.watch.debounce_ms)
        .context("Cannot start the file watcher")?;

    watcher.watch().await?;
    Ok(())
}
