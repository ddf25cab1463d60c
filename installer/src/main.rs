//! JDK installer CLI entrypoint.
//!
//! This binary resolves a JDK distribution from the catalog, installs it as
//! a relocated, self-contained tree, and maintains the catalog itself.

use camino::Utf8PathBuf;
use clap::Parser;
use jdk_installer::artefact::download::HttpDownloader;
use jdk_installer::artefact::extraction::TarExtractor;
use jdk_installer::artefact::platform::Platform;
use jdk_installer::catalog::Catalog;
use jdk_installer::catalog::error::CatalogError;
use jdk_installer::catalog::record::DistributionRecord;
use jdk_installer::cli::{
    Cli, Command, FinalizeArgs, InstallArgs, ResolveArgs, SelectionArgs, UpdateCatalogArgs,
};
use jdk_installer::command::SystemCommandExecutor;
use jdk_installer::config::{self, Config};
use jdk_installer::elf::Patchelf;
use jdk_installer::error::{InstallerError, Result};
use jdk_installer::logging;
use jdk_installer::output::{
    DryRunInfo, finalize_summary, record_text, success_message, write_line, write_stderr_line,
};
use jdk_installer::pipeline::{Fetchers, PipelineContext, finalize, install};
use jdk_installer::updater::api::HttpProviderApi;
use jdk_installer::updater::update_catalog;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbosity, cli.quiet));
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Command::Install(args) => run_install(args, cli.quiet, stderr),
        Command::Finalize(args) => run_finalize(args, cli.quiet, stderr),
        Command::Resolve(args) => run_resolve(args, stdout),
        Command::UpdateCatalog(args) => run_update_catalog(args, cli.quiet, stderr),
    }
}

/// Resolves, installs, and reports a distribution.
fn run_install(args: &InstallArgs, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let (platform, record) = resolve_selection(&args.selection)?;
    let destination = args
        .out
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from(record.install_dir_name()));
    let config = Config::load(args.config.as_deref())?;

    if args.dry_run {
        let config_path = config::locate(args.config.as_deref());
        let info = DryRunInfo {
            platform: platform.as_str(),
            record: &record,
            destination: &destination,
            config_path: config_path.as_deref(),
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let executor = SystemCommandExecutor::with_timeout(config.network.command_timeout());
    let patcher = Patchelf::new(&executor);
    let downloader = HttpDownloader::with_timeout(config.network.timeout());
    let context = PipelineContext {
        platform: &platform,
        config: &config,
        patcher: &patcher,
        quiet,
    };
    let fetchers = Fetchers {
        downloader: &downloader,
        extractor: &TarExtractor,
    };
    let installation = install(&context, &fetchers, &record, &destination, stderr)?;

    if !quiet {
        write_stderr_line(
            stderr,
            finalize_summary(&installation.outcome.relocation, &installation.outcome.wrap),
        );
        write_stderr_line(stderr, success_message(&record, &installation.destination));
    }
    Ok(())
}

/// Finalizes an unpacked tree in place.
fn run_finalize(args: &FinalizeArgs, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let platform = resolve_platform(args.platform.clone())?;
    let config = Config::load(args.config.as_deref())?;
    let executor = SystemCommandExecutor::with_timeout(config.network.command_timeout());
    let patcher = Patchelf::new(&executor);
    let context = PipelineContext {
        platform: &platform,
        config: &config,
        patcher: &patcher,
        quiet,
    };
    let outcome = finalize(&context, &args.dir, args.home.as_deref(), stderr)?;
    if !quiet {
        write_stderr_line(stderr, finalize_summary(&outcome.relocation, &outcome.wrap));
    }
    Ok(())
}

/// Prints the record a selector resolves to.
fn run_resolve(args: &ResolveArgs, stdout: &mut dyn Write) -> Result<()> {
    let (_, record) = resolve_selection(&args.selection)?;
    if args.json {
        let json = serde_json::to_string_pretty(&record).map_err(|e| InstallerError::WriteFailed {
            source: e.into(),
        })?;
        write_line(stdout, json)
    } else {
        write_line(stdout, record_text(&record))
    }
}

/// Regenerates one provider's catalog entry.
fn run_update_catalog(args: &UpdateCatalogArgs, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let platform = resolve_platform(args.platform.clone())?;
    let catalog_path = resolve_catalog_path(args.catalog.clone())?;
    let config = Config::load(args.config.as_deref())?;
    let mut api = HttpProviderApi::new(args.provider, config.network.timeout());
    if let Some(url) = &args.api_url {
        api = api.with_base_url(url.as_str());
    }

    if !quiet {
        write_stderr_line(
            stderr,
            format!("Querying {} releases for {platform}...", args.provider),
        );
    }
    let entry = update_catalog(&catalog_path, &api, args.provider, &platform)?;
    if !quiet {
        write_stderr_line(
            stderr,
            format!(
                "Updated {catalog_path}: {} {} (JDK {})",
                args.provider,
                platform,
                entry.available_majors()
            ),
        );
    }
    Ok(())
}

fn resolve_selection(selection: &SelectionArgs) -> Result<(Platform, DistributionRecord)> {
    let platform = resolve_platform(selection.platform.clone())?;
    let catalog_path = resolve_catalog_path(selection.catalog.clone())?;
    log::debug!("reading catalog {catalog_path}");
    let catalog = Catalog::load(&catalog_path)?;
    let record = catalog.resolve(&platform, &selection.provider, selection.selector)?;
    log::info!("resolved {} {} for {platform}", record.provider, record.version);
    Ok((platform, record))
}

/// Uses the requested platform or falls back to the host.
fn resolve_platform(requested: Option<Platform>) -> Result<Platform> {
    requested
        .or_else(Platform::host)
        .ok_or(InstallerError::UnknownHostPlatform)
}

/// Uses the requested catalog or falls back to the per-user default.
fn resolve_catalog_path(requested: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
    requested
        .or_else(config::default_catalog_path)
        .ok_or_else(|| {
            InstallerError::from(CatalogError::Io {
                path: "catalog.json".to_owned(),
                reason: "could not determine the configuration directory; pass --catalog"
                    .to_owned(),
            })
        })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::debug!("{err:?}");
            write_stderr_line(stderr, err);
            1
        }
    }
}
