//! CLI argument definitions for the JDK installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::artefact::platform::Platform;
use crate::catalog::selector::VersionSelector;
use crate::updater::provider::Provider;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Install relocated, self-contained JDK distributions.
#[derive(Parser, Debug)]
#[command(name = "jdk-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install relocated, self-contained JDK distributions.\n\n",
    "A distribution is looked up in a JSON catalog by provider and version ",
    "selector, downloaded, checked against its SHA-256 digest, unpacked, and ",
    "patched so that it runs against an explicit set of shared-library ",
    "dependencies. Every dynamically linked executable is wrapped in a launcher ",
    "that exports those dependencies.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the current LTS release from Adoptium:\n",
    "    $ jdk-installer install --provider adoptium --version lts --out /opt/jdk\n\n",
    "  Show which build a selector resolves to:\n",
    "    $ jdk-installer resolve --provider semeru --version 17 --json\n\n",
    "  Re-run relocation and wrapping on an unpacked tree:\n",
    "    $ jdk-installer finalize ./jdk-21.0.2+13\n\n",
    "  Refresh the catalog from the Adoptium API:\n",
    "    $ jdk-installer update-catalog --provider adoptium --catalog catalog.json",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Download, verify, relocate, and publish a JDK.
    Install(InstallArgs),

    /// Relocate and wrap an already unpacked JDK in place.
    Finalize(FinalizeArgs),

    /// Print the catalog record a selector resolves to.
    Resolve(ResolveArgs),

    /// Regenerate a provider's catalog entry from its release API.
    UpdateCatalog(UpdateCatalogArgs),
}

/// Catalog lookup arguments shared by `install` and `resolve`.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Provider identifier as it appears in the catalog, e.g. adoptium.
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: String,

    /// Major version or rolling alias (latest, stable, lts).
    #[arg(long = "version", value_name = "SELECTOR")]
    pub selector: VersionSelector,

    /// Target platform triple [default: host].
    #[arg(long, value_name = "TRIPLE")]
    pub platform: Option<Platform>,

    /// Catalog file [default: <config dir>/jdk-installer/catalog.json].
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<Utf8PathBuf>,
}

/// Arguments for the install command.
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Which distribution to install.
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Installation directory [default: ./<provider>-<version>].
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<Utf8PathBuf>,

    /// Configuration file [default: $JDK_INSTALLER_CONFIG or per-user file].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Show what would be installed and exit without downloading.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the finalize command.
#[derive(Args, Debug, Clone)]
pub struct FinalizeArgs {
    /// Root of the unpacked JDK.
    #[arg(value_name = "DIR")]
    pub dir: Utf8PathBuf,

    /// Path recorded as the JDK home [default: DIR].
    #[arg(long, value_name = "PATH")]
    pub home: Option<Utf8PathBuf>,

    /// Target platform triple [default: host].
    #[arg(long, value_name = "TRIPLE")]
    pub platform: Option<Platform>,

    /// Configuration file [default: $JDK_INSTALLER_CONFIG or per-user file].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,
}

/// Arguments for the resolve command.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Which distribution to resolve.
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the update-catalog command.
#[derive(Args, Debug, Clone)]
pub struct UpdateCatalogArgs {
    /// Provider to query: adoptium or semeru.
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Provider,

    /// Target platform triple [default: host].
    #[arg(long, value_name = "TRIPLE")]
    pub platform: Option<Platform>,

    /// Catalog file to update [default: <config dir>/jdk-installer/catalog.json].
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<Utf8PathBuf>,

    /// Query this API root instead of the provider's public endpoint.
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Configuration file supplying the network timeout.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
