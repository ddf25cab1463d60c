//! Launcher generation for dynamically linked executables.
//!
//! Each dynamic executable in the installation is moved aside to
//! `.<name>-wrapped` and replaced by a small bash launcher that puts the
//! runtime dependency set on `LD_LIBRARY_PATH` (and helper tools on `PATH`)
//! before `exec`ing the original. The launcher finds the original relative
//! to its own resolved location, so the installation can be moved freely.

use crate::config::RuntimeDependencySet;
use crate::elf::ElfPatcher;
use crate::error::{InstallerError, Result};
use crate::relocation::find;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// Suffix of a preserved original, after the leading dot and file name.
const WRAPPED_SUFFIX: &str = "-wrapped";

/// Outcome of [`wrap_executables`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrapReport {
    /// Executables replaced by a launcher during this run.
    pub wrapped: Vec<Utf8PathBuf>,
    /// Executables that already had a preserved original.
    pub already_wrapped: Vec<Utf8PathBuf>,
    /// Executables without an ELF interpreter, left untouched.
    pub skipped: Vec<Utf8PathBuf>,
    /// Binaries whose interpreter was rewritten.
    pub interpreter_set: Vec<Utf8PathBuf>,
}

/// Return the preserved-original path for `executable`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use jdk_installer::wrapper::preserved_path;
///
/// assert_eq!(
///     preserved_path(Utf8Path::new("/jdk/bin/java")).as_deref(),
///     Some(Utf8Path::new("/jdk/bin/.java-wrapped"))
/// );
/// ```
#[must_use]
pub fn preserved_path(executable: &Utf8Path) -> Option<Utf8PathBuf> {
    let name = executable.file_name()?;
    Some(executable.with_file_name(format!(".{name}{WRAPPED_SUFFIX}")))
}

fn is_preserved_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(WRAPPED_SUFFIX)
}

/// Wrap every dynamic executable under `root`.
///
/// The helper named `helper` is never wrapped, but still has its interpreter
/// rewritten when `runtime.interpreter` is set. Re-running on a wrapped tree
/// changes nothing.
///
/// # Errors
///
/// Returns an error if the tree cannot be listed, a binary cannot be
/// inspected or patched, or a launcher cannot be written.
pub fn wrap_executables(
    root: &Utf8Path,
    helper: &str,
    runtime: &RuntimeDependencySet,
    patcher: &dyn ElfPatcher,
) -> Result<WrapReport> {
    let mut report = WrapReport::default();
    for path in executables(root)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        if is_preserved_name(name) {
            continue;
        }
        if preserved_path(&path).is_some_and(|p| p.symlink_metadata().is_ok()) {
            report.already_wrapped.push(path);
            continue;
        }
        let Some(current) = patcher.interpreter(&path)? else {
            log::trace!("{path} has no interpreter; leaving it unwrapped");
            report.skipped.push(path);
            continue;
        };
        if let Some(interpreter) = &runtime.interpreter {
            if current != interpreter.as_str() {
                patcher.set_interpreter(&path, interpreter)?;
                report.interpreter_set.push(path.clone());
            }
        }
        if name == helper {
            continue;
        }
        wrap_executable(&path, runtime)?;
        report.wrapped.push(path);
    }
    Ok(report)
}

fn executables(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    Ok(find(root, "**/*")?
        .into_iter()
        .filter(|path| {
            path.symlink_metadata()
                .is_ok_and(|meta| meta.is_file() && is_executable(&meta))
        })
        .collect())
}

#[cfg(unix)]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;

    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &std::fs::Metadata) -> bool {
    false
}

/// Move `executable` aside and install a launcher in its place.
///
/// # Errors
///
/// Returns [`InstallerError::WrapperGeneration`] if the original cannot be
/// moved or the launcher cannot be written. A failed write restores the
/// original.
pub fn wrap_executable(executable: &Utf8Path, runtime: &RuntimeDependencySet) -> Result<()> {
    let failure = |reason: String| InstallerError::WrapperGeneration {
        path: executable.to_owned(),
        reason,
    };
    let preserved =
        preserved_path(executable).ok_or_else(|| failure("path has no file name".to_owned()))?;
    let preserved_name = preserved.file_name().unwrap_or_default();
    let script = launcher_script(preserved_name, runtime);

    std::fs::rename(executable, &preserved)
        .map_err(|e| failure(format!("failed to preserve original: {e}")))?;
    if let Err(e) = write_launcher(executable, &script) {
        let _ = std::fs::remove_file(executable);
        let _ = std::fs::rename(&preserved, executable);
        return Err(failure(format!("failed to write launcher: {e}")));
    }
    log::debug!("wrapped {executable}");
    Ok(())
}

#[cfg(unix)]
fn write_launcher(path: &Utf8Path, script: &str) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, script)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn write_launcher(path: &Utf8Path, script: &str) -> std::io::Result<()> {
    std::fs::write(path, script)
}

/// Render the bash launcher that execs `preserved_name` from its own
/// directory.
#[must_use]
pub fn launcher_script(preserved_name: &str, runtime: &RuntimeDependencySet) -> String {
    let mut script = String::from("#!/usr/bin/env bash\nset -e\n");
    let library_dirs: Vec<&str> = runtime.library_dirs().map(Utf8Path::as_str).collect();
    if !library_dirs.is_empty() {
        script.push_str(&prepend_line("LD_LIBRARY_PATH", &library_dirs));
    }
    let path_prefix: Vec<&str> = runtime.path_prefix.iter().map(|p| p.as_str()).collect();
    if !path_prefix.is_empty() {
        script.push_str(&prepend_line("PATH", &path_prefix));
    }
    script.push_str("self=\"$(readlink -f -- \"${BASH_SOURCE[0]}\")\"\n");
    script.push_str(&format!(
        "exec -a \"$0\" \"${{self%/*}}\"/{} \"$@\"\n",
        shell_quote(preserved_name)
    ));
    script
}

fn prepend_line(variable: &str, dirs: &[&str]) -> String {
    format!(
        "export {variable}={}\"${{{variable}:+:${variable}}}\"\n",
        shell_quote(&dirs.join(":"))
    )
}

/// Quote `value` for bash using single quotes.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
