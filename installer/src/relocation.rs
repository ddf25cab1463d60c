//! Post-extraction fix-ups for vendor JDK trees.
//!
//! Upstream tarballs are built for a conventional FHS system. Before the tree
//! can run from an arbitrary prefix a few known defects are corrected:
//!
//! 1. Platform-specific JNI headers (`include/linux/jni_md.h`) are linked
//!    into `include/` so compilers looking for `<jni_md.h>` find them.
//! 2. Demo programs and the broken Japanese man pages are removed.
//! 3. The bundled freetype is removed so the system copy is used.
//! 4. The font manager library gains an explicit dependency on fontconfig,
//!    which upstream loads with `dlopen` from a hard-coded path.
//!
//! Steps 1 and 4 are mandatory: a tree without headers or without a font
//! manager library is not a layout these rules understand, and is rejected.

use crate::artefact::platform::Platform;
use crate::config::RuntimeDependencySet;
use crate::elf::ElfPatcher;
use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Placeholder in [`RelocationRules::header_pattern`] replaced by the
/// platform's JNI header directory.
pub const PLATFORM_PLACEHOLDER: &str = "{platform}";

/// File-name patterns driving the relocation steps.
///
/// Patterns use `glob` syntax and are relative to the installation root
/// unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelocationRules {
    /// Executable that must stay an unwrapped native binary.
    pub helper: String,
    /// Directory, relative to the root, that receives header links.
    pub header_dir: String,
    /// Headers to link, relative to `header_dir`.
    pub header_pattern: String,
    /// Best-effort removals.
    pub cleanup: Vec<String>,
    /// Bundled libraries removed wherever they appear in the tree.
    pub remove_libraries: Vec<String>,
    /// Font manager libraries, matched anywhere in the tree.
    pub font_manager: String,
    /// Library the font manager must list as needed.
    pub font_manager_needed: String,
}

impl Default for RelocationRules {
    fn default() -> Self {
        Self {
            helper: "jspawnhelper".to_owned(),
            header_dir: "include".to_owned(),
            header_pattern: format!("{PLATFORM_PLACEHOLDER}/*_md.h"),
            cleanup: vec!["demo".to_owned(), "man/ja*".to_owned()],
            remove_libraries: vec!["libfreetype.so*".to_owned()],
            font_manager: "libfontmanager.so*".to_owned(),
            font_manager_needed: "libfontconfig.so".to_owned(),
        }
    }
}

/// What [`relocate`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelocationReport {
    /// Header links created during this run.
    pub header_links: Vec<Utf8PathBuf>,
    /// Paths removed, relative to the root.
    pub removed: Vec<Utf8PathBuf>,
    /// Libraries whose needed list was extended.
    pub patched: Vec<Utf8PathBuf>,
}

/// Apply every relocation step to the tree at `root`.
///
/// Safe to run repeatedly: existing header links are kept and needed
/// entries are only added when missing.
///
/// # Errors
///
/// Returns [`InstallerError::LayoutDrift`] when no headers or no font
/// manager library are found, and propagates patching failures.
pub fn relocate(
    root: &Utf8Path,
    platform: &Platform,
    rules: &RelocationRules,
    runtime: &RuntimeDependencySet,
    patcher: &dyn ElfPatcher,
) -> Result<RelocationReport> {
    let mut report = RelocationReport {
        header_links: link_headers(root, platform, rules)?,
        ..RelocationReport::default()
    };
    report.removed = remove_cleanup_targets(root, &rules.cleanup)?;
    report
        .removed
        .extend(remove_bundled_libraries(root, rules, runtime)?);
    report.patched = patch_font_manager(root, rules, patcher)?;
    Ok(report)
}

/// Link each platform header into the header directory.
///
/// # Errors
///
/// Returns [`InstallerError::LayoutDrift`] when the pattern matches nothing.
pub fn link_headers(
    root: &Utf8Path,
    platform: &Platform,
    rules: &RelocationRules,
) -> Result<Vec<Utf8PathBuf>> {
    let header_dir = root.join(&rules.header_dir);
    let pattern = rules
        .header_pattern
        .replace(PLATFORM_PLACEHOLDER, platform.header_dir());
    let headers = find(&header_dir, &pattern)?;
    if headers.is_empty() {
        return Err(InstallerError::LayoutDrift {
            reason: format!("no headers match {}/{pattern}", rules.header_dir),
        });
    }

    let mut created = Vec::new();
    for header in headers {
        let Some(name) = header.file_name() else {
            continue;
        };
        let link = header_dir.join(name);
        if link.symlink_metadata().is_ok() {
            continue;
        }
        let target = header
            .strip_prefix(&header_dir)
            .map_err(|_| InstallerError::LayoutDrift {
                reason: format!("{header} is outside {header_dir}"),
            })?;
        make_link(target, &link)?;
        log::debug!("linked {link} -> {target}");
        created.push(link);
    }
    Ok(created)
}

/// Delete every match of `patterns` under `root`, ignoring failures.
///
/// # Errors
///
/// Only an invalid pattern is an error.
pub fn remove_cleanup_targets(root: &Utf8Path, patterns: &[String]) -> Result<Vec<Utf8PathBuf>> {
    let mut removed = Vec::new();
    for pattern in patterns {
        for path in find(root, pattern)? {
            match remove_path(&path) {
                Ok(()) => removed.push(relative_to(root, &path)),
                Err(e) => log::warn!("could not remove {path}: {e}"),
            }
        }
    }
    Ok(removed)
}

fn remove_bundled_libraries(
    root: &Utf8Path,
    rules: &RelocationRules,
    runtime: &RuntimeDependencySet,
) -> Result<Vec<Utf8PathBuf>> {
    let mut removed = Vec::new();
    for library in &rules.remove_libraries {
        let matches = find(root, &format!("**/{library}"))?;
        if matches.is_empty() {
            continue;
        }
        for path in matches {
            match remove_path(&path) {
                Ok(()) => removed.push(relative_to(root, &path)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(std::io::Error::new(
                        e.kind(),
                        format!("failed to remove {path}: {e}"),
                    )
                    .into());
                }
            }
        }
        if !provided_by(runtime, library)? {
            log::warn!(
                "removed bundled {library} but no runtime dependency provides it; \
                 font rendering may fail"
            );
        }
    }
    Ok(removed)
}

fn provided_by(runtime: &RuntimeDependencySet, library: &str) -> Result<bool> {
    for dir in runtime.library_dirs() {
        if !find(dir, library)?.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Make every font manager library depend on the configured fontconfig.
///
/// # Errors
///
/// Returns [`InstallerError::LayoutDrift`] when no font manager library
/// exists, and propagates patching failures.
pub fn patch_font_manager(
    root: &Utf8Path,
    rules: &RelocationRules,
    patcher: &dyn ElfPatcher,
) -> Result<Vec<Utf8PathBuf>> {
    let libraries: Vec<_> = find(root, &format!("**/{}", rules.font_manager))?
        .into_iter()
        .filter(|path| path.symlink_metadata().is_ok_and(|m| m.is_file()))
        .collect();
    if libraries.is_empty() {
        return Err(InstallerError::LayoutDrift {
            reason: format!("no {} found", rules.font_manager),
        });
    }

    let mut patched = Vec::new();
    for library in libraries {
        let needed = patcher.needed(&library)?;
        if needed.iter().any(|n| n == &rules.font_manager_needed) {
            continue;
        }
        patcher.add_needed(&library, &rules.font_manager_needed)?;
        log::debug!("added {} to {library}", rules.font_manager_needed);
        patched.push(library);
    }
    Ok(patched)
}

/// Glob `pattern` beneath `base`, escaping `base` itself.
///
/// Matches reached through a symlinked directory below `base` are dropped,
/// so every file is reported once under its real path.
pub(crate) fn find(base: &Utf8Path, pattern: &str) -> Result<Vec<Utf8PathBuf>> {
    let full = format!("{}/{pattern}", glob::Pattern::escape(base.as_str()));
    let paths = glob::glob(&full).map_err(|e| InstallerError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })?;
    let mut found = Vec::new();
    for entry in paths {
        let path = entry.map_err(std::io::Error::from)?;
        let path = Utf8PathBuf::from_path_buf(path).map_err(|p| InstallerError::non_utf8(&p))?;
        if !behind_symlinked_dir(base, &path) {
            found.push(path);
        }
    }
    Ok(found)
}

fn behind_symlinked_dir(base: &Utf8Path, path: &Utf8Path) -> bool {
    let Ok(relative) = path.strip_prefix(base) else {
        return false;
    };
    let mut current = base.to_owned();
    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        if components.peek().is_none() {
            break;
        }
        current.push(component);
        if current.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
            return true;
        }
    }
    false
}

fn relative_to(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    path.strip_prefix(root)
        .map_or_else(|_| path.to_owned(), Utf8Path::to_owned)
}

fn remove_path(path: &Utf8Path) -> std::io::Result<()> {
    let metadata = path.symlink_metadata()?;
    if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

#[cfg(unix)]
fn make_link(target: &Utf8Path, link: &Utf8Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_link(target: &Utf8Path, link: &Utf8Path) -> Result<()> {
    let source = link.parent().map_or_else(|| target.to_owned(), |p| p.join(target));
    std::fs::copy(source, link)?;
    Ok(())
}
