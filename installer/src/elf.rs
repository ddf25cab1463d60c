//! ELF metadata inspection and rewriting.
//!
//! Wrapping and relocation only need four operations on a binary: read its
//! program interpreter, read its needed libraries, add a needed library, and
//! replace the interpreter. [`ElfPatcher`] captures those; [`Patchelf`]
//! implements them by invoking the `patchelf` tool.

use crate::command::CommandExecutor;
use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Errors reported by an [`ElfPatcher`].
#[derive(Debug, Error)]
pub enum ElfError {
    /// The patch tool rejected a request.
    #[error("{tool} {operation} failed on {path}: {message}")]
    ToolFailed {
        /// Name of the tool that was invoked.
        tool: String,
        /// The requested operation, e.g. `--add-needed`.
        operation: String,
        /// The file being inspected or patched.
        path: Utf8PathBuf,
        /// The tool's diagnostic output.
        message: String,
    },
}

/// Reads and rewrites dynamic-linking metadata of ELF files.
pub trait ElfPatcher {
    /// Return the program interpreter of `path`.
    ///
    /// Files that are not dynamically linked ELF executables (static
    /// binaries, shared libraries without an interpreter, scripts) yield
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the inspection tool cannot be run at all.
    fn interpreter(&self, path: &Utf8Path) -> Result<Option<String>>;

    /// Return the `DT_NEEDED` entries of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::ToolFailed`] if the file cannot be inspected.
    fn needed(&self, path: &Utf8Path) -> Result<Vec<String>>;

    /// Append `library` to the needed libraries of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::ToolFailed`] if the file cannot be patched.
    fn add_needed(&self, path: &Utf8Path, library: &str) -> Result<()>;

    /// Replace the program interpreter of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::ToolFailed`] if the file cannot be patched.
    fn set_interpreter(&self, path: &Utf8Path, interpreter: &Utf8Path) -> Result<()>;
}

/// [`ElfPatcher`] backed by the `patchelf` command-line tool.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use jdk_installer::command::SystemCommandExecutor;
/// use jdk_installer::elf::{ElfPatcher, Patchelf};
///
/// let executor = SystemCommandExecutor::default();
/// let patchelf = Patchelf::new(&executor);
/// let interpreter = patchelf.interpreter(Utf8Path::new("/opt/jdk/bin/java"))?;
/// assert!(interpreter.is_some());
/// # Ok::<(), jdk_installer::error::InstallerError>(())
/// ```
pub struct Patchelf<'a> {
    executor: &'a dyn CommandExecutor,
    program: String,
}

impl<'a> Patchelf<'a> {
    /// Use `patchelf` from `PATH`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self::with_program(executor, "patchelf")
    }

    /// Use a specific `patchelf` binary.
    #[must_use]
    pub fn with_program(executor: &'a dyn CommandExecutor, program: impl Into<String>) -> Self {
        Self {
            executor,
            program: program.into(),
        }
    }

    fn invoke(&self, operation: &str, args: &[&str], path: &Utf8Path) -> Result<String> {
        let mut full_args = args.to_vec();
        full_args.push(path.as_str());
        let output = self.executor.run(&self.program, &full_args)?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(ElfError::ToolFailed {
            tool: self.program.clone(),
            operation: operation.to_owned(),
            path: path.to_owned(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        }
        .into())
    }
}

impl ElfPatcher for Patchelf<'_> {
    fn interpreter(&self, path: &Utf8Path) -> Result<Option<String>> {
        // patchelf exits non-zero for anything without a PT_INTERP segment.
        let output = self
            .executor
            .run(&self.program, &["--print-interpreter", path.as_str()])?;
        if !output.status.success() {
            return Ok(None);
        }
        let interpreter = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        Ok((!interpreter.is_empty()).then_some(interpreter))
    }

    fn needed(&self, path: &Utf8Path) -> Result<Vec<String>> {
        let stdout = self.invoke("--print-needed", &["--print-needed"], path)?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    fn add_needed(&self, path: &Utf8Path, library: &str) -> Result<()> {
        self.invoke("--add-needed", &["--add-needed", library], path)
            .map(drop)
    }

    fn set_interpreter(&self, path: &Utf8Path, interpreter: &Utf8Path) -> Result<()> {
        self.invoke(
            "--set-interpreter",
            &["--set-interpreter", interpreter.as_str()],
            path,
        )
        .map(drop)
    }
}
