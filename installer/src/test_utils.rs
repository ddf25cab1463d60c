//! Shared test utilities for the installer crate.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites under `tests/`.

use crate::command::CommandExecutor;
use crate::elf::ElfPatcher;
use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::process::{ExitStatus, Output};

/// Marker that makes [`FakeElfPatcher`] treat a file as a dynamic executable.
pub const DYNAMIC_MARKER: &str = "ELF-DYNAMIC";

/// Interpreter reported for files carrying [`DYNAMIC_MARKER`].
pub const FAKE_INTERPRETER: &str = "/lib64/ld-linux-x86-64.so.2";

/// Creates an `ExitStatus` from an exit code.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code.
#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.cast_unsigned())
}

/// Creates a successful command `Output` with the given stdout.
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "patchelf").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<&'static str>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Returns predefined results in order and asserts that each invocation
/// matches the next expected call.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let mut expected = self.expected.borrow_mut();
        let call = expected.pop_front().expect("unexpected command invocation");

        assert_eq!(call.cmd, cmd);
        assert_eq!(call.args.as_slice(), args);

        call.result
    }
}

/// In-memory stand-in for `patchelf`.
///
/// A file is "dynamic" when its contents include [`DYNAMIC_MARKER`]. Needed
/// entries and interpreter overrides are kept per path and never written to
/// disk.
#[derive(Debug, Default)]
pub struct FakeElfPatcher {
    needed: RefCell<BTreeMap<Utf8PathBuf, Vec<String>>>,
    interpreters: RefCell<BTreeMap<Utf8PathBuf, String>>,
}

impl FakeElfPatcher {
    /// Needed entries recorded for `path`.
    pub fn needed_of(&self, path: &Utf8Path) -> Vec<String> {
        self.needed.borrow().get(path).cloned().unwrap_or_default()
    }

    /// Interpreter set on `path`, if any.
    pub fn interpreter_of(&self, path: &Utf8Path) -> Option<String> {
        self.interpreters.borrow().get(path).cloned()
    }
}

impl ElfPatcher for FakeElfPatcher {
    fn interpreter(&self, path: &Utf8Path) -> Result<Option<String>> {
        if let Some(interpreter) = self.interpreter_of(path) {
            return Ok(Some(interpreter));
        }
        let contents = std::fs::read(path)?;
        let dynamic = String::from_utf8_lossy(&contents).contains(DYNAMIC_MARKER);
        Ok(dynamic.then(|| FAKE_INTERPRETER.to_owned()))
    }

    fn needed(&self, path: &Utf8Path) -> Result<Vec<String>> {
        Ok(self.needed_of(path))
    }

    fn add_needed(&self, path: &Utf8Path, library: &str) -> Result<()> {
        self.needed
            .borrow_mut()
            .entry(path.to_owned())
            .or_default()
            .push(library.to_owned());
        Ok(())
    }

    fn set_interpreter(&self, path: &Utf8Path, interpreter: &Utf8Path) -> Result<()> {
        self.interpreters
            .borrow_mut()
            .insert(path.to_owned(), interpreter.to_string());
        Ok(())
    }
}

/// Builds a miniature JDK tree with the layout relocation expects.
///
/// Binaries are small text files; the dynamic ones carry
/// [`DYNAMIC_MARKER`] so [`FakeElfPatcher`] reports an interpreter for them.
#[derive(Debug, Clone)]
pub struct JdkTreeBuilder {
    root: Utf8PathBuf,
    headers: bool,
    font_manager: bool,
    demo: bool,
    freetype: bool,
    legacy_jre: bool,
}

impl JdkTreeBuilder {
    /// Start a tree rooted at `root`, which is created if missing.
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            headers: true,
            font_manager: true,
            demo: true,
            freetype: true,
            legacy_jre: false,
        }
    }

    /// Omit `include/linux/*_md.h`.
    #[must_use]
    pub fn without_headers(mut self) -> Self {
        self.headers = false;
        self
    }

    /// Omit `lib/libfontmanager.so`.
    #[must_use]
    pub fn without_font_manager(mut self) -> Self {
        self.font_manager = false;
        self
    }

    /// Omit `demo/`.
    #[must_use]
    pub fn without_demo(mut self) -> Self {
        self.demo = false;
        self
    }

    /// Omit `lib/libfreetype.so`.
    #[must_use]
    pub fn without_freetype(mut self) -> Self {
        self.freetype = false;
        self
    }

    /// Add a JDK 8 style `jre/lib/amd64` holding a versioned freetype and a
    /// second font manager.
    #[must_use]
    pub fn with_legacy_jre(mut self) -> Self {
        self.legacy_jre = true;
        self
    }

    /// Write the tree to disk.
    ///
    /// # Panics
    ///
    /// Panics if any file cannot be written.
    pub fn build(self) {
        let dynamic = format!("{DYNAMIC_MARKER}\n");
        self.file("release", "JAVA_VERSION=\"21.0.2\"\n", 0o644);
        self.file("bin/java", &dynamic, 0o755);
        self.file("bin/javac", &dynamic, 0o755);
        self.file("bin/jfr-helper.sh", "#!/bin/sh\nexit 0\n", 0o755);
        self.file("lib/jspawnhelper", &dynamic, 0o755);
        self.file("lib/libjava.so", "ELF-SHARED\n", 0o755);
        self.file("include/jni.h", "/* jni */\n", 0o644);
        if self.headers {
            self.file("include/linux/jni_md.h", "/* jni_md */\n", 0o644);
            self.file("include/linux/jawt_md.h", "/* jawt_md */\n", 0o644);
        }
        if self.font_manager {
            self.file("lib/libfontmanager.so", "ELF-SHARED\n", 0o755);
        }
        if self.freetype {
            self.file("lib/libfreetype.so", "ELF-SHARED\n", 0o755);
        }
        if self.legacy_jre {
            self.file("jre/lib/amd64/libfreetype.so.6", "ELF-SHARED\n", 0o755);
            self.file("jre/lib/amd64/libfontmanager.so", "ELF-SHARED\n", 0o755);
        }
        if self.demo {
            self.file("demo/README", "demos\n", 0o644);
        }
        self.file("man/man1/java.1", ".TH JAVA 1\n", 0o644);
        self.file("man/ja_JP.UTF-8/man1/java.1", ".TH JAVA 1\n", 0o644);
        #[cfg(unix)]
        std::os::unix::fs::symlink("ja_JP.UTF-8", self.root.join("man/ja"))
            .expect("create man/ja link");
    }

    fn file(&self, relative: &str, contents: &str, mode: u32) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(&path, contents).expect("write tree file");
        set_mode(&path, mode);
    }
}

#[cfg(unix)]
fn set_mode(path: &Utf8Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .expect("set permissions");
}

#[cfg(not(unix))]
fn set_mode(_path: &Utf8Path, _mode: u32) {}

/// Pack `tree` into a `.tar.gz` at `archive` under a single `top_level`
/// directory, as vendors ship them. Symlinks are stored as links.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn pack_tree(tree: &Utf8Path, top_level: &str, archive: &Utf8Path) {
    let file = std::fs::File::create(archive).expect("create archive");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder
        .append_dir_all(top_level, tree)
        .expect("append tree");
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip");
}

/// Build a JDK tree in a scratch directory and pack it into `archive`.
///
/// # Panics
///
/// Panics if the tree or archive cannot be written.
pub fn write_jdk_archive(
    archive: &Utf8Path,
    top_level: &str,
    configure: impl FnOnce(JdkTreeBuilder) -> JdkTreeBuilder,
) {
    let scratch = tempfile::tempdir().expect("scratch dir");
    let tree = Utf8PathBuf::from_path_buf(scratch.path().join("tree")).expect("UTF-8 path");
    configure(JdkTreeBuilder::new(&tree)).build();
    pack_tree(&tree, top_level, archive);
}
