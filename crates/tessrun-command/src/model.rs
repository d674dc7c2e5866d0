//! The engine invocation model.
//!
//! A [`CommandModel`] holds everything needed to launch the engine once:
//! executable, transport modes, ordered options, config file, temp location.
//! [`CommandModel::render`] turns it into a [`RenderedCommand`] for a given
//! engine version; [`CommandModel::build`] asks the engine for its version
//! first.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::OnceCell;
use tessrun_runner::{CommandSpec, NativeRunner, ProcessRunner};
use tracing::debug;

use crate::config_file::ConfigFile;
use crate::error::CommandError;
use crate::escape::escape;
use crate::option::{ArgToken, TesseractOption};
use crate::version::{EngineVersion, parse_version_banner};

/// Environment variable carrying the thread limit to the engine.
pub const THREAD_LIMIT_VAR: &str = "OMP_THREAD_LIMIT";

/// Placeholder telling the engine to use a standard stream.
pub const STREAM_PLACEHOLDER: &str = "-";

/// Where the engine reads its image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Image file passed by path (file input)
    Path(PathBuf),
    /// Encoded image fed over stdin (stream input)
    Bytes(Vec<u8>),
}

impl Default for ImageSource {
    fn default() -> Self {
        Self::Path(PathBuf::new())
    }
}

/// Everything needed to invoke the engine once.
///
/// The model is `Sync`: the generated output path and the cached version live
/// in [`OnceCell`]s, so concurrent callers observe the same value.
#[derive(Debug)]
pub struct CommandModel {
    executable: PathBuf,
    image: ImageSource,
    use_file_output: bool,
    options: Vec<TesseractOption>,
    config_file: Option<ConfigFile>,
    temp_dir: Option<PathBuf>,
    thread_limit: Option<u32>,
    timeout: Option<Duration>,
    cache_version: bool,
    output_file: OnceCell<PathBuf>,
    version: OnceCell<EngineVersion>,
}

impl Default for CommandModel {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            image: ImageSource::default(),
            use_file_output: true,
            options: Vec::new(),
            config_file: None,
            temp_dir: None,
            thread_limit: None,
            timeout: None,
            cache_version: false,
            output_file: OnceCell::new(),
            version: OnceCell::new(),
        }
    }
}

impl CommandModel {
    /// Model for recognising the image at `image` with default settings.
    #[must_use]
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: ImageSource::Path(image.into()),
            ..Self::default()
        }
    }

    // ===== Setters =====

    pub fn set_executable(&mut self, executable: impl Into<PathBuf>) -> &mut Self {
        self.executable = executable.into();
        self
    }

    pub fn set_image(&mut self, image: ImageSource) -> &mut Self {
        self.image = image;
        self
    }

    /// Choose between a temp output file (`true`) and stdout (`false`).
    pub fn set_use_file_output(&mut self, use_file_output: bool) -> &mut Self {
        self.use_file_output = use_file_output;
        self
    }

    pub fn push_option(&mut self, option: TesseractOption) -> &mut Self {
        self.options.push(option);
        self
    }

    pub fn set_config_file(&mut self, config_file: Option<ConfigFile>) -> &mut Self {
        self.config_file = config_file;
        self
    }

    pub fn set_temp_dir(&mut self, temp_dir: impl Into<PathBuf>) -> &mut Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }

    pub fn set_thread_limit(&mut self, limit: Option<u32>) -> &mut Self {
        self.thread_limit = limit;
        self
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Remember the first version answer instead of asking the engine on
    /// every call. Turning caching off forgets a remembered answer.
    pub fn set_cache_version(&mut self, cache: bool) -> &mut Self {
        self.cache_version = cache;
        if !cache {
            self.version = OnceCell::new();
        }
        self
    }

    // ===== Accessors =====

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    #[must_use]
    pub fn image(&self) -> &ImageSource {
        &self.image
    }

    /// Image path when the engine reads from a file.
    #[must_use]
    pub fn image_path(&self) -> Option<&Path> {
        match &self.image {
            ImageSource::Path(path) => Some(path),
            ImageSource::Bytes(_) => None,
        }
    }

    /// Bytes to feed over stdin when the engine reads from a stream.
    #[must_use]
    pub fn image_data(&self) -> Option<&[u8]> {
        match &self.image {
            ImageSource::Path(_) => None,
            ImageSource::Bytes(bytes) => Some(bytes),
        }
    }

    /// Length of the in-memory image, zero in file mode.
    #[must_use]
    pub fn image_size(&self) -> usize {
        self.image_data().map_or(0, <[u8]>::len)
    }

    #[must_use]
    pub fn use_file_input(&self) -> bool {
        matches!(self.image, ImageSource::Path(_))
    }

    #[must_use]
    pub fn use_file_output(&self) -> bool {
        self.use_file_output
    }

    #[must_use]
    pub fn options(&self) -> &[TesseractOption] {
        &self.options
    }

    #[must_use]
    pub fn config_file(&self) -> Option<&ConfigFile> {
        self.config_file.as_ref()
    }

    #[must_use]
    pub fn thread_limit(&self) -> Option<u32> {
        self.thread_limit
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Directory for temp artifacts, the system temp dir unless overridden.
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Extension of the file the engine writes, chosen by the config file.
    #[must_use]
    pub fn output_extension(&self) -> &'static str {
        self.config_file.as_ref().map_or("txt", ConfigFile::extension)
    }

    /// Path of the engine's output file.
    ///
    /// The base path is generated on first use by creating a unique, empty
    /// `ocr*` file in [`Self::temp_dir`] and is stable for the lifetime of
    /// the model. The engine appends the extension itself, so with
    /// `with_ext` the returned path is `<base>.<ext>`.
    pub fn output_file(&self, with_ext: bool) -> Result<PathBuf, CommandError> {
        let base = self.output_file.get_or_try_init(|| {
            let dir = self.temp_dir();
            let path = tempfile::Builder::new()
                .prefix("ocr")
                .tempfile_in(&dir)
                .and_then(|file| file.into_temp_path().keep().map_err(|e| e.error))
                .map_err(|e| CommandError::TempFile {
                    dir: dir.clone(),
                    reason: e.to_string(),
                })?;
            debug!(path = %path.display(), "Reserved temp output file");
            Ok::<_, CommandError>(path)
        })?;

        if !with_ext {
            return Ok(base.clone());
        }
        let mut name = base.clone().into_os_string();
        name.push(".");
        name.push(self.output_extension());
        Ok(PathBuf::from(name))
    }

    /// Base output path if one has been generated, without creating it.
    #[must_use]
    pub fn generated_output_file(&self) -> Option<&Path> {
        self.output_file.get().map(PathBuf::as_path)
    }

    // ===== Rendering =====

    /// Render the invocation for the engine at `version`.
    ///
    /// Options are resolved in insertion order and the first one the engine
    /// cannot handle fails the whole render.
    pub fn render(&self, version: &EngineVersion) -> Result<RenderedCommand, CommandError> {
        let mut env = Vec::new();
        if let Some(limit) = self.thread_limit {
            env.push((THREAD_LIMIT_VAR.to_string(), limit.to_string()));
        }

        let mut args = Vec::with_capacity(self.options.len() * 2 + 3);
        args.push(match &self.image {
            ImageSource::Path(path) => ArgToken::Quoted(path.as_os_str().to_owned()),
            ImageSource::Bytes(_) => ArgToken::Bare(STREAM_PLACEHOLDER.into()),
        });
        args.push(if self.use_file_output {
            ArgToken::Quoted(self.output_file(false)?.into_os_string())
        } else {
            ArgToken::Bare(STREAM_PLACEHOLDER.into())
        });

        for option in &self.options {
            args.extend(option.resolve(version)?.tokens);
        }

        if let Some(config_file) = &self.config_file {
            args.push(ArgToken::Bare(config_file.as_str().into()));
        }

        Ok(RenderedCommand {
            env,
            program: self.executable.as_os_str().to_owned(),
            args,
        })
    }

    /// Query the engine version, then render.
    pub fn build(&self) -> Result<RenderedCommand, CommandError> {
        self.build_with(&NativeRunner::new())
    }

    pub fn build_with<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<RenderedCommand, CommandError> {
        let version = self.engine_version_with(runner)?;
        self.render(&version)
    }

    // ===== Engine queries =====

    /// Ask the engine for its version with `--version`.
    pub fn engine_version(&self) -> Result<EngineVersion, CommandError> {
        self.engine_version_with(&NativeRunner::new())
    }

    pub fn engine_version_with<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<EngineVersion, CommandError> {
        if self.cache_version {
            return self
                .version
                .get_or_try_init(|| self.query_version(runner))
                .cloned();
        }
        self.query_version(runner)
    }

    fn query_version<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<EngineVersion, CommandError> {
        let spec = CommandSpec::new(&self.executable).arg("--version");
        let output = runner.run(&spec, None, self.timeout)?;
        let version = parse_version_banner(&output.stdout_string(), &output.stderr_string())?;
        debug!(version = %version, executable = %self.executable.display(), "Detected engine version");
        Ok(version)
    }

    /// Languages installed for the engine, sorted.
    pub fn available_languages(&self) -> Result<Vec<String>, CommandError> {
        self.available_languages_with(&NativeRunner::new())
    }

    pub fn available_languages_with<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<Vec<String>, CommandError> {
        let spec = CommandSpec::new(&self.executable).arg("--list-langs");
        let output = runner.run(&spec, None, self.timeout)?;
        let stdout = output.stdout_string();
        let listing = if stdout.trim().is_empty() {
            output.stderr_string()
        } else {
            stdout
        };
        Ok(parse_language_listing(&listing))
    }
}

/// Parse `--list-langs` output: a header line followed by one code per line.
#[must_use]
pub fn parse_language_listing(listing: &str) -> Vec<String> {
    let mut languages: Vec<String> = listing
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    languages.sort();
    languages
}

/// A fully resolved engine invocation.
///
/// `Display` gives the quoted command line used in diagnostics, e.g.
/// `OMP_THREAD_LIMIT=1 "tesseract" "scan.png" "/tmp/ocrAb12" --psm 6`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    /// Environment assignments for the child, never part of argv
    pub env: Vec<(String, String)>,
    pub program: OsString,
    pub args: Vec<ArgToken>,
}

impl RenderedCommand {
    /// Argv tail handed to the child, unquoted.
    #[must_use]
    pub fn arg_values(&self) -> Vec<&OsStr> {
        self.args.iter().map(ArgToken::as_os_str).collect()
    }

    /// Runner specification for this invocation.
    #[must_use]
    pub fn to_command_spec(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program).args(self.arg_values());
        for (key, value) in &self.env {
            spec = spec.env(key, value);
        }
        spec
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        f.write_str(&escape(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
