//! Fluent front end for one-shot recognition.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tessrun_command::{
    CommandModel, ConfigFile, EngineVersion, ImageSource, RenderedCommand, TesseractOption,
};
use tessrun_config::Config;
use tessrun_runner::{NativeRunner, ProcessOutput, ProcessRunner, RunnerError};
use tracing::{debug, info};

use crate::TessrunError;
use crate::artifacts::TempArtifacts;
use crate::checks::{
    STREAM_IO_MIN_VERSION, check_command_output, check_engine_version, check_executable_presence,
    check_image_path, check_write_permissions,
};

/// Engine variable holding the characters the engine may emit.
const WHITELIST_VAR: &str = "tessedit_char_whitelist";

/// Characters stripped from both ends of [`Tesseract::run`] results.
const TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B', '\x0C'];

/// Recognise text in one image with the external engine.
///
/// Every setter consumes and returns the builder. Nothing touches the engine
/// until [`Tesseract::run`], [`Tesseract::command`], [`Tesseract::version`]
/// or [`Tesseract::available_languages`] is called.
///
/// ```rust,no_run
/// use tessrun::Tesseract;
///
/// let text = Tesseract::new("invoice.png")
///     .lang(["eng", "deu"])
///     .psm(6)
///     .whitelist(["0123456789", ".,-"])
///     .run()?;
/// println!("{text}");
/// # Ok::<(), tessrun::TessrunError>(())
/// ```
#[derive(Debug)]
pub struct Tesseract {
    model: CommandModel,
    output_file: Option<PathBuf>,
}

impl Tesseract {
    /// Recognise the image file at `image`.
    #[must_use]
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            model: CommandModel::new(image),
            output_file: None,
        }
    }

    /// Builder seeded from a loaded configuration.
    ///
    /// `[defaults]` become options in a fixed order (tessdata dir, languages,
    /// psm, oem) followed by every `[variables]` entry.
    #[must_use]
    pub fn from_config(config: &Config, image: impl Into<PathBuf>) -> Self {
        let mut ocr = Self::new(image)
            .executable(config.executable())
            .thread_limit(config.engine.thread_limit)
            .timeout(config.timeout())
            .cache_version(config.cache_version());

        let defaults = &config.defaults;
        if let Some(dir) = &defaults.temp_dir {
            ocr = ocr.temp_dir(dir);
        }
        if let Some(dir) = &defaults.tessdata_dir {
            ocr = ocr.tessdata_dir(dir);
        }
        if let Some(lang) = &defaults.lang {
            ocr = ocr.lang(lang);
        }
        if let Some(psm) = defaults.psm {
            ocr = ocr.psm(psm);
        }
        if let Some(oem) = defaults.oem {
            ocr = ocr.oem(oem);
        }
        if let Some(name) = &defaults.config_file {
            ocr = ocr.config_file(name);
        }
        for (key, value) in &config.variables {
            ocr = ocr.config(key, value);
        }
        ocr
    }

    // ===== Input and output =====

    /// Feed an encoded image over stdin instead of reading a file.
    ///
    /// Needs Tesseract 3.03-rc1 or later; checked when the engine runs.
    #[must_use]
    pub fn image_data(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.model.set_image(ImageSource::Bytes(bytes.into()));
        self
    }

    /// Read the result from stdout, so no temp file is created.
    ///
    /// Needs Tesseract 3.03-rc1 or later; checked when the engine runs.
    /// Drops a previously set [`Tesseract::output_file`].
    #[must_use]
    pub fn without_temp_files(mut self) -> Self {
        self.model.set_use_file_output(false);
        self.output_file = None;
        self
    }

    /// Keep the engine's output file at `path` after the run.
    #[must_use]
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.model.set_use_file_output(true);
        self.output_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.model.set_executable(executable);
        self
    }

    /// Append a config file, built-in (`hocr`, `tsv`, ...) or custom.
    #[must_use]
    pub fn config_file(mut self, name: &str) -> Self {
        self.model.set_config_file(Some(ConfigFile::from(name)));
        self
    }

    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model.set_temp_dir(dir);
        self
    }

    /// Cap the engine's OpenMP threads through `OMP_THREAD_LIMIT`.
    #[must_use]
    pub fn thread_limit(mut self, limit: impl Into<Option<u32>>) -> Self {
        self.model.set_thread_limit(limit.into());
        self
    }

    /// Kill the engine when it runs longer than `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.model.set_timeout(timeout.into());
        self
    }

    #[must_use]
    pub fn cache_version(mut self, cache: bool) -> Self {
        self.model.set_cache_version(cache);
        self
    }

    // ===== Engine options =====

    /// Restrict recognised characters to the concatenation of `parts`.
    #[must_use]
    pub fn whitelist<I, S>(self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chars: String = parts.into_iter().map(|part| part.as_ref().to_owned()).collect();
        self.config(WHITELIST_VAR, chars)
    }

    #[must_use]
    pub fn psm(self, mode: u8) -> Self {
        self.option(TesseractOption::Psm(mode))
    }

    #[must_use]
    pub fn oem(self, mode: u8) -> Self {
        self.option(TesseractOption::Oem(mode))
    }

    #[must_use]
    pub fn lang<I, S>(self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option(TesseractOption::lang(languages))
    }

    #[must_use]
    pub fn user_words(self, path: impl Into<PathBuf>) -> Self {
        self.option(TesseractOption::UserWords(path.into()))
    }

    #[must_use]
    pub fn user_patterns(self, path: impl Into<PathBuf>) -> Self {
        self.option(TesseractOption::UserPatterns(path.into()))
    }

    #[must_use]
    pub fn tessdata_dir(self, path: impl Into<PathBuf>) -> Self {
        self.option(TesseractOption::TessdataDir(path.into()))
    }

    /// Set an engine variable; camel-case keys are converted to snake case.
    #[must_use]
    pub fn config(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.option(TesseractOption::config(key, value))
    }

    /// Pass one argument through unquoted and unchecked.
    #[must_use]
    pub fn raw(self, arg: impl Into<String>) -> Self {
        self.option(TesseractOption::Raw(arg.into()))
    }

    /// Set an option by name.
    ///
    /// Built-in config file names select that config file and ignore
    /// `value`. Option names (`psm`, `userWords`, `tessdata-dir`, ...) are
    /// parsed from `value`. Any other name is rejected.
    pub fn set(self, name: &str, value: &str) -> Result<Self, TessrunError> {
        if ConfigFile::BUILTIN.contains(&name) {
            return Ok(self.config_file(name));
        }
        let option = TesseractOption::from_name(name, value)?;
        debug!(name, option = option.name(), "Set option by name");
        Ok(self.option(option))
    }

    fn option(mut self, option: TesseractOption) -> Self {
        self.model.push_option(option);
        self
    }

    // ===== Engine queries =====

    /// Installed engine version.
    pub fn version(&self) -> Result<EngineVersion, TessrunError> {
        self.version_with(&NativeRunner::new())
    }

    pub fn version_with<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<EngineVersion, TessrunError> {
        check_executable_presence(self.model.executable())?;
        Ok(self.model.engine_version_with(runner)?)
    }

    /// Languages the installed engine can recognise.
    pub fn available_languages(&self) -> Result<Vec<String>, TessrunError> {
        self.available_languages_with(&NativeRunner::new())
    }

    pub fn available_languages_with<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<Vec<String>, TessrunError> {
        check_executable_presence(self.model.executable())?;
        Ok(self.model.available_languages_with(runner)?)
    }

    /// The command line the engine would be started with.
    pub fn command(&self) -> Result<RenderedCommand, TessrunError> {
        self.command_with(&NativeRunner::new())
    }

    pub fn command_with<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<RenderedCommand, TessrunError> {
        let version = self.model.engine_version_with(runner)?;
        let rendered = self.model.render(&version)?;
        self.check_stream_support(&version, &rendered.to_string())?;
        Ok(rendered)
    }

    #[must_use]
    pub fn model(&self) -> &CommandModel {
        &self.model
    }

    // ===== Running =====

    /// Recognised text with surrounding whitespace and control bytes trimmed.
    pub fn run(&self) -> Result<String, TessrunError> {
        self.run_with(&NativeRunner::new())
    }

    pub fn run_with<R: ProcessRunner + ?Sized>(&self, runner: &R) -> Result<String, TessrunError> {
        let bytes = self.run_raw_with(runner)?;
        Ok(String::from_utf8_lossy(&bytes)
            .trim_matches(TRIM_CHARS)
            .to_string())
    }

    /// Engine output exactly as produced, e.g. for `pdf` results.
    pub fn run_raw(&self) -> Result<Vec<u8>, TessrunError> {
        self.run_raw_with(&NativeRunner::new())
    }

    pub fn run_raw_with<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> Result<Vec<u8>, TessrunError> {
        if let Some(target) = &self.output_file {
            check_write_permissions(target)?;
        }
        check_executable_presence(self.model.executable())?;
        if let Some(image) = self.model.image_path() {
            check_image_path(image)?;
        }

        let version = self.model.engine_version_with(runner)?;

        let mut artifacts = if self.model.use_file_output() {
            TempArtifacts::new(self.model.output_file(false)?, self.model.output_file(true)?)
        } else {
            TempArtifacts::default()
        };

        let rendered = self.model.render(&version)?;
        let command = rendered.to_string();
        self.check_stream_support(&version, &command)?;
        info!(command = %command, "Running engine");

        let started = Instant::now();
        let output = self.execute(runner, &rendered, &command)?;
        check_command_output(&self.model, &output, &command)?;

        let result = if self.model.use_file_output() {
            let produced = self.model.output_file(true)?;
            let bytes = std::fs::read(&produced)?;
            if let Some(target) = &self.output_file {
                move_result(&produced, target)?;
                artifacts.release(&produced);
            }
            bytes
        } else {
            output.stdout
        };
        artifacts.cleanup();

        info!(
            bytes = result.len(),
            duration_ms = started.elapsed().as_millis(),
            "Engine finished"
        );
        Ok(result)
    }

    fn execute<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        rendered: &RenderedCommand,
        command: &str,
    ) -> Result<ProcessOutput, TessrunError> {
        let spec = rendered.to_command_spec();
        runner
            .run(&spec, self.model.image_data(), self.model.timeout())
            .map_err(|e| match e {
                RunnerError::SpawnFailed { reason, .. } => TessrunError::ProcessCreation {
                    command: command.to_string(),
                    reason,
                },
                RunnerError::Timeout { timeout_ms } => TessrunError::Timeout {
                    command: command.to_string(),
                    timeout_ms,
                },
                other => TessrunError::Runner(other),
            })
    }

    fn check_stream_support(
        &self,
        version: &EngineVersion,
        command: &str,
    ) -> Result<(), TessrunError> {
        if !self.model.use_file_input() {
            check_engine_version(
                "Reading image data from stdin",
                STREAM_IO_MIN_VERSION,
                version,
                command,
            )?;
        }
        if !self.model.use_file_output() {
            check_engine_version(
                "Writing to stdout (without using temp files)",
                STREAM_IO_MIN_VERSION,
                version,
                command,
            )?;
        }
        Ok(())
    }
}

/// Move the engine's result to the caller's output path.
fn move_result(from: &Path, to: &Path) -> Result<(), TessrunError> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Different filesystem
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::ffi::OsString;
    use tempfile::TempDir;
    use tessrun_command::CommandError;
    use tessrun_runner::CommandSpec;

    /// Scripted engine: answers `--version`, otherwise writes `text` where the
    /// command asks for it.
    struct ScriptedEngine {
        version: &'static str,
        text: &'static [u8],
        stderr: &'static str,
        specs: RefCell<Vec<CommandSpec>>,
        stdin: RefCell<Option<Vec<u8>>>,
    }

    impl ScriptedEngine {
        fn new(version: &'static str, text: &'static [u8]) -> Self {
            Self {
                version,
                text,
                stderr: "",
                specs: RefCell::new(Vec::new()),
                stdin: RefCell::new(None),
            }
        }

        fn recognition_args(&self) -> Vec<OsString> {
            self.specs.borrow().last().unwrap().args.clone()
        }
    }

    impl ProcessRunner for ScriptedEngine {
        fn run(
            &self,
            cmd: &CommandSpec,
            stdin: Option<&[u8]>,
            _timeout: Option<Duration>,
        ) -> Result<ProcessOutput, RunnerError> {
            if cmd.args.first().is_some_and(|a| a == "--version") {
                let banner = format!("tesseract {}\n", self.version);
                return Ok(ProcessOutput::new(banner.into_bytes(), Vec::new(), Some(0)));
            }
            self.specs.borrow_mut().push(cmd.clone());
            *self.stdin.borrow_mut() = stdin.map(<[u8]>::to_vec);

            let out = &cmd.args[1];
            let stderr = self.stderr.as_bytes().to_vec();
            if out == "-" {
                return Ok(ProcessOutput::new(self.text.to_vec(), stderr, Some(0)));
            }
            let ext = match cmd.args.last().and_then(|a| a.to_str()) {
                Some("hocr") => "hocr",
                Some("tsv") => "tsv",
                _ => "txt",
            };
            let mut path = out.clone();
            path.push(format!(".{ext}"));
            std::fs::write(PathBuf::from(path), self.text).unwrap();
            Ok(ProcessOutput::new(Vec::new(), stderr, Some(0)))
        }
    }

    /// Engine whose process can never be started.
    struct Unlaunchable;

    impl ProcessRunner for Unlaunchable {
        fn run(
            &self,
            cmd: &CommandSpec,
            _stdin: Option<&[u8]>,
            _timeout: Option<Duration>,
        ) -> Result<ProcessOutput, RunnerError> {
            if cmd.args.first().is_some_and(|a| a == "--version") {
                return Ok(ProcessOutput::new(b"tesseract 4.1.1\n".to_vec(), Vec::new(), Some(0)));
            }
            Err(RunnerError::SpawnFailed {
                program: cmd.program_name(),
                reason: "Permission denied".to_string(),
            })
        }
    }

    fn sh() -> PathBuf {
        which::which("sh").unwrap()
    }

    fn image_in(dir: &TempDir) -> PathBuf {
        let image = dir.path().join("scan.png");
        std::fs::write(&image, b"\x89PNG").unwrap();
        image
    }

    // ===== Run sequence =====

    #[cfg(unix)]
    #[test]
    fn test_run_file_mode_trims_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let engine = ScriptedEngine::new("4.1.1", b"\n  Hello World\x0C\n");

        let text = Tesseract::new(image_in(&dir))
            .executable(sh())
            .temp_dir(scratch.path())
            .run_with(&engine)
            .unwrap();

        assert_eq!(text, "Hello World");
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_raw_keeps_bytes() {
        let dir = TempDir::new().unwrap();
        let engine = ScriptedEngine::new("4.1.1", b" text\n");
        let bytes = Tesseract::new(image_in(&dir))
            .executable(sh())
            .without_temp_files()
            .run_raw_with(&engine)
            .unwrap();
        assert_eq!(bytes, b" text\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_stream_mode_feeds_stdin() {
        let engine = ScriptedEngine::new("4.1.1", b"streamed");
        let text = Tesseract::new("ignored.png")
            .executable(sh())
            .image_data(b"\x89PNG-bytes".to_vec())
            .without_temp_files()
            .run_with(&engine)
            .unwrap();

        assert_eq!(text, "streamed");
        assert_eq!(engine.stdin.borrow().as_deref(), Some(&b"\x89PNG-bytes"[..]));
        assert_eq!(engine.recognition_args(), vec![OsString::from("-"), OsString::from("-")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_modes_need_3_03_rc1() {
        let engine = ScriptedEngine::new("3.02.02", b"text");
        let err = Tesseract::new("ignored.png")
            .executable(sh())
            .image_data(b"img".to_vec())
            .run_with(&engine)
            .unwrap_err();
        match err {
            TessrunError::FeatureNotAvailable {
                action,
                required,
                actual,
                command,
            } => {
                assert_eq!(action, "Reading image data from stdin");
                assert_eq!(required, "3.03-rc1");
                assert_eq!(actual, "3.02.02");
                assert!(command.contains(" - "), "{command}");
            }
            other => panic!("Expected FeatureNotAvailable, got {other:?}"),
        }

        let dir = TempDir::new().unwrap();
        let err = Tesseract::new(image_in(&dir))
            .executable(sh())
            .without_temp_files()
            .run_with(&engine)
            .unwrap_err();
        assert!(matches!(
            err,
            TessrunError::FeatureNotAvailable { action, .. }
                if action == "Writing to stdout (without using temp files)"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_output_file_receives_result() {
        let dir = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let target = dir.path().join("results").join("page.hocr");
        let engine = ScriptedEngine::new("4.1.1", b"<html>hocr</html>");

        let text = Tesseract::new(image_in(&dir))
            .executable(sh())
            .temp_dir(scratch.path())
            .config_file("hocr")
            .output_file(&target)
            .run_with(&engine)
            .unwrap();

        assert_eq!(text, "<html>hocr</html>");
        assert_eq!(std::fs::read(&target).unwrap(), b"<html>hocr</html>");
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_result_is_unsuccessful_and_cleaned() {
        let dir = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let mut engine = ScriptedEngine::new("4.1.1", b"");
        engine.stderr = "Empty page!!\n";

        let err = Tesseract::new(image_in(&dir))
            .executable(sh())
            .temp_dir(scratch.path())
            .psm(6)
            .run_with(&engine)
            .unwrap_err();

        match err {
            TessrunError::UnsuccessfulCommand { command, stderr } => {
                assert!(command.contains("--psm 6"), "command was {command}");
                assert_eq!(stderr, "Empty page!!\n");
            }
            other => panic!("Expected UnsuccessfulCommand, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_failure_is_process_creation() {
        let dir = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let err = Tesseract::new(image_in(&dir))
            .executable(sh())
            .temp_dir(scratch.path())
            .run_with(&Unlaunchable)
            .unwrap_err();

        match err {
            TessrunError::ProcessCreation { command, reason } => {
                assert!(command.contains("scan.png"));
                assert_eq!(reason, "Permission denied");
            }
            other => panic!("Expected ProcessCreation, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_executable_checked_before_image() {
        let engine = ScriptedEngine::new("4.1.1", b"text");
        let err = Tesseract::new("/nowhere/scan.png")
            .executable("tessrun-no-such-engine-7d2a")
            .run_with(&engine)
            .unwrap_err();
        assert!(matches!(err, TessrunError::ExecutableNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_image() {
        let engine = ScriptedEngine::new("4.1.1", b"text");
        let err = Tesseract::new("/nowhere/scan.png")
            .executable(sh())
            .run_with(&engine)
            .unwrap_err();
        assert!(matches!(err, TessrunError::ImageNotFound { .. }));
        assert!(engine.specs.borrow().is_empty());
    }

    // ===== Options =====

    #[test]
    fn test_command_renders_options_for_version() {
        let engine = ScriptedEngine::new("3.05.02", b"");
        let rendered = Tesseract::new("in.png")
            .without_temp_files()
            .lang(["eng", "deu"])
            .psm(6)
            .whitelist(["0123456789", "ABC"])
            .raw("--dpi=300")
            .command_with(&engine)
            .unwrap();

        assert_eq!(
            rendered.arg_values(),
            vec![
                "in.png",
                "-",
                "-l",
                "eng+deu",
                "-psm",
                "6",
                "-c",
                "tessedit_char_whitelist=0123456789ABC",
                "--dpi=300"
            ]
        );
    }

    #[test]
    fn test_oem_needs_3_05() {
        let engine = ScriptedEngine::new("3.04.01", b"");
        let err = Tesseract::new("in.png")
            .without_temp_files()
            .oem(1)
            .command_with(&engine)
            .unwrap_err();
        assert!(matches!(
            err,
            TessrunError::Command(CommandError::FeatureNotAvailable { option, .. }) if option == "oem"
        ));
    }

    #[test]
    fn test_set_dispatches_by_name() {
        let engine = ScriptedEngine::new("4.1.1", b"");
        let rendered = Tesseract::new("in.png")
            .without_temp_files()
            .set("userWords", "/tmp/words.txt")
            .unwrap()
            .set("psm", "4")
            .unwrap()
            .set("tsv", "")
            .unwrap()
            .command_with(&engine)
            .unwrap();

        assert_eq!(
            rendered.arg_values(),
            vec!["in.png", "-", "--user-words", "/tmp/words.txt", "--psm", "4", "tsv"]
        );
    }

    #[test]
    fn test_set_rejects_unknown_name() {
        let err = Tesseract::new("in.png").set("tesseditCharWhitelist", "ABC").unwrap_err();
        assert!(matches!(
            err,
            TessrunError::Command(CommandError::UnknownOption { name }) if name == "tesseditCharWhitelist"
        ));
    }

    #[test]
    fn test_from_config_applies_defaults_and_variables() {
        let mut config = Config::default();
        config.engine.thread_limit = Some(1);
        config.engine.timeout_secs = Some(30);
        config.defaults.lang = Some(vec!["eng".to_string()]);
        config.defaults.psm = Some(6);
        config.defaults.config_file = Some("quiet".to_string());
        config
            .variables
            .insert("preserve_interword_spaces".to_string(), "1".to_string());

        let ocr = Tesseract::from_config(&config, "in.png").without_temp_files();
        assert_eq!(ocr.model().thread_limit(), Some(1));
        assert_eq!(ocr.model().timeout(), Some(Duration::from_secs(30)));

        let rendered = ocr.command_with(&ScriptedEngine::new("4.1.1", b"")).unwrap();
        assert_eq!(rendered.env, vec![("OMP_THREAD_LIMIT".to_string(), "1".to_string())]);
        assert_eq!(
            rendered.arg_values(),
            vec![
                "in.png",
                "-",
                "-l",
                "eng",
                "--psm",
                "6",
                "-c",
                "preserve_interword_spaces=1",
                "quiet"
            ]
        );
    }

    #[test]
    fn test_output_file_overrides_without_temp_files() {
        let ocr = Tesseract::new("in.png").without_temp_files().output_file("/tmp/out.txt");
        assert!(ocr.model().use_file_output());

        let ocr = ocr.without_temp_files();
        assert!(!ocr.model().use_file_output());
        assert!(ocr.output_file.is_none());
    }
}
