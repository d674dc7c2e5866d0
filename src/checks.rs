//! Preconditions and postconditions of an engine run.
//!
//! Each check maps one failure mode onto a [`TessrunError`] variant so the
//! caller sees what went wrong before (or instead of) an engine diagnostic.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tessrun_command::{CommandModel, EngineVersion};
use tessrun_runner::ProcessOutput;
use tracing::debug;

use crate::TessrunError;

/// Oldest engine that reads images from stdin and writes results to stdout.
pub const STREAM_IO_MIN_VERSION: &str = "3.03-rc1";

/// Fail unless the input image exists.
pub fn check_image_path(path: &Path) -> Result<(), TessrunError> {
    if path.exists() {
        return Ok(());
    }
    Err(TessrunError::ImageNotFound {
        path: path.to_path_buf(),
    })
}

/// Resolve the engine executable through `PATH`, or directly when it
/// contains a path separator.
pub fn check_executable_presence(executable: &Path) -> Result<PathBuf, TessrunError> {
    match which::which(executable) {
        Ok(resolved) => {
            debug!(resolved = %resolved.display(), "Found engine executable");
            Ok(resolved)
        }
        Err(_) => Err(TessrunError::ExecutableNotFound {
            executable: executable.display().to_string(),
        }),
    }
}

/// Make sure the result can be written to `path`.
///
/// Missing parent directories are created. The directory is probed by
/// creating a scratch file in it; an existing target must open for append.
pub fn check_write_permissions(path: &Path) -> Result<(), TessrunError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|_| TessrunError::NoWritePermission { path: dir.clone() })?;
    }

    tempfile::Builder::new()
        .prefix(".tessrun-probe")
        .tempfile_in(&dir)
        .map_err(|_| TessrunError::NoWritePermission { path: dir.clone() })?;

    if path.exists() {
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|_| TessrunError::NoWritePermission {
                path: path.to_path_buf(),
            })?;
    }

    Ok(())
}

/// Fail unless the engine produced output where the model expects it.
///
/// File mode needs a non-empty `<base>.<ext>`; stream mode needs non-empty
/// stdout. The exit code alone is not trusted: the engine exits 0 on some
/// unreadable images and non-zero after writing partial output.
pub fn check_command_output(
    model: &CommandModel,
    output: &ProcessOutput,
    command: &str,
) -> Result<(), TessrunError> {
    let produced = if model.use_file_output() {
        let result = model.output_file(true)?;
        std::fs::metadata(&result).is_ok_and(|meta| meta.len() > 0)
    } else {
        !output.stdout.is_empty()
    };

    if produced {
        return Ok(());
    }
    Err(TessrunError::UnsuccessfulCommand {
        command: command.to_string(),
        stderr: output.stderr_string(),
    })
}

/// Fail when `actual` predates `required`, naming the feature as `action`.
///
/// `command` is the rendered command line the feature was requested for.
pub fn check_engine_version(
    action: &str,
    required: &str,
    actual: &EngineVersion,
    command: &str,
) -> Result<(), TessrunError> {
    let required = EngineVersion::parse(required)?;
    if actual.at_least(&required) {
        return Ok(());
    }
    Err(TessrunError::FeatureNotAvailable {
        action: action.to_string(),
        required: required.to_string(),
        actual: actual.to_string(),
        command: command.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserFriendlyError;
    use tessrun_command::ImageSource;
    use tempfile::TempDir;

    fn v(text: &str) -> EngineVersion {
        EngineVersion::parse(text).unwrap()
    }

    // ===== Image and executable =====

    #[test]
    fn test_image_path_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("scan.png");
        match check_image_path(&missing) {
            Err(TessrunError::ImageNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected ImageNotFound, got {other:?}"),
        }

        std::fs::write(&missing, b"\x89PNG").unwrap();
        assert!(check_image_path(&missing).is_ok());
    }

    #[test]
    fn test_executable_missing() {
        let err = check_executable_presence(Path::new("tessrun-no-such-engine-7d2a")).unwrap_err();
        assert!(matches!(
            err,
            TessrunError::ExecutableNotFound { executable } if executable == "tessrun-no-such-engine-7d2a"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_found_on_path() {
        assert!(check_executable_presence(Path::new("sh")).is_ok());
    }

    // ===== Write permissions =====

    #[test]
    fn test_write_permissions_create_parent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out").join("nested").join("page.txt");
        check_write_permissions(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());
        // The probe leaves nothing behind
        assert_eq!(std::fs::read_dir(target.parent().unwrap()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_permissions_readonly_target() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("page.txt");
        std::fs::write(&target, b"old").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o444)).unwrap();

        // root ignores permission bits
        if OpenOptions::new().append(true).open(&target).is_ok() {
            return;
        }
        assert!(matches!(
            check_write_permissions(&target),
            Err(TessrunError::NoWritePermission { path }) if path == target
        ));
    }

    // ===== Output =====

    #[test]
    fn test_command_output_empty_file() {
        let dir = TempDir::new().unwrap();
        let mut model = CommandModel::new("in.png");
        model.set_temp_dir(dir.path());
        std::fs::write(model.output_file(true).unwrap(), b"").unwrap();

        let output = ProcessOutput::new(Vec::new(), b"Empty page!!\n".to_vec(), Some(0));
        match check_command_output(&model, &output, "\"tesseract\" \"in.png\"") {
            Err(TessrunError::UnsuccessfulCommand { command, stderr }) => {
                assert_eq!(command, "\"tesseract\" \"in.png\"");
                assert_eq!(stderr, "Empty page!!\n");
            }
            other => panic!("Expected UnsuccessfulCommand, got {other:?}"),
        }
    }

    #[test]
    fn test_command_output_written_file() {
        let dir = TempDir::new().unwrap();
        let mut model = CommandModel::new("in.png");
        model.set_temp_dir(dir.path());
        std::fs::write(model.output_file(true).unwrap(), b"Hello").unwrap();

        let output = ProcessOutput::new(Vec::new(), Vec::new(), Some(0));
        assert!(check_command_output(&model, &output, "cmd").is_ok());
    }

    #[test]
    fn test_command_output_stdout_mode() {
        let mut model = CommandModel::default();
        model
            .set_image(ImageSource::Bytes(b"img".to_vec()))
            .set_use_file_output(false);

        let empty = ProcessOutput::new(Vec::new(), Vec::new(), Some(0));
        assert!(check_command_output(&model, &empty, "cmd").is_err());

        let text = ProcessOutput::new(b"Hello".to_vec(), Vec::new(), Some(0));
        assert!(check_command_output(&model, &text, "cmd").is_ok());
    }

    // ===== Version =====

    #[test]
    fn test_engine_version_gate() {
        let action = "Reading image data from stdin";
        let command = "\"tesseract\" - -";
        assert!(check_engine_version(action, STREAM_IO_MIN_VERSION, &v("3.03"), command).is_ok());
        assert!(check_engine_version(action, STREAM_IO_MIN_VERSION, &v("4.1.1"), command).is_ok());

        let err = check_engine_version(action, STREAM_IO_MIN_VERSION, &v("3.02.02"), command)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error! Reading image data from stdin is not available in this Tesseract version\nRequired version is 3.03-rc1, actual version is 3.02.02\n\nGenerated command:\n\"tesseract\" - -"
        );
        assert!(
            err.context()
                .unwrap()
                .contains("Generated command: \"tesseract\" - -")
        );
    }
}
