//! End-to-end runs of the library against the tesseract-stub binary
//!
//! The stub's behaviour is selected by the first line of the image
//! (`stub:<mode>`), so these tests need no environment mutation.
//!
//! Run with: `cargo test --features dev-tools --test stub_engine_runs`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tessrun::{NativeRunner, Tesseract, TessrunError};

const STUB: &str = env!("CARGO_BIN_EXE_tesseract-stub");

/// Scratch area: an input directory and an isolated temp dir for outputs.
struct Scratch {
    input: TempDir,
    temp: TempDir,
}

impl Scratch {
    fn new() -> Self {
        Self {
            input: TempDir::new().unwrap(),
            temp: TempDir::new().unwrap(),
        }
    }

    fn image(&self, name: &str, content: &str) -> PathBuf {
        let path = self.input.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn tesseract(&self, image: &Path) -> Tesseract {
        Tesseract::new(image).executable(STUB).temp_dir(self.temp.path())
    }

    fn temp_is_empty(&self) -> bool {
        fs::read_dir(self.temp.path()).unwrap().next().is_none()
    }
}

// ===== File output =====

#[test]
fn test_file_mode_returns_trimmed_text() {
    let scratch = Scratch::new();
    let image = scratch.image("page.png", "\n  The quick brown fox\n\x0C");

    let text = scratch.tesseract(&image).run().unwrap();

    assert_eq!(text, "The quick brown fox");
    assert!(scratch.temp_is_empty());
}

#[test]
fn test_zero_byte_output_is_unsuccessful_and_cleaned() {
    let scratch = Scratch::new();
    let image = scratch.image("blank.png", "stub:empty\n");

    let err = scratch.tesseract(&image).psm(6).run().unwrap_err();

    assert!(matches!(err, TessrunError::UnsuccessfulCommand { .. }));
    let message = err.to_string();
    assert!(message.contains("did not produce any output"), "{message}");
    assert!(message.contains("blank.png"), "{message}");
    assert!(message.contains("--psm 6"), "{message}");
    // Neither <base> nor <base>.txt survives
    assert!(scratch.temp_is_empty());
}

#[test]
fn test_engine_failure_keeps_engine_message() {
    let scratch = Scratch::new();
    let image = scratch.image("page.png", "stub:fail\n");

    match scratch.tesseract(&image).lang(["xyz"]).run() {
        Err(TessrunError::UnsuccessfulCommand { command, stderr }) => {
            assert!(command.contains("-l xyz"));
            assert!(stderr.contains("Failed loading language 'xyz'"));
        }
        other => panic!("Expected UnsuccessfulCommand, got {other:?}"),
    }
    assert!(scratch.temp_is_empty());
}

#[test]
fn test_output_file_keeps_hocr_result() {
    let scratch = Scratch::new();
    let image = scratch.image("page.png", "<div class='ocr_page'>hOCR</div>");
    let target = scratch.input.path().join("out").join("page.hocr");

    let text = scratch
        .tesseract(&image)
        .config_file("hocr")
        .output_file(&target)
        .run()
        .unwrap();

    assert_eq!(text, "<div class='ocr_page'>hOCR</div>");
    assert_eq!(fs::read_to_string(&target).unwrap(), text);
    assert!(scratch.temp_is_empty());
}

#[test]
fn test_run_raw_is_untrimmed() {
    let scratch = Scratch::new();
    let image = scratch.image("page.png", "  padded  \n");
    let bytes = scratch.tesseract(&image).run_raw().unwrap();
    assert_eq!(bytes, b"  padded  \n");
}

// ===== Streams =====

#[test]
fn test_stdin_to_stdout() {
    let scratch = Scratch::new();
    let text = scratch
        .tesseract(Path::new("unused.png"))
        .image_data(b"streamed page\n".to_vec())
        .without_temp_files()
        .run()
        .unwrap();

    assert_eq!(text, "streamed page");
    assert!(scratch.temp_is_empty());
}

#[test]
fn test_stdin_to_file() {
    let scratch = Scratch::new();
    let text = scratch
        .tesseract(Path::new("unused.png"))
        .image_data(b"from stdin".to_vec())
        .run()
        .unwrap();
    assert_eq!(text, "from stdin");
    assert!(scratch.temp_is_empty());
}

#[test]
fn test_large_stdin_payload() {
    let scratch = Scratch::new();
    let payload = "lorem ipsum dolor sit amet\n".repeat(200_000);

    let text = scratch
        .tesseract(Path::new("unused.png"))
        .image_data(payload.clone().into_bytes())
        .without_temp_files()
        .run()
        .unwrap();

    assert_eq!(text.len(), payload.trim_end().len());
}

#[test]
fn test_flooding_engine_does_not_deadlock() {
    let scratch = Scratch::new();
    let image = scratch.image("noisy.png", "stub:flood\nsurvived");

    let started = Instant::now();
    let text = scratch.tesseract(&image).run().unwrap();
    assert_eq!(text, "survived");

    let streamed = scratch
        .tesseract(&image)
        .without_temp_files()
        .run()
        .unwrap();
    assert_eq!(streamed, "survived");
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn test_timeout_applies_while_engine_ignores_stdin() {
    let scratch = Scratch::new();
    // The sleeping stub stops reading after the mode line, so the rest of
    // the payload fills the pipe
    let mut payload = b"stub:sleep\n".to_vec();
    payload.resize(1 << 20, b'x');

    let started = Instant::now();
    let err = scratch
        .tesseract(Path::new("unused.png"))
        .image_data(payload)
        .without_temp_files()
        .timeout(Duration::from_millis(500))
        .run()
        .unwrap_err();

    assert!(matches!(err, TessrunError::Timeout { timeout_ms: 500, .. }));
    assert!(started.elapsed() < Duration::from_secs(20));
}

// ===== Command line =====

#[cfg(unix)]
#[test]
fn test_arguments_arrive_verbatim() {
    let scratch = Scratch::new();
    let image = scratch.image("it's a \"scan\" $HOME `x`.png", "stub:echo-args\n");

    let text = scratch
        .tesseract(&image)
        .without_temp_files()
        .lang(["eng", "deu"])
        .psm(6)
        .config("tesseditCharWhitelist", "AB C")
        .run()
        .unwrap();

    let argv: Vec<&str> = text.lines().collect();
    assert_eq!(
        argv,
        vec![
            image.to_str().unwrap(),
            "-",
            "-l",
            "eng+deu",
            "--psm",
            "6",
            "-c",
            "tessedit_char_whitelist=AB C"
        ]
    );
}

#[test]
fn test_thread_limit_reaches_engine_env() {
    let scratch = Scratch::new();
    let image = scratch.image("page.png", "stub:env\n");

    let limited = scratch.tesseract(&image).thread_limit(1).run().unwrap();
    assert_eq!(limited, "1");
}

#[test]
fn test_timeout_kills_engine() {
    let scratch = Scratch::new();
    let image = scratch.image("slow.png", "stub:sleep\n");

    let started = Instant::now();
    let err = scratch
        .tesseract(&image)
        .timeout(Duration::from_secs(1))
        .run()
        .unwrap_err();

    match err {
        TessrunError::Timeout {
            command,
            timeout_ms,
        } => {
            assert_eq!(timeout_ms, 1000);
            assert!(command.contains("slow.png"));
        }
        other => panic!("Expected Timeout, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(20));
    assert!(scratch.temp_is_empty());
}

// ===== Engine queries =====

#[test]
fn test_version_and_languages() {
    let ocr = Tesseract::new("unused.png").executable(STUB);

    assert_eq!(ocr.version().unwrap().as_str(), "4.1.1");
    assert_eq!(
        ocr.available_languages_with(&NativeRunner::new()).unwrap(),
        vec!["deu", "eng", "fra", "osd"]
    );
}

#[test]
fn test_command_is_rendered_for_engine_version() {
    let scratch = Scratch::new();
    let rendered = scratch
        .tesseract(Path::new("page.png"))
        .oem(1)
        .psm(3)
        .command()
        .unwrap();

    let line = rendered.to_string();
    assert!(line.contains("--oem 1 --psm 3"), "{line}");
    assert!(line.starts_with(&format!("\"{STUB}\" \"page.png\"")), "{line}");
}
