//! Stub Tesseract engine for development testing
//!
//! This binary mimics the Tesseract command line closely enough for tessrun's
//! integration tests to run without a real engine. It answers `--version` and
//! `--list-langs`, and "recognises" an image by echoing its contents.
//!
//! Behaviour is selected by the image itself: when its first line is
//! `stub:<mode>`, the remaining lines are the payload and `<mode>` is one of
//!
//! - `empty`: exit 0 without producing any text
//! - `flood`: write several MiB to stderr and stdout before the result
//! - `sleep`: hang for a minute; on stdin, nothing after this line is read
//! - `echo-args`: the result is the received argv, one per line
//! - `env`: the result is `OMP_THREAD_LIMIT` (or `unset`)
//! - `fail`: print an engine-style error and exit 1
//!
//! The reported version comes from `TESSRUN_STUB_VERSION` (default `4.1.1`).

use clap::{Arg, ArgAction, Command};
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

const DEFAULT_VERSION: &str = "4.1.1";
const LANGUAGES: [&str; 4] = ["deu", "eng", "fra", "osd"];
const TESSDATA: &str = "/usr/share/tesseract-ocr/4.00/tessdata/";
const FLOOD_BYTES: usize = 4 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Echo,
    Empty,
    Flood,
    Sleep,
    EchoArgs,
    Env,
    Fail,
}

impl Mode {
    fn parse(name: &str) -> Self {
        match name.trim() {
            "empty" => Self::Empty,
            "flood" => Self::Flood,
            "sleep" => Self::Sleep,
            "echo-args" => Self::EchoArgs,
            "env" => Self::Env,
            "fail" => Self::Fail,
            _ => Self::Echo,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("tesseract-stub")
        .about("Stub Tesseract engine for testing")
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print the engine version banner")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-langs")
                .long("list-langs")
                .help("List installed languages")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("args")
                .help("IMAGE OUTPUTBASE [OPTIONS]... [CONFIGFILE]...")
                .num_args(0..)
                .allow_hyphen_values(true)
                .trailing_var_arg(true),
        )
        .get_matches();

    let version =
        std::env::var("TESSRUN_STUB_VERSION").unwrap_or_else(|_| DEFAULT_VERSION.to_string());

    if matches.get_flag("version") {
        print_banner(&version);
        return Ok(());
    }
    if matches.get_flag("list-langs") {
        println!(
            "List of available languages in \"{TESSDATA}\" ({}):",
            LANGUAGES.len()
        );
        for lang in LANGUAGES {
            println!("{lang}");
        }
        return Ok(());
    }

    let args: Vec<String> = matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let [image, output_base, options @ ..] = args.as_slice() else {
        eprintln!("Usage: tesseract --help | --help-extra | --version");
        eprintln!("       tesseract --list-langs");
        eprintln!("       tesseract imagename outputbase [options...] [configfile...]");
        std::process::exit(1);
    };

    let content = match read_image(image) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error in pixReadStream: {e}");
            eprintln!("Error during processing.");
            std::process::exit(1);
        }
    };

    let (mode, payload) = match content.strip_prefix("stub:") {
        Some(rest) => {
            let (mode, payload) = rest.split_once('\n').unwrap_or((rest, ""));
            (Mode::parse(mode), payload.to_string())
        }
        None => (Mode::Echo, content),
    };

    let result = match mode {
        Mode::Echo => payload,
        Mode::Empty => String::new(),
        Mode::Flood => {
            flood(output_base == "-")?;
            payload
        }
        Mode::Sleep => {
            thread::sleep(Duration::from_secs(60));
            payload
        }
        Mode::EchoArgs => args.join("\n"),
        Mode::Env => std::env::var("OMP_THREAD_LIMIT").unwrap_or_else(|_| "unset".to_string()),
        Mode::Fail => {
            eprintln!("Error opening data file {TESSDATA}xyz.traineddata");
            eprintln!("Failed loading language 'xyz'");
            std::process::exit(1);
        }
    };

    write_result(output_base, options, &result)?;
    Ok(())
}

fn print_banner(version: &str) {
    let banner = format!("tesseract {version}\n leptonica-1.79.0\n  libpng 1.6.37 : libtiff 4.1.0\n");
    // Engines before 4.0 print the banner to stderr
    if version.starts_with('3') {
        eprint!("{banner}");
    } else {
        print!("{banner}");
    }
}

fn read_image(image: &str) -> io::Result<String> {
    let bytes = if image == "-" {
        let mut stdin = io::stdin().lock();
        let mut bytes = Vec::new();
        stdin.read_until(b'\n', &mut bytes)?;
        // A sleeping engine leaves the rest of stdin unread
        if bytes != b"stub:sleep\n" {
            stdin.read_to_end(&mut bytes)?;
        }
        bytes
    } else {
        std::fs::read(image)?
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fill stderr, and stdout too unless it carries the result, well past any
/// pipe buffer.
fn flood(stdout_is_result: bool) -> io::Result<()> {
    let warning = "Warning: Invalid resolution 0 dpi. Using 70 instead.\n";
    let progress = "Page 1 : detected 312 diacritics\n";
    let mut stderr = io::stderr().lock();
    let mut stdout = io::stdout().lock();

    let mut written = 0;
    while written < FLOOD_BYTES {
        stderr.write_all(warning.as_bytes())?;
        if !stdout_is_result {
            stdout.write_all(progress.as_bytes())?;
        }
        written += warning.len();
    }
    stderr.flush()?;
    stdout.flush()
}

/// Write `result` where the engine would: stdout for `-`, else
/// `<base>.<ext>` with the extension chosen by the last config file.
fn write_result(output_base: &str, options: &[String], result: &str) -> io::Result<()> {
    if output_base == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(result.as_bytes())?;
        return stdout.flush();
    }

    let ext = options
        .iter()
        .rev()
        .find_map(|option| match option.as_str() {
            "hocr" => Some("hocr"),
            "tsv" => Some("tsv"),
            "pdf" => Some("pdf"),
            "txt" => Some("txt"),
            _ => None,
        })
        .unwrap_or("txt");
    let path = PathBuf::from(format!("{output_base}.{ext}"));
    std::fs::write(path, result)
}
