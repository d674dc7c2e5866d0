use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use super::args::{Cli, Commands, parse_key_value};
use super::run::build_cli_args;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

// ===== Argument parsing =====

#[test]
fn test_ocr_args() {
    let cli = parse(&[
        "tessrun",
        "ocr",
        "scan.png",
        "-l",
        "eng",
        "--lang",
        "deu",
        "--psm",
        "6",
        "--var",
        "tessedit_char_whitelist=0123456789",
        "--var",
        "textord_equation_detect=1",
        "--stdin",
        "--stdout",
    ]);

    let Commands::Ocr(args) = cli.command else {
        panic!("Expected ocr subcommand");
    };
    assert_eq!(args.image, PathBuf::from("scan.png"));
    assert_eq!(args.lang, vec!["eng", "deu"]);
    assert_eq!(args.psm, Some(6));
    assert_eq!(args.variables.len(), 2);
    assert_eq!(
        args.variables[0],
        ("tessedit_char_whitelist".to_string(), "0123456789".to_string())
    );
    assert!(args.stdin && args.stdout);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["tessrun", "version", "--json", "--executable", "/opt/tesseract", "-v"]);
    assert!(cli.json);
    assert!(cli.verbose);
    assert_eq!(cli.executable.as_deref(), Some("/opt/tesseract"));
    assert!(matches!(cli.command, Commands::Version));
}

#[test]
fn test_stdout_conflicts_with_output() {
    let result = Cli::try_parse_from(["tessrun", "ocr", "scan.png", "--stdout", "-o", "out.txt"]);
    assert!(result.is_err());
}

#[test]
fn test_psm_must_be_a_number() {
    assert!(Cli::try_parse_from(["tessrun", "ocr", "scan.png", "--psm", "auto"]).is_err());
}

#[test]
fn test_parse_key_value() {
    assert_eq!(
        parse_key_value("user_defined_dpi=300").unwrap(),
        ("user_defined_dpi".to_string(), "300".to_string())
    );
    // Values may contain '='
    assert_eq!(
        parse_key_value("tessedit_char_blacklist==").unwrap(),
        ("tessedit_char_blacklist".to_string(), "=".to_string())
    );
    assert_eq!(parse_key_value("empty=").unwrap().1, "");
    assert!(parse_key_value("novalue").is_err());
    assert!(parse_key_value("=value").is_err());
}

// ===== Config overrides =====

#[test]
fn test_build_cli_args_from_ocr() {
    let cli = parse(&[
        "tessrun",
        "--config",
        "/etc/tessrun.toml",
        "ocr",
        "scan.png",
        "--oem",
        "1",
        "--thread-limit",
        "2",
        "--timeout",
        "60",
        "--config-file",
        "hocr",
        "--temp-dir",
        "/var/tmp",
    ]);
    let cli_args = build_cli_args(&cli);

    assert_eq!(cli_args.config_path, Some(PathBuf::from("/etc/tessrun.toml")));
    assert_eq!(cli_args.oem, Some(1));
    assert_eq!(cli_args.thread_limit, Some(2));
    assert_eq!(cli_args.timeout_secs, Some(60));
    assert_eq!(cli_args.config_file.as_deref(), Some("hocr"));
    assert_eq!(cli_args.temp_dir, Some(PathBuf::from("/var/tmp")));
    assert!(cli_args.lang.is_empty());
}

#[test]
fn test_build_cli_args_for_engine_queries() {
    let cli = parse(&["tessrun", "langs", "--executable", "tesseract5"]);
    let cli_args = build_cli_args(&cli);

    assert_eq!(cli_args.executable.as_deref(), Some("tesseract5"));
    assert!(cli_args.psm.is_none());
    assert!(cli_args.variables.is_empty());
}
