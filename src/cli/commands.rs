//! Command implementations for the tessrun CLI
//!
//! Each handler prints its own output. Library failures propagate as
//! [`TessrunError`] inside `anyhow::Error` so `run()` can map them to exit
//! codes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use super::args::OcrArgs;
use crate::artifacts::TempArtifacts;
use crate::checks::check_image_path;
use crate::{Config, Tesseract};

/// JSON output of `tessrun ocr --json`.
#[derive(Debug, Serialize)]
pub struct OcrOutput {
    pub schema_version: &'static str,
    pub image: PathBuf,
    /// Recognised text, omitted when the result went to `output`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Rendered command line, present for dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// JSON output of `tessrun version --json`.
#[derive(Debug, Serialize)]
pub struct VersionOutput {
    pub schema_version: &'static str,
    pub executable: String,
    pub version: String,
}

/// JSON output of `tessrun langs --json`.
#[derive(Debug, Serialize)]
pub struct LangsOutput {
    pub schema_version: &'static str,
    pub languages: Vec<String>,
}

/// One entry of `tessrun config --json`.
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

/// JSON output of `tessrun config --json`.
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub schema_version: &'static str,
    pub config_path: Option<PathBuf>,
    pub values: BTreeMap<String, ConfigEntry>,
}

fn emit_json<T: Serialize>(output: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("Failed to serialize JSON output")?;
    println!("{json}");
    Ok(())
}

/// Build the facade for an `ocr` invocation.
///
/// Configuration-backed flags already live in `config`; only the flags the
/// config layer does not know about are applied here.
fn build_tesseract(args: &OcrArgs, config: &Config) -> Result<Tesseract> {
    let mut ocr = Tesseract::from_config(config, &args.image);

    if let Some(path) = &args.user_words {
        ocr = ocr.user_words(path);
    }
    if let Some(path) = &args.user_patterns {
        ocr = ocr.user_patterns(path);
    }
    if let Some(chars) = &args.whitelist {
        ocr = ocr.whitelist([chars]);
    }

    if args.stdin {
        check_image_path(&args.image)?;
        let bytes = std::fs::read(&args.image)
            .with_context(|| format!("Failed to read image {}", args.image.display()))?;
        ocr = ocr.image_data(bytes);
    }
    if args.stdout {
        ocr = ocr.without_temp_files();
    }
    if let Some(output) = &args.output {
        ocr = ocr.output_file(output);
    }

    Ok(ocr)
}

/// Execute `tessrun ocr`.
pub fn execute_ocr_command(args: &OcrArgs, config: &Config, json: bool) -> Result<()> {
    let ocr = build_tesseract(args, config)?;

    if args.dry_run {
        let rendered = ocr.command()?;
        // Rendering reserves the temp output name; nothing will write to it
        let _reserved = ocr
            .model()
            .generated_output_file()
            .map(|base| TempArtifacts::new(base.to_path_buf(), base.to_path_buf()));

        if json {
            return emit_json(&OcrOutput {
                schema_version: "tessrun-ocr.v1",
                image: args.image.clone(),
                text: None,
                output: None,
                command: Some(rendered.to_string()),
            });
        }
        println!("{rendered}");
        return Ok(());
    }

    let text = ocr.run()?;

    if json {
        let wrote_file = args.output.is_some();
        return emit_json(&OcrOutput {
            schema_version: "tessrun-ocr.v1",
            image: args.image.clone(),
            text: (!wrote_file).then_some(text),
            output: args.output.clone(),
            command: None,
        });
    }

    match &args.output {
        Some(output) => eprintln!("✓ Wrote {}", output.display()),
        None => println!("{text}"),
    }
    Ok(())
}

/// Execute `tessrun version`.
pub fn execute_version_command(config: &Config, json: bool) -> Result<()> {
    let version = Tesseract::from_config(config, PathBuf::new()).version()?;

    if json {
        return emit_json(&VersionOutput {
            schema_version: "tessrun-version.v1",
            executable: config.executable().to_string(),
            version: version.to_string(),
        });
    }
    println!("{version}");
    Ok(())
}

/// Execute `tessrun langs`.
pub fn execute_langs_command(config: &Config, json: bool) -> Result<()> {
    let languages = Tesseract::from_config(config, PathBuf::new()).available_languages()?;

    if json {
        return emit_json(&LangsOutput {
            schema_version: "tessrun-langs.v1",
            languages,
        });
    }
    for language in languages {
        println!("{language}");
    }
    Ok(())
}

/// Execute `tessrun config`.
pub fn execute_config_command(config: &Config, json: bool) -> Result<()> {
    let effective = config.effective_config();

    if json {
        let values = effective
            .into_iter()
            .map(|(key, (value, source))| (key, ConfigEntry { value, source }))
            .collect();
        return emit_json(&ConfigOutput {
            schema_version: "tessrun-config.v1",
            config_path: config.config_path.clone(),
            values,
        });
    }

    println!("{}", format_effective_config(config));
    Ok(())
}

/// Plain-text listing: the config file, then `key = value  (source)` lines.
fn format_effective_config(config: &Config) -> String {
    let effective = config.effective_config();
    let width = effective.keys().map(String::len).max().unwrap_or(0);

    let mut lines = vec![match &config.config_path {
        Some(path) => format!("Config file: {}", path.display()),
        None => "Config file: (none)".to_string(),
    }];
    for (key, (value, source)) in &effective {
        lines.push(format!("  {key:<width$} = {value}  ({source})"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_effective_config() {
        let mut config = Config::default();
        config.defaults.psm = Some(6);
        let listing = format_effective_config(&config);

        assert!(listing.starts_with("Config file: (none)\n"));
        assert!(listing.contains("  executable    = tesseract  (default)"));
        assert!(listing.contains("  psm           = 6  (default)"));
    }

    #[test]
    fn test_ocr_output_skips_missing_fields() {
        let output = OcrOutput {
            schema_version: "tessrun-ocr.v1",
            image: PathBuf::from("scan.png"),
            text: Some("Hello".to_string()),
            output: None,
            command: None,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["text"], "Hello");
        assert!(json.get("output").is_none());
        assert!(json.get("command").is_none());
    }

    #[test]
    fn test_stdin_flag_with_missing_image() {
        let args = OcrArgs {
            image: PathBuf::from("/nowhere/scan.png"),
            stdin: true,
            ..OcrArgs::default()
        };
        let err = build_tesseract(&args, &Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::TessrunError>(),
            Some(crate::TessrunError::ImageNotFound { .. })
        ));
    }
}
