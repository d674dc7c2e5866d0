use std::path::PathBuf;

/// Configuration values supplied on the command line.
///
/// Every field is optional; `None` (or an empty list) leaves the file or
/// default value in place.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub executable: Option<String>,
    pub thread_limit: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub temp_dir: Option<PathBuf>,
    pub lang: Vec<String>,
    pub psm: Option<u8>,
    pub oem: Option<u8>,
    pub tessdata_dir: Option<PathBuf>,
    pub config_file: Option<String>,
    /// `KEY=VALUE` engine variables, later entries win
    pub variables: Vec<(String, String)>,
}
