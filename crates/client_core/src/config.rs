use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE_NAME: &str = "board.toml";
const SETTINGS_DIR_NAME: &str = "station_board";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSettings {
    pub api_base_url: String,
    pub notification_timeout_ms: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".into(),
            notification_timeout_ms: 5000,
            request_timeout_secs: None,
        }
    }
}

impl BoardSettings {
    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    notification_timeout_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the first settings file found, then environment overrides.
pub fn load_settings() -> anyhow::Result<BoardSettings> {
    let mut settings = BoardSettings::default();

    if let Some(path) = settings_file_candidates()
        .into_iter()
        .find(|path| path.is_file())
    {
        apply_file(&mut settings, &path)?;
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn settings_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(SETTINGS_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME));
    }
    candidates
}

fn apply_file(settings: &mut BoardSettings, path: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;

    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.notification_timeout_ms {
        settings.notification_timeout_ms = v;
    }
    if file_cfg.request_timeout_secs.is_some() {
        settings.request_timeout_secs = file_cfg.request_timeout_secs;
    }
    Ok(())
}

fn apply_env(settings: &mut BoardSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("STATION_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__NOTIFICATION_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notification_timeout_ms = parsed;
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
}

/// Checks the scheme and drops any trailing slash so paths can be appended verbatim.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).with_context(|| format!("invalid api base url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("api base url must start with http:// or https://, got '{raw}'");
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn normalizes_trailing_slash_and_rejects_other_schemes() {
        assert_eq!(
            normalize_base_url(" http://localhost:8000/api/ ").expect("valid"),
            "http://localhost:8000/api"
        );
        assert!(normalize_base_url("ftp://localhost/api").is_err());
        assert!(normalize_base_url("localhost:8000").is_err());
    }

    #[test]
    fn later_env_names_win_and_bad_numbers_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STATION_API_URL", "http://first.example"),
            ("APP__API_BASE_URL", "http://second.example"),
            ("APP__NOTIFICATION_TIMEOUT_MS", "not-a-number"),
            ("APP__REQUEST_TIMEOUT_SECS", "15"),
        ]);
        let mut settings = BoardSettings::default();

        apply_env(&mut settings, |name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(settings.api_base_url, "http://second.example");
        assert_eq!(settings.notification_timeout_ms, 5000);
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn file_values_override_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("station_board_settings_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");
        let path = temp_root.join(SETTINGS_FILE_NAME);
        fs::write(
            &path,
            "api_base_url = \"https://stations.example/api/\"\nnotification_timeout_ms = 2500\n",
        )
        .expect("write settings");

        let mut settings = BoardSettings::default();
        apply_file(&mut settings, &path).expect("apply file");

        assert_eq!(settings.api_base_url, "https://stations.example/api/");
        assert_eq!(settings.notification_timeout(), Duration::from_millis(2500));
        assert_eq!(settings.request_timeout(), None);

        fs::remove_dir_all(temp_root).expect("cleanup");
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("station_board_bad_settings_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");
        let path = temp_root.join(SETTINGS_FILE_NAME);
        fs::write(&path, "notification_timeout_ms = \"soon\"\n").expect("write settings");

        let err = apply_file(&mut BoardSettings::default(), &path).expect_err("must fail");
        assert!(format!("{err:#}").contains(SETTINGS_FILE_NAME));

        fs::remove_dir_all(temp_root).expect("cleanup");
    }
}
