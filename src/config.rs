use std::path::PathBuf;

use log::warn;

use crate::dataset::DEFAULT_CSV_PATH;

const DEFAULT_EXPORT_DIR: &str = "exports";

/// The two dashboard flavours: same data, different tab labels and
/// per-match chart arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutVariant {
    #[default]
    Classic,
    Compact,
}

impl LayoutVariant {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "classic" | "v1" => Some(Self::Classic),
            "compact" | "v2" => Some(Self::Compact),
            _ => None,
        }
    }

    pub fn tab_labels(self) -> [&'static str; 3] {
        match self {
            Self::Classic => [
                "Rendimiento por Partido",
                "Comparativa vs Equipo",
                "Evolución Histórica",
            ],
            Self::Compact => ["Partido", "Vs Equipo", "Histórico"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub csv_path: PathBuf,
    pub layout: LayoutVariant,
    pub export_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    /// Fallbacks taken while resolving, shown in the dashboard console.
    pub notices: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            layout: LayoutVariant::Classic,
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            log_file: None,
            notices: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads `.env.local`/`.env` into the environment and returns the process args.
    pub fn load_env() -> Vec<String> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        std::env::args().skip(1).collect()
    }

    /// Only the log file, so a logger can exist before the rest is resolved.
    pub fn resolve_log_file(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<PathBuf> {
        arg_value(args, "--log-file")
            .or_else(|| env("RUGBY_LOG_FILE").filter(|v| !v.trim().is_empty()))
            .map(PathBuf::from)
    }

    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let lookup = |flag: &str, key: &str| {
            arg_value(args, flag).or_else(|| env(key).filter(|v| !v.trim().is_empty()))
        };

        let csv_path = lookup("--csv", "RUGBY_CSV_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.csv_path);
        let export_dir = lookup("--export-dir", "RUGBY_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);
        let log_file = Self::resolve_log_file(args, &env);
        let mut notices = Vec::new();
        let layout = match lookup("--layout", "RUGBY_LAYOUT") {
            Some(raw) => LayoutVariant::parse(&raw).unwrap_or_else(|| {
                let notice = format!("unknown layout '{raw}', using classic");
                warn!("{notice}");
                notices.push(notice);
                LayoutVariant::Classic
            }),
            None => defaults.layout,
        };

        Self {
            csv_path,
            layout,
            export_dir,
            log_file,
            notices,
        }
    }
}

/// Accepts both `--flag value` and `--flag=value`.
pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
        {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_args_or_env() {
        let cfg = AppConfig::resolve(&[], |_| None);
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.csv_path, PathBuf::from("DATOS_PARTIDOS.csv.csv"));
    }

    #[test]
    fn args_override_env() {
        let cfg = AppConfig::resolve(&args(&["--csv=cli.csv", "--layout", "compact"]), |key| {
            match key {
                "RUGBY_CSV_PATH" => Some("env.csv".to_string()),
                "RUGBY_EXPORT_DIR" => Some("out".to_string()),
                _ => None,
            }
        });
        assert_eq!(cfg.csv_path, PathBuf::from("cli.csv"));
        assert_eq!(cfg.export_dir, PathBuf::from("out"));
        assert_eq!(cfg.layout, LayoutVariant::Compact);
    }

    #[test]
    fn unknown_layout_falls_back_to_classic() {
        let cfg = AppConfig::resolve(&args(&["--layout=fancy"]), |_| None);
        assert_eq!(cfg.layout, LayoutVariant::Classic);
        assert_eq!(cfg.notices, vec!["unknown layout 'fancy', using classic"]);
    }

    #[test]
    fn log_file_resolves_without_the_rest() {
        let from_env = AppConfig::resolve_log_file(&[], |key| {
            (key == "RUGBY_LOG_FILE").then(|| "dash.log".to_string())
        });
        assert_eq!(from_env, Some(PathBuf::from("dash.log")));
        let from_args =
            AppConfig::resolve_log_file(&args(&["--log-file=cli.log"]), |_| Some("env.log".into()));
        assert_eq!(from_args, Some(PathBuf::from("cli.log")));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let cfg = AppConfig::resolve(&[], |_| Some("  ".to_string()));
        assert_eq!(cfg.log_file, None);
    }

    #[test]
    fn arg_value_skips_empty_values() {
        assert_eq!(arg_value(&args(&["--csv="]), "--csv"), None);
        assert_eq!(arg_value(&args(&["--csv"]), "--csv"), None);
        assert_eq!(
            arg_value(&args(&["--player", "Ana Paz"]), "--player"),
            Some("Ana Paz".to_string())
        );
    }
}
