//! Finds the schematic editor's `eeschema.json`.
//!
//! An explicit path (command line or `host.eeschema_path` setting) is the
//! only candidate when given.  Otherwise the first existing file wins:
//!
//! 1. `$KICAD_CONFIG_HOME/eeschema.json`;
//! 2. the platform default for the configured editor version:
//!    - Windows:  `%APPDATA%\kicad\<ver>\eeschema.json`
//!    - macOS:    `~/Library/Preferences/kicad/<ver>/eeschema.json`
//!    - other:    `$XDG_CONFIG_HOME/kicad/<ver>/eeschema.json`
//!      (or `~/.config/kicad/<ver>/eeschema.json`)

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// File name of the host configuration file.
pub const EESCHEMA_FILE_NAME: &str = "eeschema.json";

/// Editor version assumed when none is configured.
pub const DEFAULT_KICAD_VERSION: &str = "9.0";

#[derive(Debug, Error)]
pub enum LocateError {
    /// None of the candidate paths exists.
    #[error("{} not found; tried: {}", EESCHEMA_FILE_NAME, display_paths(.tried))]
    FileNotFound { tried: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no candidate paths; set HOME or pass --config)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Environment variables consulted during resolution.
///
/// Captured once so resolution can be tested without touching the process
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
    pub kicad_config_home: Option<PathBuf>,
    pub appdata: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl HostEnv {
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            kicad_config_home: var("KICAD_CONFIG_HOME"),
            appdata: var("APPDATA"),
            xdg_config_home: var("XDG_CONFIG_HOME"),
            home: var("HOME"),
        }
    }
}

/// Lists every candidate path in resolution order.
///
/// An explicit path replaces the search entirely.
pub fn candidate_paths(explicit: Option<&Path>, env: &HostEnv, version: &str) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut candidates = Vec::new();
    if let Some(dir) = &env.kicad_config_home {
        candidates.push(dir.join(EESCHEMA_FILE_NAME));
    }
    if let Some(dir) = platform_kicad_dir(env) {
        candidates.push(dir.join(version).join(EESCHEMA_FILE_NAME));
    }
    candidates
}

/// Returns the first candidate for which `exists` is true.
///
/// A missing explicit path is an error; the search never falls back to a
/// different file than the one named.
///
/// # Errors
///
/// Returns [`LocateError::FileNotFound`] listing every candidate tried.
pub fn locate_eeschema(
    explicit: Option<&Path>,
    env: &HostEnv,
    version: &str,
    exists: impl Fn(&Path) -> bool,
) -> Result<PathBuf, LocateError> {
    let tried = candidate_paths(explicit, env, version);
    for path in &tried {
        if exists(path) {
            debug!(path = %path.display(), "located host configuration file");
            return Ok(path.clone());
        }
    }
    Err(LocateError::FileNotFound { tried })
}

/// Per-platform `kicad` settings directory, without the version component.
fn platform_kicad_dir(env: &HostEnv) -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env.appdata.as_ref().map(|p| p.join("kicad"))
    }

    #[cfg(target_os = "macos")]
    {
        env.home
            .as_ref()
            .map(|h| h.join("Library").join("Preferences").join("kicad"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let base = env
            .xdg_config_home
            .clone()
            .or_else(|| env.home.as_ref().map(|h| h.join(".config")))?;
        Some(base.join("kicad"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> HostEnv {
        HostEnv {
            kicad_config_home: None,
            appdata: Some(PathBuf::from("/appdata")),
            xdg_config_home: None,
            home: Some(PathBuf::from("/home/u")),
        }
    }

    #[test]
    fn test_explicit_path_is_the_only_candidate() {
        // Arrange
        let mut env = env();
        env.kicad_config_home = Some(PathBuf::from("/kc"));

        // Act
        let candidates = candidate_paths(Some(Path::new("/x/eeschema.json")), &env, "9.0");

        // Assert
        assert_eq!(candidates, vec![PathBuf::from("/x/eeschema.json")]);
    }

    #[test]
    fn test_search_order_without_explicit_path() {
        let mut env = env();
        env.kicad_config_home = Some(PathBuf::from("/kc"));

        let candidates = candidate_paths(None, &env, "9.0");

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], PathBuf::from("/kc/eeschema.json"));
    }

    #[test]
    fn test_platform_default_contains_version() {
        let candidates = candidate_paths(None, &env(), "8.0");
        let last = candidates.last().expect("platform default");
        assert!(last.ends_with(Path::new("kicad/8.0/eeschema.json")), "{last:?}");
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    #[test]
    fn test_xdg_config_home_is_honoured() {
        let mut env = env();
        env.xdg_config_home = Some(PathBuf::from("/xdg"));

        let candidates = candidate_paths(None, &env, "9.0");

        assert_eq!(candidates, vec![PathBuf::from("/xdg/kicad/9.0/eeschema.json")]);
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    #[test]
    fn test_home_fallback_uses_dot_config() {
        let candidates = candidate_paths(None, &env(), "9.0");
        assert_eq!(
            candidates,
            vec![PathBuf::from("/home/u/.config/kicad/9.0/eeschema.json")]
        );
    }

    #[test]
    fn test_locate_missing_explicit_path_does_not_fall_back() {
        // Arrange – only the KICAD_CONFIG_HOME file exists
        let mut env = env();
        env.kicad_config_home = Some(PathBuf::from("/real"));

        // Act
        let result = locate_eeschema(Some(Path::new("/typo/eeschema.json")), &env, "9.0", |p| {
            p == Path::new("/real/eeschema.json")
        });

        // Assert
        match result {
            Err(LocateError::FileNotFound { tried }) => {
                assert_eq!(tried, vec![PathBuf::from("/typo/eeschema.json")]);
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_locate_existing_explicit_path() {
        let found = locate_eeschema(Some(Path::new("/x/eeschema.json")), &env(), "9.0", |_| true)
            .expect("locate");
        assert_eq!(found, PathBuf::from("/x/eeschema.json"));
    }

    #[test]
    fn test_locate_returns_first_existing_default() {
        let mut env = env();
        env.kicad_config_home = Some(PathBuf::from("/kc"));

        let found = locate_eeschema(None, &env, "9.0", |p| p != Path::new("/kc/eeschema.json"))
            .expect("locate");

        assert!(found.ends_with(Path::new("kicad/9.0/eeschema.json")), "{found:?}");
    }

    #[test]
    fn test_locate_nothing_found_lists_every_candidate() {
        let mut env = env();
        env.kicad_config_home = Some(PathBuf::from("/kc"));

        let result = locate_eeschema(None, &env, "9.0", |_| false);

        match result {
            Err(LocateError::FileNotFound { tried }) => assert_eq!(tried.len(), 2),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_no_environment_yields_empty_candidates_message() {
        let err = locate_eeschema(None, &HostEnv::default(), "9.0", |_| true).unwrap_err();
        assert!(err.to_string().contains("--config"));
    }
}
