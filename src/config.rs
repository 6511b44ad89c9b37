use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Per-project config file, written by `djeroku-new` next to `manage.py`.
pub const PROJECT_CONFIG_FILENAME: &str = "djeroku.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub heroku: HerokuConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Used as the default Heroku app name during setup. When absent the
    /// working directory's name stands in.
    pub name: Option<String>,
    /// Project template handed to `django-admin startproject`: a local path
    /// or a remote archive URL.
    pub template_path: String,
    /// Pip requirement spec pinning the framework.
    pub django_version: String,
    /// Virtualenv directory, relative to the project root.
    pub virtualenv_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HerokuConfig {
    /// Add-ons provisioned on both apps at creation time.
    pub addons: Vec<String>,
    /// Config vars set on both apps during setup.
    pub config_vars: BTreeMap<String, String>,
    pub staging_remote: String,
    pub production_remote: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            name: None,
            template_path: "https://github.com/djeroku/djeroku/archive/master.zip".to_string(),
            django_version: "django>=1.9,<1.10".to_string(),
            virtualenv_dir: "venv".to_string(),
        }
    }
}

impl Default for HerokuConfig {
    fn default() -> Self {
        HerokuConfig {
            addons: vec![
                "heroku-postgresql:hobby-dev".to_string(),
                "scheduler:standard".to_string(),
                "redistogo:nano".to_string(),
                "memcachier:dev".to_string(),
                "mailgun:starter".to_string(),
                "papertrail:choklad".to_string(),
            ],
            config_vars: BTreeMap::from([(
                "DJANGO_SETTINGS_MODULE".to_string(),
                "project.settings.prod".to_string(),
            )]),
            staging_remote: "staging".to_string(),
            production_remote: "production".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            project: ProjectConfig::default(),
            heroku: HerokuConfig::default(),
        }
    }
}

fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{}/{}", home, rest);
        }
    }
    path.to_string()
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(contents).context("failed to parse config TOML")?;

    if config.project.virtualenv_dir.is_empty() {
        bail!("virtualenv_dir must not be empty");
    }
    if config.project.template_path.is_empty() {
        bail!("template_path must not be empty");
    }
    if config.heroku.staging_remote == config.heroku.production_remote {
        bail!(
            "staging and production remotes must differ (both are {:?})",
            config.heroku.staging_remote
        );
    }

    config.project.template_path = expand_tilde(&config.project.template_path);
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    parse_config(&contents)
}

pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_FILENAME)
}

pub fn user_config_path() -> Result<PathBuf> {
    let proj = directories::ProjectDirs::from("", "", "djeroku")
        .context("could not determine config directory")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Resolve configuration for a project directory: the project-local file
/// wins, then the user-level file, then built-in defaults. The first file
/// found is taken whole; layers are not merged.
pub fn load(project_dir: &Path) -> Result<Config> {
    load_with(project_dir, user_config_path().ok().as_deref())
}

fn load_with(project_dir: &Path, user_config: Option<&Path>) -> Result<Config> {
    let local = project_config_path(project_dir);
    if local.exists() {
        return load_config(&local);
    }
    if let Some(user) = user_config {
        if user.exists() {
            return load_config(user);
        }
    }
    Ok(Config::default())
}

pub fn write_config_atomic(path: &Path, config: &Config, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "config already exists at {}\n  hint: remove it first, or edit it in place",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(config).context("failed to serialize config")?;

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, &content)
        .with_context(|| format!("failed to write temp config to {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename config to {}", path.display()))?;

    Ok(())
}
