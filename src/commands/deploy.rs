use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;
use crate::heroku;
use crate::registry::CommandContext;
use crate::shell;

/// Deploy target: the first positional argument, or the configured staging
/// remote when none is given.
fn target_remote<'a>(args: &'a [String], config: &'a Config) -> &'a str {
    match args.first() {
        Some(remote) => remote.as_str(),
        None => config.heroku.staging_remote.as_str(),
    }
}

pub fn cmd_deploy(ctx: &CommandContext, args: &[String]) -> Result<()> {
    let remote = target_remote(args, ctx.config);

    shell::run_checked(&format!("git push {} master", remote))?;
    after_deploy(&std::env::current_dir()?, remote)
}

/// Post-push steps on the dyno: migrate, then collect static. Looks the
/// app name up from the git remotes, so it works however the apps were
/// created.
pub fn after_deploy(project_dir: &Path, remote: &str) -> Result<()> {
    let apps = heroku::discover(project_dir)?;
    let app = match apps.get(remote) {
        Some(app) => app,
        None if apps.is_empty() => {
            bail!("no heroku remotes found\n  hint: run `djeroku heroku_setup` first")
        }
        None => {
            let known: Vec<&str> = apps.keys().map(String::as_str).collect();
            bail!(
                "no heroku app behind remote {:?}\n  hint: known remotes: {}",
                remote,
                known.join(", ")
            );
        }
    };

    heroku::heroku_run(app, "python manage.py migrate")?;
    heroku::heroku_run(app, "python manage.py collectstatic --noinput")
}

/// Moves the slug already built on staging over to production.
pub fn cmd_promote(_ctx: &CommandContext, _args: &[String]) -> Result<()> {
    shell::run_checked("heroku pipeline:promote")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestEnv;

    #[test]
    fn deploy_defaults_to_the_staging_remote() {
        let config = Config::default();
        assert_eq!(target_remote(&[], &config), "staging");
        assert_eq!(
            target_remote(&["production".to_string()], &config),
            "production"
        );
    }

    #[test]
    fn deploy_honors_renamed_remotes() {
        let mut config = Config::default();
        config.heroku.staging_remote = "stage".to_string();
        assert_eq!(target_remote(&[], &config), "stage");
    }

    #[test]
    fn after_deploy_without_heroku_remotes_errors() {
        let env = TestEnv::new();
        let repo = env.create_repo("bare-project");

        let err = after_deploy(&repo, "staging").unwrap_err().to_string();
        assert!(err.contains("no heroku remotes found"), "error: {}", err);
        assert!(err.contains("heroku_setup"), "error: {}", err);
    }

    #[test]
    fn after_deploy_names_known_remotes_on_miss() {
        let env = TestEnv::new();
        let repo = env.create_repo("half-setup");
        env.add_remote(&repo, "staging", "git@heroku.com:half-setup-staging.git");

        let err = after_deploy(&repo, "production").unwrap_err().to_string();
        assert!(err.contains("production"), "error: {}", err);
        assert!(err.contains("known remotes: staging"), "error: {}", err);
    }
}
