use anyhow::{bail, Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use crate::shell;

/// Remote name to Heroku app name, as discovered from `git remote -v`.
pub type RemoteApps = BTreeMap<String, String>;

fn heroku_remote_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();

    PATTERNS.get_or_init(|| {
        [
            // HTTPS remotes: name<TAB>https://git.heroku.com/app.git (fetch)
            Regex::new(r"^(.*)\t.*heroku\.com/(.*)\.git \(.*\)").unwrap(),
            // SSH remotes: name<TAB>git@heroku.com:app.git (fetch)
            Regex::new(r"^(.*)\s+.*heroku.*:(.*)\.git \(.*\)").unwrap(),
        ]
    })
}

/// Pick the Heroku-backed remotes out of `git remote -v` output. Each line
/// is tried against the HTTPS pattern first, then the SSH pattern; lines
/// that match neither (GitHub remotes, blank lines) are skipped without
/// comment. Fetch and push lines for the same remote collapse into one
/// entry.
pub fn parse_remote_listing(listing: &str) -> RemoteApps {
    let mut apps = RemoteApps::new();
    for line in listing.lines() {
        for pattern in heroku_remote_patterns() {
            if let Some(caps) = pattern.captures(line) {
                apps.insert(caps[1].to_string(), caps[2].to_string());
                break;
            }
        }
    }
    apps
}

pub fn discover(project_dir: &Path) -> Result<RemoteApps> {
    let output = Command::new("git")
        .args(["remote", "-v"])
        .current_dir(project_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| {
            format!("failed to run git remote -v in {}", project_dir.display())
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git remote -v failed in {} (exit code: {})\nstderr: {}",
            project_dir.display(),
            output
                .status
                .code()
                .map_or("signal".to_string(), |c| c.to_string()),
            stderr.trim()
        );
    }

    let stdout = String::from_utf8(output.stdout).context("git output was not valid UTF-8")?;
    Ok(parse_remote_listing(&stdout))
}

/// Run a one-off command on the app's dyno, streaming its output.
pub fn heroku_run(app: &str, command: &str) -> Result<()> {
    shell::run_checked(&format!("heroku run {} --app={}", command, app))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestEnv;

    #[test]
    fn parses_https_remotes() {
        let listing = "production\thttps://git.heroku.com/sample-prod.git (fetch)\n\
                       production\thttps://git.heroku.com/sample-prod.git (push)\n";
        let apps = parse_remote_listing(listing);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps.get("production"), Some(&"sample-prod".to_string()));
    }

    #[test]
    fn parses_ssh_remotes() {
        let listing = "staging\tgit@heroku.com:sample-staging.git (fetch)\n\
                       staging\tgit@heroku.com:sample-staging.git (push)\n";
        let apps = parse_remote_listing(listing);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps.get("staging"), Some(&"sample-staging".to_string()));
    }

    #[test]
    fn mixed_listing_keeps_only_heroku_remotes() {
        let listing = "origin\tgit@github.com:someone/sample.git (fetch)\n\
                       origin\tgit@github.com:someone/sample.git (push)\n\
                       production\thttps://git.heroku.com/sample-prod.git (fetch)\n\
                       production\thttps://git.heroku.com/sample-prod.git (push)\n\
                       staging\tgit@heroku.com:sample-staging.git (fetch)\n\
                       staging\tgit@heroku.com:sample-staging.git (push)\n";
        let apps = parse_remote_listing(listing);
        assert_eq!(apps.len(), 2);
        assert_eq!(apps.get("production"), Some(&"sample-prod".to_string()));
        assert_eq!(apps.get("staging"), Some(&"sample-staging".to_string()));
        assert!(!apps.contains_key("origin"));
    }

    #[test]
    fn empty_listing_yields_empty_map() {
        assert!(parse_remote_listing("").is_empty());
    }

    #[test]
    fn github_only_listing_yields_empty_map() {
        let listing = "origin\tgit@github.com:someone/sample.git (fetch)\n\
                       origin\tgit@github.com:someone/sample.git (push)\n";
        assert!(parse_remote_listing(listing).is_empty());
    }

    #[test]
    fn discover_reads_remotes_from_repo() {
        let env = TestEnv::new();
        let repo = env.create_repo("discover-repo");
        env.add_remote(&repo, "staging", "git@heroku.com:discover-staging.git");
        env.add_remote(&repo, "origin", "git@github.com:someone/discover.git");

        let apps = discover(&repo).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps.get("staging"), Some(&"discover-staging".to_string()));
    }

    #[test]
    fn discover_fails_outside_a_repo() {
        let env = TestEnv::new();
        let dir = env.create_dir("not-a-repo");
        assert!(discover(&dir).is_err());
    }
}
