use anyhow::Result;
use std::io::BufRead;
use std::path::Path;

use crate::config::{Config, HerokuConfig};
use crate::registry::CommandContext;
use crate::secret::generate_secret_key;
use crate::shell;

/// One provisioning action. `Run` must succeed; `Cont` asks the operator
/// whether to carry on after a failure; `ContChain` is a sequence where
/// each step only makes sense if the previous one actually worked, so a
/// tolerated failure skips the rest of the sub-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStep {
    Run(String),
    Cont { line: String, prompt: String },
    ContChain(Vec<(String, String)>),
}

fn cont(line: String, prompt: String) -> SetupStep {
    SetupStep::Cont { line, prompt }
}

/// The full provisioning sequence for a staging/production app pair.
pub fn setup_steps(
    app_name: &str,
    staging_name: &str,
    heroku: &HerokuConfig,
    secret_key: &str,
) -> Vec<SetupStep> {
    let addons = heroku.addons.join(",");

    let mut steps = vec![
        SetupStep::Run("git init".to_string()),
        cont(
            format!(
                "heroku apps:create {} --remote {} --addons {}",
                staging_name, heroku.staging_remote, addons
            ),
            "Failed to create the staging app on heroku. Continue anyway?".to_string(),
        ),
        cont(
            format!(
                "heroku apps:create {} --remote {} --addons {}",
                app_name, heroku.production_remote, addons
            ),
            "Failed to create the production app on heroku. Continue anyway?".to_string(),
        ),
    ];

    for (key, value) in &heroku.config_vars {
        let var = format!("{}={}", key, value);
        steps.push(cont(
            format!("heroku config:set {} --app={}", var, staging_name),
            format!("Failed to set {} on Staging. Continue anyway?", var),
        ));
        steps.push(cont(
            format!("heroku config:set {} --app={}", var, app_name),
            format!("Failed to set {} on Production. Continue anyway?", var),
        ));
    }

    steps.push(cont(
        format!("heroku config:set DEBUG=True --app={}", staging_name),
        "Failed to set DEBUG on Staging. Continue anyway?".to_string(),
    ));
    steps.push(cont(
        format!("heroku config:set DEBUG=False --app={}", app_name),
        "Failed to set DEBUG on Production. Continue anyway?".to_string(),
    ));

    steps.push(cont(
        format!(
            "heroku config:set ENVIRONMENT_TYPE=staging --app={}",
            staging_name
        ),
        "Failed to set ENVIRONMENT_TYPE on Staging. Continue anyway?".to_string(),
    ));
    steps.push(cont(
        format!(
            "heroku config:set ENVIRONMENT_TYPE=production --app={}",
            app_name
        ),
        "Failed to set ENVIRONMENT_TYPE on Production. Continue anyway?".to_string(),
    ));

    // Only production gets a secret key; staging runs with DEBUG anyway.
    steps.push(cont(
        format!(
            "heroku config:set SECRET_KEY=\"{}\" --app={}",
            secret_key, app_name
        ),
        "Failed to set SECRET_KEY on Production. Continue anyway?".to_string(),
    ));

    steps.push(SetupStep::ContChain(vec![
        (
            "heroku labs:enable pipelines".to_string(),
            "Failed to enable Pipelines. Continue anyway?".to_string(),
        ),
        (
            "heroku plugins:install git://github.com/heroku/heroku-pipeline.git".to_string(),
            "Failed to install pipelines plugin. Continue anyway?".to_string(),
        ),
        (
            format!("heroku pipeline:add -a {} {}", staging_name, app_name),
            "Failed to create pipeline from Staging to Production. Continue anyway?".to_string(),
        ),
    ]));

    steps.push(SetupStep::Run(
        format!("git config heroku.remote {}", heroku.staging_remote),
    ));
    steps.push(SetupStep::Run(format!(
        "heroku git:remote -r {} --app={}",
        heroku.staging_remote, staging_name
    )));
    steps.push(SetupStep::Run(format!(
        "heroku git:remote -r {} --app={}",
        heroku.production_remote, app_name
    )));

    steps
}

fn execute_steps(steps: &[SetupStep], input: &mut dyn BufRead) -> Result<()> {
    for step in steps {
        match step {
            SetupStep::Run(line) => shell::run_checked(line)?,
            SetupStep::Cont { line, prompt } => {
                shell::continue_or_abort_from(line, prompt, input)?;
            }
            SetupStep::ContChain(items) => {
                for (line, prompt) in items {
                    if !shell::continue_or_abort_from(line, prompt, input)? {
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Default Heroku app name: the configured project name, falling back to
/// the working directory's own name.
fn default_app_name(config: &Config, cwd: &Path) -> String {
    if let Some(name) = &config.project.name {
        return name.clone();
    }
    cwd.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn run_heroku_setup(ctx: &CommandContext, input: &mut dyn BufRead) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let default_name = default_app_name(ctx.config, &cwd);
    let app_name = shell::prompt_from(
        "What name should this heroku app use?",
        Some(&default_name),
        input,
    );
    let staging_name = format!("{}-staging", app_name);

    let secret_key = generate_secret_key();
    let steps = setup_steps(&app_name, &staging_name, &ctx.config.heroku, &secret_key);
    execute_steps(&steps, input)
}

pub fn cmd_heroku_setup(ctx: &CommandContext, _args: &[String]) -> Result<()> {
    run_heroku_setup(ctx, &mut std::io::stdin().lock())
}
