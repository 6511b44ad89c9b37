/// The built-in command table. Handlers live in the submodules; the first
/// line of each help text doubles as the usage summary shown by `--help`.
mod deploy;
mod dev;
mod setup;

pub use deploy::*;
pub use dev::*;
pub use setup::*;

use anyhow::{bail, Result};

use crate::registry::{Command, CommandContext, Registry};

const HELP_HELP: &str = "\
help <command>

Shows the full help text for a command.";

const HEROKU_SETUP_HELP: &str = "\
heroku_setup

One-time setup with everything you need on heroku. Creates a production
app (remote: production) and a matching staging app (remote: staging)
and does the following:

    - Initialize a local git repository.
    - Create new Heroku applications and set them up as git remotes.
    - Install all configured addons.
    - Set all configured config vars.
    - Create a pipeline from staging to production.

https://devcenter.heroku.com/articles/multiple-environments

NOTE: the production app will have ENVIRONMENT_TYPE=production while
staging will have ENVIRONMENT_TYPE=staging if the code needs to know
which environment it is running in (for example, so staging can use a
non-production db follower)";

const MIGRATE_HELP: &str = "\
migrate

Runs any pending migrations by calling `python manage.py migrate`";

const COLLECT_STATIC_HELP: &str = "\
collect_static

Collects all the static assets for your apps by calling
`python manage.py collectstatic --noinput`";

const SERVE_HELP: &str = "\
serve

Runs any pending migrations, collects static assets, then runs the
local development server by calling `python manage.py runserver`";

const WEB_HELP: &str = "\
web

Same as serve, but runs the web process using foreman instead of the
django development server directly. Can sometimes simulate the
production environment better than the debug server. You'll probably
need to install some of the production requirements.";

const WORKER_HELP: &str = "\
worker

Runs a celery worker to process background tasks your application
creates.";

const TEST_HELP: &str = "\
test

Runs your tests using the django test runner.";

const LINT_HELP: &str = "\
lint

Runs flake8 on everything inside the project folder.";

const DEPLOY_HELP: &str = "\
deploy <staging|production>

Deploys the current local master branch to the target remote (default:
staging) by calling `git push REMOTE master`, then migrates and
collects static on the deployed app.";

const PROMOTE_HELP: &str = "\
promote

Promotes the currently deployed staging environment to production by
calling `heroku pipeline:promote`. Deploy to staging, check that
everything works as expected, then promote to move that exact slug to
the production environment.";

pub fn builtin() -> Result<Registry> {
    let mut registry = Registry::new();
    let table = [
        Command::new("help", HELP_HELP, cmd_help),
        Command::new("heroku_setup", HEROKU_SETUP_HELP, cmd_heroku_setup),
        Command::new("migrate", MIGRATE_HELP, cmd_migrate),
        Command::new("collect_static", COLLECT_STATIC_HELP, cmd_collect_static),
        Command::new("serve", SERVE_HELP, cmd_serve),
        Command::new("web", WEB_HELP, cmd_web),
        Command::new("worker", WORKER_HELP, cmd_worker),
        Command::new("test", TEST_HELP, cmd_test),
        Command::new("lint", LINT_HELP, cmd_lint),
        Command::new("deploy", DEPLOY_HELP, cmd_deploy),
        Command::new("promote", PROMOTE_HELP, cmd_promote),
    ];
    for command in table {
        registry.register(command)?;
    }
    Ok(registry)
}

pub fn usage_text(registry: &Registry) -> String {
    let mut text = String::from(
        "Usage:\n  djeroku <command> [<args>...]\n  djeroku help <command>\n  djeroku -h | --help\n\nCommands:\n",
    );
    for (name, summary) in registry.list_commands() {
        if summary.is_empty() {
            text.push_str(&format!("  {}\n", name));
        } else {
            text.push_str(&format!("  {}\n", summary));
        }
    }
    text.push_str(
        "\nOptions:\n  -h --help            show this help message and exit\n\nSee 'djeroku help <command>' for more information on a specific command.\n",
    );
    text
}

pub fn cmd_help(ctx: &CommandContext, args: &[String]) -> Result<()> {
    let name = match args.first().map(String::as_str) {
        None | Some("help") => {
            bail!("Help Error - Specify a command name for more information")
        }
        Some(name) => name,
    };

    println!("{}", ctx.registry.describe(name)?);
    Ok(())
}
