use anyhow::Result;

use crate::registry::CommandContext;
use crate::shell;

fn venv(ctx: &CommandContext, cmd: &str) -> Result<()> {
    shell::venv(&ctx.config.project.virtualenv_dir, cmd)
}

pub fn cmd_migrate(ctx: &CommandContext, _args: &[String]) -> Result<()> {
    venv(ctx, "python manage.py migrate")
}

pub fn cmd_collect_static(ctx: &CommandContext, _args: &[String]) -> Result<()> {
    venv(ctx, "python manage.py collectstatic --noinput")
}

pub fn cmd_serve(ctx: &CommandContext, args: &[String]) -> Result<()> {
    cmd_migrate(ctx, args)?;
    cmd_collect_static(ctx, args)?;
    venv(ctx, "python manage.py runserver 0.0.0.0:8000")
}

pub fn cmd_web(ctx: &CommandContext, args: &[String]) -> Result<()> {
    cmd_migrate(ctx, args)?;
    cmd_collect_static(ctx, args)?;
    venv(ctx, "foreman start web")
}

pub fn cmd_worker(ctx: &CommandContext, _args: &[String]) -> Result<()> {
    venv(ctx, "python manage.py celery worker")
}

pub fn cmd_test(ctx: &CommandContext, _args: &[String]) -> Result<()> {
    venv(ctx, "python manage.py test")
}

pub fn cmd_lint(ctx: &CommandContext, _args: &[String]) -> Result<()> {
    venv(ctx, "flake8 project")
}
