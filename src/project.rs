use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::{self, Config};
use crate::deps;
use crate::shell;

// --- Name validation ---

fn project_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();

    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z]+[a-zA-Z0-9_-]*$").unwrap())
}

/// Project names become directory names, python module paths, and Heroku
/// app name defaults, so the rules are strict: a letter first, then
/// letters, digits, `-` or `_`.
pub fn validate_name(name: &str) -> Result<()> {
    if !project_name_pattern().is_match(name) {
        bail!(
            "invalid project name {:?} - aborting\n  hint: start with a letter, then letters, digits, - or _",
            name
        );
    }
    Ok(())
}

// --- Plan ---

#[derive(Debug)]
pub struct ProjectPlan {
    pub name: String,
    pub project_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub create_venv: bool,
    pub temp_dir: PathBuf,
    /// Snapshot written to `djeroku.toml`, with the project name filled in.
    pub config: Config,
}

/// First `_djeroku_temp_project_<n>` under `parent` that does not exist
/// yet, counting from 1.
fn next_temp_dir(parent: &Path) -> PathBuf {
    let mut count = 1;
    loop {
        let candidate = parent.join(format!("_djeroku_temp_project_{}", count));
        if !candidate.exists() {
            return candidate;
        }
        count += 1;
    }
}

/// Work out everything the scaffold will touch. Does not require the
/// destination to be absent: running against a half-built project reuses
/// its virtualenv instead of recreating it.
pub fn plan_project(parent: &Path, name: &str, config: &Config) -> Result<ProjectPlan> {
    validate_name(name)?;

    let project_dir = parent.join(name);
    let venv_dir = project_dir.join(&config.project.virtualenv_dir);
    let create_venv = !venv_dir.exists();
    let temp_dir = next_temp_dir(parent);

    let mut config = config.clone();
    config.project.name = Some(name.to_string());

    Ok(ProjectPlan {
        name: name.to_string(),
        project_dir,
        venv_dir,
        create_venv,
        temp_dir,
        config,
    })
}

// --- Steps ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldStep {
    /// Progress line, shown on verbose runs.
    Note(&'static str),
    Shell(String),
    CreateDir(PathBuf),
    MoveContents { from: PathBuf, to: PathBuf },
    RemoveDir(PathBuf),
    WriteConfig(PathBuf),
}

/// The full scaffold as data, in execution order. All paths are absolute
/// so the steps do not care about the process working directory.
pub fn scaffold_steps(plan: &ProjectPlan) -> Vec<ScaffoldStep> {
    let venv = plan.venv_dir.display().to_string();
    let project = plan.project_dir.display().to_string();

    let mut steps = vec![
        ScaffoldStep::Note("creating project folder"),
        ScaffoldStep::CreateDir(plan.project_dir.clone()),
    ];

    if plan.create_venv {
        steps.push(ScaffoldStep::Note("creating virtual environment"));
        steps.push(ScaffoldStep::Shell(format!(
            "virtualenv {}",
            shell::quote(&venv)
        )));
    } else {
        steps.push(ScaffoldStep::Note("existing virtual environment found"));
    }

    // Paths and the version spec go through shell::quote: the parent
    // directory may carry spaces, and the pin carries `>` and `<`.
    steps.push(ScaffoldStep::Note("installing django"));
    steps.push(ScaffoldStep::Shell(shell::venv_line(
        &venv,
        &format!(
            "pip install {}",
            shell::quote(&plan.config.project.django_version)
        ),
    )));

    steps.push(ScaffoldStep::Note("creating temporary project filestructure"));
    steps.push(ScaffoldStep::CreateDir(plan.temp_dir.clone()));
    steps.push(ScaffoldStep::Shell(shell::venv_line(
        &venv,
        &format!(
            "django-admin startproject --template={} --extension=py,html {} {}",
            shell::quote(&plan.config.project.template_path),
            plan.name,
            shell::quote(&plan.temp_dir.display().to_string())
        ),
    )));
    steps.push(ScaffoldStep::MoveContents {
        from: plan.temp_dir.clone(),
        to: plan.project_dir.clone(),
    });
    steps.push(ScaffoldStep::RemoveDir(plan.temp_dir.clone()));

    steps.push(ScaffoldStep::Note("installing djeroku dependencies"));
    steps.push(ScaffoldStep::Shell(shell::venv_line(
        &venv,
        &format!(
            "pip install -r {}",
            shell::quote(&format!("{}/reqs/dev.txt", project))
        ),
    )));

    steps.push(ScaffoldStep::Note("running django setup commands"));
    for cmd in ["makemigrations", "migrate", "collectstatic --noinput"] {
        steps.push(ScaffoldStep::Shell(shell::venv_line(
            &venv,
            &format!("python {} {}", shell::quote(&format!("{}/manage.py", project)), cmd),
        )));
    }

    steps.push(ScaffoldStep::WriteConfig(config::project_config_path(
        &plan.project_dir,
    )));

    steps
}

fn move_contents(from: &Path, to: &Path) -> Result<()> {
    for entry in
        std::fs::read_dir(from).with_context(|| format!("failed to read {}", from.display()))?
    {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        std::fs::rename(entry.path(), &dest).with_context(|| {
            format!(
                "failed to move {} into {}",
                entry.path().display(),
                to.display()
            )
        })?;
    }
    Ok(())
}

pub fn execute_plan(plan: &ProjectPlan, debug: bool) -> Result<()> {
    for step in scaffold_steps(plan) {
        match step {
            ScaffoldStep::Note(msg) => {
                if debug {
                    eprintln!("[debug] {}", msg);
                }
            }
            ScaffoldStep::Shell(line) => shell::run_checked(&line)?,
            ScaffoldStep::CreateDir(dir) => {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            ScaffoldStep::MoveContents { from, to } => move_contents(&from, &to)?,
            ScaffoldStep::RemoveDir(dir) => {
                std::fs::remove_dir(&dir)
                    .with_context(|| format!("failed to remove temp dir {}", dir.display()))?;
            }
            ScaffoldStep::WriteConfig(path) => {
                config::write_config_atomic(&path, &plan.config, false)?;
            }
        }
    }

    println!(
        "{}",
        welcome_message(&plan.name, &plan.config.project.virtualenv_dir)
    );
    Ok(())
}

/// Pre-flight plus scaffold. Local checks run before tool probes so a bad
/// name or a taken directory fails fast on machines without the tools.
pub fn create_project(parent: &Path, name: &str, config: &Config, debug: bool) -> Result<()> {
    validate_name(name)?;

    let project_dir = parent.join(name);
    if project_dir.exists() {
        bail!(
            "project folder {} already exists - aborting install\n  hint: pick another name or remove the existing folder",
            project_dir.display()
        );
    }

    let report = deps::check_dependencies(deps::required_tools(), debug);
    if !report.dependencies_met {
        for missing in &report.missing {
            eprintln!("error: missing required dependency `{}`", missing);
        }
        bail!("dependencies not met - aborting project creation");
    }

    let plan = plan_project(parent, name, config)?;
    execute_plan(&plan, debug)
}

fn welcome_message(name: &str, venv_dir: &str) -> String {
    format!(
        r#"
{name} project created successfully!

Thanks for using djeroku! You now have an empty django project skeleton in
{name}/ ready for you to use. There is a new djeroku.toml in your project
folder holding the provisioning defaults the helper commands read.

Next Steps:
    # Change to your project directory and activate your virtual env:
    cd {name}
    source {venv_dir}/bin/activate

    # Run the one-time setup command to create your heroku apps:
    djeroku heroku_setup

    # Create a new app inside the project/apps folder:
    mkdir project/apps/newappname
    django-admin.py startapp newappname project/apps/newappname

    # Run the dev server to view your project in your browser (localhost:8000)
    djeroku serve

    # Check out the other djeroku helper commands
    djeroku --help

Remember, while developing, make sure you activate your virtualenvironment
first or you will get errors about django or other libraries not being found
(djeroku does this for you automatically).

When you add new libraries to your project, be sure to add them to
reqs/common.txt so heroku correctly includes them in your builds.

Please file any issues at https://github.com/djeroku/djeroku.

Happy coding!"#
    )
}
