use anyhow::{bail, Context, Result};
use std::io::BufRead;
use std::process::{Command, Stdio};

/// Outcome of one captured external-process invocation.
#[derive(Debug)]
pub struct ShellResult {
    /// Exit code of the child, or None when it died to a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ShellResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

fn code_display(code: Option<i32>) -> String {
    code.map_or("signal".to_string(), |c| c.to_string())
}

/// Run a command line with stdout/stderr streaming straight to the terminal.
/// Returns the exit code. Err only when the shell itself cannot be spawned.
pub fn run(line: &str) -> Result<Option<i32>> {
    let status = shell_command(line)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to run `{}`", line))?;

    Ok(status.code())
}

/// Like [`run`], but a non-zero exit aborts the whole operation.
pub fn run_checked(line: &str) -> Result<()> {
    let code = run(line)?;
    if code != Some(0) {
        bail!("`{}` failed (exit code: {})", line, code_display(code));
    }
    Ok(())
}

/// Run a command line to completion, capturing both output streams.
pub fn run_captured(line: &str) -> Result<ShellResult> {
    let output = shell_command(line)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to run `{}`", line))?;

    Ok(ShellResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// One confirmable step in a chain of external commands.
///
/// Runs `line` captured and echoes its stdout. Returns `Ok(true)` only on a
/// clean exit; the operator is never prompted then. On a non-zero exit the
/// captured stderr is shown and `failure_prompt` is asked: answering yes
/// yields `Ok(false)` (the step failed, the chain goes on), answering no
/// yields an error that unwinds the whole chain so no later step runs.
pub fn continue_or_abort(line: &str, failure_prompt: &str) -> Result<bool> {
    continue_or_abort_from(line, failure_prompt, &mut std::io::stdin().lock())
}

pub fn continue_or_abort_from(
    line: &str,
    failure_prompt: &str,
    input: &mut dyn BufRead,
) -> Result<bool> {
    let result = run_captured(line)?;
    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }

    if result.success() {
        return Ok(true);
    }

    eprintln!("{}", result.stderr.trim_end());
    if !confirm_from(failure_prompt, input) {
        bail!("Stopped execution per user request.");
    }
    Ok(false)
}

/// Yes/no question on stdout; accepts `y`/`yes` in any case. EOF counts as no.
pub fn confirm_from(message: &str, input: &mut dyn BufRead) -> bool {
    println!("{}", message);
    println!("Y/N");

    let mut choice = String::new();
    if input.read_line(&mut choice).is_err() {
        return false;
    }
    matches!(choice.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Free-form question with an optional default taken on empty input.
pub fn prompt_from(message: &str, default: Option<&str>, input: &mut dyn BufRead) -> String {
    match default {
        Some(d) => println!("{} (default: {}):", message, d),
        None => println!("{}", message),
    }

    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        answer.clear();
    }
    let answer = answer.trim();
    if answer.is_empty() {
        return default.unwrap_or("").to_string();
    }
    answer.to_string()
}

pub fn prompt(message: &str, default: Option<&str>) -> String {
    prompt_from(message, default, &mut std::io::stdin().lock())
}

/// Quote one argument for interpolation into a `sh -c` line. Plain tokens
/// pass through untouched; anything carrying a shell metacharacter is
/// wrapped in single quotes, with embedded quotes rendered as `'\''`.
pub fn quote(arg: &str) -> String {
    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if arg.is_empty() {
        return "''".to_string();
    }
    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', "'\\''"))
}

/// Prefix a command line so it runs inside the project virtualenv.
pub fn venv_line(venv_dir: &str, cmd: &str) -> String {
    format!(". {} && {}", quote(&format!("{}/bin/activate", venv_dir)), cmd)
}

/// Run a command inside the virtualenv, streaming output; non-zero aborts.
pub fn venv(venv_dir: &str, cmd: &str) -> Result<()> {
    run_checked(&venv_line(venv_dir, cmd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn run_captured_collects_stdout() {
        let result = run_captured("echo hello").unwrap();
        assert!(result.success());
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "hello\n");
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn run_captured_collects_stderr_and_code() {
        let result = run_captured("echo boom >&2; exit 3").unwrap();
        assert!(!result.success());
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr, "boom\n");
    }

    #[test]
    fn run_returns_exit_code() {
        assert_eq!(run("exit 0").unwrap(), Some(0));
        assert_eq!(run("exit 7").unwrap(), Some(7));
    }

    #[test]
    fn run_checked_reports_command_and_code() {
        let err = run_checked("exit 2").unwrap_err().to_string();
        assert!(err.contains("exit 2"), "error should name the command: {}", err);
        assert!(err.contains("exit code: 2"), "error should carry the code: {}", err);
    }

    #[test]
    fn continue_or_abort_success_never_prompts() {
        // A declining answer is queued up; a clean exit must not consume it.
        let mut input = Cursor::new("n\n");
        let result = continue_or_abort_from("exit 0", "Continue anyway?", &mut input).unwrap();
        assert!(result);
    }

    #[test]
    fn continue_or_abort_failure_then_yes_returns_false() {
        let mut input = Cursor::new("y\n");
        let result = continue_or_abort_from("exit 1", "Continue anyway?", &mut input).unwrap();
        assert!(!result);
    }

    #[test]
    fn continue_or_abort_accepts_yes_in_any_case() {
        let mut input = Cursor::new("YES\n");
        let result = continue_or_abort_from("exit 1", "Continue anyway?", &mut input).unwrap();
        assert!(!result);
    }

    #[test]
    fn continue_or_abort_failure_then_no_aborts() {
        let mut input = Cursor::new("n\n");
        let err = continue_or_abort_from("exit 1", "Continue anyway?", &mut input).unwrap_err();
        assert!(err.to_string().contains("Stopped execution per user request."));
    }

    #[test]
    fn continue_or_abort_eof_counts_as_no() {
        let mut input = Cursor::new("");
        let result = continue_or_abort_from("exit 1", "Continue anyway?", &mut input);
        assert!(result.is_err());
    }

    #[test]
    fn confirm_rejects_anything_else() {
        let mut input = Cursor::new("maybe\n");
        assert!(!confirm_from("Sure?", &mut input));
    }

    #[test]
    fn prompt_empty_input_takes_default() {
        let mut input = Cursor::new("\n");
        let answer = prompt_from("App name?", Some("myapp"), &mut input);
        assert_eq!(answer, "myapp");
    }

    #[test]
    fn prompt_typed_answer_wins_over_default() {
        let mut input = Cursor::new("custom\n");
        let answer = prompt_from("App name?", Some("myapp"), &mut input);
        assert_eq!(answer, "custom");
    }

    #[test]
    fn prompt_without_default_returns_empty_on_eof() {
        let mut input = Cursor::new("");
        assert_eq!(prompt_from("App name?", None, &mut input), "");
    }

    #[test]
    fn quote_passes_plain_tokens_through() {
        assert_eq!(quote("venv"), "venv");
        assert_eq!(quote("/tmp/proj/venv"), "/tmp/proj/venv");
        assert_eq!(quote("https://example.com/a.zip"), "https://example.com/a.zip");
    }

    #[test]
    fn quote_wraps_spaces_and_metacharacters() {
        assert_eq!(quote("my projects/venv"), "'my projects/venv'");
        assert_eq!(quote("django>=1.9,<1.10"), "'django>=1.9,<1.10'");
    }

    #[test]
    fn quote_escapes_embedded_single_quotes() {
        assert_eq!(quote("it's here"), "'it'\\''s here'");
    }

    #[test]
    fn quote_keeps_empty_arguments_visible() {
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn quoted_spaced_argument_survives_the_shell_whole() {
        let result = run_captured(&format!("printf '%s\\n' {}", quote("one two"))).unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "one two\n");
    }

    #[test]
    fn venv_line_prefixes_activation() {
        assert_eq!(
            venv_line("venv", "python manage.py migrate"),
            ". venv/bin/activate && python manage.py migrate"
        );
    }

    #[test]
    fn venv_line_quotes_spaced_directories() {
        assert_eq!(
            venv_line("my env", "python manage.py migrate"),
            ". 'my env/bin/activate' && python manage.py migrate"
        );
    }
}
