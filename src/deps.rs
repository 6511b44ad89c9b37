use std::process::{Command, Stdio};

/// An external tool we need on PATH, probed by running a harmless version
/// command through the shell.
pub struct ToolCheck {
    pub name: &'static str,
    pub probe: &'static str,
}

/// Tools that must be present before scaffolding can start.
pub fn required_tools() -> &'static [ToolCheck] {
    &[
        ToolCheck {
            name: "pip",
            probe: "pip -V",
        },
        ToolCheck {
            name: "virtualenv",
            probe: "virtualenv --version",
        },
        ToolCheck {
            name: "git",
            probe: "git --version",
        },
    ]
}

#[derive(Debug)]
pub struct DependencyReport {
    pub dependencies_met: bool,
    pub missing: Vec<String>,
}

/// Probe each tool in order. Probe output is discarded; only the exit
/// status matters. A probe that cannot be spawned counts as missing.
pub fn check_dependencies(tools: &[ToolCheck], debug: bool) -> DependencyReport {
    let mut missing = Vec::new();
    for tool in tools {
        if debug {
            eprintln!("[debug] checking dependency: {}", tool.name);
        }
        if !tool_present(tool.probe) {
            missing.push(tool.name.to_string());
        }
    }

    DependencyReport {
        dependencies_met: missing.is_empty(),
        missing,
    }
}

fn tool_present(probe: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(probe)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
