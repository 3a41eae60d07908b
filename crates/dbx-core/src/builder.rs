//! Wheel builds for a bundle directory.
//!
//! The default build runs `python -m build --wheel` with the first interpreter
//! found on `PATH` (python3 > python). Previous `build/`, `dist/` and
//! `*.egg-info` outputs are removed first so `dist/` holds exactly the wheel
//! this build produced. Not safe to run twice concurrently on one directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{DbxError, Result};
use crate::paths::{BUILD_DIR, DIST_DIR};

const INTERPRETERS: &[&str] = &["python3", "python"];
const STDERR_TAIL_LINES: usize = 20;

/// Program plus arguments run inside the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl BuildCommand {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `python -m build --wheel` using the first interpreter on `PATH`.
    pub fn python_wheel() -> Result<Self> {
        let interpreter = INTERPRETERS
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| DbxError::BuildToolMissing {
                tried: INTERPRETERS.iter().map(|s| s.to_string()).collect(),
            })?;
        Ok(Self::new(interpreter, ["-m", "build", "--wheel"]))
    }

    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct ArtifactBuilder {
    command: BuildCommand,
}

impl ArtifactBuilder {
    pub fn new(command: BuildCommand) -> Self {
        Self { command }
    }

    pub fn detect() -> Result<Self> {
        Ok(Self::new(BuildCommand::python_wheel()?))
    }

    /// Clean, build, and return the path of the produced wheel.
    pub fn build(&self, project_dir: &Path) -> Result<PathBuf> {
        for removed in clean_outputs(project_dir)? {
            tracing::debug!(path = %removed.display(), "removed previous build output");
        }

        let shown = self.command.display();
        tracing::info!(command = %shown, dir = %project_dir.display(), "building wheel");

        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(stdout = %stdout, "build output");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "signal".to_string(),
            };
            return Err(DbxError::Build {
                command: shown,
                status,
                stderr: tail_lines(&stderr, STDERR_TAIL_LINES),
            });
        }

        let wheel = find_wheel(&project_dir.join(DIST_DIR))?;
        tracing::info!(wheel = %wheel.display(), "wheel built");
        Ok(wheel)
    }
}

/// Remove `build/`, `dist/` and any top-level `*.egg-info` directory.
/// Returns what was removed.
pub fn clean_outputs(project_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for name in [BUILD_DIR, DIST_DIR] {
        let dir = project_dir.join(name);
        if dir.is_dir() {
            std::fs::remove_dir_all(&dir)?;
            removed.push(dir);
        }
    }
    for entry in std::fs::read_dir(project_dir)? {
        let path = entry?.path();
        let is_egg_info = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".egg-info"));
        if is_egg_info && path.is_dir() {
            std::fs::remove_dir_all(&path)?;
            removed.push(path);
        }
    }
    Ok(removed)
}

/// The single `.whl` in `dist_dir`. With several, the last in name order wins.
pub fn find_wheel(dist_dir: &Path) -> Result<PathBuf> {
    if !dist_dir.is_dir() {
        return Err(DbxError::ArtifactNotFound(dist_dir.to_path_buf()));
    }
    let mut wheels: Vec<PathBuf> = std::fs::read_dir(dist_dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "whl"))
        .collect();
    wheels.sort();

    if wheels.len() > 1 {
        tracing::warn!(count = wheels.len(), dir = %dist_dir.display(), "several wheels found, using the last");
    }
    wheels
        .pop()
        .ok_or_else(|| DbxError::ArtifactNotFound(dist_dir.to_path_buf()))
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
