//! Git command builder
//!
//! Produces argument vectors with standard git CLI semantics. Nothing here
//! spawns a process; execution belongs to the [`CommandRunner`].
//!
//! [`CommandRunner`]: super::runner::CommandRunner

use std::fmt;
use std::path::{Path, PathBuf};

/// A single git invocation: the working directory and the arguments after `git`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    dir: PathBuf,
    args: Vec<String>,
}

impl GitCommand {
    fn new<I, S>(dir: &Path, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: dir.to_path_buf(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Quoted form used in logs and by test doubles, e.g. `git "fetch" "origin"`
    pub fn printable(&self) -> String {
        let mut out = String::from("git");
        for arg in &self.args {
            out.push_str(&format!(" \"{arg}\""));
        }
        out
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.printable())
    }
}

/// Builder for git commands operating on one working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Git {
    dir: PathBuf,
}

impl Git {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn command<I, S>(&self, args: I) -> GitCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GitCommand::new(&self.dir, args)
    }

    pub fn init(&self) -> GitCommand {
        self.command(["init"])
    }

    pub fn remote_add(&self, name: &str, url: &str) -> GitCommand {
        self.command(["remote", "add", name, url])
    }

    pub fn remote_list(&self) -> GitCommand {
        self.command(["remote", "-v"])
    }

    pub fn fetch(&self, opts: &[String]) -> GitCommand {
        self.command(std::iter::once("fetch".to_string()).chain(opts.iter().cloned()))
    }

    pub fn checkout(&self, arg: &str) -> GitCommand {
        self.command(["checkout", arg])
    }

    pub fn merge(&self, arg: &str) -> GitCommand {
        self.command(["merge", arg])
    }

    pub fn reset(&self, mode: &str, commit: &str) -> GitCommand {
        self.command(["reset", mode, commit])
    }

    pub fn clean(&self, opts: &[&str]) -> GitCommand {
        self.command(std::iter::once("clean").chain(opts.iter().copied()))
    }

    pub fn apply(&self, patch: &Path) -> GitCommand {
        self.command(["apply".to_string(), patch.display().to_string()])
    }

    /// Run `inner` in every submodule: `git submodule foreach git <inner args>`
    pub fn submodule_foreach(&self, inner: &GitCommand) -> GitCommand {
        self.command(
            ["submodule", "foreach", "git"]
                .into_iter()
                .map(String::from)
                .chain(inner.args().iter().cloned()),
        )
    }

    pub fn submodule_update(&self, opts: &[String]) -> GitCommand {
        self.command(
            ["submodule", "update", "--init", "--recursive"]
                .into_iter()
                .map(String::from)
                .chain(opts.iter().cloned()),
        )
    }

    pub fn branch(&self, opts: &[&str]) -> GitCommand {
        self.command(std::iter::once("branch").chain(opts.iter().copied()))
    }

    /// `git log -1 --format=<format> [<rev>]`
    pub fn log(&self, format: &str, rev: Option<&str>) -> GitCommand {
        let mut args = vec![
            "log".to_string(),
            "-1".to_string(),
            format!("--format={format}"),
        ];
        if let Some(rev) = rev {
            args.push(rev.to_string());
        }
        self.command(args)
    }

    pub fn rev_list(&self, commit: &str, opts: &[&str]) -> GitCommand {
        self.command(["rev-list", commit].into_iter().chain(opts.iter().copied()))
    }

    pub fn sparse_checkout_init(&self, cone: bool) -> GitCommand {
        let mut args = vec!["sparse-checkout", "init"];
        if cone {
            args.push("--cone");
        }
        self.command(args)
    }

    pub fn sparse_checkout_set(&self, dirs: &[String]) -> GitCommand {
        self.command(
            ["sparse-checkout", "set"]
                .into_iter()
                .map(String::from)
                .chain(dirs.iter().cloned()),
        )
    }

    /// `git config [<scope>] <key> <value>`
    pub fn config(&self, key: &str, value: &str, scope: Option<&str>) -> GitCommand {
        let mut args = vec!["config"];
        if let Some(scope) = scope {
            args.push(scope);
        }
        args.extend([key, value]);
        self.command(args)
    }
}
