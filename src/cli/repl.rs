//! The interactive shell loop.
//!
//! Each iteration is an explicit state transition: read a line, classify it
//! into a `ShellAction`, act, render. The confirmed command runs as a
//! `docker` subprocess with inherited stdio and blocks the loop until it
//! exits.

use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use reedline::{Reedline, Signal};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::completion::{Catalog, CompletionPipeline};

use super::editor::{create_editor, DockerPrompt, PipelineCompleter};

/// What one submitted line asks the shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    Empty,
    Exit,
    ClearScreen,
    Run(Vec<String>),
}

impl ShellAction {
    /// Classify a submitted line. Everything that is not a shell builtin
    /// becomes arguments to the `docker` binary.
    pub fn parse(line: &str) -> Self {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        match tokens.first().map(String::as_str) {
            None => ShellAction::Empty,
            Some("exit") | Some("quit") => ShellAction::Exit,
            Some("clear") => ShellAction::ClearScreen,
            Some(_) => ShellAction::Run(tokens),
        }
    }
}

/// The interactive shell: editor, prompt, and the docker binary to exec.
pub struct Repl {
    editor: Reedline,
    prompt: DockerPrompt,
    binary: PathBuf,
}

impl Repl {
    pub fn new(
        pipeline: Arc<CompletionPipeline>,
        catalog: Arc<Catalog>,
        runtime: Handle,
        binary: PathBuf,
        engine_version: &str,
    ) -> Self {
        let completer = PipelineCompleter::new(pipeline, runtime);
        Self {
            editor: create_editor(completer, catalog),
            prompt: DockerPrompt::new(engine_version),
            binary,
        }
    }

    /// Run the loop until the user exits.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match self.editor.read_line(&self.prompt)? {
                Signal::Success(line) => match ShellAction::parse(&line) {
                    ShellAction::Empty => continue,
                    ShellAction::Exit => break,
                    ShellAction::ClearScreen => self.clear_screen()?,
                    ShellAction::Run(args) => self.run_docker(&args),
                },
                Signal::CtrlC => continue,
                Signal::CtrlD => break,
            }
        }
        info!("shell exiting");
        Ok(())
    }

    fn clear_screen(&self) -> anyhow::Result<()> {
        crossterm::execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    /// Execute the confirmed line. The subprocess owns the terminal until it
    /// exits; its failures are its own output, not shell errors.
    fn run_docker(&self, args: &[String]) {
        debug!(?args, "executing docker");
        match std::process::Command::new(&self.binary).args(args).status() {
            Ok(status) => {
                if !status.success() {
                    debug!(code = ?status.code(), "docker exited non-zero");
                }
            }
            Err(err) => {
                eprintln!("docker: {err}");
            }
        }
    }
}

/// Welcome banner, printed once before the first prompt.
pub fn print_banner(engine_version: &str) {
    println!();
    println!(
        "  \x1b[1;36mdockhand\x1b[0m \x1b[2mv{}\x1b[0m  \x1b[2m(engine {})\x1b[0m",
        env!("CARGO_PKG_VERSION"),
        engine_version
    );
    println!("  \x1b[2mTab completes commands, flags, containers, and images.\x1b[0m");
    println!("  \x1b[2mType \x1b[0m\x1b[1;36mexit\x1b[0m\x1b[2m to leave.\x1b[0m");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_empty_actions() {
        assert_eq!(ShellAction::parse(""), ShellAction::Empty);
        assert_eq!(ShellAction::parse("   "), ShellAction::Empty);
    }

    #[test]
    fn exit_and_quit_terminate() {
        assert_eq!(ShellAction::parse("exit"), ShellAction::Exit);
        assert_eq!(ShellAction::parse("quit"), ShellAction::Exit);
        assert_eq!(ShellAction::parse("  exit  "), ShellAction::Exit);
    }

    #[test]
    fn clear_is_a_builtin() {
        assert_eq!(ShellAction::parse("clear"), ShellAction::ClearScreen);
    }

    #[test]
    fn everything_else_runs_docker() {
        assert_eq!(
            ShellAction::parse("ps -a"),
            ShellAction::Run(vec!["ps".into(), "-a".into()])
        );
        assert_eq!(
            ShellAction::parse("run -it ubuntu bash"),
            ShellAction::Run(vec![
                "run".into(),
                "-it".into(),
                "ubuntu".into(),
                "bash".into()
            ])
        );
    }

    #[test]
    fn exit_is_only_a_builtin_in_first_position() {
        assert_eq!(
            ShellAction::parse("stop exit"),
            ShellAction::Run(vec!["stop".into(), "exit".into()])
        );
    }
}
