//! Interactive shell surface: reedline editor and the REPL loop.

mod editor;
mod repl;

pub use editor::{create_editor, DockerHighlighter, DockerPrompt, PipelineCompleter};
pub use repl::{print_banner, Repl, ShellAction};
