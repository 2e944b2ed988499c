//! Reedline surface: prompt, highlighter, completer adapter, editor factory.
//!
//! Reedline's completion callback is synchronous; the adapter blocks on the
//! async pipeline through a runtime handle. The REPL thread is not a runtime
//! worker, so blocking here is safe.

use std::borrow::Cow;
use std::sync::Arc;

use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, Emacs, Highlighter, KeyCode, KeyModifiers, MenuBuilder, Prompt,
    PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, ReedlineEvent,
    ReedlineMenu, Span, StyledText,
};
use tokio::runtime::Handle;

use crate::completion::{Catalog, CompletionPipeline};

/// Shell prompt: the command prefix on the left, the engine version on the
/// right.
pub struct DockerPrompt {
    engine_version: String,
}

impl DockerPrompt {
    pub fn new(engine_version: &str) -> Self {
        Self {
            engine_version: engine_version.to_string(),
        }
    }
}

impl Prompt for DockerPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("\x1b[1;36m>>> docker\x1b[0m")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Owned(format!("\x1b[2mengine {}\x1b[0m", self.engine_version))
    }

    fn render_prompt_indicator(&self, _mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed(" ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(&self, hs: PromptHistorySearch) -> Cow<'_, str> {
        let prefix = match hs.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({}search: {}) ", prefix, hs.term))
    }
}

/// Colors the first recognized command token; unknown leading tokens render
/// yellow as a hint that no command has been resolved yet.
pub struct DockerHighlighter {
    catalog: Arc<Catalog>,
}

impl DockerHighlighter {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl Highlighter for DockerHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        let cmd_end = line.find(' ').unwrap_or(line.len());
        let cmd = &line[..cmd_end];

        if cmd.is_empty() {
            styled.push((Style::default(), line.to_string()));
            return styled;
        }

        if self.catalog.is_command(cmd) {
            styled.push((Style::new().fg(Color::Cyan).bold(), cmd.to_string()));
        } else {
            styled.push((Style::new().fg(Color::Yellow), cmd.to_string()));
        }
        if cmd_end < line.len() {
            styled.push((Style::default(), line[cmd_end..].to_string()));
        }
        styled
    }
}

/// Bridges reedline's synchronous `Completer` to the async pipeline.
pub struct PipelineCompleter {
    pipeline: Arc<CompletionPipeline>,
    runtime: Handle,
}

impl PipelineCompleter {
    pub fn new(pipeline: Arc<CompletionPipeline>, runtime: Handle) -> Self {
        Self { pipeline, runtime }
    }
}

impl Completer for PipelineCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<reedline::Suggestion> {
        if pos > line.len() {
            return Vec::new();
        }

        let suggestions = self.runtime.block_on(self.pipeline.complete(line, pos));

        // The suggestion replaces the word in progress. Whitespace may be
        // multi-byte, so the span start advances by the separator's width.
        let start = line[..pos]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        suggestions
            .into_iter()
            .map(|s| reedline::Suggestion {
                value: s.text,
                description: Some(s.description),
                extra: None,
                span: Span::new(start, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }
}

/// Create the editor with a Tab-triggered completion menu.
pub fn create_editor(completer: PipelineCompleter, catalog: Arc<Catalog>) -> Reedline {
    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("completion_menu")
            .with_columns(1)
            .with_column_padding(2)
            .with_text_style(Style::new().fg(Color::Default))
            .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Cyan))
            .with_description_text_style(Style::new().fg(Color::DarkGray)),
    );

    let mut keybindings = reedline::default_emacs_keybindings();

    // Tab to show/navigate the menu
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    // Shift+Tab to go back
    keybindings.add_binding(
        KeyModifiers::SHIFT,
        KeyCode::BackTab,
        ReedlineEvent::MenuPrevious,
    );

    Reedline::create()
        .with_completer(Box::new(completer))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_quick_completions(true)
        .with_partial_completions(true)
        .with_highlighter(Box::new(DockerHighlighter::new(catalog)))
        .with_edit_mode(Box::new(Emacs::new(keybindings)))
}
