//! Context resolution: raw line + cursor → structured completion context.
//!
//! The resolver scans complete, whitespace-bounded tokens left to right
//! against the catalog's command set. A token still being typed never
//! matches, so `"docker ru"` stays in the root context while `"exec "`
//! resolves to the `exec` command with an empty word in progress.

use super::Catalog;

/// The resolved state of the cursor: which command/subcommand the line is
/// in, the word being typed, and whether that word looks like a flag.
/// Built fresh for every edit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    pub command: Option<String>,
    pub subcommand: Option<String>,
    /// The substring typed since the last separator, up to the cursor.
    pub word: String,
    pub line: String,
    /// The word in progress starts with `-`, so flag suggestions apply even
    /// though a command is already resolved.
    pub flag_position: bool,
    /// Complete tokens already typed after the command (the in-progress word
    /// does not count). Gates sources that only apply to the first argument.
    pub trailing_args: usize,
}

impl CompletionContext {
    pub fn is_root(&self) -> bool {
        self.command.is_none()
    }
}

/// Resolves contexts against a catalog. Remembers the last command it
/// recognized so a blank argument slot keeps completing for that command
/// across edit events.
#[derive(Debug, Default)]
pub struct ContextResolver {
    last_command: Option<String>,
}

impl ContextResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent command this resolver recognized, if any.
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// Resolve the context for `line` with the cursor at byte offset `pos`.
    /// Never fails: a line with no recognized keyword is the root context.
    pub fn resolve(&mut self, catalog: &Catalog, line: &str, pos: usize) -> CompletionContext {
        let pos = pos.min(line.len());
        let before_cursor = &line[..pos];

        // Whitespace may be multi-byte; advance by the separator's width so
        // the slice below stays on a char boundary.
        let word_start = before_cursor
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let word = before_cursor[word_start..].to_string();

        // Only tokens followed by a separator participate in keyword matching.
        let complete: Vec<&str> = before_cursor[..word_start].split_whitespace().collect();

        let mut command = None;
        let mut subcommand = None;
        let mut trailing_args = 0;

        for token in &complete {
            match &command {
                None => {
                    // First qualifying keyword wins, reading left to right.
                    if catalog.is_command(token) {
                        command = Some(token.to_string());
                    }
                }
                Some(cmd) => {
                    if subcommand.is_none()
                        && trailing_args == 0
                        && catalog.is_subcommand(cmd, token)
                    {
                        subcommand = Some(token.to_string());
                    } else {
                        trailing_args += 1;
                    }
                }
            }
        }

        if let Some(cmd) = &command {
            self.last_command = Some(cmd.clone());
        }

        let flag_position = word.starts_with('-');
        CompletionContext {
            command,
            subcommand,
            word,
            line: line.to_string(),
            flag_position,
            trailing_args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::load().unwrap()
    }

    fn resolve(line: &str) -> CompletionContext {
        let catalog = catalog();
        ContextResolver::new().resolve(&catalog, line, line.len())
    }

    #[test]
    fn no_keyword_is_root_context() {
        for line in ["", "docker", "docker ru", "foo bar baz", "   "] {
            let ctx = resolve(line);
            assert!(ctx.is_root(), "expected root context for {line:?}");
        }
    }

    #[test]
    fn partial_word_never_matches_a_command() {
        let ctx = resolve("docker ru");
        assert!(ctx.command.is_none());
        assert_eq!(ctx.word, "ru");
    }

    #[test]
    fn trailing_space_keeps_the_command() {
        let ctx = resolve("exec ");
        assert_eq!(ctx.command.as_deref(), Some("exec"));
        assert_eq!(ctx.word, "");
    }

    #[test]
    fn leading_unknown_token_is_skipped() {
        let ctx = resolve("docker exec ");
        assert_eq!(ctx.command.as_deref(), Some("exec"));
    }

    #[test]
    fn embedded_keyword_does_not_match() {
        let ctx = resolve("execute ");
        assert!(ctx.command.is_none());
    }

    #[test]
    fn first_keyword_wins_left_to_right() {
        let ctx = resolve("stop start ");
        assert_eq!(ctx.command.as_deref(), Some("stop"));
        assert_eq!(ctx.trailing_args, 1);
    }

    #[test]
    fn subcommand_from_command_vocabulary() {
        let ctx = resolve("service create ");
        assert_eq!(ctx.command.as_deref(), Some("service"));
        assert_eq!(ctx.subcommand.as_deref(), Some("create"));
        assert_eq!(ctx.trailing_args, 0);
    }

    #[test]
    fn foreign_subcommand_counts_as_argument() {
        // "deploy" belongs to stack, not service
        let ctx = resolve("service deploy ");
        assert_eq!(ctx.command.as_deref(), Some("service"));
        assert!(ctx.subcommand.is_none());
        assert_eq!(ctx.trailing_args, 1);
    }

    #[test]
    fn flag_word_sets_the_hint() {
        let ctx = resolve("run --na");
        assert_eq!(ctx.command.as_deref(), Some("run"));
        assert_eq!(ctx.word, "--na");
        assert!(ctx.flag_position);
    }

    #[test]
    fn trailing_args_counted_after_command() {
        let ctx = resolve("pull nginx extra ");
        assert_eq!(ctx.command.as_deref(), Some("pull"));
        assert_eq!(ctx.trailing_args, 2);

        let ctx = resolve("pull ngin");
        assert_eq!(ctx.trailing_args, 0);
        assert_eq!(ctx.word, "ngin");
    }

    #[test]
    fn multibyte_separator_keeps_char_boundaries() {
        let ctx = resolve("exec\u{3000}ab");
        assert_eq!(ctx.command.as_deref(), Some("exec"));
        assert_eq!(ctx.word, "ab");

        let ctx = resolve("pull\u{a0}nginx");
        assert_eq!(ctx.command.as_deref(), Some("pull"));
        assert_eq!(ctx.word, "nginx");
    }

    #[test]
    fn cursor_mid_line_ignores_the_rest() {
        let catalog = catalog();
        let mut resolver = ContextResolver::new();
        let line = "exec abc";
        let ctx = resolver.resolve(&catalog, line, 2);
        assert!(ctx.is_root());
        assert_eq!(ctx.word, "ex");
    }

    #[test]
    fn resolver_remembers_last_command() {
        let catalog = catalog();
        let mut resolver = ContextResolver::new();
        resolver.resolve(&catalog, "exec ", 5);
        assert_eq!(resolver.last_command(), Some("exec"));
        resolver.resolve(&catalog, "nonsense", 8);
        assert_eq!(resolver.last_command(), Some("exec"));
    }
}
