//! Suggestion sources: which lookups apply to a resolved context, and how
//! their raw results become suggestions.

use crate::engine::{PortHint, Resource, ResourceKind, SearchHit};

use super::{Catalog, CompletionContext, Suggestion};

/// A static catalog table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticTable {
    /// Top-level commands.
    Root,
    /// A command's subcommand vocabulary.
    Subcommands(String),
    /// A command's flags.
    Flags(String),
    /// A command's full table, subcommands then flags.
    CommandTable(String),
}

/// Where candidates for a context come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionSource {
    Static(StaticTable),
    LocalResource { kind: ResourceKind, all: bool },
    /// `-p` value hints built from local image metadata.
    ExposedPorts,
    RemoteSearch(String),
    RemoteCatalogDefault,
}

impl SuggestionSource {
    /// Cache key for I/O-backed remote sources. Static and local sources are
    /// never cached: the catalog is free and local listings must reflect
    /// live engine state.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            SuggestionSource::RemoteSearch(query) => Some(format!("search:{query}")),
            SuggestionSource::RemoteCatalogDefault => Some("catalog:default".to_string()),
            _ => None,
        }
    }
}

/// Commands whose first argument is a running container.
const RUNNING_CONTAINER_COMMANDS: &[&str] = &[
    "exec", "stop", "port", "attach", "logs", "kill", "restart", "pause", "unpause", "top",
];

/// Commands whose first argument may be a stopped container too.
const ANY_CONTAINER_COMMANDS: &[&str] = &["start", "rm"];

/// Decide which sources apply to `ctx`.
pub fn select_sources(ctx: &CompletionContext, catalog: &Catalog) -> Vec<SuggestionSource> {
    let Some(command) = ctx.command.as_deref() else {
        return vec![SuggestionSource::Static(StaticTable::Root)];
    };

    if ctx.flag_position {
        // The one flag whose value we can predict: -p from image metadata.
        if command == "run" && ctx.word == "-p" {
            return vec![SuggestionSource::ExposedPorts];
        }
        return vec![SuggestionSource::Static(StaticTable::Flags(
            command.to_string(),
        ))];
    }

    if RUNNING_CONTAINER_COMMANDS.contains(&command) {
        return vec![SuggestionSource::LocalResource {
            kind: ResourceKind::Containers,
            all: false,
        }];
    }
    if ANY_CONTAINER_COMMANDS.contains(&command) {
        return vec![SuggestionSource::LocalResource {
            kind: ResourceKind::Containers,
            all: true,
        }];
    }

    match command {
        "run" => vec![SuggestionSource::LocalResource {
            kind: ResourceKind::Images,
            all: true,
        }],
        "pull" => pull_sources(ctx),
        _ => {
            if ctx.subcommand.is_some() {
                vec![SuggestionSource::Static(StaticTable::Flags(
                    command.to_string(),
                ))]
            } else if !catalog.subcommands(command).is_empty() {
                vec![SuggestionSource::Static(StaticTable::Subcommands(
                    command.to_string(),
                ))]
            } else {
                vec![SuggestionSource::Static(StaticTable::CommandTable(
                    command.to_string(),
                ))]
            }
        }
    }
}

/// `pull` completes against the registry, with guards: a tag or digest means
/// the name is already chosen; a completed argument means the image slot is
/// filled; one or two typed characters are too little to search on.
fn pull_sources(ctx: &CompletionContext) -> Vec<SuggestionSource> {
    if ctx.word.contains(':') || ctx.word.contains('@') {
        return Vec::new();
    }
    if ctx.trailing_args >= 1 {
        return Vec::new();
    }
    if ctx.word.is_empty() {
        return vec![SuggestionSource::RemoteCatalogDefault];
    }
    if ctx.word.len() > 2 {
        return vec![SuggestionSource::RemoteSearch(ctx.word.clone())];
    }
    Vec::new()
}

/// Map search hits to suggestions the way the prompt renders them.
pub fn search_hits_to_suggestions(hits: Vec<SearchHit>) -> Vec<Suggestion> {
    hits.into_iter()
        .map(|hit| {
            let badge = if hit.official { "Official" } else { "Not Official" };
            Suggestion::new(hit.name, format!("({}) {}", badge, hit.description))
        })
        .collect()
}

pub fn resources_to_suggestions(resources: Vec<Resource>) -> Vec<Suggestion> {
    resources
        .into_iter()
        .map(|r| Suggestion::new(r.id, r.label))
        .collect()
}

pub fn ports_to_suggestions(hints: Vec<PortHint>) -> Vec<Suggestion> {
    hints
        .into_iter()
        .map(|h| {
            Suggestion::new(
                format!("-p {port}:{port}/{proto}", port = h.port, proto = h.proto),
                h.image,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::ContextResolver;

    fn sources_for(line: &str) -> Vec<SuggestionSource> {
        let catalog = Catalog::load().unwrap();
        let ctx = ContextResolver::new().resolve(&catalog, line, line.len());
        select_sources(&ctx, &catalog)
    }

    #[test]
    fn root_context_uses_the_root_table() {
        assert_eq!(
            sources_for("docker ru"),
            vec![SuggestionSource::Static(StaticTable::Root)]
        );
    }

    #[test]
    fn exec_lists_running_containers() {
        assert_eq!(
            sources_for("exec "),
            vec![SuggestionSource::LocalResource {
                kind: ResourceKind::Containers,
                all: false,
            }]
        );
    }

    #[test]
    fn start_lists_all_containers() {
        assert_eq!(
            sources_for("start "),
            vec![SuggestionSource::LocalResource {
                kind: ResourceKind::Containers,
                all: true,
            }]
        );
    }

    #[test]
    fn run_lists_local_images() {
        assert_eq!(
            sources_for("run "),
            vec![SuggestionSource::LocalResource {
                kind: ResourceKind::Images,
                all: true,
            }]
        );
    }

    #[test]
    fn run_dash_p_suggests_exposed_ports() {
        assert_eq!(sources_for("run -p"), vec![SuggestionSource::ExposedPorts]);
    }

    #[test]
    fn flag_word_selects_the_flag_table() {
        assert_eq!(
            sources_for("run --en"),
            vec![SuggestionSource::Static(StaticTable::Flags("run".into()))]
        );
    }

    #[test]
    fn pull_blank_word_uses_the_default_catalog() {
        assert_eq!(
            sources_for("pull "),
            vec![SuggestionSource::RemoteCatalogDefault]
        );
    }

    #[test]
    fn pull_searches_after_three_chars() {
        assert_eq!(
            sources_for("pull ngin"),
            vec![SuggestionSource::RemoteSearch("ngin".into())]
        );
        assert!(sources_for("pull ng").is_empty());
    }

    #[test]
    fn pull_with_tag_or_digest_is_silent() {
        assert!(sources_for("pull nginx:1.25").is_empty());
        assert!(sources_for("pull nginx@sha256").is_empty());
    }

    #[test]
    fn pull_with_completed_argument_is_silent() {
        assert!(sources_for("pull nginx extra").is_empty());
        assert!(sources_for("pull nginx ").is_empty());
    }

    #[test]
    fn service_offers_its_subcommands() {
        assert_eq!(
            sources_for("service "),
            vec![SuggestionSource::Static(StaticTable::Subcommands(
                "service".into()
            ))]
        );
        assert_eq!(
            sources_for("service create "),
            vec![SuggestionSource::Static(StaticTable::Flags("service".into()))]
        );
    }

    #[test]
    fn cache_keys_cover_remote_sources_only() {
        assert_eq!(
            SuggestionSource::RemoteSearch("ngin".into()).cache_key(),
            Some("search:ngin".to_string())
        );
        assert_eq!(
            SuggestionSource::RemoteCatalogDefault.cache_key(),
            Some("catalog:default".to_string())
        );
        assert_eq!(
            SuggestionSource::Static(StaticTable::Root).cache_key(),
            None
        );
    }

    #[test]
    fn search_hits_render_official_badges() {
        let hits = vec![
            SearchHit {
                name: "nginx".into(),
                official: true,
                description: "Official build of Nginx.".into(),
            },
            SearchHit {
                name: "bitnami/nginx".into(),
                official: false,
                description: "Bitnami nginx image".into(),
            },
        ];
        let suggestions = search_hits_to_suggestions(hits);
        assert_eq!(
            suggestions[0].description,
            "(Official) Official build of Nginx."
        );
        assert_eq!(
            suggestions[1].description,
            "(Not Official) Bitnami nginx image"
        );
    }

    #[test]
    fn ports_render_publish_syntax() {
        let hints = vec![PortHint {
            port: "80".into(),
            proto: "tcp".into(),
            image: "nginx:latest".into(),
        }];
        let suggestions = ports_to_suggestions(hints);
        assert_eq!(suggestions[0].text, "-p 80:80/tcp");
        assert_eq!(suggestions[0].description, "nginx:latest");
    }
}
