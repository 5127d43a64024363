//! Command-line front end for the topic engine.
//!
//! Subcommands print JSON on stdout so scripts and indexers can consume them.
//!
//! Configuration:
//! - `--config` / `TOPICTREE_CONFIG`: JSON config file (see `EngineConfig`)
//! - `--db` / `TOPICTREE_DB`: SQLite file; overrides `database_path`
//! - `--log-level` / `TOPICTREE_LOG`: overrides `logging.level`

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use topictree_core::{
    core_version, init_logging, open_db, open_db_in_memory, AncestryResolver, EngineConfig,
    EntityTopicLinker, FacetProjector, HierarchyImporter, NewTopic, PathFormatter,
    SqliteTopicStore, SubjectHeadingParser, TagKind, TagListQuery, TopicLevel, TopicListQuery,
    TopicService, TreeAssembler,
};
use uuid::Uuid;

/// Topic hierarchy and subject-heading engine
#[derive(Parser)]
#[command(name = "topictree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON configuration file
    #[arg(long, env = "TOPICTREE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = "TOPICTREE_DB", global = true)]
    db: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "TOPICTREE_LOG", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse subject headings such as `A--B--C, D--E` for an entity
    Parse(ParseArgs),

    /// Import a nested `{title, children}` taxonomy from a JSON file
    Import(ImportArgs),

    /// Link an entity to a topic
    Link(PairArgs),

    /// Remove the link between an entity and a topic
    Unlink(PairArgs),

    /// Remove every link of an entity
    UnlinkAll(EntityArgs),

    /// Print formatted topic paths of an entity
    Paths(EntityArgs),

    /// Print the topic forest of an entity
    Tree(EntityArgs),

    /// Print flat tags linked to an entity
    Tags(EntityArgs),

    /// Print search facets of an entity
    Facets(EntityArgs),

    /// Print the root-first ancestor chain of a topic
    Ancestors(AncestorsArgs),

    /// Create one topic; parentless topics without `--level` become generic tags
    CreateTopic(TopicDraftArgs),

    /// Replace name, parent, level and type of a topic
    UpdateTopic(UpdateTopicArgs),

    /// Soft-delete a topic
    DeleteTopic(TopicArgs),

    /// List hierarchical topics ordered by level
    ListTopics(ListTopicsArgs),

    /// List one page of parentless flat tags
    ListTags(ListTagsArgs),

    /// Create one flat tag per name
    ImportTags(ImportTagsArgs),

    /// List the type labels in use, ordered by level
    TopicTypes,

    /// Print the engine version
    Version,
}

#[derive(Args)]
struct ParseArgs {
    entity: Uuid,
    headings: String,
}

#[derive(Args)]
struct ImportArgs {
    /// Payload file; full-width punctuation and `<EOL>` markers are tolerated
    file: PathBuf,
}

#[derive(Args)]
struct PairArgs {
    entity: Uuid,
    topic: Uuid,
}

#[derive(Args)]
struct EntityArgs {
    entity: Uuid,
}

#[derive(Args)]
struct AncestorsArgs {
    topic: Uuid,

    /// Also report why a walk stopped early
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Args)]
struct TopicArgs {
    topic: Uuid,
}

#[derive(Args)]
struct TopicDraftArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    parent: Option<Uuid>,

    /// Raw level code: 0-99 for hierarchy depth, 100-103 for tag categories
    #[arg(long)]
    level: Option<i64>,

    #[arg(long = "type")]
    type_label: Option<String>,
}

impl TopicDraftArgs {
    fn into_draft(self) -> Result<NewTopic> {
        Ok(NewTopic {
            name: self.name,
            parent_id: self.parent,
            level: self.level.map(TopicLevel::from_raw).transpose()?,
            type_label: self.type_label,
        })
    }
}

#[derive(Args)]
struct UpdateTopicArgs {
    topic: Uuid,

    #[command(flatten)]
    draft: TopicDraftArgs,
}

#[derive(Args)]
struct ListTopicsArgs {
    /// Substring of the topic name
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    level: Option<i64>,

    #[arg(long)]
    parent: Option<Uuid>,
}

#[derive(Args)]
struct ListTagsArgs {
    /// Substring of the tag name
    #[arg(long)]
    name: Option<String>,

    /// Tag category code (100-103)
    #[arg(long)]
    kind: Option<i64>,

    #[arg(long)]
    limit: Option<u32>,

    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Oldest first
    #[arg(long)]
    asc: bool,
}

#[derive(Args)]
struct ImportTagsArgs {
    /// Tag category code (100-103)
    #[arg(long, default_value_t = 100)]
    level: i64,

    #[arg(required = true)]
    names: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        return print_json(&serde_json::json!({ "version": core_version() }));
    }

    let mut config = match cli.config.as_deref() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = Some(level);
    }
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }
    init_logging(&config.logging).map_err(anyhow::Error::msg)?;

    let conn = open_connection(&config)?;
    let store = SqliteTopicStore::try_new(&conn).context("database is not ready")?;
    let max_depth = config.max_ancestry_depth;

    match cli.command {
        Commands::Parse(args) => {
            let parser = SubjectHeadingParser::with_root(store, config.root_topic_id);
            let report = parser.parse_with_report(args.entity, &args.headings)?;
            print_json(&serde_json::json!({
                "changed": report.is_some(),
                "report": report,
            }))
        }
        Commands::Import(args) => {
            let raw = std::fs::read_to_string(&args.file)
                .with_context(|| format!("failed to read `{}`", args.file.display()))?;
            let root_id = HierarchyImporter::new(store).import_json(&raw)?;
            print_json(&serde_json::json!({ "rootId": root_id }))
        }
        Commands::Link(args) => {
            let link_id = EntityTopicLinker::new(store).add_link(args.entity, args.topic)?;
            print_json(&serde_json::json!({ "linkId": link_id }))
        }
        Commands::Unlink(args) => {
            let removed = EntityTopicLinker::new(store).remove_link(args.entity, args.topic)?;
            print_json(&serde_json::json!({ "removed": removed }))
        }
        Commands::UnlinkAll(args) => {
            let removed = EntityTopicLinker::new(store).remove_all_links(args.entity)?;
            print_json(&serde_json::json!({ "removed": removed }))
        }
        Commands::Paths(args) => print_json(
            &PathFormatter::with_max_depth(store, max_depth).get_entity_topic_paths(args.entity)?,
        ),
        Commands::Tree(args) => print_json(
            &TreeAssembler::with_max_depth(store, max_depth).get_entity_topic_tree(args.entity)?,
        ),
        Commands::Tags(args) => {
            print_json(&EntityTopicLinker::new(store).get_tags_for_entity(args.entity)?)
        }
        Commands::Facets(args) => {
            print_json(&FacetProjector::with_max_depth(store, max_depth).project(args.entity)?)
        }
        Commands::Ancestors(args) => {
            let walk = AncestryResolver::with_max_depth(store, max_depth).walk(args.topic)?;
            if args.diagnostics {
                print_json(&serde_json::json!({
                    "nodes": walk.nodes,
                    "issue": walk.issue.map(|issue| format!("{issue:?}")),
                }))
            } else {
                print_json(&walk.nodes)
            }
        }
        Commands::CreateTopic(args) => {
            let service = TopicService::new(store).with_root_topic(config.root_topic_id);
            print_json(&service.create_topic(args.into_draft()?)?)
        }
        Commands::UpdateTopic(args) => {
            let service = TopicService::new(store).with_root_topic(config.root_topic_id);
            print_json(&service.update_topic(args.topic, args.draft.into_draft()?)?)
        }
        Commands::DeleteTopic(args) => {
            let service = TopicService::new(store).with_root_topic(config.root_topic_id);
            let deleted = service.delete_topic(args.topic)?;
            print_json(&serde_json::json!({ "deleted": deleted }))
        }
        Commands::ListTopics(args) => {
            let query = TopicListQuery {
                name_contains: args.name,
                level: args.level.map(TopicLevel::from_raw).transpose()?,
                parent_id: args.parent,
            };
            print_json(&TopicService::new(store).list_topics(&query)?)
        }
        Commands::ListTags(args) => {
            let query = TagListQuery {
                name_contains: args.name,
                kind: args.kind.map(TagKind::from_raw).transpose()?,
                limit: args.limit,
                offset: args.offset,
                ascending: args.asc,
            };
            print_json(&TopicService::new(store).list_tags(&query)?)
        }
        Commands::ImportTags(args) => {
            let kind = TagKind::from_raw(args.level)?;
            let imported = TopicService::new(store).import_tags(&args.names, kind)?;
            print_json(&serde_json::json!({ "imported": imported }))
        }
        Commands::TopicTypes => print_json(&TopicService::new(store).list_topic_types()?),
        Commands::Version => Ok(()),
    }
}

fn open_connection(config: &EngineConfig) -> Result<Connection> {
    match config.database_path.as_deref() {
        Some(path) => {
            open_db(path).with_context(|| format!("failed to open `{}`", path.display()))
        }
        None => {
            warn!("event=db_open module=cli status=skip reason=no_database_path fallback=memory");
            open_db_in_memory().context("failed to open in-memory database")
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
