//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgMatches, CommandFactory};
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::HierarchySession;
use crate::application::ApplicationError;
use crate::cli::args::{select_ops, Cli, Commands, ConfigCommands, SelectOp};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{DomainTree, MatchMode, SearchQuery};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::{RenderOptions, TreeNodeConvert};

/// Execute the parsed command line.
///
/// `matches` are the raw matches `cli` was built from; `select` reads flag order from them.
pub fn execute_command(cli: &Cli, matches: &ArgMatches) -> CliResult<()> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?;
    let settings = Settings::load(Some(&cwd))?;

    match &cli.command {
        Some(Commands::Tree { counts }) => cmd_tree(cli, settings, *counts),
        Some(Commands::Search {
            query,
            regex,
            case_sensitive,
        }) => {
            let mut q = settings.query(query.as_str());
            if *regex {
                q.mode = MatchMode::Regex;
            }
            q.case_sensitive |= *case_sensitive;
            cmd_search(cli, settings, &q)
        }
        Some(Commands::Select { ids, .. }) => cmd_select(cli, settings, &select_ops(matches), *ids),
        Some(Commands::Flatten) => cmd_flatten(cli, settings),
        Some(Commands::Check) => cmd_check(cli, settings),
        Some(Commands::Permissions { require }) => cmd_permissions(cli, settings, require.as_deref()),
        Some(Commands::Config { command }) => cmd_config(command, &settings, &cwd),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

/// Resolve the listing file from `--file` or the configured `source_file`.
fn listing_path(cli: &Cli, settings: &Settings) -> CliResult<PathBuf> {
    cli.file
        .clone()
        .or_else(|| settings.source_file.clone())
        .ok_or_else(|| CliError::Usage("no listing file: pass --file or set source_file".to_string()))
}

fn container(cli: &Cli, settings: Settings) -> CliResult<(ServiceContainer, PathBuf)> {
    let path = listing_path(cli, &settings)?;
    debug!("listing: {}", path.display());
    Ok((ServiceContainer::new(settings, path.clone()), path))
}

/// Open a session, turning unreadable listings into parse errors.
fn open_session(cli: &Cli, container: &ServiceContainer, path: &Path) -> CliResult<HierarchySession> {
    let mut session = container.hierarchy_session();
    match session.open(cli.scope.as_deref()) {
        Ok(report) => {
            if !report.orphans.is_empty() {
                output::warning(&format!(
                    "{} orphaned item(s) left out, run `glosstree check` for details",
                    report.orphans.len()
                ));
            }
        }
        Err(ApplicationError::Fetch { source, .. }) if source.kind() == io::ErrorKind::InvalidData => {
            return Err(InfraError::Parse {
                path: path.to_path_buf(),
                message: source.to_string(),
            }
            .into());
        }
        Err(ApplicationError::Fetch { context, source }) if source.kind() == io::ErrorKind::NotFound => {
            return Err(InfraError::io(context, source).into());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(session)
}

fn print_forest(tree: &DomainTree, opts: &RenderOptions<'_>) {
    if tree.is_empty() {
        output::warning("hierarchy is empty");
        return;
    }
    for rendered in tree.to_tree_strings(opts) {
        output::info(&rendered.to_string().trim_end());
    }
}

/// `Finance / Billing / Invoice` style breadcrumb for `id`.
fn breadcrumb(tree: &DomainTree, id: &str) -> String {
    let mut names: Vec<&str> = tree
        .ancestor_ids(id)
        .into_iter()
        .rev()
        .filter_map(|aid| tree.node_by_id(aid))
        .map(|n| n.item.name.as_str())
        .collect();
    if let Some(node) = tree.node_by_id(id) {
        names.push(&node.item.name);
    }
    names.join(" / ")
}

#[instrument(skip_all)]
fn cmd_tree(cli: &Cli, settings: Settings, counts: bool) -> CliResult<()> {
    let mut display = settings.display.clone();
    display.show_child_count |= counts;
    let (container, path) = container(cli, settings)?;
    let session = open_session(cli, &container, &path)?;
    let opts = RenderOptions {
        display: Some(&display),
        ..RenderOptions::default()
    };
    print_forest(session.tree()?, &opts);
    Ok(())
}

#[instrument(skip_all, fields(query = %query.text))]
fn cmd_search(cli: &Cli, settings: Settings, query: &SearchQuery) -> CliResult<()> {
    let display = settings.display.clone();
    let (container, path) = container(cli, settings)?;
    let mut session = open_session(cli, &container, &path)?;
    let outcome = session.search(query)?;

    let tree = session.tree()?;
    if outcome.is_empty() {
        output::warning(&format!("no matches for '{}'", query.text));
        return Ok(());
    }

    output::header(&format!("{} match(es)", outcome.matches.len()));
    for item in outcome.match_items(tree) {
        output::detail(&format!("{}  [{}]", breadcrumb(tree, &item.id), item.id));
    }
    output::info("");

    let matcher = query.matcher()?;
    let opts = RenderOptions {
        display: Some(&display),
        expansion: Some(session.expansion()),
        matcher: Some(&matcher),
        ..RenderOptions::default()
    };
    print_forest(tree, &opts);
    Ok(())
}

#[instrument(skip_all)]
fn cmd_select(cli: &Cli, settings: Settings, ops: &[SelectOp], ids_only: bool) -> CliResult<()> {
    if ops.is_empty() {
        return Err(CliError::InvalidArgs(
            "give at least one --check or --uncheck".to_string(),
        ));
    }
    let display = settings.display.clone();
    let (container, path) = container(cli, settings)?;
    let mut session = open_session(cli, &container, &path)?;

    for op in ops {
        let change = match op {
            SelectOp::Check(id) => session.check(id)?,
            SelectOp::Uncheck(id) => session.uncheck(id)?,
        };
        debug!("{op:?}: +{} -{}", change.added.len(), change.removed.len());
    }

    if ids_only {
        for item in session.selected_items()? {
            output::info(&item.id);
        }
        return Ok(());
    }

    let opts = RenderOptions {
        display: Some(&display),
        selection: Some(session.selection()),
        ..RenderOptions::default()
    };
    print_forest(session.tree()?, &opts);
    output::action("Selected", &format!("{} item(s)", session.selection().len()));
    Ok(())
}

#[instrument(skip_all)]
fn cmd_flatten(cli: &Cli, settings: Settings) -> CliResult<()> {
    let (container, path) = container(cli, settings)?;
    let session = open_session(cli, &container, &path)?;
    let items = session.tree()?.to_items();
    let json = serde_json::to_string_pretty(&items)
        .map_err(|e| InfraError::io("serialize items", e.into()))?;
    output::info(&json);
    Ok(())
}

#[instrument(skip_all)]
fn cmd_check(cli: &Cli, settings: Settings) -> CliResult<()> {
    let (container, path) = container(cli, settings)?;
    let session = open_session(cli, &container, &path)?;
    let tree = session.tree()?;
    let report = session.report()?;

    output::header(&format!("{}: {} node(s), depth {}", path.display(), tree.len(), tree.depth()));
    if report.is_clean() {
        output::success("hierarchy is consistent");
        return Ok(());
    }

    if !report.orphans.is_empty() {
        output::failure(&format!("orphans: {}", report.orphans.iter().join(", ")));
    }
    if !report.duplicates.is_empty() {
        output::failure(&format!("duplicates: {}", report.duplicates.iter().join(", ")));
    }
    for w in &report.containment_warnings {
        output::warning(&format!(
            "{} '{}' contains {} '{}'",
            w.parent_type.label(),
            w.parent_id,
            w.child_type.label(),
            w.child_id
        ));
    }

    if report.orphans.is_empty() && report.duplicates.is_empty() {
        Ok(())
    } else {
        Err(CliError::Validation(format!(
            "{} orphan(s), {} duplicate(s)",
            report.orphans.len(),
            report.duplicates.len()
        )))
    }
}

#[instrument(skip_all)]
fn cmd_permissions(cli: &Cli, settings: Settings, require: Option<&str>) -> CliResult<()> {
    let (container, _) = container(cli, settings)?;
    let mut store = container.permission_store();
    store.init()?;

    if let Some(code) = require {
        return if store.has(code)? {
            output::success(code);
            Ok(())
        } else {
            Err(CliError::Denied(code.to_string()))
        };
    }
    for code in store.codes()? {
        output::info(code);
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, settings: &Settings, cwd: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("global", &p.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("local", &local_config_path(cwd).display());
        }
    }
    Ok(())
}
