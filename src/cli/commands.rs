//! Command dispatch: one handler per subcommand

use std::io;
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{DomainError, NodeKind, OrderKey, Outline};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };

    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => _config(command, &project_dir),
        Some(command) => {
            let settings = Settings::load(Some(project_dir.as_path()))?;
            let outline = cli.file.clone().unwrap_or_else(|| settings.outline.clone());
            let container = ServiceContainer::new(settings)?;
            run(command, &container, &outline)
        }
        None => Ok(()),
    }
}

fn run(command: &Commands, container: &ServiceContainer, outline: &Path) -> CliResult<()> {
    match command {
        Commands::Key { before, after } => _key(container, before.as_deref(), after.as_deref()),
        Commands::Tree { keys } => _tree(container, outline, *keys),
        Commands::List { parent } => _list(container, outline, parent.as_deref()),
        Commands::Check => _check(container, outline),
        Commands::Add { name, kind, parent } => {
            _add(container, outline, name, *kind, parent.as_deref())
        }
        Commands::Move { id, before, after } => {
            _move(container, outline, id, before.as_deref(), after.as_deref())
        }
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

#[instrument(skip(container))]
fn _key(container: &ServiceContainer, before: Option<&str>, after: Option<&str>) -> CliResult<()> {
    let engine = container.engine();
    let parse = |s: &str| OrderKey::parse_with(s, engine.alphabet());
    let before = before.map(parse).transpose().map_err(app_err)?;
    let after = after.map(parse).transpose().map_err(app_err)?;

    let key = engine
        .generate(before.as_ref(), after.as_ref())
        .map_err(app_err)?;
    output::info(&key);
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, outline: &Path, keys: bool) -> CliResult<()> {
    let tree = container.outline_service().tree(outline)?;
    if tree.is_empty() {
        output::warning(&format!("{} has no nodes", outline.display()));
        return Ok(());
    }
    debug!(nodes = tree.len(), depth = tree.depth(), "outline loaded");
    let show_keys = keys || container.settings.display.show_keys;
    for root in tree.to_trees(show_keys) {
        output::info(root.to_string().trim_end());
    }
    let hidden = tree.len() - tree.iter().count();
    if hidden > 0 {
        output::warning(&format!("{hidden} node(s) not reachable from a root, run `kbtree check`"));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _list(container: &ServiceContainer, outline: &Path, parent: Option<&str>) -> CliResult<()> {
    let tree: Outline = container.outline_service().tree(outline)?;
    if let Some(pid) = parent {
        if tree.find(pid).is_none() {
            return Err(CliError::Usage(format!("unknown parent: {pid}")));
        }
    }
    let siblings = tree.siblings(parent);
    debug!("{} siblings", siblings.len());
    for node in siblings {
        output::info(&format!("{:<8} {:<36} {}", output::key(&node.order_key), node.id, node));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _check(container: &ServiceContainer, outline: &Path) -> CliResult<()> {
    let service = container.outline_service();
    let nodes = service.load(outline)?;
    let violations = service.check(&nodes);
    if violations.is_empty() {
        output::success(&format!("{}: {} nodes ok", outline.display(), nodes.len()));
        return Ok(());
    }
    output::header(&format!("{}:", outline.display()));
    for v in &violations {
        output::failure(v);
    }
    Err(CliError::CheckFailed(violations.len()))
}

#[instrument(skip(container))]
fn _add(
    container: &ServiceContainer,
    outline: &Path,
    name: &str,
    kind: NodeKind,
    parent: Option<&str>,
) -> CliResult<()> {
    let outline_service = container.outline_service();
    let mut nodes = outline_service.load_or_empty(outline)?;
    let node = container
        .ordering_service()
        .create(&mut nodes, kind, name, parent)?;
    outline_service.save(outline, &nodes)?;
    output::action("Created", &format!("{} {} [{}]", node, node.id, node.order_key));
    Ok(())
}

#[instrument(skip(container))]
fn _move(
    container: &ServiceContainer,
    outline: &Path,
    id: &str,
    before: Option<&str>,
    after: Option<&str>,
) -> CliResult<()> {
    let outline_service = container.outline_service();
    let mut nodes = outline_service.load(outline)?;
    let reordered = container
        .ordering_service()
        .reposition(&mut nodes, id, before, after)?;
    outline_service.save(outline, &nodes)?;

    output::action("Moved", &format!("{id} [{}]", reordered.new_order_key));
    for node in &reordered.items {
        output::detail(&format!("{:<8} {}", output::key(&node.order_key), node));
    }
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => {
            let local = local_config_path(project_dir);
            match global_config_path() {
                Some(global) => output::detail(&format!("global: {}", describe(&global))),
                None => output::detail("global: <no config directory>"),
            }
            output::detail(&format!("local:  {}", describe(&local)));
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no global config directory".to_string()))?
            } else {
                local_config_path(project_dir)
            };
            init_config(&path)?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}

fn describe(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

fn init_config(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::Usage(format!("{} already exists", path.display())));
    }
    RealFileSystem
        .write(path, &Settings::template())
        .map_err(|e| InfraError::io(path.display().to_string(), e))?;
    Ok(())
}

fn app_err(e: DomainError) -> CliError {
    ApplicationError::from(e).into()
}
