//! Command dispatch for the CLI

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::rc::Rc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::DocumentBuilder;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, OutputFormat, Settings};
use crate::infrastructure::ArenaTree;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see --help".to_string()));
    };

    match command {
        Commands::Build {
            file,
            format,
            max_depth,
        } => {
            let mut settings = Settings::load(cli.config.as_deref())?;
            if let Some(format) = format {
                settings.format = *format;
            }
            if let Some(max_depth) = max_depth {
                settings.max_depth = *max_depth;
            }
            cmd_build(file, &settings)
        }
        Commands::Check { file, max_depth } => {
            let mut settings = Settings::load(cli.config.as_deref())?;
            if let Some(max_depth) = max_depth {
                settings.max_depth = *max_depth;
            }
            cmd_check(file, &settings)
        }
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

#[instrument(skip(settings))]
fn cmd_build(file: &Path, settings: &Settings) -> CliResult<()> {
    let text = read_document(file)?;
    let rendered = render_document(&text, settings)?;
    output::info(&rendered);
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_check(file: &Path, settings: &Settings) -> CliResult<()> {
    let text = read_document(file)?;
    let tree = Rc::new(ArenaTree::new());
    let document = DocumentBuilder::from_json_str(tree, &text, settings.max_depth)?;
    output::success(&format!("{} is a valid document", file.display()));
    output::detail(&format!("root: {}", document.root().id()));
    output::detail(&format!("top-level groups: {}", document.roots().len()));
    output::detail(&format!("elements: {}", document.element_count()));
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&format!("{}\n", path.display())),
            None => return Err(CliError::Usage("no config directory on this platform".to_string())),
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

/// Read a document from `path`, or from stdin when `path` is `-`.
pub fn read_document(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| CliError::io("read stdin", e))?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|e| CliError::io(format!("read {}", path.display()), e))
}

/// Build `text` into a fresh UI tree and render every top-level group.
pub fn render_document(text: &str, settings: &Settings) -> CliResult<String> {
    let tree = Rc::new(ArenaTree::new());
    let document = DocumentBuilder::from_json_str(tree.clone(), text, settings.max_depth)?;
    debug!("rendering {} element(s) as {}", document.element_count(), settings.format);

    let mut out = String::new();
    for root in document.roots() {
        match settings.format {
            OutputFormat::Html => out.push_str(&tree.to_html(root.node(), settings.indent)),
            OutputFormat::Tree => {
                out.push_str(&tree.to_tree_string(root.node()).to_string());
            }
        }
    }
    Ok(out)
}
