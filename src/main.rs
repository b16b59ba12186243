use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use anilist_markdown::config::{self, Config};
use anilist_markdown::editing::{Selection, TextBuffer};
use anilist_markdown::logging;
use anilist_markdown::markdown::{attach, parse};
use anilist_markdown::shortcuts::{
    DispatchContext, EditSurface, KeyEvent, MarkdownHotkeys, TextSurface,
};
use anilist_markdown::storage::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "anilist-md")]
#[command(about = "AniList markdown hotkeys and renderer", long_about = None)]
struct Args {
    /// Config file (default: <config dir>/anilist-markdown/config.json)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show info and debug logs on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render markdown to sanitized HTML
    Render {
        /// Markdown file (default: stdin)
        file: Option<PathBuf>,
        /// Reveal every spoiler and activate every video
        #[arg(long)]
        expand: bool,
    },
    /// Run a named command on a text selection and print the edited text
    Apply {
        /// Command description, e.g. Bold or "Code Block"
        description: String,
        #[command(flatten)]
        input: EditInput,
    },
    /// Press a hotkey on a text selection and print the edited text
    Press {
        /// Chord to press, e.g. ctrl+b
        chord: String,
        #[command(flatten)]
        input: EditInput,
    },
    /// Show or change hotkey bindings
    Keys {
        #[command(subcommand)]
        action: Option<KeysAction>,
    },
}

#[derive(clap::Args, Debug)]
struct EditInput {
    /// Selection start, in characters
    #[arg(long, default_value_t = 0)]
    start: usize,
    /// Selection end, in characters (default: end of text)
    #[arg(long)]
    end: Option<usize>,
    /// Visible selection as the browser reports it, used by the link command
    #[arg(long, value_name = "TEXT")]
    selected_text: Option<String>,
    /// Text file (default: stdin)
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum KeysAction {
    /// List every command with its chord
    List,
    /// Bind a command to a chord; an empty chord disables it
    Set { description: String, chord: String },
    /// Restore the built-in bindings
    Reset,
    /// Report chords bound to more than one command
    Conflicts,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = logging::init(args.verbose);

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path);

    match args.command {
        Commands::Render { file, expand } => render(file.as_deref(), expand),
        Commands::Apply { description, input } => apply(&config, &description, input),
        Commands::Press { chord, input } => press(&config, &chord, input),
        Commands::Keys { action } => keys(&config, action.unwrap_or(KeysAction::List)),
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn open_hotkeys(config: &Config) -> MarkdownHotkeys<JsonFileStore> {
    let mut hotkeys = MarkdownHotkeys::load(JsonFileStore::new(config.resolved_storage_path()));
    hotkeys.set_enabled(config.hotkeys_enabled);
    hotkeys
}

fn render(file: Option<&Path>, expand: bool) -> Result<()> {
    let source = read_input(file)?;
    let started = Instant::now();

    let mut content = attach(&parse(&source));
    if expand {
        for id in 0..content.widgets().len() {
            content.click(id);
        }
    }
    let html = content.html();

    logging::log_render(
        source.chars().count(),
        html.chars().count(),
        content.widgets().len(),
        started.elapsed().as_micros(),
    );
    println!("{html}");
    Ok(())
}

/// What runs on the input text.
enum Trigger<'a> {
    /// A command by description, regardless of its chord.
    Command(&'a str),
    /// Whatever the chord is bound to.
    Chord(&'a str),
}

fn apply(config: &Config, description: &str, input: EditInput) -> Result<()> {
    let hotkeys = open_hotkeys(config);
    edit(config, &hotkeys, Trigger::Command(description), input)
}

fn press(config: &Config, chord: &str, input: EditInput) -> Result<()> {
    let hotkeys = open_hotkeys(config);
    edit(config, &hotkeys, Trigger::Chord(chord), input)
}

/// Run `trigger` on the input text and print the resulting buffer.
fn edit(
    config: &Config,
    hotkeys: &MarkdownHotkeys<JsonFileStore>,
    trigger: Trigger<'_>,
    input: EditInput,
) -> Result<()> {
    let text = read_input(input.file.as_deref())?;
    let end = input.end.unwrap_or_else(|| text.chars().count());
    let buffer = TextBuffer::new(text, Selection::new(input.start, end));
    let context = DispatchContext {
        selected_plain_text: input
            .selected_text
            .unwrap_or_else(|| buffer.selected_text().to_string()),
        image_width: config.image_width,
    };
    let mut surface = TextSurface::text_area(buffer);

    let (command, chord, handled) = match trigger {
        Trigger::Command(description) => {
            let handled = hotkeys.run_command(description, &mut surface, &context)?;
            let chord = hotkeys
                .config()
                .by_description(description)
                .map(|mapping| mapping.key.clone())
                .unwrap_or_default();
            (description.to_string(), chord, handled)
        }
        Trigger::Chord(chord) => {
            let event =
                KeyEvent::from_chord(chord).with_context(|| format!("Invalid chord '{chord}'"))?;
            let command = hotkeys
                .dispatcher()
                .command_for(&event)
                .unwrap_or_default()
                .to_string();
            let handled = hotkeys.dispatch(&event, &mut surface, &context);
            (command, chord.to_string(), handled)
        }
    };

    logging::log_hotkey_event(&command, &chord, handled);
    if !handled {
        if !config.hotkeys_enabled {
            warn!("Hotkeys are disabled in config");
        } else if chord.is_empty() {
            bail!("Command '{command}' has no chord bound");
        } else {
            warn!(chord = %chord, "No command bound to chord");
        }
    }

    let result = surface.buffer();
    let output = serde_json::json!({
        "handled": handled,
        "command": command,
        "text": result.text(),
        "selection": result.selection(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn keys(config: &Config, action: KeysAction) -> Result<()> {
    let mut hotkeys = open_hotkeys(config);

    match action {
        KeysAction::List => {
            for row in hotkeys.rows() {
                let chord = if row.display.is_empty() {
                    "(disabled)".to_string()
                } else {
                    row.display
                };
                let marker = if row.customized { " *" } else { "" };
                println!("{:<16} {}{}", row.description, chord, marker);
            }
        }
        KeysAction::Set { description, chord } => {
            hotkeys
                .set_key(&description, &chord)
                .with_context(|| format!("Failed to bind '{description}'"))?;
            println!("{description} -> {}", if chord.is_empty() { "(disabled)" } else { &chord });
        }
        KeysAction::Reset => {
            hotkeys.reset().context("Failed to reset hotkeys")?;
            println!("Hotkeys restored to defaults");
        }
        KeysAction::Conflicts => {
            let conflicts = hotkeys.config().find_conflicts();
            if conflicts.is_empty() {
                println!("No conflicts");
            }
            for conflict in &conflicts {
                println!(
                    "{}: '{}' runs, '{}' is shadowed",
                    conflict.chord, conflict.winner, conflict.loser
                );
            }
            if !conflicts.is_empty() {
                bail!("{} conflicting binding(s)", conflicts.len());
            }
        }
    }
    Ok(())
}
