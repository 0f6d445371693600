//! dragoman: translation CLI
//!
//! One-shot translation, an interactive watch mode driven by stdin, and
//! maintenance of the persisted history, theme and cache.

use std::io::{self, BufRead, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dragoman::cache::CacheRegion;
use dragoman::{
    Config, Dragoman, InputEvent, LanguageCode, LanguageSlot, SessionOutput, Theme,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Dragoman translation CLI
#[derive(Parser)]
#[command(name = "dragoman")]
#[command(version = dragoman::PKG_VERSION)]
#[command(about = "Offline-tolerant translator")]
struct Args {
    /// Config file (default: ~/.dragoman/config.toml, then /etc/dragoman/config.toml)
    #[arg(short, long, env = "DRAGOMAN_CONFIG")]
    config: Option<PathBuf>,

    /// Treat the network as unreachable
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate text once
    Translate {
        /// Text to translate (or omit to read from stdin)
        text: Option<String>,
        /// Source language (default from config)
        #[arg(short, long)]
        from: Option<LanguageCode>,
        /// Target language (default from config)
        #[arg(short, long)]
        to: Option<LanguageCode>,
    },

    /// Translate as you type: every stdin line replaces the source text
    ///
    /// Lines starting with `:` are commands: `:swap`, `:now`, `:clear`,
    /// `:from <lang>`, `:to <lang>`, `:load <id>`.
    Watch {
        #[arg(short, long)]
        from: Option<LanguageCode>,
        #[arg(short, long)]
        to: Option<LanguageCode>,
    },

    /// Show or edit translation history
    History {
        /// Delete one entry
        #[arg(long, conflicts_with = "clear")]
        delete: Option<i64>,
        /// Delete every entry
        #[arg(long)]
        clear: bool,
    },

    /// Show, set or toggle the theme preference
    Theme {
        /// New theme ("light" or "dark")
        set: Option<Theme>,
        #[arg(long, conflicts_with = "set")]
        toggle: bool,
    },

    /// Show cache regions, or seed the static region
    Cache {
        /// URLs to fetch into the static region
        #[arg(long)]
        seed: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_deref())?;
    let translator = Dragoman::builder().config(config).build().await?;
    translator.connectivity().set_online(!args.offline);

    match args.command {
        Command::Translate { text, from, to } => {
            let text = resolve_text(text)?;
            let defaults = &translator.config().translation;
            let source = from.unwrap_or_else(|| defaults.source.clone());
            let target = to.unwrap_or_else(|| defaults.target.clone());
            match translator.translate(&text, &source, &target).await {
                Ok(result) => {
                    println!("{}", result.text);
                    eprintln!("via {}", result.provider_used);
                }
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    eprintln!("({e})");
                    std::process::exit(1);
                }
            }
        }

        Command::Watch { from, to } => {
            let mut session = translator.session();
            if let Some(lang) = from {
                session = translator.session_with(lang, session.target().clone());
            }
            if let Some(lang) = to {
                session = translator.session_with(session.source().clone(), lang);
            }
            watch(session).await;
        }

        Command::History { delete, clear } => {
            let history = translator.history();
            if clear {
                let removed = history.clear().await?;
                println!("removed {removed} entries");
            } else if let Some(id) = delete {
                if history.delete(id).await? {
                    println!("deleted {id}");
                } else {
                    println!("no entry {id}");
                }
            } else {
                let entries = history.entries().await?;
                if entries.is_empty() {
                    println!("history is empty");
                }
                for entry in entries {
                    println!(
                        "{}  {} → {}  {}",
                        entry.id,
                        entry.source_lang,
                        entry.target_lang,
                        entry.timestamp.format("%Y-%m-%d %H:%M")
                    );
                    println!("    {}", entry.source_text);
                    println!("    {}", entry.target_text);
                }
            }
        }

        Command::Theme { set, toggle } => {
            let preferences = translator.preferences();
            let theme = if toggle {
                preferences.toggle_theme().await?
            } else if let Some(theme) = set {
                preferences.set_theme(theme).await?;
                theme
            } else {
                preferences.theme().await?.unwrap_or_default()
            };
            println!("{theme}");
        }

        Command::Cache { seed } => {
            if !seed.is_empty() {
                let stored = translator.cache_urls(&seed).await;
                println!("cached {stored} of {} urls", seed.len());
            }
            let cache = translator.cache();
            for region in [CacheRegion::Static, CacheRegion::Api] {
                println!(
                    "{:<24} {:>6} entries",
                    cache.region_name(region),
                    cache.entry_count(region).await?
                );
            }
        }
    }

    Ok(())
}

/// Run a session over stdin lines, printing its outputs.
async fn watch(session: dragoman::Session) {
    let (event_tx, event_rx) = mpsc::channel(16);
    let (out_tx, mut out_rx) = mpsc::channel(16);

    // stdin is blocking; read it on its own thread
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let event = match parse_line(&line) {
                Ok(event) => event,
                Err(message) => {
                    eprintln!("{message}");
                    continue;
                }
            };
            if event_tx.blocking_send(event).is_err() {
                break;
            }
        }
    });

    let runner = tokio::spawn(session.run(ReceiverStream::new(event_rx), out_tx));
    while let Some(output) = out_rx.recv().await {
        match output {
            SessionOutput::Translated(result) => {
                println!("{}", result.text);
            }
            SessionOutput::Failed(e) => eprintln!("! {}", e.user_message()),
            SessionOutput::Cleared => eprintln!("(cleared)"),
            SessionOutput::Restored(entry) => {
                eprintln!("({} → {})", entry.source_lang, entry.target_lang);
                println!("{}", entry.target_text);
            }
            SessionOutput::State(state) => {
                if let dragoman::DispatchState::Translating { chars, .. } = state {
                    if chars > 1000 {
                        eprintln!("(translating {:.1}k characters…)", chars as f64 / 1000.0);
                    }
                }
            }
        }
    }
    let _ = runner.await;
}

fn parse_line(line: &str) -> Result<InputEvent, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(InputEvent::TextChanged {
            text: line.to_string(),
        });
    };
    let (name, arg) = command
        .split_once(' ')
        .map_or((command, ""), |(n, a)| (n, a.trim()));
    let lang = || arg.parse::<LanguageCode>().map_err(|e| e.to_string());
    match name {
        "swap" => Ok(InputEvent::SwapLanguages),
        "now" => Ok(InputEvent::TranslateNow),
        "clear" => Ok(InputEvent::Clear),
        "from" => Ok(InputEvent::LanguageChanged {
            slot: LanguageSlot::Source,
            lang: lang()?,
        }),
        "to" => Ok(InputEvent::LanguageChanged {
            slot: LanguageSlot::Target,
            lang: lang()?,
        }),
        "load" => arg
            .parse()
            .map(|id| InputEvent::LoadFromHistory { id })
            .map_err(|e| format!("bad history id {arg:?}: {e}")),
        other => Err(format!("unknown command :{other}")),
    }
}

/// Resolve text input from an optional CLI argument and/or stdin.
///
/// - arg only → arg
/// - stdin only → stdin
/// - both → `"{arg}\n\n{stdin}"`
/// - neither → error
fn resolve_text(arg: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    let stdin_text = if io::stdin().is_terminal() {
        None
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    match (arg, stdin_text) {
        (Some(a), Some(s)) => Ok(format!("{a}\n\n{s}")),
        (Some(a), None) => Ok(a),
        (None, Some(s)) => Ok(s),
        (None, None) => Err("translate: no input provided (pass text as argument or via stdin)".into()),
    }
}
