mod logging;

use clap::Parser;
use clap_derive::Parser;
use config::{Settings, load_env_file};
use fanout_core::{ChatSession, DispatchCoordinator, DispatchReport};
use fanout_ext::RawFile;
use llm::{ChatModel, ProviderKind, Role};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(author, version, about = "Send one prompt to several chat providers at once", long_about = None)]
struct Args {
    /// Provider to send to (repeatable): openai, deepseek, gemini, claude
    #[arg(long = "provider", short = 'p')]
    providers: Vec<ProviderKind>,

    #[arg(long, env = "OPENAI_MODEL")]
    openai_model: Option<String>,

    #[arg(long, env = "CLAUDE_MODEL")]
    claude_model: Option<String>,

    #[arg(long, env = "GEMINI_MODEL")]
    gemini_model: Option<String>,

    #[arg(long, env = "DEEPSEEK_MODEL")]
    deepseek_model: Option<String>,

    /// File to attach to the first message (repeatable)
    #[arg(long = "file", short = 'f')]
    files: Vec<PathBuf>,

    /// Mirror logs to stderr
    #[arg(long, short)]
    tracing: bool,
}

impl Args {
    fn model_overrides(&self) -> Vec<(ProviderKind, &str)> {
        [
            (ProviderKind::OpenAI, &self.openai_model),
            (ProviderKind::Claude, &self.claude_model),
            (ProviderKind::Gemini, &self.gemini_model),
            (ProviderKind::DeepSeek, &self.deepseek_model),
        ]
        .into_iter()
        .filter_map(|(kind, model)| model.as_deref().map(|m| (kind, m)))
        .collect()
    }
}

struct AppState {
    session: ChatSession,
    selected: Vec<ProviderKind>,
    /// Settings as read from disk, without command-line overrides.
    saved: Settings,
}

fn dedup(providers: impl IntoIterator<Item = ProviderKind>) -> Vec<ProviderKind> {
    let mut out = Vec::new();
    for p in providers {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

/// Providers checked by default: those named in settings, or all of them.
fn default_selection(settings: &Settings) -> Vec<ProviderKind> {
    let named = settings.selected_providers.iter().filter_map(|name| {
        name.parse::<ProviderKind>()
            .inspect_err(|e| warn!(error = %e, "Ignoring provider in settings"))
            .ok()
    });
    let selected = dedup(named);
    if selected.is_empty() {
        ProviderKind::ALL.to_vec()
    } else {
        selected
    }
}

fn provider_list(providers: &[ProviderKind]) -> String {
    providers
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_status_bar(state: &AppState) {
    let terminal_width: usize = 80;
    let status = format!(
        " {} • {} attachment(s) ",
        provider_list(&state.selected),
        state.session.attachments().len()
    );
    let padding = terminal_width.saturating_sub(status.chars().count() + 2);
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;

    println!("┌{}┐", "─".repeat(terminal_width - 2));
    println!("│{}{}{}│", " ".repeat(left_pad), status, " ".repeat(right_pad));
    println!("└{}┘", "─".repeat(terminal_width - 2));
}

fn print_report(state: &AppState, report: &DispatchReport) {
    println!("── You ──");
    println!("{}", report.display_text);
    println!();

    for outcome in &report.outcomes {
        let model = state
            .session
            .coordinator()
            .model(outcome.provider)
            .map(|m| format!(" ({})", m.name()))
            .unwrap_or_default();
        let marker = if outcome.is_success() { "" } else { " ✗" };
        println!("── {}{}{} ──", outcome.provider, model, marker);
        println!("{}", outcome.message());
        println!();
    }
}

async fn attach_paths(state: &mut AppState, paths: &[PathBuf]) {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match RawFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => eprintln!("{}", e),
        }
    }
    if files.is_empty() {
        return;
    }

    match state.session.upload(files).await {
        Ok(outcome) => {
            for (name, error) in &outcome.rejected {
                eprintln!("Skipped {}: {}", name, error);
            }
            for attachment in state.session.attachments() {
                if outcome.accepted.contains(&attachment.id) {
                    println!(
                        "Attached {} ({})",
                        attachment.name,
                        attachment.display_size()
                    );
                }
            }
        }
        Err(e) => eprintln!("{}", e),
    }
}

// Slash command parsing and handling
mod commands {
    use super::*;

    pub enum Command {
        Quit,
        Help,
        Attach(PathBuf),
        Files,
        Remove(usize),
        Clear(Option<ProviderKind>),
        History(ProviderKind),
        Providers(Vec<ProviderKind>),
    }

    pub enum CommandResult {
        Continue,
        Exit,
    }

    fn parse_provider(name: &str) -> Result<ProviderKind, String> {
        name.parse::<ProviderKind>().map_err(|_| {
            format!(
                "Unknown provider: {}. Available: openai, deepseek, gemini, claude",
                name
            )
        })
    }

    impl Command {
        pub fn parse(input: &str) -> Result<Self, String> {
            let Some(rest) = input.strip_prefix('/') else {
                return Err("Not a command".to_string());
            };

            let (name, arg) = match rest.split_once(char::is_whitespace) {
                Some((name, arg)) => (name, arg.trim()),
                None => (rest, ""),
            };

            match name {
                "quit" | "exit" => Ok(Command::Quit),
                "help" => Ok(Command::Help),
                "files" => Ok(Command::Files),
                "attach" => {
                    if arg.is_empty() {
                        return Err("Usage: /attach <path>".to_string());
                    }
                    Ok(Command::Attach(PathBuf::from(arg)))
                }
                "remove" => arg
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .map(Command::Remove)
                    .ok_or_else(|| "Usage: /remove <n> (see /files)".to_string()),
                "clear" => {
                    if arg.is_empty() {
                        Ok(Command::Clear(None))
                    } else {
                        parse_provider(arg).map(|p| Command::Clear(Some(p)))
                    }
                }
                "history" => {
                    if arg.is_empty() {
                        return Err("Usage: /history <provider>".to_string());
                    }
                    parse_provider(arg).map(Command::History)
                }
                "providers" => {
                    let providers = arg
                        .split([',', ' '])
                        .filter(|s| !s.is_empty())
                        .map(parse_provider)
                        .collect::<Result<Vec<_>, _>>()?;
                    if providers.is_empty() {
                        return Err("Usage: /providers openai,claude,...".to_string());
                    }
                    Ok(Command::Providers(dedup(providers)))
                }
                _ => Err(format!(
                    "Unknown command: /{}. Type /help for available commands.",
                    name
                )),
            }
        }

        pub async fn execute(self, state: &mut AppState) -> CommandResult {
            match self {
                Command::Quit => {
                    println!("Goodbye!");
                    return CommandResult::Exit;
                }
                Command::Help => print_help(),
                Command::Attach(path) => attach_paths(state, &[path]).await,
                Command::Files => {
                    let attachments = state.session.attachments();
                    if attachments.is_empty() {
                        println!("No files attached.");
                    }
                    for (i, a) in attachments.iter().enumerate() {
                        println!("  {}. {} ({}, {})", i + 1, a.name, a.mime_type, a.display_size());
                    }
                }
                Command::Remove(n) => {
                    let id = state.session.attachments().get(n - 1).map(|a| a.id.clone());
                    match id {
                        Some(id) => match state.session.remove_attachment(&id) {
                            Ok(removed) => println!("Removed {}", removed.name),
                            Err(e) => eprintln!("{}", e),
                        },
                        None => eprintln!("No attachment #{}", n),
                    }
                }
                Command::Clear(Some(provider)) => {
                    state.session.clear_history(provider);
                    println!("{} history cleared.", provider);
                }
                Command::Clear(None) => {
                    state.session.clear_all();
                    println!("All histories and attachments cleared.");
                }
                Command::History(provider) => {
                    let history = state.session.history(provider);
                    if history.is_empty() {
                        println!("No messages for {}.", provider);
                    }
                    for turn in history {
                        let who = match turn.role {
                            Role::User => "You",
                            Role::Assistant => "Assistant",
                        };
                        println!("[{}] {}", who, turn.get_text());
                    }
                }
                Command::Providers(providers) => {
                    println!("Sending to: {}", provider_list(&providers));
                    state.saved.selected_providers =
                        providers.iter().map(|p| p.id().to_string()).collect();
                    if let Err(e) = state.saved.save() {
                        warn!(error = %e, "Could not save provider selection");
                    }
                    state.selected = providers;
                }
            }
            println!();
            CommandResult::Continue
        }
    }

    fn print_help() {
        println!("Available commands:");
        println!("  /attach <path>          - Attach a file to the next message");
        println!("  /files                  - List attached files");
        println!("  /remove <n>             - Remove attached file number n");
        println!("  /clear [provider]       - Clear one history, or everything");
        println!("  /history <provider>     - Show a provider's conversation");
        println!("  /providers a,b          - Choose providers and keep them as the default");
        println!("  /quit, /exit            - Exit");
        println!("  Ctrl+D                  - Exit");
    }

}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();
    let _log_guard = logging::init_logging(args.tracing);

    let saved = Settings::load();
    let mut settings = saved.clone();
    for (kind, model) in args.model_overrides() {
        settings.set_model(kind.id(), model);
    }

    let selected = if args.providers.is_empty() {
        default_selection(&settings)
    } else {
        dedup(args.providers.iter().copied())
    };

    let coordinator = DispatchCoordinator::from_settings(&settings);
    let configured = coordinator.configured_providers();
    if configured.is_empty() {
        eprintln!(
            "No API keys found. Set OPENAI_API_KEY, CLAUDE_API_KEY, GEMINI_API_KEY or DEEPSEEK_API_KEY, \
             or add them to {}.",
            config::PathManager::settings_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "settings.toml".to_string())
        );
    }

    let mut state = AppState {
        session: ChatSession::new(coordinator),
        selected,
        saved,
    };

    if !args.files.is_empty() {
        attach_paths(&mut state, &args.files).await;
    }

    println!();
    println!("Configured: {}", provider_list(&configured));
    println!("Type /help for commands, Ctrl+D or /quit to exit.");
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_status_bar(&state);
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            None => {
                println!();
                println!("Goodbye!");
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() && state.session.attachments().is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match commands::Command::parse(input) {
                Ok(cmd) => match cmd.execute(&mut state).await {
                    commands::CommandResult::Exit => break,
                    commands::CommandResult::Continue => continue,
                },
                Err(err) => {
                    println!("{}", err);
                    println!();
                    continue;
                }
            }
        }

        let selected = state.selected.clone();
        match state.session.send(input, &selected).await {
            Ok(report) => print_report(&state, &report),
            Err(e) => eprintln!("{}", e),
        }
        println!();
    }

    Ok(())
}
