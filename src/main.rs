use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use codetype::{
    app::{App, Flow},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    target::{BundledSnippets, FileTarget, InlineTarget, SnippetLanguage, TargetProvider},
};
use crossterm::{
    cursor::Show,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    panic,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{error, info};

/// typing practice for code snippets
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type real code snippets in the terminal and watch speed, accuracy and mistakes update live."
)]
pub struct Cli {
    /// custom prompt to use
    #[clap(short = 'p', long, conflicts_with = "file")]
    prompt: Option<String>,

    /// type the contents of a file
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// language of the bundled snippet to pick
    #[clap(short = 'l', long, value_enum)]
    language: Option<SnippetLanguage>,

    /// number of seconds to run test
    #[clap(short = 's', long)]
    number_of_secs: Option<u64>,

    /// wrap typed lines once they reach this many characters
    #[clap(long)]
    max_line_length: Option<usize>,

    /// do not highlight mistakes while typing
    #[clap(long)]
    hide_errors: bool,

    /// log verbosity, repeat for more (-v, -vv, -vvv)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// where to write logs
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// print the bundled snippet names and exit
    #[clap(long)]
    list: bool,

    /// store the resulting settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags win over the saved config.
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.number_of_secs {
            cfg.number_of_secs = Some(secs);
        }
        if let Some(max) = self.max_line_length {
            cfg.max_line_length = max;
        }
        if self.hide_errors {
            cfg.show_errors = false;
        }
        if self.language.is_some() {
            cfg.language = self.language;
        }
        cfg
    }

    fn save_config_to(&self, store: &dyn ConfigStore, cfg: &Config) -> codetype::Result<()> {
        if self.save_config {
            cfg.validate()?;
            store.save(cfg)?;
            info!("config saved");
        }
        Ok(())
    }

    fn target_provider(&self, cfg: &Config) -> Box<dyn TargetProvider> {
        match (&self.prompt, &self.file) {
            (Some(prompt), _) => Box::new(InlineTarget(prompt.clone())),
            (None, Some(path)) => Box::new(FileTarget::new(path)),
            (None, None) => Box::new(BundledSnippets::new(cfg.language)),
        }
    }
}

fn write_snippet_names<W: Write>(out: &mut W) -> io::Result<()> {
    for name in BundledSnippets::names() {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        write_snippet_names(&mut io::stdout().lock())?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(e) = logging::init_logging(cli.verbose, &log_path) {
        eprintln!("logging disabled: {}", e);
    }

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    cli.save_config_to(&store, &config)?;
    let mut app = App::new(cli.target_provider(&config), config)?;
    info!(target_len = app.session.target().len(), "starting");

    install_panic_hook(restore_terminal);
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    restore_terminal()?;

    if let Err(e) = &result {
        error!(error = %e, "event loop failed");
    }
    result
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen, Show)
}

/// Put the terminal back before the default hook prints the panic message.
fn install_panic_hook(restore: fn() -> io::Result<()>) {
    let default_panic = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore();
        error!(%info, "panic");
        default_panic(info);
    }));
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(app.config.tick_rate_ms)),
    );
    let mut last = Instant::now();

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        let now = Instant::now();
        let dt = now - last;
        last = now;

        if app.handle(event, dt) == Flow::Quit {
            break;
        }
    }

    Ok(())
}
