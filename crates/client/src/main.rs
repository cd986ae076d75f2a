mod headless;
mod lobby;
mod net;
mod play;
mod session;
mod tui;

use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use nimmt::{ClientConfig, DEFAULT_PORT};

use headless::Headless;
use play::PlayOptions;
use session::Session;

#[derive(Parser)]
#[command(name = "nimmt")]
#[command(about = "6 nimmt! terminal client")]
struct Args {
    #[arg(long, global = true, help = "Where the login token is kept")]
    session_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Log filter, overrides RUST_LOG (e.g. debug)")]
    log_level: Option<String>,

    #[arg(long, global = true, help = "Log file used while the TUI owns the terminal")]
    log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        default_value_t = 1.0,
        help = "Animation speed multiplier"
    )]
    animation_speed: f32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Join the lobby and save the session token
    Login {
        #[arg(short, long, help = "Server address (e.g., 127.0.0.1:6767)")]
        server: Option<String>,

        #[arg(short, long, default_value = "", help = "Display name")]
        name: String,

        #[arg(long, help = "Start the game right away and play")]
        start: bool,

        #[command(flatten)]
        play: PlayArgs,
    },
    /// Ask the server to deal the first round
    Start,
    /// Join the running game with the saved session
    Play(PlayArgs),
}

#[derive(clap::Args)]
struct PlayArgs {
    #[arg(long, help = "Print the board instead of drawing it")]
    headless: bool,

    #[arg(long, help = "Exit when the connection drops")]
    no_reconnect: bool,

    #[arg(long, default_value_t = 2000, help = "Delay before reconnecting")]
    reconnect_delay_ms: u64,
}

impl PlayArgs {
    fn options(&self) -> PlayOptions {
        PlayOptions {
            reconnect: !self.no_reconnect,
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let draws_tui = match &args.command {
        Command::Login { start, play, .. } => *start && !play.headless,
        Command::Start => false,
        Command::Play(play) => !play.headless,
    };
    init_logging(&args, draws_tui)?;

    let session_file = args.session_file.clone().unwrap_or_else(session::default_path);
    let config = ClientConfig::default().with_animation_speed(args.animation_speed);

    match &args.command {
        Command::Login {
            server,
            name,
            start,
            play,
        } => {
            let address = server
                .clone()
                .unwrap_or_else(|| format!("127.0.0.1:{}", DEFAULT_PORT));
            let session = lobby::login(&address, name).await?;
            session.save(&session_file)?;
            println!("Logged in to {}", address);
            if *start {
                lobby::start(&session).await?;
                run_play(session, config, play).await?;
            }
        }
        Command::Start => {
            let session = Session::load(&session_file)?;
            lobby::start(&session).await?;
            println!("Game started");
        }
        Command::Play(play) => {
            let session = Session::load(&session_file)?;
            run_play(session, config, play).await?;
        }
    }

    Ok(())
}

async fn run_play(session: Session, config: ClientConfig, play: &PlayArgs) -> anyhow::Result<()> {
    if play.headless {
        let mut frontend = Headless::default();
        return play::run(session, config, play.options(), &mut frontend).await;
    }

    let mut frontend = tui::Tui::new().context("failed to set up the terminal")?;
    let result = play::run(session, config, play.options(), &mut frontend).await;
    frontend.restore_terminal()?;
    result
}

fn init_logging(args: &Args, to_file: bool) -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = &args.log_level {
        builder.parse_filters(filter);
    }

    if to_file {
        let path = args
            .log_file
            .clone()
            .unwrap_or_else(|| session::state_dir().join("client.log"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
