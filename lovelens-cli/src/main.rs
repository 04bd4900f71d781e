use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use lovelens::model::{Commentary, Language};
use lovelens::server::{
    CameraHandle, CameraSession, CameraState, GeminiConfig, GeminiJudge, HostHandle, HostSession,
    HostStatus, InferenceService, SessionConfig, Switchboard, SyntheticCamera, serve_relay,
};
use lovelens::{Layout, Mode, RoomCode, Slot};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lovelens", version, about = "Kiss cam and drink cam for a shared room")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host a room and accept cameras through the WebSocket relay.
    Serve {
        /// Room code. A random one is generated when omitted.
        #[arg(short, long)]
        room: Option<String>,

        #[arg(short, long, default_value = "0.0.0.0:9000")]
        addr: SocketAddr,

        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[arg(long, default_value = "gemini-2.5-flash")]
        model: String,

        /// Run without the interactive operator menu.
        #[arg(long)]
        headless: bool,
    },

    /// Run a host and two synthetic cameras in-process and judge once.
    Demo {
        #[arg(short, long, default_value = "DEMO")]
        room: String,

        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve {
            room,
            addr,
            api_key,
            model,
            headless,
        } => serve(room, addr, api_key, model, headless).await,
        Commands::Demo { room, api_key } => demo(room, api_key).await,
    }
}

fn judge_service(api_key: Option<String>, model: Option<String>) -> Result<Arc<dyn InferenceService>> {
    let mut config = GeminiConfig::from_env();
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key);
    }
    if let Some(model) = model {
        config.model = model;
    }
    if config.api_key.is_none() {
        warn!("No API key configured, every verdict will be the fallback");
    }
    let judge = GeminiJudge::new(config).context("Failed to build inference client")?;
    Ok(Arc::new(judge))
}

async fn serve(
    room: Option<String>,
    addr: SocketAddr,
    api_key: Option<String>,
    model: String,
    headless: bool,
) -> Result<()> {
    let room = match room {
        Some(raw) => RoomCode::parse(&raw)?,
        None => RoomCode::generate(),
    };
    let switchboard = Switchboard::new();
    let host = HostSession::spawn(
        &switchboard,
        room.clone(),
        SessionConfig::default(),
        judge_service(api_key, Some(model))?,
    )
    .context("Failed to host room")?;

    println!("{}", "💘 LoveLens host is live".magenta().bold());
    println!("   Room code: {}", room.as_str().yellow().bold());
    println!("   Relay:     ws://{}/peer/<peer-id>", addr);

    let relay = tokio::spawn(serve_relay(addr, switchboard.clone()));
    let watcher = tokio::spawn(print_status_changes(host.subscribe()));

    if headless {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
    } else {
        operator_menu(&host).await?;
    }

    host.leave().await;
    watcher.abort();
    relay.abort();
    println!("{}", "👋 Room closed".cyan());
    Ok(())
}

#[derive(Clone, Copy)]
enum MenuAction {
    ToggleMode,
    Layout(Layout),
    ToggleLanguage,
    Judge,
    Quit,
}

const MENU: [(&str, MenuAction); 7] = [
    ("Toggle KISS / DRINK", MenuAction::ToggleMode),
    ("Split screen", MenuAction::Layout(Layout::Split)),
    ("Full screen cam 1", MenuAction::Layout(Layout::FullCam1)),
    ("Full screen cam 2", MenuAction::Layout(Layout::FullCam2)),
    ("Toggle TH / EN", MenuAction::ToggleLanguage),
    ("Judge!", MenuAction::Judge),
    ("Leave room", MenuAction::Quit),
];

async fn operator_menu(host: &HostHandle) -> Result<()> {
    loop {
        let status = host.status();
        let prompt = format!(
            "{} | {} | {} | cam1 {} cam2 {}",
            status.mode,
            status.layout,
            status.language.as_str(),
            online_marker(&status, Slot::Cam1),
            online_marker(&status, Slot::Cam2),
        );

        // dialoguer blocks on the terminal
        let choice = tokio::task::spawn_blocking(move || {
            let labels: Vec<&str> = MENU.iter().map(|(label, _)| *label).collect();
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .items(&labels)
                .default(0)
                .interact()
        })
        .await
        .context("Menu task panicked")?
        .context("Failed to read menu choice")?;

        match MENU[choice].1 {
            MenuAction::ToggleMode => host.set_mode(status.mode.toggled()).await?,
            MenuAction::Layout(layout) => host.set_layout(layout).await?,
            MenuAction::ToggleLanguage => host.set_language(status.language.toggled()).await?,
            MenuAction::Judge => match host.judge().await {
                Ok(commentary) => print_commentary(&commentary),
                Err(e) => println!("{} {}", "⚠️".yellow(), e.to_string().yellow()),
            },
            MenuAction::Quit => return Ok(()),
        }
    }
}

fn online_marker(status: &HostStatus, slot: Slot) -> ColoredString {
    if status.is_online(slot) {
        "●".green()
    } else {
        "○".dimmed()
    }
}

fn print_commentary(commentary: &Commentary) {
    println!(
        "{} {} {}",
        format!("[{}]", commentary.mood).magenta().bold(),
        commentary.text.bold(),
        format!("{}/100", commentary.score).yellow()
    );
}

async fn print_status_changes(mut status: tokio::sync::watch::Receiver<HostStatus>) {
    let mut last = status.borrow_and_update().clone();
    while status.changed().await.is_ok() {
        let current = status.borrow_and_update().clone();
        for slot in Slot::ALL {
            match (last.is_online(slot), current.is_online(slot)) {
                (false, true) => info!(%slot, "Camera online"),
                (true, false) => info!(%slot, "Camera offline"),
                _ => {}
            }
        }
        if last.connections != current.connections {
            info!(connections = current.connections, "Control links changed");
        }
        last = current;
    }
}

async fn wait_connected(camera: &CameraHandle) -> Result<()> {
    let mut status = camera.subscribe();
    tokio::time::timeout(
        Duration::from_secs(15),
        status.wait_for(|s| s.state == CameraState::Connected && s.calls_placed > 0),
    )
    .await
    .with_context(|| format!("Camera {} never connected", camera.peer_id()))?
    .context("Camera session ended")?;
    Ok(())
}

async fn demo(room: String, api_key: Option<String>) -> Result<()> {
    let room = RoomCode::parse(&room)?;
    let switchboard = Switchboard::new();
    let config = SessionConfig::default();

    println!("{}", "🎬 Starting LoveLens demo...".green().bold());
    let host = HostSession::spawn(
        &switchboard,
        room.clone(),
        config.clone(),
        judge_service(api_key, None)?,
    )?;

    let cameras: Vec<CameraHandle> = Slot::ALL
        .into_iter()
        .map(|slot| {
            let device = SyntheticCamera::new().with_interval(Duration::from_millis(500));
            CameraSession::spawn(&switchboard, room.clone(), slot, config.clone(), Arc::new(device))
        })
        .collect();

    for camera in &cameras {
        wait_connected(camera).await?;
        println!("   📷 {} connected", camera.peer_id().as_str().cyan());
    }

    let Some(second) = cameras.get(1) else {
        bail!("Demo needs two cameras");
    };
    second.send_layout(Layout::FullCam2).await?;
    host.set_mode(Mode::Drink).await?;
    host.set_language(Language::En).await?;

    let mut status = host.subscribe();
    status
        .wait_for(|s| s.layout == Layout::FullCam2 && s.mode == Mode::Drink)
        .await
        .context("Host session ended")?;
    println!("   🎛  Layout {} in {} mode", Layout::FullCam2, Mode::Drink);

    let commentary = host.judge().await.context("Judging failed")?;
    print_commentary(&commentary);

    for camera in cameras {
        camera.leave().await;
    }
    host.leave().await;
    println!("{}", "✨ Demo finished".green().bold());
    Ok(())
}
