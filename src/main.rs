//! # Tacojiman Main Entry Point
//!
//! Prints generated maps and runs headless auto-play rounds from the command
//! line.

use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tacojiman::{
    format_countdown, generate_terrain, BossPhase, GameConfig, GameEvent, GameEventListener,
    GameSession, GenerationConfig, JsonFileStore, MemoryStore, ProgressStore, SessionSummary,
    TacoResult, WorldPoint,
};

/// Simulation step for auto-play, in seconds.
const AUTO_PLAY_DT: f32 = 0.1;

/// Enemy count at which the bot fires its bomb.
const BOMB_CROWD: usize = 15;

/// Command line arguments for Tacojiman.
#[derive(Parser, Debug)]
#[command(name = "tacojiman")]
#[command(about = "Terrain generation and headless simulation for the Tacojiman arcade defense game")]
#[command(version)]
struct Args {
    /// Random seed for map generation and spawning
    #[arg(short, long)]
    seed: Option<u64>,

    /// World width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// World height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Tile size in pixels
    #[arg(long)]
    tile_size: Option<u32>,

    /// JSON configuration file; missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the generated map as ASCII
    #[arg(long)]
    print_map: bool,

    /// Run an auto-play round for this many seconds
    #[arg(long, value_name = "SECONDS")]
    simulate: Option<f32>,

    /// Progress file updated after a simulated round
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Print the round summary as JSON
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> TacoResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Tacojiman v{}", tacojiman::VERSION);

    let config = load_config(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);

    if args.print_map || args.simulate.is_none() {
        let generation = GenerationConfig::from_map_config(&config.map, seed);
        let grid = generate_terrain(&generation)?;
        println!("seed {} ({}x{})", seed, grid.width(), grid.height());
        print!("{}", grid);
    }

    if let Some(seconds) = args.simulate {
        let summary = simulate(config, seed, seconds, args.progress.as_deref())?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
    }

    Ok(())
}

/// Initializes logging; `tracing-subscriber` with `dev-tools`, `env_logger` otherwise.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .init();
    }
}

/// Default config, overlaid by the config file, overlaid by CLI flags.
fn load_config(args: &Args) -> TacoResult<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(width) = args.width {
        config.map.world_width = width;
    }
    if let Some(height) = args.height {
        config.map.world_height = height;
    }
    if let Some(tile_size) = args.tile_size {
        config.map.tile_size = tile_size;
    }
    config.validate()?;
    Ok(config)
}

/// Logs round milestones; everything else goes to debug output.
#[derive(Debug, Default)]
struct EventLogger;

impl GameEventListener for EventLogger {
    fn on_event(&mut self, event: GameEvent) {
        match &event {
            GameEvent::DifficultyRaised {
                max_enemies,
                spawn_delay_ms,
            } => info!(
                "Difficulty raised: up to {} enemies, one every {} ms",
                max_enemies, spawn_delay_ms
            ),
            GameEvent::BossBarrierBroken => info!("Boss barrier broken"),
            GameEvent::BombRecovered { bomb } => info!("Bomb ready: {}", bomb),
            _ => debug!("{:?}", event),
        }
    }
}

/// Plays a round with a simple bot: swat the enemy closest to the house,
/// hit the boss whenever it is exposed, and bomb the densest crowd.
fn simulate(
    config: GameConfig,
    seed: u64,
    seconds: f32,
    progress: Option<&Path>,
) -> TacoResult<SessionSummary> {
    let mut session = GameSession::new(config, seed, Box::new(EventLogger))?;
    let steps = (seconds.max(0.0) / AUTO_PLAY_DT).ceil() as u64;

    for step in 0..steps {
        session.tick(AUTO_PLAY_DT);
        if session.is_over() {
            break;
        }
        auto_play_turn(&mut session);

        if step % 100 == 0 {
            info!(
                "{} left, {} points, {} enemies",
                format_countdown(session.remaining_secs()),
                session.score(),
                session.director().enemy_count()
            );
        }
    }

    let mut store: Box<dyn ProgressStore> = match progress {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::default()),
    };
    session.finish(store.as_mut())
}

fn auto_play_turn(session: &mut GameSession) {
    let house = session.house_point();
    let zoom = session.config().attack.max_zoom;

    if session.director().enemy_count() >= BOMB_CROWD && session.bomb_stock().stock() > 0 {
        let target = densest_point(session);
        session.activate_bomb(target);
    }

    let boss_target = session
        .boss()
        .filter(|boss| boss.phase() != BossPhase::Defeated)
        .map(|boss| boss.position());
    if let Some(point) = boss_target {
        session.tap(point, zoom);
        return;
    }

    let nearest = session
        .director()
        .enemies()
        .iter()
        .map(|enemy| enemy.position())
        .filter(|point| point.distance(house) >= session.config().attack.house_click_radius)
        .min_by(|a, b| a.distance(house).total_cmp(&b.distance(house)));
    if let Some(point) = nearest {
        session.tap(point, zoom);
    }
}

/// Enemy position with the most other enemies within the normal tap radius.
fn densest_point(session: &GameSession) -> Option<WorldPoint> {
    let radius = session.config().attack.normal_attack_radius;
    let director = session.director();
    director
        .enemies()
        .iter()
        .map(|enemy| enemy.position())
        .max_by_key(|&point| director.enemies_in_area(point, radius).len())
}

fn print_summary(summary: &SessionSummary) {
    println!("seed:               {}", summary.seed);
    println!("outcome:            {:?}", summary.outcome);
    println!("elapsed:            {:.1} s", summary.elapsed_secs);
    println!("score:              {}", summary.score);
    println!("ending:             {:?}", summary.ending);
    println!("enemies destroyed:  {}", summary.enemies_destroyed);
    println!("enemies got home:   {}", summary.enemies_reached_home);
    println!("bombs used:         {}", summary.bombs_used);
    println!(
        "boss:               {}",
        match (summary.boss_spawned, summary.boss_defeated) {
            (false, _) => "did not appear",
            (true, true) => "defeated",
            (true, false) => "survived",
        }
    );
    if summary.new_high_score {
        println!("new high score!");
    }
}
