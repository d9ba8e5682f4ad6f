use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use std::sync::Arc;
use std::thread;

use hexrail::bot::{BasicBot, BotObserver};
use hexrail::game::{
    GameConfig, GameController, GameState, HexagonLayout, Player, PlayerId, RandomDice,
};

const PLAYER_COLORS: &[&str] = &[
    "#d04040", "#4060d0", "#40a040", "#d0a020", "#9040c0", "#30a0a0",
];

#[derive(Parser)]
#[command(name = "hexrail")]
#[command(about = "Headless hex rail race played by bots")]
struct Cli {
    /// Number of bot players
    #[arg(long, default_value = "3")]
    players: usize,

    /// Seed for the board, the dice and the bots
    #[arg(long)]
    seed: Option<u64>,

    /// Radius of the hexagonal board
    #[arg(long, default_value = "4")]
    radius: u32,

    /// Number of cities on the board
    #[arg(long, default_value = "10")]
    cities: usize,

    /// Sides of the die
    #[arg(long, default_value = "6")]
    dice_sides: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run_headless(&cli)
}

/// Play a whole game between bots on a generated board
fn run_headless(cli: &Cli) -> Result<()> {
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!("Running hexrail in headless mode (seed {})", seed);

    let config = GameConfig {
        dice_sides: cli.dice_sides,
        ..GameConfig::default()
    };
    let max_rentable = config.max_rentable_distance;
    let starting_credits = config.starting_credits;

    let layout = HexagonLayout {
        radius: cli.radius,
        cities: cli.cities,
        seed,
        ..HexagonLayout::default()
    };
    let grid = layout.build(config)?;
    info!(
        "Board: {} tiles, {} edges, {} cities",
        grid.tile_count(),
        grid.edge_count(),
        grid.city_count()
    );

    let players = (0..cli.players)
        .map(|i| {
            Player::new(
                PlayerId(i),
                format!("Bot {}", i + 1),
                PLAYER_COLORS[i % PLAYER_COLORS.len()],
                true,
            )
            .with_credits(starting_credits)
        })
        .collect();
    let state = GameState::new(grid, players);

    let observer = Arc::new(BotObserver::new());
    let controller = GameController::new(
        state,
        RandomDice::new_with_seed(cli.dice_sides, seed),
        observer.clone(),
    )
    .context("failed to set up the game")?
    .with_seed(seed);

    let mut bots = Vec::new();
    for (i, sender) in controller.action_senders().into_iter().enumerate() {
        let snapshots = observer.register(sender.player());
        let bot = BasicBot::new(sender, seed.wrapping_add(i as u64 + 1), max_rentable);
        let handle = thread::Builder::new()
            .name(format!("bot-{}", i + 1))
            .spawn(move || bot.run(snapshots))
            .context("failed to spawn bot thread")?;
        bots.push(handle);
    }

    let mut controller = controller;
    let game = thread::Builder::new()
        .name("game-logic".to_string())
        .spawn(move || controller.run())
        .context("failed to spawn game thread")?;

    let outcome = game
        .join()
        .map_err(|_| anyhow!("game thread panicked"))?
        .context("game aborted")?;

    observer.close();
    for bot in bots {
        bot.join().map_err(|_| anyhow!("bot thread panicked"))?;
    }

    info!("=== GAME OVER after {} driving rounds ===", outcome.rounds);
    for (player, credits) in &outcome.standings {
        info!("  {}: {} credits", player, credits);
    }
    match outcome.winner {
        Some(winner) => info!("Winner: {}", winner),
        None => info!("No winner"),
    }
    Ok(())
}
