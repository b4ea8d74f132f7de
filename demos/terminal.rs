//! Runs a seeded simulation and draws every cycle in the terminal.
//!
//! ```text
//! RUST_LOG=colony_engine=debug cargo run --example terminal -- config.json
//! ```

use colony_engine::{CellState, Simulation, SimulationConfig, Team, WorldSnapshot};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::execute;
use crossterm::style::{Color, Print, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use std::error::Error;
use std::io::{stdout, Write};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(120);

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };

    let mut simulation = Simulation::new(config)?;
    draw(&simulation.snapshot())?;

    while !simulation.is_over() {
        simulation.advance_one_cycle()?;
        draw(&simulation.snapshot())?;
        thread::sleep(FRAME);
    }

    let mut stdout = stdout();
    execute!(stdout, Show)?;
    Ok(())
}

fn draw(snapshot: &WorldSnapshot) -> std::io::Result<()> {
    let mut stdout = stdout();

    execute!(
        stdout,
        Clear(ClearType::All),
        MoveTo(0, 0),
        Hide,
        Print("Cycle: "),
        Print(snapshot.cycle.to_string()),
        Print(", Food left: "),
        Print(snapshot.food.len().to_string())
    )?;

    for team in Team::ALL {
        let stats = snapshot.team(team);
        execute!(
            stdout,
            SetForegroundColor(team_color(team)),
            Print(format!("\n{:?}: ", team)),
            Print("Food = "),
            Print(stats.food_collected.to_string()),
            Print(", Kills = "),
            Print(stats.kills.to_string()),
            Print(", Ants = "),
            Print(stats.agents.len().to_string()),
            Print(", Bank = "),
            Print(stats.food_bank.to_string()),
            SetForegroundColor(Color::Reset)
        )?;
    }
    execute!(stdout, Print("\n\n"))?;

    // Ant markers carry no team, so the owner is looked up in the rosters
    let mut owners = vec![None; snapshot.width * snapshot.height];
    for stats in &snapshot.teams {
        for agent in &stats.agents {
            owners[agent.position.y * snapshot.width + agent.position.x] = Some(stats.team);
        }
    }

    for (index, cell) in snapshot.cells.iter().enumerate() {
        let (color, symbol) = match (cell, owners[index]) {
            (CellState::OccupiedByForager, Some(team)) => (team_color(team), forager_char(team)),
            (CellState::OccupiedByWarrior, Some(team)) => (team_color(team), warrior_char(team)),
            (CellState::AllyColony, _) => (team_color(Team::Ally), '0'),
            (CellState::EnemyColony, _) => (team_color(Team::Enemy), '1'),
            (CellState::Food, _) => (Color::Green, '*'),
            (CellState::Obstacle, _) => (Color::DarkGrey, '%'),
            _ => (Color::Reset, '.'),
        };

        execute!(
            stdout,
            SetForegroundColor(color),
            Print(symbol),
            SetForegroundColor(Color::Reset)
        )?;

        if (index + 1) % snapshot.width == 0 {
            execute!(stdout, Print("\n"))?;
        }
    }

    stdout.flush()
}

fn team_color(team: Team) -> Color {
    match team {
        Team::Ally => Color::Blue,
        Team::Enemy => Color::Red,
    }
}

fn forager_char(team: Team) -> char {
    match team {
        Team::Ally => 'f',
        Team::Enemy => 'F',
    }
}

fn warrior_char(team: Team) -> char {
    match team {
        Team::Ally => 'w',
        Team::Enemy => 'W',
    }
}
