use crate::economy::Score;
use crate::entities::{Agent, AgentKind};
use crate::map::{GridWorld, Position};
use tracing::debug;
use uuid::Uuid;

/// The result of a warrior's attack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttackOutcome {
    /// The attacker is not a warrior, or no live enemy is adjacent to it.
    NoTarget,
    /// The defender was hit and survived.
    Hit { defender: Uuid, remaining: i32 },
    /// The defender was hit and died.
    Killed { defender: Uuid, position: Position },
}

impl AttackOutcome {
    pub fn is_attack(&self) -> bool {
        !matches!(self, AttackOutcome::NoTarget)
    }
}

/// Lets a warrior strike the first live defender found on its left, right, top or
/// bottom neighbor, in that order.
///
/// A warrior strikes at most once per call, whatever the number of adjacent enemies.
/// A defender brought to zero hit points is dead: it no longer acts and cannot be
/// struck again, and it stays in its roster until [`remove_casualties`] runs.
pub fn resolve_attack(
    attacker: &Agent,
    defenders: &mut [Agent],
    attacker_score: &mut Score,
    damage: u32,
) -> AttackOutcome {
    if attacker.kind() != AgentKind::Warrior || !attacker.is_alive() {
        return AttackOutcome::NoTarget;
    }

    for neighbor in attacker.position().orthogonal() {
        let Some(defender) = defenders
            .iter_mut()
            .find(|defender| defender.is_alive() && defender.position() == neighbor)
        else {
            continue;
        };

        if defender.take_damage(damage) {
            attacker_score.kills += 1;
            debug!(
                attacker = %attacker.id(),
                defender = %defender.id(),
                x = neighbor.x,
                y = neighbor.y,
                "Ant killed"
            );
            return AttackOutcome::Killed {
                defender: defender.id(),
                position: neighbor,
            };
        }

        return AttackOutcome::Hit {
            defender: defender.id(),
            remaining: defender.hit_points(),
        };
    }

    AttackOutcome::NoTarget
}

/// Removes dead ants from a roster and clears their cells. Returns the removed ants.
pub fn remove_casualties(grid: &mut GridWorld, roster: &mut Vec<Agent>) -> Vec<Agent> {
    let (dead, alive): (Vec<Agent>, Vec<Agent>) =
        roster.drain(..).partition(|agent| !agent.is_alive());
    *roster = alive;

    for agent in &dead {
        grid.vacate(agent.position());
    }

    dead
}
