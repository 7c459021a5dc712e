//! Run loop that feeds engine turns through the world and the squad.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use paintball_core::{Action, Command, Event, UnitId};
use paintball_system_agent::{Squad, SquadConfig};
use paintball_world::{self as world, World};

use crate::protocol::{write_actions, Turn, TurnReader};

/// Long-lived state of one game.
pub(crate) struct Session {
    world: World,
    squad: Squad,
    actions: Vec<Action>,
    events: Vec<Event>,
}

impl Session {
    pub(crate) fn new(config: &SquadConfig) -> Self {
        Self {
            world: World::new(),
            squad: Squad::new(config),
            actions: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Plays turns until the engine ends the game; returns the number of turns played.
    pub(crate) fn run<R: BufRead, W: Write>(
        &mut self,
        reader: &mut TurnReader<R>,
        out: &mut W,
    ) -> Result<u32> {
        let mut played = 0;
        while let Some(turn) = reader
            .read_turn()
            .context("failed to decode turn from the engine")?
        {
            let number = turn.number;
            let scores = turn.scores;
            let actions = self.play_turn(turn);
            write_actions(out, actions)
                .with_context(|| format!("failed to send actions for turn {number}"))?;
            tracing::debug!(
                turn = number,
                red = scores.red,
                blue = scores.blue,
                actions = ?actions,
                "turn played"
            );
            played += 1;
        }

        tracing::info!(turns = played, "game over");
        Ok(played)
    }

    /// Records the observations of one turn and decides every controlled unit's action.
    pub(crate) fn play_turn(&mut self, turn: Turn) -> &[Action] {
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::ObserveField { cells: turn.field },
            &mut self.events,
        );
        for (unit, observation) in UnitId::roster().zip(turn.units) {
            world::apply(
                &mut self.world,
                Command::ObserveUnit { unit, observation },
                &mut self.events,
            );
        }
        tracing::trace!(events = self.events.len(), "observations applied");

        self.squad.handle(&mut self.world, &mut self.actions);
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::tests::turn_text;
    use paintball_core::GridPoint;

    fn play(input: &str) -> (u32, String) {
        let mut session = Session::new(&SquadConfig::default());
        let mut reader = TurnReader::new(input.as_bytes());
        let mut out = Vec::new();
        let played = session.run(&mut reader, &mut out).expect("session runs");
        (played, String::from_utf8(out).expect("output is utf-8"))
    }

    #[test]
    fn every_turn_answers_for_each_controlled_unit() {
        let mut input = turn_text(0, &[], &["5 5 S U b 3", "6 5 S U b 3", "5 6 S U b 3", "7 7 S U b 3"]);
        input.push_str(&turn_text(1, &[], &["5 5 S U b 3", "6 5 S U b 3", "5 6 S U b 3", "7 7 S U b 3"]));
        input.push_str("-1\n");

        let (played, output) = play(&input);

        assert_eq!(played, 2);
        assert_eq!(output.lines().count(), 8);
    }

    #[test]
    fn adjacent_ammo_is_picked_up() {
        let input = turn_text(0, &[(GridPoint::new(5, 6), "P9")], &["5 5 S U a 0"]);

        let (_, output) = play(&input);

        let first = output.lines().next().expect("one line per unit");
        assert_eq!(first, "pickup 5 6");
    }

    #[test]
    fn unseen_units_idle() {
        let (_, output) = play(&turn_text(0, &[], &[]));
        assert_eq!(output, "idle\nidle\nidle\nidle\n");
    }

    #[test]
    fn malformed_turns_abort_the_run() {
        let mut session = Session::new(&SquadConfig::default());
        let mut reader = TurnReader::new("0 1 nope".as_bytes());
        let mut out = Vec::new();
        assert!(session.run(&mut reader, &mut out).is_err());
    }
}
