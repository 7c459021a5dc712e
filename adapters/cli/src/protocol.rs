//! Text protocol spoken with the game engine over standard input and output.
//!
//! Every turn arrives as whitespace separated tokens: the turn number (negative
//! once the game is over), both scores, the field symbols with the outer index
//! running over x, and one record per unit on the roster.

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
    str::FromStr,
};

use paintball_core::{
    Action, CellState, CoreError, FieldGrid, GridPoint, Loadout, UnitObservation,
    FIELD_DIMENSION, UNIT_COUNT,
};
use thiserror::Error;

/// Errors raised while decoding the engine's turn stream.
#[derive(Debug, Error)]
pub(crate) enum ProtocolError {
    /// Reading from the engine failed.
    #[error("failed to read from the engine")]
    Io(#[from] io::Error),
    /// The stream ended in the middle of a turn.
    #[error("input ended while expecting {expected}")]
    UnexpectedEnd {
        /// Token the reader was waiting for.
        expected: &'static str,
    },
    /// A numeric token could not be parsed.
    #[error("expected {expected}, found `{token}`")]
    InvalidNumber {
        /// Token the reader was waiting for.
        expected: &'static str,
        /// Offending token.
        token: String,
    },
    /// A field symbol did not match any known encoding.
    #[error("unknown field symbol `{0}`")]
    InvalidFieldSymbol(String),
    /// A posture or defence flag was neither of its two letters.
    #[error("expected {expected}, found `{token}`")]
    InvalidFlag {
        /// Letters the reader accepts.
        expected: &'static str,
        /// Offending token.
        token: String,
    },
    /// A loadout token was not a lowercase letter.
    #[error("invalid loadout `{0}`")]
    InvalidLoadout(String),
    /// A decoded value was rejected by the core contracts.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Scores reported at the start of a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Scores {
    pub(crate) red: i32,
    pub(crate) blue: i32,
}

/// One decoded turn.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Turn {
    pub(crate) number: i32,
    pub(crate) scores: Scores,
    pub(crate) field: FieldGrid,
    pub(crate) units: [UnitObservation; UNIT_COUNT],
}

/// Pulls whitespace separated tokens out of the engine stream one turn at a time.
pub(crate) struct TurnReader<R> {
    source: R,
    pending: VecDeque<String>,
    line: String,
}

impl<R: BufRead> TurnReader<R> {
    pub(crate) fn new(source: R) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
            line: String::new(),
        }
    }

    /// Decodes the next turn; `None` once the engine signals the end of the game.
    ///
    /// A stream that ends cleanly before a turn number also ends the game.
    pub(crate) fn read_turn(&mut self) -> Result<Option<Turn>, ProtocolError> {
        let Some(token) = self.next_token()? else {
            return Ok(None);
        };
        let number: i32 = parse_number(&token, "turn number")?;
        if number < 0 {
            return Ok(None);
        }

        let scores = Scores {
            red: self.expect_number("red score")?,
            blue: self.expect_number("blue score")?,
        };

        let mut field = FieldGrid::unknown();
        for x in 0..FIELD_DIMENSION {
            for y in 0..FIELD_DIMENSION {
                let symbol = self.expect_token("field symbol")?;
                field.set(GridPoint::new(x, y), decode_field_symbol(&symbol)?);
            }
        }

        let mut units = [UnitObservation::unseen(); UNIT_COUNT];
        for unit in &mut units {
            *unit = self.read_unit()?;
        }

        Ok(Some(Turn {
            number,
            scores,
            field,
            units,
        }))
    }

    fn read_unit(&mut self) -> Result<UnitObservation, ProtocolError> {
        let lead = self.expect_token("unit record")?;
        if lead == "*" {
            return Ok(UnitObservation::unseen());
        }

        let x = parse_number(&lead, "unit x coordinate")?;
        let y = self.expect_number("unit y coordinate")?;
        let standing = parse_flag(&self.expect_token("posture")?, "S", "C", "posture `S` or `C`")?;
        let defending =
            parse_flag(&self.expect_token("defence")?, "D", "U", "defence `D` or `U`")?;
        let loadout = decode_loadout(&self.expect_token("loadout")?)?;
        let ammo = self.expect_number("ammo count")?;

        Ok(UnitObservation {
            position: GridPoint::new(x, y),
            standing,
            defending,
            loadout,
            ammo,
        })
    }

    fn expect_number<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ProtocolError> {
        let token = self.expect_token(expected)?;
        parse_number(&token, expected)
    }

    fn expect_token(&mut self, expected: &'static str) -> Result<String, ProtocolError> {
        self.next_token()?
            .ok_or(ProtocolError::UnexpectedEnd { expected })
    }

    fn next_token(&mut self) -> Result<Option<String>, ProtocolError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            self.line.clear();
            if self.source.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(self.line.split_whitespace().map(str::to_owned));
        }
    }
}

/// Writes one action per line and flushes so the engine sees the whole turn.
pub(crate) fn write_actions<W: Write>(out: &mut W, actions: &[Action]) -> io::Result<()> {
    for action in actions {
        writeln!(out, "{action}")?;
    }
    out.flush()
}

fn parse_number<T: FromStr>(token: &str, expected: &'static str) -> Result<T, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::InvalidNumber {
        expected,
        token: token.to_owned(),
    })
}

fn parse_flag(
    token: &str,
    set: &str,
    unset: &str,
    expected: &'static str,
) -> Result<bool, ProtocolError> {
    if token == set {
        Ok(true)
    } else if token == unset {
        Ok(false)
    } else {
        Err(ProtocolError::InvalidFlag {
            expected,
            token: token.to_owned(),
        })
    }
}

fn decode_loadout(token: &str) -> Result<Loadout, ProtocolError> {
    match token.as_bytes() {
        [letter] if letter.is_ascii_lowercase() => Ok(Loadout::from_code(letter - b'a')?),
        _ => Err(ProtocolError::InvalidLoadout(token.to_owned())),
    }
}

/// Maps one field symbol to its cell state.
///
/// Piles are written `P<count>`; a pile of zero is plain ground. Capital
/// letters without a meaning of their own are treated as empty ground.
pub(crate) fn decode_field_symbol(symbol: &str) -> Result<CellState, ProtocolError> {
    let mut chars = symbol.chars();
    let lead = chars
        .next()
        .ok_or_else(|| ProtocolError::InvalidFieldSymbol(symbol.to_owned()))?;

    let state = match lead {
        '*' => CellState::Unknown,
        '.' => CellState::Empty,
        'P' => {
            let count: u32 = chars
                .as_str()
                .parse()
                .map_err(|_| ProtocolError::InvalidFieldSymbol(symbol.to_owned()))?;
            if count == 0 {
                CellState::Empty
            } else {
                CellState::AmmoPile(count)
            }
        }
        'A' => CellState::Adapter,
        'B' => CellState::BlueObjectiveMarker,
        'F' => CellState::RapidFireLauncher,
        'L' => CellState::BasicLauncher,
        'R' => CellState::RedObjectiveMarker,
        'S' => CellState::Shield,
        'T' => CellState::Tree,
        'V' => CellState::LowWall,
        'W' => CellState::HighWall,
        other if other.is_ascii_uppercase() => CellState::Empty,
        _ => return Err(ProtocolError::InvalidFieldSymbol(symbol.to_owned())),
    };
    Ok(state)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Renders a full turn in the engine's format from a few notable cells and unit records.
    pub(crate) fn turn_text(number: i32, cells: &[(GridPoint, &str)], units: &[&str]) -> String {
        let mut text = format!("{number} 3 1\n");
        for x in 0..FIELD_DIMENSION {
            let row: Vec<&str> = (0..FIELD_DIMENSION)
                .map(|y| {
                    cells
                        .iter()
                        .find(|(point, _)| *point == GridPoint::new(x, y))
                        .map_or(".", |(_, symbol)| *symbol)
                })
                .collect();
            text.push_str(&row.join(" "));
            text.push('\n');
        }
        for index in 0..UNIT_COUNT {
            text.push_str(units.get(index).copied().unwrap_or("*"));
            text.push('\n');
        }
        text
    }

    #[test]
    fn field_symbols_decode_to_cells() {
        assert_eq!(decode_field_symbol("*").unwrap(), CellState::Unknown);
        assert_eq!(decode_field_symbol(".").unwrap(), CellState::Empty);
        assert_eq!(decode_field_symbol("P12").unwrap(), CellState::AmmoPile(12));
        assert_eq!(decode_field_symbol("P0").unwrap(), CellState::Empty);
        assert_eq!(decode_field_symbol("W").unwrap(), CellState::HighWall);
        assert_eq!(decode_field_symbol("V").unwrap(), CellState::LowWall);
        assert_eq!(decode_field_symbol("B").unwrap(), CellState::BlueObjectiveMarker);
        assert_eq!(decode_field_symbol("C").unwrap(), CellState::Empty);
    }

    #[test]
    fn malformed_field_symbols_are_rejected() {
        assert!(matches!(
            decode_field_symbol("Px"),
            Err(ProtocolError::InvalidFieldSymbol(_))
        ));
        assert!(matches!(
            decode_field_symbol("?"),
            Err(ProtocolError::InvalidFieldSymbol(_))
        ));
    }

    #[test]
    fn loadout_letters_map_to_codes() {
        assert_eq!(decode_loadout("a").unwrap(), Loadout::Nothing);
        assert_eq!(decode_loadout("d").unwrap(), Loadout::ShieldAndBasicLauncher);
        assert_eq!(decode_loadout("f").unwrap(), Loadout::ShieldAndRapidFireLauncher);
        assert!(matches!(decode_loadout("g"), Err(ProtocolError::Core(_))));
        assert!(matches!(decode_loadout("ab"), Err(ProtocolError::InvalidLoadout(_))));
    }

    #[test]
    fn reads_a_full_turn() {
        let text = turn_text(
            4,
            &[(GridPoint::new(0, 1), "T"), (GridPoint::new(2, 0), "P7")],
            &["3 4 S U b 12", "*", "*", "10 11 C D d 0"],
        );
        let mut reader = TurnReader::new(text.as_bytes());

        let turn = reader.read_turn().unwrap().expect("turn decoded");

        assert_eq!(turn.number, 4);
        assert_eq!(turn.scores, Scores { red: 3, blue: 1 });
        assert_eq!(turn.field.cell(GridPoint::new(0, 1)), CellState::Tree);
        assert_eq!(turn.field.cell(GridPoint::new(2, 0)), CellState::AmmoPile(7));
        assert_eq!(turn.field.cell(GridPoint::new(1, 0)), CellState::Empty);
        assert_eq!(
            turn.units[0],
            UnitObservation {
                position: GridPoint::new(3, 4),
                standing: true,
                defending: false,
                loadout: Loadout::BasicLauncher,
                ammo: 12,
            }
        );
        assert_eq!(turn.units[1], UnitObservation::unseen());
        assert!(!turn.units[3].standing);
        assert!(turn.units[3].defending);
        assert_eq!(reader.read_turn().unwrap(), None);
    }

    #[test]
    fn negative_turn_numbers_end_the_game() {
        let mut reader = TurnReader::new("-1\n".as_bytes());
        assert_eq!(reader.read_turn().unwrap(), None);
    }

    #[test]
    fn truncated_turns_are_reported() {
        let mut reader = TurnReader::new("0 0 0 . . .".as_bytes());
        let error = reader.read_turn().unwrap_err();
        assert!(matches!(
            error,
            ProtocolError::UnexpectedEnd {
                expected: "field symbol"
            }
        ));
    }

    #[test]
    fn bad_posture_flags_are_reported() {
        let text = turn_text(0, &[], &["1 1 X U a 0"]);
        let mut reader = TurnReader::new(text.as_bytes());
        assert!(matches!(
            reader.read_turn(),
            Err(ProtocolError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn actions_are_written_one_per_line() {
        let mut out = Vec::new();
        write_actions(
            &mut out,
            &[
                Action::Move {
                    target: GridPoint::new(1, 2),
                },
                Action::Idle,
                Action::launch(GridPoint::new(7, 8), true),
            ],
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "move 1 2\nidle\nlaunch 7 8\n");
    }
}
