use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use rand::rngs::SmallRng;

use crate::{
    arbiter::GameEvent,
    chip::Side,
    common::{Coord, RuleError},
    game::GameSession,
    ui,
};

use super::{Player, TurnInput, TurnView};

/// Interactive terminal player.
///
/// Lines are read on a background thread so the game loop can keep ticking
/// (and the turn timer keep running) while the user types.
pub struct CliPlayer {
    lines: Receiver<String>,
    redraw: bool,
}

impl CliPlayer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            lines: rx,
            redraw: true,
        }
    }

    fn prompt(&self, view: &TurnView<'_>) {
        println!();
        print!("{}", ui::render_board(view.session.board(), view.me, view.selected));
        println!("{}", ui::status_line(view.session, view.me, view.time_left));
        match view.selected {
            Some(at) => print!("{} selected; target cell (or another chip, 'pass', 'help'): ", at),
            None => print!("select a chip (e.g. B3), or 'B3 C3', 'pass', 'help': "),
        }
        let _ = io::stdout().flush();
    }
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  B3        select your chip at B3, or act on B3 with the selected chip");
    println!("  B3 C3     act from B3 to the adjacent cell C3");
    println!("  pass      end the turn without acting");
    println!("Moving onto an empty cell moves; onto an enemy chip attacks.");
    println!("Athena fuses with whatever it meets and both chips leave the board.");
}

/// Turn one input line into a request. Returns `Err` with a message for the
/// user when the line is not understood.
pub fn parse_command(line: &str, view: &TurnView<'_>) -> Result<Option<TurnInput>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Ok(None),
        [word] if word.eq_ignore_ascii_case("pass") => Ok(Some(TurnInput::Pass)),
        [word] if word.eq_ignore_ascii_case("help") => {
            print_help();
            Ok(None)
        }
        [cell] => {
            let at: Coord = cell.parse().map_err(|e| format!("{}", e))?;
            let own = view
                .session
                .board()
                .get(at)
                .is_some_and(|chip| chip.side == view.me);
            if own || view.selected.is_none() {
                Ok(Some(TurnInput::Select(at)))
            } else {
                Ok(Some(TurnInput::Target(at)))
            }
        }
        [from, to] => {
            let from: Coord = from.parse().map_err(|e| format!("{}", e))?;
            let to: Coord = to.parse().map_err(|e| format!("{}", e))?;
            Ok(Some(TurnInput::Act { from, to }))
        }
        _ => Err("Too many words - type 'help'".to_string()),
    }
}

impl Player for CliPlayer {
    fn poll_turn(&mut self, _rng: &mut SmallRng, view: &TurnView<'_>) -> Option<TurnInput> {
        if self.redraw {
            self.prompt(view);
            self.redraw = false;
        }
        let line = match self.lines.try_recv() {
            Ok(line) => line,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("stdin closed; passing");
                return Some(TurnInput::Pass);
            }
        };
        self.redraw = true;
        match parse_command(&line, view) {
            Ok(input) => input,
            Err(message) => {
                println!("✗ {}", message);
                None
            }
        }
    }

    fn on_event(&mut self, session: Option<&GameSession>, me: Option<Side>, event: &GameEvent) {
        println!("\n• {}", ui::describe_event(event, me));
        if let (GameEvent::Ended(_), Some(session), Some(me)) = (event, session, me) {
            print!("{}", ui::render_board(session.board(), me, None));
        }
        self.redraw = true;
    }

    fn on_rejected(&mut self, _input: &TurnInput, error: &RuleError) {
        println!("✗ {}", error);
        self.redraw = true;
    }
}
