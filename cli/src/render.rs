use std::fmt::Write;

use pairs_core::*;

pub const HELP: &str =
    "commands: flip <row> <col> | next | new <rows> <cols> | load | show | quit";

/// Text view of the grid with a status line. Hidden cards show as `.`.
pub fn grid<S, G>(session: &GameSession<S, G>) -> String
where
    S: KeyValueStore,
    G: DeckGenerator,
{
    let size = session.grid_size();
    let state = session.state();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "level {} | score {} | combo {} | lives {} | moves {} | pairs {}/{}",
        state.level,
        state.score,
        state.combo,
        state.lives,
        state.moves,
        state.matched_pairs,
        state.total_pairs
    );

    out.push_str("   ");
    for column in 0..size.columns {
        let _ = write!(out, " {column}");
    }
    for row in 0..size.rows {
        let _ = write!(out, "\n{row:>2} ");
        for column in 0..size.columns {
            let face = match session.card_at((row, column)) {
                Ok(card) if card.is_face_up() => card.card_type().symbol(),
                Ok(_) => '.',
                Err(_) => ' ',
            };
            let _ = write!(out, " {face}");
        }
    }
    if session.phase() == SessionPhase::LevelWon {
        let _ = write!(out, "\nnext grid: {}", session.next_grid_size());
    }
    out
}
