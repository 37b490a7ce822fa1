//! Converts engine coordinate moves into SAN for display

use shakmaty::{san::SanPlus, uci::UciMove, Chess, Position};

/// Replays `pv` on a scratch copy of `position` and returns the SAN of every
/// move that applied. Rendering stops at the first move that does not parse
/// or is not legal, so the result may be a prefix of `pv`.
///
/// ```
/// use chess_explorer_core::engine::render_san;
/// use shakmaty::Chess;
///
/// let pv = vec!["g1f3".to_string(), "d7d5".to_string()];
/// assert_eq!(render_san(&Chess::default(), &pv), vec!["Nf3", "d5"]);
/// ```
pub fn render_san(position: &Chess, pv: &[String]) -> Vec<String> {
    let mut scratch = position.clone();
    let mut san = Vec::with_capacity(pv.len());

    for coord in pv {
        let Ok(uci) = coord.parse::<UciMove>() else {
            break;
        };
        let Ok(mv) = uci.to_move(&scratch) else {
            break;
        };
        san.push(SanPlus::from_move_and_play_unchecked(&mut scratch, mv).to_string());
    }

    san
}

/// Plays coordinate moves from `position`, returning the resulting position,
/// or the index of the first move that failed
pub fn play_uci_moves(position: &Chess, moves: &[String]) -> Result<Chess, usize> {
    let mut current = position.clone();

    for (idx, coord) in moves.iter().enumerate() {
        let uci: UciMove = coord.parse().map_err(|_| idx)?;
        let mv = uci.to_move(&current).map_err(|_| idx)?;
        current = current.play(mv).map_err(|_| idx)?;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{fen::Fen, CastlingMode};

    fn moves(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_opening() {
        let pv = moves(&["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"]);
        assert_eq!(
            render_san(&Chess::default(), &pv),
            vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]
        );
    }

    #[test]
    fn test_render_stops_at_illegal_move() {
        let pv = moves(&["e2e4", "e7e8", "g1f3"]);
        assert_eq!(render_san(&Chess::default(), &pv), vec!["e4"]);
    }

    #[test]
    fn test_render_stops_at_garbage() {
        let pv = moves(&["d2d4", "zz"]);
        assert_eq!(render_san(&Chess::default(), &pv), vec!["d4"]);
    }

    #[test]
    fn test_render_marks_mate() {
        let fen: Fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
            .parse()
            .unwrap();
        let pos: Chess = fen.into_position(CastlingMode::Standard).unwrap();

        assert_eq!(render_san(&pos, &moves(&["h5f7"])), vec!["Qxf7#"]);
    }

    #[test]
    fn test_play_uci_moves_reports_failure_index() {
        let start = Chess::default();
        assert!(play_uci_moves(&start, &moves(&["e2e4", "e7e5"])).is_ok());
        assert_eq!(play_uci_moves(&start, &moves(&["e2e4", "e2e4"])).unwrap_err(), 1);
    }
}
