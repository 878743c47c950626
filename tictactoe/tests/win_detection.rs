use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tictactoe::lines::generate_lines;
use tictactoe::{Board, Mark, Position, WinDetector};

/// Reference answer: walk every cell in every direction counting runs.
fn brute_force_win(board: &Board, mark: Mark, win_length: usize) -> bool {
    let size = board.size() as isize;
    let at = |row: isize, col: isize| -> Option<Mark> {
        if row < 0 || col < 0 || row >= size || col >= size {
            return None;
        }
        board.get(Position::new(row as usize, col as usize)).unwrap()
    };
    for row in 0..size {
        for col in 0..size {
            for (dr, dc) in [(0, 1), (1, 0), (1, 1), (1, -1)] {
                let run = (0..win_length as isize)
                    .take_while(|&k| at(row + dr * k, col + dc * k) == Some(mark))
                    .count();
                if run == win_length {
                    return true;
                }
            }
        }
    }
    false
}

fn random_board(rng: &mut StdRng, size: usize, fill: f64) -> Board {
    let mut board = Board::new(size).unwrap();
    for idx in 0..size * size {
        if rng.gen_bool(fill) {
            let mark = if rng.gen_bool(0.5) { Mark::X } else { Mark::O };
            let pos = board.position_of(idx);
            board.place(pos, mark).unwrap();
        }
    }
    board
}

#[test]
fn agrees_with_brute_force_on_random_boards() {
    let mut rng = StdRng::seed_from_u64(2024);
    for size in 3..=5 {
        for win_length in 2..=size {
            let detector = WinDetector::new(size, win_length).unwrap();
            for _ in 0..300 {
                let fill = rng.gen_range(0.2..0.9);
                let board = random_board(&mut rng, size, fill);
                for mark in [Mark::X, Mark::O] {
                    assert_eq!(
                        detector.has_win(&board, mark),
                        brute_force_win(&board, mark, win_length),
                        "size {size}, length {win_length}, mark {mark:?}:\n{board}"
                    );
                }
            }
        }
    }
}

#[test]
fn every_generated_line_wins_on_its_own() {
    for size in 3..=5 {
        for win_length in 2..=size {
            let detector = WinDetector::new(size, win_length).unwrap();
            for line in generate_lines(size, win_length) {
                let mut board = Board::new(size).unwrap();
                for pos in line.cells() {
                    board.place(pos, Mark::O).unwrap();
                }
                assert_eq!(detector.winner(&board), Some((Mark::O, line)));
                assert!(!detector.has_win(&board, Mark::X));
                for pos in line.cells() {
                    assert!(detector.wins_through(&board, pos, Mark::O));
                }

                // One cell short is never a win.
                let first = line.start;
                board.clear(first).unwrap();
                assert!(!detector.has_win(&board, Mark::O));
            }
        }
    }
}

#[test]
fn lone_marks_never_win() {
    for size in 3..=5 {
        let detector = WinDetector::new(size, 2).unwrap();
        let mut board = Board::new(size).unwrap();
        board.place(Position::new(0, 0), Mark::X).unwrap();
        board.place(Position::new(size - 1, size - 1), Mark::X).unwrap();
        assert!(!detector.has_win(&board, Mark::X));
    }
}
