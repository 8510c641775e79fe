use ndarray::{Array3, Axis};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A move is the flat index of a cell: `row * width + col`.
pub type Move = usize;

/// Number of feature planes produced by [`Board::current_state`].
pub const STATE_PLANES: usize = 4;

const DEFAULT_WIDTH: usize = 15;
const DEFAULT_HEIGHT: usize = 15;
const DEFAULT_WIN_LENGTH: usize = 5;

/// Axis steps checked by the win scan: horizontal, vertical, main diagonal, anti-diagonal.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Errors raised while constructing a board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid board {width}x{height} with win length {win_length}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        win_length: usize,
    },
}

/// The two stone colors. Black moves first unless the board is reset otherwise.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// Returns the other color.
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// The character used to draw this color's stones.
    pub fn stone(self) -> char {
        match self {
            Player::White => 'O',
            Player::Black => '@',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "White[O]"),
            Player::Black => write!(f, "Black[@]"),
        }
    }
}

/// Row/column coordinates of a cell.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

/// The state of a game as reported by [`Board::game_end`].
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum GameOutcome {
    /// The game is still ongoing.
    InProgress,
    /// The given color completed a line.
    Win(Player),
    /// Every cell is filled and nobody completed a line.
    Draw,
}

impl GameOutcome {
    /// True for a win or a draw.
    pub fn is_over(self) -> bool {
        self != GameOutcome::InProgress
    }

    /// The color that completed a line, if any.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Win(player) => Some(player),
            _ => None,
        }
    }

    /// Scores the outcome from `player`'s point of view: `1` for a win, `-1` for a loss,
    /// `0` for a draw or an unfinished game.
    pub fn value_for(self, player: Player) -> f64 {
        match self {
            GameOutcome::Win(winner) if winner == player => 1.0,
            GameOutcome::Win(_) => -1.0,
            _ => 0.0,
        }
    }
}

/// A connect-K board.
///
/// Stones are kept in a dense cell vector next to the move history, which doubles as the
/// undo stack. The set of available moves is ordered so that every consumer that iterates
/// it (expansion, rollouts) sees the same order for the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    win_length: usize,
    cells: Vec<Option<Player>>,
    moved: Vec<Move>,
    available: BTreeSet<Move>,
    current_player: Player,
}

impl Default for Board {
    /// A 15x15 board where five in a row wins, black to move.
    fn default() -> Self {
        Board::empty(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_WIN_LENGTH)
    }
}

impl Board {
    /// Creates an empty board with black to move.
    ///
    /// Fails when a dimension is zero or `win_length` does not fit on the board.
    pub fn new(width: usize, height: usize, win_length: usize) -> Result<Self, BoardError> {
        if width == 0 || height == 0 || win_length == 0 || win_length > width.min(height) {
            return Err(BoardError::InvalidDimensions {
                width,
                height,
                win_length,
            });
        }
        Ok(Board::empty(width, height, win_length))
    }

    fn empty(width: usize, height: usize, win_length: usize) -> Self {
        let total = width * height;
        Self {
            width,
            height,
            win_length,
            cells: vec![None; total],
            moved: Vec::with_capacity(total),
            available: (0..total).collect(),
            current_player: Player::Black,
        }
    }

    /// Clears every stone and hands the first move to `start_player`.
    pub fn reset(&mut self, start_player: Player) {
        *self = Board::empty(self.width, self.height, self.win_length);
        self.current_player = start_player;
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Stones in a row needed to win.
    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// `width * height`, also the number of distinct moves.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// The color to move next.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// The most recent move, `None` on an empty board.
    pub fn last_move(&self) -> Option<Move> {
        self.moved.last().copied()
    }

    /// Coordinates of [`last_move`](Self::last_move).
    pub fn last_move_location(&self) -> Option<Location> {
        self.last_move().and_then(|mv| self.move_to_location(mv))
    }

    /// Moves played so far, oldest first.
    pub fn moves(&self) -> &[Move] {
        &self.moved
    }

    /// Free cells in ascending order.
    pub fn available_moves(&self) -> &BTreeSet<Move> {
        &self.available
    }

    /// The stone on `mv`, `None` for a free or off-board cell.
    pub fn stone_at(&self, mv: Move) -> Option<Player> {
        self.cells.get(mv).copied().flatten()
    }

    /// True before the first move.
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty()
    }

    /// The cell an opening move goes to.
    pub fn center(&self) -> Move {
        self.cell_count() / 2
    }

    /// True iff `mv` is on the board and the cell is free.
    pub fn is_valid_move(&self, mv: Move) -> bool {
        self.available.contains(&mv)
    }

    pub fn move_to_location(&self, mv: Move) -> Option<Location> {
        (mv < self.cell_count()).then(|| Location {
            row: mv / self.width,
            col: mv % self.width,
        })
    }

    pub fn location_to_move(&self, row: usize, col: usize) -> Option<Move> {
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }

    /// Places a stone for the player to move. Returns `false` and leaves the board untouched
    /// when the move is occupied or off the board.
    pub fn play(&mut self, mv: Move) -> bool {
        if !self.available.remove(&mv) {
            return false;
        }
        self.cells[mv] = Some(self.current_player);
        self.moved.push(mv);
        self.current_player = self.current_player.opponent();
        true
    }

    /// Takes back the most recent move. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(mv) = self.moved.pop() else {
            return false;
        };
        self.cells[mv] = None;
        self.available.insert(mv);
        self.current_player = self.current_player.opponent();
        true
    }

    /// Encodes the position from the perspective of the player to move.
    ///
    /// Shape is `4 x height x width`:
    /// - plane 0: the current player's stones,
    /// - plane 1: the opponent's stones,
    /// - plane 2: a single 1 on the last move (all zeros on an empty board),
    /// - plane 3: all ones when black is to move, all zeros otherwise.
    pub fn current_state(&self) -> Array3<f32> {
        let mut state = Array3::<f32>::zeros((STATE_PLANES, self.height, self.width));
        for (mv, cell) in self.cells.iter().enumerate() {
            let Some(owner) = cell else {
                continue;
            };
            let plane = if *owner == self.current_player { 0 } else { 1 };
            state[[plane, mv / self.width, mv % self.width]] = 1.0;
        }
        if let Some(last) = self.last_move() {
            state[[2, last / self.width, last % self.width]] = 1.0;
        }
        if self.current_player == Player::Black {
            state.index_axis_mut(Axis(0), 3).fill(1.0);
        }
        state
    }

    /// Looks for a completed line through the last one or two moves.
    ///
    /// Every earlier move was already checked when it was played, so only the newest stones
    /// can have created a line. The second-to-last move is included so that a position
    /// built by replaying two moves without an intermediate check is still judged correctly.
    /// Boards with fewer than `2 * win_length - 1` stones cannot hold a line and are
    /// rejected without scanning.
    pub fn winner(&self) -> Option<Player> {
        if self.moved.len() < 2 * self.win_length - 1 {
            return None;
        }
        self.moved.iter().rev().take(2).find_map(|&mv| {
            let player = self.cells[mv]?;
            self.completes_line(mv, player).then_some(player)
        })
    }

    /// Reports whether the game is over and who won.
    pub fn game_end(&self) -> GameOutcome {
        if let Some(player) = self.winner() {
            GameOutcome::Win(player)
        } else if self.available.is_empty() {
            GameOutcome::Draw
        } else {
            GameOutcome::InProgress
        }
    }

    fn completes_line(&self, mv: Move, player: Player) -> bool {
        let row = (mv / self.width) as isize;
        let col = (mv % self.width) as isize;
        DIRECTIONS.iter().any(|&(dr, dc)| {
            let run = 1
                + self.run_length(row, col, dr, dc, player)
                + self.run_length(row, col, -dr, -dc, player);
            run >= self.win_length
        })
    }

    /// Counts same-colored stones stepping away from (row, col), stopping at the board edge.
    /// Capped at `win_length - 1` so the scan never looks further than a line can reach.
    fn run_length(&self, row: isize, col: isize, dr: isize, dc: isize, player: Player) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row + dr, col + dc);
        while count + 1 < self.win_length && self.stone_at_coords(r, c) == Some(player) {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    fn stone_at_coords(&self, row: isize, col: isize) -> Option<Player> {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return None;
        }
        self.cells[row as usize * self.width + col as usize]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current turn: {}", self.current_player)?;
        write!(f, "    ")?;
        for col in 0..self.width {
            write!(f, "{col:>4}")?;
        }
        writeln!(f)?;
        let last = self.last_move();
        for row in 0..self.height {
            write!(f, "{row:>4}")?;
            for col in 0..self.width {
                let mv = row * self.width + col;
                let cell = match self.cells[mv] {
                    None => "+".to_string(),
                    Some(player) if last == Some(mv) => format!("[{}]", player.stone()),
                    Some(player) => player.stone().to_string(),
                };
                write!(f, "{cell:>4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
