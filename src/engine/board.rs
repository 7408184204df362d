//! Piece placement and attack queries.
//!
//! `Board` is a 64-entry mailbox (`Option<Piece>` per square) with redundant
//! per-colour occupancy bitboards, so place/remove/query are O(1) and
//! sliding rays can test blockers with a single bit probe.

use rand::Rng;

use crate::engine::attacks;
use crate::engine::types::{Bitboard, Color, Piece, PieceType, Square};

/// Piece placement on the 64 squares, LERF order (a1 = 0, h8 = 63).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
    /// Per-colour occupancy, kept in sync with `squares`.
    occupied: [Bitboard; 2],
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [None; 64],
            occupied: [Bitboard::EMPTY; 2],
        }
    }

    /// The standard initial array.
    pub fn standard() -> Self {
        Self::with_back_rank(&STANDARD_BACK_RANK)
    }

    /// A Fischer-random (Chess960) initial array drawn from `rng`.
    pub fn fischer<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_back_rank(&fischer_back_rank(rng))
    }

    /// Pawns on ranks 2 and 7, `back` on rank 1, mirrored on rank 8.
    pub fn with_back_rank(back: &[PieceType; 8]) -> Self {
        let mut board = Board::empty();
        for (file, &kind) in back.iter().enumerate() {
            let file = file as u8;
            for (color, home, pawns) in [(Color::White, 0, 1), (Color::Black, 7, 6)] {
                if let Some(sq) = Square::from_file_rank(file, home) {
                    board.put(sq, Piece::new(color, kind));
                }
                if let Some(sq) = Square::from_file_rank(file, pawns) {
                    board.put(sq, Piece::new(color, PieceType::Pawn));
                }
            }
        }
        board
    }
}

const STANDARD_BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Random Chess960 back rank: bishops on opposite colours, queen and
/// knights anywhere, king between the rooks on the three files left over.
pub fn fischer_back_rank<R: Rng + ?Sized>(rng: &mut R) -> [PieceType; 8] {
    let mut back = [PieceType::Pawn; 8];
    let mut free: Vec<usize> = (0..8).collect();

    // a1 is dark: even files are dark, odd files light.
    let dark = rng.gen_range(0..4) * 2;
    let light = rng.gen_range(0..4) * 2 + 1;
    for file in [dark, light] {
        back[file] = PieceType::Bishop;
        free.retain(|&f| f != file);
    }

    for kind in [PieceType::Queen, PieceType::Knight, PieceType::Knight] {
        let file = free.remove(rng.gen_range(0..free.len()));
        back[file] = kind;
    }

    // `free` is still ascending.
    for (file, kind) in free
        .into_iter()
        .zip([PieceType::Rook, PieceType::King, PieceType::Rook])
    {
        back[file] = kind;
    }
    back
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Piece manipulation
// ---------------------------------------------------------------------------

impl Board {
    /// Place a piece, returning whatever stood there before.
    #[inline]
    pub fn put(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        let previous = self.remove(sq);
        self.squares[sq.index()] = Some(piece);
        self.occupied[piece.color.index()].set(sq);
        previous
    }

    /// Remove and return the piece on `sq`.
    #[inline]
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let previous = self.squares[sq.index()].take();
        if let Some(p) = previous {
            self.occupied[p.color.index()].clear(sq);
        }
        previous
    }

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_none()
    }

    /// All occupied squares.
    #[inline]
    pub fn occupancy(&self) -> Bitboard {
        self.occupied[0] | self.occupied[1]
    }

    /// Squares occupied by one colour.
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    /// Pieces of one colour with their squares, in ascending square order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied[color.index()]
            .iter()
            .filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Squares holding the given piece.
    pub fn squares_of(&self, piece: Piece) -> impl Iterator<Item = Square> + '_ {
        self.pieces(piece.color)
            .filter(move |&(_, p)| p == piece)
            .map(|(sq, _)| sq)
    }

    /// Number of pieces of one colour and type.
    pub fn count(&self, color: Color, kind: PieceType) -> usize {
        self.squares_of(Piece::new(color, kind)).count()
    }

    /// The king's square, when exactly one king of that colour is present.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let mut kings = self.squares_of(Piece::new(color, PieceType::King));
        match (kings.next(), kings.next()) {
            (Some(sq), None) => Some(sq),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Attack detection
// ---------------------------------------------------------------------------

impl Board {
    /// Squares attacked by the piece on `sq` (empty if the square is empty).
    pub fn attacks_from(&self, sq: Square) -> Bitboard {
        match self.piece_at(sq) {
            Some(piece) => attacks::piece_attacks(piece, sq, self.occupancy()),
            None => Bitboard::EMPTY,
        }
    }

    /// Union of every square attacked by colour `by`.
    pub fn attacked_squares(&self, by: Color) -> Bitboard {
        let occ = self.occupancy();
        self.pieces(by).fold(Bitboard::EMPTY, |acc, (sq, piece)| {
            acc | attacks::piece_attacks(piece, sq, occ)
        })
    }

    /// Is `sq` attacked by any piece of colour `by`?
    ///
    /// Probes outward from `sq` with each attack pattern instead of
    /// building the full attack set.
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let occ = self.occupancy();
        let them = self.occupied[by.index()];
        PieceType::ALL.iter().any(|&kind| {
            // A pawn of `by` attacks `sq` iff a pawn of the other colour on
            // `sq` would attack the pawn's square.
            let probe = Piece::new(!by, kind);
            let hits = attacks::piece_attacks(probe, sq, occ) & them;
            hits.iter()
                .any(|from| self.piece_at(from) == Some(Piece::new(by, kind)))
        })
    }

    /// Is the king of `color` attacked? `false` when the king is missing.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|k| self.is_square_attacked(k, !color))
    }
}

// ---------------------------------------------------------------------------
// Board display (8×8 text grid)
// ---------------------------------------------------------------------------

impl Board {
    /// Render the board as text, rank 8 at the top, with a file legend.
    pub fn render(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8u8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8u8 {
                let ch = Square::from_file_rank(file, rank)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', Piece::to_char);
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
