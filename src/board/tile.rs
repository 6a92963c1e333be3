//! Tile kinds and their movement/shader properties

use serde::{Deserialize, Serialize};

/// Every tile kind the game engine can place on the board.
///
/// Block variants encode which directions the block may be pushed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileKind {
    #[default]
    Default,
    Wall,
    Player,
    PlayerOnExit,
    Exit,
    /// Pushable in every direction
    Block,
    BlockHorizontal,
    BlockVertical,
    BlockUp,
    BlockDown,
    BlockLeft,
    BlockRight,
    /// Gravity well that swallows blocks
    Hole,
}

impl TileKind {
    /// Float code consumed by the tile shader as `u_tileType`.
    ///
    /// The shader branches on ranges (`>= 3.0` is the block family), so the
    /// half-integer wall code and the ordering of the codes must not change
    /// without updating the shader.
    pub fn shader_code(self) -> f32 {
        match self {
            TileKind::Default => 0.0,
            TileKind::Wall => 0.5,
            TileKind::Player | TileKind::PlayerOnExit => 1.0,
            TileKind::Exit => 2.0,
            TileKind::Block
            | TileKind::BlockHorizontal
            | TileKind::BlockVertical
            | TileKind::BlockUp
            | TileKind::BlockDown
            | TileKind::BlockLeft
            | TileKind::BlockRight => 3.0,
            TileKind::Hole => 4.0,
        }
    }

    /// True for every pushable block variant
    pub fn is_block(self) -> bool {
        matches!(
            self,
            TileKind::Block
                | TileKind::BlockHorizontal
                | TileKind::BlockVertical
                | TileKind::BlockUp
                | TileKind::BlockDown
                | TileKind::BlockLeft
                | TileKind::BlockRight
        )
    }

    pub fn is_player(self) -> bool {
        matches!(self, TileKind::Player | TileKind::PlayerOnExit)
    }

    /// Kind drawn underneath the player when its cell is rendered as a tile
    pub fn floor(self) -> TileKind {
        match self {
            TileKind::Player => TileKind::Default,
            TileKind::PlayerOnExit => TileKind::Exit,
            other => other,
        }
    }

    pub fn can_move_up(self) -> bool {
        matches!(
            self,
            TileKind::Player
                | TileKind::PlayerOnExit
                | TileKind::Block
                | TileKind::BlockVertical
                | TileKind::BlockUp
        )
    }

    pub fn can_move_down(self) -> bool {
        matches!(
            self,
            TileKind::Player
                | TileKind::PlayerOnExit
                | TileKind::Block
                | TileKind::BlockVertical
                | TileKind::BlockDown
        )
    }

    pub fn can_move_left(self) -> bool {
        matches!(
            self,
            TileKind::Player
                | TileKind::PlayerOnExit
                | TileKind::Block
                | TileKind::BlockHorizontal
                | TileKind::BlockLeft
        )
    }

    pub fn can_move_right(self) -> bool {
        matches!(
            self,
            TileKind::Player
                | TileKind::PlayerOnExit
                | TileKind::Block
                | TileKind::BlockHorizontal
                | TileKind::BlockRight
        )
    }

    /// Movement affordance flags in shader order (up, down, left, right)
    pub fn move_flags(self) -> [f32; 4] {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        [
            flag(self.can_move_up()),
            flag(self.can_move_down()),
            flag(self.can_move_left()),
            flag(self.can_move_right()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCKS: [TileKind; 7] = [
        TileKind::Block,
        TileKind::BlockHorizontal,
        TileKind::BlockVertical,
        TileKind::BlockUp,
        TileKind::BlockDown,
        TileKind::BlockLeft,
        TileKind::BlockRight,
    ];

    #[test]
    fn test_shader_codes_are_exact() {
        assert_eq!(TileKind::Default.shader_code(), 0.0);
        assert_eq!(TileKind::Wall.shader_code(), 0.5);
        assert_eq!(TileKind::Player.shader_code(), 1.0);
        assert_eq!(TileKind::PlayerOnExit.shader_code(), 1.0);
        assert_eq!(TileKind::Exit.shader_code(), 2.0);
        assert_eq!(TileKind::Hole.shader_code(), 4.0);
        for kind in BLOCKS {
            assert!(kind.shader_code() >= 3.0, "{kind:?} below block range");
            assert!(kind.shader_code() < TileKind::Hole.shader_code());
            assert!(kind.is_block());
        }
    }

    #[test]
    fn test_directional_blocks_only_move_their_way() {
        assert!(TileKind::BlockUp.can_move_up());
        assert!(!TileKind::BlockUp.can_move_down());
        assert!(!TileKind::BlockUp.can_move_left());
        assert_eq!(TileKind::BlockHorizontal.move_flags(), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(TileKind::BlockVertical.move_flags(), [1.0, 1.0, 0.0, 0.0]);
        assert_eq!(TileKind::Block.move_flags(), [1.0; 4]);
        assert_eq!(TileKind::Wall.move_flags(), [0.0; 4]);
        assert_eq!(TileKind::Hole.move_flags(), [0.0; 4]);
    }

    #[test]
    fn test_player_floor() {
        assert_eq!(TileKind::Player.floor(), TileKind::Default);
        assert_eq!(TileKind::PlayerOnExit.floor(), TileKind::Exit);
        assert_eq!(TileKind::Wall.floor(), TileKind::Wall);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let kind: TileKind = serde_json::from_str("\"playerOnExit\"").unwrap();
        assert_eq!(kind, TileKind::PlayerOnExit);
        let kind: TileKind = serde_json::from_str("\"blockLeft\"").unwrap();
        assert_eq!(kind, TileKind::BlockLeft);
    }
}
