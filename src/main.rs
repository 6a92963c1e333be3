//! Glow Grid entry point
//!
//! On the web the library's `GridCanvas` is the entry point and this binary
//! is empty. Natively it replays a short scripted level through the engine
//! and logs what each frame would draw; no GPU is involved.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glow_grid::board::{BoardSnapshot, Cell, GridCoord, TileKind, VictoryRule};
    use glow_grid::renderer::{DrawStage, FramePlan};
    use glow_grid::{GridEngine, Settings};

    const CANVAS: (f32, f32) = (1000.0, 600.0);
    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// One-row corridor: player, block, hole, exit.
    ///
    /// `step` is the number of moves taken; the second push drops the block
    /// into the hole.
    fn level(step: u32) -> BoardSnapshot {
        let player_x = step.min(4) as i32;
        let mut row = vec![
            Cell::new(TileKind::Default),
            Cell::new(TileKind::Default),
            Cell::new(TileKind::Default).with_block(TileKind::BlockHorizontal),
            Cell::new(TileKind::Hole),
            Cell::new(TileKind::Exit),
        ];
        if step >= 2 {
            row[2].block = None;
            row[3] = Cell::new(TileKind::Hole).with_block_in_hole(TileKind::BlockHorizontal);
        }
        for (x, cell) in row.iter_mut().enumerate().take(player_x as usize) {
            cell.text.push(x as u32);
        }
        let here = &mut row[player_x as usize];
        here.tile_type = if here.tile_type == TileKind::Exit {
            TileKind::PlayerOnExit
        } else {
            TileKind::Player
        };

        let wall_row = vec![Cell::new(TileKind::Wall); 5];
        BoardSnapshot {
            cells: vec![wall_row.clone(), row, wall_row],
            player: GridCoord::new(player_x, 1),
            move_count: step,
            least_moves: 4,
            complete: player_x == 4,
            victory_rule: VictoryRule::ReachExitInLeastMoves,
        }
    }

    fn summarize(time: f64, plan: &FramePlan) {
        let player = plan.draws.last().map(|d| d.uniforms.current_pos);
        log::info!(
            "t={:>6.0}ms draws={:>2} blocks={} composite={} floating={} player={:?} shadow=({:.2}, {:.2}) victory={:.2}",
            time,
            plan.draws.len(),
            plan.count(DrawStage::BlockOverlay),
            plan.count(DrawStage::FadeComposite),
            plan.count(DrawStage::FloatingBlocks),
            player.unwrap_or_default(),
            plan.globals.shadow_pos[0],
            plan.globals.shadow_pos[1],
            plan.globals.victory_time,
        );
    }

    pub fn run() {
        let settings = Settings::load();
        log::info!("Quality preset: {}", settings.quality.as_str());
        let mut engine = GridEngine::with_seed(settings, 42);
        let mut time = 0.0;
        engine.apply_state(level(0), time);

        for step in 1..=4 {
            let report = engine.apply_state(level(step), time);
            log::info!("Move {}: {:?}", step, report);
            // Long enough for the slide; the last move also runs the victory fade
            let frames = if step == 4 { 360 } else { 30 };
            for frame in 0..frames {
                if let Some(plan) = engine.frame(time, CANVAS) {
                    if frame % 6 == 0 {
                        summarize(time, &plan);
                    }
                }
                time += FRAME_MS;
            }
        }

        log::info!("Replay finished at {:.0}ms", time);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Glow Grid (native) starting headless replay...");
    log::info!("The interactive renderer runs in the browser via GridCanvas");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is GridCanvas::create, this is just to satisfy the compiler
}
