//! Time-boxed completion and victory effects

use rand::Rng;

use crate::consts::{PLAYER_COMPLETE_WINDOW, VICTORY_DURATION, VICTORY_FADE_IN, VICTORY_FADE_OUT};
use crate::ms_to_secs;

/// Player completion timer
///
/// Starts on the first frame the completion predicate holds and resets as
/// soon as it stops holding.
#[derive(Debug, Clone, Default)]
pub struct PlayerEffects {
    complete_since: Option<f64>,
}

impl PlayerEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, complete: bool, now: f64) {
        match (complete, self.complete_since) {
            (true, None) => self.complete_since = Some(now),
            (false, Some(_)) => self.complete_since = None,
            _ => {}
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete_since.is_some()
    }

    /// Seconds since completion inside the shake window, -1 otherwise
    pub fn complete_time(&self, now: f64) -> f32 {
        match self.complete_since {
            Some(since) => {
                let elapsed = ms_to_secs(now - since);
                if (0.0..=PLAYER_COMPLETE_WINDOW).contains(&elapsed) {
                    elapsed
                } else {
                    -1.0
                }
            }
            None => -1.0,
        }
    }

    pub fn reset(&mut self) {
        self.complete_since = None;
    }
}

/// The two mutually exclusive victory overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VictoryEffect {
    #[default]
    Bloom,
    Ripple,
}

impl VictoryEffect {
    pub fn shader_code(self) -> f32 {
        match self {
            VictoryEffect::Bloom => 0.0,
            VictoryEffect::Ripple => 1.0,
        }
    }
}

/// Victory overlay clock
///
/// The effect variant is drawn once per solve and held until the level is
/// no longer solved.
#[derive(Debug, Clone, Default)]
pub struct VictoryTracker {
    started: Option<f64>,
    effect: VictoryEffect,
}

impl VictoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<R: Rng + ?Sized>(&mut self, solved: bool, now: f64, rng: &mut R) {
        if solved {
            if self.started.is_none() {
                self.started = Some(now);
                self.effect = if rng.random_bool(0.5) {
                    VictoryEffect::Ripple
                } else {
                    VictoryEffect::Bloom
                };
                log::info!("Level solved, victory effect {:?}", self.effect);
            }
        } else {
            self.started = None;
        }
    }

    pub fn effect(&self) -> VictoryEffect {
        self.effect
    }

    /// Seconds into the victory animation while it runs
    pub fn elapsed(&self, now: f64) -> Option<f32> {
        let started = self.started?;
        let elapsed = ms_to_secs(now - started);
        (0.0..=VICTORY_DURATION).contains(&elapsed).then_some(elapsed)
    }

    /// `u_victoryTime`: seconds into the animation, -1 when idle
    pub fn victory_time(&self, now: f64) -> f32 {
        self.elapsed(now).unwrap_or(-1.0)
    }

    /// Fade envelope in [0, 1]: ramps in over 0.1 s and out over the final second
    pub fn intensity(&self, now: f64) -> f32 {
        let Some(elapsed) = self.elapsed(now) else {
            return 0.0;
        };
        let fade_in = (elapsed / VICTORY_FADE_IN).min(1.0);
        let fade_out = ((VICTORY_DURATION - elapsed) / VICTORY_FADE_OUT).clamp(0.0, 1.0);
        fade_in.min(fade_out)
    }

    pub fn reset(&mut self) {
        self.started = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_complete_timer_window() {
        let mut effects = PlayerEffects::new();
        assert_eq!(effects.complete_time(0.0), -1.0);

        effects.update(true, 1000.0);
        effects.update(true, 1200.0); // does not restart
        assert!((effects.complete_time(1300.0) - 0.3).abs() < 1e-6);
        assert_eq!(effects.complete_time(1700.0), -1.0);

        effects.update(false, 1800.0);
        assert!(!effects.is_complete());
        effects.update(true, 2000.0);
        assert_eq!(effects.complete_time(2000.0), 0.0);
    }

    #[test]
    fn test_victory_envelope() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut victory = VictoryTracker::new();
        victory.update(true, 0.0, &mut rng);

        assert_eq!(victory.intensity(0.0), 0.0);
        assert!((victory.intensity(50.0) - 0.5).abs() < 1e-5);
        assert_eq!(victory.intensity(2000.0), 1.0);
        assert!((victory.intensity(4500.0) - 0.5).abs() < 1e-5);
        assert_eq!(victory.intensity(6000.0), 0.0);
        assert_eq!(victory.victory_time(6000.0), -1.0);
        assert!((victory.victory_time(1000.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_victory_effect_held_for_solve() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut victory = VictoryTracker::new();
        victory.update(true, 0.0, &mut rng);
        let chosen = victory.effect();
        for t in 1..50 {
            victory.update(true, t as f64 * 16.0, &mut rng);
            assert_eq!(victory.effect(), chosen);
        }
        // Still solved past the animation: no restart
        victory.update(true, 9000.0, &mut rng);
        assert_eq!(victory.victory_time(9000.0), -1.0);

        victory.update(false, 9100.0, &mut rng);
        victory.update(true, 9200.0, &mut rng);
        assert_eq!(victory.victory_time(9200.0), 0.0);
    }

    #[test]
    fn test_victory_selection_reproducible_with_seed() {
        let pick = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut victory = VictoryTracker::new();
            victory.update(true, 0.0, &mut rng);
            victory.effect()
        };
        assert_eq!(pick(11), pick(11));
    }
}
