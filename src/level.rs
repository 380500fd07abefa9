//! Per-level speed and food target.

pub const SPEED_MIN: u32 = 1;
pub const SPEED_MAX: u32 = 100;
pub const DEFAULT_SPEED: u32 = 20;
pub const LEVEL_SPEED_STEP: u32 = 5;
pub const BASE_TARGET: u32 = 6;
pub const TARGET_GROWTH: u32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progression {
    pub speed_min: u32,
    pub speed_max: u32,
    pub level_speed_step: u32,
    pub base_target: u32,
    pub target_growth: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Progression {
            speed_min: SPEED_MIN,
            speed_max: SPEED_MAX,
            level_speed_step: LEVEL_SPEED_STEP,
            base_target: BASE_TARGET,
            target_growth: TARGET_GROWTH,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LevelParams {
    /// Moves per second.
    pub speed: u32,
    /// Food needed to clear the level.
    pub target: u32,
    pub move_interval_ms: f64,
}

impl Progression {
    /// Levels count from 1. Speed is capped, the target is not.
    pub fn derive_level(&self, level_index: u32, base_speed: u32) -> LevelParams {
        let steps = level_index.saturating_sub(1);
        let speed = base_speed
            .saturating_add(steps.saturating_mul(self.level_speed_step))
            .min(self.speed_max)
            .max(self.speed_min);
        let target = self.base_target.saturating_add(steps.saturating_mul(self.target_growth));

        LevelParams { speed, target, move_interval_ms: 1000.0 / speed as f64 }
    }

    pub fn clamp_speed(&self, speed: u32) -> u32 {
        speed.clamp(self.speed_min, self.speed_max)
    }
}

/// [`Progression::derive_level`] with the default constants.
pub fn derive_level(level_index: u32, base_speed: u32) -> LevelParams {
    Progression::default().derive_level(level_index, base_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_level_uses_base_speed() {
        let params = derive_level(1, 20);
        assert_eq!(params.speed, 20);
        assert_eq!(params.target, 6);
        assert_eq!(params.move_interval_ms, 50.0);
    }

    #[test]
    fn later_levels_speed_up_and_need_more_food() {
        let params = derive_level(3, 20);
        assert_eq!(params.speed, 30);
        assert_eq!(params.target, 10);
    }

    #[test]
    fn speed_is_capped_but_target_is_not() {
        let params = derive_level(20, 20);
        assert_eq!(params.speed, 100);
        assert_eq!(params.target, 6 + 19 * 2);
        assert_eq!(params.move_interval_ms, 10.0);
    }

    #[test]
    fn custom_progression() {
        let progression = Progression { level_speed_step: 1, target_growth: 0, ..Progression::default() };
        let params = progression.derive_level(4, 10);
        assert_eq!(params.speed, 13);
        assert_eq!(params.target, 6);
        assert_eq!(progression.clamp_speed(0), 1);
        assert_eq!(progression.clamp_speed(250), 100);
    }
}
