//! The six gauntlet level rule sets
//!
//! Each level is headless objective logic behind [`LevelRules`]: spawns and
//! hazards run off the lifecycle's timer queue and seeded RNG, so a whole
//! attempt replays identically from the same snapshot and seed.

pub mod burning_monk;
pub mod godmode;
pub mod jin_sakai;
pub mod pixel_boss;
pub mod ronin;
pub mod snap;

pub use burning_monk::BurningMonk;
pub use godmode::Godmode;
pub use jin_sakai::JinSakai;
pub use pixel_boss::PixelBoss;
pub use ronin::Ronin45;
pub use snap::Snap;

use crate::level::{LevelId, LevelRules};

/// Build a fresh rule set for one level.
pub fn rules_for(level: LevelId) -> Box<dyn LevelRules> {
    match level {
        LevelId::BurningMonk => Box::new(BurningMonk::new()),
        LevelId::Snap => Box::new(Snap::new()),
        LevelId::PixelBoss => Box::new(PixelBoss::new()),
        LevelId::JinSakai => Box::new(JinSakai::new()),
        LevelId::Ronin45 => Box::new(Ronin45::new()),
        LevelId::Godmode => Box::new(Godmode::new()),
    }
}
