//! Sky exposure: is a subject out in the open?
//!
//! A subject is sheltered when it is deep enough below the top surface of
//! its column, or when enough cover blocks sit above its head. Leaves and
//! glass count as cover only when the rules say so.

use std::collections::{BTreeMap, HashMap};

use stormfront_core::config::ExposureConfig;
use stormfront_core::constants::DEFAULT_WORLD_MAX_HEIGHT;
use stormfront_core::types::Position;

/// Coarse block material as far as storm cover is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Air,
    Solid,
    Leaves,
    Glass,
    Liquid,
}

/// Column queries the exposure check needs from the host world.
pub trait WorldColumns {
    /// Top of the highest non-air block in the column at (x, y).
    fn surface_height(&self, x: f64, y: f64) -> f64;
    /// Block occupying the cell that contains (x, y, z).
    fn block_at(&self, x: f64, y: f64, z: f64) -> BlockKind;
    /// Height above which nothing is ever placed.
    fn max_height(&self) -> f64;
}

/// Cover-related exposure rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverRules {
    /// Depth below the surface at which a subject counts as underground.
    pub min_depth: f64,
    /// Overhead cover blocks needed for shelter (at least 1).
    pub min_cover_blocks: u32,
    pub leaves_are_cover: bool,
    pub glass_is_cover: bool,
}

impl From<&ExposureConfig> for CoverRules {
    fn from(config: &ExposureConfig) -> Self {
        Self {
            min_depth: config.min_depth,
            min_cover_blocks: config.min_cover_blocks,
            leaves_are_cover: config.leaves_are_cover,
            glass_is_cover: config.glass_is_cover,
        }
    }
}

impl Default for CoverRules {
    fn default() -> Self {
        Self::from(&ExposureConfig::default())
    }
}

impl CoverRules {
    fn is_cover(&self, block: BlockKind) -> bool {
        match block {
            BlockKind::Solid => true,
            BlockKind::Leaves => self.leaves_are_cover,
            BlockKind::Glass => self.glass_is_cover,
            BlockKind::Air | BlockKind::Liquid => false,
        }
    }
}

/// Top of the highest block above `floor` that the rules accept as cover,
/// or `floor` when there is none.
fn cover_surface(world: &dyn WorldColumns, pos: &Position, rules: &CoverRules) -> f64 {
    let floor = pos.z.floor();
    let top = world.surface_height(pos.x, pos.y).min(world.max_height());
    let mut cell = top.ceil() - 1.0;
    while cell >= floor {
        if rules.is_cover(world.block_at(pos.x, pos.y, cell)) {
            return cell + 1.0;
        }
        cell -= 1.0;
    }
    floor
}

/// True when a subject with feet at `pos` is exposed to the sky.
///
/// Depth is measured from the top cover block of the column, so a glass or
/// leaf canopy the rules do not count never buries the subject.
pub fn sky_exposed(world: &dyn WorldColumns, pos: &Position, rules: &CoverRules) -> bool {
    let surface = cover_surface(world, pos, rules);
    if surface - pos.z >= rules.min_depth {
        return false;
    }
    // Feet cell and head cell are the subject itself; scan above them.
    let first = pos.z.floor() + 2.0;
    if first >= surface {
        return true;
    }
    let needed = rules.min_cover_blocks.max(1);
    let top = surface;
    let mut cover = 0;
    let mut z = first;
    while z < top {
        if rules.is_cover(world.block_at(pos.x, pos.y, z)) {
            cover += 1;
            if cover >= needed {
                return false;
            }
        }
        z += 1.0;
    }
    true
}

/// Sparse in-memory world: flat solid ground plus individually placed blocks.
#[derive(Debug, Clone)]
pub struct BlockGrid {
    /// Top of the flat ground. Cells below it are solid.
    ground_level: f64,
    max_height: f64,
    columns: HashMap<(i64, i64), BTreeMap<i64, BlockKind>>,
}

impl BlockGrid {
    pub fn flat(ground_level: f64) -> Self {
        Self {
            ground_level,
            max_height: DEFAULT_WORLD_MAX_HEIGHT,
            columns: HashMap::new(),
        }
    }

    /// Place (or with `Air`, carve) a block in the cell containing (x, y, z).
    pub fn set_block(&mut self, x: f64, y: f64, z: f64, block: BlockKind) {
        let column = self.columns.entry(cell_xy(x, y)).or_default();
        column.insert(z.floor() as i64, block);
    }

    /// Fill a horizontal square roof of `block` at height `z`.
    pub fn place_roof(&mut self, cx: f64, cy: f64, half_width: i64, z: f64, block: BlockKind) {
        for dx in -half_width..=half_width {
            for dy in -half_width..=half_width {
                self.set_block(cx + dx as f64, cy + dy as f64, z, block);
            }
        }
    }

    pub fn ground_level(&self) -> f64 {
        self.ground_level
    }
}

impl WorldColumns for BlockGrid {
    fn surface_height(&self, x: f64, y: f64) -> f64 {
        let placed_top = self
            .columns
            .get(&cell_xy(x, y))
            .and_then(|column| {
                column
                    .iter()
                    .rev()
                    .find(|(_, block)| **block != BlockKind::Air)
                    .map(|(z, _)| *z as f64 + 1.0)
            })
            .unwrap_or(f64::NEG_INFINITY);
        placed_top.max(self.ground_level)
    }

    fn block_at(&self, x: f64, y: f64, z: f64) -> BlockKind {
        let cell_z = z.floor() as i64;
        if let Some(block) = self
            .columns
            .get(&cell_xy(x, y))
            .and_then(|column| column.get(&cell_z))
        {
            return *block;
        }
        if (cell_z as f64) < self.ground_level {
            BlockKind::Solid
        } else {
            BlockKind::Air
        }
    }

    fn max_height(&self) -> f64 {
        self.max_height
    }
}

fn cell_xy(x: f64, y: f64) -> (i64, i64) {
    (x.floor() as i64, y.floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: f64 = 64.0;

    fn standing_on_ground() -> Position {
        Position::new(0.5, 0.5, GROUND)
    }

    #[test]
    fn open_field_is_exposed() {
        let grid = BlockGrid::flat(GROUND);
        assert!(sky_exposed(&grid, &standing_on_ground(), &CoverRules::default()));
    }

    #[test]
    fn solid_roof_shelters() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.place_roof(0.5, 0.5, 2, GROUND + 4.0, BlockKind::Solid);
        assert!(!sky_exposed(&grid, &standing_on_ground(), &CoverRules::default()));
    }

    #[test]
    fn glass_roof_depends_on_rules() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.place_roof(0.5, 0.5, 1, GROUND + 3.0, BlockKind::Glass);
        let mut rules = CoverRules::default();
        assert!(!sky_exposed(&grid, &standing_on_ground(), &rules));
        rules.glass_is_cover = false;
        assert!(sky_exposed(&grid, &standing_on_ground(), &rules));
    }

    #[test]
    fn leaves_depend_on_rules() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.set_block(0.5, 0.5, GROUND + 6.0, BlockKind::Leaves);
        let rules = CoverRules {
            leaves_are_cover: false,
            ..CoverRules::default()
        };
        assert!(sky_exposed(&grid, &standing_on_ground(), &rules));
        assert!(!sky_exposed(&grid, &standing_on_ground(), &CoverRules::default()));
    }

    #[test]
    fn high_glass_roof_is_not_ground_when_glass_is_not_cover() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.place_roof(0.5, 0.5, 1, GROUND + 10.0, BlockKind::Glass);
        let rules = CoverRules {
            glass_is_cover: false,
            ..CoverRules::default()
        };
        assert!(sky_exposed(&grid, &standing_on_ground(), &rules));
        assert!(!sky_exposed(&grid, &standing_on_ground(), &CoverRules::default()));
    }

    #[test]
    fn high_canopy_is_not_ground_when_leaves_are_not_cover() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.set_block(0.5, 0.5, GROUND + 12.0, BlockKind::Leaves);
        let rules = CoverRules {
            leaves_are_cover: false,
            ..CoverRules::default()
        };
        assert!(sky_exposed(&grid, &standing_on_ground(), &rules));
    }

    #[test]
    fn depth_under_solid_ground_ignores_glass_above() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.set_block(0.5, 0.5, GROUND + 20.0, BlockKind::Glass);
        let rules = CoverRules {
            glass_is_cover: false,
            ..CoverRules::default()
        };
        let pos = Position::new(0.5, 0.5, GROUND - 10.0);
        assert!(!sky_exposed(&grid, &pos, &rules));
    }

    #[test]
    fn liquid_is_not_cover() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.set_block(0.5, 0.5, GROUND + 5.0, BlockKind::Liquid);
        assert!(sky_exposed(&grid, &standing_on_ground(), &CoverRules::default()));
    }

    #[test]
    fn deep_underground_is_sheltered() {
        let grid = BlockGrid::flat(GROUND);
        let pos = Position::new(0.5, 0.5, GROUND - 20.0);
        assert!(!sky_exposed(&grid, &pos, &CoverRules::default()));
    }

    #[test]
    fn multiple_cover_blocks_required() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.set_block(0.5, 0.5, GROUND + 3.0, BlockKind::Solid);
        let rules = CoverRules {
            min_cover_blocks: 2,
            ..CoverRules::default()
        };
        assert!(sky_exposed(&grid, &standing_on_ground(), &rules));
        grid.set_block(0.5, 0.5, GROUND + 7.0, BlockKind::Leaves);
        assert!(!sky_exposed(&grid, &standing_on_ground(), &rules));
    }

    #[test]
    fn block_at_head_height_is_ignored() {
        let mut grid = BlockGrid::flat(GROUND);
        grid.set_block(0.5, 0.5, GROUND + 1.0, BlockKind::Solid);
        assert!(sky_exposed(&grid, &standing_on_ground(), &CoverRules::default()));
    }

    #[test]
    fn surface_height_tracks_placed_blocks() {
        let mut grid = BlockGrid::flat(GROUND);
        assert_eq!(grid.surface_height(0.5, 0.5), GROUND);
        grid.set_block(0.5, 0.5, 100.0, BlockKind::Solid);
        assert_eq!(grid.surface_height(0.5, 0.5), 101.0);
        grid.set_block(0.5, 0.5, 100.0, BlockKind::Air);
        assert_eq!(grid.surface_height(0.5, 0.5), GROUND);
    }
}
