//! Region protection queries.
//!
//! The host injects an implementation; subjects standing in a protected
//! region are never affected by storms.

use stormfront_core::types::Position;

/// "Is this point protected from storms?"
pub trait ProtectionOracle {
    fn is_protected(&self, pos: &Position) -> bool;
}

/// No protected regions anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unprotected;

impl ProtectionOracle for Unprotected {
    fn is_protected(&self, _pos: &Position) -> bool {
        false
    }
}

/// Axis-aligned box, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min: Position,
    pub max: Position,
}

impl Region {
    pub fn new(min: Position, max: Position) -> Self {
        Self {
            min: Position::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Position::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    pub fn contains(&self, pos: &Position) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }
}

/// A fixed list of protected regions.
#[derive(Debug, Clone, Default)]
pub struct ProtectedRegions(pub Vec<Region>);

impl ProtectionOracle for ProtectedRegions {
    fn is_protected(&self, pos: &Position) -> bool {
        self.0.iter().any(|region| region.contains(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_normalizes_corners() {
        let r = Region::new(Position::new(10.0, 10.0, 100.0), Position::new(-10.0, -10.0, 0.0));
        assert!(r.contains(&Position::new(0.0, 0.0, 50.0)));
        assert!(r.contains(&Position::new(10.0, -10.0, 0.0)));
        assert!(!r.contains(&Position::new(10.1, 0.0, 50.0)));
    }

    #[test]
    fn protected_regions_any_match() {
        let oracle = ProtectedRegions(vec![
            Region::new(Position::new(0.0, 0.0, 0.0), Position::new(5.0, 5.0, 5.0)),
            Region::new(Position::new(100.0, 100.0, 0.0), Position::new(105.0, 105.0, 5.0)),
        ]);
        assert!(oracle.is_protected(&Position::new(102.0, 101.0, 1.0)));
        assert!(!oracle.is_protected(&Position::new(50.0, 50.0, 1.0)));
        assert!(!Unprotected.is_protected(&Position::new(1.0, 1.0, 1.0)));
    }
}
