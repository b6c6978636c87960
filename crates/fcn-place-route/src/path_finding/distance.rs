//! Distance functions between tiles
//!
//! Both ignore the layer: a crossing sits on the same position as the ground
//! tile below it.

use fcn_layout::Tile;

/// Number of cardinal steps between `source` and `target`
pub fn manhattan_distance(source: &Tile, target: &Tile) -> u64 {
    source.x.abs_diff(target.x) as u64 + source.y.abs_diff(target.y) as u64
}

/// Straight-line distance between `source` and `target`
pub fn euclidean_distance(source: &Tile, target: &Tile) -> f64 {
    let dx = source.x.abs_diff(target.x) as f64;
    let dy = source.y.abs_diff(target.y) as f64;
    dx.hypot(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Tile::new(1, 2, 0);
        let b = Tile::new(4, 0, 1);
        assert_eq!(manhattan_distance(&a, &b), 5);
        assert_eq!(manhattan_distance(&b, &a), 5);
        assert_eq!(manhattan_distance(&a, &a), 0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Tile::new(0, 0, 0);
        let b = Tile::new(3, 4, 0);
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-9);
        assert!(euclidean_distance(&a, &b) <= manhattan_distance(&a, &b) as f64);
    }
}
