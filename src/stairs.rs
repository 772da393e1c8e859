use bracket_geometry::prelude::{Point, Rect};

use crate::map::rects_overlap;

/// Descent point of a floor. One per map; collision is a plain AABB test
/// against the tile-sized square, the caller drives the floor transition.
#[derive(Clone, Copy, Debug)]
pub struct Stairs {
    pub point: Point,
    tile_size: i32,
}

impl Stairs {
    pub fn new(point: Point, tile_size: i32) -> Self {
        Self { point, tile_size }
    }

    pub fn bounds(&self) -> Rect {
        Rect::with_size(
            self.point.x * self.tile_size,
            self.point.y * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    pub fn check_collision(&self, player_bounds: Rect) -> bool {
        rects_overlap(&self.bounds(), &player_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collides_with_overlapping_bounds() {
        let stairs = Stairs::new(Point::new(3, 4), 48);
        let on_tile = Rect::with_size(3 * 48, 4 * 48, 48, 48);
        assert!(stairs.check_collision(on_tile));
    }

    #[test]
    fn adjacent_tiles_do_not_collide() {
        let stairs = Stairs::new(Point::new(3, 4), 48);
        let beside = Rect::with_size(2 * 48, 4 * 48, 48, 48);
        let diagonal = Rect::with_size(2 * 48, 3 * 48, 48, 48);
        assert!(!stairs.check_collision(beside));
        assert!(!stairs.check_collision(diagonal));
    }

    #[test]
    fn ignores_distant_bounds() {
        let stairs = Stairs::new(Point::new(3, 4), 48);
        let far = Rect::with_size(10 * 48, 10 * 48, 48, 48);
        assert!(!stairs.check_collision(far));
    }
}
