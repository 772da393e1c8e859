use bracket_geometry::prelude::Point;

use super::resources::OccupancyIndex;
use crate::map::DungeonMap;

/// Result of one pursuit step. Pathing never fails loudly or silently; a
/// stuck enemy reports why and holds position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(Point),
    /// The step would land on the player's tile; the enemy stays put and
    /// the caller applies contact damage.
    Contact,
    /// Walkable candidates exist but are occupied this tick.
    Blocked,
    /// Every candidate tile is a wall.
    NoPath,
}

/// Greedy one-tile step toward the player. The axis with the greater
/// distance is tried first, horizontal on ties, then the other axis.
pub fn pursuit_step(
    from: Point,
    player: Point,
    map: &DungeonMap,
    occupancy: &OccupancyIndex,
) -> StepOutcome {
    let dx = (player.x - from.x).clamp(-1, 1);
    let dy = (player.y - from.y).clamp(-1, 1);
    if dx == 0 && dy == 0 {
        // Already sharing the player's tile (the player stepped onto us).
        return StepOutcome::Contact;
    }

    let abs_x = (player.x - from.x).abs();
    let abs_y = (player.y - from.y).abs();
    let axes = if abs_x >= abs_y {
        [Point::new(dx, 0), Point::new(0, dy)]
    } else {
        [Point::new(0, dy), Point::new(dx, 0)]
    };

    let mut saw_occupied = false;
    for dir in axes {
        if dir == Point::new(0, 0) {
            continue;
        }
        let target = Point::new(from.x + dir.x, from.y + dir.y);
        if target == player {
            return StepOutcome::Contact;
        }
        if !map.is_walkable(target) {
            continue;
        }
        if occupancy.is_occupied(target) {
            saw_occupied = true;
            continue;
        }
        return StepOutcome::Moved(target);
    }

    if saw_occupied {
        StepOutcome::Blocked
    } else {
        StepOutcome::NoPath
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Layout;
    use bracket_geometry::prelude::Rect;
    use specs::prelude::{Builder, World, WorldExt};

    fn arena(width: i32, height: i32) -> DungeonMap {
        let layout = Layout {
            width,
            height,
            rooms: vec![Rect::with_size(1, 1, width - 2, height - 2)],
            corridors: Vec::new(),
            spawn: Point::new(1, 1),
            stairs: Point::new(width - 2, height - 2),
        };
        DungeonMap::from_layout(&layout, 48, 0)
    }

    fn dummy_entity() -> specs::prelude::Entity {
        let mut world = World::new();
        world.create_entity().build()
    }

    #[test]
    fn prefers_the_axis_with_greater_distance() {
        let map = arena(20, 20);
        let occupancy = OccupancyIndex::default();
        // Player at (6,5), enemy at (8,5): pure horizontal pursuit.
        let step = pursuit_step(Point::new(8, 5), Point::new(6, 5), &map, &occupancy);
        assert_eq!(step, StepOutcome::Moved(Point::new(7, 5)));
    }

    #[test]
    fn horizontal_wins_on_diagonal_ties() {
        let map = arena(20, 20);
        let occupancy = OccupancyIndex::default();
        let step = pursuit_step(Point::new(8, 8), Point::new(5, 5), &map, &occupancy);
        assert_eq!(step, StepOutcome::Moved(Point::new(7, 8)));
    }

    #[test]
    fn falls_back_to_the_other_axis_when_occupied() {
        let map = arena(20, 20);
        let mut occupancy = OccupancyIndex::default();
        occupancy.insert(Point::new(7, 8), dummy_entity());
        let step = pursuit_step(Point::new(8, 8), Point::new(5, 5), &map, &occupancy);
        assert_eq!(step, StepOutcome::Moved(Point::new(8, 7)));
    }

    #[test]
    fn reports_blocked_when_all_candidates_are_occupied() {
        let map = arena(20, 20);
        let mut occupancy = OccupancyIndex::default();
        occupancy.insert(Point::new(7, 8), dummy_entity());
        occupancy.insert(Point::new(8, 7), dummy_entity());
        let step = pursuit_step(Point::new(8, 8), Point::new(5, 5), &map, &occupancy);
        assert_eq!(step, StepOutcome::Blocked);
    }

    #[test]
    fn reports_no_path_against_walls() {
        let map = arena(20, 20);
        let occupancy = OccupancyIndex::default();
        // Enemy in the top-left floor corner; both candidates toward the
        // upper-left point into the boundary walls.
        let step = pursuit_step(Point::new(1, 1), Point::new(0, 0), &map, &occupancy);
        assert_eq!(step, StepOutcome::NoPath);
    }

    #[test]
    fn adjacent_enemy_reports_contact_instead_of_moving() {
        let map = arena(20, 20);
        let occupancy = OccupancyIndex::default();
        let step = pursuit_step(Point::new(6, 5), Point::new(5, 5), &map, &occupancy);
        assert_eq!(step, StepOutcome::Contact);
    }

    #[test]
    fn co_located_enemy_reports_contact() {
        let map = arena(20, 20);
        let occupancy = OccupancyIndex::default();
        let step = pursuit_step(Point::new(5, 5), Point::new(5, 5), &map, &occupancy);
        assert_eq!(step, StepOutcome::Contact);
    }
}
