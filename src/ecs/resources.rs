use std::collections::HashMap;

use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

/// Tile -> enemy spatial index. The single source of truth for "is this
/// tile taken" during a resolve tick; every enemy move goes through
/// `relocate` so the index never drifts from the positions.
#[derive(Default)]
pub struct OccupancyIndex {
    tiles: HashMap<Point, Entity>,
}

impl OccupancyIndex {
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    pub fn insert(&mut self, point: Point, entity: Entity) {
        self.tiles.insert(point, entity);
    }

    pub fn relocate(&mut self, from: Point, to: Point, entity: Entity) {
        self.tiles.remove(&from);
        self.tiles.insert(to, entity);
    }

    pub fn entity_at(&self, point: Point) -> Option<Entity> {
        self.tiles.get(&point).copied()
    }

    pub fn is_occupied(&self, point: Point) -> bool {
        self.tiles.contains_key(&point)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (&Point, &Entity)> {
        self.tiles.iter()
    }
}

#[derive(Default)]
pub struct EventLog {
    pub entries: Vec<String>,
}

impl EventLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push(entry.into());
    }
}
