#![allow(dead_code)]

use std::collections::HashSet;

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;

use crate::map::{DungeonMap, TileKind, rects_overlap};

const ANIM_FRAMES: u64 = 4;
const ANIM_PERIOD: f32 = 8.0;

/// One floor spike. Armed until stepped on, then permanently inert; the
/// animation clock keeps running either way but is purely visual.
#[derive(Clone, Debug)]
pub struct Trap {
    pub point: Point,
    pub damage: i32,
    pub armed: bool,
    anim_clock: f32,
}

impl Trap {
    fn new(point: Point, damage: i32) -> Self {
        Self {
            point,
            damage,
            armed: true,
            anim_clock: 0.0,
        }
    }

    pub fn frame(&self) -> u64 {
        (self.anim_clock / ANIM_PERIOD) as u64 % ANIM_FRAMES
    }
}

pub struct TrapManager {
    tile_size: i32,
    damage: i32,
    traps: Vec<Trap>,
}

impl TrapManager {
    pub fn new(tile_size: i32, damage: i32) -> Self {
        Self {
            tile_size,
            damage,
            traps: Vec::new(),
        }
    }

    /// Replaces the previous floor's traps. Traps land on floor tiles of
    /// rooms other than the spawn room, one per tile at most. Rejection
    /// sampling is bounded, so crowded maps may end up with fewer than
    /// `count` traps.
    pub fn generate_traps(
        &mut self,
        map: &DungeonMap,
        count: usize,
        rng: &mut RandomNumberGenerator,
    ) {
        self.traps.clear();
        if map.rooms.len() < 2 {
            return;
        }

        let mut used: HashSet<Point> = HashSet::new();
        let mut attempts = count * 10;

        while self.traps.len() < count && attempts > 0 {
            attempts -= 1;
            let room_idx = rng.range(1, map.rooms.len() as i32) as usize;
            let room = map.rooms[room_idx];
            let x = rng.range(room.x1, room.x2);
            let y = rng.range(room.y1, room.y2);
            let point = Point::new(x, y);

            if map.kind_at(x, y) != TileKind::Floor {
                continue;
            }
            if !used.insert(point) {
                continue;
            }
            self.traps.push(Trap::new(point, self.damage));
        }
    }

    /// Damage from at most one armed trap intersecting `player_bounds`
    /// (pixel space); that trap is disarmed for good. Returns 0 on no hit.
    pub fn check_collisions(&mut self, player_bounds: Rect) -> i32 {
        for trap in self.traps.iter_mut().filter(|t| t.armed) {
            if rects_overlap(&trap_bounds(trap.point, self.tile_size), &player_bounds) {
                trap.armed = false;
                return trap.damage;
            }
        }
        0
    }

    /// Visual state only; never changes arming or damage.
    pub fn update(&mut self, dt: f32) {
        for trap in &mut self.traps {
            trap.anim_clock += dt;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trap> {
        self.traps.iter()
    }

    pub fn len(&self) -> usize {
        self.traps.len()
    }
}

fn trap_bounds(point: Point, tile_size: i32) -> Rect {
    Rect::with_size(
        point.x * tile_size,
        point.y * tile_size,
        tile_size,
        tile_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, DEFAULT_TILE_SIZE, DungeonMap};

    fn setup(seed: u64) -> (DungeonMap, TrapManager) {
        let map = DungeonMap::generate(
            DEFAULT_MAP_WIDTH,
            DEFAULT_MAP_HEIGHT,
            DEFAULT_TILE_SIZE,
            seed,
        );
        let mut traps = TrapManager::new(DEFAULT_TILE_SIZE, 5);
        let mut rng = RandomNumberGenerator::seeded(seed ^ 0x7a2b);
        traps.generate_traps(&map, 30, &mut rng);
        (map, traps)
    }

    #[test]
    fn traps_sit_on_unique_floor_tiles_outside_the_spawn_room() {
        for seed in 0..10u64 {
            let (map, traps) = setup(seed);
            let mut seen = HashSet::new();
            for trap in traps.iter() {
                assert_eq!(map.kind_at(trap.point.x, trap.point.y), TileKind::Floor);
                assert!(!map.spawn_room().point_in_rect(trap.point));
                assert!(seen.insert(trap.point), "two traps share {:?}", trap.point);
            }
            assert!(traps.len() <= 30);
        }
    }

    #[test]
    fn trap_damage_is_one_shot() {
        let (map, mut traps) = setup(3);
        let point = traps.iter().next().expect("at least one trap").point;
        let bounds = map.tile_bounds(point);

        let first = traps.check_collisions(bounds);
        assert!(first > 0);
        // Standing still on the sprung trap must never damage again.
        assert_eq!(traps.check_collisions(bounds), 0);
        assert_eq!(traps.check_collisions(bounds), 0);
    }

    #[test]
    fn adjacent_tiles_never_spring_a_trap() {
        let (map, mut traps) = setup(3);
        let points: Vec<Point> = traps.iter().map(|t| t.point).collect();
        // Pick a trap with no trapped neighbors so every miss below is
        // attributable to the tested tile alone.
        let isolated = points
            .iter()
            .copied()
            .find(|p| {
                points.iter().all(|other| {
                    *other == *p
                        || (other.x - p.x).abs() > 1
                        || (other.y - p.y).abs() > 1
                })
            })
            .expect("an isolated trap");

        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let neighbor = Point::new(isolated.x + dx, isolated.y + dy);
                assert_eq!(traps.check_collisions(map.tile_bounds(neighbor)), 0);
            }
        }
        // Standing on the trap itself still springs it.
        assert!(traps.check_collisions(map.tile_bounds(isolated)) > 0);
    }

    #[test]
    fn at_most_one_trap_damages_per_call() {
        let (map, mut traps) = setup(5);
        // A bounds rect covering the whole map overlaps every trap; only
        // one may fire per call.
        let everything = Rect::with_size(0, 0, map.width_px(), map.height_px());
        let damage = traps.check_collisions(everything);
        let single = traps.iter().map(|t| t.damage).max().unwrap_or(0);
        assert!(damage <= single);
        let armed_after = traps.iter().filter(|t| t.armed).count();
        assert_eq!(armed_after, traps.len() - 1);
    }

    #[test]
    fn update_only_touches_animation_state() {
        let (_, mut traps) = setup(9);
        let armed_before: Vec<bool> = traps.iter().map(|t| t.armed).collect();
        traps.update(120.0);
        let armed_after: Vec<bool> = traps.iter().map(|t| t.armed).collect();
        assert_eq!(armed_before, armed_after);
    }

    #[test]
    fn regeneration_replaces_all_traps() {
        let (map, mut traps) = setup(11);
        let before: Vec<Point> = traps.iter().map(|t| t.point).collect();
        let mut rng = RandomNumberGenerator::seeded(999);
        traps.generate_traps(&map, 30, &mut rng);
        let after: Vec<Point> = traps.iter().map(|t| t.point).collect();
        assert_ne!(before, after);
    }
}
