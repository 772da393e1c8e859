#![allow(dead_code)]

use std::collections::HashSet;

use bracket_geometry::prelude::{Point, Rect};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DijkstraMap, DistanceAlg};
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{BLACK, RGB};
use smallvec::SmallVec;

pub const DEFAULT_MAP_WIDTH: i32 = 50;
pub const DEFAULT_MAP_HEIGHT: i32 = 50;
pub const DEFAULT_TILE_SIZE: i32 = 48;

/// Canonical pixel -> tile mapping used by the camera and the pixel-rect
/// collision checks (traps, stairs).
pub fn px_to_tile(px: i32, tile_size: i32) -> i32 {
    px.div_euclid(tile_size)
}

/// Strict overlap test for flush tile rects. `Rect::intersect` counts edge
/// contact, which would make every neighboring tile collide.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x1 < b.x2 && a.x2 > b.x1 && a.y1 < b.y2 && a.y2 > b.y1
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileKind {
    Floor,
    Wall,
    StairsDown,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileKind::Wall)
    }
}

#[derive(Clone, Debug)]
pub struct Tile {
    pub kind: TileKind,
    pub glyph: u16,
    pub fg: RGB,
    pub bg: RGB,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::wall()
    }
}

impl Tile {
    pub fn wall() -> Self {
        Self {
            kind: TileKind::Wall,
            glyph: b'#' as u16,
            fg: RGB::from_u8(110, 100, 90),
            bg: RGB::named(BLACK),
        }
    }

    pub fn floor() -> Self {
        Self {
            kind: TileKind::Floor,
            glyph: b'.' as u16,
            fg: RGB::from_u8(130, 130, 120),
            bg: RGB::named(BLACK),
        }
    }

    pub fn stairs_down() -> Self {
        Self {
            kind: TileKind::StairsDown,
            glyph: b'>' as u16,
            fg: RGB::from_u8(240, 220, 120),
            bg: RGB::named(BLACK),
        }
    }
}

fn corridor_path(start: Point, end: Point) -> Vec<Point> {
    let mut path = Vec::new();
    let mut cursor = start;
    path.push(cursor);

    while cursor.x != end.x {
        cursor.x += if end.x > cursor.x { 1 } else { -1 };
        path.push(cursor);
    }

    while cursor.y != end.y {
        cursor.y += if end.y > cursor.y { 1 } else { -1 };
        path.push(cursor);
    }

    path
}

/// Room/corridor skeleton of a floor. Built once per generation and then
/// rasterized into a `DungeonMap`; never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub rooms: Vec<Rect>,
    pub corridors: Vec<Vec<Point>>,
    pub spawn: Point,
    pub stairs: Point,
}

impl Layout {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            rooms: Vec::new(),
            corridors: Vec::new(),
            spawn: Point::new(width / 2, height / 2),
            stairs: Point::new(width / 2, height / 2),
        }
    }

    /// Deterministic for a given seed. Every accepted room is corridored to
    /// the previously accepted one, so every room stays reachable from the
    /// spawn room.
    pub fn procedural(width: i32, height: i32, seed: u64) -> Self {
        const MAX_ROOMS: usize = 18;
        const MIN_ROOM_W: i32 = 5;
        const MAX_ROOM_W: i32 = 12;
        const MIN_ROOM_H: i32 = 4;
        const MAX_ROOM_H: i32 = 9;

        let mut rng = RandomNumberGenerator::seeded(seed);
        let mut layout = Self::new(width, height);

        for _ in 0..MAX_ROOMS {
            let room_w = rng.range(MIN_ROOM_W, MAX_ROOM_W);
            let room_h = rng.range(MIN_ROOM_H, MAX_ROOM_H);
            if room_w >= width - 4 || room_h >= height - 4 {
                continue;
            }

            let x_max = width - room_w - 2;
            let y_max = height - room_h - 2;
            if x_max <= 2 || y_max <= 2 {
                continue;
            }

            let room_x = rng.range(2, x_max);
            let room_y = rng.range(2, y_max);
            let candidate = Rect::with_size(room_x, room_y, room_w, room_h);

            if layout.rooms.iter().any(|room| room.intersect(&candidate)) {
                continue;
            }

            let candidate_center = candidate.center();
            if let Some(prev_center) = layout.rooms.last().map(|room| room.center()) {
                layout
                    .corridors
                    .push(corridor_path(prev_center, candidate_center));
            } else {
                layout.spawn = candidate_center;
            }

            layout.rooms.push(candidate);
        }

        if layout.rooms.is_empty() {
            return Self::fallback(width, height);
        }

        layout.place_stairs();
        layout
    }

    /// Fixed arrangement used when rejection sampling places nothing, which
    /// only happens on degenerate dimensions.
    pub fn fallback(width: i32, height: i32) -> Self {
        let mut layout = Self::new(width, height);
        let room_width = 10;
        let room_height = 6;
        let y = (height / 2 - room_height / 2).max(1);
        let mut x = 2;
        while x + room_width < width - 2 {
            layout.rooms.push(Rect::with_size(x, y, room_width, room_height));
            x += room_width + 3;
        }

        if layout.rooms.is_empty() {
            layout.rooms.push(Rect::with_size(
                1,
                1,
                (width - 2).max(1),
                (height - 2).max(1),
            ));
        }

        for window in layout.rooms.windows(2) {
            layout
                .corridors
                .push(corridor_path(window[0].center(), window[1].center()));
        }

        layout.spawn = layout.rooms[0].center();
        layout.place_stairs();
        layout
    }

    // Stairs land in the last room, which differs from the spawn room
    // whenever the layout has more than one room. Single-room layouts pick
    // a tile away from the spawn instead.
    fn place_stairs(&mut self) {
        let last = *self.rooms.last().unwrap_or(&Rect::with_size(0, 0, 1, 1));
        if self.rooms.len() > 1 {
            self.stairs = last.center();
            return;
        }

        let mut candidate = last.center();
        if candidate == self.spawn {
            candidate = Point::new(last.x1, last.y1);
        }
        self.stairs = candidate;
    }
}

/// The tile grid of one floor. Owned by the orchestrator, read by every
/// other component, replaced wholesale on regeneration.
#[derive(Clone, Debug)]
pub struct DungeonMap {
    pub width: i32,
    pub height: i32,
    pub tile_size: i32,
    pub rooms: Vec<Rect>,
    pub spawn: Point,
    pub stairs_pos: Point,
    pub seed: u64,
    tiles: Vec<Tile>,
}

impl DungeonMap {
    pub fn generate(width: i32, height: i32, tile_size: i32, seed: u64) -> Self {
        Self::from_layout(&Layout::procedural(width, height, seed), tile_size, seed)
    }

    pub fn from_layout(layout: &Layout, tile_size: i32, seed: u64) -> Self {
        let size = (layout.width * layout.height) as usize;
        let mut map = Self {
            width: layout.width,
            height: layout.height,
            tile_size,
            rooms: layout.rooms.clone(),
            spawn: layout.spawn,
            stairs_pos: layout.stairs,
            seed,
            tiles: vec![Tile::wall(); size],
        };

        for room in &layout.rooms {
            room.for_each(|pt| map.set_tile(pt, Tile::floor()));
        }

        for corridor in &layout.corridors {
            for &pt in corridor {
                map.set_tile(pt, Tile::floor());
            }
        }

        map.set_tile(layout.stairs, Tile::stairs_down());
        map
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(Point::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    fn set_tile(&mut self, point: Point, tile: Tile) {
        if let Some(idx) = self.idx(point.x, point.y) {
            self.tiles[idx] = tile;
        }
    }

    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.idx(point.x, point.y).map(|idx| &self.tiles[idx])
    }

    /// Out-of-bounds lookups read as walls so callers never need a bounds
    /// check of their own.
    pub fn kind_at(&self, x: i32, y: i32) -> TileKind {
        self.idx(x, y)
            .map(|idx| self.tiles[idx].kind)
            .unwrap_or(TileKind::Wall)
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.kind_at(point.x, point.y).is_walkable()
    }

    pub fn spawn_room(&self) -> Rect {
        self.rooms[0]
    }

    pub fn width_px(&self) -> i32 {
        self.width * self.tile_size
    }

    pub fn height_px(&self) -> i32 {
        self.height * self.tile_size
    }

    /// Pixel-space bounds of one tile, the collision unit shared by traps
    /// and stairs.
    pub fn tile_bounds(&self, point: Point) -> Rect {
        Rect::with_size(
            point.x * self.tile_size,
            point.y * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Flood fill from `origin` over walkable tiles.
    pub fn reachable_tiles(&self, origin: Point) -> HashSet<Point> {
        let start = (origin.y * self.width + origin.x) as usize;
        let dijkstra = DijkstraMap::new(
            self.width as usize,
            self.height as usize,
            &[start],
            self,
            (self.width * self.height) as f32,
        );
        let mut reachable = HashSet::new();
        for (idx, cost) in dijkstra.map.iter().enumerate() {
            if *cost < f32::MAX {
                reachable.insert(self.index_to_point2d(idx));
            }
        }
        reachable
    }
}

impl BaseMap for DungeonMap {
    fn is_opaque(&self, idx: usize) -> bool {
        self.tiles[idx].kind == TileKind::Wall
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        let steps = [
            Point::new(1, 0),
            Point::new(-1, 0),
            Point::new(0, 1),
            Point::new(0, -1),
        ];
        for dir in steps {
            let dest = Point::new(point.x + dir.x, point.y + dir.y);
            if self.in_bounds(dest) && self.is_walkable(dest) {
                exits.push((self.point2d_to_index(dest), 1.0));
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }
}

impl Algorithm2D for DungeonMap {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        DungeonMap::in_bounds(self, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64) -> DungeonMap {
        DungeonMap::generate(
            DEFAULT_MAP_WIDTH,
            DEFAULT_MAP_HEIGHT,
            DEFAULT_TILE_SIZE,
            seed,
        )
    }

    #[test]
    fn rooms_do_not_overlap() {
        for seed in 0..20u64 {
            let map = generate(seed);
            for (i, a) in map.rooms.iter().enumerate() {
                for b in map.rooms.iter().skip(i + 1) {
                    assert!(!a.intersect(b), "seed {seed}: rooms {a:?} and {b:?} overlap");
                }
            }
        }
    }

    #[test]
    fn every_room_is_reachable_from_spawn() {
        for seed in 0..20u64 {
            let map = generate(seed);
            let reachable = map.reachable_tiles(map.spawn);
            for room in &map.rooms {
                assert!(
                    reachable.contains(&room.center()),
                    "seed {seed}: room {room:?} unreachable from spawn"
                );
            }
        }
    }

    #[test]
    fn stairs_are_on_a_walkable_tile() {
        for seed in 0..20u64 {
            let map = generate(seed);
            assert!(map.is_walkable(map.stairs_pos));
            assert_eq!(
                map.kind_at(map.stairs_pos.x, map.stairs_pos.y),
                TileKind::StairsDown
            );
        }
    }

    #[test]
    fn stairs_avoid_the_spawn_room_when_possible() {
        for seed in 0..20u64 {
            let map = generate(seed);
            if map.rooms.len() > 1 {
                assert!(!map.spawn_room().point_in_rect(map.stairs_pos));
            } else {
                assert_ne!(map.stairs_pos, map.spawn);
            }
        }
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let map = generate(7);
        assert_eq!(map.kind_at(-1, 0), TileKind::Wall);
        assert_eq!(map.kind_at(0, -1), TileKind::Wall);
        assert_eq!(map.kind_at(map.width, 0), TileKind::Wall);
        assert_eq!(map.kind_at(0, map.height), TileKind::Wall);
        assert!(!map.is_walkable(Point::new(-5, -5)));
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = generate(42);
        let b = generate(42);
        assert_eq!(a.rooms, b.rooms);
        assert_eq!(a.spawn, b.spawn);
        assert_eq!(a.stairs_pos, b.stairs_pos);
        for y in 0..a.height {
            for x in 0..a.width {
                assert_eq!(a.kind_at(x, y), b.kind_at(x, y));
            }
        }
    }

    #[test]
    fn spawn_sits_in_the_first_room() {
        for seed in 0..20u64 {
            let map = generate(seed);
            assert!(map.spawn_room().point_in_rect(map.spawn));
            assert!(map.is_walkable(map.spawn));
        }
    }

    #[test]
    fn edge_touching_rects_do_not_overlap() {
        let tile = Rect::with_size(0, 0, 48, 48);
        let beside = Rect::with_size(48, 0, 48, 48);
        let diagonal = Rect::with_size(48, 48, 48, 48);
        assert!(!rects_overlap(&tile, &beside));
        assert!(!rects_overlap(&tile, &diagonal));

        let overlapping = Rect::with_size(24, 24, 48, 48);
        assert!(rects_overlap(&tile, &overlapping));
    }

    #[test]
    fn corridor_path_connects_endpoints() {
        let path = corridor_path(Point::new(2, 3), Point::new(6, 1));
        assert_eq!(path.first(), Some(&Point::new(2, 3)));
        assert_eq!(path.last(), Some(&Point::new(6, 1)));
        for window in path.windows(2) {
            let dx = (window[1].x - window[0].x).abs();
            let dy = (window[1].y - window[0].y).abs();
            assert_eq!(dx + dy, 1, "corridor must step one tile at a time");
        }
    }
}
