#![allow(dead_code)]

pub mod components;
pub mod resources;
pub mod turn;

use std::collections::HashSet;

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{RGB, WHITE};
use specs::prelude::{Builder, Entity, Join, World as SpecsWorld, WorldExt};

use crate::{data::enemies::EnemyTemplate, map::DungeonMap};

use self::{
    components::{CombatStats, Enemy, EnemyTag, PlayerTag, Position, Renderable},
    resources::{EventLog, OccupancyIndex},
    turn::{StepOutcome, pursuit_step},
};

/// What one enemy turn did, for the orchestrator and the tests.
pub struct TurnReport {
    pub outcomes: Vec<StepOutcome>,
    pub contacts: u32,
}

/// Facade over the specs world. All entity state flows through here; enemy
/// resolution is one transactional pass over the occupancy index.
pub struct EcsWorld {
    specs_world: SpecsWorld,
    player: Entity,
    pub turn: u64,
}

impl EcsWorld {
    pub fn new(spawn: Point, player_hp: i32) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(EventLog::default());
        specs_world.insert(OccupancyIndex::default());
        let player = Self::spawn_player(&mut specs_world, spawn, player_hp);
        Self {
            specs_world,
            player,
            turn: 0,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<CombatStats>();
        world.register::<PlayerTag>();
        world.register::<EnemyTag>();
        world.register::<Enemy>();
    }

    fn spawn_player(world: &mut SpecsWorld, spawn: Point, hp: i32) -> Entity {
        world
            .create_entity()
            .with(Position { point: spawn })
            .with(Renderable {
                glyph: b'@' as u16,
                color: RGB::named(WHITE),
                order: 2,
            })
            .with(CombatStats {
                max_hp: hp,
                hp,
                power: 0,
            })
            .with(PlayerTag)
            .build()
    }

    /// `per_room` enemies in every room, on random floor tiles, never on
    /// the player's spawn tile and never stacked. Crowded rooms may hold
    /// fewer after the attempt budget runs out.
    pub fn spawn_enemies(
        &mut self,
        map: &DungeonMap,
        per_room: usize,
        floor: u32,
        rng: &mut RandomNumberGenerator,
    ) {
        let templates = EnemyTemplate::for_floor(floor);
        if templates.is_empty() {
            return;
        }

        let mut taken: HashSet<Point> = {
            let occupancy = self.specs_world.read_resource::<OccupancyIndex>();
            occupancy.tiles().map(|(point, _)| *point).collect()
        };
        taken.insert(self.player_point());
        taken.insert(map.spawn);

        let mut placements = Vec::new();
        for room in map.rooms.iter().copied() {
            for _ in 0..per_room {
                for _attempt in 0..20 {
                    let point = Point::new(
                        rng.range(room.x1, room.x2),
                        rng.range(room.y1, room.y2),
                    );
                    if !map.is_walkable(point) || taken.contains(&point) {
                        continue;
                    }
                    let idx = rng.range(0, templates.len() as i32) as usize;
                    placements.push((point, templates[idx].clone()));
                    taken.insert(point);
                    break;
                }
            }
        }

        for (point, template) in placements {
            self.spawn_enemy(&template, point);
        }
    }

    pub fn spawn_enemy(&mut self, template: &EnemyTemplate, point: Point) -> Entity {
        let entity = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: template.glyph as u16,
                color: template.color,
                order: 1,
            })
            .with(CombatStats {
                max_hp: template.hp,
                hp: template.hp,
                power: template.power,
            })
            .with(Enemy {
                name: template.name.to_string(),
            })
            .with(EnemyTag)
            .build();

        let mut occupancy = self.specs_world.write_resource::<OccupancyIndex>();
        occupancy.insert(point, entity);
        entity
    }

    /// Wholesale floor reset: every enemy is discarded, the player warps to
    /// the new spawn, and a fresh batch spawns from the floor's template
    /// table. HP carries over.
    pub fn repopulate(
        &mut self,
        map: &DungeonMap,
        per_room: usize,
        floor: u32,
        rng: &mut RandomNumberGenerator,
    ) {
        self.clear_enemies();
        self.set_player_position(map.spawn);
        self.spawn_enemies(map, per_room, floor, rng);
    }

    fn clear_enemies(&mut self) {
        let doomed: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let tags = self.specs_world.read_component::<EnemyTag>();
            (&entities, &tags).join().map(|(entity, _)| entity).collect()
        };
        let _ = self.specs_world.delete_entities(&doomed);
        self.specs_world.maintain();
        let mut occupancy = self.specs_world.write_resource::<OccupancyIndex>();
        occupancy.clear();
    }

    /// One candidate player move. Walls block; an enemy on the destination
    /// does not — the player walks in and takes that enemy's contact damage
    /// once on entry.
    pub fn try_player_step(&mut self, delta: Point, map: &DungeonMap) -> StepOutcome {
        let current = self.player_point();
        let target = Point::new(current.x + delta.x, current.y + delta.y);
        if !map.is_walkable(target) {
            return StepOutcome::Blocked;
        }

        self.set_player_position(target);

        let bumped = {
            let occupancy = self.specs_world.read_resource::<OccupancyIndex>();
            occupancy.entity_at(target)
        };
        if let Some(enemy) = bumped {
            let (name, power) = self.enemy_profile(enemy);
            self.apply_player_damage(power, &format!("You walk straight into the {name}"));
        }

        StepOutcome::Moved(target)
    }

    /// The resolve tick: every live enemy takes exactly one pursuit step,
    /// arbitrated through the occupancy index as it mutates, so two enemies
    /// can never end up on one tile. Contact damage lands at most once per
    /// tick no matter how many enemies reach the player.
    pub fn resolve_enemy_turn(&mut self, map: &DungeonMap) -> TurnReport {
        let player = self.player_point();
        let mut outcomes = Vec::new();
        let mut contact_profiles: Vec<(String, i32)> = Vec::new();

        {
            let entities = self.specs_world.entities();
            let mut positions = self.specs_world.write_component::<Position>();
            let tags = self.specs_world.read_component::<EnemyTag>();
            let enemies = self.specs_world.read_component::<Enemy>();
            let stats = self.specs_world.read_component::<CombatStats>();
            let mut occupancy = self.specs_world.write_resource::<OccupancyIndex>();

            let mut order: Vec<Entity> = (&entities, &positions, &tags)
                .join()
                .map(|(entity, _, _)| entity)
                .collect();
            order.sort_by_key(|entity| entity.id());

            for entity in order {
                let Some(from) = positions.get(entity).map(|pos| pos.point) else {
                    continue;
                };
                let outcome = pursuit_step(from, player, map, &occupancy);
                match outcome {
                    StepOutcome::Moved(target) => {
                        occupancy.relocate(from, target, entity);
                        if let Some(pos) = positions.get_mut(entity) {
                            pos.point = target;
                        }
                    }
                    StepOutcome::Contact => {
                        let name = enemies
                            .get(entity)
                            .map(|e| e.name.clone())
                            .unwrap_or_else(|| "enemy".to_string());
                        let power = stats.get(entity).map(|s| s.power).unwrap_or(1);
                        contact_profiles.push((name, power));
                    }
                    StepOutcome::Blocked | StepOutcome::NoPath => {}
                }
                outcomes.push(outcome);
            }
        }

        let contacts = contact_profiles.len() as u32;
        let mut extra = Vec::new();
        if let Some((name, power)) = contact_profiles.first().cloned() {
            self.apply_player_damage(power, &format!("The {name} slams into you"));
            for (name, _) in contact_profiles.iter().skip(1) {
                extra.push(format!("The {name} presses in behind it."));
            }
        }
        if !extra.is_empty() {
            let mut log = self.specs_world.write_resource::<EventLog>();
            for line in extra {
                log.push(line);
            }
        }

        self.turn = self.turn.wrapping_add(1);
        TurnReport { outcomes, contacts }
    }

    pub fn apply_player_damage(&mut self, amount: i32, cause: &str) {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        let mut log = self.specs_world.write_resource::<EventLog>();
        if let Some(player_stats) = stats.get_mut(self.player) {
            player_stats.hp = (player_stats.hp - amount).max(0);
            log.push(format!(
                "{cause} for {amount} damage (HP {}/{}).",
                player_stats.hp, player_stats.max_hp
            ));
        }
    }

    pub fn player_point(&self) -> Point {
        let positions = self.specs_world.read_component::<Position>();
        positions
            .get(self.player)
            .map(|pos| pos.point)
            .unwrap_or(Point::new(0, 0))
    }

    pub fn set_player_position(&mut self, point: Point) {
        let mut positions = self.specs_world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(self.player) {
            pos.point = point;
        }
    }

    pub fn player_stats(&self) -> Option<CombatStats> {
        let stats = self.specs_world.read_component::<CombatStats>();
        stats.get(self.player).cloned()
    }

    /// Pixel-space bounds of the player's tile, for trap/stairs collision.
    pub fn player_bounds(&self, tile_size: i32) -> Rect {
        let point = self.player_point();
        Rect::with_size(
            point.x * tile_size,
            point.y * tile_size,
            tile_size,
            tile_size,
        )
    }

    pub fn enemy_at(&self, point: Point) -> Option<Entity> {
        let occupancy = self.specs_world.read_resource::<OccupancyIndex>();
        occupancy.entity_at(point)
    }

    pub fn enemy_count(&self) -> usize {
        let tags = self.specs_world.read_component::<EnemyTag>();
        let entities = self.specs_world.entities();
        (&entities, &tags).join().count()
    }

    pub fn drain_event_log(&mut self) -> Vec<String> {
        let mut log = self.specs_world.write_resource::<EventLog>();
        std::mem::take(&mut log.entries)
    }

    pub fn each_renderable<F>(&self, mut f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let mut drawable: Vec<(&Position, &Renderable)> =
            (&positions, &renderables).join().collect();
        drawable.sort_by_key(|(_, renderable)| renderable.order);
        for (pos, renderable) in drawable {
            f(pos.point, renderable);
        }
    }

    fn enemy_profile(&self, entity: Entity) -> (String, i32) {
        let enemies = self.specs_world.read_component::<Enemy>();
        let stats = self.specs_world.read_component::<CombatStats>();
        let name = enemies
            .get(entity)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| "enemy".to_string());
        let power = stats.get(entity).map(|s| s.power).unwrap_or(1);
        (name, power)
    }

    #[cfg(test)]
    fn enemy_points(&self) -> Vec<Point> {
        let positions = self.specs_world.read_component::<Position>();
        let tags = self.specs_world.read_component::<EnemyTag>();
        (&positions, &tags).join().map(|(pos, _)| pos.point).collect()
    }
}
