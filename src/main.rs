mod audio;
mod config;
mod data;
mod ecs;
mod map;
mod render;
mod stairs;
mod traps;

use std::path::Path;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::*;
use chrono::Utc;
use tracing::{error, info};

use audio::AudioPlayer;
use config::{CONFIG_FILE, GameConfig};
use ecs::{EcsWorld, turn::StepOutcome};
use map::DungeonMap;
use render::VictoryScreen;
use stairs::Stairs;
use traps::TrapManager;

const SCREEN_HEIGHT: i32 = 50;
const LOG_PANEL_START: i32 = SCREEN_HEIGHT - 6;
// Entries the log panel has rows for: border, title, entries, border.
const LOG_MAX_ENTRIES: usize = 4;
const VICTORY_FLOOR: u32 = 4;

const SALT_MAP: u64 = 0x6d61_7067;
const SALT_TRAPS: u64 = 0x7472_6170;
const SALT_ENEMIES: u64 = 0x666f_6573;
const SALT_BGM: u64 = 0x6267_6d00;
const SALT_VICTORY: u64 = 0x77696e_00;

/// One seed per subsystem call, all derived from the run seed so a whole
/// run replays from a single number.
fn subsystem_seed(base: u64, floor: u32, salt: u64) -> u64 {
    base ^ (floor as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ salt
}

enum Mode {
    Playing,
    Victory(VictoryScreen),
    GameOver,
}

struct CrawlState {
    config: GameConfig,
    base_seed: u64,
    // Bumped by the debug regenerate key so every press rerolls the floor.
    regen_salt: u64,
    map: DungeonMap,
    ecs: EcsWorld,
    traps: TrapManager,
    stairs: Stairs,
    floor: u32,
    mode: Mode,
    show_traps: bool,
    frame: u64,
    message_log: Vec<String>,
    audio: Option<AudioPlayer>,
}

impl CrawlState {
    fn new(config: GameConfig) -> Self {
        let base_seed = config
            .seed
            .unwrap_or_else(|| Utc::now().timestamp_millis() as u64);
        info!(base_seed, "run seed");

        let floor = 1;
        let map = DungeonMap::generate(
            config.map_width,
            config.map_height,
            config.tile_size,
            subsystem_seed(base_seed, floor, SALT_MAP),
        );
        info!(floor, seed = map.seed, rooms = map.rooms.len(), "floor generated");

        let mut ecs = EcsWorld::new(map.spawn, config.player_hp);
        let mut spawn_rng =
            RandomNumberGenerator::seeded(subsystem_seed(base_seed, floor, SALT_ENEMIES));
        ecs.spawn_enemies(&map, config.enemies_per_room, floor, &mut spawn_rng);

        let mut traps = TrapManager::new(config.tile_size, config.trap_damage);
        let mut trap_rng =
            RandomNumberGenerator::seeded(subsystem_seed(base_seed, floor, SALT_TRAPS));
        traps.generate_traps(&map, config.trap_count, &mut trap_rng);

        let stairs = Stairs::new(map.stairs_pos, config.tile_size);

        let mut audio = AudioPlayer::new();
        if let Some(player) = audio.as_mut() {
            let mut bgm_rng =
                RandomNumberGenerator::seeded(subsystem_seed(base_seed, floor, SALT_BGM));
            player.play_random_bgm(Path::new(&config.bgm_dir), &mut bgm_rng);
        }

        Self {
            config,
            base_seed,
            regen_salt: 0,
            map,
            ecs,
            traps,
            stairs,
            floor,
            mode: Mode::Playing,
            show_traps: false,
            frame: 0,
            message_log: Vec::new(),
            audio,
        }
    }

    fn floor_seed(&self, salt: u64) -> u64 {
        subsystem_seed(self.base_seed ^ self.regen_salt, self.floor, salt)
    }

    /// Wholesale floor replacement: new map, new traps, new enemies, new
    /// stairs, fresh BGM. Player HP carries over.
    fn rebuild_floor(&mut self) {
        self.map = DungeonMap::generate(
            self.config.map_width,
            self.config.map_height,
            self.config.tile_size,
            self.floor_seed(SALT_MAP),
        );
        info!(
            floor = self.floor,
            seed = self.map.seed,
            rooms = self.map.rooms.len(),
            "floor generated"
        );

        let mut trap_rng = RandomNumberGenerator::seeded(self.floor_seed(SALT_TRAPS));
        self.traps
            .generate_traps(&self.map, self.config.trap_count, &mut trap_rng);

        let mut spawn_rng = RandomNumberGenerator::seeded(self.floor_seed(SALT_ENEMIES));
        self.ecs.repopulate(
            &self.map,
            self.config.enemies_per_room,
            self.floor,
            &mut spawn_rng,
        );

        self.stairs = Stairs::new(self.map.stairs_pos, self.config.tile_size);

        let bgm_seed = self.floor_seed(SALT_BGM);
        if let Some(player) = self.audio.as_mut() {
            let mut bgm_rng = RandomNumberGenerator::seeded(bgm_seed);
            player.play_random_bgm(Path::new(&self.config.bgm_dir), &mut bgm_rng);
        }
    }

    fn playing_tick(&mut self, ctx: &mut BTerm) {
        if let Some(key) = ctx.key {
            match key {
                VirtualKeyCode::Left | VirtualKeyCode::A => self.attempt_step(-1, 0),
                VirtualKeyCode::Right | VirtualKeyCode::D => self.attempt_step(1, 0),
                VirtualKeyCode::Up | VirtualKeyCode::W => self.attempt_step(0, -1),
                VirtualKeyCode::Down | VirtualKeyCode::S => self.attempt_step(0, 1),
                VirtualKeyCode::Space => self.debug_regenerate(),
                VirtualKeyCode::T => self.show_traps = !self.show_traps,
                VirtualKeyCode::Escape => ctx.quitting = true,
                _ => {}
            }
        }
        self.frame = self.frame.wrapping_add(1);

        // Traps and stairs fire every tick, moved or not.
        let bounds = self.ecs.player_bounds(self.config.tile_size);
        let trap_damage = self.traps.check_collisions(bounds);
        if trap_damage > 0 {
            self.ecs
                .apply_player_damage(trap_damage, "A hidden trap springs");
        }

        if self.check_defeat() {
            self.draw_scene(ctx);
            render::draw_game_over(ctx);
            ctx.quitting = true;
            return;
        }

        if self.stairs.check_collision(bounds) {
            self.descend();
            if let Mode::Victory(screen) = &self.mode {
                screen.draw(ctx);
                return;
            }
        }

        self.traps.update(ctx.frame_time_ms / 16.0);
        self.flush_event_log();
        self.draw_scene(ctx);
    }

    /// One candidate tile move; enemies advance exactly when the player's
    /// tile actually changed.
    fn attempt_step(&mut self, dx: i32, dy: i32) {
        let step = self.ecs.try_player_step(Point::new(dx, dy), &self.map);
        if let StepOutcome::Moved(_) = step {
            self.ecs.resolve_enemy_turn(&self.map);
        }
    }

    fn descend(&mut self) {
        self.floor += 1;
        info!(floor = self.floor, "descending");

        if self.floor >= VICTORY_FLOOR {
            let mut rng = RandomNumberGenerator::seeded(self.floor_seed(SALT_VICTORY));
            let screen = VictoryScreen::compose(Path::new(&self.config.portrait_dir), &mut rng);
            self.mode = Mode::Victory(screen);
            return;
        }

        self.push_log_entry(format!("You descend to floor {}.", self.floor));
        self.rebuild_floor();
    }

    fn debug_regenerate(&mut self) {
        self.regen_salt = self.regen_salt.wrapping_add(1);
        self.floor = 1;
        self.push_log_entry("The catacomb reshuffles.");
        self.rebuild_floor();
    }

    fn player_defeated(&self) -> bool {
        self.ecs.player_stats().map(|s| s.hp <= 0).unwrap_or(false)
    }

    /// The frame that sees HP reach 0 is the last one simulated; the mode
    /// flips here and the caller stops the loop.
    fn check_defeat(&mut self) -> bool {
        if !self.player_defeated() {
            return false;
        }
        self.flush_event_log();
        self.push_log_entry("GAME OVER");
        self.mode = Mode::GameOver;
        true
    }

    fn push_log_entry<S: Into<String>>(&mut self, entry: S) {
        self.message_log.insert(0, entry.into());
        self.message_log.truncate(LOG_MAX_ENTRIES);
    }

    fn flush_event_log(&mut self) {
        for entry in self.ecs.drain_event_log() {
            self.push_log_entry(entry);
        }
    }

    fn draw_scene(&mut self, ctx: &mut BTerm) {
        let camera = render::camera_px(self.ecs.player_point(), &self.map);
        render::draw_hud(
            ctx,
            self.floor,
            self.ecs.turn,
            self.ecs.player_stats().as_ref(),
            self.show_traps,
        );
        render::draw_map(ctx, &self.map, camera);
        render::draw_traps(ctx, &self.traps, &self.map, camera, self.show_traps);
        self.ecs.each_renderable(|point, renderable| {
            if let Some(cell) = render::visible_cell(&self.map, camera, point) {
                ctx.set(
                    cell.x,
                    cell.y,
                    renderable.color,
                    RGB::named(BLACK),
                    renderable.glyph,
                );
            }
        });
        render::draw_log(ctx, &self.message_log, LOG_PANEL_START);
    }
}

impl GameState for CrawlState {
    fn tick(&mut self, ctx: &mut BTerm) {
        ctx.cls();
        match &self.mode {
            Mode::Victory(screen) => {
                if let Some(VirtualKeyCode::Space | VirtualKeyCode::Escape) = ctx.key {
                    ctx.quitting = true;
                }
                screen.draw(ctx);
            }
            Mode::GameOver => {
                render::draw_game_over(ctx);
                ctx.quitting = true;
            }
            Mode::Playing => self.playing_tick(ctx),
        }
    }
}

fn main() -> BError {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match GameConfig::load(Path::new(CONFIG_FILE)) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "cannot start: bad configuration");
            return Err(Box::new(err));
        }
    };

    let context = BTermBuilder::simple80x50()
        .with_title("Catacomb")
        .build()?;
    main_loop(context, CrawlState::new(config))
}
