use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, NullStorage, VecStorage};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub order: i32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct CombatStats {
    pub max_hp: i32,
    pub hp: i32,
    pub power: i32,
}

impl Component for CombatStats {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct EnemyTag;

impl Component for EnemyTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub name: String,
}

impl Component for Enemy {
    type Storage = VecStorage<Self>;
}
