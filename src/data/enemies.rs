use bracket_terminal::prelude::RGB;

#[derive(Clone, Debug)]
pub struct EnemyTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub hp: i32,
    pub power: i32,
}

impl EnemyTemplate {
    /// Template table per floor; deeper floors field meaner inhabitants.
    pub fn for_floor(floor: u32) -> Vec<Self> {
        match floor {
            0 | 1 => vec![
                Self::new("Cellar Rat", 'r', RGB::from_u8(170, 140, 110), 6, 5),
                Self::new("Dust Slime", 's', RGB::from_u8(120, 190, 120), 8, 5),
            ],
            2 => vec![
                Self::new("Crypt Bat", 'b', RGB::from_u8(160, 120, 220), 7, 5),
                Self::new("Bone Hound", 'h', RGB::from_u8(220, 210, 180), 10, 6),
            ],
            _ => vec![
                Self::new("Warden Shade", 'W', RGB::from_u8(130, 150, 255), 12, 7),
                Self::new("Gloom Stalker", 'G', RGB::from_u8(255, 120, 120), 14, 8),
            ],
        }
    }

    fn new(name: &'static str, glyph: char, color: RGB, hp: i32, power: i32) -> Self {
        Self {
            name,
            glyph,
            color,
            hp,
            power,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_floor_has_templates() {
        for floor in 0..6 {
            assert!(!EnemyTemplate::for_floor(floor).is_empty());
        }
    }
}
