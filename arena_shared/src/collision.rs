//! Collision queries.
//!
//! The map is an external collaborator consumed read-only through
//! [`CollisionMap`]: "what, on this layer, overlaps this footprint". The
//! client composes it with its own entity bodies; [`TileGrid`] is a small
//! reference implementation for the tile layer.

use serde::{Deserialize, Serialize};

use crate::{ecs::EntityId, math::Vec2};

/// Named collision layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Tiles,
    Monsters,
    Players,
}

/// Spatial footprint of the querying entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Footprint {
    Circle { center: Vec2, radius: f32 },
    Point(Vec2),
}

impl Footprint {
    pub fn center(self) -> Vec2 {
        match self {
            Footprint::Circle { center, .. } => center,
            Footprint::Point(p) => p,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            Footprint::Circle { radius, .. } => radius,
            Footprint::Point(_) => 0.0,
        }
    }

    /// Strict overlap with another circle; touching does not count.
    pub fn overlaps_circle(self, center: Vec2, radius: f32) -> bool {
        let reach = self.radius() + radius;
        self.center().sub(center).len_sq() < reach * reach
    }
}

/// One overlapping thing on a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: EntityId,
    pub layer: Layer,
}

/// Read-only overlap queries keyed by the querying entity's id.
pub trait CollisionMap {
    /// Everything on `layer` overlapping `footprint`, in a stable
    /// map-defined order. `entity` itself is never reported.
    fn collides_on_layer(&self, entity: &EntityId, footprint: Footprint, layer: Layer) -> Vec<Hit>;
}

/// A map with nothing in it.
#[derive(Debug, Default)]
pub struct EmptyMap;

impl CollisionMap for EmptyMap {
    fn collides_on_layer(&self, _entity: &EntityId, _footprint: Footprint, _layer: Layer) -> Vec<Hit> {
        Vec::new()
    }
}

/// Grid of solid/empty square tiles. Everything outside the grid is solid.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tile_size: f32,
    solid: Vec<bool>,
}

impl TileGrid {
    /// Builds a grid from text rows; `#` marks a solid tile. Short rows are
    /// padded with empty tiles.
    pub fn from_rows(rows: &[&str], tile_size: f32) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut solid = vec![false; width * height];
        for (row, line) in rows.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                solid[row * width + col] = c == '#';
            }
        }
        Self {
            width: width as i32,
            height: height as i32,
            tile_size,
            solid,
        }
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col >= self.width || row >= self.height {
            return true;
        }
        self.solid[(row * self.width + col) as usize]
    }

    fn tile_overlaps(&self, col: i32, row: i32, footprint: Footprint) -> bool {
        let min = Vec2::new(col as f32 * self.tile_size, row as f32 * self.tile_size);
        let max = Vec2::new(min.x + self.tile_size, min.y + self.tile_size);
        let c = footprint.center();
        match footprint {
            Footprint::Point(p) => p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y,
            Footprint::Circle { radius, .. } => {
                let closest = Vec2::new(c.x.clamp(min.x, max.x), c.y.clamp(min.y, max.y));
                c.sub(closest).len_sq() < radius * radius
            }
        }
    }
}

impl CollisionMap for TileGrid {
    fn collides_on_layer(&self, _entity: &EntityId, footprint: Footprint, layer: Layer) -> Vec<Hit> {
        if layer != Layer::Tiles {
            return Vec::new();
        }
        let c = footprint.center();
        let r = footprint.radius();
        let col0 = ((c.x - r) / self.tile_size).floor() as i32;
        let col1 = ((c.x + r) / self.tile_size).floor() as i32;
        let row0 = ((c.y - r) / self.tile_size).floor() as i32;
        let row1 = ((c.y + r) / self.tile_size).floor() as i32;

        let mut hits = Vec::new();
        for row in row0..=row1 {
            for col in col0..=col1 {
                if self.is_solid(col, row) && self.tile_overlaps(col, row, footprint) {
                    hits.push(Hit {
                        id: EntityId::new(format!("tile:{col},{row}")),
                        layer: Layer::Tiles,
                    });
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::from_rows(&["#####", "#...#", "#...#", "#####"], 10.0)
    }

    #[test]
    fn open_floor_has_no_hits() {
        let hits = grid().collides_on_layer(
            &"b".into(),
            Footprint::Circle {
                center: Vec2::new(25.0, 15.0),
                radius: 3.0,
            },
            Layer::Tiles,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn circle_touching_wall_hits() {
        let hits = grid().collides_on_layer(
            &"b".into(),
            Footprint::Circle {
                center: Vec2::new(12.0, 15.0),
                radius: 3.0,
            },
            Layer::Tiles,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, EntityId::from("tile:0,1"));
    }

    #[test]
    fn outside_grid_is_solid() {
        let hits = grid().collides_on_layer(&"b".into(), Footprint::Point(Vec2::new(-5.0, 15.0)), Layer::Tiles);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn other_layers_are_empty() {
        let hits = grid().collides_on_layer(&"b".into(), Footprint::Point(Vec2::new(0.0, 0.0)), Layer::Monsters);
        assert!(hits.is_empty());
    }
}
