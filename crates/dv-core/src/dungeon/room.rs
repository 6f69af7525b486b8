//! Rectangular rooms used while carving a level

use serde::{Deserialize, Serialize};

use crate::rng::GameRng;

/// A rectangular room interior; walls sit one cell outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Left x coordinate of the interior
    pub x: usize,
    /// Top y coordinate of the interior
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Room {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if this room overlaps with another (with buffer)
    pub fn overlaps(&self, other: &Room, buffer: usize) -> bool {
        let x1 = self.x.saturating_sub(buffer);
        let y1 = self.y.saturating_sub(buffer);
        let x2 = self.x + self.width + buffer;
        let y2 = self.y + self.height + buffer;

        let ox1 = other.x.saturating_sub(buffer);
        let oy1 = other.y.saturating_sub(buffer);
        let ox2 = other.x + other.width + buffer;
        let oy2 = other.y + other.height + buffer;

        !(x2 <= ox1 || x1 >= ox2 || y2 <= oy1 || y1 >= oy2)
    }

    /// Get center point of room
    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Check if point is inside room
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Get room area (interior cells)
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Every interior cell, column by column
    pub fn interior_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.x..self.x + self.width)
            .flat_map(move |x| (self.y..self.y + self.height).map(move |y| (x, y)))
    }

    /// Get wall bounds (including walls) as (left, top, right, bottom)
    pub fn wall_bounds(&self) -> (usize, usize, usize, usize) {
        (
            self.x.saturating_sub(1),
            self.y.saturating_sub(1),
            self.x + self.width,
            self.y + self.height,
        )
    }

    /// Pick a door on the wall facing `target`.
    ///
    /// Returns the door cell and the cell just outside it.
    pub fn door_towards(
        &self,
        target: &Room,
        rng: &mut GameRng,
    ) -> ((usize, usize), (usize, usize)) {
        let (rx, ry) = self.center();
        let (tx, ty) = target.center();

        if (tx as i64 - rx as i64).abs() > (ty as i64 - ry as i64).abs() {
            let y = self.y + rng.rn2(self.height as u32) as usize;
            if tx > rx {
                let door = (self.x + self.width, y);
                (door, (door.0 + 1, y))
            } else {
                let door = (self.x.saturating_sub(1), y);
                (door, (door.0.saturating_sub(1), y))
            }
        } else {
            let x = self.x + rng.rn2(self.width as u32) as usize;
            if ty > ry {
                let door = (x, self.y + self.height);
                (door, (x, door.1 + 1))
            } else {
                let door = (x, self.y.saturating_sub(1));
                (door, (x, door.1.saturating_sub(1)))
            }
        }
    }
}
