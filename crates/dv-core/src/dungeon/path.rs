//! Distance queries over a level (Dijkstra on the indexed heap)
//!
//! All searches are 4-connected. The corridor carver reuses the same search
//! with its own step costs.

use crate::collections::{HeapKey, IndexedHeap};

use super::Level;
use super::level::ORTHOGONAL;

/// Outcome of a single-source search
struct Search {
    height: usize,
    dist: Vec<Option<u32>>,
    prev: Vec<Option<usize>>,
}

impl Search {
    fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    fn distance(&self, x: usize, y: usize) -> Option<u32> {
        self.dist[self.index(x, y)]
    }

    fn path_to(&self, x: usize, y: usize) -> Option<Vec<(usize, usize)>> {
        let mut i = self.index(x, y);
        self.dist[i]?;
        let mut path = vec![(x, y)];
        while let Some(p) = self.prev[i] {
            path.push((p / self.height, p % self.height));
            i = p;
        }
        path.reverse();
        Some(path)
    }
}

/// Dijkstra from `start`.
///
/// `step_cost(x, y)` is the price of entering a cell, `None` when the cell
/// cannot be entered. The search stops early once `stop(x, y)` accepts a
/// settled cell.
fn search<C, S>(level: &Level, start: (usize, usize), step_cost: C, mut stop: S) -> Search
where
    C: Fn(usize, usize) -> Option<u32>,
    S: FnMut(usize, usize) -> bool,
{
    let height = level.height;
    let n = level.width * height;
    let mut result = Search {
        height,
        dist: vec![None; n],
        prev: vec![None; n],
    };
    if start.0 >= level.width || start.1 >= height {
        return result;
    }

    let mut keys: Vec<Option<HeapKey>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = IndexedHeap::with_capacity(64);

    let s = result.index(start.0, start.1);
    result.dist[s] = Some(0);
    keys[s] = Some(heap.insert((0u32, s)));

    while let Some(((d, i), _)) = heap.extract() {
        keys[i] = None;
        settled[i] = true;
        let (x, y) = (i / height, i % height);
        if stop(x, y) {
            break;
        }

        for (dx, dy) in ORTHOGONAL {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if !level.in_bounds(nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let ni = result.index(nx, ny);
            if settled[ni] {
                continue;
            }
            let Some(cost) = step_cost(nx, ny) else {
                continue;
            };
            let nd = d + cost;
            if result.dist[ni].is_some_and(|old| old <= nd) {
                continue;
            }
            result.dist[ni] = Some(nd);
            result.prev[ni] = Some(i);
            match keys[ni] {
                Some(key) => {
                    heap.decrease(key, (nd, ni));
                }
                None => keys[ni] = Some(heap.insert((nd, ni))),
            }
        }
    }

    result
}

fn walk_cost(level: &Level) -> impl Fn(usize, usize) -> Option<u32> + '_ {
    move |x, y| level.is_passable(x, y).then_some(1)
}

/// Walking distance from `from` to every cell; `None` where unreachable.
///
/// Indexed `[x][y]` like the level grid.
pub fn distance_map(level: &Level, from: (usize, usize)) -> Vec<Vec<Option<u32>>> {
    let result = search(level, from, walk_cost(level), |_, _| false);
    (0..level.width)
        .map(|x| (0..level.height).map(|y| result.distance(x, y)).collect())
        .collect()
}

/// Shortest walkable path, both endpoints included
pub fn shortest_path(
    level: &Level,
    from: (usize, usize),
    to: (usize, usize),
) -> Option<Vec<(usize, usize)>> {
    if to.0 >= level.width || to.1 >= level.height {
        return None;
    }
    let result = search(level, from, walk_cost(level), |x, y| (x, y) == to);
    result.path_to(to.0, to.1)
}

/// Closest of `targets` by walking distance.
///
/// Returns the index into `targets` and the distance.
pub fn nearest_target(
    level: &Level,
    from: (usize, usize),
    targets: &[(usize, usize)],
) -> Option<(usize, u32)> {
    let result = search(level, from, walk_cost(level), |x, y| targets.contains(&(x, y)));
    targets
        .iter()
        .enumerate()
        .filter(|(_, (x, y))| *x < level.width && *y < level.height)
        .filter_map(|(i, (x, y))| result.distance(*x, *y).map(|d| (i, d)))
        .min_by_key(|(_, d)| *d)
}

/// Cheapest path under a custom entry cost, used for carving
pub(crate) fn cheapest_path<C>(
    level: &Level,
    from: (usize, usize),
    to: (usize, usize),
    step_cost: C,
) -> Option<Vec<(usize, usize)>>
where
    C: Fn(usize, usize) -> Option<u32>,
{
    if to.0 >= level.width || to.1 >= level.height {
        return None;
    }
    let result = search(level, from, step_cost, |x, y| (x, y) == to);
    result.path_to(to.0, to.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::CellType;

    /// 10x5 open floor with a wall column at x=5 leaving a gap at y=4
    fn walled_level() -> Level {
        let mut level = Level::new(10, 5);
        for x in 0..10 {
            for y in 0..5 {
                level.set_cell_type(x, y, CellType::Floor);
            }
        }
        for y in 0..4 {
            level.set_cell_type(5, y, CellType::Wall);
        }
        level
    }

    #[test]
    fn test_distance_map_open_floor() {
        let mut level = Level::new(4, 4);
        for x in 0..4 {
            for y in 0..4 {
                level.set_cell_type(x, y, CellType::Floor);
            }
        }
        let dist = distance_map(&level, (0, 0));
        assert_eq!(dist[0][0], Some(0));
        assert_eq!(dist[3][3], Some(6));
        assert_eq!(dist[2][1], Some(3));
    }

    #[test]
    fn test_shortest_path_goes_around_wall() {
        let level = walled_level();
        let path = shortest_path(&level, (4, 0), (6, 0)).unwrap();
        assert_eq!(path.first(), Some(&(4, 0)));
        assert_eq!(path.last(), Some(&(6, 0)));
        // Down to the gap at y=4 and back up: 4 + 2 + 4 moves
        assert_eq!(path.len(), 11);
        assert!(path.iter().all(|&(x, y)| level.is_passable(x, y)));
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let step = a.0.abs_diff(b.0) + a.1.abs_diff(b.1);
            assert_eq!(step, 1);
        }
    }

    #[test]
    fn test_unreachable_target() {
        let mut level = walled_level();
        level.set_cell_type(5, 4, CellType::Wall);
        assert!(shortest_path(&level, (0, 0), (9, 0)).is_none());
        let dist = distance_map(&level, (0, 0));
        assert_eq!(dist[9][0], None);
    }

    #[test]
    fn test_nearest_target_prefers_walking_distance() {
        let level = walled_level();
        // (6,0) is closer in a straight line but behind the wall
        let targets = [(6, 0), (0, 4)];
        let nearest = nearest_target(&level, (4, 0), &targets);
        assert_eq!(nearest, Some((1, 8)));
    }

    #[test]
    fn test_nearest_target_none_reachable() {
        let level = walled_level();
        assert_eq!(nearest_target(&level, (0, 0), &[]), None);
        assert_eq!(nearest_target(&level, (0, 0), &[(50, 50)]), None);
    }
}
