//! # Terrain Pathfinding
//!
//! Bounded A* over the terrain grid with per-enemy traversal rules.
//!
//! Searches are 4-directional with uniform step cost and a Manhattan
//! heuristic. Every search runs to completion inside a single tick; the open
//! set is capped so a degenerate map can never stall the loop.

use crate::game::{EnemyType, PanelType, TerrainGrid, TilePos};
use log::debug;
use ::pathfinding::prelude::bfs_reach;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Whether an enemy of the given type may stand on a tile.
///
/// Out-of-range tiles are never enterable.
///
/// # Examples
///
/// ```
/// use tacojiman::{can_enter, EnemyType, TerrainGrid, TilePos};
///
/// let grid = TerrainGrid::parse(&["#~.", "#H."], 30).unwrap();
/// assert!(can_enter(&grid, TilePos::new(0, 0), EnemyType::Ground));
/// assert!(!can_enter(&grid, TilePos::new(1, 0), EnemyType::Ground));
/// assert!(can_enter(&grid, TilePos::new(1, 0), EnemyType::Water));
/// assert!(!can_enter(&grid, TilePos::new(5, 5), EnemyType::Air));
/// ```
pub fn can_enter(grid: &TerrainGrid, pos: TilePos, enemy_type: EnemyType) -> bool {
    match grid.panel_type_at(pos) {
        Some(panel_type) => enemy_type.can_traverse(panel_type),
        None => false,
    }
}

impl EnemyType {
    /// Traversal rule for a single panel type.
    pub fn can_traverse(self, panel_type: PanelType) -> bool {
        use PanelType::*;
        match self {
            EnemyType::Ground => matches!(panel_type, Path | Rail | PlayerHouse),
            EnemyType::Water => matches!(panel_type, Water | PlayerHouse),
            EnemyType::Underground => matches!(panel_type, RiceField | Path | PlayerHouse),
            EnemyType::Air => true,
        }
    }
}

/// Grid pathfinder shared by every terrain-bound enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainPathfinder {
    search_limit: usize,
}

impl TerrainPathfinder {
    /// Default open-set ceiling.
    pub const DEFAULT_SEARCH_LIMIT: usize = 4096;

    pub fn new() -> Self {
        Self::with_search_limit(Self::DEFAULT_SEARCH_LIMIT)
    }

    /// Creates a pathfinder that gives up once the open set exceeds `search_limit`.
    pub fn with_search_limit(search_limit: usize) -> Self {
        Self {
            search_limit: search_limit.max(1),
        }
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    /// Finds a shortest path from `start` to `goal`.
    ///
    /// The returned path includes both endpoints. It is empty when the goal is
    /// not enterable, no route exists, or the open-set ceiling is hit. The start
    /// tile itself is not checked, so an agent caught between panels can still
    /// plan its way out.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::{EnemyType, TerrainGrid, TerrainPathfinder, TilePos};
    ///
    /// let grid = TerrainGrid::parse(&["###", "###", "###"], 30).unwrap();
    /// let path = TerrainPathfinder::new().find_path(
    ///     &grid,
    ///     TilePos::new(0, 0),
    ///     TilePos::new(2, 2),
    ///     EnemyType::Ground,
    /// );
    /// assert_eq!(path.len(), 5);
    /// ```
    pub fn find_path(
        &self,
        grid: &TerrainGrid,
        start: TilePos,
        goal: TilePos,
        enemy_type: EnemyType,
    ) -> Vec<TilePos> {
        if !grid.contains(start) || !can_enter(grid, goal, enemy_type) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set = HashSet::new();
        let mut came_from: HashMap<TilePos, TilePos> = HashMap::new();
        let mut g_score: HashMap<TilePos, u32> = HashMap::new();
        let mut sequence = 0u64;

        g_score.insert(start, 0);
        open_set.push(AStarNode {
            position: start,
            f_score: start.manhattan_distance(goal),
            sequence,
        });

        while let Some(current_node) = open_set.pop() {
            let current = current_node.position;

            if current == goal {
                return reconstruct_path(&came_from, goal);
            }
            if !closed_set.insert(current) {
                continue;
            }

            let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
            for neighbor in current.cardinal_neighbors() {
                if closed_set.contains(&neighbor) || !can_enter(grid, neighbor, enemy_type) {
                    continue;
                }

                let tentative_g_score = current_g.saturating_add(1);
                if tentative_g_score < g_score.get(&neighbor).copied().unwrap_or(u32::MAX) {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g_score);
                    sequence += 1;
                    open_set.push(AStarNode {
                        position: neighbor,
                        f_score: tentative_g_score + neighbor.manhattan_distance(goal),
                        sequence,
                    });
                }
            }

            if open_set.len() > self.search_limit {
                debug!(
                    "Path search {:?} -> {:?} for {:?} aborted at {} open nodes",
                    start,
                    goal,
                    enemy_type,
                    open_set.len()
                );
                return Vec::new();
            }
        }

        Vec::new()
    }

    /// Every tile from which an enemy of this type can walk to `origin`.
    ///
    /// Traversal only depends on the tile being entered, so the reachable set
    /// is the same in both directions. Empty when `origin` itself is not
    /// enterable.
    pub fn reachable_from(
        &self,
        grid: &TerrainGrid,
        origin: TilePos,
        enemy_type: EnemyType,
    ) -> HashSet<TilePos> {
        if !can_enter(grid, origin, enemy_type) {
            return HashSet::new();
        }

        bfs_reach(origin, |pos: &TilePos| {
            pos.cardinal_neighbors()
                .into_iter()
                .filter(|&neighbor| can_enter(grid, neighbor, enemy_type))
                .collect::<Vec<_>>()
        })
        .collect()
    }
}

impl Default for TerrainPathfinder {
    fn default() -> Self {
        Self::new()
    }
}

fn reconstruct_path(came_from: &HashMap<TilePos, TilePos>, goal: TilePos) -> Vec<TilePos> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Node for the A* open set.
///
/// Lowest `f_score` pops first; among equal scores the earliest pushed wins.
#[derive(Debug, Clone, Copy)]
struct AStarNode {
    position: TilePos,
    f_score: u32,
    sequence: u64,
}

impl PartialEq for AStarNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_score == other.f_score && self.sequence == other.sequence
    }
}

impl Eq for AStarNode {}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior in BinaryHeap
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_adjacent_chain(path: &[TilePos]) -> bool {
        path.windows(2)
            .all(|pair| pair[0].manhattan_distance(pair[1]) == 1)
    }

    #[test]
    fn test_trivial_grid_shortest_path() {
        let grid = TerrainGrid::parse(&["###", "###", "###"], 30).unwrap();
        let path = TerrainPathfinder::new().find_path(
            &grid,
            TilePos::new(0, 0),
            TilePos::new(2, 2),
            EnemyType::Ground,
        );
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&TilePos::new(0, 0)));
        assert_eq!(path.last(), Some(&TilePos::new(2, 2)));
        assert!(is_adjacent_chain(&path));
    }

    #[test]
    fn test_path_avoids_forbidden_panels() {
        let grid = TerrainGrid::parse(
            &[
                "#~~~#", //
                "#~.~#", //
                "#####", //
            ],
            30,
        )
        .unwrap();
        let path = TerrainPathfinder::new().find_path(
            &grid,
            TilePos::new(0, 0),
            TilePos::new(4, 0),
            EnemyType::Ground,
        );
        assert_eq!(path.len(), 9);
        assert!(path.iter().all(|&pos| can_enter(&grid, pos, EnemyType::Ground)));
        assert!(is_adjacent_chain(&path));
    }

    #[test]
    fn test_no_route_returns_empty() {
        let grid = TerrainGrid::parse(&["#~#"], 30).unwrap();
        let pathfinder = TerrainPathfinder::new();
        assert!(pathfinder
            .find_path(&grid, TilePos::new(0, 0), TilePos::new(2, 0), EnemyType::Ground)
            .is_empty());
        // Goal on a forbidden panel
        assert!(pathfinder
            .find_path(&grid, TilePos::new(0, 0), TilePos::new(1, 0), EnemyType::Ground)
            .is_empty());
        // Goal outside the grid
        assert!(pathfinder
            .find_path(&grid, TilePos::new(0, 0), TilePos::new(9, 0), EnemyType::Ground)
            .is_empty());
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = TerrainGrid::parse(&["#H#"], 30).unwrap();
        let path = TerrainPathfinder::new().find_path(
            &grid,
            TilePos::new(1, 0),
            TilePos::new(1, 0),
            EnemyType::Water,
        );
        assert_eq!(path, vec![TilePos::new(1, 0)]);
    }

    #[test]
    fn test_search_limit_aborts() {
        let rows: Vec<String> = (0..30).map(|_| "#".repeat(30)).collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let grid = TerrainGrid::parse(&rows, 30).unwrap();

        let tight = TerrainPathfinder::with_search_limit(2);
        assert!(tight
            .find_path(&grid, TilePos::new(0, 0), TilePos::new(29, 29), EnemyType::Ground)
            .is_empty());

        let roomy = TerrainPathfinder::new();
        assert_eq!(
            roomy
                .find_path(&grid, TilePos::new(0, 0), TilePos::new(29, 29), EnemyType::Ground)
                .len(),
            59
        );
    }

    #[test]
    fn test_traversal_rules() {
        use PanelType::*;
        assert!(EnemyType::Ground.can_traverse(Rail));
        assert!(!EnemyType::Ground.can_traverse(RiceField));
        assert!(EnemyType::Water.can_traverse(PlayerHouse));
        assert!(!EnemyType::Water.can_traverse(Path));
        assert!(EnemyType::Underground.can_traverse(RiceField));
        assert!(!EnemyType::Underground.can_traverse(Station));
        assert!(EnemyType::Air.can_traverse(OtherHouse));
    }

    #[test]
    fn test_reachable_from() {
        let grid = TerrainGrid::parse(
            &[
                "##~#", //
                "~H~#", //
                "~~~#", //
            ],
            30,
        )
        .unwrap();
        let pathfinder = TerrainPathfinder::new();
        let house = TilePos::new(1, 1);

        let ground = pathfinder.reachable_from(&grid, house, EnemyType::Ground);
        assert!(ground.contains(&TilePos::new(0, 0)));
        assert!(ground.contains(&TilePos::new(1, 0)));
        assert!(!ground.contains(&TilePos::new(3, 0)));

        let water = pathfinder.reachable_from(&grid, house, EnemyType::Water);
        assert!(water.contains(&TilePos::new(2, 0)));
        assert!(water.contains(&TilePos::new(0, 2)));
        assert_eq!(water.len(), 7);

        let nothing = pathfinder.reachable_from(&grid, TilePos::new(2, 0), EnemyType::Ground);
        assert!(nothing.is_empty());
    }
}
