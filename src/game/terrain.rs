//! # Terrain Grid
//!
//! The typed panel grid every agent moves across.
//!
//! A grid is produced once per session by the map generator and never mutated
//! afterwards, so it is shared freely (usually behind an `Arc`) by the director,
//! every enemy and the pathfinder. Connection flags are derived from panel types
//! in a single pass at construction time.

use super::{Direction, TilePos, WorldPoint};
use crate::{TacoError, TacoResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of terrain a panel holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelType {
    /// Sea and rivers
    Water,
    /// Filler terrain
    RiceField,
    /// A neighbour's house; taps aimed at it are ignored
    OtherHouse,
    /// The terminal station the rail spur starts from
    Station,
    /// Track running away from the station
    Rail,
    /// The house being defended, always at grid centre
    PlayerHouse,
    /// Footpaths between the fields
    Path,
}

impl PanelType {
    /// Whether two adjacent panels of these types are connected.
    ///
    /// Same-type neighbours connect, and paths connect to rails so ground
    /// enemies can walk across both.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::PanelType;
    ///
    /// assert!(PanelType::Path.connects_to(PanelType::Rail));
    /// assert!(PanelType::Water.connects_to(PanelType::Water));
    /// assert!(!PanelType::Water.connects_to(PanelType::Path));
    /// ```
    pub fn connects_to(self, other: PanelType) -> bool {
        self == other
            || matches!(
                (self, other),
                (PanelType::Path, PanelType::Rail) | (PanelType::Rail, PanelType::Path)
            )
    }

    /// Panels shielding whatever stands on them from taps.
    pub fn is_invulnerable(self) -> bool {
        matches!(self, PanelType::OtherHouse | PanelType::Station)
    }

    /// Single-character symbol used by the ASCII map format.
    pub fn symbol(self) -> char {
        match self {
            PanelType::Water => '~',
            PanelType::RiceField => '.',
            PanelType::OtherHouse => 'h',
            PanelType::Station => 'S',
            PanelType::Rail => '=',
            PanelType::PlayerHouse => 'H',
            PanelType::Path => '#',
        }
    }

    /// Parses a symbol produced by [`PanelType::symbol`].
    pub fn from_symbol(symbol: char) -> Option<PanelType> {
        match symbol {
            '~' => Some(PanelType::Water),
            '.' => Some(PanelType::RiceField),
            'h' => Some(PanelType::OtherHouse),
            'S' => Some(PanelType::Station),
            '=' => Some(PanelType::Rail),
            'H' => Some(PanelType::PlayerHouse),
            '#' => Some(PanelType::Path),
            _ => None,
        }
    }
}

/// Directional connectivity flags of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Connections {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl Connections {
    /// Reads the flag for a direction.
    pub fn get(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    /// Writes the flag for a direction.
    pub fn set(&mut self, direction: Direction, connected: bool) {
        match direction {
            Direction::North => self.north = connected,
            Direction::South => self.south = connected,
            Direction::East => self.east = connected,
            Direction::West => self.west = connected,
        }
    }

    /// Number of connected sides.
    pub fn count(&self) -> usize {
        Direction::ALL.iter().filter(|&&d| self.get(d)).count()
    }

    /// Sides connected in either set.
    pub fn union(self, other: Connections) -> Connections {
        Connections {
            north: self.north || other.north,
            south: self.south || other.south,
            east: self.east || other.east,
            west: self.west || other.west,
        }
    }
}

/// One cell of the terrain grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub grid_x: i32,
    pub grid_y: i32,
    pub panel_type: PanelType,
    pub connections: Connections,
    pub invulnerable: bool,
}

impl Panel {
    /// Creates a panel with no connections yet.
    pub fn new(position: TilePos, panel_type: PanelType) -> Self {
        Self {
            grid_x: position.x,
            grid_y: position.y,
            panel_type,
            connections: Connections::default(),
            invulnerable: panel_type.is_invulnerable(),
        }
    }

    /// Grid coordinate of this panel.
    pub fn position(&self) -> TilePos {
        TilePos::new(self.grid_x, self.grid_y)
    }
}

/// Immutable 2D grid of panels, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    panels: Vec<Panel>,
}

impl TerrainGrid {
    /// Builds a grid from row-major panel types and derives all connections.
    ///
    /// Fails when the type count does not match the dimensions.
    pub fn from_types(
        width: u32,
        height: u32,
        tile_size: u32,
        types: &[PanelType],
    ) -> TacoResult<Self> {
        Self::from_parts(width, height, tile_size, types, &[])
    }

    /// Like [`TerrainGrid::from_types`], keeping extra row-major `links` on top
    /// of the derived connections. An empty `links` slice adds nothing.
    pub fn from_parts(
        width: u32,
        height: u32,
        tile_size: u32,
        types: &[PanelType],
        links: &[Connections],
    ) -> TacoResult<Self> {
        if width == 0 || height == 0 || tile_size == 0 {
            return Err(TacoError::InvalidConfig(format!(
                "grid {}x{} with tile size {} is empty",
                width, height, tile_size
            )));
        }
        let expected = width as usize * height as usize;
        if types.len() != expected {
            return Err(TacoError::InvalidConfig(format!(
                "expected {} panels for a {}x{} grid, got {}",
                expected,
                width,
                height,
                types.len()
            )));
        }

        if !links.is_empty() && links.len() != expected {
            return Err(TacoError::InvalidConfig(format!(
                "expected {} link sets for a {}x{} grid, got {}",
                expected,
                width,
                height,
                links.len()
            )));
        }

        let mut connections = derive_connections(width, height, types);
        for (derived, &extra) in connections.iter_mut().zip(links) {
            *derived = derived.union(extra);
        }
        let panels = types
            .iter()
            .zip(connections)
            .enumerate()
            .map(|(index, (&panel_type, connections))| {
                let position = TilePos::new((index as u32 % width) as i32, (index as u32 / width) as i32);
                Panel {
                    connections,
                    ..Panel::new(position, panel_type)
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            tile_size,
            panels,
        })
    }

    /// Parses an ASCII map (one string per row, symbols from [`PanelType::symbol`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::{PanelType, TerrainGrid, TilePos};
    ///
    /// let grid = TerrainGrid::parse(&["###", "#H#", "###"], 30).unwrap();
    /// assert_eq!(grid.dimensions(), (3, 3));
    /// assert_eq!(grid.panel_type_at(TilePos::new(1, 1)), Some(PanelType::PlayerHouse));
    /// ```
    pub fn parse(rows: &[&str], tile_size: u32) -> TacoResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0) as u32;
        let mut types = Vec::with_capacity(width as usize * height as usize);

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(TacoError::InvalidConfig(format!("row {} is not {} wide", y, width)));
            }
            for symbol in row.chars() {
                let panel_type = PanelType::from_symbol(symbol).ok_or_else(|| {
                    TacoError::InvalidConfig(format!("unknown panel symbol '{}' in row {}", symbol, y))
                })?;
                types.push(panel_type);
            }
        }

        Self::from_types(width, height, tile_size, &types)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Grid dimensions in tiles as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// World extent in pixels as `(width, height)`.
    pub fn world_size(&self) -> (f32, f32) {
        (
            self.width as f32 * self.tile_size as f32,
            self.height as f32 * self.tile_size as f32,
        )
    }

    /// Checks if a tile lies inside the grid.
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Gets the panel at raw coordinates; `None` when out of range.
    pub fn get_panel(&self, x: i32, y: i32) -> Option<&Panel> {
        self.panel_at(TilePos::new(x, y))
    }

    /// Gets the panel at a tile; `None` when out of range.
    pub fn panel_at(&self, pos: TilePos) -> Option<&Panel> {
        self.index(pos).map(|index| &self.panels[index])
    }

    pub fn panel_type_at(&self, pos: TilePos) -> Option<PanelType> {
        self.panel_at(pos).map(|panel| panel.panel_type)
    }

    /// Iterates over all panels row by row.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter()
    }

    /// Positions of every panel of the given type, row-major.
    pub fn positions_of(&self, panel_type: PanelType) -> Vec<TilePos> {
        self.panels
            .iter()
            .filter(|panel| panel.panel_type == panel_type)
            .map(Panel::position)
            .collect()
    }

    pub fn count(&self, panel_type: PanelType) -> usize {
        self.panels
            .iter()
            .filter(|panel| panel.panel_type == panel_type)
            .count()
    }

    /// Geometric centre tile, `(floor(width/2), floor(height/2))`.
    pub fn center(&self) -> TilePos {
        TilePos::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Tile of the player's house.
    ///
    /// Generated maps always put it at [`TerrainGrid::center`]; hand-written maps
    /// may place it anywhere, so the first house panel wins, falling back to the
    /// centre.
    pub fn player_house(&self) -> TilePos {
        self.panels
            .iter()
            .find(|panel| panel.panel_type == PanelType::PlayerHouse)
            .map(Panel::position)
            .unwrap_or_else(|| self.center())
    }

    /// Distance in tiles from a position to the nearest map edge.
    pub fn edge_distance(&self, pos: TilePos) -> u32 {
        let right = self.width as i32 - 1 - pos.x;
        let bottom = self.height as i32 - 1 - pos.y;
        pos.x.min(pos.y).min(right).min(bottom).max(0) as u32
    }

    /// Whether the tile sits on the outer ring of the grid.
    pub fn is_boundary(&self, pos: TilePos) -> bool {
        self.contains(pos) && self.edge_distance(pos) == 0
    }

    /// World-space centre of a tile.
    pub fn tile_center(&self, pos: TilePos) -> WorldPoint {
        let half = self.tile_size as f32 / 2.0;
        WorldPoint::new(
            pos.x as f32 * self.tile_size as f32 + half,
            pos.y as f32 * self.tile_size as f32 + half,
        )
    }

    /// Tile containing a world point; `None` outside the grid.
    pub fn world_to_tile(&self, point: WorldPoint) -> Option<TilePos> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let pos = TilePos::new(
            (point.x / self.tile_size as f32).floor() as i32,
            (point.y / self.tile_size as f32).floor() as i32,
        );
        self.contains(pos).then_some(pos)
    }

    /// Tile containing a world point, clamped onto the grid.
    pub fn world_to_tile_clamped(&self, point: WorldPoint) -> TilePos {
        let x = (point.x / self.tile_size as f32).floor() as i32;
        let y = (point.y / self.tile_size as f32).floor() as i32;
        TilePos::new(
            x.clamp(0, self.width as i32 - 1),
            y.clamp(0, self.height as i32 - 1),
        )
    }

    /// Whether a world point lies on an invulnerable panel.
    pub fn is_invulnerable_at(&self, point: WorldPoint) -> bool {
        self.world_to_tile(point)
            .and_then(|pos| self.panel_at(pos))
            .map(|panel| panel.invulnerable)
            .unwrap_or(false)
    }
}

impl fmt::Display for TerrainGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.panels.chunks(self.width as usize) {
            let line: String = row.iter().map(|panel| panel.panel_type.symbol()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Derives connection flags for a row-major type layout.
pub(crate) fn derive_connections(width: u32, height: u32, types: &[PanelType]) -> Vec<Connections> {
    let type_at = |pos: TilePos| -> Option<PanelType> {
        if pos.x < 0 || pos.y < 0 || pos.x as u32 >= width || pos.y as u32 >= height {
            return None;
        }
        types.get(pos.y as usize * width as usize + pos.x as usize).copied()
    };

    types
        .iter()
        .enumerate()
        .map(|(index, &panel_type)| {
            let pos = TilePos::new((index as u32 % width) as i32, (index as u32 / width) as i32);
            let mut connections = Connections::default();
            for direction in Direction::ALL {
                let linked = type_at(pos.step(direction))
                    .map(|neighbor| panel_type.connects_to(neighbor))
                    .unwrap_or(false);
                connections.set(direction, linked);
            }
            connections
        })
        .collect()
}
