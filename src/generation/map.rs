//! # Terrain Generation
//!
//! Builds a terrain grid through an ordered sequence of placement stages.
//!
//! Each stage may only claim cells no earlier stage claimed:
//! 1. The player house at grid centre
//! 2. A path and water skeleton crossing next to the house
//! 3. Neighbour houses and the station, kept clear of the house and each other
//! 4. A rail spur running out of the station
//! 5. A sea along one edge, a river linking it to the house and one more
//!    short river
//! 6. Rice fields everywhere else
//!
//! Connections are derived only once all cells are claimed. Links a stage
//! lays itself (the rail spur) survive that pass.

use super::{utils, GenerationConfig, Generator};
use crate::game::{Connections, Direction, PanelType, TerrainGrid, TilePos};
use crate::{TacoError, TacoResult};
use ::pathfinding::prelude::{bfs, bfs_reach};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Mutable claim map threaded through the generation stages.
///
/// Cells start unclaimed; a claim is permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapBuilder {
    width: u32,
    height: u32,
    cells: Vec<Option<PanelType>>,
    links: Vec<Connections>,
}

impl MapBuilder {
    /// Creates an empty builder for a `width` x `height` grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            links: vec![Connections::default(); width as usize * height as usize],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn center(&self) -> TilePos {
        TilePos::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Whether an earlier stage already owns this cell.
    ///
    /// Out-of-range cells report as claimed so no stage ever writes them.
    pub fn is_claimed(&self, pos: TilePos) -> bool {
        self.index(pos)
            .map(|index| self.cells[index].is_some())
            .unwrap_or(true)
    }

    /// Type claimed at a cell, if any.
    pub fn claimed_type(&self, pos: TilePos) -> Option<PanelType> {
        self.index(pos).and_then(|index| self.cells[index])
    }

    /// Claims a free cell; returns `false` when it is taken or out of range.
    pub fn claim(&mut self, pos: TilePos, panel_type: PanelType) -> bool {
        match self.index(pos) {
            Some(index) if self.cells[index].is_none() => {
                self.cells[index] = Some(panel_type);
                true
            }
            _ => false,
        }
    }

    /// Records a stage-local link between two adjacent cells, on both sides.
    ///
    /// Returns `false` when the cells are not 4-neighbours inside the grid.
    pub fn link(&mut self, a: TilePos, b: TilePos) -> bool {
        let Some(direction) = Direction::ALL.into_iter().find(|&d| a.step(d) == b) else {
            return false;
        };
        match (self.index(a), self.index(b)) {
            (Some(from), Some(to)) => {
                self.links[from].set(direction, true);
                self.links[to].set(direction.opposite(), true);
                true
            }
            _ => false,
        }
    }

    /// Stage-local links recorded at a cell.
    pub fn links_at(&self, pos: TilePos) -> Connections {
        self.index(pos)
            .map(|index| self.links[index])
            .unwrap_or_default()
    }

    /// Number of consecutive free cells starting one step from `origin`.
    pub fn open_run(&self, origin: TilePos, direction: Direction) -> u32 {
        let mut run = 0;
        let mut pos = origin.step(direction);
        while !self.is_claimed(pos) {
            run += 1;
            pos = pos.step(direction);
        }
        run
    }

    /// Fills every free cell with `panel_type`.
    pub fn fill_unclaimed(&mut self, panel_type: PanelType) {
        for cell in self.cells.iter_mut().filter(|cell| cell.is_none()) {
            *cell = Some(panel_type);
        }
    }

    /// Freezes the claims into a grid, derives connections and keeps the
    /// stage-local links on top.
    ///
    /// Fails if any cell is still unclaimed.
    pub fn build(self, tile_size: u32) -> TacoResult<TerrainGrid> {
        let types = self
            .cells
            .iter()
            .map(|cell| {
                cell.ok_or_else(|| {
                    TacoError::GenerationFailed("grid has unclaimed cells".to_string())
                })
            })
            .collect::<TacoResult<Vec<_>>>()?;
        TerrainGrid::from_parts(self.width, self.height, tile_size, &types, &self.links)
    }

    /// Water cells joined to the house through water, plus the house itself.
    fn water_reach(&self, house: TilePos) -> HashSet<TilePos> {
        bfs_reach(house, |pos: &TilePos| {
            pos.cardinal_neighbors()
                .into_iter()
                .filter(|&neighbor| self.claimed_type(neighbor) == Some(PanelType::Water))
                .collect::<Vec<_>>()
        })
        .collect()
    }
}

/// Inclusive range between two bounds given in either order.
fn span(a: u32, b: u32) -> RangeInclusive<u32> {
    a.min(b)..=a.max(b)
}

/// Terrain generator for the countryside around the player's house.
#[derive(Debug, Clone, Default)]
pub struct TerrainGenerator;

impl TerrainGenerator {
    /// Creates a new terrain generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use tacojiman::{GenerationConfig, Generator, TerrainGenerator, PanelType};
    /// use tacojiman::generation::utils::create_rng;
    ///
    /// let config = GenerationConfig::for_testing(1);
    /// let grid = TerrainGenerator::new()
    ///     .generate(&config, &mut create_rng(&config))
    ///     .unwrap();
    /// assert_eq!(grid.count(PanelType::PlayerHouse), 1);
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Places the player house at grid centre.
    fn place_player_house(&self, builder: &mut MapBuilder) {
        let center = builder.center();
        builder.claim(center, PanelType::PlayerHouse);
    }

    /// Lays the crossing path and water lines next to the house.
    ///
    /// Paths run along column `cx - 1` and row `cy + 1`, water along column
    /// `cx + 1` and row `cy - 1`. Paths go down first, so water is cut
    /// wherever it crosses a path line.
    fn lay_skeleton(&self, builder: &mut MapBuilder) {
        let (width, height) = builder.dimensions();
        let center = builder.center();

        for y in 0..height as i32 {
            builder.claim(TilePos::new(center.x - 1, y), PanelType::Path);
        }
        for x in 0..width as i32 {
            builder.claim(TilePos::new(x, center.y + 1), PanelType::Path);
        }
        for y in 0..height as i32 {
            builder.claim(TilePos::new(center.x + 1, y), PanelType::Water);
        }
        for x in 0..width as i32 {
            builder.claim(TilePos::new(x, center.y - 1), PanelType::Water);
        }
    }

    /// Tries to claim a random free cell clear of the house and `placed`.
    fn place_landmark(
        &self,
        builder: &mut MapBuilder,
        panel_type: PanelType,
        placed: &[TilePos],
        attempts: u32,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Option<TilePos> {
        let (width, height) = builder.dimensions();
        let center = builder.center();

        for _ in 0..attempts {
            let candidate = TilePos::new(
                rng.gen_range(0..width as i32),
                rng.gen_range(0..height as i32),
            );
            let too_close = candidate.chebyshev_distance(center) <= config.exclusion_radius
                || placed
                    .iter()
                    .any(|&other| candidate.chebyshev_distance(other) <= config.exclusion_radius);
            if too_close || builder.is_claimed(candidate) {
                continue;
            }

            builder.claim(candidate, panel_type);
            return Some(candidate);
        }

        None
    }

    /// Places neighbour houses, then the station. Returns the station tile.
    fn place_landmarks(
        &self,
        builder: &mut MapBuilder,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Option<TilePos> {
        let mut placed = Vec::new();

        for index in 0..config.other_house_count {
            match self.place_landmark(
                builder,
                PanelType::OtherHouse,
                &placed,
                config.house_attempts,
                config,
                rng,
            ) {
                Some(pos) => placed.push(pos),
                None => warn!(
                    "Could not place neighbour house {} after {} attempts",
                    index + 1,
                    config.house_attempts
                ),
            }
        }

        let station = self.place_landmark(
            builder,
            PanelType::Station,
            &placed,
            config.station_attempts,
            config,
            rng,
        );
        if station.is_none() {
            warn!(
                "Could not place station after {} attempts",
                config.station_attempts
            );
        }
        station
    }

    /// Grows the rail spur out of the station along its longest open run.
    ///
    /// The station links to the first rail and each rail to the next; the
    /// far end links back only.
    fn lay_rail(
        &self,
        builder: &mut MapBuilder,
        station: TilePos,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        let best = Direction::ALL
            .iter()
            .map(|&direction| (direction, builder.open_run(station, direction)))
            .fold(None, |best: Option<(Direction, u32)>, candidate| match best {
                Some(current) if current.1 >= candidate.1 => Some(current),
                _ => Some(candidate),
            });

        let (direction, run) = match best {
            Some((direction, run)) if run > 0 => (direction, run),
            _ => {
                warn!("Station at {:?} is boxed in; no rail laid", station);
                return;
            }
        };

        let length = rng
            .gen_range(span(config.rail_min_len, config.rail_max_len))
            .min(run);

        let mut laid = 0;
        let mut pos = station;
        for _ in 0..length {
            let next = pos.step(direction);
            if !builder.claim(next, PanelType::Rail) {
                break;
            }
            builder.link(pos, next);
            laid += 1;
            pos = next;
        }

        debug!(
            "Rail spur of {} tiles heading {:?} from station {:?}",
            laid, direction, station
        );
    }

    /// Floods coastline tiles along one random edge and pushes each inland.
    ///
    /// Inland depth is capped by how far the coast tile sits from the house.
    /// Returns the sea tiles claimed.
    fn lay_sea(
        &self,
        builder: &mut MapBuilder,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Vec<TilePos> {
        let (width, height) = builder.dimensions();
        let center = builder.center();
        let edge = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        let inland = edge.opposite();
        let coast_len = rng.gen_range(span(config.sea_coast_min, config.sea_coast_max));

        let mut sea = Vec::new();
        for _ in 0..coast_len {
            let coast = match edge {
                Direction::North => TilePos::new(rng.gen_range(0..width as i32), 0),
                Direction::South => TilePos::new(rng.gen_range(0..width as i32), height as i32 - 1),
                Direction::West => TilePos::new(0, rng.gen_range(0..height as i32)),
                Direction::East => TilePos::new(width as i32 - 1, rng.gen_range(0..height as i32)),
            };
            let max_depth = (coast.chebyshev_distance(center) * 6 / 10).max(5);
            let depth = rng
                .gen_range(span(config.sea_depth_min, config.sea_depth_max))
                .min(max_depth);

            let mut pos = coast;
            for _ in 0..depth {
                if builder.claim(pos, PanelType::Water) {
                    sea.push(pos);
                }
                pos = pos.step(inland);
            }
        }

        debug!("Sea of {} tiles along the {:?} edge", sea.len(), edge);
        sea
    }

    /// Carves a river from the sea to the water beside the house.
    ///
    /// The river only crosses free cells and water. Returns the newly claimed
    /// river tiles, empty when the sea already touches the house water, or
    /// `None` when no sea tile can get there.
    fn lay_house_river(
        &self,
        builder: &mut MapBuilder,
        sea: &[TilePos],
        rng: &mut StdRng,
    ) -> Option<Vec<TilePos>> {
        let house = builder.center();
        let house_water = builder.water_reach(house);
        if sea.iter().any(|pos| house_water.contains(pos)) {
            return Some(Vec::new());
        }

        let mut sources = sea.to_vec();
        sources.shuffle(rng);
        let route = sources.iter().find_map(|source| {
            bfs(
                source,
                |pos: &TilePos| {
                    let mut next: Vec<TilePos> = pos
                        .cardinal_neighbors()
                        .into_iter()
                        .filter(|&neighbor| {
                            builder.contains(neighbor)
                                && matches!(
                                    builder.claimed_type(neighbor),
                                    None | Some(PanelType::Water)
                                )
                        })
                        .collect();
                    next.shuffle(rng);
                    next
                },
                |pos: &TilePos| *pos != house && house_water.contains(pos),
            )
        })?;

        let river: Vec<TilePos> = route
            .into_iter()
            .filter(|&pos| builder.claim(pos, PanelType::Water))
            .collect();
        debug!("River of {} tiles links the sea to the house", river.len());
        Some(river)
    }

    /// Lets a short river wander off a random sea tile through free cells.
    fn lay_wandering_river(
        &self,
        builder: &mut MapBuilder,
        sea: &[TilePos],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Vec<TilePos> {
        let Some(&source) = sea.choose(rng) else {
            return Vec::new();
        };
        let length = rng.gen_range(span(config.river_min_len, config.river_max_len));

        let mut river = Vec::new();
        let mut pos = source;
        for _ in 0..length {
            let open: Vec<TilePos> = pos
                .cardinal_neighbors()
                .into_iter()
                .filter(|&neighbor| !builder.is_claimed(neighbor))
                .collect();
            let Some(&next) = open.choose(rng) else {
                break;
            };
            builder.claim(next, PanelType::Water);
            river.push(next);
            pos = next;
        }
        river
    }

    /// Sea first, then the river to the house, then the wandering river.
    fn lay_water(&self, builder: &mut MapBuilder, config: &GenerationConfig, rng: &mut StdRng) {
        let sea = self.lay_sea(builder, config, rng);
        if sea.is_empty() {
            warn!("No free coastline for the sea");
            return;
        }
        if self.lay_house_river(builder, &sea, rng).is_none() {
            debug!("Sea is cut off from the house by the path lines");
        }
        self.lay_wandering_river(builder, &sea, config, rng);
    }
}

impl Generator<TerrainGrid> for TerrainGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> TacoResult<TerrainGrid> {
        let (width, height) = config.grid_dimensions();
        if width == 0 || height == 0 || config.tile_size == 0 {
            return Err(TacoError::InvalidConfig(format!(
                "cannot generate a {}x{} grid with tile size {}",
                width, height, config.tile_size
            )));
        }

        let mut builder = MapBuilder::new(width, height);

        self.place_player_house(&mut builder);
        self.lay_skeleton(&mut builder);
        if let Some(station) = self.place_landmarks(&mut builder, config, rng) {
            self.lay_rail(&mut builder, station, config, rng);
        }
        self.lay_water(&mut builder, config, rng);
        builder.fill_unclaimed(PanelType::RiceField);

        let grid = builder.build(config.tile_size)?;
        debug!(
            "Generated {}x{} terrain (seed {}): {} houses, {} stations, {} rails",
            width,
            height,
            config.seed,
            grid.count(PanelType::OtherHouse),
            grid.count(PanelType::Station),
            grid.count(PanelType::Rail)
        );

        self.validate(&grid, config)?;
        Ok(grid)
    }

    fn validate(&self, grid: &TerrainGrid, config: &GenerationConfig) -> TacoResult<()> {
        if grid.dimensions() != config.grid_dimensions() {
            return Err(TacoError::GenerationFailed(format!(
                "grid is {:?}, expected {:?}",
                grid.dimensions(),
                config.grid_dimensions()
            )));
        }
        if grid.count(PanelType::OtherHouse) > config.other_house_count as usize
            || grid.count(PanelType::Station) > 1
        {
            return Err(TacoError::GenerationFailed(
                "too many landmarks placed".to_string(),
            ));
        }
        utils::validate_terrain(grid)
    }

    fn generator_type(&self) -> &'static str {
        "TerrainGenerator"
    }
}

/// Generates a terrain grid for `config`, seeding the random source from it.
pub fn generate_terrain(config: &GenerationConfig) -> TacoResult<TerrainGrid> {
    let mut rng = utils::create_rng(config);
    TerrainGenerator::new().generate(config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn generate(seed: u64) -> TerrainGrid {
        generate_terrain(&GenerationConfig::new(seed)).unwrap()
    }

    #[test]
    fn test_builder_claims_are_permanent() {
        let mut builder = MapBuilder::new(3, 3);
        let pos = TilePos::new(1, 1);
        assert!(!builder.is_claimed(pos));
        assert!(builder.claim(pos, PanelType::Path));
        assert!(!builder.claim(pos, PanelType::Water));
        assert_eq!(builder.claimed_type(pos), Some(PanelType::Path));
        assert!(builder.is_claimed(TilePos::new(-1, 0)));
        assert!(!builder.claim(TilePos::new(3, 0), PanelType::Path));
    }

    #[test]
    fn test_builder_open_run() {
        let mut builder = MapBuilder::new(6, 1);
        builder.claim(TilePos::new(4, 0), PanelType::Water);
        let origin = TilePos::new(1, 0);
        assert_eq!(builder.open_run(origin, Direction::East), 2);
        assert_eq!(builder.open_run(origin, Direction::West), 1);
        assert_eq!(builder.open_run(origin, Direction::North), 0);
    }

    #[test]
    fn test_build_requires_every_cell() {
        let builder = MapBuilder::new(2, 2);
        assert!(builder.build(30).is_err());
    }

    #[test]
    fn test_house_and_skeleton_layout() {
        let grid = generate(11);
        let center = grid.center();
        assert_eq!(center, TilePos::new(14, 14));
        assert_eq!(grid.panel_type_at(center), Some(PanelType::PlayerHouse));

        for y in 0..grid.height() as i32 {
            assert_eq!(grid.panel_type_at(TilePos::new(center.x - 1, y)), Some(PanelType::Path));
        }
        for x in 0..grid.width() as i32 {
            assert_eq!(grid.panel_type_at(TilePos::new(x, center.y + 1)), Some(PanelType::Path));
        }
        assert_eq!(
            grid.panel_type_at(TilePos::new(center.x + 1, 0)),
            Some(PanelType::Water)
        );
        assert_eq!(
            grid.panel_type_at(TilePos::new(grid.width() as i32 - 1, center.y - 1)),
            Some(PanelType::Water)
        );
        // Water is interrupted where it crosses a path line
        assert_eq!(
            grid.panel_type_at(TilePos::new(center.x - 1, center.y - 1)),
            Some(PanelType::Path)
        );
        assert_eq!(
            grid.panel_type_at(TilePos::new(center.x + 1, center.y + 1)),
            Some(PanelType::Path)
        );
    }

    #[test]
    fn test_landmarks_respect_exclusion_radius() {
        for seed in 0..20 {
            let grid = generate(seed);
            let center = grid.center();
            let mut landmarks = grid.positions_of(PanelType::OtherHouse);
            landmarks.extend(grid.positions_of(PanelType::Station));

            assert_eq!(grid.count(PanelType::OtherHouse), 2, "seed {}", seed);
            assert_eq!(grid.count(PanelType::Station), 1, "seed {}", seed);
            for (i, &a) in landmarks.iter().enumerate() {
                assert!(a.chebyshev_distance(center) > 2);
                for &b in &landmarks[i + 1..] {
                    assert!(a.chebyshev_distance(b) > 2);
                }
            }
        }
    }

    #[test]
    fn test_rail_spur_starts_at_station() {
        for seed in 0..20 {
            let grid = generate(seed);
            let rails = grid.positions_of(PanelType::Rail);
            assert!(rails.len() <= 8, "seed {}", seed);
            if rails.is_empty() {
                continue;
            }
            let station = grid.positions_of(PanelType::Station)[0];
            assert!(
                rails.iter().any(|&rail| rail.manhattan_distance(station) == 1),
                "seed {}",
                seed
            );
            // All rail tiles share a row or a column with the station
            assert!(
                rails.iter().all(|rail| rail.x == station.x) || rails.iter().all(|rail| rail.y == station.y),
                "seed {}",
                seed
            );
        }
    }

    #[test]
    fn test_rail_spur_far_end_is_terminal() {
        let mut builder = MapBuilder::new(6, 1);
        let station = TilePos::new(0, 0);
        builder.claim(station, PanelType::Station);
        let config = GenerationConfig {
            rail_min_len: 3,
            rail_max_len: 3,
            ..GenerationConfig::new(1)
        };
        let mut rng = StdRng::seed_from_u64(1);
        TerrainGenerator::new().lay_rail(&mut builder, station, &config, &mut rng);
        assert_eq!(builder.claimed_type(TilePos::new(3, 0)), Some(PanelType::Rail));
        assert!(!builder.is_claimed(TilePos::new(4, 0)));

        builder.fill_unclaimed(PanelType::RiceField);
        let grid = builder.build(30).unwrap();

        let station = &grid.get_panel(0, 0).unwrap().connections;
        assert!(station.east);
        assert_eq!(station.count(), 1);
        let first = &grid.get_panel(1, 0).unwrap().connections;
        assert!(first.west && first.east);
        let far_end = &grid.get_panel(3, 0).unwrap().connections;
        assert!(far_end.west);
        assert_eq!(far_end.count(), 1);
    }

    #[test]
    fn test_generated_station_links_to_its_spur() {
        for seed in 0..20 {
            let grid = generate(seed);
            let Some(&station) = grid.positions_of(PanelType::Station).first() else {
                continue;
            };
            let Some(outward) = Direction::ALL
                .into_iter()
                .find(|&d| grid.panel_type_at(station.step(d)) == Some(PanelType::Rail))
            else {
                continue;
            };

            let links = &grid.panel_at(station).unwrap().connections;
            assert!(links.get(outward), "seed {}", seed);
            assert_eq!(links.count(), 1, "seed {}", seed);

            let mut far_end = station.step(outward);
            while grid.panel_type_at(far_end.step(outward)) == Some(PanelType::Rail) {
                far_end = far_end.step(outward);
            }
            let links = &grid.panel_at(far_end).unwrap().connections;
            assert!(links.get(outward.opposite()), "seed {}", seed);
            assert!(
                !links.get(outward)
                    || grid.panel_type_at(far_end.step(outward)) == Some(PanelType::Path),
                "seed {}",
                seed
            );
        }
    }

    #[test]
    fn test_house_river_joins_the_sea_to_the_house() {
        let generator = TerrainGenerator::new();
        let mut carved = 0;
        for seed in 0..60 {
            let config = GenerationConfig::new(seed);
            let mut rng = utils::create_rng(&config);
            let (width, height) = config.grid_dimensions();
            let mut builder = MapBuilder::new(width, height);
            generator.place_player_house(&mut builder);
            generator.lay_skeleton(&mut builder);
            if let Some(station) = generator.place_landmarks(&mut builder, &config, &mut rng) {
                generator.lay_rail(&mut builder, station, &config, &mut rng);
            }
            let sea = generator.lay_sea(&mut builder, &config, &mut rng);
            assert!(!sea.is_empty(), "seed {}", seed);
            let (w, h) = (width as i32, height as i32);
            assert!(sea
                .iter()
                .all(|pos| pos.x.min(pos.y).min(w - 1 - pos.x).min(h - 1 - pos.y) < 6));

            let Some(river) = generator.lay_house_river(&mut builder, &sea, &mut rng) else {
                continue;
            };
            let reach = builder.water_reach(builder.center());
            assert!(sea.iter().any(|pos| reach.contains(pos)), "seed {}", seed);
            assert!(river.iter().all(|pos| reach.contains(pos)), "seed {}", seed);
            if !river.is_empty() {
                carved += 1;
            }
        }
        assert!(carved > 0);
    }

    #[test]
    fn test_wandering_river_only_takes_free_cells() {
        let mut builder = MapBuilder::new(5, 5);
        for x in 0..5 {
            builder.claim(TilePos::new(x, 0), PanelType::Water);
            builder.claim(TilePos::new(x, 2), PanelType::Path);
        }
        let sea = vec![TilePos::new(0, 0)];
        let config = GenerationConfig {
            river_min_len: 9,
            river_max_len: 9,
            ..GenerationConfig::new(4)
        };
        let mut rng = StdRng::seed_from_u64(4);
        let river = TerrainGenerator::new().lay_wandering_river(&mut builder, &sea, &config, &mut rng);

        // Row 1 is the only free ground next to the sea and it is boxed in by the path
        assert!(!river.is_empty());
        assert!(river.len() <= 5);
        assert!(river.iter().all(|pos| pos.y == 1));
        assert!(river
            .iter()
            .all(|&pos| builder.claimed_type(pos) == Some(PanelType::Water)));
    }

    #[test]
    fn test_remaining_cells_are_rice() {
        let grid = generate(5);
        let total = (grid.width() * grid.height()) as usize;
        let named = [
            PanelType::Water,
            PanelType::OtherHouse,
            PanelType::Station,
            PanelType::Rail,
            PanelType::PlayerHouse,
            PanelType::Path,
        ]
        .iter()
        .map(|&panel_type| grid.count(panel_type))
        .sum::<usize>();
        assert_eq!(grid.count(PanelType::RiceField), total - named);
        assert!(grid.count(PanelType::RiceField) > 0);
    }

    #[test]
    fn test_same_seed_same_map() {
        assert_eq!(generate(99), generate(99));
    }

    #[test]
    fn test_degenerate_dimensions_rejected() {
        let config = GenerationConfig {
            world_width: 0,
            ..GenerationConfig::new(1)
        };
        assert!(matches!(
            generate_terrain(&config),
            Err(TacoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_tiny_map_still_generates() {
        let config = GenerationConfig {
            world_width: 60,
            world_height: 60,
            ..GenerationConfig::new(3)
        };
        let mut rng = StdRng::seed_from_u64(3);
        let grid = TerrainGenerator::new().generate(&config, &mut rng).unwrap();
        assert_eq!(grid.dimensions(), (2, 2));
        assert_eq!(grid.panel_type_at(TilePos::new(1, 1)), Some(PanelType::PlayerHouse));
        assert_eq!(grid.count(PanelType::OtherHouse), 0);
        assert_eq!(grid.count(PanelType::Station), 0);
    }

    #[test]
    fn test_generator_type() {
        assert_eq!(TerrainGenerator::new().generator_type(), "TerrainGenerator");
    }
}
