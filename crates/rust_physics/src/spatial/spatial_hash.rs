//! Uniform-grid spatial hash
//!
//! Space is cut into cubes of side `cell_size`. A body is listed in every
//! cell its AABB touches, and the exact key list is remembered per body so
//! removal never has to search.
//!
//! Cells should be about the size of a typical body. A body spanning more
//! than [`MAX_CELLS_PER_BODY`] cells is not written into the grid; it is kept
//! on a short overflow list that every query scans directly.

use std::collections::{HashMap, HashSet};

use crate::core::config::DEFAULT_CELL_SIZE;
use crate::foundation::math::{utils, Vec3};
use crate::physics::body::BodyHandle;
use crate::physics::collision::AABB;
use crate::physics::error::PhysicsError;
use super::spatial_query::SpatialQuery;

/// Largest number of cells a single body is written into
pub const MAX_CELLS_PER_BODY: u64 = 4096;

/// Integer coordinate of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Cell index along X
    pub x: i32,
    /// Cell index along Y
    pub y: i32,
    /// Cell index along Z
    pub z: i32,
}

impl CellCoord {
    /// Create a cell coordinate
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// What the hash remembers about each stored body
#[derive(Debug, Clone)]
struct HashEntry {
    keys: Vec<CellCoord>,
    aabb: AABB,
    oversized: bool,
}

/// Inclusive cell range covered by an AABB
#[derive(Debug, Clone, Copy)]
struct CellRange {
    min: CellCoord,
    max: CellCoord,
}

impl CellRange {
    fn cell_count(&self) -> u64 {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1).max(0) as u64;
        span(self.min.x, self.max.x)
            .saturating_mul(span(self.min.y, self.max.y))
            .saturating_mul(span(self.min.z, self.max.z))
    }

    fn contains(&self, key: &CellCoord) -> bool {
        (self.min.x..=self.max.x).contains(&key.x)
            && (self.min.y..=self.max.y).contains(&key.y)
            && (self.min.z..=self.max.z).contains(&key.z)
    }

    fn for_each(&self, mut f: impl FnMut(CellCoord)) {
        for x in self.min.x..=self.max.x {
            for y in self.min.y..=self.max.y {
                for z in self.min.z..=self.max.z {
                    f(CellCoord::new(x, y, z));
                }
            }
        }
    }

    fn keys(&self) -> Vec<CellCoord> {
        let mut keys = Vec::new();
        self.for_each(|key| keys.push(key));
        keys
    }
}

/// Broad-phase spatial hash over a uniform grid
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<BodyHandle>>,
    entries: HashMap<BodyHandle, HashEntry>,
    oversized: Vec<BodyHandle>,
}

impl SpatialHash {
    /// Create an empty hash with the given cell side length
    pub fn new(cell_size: f32) -> Result<Self, PhysicsError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(PhysicsError::InvalidCellSize(cell_size));
        }

        Ok(Self {
            cell_size,
            cells: HashMap::new(),
            entries: HashMap::new(),
            oversized: Vec::new(),
        })
    }

    /// Cell side length
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of stored bodies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no body is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a body is stored
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.entries.contains_key(&body)
    }

    /// Number of bodies too large to be written into the grid
    pub fn oversized_count(&self) -> usize {
        self.oversized.len()
    }

    /// Cell keys recorded for a body at insertion, empty for oversized bodies
    pub fn keys_for(&self, body: BodyHandle) -> Option<&[CellCoord]> {
        self.entries.get(&body).map(|entry| entry.keys.as_slice())
    }

    /// Cell containing a point
    pub fn cell_of(&self, point: Vec3) -> CellCoord {
        let cell = utils::floor(&(point / self.cell_size));
        // `as` saturates, so far-away points land in the border cells
        CellCoord::new(cell.x as i32, cell.y as i32, cell.z as i32)
    }

    /// Cell keys covered by an AABB, `floor(coord / cell_size)` inclusive per axis
    ///
    /// The list is materialised, so keep the AABB within a few cells.
    pub fn keys_for_aabb(&self, aabb: &AABB) -> Vec<CellCoord> {
        self.cell_range(aabb).keys()
    }

    fn cell_range(&self, aabb: &AABB) -> CellRange {
        CellRange {
            min: self.cell_of(aabb.min),
            max: self.cell_of(aabb.max),
        }
    }

    /// Insert a body under every cell its AABB covers
    ///
    /// Inserting a body that is already stored first removes its old
    /// entries, so the recorded keys always match the latest AABB.
    pub fn insert(&mut self, body: BodyHandle, aabb: &AABB) {
        if self.entries.contains_key(&body) {
            self.remove(body);
        }

        let range = self.cell_range(aabb);
        if range.cell_count() > MAX_CELLS_PER_BODY {
            log::debug!(
                "SpatialHash: {:?} spans {} cells of size {}, kept on the overflow list",
                body,
                range.cell_count(),
                self.cell_size
            );
            self.oversized.push(body);
            self.entries.insert(body, HashEntry { keys: Vec::new(), aabb: *aabb, oversized: true });
            return;
        }

        let keys = range.keys();
        for key in &keys {
            self.cells.entry(*key).or_default().push(body);
        }
        self.entries.insert(body, HashEntry { keys, aabb: *aabb, oversized: false });
    }

    /// Remove a body using its recorded key list; empty cells are pruned
    pub fn remove(&mut self, body: BodyHandle) -> bool {
        let Some(entry) = self.entries.remove(&body) else {
            return false;
        };

        if entry.oversized {
            self.oversized.retain(|&stored| stored != body);
        }
        for key in &entry.keys {
            if let Some(cell) = self.cells.get_mut(key) {
                cell.retain(|&stored| stored != body);
                if cell.is_empty() {
                    self.cells.remove(key);
                }
            }
        }
        true
    }

    /// Bodies listed in any cell the query AABB covers, deduplicated
    ///
    /// This is a coarse query: results may include bodies that share a cell
    /// with the region without overlapping it, but never miss one that does.
    pub fn query(&self, aabb: &AABB) -> Vec<BodyHandle> {
        self.collect_cells(aabb, None)
    }

    /// Neighbors of a stored body, excluding the body itself
    pub fn query_nearby(&self, body: BodyHandle) -> Vec<BodyHandle> {
        match self.entries.get(&body) {
            Some(entry) => self.collect_cells(&entry.aabb, Some(body)),
            None => Vec::new(),
        }
    }

    /// Bodies whose AABB comes within `radius` of `position`
    pub fn bodies_in_radius(&self, position: Vec3, radius: f32) -> Vec<BodyHandle> {
        if !radius.is_finite() || radius < 0.0 {
            return Vec::new();
        }

        let region = AABB::from_center_extents(position, Vec3::repeat(radius));
        let radius_sq = radius * radius;

        self.collect_cells(&region, None)
            .into_iter()
            .filter(|body| {
                self.entries.get(body).is_some_and(|entry| {
                    (entry.aabb.closest_point(position) - position).magnitude_squared() <= radius_sq
                })
            })
            .collect()
    }

    /// Remove every body; the cell size is kept
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.oversized.clear();
    }

    fn collect_cells(&self, aabb: &AABB, exclude: Option<BodyHandle>) -> Vec<BodyHandle> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        let mut visit = |cell: &[BodyHandle]| {
            for &body in cell {
                if Some(body) != exclude && seen.insert(body) {
                    results.push(body);
                }
            }
        };

        // Huge regions scan the occupied cells instead of every covered key
        let range = self.cell_range(aabb);
        if range.cell_count() > self.cells.len() as u64 {
            for (key, cell) in &self.cells {
                if range.contains(key) {
                    visit(cell);
                }
            }
        } else {
            range.for_each(|key| {
                if let Some(cell) = self.cells.get(&key) {
                    visit(cell);
                }
            });
        }

        for &body in &self.oversized {
            let overlaps = self.entries.get(&body).is_some_and(|entry| entry.aabb.intersects(aabb));
            if overlaps {
                visit(std::slice::from_ref(&body));
            }
        }

        results
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            cells: HashMap::new(),
            entries: HashMap::new(),
            oversized: Vec::new(),
        }
    }
}

impl SpatialQuery for SpatialHash {
    fn insert(&mut self, body: BodyHandle, aabb: &AABB) {
        SpatialHash::insert(self, body, aabb);
    }

    fn remove(&mut self, body: BodyHandle) -> bool {
        SpatialHash::remove(self, body)
    }

    fn query_aabb(&self, aabb: &AABB) -> Vec<BodyHandle> {
        self.query(aabb)
    }

    fn query_nearby(&self, body: BodyHandle) -> Vec<BodyHandle> {
        SpatialHash::query_nearby(self, body)
    }

    fn query_sphere(&self, position: Vec3, radius: f32) -> Vec<BodyHandle> {
        self.bodies_in_radius(position, radius)
    }

    fn clear(&mut self) {
        SpatialHash::clear(self);
    }

    fn body_count(&self) -> usize {
        self.len()
    }
}
