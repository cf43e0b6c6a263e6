use super::cell::Cell;
use crate::common::{DomainError, DomainResult};
use crate::config::{GridConfig, MovementConfig};
use crate::domains::level::{AgentType, AgentsState, ArenaBounds, Point, Rect, ShapeKind};
use serde::{Deserialize, Serialize};

const ZERO_LENGTH: f64 = 1e-9;

/// Static level geometry grouped by the agents it stops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelShapes {
    pub obstacles: Vec<Rect>,
    pub rectangle_platforms: Vec<Rect>,
    pub circle_platforms: Vec<Rect>,
}

impl LevelShapes {
    pub fn of_kind(&self, kind: ShapeKind) -> &[Rect] {
        match kind {
            ShapeKind::Obstacle => &self.obstacles,
            ShapeKind::CirclePlatform => &self.circle_platforms,
            ShapeKind::RectanglePlatform => &self.rectangle_platforms,
        }
    }

    fn of_kind_mut(&mut self, kind: ShapeKind) -> &mut Vec<Rect> {
        match kind {
            ShapeKind::Obstacle => &mut self.obstacles,
            ShapeKind::CirclePlatform => &mut self.circle_platforms,
            ShapeKind::RectanglePlatform => &mut self.rectangle_platforms,
        }
    }
}

/// Walkability grid over the arena.
///
/// Static shapes are rasterized once. A cell is blocked for a shape when the
/// whole cell lies inside that shape eroded by one cell, which keeps every
/// outline (and therefore every corner node) reachable while the interior is
/// not. Agent silhouettes are tracked separately and never block.
#[derive(Debug, Clone)]
pub struct GridModel {
    bounds: ArenaBounds,
    cell_size: f64,
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
    shapes: LevelShapes,
    agents: AgentsState,
    rectangle_area: f64,
    rectangle_heights: (f64, f64),
    occupancy: Vec<Option<AgentType>>,
    revision: u64,
}

impl GridModel {
    pub fn build(
        config: &GridConfig,
        bounds: ArenaBounds,
        shapes: LevelShapes,
        agents: AgentsState,
        movement: &MovementConfig,
    ) -> DomainResult<Self> {
        if !(config.cell_size.is_finite() && config.cell_size > 0.0) {
            return Err(DomainError::InvalidGeometry {
                reason: format!("cell size must be positive, got {}", config.cell_size),
            });
        }
        if !(bounds.width > 0.0 && bounds.height > 0.0) {
            return Err(DomainError::InvalidGeometry {
                reason: format!(
                    "arena must have a positive area, got {}x{}",
                    bounds.width, bounds.height
                ),
            });
        }

        let columns = ((bounds.width / config.cell_size).ceil() as usize).max(1);
        let rows = ((bounds.height / config.cell_size).ceil() as usize).max(1);
        let cells = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| Cell::new(column, row)))
            .collect();

        let mut grid = Self {
            bounds,
            cell_size: config.cell_size,
            columns,
            rows,
            cells,
            shapes,
            agents,
            rectangle_area: movement.rectangle_area,
            rectangle_heights: (movement.rectangle_min_height, movement.rectangle_max_height),
            occupancy: vec![None; columns * rows],
            revision: 0,
        };
        grid.rasterize();
        grid.update(agents);
        Ok(grid)
    }

    /// Re-derive agent occupancy. Static shapes are left untouched.
    pub fn update(&mut self, agents: AgentsState) {
        self.agents = agents;
        self.occupancy.iter_mut().for_each(|slot| *slot = None);

        let circle = agents.circle;
        let circle_box = Rect::new(circle.x, circle.y, circle.radius * 2.0, circle.radius * 2.0);
        for index in self.cells_overlapping(&circle_box) {
            if self.cell_center(index).distance_to(&circle.position()) <= circle.radius {
                self.occupancy[index] = Some(AgentType::Circle);
            }
        }

        let (min_height, max_height) = self.rectangle_heights;
        let silhouette = agents.rectangle.silhouette(self.rectangle_area, min_height, max_height);
        for index in self.cells_overlapping(&silhouette) {
            if silhouette.contains(&self.cell_center(index)) {
                self.occupancy[index] = Some(AgentType::Rectangle);
            }
        }
        self.revision += 1;
    }

    /// Replace one moving shape and re-rasterize the static geometry.
    pub fn move_shape(&mut self, kind: ShapeKind, slot: usize, rect: Rect) -> DomainResult<()> {
        let shapes = self.shapes.of_kind_mut(kind);
        let Some(target) = shapes.get_mut(slot) else {
            return Err(DomainError::InvalidGeometry {
                reason: format!("no {:?} in slot {}", kind, slot),
            });
        };
        *target = rect;
        self.rasterize();
        Ok(())
    }

    pub fn is_walkable_segment(&self, from: Point, to: Point, agent: AgentType) -> bool {
        if !self.bounds.contains(&from) && !self.bounds.contains(&to) {
            return false;
        }
        let length = from.distance_to(&to);
        if length < ZERO_LENGTH {
            return true;
        }

        let step = self.cell_size / 2.0;
        let samples = (length / step).ceil() as usize;
        (0..=samples).all(|i| {
            let t = i as f64 / samples as f64;
            let sample = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            match self.cell_index(&sample) {
                Some(index) => !self.cells[index].is_blocked_for(agent),
                None => false,
            }
        })
    }

    pub fn in_bounds(&self, point: &Point) -> bool {
        self.bounds.contains(point)
    }

    /// Which agent silhouette covers `point`, if any.
    pub fn occupant_at(&self, point: &Point) -> Option<AgentType> {
        self.cell_index(point).and_then(|index| self.occupancy[index])
    }

    /// The circle rests on the rectangle: the cell just under the circle's
    /// lowest point is covered by the rectangle's silhouette.
    pub fn circle_rides_rectangle(&self) -> bool {
        let circle = self.agents.circle;
        let below = Point::new(circle.x, circle.y + circle.radius + self.cell_size / 2.0);
        self.occupant_at(&below) == Some(AgentType::Rectangle)
    }

    pub fn cell_at(&self, point: &Point) -> Option<&Cell> {
        self.cell_index(point).map(|index| &self.cells[index])
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&Cell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.columns + column)
    }

    pub fn blocked_cell_count(&self, agent: AgentType) -> usize {
        self.cells.iter().filter(|c| c.is_blocked_for(agent)).count()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn bounds(&self) -> &ArenaBounds {
        &self.bounds
    }

    pub fn shapes(&self) -> &LevelShapes {
        &self.shapes
    }

    pub fn agents(&self) -> &AgentsState {
        &self.agents
    }

    /// Bumped whenever agent occupancy or static geometry changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn rasterize(&mut self) {
        self.cells.iter_mut().for_each(Cell::clear);

        let families = [
            (ShapeKind::Obstacle, true, true),
            (ShapeKind::CirclePlatform, true, false),
            (ShapeKind::RectanglePlatform, false, true),
        ];
        for (kind, blocks_circle, blocks_rectangle) in families {
            let interiors: Vec<Rect> = self
                .shapes
                .of_kind(kind)
                .iter()
                .filter_map(|shape| shape.eroded(self.cell_size))
                .collect();
            for interior in interiors {
                for index in self.cells_inside(&interior) {
                    let cell = &mut self.cells[index];
                    cell.blocked_for_circle |= blocks_circle;
                    cell.blocked_for_rectangle |= blocks_rectangle;
                }
            }
        }
        self.revision += 1;
    }

    fn cell_index(&self, point: &Point) -> Option<usize> {
        if !self.bounds.contains(point) {
            return None;
        }
        let column = (((point.x - self.bounds.x) / self.cell_size).floor() as usize).min(self.columns - 1);
        let row = (((point.y - self.bounds.y) / self.cell_size).floor() as usize).min(self.rows - 1);
        Some(row * self.columns + column)
    }

    fn cell_center(&self, index: usize) -> Point {
        let column = index % self.columns;
        let row = index / self.columns;
        Point::new(
            self.bounds.x + (column as f64 + 0.5) * self.cell_size,
            self.bounds.y + (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Cells lying entirely within `area`.
    fn cells_inside(&self, area: &Rect) -> Vec<usize> {
        let first_column = ((area.left() - self.bounds.x) / self.cell_size).ceil();
        let last_column = ((area.right() - self.bounds.x) / self.cell_size).floor() - 1.0;
        let first_row = ((area.top() - self.bounds.y) / self.cell_size).ceil();
        let last_row = ((area.bottom() - self.bounds.y) / self.cell_size).floor() - 1.0;
        self.index_range(first_column, last_column, first_row, last_row)
    }

    /// Cells touching `area` at all.
    fn cells_overlapping(&self, area: &Rect) -> Vec<usize> {
        let first_column = ((area.left() - self.bounds.x) / self.cell_size).floor();
        let last_column = ((area.right() - self.bounds.x) / self.cell_size).floor();
        let first_row = ((area.top() - self.bounds.y) / self.cell_size).floor();
        let last_row = ((area.bottom() - self.bounds.y) / self.cell_size).floor();
        self.index_range(first_column, last_column, first_row, last_row)
    }

    fn index_range(&self, first_column: f64, last_column: f64, first_row: f64, last_row: f64) -> Vec<usize> {
        let max_column = (self.columns - 1) as f64;
        let max_row = (self.rows - 1) as f64;
        let first_column = first_column.max(0.0);
        let first_row = first_row.max(0.0);
        let last_column = last_column.min(max_column);
        let last_row = last_row.min(max_row);
        if first_column > last_column || first_row > last_row {
            return Vec::new();
        }

        let mut indices = Vec::new();
        for row in first_row as usize..=last_row as usize {
            for column in first_column as usize..=last_column as usize {
                indices.push(row * self.columns + column);
            }
        }
        indices
    }
}
