use super::node::{Node, NodeIndex, NodeType};
use crate::common::{DomainError, DomainResult};
use crate::domains::grid::{GridModel, LevelShapes};
use crate::domains::level::{AgentType, AgentsState, LevelInfo, Point, ShapeKind};
use crate::domains::movement::{MovementEnvelope, Reach};
use crate::domains::search::{Path, PathFinder, SearchParameters, SearchSpace};
use std::collections::BTreeMap;

const SAME_LOCATION: f64 = 1e-6;
const MOVED_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
struct KnownPath {
    path: Path,
    reach: Reach,
}

/// What a rebuild after a moved shape did to the arena.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relocation {
    /// Old index to new index, for every diamond.
    pub diamonds: BTreeMap<NodeIndex, NodeIndex>,
    /// Goals (new indices) whose cached path changed or was dropped.
    pub changed: Vec<NodeIndex>,
}

impl Relocation {
    pub fn diamond(&self, old: NodeIndex) -> Option<NodeIndex> {
        self.diamonds.get(&old).copied()
    }
}

/// Waypoint graph for one agent.
///
/// Nodes live in a dense arena and are referenced by [`NodeIndex`]. The
/// adjacency matrix is always rebuilt in full: a moving shape can change the
/// visibility of any pair. With an envelope attached, every search keeps to
/// the agent's traversal limits.
#[derive(Debug, Clone)]
pub struct Graph {
    agent_type: AgentType,
    envelope: Option<MovementEnvelope>,
    nodes: Vec<Node>,
    adjacency: Vec<bool>,
    adjacency_size: usize,
    rectangle_node: Option<NodeIndex>,
    circle_node: Option<NodeIndex>,
    diamond_nodes: Vec<NodeIndex>,
    known_paths: BTreeMap<NodeIndex, KnownPath>,
}

impl Graph {
    pub fn new(agent_type: AgentType) -> Self {
        Self {
            agent_type,
            envelope: None,
            nodes: Vec::new(),
            adjacency: Vec::new(),
            adjacency_size: 0,
            rectangle_node: None,
            circle_node: None,
            diamond_nodes: Vec::new(),
            known_paths: BTreeMap::new(),
        }
    }

    pub fn with_envelope(mut self, envelope: MovementEnvelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    pub fn envelope(&self) -> Option<&MovementEnvelope> {
        self.envelope.as_ref()
    }

    /// Insert a node whose index must be the next free arena slot.
    pub fn add_node(&mut self, node: Node) -> DomainResult<NodeIndex> {
        let expected = self.nodes.len();
        if node.index.0 < expected {
            return Err(DomainError::DuplicateNode {
                index: node.index.0,
            });
        }
        if node.index.0 > expected {
            return Err(DomainError::InvalidGeometry {
                reason: format!("node index {} skips slot {}", node.index.0, expected),
            });
        }
        self.nodes.push(node);
        Ok(node.index)
    }

    fn push_node(&mut self, location: Point, kind: NodeType) -> DomainResult<NodeIndex> {
        let index = NodeIndex(self.nodes.len());
        self.add_node(Node::new(index, location, kind))
    }

    /// Rectangle, circle, obstacle corners, circle platform corners,
    /// rectangle platform corners, diamonds. Corners outside the arena are
    /// skipped. Any previous content of the graph is discarded.
    pub fn generate_nodes(&mut self, level: &LevelInfo, grid: &GridModel) -> DomainResult<()> {
        let shapes = LevelShapes {
            obstacles: level.obstacles.clone(),
            rectangle_platforms: level.rectangle_platforms.clone(),
            circle_platforms: level.circle_platforms.clone(),
        };
        let diamonds: Vec<Point> = level.collectibles.iter().map(|c| c.position()).collect();
        self.known_paths.clear();
        self.build_nodes(
            level.rectangle.position(),
            level.circle.position(),
            &shapes,
            &diamonds,
            grid,
        )
    }

    fn build_nodes(
        &mut self,
        rectangle: Point,
        circle: Point,
        shapes: &LevelShapes,
        diamonds: &[Point],
        grid: &GridModel,
    ) -> DomainResult<()> {
        self.nodes.clear();
        self.adjacency.clear();
        self.adjacency_size = 0;
        self.diamond_nodes.clear();

        self.rectangle_node = Some(self.push_node(rectangle, NodeType::Rectangle)?);
        self.circle_node = Some(self.push_node(circle, NodeType::Circle)?);

        for kind in [
            ShapeKind::Obstacle,
            ShapeKind::CirclePlatform,
            ShapeKind::RectanglePlatform,
        ] {
            for shape in shapes.of_kind(kind) {
                for corner in shape.corners() {
                    if grid.in_bounds(&corner) {
                        self.push_node(corner, kind.into())?;
                    }
                }
            }
        }

        for diamond in diamonds {
            let index = self.push_node(*diamond, NodeType::Diamond)?;
            self.diamond_nodes.push(index);
        }
        Ok(())
    }

    pub fn generate_adjacency_matrix(&mut self, grid: &GridModel) {
        let size = self.nodes.len();
        let mut adjacency = vec![false; size * size];
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    adjacency[i * size + j] = grid.is_walkable_segment(
                        self.nodes[i].location,
                        self.nodes[j].location,
                        self.agent_type,
                    );
                }
            }
        }
        self.adjacency = adjacency;
        self.adjacency_size = size;
    }

    /// Move both agent nodes to their sensed positions and rebuild adjacency.
    pub fn update_graph(&mut self, agents: &AgentsState, grid: &GridModel) {
        if let Some(index) = self.rectangle_node {
            self.nodes[index.0].location = agents.rectangle.position();
        }
        if let Some(index) = self.circle_node {
            self.nodes[index.0].location = agents.circle.position();
        }
        self.generate_adjacency_matrix(grid);
    }

    /// Follow a shape the grid has already moved. The node set is rebuilt
    /// from the grid's geometry, so corners entering or leaving the arena
    /// gain or lose their nodes; diamonds keep their order but may shift
    /// index. Every cached path is searched again.
    pub fn move_shape(
        &mut self,
        kind: ShapeKind,
        slot: usize,
        grid: &GridModel,
    ) -> DomainResult<Relocation> {
        if grid.shapes().of_kind(kind).get(slot).is_none() {
            return Err(DomainError::InvalidGeometry {
                reason: format!("graph has no {:?} in slot {}", kind, slot),
            });
        }

        let location_of = |index: Option<NodeIndex>| {
            index
                .and_then(|index| self.get_node(index))
                .map(|node| node.location)
        };
        let (Some(rectangle), Some(circle)) =
            (location_of(self.rectangle_node), location_of(self.circle_node))
        else {
            return Err(DomainError::InvalidGeometry {
                reason: "graph has no agent nodes yet".to_string(),
            });
        };
        let old_diamonds = self.diamond_nodes.clone();
        let diamonds: Vec<Point> = old_diamonds
            .iter()
            .map(|index| self.nodes[index.0].location)
            .collect();
        let previous: Vec<(usize, Reach, Vec<Point>)> = self
            .known_paths
            .iter()
            .filter_map(|(goal, known)| {
                let position = old_diamonds.iter().position(|diamond| diamond == goal)?;
                Some((position, known.reach, self.path_locations(&known.path)))
            })
            .collect();

        self.known_paths.clear();
        self.build_nodes(rectangle, circle, grid.shapes(), &diamonds, grid)?;
        self.generate_adjacency_matrix(grid);

        let mut relocation = Relocation {
            diamonds: old_diamonds
                .into_iter()
                .zip(self.diamond_nodes.iter().copied())
                .collect(),
            changed: Vec::new(),
        };
        for (position, reach, before) in previous {
            let goal = self.diamond_nodes[position];
            let path = self
                .own_node()
                .and_then(|start| self.find_path_as(start, goal, reach));
            match path {
                Some(path) => {
                    if self.path_locations(&path) != before {
                        relocation.changed.push(goal);
                    }
                    self.known_paths.insert(goal, KnownPath { path, reach });
                }
                None => relocation.changed.push(goal),
            }
        }
        Ok(relocation)
    }

    /// Recompute every cached path that uses an edge the current adjacency or
    /// envelope no longer allows, or whose nodes moved since it was found.
    /// Paths that cannot be recomputed are evicted.
    pub fn revalidate_known_paths(&mut self) -> Vec<NodeIndex> {
        let stale: Vec<(NodeIndex, Reach)> = self
            .known_paths
            .iter()
            .filter(|(_, known)| {
                let path = &known.path;
                Some(path.start()) != self.own_node()
                    || path
                        .edges()
                        .any(|(from, to)| !self.is_adjacent(from, to) || !self.edge_allowed(from, to, known.reach))
                    || (self.walked_length(path) - path.total_cost()).abs() > MOVED_TOLERANCE
            })
            .map(|(goal, known)| (*goal, known.reach))
            .collect();

        for (goal, reach) in &stale {
            match self.own_node().and_then(|start| self.find_path_as(start, *goal, *reach)) {
                Some(path) => {
                    self.known_paths.insert(*goal, KnownPath { path, reach: *reach });
                }
                None => {
                    self.known_paths.remove(goal);
                }
            }
        }
        stale.into_iter().map(|(goal, _)| goal).collect()
    }

    fn walked_length(&self, path: &Path) -> f64 {
        path.edges()
            .map(|(from, to)| match (self.get_node(from), self.get_node(to)) {
                (Some(from), Some(to)) => from.location.distance_to(&to.location),
                _ => f64::INFINITY,
            })
            .sum()
    }

    /// Whether the envelope lets this agent take the edge. Always true
    /// without an envelope.
    pub fn edge_allowed(&self, from: NodeIndex, to: NodeIndex, reach: Reach) -> bool {
        let Some(envelope) = &self.envelope else {
            return true;
        };
        match (self.get_node(from), self.get_node(to)) {
            (Some(from), Some(to)) => envelope.allows_as(from, to, reach),
            _ => false,
        }
    }

    /// Shortest walk the agent manages alone.
    pub fn find_path(&self, start: NodeIndex, goal: NodeIndex) -> Option<Path> {
        self.find_path_as(start, goal, Reach::Alone)
    }

    pub fn find_path_as(&self, start: NodeIndex, goal: NodeIndex, reach: Reach) -> Option<Path> {
        let parameters = SearchParameters::new(start, goal);
        if self.envelope.is_none() {
            return PathFinder::new(self).find_path(parameters);
        }
        let allowed = |from: NodeIndex, to: NodeIndex| self.edge_allowed(from, to, reach);
        PathFinder::new(self)
            .with_edge_filter(&allowed)
            .find_path(parameters)
    }

    /// Search every diamond from this agent's node and cache the hits, with
    /// a lifted last edge where the agent cannot get there alone. Returns the
    /// diamonds no path reaches.
    pub fn run_initial_searches(&mut self) -> Vec<NodeIndex> {
        let Some(start) = self.own_node() else {
            return self.diamond_nodes.clone();
        };
        let mut unreachable = Vec::new();
        for goal in self.diamond_nodes.clone() {
            let found = [Reach::Alone, Reach::Lifted]
                .into_iter()
                .find_map(|reach| self.find_path_as(start, goal, reach).map(|path| (path, reach)));
            match found {
                Some((path, reach)) => {
                    self.known_paths.insert(goal, KnownPath { path, reach });
                }
                None => unreachable.push(goal),
            }
        }
        unreachable
    }

    /// Cheapest path this agent manages alone to any of `candidates`; the
    /// first candidate wins a tie.
    pub fn get_cheapest_path(&self, candidates: &[NodeIndex]) -> Option<Path> {
        self.get_cheapest_path_as(candidates, Reach::Alone)
    }

    pub fn get_cheapest_path_as(&self, candidates: &[NodeIndex], reach: Reach) -> Option<Path> {
        let start = self.own_node()?;
        let mut cheapest: Option<Path> = None;
        for goal in candidates {
            if let Some(path) = self.find_path_as(start, *goal, reach) {
                let better = cheapest
                    .as_ref()
                    .map_or(true, |best| path.total_cost() < best.total_cost());
                if better {
                    cheapest = Some(path);
                }
            }
        }
        cheapest
    }

    pub fn remove_from_known_paths(&mut self, node: NodeIndex) -> bool {
        self.known_paths.remove(&node).is_some()
    }

    pub fn set_known_path(&mut self, path: Path, reach: Reach) {
        self.known_paths.insert(path.goal(), KnownPath { path, reach });
    }

    pub fn known_path(&self, goal: NodeIndex) -> Option<&Path> {
        self.known_paths.get(&goal).map(|known| &known.path)
    }

    pub fn known_reach(&self, goal: NodeIndex) -> Option<Reach> {
        self.known_paths.get(&goal).map(|known| known.reach)
    }

    pub fn known_paths(&self) -> impl Iterator<Item = &Path> {
        self.known_paths.values().map(|known| &known.path)
    }

    /// Same nodes, adjacency rebuilt for another agent type. The view has no
    /// envelope and no cached paths.
    pub fn view_as(&self, agent_type: AgentType, grid: &GridModel) -> Graph {
        let mut view = Graph {
            agent_type,
            envelope: None,
            known_paths: BTreeMap::new(),
            ..self.clone()
        };
        view.generate_adjacency_matrix(grid);
        view
    }

    pub fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    pub fn get_node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_adjacent(&self, from: NodeIndex, to: NodeIndex) -> bool {
        if from.0 >= self.adjacency_size || to.0 >= self.adjacency_size {
            return false;
        }
        self.adjacency[from.0 * self.adjacency_size + to.0]
    }

    pub fn adjacent_nodes(&self, index: NodeIndex) -> Vec<NodeIndex> {
        (0..self.adjacency_size)
            .map(NodeIndex)
            .filter(|other| self.is_adjacent(index, *other))
            .collect()
    }

    pub fn agent_node(&self, agent: AgentType) -> Option<NodeIndex> {
        match agent {
            AgentType::Circle => self.circle_node,
            AgentType::Rectangle => self.rectangle_node,
        }
    }

    /// Node of the agent this graph plans for.
    pub fn own_node(&self) -> Option<NodeIndex> {
        self.agent_node(self.agent_type)
    }

    pub fn diamond_nodes(&self) -> &[NodeIndex] {
        &self.diamond_nodes
    }

    pub fn diamond_at(&self, location: &Point) -> Option<NodeIndex> {
        self.diamond_nodes.iter().copied().find(|index| {
            self.nodes[index.0].location.distance_to(location) < SAME_LOCATION
        })
    }

    pub fn path_locations(&self, path: &Path) -> Vec<Point> {
        path.steps()
            .iter()
            .filter_map(|index| self.get_node(*index).map(|node| node.location))
            .collect()
    }
}

impl SearchSpace for Graph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn location(&self, node: NodeIndex) -> Option<Point> {
        self.get_node(node).map(|node| node.location)
    }

    fn is_adjacent(&self, from: NodeIndex, to: NodeIndex) -> bool {
        Graph::is_adjacent(self, from, to)
    }
}
