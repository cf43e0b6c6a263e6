use super::path::Path;
use crate::domains::graph::NodeIndex;
use crate::domains::level::Point;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// What A* needs to know about a graph.
pub trait SearchSpace {
    fn node_count(&self) -> usize;
    fn location(&self, node: NodeIndex) -> Option<Point>;
    fn is_adjacent(&self, from: NodeIndex, to: NodeIndex) -> bool;
}

/// Extra per-edge rule on top of adjacency.
pub type EdgeFilter<'a> = &'a dyn Fn(NodeIndex, NodeIndex) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    pub start: NodeIndex,
    pub goal: NodeIndex,
}

impl SearchParameters {
    pub fn new(start: NodeIndex, goal: NodeIndex) -> Self {
        Self { start, goal }
    }
}

/// A* with a Euclidean heuristic.
///
/// Nodes with equal `f` are expanded in the order they were first seen, so
/// identical inputs always give identical paths.
pub struct PathFinder<'a, S: SearchSpace> {
    space: &'a S,
    edge_filter: Option<EdgeFilter<'a>>,
}

impl<'a, S: SearchSpace> PathFinder<'a, S> {
    pub fn new(space: &'a S) -> Self {
        Self {
            space,
            edge_filter: None,
        }
    }

    pub fn with_edge_filter(mut self, filter: EdgeFilter<'a>) -> Self {
        self.edge_filter = Some(filter);
        self
    }

    /// `None` when the goal cannot be reached; that is an ordinary outcome.
    pub fn find_path(&self, parameters: SearchParameters) -> Option<Path> {
        let SearchParameters { start, goal } = parameters;
        let node_count = self.space.node_count();
        if start.0 >= node_count || goal.0 >= node_count {
            return None;
        }
        if start == goal {
            return Path::new(vec![start], 0.0);
        }

        let goal_location = self.space.location(goal)?;
        let heuristic = |node: usize| {
            self.space
                .location(NodeIndex(node))
                .map(|location| location.distance_to(&goal_location))
                .unwrap_or(f64::INFINITY)
        };

        let mut g_score = vec![f64::INFINITY; node_count];
        let mut came_from: Vec<Option<usize>> = vec![None; node_count];
        let mut first_seen: Vec<Option<u64>> = vec![None; node_count];
        let mut closed = vec![false; node_count];
        let mut open = BinaryHeap::new();
        let mut seen_counter = 0u64;

        g_score[start.0] = 0.0;
        first_seen[start.0] = Some(seen_counter);
        open.push(Reverse((OrderedFloat(heuristic(start.0)), seen_counter, start.0)));

        while let Some(Reverse((_, _, current))) = open.pop() {
            if closed[current] {
                continue;
            }
            if current == goal.0 {
                return self.reconstruct(&came_from, current, g_score[current]);
            }
            closed[current] = true;

            let Some(current_location) = self.space.location(NodeIndex(current)) else {
                continue;
            };
            for next in 0..node_count {
                if next == current || closed[next] {
                    continue;
                }
                if !self.space.is_adjacent(NodeIndex(current), NodeIndex(next)) {
                    continue;
                }
                if let Some(filter) = self.edge_filter {
                    if !filter(NodeIndex(current), NodeIndex(next)) {
                        continue;
                    }
                }
                let Some(next_location) = self.space.location(NodeIndex(next)) else {
                    continue;
                };

                let tentative = g_score[current] + current_location.distance_to(&next_location);
                if tentative < g_score[next] {
                    g_score[next] = tentative;
                    came_from[next] = Some(current);
                    let order = *first_seen[next].get_or_insert_with(|| {
                        seen_counter += 1;
                        seen_counter
                    });
                    open.push(Reverse((OrderedFloat(tentative + heuristic(next)), order, next)));
                }
            }
        }

        None
    }

    fn reconstruct(&self, came_from: &[Option<usize>], goal: usize, cost: f64) -> Option<Path> {
        let mut steps = vec![NodeIndex(goal)];
        let mut current = goal;
        while let Some(previous) = came_from[current] {
            steps.push(NodeIndex(previous));
            current = previous;
        }
        steps.reverse();
        Path::new(steps, cost)
    }
}
