use geofriends_planner::domains::graph::NodeIndex;
use geofriends_planner::domains::level::Point;
use geofriends_planner::domains::search::{PathFinder, SearchParameters, SearchSpace};
use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex as ReferenceIndex};
use petgraph::visit::EdgeRef;

/// Small free-form graph; edges are directed and cost their Euclidean length.
struct Sketch {
    points: Vec<Point>,
    edges: Vec<Vec<bool>>,
}

impl Sketch {
    fn new(points: Vec<Point>) -> Self {
        let size = points.len();
        Self { points, edges: vec![vec![false; size]; size] }
    }

    fn connect(&mut self, a: usize, b: usize) {
        self.edges[a][b] = true;
        self.edges[b][a] = true;
    }

    fn reference(&self) -> (DiGraph<(), f64>, Vec<ReferenceIndex>) {
        let mut graph = DiGraph::new();
        let nodes: Vec<ReferenceIndex> = self.points.iter().map(|_| graph.add_node(())).collect();
        for from in 0..self.points.len() {
            for to in 0..self.points.len() {
                if self.edges[from][to] {
                    graph.add_edge(nodes[from], nodes[to], self.points[from].distance_to(&self.points[to]));
                }
            }
        }
        (graph, nodes)
    }
}

impl SearchSpace for Sketch {
    fn node_count(&self) -> usize {
        self.points.len()
    }

    fn location(&self, node: NodeIndex) -> Option<Point> {
        self.points.get(node.0).copied()
    }

    fn is_adjacent(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.edges.get(from.0).and_then(|row| row.get(to.0)).copied().unwrap_or(false)
    }
}

/// Deterministic linear congruential sequence so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn random_sketch(rng: &mut Lcg) -> Sketch {
    let size = 3 + rng.below(8) as usize;
    let points = (0..size)
        .map(|_| Point::new(rng.below(100) as f64, rng.below(100) as f64))
        .collect();
    let mut sketch = Sketch::new(points);
    for a in 0..size {
        for b in (a + 1)..size {
            if rng.below(10) < 4 {
                sketch.connect(a, b);
            }
        }
    }
    sketch
}

#[test]
fn test_astar_matches_dijkstra_on_small_graphs() {
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let sketch = random_sketch(&mut rng);
        let (reference, nodes) = sketch.reference();
        let size = sketch.points.len();
        let start = rng.below(size as u64) as usize;
        let goal = rng.below(size as u64) as usize;

        let expected = dijkstra(&reference, nodes[start], Some(nodes[goal]), |edge| *edge.weight());
        let found = PathFinder::new(&sketch).find_path(SearchParameters::new(NodeIndex(start), NodeIndex(goal)));

        match (expected.get(&nodes[goal]), found) {
            (Some(cost), Some(path)) => {
                assert!((cost - path.total_cost()).abs() < 1e-9, "{} vs {}", cost, path.total_cost());
                assert_eq!(path.start(), NodeIndex(start));
                assert_eq!(path.goal(), NodeIndex(goal));
                let walked: f64 = path
                    .edges()
                    .map(|(from, to)| {
                        assert!(sketch.is_adjacent(from, to));
                        sketch.points[from.0].distance_to(&sketch.points[to.0])
                    })
                    .sum();
                assert!((walked - path.total_cost()).abs() < 1e-9);
            }
            (None, None) => {}
            (expected, found) => panic!("dijkstra {:?}, astar {:?}", expected, found),
        }
    }
}

fn square() -> Sketch {
    // Two routes of equal length from 0 to 3.
    let mut sketch = Sketch::new(vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(0.0, 10.0),
        Point::new(10.0, 10.0),
    ]);
    sketch.connect(0, 1);
    sketch.connect(0, 2);
    sketch.connect(1, 3);
    sketch.connect(2, 3);
    sketch
}

#[test]
fn test_equal_cost_routes_resolve_the_same_way_every_time() {
    let sketch = square();
    let parameters = SearchParameters::new(NodeIndex(0), NodeIndex(3));
    let first = PathFinder::new(&sketch).find_path(parameters).unwrap();

    for _ in 0..20 {
        assert_eq!(PathFinder::new(&sketch).find_path(parameters).unwrap(), first);
    }
    assert!((first.total_cost() - 20.0).abs() < 1e-9);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_unreachable_goal_gives_none() {
    let mut sketch = square();
    sketch.points.push(Point::new(50.0, 50.0));
    for row in sketch.edges.iter_mut() {
        row.push(false);
    }
    sketch.edges.push(vec![false; 5]);

    assert!(PathFinder::new(&sketch).find_path(SearchParameters::new(NodeIndex(0), NodeIndex(4))).is_none());
    assert!(PathFinder::new(&sketch).find_path(SearchParameters::new(NodeIndex(0), NodeIndex(9))).is_none());
}

#[test]
fn test_start_equals_goal() {
    let sketch = square();
    let path = PathFinder::new(&sketch).find_path(SearchParameters::new(NodeIndex(2), NodeIndex(2))).unwrap();
    assert_eq!(path.steps(), &[NodeIndex(2)]);
    assert_eq!(path.total_cost(), 0.0);
}

#[test]
fn test_edge_filter_forces_the_other_route() {
    let sketch = square();
    let no_top_edge = |from: NodeIndex, to: NodeIndex| !(from == NodeIndex(0) && to == NodeIndex(1));
    let path = PathFinder::new(&sketch)
        .with_edge_filter(&no_top_edge)
        .find_path(SearchParameters::new(NodeIndex(0), NodeIndex(3)))
        .unwrap();
    assert_eq!(path.steps(), &[NodeIndex(0), NodeIndex(2), NodeIndex(3)]);

    let nothing = |_: NodeIndex, _: NodeIndex| false;
    assert!(PathFinder::new(&sketch)
        .with_edge_filter(&nothing)
        .find_path(SearchParameters::new(NodeIndex(0), NodeIndex(3)))
        .is_none());
}
