mod support;

use geofriends_planner::config::{Config, GridConfig, MovementConfig};
use geofriends_planner::domains::agent::{CooperativeAgent, PlannerAgent};
use geofriends_planner::domains::allocation::{AllocationState, ClaimKind, ClaimSets};
use geofriends_planner::domains::graph::{Graph, NodeIndex};
use geofriends_planner::domains::grid::{GridModel, LevelShapes};
use geofriends_planner::domains::level::{AgentType, LevelInfo, Rect};
use geofriends_planner::domains::movement::{Classification, MovementAnalyser, MovementEnvelope, Reach};
use geofriends_planner::domains::search::Path;
use support::{quiet, LevelBuilder};

// Node layout: 0 rectangle, 1 circle, then the diamonds in level order.
const ON_THE_FLOOR: NodeIndex = NodeIndex(2);
const ABOVE_THE_RECTANGLE: NodeIndex = NodeIndex(3);
const OUT_OF_REACH: NodeIndex = NodeIndex(4);

fn tall_level() -> LevelInfo {
    LevelBuilder::new(800.0, 800.0)
        .circle(100.0, 760.0)
        .rectangle(400.0, 750.0)
        .diamond(200.0, 700.0)
        .diamond(400.0, 380.0)
        .diamond(700.0, 100.0)
        .build()
}

fn analyse(level: &LevelInfo, agent: AgentType) -> (Graph, GridModel, Classification) {
    let shapes = LevelShapes {
        obstacles: level.obstacles.clone(),
        rectangle_platforms: level.rectangle_platforms.clone(),
        circle_platforms: level.circle_platforms.clone(),
    };
    let grid = GridModel::build(&GridConfig { cell_size: 8.0 }, level.area, shapes, level.agents(), &MovementConfig::default()).unwrap();
    let mut graph = Graph::new(agent);
    graph.generate_nodes(level, &grid).unwrap();
    graph.generate_adjacency_matrix(&grid);
    let classification = MovementAnalyser::new(&graph, &grid, &MovementConfig::default()).classify();
    (graph, grid, classification)
}

#[test]
fn test_classification_splits_solo_cooperative_and_unreachable() {
    let (_, _, classification) = analyse(&tall_level(), AgentType::Circle);

    assert_eq!(classification.circle_solo, vec![ON_THE_FLOOR]);
    assert_eq!(classification.rectangle_solo, vec![ON_THE_FLOOR]);
    assert_eq!(classification.cooperative, vec![ABOVE_THE_RECTANGLE]);
    assert_eq!(classification.unreachable, vec![OUT_OF_REACH]);
}

#[test]
fn test_both_agents_see_the_same_classification() {
    let level = tall_level();
    let (_, _, from_circle) = analyse(&level, AgentType::Circle);
    let (_, _, from_rectangle) = analyse(&level, AgentType::Rectangle);
    assert_eq!(from_circle, from_rectangle);
}

#[test]
fn test_solo_diamonds_never_become_cooperative() {
    let (_, _, classification) = analyse(&tall_level(), AgentType::Circle);

    for diamond in classification.circle_solo.iter().chain(&classification.rectangle_solo) {
        assert!(!classification.cooperative.contains(diamond));
        assert!(!classification.unreachable.contains(diamond));
    }
    let claims = ClaimSets::from_classification(&classification, AgentType::Rectangle);
    assert_eq!(claims.kind_of(ON_THE_FLOOR), Some(ClaimKind::Solo));
    assert_eq!(claims.kind_of(ABOVE_THE_RECTANGLE), Some(ClaimKind::Cooperative));
    assert_eq!(claims.kind_of(OUT_OF_REACH), None);
}

#[test]
fn test_rectangle_cannot_climb_but_circle_can_jump() {
    let level = tall_level();
    let (graph, grid, _) = analyse(&level, AgentType::Circle);
    let analyser = MovementAnalyser::new(&graph, &grid, &MovementConfig::default());
    let circle = graph.agent_node(AgentType::Circle).unwrap();
    let rectangle = graph.agent_node(AgentType::Rectangle).unwrap();

    assert!(analyser.can_agent_get_alone(circle, ON_THE_FLOOR));
    assert!(analyser.can_agent_get_alone(rectangle, ON_THE_FLOOR));
    assert!(!analyser.can_agent_get_alone(circle, ABOVE_THE_RECTANGLE));
    assert!(!analyser.can_agent_get_alone(rectangle, ABOVE_THE_RECTANGLE));
    assert!(analyser.can_both_get_cooperatively(ABOVE_THE_RECTANGLE));
    assert!(!analyser.can_both_get_cooperatively(OUT_OF_REACH));
    // Only agent nodes can start a walk.
    assert!(!analyser.can_agent_get_alone(ON_THE_FLOOR, ABOVE_THE_RECTANGLE));
}

#[test]
fn test_a_walled_off_diamond_is_unreachable() {
    let level = LevelBuilder::new(800.0, 600.0)
        .circle(100.0, 560.0)
        .rectangle(250.0, 550.0)
        .obstacle(Rect::new(700.0, 300.0, 200.0, 200.0))
        .diamond(700.0, 300.0)
        .build();
    let (graph, _, classification) = analyse(&level, AgentType::Circle);
    let diamond = graph.diamond_nodes()[0];

    assert_eq!(classification.unreachable, vec![diamond]);
    assert!(classification.circle_solo.is_empty());
    assert!(classification.cooperative.is_empty());
}

/// A floating bar offers the rectangle a short cut it cannot climb onto; the
/// block on the floor is the step it can actually use.
fn bar_and_step() -> LevelInfo {
    LevelBuilder::new(800.0, 600.0)
        .circle(60.0, 560.0)
        .rectangle(100.0, 550.0)
        .obstacle(Rect::new(300.0, 480.0, 100.0, 40.0))
        .obstacle(Rect::new(560.0, 575.0, 40.0, 50.0))
        .diamond(500.0, 420.0)
        .build()
}

fn assert_within_envelope(graph: &Graph, path: &Path, envelope: &MovementEnvelope, reach: Reach) {
    for (from, to) in path.edges() {
        let (from, to) = (graph.get_node(from).unwrap(), graph.get_node(to).unwrap());
        assert!(envelope.allows_as(from, to, reach), "{} -> {} breaks the envelope", from, to);
    }
}

#[test]
fn test_committed_path_keeps_to_the_rectangle_envelope() {
    let level = bar_and_step();
    let (graph, grid, classification) = analyse(&level, AgentType::Rectangle);
    let diamond = graph.diamond_nodes()[0];
    assert_eq!(classification.rectangle_solo, vec![diamond]);

    let mut rectangle = PlannerAgent::new(AgentType::Rectangle, &Config::default(), quiet());
    rectangle.setup(&level).unwrap();
    assert_eq!(
        rectangle.state(),
        AllocationState::Assigned { target: diamond, kind: ClaimKind::Solo }
    );

    let planned = rectangle.graph().unwrap();
    let committed = planned.known_path(diamond).unwrap();
    let envelope = MovementEnvelope::for_agent(AgentType::Rectangle, &MovementConfig::default());
    assert_within_envelope(planned, committed, &envelope, Reach::Alone);

    let analyser = MovementAnalyser::new(&graph, &grid, &MovementConfig::default());
    let start = graph.agent_node(AgentType::Rectangle).unwrap();
    let constrained = analyser.constrained_path(AgentType::Rectangle, start, diamond).unwrap();
    assert_eq!(committed.steps(), constrained.steps());
    assert!((committed.total_cost() - constrained.total_cost()).abs() < 1e-9);
    // The unconstrained short cut over the bar is cheaper but not walkable.
    assert!(graph.find_path(start, diamond).unwrap().total_cost() < committed.total_cost());
}

#[test]
fn test_cooperative_paths_only_lift_the_last_edge() {
    let level = tall_level();
    let mut circle = PlannerAgent::new(AgentType::Circle, &Config::default(), quiet());
    circle.setup(&level).unwrap();
    let graph = circle.graph().unwrap();
    let envelope = MovementEnvelope::for_agent(AgentType::Circle, &MovementConfig::default());

    assert!(graph.find_path(graph.own_node().unwrap(), ABOVE_THE_RECTANGLE).is_none());
    let lifted = graph.known_path(ABOVE_THE_RECTANGLE).unwrap();
    assert_eq!(graph.known_reach(ABOVE_THE_RECTANGLE), Some(Reach::Lifted));
    assert_within_envelope(graph, lifted, &envelope, Reach::Lifted);
    for path in graph.known_paths() {
        let reach = graph.known_reach(path.goal()).unwrap();
        assert_within_envelope(graph, path, &envelope, reach);
    }
}
