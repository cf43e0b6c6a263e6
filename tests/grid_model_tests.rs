mod support;

use geofriends_planner::config::{GridConfig, MovementConfig};
use geofriends_planner::domains::grid::{GridModel, LevelShapes};
use geofriends_planner::domains::level::{AgentType, Point, Rect, ShapeKind};
use support::LevelBuilder;

fn grid_with(shapes: LevelShapes) -> GridModel {
    let level = LevelBuilder::new(800.0, 600.0).circle(100.0, 560.0).rectangle(700.0, 550.0).build();
    GridModel::build(&GridConfig { cell_size: 8.0 }, level.area, shapes, level.agents(), &MovementConfig::default()).unwrap()
}

fn block_in_the_middle() -> LevelShapes {
    LevelShapes {
        obstacles: vec![Rect::new(400.0, 300.0, 160.0, 80.0)],
        ..LevelShapes::default()
    }
}

#[test]
fn test_interior_blocks_but_outline_stays_walkable() {
    let grid = grid_with(block_in_the_middle());

    assert!(!grid.is_walkable_segment(Point::new(300.0, 300.0), Point::new(500.0, 300.0), AgentType::Circle));
    assert!(!grid.is_walkable_segment(Point::new(300.0, 300.0), Point::new(500.0, 300.0), AgentType::Rectangle));

    // Along the top edge, corner to corner.
    assert!(grid.is_walkable_segment(Point::new(320.0, 260.0), Point::new(480.0, 260.0), AgentType::Circle));
    assert!(grid.is_walkable_segment(Point::new(320.0, 260.0), Point::new(320.0, 340.0), AgentType::Rectangle));
}

#[test]
fn test_platforms_only_block_their_agent() {
    let grid = grid_with(LevelShapes {
        circle_platforms: vec![Rect::new(200.0, 300.0, 100.0, 100.0)],
        rectangle_platforms: vec![Rect::new(600.0, 300.0, 100.0, 100.0)],
        ..LevelShapes::default()
    });

    let through_circle_platform = (Point::new(100.0, 300.0), Point::new(300.0, 300.0));
    let through_rectangle_platform = (Point::new(500.0, 300.0), Point::new(700.0, 300.0));

    assert!(!grid.is_walkable_segment(through_circle_platform.0, through_circle_platform.1, AgentType::Circle));
    assert!(grid.is_walkable_segment(through_circle_platform.0, through_circle_platform.1, AgentType::Rectangle));
    assert!(grid.is_walkable_segment(through_rectangle_platform.0, through_rectangle_platform.1, AgentType::Circle));
    assert!(!grid.is_walkable_segment(through_rectangle_platform.0, through_rectangle_platform.1, AgentType::Rectangle));

    assert!(grid.blocked_cell_count(AgentType::Circle) > 0);
    assert_eq!(grid.blocked_cell_count(AgentType::Circle), grid.blocked_cell_count(AgentType::Rectangle));
}

#[test]
fn test_out_of_bounds_segments() {
    let grid = grid_with(LevelShapes::default());

    assert!(!grid.is_walkable_segment(Point::new(-10.0, 100.0), Point::new(-50.0, 200.0), AgentType::Circle));
    assert!(!grid.is_walkable_segment(Point::new(-10.0, 100.0), Point::new(100.0, 100.0), AgentType::Circle));
    assert!(!grid.is_walkable_segment(Point::new(900.0, 900.0), Point::new(900.0, 900.0), AgentType::Circle));
}

#[test]
fn test_zero_length_segment_is_walkable_inside_the_arena() {
    let grid = grid_with(block_in_the_middle());
    let inside_block = Point::new(404.0, 300.0);

    assert!(grid.is_walkable_segment(inside_block, inside_block, AgentType::Circle));
    assert!(grid.is_walkable_segment(Point::new(10.0, 10.0), Point::new(10.0, 10.0), AgentType::Rectangle));
}

#[test]
fn test_arena_edges_are_in_bounds() {
    let grid = grid_with(LevelShapes::default());

    assert!(grid.in_bounds(&Point::new(0.0, 0.0)));
    assert!(grid.in_bounds(&Point::new(800.0, 600.0)));
    assert!(!grid.in_bounds(&Point::new(800.1, 600.0)));
    assert_eq!(grid.columns(), 100);
    assert_eq!(grid.rows(), 75);
}

#[test]
fn test_agent_silhouettes_are_tracked_but_never_block() {
    let grid = grid_with(LevelShapes::default());

    assert_eq!(grid.occupant_at(&Point::new(100.0, 560.0)), Some(AgentType::Circle));
    assert_eq!(grid.occupant_at(&Point::new(700.0, 550.0)), Some(AgentType::Rectangle));
    assert_eq!(grid.occupant_at(&Point::new(400.0, 100.0)), None);
    assert!(grid.is_walkable_segment(Point::new(20.0, 560.0), Point::new(780.0, 560.0), AgentType::Circle));
}

#[test]
fn test_rectangle_silhouette_is_clamped_to_its_morph_range() {
    let mut grid = grid_with(LevelShapes::default());
    let mut agents = LevelBuilder::new(800.0, 600.0).circle(100.0, 560.0).rectangle(700.0, 550.0).build().agents();

    // A flat reading still covers the widest silhouette: 200 x 50.
    agents.rectangle.height = 0.0;
    grid.update(agents);
    assert_eq!(grid.occupant_at(&Point::new(610.0, 550.0)), Some(AgentType::Rectangle));
    assert_eq!(grid.occupant_at(&Point::new(700.0, 590.0)), None);

    // Taller than it can stretch: 50 x 200.
    agents.rectangle.height = 400.0;
    grid.update(agents);
    assert_eq!(grid.occupant_at(&Point::new(700.0, 460.0)), Some(AgentType::Rectangle));
    assert_eq!(grid.occupant_at(&Point::new(700.0, 420.0)), None);
    assert_eq!(grid.occupant_at(&Point::new(660.0, 550.0)), None);
}

#[test]
fn test_circle_resting_on_the_rectangle_rides_it() {
    let riding = LevelBuilder::new(800.0, 600.0).circle(300.0, 460.0).rectangle(300.0, 550.0).build();
    let grid = GridModel::build(
        &GridConfig { cell_size: 8.0 },
        riding.area,
        LevelShapes::default(),
        riding.agents(),
        &MovementConfig::default(),
    )
    .unwrap();
    assert!(grid.circle_rides_rectangle());

    assert!(!grid_with(LevelShapes::default()).circle_rides_rectangle());
}

#[test]
fn test_moving_a_shape_rasterizes_again() {
    let mut grid = grid_with(block_in_the_middle());
    let revision = grid.revision();
    let old_interior = Point::new(404.0, 300.0);

    grid.move_shape(ShapeKind::Obstacle, 0, Rect::new(400.0, 100.0, 160.0, 80.0)).unwrap();

    assert!(grid.revision() > revision);
    assert!(!grid.cell_at(&old_interior).unwrap().is_blocked_for(AgentType::Circle));
    assert!(grid.cell_at(&Point::new(404.0, 100.0)).unwrap().is_blocked_for(AgentType::Circle));
    assert!(grid.move_shape(ShapeKind::CirclePlatform, 3, Rect::new(0.0, 0.0, 1.0, 1.0)).is_err());
}

#[test]
fn test_rejects_degenerate_grid() {
    let level = LevelBuilder::new(800.0, 600.0).build();
    let result = GridModel::build(
        &GridConfig { cell_size: 0.0 },
        level.area,
        LevelShapes::default(),
        level.agents(),
        &MovementConfig::default(),
    );
    assert!(result.is_err());
}
