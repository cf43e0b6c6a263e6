mod support;

use geofriends_planner::application::AgentRuntime;
use geofriends_planner::config::Config;
use geofriends_planner::domains::level::{AgentType, Point};
use std::time::Duration;
use support::{open_floor, quiet};

#[tokio::test]
async fn test_agent_tasks_agree_over_channels() {
    let runtime = AgentRuntime::spawn(&Config::default(), &open_floor(), quiet(), 6, Duration::from_millis(10)).unwrap();
    let (circle, rectangle) = runtime.join().await.unwrap();

    assert_eq!(circle.decisions, 6);
    assert_eq!(rectangle.decisions, 6);
    assert_eq!(circle.agent.target().map(|t| t.location), Some(Point::new(200.0, 560.0)));
    assert_eq!(rectangle.agent.target().map(|t| t.location), Some(Point::new(600.0, 560.0)));
    assert!(circle.last_decision.is_some());
}

#[tokio::test]
async fn test_runtime_shares_sensor_ports_with_its_agents() {
    let level = open_floor();
    let runtime = AgentRuntime::spawn(&Config::default(), &level, quiet(), 2, Duration::from_millis(5)).unwrap();
    let port = runtime.sensor_port(AgentType::Rectangle);
    let before = port.revision();

    runtime.sensors_updated(support::sensors_for(&level, level.collectibles.clone()));
    assert_eq!(port.revision(), before + 1);

    runtime.join().await.unwrap();
}
