mod support;

use geofriends_planner::adapters::outbound::{init_buffered_logger, init_noop_logger, MultiLogger};
use geofriends_planner::config::Config;
use geofriends_planner::domains::agent::{CooperativeAgent, PlannerAgent};
use geofriends_planner::domains::level::AgentType;
use geofriends_planner::domains::logger::{DomainLogger, DynLogger, ScopedLogger};
use std::sync::Arc;
use std::time::Duration;
use support::CaptureLogger;

#[tokio::test]
async fn test_buffered_and_noop_logger() {
    let capture = Arc::new(CaptureLogger::new());
    let bridge = capture.clone() as DynLogger;

    let buffered = init_buffered_logger(bridge.clone(), 8);

    buffered.info("one");
    buffered.warn("two");
    buffered.error("three");

    // Give the background task a moment
    tokio::time::sleep(Duration::from_millis(50)).await;

    let msgs = capture.lines();
    assert!(msgs.iter().any(|m| m.contains("INFO:one")));
    assert!(msgs.iter().any(|m| m.contains("WARN:two")));
    assert!(msgs.iter().any(|m| m.contains("ERR:three")));
    assert_eq!(buffered.dropped(), 0);

    let noop = init_noop_logger();
    noop.info("ignored");
    noop.error("ignored-err");
}

#[tokio::test(flavor = "current_thread")]
async fn test_buffered_logger_counts_what_it_drops() {
    let capture = Arc::new(CaptureLogger::new());
    let buffered = init_buffered_logger(capture.clone() as DynLogger, 2);

    // The forwarding task cannot run before this test yields.
    for i in 0..5 {
        buffered.info(&format!("line {}", i));
    }
    assert_eq!(buffered.dropped(), 3);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(capture.lines().len(), 2);
}

#[test]
fn test_scoped_logger_prefixes_every_line() {
    let capture = Arc::new(CaptureLogger::new());
    let scoped = ScopedLogger::shared("rectangle", capture.clone() as DynLogger);

    scoped.info("ready");
    scoped.warn("late");

    assert_eq!(capture.lines(), vec!["INFO:[rectangle] ready", "WARN:[rectangle] late"]);
}

#[test]
fn test_multi_logger_fans_out() {
    let first = Arc::new(CaptureLogger::new());
    let second = Arc::new(CaptureLogger::new());
    let multi = MultiLogger::new(vec![first.clone() as DynLogger]).with(second.clone() as DynLogger);

    multi.error("boom");

    assert_eq!(multi.len(), 2);
    assert_eq!(first.lines(), vec!["ERR:boom"]);
    assert_eq!(second.lines(), vec!["ERR:boom"]);
}

#[test]
fn test_agents_log_through_the_injected_logger() {
    let capture = Arc::new(CaptureLogger::new());
    let mut agent = PlannerAgent::new(AgentType::Circle, &Config::default(), capture.clone() as DynLogger);
    agent.setup(&support::open_floor()).unwrap();

    let lines = capture.lines();
    assert!(lines.iter().any(|line| line.starts_with("INFO:[circle] Level test ready")));
    assert!(lines.iter().any(|line| line.contains("Sending GetCheapestPath circle-1")));
}
