//! Service report rendering against a captured UCP payload.

use diver::models::{Service, SpecSelector};
use diver::output::render_service_spec;

const URCHIN: &str = include_str!("fixtures/urchin_service.json");

fn urchin() -> Service {
    serde_json::from_str(URCHIN).expect("fixture should decode")
}

/// Collapse column padding so assertions don't depend on widths.
fn lines(rendered: &str) -> Vec<String> {
    rendered
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn render(selector: SpecSelector) -> Vec<String> {
    let service = urchin();
    let spec = selector.select(&service).expect("snapshot should exist");
    lines(&render_service_spec(&service, spec))
}

#[test]
fn current_spec_shows_reservation_and_replicas() {
    let out = render(SpecSelector::Current);

    assert_eq!(out[0], "ID: qhg6qgcv6hm58fos2dl64ey43");
    assert!(out.contains(&"Version: 6794".to_string()));
    assert!(out.contains(&"Name: urchin".to_string()));
    assert!(out.contains(&"Cmd: /urchin".to_string()));
    assert!(out.contains(&"Args: -w 8080".to_string()));
    assert!(out.contains(&"Memory Reservation: 4194304".to_string()));
    assert!(out.contains(&"Memory Limits: 8388608".to_string()));
    assert!(out.contains(&"Replicas: 40".to_string()));
    assert!(!out.iter().any(|line| line.starts_with("CPU")));
    assert!(!out.iter().any(|line| line.starts_with("Global")));
}

#[test]
fn previous_spec_omits_empty_reservations() {
    let out = render(SpecSelector::Previous);

    assert!(out.contains(&"Memory Limits: 102410241".to_string()));
    assert!(!out.iter().any(|line| line.contains("Reservation")));
    assert!(out.contains(&"Replicas: 40".to_string()));
}

#[test]
fn labels_and_update_status_are_listed() {
    let out = render(SpecSelector::Current);

    let labels = out.iter().position(|line| line == "Labels:").unwrap();
    assert_eq!(out[labels + 1], "com.docker.ucp.access.label /");
    assert_eq!(out[labels + 2], "com.docker.ucp.collection swarm");
    assert!(out.contains(&"node.labels.com.docker.ucp.collection.swarm==true".to_string()));
    assert!(out.contains(&"Update State: updating".to_string()));
    assert!(out.contains(&"Update Message: update in progress".to_string()));
}

#[test]
fn rendering_is_deterministic() {
    let service = urchin();
    let first = render_service_spec(&service, &service.spec);
    for _ in 0..5 {
        let reparsed = urchin();
        assert_eq!(render_service_spec(&reparsed, &reparsed.spec), first);
    }
}
