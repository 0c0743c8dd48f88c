// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end sync scenarios observed through a recording factory.

use tableau_core::mesh::{MeshId, TriangleMesh};
use tableau_core::node::SceneGraph;
use tableau_core::paint::{Color, Paint};
use tableau_core::shape::Shape;
use tableau_core::shape3d::Shape3d;
use tableau_core::transform::Transform3d;
use tableau_sync_harness::{
    ArrayWrite, MeshArray, PeerKey, PulseLoad, PulseTracker, RecordingFactory, SyncEvent,
};

fn mesh_scene() -> (SceneGraph, RecordingFactory, MeshId) {
    let mut graph = SceneGraph::new();
    let mesh = graph.add_mesh(TriangleMesh::new_box(2.0, 2.0, 2.0));
    let _ = graph.create_shape3d(Shape3d::mesh_view(Some(mesh)));
    let mut factory = RecordingFactory::new();
    let _ = graph.sync(&mut factory);
    let _ = factory.log().take();
    (graph, factory, mesh)
}

#[test]
fn fresh_mesh_peer_receives_full_arrays() {
    let mut graph = SceneGraph::new();
    let mesh = graph.add_mesh(TriangleMesh::new_box(2.0, 2.0, 2.0));
    let mut factory = RecordingFactory::new();
    let log = factory.log();

    let report = graph.sync(&mut factory);
    assert_eq!(report.peers_created, 0, "unreferenced meshes get no peer");
    assert!(log.is_empty());

    let _ = graph.create_shape3d(Shape3d::mesh_view(Some(mesh)));
    let report = graph.sync(&mut factory);
    assert_eq!(report.peers_created, 2);
    assert_eq!(report.meshes_synced, 1);
    let points = log.array_writes(mesh, MeshArray::Points);
    assert_eq!(
        points,
        vec![ArrayWrite {
            full: true,
            index: 0,
            len: 24
        }]
    );
    assert!(log.render().contains("points full 24"), "{}", log.render());
}

#[test]
fn disjoint_partial_writes_merge_into_one_range() {
    let (mut graph, mut factory, mesh) = mesh_scene();
    let log = factory.log();

    let patch = [0.5_f32; 5];
    let m = graph.mesh_mut(mesh).expect("mesh is alive");
    m.set_points_range(0, &patch, 0, 5).expect("in bounds");
    m.set_points_range(10, &patch, 0, 5).expect("in bounds");

    let report = graph.sync(&mut factory);
    assert_eq!(report.meshes_synced, 1);
    assert_eq!(
        log.array_writes(mesh, MeshArray::Points),
        vec![ArrayWrite {
            full: false,
            index: 0,
            len: 15
        }]
    );
    assert!(log.array_writes(mesh, MeshArray::Faces).is_empty());
    assert_eq!(
        log.events_for(PeerKey::Shape3d(0)),
        vec![SyncEvent::MeshGeometryChanged(PeerKey::Shape3d(0))]
    );
}

#[test]
fn whole_array_replacement_overrides_pending_range() {
    let (mut graph, mut factory, mesh) = mesh_scene();
    let log = factory.log();

    let m = graph.mesh_mut(mesh).expect("mesh is alive");
    m.set_points_range(3, &[1.0, 1.0, 1.0], 0, 3).expect("in bounds");
    let points = m.copy_points(None);
    m.set_points(&points).expect("same length");

    let _ = graph.sync(&mut factory);
    let writes = log.array_writes(mesh, MeshArray::Points);
    assert_eq!(writes.len(), 1);
    assert!(writes[0].full, "{writes:?}");
}

#[test]
fn rejected_range_write_pushes_nothing() {
    let (mut graph, mut factory, mesh) = mesh_scene();
    let log = factory.log();

    let m = graph.mesh_mut(mesh).expect("mesh is alive");
    assert!(m.set_points_range(20, &[0.0; 6], 0, 6).is_err());

    let report = graph.sync(&mut factory);
    assert_eq!(report.meshes_synced, 0);
    assert!(log.is_empty(), "{}", log.render());
}

#[test]
fn only_changed_properties_are_pushed() {
    let mut graph = SceneGraph::new();
    let rect = graph.create_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
    let mut factory = RecordingFactory::new();
    let log = factory.log();
    let _ = graph.sync(&mut factory);
    let first = log.take();
    assert!(first.contains(&SyncEvent::Created(PeerKey::Shape(0))));
    assert!(
        first
            .iter()
            .any(|e| matches!(e, SyncEvent::Geometry(PeerKey::Shape(0), ..)))
    );

    if let Some(s) = graph.shape_mut(rect) {
        s.set_fill(Some(Paint::Solid(Color::WHITE)));
    }
    let report = graph.sync(&mut factory);
    assert_eq!(report.nodes_synced, 1);
    let events = log.take();
    assert!(
        events.contains(&SyncEvent::FillPaint(
            PeerKey::Shape(0),
            Some(Paint::Solid(Color::WHITE))
        )),
        "{events:?}"
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, SyncEvent::Geometry(..) | SyncEvent::Transform(..))),
        "{events:?}"
    );

    let report = graph.sync(&mut factory);
    assert_eq!(report.nodes_synced, 0);
    assert!(log.is_empty());
}

#[test]
fn group_transforms_reach_descendant_peers() {
    let mut graph = SceneGraph::new();
    let group = graph.create_group();
    let circle = graph.create_shape(Shape::circle(0.0, 0.0, 4.0));
    graph.add_child(group, circle);
    let mut factory = RecordingFactory::new();
    let log = factory.log();
    let _ = graph.sync(&mut factory);
    let _ = log.take();

    let xf = Transform3d::from_translation(7.0, 3.0, 0.0);
    graph.set_local_transform(group, xf);
    let report = graph.sync(&mut factory);
    assert_eq!(report.nodes_synced, 1, "the group itself has no peer");
    assert_eq!(log.take(), vec![SyncEvent::Transform(PeerKey::Shape(0), xf)]);
}

#[test]
fn shared_box_mesh_is_released_with_its_last_viewer() {
    let mut graph = SceneGraph::new();
    let a = graph.create_shape3d(Shape3d::new_box(3.0, 3.0, 3.0));
    let b = graph.create_shape3d(Shape3d::new_box(3.0, 3.0, 3.0));
    let mut factory = RecordingFactory::new();
    let log = factory.log();

    let report = graph.sync(&mut factory);
    assert_eq!(report.peers_created, 3, "two nodes and one shared mesh");
    let mesh = graph
        .shape3d(a)
        .and_then(Shape3d::mesh)
        .expect("box mesh bound after sync");
    assert_eq!(graph.shape3d(b).and_then(Shape3d::mesh), Some(mesh));
    let _ = log.take();

    graph.destroy_node(a);
    assert_eq!(log.take(), vec![SyncEvent::Released(PeerKey::Shape3d(0))]);
    let report = graph.sync(&mut factory);
    assert_eq!(report.peers_released, 1);

    graph.destroy_node(b);
    let released = log.take();
    assert!(released.contains(&SyncEvent::Released(PeerKey::Shape3d(1))));
    assert!(released.contains(&SyncEvent::Released(PeerKey::Mesh(mesh))));
    let report = graph.sync(&mut factory);
    assert_eq!(report.peers_released, 2);
    assert_eq!(graph.purge_unused_meshes(), 1);
}

#[test]
fn pulse_tracker_follows_an_animation() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut graph = SceneGraph::new();
    let nodes: Vec<_> = (0..8)
        .map(|i| graph.create_shape(Shape::circle(f64::from(i) * 10.0, 0.0, 2.0)))
        .collect();
    let mut factory = RecordingFactory::new();
    let mut tracker = PulseTracker::<4>::new();

    let first = graph.sync(&mut factory);
    let stats = tracker.observe(&first, nodes.len());
    assert_eq!(stats.load, PulseLoad::Full);
    assert_eq!(stats.live_peers, 8);

    for frame in 1..=3_u32 {
        let span = tracing::info_span!("pulse", frame);
        let _guard = span.enter();
        let xf = Transform3d::from_translation(f64::from(frame), 0.0, 0.0);
        graph.set_local_transform(nodes[0], xf);
        let report = graph.sync(&mut factory);
        let stats = tracker.observe(&report, nodes.len());
        assert_eq!(stats.load, PulseLoad::Incremental, "frame {frame}");
    }

    let idle = graph.sync(&mut factory);
    assert_eq!(tracker.observe(&idle, nodes.len()).load, PulseLoad::Idle);
    assert_eq!(tracker.history(), [1, 1, 1, 0]);
}
