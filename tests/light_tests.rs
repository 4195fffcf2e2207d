//! Light Pass Tests
//!
//! Tests for:
//! - Coordinate conversion: accumulated frame per owning node
//! - Append order: deterministic pre-order walk
//! - Template lights never mutated by a pass
//! - Stack balance across the walk

mod common;

use common::{phong_bindings, RecordingBackend};

use canopy::renderer::SceneRenderer;
use canopy::scene::{
    GroupNode, LeafNode, Light, LightAttachment, Scenegraph, TransformNode, TransformStack,
};
use glam::{Mat4, Vec3, Vec4};

fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

fn white_light_at(x: f32, y: f32, z: f32) -> Light {
    Light::positional(Vec3::ONE, Vec3::ONE, Vec3::ONE, Vec3::new(x, y, z))
}

fn collect(graph: &Scenegraph, root_frame: Mat4) -> Vec<LightAttachment> {
    let renderer = SceneRenderer::new(RecordingBackend::default(), phong_bindings());
    let mut stack = TransformStack::new();
    let mut frame = stack.pushed(root_frame);
    let mut lights = Vec::new();
    graph.light_pass(&renderer, &mut frame, &mut lights);
    lights
}

// ============================================================================
// Coordinate Conversion
// ============================================================================

#[test]
fn transform_light_rides_the_composed_frame() {
    let mut graph = Scenegraph::new();
    let mut t = TransformNode::new("t").with_transform(translate(10.0, 0.0, 0.0));
    t.add_child(LeafNode::new("l", "box")).unwrap();
    let mut scene = GroupNode::new("scene");
    scene.add_child(t);
    graph.set_root(scene.into());
    graph.add_light("t", white_light_at(0.0, 0.0, 0.0));

    let lights = collect(&graph, Mat4::IDENTITY);
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].light.position, Vec4::new(10.0, 0.0, 0.0, 1.0));
}

#[test]
fn root_frame_composes_with_node_transform() {
    let mut graph = Scenegraph::new();
    let t = TransformNode::new("t").with_transform(translate(10.0, 0.0, 0.0));
    graph.set_root(t.into());
    graph.add_light("t", white_light_at(1.0, 2.0, 3.0));

    let root_frame = translate(0.0, 5.0, 0.0);
    let lights = collect(&graph, root_frame);
    // F · T · p_local
    assert_eq!(lights[0].light.position, Vec4::new(11.0, 7.0, 3.0, 1.0));
}

#[test]
fn animation_transform_applies_in_the_parent_frame() {
    let mut graph = Scenegraph::new();
    let mut t = TransformNode::new("rotor").with_transform(translate(1.0, 0.0, 0.0));
    t.set_animation_transform(translate(0.0, 0.0, 4.0));
    graph.set_root(t.into());
    graph.add_light("rotor", white_light_at(0.0, 0.0, 0.0));

    let lights = collect(&graph, Mat4::IDENTITY);
    // animation outermost: A · T · p
    assert_eq!(lights[0].light.position, Vec4::new(1.0, 0.0, 4.0, 1.0));
}

#[test]
fn group_lights_use_the_inherited_frame() {
    let mut graph = Scenegraph::new();
    let mut inner = GroupNode::new("fixtures");
    inner.add_light(white_light_at(0.0, 1.0, 0.0));
    let mut t = TransformNode::new("room").with_transform(translate(5.0, 0.0, 0.0));
    t.add_child(inner).unwrap();
    graph.set_root(t.into());

    let lights = collect(&graph, Mat4::IDENTITY);
    assert_eq!(lights.len(), 1);
    // The group adds no frame of its own; the ancestor transform applies.
    assert_eq!(lights[0].light.position, Vec4::new(5.0, 1.0, 0.0, 1.0));
}

#[test]
fn leaf_lights_collect_even_without_a_mesh() {
    let mut graph = Scenegraph::new();
    let mut scene = GroupNode::new("scene");
    scene.add_child(LeafNode::new("marker", ""));
    graph.set_root(scene.into());
    graph.add_light("marker", white_light_at(2.0, 0.0, 0.0));

    let lights = collect(&graph, Mat4::IDENTITY);
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].light.position, Vec4::new(2.0, 0.0, 0.0, 1.0));
}

#[test]
fn spot_direction_is_rotated_not_translated() {
    let mut graph = Scenegraph::new();
    let t = TransformNode::new("t")
        .with_transform(translate(3.0, 0.0, 0.0) * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2));
    graph.set_root(t.into());
    graph.add_light(
        "t",
        white_light_at(0.0, 0.0, 0.0).with_spot(Vec3::new(0.0, 0.0, -1.0), 0.5),
    );

    let lights = collect(&graph, Mat4::IDENTITY);
    let dir = lights[0].light.spot_direction;
    // w = 0 keeps the direction out of the translation's reach.
    assert!((dir.x - -1.0).abs() < 1e-5);
    assert!(dir.y.abs() < 1e-5);
    assert!(dir.z.abs() < 1e-5);
    assert!(dir.w.abs() < 1e-5);
    assert_eq!(lights[0].light.position, Vec4::new(3.0, 0.0, 0.0, 1.0));
}

#[test]
fn directional_light_keeps_w_zero() {
    let mut graph = Scenegraph::new();
    let t = TransformNode::new("t").with_transform(translate(7.0, 0.0, 0.0));
    graph.set_root(t.into());
    graph.add_light(
        "t",
        Light::directional(Vec3::ONE, Vec3::ONE, Vec3::ONE, Vec3::new(0.0, -1.0, 0.0)),
    );

    let lights = collect(&graph, Mat4::IDENTITY);
    // Directions are immune to translation.
    assert_eq!(lights[0].light.position, Vec4::new(0.0, -1.0, 0.0, 0.0));
}

// ============================================================================
// Order & Determinism
// ============================================================================

fn lit_tree() -> Scenegraph {
    let mut graph = Scenegraph::new();

    let mut left = TransformNode::new("left").with_transform(translate(-1.0, 0.0, 0.0));
    left.add_child(LeafNode::new("left-leaf", "box")).unwrap();
    let mut right = TransformNode::new("right").with_transform(translate(1.0, 0.0, 0.0));
    right.add_child(LeafNode::new("right-leaf", "box")).unwrap();

    let mut scene = GroupNode::new("scene");
    scene.add_light(white_light_at(0.0, 9.0, 0.0));
    scene.add_child(left);
    scene.add_child(right);
    graph.set_root(scene.into());

    graph.add_light("right", white_light_at(0.0, 0.0, 0.0));
    graph.add_light("left", white_light_at(0.0, 0.0, 0.0));
    graph.add_light("left", white_light_at(0.0, 0.5, 0.0));
    graph
}

#[test]
fn append_order_is_preorder_then_attachment_order() {
    let graph = lit_tree();
    let lights = collect(&graph, Mat4::IDENTITY);
    let positions: Vec<Vec4> = lights.iter().map(|l| l.light.position).collect();

    assert_eq!(
        positions,
        vec![
            // Group-owned light first (the group precedes its children).
            Vec4::new(0.0, 9.0, 0.0, 1.0),
            // "left" sibling next, both its attachments in attachment order.
            Vec4::new(-1.0, 0.0, 0.0, 1.0),
            Vec4::new(-1.0, 0.5, 0.0, 1.0),
            // "right" sibling last.
            Vec4::new(1.0, 0.0, 0.0, 1.0),
        ]
    );
}

#[test]
fn two_passes_over_an_unmodified_tree_are_identical() {
    let graph = lit_tree();
    let first = collect(&graph, Mat4::IDENTITY);
    let second = collect(&graph, Mat4::IDENTITY);
    assert_eq!(first, second);
}

#[test]
fn templates_are_never_mutated() {
    let graph = lit_tree();
    let _ = collect(&graph, translate(100.0, 0.0, 0.0));

    // The registered attachments still hold their authored positions.
    let attachments = &graph.light_map()["left"];
    assert_eq!(attachments[0].light.position, Vec4::new(0.0, 0.0, 0.0, 1.0));
    assert_eq!(attachments[1].light.position, Vec4::new(0.0, 0.5, 0.0, 1.0));
}

// ============================================================================
// Stack Discipline
// ============================================================================

#[test]
fn light_pass_leaves_the_stack_balanced() {
    let graph = lit_tree();
    let renderer = SceneRenderer::new(RecordingBackend::default(), phong_bindings());
    let mut stack = TransformStack::new();
    let mut lights = Vec::new();

    let depth_before = stack.depth();
    graph.light_pass(&renderer, &mut stack, &mut lights);
    assert_eq!(stack.depth(), depth_before);
    assert_eq!(stack.top(), Mat4::IDENTITY);
}
