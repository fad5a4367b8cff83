//! Property tests for the solver arithmetic and the pass scheduling.

use std::time::Duration;

use boxflow_layout::{
    fit_content, grow_share, ChildSize, Direction, LayoutRules, NodeId, Padding, RootOptions, Scene,
    SceneNode, SizingMode, SizingModes,
};
use proptest::prelude::*;

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Row),
        Just(Direction::Column),
        Just(Direction::RowReverse),
        Just(Direction::ColumnReverse),
    ]
}

fn padding() -> impl Strategy<Value = Padding> {
    (0.0f32..20.0, 0.0f32..20.0, 0.0f32..20.0, 0.0f32..20.0).prop_map(
        |(top, bottom, left, right)| Padding {
            top,
            bottom,
            left,
            right,
        },
    )
}

/// Build a random tree of boxes under one root. `shape[i]` picks the parent
/// of box `i` among the root and the boxes before it.
fn build_tree(shape: &[usize]) -> (Scene, NodeId, Vec<NodeId>) {
    let mut scene = Scene::default();
    let root = scene.next_id();
    scene.add_root(SceneNode::new(root).with_size(500.0, 500.0)).unwrap();
    scene.attach_root(root, RootOptions::default()).unwrap();

    let mut boxes = Vec::new();
    for (i, pick) in shape.iter().enumerate() {
        let parent = if *pick % (i + 1) == 0 {
            root
        } else {
            boxes[*pick % (i + 1) - 1]
        };
        let id = scene.next_id();
        scene
            .add_child(parent, SceneNode::new(id).with_size(10.0, 10.0))
            .unwrap();
        scene.attach_box(id, LayoutRules::row().with_gap(1.0)).unwrap();
        boxes.push(id);
    }
    scene.update(Duration::ZERO);
    (scene, root, boxes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// With only fixed children, content is the primary sum plus gaps and
    /// padding, and the cross maximum plus padding.
    #[test]
    fn fit_content_of_fixed_children(
        sizes in prop::collection::vec((0.0f32..100.0, 0.0f32..100.0), 1..12),
        gap in 0.0f32..10.0,
        padding in padding(),
        direction in direction(),
    ) {
        let rules = LayoutRules::default()
            .with_direction(direction)
            .with_gap(gap)
            .with_padding(padding);
        let children: Vec<ChildSize> =
            sizes.iter().map(|(w, h)| ChildSize::fixed(*w, *h)).collect();

        let fit = fit_content(&rules, &children);

        let primary = direction.primary_axis();
        let cross = direction.cross_axis();
        let sum: f32 = children.iter().map(|c| primary.of(c.size)).sum();
        let max = children.iter().map(|c| cross.of(c.size)).fold(0.0f32, f32::max);
        let expected_primary = sum + gap * (children.len() - 1) as f32 + padding.total(primary);
        let expected_cross = max + padding.total(cross);

        prop_assert!((primary.of(fit.content) - expected_primary).abs() < 0.01);
        prop_assert!((cross.of(fit.content) - expected_cross).abs() < 0.01);
        prop_assert_eq!(fit.grow_children, 0);
    }

    /// Each grow child takes `(available - content so far) / k`, with the
    /// running content growing by every share handed out.
    #[test]
    fn grow_shares_follow_running_content(
        available in 200.0f32..1000.0,
        fixed in 0.0f32..200.0,
        k in 1usize..6,
    ) {
        let mut content = fixed;
        let mut previous = f32::INFINITY;
        for _ in 0..k {
            let share = grow_share(available, content, k).unwrap();
            prop_assert!((share - (available - content) / k as f32).abs() < 0.001);
            prop_assert!(share <= previous || (share - previous).abs() < 0.001);
            previous = share;
            content += share;
        }
        prop_assert_eq!(grow_share(available, fixed, 0), None);
    }

    /// Fit visits boxes deepest-first; grow and placement shallowest-first.
    #[test]
    fn passes_respect_depth_order(shape in prop::collection::vec(0usize..64, 1..24)) {
        let (mut scene, root, boxes) = build_tree(&shape);

        let trace = scene.force_update(root).unwrap();

        let depth = |id: &NodeId| scene.depth(*id).unwrap();
        prop_assert_eq!(trace.fit.len(), boxes.len());
        prop_assert!(trace.fit.windows(2).all(|w| depth(&w[0]) >= depth(&w[1])));
        prop_assert!(trace.grow.windows(2).all(|w| depth(&w[0]) <= depth(&w[1])));
        prop_assert!(trace.place.windows(2).all(|w| depth(&w[0]) <= depth(&w[1])));
    }

    /// A second tick with no structural change produces the same transforms.
    #[test]
    fn ticks_are_idempotent(
        shape in prop::collection::vec(0usize..64, 1..16),
        grow_mask in prop::collection::vec(any::<bool>(), 16),
    ) {
        let (mut scene, root, boxes) = build_tree(&shape);
        for (id, grows) in boxes.iter().zip(&grow_mask) {
            if *grows {
                scene.rules_mut(*id).unwrap().sizing =
                    SizingModes::new(SizingMode::Grow, SizingMode::FitContent);
            }
        }

        scene.force_update(root).unwrap();
        let snapshot = |scene: &Scene| -> Vec<_> {
            scene.walk().into_iter().map(|id| *scene.transform(id).unwrap()).collect()
        };
        let first = snapshot(&scene);
        scene.force_update(root).unwrap();
        let second = snapshot(&scene);

        prop_assert_eq!(first, second);
    }
}
