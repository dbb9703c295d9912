use super::*;

fn leaves(max: u32, probability: f64) -> LeafOptions {
    LeafOptions {
        max_leaves: max,
        probability,
        ..LeafOptions::default()
    }
}

#[test]
fn disabled_leaves_place_nothing() {
    let mut rng = leaf_rng(Some(1), "imp");
    assert!(leaf_placements(&leaves(0, 1.0), 300.0, &mut rng).is_empty());
    assert!(leaf_placements(&leaves(5, 0.0), 300.0, &mut rng).is_empty());
}

#[test]
fn certain_leaves_are_capped_and_on_top_arc() {
    let mut rng = leaf_rng(Some(1), "imp");
    let placed = leaf_placements(&leaves(3, 1.0), 300.0, &mut rng);
    assert_eq!(placed.len(), 3);
    for l in &placed {
        assert!(l.center.y < 150.0, "leaf below center: {l:?}");
        let dist = ((l.center.x - 150.0).powi(2) + (l.center.y - 150.0).powi(2)).sqrt();
        assert!((dist - 135.0).abs() < 1e-9);
    }
}

#[test]
fn seeded_placement_is_reproducible_per_entity() {
    let opts = leaves(7, 0.5);
    let a = leaf_placements(&opts, 300.0, &mut leaf_rng(Some(42), "imp"));
    let b = leaf_placements(&opts, 300.0, &mut leaf_rng(Some(42), "imp"));
    assert_eq!(a, b);

    let slots_a: Vec<_> = (0..16)
        .map(|i| leaf_placements(&opts, 300.0, &mut leaf_rng(Some(i), "imp")).len())
        .collect();
    let slots_b: Vec<_> = (0..16)
        .map(|i| leaf_placements(&opts, 300.0, &mut leaf_rng(Some(i), "baron")).len())
        .collect();
    assert_ne!(slots_a, slots_b);
}

#[test]
fn vector_leaves_bleed_outside_the_clip() {
    let mut canvas = TokenCanvas::new(100).unwrap();
    let placed = [LeafPlacement {
        center: Point::new(50.0, 2.0),
        angle: 0.0,
        size: 40.0,
    }];
    draw_leaves(&mut canvas, &placed, &LeafOptions::default(), None).unwrap();
    // Inside the square but outside the inscribed circle.
    assert!(canvas.pixel(33, 2).unwrap()[3] > 0);
}
