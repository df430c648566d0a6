use super::*;

fn tint(mult: [f32; 4], add: [f32; 4]) -> ColorTransform {
    ColorTransform { mult, add }
}

#[test]
fn empty_stack_is_identity() {
    let ct = CompositeColorTransform::new();
    let c = Color::rgba(12, 34, 56, 78);
    assert!(ct.is_identity());
    assert_eq!(ct.apply(c), c);
}

#[test]
fn multiply_then_add_then_clamp() {
    let mut ct = CompositeColorTransform::new();
    ct.push(tint([0.5, 2.0, 1.0, 1.0], [10.0, 0.0, -300.0, 0.0]));
    let out = ct.apply(Color::rgba(100, 200, 100, 255));
    assert_eq!(out, Color::rgba(60, 255, 0, 255));
}

#[test]
fn transforms_apply_in_push_order() {
    // (c * 0.5) + 100 then * 2: order matters.
    let mut ct = CompositeColorTransform::new();
    ct.push(tint([0.5, 1.0, 1.0, 1.0], [100.0, 0.0, 0.0, 0.0]));
    ct.push(tint([2.0, 1.0, 1.0, 1.0], [0.0, 0.0, 0.0, 0.0]));
    assert_eq!(ct.apply(Color::rgb(50, 0, 0)).r, 250);

    let mut reversed = CompositeColorTransform::new();
    reversed.push(tint([2.0, 1.0, 1.0, 1.0], [0.0, 0.0, 0.0, 0.0]));
    reversed.push(tint([0.5, 1.0, 1.0, 1.0], [100.0, 0.0, 0.0, 0.0]));
    assert_eq!(reversed.apply(Color::rgb(50, 0, 0)).r, 150);
}

#[test]
fn pop_restores_previous_state() {
    let mut ct = CompositeColorTransform::new();
    ct.push(tint([1.0; 4], [0.0, 0.0, 0.0, -128.0]));
    assert_eq!(ct.depth(), 1);
    assert_eq!(ct.apply(Color::rgb(1, 2, 3)).a, 127);
    assert!(ct.pop().is_some());
    assert_eq!(ct.apply(Color::rgb(1, 2, 3)), Color::rgb(1, 2, 3));
    assert!(ct.pop().is_none());
}

#[test]
fn pixel_buffers_use_the_same_math() {
    let mut ct = CompositeColorTransform::new();
    ct.push(tint([1.0, 1.0, 1.0, 0.5], [0.0; 4]));
    let mut px = vec![10, 20, 30, 200, 1, 2, 3, 100];
    ct.apply_rgba8(&mut px);
    assert_eq!(px, vec![10, 20, 30, 100, 1, 2, 3, 50]);
}

#[test]
fn missing_json_fields_take_identity_defaults() {
    let t: ColorTransform = serde_json::from_str(r#"{"add":[0,0,0,10]}"#).unwrap();
    assert_eq!(t.mult, [1.0; 4]);
    assert!(!t.is_identity());
    assert!(ColorTransform::default().is_identity());
}
