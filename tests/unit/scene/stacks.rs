use super::*;
use crate::foundation::core::Point;
use crate::ir::model::ShapeObject;
use crate::ir::path::PathElement;

fn leaf(id: u16) -> FrameObject {
    FrameObject::Shape(ShapeObject {
        id,
        paths: Vec::new(),
    })
}

fn stacks() -> SceneStacks {
    SceneStacks::new(GroupObject::new(0, GroupKind::Simple), Affine::scale(0.05))
}

fn clip_path() -> Vec<Path> {
    vec![Path::outline(vec![
        PathElement::MoveTo(Point::new(0.0, 0.0)),
        PathElement::LineTo(Point::new(10.0, 0.0)),
        PathElement::LineTo(Point::new(0.0, 10.0)),
    ])]
}

fn ids(group: &GroupObject) -> Vec<u16> {
    group.objects.iter().map(FrameObject::id).collect()
}

#[test]
fn empty_groups_are_pruned_on_pop() {
    let mut s = stacks();
    s.push_simple(1);
    s.push_transform(2, Affine::translate((10.0, 0.0)));
    s.push_blend(3, BlendMode::Multiply);
    s.unwind(1);
    s.append(leaf(4));
    let root = s.finish();
    assert_eq!(ids(&root), vec![4]);
}

#[test]
fn popped_groups_attach_in_paint_order() {
    let mut s = stacks();
    s.append(leaf(1));
    s.push_transform(2, Affine::translate((10.0, 0.0)));
    s.append(leaf(3));
    s.unwind(1);
    s.append(leaf(4));
    let root = s.finish();
    assert_eq!(ids(&root), vec![1, 2, 4]);
    let FrameObject::Group(g) = &root.objects[1] else {
        panic!("expected group");
    };
    assert_eq!(ids(g), vec![3]);
}

#[test]
fn transforms_and_blends_follow_their_groups() {
    let mut s = stacks();
    let mark = s.group_depth();
    s.push_transform(1, Affine::translate((20.0, 0.0)));
    s.push_blend(2, BlendMode::Screen);
    assert_eq!(s.transform(), Affine::scale(0.05) * Affine::translate((20.0, 0.0)));
    assert_eq!(s.blend(), BlendMode::Screen);
    s.unwind(mark);
    assert_eq!(s.transform(), Affine::scale(0.05));
    assert_eq!(s.blend(), BlendMode::Normal);
}

#[test]
fn masking_nothing_is_a_no_op() {
    let mut s = stacks();
    assert!(!s.push_masked(Rect::new(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(s.group_depth(), 1);
    assert_eq!(s.finish().objects.len(), 0);
}

#[test]
fn masking_moves_previous_children() {
    let mut s = stacks();
    s.append(leaf(1));
    s.append(leaf(2));
    assert!(s.push_masked(Rect::new(0.0, 0.0, 1.0, 1.0)));
    s.append(leaf(3));
    s.unwind(1);
    let root = s.finish();
    assert_eq!(ids(&root), vec![0]);
    let FrameObject::Group(masked) = &root.objects[0] else {
        panic!("expected masked group");
    };
    assert_eq!(ids(masked), vec![1, 2, 3]);
    assert_eq!(masked.mask().map(FrameObject::id), Some(3));
}

#[test]
fn masked_group_takes_the_enclosing_group_id() {
    let mut s = stacks();
    s.push_simple(7);
    s.append(leaf(1));
    assert!(s.push_masked(Rect::new(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(s.current().id, 7);
    assert_eq!(s.current_kind(), &GroupKind::Masked(Rect::new(0.0, 0.0, 1.0, 1.0)));
    s.append(leaf(2));
    s.unwind(1);
    let root = s.finish();
    let FrameObject::Group(sprite) = &root.objects[0] else {
        panic!("expected sprite group");
    };
    assert_eq!(sprite.id, 7);
    assert_eq!(ids(sprite), vec![7]);
}

#[test]
fn nested_clips_close_inner_first() {
    let loc = Locator::file(0);
    let mut s = stacks();
    s.push_clip(1, 10, clip_path(), &loc).unwrap();
    s.push_clip(2, 5, clip_path(), &loc).unwrap();
    s.append(leaf(3));
    s.close_clips(5, &loc).unwrap();
    assert_eq!(s.clips(), &[10]);
    s.append(leaf(4));
    s.close_clips(10, &loc).unwrap();
    let root = s.finish();

    let FrameObject::Group(outer) = &root.objects[0] else {
        panic!("expected clip group");
    };
    assert_eq!(outer.id, 1);
    assert_eq!(ids(outer), vec![2, 4]);
}

#[test]
fn interlaced_clips_are_rejected() {
    let loc = Locator::file(0);
    let mut s = stacks();
    s.push_clip(1, 5, clip_path(), &loc).unwrap();
    let err = s.push_clip(2, 8, clip_path(), &loc).unwrap_err();
    assert!(matches!(err, ConvertError::Structure { .. }));
}

#[test]
fn closing_a_clip_over_another_group_fails() {
    let loc = Locator::file(0);
    let mut s = stacks();
    s.push_clip(1, 5, clip_path(), &loc).unwrap();
    s.push_simple(2);
    assert!(s.close_clips(5, &loc).is_err());
}

#[test]
fn clip_scopes_restore_enclosing_clips() {
    let loc = Locator::file(0);
    let mut s = stacks();
    s.push_clip(1, 50, clip_path(), &loc).unwrap();
    s.push_simple(2);
    let saved = s.enter_clip_scope();
    assert!(s.clips().is_empty());
    s.push_clip(3, 9, clip_path(), &loc).unwrap();
    s.append(leaf(4));
    s.close_clips(9, &loc).unwrap();
    s.leave_clip_scope(saved, &loc).unwrap();
    assert_eq!(s.clips(), &[50]);
    s.unwind(2);
    s.close_clips(50, &loc).unwrap();
    assert_eq!(s.finish().objects.len(), 1);
}

#[test]
fn leaving_a_scope_with_open_clips_fails() {
    let loc = Locator::file(0).child(7);
    let mut s = stacks();
    let saved = s.enter_clip_scope();
    s.push_clip(3, 9, clip_path(), &loc).unwrap();
    s.append(leaf(4));
    let err = s.leave_clip_scope(saved, &loc).unwrap_err();
    assert!(matches!(err, ConvertError::Structure { .. }));
    assert_eq!(err.locator(), Some(&loc));
    assert!(err.to_string().contains("expected empty child clip stack"));
}

#[test]
#[should_panic(expected = "not balanced")]
fn unbalanced_finish_panics() {
    let mut s = stacks();
    s.push_simple(1);
    s.finish();
}
