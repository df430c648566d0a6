use crate::color::{ColorTransform, CompositeColorTransform};
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::ir::model::{BlendMode, FrameObject, GroupKind, GroupObject};
use crate::ir::path::Path;

/// Mutable state of a scene under construction.
///
/// Groups are owned by the stack while open and attached to their parent when popped, unless
/// they ended up empty. The bottom group is the scene root and is never popped.
#[derive(Debug)]
pub struct SceneStacks {
    groups: Vec<GroupObject>,
    transforms: Vec<Affine>,
    blends: Vec<BlendMode>,
    clips: Vec<u16>,
    colors: CompositeColorTransform,
}

impl SceneStacks {
    /// Stacks holding only `root`, whose content is drawn under `root_transform`.
    pub fn new(root: GroupObject, root_transform: Affine) -> Self {
        Self {
            groups: vec![root],
            transforms: vec![root_transform],
            blends: vec![BlendMode::Normal],
            clips: Vec::new(),
            colors: CompositeColorTransform::new(),
        }
    }

    /// Number of open groups, the root included. Used as an unwind mark.
    pub fn group_depth(&self) -> usize {
        self.groups.len()
    }

    /// The group new objects are appended to.
    pub fn current(&mut self) -> &mut GroupObject {
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    /// Kind of the current group.
    pub fn current_kind(&self) -> &GroupKind {
        &self.groups[self.groups.len() - 1].kind
    }

    /// Cumulative transform from the current group to output points.
    pub fn transform(&self) -> Affine {
        self.transforms.last().copied().unwrap_or(Affine::IDENTITY)
    }

    /// Effective blend mode.
    pub fn blend(&self) -> BlendMode {
        self.blends.last().copied().unwrap_or_default()
    }

    /// End depths of the open clips, innermost last.
    pub fn clips(&self) -> &[u16] {
        &self.clips
    }

    /// Effective color transform.
    pub fn colors(&self) -> &CompositeColorTransform {
        &self.colors
    }

    /// Enter a placement carrying a color transform.
    pub fn push_color(&mut self, t: ColorTransform) {
        self.colors.push(t);
    }

    /// Leave the placement that pushed the top color transform.
    pub fn pop_color(&mut self) {
        self.colors.pop();
    }

    /// Append a leaf to the current group.
    pub fn append(&mut self, obj: FrameObject) {
        self.current().objects.push(obj);
    }

    /// Open a group that changes no drawing state.
    pub fn push_simple(&mut self, id: u16) {
        self.groups.push(GroupObject::new(id, GroupKind::Simple));
    }

    /// Open a transform group. Its content is drawn under the current transform followed by `t`.
    pub fn push_transform(&mut self, id: u16, t: Affine) {
        self.transforms.push(self.transform() * t);
        self.groups.push(GroupObject::new(id, GroupKind::Transform(t)));
    }

    /// Open a blend group and make `mode` the effective blend.
    pub fn push_blend(&mut self, id: u16, mode: BlendMode) {
        self.blends.push(mode);
        self.groups.push(GroupObject::new(id, GroupKind::Blend(mode)));
    }

    /// Move the children of the current group into a new masked group and open it.
    ///
    /// The masked group carries the id of the group it was split from.
    /// Returns `false` and changes nothing when there is nothing to mask.
    pub fn push_masked(&mut self, bounds: Rect) -> bool {
        let current = self.current();
        let id = current.id;
        let children = std::mem::take(&mut current.objects);
        if children.is_empty() {
            return false;
        }
        let mut group = GroupObject::new(id, GroupKind::Masked(bounds));
        group.objects = children;
        self.groups.push(group);
        true
    }

    /// Open a clip group that stays open until a placement reaches `end_depth`.
    ///
    /// Clip ranges must nest: a clip cannot end after the clip enclosing it.
    pub fn push_clip(
        &mut self,
        id: u16,
        end_depth: u16,
        paths: Vec<Path>,
        locator: &Locator,
    ) -> ConvertResult<()> {
        if let Some(&outer) = self.clips.last()
            && end_depth > outer
        {
            return Err(ConvertError::structure(
                locator,
                format!(
                    "interlaced clips: clip ends at depth {end_depth}, after enclosing clip ending at depth {outer}"
                ),
            ));
        }
        self.clips.push(end_depth);
        self.groups.push(GroupObject::new(id, GroupKind::Clip(paths)));
        Ok(())
    }

    /// Close the current group, attaching it to its parent if it has children.
    ///
    /// Returns `false` when only the root is left.
    pub fn pop_group(&mut self) -> bool {
        if self.groups.len() <= 1 {
            return false;
        }
        let Some(group) = self.groups.pop() else {
            return false;
        };
        match group.kind {
            GroupKind::Transform(_) => {
                self.transforms.pop();
            }
            GroupKind::Blend(_) => {
                self.blends.pop();
            }
            _ => {}
        }
        if !group.is_empty() {
            self.append(FrameObject::Group(group));
        }
        true
    }

    /// Close groups until `mark` groups are open.
    pub fn unwind(&mut self, mark: usize) {
        while self.groups.len() > mark && self.pop_group() {}
    }

    /// Close the clips ending at or before `depth`.
    pub fn close_clips(&mut self, depth: u16, locator: &Locator) -> ConvertResult<()> {
        while self.clips.last().is_some_and(|&end| end <= depth) {
            self.close_clip(locator)?;
        }
        Ok(())
    }

    fn close_clip(&mut self, locator: &Locator) -> ConvertResult<()> {
        if !matches!(self.current_kind(), GroupKind::Clip(_)) {
            return Err(ConvertError::structure(locator, "expected clip group"));
        }
        self.clips.pop();
        self.pop_group();
        Ok(())
    }

    /// Start a sprite: clip depths are local to the sprite. Returns the clips to restore.
    pub fn enter_clip_scope(&mut self) -> Vec<u16> {
        std::mem::take(&mut self.clips)
    }

    /// End a sprite or frame and restore the enclosing clips.
    ///
    /// Every clip opened in the scope must have been closed by a placement reaching its end depth.
    pub fn leave_clip_scope(&mut self, saved: Vec<u16>, locator: &Locator) -> ConvertResult<()> {
        if let Some(&end) = self.clips.last() {
            return Err(ConvertError::structure(
                locator,
                format!(
                    "expected empty child clip stack, {} clips open (innermost ends at depth {end})",
                    self.clips.len()
                ),
            ));
        }
        self.clips = saved;
        Ok(())
    }

    /// The root group. Anything but the root still open is a bug of the caller.
    pub fn finish(mut self) -> GroupObject {
        assert!(
            self.groups.len() == 1 && self.clips.is_empty(),
            "scene stacks not balanced: {} groups, {} clips open",
            self.groups.len(),
            self.clips.len()
        );
        self.groups.swap_remove(0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stacks.rs"]
mod tests;
