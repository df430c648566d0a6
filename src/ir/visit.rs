use std::collections::HashSet;
use std::sync::Arc;

use crate::bitmap::decoder::ImageData;
use crate::font::model::{Font, FontId};
use crate::ir::model::{FrameObject, FrameRoot, GroupKind, GroupObject};
use crate::ir::path::{FillStyle, Path};

/// Node counts of a converted tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SceneStats {
    /// Groups of any kind, the root included.
    pub groups: usize,
    /// Groups without children (always 0 for trees built by the scene builder).
    pub empty_groups: usize,
    /// Masked groups.
    pub masked_groups: usize,
    /// Clip groups.
    pub clip_groups: usize,
    /// Shape objects.
    pub shapes: usize,
    /// Text objects.
    pub texts: usize,
    /// Paths of shape objects.
    pub paths: usize,
}

/// Count the nodes of `root`.
pub fn scene_stats(root: &FrameRoot) -> SceneStats {
    let mut stats = SceneStats::default();
    walk_group(&root.group, &mut stats);
    stats
}

fn walk_group(group: &GroupObject, stats: &mut SceneStats) {
    stats.groups += 1;
    if group.is_empty() {
        stats.empty_groups += 1;
    }
    match group.kind {
        GroupKind::Masked(_) => stats.masked_groups += 1,
        GroupKind::Clip(_) => stats.clip_groups += 1,
        _ => {}
    }
    for obj in &group.objects {
        match obj {
            FrameObject::Group(g) => walk_group(g, stats),
            FrameObject::Shape(s) => {
                stats.shapes += 1;
                stats.paths += s.paths.len();
            }
            FrameObject::Text(_) => stats.texts += 1,
        }
    }
}

/// All images referenced by fill styles of `roots`, deduplicated by content key, in first-use
/// order.
pub fn collect_images<'a>(roots: impl IntoIterator<Item = &'a FrameRoot>) -> Vec<Arc<ImageData>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for root in roots {
        collect_group_images(&root.group, &mut seen, &mut out);
    }
    out
}

fn collect_group_images(
    group: &GroupObject,
    seen: &mut HashSet<u64>,
    out: &mut Vec<Arc<ImageData>>,
) {
    if let GroupKind::Clip(paths) = &group.kind {
        collect_path_images(paths, seen, out);
    }
    for obj in &group.objects {
        match obj {
            FrameObject::Group(g) => collect_group_images(g, seen, out),
            FrameObject::Shape(s) => collect_path_images(&s.paths, seen, out),
            FrameObject::Text(_) => {}
        }
    }
}

fn collect_path_images(paths: &[Path], seen: &mut HashSet<u64>, out: &mut Vec<Arc<ImageData>>) {
    for path in paths {
        if let Some(FillStyle::Image { image, .. }) = &path.fill
            && seen.insert(image.key)
        {
            out.push(Arc::clone(image));
        }
    }
}

/// Fonts used by text objects of `roots`, one per source font, in first-use order.
pub fn collect_fonts<'a>(roots: impl IntoIterator<Item = &'a FrameRoot>) -> Vec<Arc<Font>> {
    fn walk(group: &GroupObject, seen: &mut HashSet<FontId>, out: &mut Vec<Arc<Font>>) {
        for obj in &group.objects {
            match obj {
                FrameObject::Group(g) => walk(g, seen, out),
                FrameObject::Text(t) if seen.insert(t.font.id) => out.push(Arc::clone(&t.font)),
                FrameObject::Text(_) | FrameObject::Shape(_) => {}
            }
        }
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for root in roots {
        walk(&root.group, &mut seen, &mut out);
    }
    out
}
