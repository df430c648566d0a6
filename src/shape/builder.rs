use std::collections::{BTreeMap, HashMap};

use crate::foundation::core::{Affine, Point};
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::ir::path::{FillStyle, LineStyle, Path, PathElement};
use crate::movie::model::{FillStyleDef, LineStyleDef, ShapeDef, ShapeRecord};
use crate::shape::rect::path_to_rectangle;

/// Converts style table entries into IR styles.
///
/// Called at most once per style index of a shape.
pub trait StyleResolver {
    /// Convert a fill style entry.
    fn fill(&mut self, def: &FillStyleDef) -> ConvertResult<FillStyle>;
    /// Convert a line style entry.
    fn line(&mut self, def: &LineStyleDef) -> ConvertResult<LineStyle>;
}

/// Styled paths of `shape`, in group order then style index order, fills before lines.
///
/// Style indices beyond the style tables are a resource validation error.
pub fn styled_paths(
    shape: &ShapeDef,
    transform: Affine,
    allow_rectangles: bool,
    resolver: &mut dyn StyleResolver,
    locator: &Locator,
) -> ConvertResult<Vec<Path>> {
    let mut builder = PathBuilder::new(
        &shape.fill_styles,
        &shape.line_styles,
        transform,
        allow_rectangles,
        Some(resolver),
    );
    builder.build(&shape.records, locator)
}

/// Fill geometry of `shape` without styles, for clip regions.
pub fn outline_paths(
    shape: &ShapeDef,
    transform: Affine,
    locator: &Locator,
) -> ConvertResult<Vec<Path>> {
    let mut builder =
        PathBuilder::new(&shape.fill_styles, &shape.line_styles, transform, false, None);
    builder.build(&shape.records, locator)
}

/// Fill geometry of bare outline records (glyph shapes have no style tables).
pub fn record_outline_paths(
    records: &[ShapeRecord],
    transform: Affine,
    locator: &Locator,
) -> ConvertResult<Vec<Path>> {
    let mut builder = PathBuilder::new(&[], &[], transform, false, None);
    builder.build(records, locator)
}

type IPoint = (i32, i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Edge {
    start: IPoint,
    control: Option<IPoint>,
    end: IPoint,
    line_style: u32,
    fill_style: u32,
}

impl Edge {
    fn reversed(self, fill_style: u32) -> Self {
        Self {
            start: self.end,
            control: self.control,
            end: self.start,
            line_style: self.line_style,
            fill_style,
        }
    }
}

/// Edges of one style group, keyed by style index. Sorted keys give the emission order.
#[derive(Default)]
struct EdgeGroup {
    fills: BTreeMap<u32, Vec<Edge>>,
    lines: BTreeMap<u32, Vec<Edge>>,
}

impl EdgeGroup {
    fn file_subpath(&mut self, sub: &[Edge], line: u32, fill0: u32, fill1: u32) {
        if sub.is_empty() {
            return;
        }
        if fill0 != 0 {
            // Fill on the wrong side: reverse so every filed edge has its fill on the same side.
            let list = self.fills.entry(fill0).or_default();
            list.extend(sub.iter().rev().map(|e| e.reversed(fill0)));
        }
        if fill1 != 0 {
            self.fills.entry(fill1).or_default().extend_from_slice(sub);
        }
        if line != 0 {
            self.lines.entry(line).or_default().extend_from_slice(sub);
        }
    }

    fn stitched(mut self) -> Self {
        for edges in self.fills.values_mut().chain(self.lines.values_mut()) {
            *edges = stitch(std::mem::take(edges));
        }
        self
    }
}

/// Chain edges so each one starts where the previous one ended whenever possible.
///
/// Successors are looked up by start point first. An edge ending at the chain end is flipped and
/// used when no edge starts there. Otherwise a new chain starts at the first unused edge.
fn stitch(mut edges: Vec<Edge>) -> Vec<Edge> {
    let n = edges.len();
    let mut by_start: HashMap<IPoint, Vec<usize>> = HashMap::new();
    let mut by_end: HashMap<IPoint, Vec<usize>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        by_start.entry(e.start).or_default().push(i);
        by_end.entry(e.end).or_default().push(i);
    }

    let first_unused = |map: &HashMap<IPoint, Vec<usize>>, p: IPoint, used: &[bool]| {
        map.get(&p)
            .and_then(|list| list.iter().copied().find(|&i| !used[i]))
    };

    let mut used = vec![false; n];
    let mut out = Vec::with_capacity(n);
    let mut cursor = 0usize;
    let mut chain_end: Option<IPoint> = None;

    while out.len() < n {
        let next = match chain_end {
            None => {
                while used[cursor] {
                    cursor += 1;
                }
                Some(cursor)
            }
            Some(p) => first_unused(&by_start, p, &used).or_else(|| {
                first_unused(&by_end, p, &used).map(|i| {
                    edges[i] = edges[i].reversed(edges[i].fill_style);
                    i
                })
            }),
        };
        match next {
            Some(i) => {
                used[i] = true;
                chain_end = Some(edges[i].end);
                out.push(edges[i]);
            }
            None => chain_end = None,
        }
    }
    out
}

struct PathBuilder<'a, 'r> {
    fill_defs: Vec<&'a FillStyleDef>,
    line_defs: Vec<&'a LineStyleDef>,
    transform: Affine,
    allow_rectangles: bool,
    resolver: Option<&'r mut dyn StyleResolver>,
    fill_cache: HashMap<u32, FillStyle>,
    line_cache: HashMap<u32, LineStyle>,
    paths: Vec<Path>,
}

impl<'a, 'r> PathBuilder<'a, 'r> {
    fn new(
        fills: &'a [FillStyleDef],
        lines: &'a [LineStyleDef],
        transform: Affine,
        allow_rectangles: bool,
        resolver: Option<&'r mut dyn StyleResolver>,
    ) -> Self {
        Self {
            fill_defs: fills.iter().collect(),
            line_defs: lines.iter().collect(),
            transform,
            allow_rectangles,
            resolver,
            fill_cache: HashMap::new(),
            line_cache: HashMap::new(),
            paths: Vec::new(),
        }
    }

    fn build(&mut self, records: &'a [ShapeRecord], locator: &Locator) -> ConvertResult<Vec<Path>> {
        let groups = self.collect_groups(records, locator)?;
        let styled = self.resolver.is_some();
        for group in groups {
            for (&idx, edges) in &group.fills {
                let fill = if styled {
                    Some(self.fill_style(idx, locator)?)
                } else {
                    None
                };
                self.emit(edges, fill, None);
            }
            if styled {
                for (&idx, edges) in &group.lines {
                    let line = self.line_style(idx, locator)?;
                    self.emit(edges, None, Some(line));
                }
            }
        }
        Ok(std::mem::take(&mut self.paths))
    }

    fn collect_groups(
        &mut self,
        records: &'a [ShapeRecord],
        locator: &Locator,
    ) -> ConvertResult<Vec<EdgeGroup>> {
        let mut groups = Vec::new();
        let mut current = EdgeGroup::default();
        let mut sub: Vec<Edge> = Vec::new();
        let (mut x, mut y) = (0i32, 0i32);
        let (mut fill_offset, mut line_offset) = (0u32, 0u32);
        let (mut fill0, mut fill1, mut line) = (0u32, 0u32, 0u32);

        for record in records {
            match record {
                ShapeRecord::StyleChange(sc) => {
                    if sc.line_style.is_some() || sc.fill_style0.is_some() || sc.fill_style1.is_some()
                    {
                        current.file_subpath(&sub, line, fill0, fill1);
                        sub.clear();
                    }
                    if !sc.new_line_styles.is_empty() {
                        line_offset = self.line_defs.len() as u32;
                        self.line_defs.extend(sc.new_line_styles.iter());
                    }
                    if !sc.new_fill_styles.is_empty() {
                        fill_offset = self.fill_defs.len() as u32;
                        self.fill_defs.extend(sc.new_fill_styles.iter());
                    }
                    if sc.line_style == Some(0) && sc.fill_style0 == Some(0) && sc.fill_style1 == Some(0)
                    {
                        groups.push(std::mem::take(&mut current).stitched());
                        (fill0, fill1, line) = (0, 0, 0);
                    } else {
                        if let Some(v) = sc.line_style {
                            line = offset_style(v, line_offset, locator)?;
                        }
                        if let Some(v) = sc.fill_style0 {
                            fill0 = offset_style(v, fill_offset, locator)?;
                        }
                        if let Some(v) = sc.fill_style1 {
                            fill1 = offset_style(v, fill_offset, locator)?;
                        }
                    }
                    if let Some((mx, my)) = sc.move_to {
                        (x, y) = (mx, my);
                    }
                }
                ShapeRecord::Line { dx, dy } => {
                    let start = (x, y);
                    x = x.saturating_add(*dx);
                    y = y.saturating_add(*dy);
                    sub.push(Edge {
                        start,
                        control: None,
                        end: (x, y),
                        line_style: line,
                        fill_style: fill1,
                    });
                }
                ShapeRecord::Curve {
                    control_dx,
                    control_dy,
                    anchor_dx,
                    anchor_dy,
                } => {
                    let start = (x, y);
                    let control = (x.saturating_add(*control_dx), y.saturating_add(*control_dy));
                    x = control.0.saturating_add(*anchor_dx);
                    y = control.1.saturating_add(*anchor_dy);
                    sub.push(Edge {
                        start,
                        control: Some(control),
                        end: (x, y),
                        line_style: line,
                        fill_style: fill1,
                    });
                }
            }
        }

        current.file_subpath(&sub, line, fill0, fill1);
        groups.push(current.stitched());
        Ok(groups)
    }

    fn fill_style(&mut self, idx: u32, locator: &Locator) -> ConvertResult<FillStyle> {
        if let Some(f) = self.fill_cache.get(&idx) {
            return Ok(f.clone());
        }
        let def = lookup(&self.fill_defs, idx).ok_or_else(|| {
            ConvertError::resource(
                locator,
                format!(
                    "fill style index {idx} out of range ({} fill styles)",
                    self.fill_defs.len()
                ),
            )
        })?;
        let Some(resolver) = self.resolver.as_deref_mut() else {
            return Err(ConvertError::structure(locator, "fill style requested without resolver"));
        };
        let fill = resolver.fill(def)?;
        self.fill_cache.insert(idx, fill.clone());
        Ok(fill)
    }

    fn line_style(&mut self, idx: u32, locator: &Locator) -> ConvertResult<LineStyle> {
        if let Some(l) = self.line_cache.get(&idx) {
            return Ok(*l);
        }
        let def = lookup(&self.line_defs, idx).ok_or_else(|| {
            ConvertError::resource(
                locator,
                format!(
                    "line style index {idx} out of range ({} line styles)",
                    self.line_defs.len()
                ),
            )
        })?;
        let Some(resolver) = self.resolver.as_deref_mut() else {
            return Err(ConvertError::structure(locator, "line style requested without resolver"));
        };
        let line = resolver.line(def)?;
        self.line_cache.insert(idx, line);
        Ok(line)
    }

    fn emit(&mut self, edges: &[Edge], fill: Option<FillStyle>, line: Option<LineStyle>) {
        let mut elements = Vec::with_capacity(edges.len() + 1);
        let mut pos: Option<IPoint> = None;
        for e in edges {
            if pos != Some(e.start) {
                elements.push(PathElement::MoveTo(self.point(e.start)));
            }
            let end = self.point(e.end);
            elements.push(match e.control {
                Some(c) => PathElement::QuadTo(self.point(c), end),
                None => PathElement::LineTo(end),
            });
            pos = Some(e.end);
        }
        if elements.is_empty() {
            return;
        }
        if self.allow_rectangles
            && let Some(r) = path_to_rectangle(&elements)
        {
            elements = vec![PathElement::Rectangle(r)];
        }
        self.paths.push(Path {
            elements,
            fill,
            line,
        });
    }

    fn point(&self, p: IPoint) -> Point {
        self.transform * Point::new(f64::from(p.0), f64::from(p.1))
    }
}

/// Style index into the running table. Non-zero indices are relative to the last appended table.
fn offset_style(idx: u32, offset: u32, locator: &Locator) -> ConvertResult<u32> {
    if idx == 0 {
        return Ok(0);
    }
    idx.checked_add(offset).ok_or_else(|| {
        ConvertError::resource(
            locator,
            format!("style index {idx} overflows after a table extension of {offset}"),
        )
    })
}

fn lookup<'a, T>(table: &[&'a T], idx: u32) -> Option<&'a T> {
    let i = usize::try_from(idx).ok()?.checked_sub(1)?;
    table.get(i).copied()
}

#[cfg(test)]
#[path = "../../tests/unit/shape/builder.rs"]
mod tests;
