use super::*;
use crate::color::ColorTransform;
use crate::font::model::{FontGlyph, FontMetrics, GlyphData};
use crate::foundation::core::{Point, YAxisDirection};
use crate::movie::model::{Matrix, TwipsRect};

const A: u16 = 0;
const SPACE: u16 = 1;
const B: u16 = 2;

fn glyph(ch: char, advance: f64) -> FontGlyph {
    FontGlyph {
        ch,
        data: GlyphData {
            advance_width: advance,
            contours: vec![Path::outline(vec![
                PathElement::MoveTo(Point::new(0.0, 0.0)),
                PathElement::LineTo(Point::new(advance, 0.0)),
                PathElement::LineTo(Point::new(0.0, 500.0)),
            ])],
        },
    }
}

fn font(id: u16, scale: FontScale) -> Font {
    Font {
        id: FontId {
            file_index: 0,
            font_id: id,
        },
        name: "serif".to_string(),
        metrics: FontMetrics {
            ascent: 800.0,
            descent: 200.0,
            scale,
        },
        glyphs: vec![
            glyph('A', 600.0),
            FontGlyph {
                ch: ' ',
                data: GlyphData::whitespace(),
            },
            glyph('B', 500.0),
        ],
        file: None,
    }
}

fn fonts() -> FontMap {
    let mut map = FontMap::new();
    for (id, scale) in [
        (1, FontScale::new(1.0, -1.0, 1.0, 1.0)),
        (2, FontScale::new(0.05, -0.05, 20.0, 20.0)),
    ] {
        let f = font(id, scale);
        map.insert(f.id, Arc::new(f));
    }
    map
}

fn down() -> ConvertConfig {
    ConvertConfig {
        y_axis: YAxisDirection::Down,
        ..ConvertConfig::default()
    }
}

fn span(font_id: Option<u16>, glyphs: &[(u16, f64)]) -> TextSpanDef {
    TextSpanDef {
        font_id,
        height: Some(1024.0),
        color: Some(Color::BLACK),
        glyphs: glyphs
            .iter()
            .map(|&(index, advance)| GlyphEntry { index, advance })
            .collect(),
        ..TextSpanDef::default()
    }
}

fn text(spans: Vec<TextSpanDef>) -> TextDef {
    TextDef {
        id: 5,
        bounds: TwipsRect {
            min_x: 0,
            min_y: 0,
            max_x: 100,
            max_y: 50,
        },
        matrix: Matrix::default(),
        spans,
    }
}

fn run(config: &ConvertConfig, def: &TextDef) -> ConvertResult<Vec<FrameObject>> {
    let fonts = fonts();
    TextTranslator::new(config, &fonts, 0).translate(
        def,
        &CompositeColorTransform::new(),
        &Locator::file(0).child(def.id),
    )
}

fn texts(objects: &[FrameObject]) -> Vec<&TextObject> {
    let mut out = Vec::new();
    for obj in objects {
        match obj {
            FrameObject::Text(t) => out.push(t),
            FrameObject::Group(g) => out.extend(texts(&g.objects)),
            FrameObject::Shape(_) => {}
        }
    }
    out
}

#[test]
fn folded_whitespace_matches_a_single_space() {
    let config = down();
    let double = run(
        &config,
        &text(vec![span(
            Some(1),
            &[(A, 700.0), (SPACE, 100.0), (SPACE, 200.0), (B, 500.0)],
        )]),
    )
    .unwrap();
    let single = run(
        &config,
        &text(vec![span(Some(1), &[(A, 700.0), (SPACE, 300.0), (B, 500.0)])]),
    )
    .unwrap();

    let (double, single) = (texts(&double), texts(&single));
    assert_eq!(double[0].text, "A B");
    assert_eq!(double[0].text, single[0].text);
    assert_eq!(double[0].glyph_indices, single[0].glyph_indices);
    assert_eq!(double[0].glyph_offsets, vec![100.0, 44.0]);
    assert_eq!(double[0].glyph_offsets, single[0].glyph_offsets);
}

#[test]
fn leading_whitespace_moves_the_origin() {
    let mut s = span(Some(1), &[(SPACE, 300.0), (A, 600.0), (SPACE, 100.0)]);
    s.offset_x = Some(1000.0);
    let objects = run(&down(), &text(vec![s])).unwrap();
    let t = texts(&objects);
    assert_eq!(t[0].x, 1300.0);
    assert_eq!(t[0].text, "A");
    assert!(t[0].glyph_offsets.is_empty());
}

#[test]
fn small_deviations_carry_into_the_next_glyph() {
    let objects = run(
        &down(),
        &text(vec![span(
            Some(1),
            &[(A, 620.0), (A, 620.0), (A, 620.0), (B, 500.0)],
        )]),
    )
    .unwrap();
    assert_eq!(texts(&objects)[0].glyph_offsets, vec![0.0, 40.0]);
}

#[test]
fn offsets_replace_and_drawing_advances() {
    let mut first = span(Some(1), &[(A, 600.0)]);
    first.offset_x = Some(100.0);
    let second = span(None, &[(B, 500.0)]);
    let mut third = span(None, &[(A, 600.0)]);
    third.offset_x = Some(50.0);
    third.offset_y = Some(30.0);

    let objects = run(&down(), &text(vec![first, second, third])).unwrap();
    let xs: Vec<_> = texts(&objects).iter().map(|t| (t.x, t.y)).collect();
    assert_eq!(xs, vec![(100.0, 0.0), (700.0, 0.0), (50.0, 30.0)]);
}

#[test]
fn mixed_font_scales_are_unsupported() {
    let def = text(vec![span(Some(1), &[(A, 600.0)]), span(Some(2), &[(A, 600.0)])]);
    let err = run(&down(), &def).unwrap_err();
    assert!(matches!(err, ConvertError::Unsupported { .. }));
}

#[test]
fn empty_and_zero_size_spans_produce_nothing() {
    let mut zero = span(Some(1), &[(A, 600.0)]);
    zero.height = Some(0.0);
    let blank = span(None, &[(SPACE, 256.0), (SPACE, 256.0)]);
    assert!(run(&down(), &text(vec![zero, blank])).unwrap().is_empty());
    assert!(run(&down(), &text(vec![span(None, &[])])).unwrap().is_empty());
}

#[test]
fn glyph_index_out_of_range_is_a_resource_error() {
    let err = run(&down(), &text(vec![span(Some(1), &[(9, 600.0)])])).unwrap_err();
    assert!(matches!(err, ConvertError::Resource { .. }));
}

#[test]
fn upward_y_axis_flips_text_back_upright() {
    let mut s = span(Some(2), &[(A, 12000.0)]);
    s.offset_y = Some(200.0);
    let objects = run(&ConvertConfig::default(), &text(vec![s])).unwrap();
    let FrameObject::Group(group) = &objects[0] else {
        panic!("expected transform group");
    };
    assert_eq!(
        group.kind,
        GroupKind::Transform(Affine::new([20.0, 0.0, 0.0, -20.0, 0.0, 0.0]))
    );
    let t = texts(&objects);
    assert_eq!(t[0].y, -10.0);
    assert_eq!(t[0].font.name, "serif");
}

#[test]
fn colors_and_debug_bounds() {
    let config = ConvertConfig {
        draw_text_bounds: true,
        ..down()
    };
    let fonts = fonts();
    let mut colors = CompositeColorTransform::new();
    colors.push(ColorTransform {
        mult: [1.0; 4],
        add: [255.0, 0.0, 0.0, 0.0],
    });
    let objects = TextTranslator::new(&config, &fonts, 0)
        .translate(
            &text(vec![span(Some(1), &[(A, 600.0)])]),
            &colors,
            &Locator::file(0),
        )
        .unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(texts(&objects)[0].color, Color::rgb(255, 0, 0));
    let FrameObject::Shape(bounds) = &objects[1] else {
        panic!("expected bounds shape last");
    };
    assert_eq!(
        bounds.paths[0].elements,
        vec![PathElement::Rectangle(kurbo::Rect::new(0.0, 0.0, 100.0, 50.0))]
    );
    assert!(bounds.paths[0].line.is_some());
}
