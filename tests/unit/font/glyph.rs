use super::*;
use crate::foundation::core::Point;
use crate::movie::model::{ShapeRecord, StyleChange};

fn square(x: i32, size: i32) -> Vec<ShapeRecord> {
    vec![
        ShapeRecord::StyleChange(StyleChange {
            move_to: Some((x, 0)),
            fill_style1: Some(1),
            ..StyleChange::default()
        }),
        ShapeRecord::Line { dx: size, dy: 0 },
        ShapeRecord::Line { dx: 0, dy: size },
        ShapeRecord::Line { dx: -size, dy: 0 },
        ShapeRecord::Line { dx: 0, dy: -size },
    ]
}

fn font(glyphs: Vec<Vec<ShapeRecord>>, advances: Vec<f64>) -> FontDef {
    FontDef {
        id: 4,
        name: "Test".to_string(),
        version: 3,
        ascent: 0.0,
        descent: 0.0,
        codes: (0..glyphs.len() as u16).map(|i| 65 + i).collect(),
        advances,
        glyphs,
        kernings: Vec::new(),
    }
}

#[test]
fn glyph_outline_splits_into_contours() {
    let mut records = square(0, 100);
    records.push(ShapeRecord::StyleChange(StyleChange {
        move_to: Some((200, 0)),
        ..StyleChange::default()
    }));
    records.extend(square(200, 100).into_iter().skip(1));
    let def = font(vec![records], vec![1000.0]);
    let glyphs =
        parse_font_glyphs(&def, FontScale::new(0.5, -0.5, 1.0, 1.0), &Locator::file(0)).unwrap();

    assert_eq!(glyphs.len(), 1);
    assert_eq!(glyphs[0].advance_width, 500.0);
    assert_eq!(glyphs[0].contours.len(), 2);
    for c in &glyphs[0].contours {
        assert!(matches!(c.elements[0], PathElement::MoveTo(_)));
        assert_eq!(
            c.elements
                .iter()
                .filter(|e| matches!(e, PathElement::MoveTo(_)))
                .count(),
            1
        );
    }
    assert_eq!(
        glyphs[0].contours[1].elements[0],
        PathElement::MoveTo(Point::new(100.0, 0.0))
    );
    assert_eq!(
        glyphs[0].contours[0].elements[2],
        PathElement::LineTo(Point::new(50.0, -50.0))
    );
}

#[test]
fn fonts_without_layout_have_zero_advances() {
    let def = font(vec![square(0, 10), Vec::new()], Vec::new());
    let glyphs =
        parse_font_glyphs(&def, FontScale::new(1.0, -1.0, 1.0, 1.0), &Locator::file(0)).unwrap();
    assert_eq!(glyphs[0].advance_width, 0.0);
    assert!(glyphs[1].is_whitespace());
}

#[test]
fn table_length_mismatch_is_a_resource_error() {
    let mut def = font(vec![square(0, 10)], vec![1.0, 2.0]);
    let err = parse_font_glyphs(&def, FontScale::new(1.0, 1.0, 1.0, 1.0), &Locator::file(0))
        .unwrap_err();
    assert!(matches!(err, ConvertError::Resource { .. }));

    def.advances.clear();
    def.codes.push(70);
    assert!(
        parse_font_glyphs(&def, FontScale::new(1.0, 1.0, 1.0, 1.0), &Locator::file(0)).is_err()
    );
}
