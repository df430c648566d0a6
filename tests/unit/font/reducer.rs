use super::*;
use crate::font::writer::MemoryFontWriter;
use crate::movie::model::{KerningRecord, MovieHeader, ShapeRecord, StyleChange, TwipsRect};

fn outline(size: i32) -> Vec<ShapeRecord> {
    if size == 0 {
        return Vec::new();
    }
    vec![
        ShapeRecord::StyleChange(StyleChange {
            move_to: Some((0, 0)),
            fill_style1: Some(1),
            ..StyleChange::default()
        }),
        ShapeRecord::Line { dx: size, dy: 0 },
        ShapeRecord::Line { dx: 0, dy: size },
        ShapeRecord::Line { dx: -size, dy: -size },
    ]
}

/// Font whose glyphs are `(code, triangle size)`; size 0 is a blank glyph.
fn font(id: u16, name: &str, glyphs: &[(u16, i32)]) -> FontDef {
    FontDef {
        id,
        name: name.to_string(),
        version: 2,
        ascent: 900.0,
        descent: 100.0,
        codes: glyphs.iter().map(|g| g.0).collect(),
        advances: glyphs.iter().map(|_| 500.0).collect(),
        glyphs: glyphs.iter().map(|g| outline(g.1)).collect(),
        kernings: Vec::new(),
    }
}

fn movie(fonts: Vec<FontDef>) -> Movie {
    Movie {
        header: MovieHeader {
            frame_size: TwipsRect::default(),
            frame_count: 1,
        },
        tags: fonts.into_iter().map(Tag::DefineFont).collect(),
    }
}

fn chars(font: &Font) -> String {
    font.glyphs.iter().map(|g| g.ch).collect()
}

struct FixedRecognizer(&'static str);

impl GlyphRecognizer for FixedRecognizer {
    fn recognize(&self, _glyph: &GlyphData) -> Option<String> {
        Some(self.0.to_string())
    }
}

#[test]
fn duplicate_and_invalid_codes_get_private_use_codes() {
    let config = ConvertConfig::default();
    let mut reducer = FontReducer::new(&config, None);
    let movies = [movie(vec![font(
        1,
        "Arial",
        &[(65, 10), (65, 20), (0x01, 30), (0x20, 40), (0xFFF5, 50)],
    )])];
    let fonts = reducer.create_fonts(&movies).unwrap();
    assert_eq!(
        chars(&fonts[0]),
        "A\u{E000}\u{E001}\u{E002}\u{E003}"
    );
}

#[test]
fn blank_glyphs_become_spaces() {
    let config = ConvertConfig::default();
    let mut reducer = FontReducer::new(&config, None);
    let movies = [movie(vec![font(1, "Arial", &[(0x09, 0), (0x41, 10), (0x20, 0)])])];
    let fonts = reducer.create_fonts(&movies).unwrap();
    assert_eq!(chars(&fonts[0]), " A ");
    assert_eq!(fonts[0].glyphs[0].data, GlyphData::whitespace());
}

#[test]
fn identical_remapped_glyphs_share_a_code_across_fonts() {
    let config = ConvertConfig::default();
    let mut reducer = FontReducer::new(&config, None);
    let movies = [
        movie(vec![font(1, "Arial", &[(0x01, 10)])]),
        movie(vec![font(1, "Arial", &[(0x02, 10), (0x03, 20)])]),
    ];
    let fonts = reducer.create_fonts(&movies).unwrap();
    assert_eq!(chars(&fonts[0]), "\u{E000}");
    assert_eq!(chars(&fonts[1]), "\u{E000}\u{E001}");
}

#[test]
fn recognizer_suggestions_are_normalized() {
    let config = ConvertConfig::default();
    let recognizer = FixedRecognizer("fi");
    let mut reducer = FontReducer::new(&config, Some(&recognizer));
    let movies = [movie(vec![font(1, "Arial", &[(0x01, 10), (0x02, 20)])])];
    let fonts = reducer.create_fonts(&movies).unwrap();
    // The second suggestion collides with the first and falls back.
    assert_eq!(chars(&fonts[0]), "\u{FB01}\u{E000}");
}

#[test]
fn only_versions_two_and_three_are_supported() {
    let config = ConvertConfig::default();
    let mut def = font(3, "Old", &[(65, 10)]);
    def.version = 1;
    let err = FontReducer::new(&config, None)
        .create_fonts(&[movie(vec![def])])
        .unwrap_err();
    assert!(matches!(err, ConvertError::Unsupported { .. }));
    assert_eq!(err.locator().map(|l| l.ids.to_vec()), Some(vec![3]));
}

#[test]
fn kerning_is_unsupported() {
    let config = ConvertConfig::default();
    let mut def = font(1, "Arial", &[(65, 10)]);
    def.kernings.push(KerningRecord {
        left: 65,
        right: 66,
        adjustment: -20,
    });
    let err = FontReducer::new(&config, None)
        .create_fonts(&[movie(vec![def])])
        .unwrap_err();
    assert!(err.to_string().contains("kerning"));
}

#[test]
fn metrics_use_the_version_scale() {
    let config = ConvertConfig::default();
    let mut def = font(1, "Arial", &[(65, 10)]);
    def.version = 3;
    def.ascent = 20000.0;
    let fonts = FontReducer::new(&config, None)
        .create_fonts(&[movie(vec![def])])
        .unwrap();
    assert_eq!(fonts[0].metrics.ascent, 1000.0);
    assert_eq!(fonts[0].metrics.scale, config.font_scale3);
    assert_eq!(fonts[0].glyphs[0].data.advance_width, 25.0);
}

#[test]
fn compatible_fonts_merge_and_share_one_file() {
    let config = ConvertConfig::default();
    let movies = [
        movie(vec![font(1, "Arial", &[(65, 10), (66, 20)])]),
        movie(vec![font(7, "Arial", &[(65, 10), (67, 30)])]),
        movie(vec![font(2, "Arial", &[(65, 11)])]),
    ];
    let reduced = FontReducer::new(&config, None)
        .reduce(&movies, &MemoryFontWriter)
        .unwrap();
    assert_eq!(reduced.groups.len(), 2);
    assert_eq!(reduced.groups[0].name, "arial");
    assert_eq!(reduced.groups[1].name, "arial-2");
    assert_eq!(reduced.groups[0].glyph_count, 3);

    let a = &reduced.fonts[&FontId {
        file_index: 0,
        font_id: 1,
    }];
    let b = &reduced.fonts[&FontId {
        file_index: 1,
        font_id: 7,
    }];
    let c = &reduced.fonts[&FontId {
        file_index: 2,
        font_id: 2,
    }];
    assert!(Arc::ptr_eq(a.file.as_ref().unwrap(), b.file.as_ref().unwrap()));
    assert!(!Arc::ptr_eq(a.file.as_ref().unwrap(), c.file.as_ref().unwrap()));
    assert_eq!(a.name, "arial");
    assert_eq!(c.name, "arial-2");
    // Source glyph indices stay valid after merging.
    assert_eq!(chars(b), "AC");
}

#[test]
fn differently_named_fonts_merge_in_the_final_pass() {
    let config = ConvertConfig::default();
    let reducer = FontReducer::new(&config, None);
    let mut fonts = FontReducer::new(&config, None)
        .create_fonts(&[movie(vec![
            font(1, "Arial", &[(65, 10)]),
            font(2, "Helvetica", &[(66, 20)]),
        ])])
        .unwrap();
    let groups = reducer.merge_fonts(fonts.clone());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].fonts.len(), 2);

    let ungrouped = FontReducer::new(
        &ConvertConfig {
            group_fonts: false,
            ..ConvertConfig::default()
        },
        None,
    )
    .merge_fonts(std::mem::take(&mut fonts));
    assert_eq!(ungrouped.len(), 2);
}

#[test]
fn merging_repeats_until_stable() {
    // The third font bridges the first two, which only merge on the second pass.
    let config = ConvertConfig::default();
    let fonts = FontReducer::new(&config, None)
        .create_fonts(&[movie(vec![
            font(1, "F", &[(65, 10)]),
            font(2, "F", &[(66, 20)]),
            font(3, "F", &[(65, 10), (66, 20)]),
        ])])
        .unwrap();
    let groups = merge_groups(fonts.into_iter().map(FontGroup::from_font).collect(), true);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].fonts.len(), 3);
}

#[test]
fn names_are_unique_and_file_safe() {
    let config = ConvertConfig {
        group_fonts: false,
        ..ConvertConfig::default()
    };
    let fonts = FontReducer::new(&config, None)
        .create_fonts(&[movie(vec![
            font(1, "My Font", &[(65, 10)]),
            font(2, "my font", &[(65, 20)]),
            font(3, "", &[(65, 30)]),
            font(4, "", &[(65, 30)]),
        ])])
        .unwrap();
    let mut groups = FontReducer::new(&config, None).merge_fonts(fonts);
    assign_unique_names(&mut groups);
    let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names[0], "my-font");
    assert_eq!(names[1], "my-font-2");
    assert!(names[2].starts_with("font-"));
    assert_eq!(names[3], format!("{}-2", names[2]));
}
