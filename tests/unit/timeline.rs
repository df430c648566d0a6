use super::*;
use crate::movie::model::{MovieHeader, ShapeDef, SpriteDef, TwipsRect};

fn shape(id: u16) -> Tag {
    Tag::DefineShape(ShapeDef {
        id,
        bounds: TwipsRect::default(),
        fill_styles: Vec::new(),
        line_styles: Vec::new(),
        records: Vec::new(),
    })
}

fn place(depth: u16, id: u16) -> Tag {
    Tag::PlaceObject(PlaceObject {
        depth,
        id: Some(id),
        ..PlaceObject::default()
    })
}

fn remove(depth: u16, id: Option<u16>) -> Tag {
    Tag::RemoveObject(RemoveObject { depth, id })
}

fn sprite(id: u16, tags: Vec<Tag>) -> Tag {
    Tag::DefineSprite(SpriteDef {
        id,
        frame_count: 1,
        tags,
    })
}

fn movie(frame_count: u32, tags: Vec<Tag>) -> Movie {
    Movie {
        header: MovieHeader {
            frame_size: TwipsRect {
                min_x: 0,
                min_y: 0,
                max_x: 2000,
                max_y: 1000,
            },
            frame_count,
        },
        tags,
    }
}

fn frames<'a>(movie: &'a Movie, config: &ConvertConfig) -> ConvertResult<Vec<Frame<'a>>> {
    let dictionary = Dictionary::new(movie);
    build_frames(movie, &dictionary, config, &Locator::file(0))
}

fn ids(frame: &Frame<'_>) -> Vec<u16> {
    frame.placements.iter().map(|p| p.id).collect()
}

#[test]
fn show_frame_snapshots_the_display_list() {
    let m = movie(
        2,
        vec![
            shape(1),
            shape(2),
            place(1, 1),
            place(2, 2),
            Tag::ShowFrame,
            remove(1, Some(1)),
            Tag::ShowFrame,
        ],
    );
    let out = frames(&m, &ConvertConfig::default()).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(ids(&out[0]), vec![1, 2]);
    assert_eq!(ids(&out[1]), vec![2]);
    assert_eq!((out[0].width, out[0].height), (2000, 1000));
    assert_eq!(out[1].placements[0].locator.ids.to_vec(), vec![2]);
}

#[test]
fn insertion_order_is_kept() {
    let m = movie(1, vec![shape(1), shape(2), place(5, 1), place(2, 2), Tag::ShowFrame]);
    let out = frames(&m, &ConvertConfig::default()).unwrap();
    let depths: Vec<_> = out[0].placements.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![5, 2]);
}

#[test]
fn overwritten_depth_is_a_structure_error() {
    let m = movie(1, vec![shape(1), place(1, 1), place(1, 1), Tag::ShowFrame]);
    let err = frames(&m, &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Structure { .. }));
}

#[test]
fn remove_checks_depth_and_id() {
    let m = movie(1, vec![shape(1), place(1, 1), remove(1, Some(9))]);
    let err = frames(&m, &ConvertConfig::default()).unwrap_err();
    assert!(err.to_string().contains("expected 9"));

    let m = movie(1, vec![remove(3, None)]);
    let err = frames(&m, &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Structure { .. }));

    let m = movie(1, vec![shape(1), place(1, 1), remove(1, None), Tag::ShowFrame]);
    assert!(frames(&m, &ConvertConfig::default()).unwrap()[0].placements.is_empty());
}

#[test]
fn unknown_character_and_modify_mode_are_rejected() {
    let m = movie(1, vec![place(1, 42), Tag::ShowFrame]);
    let err = frames(&m, &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Resource { .. }));
    assert_eq!(err.locator().unwrap().ids.to_vec(), vec![42]);

    let m = movie(
        1,
        vec![
            shape(1),
            Tag::PlaceObject(PlaceObject {
                depth: 1,
                id: Some(1),
                mode: PlaceMode::Modify,
                ..PlaceObject::default()
            }),
        ],
    );
    let err = frames(&m, &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Unsupported { .. }));
}

#[test]
fn sprites_keep_their_first_frame() {
    let m = movie(
        1,
        vec![
            shape(1),
            shape(2),
            sprite(
                10,
                vec![place(1, 1), Tag::ShowFrame, place(2, 2), Tag::ShowFrame],
            ),
            sprite(11, vec![place(1, 2)]),
            place(1, 10),
            place(2, 11),
            Tag::ShowFrame,
        ],
    );
    let out = frames(&m, &ConvertConfig::default()).unwrap();
    assert_eq!(out.len(), 1);
    let first = out[0].placements[0].sprite.as_ref().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, 1);
    assert_eq!(first[0].locator.ids.to_vec(), vec![10, 1]);
    // Implicit frame of a sprite without show-frame.
    let implicit = out[0].placements[1].sprite.as_ref().unwrap();
    assert_eq!(implicit[0].id, 2);
}

#[test]
fn recursive_frames_lift_sprite_frames() {
    let config = ConvertConfig {
        recursive_frames: true,
        ..ConvertConfig::default()
    };
    let m = movie(
        1,
        vec![
            shape(1),
            shape(2),
            sprite(
                10,
                vec![place(2, 1), Tag::ShowFrame, place(3, 2), Tag::ShowFrame],
            ),
            place(1, 1),
            place(5, 10),
            Tag::ShowFrame,
        ],
    );
    let out = frames(&m, &config).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(ids(&out[0]), vec![1, 1]);
    assert_eq!(ids(&out[1]), vec![1, 1, 2]);
    assert!(out.iter().all(|f| f.placements.iter().all(|p| p.sprite.is_none())));
}

#[test]
fn frame_size_override_is_in_inches() {
    let config = ConvertConfig {
        frame_size: Some([2.0, 0.5]),
        ..ConvertConfig::default()
    };
    let m = movie(1, vec![Tag::ShowFrame]);
    let out = frames(&m, &config).unwrap();
    assert_eq!((out[0].width, out[0].height), (2880, 720));
}
