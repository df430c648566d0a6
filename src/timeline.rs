use std::sync::Arc;

use crate::config::ConvertConfig;
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::movie::model::{Dictionary, Movie, PlaceMode, PlaceObject, RemoveObject, Tag};

/// A character on the display list of a frame.
#[derive(Clone, Debug)]
pub struct Placement<'a> {
    /// Display list depth.
    pub depth: u16,
    /// Character id.
    pub id: u16,
    /// Place tag that put the character there.
    pub place: &'a PlaceObject,
    /// Definition of the character.
    pub definition: &'a Tag,
    /// Address of the placed character.
    pub locator: Locator,
    /// Display list of the sprite frame, for sprite characters.
    pub sprite: Option<Arc<[Placement<'a>]>>,
}

/// Snapshot of the display list at a show-frame tag.
#[derive(Clone, Debug)]
pub struct Frame<'a> {
    /// Frame width in twips.
    pub width: i32,
    /// Frame height in twips.
    pub height: i32,
    /// Placements in display list insertion order.
    pub placements: Vec<Placement<'a>>,
}

/// Display list in insertion order. Depth order is checked by the scene builder.
#[derive(Clone, Debug, Default)]
struct DisplayList<'a> {
    entries: Vec<Placement<'a>>,
}

impl<'a> DisplayList<'a> {
    fn contains(&self, depth: u16) -> bool {
        self.entries.iter().any(|p| p.depth == depth)
    }

    fn insert(&mut self, placement: Placement<'a>) {
        match self.entries.iter_mut().find(|p| p.depth == placement.depth) {
            Some(slot) => *slot = placement,
            None => self.entries.push(placement),
        }
    }

    fn remove(&mut self, depth: u16) -> Option<Placement<'a>> {
        let pos = self.entries.iter().position(|p| p.depth == depth)?;
        Some(self.entries.remove(pos))
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replay the display-list tags of `movie` into frames.
///
/// Only the first frame of each sprite is kept, unless `recursive_frames` lifts every sprite
/// frame to the movie timeline.
#[tracing::instrument(skip_all, fields(file = ?locator.file_index))]
pub fn build_frames<'a>(
    movie: &'a Movie,
    dictionary: &Dictionary<'a>,
    config: &ConvertConfig,
    locator: &Locator,
) -> ConvertResult<Vec<Frame<'a>>> {
    let (width, height) = config
        .frame_size_twips()
        .unwrap_or((movie.header.frame_size.width(), movie.header.frame_size.height()));
    let replay = Replay {
        dictionary,
        recursive: config.recursive_frames,
    };
    let lists = replay.tags(&movie.tags, false, locator)?;

    let declared = movie.header.frame_count as usize;
    if lists.len() != declared && !config.recursive_frames {
        tracing::warn!(
            expected = declared,
            found = lists.len(),
            "frame count mismatch between header and content"
        );
    }

    Ok(lists
        .into_iter()
        .map(|list| Frame {
            width,
            height,
            placements: list.entries,
        })
        .collect())
}

struct Replay<'d, 'a> {
    dictionary: &'d Dictionary<'a>,
    recursive: bool,
}

impl<'a> Replay<'_, 'a> {
    /// Display list snapshots of `tags`, one per show-frame.
    ///
    /// A sprite yields at most one snapshot unless replaying recursively. A non-empty sprite
    /// without a show-frame still yields its implicit frame.
    fn tags(
        &self,
        tags: &'a [Tag],
        is_sprite: bool,
        locator: &Locator,
    ) -> ConvertResult<Vec<DisplayList<'a>>> {
        let mut frames = Vec::new();
        let mut list = DisplayList::default();
        let mut lifted_sprite_frames = false;

        for tag in tags {
            match tag {
                Tag::PlaceObject(place) => {
                    let sprite_frames = self.place(&mut list, place, locator)?;
                    if !sprite_frames.is_empty() {
                        for sprite_frame in sprite_frames {
                            let mut lifted = list.clone();
                            for placement in sprite_frame.entries {
                                lifted.insert(placement);
                            }
                            frames.push(lifted);
                        }
                        lifted_sprite_frames = true;
                    }
                }
                Tag::RemoveObject(remove) => Self::remove(&mut list, remove, locator)?,
                Tag::ShowFrame if !lifted_sprite_frames => {
                    frames.push(list.clone());
                    if is_sprite && !self.recursive {
                        return Ok(frames);
                    }
                }
                _ => {}
            }
        }

        if is_sprite && frames.is_empty() && !list.is_empty() {
            frames.push(list);
        }
        Ok(frames)
    }

    /// Put a character on the display list. Returns the frames of a sprite replayed
    /// recursively, which the caller lifts to its own level.
    fn place(
        &self,
        list: &mut DisplayList<'a>,
        place: &'a PlaceObject,
        locator: &Locator,
    ) -> ConvertResult<Vec<DisplayList<'a>>> {
        let Some(id) = place.id else {
            return Err(ConvertError::structure(
                locator,
                format!("place tag at depth {} has no character ID", place.depth),
            ));
        };
        let child = locator.child(id);
        if place.mode != PlaceMode::New {
            return Err(ConvertError::unsupported(
                &child,
                format!("place mode {:?}", place.mode),
            ));
        }
        if list.contains(place.depth) {
            return Err(ConvertError::structure(
                &child,
                format!("overwritten character depth {}", place.depth),
            ));
        }
        let definition = self
            .dictionary
            .get(id)
            .ok_or_else(|| ConvertError::resource(&child, format!("unknown character ID {id}")))?;

        let mut sprite = None;
        if let Tag::DefineSprite(def) = definition {
            let frames = self.tags(&def.tags, true, &child)?;
            if self.recursive {
                return Ok(frames);
            }
            let first = match frames.into_iter().next() {
                Some(list) => list.entries,
                None => {
                    tracing::warn!(sprite = id, "sprite has no frame");
                    Vec::new()
                }
            };
            sprite = Some(Arc::from(first));
        }

        list.insert(Placement {
            depth: place.depth,
            id,
            place,
            definition,
            locator: child,
            sprite,
        });
        Ok(Vec::new())
    }

    fn remove(
        list: &mut DisplayList<'a>,
        remove: &RemoveObject,
        locator: &Locator,
    ) -> ConvertResult<()> {
        let removed = list.remove(remove.depth).ok_or_else(|| {
            ConvertError::structure(
                locator,
                format!("no character to remove at depth {}", remove.depth),
            )
        })?;
        if let Some(expected) = remove.id
            && expected != removed.id
        {
            return Err(ConvertError::structure(
                &removed.locator,
                format!("removed character has ID {}, expected {expected}", removed.id),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/timeline.rs"]
mod tests;
