use std::fmt;

use smallvec::SmallVec;

/// Convenience result type used across the conversion engine.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Address of the input object a conversion error refers to.
///
/// `ids` is the chain of character ids from the outermost placement down to the failing
/// object (sprites nest). Displayed as `file #1, object ID 7 (3 > 7)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Locator {
    /// Index of the movie in the batch, when known.
    pub file_index: Option<usize>,
    /// Character id path, outermost first.
    pub ids: SmallVec<[u16; 4]>,
}

impl Locator {
    /// Locator for a whole movie.
    pub fn file(file_index: usize) -> Self {
        Self {
            file_index: Some(file_index),
            ids: SmallVec::new(),
        }
    }

    /// Locator for a nested object, extending `self` with `id`.
    pub fn child(&self, id: u16) -> Self {
        let mut ids = self.ids.clone();
        ids.push(id);
        Self {
            file_index: self.file_index,
            ids,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file_index {
            Some(i) => write!(f, "file #{i}")?,
            None => f.write_str("movie collection")?,
        }
        if let Some(last) = self.ids.last() {
            write!(f, ", object ID {last} (")?;
            for (i, id) in self.ids.iter().enumerate() {
                if i > 0 {
                    f.write_str(" > ")?;
                }
                write!(f, "{id}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// The single error taxonomy of the conversion engine.
///
/// Every movie-level variant carries a [`Locator`] so a batch run can report which input object
/// failed. There is no partial success: any of these aborts the movie being converted.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    /// Feature present in the input that the IR cannot express.
    #[error("unsupported construct at {locator}: {msg}")]
    Unsupported {
        /// Failing object.
        locator: Locator,
        /// Human-readable cause.
        msg: String,
    },

    /// Malformed display list or broken stack discipline.
    #[error("structural violation at {locator}: {msg}")]
    Structure {
        /// Failing object.
        locator: Locator,
        /// Human-readable cause.
        msg: String,
    },

    /// Placements of a frame did not arrive in non-decreasing depth order.
    #[error("unordered placement at {locator}: depth {depth} follows depth {previous}")]
    UnorderedPlacement {
        /// Failing object.
        locator: Locator,
        /// Depth of the offending placement.
        depth: u16,
        /// Depth of the placement before it.
        previous: u16,
    },

    /// Resource tables that do not line up (style indices, glyph indices, image ids).
    #[error("resource validation error at {locator}: {msg}")]
    Resource {
        /// Failing object.
        locator: Locator,
        /// Human-readable cause.
        msg: String,
    },

    /// Invalid [`crate::ConvertConfig`] value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input or output (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error (IO, image codecs, thread pool).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConvertError {
    /// Build a [`ConvertError::Unsupported`] value.
    pub fn unsupported(locator: &Locator, msg: impl Into<String>) -> Self {
        Self::Unsupported {
            locator: locator.clone(),
            msg: msg.into(),
        }
    }

    /// Build a [`ConvertError::Structure`] value.
    pub fn structure(locator: &Locator, msg: impl Into<String>) -> Self {
        Self::Structure {
            locator: locator.clone(),
            msg: msg.into(),
        }
    }

    /// Build a [`ConvertError::Resource`] value.
    pub fn resource(locator: &Locator, msg: impl Into<String>) -> Self {
        Self::Resource {
            locator: locator.clone(),
            msg: msg.into(),
        }
    }

    /// Build a [`ConvertError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ConvertError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Locator of the failing object, for the variants that carry one.
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            Self::Unsupported { locator, .. }
            | Self::Structure { locator, .. }
            | Self::UnorderedPlacement { locator, .. }
            | Self::Resource { locator, .. } => Some(locator),
            Self::Config(_) | Self::Serde(_) | Self::Other(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
