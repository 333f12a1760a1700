//! Layout database errors.

use arcstr::ArcStr;

use crate::layout::{CellIndex, LayerIndex};

/// The [`Result`] type for layout database operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// A layout database error.
///
/// These are errors a caller can recover from. Violated programming
/// contracts panic instead.
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    /// A mutating function was called on a container that is not editable.
    #[error("function '{function}' is permitted only in editable mode")]
    NotEditable {
        /// The name of the offending function.
        function: &'static str,
    },
    /// Array shapes cannot be inserted with a transformation.
    #[error("arrays cannot be inserted with a transformation")]
    ArrayTransform,
    /// The shape handle does not refer to a live shape of this container.
    #[error("shape handle is not valid for this container")]
    InvalidShape,
    /// The cell index does not refer to a live cell.
    #[error("no cell with index {0}")]
    NoSuchCell(CellIndex),
    /// The layer index does not refer to a layer of the layout.
    #[error("no layer with index {0}")]
    NoSuchLayer(LayerIndex),
    /// The cell name is not acceptable.
    #[error("invalid cell name: {0:?}")]
    InvalidCellName(ArcStr),
    /// A library does not contain the requested cell.
    #[error("library '{library}' has no cell '{cell}'")]
    LibraryCellNotFound {
        /// The library name.
        library: ArcStr,
        /// The cell name.
        cell: ArcStr,
    },
    /// The library has not been registered with a library manager.
    #[error("library '{0}' is not registered")]
    LibraryNotRegistered(ArcStr),
    /// Undo or redo was requested on a layout without a transaction manager.
    #[error("undo and redo require a transaction manager")]
    NoManager,
    /// The layout configuration could not be parsed.
    #[error("error parsing layout configuration: {0}")]
    Config(#[from] toml::de::Error),
}
