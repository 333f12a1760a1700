//! A layout shape database.
//!
//! Shapes of many kinds are stored per cell and layer in [`Shapes`]
//! containers, optionally sharing heavyweight geometry through a
//! [`RepositorySpace`]. Mutations are recorded by an undo [`Manager`],
//! and cells can be proxies into [`Library`] layouts that are resolved
//! through a [`LibraryManager`].
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod id;
pub mod layer;
pub mod layout;
pub mod library;
pub mod library_manager;
pub mod properties;
pub mod repository;
pub mod shape;
pub mod shapes;
pub mod undo;

pub use config::LayoutConfig;
pub use error::{LayoutError, LayoutResult};
pub use id::{Id, ObjectId};
pub use layout::{
    Cell, CellIndex, CellKind, LayerIndex, LayerInfo, Layout, ProxyContextInfo, SharedLayout,
};
pub use library::Library;
pub use library_manager::{LibId, LibraryManager, Registration};
pub use properties::{PropertiesId, PropertiesRepository, PropertySet};
pub use repository::{RegularArray, RepositorySpace};
pub use shape::{Shape, ShapeFlags, ShapeKind, ShapeObject};
pub use shapes::Shapes;
pub use undo::{Manager, SharedManager};

#[cfg(test)]
mod tests;
