//! Undo/redo recording.
//!
//! Mutations queue [`Op`]s into the open transaction of a [`Manager`].
//! Undoing a transaction hands its operations back in the order they must
//! be reverted; applying an operation never queues new ones.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arcstr::ArcStr;
use tracing::debug;

use crate::id::ObjectId;
use crate::layer::ShapeLayer;
use crate::layout::{Cell, CellIndex};
use crate::properties::PropertiesId;
use crate::shape::{LayerKey, ShapeObject};

/// A [`Manager`] shared between a layout and its shape containers.
pub type SharedManager = Arc<Mutex<Manager>>;

/// Locks a shared manager, ignoring poisoning.
pub(crate) fn lock(manager: &SharedManager) -> MutexGuard<'_, Manager> {
    manager.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A recorded change to a [`Shapes`](crate::Shapes) container.
#[derive(Debug, Clone)]
pub enum ShapesOp {
    /// Shapes inserted into (`insert == true`) or erased from one layer.
    Layer {
        /// Whether the shapes were inserted.
        insert: bool,
        /// The layer the shapes belong to.
        key: LayerKey,
        /// The affected shapes.
        objects: Vec<(ShapeObject, Option<PropertiesId>)>,
    },
    /// A whole layer added to (`insert == true`) or removed from a container.
    FullLayer {
        /// Whether the layer was added.
        insert: bool,
        /// The layer content.
        layer: Box<dyn ShapeLayer>,
    },
}

/// A recorded change to the cell list of a layout.
#[derive(Debug, Clone)]
pub enum LayoutOp {
    /// A cell was created.
    InsertCell {
        /// The index of the new cell.
        index: CellIndex,
        /// The cell as it was created.
        cell: Box<Cell>,
    },
    /// A cell was deleted.
    DeleteCell {
        /// The index of the deleted cell.
        index: CellIndex,
        /// The cell as it was before deletion.
        cell: Box<Cell>,
    },
}

/// An undoable operation.
#[derive(Debug, Clone)]
pub enum Op {
    /// A change to the shape container with the given identity.
    Shapes(ObjectId, ShapesOp),
    /// A change to the layout itself.
    Layout(LayoutOp),
}

/// A named group of operations undone and redone together.
#[derive(Debug, Clone)]
pub struct Transaction {
    description: ArcStr,
    ops: Vec<Op>,
}

impl Transaction {
    /// The description given when the transaction was opened.
    pub fn description(&self) -> &ArcStr {
        &self.description
    }

    /// The recorded operations, oldest first.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }
}

/// Records transactions and provides them for undo and redo.
#[derive(Debug, Default)]
pub struct Manager {
    current: Option<Transaction>,
    undo: Vec<Transaction>,
    redo: Vec<Transaction>,
}

impl Manager {
    /// Creates a manager without history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager ready to be shared.
    pub fn shared() -> SharedManager {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Opens a transaction.
    ///
    /// If a transaction is already open, subsequent operations join it.
    pub fn transaction(&mut self, description: impl Into<ArcStr>) {
        if let Some(current) = &self.current {
            debug!(open = %current.description, "joining open transaction");
            return;
        }
        self.current = Some(Transaction {
            description: description.into(),
            ops: Vec::new(),
        });
    }

    /// Closes the open transaction and makes it available for undo.
    ///
    /// Empty transactions are dropped. Committing discards the redo history.
    pub fn commit(&mut self) {
        let Some(transaction) = self.current.take() else {
            return;
        };
        if transaction.ops.is_empty() {
            return;
        }
        self.redo.clear();
        self.undo.push(transaction);
    }

    /// Closes the open transaction without recording it.
    ///
    /// Returns the operations that must be undone to revert its changes,
    /// most recent first.
    pub fn cancel(&mut self) -> Vec<Op> {
        let mut ops = self.current.take().map(|t| t.ops).unwrap_or_default();
        ops.reverse();
        ops
    }

    /// Returns `true` while a transaction is open.
    pub fn transacting(&self) -> bool {
        self.current.is_some()
    }

    /// Appends `op` to the open transaction.
    ///
    /// Operations queued outside a transaction are dropped.
    pub fn queue(&mut self, op: Op) {
        match &mut self.current {
            Some(t) => t.ops.push(op),
            None => debug!("dropping operation queued outside a transaction"),
        }
    }

    /// Appends `op`, merging it into the previous operation if both record
    /// the same kind of change to the same layer of the same container.
    pub fn queue_or_append(&mut self, op: Op) {
        let Some(current) = &mut self.current else {
            debug!("dropping operation queued outside a transaction");
            return;
        };
        if let (
            Some(Op::Shapes(last_target, ShapesOp::Layer { insert: last_insert, key: last_key, objects: last_objects })),
            Op::Shapes(target, ShapesOp::Layer { insert, key, objects }),
        ) = (current.ops.last_mut(), &op)
        {
            if last_target == target && last_insert == insert && last_key == key {
                last_objects.extend(objects.iter().cloned());
                return;
            }
        }
        current.ops.push(op);
    }

    /// Moves the most recent transaction to the redo history.
    ///
    /// Returns its operations in the order they must be undone, most
    /// recent first.
    pub fn undo(&mut self) -> Option<Vec<Op>> {
        let transaction = self.undo.pop()?;
        debug!(description = %transaction.description, "undo");
        let ops = transaction.ops.iter().rev().cloned().collect();
        self.redo.push(transaction);
        Some(ops)
    }

    /// Moves the most recently undone transaction back to the undo history.
    ///
    /// Returns its operations in the order they must be redone.
    pub fn redo(&mut self) -> Option<Vec<Op>> {
        let transaction = self.redo.pop()?;
        debug!(description = %transaction.description, "redo");
        let ops = transaction.ops.clone();
        self.undo.push(transaction);
        Some(ops)
    }

    /// The description of the transaction [`Manager::undo`] would revert.
    pub fn available_undo(&self) -> Option<&str> {
        self.undo.last().map(|t| t.description.as_str())
    }

    /// The description of the transaction [`Manager::redo`] would restore.
    pub fn available_redo(&self) -> Option<&str> {
        self.redo.last().map(|t| t.description.as_str())
    }

    /// Discards all history and the open transaction.
    pub fn clear(&mut self) {
        self.current = None;
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use geometry::prelude::*;

    use super::*;
    use crate::shape::ShapeKind;

    fn insert_op(target: ObjectId, x: i64) -> Op {
        Op::Shapes(
            target,
            ShapesOp::Layer {
                insert: true,
                key: LayerKey::new(ShapeKind::Point, false),
                objects: vec![(Point::new(x, 0).into(), None)],
            },
        )
    }

    #[test]
    fn consecutive_layer_ops_are_merged() {
        let target = ObjectId::unique();
        let mut m = Manager::new();
        m.transaction("insert points");
        m.queue_or_append(insert_op(target, 1));
        m.queue_or_append(insert_op(target, 2));
        m.queue_or_append(insert_op(ObjectId::unique(), 3));
        m.commit();
        let ops = m.undo().unwrap();
        assert_eq!(ops.len(), 2);
        match &ops[1] {
            Op::Shapes(_, ShapesOp::Layer { objects, .. }) => assert_eq!(objects.len(), 2),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn ops_outside_transactions_are_dropped() {
        let mut m = Manager::new();
        m.queue(insert_op(ObjectId::unique(), 1));
        assert!(!m.transacting());
        assert!(m.available_undo().is_none());
    }

    #[test]
    fn undo_and_redo_move_transactions() {
        let target = ObjectId::unique();
        let mut m = Manager::new();
        m.transaction("first");
        m.queue(insert_op(target, 1));
        m.commit();
        m.transaction("second");
        m.queue(insert_op(target, 2));
        m.commit();
        assert_eq!(m.available_undo(), Some("second"));
        m.undo();
        assert_eq!(m.available_undo(), Some("first"));
        assert_eq!(m.available_redo(), Some("second"));
        m.redo();
        assert_eq!(m.available_redo(), None);

        m.undo();
        m.transaction("third");
        m.queue(insert_op(target, 3));
        m.commit();
        assert_eq!(m.available_redo(), None);
    }

    #[test]
    fn empty_transactions_are_not_recorded() {
        let mut m = Manager::new();
        m.transaction("nothing");
        m.commit();
        assert!(m.available_undo().is_none());
        m.transaction("cancelled");
        m.queue(insert_op(ObjectId::unique(), 1));
        assert_eq!(m.cancel().len(), 1);
        assert!(!m.transacting());
    }
}
