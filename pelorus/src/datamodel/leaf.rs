// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use std::marker::PhantomData;

use super::{DataModel, LeafValue, NodeId, Value};

/// Typed handle to one leaf of the data model. Handles are cheap to
/// clone and safe to use from any task; all state lives in the tree
/// behind the subscription lock.
pub struct Leaf<T: LeafValue> {
    model: DataModel,
    id: NodeId,
    _marker: PhantomData<fn(T)>,
}

/// Leaf holding text, bounded by the capacity given at construction.
pub type StringLeaf = Leaf<String>;

impl<T: LeafValue> Clone for Leaf<T> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            id: self.id,
            _marker: PhantomData,
        }
    }
}

impl<T: LeafValue> Leaf<T> {
    pub(super) const fn new(model: DataModel, id: NodeId) -> Self {
        Self {
            model,
            id,
            _marker: PhantomData,
        }
    }

    /// Store a value. Idempotent: writing the value the leaf already
    /// holds publishes nothing.
    pub fn set(&self, value: T) {
        self.model
            .update_value(self.id, |_| value.into_value(), false);
    }

    /// Clear the retained value, publishing an empty retained payload to
    /// current subscribers. A no-op on an unset leaf.
    pub fn remove(&self) {
        self.model.remove_value(self.id);
    }

    #[must_use]
    pub fn has_value(&self) -> bool {
        self.model.has_value(self.id)
    }

    #[must_use]
    pub fn topic(&self) -> String {
        self.model.topic_name(self.id)
    }
}

macro_rules! counting_leaf {
    ($ty: ty, $variant: ident) => {
        impl Leaf<$ty> {
            /// Add one to the stored value, treating an unset leaf as
            /// zero. Always publishes: the pre-increment read was
            /// intentional even when wrapping lands on the old value.
            pub fn increment(&self) {
                self.model.update_value(
                    self.id,
                    |current| match current {
                        Some(Value::$variant(v)) => Value::$variant(v.wrapping_add(1)),
                        _ => Value::$variant(1),
                    },
                    true,
                );
            }

            /// Subtract one from the stored value, treating an unset
            /// leaf as zero. Always publishes.
            pub fn decrement(&self) {
                self.model.update_value(
                    self.id,
                    |current| match current {
                        Some(Value::$variant(v)) => Value::$variant(v.wrapping_sub(1)),
                        _ => Value::$variant(<$ty>::MAX),
                    },
                    true,
                );
            }
        }
    };
}

counting_leaf!(u8, U8);
counting_leaf!(u16, U16);
counting_leaf!(u32, U32);
