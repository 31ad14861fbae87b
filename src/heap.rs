//! Object arena
//!
//! Every object of a realm lives in one arena and is addressed by [`ObjectId`].
//! Cycles (object ↔ prototype, module ↔ namespace, generator ↔ context) are plain
//! handles, so nothing needs to break them. The arena is torn down as a whole when
//! the realm is disposed; there is no per-object collection.

use crate::error::{JsError, JsResult};
use crate::object::JsObject;
use crate::value::ObjectId;

/// Heap statistics for debugging and monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub live_objects: usize,
    pub capacity: usize,
}

/// Arena owning all objects of a realm
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<JsObject>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: Vec::with_capacity(capacity),
        }
    }

    /// Move an object into the arena and return its handle
    pub fn alloc(&mut self, object: JsObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> JsResult<&JsObject> {
        self.objects
            .get(id.index())
            .ok_or_else(|| dangling(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> JsResult<&mut JsObject> {
        self.objects
            .get_mut(id.index())
            .ok_or_else(|| dangling(id))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        id.index() < self.objects.len()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            live_objects: self.objects.len(),
            capacity: self.objects.capacity(),
        }
    }

    /// Drop every object at once. All outstanding handles become dangling.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.objects.shrink_to_fit();
    }
}

fn dangling(id: ObjectId) -> JsError {
    JsError::internal(format!("dangling object handle {:?}", id))
}
