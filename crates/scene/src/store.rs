//! Authoritative object list. Writes are whole-object replacements; nothing
//! else in the core holds object state.

use bevy::prelude::*;

use crate::objects::{LinearFeature, ObjectId, SceneObject};

#[derive(Resource, Default)]
pub struct ObjectStore {
    objects: Vec<SceneObject>,
    next_id: u32,
}

impl ObjectStore {
    pub fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an object. Invalid linear features are logged and dropped rather
    /// than stored; the editor stays usable.
    pub fn add_object(&mut self, object: SceneObject) -> Option<ObjectId> {
        if let SceneObject::Linear(feature) = &object {
            if !feature.is_valid() {
                warn!(
                    "dropping invalid {:?} feature with {} point(s)",
                    feature.kind,
                    feature.points.len()
                );
                return None;
            }
        }
        let id = object.id();
        self.objects.push(object);
        Some(id)
    }

    /// Replace an object wholesale. Returns false if the id is unknown, the
    /// replacement carries a different id, or the replacement fails the same
    /// validation as [`Self::add_object`].
    pub fn update_object(&mut self, id: ObjectId, replacement: SceneObject) -> bool {
        if replacement.id() != id {
            warn!(
                "refusing replacement with id {:?} for object {:?}",
                replacement.id(),
                id
            );
            return false;
        }
        if let SceneObject::Linear(feature) = &replacement {
            if !feature.is_valid() {
                warn!(
                    "refusing invalid {:?} replacement with {} point(s) for {:?}",
                    feature.kind,
                    feature.points.len(),
                    id
                );
                return false;
            }
        }
        match self.objects.iter_mut().find(|o| o.id() == id) {
            Some(slot) => {
                *slot = replacement;
                true
            }
            None => false,
        }
    }

    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id() != id);
        self.objects.len() != before
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_all(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn linear_features(&self) -> impl Iterator<Item = &LinearFeature> {
        self.objects.iter().filter_map(|o| match o {
            SceneObject::Linear(f) => Some(f),
            SceneObject::Sited(_) => None,
        })
    }
}
