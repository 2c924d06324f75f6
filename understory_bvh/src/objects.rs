// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::hash::Hash;

use hashbrown::HashMap;

use crate::types::Rect;

/// Side table from value to its registered rectangle. Disabled tables answer every lookup
/// with `None` and ignore writes.
pub(crate) struct ObjectIndex<const D: usize, V> {
    map: Option<HashMap<V, Rect<D>>>,
}

impl<const D: usize, V> ObjectIndex<D, V> {
    pub(crate) fn new(track: bool) -> Self {
        Self {
            map: track.then(HashMap::new),
        }
    }

    pub(crate) fn is_tracking(&self) -> bool {
        self.map.is_some()
    }

    pub(crate) fn clear(&mut self) {
        if let Some(map) = &mut self.map {
            map.clear();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.as_ref().map_or(0, HashMap::len)
    }
}

impl<const D: usize, V: Eq + Hash> ObjectIndex<D, V> {
    pub(crate) fn get(&self, value: &V) -> Option<&Rect<D>> {
        self.map.as_ref()?.get(value)
    }

    pub(crate) fn register(&mut self, value: V, rect: Rect<D>) {
        if let Some(map) = &mut self.map {
            map.insert(value, rect);
        }
    }

    pub(crate) fn unregister(&mut self, value: &V) {
        if let Some(map) = &mut self.map {
            map.remove(value);
        }
    }
}
