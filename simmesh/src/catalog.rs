//! Name resolution against the enclosing model.
//!
//! The skin compiler binds bones to bodies and skins to materials by name.
//! The model that owns those objects lives outside this crate, so lookup
//! goes through [`ModelCatalog`]; [`NameCatalog`] is the plain table-backed
//! implementation used by standalone compiles and tests.

use hashbrown::HashMap;

/// Lookup interface into the enclosing model's named objects.
pub trait ModelCatalog {
    /// Resolve a body name to its id.
    fn body_id(&self, name: &str) -> Option<usize>;

    /// Resolve a material name to its id.
    fn material_id(&self, name: &str) -> Option<usize>;
}

/// A catalog backed by plain name tables.
#[derive(Debug, Clone, Default)]
pub struct NameCatalog {
    bodies: HashMap<String, usize>,
    materials: HashMap<String, usize>,
}

impl NameCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body, returning its id. Re-registering a name returns
    /// the existing id.
    pub fn add_body(&mut self, name: impl Into<String>) -> usize {
        let next = self.bodies.len();
        *self.bodies.entry(name.into()).or_insert(next)
    }

    /// Register a material, returning its id. Re-registering a name
    /// returns the existing id.
    pub fn add_material(&mut self, name: impl Into<String>) -> usize {
        let next = self.materials.len();
        *self.materials.entry(name.into()).or_insert(next)
    }
}

impl ModelCatalog for NameCatalog {
    fn body_id(&self, name: &str) -> Option<usize> {
        self.bodies.get(name).copied()
    }

    fn material_id(&self, name: &str) -> Option<usize> {
        self.materials.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_resolution() {
        let mut catalog = NameCatalog::new();
        let torso = catalog.add_body("torso");
        let arm = catalog.add_body("arm");
        assert_ne!(torso, arm);
        assert_eq!(catalog.body_id("torso"), Some(torso));
        assert_eq!(catalog.body_id("leg"), None);
    }

    #[test]
    fn reregistering_is_stable() {
        let mut catalog = NameCatalog::new();
        let a = catalog.add_material("skin");
        let b = catalog.add_material("skin");
        assert_eq!(a, b);
    }
}
