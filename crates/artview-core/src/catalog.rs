#![forbid(unsafe_code)]

//! Name-keyed catalogs of component types and mode definitions.
//!
//! Modes are plain data ([`ModeDefinition`]) so they can ship in a config
//! file. Resolving a definition against a [`ComponentCatalog`] turns the
//! type names into [`ComponentType`] tags and yields a [`ModeSpec`].

use serde::{Deserialize, Serialize};

use crate::component::{ComponentFactory, ComponentType};
use crate::error::{Error, Result};
use crate::link::Link;
use crate::mode::ModeSpec;

/// Component types addressable by name.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    types: Vec<ComponentType>,
}

impl ComponentCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `T`, replacing an earlier entry with the same name.
    #[must_use]
    pub fn with<T: ComponentFactory>(mut self) -> Self {
        self.register(ComponentType::of::<T>());
        self
    }

    pub fn register(&mut self, ty: ComponentType) {
        match self.types.iter_mut().find(|t| t.name() == ty.name()) {
            Some(slot) => *slot = ty,
            None => self.types.push(ty),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<ComponentType> {
        self.types.iter().find(|t| t.name() == name).copied()
    }

    pub fn resolve(&self, name: &str) -> Result<ComponentType> {
        self.get(name)
            .ok_or_else(|| Error::UnknownComponentType(name.to_owned()))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.types.iter().map(ComponentType::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Serializable description of a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Component type names, in wanted order.
    pub components: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl ModeDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            components: Vec::new(),
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_component(mut self, type_name: impl Into<String>) -> Self {
        self.components.push(type_name.into());
        self
    }

    /// Link `dest` to `src`, both as `(position, variable)`.
    #[must_use]
    pub fn with_link(mut self, dest: (usize, &str), src: (usize, &str)) -> Self {
        self.links.push(Link::new(dest, src));
        self
    }

    /// Link the same variable name between two positions.
    #[must_use]
    pub fn share(self, cell: &str, dest: usize, src: usize) -> Self {
        self.with_link((dest, cell), (src, cell))
    }

    /// Resolve type names and validate link positions.
    pub fn resolve(&self, catalog: &ComponentCatalog) -> Result<ModeSpec> {
        let components = self
            .components
            .iter()
            .map(|name| catalog.resolve(name))
            .collect::<Result<Vec<_>>>()?;
        let spec = ModeSpec {
            name: self.name.clone(),
            components,
            links: self.links.clone(),
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Named mode definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeCatalog {
    modes: Vec<ModeDefinition>,
}

impl ModeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `mode`, replacing an earlier mode with the same name.
    pub fn insert(&mut self, mode: ModeDefinition) {
        match self.modes.iter_mut().find(|m| m.name == mode.name) {
            Some(slot) => *slot = mode,
            None => self.modes.push(mode),
        }
    }

    #[must_use]
    pub fn with(mut self, mode: ModeDefinition) -> Self {
        self.insert(mode);
        self
    }

    /// Insert every mode from `modes`, later entries winning.
    pub fn extend(&mut self, modes: impl IntoIterator<Item = ModeDefinition>) {
        for mode in modes {
            self.insert(mode);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModeDefinition> {
        self.modes.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.modes.iter().map(|m| m.name.as_str()).collect()
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, ModeDefinition> {
        self.modes.iter()
    }

    /// Look up `name` and resolve it against `components`.
    pub fn resolve(&self, name: &str, components: &ComponentCatalog) -> Result<ModeSpec> {
        self.get(name)
            .ok_or_else(|| Error::UnknownMode(name.to_owned()))?
            .resolve(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;
    use crate::mode::change_mode;
    use crate::testing::{Probe, Sidecar};

    fn components() -> ComponentCatalog {
        ComponentCatalog::new().with::<Probe>().with::<Sidecar>()
    }

    #[test]
    fn catalog_lookup() {
        let catalog = components();
        assert_eq!(catalog.names(), vec!["Probe", "Sidecar"]);
        assert!(catalog.resolve("Probe").is_ok_and(|t| t.is::<Probe>()));
        assert_eq!(
            catalog.resolve("Nope").unwrap_err(),
            Error::UnknownComponentType("Nope".into())
        );
    }

    #[test]
    fn duplicate_registration_replaces() {
        let mut catalog = components();
        catalog.register(ComponentType::of::<Probe>());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn definition_resolves_and_assembles() {
        let modes = ModeCatalog::new().with(
            ModeDefinition::new("pair")
                .with_component("Probe")
                .with_component("Sidecar")
                .share("Vradar", 1, 0),
        );
        let spec = modes.resolve("pair", &components()).expect("resolve");
        assert_eq!(spec.components.len(), 2);

        let ctx = AppContext::default();
        let assembly = change_mode(&ctx, &spec).expect("assemble");
        assert_eq!(assembly.rebound(), 1);
    }

    #[test]
    fn unknown_mode_and_type() {
        let modes = ModeCatalog::new().with(ModeDefinition::new("odd").with_component("Ghost"));
        assert_eq!(
            modes.resolve("missing", &components()).unwrap_err(),
            Error::UnknownMode("missing".into())
        );
        assert_eq!(
            modes.resolve("odd", &components()).unwrap_err(),
            Error::UnknownComponentType("Ghost".into())
        );
    }

    #[test]
    fn definition_from_json() {
        let json = r#"{
            "name": "pair",
            "components": ["Probe", "Sidecar"],
            "links": [{"dest": {"component": 1, "cell": "Vradar"},
                       "src": {"component": 0, "cell": "Vradar"}}]
        }"#;
        let def: ModeDefinition = serde_json::from_str(json).expect("parse");
        assert_eq!(def.links, vec![Link::new((1, "Vradar"), (0, "Vradar"))]);
        assert!(def.description.is_empty());
    }

    #[test]
    fn later_insert_replaces_mode() {
        let mut modes = ModeCatalog::new();
        modes.extend([
            ModeDefinition::new("a").with_component("Probe"),
            ModeDefinition::new("b"),
            ModeDefinition::new("a").with_component("Sidecar"),
        ]);
        assert_eq!(modes.names(), vec!["a", "b"]);
        assert_eq!(modes.get("a").map(|m| m.components.clone()), Some(vec!["Sidecar".to_owned()]));
    }
}
