use super::{Gender, Persona, avatar_for};
use crate::error::{EngineError, Result};
use std::collections::HashSet;

const DEFAULT_CATALOG: &str = include_str!("defaults.json");

/// Judge catalog plus the ids currently selected for evaluation.
///
/// The selection is always a subset of the catalog: ids that are not in the
/// catalog are ignored by [`PersonaRegistry::select`].
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    catalog: Vec<Persona>,
    selected: HashSet<String>,
}

impl PersonaRegistry {
    /// Registry seeded with the built-in judges, first one selected.
    pub fn with_defaults() -> Result<Self> {
        let catalog: Vec<Persona> = serde_json::from_str(DEFAULT_CATALOG)
            .map_err(|e| EngineError::Other(anyhow::anyhow!("built-in persona catalog: {e}")))?;
        let mut registry = Self::from_catalog(catalog)?;
        if let Some(first) = registry.catalog.first().map(|p| p.id.clone()) {
            registry.selected.insert(first);
        }
        Ok(registry)
    }

    /// Registry over an explicit catalog with nothing selected.
    pub fn from_catalog(catalog: Vec<Persona>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(catalog.len());
        for persona in &catalog {
            if persona.id.trim().is_empty() || persona.name.trim().is_empty() {
                return Err(EngineError::Validation(
                    "persona id and name must not be empty".into(),
                ));
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(EngineError::Validation(format!(
                    "duplicate persona id: {}",
                    persona.id
                )));
            }
        }
        Ok(Self {
            catalog,
            selected: HashSet::new(),
        })
    }

    /// Create a user-defined judge. It is not selected automatically.
    pub fn add_custom(&mut self, name: &str, bio: &str, gender: Gender) -> Result<Persona> {
        let name = name.trim();
        let bio = bio.trim();
        if name.is_empty() {
            return Err(EngineError::Validation("judge name must not be empty".into()));
        }
        if bio.is_empty() {
            return Err(EngineError::Validation("judge bio must not be empty".into()));
        }

        let id = loop {
            let candidate = format!("custom-{}", uuid::Uuid::new_v4());
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };

        let persona = Persona {
            id,
            name: name.to_string(),
            bio: bio.to_string(),
            avatar_ref: avatar_for(name),
            gender,
            is_custom: true,
        };
        tracing::info!(persona_id = %persona.id, name = %persona.name, "custom judge added");
        self.catalog.push(persona.clone());
        Ok(persona)
    }

    pub fn select(&mut self, id: &str) {
        if self.get(id).is_some() {
            self.selected.insert(id.to_string());
        }
    }

    pub fn deselect(&mut self, id: &str) {
        self.selected.remove(id);
    }

    pub fn all(&self) -> &[Persona] {
        &self.catalog
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.catalog.iter().find(|p| p.id == id)
    }

    /// Selected personas in catalog order.
    pub fn selected(&self) -> Vec<&Persona> {
        self.catalog
            .iter()
            .filter(|p| self.selected.contains(&p.id))
            .collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn by_gender(&self, gender: Gender) -> impl Iterator<Item = &Persona> {
        self.catalog.iter().filter(move |p| p.gender == gender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(id: &str, gender: Gender) -> Persona {
        Persona {
            id: id.into(),
            name: id.to_uppercase(),
            bio: format!("{id} bio"),
            avatar_ref: avatar_for(id),
            gender,
            is_custom: false,
        }
    }

    #[test]
    fn defaults_load_with_first_selected() {
        let registry = PersonaRegistry::with_defaults().unwrap();
        assert!(registry.all().len() >= 2);
        assert_eq!(registry.selected_count(), 1);
        assert!(registry.is_selected(&registry.all()[0].id));
        assert!(registry.by_gender(Gender::Male).count() > 0);
        assert!(registry.by_gender(Gender::Female).count() > 0);
        assert!(registry.all().iter().all(|p| !p.is_custom));
    }

    #[test]
    fn duplicate_catalog_ids_are_rejected() {
        let err = PersonaRegistry::from_catalog(vec![
            persona("a", Gender::Male),
            persona("a", Gender::Female),
        ])
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn add_custom_trims_and_does_not_select() {
        let mut registry = PersonaRegistry::from_catalog(vec![persona("a", Gender::Male)]).unwrap();
        let custom = registry
            .add_custom("  Robin ", " likes dogs ", Gender::Female)
            .unwrap();

        assert!(custom.id.starts_with("custom-"));
        assert_eq!(custom.name, "Robin");
        assert_eq!(custom.bio, "likes dogs");
        assert!(custom.is_custom);
        assert!(custom.avatar_ref.ends_with("seed=Robin"));
        assert_eq!(registry.all().len(), 2);
        assert!(!registry.is_selected(&custom.id));
    }

    #[test]
    fn add_custom_rejects_blank_fields() {
        let mut registry = PersonaRegistry::from_catalog(Vec::new()).unwrap();
        assert!(registry.add_custom("   ", "bio", Gender::Male).unwrap_err().is_validation());
        assert!(registry.add_custom("Name", "\n", Gender::Male).unwrap_err().is_validation());
        assert!(registry.all().is_empty());
    }

    #[test]
    fn custom_ids_are_unique() {
        let mut registry = PersonaRegistry::from_catalog(Vec::new()).unwrap();
        let a = registry.add_custom("Same", "bio", Gender::Male).unwrap();
        let b = registry.add_custom("Same", "bio", Gender::Male).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn select_and_deselect_are_idempotent_and_bounded_by_catalog() {
        let mut registry = PersonaRegistry::from_catalog(vec![
            persona("a", Gender::Male),
            persona("b", Gender::Female),
        ])
        .unwrap();

        registry.select("b");
        registry.select("b");
        registry.select("ghost");
        assert_eq!(registry.selected_count(), 1);
        assert!(!registry.is_selected("ghost"));

        registry.select("a");
        let order: Vec<_> = registry.selected().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, ["a", "b"]);

        registry.deselect("a");
        registry.deselect("a");
        registry.deselect("ghost");
        assert_eq!(registry.selected_count(), 1);
        assert!(registry.is_selected("b"));
    }
}
