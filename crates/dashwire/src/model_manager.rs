// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! The model manager: registry and traversal over the declarative tree
//!
//! One manager exists per dashboard build. Registration happens during the
//! single-threaded build phase: each composite model is drained of its
//! children, every model lands in the registry under its unique id, and
//! parent links are recorded so upward traversal (`page_of`) works without
//! back-references inside the models themselves. After the build the
//! manager is frozen behind an `Arc` and all runtime access is read-only.
//!
//! Traversal (`models_of`) is depth-first pre-order following the declared
//! `components`/`controls` fields; every call re-walks the tree fresh.

use std::collections::HashMap;

use crate::actions::{ActionsChain, Trigger};
use crate::error::{Error, Result};
use crate::models::{KindFilter, Model, ModelId, ModelKind, Selector};

/// Process-wide registry of all declarative model instances.
#[derive(Debug, Default)]
pub struct ModelManager {
    models: HashMap<ModelId, Model>,
    parents: HashMap<ModelId, ModelId>,
    roots: Vec<ModelId>,
}

impl ModelManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model tree. Children are drained from their parents and
    /// registered recursively; duplicate ids fail the whole registration.
    pub fn register(&mut self, model: Model) -> Result<ModelId> {
        self.register_subtree(model, None)
    }

    fn register_subtree(&mut self, mut model: Model, parent: Option<&ModelId>) -> Result<ModelId> {
        let id = model.id().clone();
        if self.models.contains_key(&id) {
            return Err(Error::DuplicateModelId(id.to_string()));
        }
        let children = model.take_children();
        self.models.insert(id.clone(), model);
        match parent {
            Some(parent) => {
                self.parents.insert(id.clone(), parent.clone());
            }
            None => self.roots.push(id.clone()),
        }
        for child in children {
            self.register_subtree(child, Some(&id))?;
        }
        Ok(id)
    }

    /// Whether a model with this id is registered.
    #[must_use]
    pub fn contains(&self, id: &ModelId) -> bool {
        self.models.contains_key(id)
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Look up a model; unknown ids fail loudly.
    pub fn get(&self, id: &ModelId) -> Result<&Model> {
        self.models
            .get(id)
            .ok_or_else(|| Error::ModelNotFound(id.to_string()))
    }

    /// Mutable lookup for the single-threaded build phase.
    pub(crate) fn get_mut(&mut self, id: &ModelId) -> Result<&mut Model> {
        self.models
            .get_mut(id)
            .ok_or_else(|| Error::ModelNotFound(id.to_string()))
    }

    /// Remove a model for in-place mutation during the build phase. Parent
    /// links stay intact; pair with [`ModelManager::put_back`].
    pub(crate) fn take(&mut self, id: &ModelId) -> Result<Model> {
        self.models
            .remove(id)
            .ok_or_else(|| Error::ModelNotFound(id.to_string()))
    }

    /// Reinsert a model taken with [`ModelManager::take`].
    pub(crate) fn put_back(&mut self, model: Model) {
        self.models.insert(model.id().clone(), model);
    }

    /// Remove a selector for in-place mutation during a control's
    /// `pre_build`.
    pub(crate) fn take_selector(&mut self, id: &ModelId) -> Result<Selector> {
        match self.models.remove(id) {
            Some(Model::Selector(selector)) => Ok(selector),
            Some(other) => {
                let kind = other.kind();
                self.models.insert(id.clone(), other);
                Err(Error::Validation(format!(
                    "Model '{id}' is a {kind:?}, not a selector."
                )))
            }
            None => Err(Error::ModelNotFound(id.to_string())),
        }
    }

    /// Insert (or reinsert) a selector under the given parent control.
    pub(crate) fn put_selector(&mut self, parent: ModelId, selector: Selector) -> Result<()> {
        let id = selector.id.clone();
        if self.models.contains_key(&id) {
            return Err(Error::DuplicateModelId(id.to_string()));
        }
        self.parents.entry(id.clone()).or_insert(parent);
        self.models.insert(id, Model::Selector(selector));
        Ok(())
    }

    /// Iterate matching models in depth-first pre-order, optionally
    /// restricted to the subtree rooted at `root` (inclusive). Each call
    /// walks the tree fresh.
    pub fn models_of<'a>(
        &'a self,
        filter: KindFilter,
        root: Option<&ModelId>,
    ) -> impl Iterator<Item = &'a Model> + 'a {
        let mut ids = Vec::new();
        match root {
            Some(root) => self.collect_dfs(root, &mut ids),
            None => {
                let roots = self.roots.clone();
                for root in &roots {
                    self.collect_dfs(root, &mut ids);
                }
            }
        }
        ids.into_iter()
            .filter_map(move |id| self.models.get(&id))
            .filter(move |model| filter.matches(model.kind()))
    }

    fn collect_dfs(&self, id: &ModelId, out: &mut Vec<ModelId>) {
        out.push(id.clone());
        if let Some(model) = self.models.get(id) {
            for child in model.child_ids() {
                self.collect_dfs(&child, out);
            }
        }
    }

    /// The recorded parent of a model, if any.
    #[must_use]
    pub fn parent(&self, id: &ModelId) -> Option<&ModelId> {
        self.parents.get(id)
    }

    /// Walk parent links upward until a page is found. `None` when the
    /// model is not attached to a page (yet).
    #[must_use]
    pub fn page_of(&self, id: &ModelId) -> Option<ModelId> {
        let mut current = id.clone();
        loop {
            if let Some(model) = self.models.get(&current) {
                if model.kind() == ModelKind::Page {
                    return Some(current);
                }
            }
            current = self.parents.get(&current)?.clone();
        }
    }

    /// Iterate every actions chain in the tree together with its owning
    /// model.
    pub fn chains(&self) -> impl Iterator<Item = (&ModelId, &ActionsChain)> {
        self.models
            .values()
            .flat_map(|model| model.chains().iter().map(move |chain| (model.id(), chain)))
    }

    /// Resolve the trigger of the chain containing `action_id`.
    #[must_use]
    pub fn trigger_of_action(&self, action_id: &ModelId) -> Option<&Trigger> {
        self.chains()
            .find(|(_, chain)| chain.actions().iter().any(|a| a.id() == action_id))
            .map(|(_, chain)| chain.trigger())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Button, Card, Container, Page};

    fn sample_tree() -> Model {
        Model::Page(
            Page::new("home", "Home")
                .with_component(Model::Card(Card::new("card", "hello")))
                .with_component(Model::Container(
                    Container::new("box", "Box")
                        .collapsible(false)
                        .with_component(Model::Button(Button::new("btn", "Go"))),
                )),
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let mut manager = ModelManager::new();
        manager.register(sample_tree()).unwrap();
        assert_eq!(manager.len(), 4);
        assert!(manager.contains(&ModelId::from("btn")));
        assert!(matches!(
            manager.get(&ModelId::from("nope")).unwrap_err(),
            Error::ModelNotFound(_)
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut manager = ModelManager::new();
        manager.register(sample_tree()).unwrap();
        let err = manager
            .register(Model::Card(Card::new("card", "again")))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateModelId(_)));
    }

    #[test]
    fn test_dfs_pre_order() {
        let mut manager = ModelManager::new();
        manager.register(sample_tree()).unwrap();
        let order: Vec<&ModelId> = manager
            .models_of(KindFilter::Any, None)
            .map(Model::id)
            .collect();
        let expected: Vec<ModelId> = ["home", "card", "box", "btn"]
            .into_iter()
            .map(ModelId::from)
            .collect();
        assert_eq!(order, expected.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_subtree_restriction() {
        let mut manager = ModelManager::new();
        manager.register(sample_tree()).unwrap();
        let inside: Vec<&ModelId> = manager
            .models_of(KindFilter::Any, Some(&ModelId::from("box")))
            .map(Model::id)
            .collect();
        assert_eq!(inside.len(), 2);
        assert_eq!(inside[0], &ModelId::from("box"));
        assert_eq!(inside[1], &ModelId::from("btn"));
    }

    #[test]
    fn test_traversal_is_restartable() {
        let mut manager = ModelManager::new();
        manager.register(sample_tree()).unwrap();
        let first: Vec<&ModelId> = manager
            .models_of(KindFilter::Any, None)
            .map(Model::id)
            .collect();
        let second: Vec<&ModelId> = manager
            .models_of(KindFilter::Any, None)
            .map(Model::id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_page_of_walks_upward() {
        let mut manager = ModelManager::new();
        manager.register(sample_tree()).unwrap();
        assert_eq!(
            manager.page_of(&ModelId::from("btn")),
            Some(ModelId::from("home"))
        );
        assert_eq!(
            manager.page_of(&ModelId::from("home")),
            Some(ModelId::from("home"))
        );
    }

    #[test]
    fn test_page_of_detached_model_is_none() {
        let mut manager = ModelManager::new();
        manager
            .register(Model::Card(Card::new("floating", "x")))
            .unwrap();
        assert_eq!(manager.page_of(&ModelId::from("floating")), None);
    }

    #[test]
    fn test_trigger_of_action() {
        use crate::actions::Action;
        let mut manager = ModelManager::new();
        let button = Button::new("btn", "Update")
            .with_actions(vec![Action::update_figures("refresh", Vec::new())]);
        manager
            .register(Model::Page(
                Page::new("home", "Home").with_component(Model::Button(button)),
            ))
            .unwrap();
        let trigger = manager
            .trigger_of_action(&ModelId::from("refresh"))
            .unwrap();
        assert_eq!(trigger.component(), &ModelId::from("btn"));
        assert_eq!(trigger.property(), "n_clicks");
        assert!(manager.trigger_of_action(&ModelId::from("absent")).is_none());
    }
}
