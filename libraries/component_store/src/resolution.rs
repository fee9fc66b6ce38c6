use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::component::{AnyComponent, Component, ComponentError, ComponentInfo};

///
/// Dependency edges discovered while components resolve each other.
///
#[derive(Default)]
pub(crate) struct ComponentDAG {
    dependencies: HashMap<TypeId, HashSet<TypeId>>,
}

impl ComponentDAG {
    fn add_dependency(
        &mut self,
        source: &ComponentInfo,
        dependency: &ComponentInfo,
    ) -> Result<(), ComponentError> {
        if source.type_id == dependency.type_id
            || self
                .get_transitive_dependencies(&dependency.type_id)
                .contains(&source.type_id)
        {
            return Err(ComponentError::DependencyCycle {
                source_component: source.name,
                dependency_component: dependency.name,
            });
        }

        self.dependencies
            .entry(source.type_id)
            .or_default()
            .insert(dependency.type_id);

        Ok(())
    }

    pub fn get_transitive_dependencies(&self, type_id: &TypeId) -> HashSet<TypeId> {
        let mut visited: HashSet<TypeId> = Default::default();
        let mut pending: Vec<TypeId> = vec![*type_id];

        while let Some(current) = pending.pop() {
            if let Some(direct) = self.dependencies.get(&current) {
                for dependency in direct {
                    if visited.insert(*dependency) {
                        pending.push(*dependency);
                    }
                }
            }
        }

        visited
    }
}

#[derive(Default)]
struct ResolutionState {
    components: HashMap<TypeId, AnyComponent>,
    dag: ComponentDAG,
}

///
/// Shared between all resolvers of a single `ComponentStoreBuilder::build` call.
///
pub(crate) struct ResolutionContext {
    known_types: HashSet<TypeId>,
    state: Mutex<ResolutionState>,
    added: watch::Sender<usize>,
}

impl ResolutionContext {
    pub fn new(known_types: HashSet<TypeId>) -> Self {
        let (added, _) = watch::channel(0);

        Self {
            known_types,
            state: Mutex::new(ResolutionState::default()),
            added,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResolutionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_component(&self, info: &ComponentInfo, component: AnyComponent) {
        self.lock().components.insert(info.type_id, component);
        self.added.send_modify(|count| *count += 1);
    }

    pub fn finalize(&self) -> (HashMap<TypeId, AnyComponent>, ComponentDAG) {
        let mut state = self.lock();
        let state = std::mem::take(&mut *state);

        (state.components, state.dag)
    }

    fn add_dependency(
        &self,
        source: &ComponentInfo,
        dependency: &ComponentInfo,
    ) -> Result<(), ComponentError> {
        self.lock().dag.add_dependency(source, dependency)
    }

    fn get(&self, type_id: &TypeId) -> Option<AnyComponent> {
        self.lock().components.get(type_id).cloned()
    }
}

///
/// Handed to every component during initialization to obtain its dependencies.
///
pub struct ComponentResolver {
    context: Arc<ResolutionContext>,
    requester: ComponentInfo,
}

impl ComponentResolver {
    pub(crate) fn new(context: Arc<ResolutionContext>, requester: ComponentInfo) -> Self {
        Self { context, requester }
    }

    ///
    /// Waits until the requested component is initialized.
    ///
    /// Fails immediately if the component is not registered or if waiting
    /// for it would form a dependency cycle.
    ///
    pub async fn resolve<C: Component>(&self) -> Result<Arc<C>, ComponentError> {
        let dependency = ComponentInfo::new::<C>();

        if !self.context.known_types.contains(&dependency.type_id) {
            return Err(ComponentError::NotRegistered {
                source_component: self.requester.name,
                dependency_component: dependency.name,
            });
        }

        // Subscribe before looking up so that no insertion is missed.
        let mut added = self.context.added.subscribe();
        self.context.add_dependency(&self.requester, &dependency)?;

        loop {
            if let Some(component) = self.context.get(&dependency.type_id) {
                if let Ok(component) = component.downcast::<C>() {
                    return Ok(component);
                }
            }

            if added.changed().await.is_err() {
                return Err(ComponentError::NotRegistered {
                    source_component: self.requester.name,
                    dependency_component: dependency.name,
                });
            }
        }
    }
}
