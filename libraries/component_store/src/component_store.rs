use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::component::{
    AnyComponent, Component, ComponentDtor, ComponentError, ComponentFuture, ComponentInfo,
};
use crate::config::ConfigProvider;
use crate::resolution::{ComponentDAG, ComponentResolver, ResolutionContext};

///
/// Type-erased constructor for component.
/// Note: we can't use `InitComponent` trait with dynamic dispatch.
///
trait ComponentFactory: Send + Sync + 'static {
    fn create(
        &self,
        resolver: ComponentResolver,
        config: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<(AnyComponent, ComponentDtor, ComponentInfo), ComponentError>>;

    fn component_info(&self) -> ComponentInfo;
}

struct DefaultComponentFactory<C: Component> {
    _marker: PhantomData<C>,
}

impl<C: Component> Default for DefaultComponentFactory<C> {
    fn default() -> Self {
        DefaultComponentFactory {
            _marker: PhantomData,
        }
    }
}

impl<C: Component> ComponentFactory for DefaultComponentFactory<C> {
    fn create(
        &self,
        resolver: ComponentResolver,
        config: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<(AnyComponent, ComponentDtor, ComponentInfo), ComponentError>> {
        let info = self.component_info();
        Box::pin(async move {
            let component = Arc::new(C::init(resolver, config).await?);
            let dtor: ComponentDtor = component.clone();
            let component: AnyComponent = component;
            Ok((component, dtor, info))
        })
    }

    fn component_info(&self) -> ComponentInfo {
        ComponentInfo::new::<C>()
    }
}

///
/// Shuts components down, dependents before their dependencies.
///
#[derive(Default)]
struct DAGDestructor {
    destructors: Vec<(ComponentInfo, ComponentDtor)>,
}

impl DAGDestructor {
    pub fn new(mut destructors: Vec<(ComponentInfo, ComponentDtor)>, dag: ComponentDAG) -> Self {
        let depth: HashMap<TypeId, usize> = destructors
            .iter()
            .map(|(info, _)| {
                (
                    info.type_id,
                    usize::MAX - dag.get_transitive_dependencies(&info.type_id).len(),
                )
            })
            .collect();

        destructors.sort_by_cached_key(|(info, _)| {
            depth.get(&info.type_id).copied().unwrap_or(usize::MAX)
        });

        Self { destructors }
    }

    pub async fn destroy(self) {
        for (info, dtor) in self.destructors {
            tracing::debug!("Shutting down {}", info.name);
            dtor.shutdown().await;
        }
    }
}

///
/// Holds component singletons and manages their dependencies.
///
pub struct ComponentStore {
    components: HashMap<TypeId, AnyComponent>,
    destructor: DAGDestructor,
}

#[derive(Default)]
pub struct ComponentStoreBuilder {
    known_types: HashSet<TypeId>,
    factories: Vec<Box<dyn ComponentFactory>>,
}

impl ComponentStoreBuilder {
    ///
    /// Registers a new component type in component store
    ///
    pub fn register<C: Component>(mut self) -> anyhow::Result<Self> {
        if !self.known_types.insert(TypeId::of::<C>()) {
            return Err(anyhow::anyhow!(
                "Component {} is already registered",
                C::component_name()
            ));
        }

        self.factories
            .push(Box::new(DefaultComponentFactory::<C>::default()));
        Ok(self)
    }

    ///
    /// Creates component store.
    /// Effectively invokes `Component::init()` for each registered component.
    ///
    /// Every component reads its own section of `config_provider`, named after
    /// `ComponentName::component_name()`.
    ///
    /// May return error if any component failed to initialize.
    ///
    pub async fn build(
        self,
        config_provider: Box<dyn ConfigProvider>,
    ) -> Result<ComponentStore, ComponentError> {
        if self.factories.is_empty() {
            return Ok(ComponentStore {
                components: Default::default(),
                destructor: Default::default(),
            });
        }

        let context = Arc::new(ResolutionContext::new(self.known_types));

        let (sender, mut receiver) = mpsc::channel(self.factories.len());
        let mut tasks = Vec::with_capacity(self.factories.len());

        for factory in self.factories {
            let sender = sender.clone();
            let info = factory.component_info();
            let resolver = ComponentResolver::new(context.clone(), info);

            let config = config_provider.get_subconfig(info.name)?;

            tasks.push(tokio::spawn(async move {
                tracing::debug!("Creating {}", info.name);
                let res = factory.create(resolver, config).await;
                if sender.send(res).await.is_err() {
                    tracing::debug!("Component queue closed before {} was created", info.name);
                }
            }));
        }

        drop(sender);

        let mut destructors: Vec<(ComponentInfo, ComponentDtor)> = Default::default();

        while let Some(res) = receiver.recv().await {
            let (component, dtor, component_info) = match res {
                Ok(created) => created,
                Err(err) => {
                    // Components still waiting on the failed one would never finish.
                    tasks.iter().for_each(|task| task.abort());
                    return Err(err);
                }
            };
            context.add_component(&component_info, component);
            destructors.push((component_info, dtor));
        }

        let (components, dag) = context.finalize();
        let destructor = DAGDestructor::new(destructors, dag);

        Ok(ComponentStore {
            components,
            destructor,
        })
    }
}

impl ComponentStore {
    ///
    /// Creates component store builder.
    ///
    pub fn builder() -> ComponentStoreBuilder {
        ComponentStoreBuilder::default()
    }

    ///
    /// Tries to resolve component in component store.
    ///
    pub fn resolve<C: Component>(&self) -> Option<Arc<C>> {
        self.components
            .get(&TypeId::of::<C>())
            .and_then(|component| component.clone().downcast::<C>().ok())
    }

    ///
    /// Stops execution of held components.
    ///
    pub async fn destroy(self) {
        self.destructor.destroy().await;
    }
}
