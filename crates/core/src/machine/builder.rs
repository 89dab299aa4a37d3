use std::collections::VecDeque;

use crate::component::{Component, ComponentId, PartVariant};
use crate::parts::Pulley;
use crate::propagation::{Link, RotationSource};
use crate::{MachineError, Result};

use super::Machine;

/// Assembles a [`Machine`], validating every link as it is made.
#[derive(Debug, Default)]
pub struct MachineBuilder {
    components: Vec<Component>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part and returns its handle. Parts advance and draw in the
    /// order they were added.
    pub fn add(&mut self, part: impl Into<Component>) -> ComponentId {
        self.components.push(part.into());
        ComponentId::new(self.components.len() - 1)
    }

    pub fn get<T: PartVariant>(&self, id: ComponentId) -> Option<&T> {
        self.components.get(id.index()).and_then(T::from_component)
    }

    /// Feeds the rotation published by `source` unchanged into `sink`.
    pub fn connect(&mut self, source: ComponentId, sink: ComponentId) -> Result<()> {
        self.check_link(source, sink)?;
        self.source_of(source)?.subscribe(Link::direct(sink));
        Ok(())
    }

    /// Runs a belt from `driver` to `driven`. The driven pulley turns at the
    /// driver's speed times driver diameter over driven diameter.
    pub fn belt(&mut self, driver: ComponentId, driven: ComponentId) -> Result<()> {
        let driven_pulley = self.pulley(driven)?.clone();
        let driver_pulley = self.pulley(driver)?;

        for (id, pulley) in [(driver, driver_pulley), (driven, &driven_pulley)] {
            let diameter = pulley.diameter();
            if !(diameter.is_finite() && diameter > 0.0) {
                return Err(MachineError::InvalidDiameter {
                    component: self.describe(id),
                    diameter,
                });
            }
        }
        if driver_pulley.belt().is_some() {
            return Err(MachineError::AlreadyBelted {
                component: self.describe(driver),
            });
        }
        self.check_link(driver, driven)?;

        let pulley = Pulley::from_component_mut(&mut self.components[driver.index()])
            .ok_or(MachineError::UnknownComponent(driver.index()))?;
        let ratio = pulley.attach_belt(driven, &driven_pulley);
        pulley.source_mut().subscribe(Link::geared(driven, ratio));
        Ok(())
    }

    /// Registers `responder` to be woken whenever `trigger` detects a key
    /// drop.
    pub fn add_responder(&mut self, trigger: ComponentId, responder: ComponentId) -> Result<()> {
        if !self.component(responder)?.is_responder() {
            return Err(MachineError::NotAResponder {
                component: self.describe(responder),
            });
        }
        let described = self.describe(trigger);
        self.components
            .get_mut(trigger.index())
            .ok_or(MachineError::UnknownComponent(trigger.index()))?
            .notifier_mut()
            .ok_or(MachineError::NotATrigger {
                component: described,
            })?
            .add_responder(responder);
        Ok(())
    }

    /// Finishes assembly. Fails if the rotation links form a cycle.
    pub fn build(self) -> Result<Machine> {
        let order = self.evaluation_order()?;
        tracing::debug!(components = self.components.len(), "assembled machine");
        Ok(Machine::from_parts(self.components, order))
    }

    /// Topological order of the rotation graph, ties broken by insertion
    /// order.
    fn evaluation_order(&self) -> Result<Vec<ComponentId>> {
        let count = self.components.len();
        let mut indegree = vec![0_usize; count];
        for link in self.links() {
            indegree[link.sink.index()] += 1;
        }

        let mut ready: VecDeque<usize> = (0..count).filter(|&index| indegree[index] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(index) = ready.pop_front() {
            order.push(ComponentId::new(index));
            let Some(source) = self.components[index].source() else {
                continue;
            };
            for link in source.links() {
                let sink = link.sink.index();
                indegree[sink] -= 1;
                if indegree[sink] == 0 {
                    ready.push_back(sink);
                }
            }
        }

        if let Some(stuck) = (0..count).find(|&index| indegree[index] > 0) {
            return Err(MachineError::RotationCycle {
                component: self.describe(ComponentId::new(stuck)),
            });
        }
        Ok(order)
    }

    fn links(&self) -> impl Iterator<Item = &Link> {
        self.components
            .iter()
            .filter_map(Component::source)
            .flat_map(|source| source.links())
    }

    fn check_link(&self, source: ComponentId, sink: ComponentId) -> Result<()> {
        let Some(rotation_source) = self.component(source)?.source() else {
            return Err(MachineError::NotASource {
                component: self.describe(source),
            });
        };
        if !self.component(sink)?.is_sink() {
            return Err(MachineError::NotASink {
                component: self.describe(sink),
            });
        }
        if rotation_source.is_linked_to(sink) {
            return Err(MachineError::DuplicateLink {
                source_name: self.describe(source),
                sink: self.describe(sink),
            });
        }
        if let Some(driver) = self.driver_of(sink) {
            return Err(MachineError::AlreadyDriven {
                sink: self.describe(sink),
                driver: self.describe(driver),
            });
        }
        Ok(())
    }

    /// The component already feeding rotation into `sink`, if any.
    fn driver_of(&self, sink: ComponentId) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|component| {
                component
                    .source()
                    .is_some_and(|source| source.is_linked_to(sink))
            })
            .map(ComponentId::new)
    }

    fn component(&self, id: ComponentId) -> Result<&Component> {
        self.components
            .get(id.index())
            .ok_or(MachineError::UnknownComponent(id.index()))
    }

    fn pulley(&self, id: ComponentId) -> Result<&Pulley> {
        Pulley::from_component(self.component(id)?).ok_or_else(|| {
            MachineError::msg(format!("belts join pulleys, not `{}`", self.describe(id)))
        })
    }

    fn source_of(&mut self, id: ComponentId) -> Result<&mut RotationSource> {
        self.components
            .get_mut(id.index())
            .and_then(Component::source_mut)
            .ok_or(MachineError::UnknownComponent(id.index()))
    }

    fn describe(&self, id: ComponentId) -> String {
        match self.components.get(id.index()) {
            Some(component) => format!("{} {id}", component.kind()),
            None => id.to_string(),
        }
    }
}
