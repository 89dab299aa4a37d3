//! A fully assembled machine and the evaluation of its rotation graph.
//!
//! Components are stored in an arena and addressed by [`ComponentId`]. Links
//! between them are fixed at assembly time by [`MachineBuilder`], which also
//! computes a topological evaluation order. Every update walks that order
//! once, so each sink sees exactly one value per upstream path.

mod builder;

pub use builder::MachineBuilder;

use crate::component::{Component, ComponentId, PartVariant};
use crate::parts::MusicBox;
use crate::render::Canvas;

#[derive(Debug)]
pub struct Machine {
    components: Vec<Component>,
    order: Vec<ComponentId>,
    /// Position of each component in `order`, indexed by component.
    rank: Vec<usize>,
    /// Values waiting to be delivered during the current propagation.
    inbox: Vec<Vec<f64>>,
    time: f64,
}

impl Machine {
    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    pub(crate) fn from_parts(components: Vec<Component>, order: Vec<ComponentId>) -> Self {
        let mut rank = vec![0; components.len()];
        for (position, id) in order.iter().enumerate() {
            rank[id.index()] = position;
        }
        Self {
            inbox: vec![Vec::new(); components.len()],
            components,
            order,
            rank,
            time: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Machine time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.index())
    }

    /// Typed view of the component `id`, if it is a `T`.
    pub fn get<T: PartVariant>(&self, id: ComponentId) -> Option<&T> {
        self.component(id).and_then(T::from_component)
    }

    /// Every component of type `T`, in insertion order.
    pub fn parts<'a, T: PartVariant + 'a>(
        &'a self,
    ) -> impl Iterator<Item = (ComponentId, &'a T)> + 'a {
        self.components
            .iter()
            .enumerate()
            .filter_map(|(index, component)| {
                T::from_component(component).map(|part| (ComponentId::new(index), part))
            })
    }

    /// Order in which rotation values are delivered.
    pub fn evaluation_order(&self) -> &[ComponentId] {
        &self.order
    }

    /// Moves the machine to absolute time `time`, in seconds.
    pub fn set_time(&mut self, time: f64) {
        let delta = time - self.time;
        if delta != 0.0 {
            self.advance(delta);
        }
    }

    /// Advances every component by `delta` seconds, in insertion order. Parts
    /// that drive motion publish their new rotation immediately.
    pub fn advance(&mut self, delta: f64) {
        self.time += delta;
        for index in 0..self.components.len() {
            if let Some(rotation) = self.components[index].part_mut().advance(delta) {
                self.propagate(ComponentId::new(index), rotation);
            }
        }
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
        for component in &mut self.components {
            component.part_mut().reset();
            if let Some(source) = component.source_mut() {
                source.reset();
            }
        }
        for pending in &mut self.inbox {
            pending.clear();
        }
    }

    /// Draws every background layer, then every foreground layer, both in
    /// insertion order.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for component in &self.components {
            component.part().draw_background(canvas);
        }
        for component in &self.components {
            component.part().draw_foreground(canvas);
        }
    }

    /// Mutes or unmutes every music box.
    pub fn set_muted(&mut self, muted: bool) {
        for component in &mut self.components {
            if let Some(music) = MusicBox::from_component_mut(component) {
                music.set_muted(muted);
            }
        }
    }

    /// Publishes `rotation` from `origin` and settles everything downstream.
    fn propagate(&mut self, origin: ComponentId, rotation: f64) {
        let Self {
            components,
            order,
            rank,
            inbox,
            ..
        } = self;

        let Some(source) = components[origin.index()].source_mut() else {
            return;
        };
        for (sink, value) in source.publish(rotation) {
            inbox[sink.index()].push(value);
        }

        for &id in &order[rank[origin.index()] + 1..] {
            let mut pending = std::mem::take(&mut inbox[id.index()]);
            for value in pending.drain(..) {
                deliver(components, inbox, id, value);
            }
            inbox[id.index()] = pending;
        }
    }
}

fn deliver(components: &mut [Component], inbox: &mut [Vec<f64>], id: ComponentId, rotation: f64) {
    let component = &mut components[id.index()];
    let Some(sink) = component.as_sink_mut() else {
        return;
    };
    let outcome = sink.receive(rotation);

    if let Some(value) = outcome.republish {
        if let Some(source) = component.source_mut() {
            for (sink, forwarded) in source.publish(value) {
                inbox[sink.index()].push(forwarded);
            }
        }
    }
    if outcome.key_drop {
        notify_responders(components, id);
    }
}

fn notify_responders(components: &mut [Component], trigger: ComponentId) {
    let responders = components[trigger.index()]
        .notifier()
        .map(|notifier| notifier.responders().to_vec())
        .unwrap_or_default();
    tracing::debug!(%trigger, responders = responders.len(), "key drop");

    for responder in responders {
        if let Some(part) = components[responder.index()].as_responder_mut() {
            part.on_key_drop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use approx::assert_relative_eq;

    use super::*;
    use crate::component::Part;
    use crate::parts::{Cam, Crank, Pulley, Shaft, Sparty, SpartyOptions, ToyBox};
    use crate::render::{DrawCommand, DrawList};
    use crate::{MachineError, Placement};

    fn sparty() -> Sparty {
        Sparty::new(SpartyOptions {
            image: "sparty.png".into(),
            size: 100.0,
            spring_length: 100.0,
            spring_width: 20.0,
            links: 15,
            bouncy: false,
            spring_x: 0.0,
        })
    }

    #[test]
    fn belt_scales_rotation_by_diameter_ratio() {
        let mut builder = Machine::builder();
        let crank = builder.add(Crank::new(Placement::ORIGIN));
        let shaft = builder.add(Shaft::default());
        let driver = builder.add(Pulley::new(40.0, Placement::new(0.0, -100.0)));
        let driven = builder.add(Pulley::new(95.0, Placement::new(0.0, -200.0)));
        builder.connect(crank, shaft).unwrap();
        builder.connect(shaft, driver).unwrap();
        builder.belt(driver, driven).unwrap();
        let mut machine = builder.build().unwrap();

        // 9.5 s at 5 turns/s geared down by 0.2 gives 9.5 turns at the shaft.
        machine.set_time(9.5);

        assert_relative_eq!(
            machine.get::<Pulley>(driver).unwrap().rotation(),
            9.5,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            machine.get::<Pulley>(driven).unwrap().rotation(),
            4.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn downstream_sinks_settle_in_one_pass_regardless_of_insertion_order() {
        let mut builder = Machine::builder();
        // The cam is added before the shaft that drives it.
        let cam = builder.add(Cam::new("key.png", Placement::ORIGIN));
        let shaft = builder.add(Shaft::default());
        let crank = builder.add(Crank::new(Placement::ORIGIN));
        builder.connect(crank, shaft).unwrap();
        builder.connect(shaft, cam).unwrap();
        let mut machine = builder.build().unwrap();

        machine.set_time(1.0);

        assert_relative_eq!(machine.get::<Cam>(cam).unwrap().rotation(), 1.0, epsilon = 1e-9);
        assert_eq!(
            machine.evaluation_order().last().copied(),
            Some(cam),
            "{:?}",
            machine.evaluation_order()
        );
    }

    #[test]
    fn key_drop_reaches_every_responder_once() {
        let mut builder = Machine::builder();
        let crank = builder.add(Crank::new(Placement::ORIGIN));
        let cam = builder.add(Cam::new("key.png", Placement::ORIGIN));
        let toy_box = builder.add(ToyBox::new(Path::new("images"), 250.0, 240.0));
        let first = builder.add(sparty());
        let second = builder.add(sparty());
        builder.connect(crank, cam).unwrap();
        for responder in [toy_box, first, second] {
            builder.add_responder(cam, responder).unwrap();
        }
        let mut machine = builder.build().unwrap();

        // Cam reaches its first full cycle at 3 turns, i.e. 3 s.
        machine.set_time(2.9);
        assert!(!machine.get::<ToyBox>(toy_box).unwrap().is_open());

        machine.set_time(3.1);
        assert!(machine.get::<ToyBox>(toy_box).unwrap().is_open());
        assert!(machine.get::<Sparty>(first).unwrap().is_sprung());
        assert!(machine.get::<Sparty>(second).unwrap().is_sprung());
        assert_eq!(machine.get::<Cam>(cam).unwrap().notifier().fired(), 1);
    }

    #[test]
    fn setting_the_current_time_leaves_parts_untouched() {
        let mut builder = Machine::builder();
        let crank = builder.add(Crank::new(Placement::ORIGIN));
        let shaft = builder.add(Shaft::default());
        builder.connect(crank, shaft).unwrap();
        let mut machine = builder.build().unwrap();
        machine.set_time(0.1);
        let crank_time = machine.get::<Crank>(crank).unwrap().base().time();

        machine.set_time(machine.time());

        assert_eq!(machine.get::<Crank>(crank).unwrap().base().time(), crank_time);
        assert_eq!(machine.get::<Shaft>(shaft).unwrap().base().time(), crank_time);
    }

    #[test]
    fn reset_returns_every_part_to_rest() {
        let mut builder = Machine::builder();
        let crank = builder.add(Crank::new(Placement::ORIGIN));
        let shaft = builder.add(Shaft::default());
        builder.connect(crank, shaft).unwrap();
        let mut machine = builder.build().unwrap();

        machine.set_time(2.0);
        machine.reset();

        assert_eq!(machine.time(), 0.0);
        assert_eq!(machine.get::<Crank>(crank).unwrap().rotation(), 0.0);
        assert_eq!(machine.get::<Shaft>(shaft).unwrap().source().rotation(), 0.0);
    }

    #[test]
    fn backgrounds_are_drawn_before_any_foreground() {
        let mut builder = Machine::builder();
        builder.add(Crank::new(Placement::ORIGIN));
        builder.add(Shaft::default());
        let machine = builder.build().unwrap();

        let mut list = DrawList::new();
        machine.draw(&mut list);

        let first_foreground = list
            .commands()
            .iter()
            .position(|command| matches!(command, DrawCommand::Rect { .. }))
            .unwrap();
        let shaft_cylinder = list
            .commands()
            .iter()
            .position(|command| matches!(command, DrawCommand::Cylinder { .. }))
            .unwrap();
        assert!(shaft_cylinder < first_foreground);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut builder = Machine::builder();
        let a = builder.add(Shaft::default());
        let b = builder.add(Shaft::default());
        builder.connect(a, b).unwrap();
        builder.connect(b, a).unwrap();

        assert!(matches!(
            builder.build(),
            Err(MachineError::RotationCycle { .. })
        ));
    }

    #[test]
    fn invalid_links_are_rejected() {
        let mut builder = Machine::builder();
        let crank = builder.add(Crank::new(Placement::ORIGIN));
        let shaft = builder.add(Shaft::default());
        let cam = builder.add(Cam::new("key.png", Placement::ORIGIN));
        let toy_box = builder.add(ToyBox::new(Path::new("images"), 250.0, 240.0));

        builder.connect(crank, shaft).unwrap();
        assert!(matches!(
            builder.connect(crank, shaft),
            Err(MachineError::DuplicateLink { .. })
        ));
        assert!(matches!(
            builder.connect(cam, shaft),
            Err(MachineError::NotASource { .. })
        ));
        assert!(matches!(
            builder.connect(shaft, toy_box),
            Err(MachineError::NotASink { .. })
        ));
        assert!(matches!(
            builder.add_responder(cam, shaft),
            Err(MachineError::NotAResponder { .. })
        ));
        assert!(matches!(
            builder.add_responder(shaft, toy_box),
            Err(MachineError::NotATrigger { .. })
        ));
        assert!(matches!(
            builder.connect(crank, ComponentId::new(42)),
            Err(MachineError::UnknownComponent(42))
        ));
    }

    #[test]
    fn sinks_take_rotation_from_a_single_driver() {
        let mut builder = Machine::builder();
        let shaft = builder.add(Shaft::default());
        let driver = builder.add(Pulley::new(40.0, Placement::ORIGIN));
        let driven = builder.add(Pulley::new(95.0, Placement::ORIGIN));
        let cam = builder.add(Cam::new("key.png", Placement::ORIGIN));
        builder.connect(shaft, driver).unwrap();
        builder.belt(driver, driven).unwrap();
        builder.connect(shaft, cam).unwrap();

        assert!(matches!(
            builder.connect(shaft, driven),
            Err(MachineError::AlreadyDriven { .. })
        ));
        assert!(matches!(
            builder.connect(driven, cam),
            Err(MachineError::AlreadyDriven { .. })
        ));

        let other = builder.add(Pulley::new(20.0, Placement::ORIGIN));
        builder.connect(shaft, other).unwrap();
        assert!(matches!(
            builder.belt(other, driven),
            Err(MachineError::AlreadyDriven { .. })
        ));
    }

    #[test]
    fn single_driver_cam_fires_once_per_crossing() {
        let mut builder = Machine::builder();
        let crank = builder.add(Crank::new(Placement::ORIGIN));
        let shaft = builder.add(Shaft::default());
        let driver = builder.add(Pulley::new(40.0, Placement::ORIGIN));
        let driven = builder.add(Pulley::new(95.0, Placement::ORIGIN));
        let cam = builder.add(Cam::new("key.png", Placement::ORIGIN));
        builder.connect(crank, shaft).unwrap();
        builder.connect(shaft, driver).unwrap();
        builder.belt(driver, driven).unwrap();
        builder.connect(shaft, cam).unwrap();
        assert!(builder.connect(driven, cam).is_err());
        let mut machine = builder.build().unwrap();

        // 15.5 s at 1 turn/s at the shaft: the cam completes 5 cycles.
        for _ in 0..31 {
            machine.advance(0.5);
        }
        assert_eq!(machine.get::<Cam>(cam).unwrap().notifier().fired(), 5);
    }

    #[test]
    fn belts_reject_negative_and_nan_diameters() {
        let mut builder = Machine::builder();
        let good = builder.add(Pulley::new(20.0, Placement::ORIGIN));
        let negative = builder.add(Pulley::new(-20.0, Placement::ORIGIN));
        let nan = builder.add(Pulley::new(f64::NAN, Placement::ORIGIN));

        assert!(matches!(
            builder.belt(negative, good),
            Err(MachineError::InvalidDiameter { diameter, .. }) if diameter == -20.0
        ));
        assert!(matches!(
            builder.belt(good, negative),
            Err(MachineError::InvalidDiameter { diameter, .. }) if diameter == -20.0
        ));
        assert!(matches!(
            builder.belt(nan, good),
            Err(MachineError::InvalidDiameter { diameter, .. }) if diameter.is_nan()
        ));
        assert!(matches!(
            builder.belt(good, nan),
            Err(MachineError::InvalidDiameter { diameter, .. }) if diameter.is_nan()
        ));
        assert!(builder.get::<Pulley>(good).unwrap().belt().is_none());
    }

    #[test]
    fn belts_need_positive_diameters_and_a_free_driver() {
        let mut builder = Machine::builder();
        let driver = builder.add(Pulley::new(20.0, Placement::ORIGIN));
        let driven = builder.add(Pulley::new(80.0, Placement::ORIGIN));
        let other = builder.add(Pulley::new(40.0, Placement::ORIGIN));
        let flat = builder.add(Pulley::new(0.0, Placement::ORIGIN));

        assert!(matches!(
            builder.belt(driver, flat),
            Err(MachineError::InvalidDiameter { diameter, .. }) if diameter == 0.0
        ));
        builder.belt(driver, driven).unwrap();
        assert!(matches!(
            builder.belt(driver, other),
            Err(MachineError::AlreadyBelted { .. })
        ));
        assert_relative_eq!(
            builder.get::<Pulley>(driver).unwrap().belt().unwrap().ratio,
            0.25
        );
    }

    #[test]
    fn parts_lists_components_of_one_kind() {
        let mut builder = Machine::builder();
        builder.add(Crank::new(Placement::ORIGIN));
        let shaft = builder.add(Shaft::default());
        let machine = builder.build().unwrap();

        let shafts: Vec<ComponentId> = machine.parts::<Shaft>().map(|(id, _)| id).collect();
        assert_eq!(shafts, vec![shaft]);
        assert!(machine.get::<Crank>(shaft).is_none());
    }
}
