//! Rotation and key-drop propagation primitives.
//!
//! A [`RotationSource`] belongs to the component that produces rotation and
//! holds typed [`Link`]s to the components that consume it. Sinks are
//! referenced by [`ComponentId`] only; the owning [`Machine`](crate::Machine)
//! resolves them and delivers values in topological order.
//!
//! Key drops travel along a second, independent graph: a trigger owns a
//! [`KeyDropNotifier`] listing the responders it must wake up.

use serde::{Deserialize, Serialize};

use crate::ComponentId;

/// How a value is transformed while travelling along a link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkKind {
    /// The sink receives the published value unchanged.
    Direct,
    /// The sink receives the published value multiplied by `ratio`. Used for
    /// belts, where `ratio` is driver diameter over driven diameter.
    Geared { ratio: f64 },
}

impl LinkKind {
    pub fn apply(self, rotation: f64) -> f64 {
        match self {
            Self::Direct => rotation,
            Self::Geared { ratio } => rotation * ratio,
        }
    }
}

/// A single edge of the rotation graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub sink: ComponentId,
    pub kind: LinkKind,
}

impl Link {
    pub fn direct(sink: ComponentId) -> Self {
        Self {
            sink,
            kind: LinkKind::Direct,
        }
    }

    pub fn geared(sink: ComponentId, ratio: f64) -> Self {
        Self {
            sink,
            kind: LinkKind::Geared { ratio },
        }
    }
}

/// Fan-out notifier owned by a rotation producing component.
#[derive(Debug, Clone, Default)]
pub struct RotationSource {
    rotation: f64,
    links: Vec<Link>,
}

impl RotationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value published through this source, in turns.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Links in registration order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn is_linked_to(&self, sink: ComponentId) -> bool {
        self.links.iter().any(|link| link.sink == sink)
    }

    /// Appends a link. The graph is static once assembled, so there is no
    /// way to remove one again.
    pub(crate) fn subscribe(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Stores `rotation` and yields the value every linked sink must receive,
    /// in registration order.
    pub fn publish(&mut self, rotation: f64) -> impl Iterator<Item = (ComponentId, f64)> + '_ {
        self.rotation = rotation;
        self.links
            .iter()
            .map(move |link| (link.sink, link.kind.apply(rotation)))
    }

    pub fn reset(&mut self) {
        self.rotation = 0.0;
    }
}

/// What a sink asks the machine to do after it received a rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SinkOutcome {
    /// Value to push through the sink's own source, if it owns one.
    pub republish: Option<f64>,
    /// The sink detected its firing condition during this update.
    pub key_drop: bool,
}

impl SinkOutcome {
    /// Nothing further to propagate.
    pub const TERMINAL: Self = Self {
        republish: None,
        key_drop: false,
    };

    pub fn republish(rotation: f64) -> Self {
        Self {
            republish: Some(rotation),
            key_drop: false,
        }
    }

    pub fn key_drop(fired: bool) -> Self {
        Self {
            republish: None,
            key_drop: fired,
        }
    }
}

/// Capability of components reacting to an incoming rotation value.
///
/// Receiving the same value twice must leave the component, and everything
/// downstream of it, in the same state as receiving it once.
pub trait RotationSink {
    fn receive(&mut self, rotation: f64) -> SinkOutcome;
}

/// Capability of components reacting to a discrete key drop.
pub trait KeyResponder {
    fn on_key_drop(&mut self);
}

/// Responder list owned by a key-drop trigger.
#[derive(Debug, Clone, Default)]
pub struct KeyDropNotifier {
    responders: Vec<ComponentId>,
    fired: u64,
}

impl KeyDropNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responders(&self) -> &[ComponentId] {
        &self.responders
    }

    /// Number of key drops detected since the last reset.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    pub(crate) fn add_responder(&mut self, responder: ComponentId) {
        self.responders.push(responder);
    }

    pub(crate) fn record_fire(&mut self) {
        self.fired += 1;
    }

    pub fn reset(&mut self) {
        self.fired = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_fans_out_in_registration_order() {
        let mut source = RotationSource::new();
        source.subscribe(Link::direct(ComponentId::new(3)));
        source.subscribe(Link::geared(ComponentId::new(1), 0.5));

        let deliveries: Vec<_> = source.publish(2.0).collect();

        assert_eq!(
            deliveries,
            vec![(ComponentId::new(3), 2.0), (ComponentId::new(1), 1.0)]
        );
        assert_eq!(source.rotation(), 2.0);
    }

    #[test]
    fn geared_links_preserve_sign() {
        let kind = LinkKind::Geared { ratio: 40.0 / 95.0 };
        approx::assert_relative_eq!(kind.apply(-9.5), -4.0, epsilon = 1e-12);
    }

    #[test]
    fn reset_clears_value_but_keeps_links() {
        let mut source = RotationSource::new();
        source.subscribe(Link::direct(ComponentId::new(0)));
        let _ = source.publish(4.0).count();

        source.reset();

        assert_eq!(source.rotation(), 0.0);
        assert!(source.is_linked_to(ComponentId::new(0)));
    }
}
