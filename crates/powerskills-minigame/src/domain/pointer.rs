//! Typed pointer events from the 3D surface and the gestures built on them.
//!
//! The rendering surface only reports where a pointer went down, moved and
//! came up. `DragTracker` and `SliderTracker` turn those raw events into the
//! single `PlayerInput` the state machine evaluates on release.

use serde::{Deserialize, Serialize};

use super::input::{OptionId, PlayerInput, Point3};

/// Pointer gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved while tracked.
    Move,
    /// Button released.
    Up,
    /// Gesture aborted by the surface.
    Cancel,
}

/// What the pointer is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PointerTarget {
    /// A clickable or draggable object.
    Item(OptionId),
    /// The slider rail.
    Rail,
    /// The slider knob.
    Knob,
    /// Empty space.
    Background,
}

/// A pointer event in world and object-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Gesture phase.
    pub phase: PointerPhase,
    /// Object under the pointer.
    pub target: PointerTarget,
    /// Hit point in world space.
    pub world_position: Point3,
    /// Hit point in the target's local space.
    pub local_position: Point3,
    #[serde(skip)]
    propagation_stopped: bool,
}

impl PointerEvent {
    /// Creates an event whose local position equals its world position.
    #[must_use]
    pub fn new(phase: PointerPhase, target: PointerTarget, world_position: Point3) -> Self {
        Self {
            phase,
            target,
            world_position,
            local_position: world_position,
            propagation_stopped: false,
        }
    }

    /// Sets the local-space hit point.
    #[must_use]
    pub fn with_local(mut self, local_position: Point3) -> Self {
        self.local_position = local_position;
        self
    }

    /// Marks the event as consumed so objects behind the target ignore it.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether a handler consumed the event.
    #[must_use]
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Follows one item from pointer-down to pointer-up.
#[derive(Debug, Default)]
pub struct DragTracker {
    dragging: Option<(OptionId, Point3)>,
}

impl DragTracker {
    /// Creates an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The item being dragged and its current position.
    #[must_use]
    pub fn dragging(&self) -> Option<(&OptionId, Point3)> {
        self.dragging.as_ref().map(|(id, at)| (id, *at))
    }

    /// Feeds one event. `height` is the dragged item's resting height; moves
    /// stay on that plane. Returns the drop when the gesture ends.
    pub fn handle(
        &mut self,
        event: &mut PointerEvent,
        height: impl Fn(&OptionId) -> Option<f64>,
    ) -> Option<PlayerInput> {
        let world = event.world_position;
        match event.phase {
            PointerPhase::Down => {
                let PointerTarget::Item(id) = &event.target else {
                    return None;
                };
                let id = id.clone();
                let y = height(&id)?;
                event.stop_propagation();
                self.dragging = Some((id, Point3::new(world.x, y, world.z)));
                None
            }
            PointerPhase::Move => {
                let (_, at) = self.dragging.as_mut()?;
                *at = Point3::new(world.x, at.y, world.z);
                event.stop_propagation();
                None
            }
            PointerPhase::Up => {
                let (item, at) = self.dragging.take()?;
                event.stop_propagation();
                let position = Point3::new(world.x, at.y, world.z);
                Some(PlayerInput::DropAt { item, position })
            }
            PointerPhase::Cancel => {
                self.dragging = None;
                None
            }
        }
    }
}

/// Follows the slider knob along a rail of half-length `rail`.
#[derive(Debug)]
pub struct SliderTracker {
    rail: f64,
    value: f64,
    held: bool,
}

impl SliderTracker {
    /// Creates a tracker with the knob at the center.
    #[must_use]
    pub fn new(rail: f64) -> Self {
        Self {
            rail,
            value: 0.0,
            held: false,
        }
    }

    /// Current knob position.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Feeds one event; uses the local x coordinate along the rail. Returns
    /// the release value when the knob is let go.
    ///
    /// Grabbing the knob leaves it where it is; pressing the rail jumps it
    /// there.
    pub fn handle(&mut self, event: &mut PointerEvent) -> Option<PlayerInput> {
        let along = event.local_position.x.clamp(-self.rail, self.rail);
        match event.phase {
            PointerPhase::Down => {
                match event.target {
                    PointerTarget::Rail => self.value = along,
                    PointerTarget::Knob => {}
                    _ => return None,
                }
                event.stop_propagation();
                self.held = true;
                None
            }
            PointerPhase::Move if self.held => {
                event.stop_propagation();
                self.value = along;
                None
            }
            PointerPhase::Up if self.held => {
                event.stop_propagation();
                self.held = false;
                Some(PlayerInput::ReleaseAt { value: self.value })
            }
            PointerPhase::Cancel => {
                self.held = false;
                None
            }
            PointerPhase::Move | PointerPhase::Up => None,
        }
    }
}
