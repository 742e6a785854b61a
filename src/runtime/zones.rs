use crate::foundation::core::{Point, Rect};

/// Pointer phase delivered by [`crate::Runtime::dispatch_pointer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Finger down.
    Down,
    /// Finger moved while down.
    Move,
    /// Finger lifted.
    Up,
}

impl PointerPhase {
    pub const ALL: [Self; 3] = [Self::Down, Self::Move, Self::Up];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Move => "move",
            Self::Up => "up",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "down" => Some(Self::Down),
            "move" => Some(Self::Move),
            "up" => Some(Self::Up),
            _ => None,
        }
    }
}

/// Hit-test geometry of a zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoneShape {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Circle.
    Circle { center: Point, radius: f64 },
}

impl ZoneShape {
    pub fn contains(&self, p: Point) -> bool {
        match *self {
            Self::Rect(r) => p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1,
            Self::Circle { center, radius } => (p - center).hypot2() <= radius * radius,
        }
    }

    /// Bounding box.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Rect(r) => r,
            Self::Circle { center, radius } => {
                Rect::new(center.x - radius, center.y - radius, center.x + radius, center.y + radius)
            }
        }
    }
}

/// A hit-test region registered by app logic during the current pass.
#[derive(Clone, Debug, PartialEq)]
pub struct EventZone {
    /// App-chosen id; re-registering an id replaces the zone.
    pub id: String,
    pub shape: ZoneShape,
    /// Higher wins.
    pub z_index: i32,
    /// Script function invoked as `handler(phase, x, y)`.
    pub handler: String,
    /// Phases the handler is invoked for.
    pub phases: Vec<PointerPhase>,
    /// Registration order within the registry; later wins ties.
    pub seq: u64,
}

impl EventZone {
    pub fn listens(&self, phase: PointerPhase) -> bool {
        self.phases.contains(&phase)
    }
}

/// Pass-scoped set of zones.
#[derive(Clone, Debug, Default)]
pub struct EventZoneRegistry {
    zones: Vec<EventZone>,
    next_seq: u64,
}

impl EventZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone, replacing any zone with the same id.
    pub fn register(
        &mut self,
        id: String,
        shape: ZoneShape,
        z_index: i32,
        handler: String,
        phases: Vec<PointerPhase>,
    ) {
        self.zones.retain(|z| z.id != id);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.zones.push(EventZone {
            id,
            shape,
            z_index,
            handler,
            phases,
            seq,
        });
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| z.id != id);
        self.zones.len() != before
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    /// Topmost zone containing `p`: highest `z_index`, ties to the most recently registered.
    pub fn hit_test(&self, p: Point) -> Option<&EventZone> {
        self.zones
            .iter()
            .filter(|z| z.shape.contains(p))
            .max_by_key(|z| (z.z_index, z.seq))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/zones.rs"]
mod tests;
