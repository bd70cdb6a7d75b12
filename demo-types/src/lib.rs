//! Reference record set for the repbit codec.
//!
//! One record per replication role plus a shared composite, with
//! hand-written [`Replicated`] impls, a registry constructor feeding the
//! records in their canonical discovery order, and a [`ComponentStore`]
//! receiver suitable for demos and tests.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use bitstream::{BitResult, BitSink, BitSource};
use codec::{BitSerializer, BuildResult, Receiver, Registry};
use layout::{FieldDef, FieldRef, FieldType, FieldValue, RecordLayout, Replicated, Role};
use serde::Serialize;

/// Quantized world position: centimeters on each axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vec3Q {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl BitSerializer for Vec3Q {
    const NAME: &'static str = "Vec3Q";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("x", FieldType::I16),
        FieldDef::new("y", FieldType::I16),
        FieldDef::new("z", FieldType::I16),
    ];

    fn write(sink: &mut dyn BitSink, value: &Self) -> BitResult<()> {
        sink.write_bits(u32::from(value.x as u16), 16)?;
        sink.write_bits(u32::from(value.y as u16), 16)?;
        sink.write_bits(u32::from(value.z as u16), 16)?;
        Ok(())
    }

    fn read(source: &mut dyn BitSource) -> BitResult<Self> {
        let x = source.read_bits(16)? as u16 as i16;
        let y = source.read_bits(16)? as u16 as i16;
        let z = source.read_bits(16)? as u16 as i16;
        Ok(Self { x, y, z })
    }
}

/// Movement stance of a player avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Stance {
    #[default]
    Idle,
    Running,
    Falling,
}

impl Stance {
    /// Number of variants, for the field layout.
    pub const VARIANTS: u32 = 3;

    fn from_index(index: u32) -> Self {
        match index {
            1 => Self::Running,
            2 => Self::Falling,
            _ => Self::Idle,
        }
    }
}

/// Client-predicted avatar state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerState {
    pub energy: i32,
    pub stance: Stance,
    pub position: Vec3Q,
}

impl Replicated for PlayerState {
    fn layout() -> RecordLayout {
        const FIELDS: [FieldDef; 3] = [
            FieldDef::new("energy", FieldType::I32),
            FieldDef::new("stance", FieldType::enumeration(Stance::VARIANTS)),
            FieldDef::new("position", FieldType::composite("Vec3Q")),
        ];
        RecordLayout::new("PlayerState", &FIELDS)
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::I32(self.energy)),
            1 => Some(FieldRef::Enum(self.stance as u32)),
            2 => Some(FieldRef::Composite(&self.position)),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        match (index, value) {
            (0, FieldValue::I32(v)) => self.energy = v,
            (1, FieldValue::Enum(v)) => self.stance = Stance::from_index(v),
            (2, FieldValue::Composite(boxed)) => {
                if let Ok(v) = boxed.downcast::<Vec3Q>() {
                    self.position = *v;
                }
            }
            _ => {}
        }
    }
}

/// Server-authoritative pickup orb.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrbState {
    pub hue: u16,
    pub charge: u8,
    pub active: bool,
}

impl Replicated for OrbState {
    fn layout() -> RecordLayout {
        const FIELDS: [FieldDef; 3] = [
            FieldDef::new("hue", FieldType::U16),
            FieldDef::new("charge", FieldType::U8),
            FieldDef::new("active", FieldType::Bool),
        ];
        RecordLayout::new("OrbState", &FIELDS)
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::U16(self.hue)),
            1 => Some(FieldRef::U8(self.charge)),
            2 => Some(FieldRef::Bool(self.active)),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        match (index, value) {
            (0, FieldValue::U16(v)) => self.hue = v,
            (1, FieldValue::U8(v)) => self.charge = v,
            (2, FieldValue::Bool(v)) => self.active = v,
            _ => {}
        }
    }
}

/// Server-authoritative turret state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurretState {
    pub heat: u16,
    pub target: u32,
    pub aim: Vec3Q,
    pub locked: bool,
}

impl Replicated for TurretState {
    fn layout() -> RecordLayout {
        const FIELDS: [FieldDef; 4] = [
            FieldDef::new("heat", FieldType::U16),
            FieldDef::new("target", FieldType::U32),
            FieldDef::new("aim", FieldType::composite("Vec3Q")),
            FieldDef::new("locked", FieldType::Bool),
        ];
        RecordLayout::new("TurretState", &FIELDS)
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::U16(self.heat)),
            1 => Some(FieldRef::U32(self.target)),
            2 => Some(FieldRef::Composite(&self.aim)),
            3 => Some(FieldRef::Bool(self.locked)),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        match (index, value) {
            (0, FieldValue::U16(v)) => self.heat = v,
            (1, FieldValue::U32(v)) => self.target = v,
            (2, FieldValue::Composite(boxed)) => {
                if let Ok(v) = boxed.downcast::<Vec3Q>() {
                    self.aim = *v;
                }
            }
            (3, FieldValue::Bool(v)) => self.locked = v,
            _ => {}
        }
    }
}

/// Per-tick movement input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveInput {
    pub dx: i8,
    pub dy: i8,
    pub jump: bool,
}

impl Replicated for MoveInput {
    fn layout() -> RecordLayout {
        const FIELDS: [FieldDef; 3] = [
            FieldDef::new("dx", FieldType::I8),
            FieldDef::new("dy", FieldType::I8),
            FieldDef::new("jump", FieldType::Bool),
        ];
        RecordLayout::new("MoveInput", &FIELDS)
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::I8(self.dx)),
            1 => Some(FieldRef::I8(self.dy)),
            2 => Some(FieldRef::Bool(self.jump)),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        match (index, value) {
            (0, FieldValue::I8(v)) => self.dx = v,
            (1, FieldValue::I8(v)) => self.dy = v,
            (2, FieldValue::Bool(v)) => self.jump = v,
            _ => {}
        }
    }
}

/// Fire-and-forget ping marker; single field, so no mask prefix on the wire.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PingEvent {
    pub seq: u8,
}

impl Replicated for PingEvent {
    fn layout() -> RecordLayout {
        const FIELDS: [FieldDef; 1] = [FieldDef::new("seq", FieldType::U8)];
        RecordLayout::new("PingEvent", &FIELDS)
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::U8(self.seq)),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        if let (0, FieldValue::U8(v)) = (index, value) {
            self.seq = v;
        }
    }
}

/// A receiver storing one slot per (record type, entity) pair.
#[derive(Debug, Default)]
pub struct ComponentStore {
    slots: HashMap<(TypeId, u32), Box<dyn Any>>,
    destroyed: Vec<(u32, &'static str)>,
}

impl ComponentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `entity_id`, if any.
    #[must_use]
    pub fn get<T: Replicated + Copy>(&self, entity_id: u32) -> Option<T> {
        self.slots
            .get(&(TypeId::of::<T>(), entity_id))
            .and_then(|slot| slot.downcast_ref::<T>())
            .copied()
    }

    /// Returns the number of live slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the destroy log: `(entity_id, record type name)` in arrival
    /// order.
    #[must_use]
    pub fn destroyed(&self) -> &[(u32, &'static str)] {
        &self.destroyed
    }
}

impl Receiver for ComponentStore {
    fn receive_new<T: Replicated>(&mut self, entity_id: u32, value: T) {
        self.slots
            .insert((TypeId::of::<T>(), entity_id), Box::new(value));
    }

    fn update<T: Replicated>(&mut self, _mask: u32, entity_id: u32, value: T) {
        self.slots
            .insert((TypeId::of::<T>(), entity_id), Box::new(value));
    }

    fn grab_or_create<T: Replicated>(&mut self, entity_id: u32) -> T {
        self.slots
            .remove(&(TypeId::of::<T>(), entity_id))
            .and_then(|slot| slot.downcast::<T>().ok())
            .map_or_else(T::default, |slot| *slot)
    }

    fn destroy_component<T: Replicated>(&mut self, entity_id: u32) {
        self.slots.remove(&(TypeId::of::<T>(), entity_id));
        self.destroyed.push((entity_id, T::layout().type_name));
    }
}

/// Builds the demo registry, feeding records in their canonical discovery
/// order: predicted, ghosts, inputs, then events.
///
/// # Errors
///
/// Propagates registration errors; the demo record set itself is valid.
pub fn demo_registry() -> BuildResult<Registry<ComponentStore>> {
    let mut builder = Registry::<ComponentStore>::builder();
    builder.serializer::<Vec3Q>()?;
    builder.record::<PlayerState>(Role::Predicted)?;
    builder.record::<OrbState>(Role::Ghost)?;
    builder.record::<TurretState>(Role::Ghost)?;
    builder.record::<MoveInput>(Role::Input)?;
    builder.record::<PingEvent>(Role::ShortLivedEvent)?;
    Ok(builder.build())
}
