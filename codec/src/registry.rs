//! Type-id allocation and the per-record dispatch tables.
//!
//! [`RegistryBuilder`] is fed composite serializers and `(role, record)`
//! pairs in discovery order; it assigns dense `u16` ids starting at 1,
//! builds each record's [`RecordCodec`], and monomorphizes the three
//! dispatch thunks. [`RegistryBuilder::build`] freezes the result into a
//! [`Registry`], after which every lookup is O(1) and read-only.
//!
//! The registry is generic over the receiver type `R` so that dispatch
//! thunks call the application's receiver without dynamic typing. An
//! application wanting process-global tables wraps its registry in a
//! `OnceLock` and initializes it once at start-up, before any dispatch:
//!
//! ```ignore
//! static TABLES: OnceLock<Registry<GameReceiver>> = OnceLock::new();
//!
//! fn tables() -> &'static Registry<GameReceiver> {
//!     TABLES.get_or_init(|| build_registry().expect("record set must be valid"))
//! }
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use bitstream::BitSource;
use layout::{Replicated, Role};

use crate::dispatch::Receiver;
use crate::error::{BuildError, BuildResult, CodecError, CodecResult};
use crate::plan::RecordCodec;
use crate::serializers::{BitSerializer, SerializerRegistry};

type StreamDispatchFn<R> = fn(&RecordCodec, &mut dyn BitSource, u32, &mut R) -> CodecResult<()>;
type DestroyDispatchFn<R> = fn(u32, &mut R);

/// One registered record: its id, role, compiled codec, and dispatch thunks.
pub struct RecordEntry<R> {
    id: u16,
    role: Role,
    type_id: TypeId,
    codec: RecordCodec,
    new_fn: StreamDispatchFn<R>,
    update_fn: StreamDispatchFn<R>,
    destroy_fn: DestroyDispatchFn<R>,
}

impl<R> RecordEntry<R> {
    /// Returns the assigned type id.
    #[must_use]
    pub const fn id(&self) -> u16 {
        self.id
    }

    /// Returns the replication role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the record type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.codec.type_name()
    }

    /// Returns the compiled codec.
    #[must_use]
    pub const fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    pub(crate) fn dispatch_new(
        &self,
        source: &mut dyn BitSource,
        entity_id: u32,
        receiver: &mut R,
    ) -> CodecResult<()> {
        (self.new_fn)(&self.codec, source, entity_id, receiver)
    }

    pub(crate) fn dispatch_update(
        &self,
        source: &mut dyn BitSource,
        entity_id: u32,
        receiver: &mut R,
    ) -> CodecResult<()> {
        (self.update_fn)(&self.codec, source, entity_id, receiver)
    }

    pub(crate) fn dispatch_destroy(&self, entity_id: u32, receiver: &mut R) {
        (self.destroy_fn)(entity_id, receiver);
    }
}

impl<R> fmt::Debug for RecordEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordEntry")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("type_name", &self.type_name())
            .finish()
    }
}

/// Builder fed records and serializers in discovery order.
pub struct RegistryBuilder<R> {
    serializers: SerializerRegistry,
    entries: Vec<RecordEntry<R>>,
    by_type: HashMap<TypeId, u16>,
}

impl<R> Default for RegistryBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RegistryBuilder<R> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            serializers: SerializerRegistry::new(),
            entries: Vec::new(),
            by_type: HashMap::new(),
        }
    }

    /// Registers a composite serializer.
    ///
    /// Serializers must be registered before any record referencing them.
    ///
    /// # Errors
    ///
    /// See [`SerializerRegistry::register`].
    pub fn serializer<C: BitSerializer>(&mut self) -> BuildResult<()> {
        self.serializers.register::<C>()
    }

    /// Freezes the builder into a read-only registry.
    #[must_use]
    pub fn build(self) -> Registry<R> {
        let mut ids_by_role: [Vec<u32>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for entry in &self.entries {
            if let Some(bucket) = bucket_index(entry.role) {
                ids_by_role[bucket].push(u32::from(entry.id));
            }
        }
        Registry {
            entries: self.entries,
            by_type: self.by_type,
            ids_by_role,
        }
    }
}

impl<R: Receiver> RegistryBuilder<R> {
    /// Registers a record type under `role` and assigns the next type id.
    ///
    /// Ids are dense, starting at 1, in registration order; the caller feeds
    /// records in discovery order so that both endpoints agree.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateRecord`] if `T` was already
    /// registered, [`BuildError::IdSpaceExhausted`] if the id space is full,
    /// or any [`RecordCodec::build`] error for an invalid layout.
    pub fn record<T: Replicated>(&mut self, role: Role) -> BuildResult<()> {
        let layout = T::layout();
        let type_id = TypeId::of::<T>();
        if self.by_type.contains_key(&type_id) {
            return Err(BuildError::DuplicateRecord {
                record: layout.type_name,
            });
        }

        let next = self.entries.len() + 1;
        let id = u16::try_from(next).map_err(|_| BuildError::IdSpaceExhausted {
            max: u32::from(u16::MAX),
        })?;
        let codec = RecordCodec::build(&layout, &self.serializers)?;

        self.by_type.insert(type_id, id);
        self.entries.push(RecordEntry {
            id,
            role,
            type_id,
            codec,
            new_fn: dispatch_new::<T, R>,
            update_fn: dispatch_update::<T, R>,
            destroy_fn: dispatch_destroy::<T, R>,
        });
        Ok(())
    }
}

fn bucket_index(role: Role) -> Option<usize> {
    match role {
        Role::Predicted => Some(0),
        Role::Ghost => Some(1),
        Role::Input => Some(2),
        Role::ShortLivedEvent => None,
    }
}

fn dispatch_new<T: Replicated, R: Receiver>(
    codec: &RecordCodec,
    source: &mut dyn BitSource,
    entity_id: u32,
    receiver: &mut R,
) -> CodecResult<()> {
    let value = codec.deserialize_full::<T>(source)?;
    receiver.receive_new(entity_id, value);
    Ok(())
}

fn dispatch_update<T: Replicated, R: Receiver>(
    codec: &RecordCodec,
    source: &mut dyn BitSource,
    entity_id: u32,
    receiver: &mut R,
) -> CodecResult<()> {
    let mut value = receiver.grab_or_create::<T>(entity_id);
    let mask = codec.deserialize_masked_into(source, &mut value)?;
    receiver.update(mask, entity_id, value);
    Ok(())
}

fn dispatch_destroy<T: Replicated, R: Receiver>(entity_id: u32, receiver: &mut R) {
    receiver.destroy_component::<T>(entity_id);
}

/// Frozen registration tables: id assignment, role buckets, codecs, and
/// dispatch thunks.
///
/// After [`RegistryBuilder::build`] returns, every access is a read; the
/// registry can be shared freely.
pub struct Registry<R> {
    entries: Vec<RecordEntry<R>>,
    by_type: HashMap<TypeId, u16>,
    ids_by_role: [Vec<u32>; 3],
}

impl<R> Registry<R> {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder<R> {
        RegistryBuilder::new()
    }

    /// Returns the number of registered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no record is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all entries in id order, for emitting the assignment table.
    #[must_use]
    pub fn entries(&self) -> &[RecordEntry<R>] {
        &self.entries
    }

    /// Returns the type id assigned to `T`, if registered.
    ///
    /// Ids are stable for the lifetime of the registry.
    #[must_use]
    pub fn id_of<T: Replicated>(&self) -> Option<u16> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the ids registered under `role`, in registration order.
    ///
    /// Only Predicted, Ghost, and Input records join a bucket; events are
    /// dispatched by id alone and this returns an empty slice for them.
    #[must_use]
    pub fn ids_by_role(&self, role: Role) -> &[u32] {
        match bucket_index(role) {
            Some(bucket) => &self.ids_by_role[bucket],
            None => &[],
        }
    }

    /// Looks up an entry by wire `data_type_id`.
    #[must_use]
    pub fn entry(&self, data_type_id: u32) -> Option<&RecordEntry<R>> {
        let index = (data_type_id as usize).checked_sub(1)?;
        self.entries.get(index)
    }

    /// Returns the compiled codec for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnregisteredRecord`] if `T` was never
    /// registered.
    pub fn codec_of<T: Replicated>(&self) -> CodecResult<&RecordCodec> {
        let id = self
            .id_of::<T>()
            .ok_or_else(|| CodecError::UnregisteredRecord {
                record: T::layout().type_name,
            })?;
        let entry = &self.entries[usize::from(id) - 1];
        debug_assert_eq!(entry.type_id, TypeId::of::<T>());
        Ok(&entry.codec)
    }

    /// Serializes every field of `value`. See [`RecordCodec::serialize_full`].
    ///
    /// # Errors
    ///
    /// Propagates codec errors; fails if `T` is unregistered.
    pub fn serialize_full<T: Replicated>(
        &self,
        sink: &mut dyn bitstream::BitSink,
        value: &T,
    ) -> CodecResult<()> {
        self.codec_of::<T>()?.serialize_full(sink, value)
    }

    /// Serializes the fields selected by `mask`. See
    /// [`RecordCodec::serialize_masked`].
    ///
    /// # Errors
    ///
    /// Propagates codec errors; fails if `T` is unregistered.
    pub fn serialize_masked<T: Replicated>(
        &self,
        sink: &mut dyn bitstream::BitSink,
        value: &T,
        mask: u32,
    ) -> CodecResult<()> {
        self.codec_of::<T>()?.serialize_masked(sink, value, mask)
    }

    /// Deserializes a new value. See [`RecordCodec::deserialize_full`].
    ///
    /// # Errors
    ///
    /// Propagates codec errors; fails if `T` is unregistered.
    pub fn deserialize_full<T: Replicated>(&self, source: &mut dyn BitSource) -> CodecResult<T> {
        self.codec_of::<T>()?.deserialize_full(source)
    }

    /// Deserializes into a borrowed target. See
    /// [`RecordCodec::deserialize_full_into`].
    ///
    /// # Errors
    ///
    /// Propagates codec errors; fails if `T` is unregistered.
    pub fn deserialize_full_into<T: Replicated>(
        &self,
        source: &mut dyn BitSource,
        target: &mut T,
    ) -> CodecResult<()> {
        self.codec_of::<T>()?.deserialize_full_into(source, target)
    }

    /// Deserializes a masked form into a borrowed target and returns the
    /// mask. See [`RecordCodec::deserialize_masked_into`].
    ///
    /// # Errors
    ///
    /// Propagates codec errors; fails if `T` is unregistered.
    pub fn deserialize_masked_into<T: Replicated>(
        &self,
        source: &mut dyn BitSource,
        target: &mut T,
    ) -> CodecResult<u32> {
        self.codec_of::<T>()?.deserialize_masked_into(source, target)
    }

    /// Computes the difference mask of two values. See [`RecordCodec::diff`].
    ///
    /// # Errors
    ///
    /// Propagates codec errors; fails if `T` is unregistered.
    pub fn diff<T: Replicated>(&self, a: &T, b: &T) -> CodecResult<u32> {
        self.codec_of::<T>()?.diff(a, b)
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("records", &self.entries.len())
            .finish()
    }
}
