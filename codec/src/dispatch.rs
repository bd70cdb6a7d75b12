//! Wire-tagged message dispatch to a user-supplied receiver.
//!
//! Higher-level protocols decode `(entity_id, data_type_id)` off the wire
//! and hand the payload here. The three entry points are stateless: each
//! routes through the registry entry for `data_type_id` and calls the
//! matching receiver operation. Unknown ids are silently ignored and no
//! payload bits are consumed; the enclosing transport is expected to detect
//! such mismatches out-of-band if it cares.

use bitstream::BitSource;
use layout::Replicated;

use crate::error::CodecResult;
use crate::registry::Registry;

/// The application-side sink for replicated records.
///
/// Instance storage keyed by `entity_id` is entirely the receiver's
/// business; the engine never owns records.
pub trait Receiver {
    /// A record of type `T` was created for `entity_id`.
    fn receive_new<T: Replicated>(&mut self, entity_id: u32, value: T);

    /// A masked update for `entity_id` was applied onto `value`.
    ///
    /// `mask` has one bit per field, bit `i` set iff field `i` was present
    /// in the message.
    fn update<T: Replicated>(&mut self, mask: u32, entity_id: u32, value: T);

    /// Returns the current value for `entity_id`, or a default-initialized
    /// one if none exists yet.
    fn grab_or_create<T: Replicated>(&mut self, entity_id: u32) -> T;

    /// The record of type `T` on `entity_id` was destroyed.
    fn destroy_component<T: Replicated>(&mut self, entity_id: u32);
}

/// Decodes a full-form record and delivers it via
/// [`Receiver::receive_new`].
///
/// Unknown `data_type_id` is a no-op: nothing is read, nothing is called.
///
/// # Errors
///
/// Propagates codec errors from the per-record routine.
pub fn receive_new<R>(
    registry: &Registry<R>,
    source: &mut dyn BitSource,
    entity_id: u32,
    data_type_id: u32,
    receiver: &mut R,
) -> CodecResult<()> {
    let Some(entry) = registry.entry(data_type_id) else {
        return Ok(());
    };
    entry.dispatch_new(source, entity_id, receiver)
}

/// Decodes a masked update onto the receiver's current value and delivers
/// it via [`Receiver::update`].
///
/// The current value is obtained with [`Receiver::grab_or_create`] first.
/// Unknown `data_type_id` is a no-op: nothing is read, nothing is called.
///
/// # Errors
///
/// Propagates codec errors from the per-record routine.
pub fn receive_update<R>(
    registry: &Registry<R>,
    source: &mut dyn BitSource,
    entity_id: u32,
    data_type_id: u32,
    receiver: &mut R,
) -> CodecResult<()> {
    let Some(entry) = registry.entry(data_type_id) else {
        return Ok(());
    };
    entry.dispatch_update(source, entity_id, receiver)
}

/// Delivers a destroy notification via [`Receiver::destroy_component`].
///
/// Destroy messages carry no payload, so there is no port argument.
/// Unknown `data_type_id` is a no-op.
pub fn receive_destroy<R>(
    registry: &Registry<R>,
    entity_id: u32,
    data_type_id: u32,
    receiver: &mut R,
) {
    if let Some(entry) = registry.entry(data_type_id) {
        entry.dispatch_destroy(entity_id, receiver);
    }
}
