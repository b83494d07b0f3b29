// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authoritative keyframe storage.
//!
//! The store owns every keyframe and enforces the track invariants:
//! strictly ascending times with no duplicates, values clamped to the
//! property range, times clamped to `[0, clip duration]`.
//!
//! Each mutation replaces the affected track's list wholesale (a fresh
//! `Arc`), never mutating a list in place. Snapshots handed to readers
//! therefore observe either the pre- or post-mutation state atomically,
//! which lets a playback tick evaluate tracks without locks while the
//! interaction thread edits.

use crate::curve;
use crate::keyframe::{EasingKind, Keyframe, KeyframeId, KeyframeRecord};
use crate::property::PropertyTag;
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// Store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A keyframe of the same property already occupies the exact time
    #[error("{property:?} already has a keyframe at {time}s")]
    DuplicateTime {
        /// Property whose track was targeted
        property: PropertyTag,
        /// Requested (already clamped) time
        time: f64,
    },

    /// Moving a keyframe onto a time occupied by a different keyframe
    /// of the same property
    #[error("moving to {time}s collides with another {property:?} keyframe")]
    TimeCollision {
        /// Property whose track was targeted
        property: PropertyTag,
        /// Requested (already clamped) time
        time: f64,
    },

    /// The keyframe id does not exist in the store
    #[error("keyframe not found: {0:?}")]
    KeyframeNotFound(KeyframeId),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// An immutable, cheaply cloneable view of one property track.
///
/// The snapshot stays valid (and unchanged) across later store
/// mutations; re-snapshot to observe them.
#[derive(Debug, Clone)]
pub struct TrackSnapshot {
    property: PropertyTag,
    keyframes: Arc<Vec<Keyframe>>,
}

impl TrackSnapshot {
    /// The property this track animates
    pub fn property(&self) -> PropertyTag {
        self.property
    }

    /// Keyframes in ascending time order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Interpolated value at an arbitrary time
    pub fn evaluate(&self, time: f64) -> f64 {
        curve::evaluate(self.property, &self.keyframes, time)
    }
}

/// Owner of all keyframes, one ordered track per property
#[derive(Debug, Clone)]
pub struct KeyframeStore {
    duration: f64,
    tracks: IndexMap<PropertyTag, Arc<Vec<Keyframe>>>,
}

impl KeyframeStore {
    /// Create a store for a clip of the given duration in seconds
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            tracks: IndexMap::new(),
        }
    }

    /// Clip duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Change the clip duration. Keyframes beyond the new end are
    /// clamped to it; where clamping would collide with an existing
    /// keyframe the out-of-range one is dropped instead.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);

        for (property, track) in &mut self.tracks {
            if track.last().map_or(true, |kf| kf.time <= self.duration) {
                continue;
            }

            let mut list: Vec<Keyframe> = Vec::with_capacity(track.len());
            for kf in track.iter() {
                let mut kf = kf.clone();
                if kf.time > self.duration {
                    kf.time = self.duration;
                }
                if list.last().is_some_and(|prev: &Keyframe| prev.time >= kf.time) {
                    tracing::warn!(
                        ?property,
                        time = kf.time,
                        "dropping keyframe clamped onto an occupied time"
                    );
                    continue;
                }
                list.push(kf);
            }
            *track = Arc::new(list);
        }
    }

    /// Add a keyframe. Time is clamped to `[0, duration]` and value to
    /// the property range; an existing keyframe at the exact clamped
    /// time is a hard [`StoreError::DuplicateTime`] failure rather than
    /// a silent overwrite.
    pub fn add(&mut self, property: PropertyTag, time: f64, value: f64) -> Result<KeyframeId> {
        let time = self.clamp_time(property, time);
        let value = clamp_value(property, value);

        let track = self.tracks.entry(property).or_default();
        let index = match track.binary_search_by(|kf| kf.time.total_cmp(&time)) {
            Ok(_) => return Err(StoreError::DuplicateTime { property, time }),
            Err(index) => index,
        };

        let kf = Keyframe::new(property, time, value);
        let id = kf.id;
        let mut list = (**track).clone();
        list.insert(index, kf);
        *track = Arc::new(list);
        Ok(id)
    }

    /// Add a keyframe with the midpoint of the property range as value
    pub fn add_default(&mut self, property: PropertyTag, time: f64) -> Result<KeyframeId> {
        self.add(property, time, property.range().midpoint())
    }

    /// Change a keyframe's value, clamped to the property range. Time
    /// and ordering are unaffected.
    pub fn update(&mut self, id: KeyframeId, value: f64) -> Result<()> {
        let (property, index) = self.locate(id)?;
        let value = clamp_value(property, value);

        let track = &mut self.tracks[&property];
        let mut list = (**track).clone();
        list[index].value = value;
        *track = Arc::new(list);
        Ok(())
    }

    /// Change a keyframe's easing towards its successor
    pub fn set_easing(&mut self, id: KeyframeId, easing: EasingKind) -> Result<()> {
        let (property, index) = self.locate(id)?;

        let track = &mut self.tracks[&property];
        let mut list = (**track).clone();
        list[index].easing = easing;
        *track = Arc::new(list);
        Ok(())
    }

    /// Move a keyframe to a new time, clamped to `[0, duration]`. If
    /// the clamped time is occupied by a different keyframe of the same
    /// property the move fails with [`StoreError::TimeCollision`] and
    /// nothing changes. Returns the stored time.
    pub fn move_keyframe(&mut self, id: KeyframeId, new_time: f64) -> Result<f64> {
        let (property, index) = self.locate(id)?;
        let new_time = self.clamp_time(property, new_time);

        let track = &mut self.tracks[&property];
        if track
            .iter()
            .any(|kf| kf.id != id && kf.time == new_time)
        {
            return Err(StoreError::TimeCollision {
                property,
                time: new_time,
            });
        }

        let mut list = (**track).clone();
        let mut kf = list.remove(index);
        kf.time = new_time;
        let insert_at = list
            .binary_search_by(|other| other.time.total_cmp(&new_time))
            .unwrap_or_else(|index| index);
        list.insert(insert_at, kf);
        *track = Arc::new(list);
        Ok(new_time)
    }

    /// Delete a keyframe. Deleting an unknown id is a no-op; the UI
    /// routinely double-invokes delete handlers.
    pub fn delete(&mut self, id: KeyframeId) {
        if let Ok((property, index)) = self.locate(id) {
            let track = &mut self.tracks[&property];
            let mut list = (**track).clone();
            list.remove(index);
            *track = Arc::new(list);
        }
    }

    /// Keyframes of one property in ascending time order
    pub fn query(&self, property: PropertyTag) -> &[Keyframe] {
        self.tracks.get(&property).map_or(&[], |track| &track[..])
    }

    /// Immutable snapshot of one property track, safe to evaluate from
    /// another cadence while the store keeps mutating
    pub fn snapshot(&self, property: PropertyTag) -> TrackSnapshot {
        TrackSnapshot {
            property,
            keyframes: self.tracks.get(&property).cloned().unwrap_or_default(),
        }
    }

    /// Interpolated value of a property at an arbitrary time
    pub fn evaluate(&self, property: PropertyTag, time: f64) -> f64 {
        curve::evaluate(property, self.query(property), time)
    }

    /// Look up a keyframe by id
    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.tracks
            .values()
            .find_map(|track| track.iter().find(|kf| kf.id == id))
    }

    /// Whether the store contains a keyframe with this id
    pub fn contains(&self, id: KeyframeId) -> bool {
        self.keyframe(id).is_some()
    }

    /// Remove every keyframe of one property
    pub fn clear(&mut self, property: PropertyTag) {
        self.tracks.swap_remove(&property);
    }

    /// Properties that currently have at least one keyframe, in
    /// first-animated order
    pub fn animated_properties(&self) -> impl Iterator<Item = PropertyTag> + '_ {
        self.tracks
            .iter()
            .filter(|(_, track)| !track.is_empty())
            .map(|(property, _)| *property)
    }

    /// Serializable records of one property track, in time order
    pub fn export_track(&self, property: PropertyTag) -> Vec<KeyframeRecord> {
        self.query(property).iter().map(KeyframeRecord::from).collect()
    }

    /// Replace one property track from serialized records. Records are
    /// clamped and re-sorted; fresh ids are assigned. Two records
    /// landing on the same clamped time is a [`StoreError::DuplicateTime`]
    /// failure and the track is left unchanged.
    pub fn import_track(
        &mut self,
        property: PropertyTag,
        records: Vec<KeyframeRecord>,
    ) -> Result<()> {
        let mut list: Vec<Keyframe> = Vec::with_capacity(records.len());
        for record in records {
            let mut kf = record.into_keyframe(property);
            kf.time = self.clamp_time(property, kf.time);
            kf.value = clamp_value(property, kf.value);
            list.push(kf);
        }
        list.sort_by(|a, b| a.time.total_cmp(&b.time));

        if let Some(window) = list.windows(2).find(|w| w[0].time == w[1].time) {
            return Err(StoreError::DuplicateTime {
                property,
                time: window[0].time,
            });
        }

        self.tracks.insert(property, Arc::new(list));
        Ok(())
    }

    /// Find a keyframe's track and position within it
    fn locate(&self, id: KeyframeId) -> Result<(PropertyTag, usize)> {
        for (property, track) in &self.tracks {
            if let Some(index) = track.iter().position(|kf| kf.id == id) {
                return Ok((*property, index));
            }
        }
        Err(StoreError::KeyframeNotFound(id))
    }

    fn clamp_time(&self, property: PropertyTag, time: f64) -> f64 {
        let clamped = time.clamp(0.0, self.duration);
        if clamped != time {
            tracing::debug!(?property, requested = time, stored = clamped, "time clamped");
        }
        clamped
    }
}

fn clamp_value(property: PropertyTag, value: f64) -> f64 {
    let clamped = property.range().clamp(value);
    if clamped != value {
        tracing::debug!(?property, requested = value, stored = clamped, "value clamped");
    }
    clamped
}
