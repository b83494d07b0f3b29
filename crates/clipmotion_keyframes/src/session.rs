// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive drag-edit sessions.
//!
//! One [`EditSession`] covers the lifetime of a single drag gesture on
//! a keyframe handle: `Idle → Dragging → {committed, cancelled} → Idle`.
//! While dragging, candidate positions are written into the store as
//! live previews, with the candidate time clamped to the open interval
//! between the keyframe's neighbors so no intermediate write can violate
//! the track ordering. Cancelling restores the pre-drag snapshot, so an
//! interrupted drag never leaves a partial edit behind.

use crate::keyframe::KeyframeId;
use crate::mapper::GraphMapper;
use crate::property::PropertyTag;
use crate::selection::SelectionController;
use crate::store::{KeyframeStore, StoreError};
use thiserror::Error;

/// Margin keeping a dragged keyframe strictly between its neighbors
const NEIGHBOR_MARGIN: f64 = 1e-4;

/// Session errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// `begin` was called while a drag is already in progress
    #[error("a drag is already in progress")]
    AlreadyDragging,

    /// `drag_to`/`commit`/`cancel` was called with no drag in progress
    #[error("no drag in progress")]
    NotDragging,

    /// The dragged keyframe disappeared from the store
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Observable state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No gesture in progress
    #[default]
    Idle,
    /// A keyframe handle is being dragged
    Dragging,
}

/// Pre-drag snapshot plus live preview of the dragged keyframe
#[derive(Debug, Clone)]
struct DragState {
    id: KeyframeId,
    property: PropertyTag,
    /// Pre-drag position, restored on cancel
    origin_time: f64,
    origin_value: f64,
    /// Pixel position of the handle when the gesture started
    grab_x: f64,
    grab_y: f64,
    /// Allowed time window, strictly inside the neighbor times
    min_time: f64,
    max_time: f64,
    /// Last position written into the store
    preview_time: f64,
    preview_value: f64,
}

/// Drag-edit state machine for one keyframe handle
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    drag: Option<DragState>,
}

impl EditSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        if self.drag.is_some() {
            SessionPhase::Dragging
        } else {
            SessionPhase::Idle
        }
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The keyframe being dragged, if any
    pub fn dragged_keyframe(&self) -> Option<KeyframeId> {
        self.drag.as_ref().map(|drag| drag.id)
    }

    /// Start a drag on a keyframe handle. Ensures the keyframe is
    /// selected and snapshots its pre-drag position for rollback.
    pub fn begin(
        &mut self,
        store: &KeyframeStore,
        selection: &mut SelectionController,
        mapper: &GraphMapper,
        id: KeyframeId,
    ) -> Result<()> {
        if self.drag.is_some() {
            return Err(SessionError::AlreadyDragging);
        }
        let kf = store
            .keyframe(id)
            .ok_or(StoreError::KeyframeNotFound(id))?;

        selection.select(id);

        // Neighbor times are fixed for the whole gesture: only the
        // dragged keyframe moves while the session is live.
        let track = store.query(kf.property);
        let min_time = track
            .iter()
            .filter(|other| other.id != id && other.time < kf.time)
            .map(|other| other.time + NEIGHBOR_MARGIN)
            .fold(0.0, f64::max);
        let max_time = track
            .iter()
            .filter(|other| other.id != id && other.time > kf.time)
            .map(|other| other.time - NEIGHBOR_MARGIN)
            .fold(store.duration(), f64::min);

        let (grab_x, grab_y) = mapper.time_value_to_point(kf.time, kf.value);
        self.drag = Some(DragState {
            id,
            property: kf.property,
            origin_time: kf.time,
            origin_value: kf.value,
            grab_x,
            grab_y,
            min_time,
            max_time,
            preview_time: kf.time,
            preview_value: kf.value,
        });
        Ok(())
    }

    /// Apply the cumulative pointer delta since the gesture started and
    /// write the resulting position into the store as a live preview.
    /// Returns the previewed `(time, value)` actually stored.
    pub fn drag_to(
        &mut self,
        store: &mut KeyframeStore,
        mapper: &GraphMapper,
        delta_x: f64,
        delta_y: f64,
    ) -> Result<(f64, f64)> {
        let Some(drag) = self.drag.as_mut() else {
            return Err(SessionError::NotDragging);
        };

        let (candidate_time, candidate_value) =
            mapper.point_to_time_value(drag.grab_x + delta_x, drag.grab_y + delta_y);

        // Keep the candidate strictly between the neighbors; when the
        // window collapsed (neighbors closer than the margin) hold the
        // original time.
        let candidate_time = if drag.min_time <= drag.max_time {
            candidate_time.clamp(drag.min_time, drag.max_time)
        } else {
            drag.origin_time
        };

        match store.update(drag.id, candidate_value) {
            Ok(()) => {}
            Err(err @ StoreError::KeyframeNotFound(_)) => {
                // Keyframe vanished under the gesture; abandon the drag.
                self.drag = None;
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        }

        match store.move_keyframe(drag.id, candidate_time) {
            Ok(stored) => drag.preview_time = stored,
            // The clamp above makes collisions unreachable short of a
            // rounding edge at the margin; keep the last valid preview.
            Err(StoreError::TimeCollision { .. }) => {}
            Err(err) => return Err(err.into()),
        }
        drag.preview_value = store
            .keyframe(drag.id)
            .map(|kf| kf.value)
            .unwrap_or(candidate_value);

        Ok((drag.preview_time, drag.preview_value))
    }

    /// Finalize the drag. The last valid preview becomes the committed
    /// position; a collision at the very boundary falls back to it.
    /// Returns the committed `(time, value)`.
    pub fn commit(&mut self, store: &mut KeyframeStore) -> Result<(f64, f64)> {
        let Some(drag) = self.drag.take() else {
            return Err(SessionError::NotDragging);
        };

        match store.move_keyframe(drag.id, drag.preview_time) {
            Ok(_) => {}
            Err(StoreError::TimeCollision { .. }) => {
                tracing::debug!(id = ?drag.id, "commit collided, keeping last preview");
            }
            Err(err) => return Err(err.into()),
        }

        let kf = store
            .keyframe(drag.id)
            .ok_or(StoreError::KeyframeNotFound(drag.id))?;
        Ok((kf.time, kf.value))
    }

    /// Abort the drag and restore the pre-drag position, guaranteeing
    /// no partial edit survives.
    pub fn cancel(&mut self, store: &mut KeyframeStore) -> Result<()> {
        let Some(drag) = self.drag.take() else {
            return Err(SessionError::NotDragging);
        };

        store.update(drag.id, drag.origin_value)?;
        // The origin slot cannot be occupied: no other keyframe of the
        // track moved during the session.
        store.move_keyframe(drag.id, drag.origin_time)?;
        tracing::debug!(id = ?drag.id, property = ?drag.property, "drag cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 1000.0;
    const HEIGHT: f64 = 100.0;
    const DURATION: f64 = 10.0;

    fn setup() -> (KeyframeStore, SelectionController, GraphMapper) {
        let mut store = KeyframeStore::new(DURATION);
        store.add(PropertyTag::Opacity, 0.0, 0.0).unwrap();
        store.add(PropertyTag::Opacity, 2.0, 1.0).unwrap();
        store.add(PropertyTag::Opacity, 6.0, 0.5).unwrap();
        let mapper = GraphMapper::for_property(WIDTH, HEIGHT, DURATION, PropertyTag::Opacity);
        (store, SelectionController::new(), mapper)
    }

    fn id_at(store: &KeyframeStore, time: f64) -> KeyframeId {
        store
            .query(PropertyTag::Opacity)
            .iter()
            .find(|kf| kf.time == time)
            .map(|kf| kf.id)
            .unwrap()
    }

    #[test]
    fn test_begin_selects_and_enters_dragging() {
        let (store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();

        assert_eq!(session.phase(), SessionPhase::Dragging);
        assert_eq!(session.dragged_keyframe(), Some(b));
        assert!(selection.is_selected(b));
    }

    #[test]
    fn test_begin_twice_fails() {
        let (store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();
        assert_eq!(
            session.begin(&store, &mut selection, &mapper, b),
            Err(SessionError::AlreadyDragging)
        );
    }

    #[test]
    fn test_begin_unknown_keyframe_fails() {
        let (store, mut selection, mapper) = setup();
        let ghost = KeyframeId::new();
        let mut session = EditSession::new();
        let err = session
            .begin(&store, &mut selection, &mapper, ghost)
            .unwrap_err();
        assert_eq!(err, SessionError::Store(StoreError::KeyframeNotFound(ghost)));
    }

    #[test]
    fn test_drag_without_begin_fails() {
        let (mut store, _, mapper) = setup();
        let mut session = EditSession::new();
        assert_eq!(
            session.drag_to(&mut store, &mapper, 10.0, 0.0),
            Err(SessionError::NotDragging)
        );
        assert_eq!(session.commit(&mut store), Err(SessionError::NotDragging));
        assert_eq!(session.cancel(&mut store), Err(SessionError::NotDragging));
    }

    #[test]
    fn test_drag_previews_into_store() {
        let (mut store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();

        // 100 px right = +1 s, 20 px down = -0.2 opacity
        let (time, value) = session.drag_to(&mut store, &mapper, 100.0, 20.0).unwrap();
        assert!((time - 3.0).abs() < 1e-9);
        assert!((value - 0.8).abs() < 1e-9);

        let kf = store.keyframe(b).unwrap();
        assert_eq!(kf.time, time);
        assert_eq!(kf.value, value);
    }

    #[test]
    fn test_drag_is_clamped_between_neighbors() {
        let (mut store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();

        // 1000 px right would be t = 12, past the neighbor at 6.0
        let (time, _) = session.drag_to(&mut store, &mapper, 1000.0, 0.0).unwrap();
        assert!(time < 6.0);
        assert!(time > 6.0 - 1e-3);

        // Far left stays above the neighbor at 0.0
        let (time, _) = session.drag_to(&mut store, &mapper, -5000.0, 0.0).unwrap();
        assert!(time > 0.0);

        // Ordering invariant held throughout
        let times: Vec<f64> = store
            .query(PropertyTag::Opacity)
            .iter()
            .map(|kf| kf.time)
            .collect();
        for w in times.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_drag_value_is_clamped_to_range() {
        let (mut store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();

        let (_, value) = session.drag_to(&mut store, &mapper, 0.0, -500.0).unwrap();
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_commit_keeps_final_position() {
        let (mut store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();
        session.drag_to(&mut store, &mapper, 150.0, 0.0).unwrap();
        let (time, value) = session.commit(&mut store).unwrap();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!((time - 3.5).abs() < 1e-9);
        let kf = store.keyframe(b).unwrap();
        assert_eq!(kf.time, time);
        assert_eq!(kf.value, value);
    }

    #[test]
    fn test_cancel_restores_pre_drag_state() {
        let (mut store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();
        session.drag_to(&mut store, &mapper, 250.0, 30.0).unwrap();
        // Preview is visible mid-drag
        assert_ne!(store.keyframe(b).unwrap().time, 2.0);

        session.cancel(&mut store).unwrap();
        assert_eq!(session.phase(), SessionPhase::Idle);

        let kf = store.keyframe(b).unwrap();
        assert_eq!(kf.time, 2.0);
        assert_eq!(kf.value, 1.0);
    }

    #[test]
    fn test_keyframe_deleted_mid_drag_abandons_session() {
        let (mut store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();
        store.delete(b);

        let err = session.drag_to(&mut store, &mapper, 10.0, 0.0).unwrap_err();
        assert_eq!(err, SessionError::Store(StoreError::KeyframeNotFound(b)));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_session_is_reusable_after_commit() {
        let (mut store, mut selection, mapper) = setup();
        let b = id_at(&store, 2.0);

        let mut session = EditSession::new();
        session.begin(&store, &mut selection, &mapper, b).unwrap();
        session.drag_to(&mut store, &mapper, 50.0, 0.0).unwrap();
        session.commit(&mut store).unwrap();

        let a = id_at(&store, 0.0);
        session.begin(&store, &mut selection, &mapper, a).unwrap();
        session.cancel(&mut store).unwrap();
        assert_eq!(store.keyframe(a).unwrap().time, 0.0);
    }
}
