// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe animation engine for the ClipMotion timeline.
//!
//! This crate provides the computation core behind the property
//! editors (opacity, scale, rotation, position, volume, color):
//! - Time-ordered keyframe storage with clamping invariants
//! - Per-segment easing-curve construction and evaluation
//! - Bidirectional time/value ↔ pixel mapping for curve graphs
//! - Selection state and an interactive drag-edit state machine
//!
//! ## Architecture
//!
//! The engine is a dependency-free data module consumed by the editor
//! UI and the preview compositor:
//! - [`KeyframeStore`] owns all keyframes and is the only mutator;
//!   every mutation swaps in a fresh immutable track list
//! - [`curve`] evaluates tracks purely over immutable snapshots, safe
//!   to call from a render tick without synchronization
//! - [`EditSession`] coordinates drag gestures against the store with
//!   live preview and atomic commit/rollback

pub mod curve;
pub mod keyframe;
pub mod mapper;
pub mod property;
pub mod selection;
pub mod session;
pub mod store;

pub use curve::{control_points, cubic_bezier, AnimationSegment};
pub use keyframe::{EasingKind, Keyframe, KeyframeId, KeyframeRecord};
pub use mapper::GraphMapper;
pub use property::{PropertyRange, PropertyTag};
pub use selection::SelectionController;
pub use session::{EditSession, SessionError, SessionPhase};
pub use store::{KeyframeStore, StoreError, TrackSnapshot};
