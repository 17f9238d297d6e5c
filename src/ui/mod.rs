//! Terminal UI layer for the interactive joke screen.
//!
//! - [`event_loop`]: input polling, request dispatch, and redraws.
//! - [`renderer`]: frame composition from controller state.
//! - [`keybindings`]: key-to-action mapping.
//! - [`lifecycle`]: raw mode and alternate screen setup and teardown.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns the session rules and backend coordination.

pub mod event_loop;
pub mod keybindings;
pub mod lifecycle;
pub mod renderer;
