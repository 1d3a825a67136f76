//! State transitions derived from the override map at serialize time.

use serde::Serialize;

use crate::state::view::CaView;
use crate::state::KeyPath;
use crate::LayerId;

/// Wildcard state used on the open end of a derived transition.
pub const ANY_STATE: &str = "*";

/// Spring animation attached to every transitioned key path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpringAnimation {
    pub damping: f64,
    pub mass: f64,
    pub stiffness: f64,
    pub velocity: f64,
    pub duration: f64,
    pub fill_mode: &'static str,
}

pub const STATE_SPRING: SpringAnimation = SpringAnimation {
    damping: 50.0,
    mass: 2.0,
    stiffness: 300.0,
    velocity: 0.0,
    duration: 0.8,
    fill_mode: "backwards",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionElement {
    pub target_id: LayerId,
    pub key_path: KeyPath,
    pub animation: SpringAnimation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTransition {
    pub from: String,
    pub to: String,
    pub elements: Vec<TransitionElement>,
}

/// `* → state` and `state → *` for every named state, animating only the
/// transitioned key paths that state overrides.
pub fn derive_transitions(view: &CaView) -> Vec<StateTransition> {
    let mut out = Vec::with_capacity(view.state_names.len() * 2);
    for state in &view.state_names {
        let elements: Vec<TransitionElement> = view
            .overrides(state)
            .iter()
            .filter(|o| o.key_path.is_transitioned())
            .map(|o| TransitionElement {
                target_id: o.target_id.clone(),
                key_path: o.key_path,
                animation: STATE_SPRING,
            })
            .collect();
        out.push(StateTransition {
            from: ANY_STATE.to_string(),
            to: state.clone(),
            elements: elements.clone(),
        });
        out.push(StateTransition {
            from: state.clone(),
            to: ANY_STATE.to_string(),
            elements,
        });
    }
    out
}
