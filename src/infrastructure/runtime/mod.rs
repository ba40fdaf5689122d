//! Runtime client implementations

mod state_file;

pub use state_file::{
    FaultKind, InjectedFault, RuntimeState, StateFileRuntime, StoredContainer, LABEL_NUMBER,
    LABEL_PROJECT, LABEL_SERVICE,
};
