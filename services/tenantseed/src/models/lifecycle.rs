use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid {entity} transition: `{event}` is not expected while `{phase}`")]
pub struct TransitionError {
    pub entity: &'static str,
    pub phase: String,
    pub event: String,
}

impl TransitionError {
    pub fn new<P: std::fmt::Debug, E: std::fmt::Debug>(
        entity: &'static str,
        phase: P,
        event: E,
    ) -> Self {
        Self {
            entity,
            phase: format!("{:?}", phase),
            event: format!("{:?}", event),
        }
    }
}
