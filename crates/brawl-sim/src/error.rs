use brawl_core::types::EntityId;
use thiserror::Error;

/// Failures of direct engine operations. None of them are fatal: the engine
/// state is unchanged when one is returned.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("entity {0} is no longer active")]
    Inactive(EntityId),

    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },

    #[error("unknown stat `{0}`")]
    UnknownStat(String),

    #[error("unknown attack `{0}`")]
    UnknownAttack(String),

    #[error("unknown status effect `{0}`")]
    UnknownEffect(String),
}
