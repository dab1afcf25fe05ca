/// Errors raised while building a tween. Scheduling itself never fails; invalid group
/// entries degrade to warnings and skipped members.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TweenError {
    #[error("unknown easing name: {0:?}")]
    UnknownEasing(String),

    #[error("a tween needs at least one property key")]
    NoKeys,
}
