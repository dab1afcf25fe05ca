//! Host-driven property tweening for position-like targets.
//!
//! A [`TweenScheduler`] owns every scheduled animation record; the host calls
//! [`TweenScheduler::tick`] with a monotonic millisecond clock once per frame and polls
//! [`TweenScheduler::has_work`] to keep its frame loop lazy. A [`Tweener`] schedules
//! tweens declaratively (`to`, `from`, `from_to`, groups, and reusable `quick_to`
//! retargeters) against anything implementing [`Positionable`].
//!
//! Everything is single-threaded and synchronous. Completion is signalled through
//! [`Finished`], which resolves exactly once; cancellation is an ordinary result, not
//! an error.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod control;
mod easing;
mod error;
mod options;
mod quick;
mod record;
mod scheduler;
mod slab;
mod target;
mod tweener;


pub use control::{Finished, TweenControl, TweenGroupControl, TweenResult};
pub use easing::{Ease, Easing, Interpolate};
pub use error::TweenError;
pub use options::{Strategy, TweenOptions};
pub use quick::QuickTo;
pub use scheduler::{RecordInfo, TweenScheduler};
pub use target::{Positionable, Props, Target};
pub use tweener::{GroupContext, GroupValue, Tweener};
