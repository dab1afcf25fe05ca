#[cfg(feature = "tracing")]
macro_rules! ttrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "position_tween", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! ttrace {
    // Expands to a unit block so call sites work in expression position.
    ($($tt:tt)*) => {{}};
}

#[cfg(feature = "tracing")]
macro_rules! tdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "position_tween", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! tdebug {
    ($($tt:tt)*) => {{}};
}

#[cfg(feature = "tracing")]
macro_rules! twarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "position_tween", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! twarn {
    ($($tt:tt)*) => {{}};
}
