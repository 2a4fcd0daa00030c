//! Callback types stored in the registry

/// Result every callback returns.
///
/// An `Err` is a consumer fault: the poller logs it, counts it, forwards it
/// to the failure hook and keeps polling.
pub type CallbackResult = Result<(), CallbackError>;

/// Failure reported by a registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallbackError {
    /// Consumer could not act on the notification right now
    Busy,
    /// Consumer was not in a state where the notification makes sense
    InvalidState,
    /// Application-defined failure code
    Code(u16),
}

impl core::fmt::Display for CallbackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CallbackError::Busy => write!(f, "consumer busy"),
            CallbackError::InvalidState => write!(f, "consumer in invalid state"),
            CallbackError::Code(code) => write!(f, "consumer failed with code {code}"),
        }
    }
}

/// A registered handler, with its arguments if it takes any.
///
/// Function pointers keep the registry `no_std`, allocation-free and
/// `const`-constructible. State shared with the rest of the firmware lives in
/// statics (`Signal`, `Channel`, atomics); per-registration data goes in the
/// bound arguments, captured here when the callback is built.
#[derive(Clone)]
pub enum Callback<A> {
    /// Invoked with no arguments
    Plain(fn() -> CallbackResult),
    /// Invoked with the arguments bound at registration
    WithArgs(fn(&A) -> CallbackResult, A),
}

impl<A> Callback<A> {
    /// Bind `args` to `f`.
    pub const fn with_args(f: fn(&A) -> CallbackResult, args: A) -> Self {
        Callback::WithArgs(f, args)
    }

    /// Call the handler, passing the bound arguments if it takes them.
    pub fn invoke(&self) -> CallbackResult {
        match self {
            Callback::Plain(f) => f(),
            Callback::WithArgs(f, args) => f(args),
        }
    }

    /// The bound arguments, `None` for [`Callback::Plain`].
    pub fn args(&self) -> Option<&A> {
        match self {
            Callback::Plain(_) => None,
            Callback::WithArgs(_, args) => Some(args),
        }
    }
}

impl<A> core::fmt::Debug for Callback<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Callback::Plain(_) => f.write_str("Callback::Plain"),
            Callback::WithArgs(..) => f.write_str("Callback::WithArgs"),
        }
    }
}
