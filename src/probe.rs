/// An ownership transition on a payload+counter pair.
///
/// The reported count is the number of owners *after* the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// A fresh pair was allocated; the count starts at 1.
    Allocated,
    /// An instance began sharing an existing pair.
    Attached,
    /// An instance stopped sharing a pair that still has other owners.
    Detached,
    /// The last owner released the pair; payload and counter are gone.
    Freed,
}

/// A statically-dispatched observer for ownership transitions.
///
/// [`Shared<T, P>`](crate::Shared) reports every transition on its pair to
/// `P::on_event` together with the address of the pair and the owner count
/// after the transition. The default body does nothing, so a probe only pays
/// for what it overrides; with the default [`Silent`] probe the calls compile
/// away entirely. A probe must not change functional behavior, it only
/// observes.
///
/// # Examples
///
/// ```
/// use sharelite::{Event, Probe, Shared};
///
/// struct Stderr;
///
/// impl Probe for Stderr {
///     fn on_event(event: Event, payload: *const (), count: usize) {
///         eprintln!("{:?} | {:p} | {} owner(s)", event, payload, count);
///     }
/// }
///
/// let p: Shared<String, Stderr> = Shared::probed("tracked".to_owned());
/// let q = p.clone(); // reports Attached with a count of 2
/// ```
pub trait Probe {
    /// Called at each ownership transition of a pair.
    #[allow(unused_variables)]
    fn on_event(event: Event, payload: *const (), count: usize) {}
}

/// The default probe: ignores every transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Probe for Silent {}
