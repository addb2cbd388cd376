//! Shared ownership of a set for hosts whose callbacks re-enter it.
//!
//! Pump closures, visibility listeners and clip callbacks all want to reach
//! the same set. While a tick is in flight the set is mutably borrowed, so
//! `start`/`stop` issued from inside it are parked in a [`SetControl`] slot
//! and applied as soon as the tick returns. The last command wins.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::debug;

use crate::outputs::TickReport;
use crate::set::AnimationSet;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Command {
    Start(f64),
    StartNow,
    Stop,
}

/// Deferred command slot. Cheap to clone; clip callbacks capture one of
/// these instead of a strong reference to the set they belong to.
#[derive(Clone, Default)]
pub struct SetControl {
    slot: Rc<Cell<Option<Command>>>,
}

impl SetControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_start(&self, now: f64) {
        self.slot.set(Some(Command::Start(now)));
    }

    pub fn request_start_now(&self) {
        self.slot.set(Some(Command::StartNow));
    }

    pub fn request_stop(&self) {
        self.slot.set(Some(Command::Stop));
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        let cmd = self.slot.take();
        let pending = cmd.is_some();
        self.slot.set(cmd);
        pending
    }

    fn take(&self) -> Option<Command> {
        self.slot.take()
    }
}

fn apply(set: &mut AnimationSet, cmd: Command) {
    match cmd {
        Command::Start(now) => set.start(now),
        Command::StartNow => set.start_now(),
        Command::Stop => set.stop(),
    }
}

/// Reference-counted handle to one [`AnimationSet`].
#[derive(Clone)]
pub struct SharedAnimationSet {
    inner: Rc<RefCell<AnimationSet>>,
    control: SetControl,
    // Last observed running state, readable while a tick holds the set.
    running: Rc<Cell<bool>>,
}

impl SharedAnimationSet {
    pub fn new(set: AnimationSet) -> Self {
        Self::with_control(set, SetControl::new())
    }

    /// Wrap a set whose callbacks already hold `control`.
    pub fn with_control(set: AnimationSet, control: SetControl) -> Self {
        Self {
            running: Rc::new(Cell::new(set.is_running())),
            inner: Rc::new(RefCell::new(set)),
            control,
        }
    }

    pub fn control(&self) -> SetControl {
        self.control.clone()
    }

    pub fn start(&self, now: f64) {
        self.run(Command::Start(now));
    }

    pub fn start_now(&self) {
        self.run(Command::StartNow);
    }

    pub fn stop(&self) {
        self.run(Command::Stop);
    }

    /// Forward a pump callback. Returns `None` if the set is already
    /// borrowed (a nested tick), which the pump treats as a dropped frame.
    pub fn tick(&self, now: f64) -> Option<TickReport> {
        let report = {
            let mut set = self.inner.try_borrow_mut().ok()?;
            let report = set.tick(now);
            self.running.set(set.is_running());
            report
        };
        self.flush();
        Some(report)
    }

    fn run(&self, cmd: Command) {
        match self.inner.try_borrow_mut() {
            Ok(mut set) => {
                // An older parked command is superseded by this direct one.
                self.control.take();
                apply(&mut set, cmd);
                self.running.set(set.is_running());
            }
            Err(_) => {
                debug!("animation set busy; deferring {cmd:?} until the tick returns");
                self.control.slot.set(Some(cmd));
            }
        }
    }

    /// Apply commands parked by callbacks during the last tick.
    pub fn flush(&self) {
        while let Some(cmd) = self.control.take() {
            match self.inner.try_borrow_mut() {
                Ok(mut set) => {
                    apply(&mut set, cmd);
                    self.running.set(set.is_running());
                }
                Err(_) => {
                    self.control.slot.set(Some(cmd));
                    return;
                }
            }
        }
    }

    /// Running state. While a tick is in flight this is the state the tick
    /// started with; a stop requested from inside it shows once it returns.
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Inspect the set. `None` while a tick is in flight.
    pub fn with<R>(&self, f: impl FnOnce(&AnimationSet) -> R) -> Option<R> {
        self.inner.try_borrow().ok().map(|set| f(&set))
    }

    pub fn downgrade(&self) -> WeakAnimationSet {
        WeakAnimationSet {
            inner: Rc::downgrade(&self.inner),
            control: self.control.clone(),
            running: self.running.clone(),
        }
    }

    /// Both handles drive the same set.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Non-owning handle for pump closures; does not keep the set alive.
#[derive(Clone)]
pub struct WeakAnimationSet {
    inner: Weak<RefCell<AnimationSet>>,
    control: SetControl,
    running: Rc<Cell<bool>>,
}

impl WeakAnimationSet {
    pub fn upgrade(&self) -> Option<SharedAnimationSet> {
        self.inner.upgrade().map(|inner| SharedAnimationSet {
            inner,
            control: self.control.clone(),
            running: self.running.clone(),
        })
    }
}
