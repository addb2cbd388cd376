//! Screen visibility router.
//!
//! Full-page scroll navigation reports which screen became visible; every
//! set bound to that screen runs and every other bound set stops.

use log::debug;

use crate::shared::SharedAnimationSet;

#[derive(Clone)]
struct Binding {
    screen: String,
    set: SharedAnimationSet,
}

/// Maps screen ids to the animation sets that play on them.
#[derive(Clone, Default)]
pub struct ScreenRouter {
    bindings: Vec<Binding>,
    active: Option<String>,
}

impl ScreenRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `set` to `screen`. A set may be bound to several screens; it
    /// keeps running when navigation moves between two of them.
    pub fn bind(&mut self, screen: impl Into<String>, set: SharedAnimationSet) -> &mut Self {
        self.bindings.push(Binding {
            screen: screen.into(),
            set,
        });
        self
    }

    /// The screen most recently shown, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Sets bound to `screen`, in binding order.
    pub fn sets_for<'a>(&'a self, screen: &'a str) -> impl Iterator<Item = &'a SharedAnimationSet> {
        self.bindings
            .iter()
            .filter(move |b| b.screen == screen)
            .map(|b| &b.set)
    }

    /// React to `screen` becoming visible at `now`. Showing the already
    /// active screen again does nothing.
    pub fn show(&mut self, screen: &str, now: f64) {
        if self.active.as_deref() == Some(screen) {
            return;
        }
        debug!(
            "screen change {:?} -> {screen}",
            self.active.as_deref().unwrap_or("<none>")
        );

        let incoming: Vec<SharedAnimationSet> = self.sets_for(screen).cloned().collect();
        let stays_visible = |set: &SharedAnimationSet| incoming.iter().any(|s| s.ptr_eq(set));

        for binding in &self.bindings {
            if !stays_visible(&binding.set) {
                binding.set.stop();
            }
        }

        // Sets shared with the previous screen keep their run; a set that
        // stopped itself there starts over.
        for (idx, set) in incoming.iter().enumerate() {
            let already_seen = incoming[..idx].iter().any(|s| s.ptr_eq(set));
            if !already_seen && !set.is_running() {
                set.start(now);
            }
        }

        self.active = Some(screen.to_string());
    }

    /// Every screen became hidden (page unload, tab hidden).
    pub fn hide_all(&mut self) {
        for binding in &self.bindings {
            binding.set.stop();
        }
        self.active = None;
    }
}
