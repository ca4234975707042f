//! Keyboard focus containment for the open dialog.
//!
//! The trap owns at most one installed key listener; the listener type removes
//! itself from the document when dropped. Key decisions are made here against
//! a focusable list that the caller computes fresh for every key press, since
//! toggling between login and signup changes which fields are visible.

/// Keys the trap cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapKey {
    Escape,
    Tab { backwards: bool },
    Other,
}

impl TrapKey {
    /// Maps a `KeyboardEvent.key` value plus the shift state.
    pub fn from_key(key: &str, shift: bool) -> Self {
        match key {
            "Escape" | "Esc" => TrapKey::Escape,
            "Tab" => TrapKey::Tab { backwards: shift },
            _ => TrapKey::Other,
        }
    }
}

/// What the key handler should do with the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapAction {
    /// Let the browser handle the key.
    Ignore,
    /// Prevent the default action without moving focus.
    Suppress,
    /// Prevent the default action and close the dialog.
    Close,
    /// Prevent the default action and focus the focusable at this index.
    MoveTo(usize),
}

impl TrapAction {
    pub fn prevents_default(self) -> bool {
        !matches!(self, TrapAction::Ignore)
    }
}

/// Decides how a key press is handled while the trap is active.
pub fn decide<F: PartialEq>(key: TrapKey, focusables: &[F], active: Option<&F>) -> TrapAction {
    let backwards = match key {
        TrapKey::Escape => return TrapAction::Close,
        TrapKey::Other => return TrapAction::Ignore,
        TrapKey::Tab { backwards } => backwards,
    };

    let Some(last) = focusables.len().checked_sub(1) else {
        return TrapAction::Suppress;
    };

    let position = active.and_then(|active| focusables.iter().position(|item| item == active));
    match (position, backwards) {
        (None, false) => TrapAction::MoveTo(0),
        (None, true) => TrapAction::MoveTo(last),
        (Some(0), true) => TrapAction::MoveTo(last),
        (Some(index), false) if index == last => TrapAction::MoveTo(0),
        (Some(_), _) => TrapAction::Ignore,
    }
}

/// Holds the installed key listener while the dialog is open.
pub struct FocusTrap<L> {
    listener: Option<L>,
}

impl<L> Default for FocusTrap<L> {
    fn default() -> Self {
        Self { listener: None }
    }
}

impl<L> FocusTrap<L> {
    /// Installs the listener unless one is already active.
    pub fn activate(&mut self, install: impl FnOnce() -> L) {
        if self.listener.is_none() {
            self.listener = Some(install());
        }
    }

    /// Drops the listener, which uninstalls it.
    pub fn deactivate(&mut self) {
        self.listener = None;
    }

    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }
}
