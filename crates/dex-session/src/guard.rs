use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// User-triggered actions that must not overlap with themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Connect,
    SwapAforB,
    SwapBforA,
    AddLiquidity,
    RemoveLiquidity,
    PriceLookup,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Connect => "connect",
            Action::SwapAforB => "swap A for B",
            Action::SwapBforA => "swap B for A",
            Action::AddLiquidity => "add liquidity",
            Action::RemoveLiquidity => "remove liquidity",
            Action::PriceLookup => "price lookup",
        };
        f.write_str(name)
    }
}

#[derive(Default)]
pub struct InFlight {
    active: Mutex<HashSet<Action>>,
}

impl InFlight {
    /// Marks `action` as running. Returns `None` if it already is.
    pub fn try_begin(&self, action: Action) -> Option<InFlightGuard<'_>> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(action) {
            return None;
        }
        Some(InFlightGuard {
            owner: self,
            action,
        })
    }

    #[cfg(test)]
    pub fn is_active(&self, action: Action) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&action)
    }
}

pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    action: Action,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.action);
    }
}
