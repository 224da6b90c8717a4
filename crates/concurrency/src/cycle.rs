//! Invocation cycle state machine
//!
//! Every executor adapter is reused across invocations. Each invocation is one
//! cycle through:
//!
//! ```text
//!   Idle ──arm──▶ Armed ──host pickup──▶ Executing ──signal──▶ Completed
//!    ▲              │                                             │
//!    └──disarm──────┘ (scheduling refused)                        │
//!    └─────────────────────────retire─────────────────────────────┘
//! ```
//!
//! Two parties finish a cycle: the host (by reaching `Completed`) and the
//! caller (by reading the result or abandoning the wait, recorded as the
//! `released` flag). `Completed → Idle` is taken by whichever finishes last.
//! Until then the adapter cannot be re-armed, which is what makes a second
//! invocation observe `Busy` instead of a stale or foreign result.
//!
//! The phase and the flag share one atomic, so the host's finish and the
//! caller's release cannot both miss each other.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

const PHASE_MASK: u8 = 0b011;
const RELEASED: u8 = 0b100;

/// Phase of an adapter's current invocation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleState {
    /// No request pending; may be armed
    Idle,
    /// Request set and scheduled; host has not picked it up
    Armed,
    /// Host thread is running the operation
    Executing,
    /// Host finished and signaled; caller has not released yet
    Completed,
}

impl CycleState {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: CycleState) -> bool {
        use CycleState::*;
        matches!(
            (self, next),
            (Idle, Armed)
                | (Armed, Executing)
                | (Armed, Idle)
                | (Executing, Completed)
                | (Completed, Idle)
        )
    }

    fn from_bits(bits: u8) -> CycleState {
        match bits & PHASE_MASK {
            0 => CycleState::Idle,
            1 => CycleState::Armed,
            2 => CycleState::Executing,
            _ => CycleState::Completed,
        }
    }

    fn bits(self) -> u8 {
        match self {
            CycleState::Idle => 0,
            CycleState::Armed => 1,
            CycleState::Executing => 2,
            CycleState::Completed => 3,
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleState::Idle => "idle",
            CycleState::Armed => "armed",
            CycleState::Executing => "executing",
            CycleState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of a [`CycleCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSnapshot {
    /// Current phase
    pub state: CycleState,
    /// Caller has finished with this cycle (read or abandoned)
    pub released: bool,
}

impl CycleSnapshot {
    fn from_bits(bits: u8) -> Self {
        CycleSnapshot {
            state: CycleState::from_bits(bits),
            released: bits & RELEASED != 0,
        }
    }

    /// The caller stopped waiting before the host finished.
    pub fn is_abandoned(&self) -> bool {
        self.released && self.state != CycleState::Idle
    }
}

/// Outcome of [`CycleCell::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Host had already finished; the cycle is back to `Idle`.
    Retired,
    /// Host still owns the cycle; it retires the cycle when it finishes.
    Deferred,
}

/// Atomic holder of a cycle's phase and release flag.
#[derive(Debug)]
pub struct CycleCell {
    bits: AtomicU8,
}

impl Default for CycleCell {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleCell {
    /// A fresh cell in `Idle`.
    pub fn new() -> Self {
        CycleCell {
            bits: AtomicU8::new(CycleState::Idle.bits()),
        }
    }

    /// Current phase and flag.
    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Current phase.
    pub fn state(&self) -> CycleState {
        self.snapshot().state
    }

    /// `Idle → Armed`. Fails with the observed snapshot when not idle.
    pub fn arm(&self) -> Result<(), CycleSnapshot> {
        self.bits
            .compare_exchange(
                CycleState::Idle.bits(),
                CycleState::Armed.bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(CycleSnapshot::from_bits)
    }

    /// `Armed → Idle`, used when the host refused to schedule the cycle.
    pub fn disarm(&self) -> Result<(), CycleSnapshot> {
        self.step(CycleState::Armed, CycleState::Idle).map(|_| ())
    }

    /// `Armed → Executing` on host pickup. Returns whether the caller had
    /// already released (abandoned) the cycle.
    pub fn begin_execution(&self) -> Result<bool, CycleSnapshot> {
        self.step(CycleState::Armed, CycleState::Executing)
            .map(|prev| prev.released)
    }

    /// `Executing → Completed`, then `Completed → Idle` when the caller has
    /// already released. Returns the release outcome from the host's side.
    pub fn finish_execution(&self) -> Result<Release, CycleSnapshot> {
        let prev = self.step(CycleState::Executing, CycleState::Completed)?;
        if prev.released {
            // Caller is gone; nobody else touches a released Completed cycle.
            self.bits
                .store(CycleState::Idle.bits(), Ordering::Release);
            Ok(Release::Retired)
        } else {
            Ok(Release::Deferred)
        }
    }

    /// Caller is finished with the cycle (result read, or wait abandoned).
    ///
    /// From `Completed` this retires the cycle to `Idle`. From `Armed` or
    /// `Executing` it records the release so the host retires it later.
    pub fn release(&self) -> Result<Release, CycleSnapshot> {
        let mut outcome = Release::Deferred;
        let result = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                let snap = CycleSnapshot::from_bits(bits);
                if snap.released {
                    return None;
                }
                match snap.state {
                    CycleState::Completed => {
                        outcome = Release::Retired;
                        Some(CycleState::Idle.bits())
                    }
                    CycleState::Armed | CycleState::Executing => {
                        outcome = Release::Deferred;
                        Some(bits | RELEASED)
                    }
                    CycleState::Idle => None,
                }
            });
        result.map(|_| outcome).map_err(CycleSnapshot::from_bits)
    }

    // Phase transition preserving the released flag.
    fn step(&self, from: CycleState, to: CycleState) -> Result<CycleSnapshot, CycleSnapshot> {
        debug_assert!(from.can_transition_to(to), "illegal transition {} -> {}", from, to);
        self.bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                if CycleState::from_bits(bits) == from {
                    Some((bits & RELEASED) | to.bits())
                } else {
                    None
                }
            })
            .map(CycleSnapshot::from_bits)
            .map_err(CycleSnapshot::from_bits)
    }
}
