//! Radio families, power states and state intervals
//!
//! Each radio technology has its own small set of power states:
//! - 3G RRC: IDLE, FACH, DCH plus two promotion states
//! - LTE RRC: IDLE, continuous reception, its tail, short/long DRX plus one promotion
//! - WiFi power save: active, tail, idle

use std::fmt;

use serde::{Deserialize, Serialize};

/// Radio technology of a trace. Fixed for the lifetime of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadioFamily {
    Cellular3G,
    CellularLte,
    Wifi,
}

impl RadioFamily {
    pub fn all() -> &'static [RadioFamily] {
        &[
            RadioFamily::Cellular3G,
            RadioFamily::CellularLte,
            RadioFamily::Wifi,
        ]
    }

    /// States belonging to this family, highest power first
    pub fn states(self) -> &'static [RadioState] {
        match self {
            RadioFamily::Cellular3G => &[
                RadioState::Dch,
                RadioState::IdleToDchPromotion,
                RadioState::FachToDchPromotion,
                RadioState::Fach,
                RadioState::Idle,
            ],
            RadioFamily::CellularLte => &[
                RadioState::IdleToCrPromotion,
                RadioState::ContinuousReception,
                RadioState::ContinuousReceptionTail,
                RadioState::ShortDrx,
                RadioState::LongDrx,
                RadioState::LteIdle,
            ],
            RadioFamily::Wifi => &[
                RadioState::WifiActive,
                RadioState::WifiTail,
                RadioState::WifiIdle,
            ],
        }
    }

    /// Lowest-power state, where every simulation starts
    pub fn idle_state(self) -> RadioState {
        match self {
            RadioFamily::Cellular3G => RadioState::Idle,
            RadioFamily::CellularLte => RadioState::LteIdle,
            RadioFamily::Wifi => RadioState::WifiIdle,
        }
    }

    /// State occupied while traffic flows
    pub fn active_state(self) -> RadioState {
        match self {
            RadioFamily::Cellular3G => RadioState::Dch,
            RadioFamily::CellularLte => RadioState::ContinuousReception,
            RadioFamily::Wifi => RadioState::WifiActive,
        }
    }
}

impl fmt::Display for RadioFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RadioFamily::Cellular3G => "3G",
            RadioFamily::CellularLte => "LTE",
            RadioFamily::Wifi => "WiFi",
        };
        f.write_str(name)
    }
}

/// Radio power state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RadioState {
    // 3G RRC
    Idle,
    Fach,
    Dch,
    IdleToDchPromotion,
    FachToDchPromotion,

    // LTE RRC
    LteIdle,
    ContinuousReception,
    ContinuousReceptionTail,
    ShortDrx,
    LongDrx,
    IdleToCrPromotion,

    // WiFi power save
    WifiActive,
    WifiTail,
    WifiIdle,
}

impl RadioState {
    pub fn family(self) -> RadioFamily {
        match self {
            RadioState::Idle
            | RadioState::Fach
            | RadioState::Dch
            | RadioState::IdleToDchPromotion
            | RadioState::FachToDchPromotion => RadioFamily::Cellular3G,
            RadioState::LteIdle
            | RadioState::ContinuousReception
            | RadioState::ContinuousReceptionTail
            | RadioState::ShortDrx
            | RadioState::LongDrx
            | RadioState::IdleToCrPromotion => RadioFamily::CellularLte,
            RadioState::WifiActive | RadioState::WifiTail | RadioState::WifiIdle => {
                RadioFamily::Wifi
            }
        }
    }

    pub fn is_promotion(self) -> bool {
        matches!(
            self,
            RadioState::IdleToDchPromotion
                | RadioState::FachToDchPromotion
                | RadioState::IdleToCrPromotion
        )
    }

    pub fn is_idle(self) -> bool {
        matches!(
            self,
            RadioState::Idle | RadioState::LteIdle | RadioState::WifiIdle
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            RadioState::Idle => "IDLE",
            RadioState::Fach => "FACH",
            RadioState::Dch => "DCH",
            RadioState::IdleToDchPromotion => "IDLE->DCH",
            RadioState::FachToDchPromotion => "FACH->DCH",
            RadioState::LteIdle => "LTE IDLE",
            RadioState::ContinuousReception => "CR",
            RadioState::ContinuousReceptionTail => "CR TAIL",
            RadioState::ShortDrx => "SHORT DRX",
            RadioState::LongDrx => "LONG DRX",
            RadioState::IdleToCrPromotion => "IDLE->CR",
            RadioState::WifiActive => "WIFI ACTIVE",
            RadioState::WifiTail => "WIFI TAIL",
            RadioState::WifiIdle => "WIFI IDLE",
        }
    }
}

impl fmt::Display for RadioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Time spent in one radio state
///
/// The intervals of one run tile `[0, trace duration]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateInterval {
    pub start: f64,
    pub end: f64,
    pub state: RadioState,
    /// Spent waiting on an inactivity timer after traffic stopped
    pub tail: bool,
}

impl StateInterval {
    pub fn new(start: f64, end: f64, state: RadioState) -> Self {
        StateInterval {
            start,
            end,
            state,
            tail: false,
        }
    }

    pub fn tail(start: f64, end: f64, state: RadioState) -> Self {
        StateInterval {
            start,
            end,
            state,
            tail: true,
        }
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_belong_to_family() {
        for family in RadioFamily::all() {
            for state in family.states() {
                assert_eq!(state.family(), *family, "{state} misfiled");
            }
            assert!(family.states().contains(&family.idle_state()));
            assert!(family.states().contains(&family.active_state()));
        }
    }

    #[test]
    fn test_promotion_states() {
        assert!(RadioState::IdleToDchPromotion.is_promotion());
        assert!(RadioState::IdleToCrPromotion.is_promotion());
        assert!(!RadioState::Dch.is_promotion());
        assert!(!RadioState::WifiTail.is_promotion());
    }

    #[test]
    fn test_interval_duration() {
        let interval = StateInterval::tail(1.5, 4.0, RadioState::Fach);
        assert!(interval.tail);
        assert!((interval.duration() - 2.5).abs() < 1e-12);
    }
}
