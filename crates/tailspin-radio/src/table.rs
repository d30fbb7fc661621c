//! Per-family state transition tables
//!
//! Every radio family follows the same shape: traffic holds the active state,
//! silence walks down a fixed demotion ladder one timer at a time, and traffic
//! arriving on a low rung may first pay a promotion. The families differ only
//! in the rungs, timers and promotions, so each one is described by a table
//! rather than its own code path.

use tailspin_core::{Profile, RadioFamily, RadioProfile, RadioState};

/// Delay paid before the active state resumes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Promotion {
    pub state: RadioState,
    /// Seconds
    pub delay: f64,
}

/// One rung of the demotion ladder
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stage {
    pub state: RadioState,
    /// Seconds spent on this rung before demoting to the next one
    pub timer: f64,
    /// Cost of resuming traffic from this rung
    pub promotion: Option<Promotion>,
}

/// Where the radio sits when traffic resumes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    /// On ladder rung `stage`, which began at `since`
    Ladder { stage: usize, since: f64 },
    /// Fully demoted since `since`
    Idle { since: f64 },
}

/// Transition table of one radio family
#[derive(Clone, Debug, PartialEq)]
pub struct StateTable {
    pub family: RadioFamily,
    /// State while packets flow
    pub active: RadioState,
    /// Demotion rungs after traffic stops, in order
    pub ladder: Vec<Stage>,
    /// Terminal low-power state
    pub idle: RadioState,
    /// Cost of resuming traffic from idle
    pub idle_promotion: Option<Promotion>,
}

impl StateTable {
    pub fn for_profile(profile: &Profile) -> Self {
        Self::from_radio(&profile.radio)
    }

    pub fn from_radio(radio: &RadioProfile) -> Self {
        match radio {
            RadioProfile::Umts(p) => StateTable {
                family: RadioFamily::Cellular3G,
                active: RadioState::Dch,
                ladder: vec![
                    Stage {
                        state: RadioState::Dch,
                        timer: p.dch_tail,
                        promotion: None,
                    },
                    Stage {
                        state: RadioState::Fach,
                        timer: p.fach_tail,
                        promotion: Some(Promotion {
                            state: RadioState::FachToDchPromotion,
                            delay: p.fach_to_dch_promotion,
                        }),
                    },
                ],
                idle: RadioState::Idle,
                idle_promotion: Some(Promotion {
                    state: RadioState::IdleToDchPromotion,
                    delay: p.idle_to_dch_promotion,
                }),
            },
            RadioProfile::Lte(p) => StateTable {
                family: RadioFamily::CellularLte,
                active: RadioState::ContinuousReception,
                ladder: vec![
                    Stage {
                        state: RadioState::ContinuousReceptionTail,
                        timer: p.cr_tail,
                        promotion: None,
                    },
                    Stage {
                        state: RadioState::ShortDrx,
                        timer: p.short_drx,
                        promotion: None,
                    },
                    Stage {
                        state: RadioState::LongDrx,
                        timer: p.long_drx,
                        promotion: None,
                    },
                ],
                idle: RadioState::LteIdle,
                idle_promotion: Some(Promotion {
                    state: RadioState::IdleToCrPromotion,
                    delay: p.promotion,
                }),
            },
            RadioProfile::Wifi(p) => StateTable {
                family: RadioFamily::Wifi,
                active: RadioState::WifiActive,
                ladder: vec![Stage {
                    state: RadioState::WifiTail,
                    timer: p.wifi_tail,
                    promotion: None,
                }],
                idle: RadioState::WifiIdle,
                idle_promotion: None,
            },
        }
    }

    /// The rung that directly follows traffic, i.e. the active-state tail
    pub fn first_tail(&self) -> Option<RadioState> {
        self.ladder.first().map(|stage| stage.state)
    }

    /// Total silence before the radio reaches idle
    pub fn total_tail(&self) -> f64 {
        self.ladder.iter().map(|stage| stage.timer).sum()
    }

    /// Position of the radio at `at`, given traffic stopped at `released`.
    ///
    /// A timer expiring exactly at `at` has not fired yet.
    pub fn position(&self, released: f64, at: f64) -> Position {
        let mut since = released;
        for (stage, rung) in self.ladder.iter().enumerate() {
            let deadline = since + rung.timer;
            if at <= deadline {
                return Position::Ladder { stage, since };
            }
            since = deadline;
        }
        Position::Idle { since }
    }
}
