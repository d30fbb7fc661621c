//! Device profiles: analysis thresholds, radio timers and power constants
//!
//! A profile models one device on one network type. Presets carry documented
//! defaults; every threshold the burst and radio engines consult lives here so
//! nothing downstream hard-codes a constant.

use serde::{Deserialize, Serialize};

use crate::{Packet, RadioFamily, RadioState, TailspinError, TailspinResult};

/// Energy integration over a span of radio time
pub trait EnergyModel {
    /// Joules consumed in `state` between `start` and `end`.
    ///
    /// `packets` are the packets observed in that span; throughput-dependent
    /// states use them, the rest ignore them.
    fn energy(&self, start: f64, end: f64, state: RadioState, packets: &[Packet]) -> f64;
}

/// Thresholds used by burst segmentation and classification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstThresholds {
    /// Maximum inter-packet gap inside one burst (seconds, inclusive)
    pub burst_gap: f64,
    /// Duration at which a burst counts as long (seconds)
    pub long_burst_duration: f64,
    /// Size at which a burst counts as large (bytes)
    pub large_burst_size: u64,
    /// Shortest repeat cycle considered periodic (seconds)
    pub period_min_cycle: f64,
    /// Allowed deviation of a periodic repeat (seconds)
    pub period_cycle_tolerance: f64,
    /// Prior repetitions needed before a burst is periodic
    pub period_min_samples: usize,
    /// Window before a burst in which user input explains it (seconds)
    pub user_input_window: f64,
    /// Window after a screen rotation in which a burst is attributed to it (seconds)
    pub screen_rotation_window: f64,
    /// Rolling window for clustering TCP control bursts (seconds)
    pub tcp_cluster_window: f64,
    /// TCP control bursts in one window that make a cluster
    pub tcp_cluster_size: usize,
}

impl Default for BurstThresholds {
    fn default() -> Self {
        BurstThresholds {
            burst_gap: 1.5,
            long_burst_duration: 5.0,
            large_burst_size: 100_000,
            period_min_cycle: 10.0,
            period_cycle_tolerance: 1.0,
            period_min_samples: 3,
            user_input_window: 1.0,
            screen_rotation_window: 0.5,
            tcp_cluster_window: 60.0,
            tcp_cluster_size: 4,
        }
    }
}

impl BurstThresholds {
    fn validate(&self) -> TailspinResult<()> {
        non_negative("burst_gap", self.burst_gap)?;
        non_negative("long_burst_duration", self.long_burst_duration)?;
        non_negative("period_min_cycle", self.period_min_cycle)?;
        non_negative("period_cycle_tolerance", self.period_cycle_tolerance)?;
        non_negative("user_input_window", self.user_input_window)?;
        non_negative("screen_rotation_window", self.screen_rotation_window)?;
        non_negative("tcp_cluster_window", self.tcp_cluster_window)?;

        if self.period_min_samples == 0 {
            return Err(invalid("period_min_samples", "must be at least 1"));
        }
        if self.tcp_cluster_size == 0 {
            return Err(invalid("tcp_cluster_size", "must be at least 1"));
        }
        if self.tcp_cluster_window == 0.0 {
            return Err(invalid("tcp_cluster_window", "must be positive"));
        }
        Ok(())
    }
}

/// 3G RRC timers and power constants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UmtsProfile {
    /// DCH inactivity timer before demotion to FACH (seconds)
    pub dch_tail: f64,
    /// FACH inactivity timer before demotion to IDLE (seconds)
    pub fach_tail: f64,
    pub idle_to_dch_promotion: f64,
    pub fach_to_dch_promotion: f64,
    /// Watts
    pub power_dch: f64,
    pub power_fach: f64,
    pub power_idle: f64,
    pub power_idle_to_dch: f64,
    pub power_fach_to_dch: f64,
}

impl Default for UmtsProfile {
    fn default() -> Self {
        UmtsProfile {
            dch_tail: 5.0,
            fach_tail: 12.0,
            idle_to_dch_promotion: 2.0,
            fach_to_dch_promotion: 1.5,
            power_dch: 0.8,
            power_fach: 0.46,
            power_idle: 0.0,
            power_idle_to_dch: 0.55,
            power_fach_to_dch: 0.46,
        }
    }
}

/// LTE RRC timers and power constants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LteProfile {
    /// Inactivity timer in continuous reception (seconds)
    pub cr_tail: f64,
    /// Time spent cycling short DRX before long DRX (seconds)
    pub short_drx: f64,
    /// Time spent cycling long DRX before release to IDLE (seconds)
    pub long_drx: f64,
    /// IDLE to connected promotion delay (seconds)
    pub promotion: f64,
    /// Watts
    pub power_promotion: f64,
    /// Base power in continuous reception
    pub power_cr: f64,
    /// Extra watts per uplink Mbps
    pub alpha_up: f64,
    /// Extra watts per downlink Mbps
    pub alpha_down: f64,
    pub power_cr_tail: f64,
    pub power_short_drx: f64,
    pub power_long_drx: f64,
    pub power_idle: f64,
}

impl Default for LteProfile {
    fn default() -> Self {
        LteProfile {
            cr_tail: 0.1,
            short_drx: 0.4,
            long_drx: 11.0,
            promotion: 0.26,
            power_promotion: 1.21,
            power_cr: 1.06,
            alpha_up: 0.438,
            alpha_down: 0.052,
            power_cr_tail: 1.06,
            power_short_drx: 0.359,
            power_long_drx: 0.143,
            // Paging wake-ups are not modelled; idle counts as radio off
            power_idle: 0.0,
        }
    }
}

/// WiFi power-save timers and power constants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiProfile {
    /// Time the radio stays awake after traffic (seconds)
    pub wifi_tail: f64,
    /// Watts
    pub power_active: f64,
    pub alpha_up: f64,
    pub alpha_down: f64,
    pub power_tail: f64,
    pub power_idle: f64,
}

impl Default for WifiProfile {
    fn default() -> Self {
        WifiProfile {
            wifi_tail: 0.25,
            power_active: 0.403,
            alpha_up: 0.283,
            alpha_down: 0.137,
            power_tail: 0.24,
            power_idle: 0.0,
        }
    }
}

/// Family-specific part of a profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family")]
pub enum RadioProfile {
    Umts(UmtsProfile),
    Lte(LteProfile),
    Wifi(WifiProfile),
}

impl RadioProfile {
    pub fn family(&self) -> RadioFamily {
        match self {
            RadioProfile::Umts(_) => RadioFamily::Cellular3G,
            RadioProfile::Lte(_) => RadioFamily::CellularLte,
            RadioProfile::Wifi(_) => RadioFamily::Wifi,
        }
    }

    fn validate(&self) -> TailspinResult<()> {
        match self {
            RadioProfile::Umts(p) => {
                non_negative("dch_tail", p.dch_tail)?;
                non_negative("fach_tail", p.fach_tail)?;
                non_negative("idle_to_dch_promotion", p.idle_to_dch_promotion)?;
                non_negative("fach_to_dch_promotion", p.fach_to_dch_promotion)?;
                non_negative("power_dch", p.power_dch)?;
                non_negative("power_fach", p.power_fach)?;
                non_negative("power_idle", p.power_idle)?;
                non_negative("power_idle_to_dch", p.power_idle_to_dch)?;
                non_negative("power_fach_to_dch", p.power_fach_to_dch)
            }
            RadioProfile::Lte(p) => {
                non_negative("cr_tail", p.cr_tail)?;
                non_negative("short_drx", p.short_drx)?;
                non_negative("long_drx", p.long_drx)?;
                non_negative("promotion", p.promotion)?;
                non_negative("power_promotion", p.power_promotion)?;
                non_negative("power_cr", p.power_cr)?;
                non_negative("alpha_up", p.alpha_up)?;
                non_negative("alpha_down", p.alpha_down)?;
                non_negative("power_cr_tail", p.power_cr_tail)?;
                non_negative("power_short_drx", p.power_short_drx)?;
                non_negative("power_long_drx", p.power_long_drx)?;
                non_negative("power_idle", p.power_idle)
            }
            RadioProfile::Wifi(p) => {
                non_negative("wifi_tail", p.wifi_tail)?;
                non_negative("power_active", p.power_active)?;
                non_negative("alpha_up", p.alpha_up)?;
                non_negative("alpha_down", p.alpha_down)?;
                non_negative("power_tail", p.power_tail)?;
                non_negative("power_idle", p.power_idle)
            }
        }
    }
}

/// Device profile used as the model of the device when analyzing a trace
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thresholds: BurstThresholds,
    pub radio: RadioProfile,
}

impl Default for Profile {
    fn default() -> Self {
        Self::umts()
    }
}

impl Profile {
    /// 3G preset
    pub fn umts() -> Self {
        Profile {
            name: "3G default".to_string(),
            thresholds: BurstThresholds::default(),
            radio: RadioProfile::Umts(UmtsProfile::default()),
        }
    }

    /// LTE preset
    pub fn lte() -> Self {
        Profile {
            name: "LTE default".to_string(),
            thresholds: BurstThresholds::default(),
            radio: RadioProfile::Lte(LteProfile::default()),
        }
    }

    /// WiFi preset
    pub fn wifi() -> Self {
        Profile {
            name: "WiFi default".to_string(),
            thresholds: BurstThresholds::default(),
            radio: RadioProfile::Wifi(WifiProfile::default()),
        }
    }

    pub fn for_family(family: RadioFamily) -> Self {
        match family {
            RadioFamily::Cellular3G => Self::umts(),
            RadioFamily::CellularLte => Self::lte(),
            RadioFamily::Wifi => Self::wifi(),
        }
    }

    /// Parse a JSON profile document and validate it.
    ///
    /// Omitted fields take the preset defaults of their section.
    pub fn from_json(document: &str) -> TailspinResult<Self> {
        let profile: Profile = serde_json::from_str(document)
            .map_err(|e| TailspinError::ProfileFormat(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn with_thresholds(mut self, thresholds: BurstThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn family(&self) -> RadioFamily {
        self.radio.family()
    }

    /// Reject malformed values before any analysis runs
    pub fn validate(&self) -> TailspinResult<()> {
        self.thresholds.validate()?;
        self.radio.validate()
    }

    /// Steady power draw of a state in watts, excluding throughput terms
    pub fn power(&self, state: RadioState) -> f64 {
        match (&self.radio, state) {
            (RadioProfile::Umts(p), RadioState::Dch) => p.power_dch,
            (RadioProfile::Umts(p), RadioState::Fach) => p.power_fach,
            (RadioProfile::Umts(p), RadioState::Idle) => p.power_idle,
            (RadioProfile::Umts(p), RadioState::IdleToDchPromotion) => p.power_idle_to_dch,
            (RadioProfile::Umts(p), RadioState::FachToDchPromotion) => p.power_fach_to_dch,
            (RadioProfile::Lte(p), RadioState::IdleToCrPromotion) => p.power_promotion,
            (RadioProfile::Lte(p), RadioState::ContinuousReception) => p.power_cr,
            (RadioProfile::Lte(p), RadioState::ContinuousReceptionTail) => p.power_cr_tail,
            (RadioProfile::Lte(p), RadioState::ShortDrx) => p.power_short_drx,
            (RadioProfile::Lte(p), RadioState::LongDrx) => p.power_long_drx,
            (RadioProfile::Lte(p), RadioState::LteIdle) => p.power_idle,
            (RadioProfile::Wifi(p), RadioState::WifiActive) => p.power_active,
            (RadioProfile::Wifi(p), RadioState::WifiTail) => p.power_tail,
            (RadioProfile::Wifi(p), RadioState::WifiIdle) => p.power_idle,
            // States of another family draw nothing under this profile
            _ => 0.0,
        }
    }
}

impl EnergyModel for Profile {
    fn energy(&self, start: f64, end: f64, state: RadioState, packets: &[Packet]) -> f64 {
        let dt = end - start;
        if dt <= 0.0 {
            return 0.0;
        }

        let throughput_terms = match (&self.radio, state) {
            (RadioProfile::Lte(p), RadioState::ContinuousReception) => {
                Some((p.alpha_up, p.alpha_down))
            }
            (RadioProfile::Wifi(p), RadioState::WifiActive) => Some((p.alpha_up, p.alpha_down)),
            _ => None,
        };

        let mut watts = self.power(state);
        if let Some((alpha_up, alpha_down)) = throughput_terms {
            let (up_mbps, down_mbps) = throughput_mbps(packets, dt);
            watts += alpha_up * up_mbps + alpha_down * down_mbps;
        }
        watts * dt
    }
}

/// Uplink and downlink throughput of `packets` spread over `dt` seconds
fn throughput_mbps(packets: &[Packet], dt: f64) -> (f64, f64) {
    let (up, down) = packets.iter().fold((0u64, 0u64), |(up, down), p| {
        if p.is_uplink() {
            (up + p.length as u64, down)
        } else {
            (up, down + p.length as u64)
        }
    });
    let to_mbps = |bytes: u64| bytes as f64 * 8.0 / 1_000_000.0 / dt;
    (to_mbps(up), to_mbps(down))
}

fn non_negative(field: &'static str, value: f64) -> TailspinResult<()> {
    if !value.is_finite() {
        return Err(invalid(field, format!("not a finite number: {value}")));
    }
    if value < 0.0 {
        return Err(invalid(field, format!("negative value: {value}")));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TailspinError {
    TailspinError::InvalidProfile {
        field,
        reason: reason.into(),
    }
}
