// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rate block configuration types.
//!
//! A rate block is a single pricing rule scoped by day type, optional
//! time-of-day window, client category, and (for service-based charging)
//! a set of linked services. Exactly one calculation method is configured
//! per block; the method must be compatible with the block's charge basis.

use crate::error::DomainError;
use crate::types::{ClientCategory, DayType, ServiceId, TimeWindow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// How a rate block charges for delivered care.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ChargeBasis {
    /// Charged from the visit's recorded hours and minutes.
    HoursMinutes,
    /// Charged per delivered service; requires linked services.
    Services,
    /// A fixed flat charge independent of the service delivered.
    FixedFlat,
}

impl FromStr for ChargeBasis {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hours_minutes" => Ok(Self::HoursMinutes),
            "services" => Ok(Self::Services),
            "fixed_flat" => Ok(Self::FixedFlat),
            _ => Err(DomainError::InvalidRateBlock {
                reason: format!("Unknown charge basis: {s}"),
            }),
        }
    }
}

impl std::fmt::Display for ChargeBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ChargeBasis {
    /// Converts this charge basis to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HoursMinutes => "hours_minutes",
            Self::Services => "services",
            Self::FixedFlat => "fixed_flat",
        }
    }
}

/// Break-point rates for pro-rata service charging.
///
/// Pro-rata blocks configure four rates at the 15/30/45/60 minute break
/// points. Charging selects the nearest break point at or below the actual
/// duration rather than interpolating linearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakPointRates {
    /// Rate charged at the 15-minute break point.
    pub m15: Decimal,
    /// Rate charged at the 30-minute break point.
    pub m30: Decimal,
    /// Rate charged at the 45-minute break point.
    pub m45: Decimal,
    /// Rate charged at the 60-minute break point.
    pub m60: Decimal,
}

impl BreakPointRates {
    /// Selects the rate for the nearest break point at or below `minutes`.
    ///
    /// Durations under 15 minutes fall back to the 15-minute rate, which
    /// acts as the minimum charge for a pro-rata block.
    #[must_use]
    pub const fn rate_for(&self, minutes: u32) -> Decimal {
        if minutes >= 60 {
            self.m60
        } else if minutes >= 45 {
            self.m45
        } else if minutes >= 30 {
            self.m30
        } else {
            self.m15
        }
    }
}

/// The calculation method configured on a rate block.
///
/// This is a closed tagged union: a block carries exactly one populated
/// rate configuration, never an open map of optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationMethod {
    /// Hours/minutes basis: a fractional-hour quantity at an hourly rate.
    RatePerHour {
        /// Rate per hour.
        rate: Decimal,
    },
    /// Hours/minutes basis: linear per-minute charging at `rate / 60`.
    ///
    /// When `consecutive_hours_threshold` is set and the visit runs past
    /// that many consecutive hours, the remainder is charged in full-hour
    /// blocks instead of per minute.
    RatePerMinuteProrated {
        /// Rate per hour, applied per minute as `rate / 60`.
        rate: Decimal,
        /// Consecutive-hours threshold beyond which charging is tiered.
        consecutive_hours_threshold: Option<u32>,
    },
    /// Hours/minutes basis: the full rate is charged once per started
    /// hour block, never prorated. Used for minimum-charge policies.
    RatePerMinuteFlat {
        /// Rate per hour block.
        rate: Decimal,
    },
    /// Service/fixed basis: a single flat charge per visit.
    Flat {
        /// The flat charge.
        rate: Decimal,
    },
    /// Service basis: break-point charging at 15/30/45/60 minutes.
    ///
    /// When `consecutive_hours_threshold` is set, durations beyond 60
    /// minutes extrapolate at the 60-minute rate per additional hour with
    /// the remainder charged at its own break point.
    ProRata {
        /// The configured break-point rates.
        break_points: BreakPointRates,
        /// Consecutive-hours threshold enabling extrapolation past 60 minutes.
        consecutive_hours_threshold: Option<u32>,
    },
    /// Service basis: a fractional-hour quantity at an hourly rate.
    Hourly {
        /// Rate per hour.
        rate: Decimal,
    },
}

impl CalculationMethod {
    /// Returns the method name used in configuration and audit output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RatePerHour { .. } => "rate_per_hour",
            Self::RatePerMinuteProrated { .. } => "rate_per_minute_prorated",
            Self::RatePerMinuteFlat { .. } => "rate_per_minute_flat",
            Self::Flat { .. } => "flat",
            Self::ProRata { .. } => "pro_rata",
            Self::Hourly { .. } => "hourly",
        }
    }

    /// Checks whether this method is permitted for a charge basis.
    ///
    /// Hours/minutes blocks use the per-hour and per-minute methods;
    /// service and fixed-flat blocks use flat, pro-rata, or hourly.
    #[must_use]
    pub const fn permitted_for(&self, basis: ChargeBasis) -> bool {
        match self {
            Self::RatePerHour { .. }
            | Self::RatePerMinuteProrated { .. }
            | Self::RatePerMinuteFlat { .. } => matches!(basis, ChargeBasis::HoursMinutes),
            Self::Flat { .. } | Self::ProRata { .. } | Self::Hourly { .. } => {
                matches!(basis, ChargeBasis::Services | ChargeBasis::FixedFlat)
            }
        }
    }
}

/// A configured pricing rule.
///
/// Rate blocks are pure data; all behaviour lives in the resolver and the
/// line item calculator. At most one block may match a given
/// (day, time, service, category) combination; overlap is a configuration
/// error detected at resolution time, not resolved silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBlock {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the block has not been persisted yet.
    pub rate_block_id: Option<i64>,
    /// Human-readable name for configuration screens.
    pub name: String,
    /// Days this rule fires on; never empty.
    pub applicable_days: BTreeSet<DayType>,
    /// Client category this rule is scoped to.
    pub rate_type: ClientCategory,
    /// Optional time-of-day window; absent means all-day.
    pub effective_window: Option<TimeWindow>,
    /// How this block charges.
    pub charge_basis: ChargeBasis,
    /// The single configured calculation method.
    pub calculation: CalculationMethod,
    /// Services this block prices; required when the basis is `Services`.
    pub linked_services: BTreeSet<ServiceId>,
    /// Multiplier applied to the line total on bank holidays; must be >= 1.
    pub bank_holiday_multiplier: Option<Decimal>,
    /// Whether lines priced by this block attract VAT.
    pub is_vatable: bool,
}

impl RateBlock {
    /// Checks whether this block is applicable on a given day type.
    #[must_use]
    pub fn applies_on(&self, day_type: DayType) -> bool {
        self.applicable_days.contains(&day_type)
    }

    /// Checks whether this block covers a service.
    ///
    /// Hours/minutes and fixed-flat blocks are not service-scoped and
    /// cover every service; service-based blocks cover only their linked
    /// services.
    #[must_use]
    pub fn covers_service(&self, service_id: &ServiceId) -> bool {
        match self.charge_basis {
            ChargeBasis::Services => self.linked_services.contains(service_id),
            ChargeBasis::HoursMinutes | ChargeBasis::FixedFlat => true,
        }
    }

    /// Checks whether this block is effective at a time of day.
    ///
    /// A block without a window is effective all day.
    #[must_use]
    pub fn effective_at(&self, time: time::Time) -> bool {
        self.effective_window.is_none_or(|window| window.contains(time))
    }
}
