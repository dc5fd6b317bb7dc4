//! SILO source codes describing how a daily value was derived.

/// How a daily rainfall value was derived. Code 0 is a station observation;
/// everything else is some form of infill. See the
/// [SILO documentation](https://www.longpaddock.qld.gov.au/silo/about/) for
/// the code definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Observed,
    Deaccumulated,
    Interpolated,
    Synthetic,
    InterpolatedByAnomaly,
    SatelliteEstimate,
    InterpolatedByLongTermAverages,
    Unknown,
}

impl Interpolation {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Interpolation::Observed,
            15 => Interpolation::Deaccumulated,
            25 => Interpolation::Interpolated,
            26 => Interpolation::Synthetic,
            35 => Interpolation::InterpolatedByAnomaly,
            42 => Interpolation::SatelliteEstimate,
            75 => Interpolation::InterpolatedByLongTermAverages,
            _ => Interpolation::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interpolation::Observed => "observed",
            Interpolation::Deaccumulated => "deaccumulated",
            Interpolation::Interpolated => "interpolated",
            Interpolation::Synthetic => "synthetic",
            Interpolation::InterpolatedByAnomaly => "interpolated_by_anomaly",
            Interpolation::SatelliteEstimate => "satellite_estimate",
            Interpolation::InterpolatedByLongTermAverages => {
                "interpolated_by_long_term_averages"
            }
            Interpolation::Unknown => "unknown",
        }
    }
}
