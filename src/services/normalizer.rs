//! Raw channel normalization against the clear channel.

use crate::models::{NormalizedColor, RawChannels, SensitivityProfile};

/// Divides each color channel by the clear channel, optionally correcting
/// for sensor sensitivity first.
///
/// A dark sample (`c == 0`) yields [`NormalizedColor::ZERO`]. No clamping is
/// applied.
#[must_use]
pub fn normalize(raw: &RawChannels, profile: Option<&SensitivityProfile>) -> NormalizedColor {
    if raw.is_dark() {
        return NormalizedColor::ZERO;
    }

    let (mut r, mut g, mut b) = (f64::from(raw.r), f64::from(raw.g), f64::from(raw.b));
    if let Some(profile) = profile {
        r /= profile.red;
        g /= profile.green;
        b /= profile.blue;
    }

    let c = f64::from(raw.c);
    NormalizedColor::new(r / c, g / c, b / c)
}

/// Normalization policy fixed for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelNormalizer {
    profile: Option<SensitivityProfile>,
}

impl ChannelNormalizer {
    /// Plain normalization by the clear channel.
    #[must_use]
    pub const fn uncorrected() -> Self {
        Self { profile: None }
    }

    /// Normalization with sensitivity correction.
    #[must_use]
    pub const fn corrected(profile: SensitivityProfile) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    /// The active sensitivity profile, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&SensitivityProfile> {
        self.profile.as_ref()
    }

    /// Normalizes one sample under this policy.
    #[must_use]
    pub fn normalize(&self, raw: &RawChannels) -> NormalizedColor {
        normalize(raw, self.profile.as_ref())
    }
}
