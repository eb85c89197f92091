//! Domain Services
//!
//! Pure reward math: commission tiers, points conversion, binding codes.
//! Kept free of storage so tier boundaries are testable directly.

use rand::Rng;

use crate::domain::value_object::reward_spec::RewardSpec;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 8;

/// Commission tiers in basis points, keyed by the inviter's total invite
/// count. Bounds are closed on the lower end.
#[derive(Debug, Clone)]
pub struct CommissionTiers {
    pub base_bps: u32,
    pub mid_bps: u32,
    pub top_bps: u32,
    /// Invite count at which the mid rate starts
    pub mid_at: i64,
    /// Invite count at which the top rate starts
    pub top_at: i64,
}

impl Default for CommissionTiers {
    fn default() -> Self {
        Self {
            base_bps: 1000,
            mid_bps: 1500,
            top_bps: 2000,
            mid_at: 500,
            top_at: 5000,
        }
    }
}

/// Commission rate for an inviter, in basis points.
///
/// A monotonic step function, closed on the lower bound: exactly `mid_at`
/// invites already pays the mid rate.
pub fn commission_rate_bps(invite_count: i64, tiers: &CommissionTiers) -> u32 {
    if invite_count >= tiers.top_at {
        tiers.top_bps
    } else if invite_count >= tiers.mid_at {
        tiers.mid_bps
    } else {
        tiers.base_bps
    }
}

/// Commission amount in minor units; truncates toward zero
pub fn commission_amount(reward_amount: i64, rate_bps: u32) -> i64 {
    reward_amount.saturating_mul(rate_bps as i64) / 10_000
}

/// Points credited for a reward spec: the explicit override, or the
/// configured conversion rate applied to the amount
pub fn points_for(spec: &RewardSpec, points_per_unit: i64) -> i64 {
    spec.points_override
        .unwrap_or_else(|| spec.amount.saturating_mul(points_per_unit))
}

/// Generate a short binding code the user places on the external profile.
/// The alphabet drops lookalike characters.
pub fn generate_binding_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_closed_on_lower_bound() {
        let tiers = CommissionTiers::default();

        assert_eq!(commission_rate_bps(0, &tiers), 1000);
        assert_eq!(commission_rate_bps(499, &tiers), 1000);
        assert_eq!(commission_rate_bps(500, &tiers), 1500);
        assert_eq!(commission_rate_bps(4999, &tiers), 1500);
        assert_eq!(commission_rate_bps(5000, &tiers), 2000);
        assert_eq!(commission_rate_bps(50_000, &tiers), 2000);
    }

    #[test]
    fn test_commission_amounts_pin_the_spec_examples() {
        let tiers = CommissionTiers::default();

        // 499 invites: 10% of 100 = 10
        let rate = commission_rate_bps(499, &tiers);
        assert_eq!(commission_amount(100, rate), 10);

        // 500 invites: 15% of 100 = 15
        let rate = commission_rate_bps(500, &tiers);
        assert_eq!(commission_amount(100, rate), 15);
    }

    #[test]
    fn test_commission_truncates() {
        assert_eq!(commission_amount(99, 1000), 9);
        assert_eq!(commission_amount(1, 1000), 0);
        assert_eq!(commission_amount(0, 2000), 0);
    }

    #[test]
    fn test_points_default_conversion() {
        let spec = RewardSpec::new(100, "USDT");
        assert_eq!(points_for(&spec, 10), 1000);
    }

    #[test]
    fn test_points_override_wins() {
        let mut spec = RewardSpec::new(100, "USDT");
        spec.points_override = Some(42);
        assert_eq!(points_for(&spec, 10), 42);
    }

    #[test]
    fn test_binding_code_shape() {
        let code = generate_binding_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));

        // Lookalikes are excluded from the alphabet
        assert!(!code.contains('O') && !code.contains('0') && !code.contains('1'));
    }
}
