use crate::config::LoyaltyConfig;
use serde::Serialize;
use utoipa::ToSchema;

/// 积分规则
///
/// - 累积: 服务配置了奖励积分则直接使用, 否则 floor(实付金额 / earn_divisor)
/// - 兑换: 每积分抵扣 point_value, 不超过余额, 抵扣后金额最低为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyRules {
    pub earn_divisor: i64,
    pub point_value: i64,
}

impl Default for LoyaltyRules {
    fn default() -> Self {
        Self::from(&LoyaltyConfig::default())
    }
}

impl From<&LoyaltyConfig> for LoyaltyRules {
    fn from(config: &LoyaltyConfig) -> Self {
        Self {
            earn_divisor: config.earn_divisor.max(1),
            point_value: config.point_value.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RedemptionQuote {
    /// 服务价格 (+ 接车费)
    pub subtotal: i64,
    /// 实际使用的积分
    pub points_applied: i64,
    /// 抵扣金额
    pub discount: i64,
    /// 抵扣后应付金额
    pub total_price: i64,
}

impl LoyaltyRules {
    pub fn points_earned(&self, total_price: i64, reward_override: Option<i64>) -> i64 {
        match reward_override {
            Some(points) => points.max(0),
            None if total_price <= 0 => 0,
            None => total_price / self.earn_divisor,
        }
    }

    /// 计算积分抵扣。多余的积分不会被扣除: 最多使用刚好覆盖 subtotal 的积分数。
    pub fn redeem(&self, subtotal: i64, requested_points: i64, balance: i64) -> RedemptionQuote {
        let subtotal = subtotal.max(0);
        let covering_points = (subtotal + self.point_value - 1) / self.point_value;
        let points_applied = requested_points
            .max(0)
            .min(balance.max(0))
            .min(covering_points);
        let discount = (points_applied * self.point_value).min(subtotal);

        RedemptionQuote {
            subtotal,
            points_applied,
            discount,
            total_price: subtotal - discount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_earned_from_price() {
        let rules = LoyaltyRules::default();
        assert_eq!(rules.points_earned(45_000, None), 4);
        assert_eq!(rules.points_earned(9_999, None), 0);
        assert_eq!(rules.points_earned(100_000, None), 10);
        assert_eq!(rules.points_earned(0, None), 0);
    }

    #[test]
    fn test_service_reward_overrides_price() {
        let rules = LoyaltyRules::default();
        assert_eq!(rules.points_earned(45_000, Some(25)), 25);
        assert_eq!(rules.points_earned(45_000, Some(0)), 0);
    }

    #[test]
    fn test_redeem_capped_by_balance() {
        let rules = LoyaltyRules::default();
        let quote = rules.redeem(45_000, 30, 12);
        assert_eq!(quote.points_applied, 12);
        assert_eq!(quote.discount, 12_000);
        assert_eq!(quote.total_price, 33_000);
    }

    #[test]
    fn test_redeem_never_goes_below_zero() {
        let rules = LoyaltyRules::default();
        // 余额足够覆盖全部价格 (35 000 + 10 000 接车费)
        let quote = rules.redeem(45_000, 500, 500);
        assert_eq!(quote.points_applied, 45);
        assert_eq!(quote.discount, 45_000);
        assert_eq!(quote.total_price, 0);

        // 价格不是 point_value 的整数倍时, 抵扣封顶为 subtotal
        let quote = rules.redeem(15_500, 100, 100);
        assert_eq!(quote.points_applied, 16);
        assert_eq!(quote.discount, 15_500);
        assert_eq!(quote.total_price, 0);
    }

    #[test]
    fn test_redeem_ignores_negative_input() {
        let rules = LoyaltyRules::default();
        let quote = rules.redeem(20_000, -5, 10);
        assert_eq!(quote.points_applied, 0);
        assert_eq!(quote.total_price, 20_000);
    }
}
