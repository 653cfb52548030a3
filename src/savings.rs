// 💰 Savings Opportunity Estimator
//
// Normalizes every subscription to a monthly cost and applies a flat 10%
// savings heuristic. The estimate is not data-driven.

use crate::models::{BillingCycle, Subscription};
use serde::{Deserialize, Serialize};

/// Flat share of the monthly cost assumed recoverable
pub const SAVINGS_RATE: f64 = 0.10;

/// `SAVINGS_RATE` expressed as a whole percentage
pub const SAVINGS_PERCENTAGE: u32 = 10;

const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;

const ANNUAL_BILLING_RECOMMENDATION: &str =
    "Consider switching to annual billing to save up to 10%";
const REVIEW_USAGE_RECOMMENDATION: &str =
    "Already billed annually; review usage to confirm this subscription is still needed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsOpportunity {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub monthly_cost: f64,
    pub potential_savings: f64,
    pub savings_percentage: u32,
    pub recommendation: String,
}

impl BillingCycle {
    /// Multiplier turning one billing-period amount into a monthly amount
    pub fn monthly_factor(&self) -> f64 {
        match self {
            BillingCycle::Weekly => WEEKS_PER_YEAR / MONTHS_PER_YEAR,
            BillingCycle::Monthly => 1.0,
            BillingCycle::Yearly => 1.0 / MONTHS_PER_YEAR,
        }
    }
}

/// Monthly cost of a subscription.
///
/// Yearly amounts are divided by 12, weekly amounts scaled by 52/12.
pub fn monthly_cost(subscription: &Subscription) -> f64 {
    match subscription.billing_cycle {
        BillingCycle::Yearly => subscription.amount / MONTHS_PER_YEAR,
        BillingCycle::Monthly => subscription.amount,
        BillingCycle::Weekly => subscription.amount * subscription.billing_cycle.monthly_factor(),
    }
}

fn recommendation_for(cycle: BillingCycle) -> &'static str {
    match cycle {
        BillingCycle::Yearly => REVIEW_USAGE_RECOMMENDATION,
        BillingCycle::Weekly | BillingCycle::Monthly => ANNUAL_BILLING_RECOMMENDATION,
    }
}

/// One opportunity per subscription, in input order.
pub fn calculate_savings_opportunities(subscriptions: &[Subscription]) -> Vec<SavingsOpportunity> {
    subscriptions
        .iter()
        .map(|sub| {
            let monthly = monthly_cost(sub);
            SavingsOpportunity {
                subscription: sub.clone(),
                monthly_cost: monthly,
                potential_savings: monthly * SAVINGS_RATE,
                savings_percentage: SAVINGS_PERCENTAGE,
                recommendation: recommendation_for(sub.billing_cycle).to_string(),
            }
        })
        .collect()
}

/// Sum of normalized monthly costs across all subscriptions
pub fn total_monthly_spend(subscriptions: &[Subscription]) -> f64 {
    subscriptions.iter().map(monthly_cost).sum()
}

pub fn total_potential_savings(opportunities: &[SavingsOpportunity]) -> f64 {
    opportunities.iter().map(|opp| opp.potential_savings).sum()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubscriptionStatus;

    const EPSILON: f64 = 1e-9;

    fn sub(id: &str, amount: f64, cycle: BillingCycle) -> Subscription {
        Subscription {
            subscription_id: id.to_string(),
            user_id: "0xabc".to_string(),
            service_name: format!("Service {}", id),
            billing_cycle: cycle,
            next_billing_date: "2025-02-01".to_string(),
            amount,
            currency: "USD".to_string(),
            status: SubscriptionStatus::Active,
            category: "Entertainment".to_string(),
        }
    }

    #[test]
    fn test_monthly_cost_normalization() {
        assert!((monthly_cost(&sub("y", 120.0, BillingCycle::Yearly)) - 10.0).abs() < EPSILON);
        assert!((monthly_cost(&sub("m", 50.0, BillingCycle::Monthly)) - 50.0).abs() < EPSILON);
        assert!((monthly_cost(&sub("w", 12.0, BillingCycle::Weekly)) - 52.0).abs() < EPSILON);
    }

    #[test]
    fn test_savings_scenario() {
        let subs = vec![
            sub("a", 120.0, BillingCycle::Yearly),
            sub("b", 15.0, BillingCycle::Monthly),
        ];

        let opps = calculate_savings_opportunities(&subs);

        assert_eq!(opps.len(), 2);
        assert!((opps[0].monthly_cost - 10.0).abs() < EPSILON);
        assert!((opps[0].potential_savings - 1.0).abs() < EPSILON);
        assert!((opps[1].monthly_cost - 15.0).abs() < EPSILON);
        assert!((opps[1].potential_savings - 1.5).abs() < EPSILON);
        assert!(opps.iter().all(|o| o.savings_percentage == 10));
        assert_eq!(opps[0].subscription.subscription_id, "a");
    }

    #[test]
    fn test_recommendation_is_cycle_aware() {
        let opps = calculate_savings_opportunities(&[
            sub("y", 120.0, BillingCycle::Yearly),
            sub("m", 10.0, BillingCycle::Monthly),
            sub("w", 3.0, BillingCycle::Weekly),
        ]);

        assert!(!opps[0].recommendation.contains("switching to annual"));
        assert!(opps[1].recommendation.contains("annual billing"));
        assert!(opps[2].recommendation.contains("annual billing"));
    }

    #[test]
    fn test_empty_input() {
        assert!(calculate_savings_opportunities(&[]).is_empty());
        assert_eq!(total_monthly_spend(&[]), 0.0);
        assert_eq!(total_potential_savings(&[]), 0.0);
    }

    #[test]
    fn test_totals() {
        let subs = vec![
            sub("a", 120.0, BillingCycle::Yearly),
            sub("b", 15.0, BillingCycle::Monthly),
        ];
        let opps = calculate_savings_opportunities(&subs);

        assert!((total_monthly_spend(&subs) - 25.0).abs() < EPSILON);
        assert!((total_potential_savings(&opps) - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_opportunity_serializes_flat() {
        let opps = calculate_savings_opportunities(&[sub("a", 15.0, BillingCycle::Monthly)]);
        let json = serde_json::to_value(&opps[0]).unwrap();

        assert_eq!(json["subscriptionId"], "a");
        assert_eq!(json["billingCycle"], "monthly");
        assert_eq!(json["savingsPercentage"], 10);
        assert_eq!(json["monthlyCost"], 15.0);
    }
}
