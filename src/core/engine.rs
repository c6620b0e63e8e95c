use super::types::{
    ExpenseAdjustments, GoalSummary, SimulationInputs, SimulationResult, YearlyData,
};

/// Fixed projection horizon: every run simulates through this age inclusive.
pub const HORIZON_AGE: u32 = 90;

/// Assets worth 25x annual spending sustain a 4% withdrawal rate.
pub const FI_MULTIPLIER: f64 = 25.0;

pub const COFFEE_CUT_MAX: i64 = 100_000;
pub const DELIVERY_CUT_MAX: i64 = 200_000;
pub const SUBSCRIPTION_CUT_MAX: i64 = 50_000;

impl ExpenseAdjustments {
    pub fn clamped(self) -> Self {
        ExpenseAdjustments {
            coffee: self.coffee.clamp(0, COFFEE_CUT_MAX),
            delivery: self.delivery.clamp(0, DELIVERY_CUT_MAX),
            subscription: self.subscription.clamp(0, SUBSCRIPTION_CUT_MAX),
        }
    }

    pub fn total(self) -> i64 {
        self.coffee + self.delivery + self.subscription
    }
}

/// Monthly expense after what-if cuts, floored at zero. Cuts outside their
/// per-item slider range are clamped before applying.
pub fn adjusted_monthly_expense(base: i64, adjustments: ExpenseAdjustments) -> i64 {
    (base - adjustments.clamped().total()).max(0)
}

fn round_krw(value: f64) -> i64 {
    value.round() as i64
}

/// Year-by-year compounding projection from `current_age` through
/// [`HORIZON_AGE`]. The series is empty when `current_age` is past the
/// horizon. The running net-worth accumulator stays unrounded; records are
/// rounded to whole KRW at emission.
pub fn project(inputs: &SimulationInputs) -> SimulationResult {
    let capacity = (HORIZON_AGE + 1).saturating_sub(inputs.current_age) as usize;
    let mut data = Vec::with_capacity(capacity);
    let mut net_worth = inputs.initial_net_worth as f64;
    let mut fi_age: Option<u32> = None;
    let mut inflation_multiplier = 1.0_f64;

    for age in inputs.current_age..=HORIZON_AGE {
        let year_index = age - inputs.current_age;

        // Income and expense inflate at the same rate; documented
        // simplification carried over from the product model.
        let yearly_income = inputs.monthly_income as f64 * 12.0 * inflation_multiplier;
        let yearly_expense = inputs.monthly_expense as f64 * 12.0 * inflation_multiplier;
        let yearly_savings = (yearly_income - yearly_expense) * (inputs.savings_rate / 100.0);

        // Half-year convention: savings arrive spread over the year, so they
        // earn on average half a year of return.
        let investment_income =
            (net_worth + yearly_savings / 2.0) * (inputs.investment_return_rate / 100.0);
        net_worth += yearly_savings + investment_income;

        let target_annual_expense =
            inputs.target_monthly_expense as f64 * 12.0 * inflation_multiplier;
        let target_asset = target_annual_expense * FI_MULTIPLIER;
        let is_retired = net_worth >= target_asset;
        if is_retired && fi_age.is_none() {
            fi_age = Some(age);
        }

        let passive_income_monthly = net_worth * 0.04 / 12.0;

        data.push(YearlyData {
            age,
            year: inputs.base_year + year_index as i32,
            net_worth: round_krw(net_worth),
            investment_income: round_krw(investment_income),
            total_savings: round_krw(yearly_savings),
            passive_income_monthly: round_krw(passive_income_monthly),
            is_retired,
        });

        inflation_multiplier *= 1.0 + inputs.inflation_rate / 100.0;
    }

    SimulationResult {
        data,
        final_net_worth: round_krw(net_worth),
        financial_independence_age: fi_age,
    }
}

/// Headline metrics in today's money: the 4%-rule target asset, how much of
/// it the current net worth covers, and how long the current savings pace
/// takes to close the gap.
pub fn goal_summary(inputs: &SimulationInputs) -> GoalSummary {
    let target_asset = inputs.target_monthly_expense * 12 * 25;
    let monthly_savings = inputs.monthly_income - inputs.monthly_expense;

    let achievement_rate = if target_asset == 0 {
        // Nothing to reach; treat a zero target as already achieved.
        100
    } else {
        let rate = (inputs.initial_net_worth as f64 / target_asset as f64 * 100.0).round();
        rate.clamp(0.0, 100.0) as u32
    };

    let months_to_goal = if monthly_savings > 0 {
        let remaining = (target_asset - inputs.initial_net_worth).max(0);
        Some((remaining + monthly_savings - 1) / monthly_savings)
    } else {
        None
    };

    let raw_score =
        monthly_savings as f64 / inputs.monthly_income.max(1) as f64 * 100.0 + 35.0;
    let savings_score = ((raw_score * 10.0).round() / 10.0).clamp(10.0, 99.9);
    let peer_percentile = ((100.0 - savings_score).round() as i64).clamp(5, 95);

    GoalSummary {
        target_asset,
        monthly_savings,
        achievement_rate,
        months_to_goal,
        savings_score,
        peer_percentile,
        projected_5y_asset: inputs.initial_net_worth + monthly_savings * 60,
    }
}

/// Future value of a daily saving habit invested monthly at the given annual
/// rate (ordinary annuity, monthly compounding). A zero rate degrades to the
/// plain contribution sum instead of dividing by zero.
pub fn compound_savings_future_value(
    daily_save_amount: i64,
    annual_rate_pct: f64,
    years: u32,
) -> f64 {
    let monthly_contribution = (daily_save_amount * 30) as f64;
    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let months = (years * 12) as i32;
    if monthly_rate == 0.0 {
        return monthly_contribution * months as f64;
    }
    monthly_contribution * ((1.0 + monthly_rate).powi(months) - 1.0) / monthly_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_inputs() -> SimulationInputs {
        SimulationInputs {
            initial_net_worth: 50_000_000,
            monthly_income: 3_000_000,
            monthly_expense: 1_500_000,
            savings_rate: 100.0,
            investment_return_rate: 7.0,
            inflation_rate: 2.5,
            retirement_age: 60,
            current_age: 29,
            target_monthly_expense: 2_000_000,
            base_year: 2025,
        }
    }

    #[test]
    fn series_covers_every_age_through_horizon() {
        let result = project(&sample_inputs());
        assert_eq!(result.data.len(), 62);
        for (idx, row) in result.data.iter().enumerate() {
            assert_eq!(row.age, 29 + idx as u32);
            assert_eq!(row.year, 2025 + idx as i32);
        }
        assert_eq!(result.data.last().map(|row| row.age), Some(HORIZON_AGE));
    }

    #[test]
    fn golden_scenario_matches_reference_values() {
        let result = project(&sample_inputs());

        assert_eq!(result.final_net_worth, 28_869_361_885);
        assert_eq!(result.financial_independence_age, Some(46));

        let first = result.data[0];
        assert_eq!(first.net_worth, 72_130_000);
        assert_eq!(first.investment_income, 4_130_000);
        assert_eq!(first.total_savings, 18_000_000);
        assert_eq!(first.passive_income_monthly, 240_433);
        assert!(!first.is_retired);

        let last = result.data.last().expect("non-empty series");
        assert_eq!(last.net_worth, result.final_net_worth);
        assert!(last.is_retired);
    }

    #[test]
    fn projection_is_deterministic_for_identical_inputs() {
        let inputs = sample_inputs();
        let a = project(&inputs);
        let b = project(&inputs);
        assert_eq!(a.data, b.data);
        assert_eq!(a.final_net_worth, b.final_net_worth);
        assert_eq!(a.financial_independence_age, b.financial_independence_age);
    }

    #[test]
    fn past_horizon_age_yields_empty_series() {
        let mut inputs = sample_inputs();
        inputs.current_age = 91;
        let result = project(&inputs);
        assert!(result.data.is_empty());
        assert_eq!(result.final_net_worth, inputs.initial_net_worth);
        assert_eq!(result.financial_independence_age, None);
    }

    #[test]
    fn zero_target_expense_means_immediate_independence() {
        let mut inputs = sample_inputs();
        inputs.target_monthly_expense = 0;
        let result = project(&inputs);
        assert_eq!(result.financial_independence_age, Some(inputs.current_age));
        assert!(result.data[0].is_retired);
    }

    #[test]
    fn no_income_no_assets_never_grows() {
        let mut inputs = sample_inputs();
        inputs.initial_net_worth = 0;
        inputs.monthly_income = 0;
        inputs.investment_return_rate = 0.0;
        let result = project(&inputs);
        for pair in result.data.windows(2) {
            assert!(pair[1].net_worth <= pair[0].net_worth);
        }
        assert_eq!(result.financial_independence_age, None);
    }

    #[test]
    fn zero_return_accumulates_plain_savings() {
        let inputs = SimulationInputs {
            initial_net_worth: 0,
            monthly_income: 1_000_000,
            monthly_expense: 0,
            savings_rate: 100.0,
            investment_return_rate: 0.0,
            inflation_rate: 0.0,
            retirement_age: 65,
            current_age: 60,
            target_monthly_expense: 10_000_000,
            base_year: 2025,
        };
        let result = project(&inputs);
        // 31 years of 12M saved, no growth.
        assert_eq!(result.final_net_worth, 372_000_000);
        assert_eq!(result.financial_independence_age, None);
    }

    #[test]
    fn independence_age_is_the_first_retired_record() {
        let result = project(&sample_inputs());
        let first_retired = result
            .data
            .iter()
            .find(|row| row.is_retired)
            .map(|row| row.age);
        assert_eq!(result.financial_independence_age, first_retired);
    }

    #[test]
    fn base_year_shifts_only_the_calendar_column() {
        let mut inputs = sample_inputs();
        let a = project(&inputs);
        inputs.base_year = 1999;
        let b = project(&inputs);
        assert_eq!(a.final_net_worth, b.final_net_worth);
        assert_eq!(
            a.financial_independence_age,
            b.financial_independence_age
        );
        assert_eq!(b.data[0].year, 1999);
        assert_eq!(a.data[0].net_worth, b.data[0].net_worth);
    }

    #[test]
    fn expense_cuts_are_capped_and_floored() {
        let over = ExpenseAdjustments {
            coffee: 1_000_000,
            delivery: -50_000,
            subscription: 20_000,
        };
        assert_eq!(
            adjusted_monthly_expense(3_000_000, over),
            3_000_000 - COFFEE_CUT_MAX - 20_000
        );
        let all = ExpenseAdjustments {
            coffee: COFFEE_CUT_MAX,
            delivery: DELIVERY_CUT_MAX,
            subscription: SUBSCRIPTION_CUT_MAX,
        };
        assert_eq!(adjusted_monthly_expense(100_000, all), 0);
    }

    #[test]
    fn goal_summary_matches_hand_computed_values() {
        let summary = goal_summary(&sample_inputs());
        assert_eq!(summary.target_asset, 600_000_000);
        assert_eq!(summary.monthly_savings, 1_500_000);
        assert_eq!(summary.achievement_rate, 8);
        assert_eq!(summary.months_to_goal, Some(367));
        assert_approx_tol(summary.savings_score, 85.0, 1e-9);
        assert_eq!(summary.peer_percentile, 15);
        assert_eq!(summary.projected_5y_asset, 140_000_000);
    }

    #[test]
    fn goal_summary_with_zero_target_is_fully_achieved() {
        let mut inputs = sample_inputs();
        inputs.target_monthly_expense = 0;
        let summary = goal_summary(&inputs);
        assert_eq!(summary.achievement_rate, 100);
        assert_eq!(summary.months_to_goal, Some(0));
    }

    #[test]
    fn goal_summary_without_savings_has_no_goal_date() {
        let mut inputs = sample_inputs();
        inputs.monthly_expense = inputs.monthly_income;
        let summary = goal_summary(&inputs);
        assert_eq!(summary.months_to_goal, None);
        assert_approx_tol(summary.savings_score, 35.0, 1e-9);
    }

    #[test]
    fn compound_future_value_handles_zero_rate() {
        let fv = compound_savings_future_value(10_000, 0.0, 10);
        assert_approx_tol(fv, 36_000_000.0, 1e-9);
    }

    #[test]
    fn compound_future_value_matches_annuity_formula() {
        let fv = compound_savings_future_value(10_000, 7.0, 10);
        assert_approx_tol(fv, 51_925_442.23, 5.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_series_shape_holds_for_any_inputs(
            initial in 0i64..500_000_000,
            income in 0i64..20_000_000,
            expense in 0i64..20_000_000,
            savings_rate in 0u32..=100,
            return_bp in 0u32..2000,
            inflation_bp in 0u32..1000,
            current_age in 0u32..96,
            target in 0i64..10_000_000,
        ) {
            let inputs = SimulationInputs {
                initial_net_worth: initial,
                monthly_income: income,
                monthly_expense: expense,
                savings_rate: savings_rate as f64,
                investment_return_rate: return_bp as f64 / 100.0,
                inflation_rate: inflation_bp as f64 / 100.0,
                retirement_age: 60,
                current_age,
                target_monthly_expense: target,
                base_year: 2025,
            };
            let result = project(&inputs);

            if current_age > HORIZON_AGE {
                prop_assert!(result.data.is_empty());
            } else {
                prop_assert_eq!(result.data.len(), (HORIZON_AGE - current_age + 1) as usize);
            }
            for (idx, row) in result.data.iter().enumerate() {
                prop_assert_eq!(row.age, current_age + idx as u32);
                prop_assert_eq!(row.year, 2025 + idx as i32);
            }
        }

        #[test]
        fn prop_independence_age_is_first_crossing(
            initial in 0i64..500_000_000,
            income in 0i64..20_000_000,
            expense in 0i64..20_000_000,
            return_bp in 0u32..1500,
            current_age in 20u32..=90,
            target in 0i64..8_000_000,
        ) {
            let inputs = SimulationInputs {
                initial_net_worth: initial,
                monthly_income: income,
                monthly_expense: expense,
                savings_rate: 100.0,
                investment_return_rate: return_bp as f64 / 100.0,
                inflation_rate: 2.5,
                retirement_age: 60,
                current_age,
                target_monthly_expense: target,
                base_year: 2025,
            };
            let result = project(&inputs);
            let first_retired = result
                .data
                .iter()
                .find(|row| row.is_retired)
                .map(|row| row.age);
            prop_assert_eq!(result.financial_independence_age, first_retired);
        }

        #[test]
        fn prop_goal_summary_fields_stay_in_range(
            initial in 0i64..1_000_000_000,
            income in 0i64..20_000_000,
            expense in 0i64..20_000_000,
            target in 0i64..10_000_000,
        ) {
            let inputs = SimulationInputs {
                initial_net_worth: initial,
                monthly_income: income,
                monthly_expense: expense,
                savings_rate: 100.0,
                investment_return_rate: 7.0,
                inflation_rate: 2.5,
                retirement_age: 60,
                current_age: 29,
                target_monthly_expense: target,
                base_year: 2025,
            };
            let summary = goal_summary(&inputs);
            prop_assert!(summary.achievement_rate <= 100);
            prop_assert!((10.0..=99.9).contains(&summary.savings_score));
            prop_assert!((5..=95).contains(&summary.peer_percentile));
            if let Some(months) = summary.months_to_goal {
                prop_assert!(months >= 0);
            }
        }
    }
}
