mod advisor;
mod engine;
mod profile;
mod types;

pub use advisor::{
    SummaryMetrics, adjustment_tip, build_advices, final_guide_comment, primary_advice,
    result_guide_comment, simulation_guide_comment,
};
pub use engine::{
    COFFEE_CUT_MAX, DELIVERY_CUT_MAX, HORIZON_AGE, SUBSCRIPTION_CUT_MAX,
    adjusted_monthly_expense, compound_savings_future_value, goal_summary, project,
};
pub use profile::{
    AnswerMap, answer_insights, answer_number, answer_str, derive_plan_inputs, guide_profile,
};
pub use types::{
    AdviceKind, AnswerInsight, Category, ExpenseAdjustments, ExpertAdvice, GoalSummary,
    GuideProfile, PlanInputs, SimulationInputs, SimulationResult, YearlyData,
};
