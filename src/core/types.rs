use serde::{Deserialize, Serialize};

/// Planning domain selected at the start of the checkup. Decides which
/// baseline parameters and question set apply.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    RealEstate,
    Insurance,
    Stock,
    LifeBalance,
}

impl Category {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "real-estate" => Some(Category::RealEstate),
            "insurance" => Some(Category::Insurance),
            "stock" => Some(Category::Stock),
            "life-balance" => Some(Category::LifeBalance),
            _ => None,
        }
    }

    pub fn as_id(self) -> &'static str {
        match self {
            Category::RealEstate => "real-estate",
            Category::Insurance => "insurance",
            Category::Stock => "stock",
            Category::LifeBalance => "life-balance",
        }
    }
}

/// Full parameter set for one projection run. Currency fields are whole KRW.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInputs {
    pub initial_net_worth: i64,
    pub monthly_income: i64,
    pub monthly_expense: i64,
    /// Share of (income - expense) actually invested, in percent.
    pub savings_rate: f64,
    pub investment_return_rate: f64,
    pub inflation_rate: f64,
    pub retirement_age: u32,
    pub current_age: u32,
    /// Desired post-retirement monthly spend in today's money.
    pub target_monthly_expense: i64,
    /// Calendar year attached to the first simulated record. Supplied by the
    /// host so the engine never reads ambient time.
    pub base_year: i32,
}

/// One simulated year. Currency values are rounded to whole KRW at emission;
/// the engine's running accumulator stays unrounded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyData {
    pub age: u32,
    pub year: i32,
    pub net_worth: i64,
    pub investment_income: i64,
    pub total_savings: i64,
    pub passive_income_monthly: i64,
    pub is_retired: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub data: Vec<YearlyData>,
    pub final_net_worth: i64,
    /// First age at which net worth met the 4%-rule target, if ever.
    pub financial_independence_age: Option<u32>,
}

/// Quiz-derived subset of the simulation parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInputs {
    pub retirement_age: u32,
    pub target_monthly_expense: i64,
    pub initial_net_worth: i64,
    pub monthly_income: i64,
    pub monthly_expense: i64,
    pub investment_return_rate: f64,
}

/// Guide persona attached to a category on the result screens.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct GuideProfile {
    pub name: &'static str,
    pub role: &'static str,
    pub key: &'static str,
}

/// One interpreted quiz answer, shown in the "what we reflected" summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInsight {
    pub id: String,
    pub label: String,
    pub value: String,
    pub interpretation: String,
    pub impact: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceKind {
    Warning,
    Tip,
    Praise,
}

impl AdviceKind {
    /// Display rank: warnings surface before tips, tips before praise.
    pub fn priority(self) -> u8 {
        match self {
            AdviceKind::Warning => 0,
            AdviceKind::Tip => 1,
            AdviceKind::Praise => 2,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertAdvice {
    pub id: &'static str,
    pub agent_name: &'static str,
    pub agent_role: &'static str,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AdviceKind,
    pub trigger_condition: &'static str,
}

/// What-if spending cuts applied on top of a derived monthly expense.
#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpenseAdjustments {
    pub coffee: i64,
    pub delivery: i64,
    pub subscription: i64,
}

/// Headline metrics shown next to the projection, all in today's money.
#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub target_asset: i64,
    pub monthly_savings: i64,
    /// Share of the target asset already covered, clamped to [0, 100].
    pub achievement_rate: u32,
    /// Months of saving until the target asset is reached at the current
    /// pace; absent when nothing is being saved.
    pub months_to_goal: Option<i64>,
    pub savings_score: f64,
    pub peer_percentile: i64,
    pub projected_5y_asset: i64,
}
