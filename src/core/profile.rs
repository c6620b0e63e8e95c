use std::collections::BTreeMap;

use serde_json::Value;

use super::types::{AnswerInsight, Category, GuideProfile, PlanInputs};

/// Quiz answers as delivered by the client: loosely typed, possibly sparse,
/// possibly malformed. Every function here tolerates all of that.
pub type AnswerMap = BTreeMap<String, Value>;

const RETIREMENT_AGE_MIN: i32 = 40;
const RETIREMENT_AGE_MAX: i32 = 65;
const DEFAULT_CURRENT_AGE: f64 = 29.0;

/// How a rule recognizes an answer value.
enum Trigger {
    Is(&'static str),
    AnyOf(&'static [&'static str]),
    /// Any non-empty answer except the explicit "none" option.
    Given,
}

impl Trigger {
    fn matches(&self, answer: &str) -> bool {
        match self {
            Trigger::Is(expected) => answer == *expected,
            Trigger::AnyOf(options) => options.iter().any(|option| *option == answer),
            Trigger::Given => !answer.is_empty() && answer != "없음",
        }
    }
}

#[derive(Copy, Clone)]
enum Effect {
    ReturnRateDelta(f64),
    ReturnRate(f64),
    RetirementDelta(i32),
    RetirementAge(i32),
    TargetExpenseDelta(i64),
    ExpenseDelta(i64),
    NetWorthDelta(i64),
}

struct AnswerRule {
    question: &'static str,
    trigger: Trigger,
    effects: &'static [Effect],
}

/// `c3` is asked in every category and nudges the plan toward the value the
/// user picked before any category-specific rule runs.
const CORE_VALUE_RULES: &[AnswerRule] = &[
    AnswerRule {
        question: "c3",
        trigger: Trigger::Is("성장"),
        effects: &[Effect::ReturnRateDelta(1.0)],
    },
    AnswerRule {
        question: "c3",
        trigger: Trigger::Is("안정"),
        effects: &[Effect::ReturnRateDelta(-1.0), Effect::RetirementDelta(3)],
    },
    AnswerRule {
        question: "c3",
        trigger: Trigger::Is("자유"),
        effects: &[
            Effect::RetirementDelta(-3),
            Effect::TargetExpenseDelta(200_000),
        ],
    },
    AnswerRule {
        question: "c3",
        trigger: Trigger::Is("건강"),
        effects: &[
            Effect::TargetExpenseDelta(300_000),
            Effect::ExpenseDelta(200_000),
        ],
    },
];

const REAL_ESTATE_RULES: &[AnswerRule] = &[
    AnswerRule {
        question: "r1",
        trigger: Trigger::Is("매매"),
        effects: &[
            Effect::TargetExpenseDelta(300_000),
            Effect::ExpenseDelta(200_000),
        ],
    },
    AnswerRule {
        question: "r3",
        trigger: Trigger::Is("150만원 이상"),
        effects: &[Effect::ExpenseDelta(400_000)],
    },
    AnswerRule {
        question: "r3",
        trigger: Trigger::Is("50만원 이하"),
        effects: &[Effect::ExpenseDelta(-200_000)],
    },
    AnswerRule {
        question: "r6",
        trigger: Trigger::Is("청약"),
        effects: &[Effect::RetirementDelta(-1)],
    },
];

const INSURANCE_RULES: &[AnswerRule] = &[
    AnswerRule {
        question: "i1",
        trigger: Trigger::Is("없음"),
        effects: &[
            Effect::NetWorthDelta(-15_000_000),
            Effect::ExpenseDelta(150_000),
        ],
    },
    AnswerRule {
        question: "i1",
        trigger: Trigger::Is("6개월 이상"),
        effects: &[Effect::NetWorthDelta(15_000_000)],
    },
    AnswerRule {
        question: "i5",
        trigger: Trigger::Is("있다"),
        effects: &[Effect::ExpenseDelta(-120_000)],
    },
    AnswerRule {
        question: "i3",
        trigger: Trigger::Is("잘 되고 있음"),
        effects: &[Effect::RetirementDelta(-1)],
    },
];

const STOCK_RULES: &[AnswerRule] = &[
    AnswerRule {
        question: "s2",
        trigger: Trigger::AnyOf(&["매우 낮음", "낮음"]),
        effects: &[Effect::ReturnRate(5.0)],
    },
    AnswerRule {
        question: "s2",
        trigger: Trigger::Is("높음"),
        effects: &[Effect::ReturnRate(10.0)],
    },
    AnswerRule {
        question: "s4",
        trigger: Trigger::Is("50만원 이상"),
        effects: &[Effect::ExpenseDelta(-300_000)],
    },
    AnswerRule {
        question: "s4",
        trigger: Trigger::Is("10만원 이하"),
        effects: &[Effect::ExpenseDelta(150_000)],
    },
];

const LIFE_BALANCE_RULES: &[AnswerRule] = &[
    AnswerRule {
        question: "l2",
        trigger: Trigger::Is("1년 이내"),
        effects: &[Effect::RetirementAge(40)],
    },
    AnswerRule {
        question: "l2",
        trigger: Trigger::Is("3년 이내"),
        effects: &[Effect::RetirementAge(45)],
    },
    AnswerRule {
        question: "l2",
        trigger: Trigger::Is("5년 이내"),
        effects: &[Effect::RetirementAge(50)],
    },
    AnswerRule {
        question: "l2",
        trigger: Trigger::Is("10년 이내"),
        effects: &[Effect::RetirementAge(60)],
    },
    AnswerRule {
        question: "l3",
        trigger: Trigger::Given,
        effects: &[Effect::ExpenseDelta(-120_000)],
    },
];

fn category_rules(category: Category) -> &'static [AnswerRule] {
    match category {
        Category::RealEstate => REAL_ESTATE_RULES,
        Category::Insurance => INSURANCE_RULES,
        Category::Stock => STOCK_RULES,
        Category::LifeBalance => LIFE_BALANCE_RULES,
    }
}

fn baseline(category: Category) -> PlanInputs {
    match category {
        Category::RealEstate => PlanInputs {
            retirement_age: 45,
            target_monthly_expense: 3_000_000,
            initial_net_worth: 150_000_000,
            monthly_income: 6_000_000,
            monthly_expense: 3_500_000,
            investment_return_rate: 7.0,
        },
        Category::Insurance => PlanInputs {
            retirement_age: 50,
            target_monthly_expense: 2_500_000,
            initial_net_worth: 80_000_000,
            monthly_income: 4_500_000,
            monthly_expense: 2_800_000,
            investment_return_rate: 5.0,
        },
        Category::Stock => PlanInputs {
            retirement_age: 45,
            target_monthly_expense: 3_500_000,
            initial_net_worth: 90_000_000,
            monthly_income: 5_500_000,
            monthly_expense: 3_000_000,
            investment_return_rate: 9.0,
        },
        Category::LifeBalance => PlanInputs {
            retirement_age: 50,
            target_monthly_expense: 3_000_000,
            initial_net_worth: 120_000_000,
            monthly_income: 5_000_000,
            monthly_expense: 3_200_000,
            investment_return_rate: 7.0,
        },
    }
}

pub fn guide_profile(category: Category) -> GuideProfile {
    match category {
        Category::RealEstate => GuideProfile {
            name: "에이전트 한",
            role: "부동산 전략",
            key: "han",
        },
        Category::Insurance => GuideProfile {
            name: "에이전트 송",
            role: "기초자산 설계",
            key: "song",
        },
        Category::Stock => GuideProfile {
            name: "에이전트 최",
            role: "투자 분석",
            key: "choi",
        },
        Category::LifeBalance => GuideProfile {
            name: "에이전트 유",
            role: "라이프 밸런스",
            key: "you",
        },
    }
}

/// Working copy of a plan while rules run; fields are wide enough that
/// adjustments can leave the legal range before the final clamp.
struct PlanDraft {
    retirement_age: i32,
    target_monthly_expense: i64,
    initial_net_worth: i64,
    monthly_income: i64,
    monthly_expense: i64,
    investment_return_rate: f64,
}

impl PlanDraft {
    fn from_baseline(base: PlanInputs) -> Self {
        PlanDraft {
            retirement_age: base.retirement_age as i32,
            target_monthly_expense: base.target_monthly_expense,
            initial_net_worth: base.initial_net_worth,
            monthly_income: base.monthly_income,
            monthly_expense: base.monthly_expense,
            investment_return_rate: base.investment_return_rate,
        }
    }

    fn apply(&mut self, effects: &[Effect]) {
        for effect in effects {
            match *effect {
                Effect::ReturnRateDelta(delta) => self.investment_return_rate += delta,
                Effect::ReturnRate(rate) => self.investment_return_rate = rate,
                Effect::RetirementDelta(delta) => self.retirement_age += delta,
                Effect::RetirementAge(age) => self.retirement_age = age,
                Effect::TargetExpenseDelta(delta) => self.target_monthly_expense += delta,
                Effect::ExpenseDelta(delta) => self.monthly_expense += delta,
                Effect::NetWorthDelta(delta) => self.initial_net_worth += delta,
            }
        }
    }

    fn clamped(&self) -> PlanInputs {
        PlanInputs {
            retirement_age: self
                .retirement_age
                .clamp(RETIREMENT_AGE_MIN, RETIREMENT_AGE_MAX) as u32,
            target_monthly_expense: self.target_monthly_expense.clamp(1_800_000, 9_000_000),
            initial_net_worth: self.initial_net_worth.clamp(10_000_000, 500_000_000),
            monthly_income: self.monthly_income.clamp(1_500_000, 15_000_000),
            monthly_expense: self.monthly_expense.clamp(1_000_000, 12_000_000),
            investment_return_rate: self.investment_return_rate.clamp(3.0, 12.0),
        }
    }
}

/// Maps a category plus a raw answer map onto a fully-populated, in-bounds
/// parameter set. Unrecognized categories fall back to real-estate; missing
/// or unmatched answers leave the baseline untouched.
pub fn derive_plan_inputs(category_id: &str, answers: &AnswerMap) -> PlanInputs {
    let category = Category::from_id(category_id).unwrap_or(Category::RealEstate);
    let mut draft = PlanDraft::from_baseline(baseline(category));

    for rule_set in [CORE_VALUE_RULES, category_rules(category)] {
        for rule in rule_set {
            if rule.trigger.matches(&answer_str(answers, rule.question)) {
                draft.apply(rule.effects);
            }
        }
    }

    let mut plan = draft.clamped();

    // Retirement must stay in the future relative to the stated current age.
    let stated_age = answer_number(answers, "c2", DEFAULT_CURRENT_AGE);
    if plan.retirement_age as f64 <= stated_age {
        let forced = (stated_age + 5.0).clamp(RETIREMENT_AGE_MIN as f64, RETIREMENT_AGE_MAX as f64);
        plan.retirement_age = forced.round() as u32;
    }

    plan
}

pub fn answer_str(answers: &AnswerMap, key: &str) -> String {
    answers.get(key).map(value_to_string).unwrap_or_default()
}

pub fn answer_number(answers: &AnswerMap, key: &str, fallback: f64) -> f64 {
    let parsed = match answers.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(fallback)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

const QUESTION_LABELS: &[(&str, &str)] = &[
    ("c1", "이름"),
    ("c2", "현재 나이"),
    ("c3", "중요 가치"),
    ("r1", "주거 형태"),
    ("r2", "입지 우선순위"),
    ("r3", "월 상환 가능액"),
    ("r4", "매매 전환 의향"),
    ("r5", "걱정 변수"),
    ("r6", "선호 전략"),
    ("i1", "비상금 수준"),
    ("i2", "보험 목적 이해도"),
    ("i3", "연금 준비 상태"),
    ("i4", "취약 지출 항목"),
    ("i5", "절감 가능 항목"),
    ("i6", "노후 생활비 준비"),
    ("s1", "투자 경험"),
    ("s2", "변동성 허용"),
    ("s3", "투자 기간"),
    ("s4", "월 투자 여력"),
    ("s5", "관심 투자 테마"),
    ("s6", "손실 감내 수준"),
    ("l1", "핵심 목표"),
    ("l2", "목표 시점"),
    ("l3", "절감 가능 지출"),
    ("l4", "포기 불가 가치"),
    ("l5", "달성 후 계획"),
    ("l6", "방해 습관"),
];

fn question_label(id: &str) -> Option<&'static str> {
    QUESTION_LABELS
        .iter()
        .find(|(question, _)| *question == id)
        .map(|(_, label)| *label)
}

fn insight_for(id: &str, value: &str) -> (&'static str, &'static str) {
    match (id, value) {
        ("c3", "안정") => (
            "안정 지향 성향이 강합니다.",
            "수익률은 보수적으로, 목표 시점은 여유 있게 설정됩니다.",
        ),
        ("c3", "성장") => (
            "성장 지향 성향이 강합니다.",
            "기대 수익률이 소폭 상향 반영됩니다.",
        ),
        ("c3", "자유") => (
            "빠른 시점의 자유를 중요하게 보십니다.",
            "목표 은퇴 나이가 앞당겨져 계산됩니다.",
        ),
        ("c3", "건강") => (
            "삶의 질과 건강 비용을 우선으로 두셨습니다.",
            "목표 생활비가 상향 반영됩니다.",
        ),
        ("r1", "매매") => (
            "매매 전환 의지가 명확합니다.",
            "월 지출/생활비 가정치가 높아져 목표 자산이 증가합니다.",
        ),
        ("r1", "전세") => (
            "유동성 유지 전략을 선택하셨습니다.",
            "종잣돈 축적 속도 중심으로 경로가 계산됩니다.",
        ),
        ("i1", "없음") => (
            "비상 대응 여력이 부족한 상태입니다.",
            "방어 자산 우선 시나리오로 계산됩니다.",
        ),
        ("i1", "6개월 이상") => (
            "기초 방어력은 양호한 편입니다.",
            "안정 구간 진입 확률이 높게 반영됩니다.",
        ),
        ("s2", "매우 낮음") | ("s2", "낮음") => (
            "변동성 민감도가 높습니다.",
            "예상 수익률이 보수적으로 적용됩니다.",
        ),
        ("s2", "높음") => (
            "리스크 감내 수준이 높은 편입니다.",
            "예상 수익률 상향 시나리오가 적용됩니다.",
        ),
        ("l2", _) => (
            "목표 시점 의지가 분명합니다.",
            "은퇴 목표 나이/시간축에 직접 반영됩니다.",
        ),
        _ => (
            "해당 선택이 계획에 반영되었습니다.",
            "가이드 시뮬레이션에서 연관 지표를 조정합니다.",
        ),
    }
}

/// Labeled interpretations of the first `limit` answered questions. The
/// wizard's consent marker (`c0`) and empty answers are skipped; multi-select
/// answers are joined into one display string.
pub fn answer_insights(answers: &AnswerMap, limit: usize) -> Vec<AnswerInsight> {
    answers
        .iter()
        .filter(|(key, _)| key.as_str() != "c0")
        .map(|(key, value)| (key, value_to_string(value)))
        .filter(|(_, value)| !value.is_empty())
        .take(limit)
        .map(|(id, value)| {
            let (interpretation, impact) = insight_for(id, &value);
            AnswerInsight {
                label: question_label(id).unwrap_or(id).to_string(),
                id: id.clone(),
                value,
                interpretation: interpretation.to_string(),
                impact: impact.to_string(),
            }
        })
        .collect()
}
