use super::profile::{AnswerMap, answer_str};
use super::types::{AdviceKind, Category, ExpenseAdjustments, ExpertAdvice, SimulationInputs};

/// Metrics snapshot the commentary selectors read alongside the raw answers.
#[derive(Copy, Clone, Debug)]
pub struct SummaryMetrics {
    pub achievement_rate: u32,
    pub fi_age: Option<u32>,
    pub current_age: u32,
    pub target_asset: i64,
}

fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{}", rate as i64)
    } else {
        rate.to_string()
    }
}

/// Fixed rule list mapping a parameter set and the projection outcome onto
/// canned advisor messages. Each rule is independent; selection happens in
/// [`primary_advice`].
pub fn build_advices(inputs: &SimulationInputs, fi_age: Option<u32>) -> Vec<ExpertAdvice> {
    let mut advices = Vec::new();

    let savings_ratio = (inputs.monthly_income - inputs.monthly_expense) as f64
        / inputs.monthly_income as f64
        * 100.0;

    if savings_ratio < 20.0 {
        advices.push(ExpertAdvice {
            id: "low-savings",
            agent_name: "Agent Han",
            agent_role: "Real Estate Strategist",
            message: format!(
                "현재 저축률이 {savings_ratio:.1}% 수준이군. 시드머니를 모으기엔 턱없이 부족해. 고정 지출을 다시 점검하게."
            ),
            kind: AdviceKind::Warning,
            trigger_condition: "savingsRatio < 20",
        });
    }

    if inputs.investment_return_rate > 12.0 {
        advices.push(ExpertAdvice {
            id: "high-return-risk",
            agent_name: "Guardian Song",
            agent_role: "Risk Manager",
            message: format!(
                "연 수익률 {}%는 워렌 버핏도 쉽지 않은 숫자예요. 현실적인 목표(7~8%)로 낮추는 것이 안전합니다.",
                format_rate(inputs.investment_return_rate)
            ),
            kind: AdviceKind::Warning,
            trigger_condition: "returnRate > 12",
        });
    } else if inputs.monthly_expense as f64 > inputs.monthly_income as f64 * 0.7 {
        advices.push(ExpertAdvice {
            id: "high-expense",
            agent_name: "Guardian Song",
            agent_role: "Risk Manager",
            message: "버는 돈의 70% 이상을 쓰고 있어요. 비상금이 없을 때 큰 위기가 올 수 있습니다."
                .to_string(),
            kind: AdviceKind::Warning,
            trigger_condition: "expense > income * 0.7",
        });
    }

    if savings_ratio >= 50.0 {
        advices.push(ExpertAdvice {
            id: "good-savings",
            agent_name: "Trader Choi",
            agent_role: "Market Analyst",
            message: "훌륭해! 소득의 절반 이상을 미래에 투자하고 있군. 이 속도면 복리의 마법을 제대로 누릴 수 있어."
                .to_string(),
            kind: AdviceKind::Praise,
            trigger_condition: "savingsRatio >= 50",
        });
    }

    if inputs.retirement_age.saturating_sub(inputs.current_age) <= 5 && fi_age.is_none() {
        advices.push(ExpertAdvice {
            id: "short-term-goal",
            agent_name: "Trader Choi",
            agent_role: "Market Analyst",
            message: "은퇴까지 시간이 얼마 남지 않았네. 지금은 공격적인 투자보다 현금 흐름을 확보하는 배당 주식이나 채권 비중을 높여야 해."
                .to_string(),
            kind: AdviceKind::Tip,
            trigger_condition: "yearsToRetire <= 5",
        });
    }

    if let Some(age) = fi_age {
        if age < inputs.retirement_age {
            advices.push(ExpertAdvice {
                id: "early-fi",
                agent_name: "Director Yoo",
                agent_role: "Life Balancer",
                message: format!(
                    "놀라워요! 계획대로라면 {age}세에 경제적 자유를 얻게 됩니다. 남은 시간은 당신이 진짜 하고 싶은 일에 써보세요."
                ),
                kind: AdviceKind::Praise,
                trigger_condition: "fiAge < retirementAge",
            });
        }
    }

    if fi_age.is_none() {
        advices.push(ExpertAdvice {
            id: "cannot-retire",
            agent_name: "Director Yoo",
            agent_role: "Life Balancer",
            message: format!(
                "지금 패턴으로는 {}세 은퇴가 어려울 수 있어요. 은퇴 후 생활비를 조금 조정하거나, 부업으로 소득을 늘려보는 건 어떨까요?",
                inputs.retirement_age
            ),
            kind: AdviceKind::Warning,
            trigger_condition: "fiImpossible",
        });
    }

    advices
}

/// Most urgent advice under the fixed rank (warning before tip before
/// praise); stable within a rank, so earlier rules win ties.
pub fn primary_advice(advices: &[ExpertAdvice]) -> Option<&ExpertAdvice> {
    advices.iter().min_by_key(|advice| advice.kind.priority())
}

pub fn result_guide_comment(category: Category, answers: &AnswerMap) -> String {
    match category {
        Category::RealEstate => match answer_str(answers, "r1").as_str() {
            "매매" => "매매를 고려하고 계시므로, 월 상환 여력을 우선 안정적으로 잡아드리겠습니다.".to_string(),
            "전세" => "전세 전략을 선택하셨으니, 종잣돈 축적 속도를 중심으로 계산해드리겠습니다.".to_string(),
            _ => "주거 전략이 흔들리지 않도록 목표 자산과 월 현금흐름을 함께 맞춰드리겠습니다.".to_string(),
        },
        Category::Insurance => {
            if answer_str(answers, "i1") == "없음" {
                "비상자금이 없는 상태라서, 먼저 방어 자산을 확보하는 시나리오로 계산해드리겠습니다.".to_string()
            } else {
                "보장과 현금흐름의 균형을 맞춰서 장기적으로 버틸 수 있는 구조로 잡아드리겠습니다.".to_string()
            }
        }
        Category::Stock => match answer_str(answers, "s2").as_str() {
            "매우 낮음" | "낮음" => "변동성 허용 범위를 낮게 잡으셔서, 보수적인 수익률 기준으로 시뮬레이션하겠습니다.".to_string(),
            "높음" => "공격 성향을 반영해 기대수익률을 높게 두되, 손실 방어 구간도 함께 보겠습니다.".to_string(),
            _ => "투자 성향을 기준으로 무리하지 않는 복리 경로를 제안드리겠습니다.".to_string(),
        },
        Category::LifeBalance => {
            let goal = answer_str(answers, "l1");
            if goal.is_empty() {
                "삶의 목표와 자산 계획이 함께 맞물리도록 현실적인 경로를 제안드리겠습니다.".to_string()
            } else {
                format!("선택하신 목표({goal})를 우선순위로 두고, 지출 조정과 은퇴 시점을 함께 맞춰드리겠습니다.")
            }
        }
    }
}

pub fn simulation_guide_comment(
    category: Category,
    answers: &AnswerMap,
    metrics: &SummaryMetrics,
) -> String {
    let Some(fi_age) = metrics.fi_age else {
        return "현재 조건으로는 목표 시점 도달이 어려워 보입니다. 지출 조정 항목을 적용해 흐름을 먼저 개선해보시죠."
            .to_string();
    };

    let years = fi_age.saturating_sub(metrics.current_age);
    match category {
        Category::RealEstate => format!(
            "부동산 목표를 고려하면 약 {years}년 후에 경제적 자유 구간에 들어가실 수 있습니다. 주거 자금과 비상자금 분리를 권장드립니다."
        ),
        Category::Insurance => format!(
            "현재 추세라면 {years}년 후 안정 구간에 진입 가능합니다. 고정비 점검을 병행하시면 도달 속도를 더 높이실 수 있습니다."
        ),
        Category::Stock => {
            let theme = match answer_str(answers, "s5") {
                theme if theme.is_empty() => "핵심 자산".to_string(),
                theme => theme,
            };
            format!(
                "{theme} 관심도를 반영해 계산한 결과, 약 {years}년 후 목표 구간에 접근 가능합니다. 분산 비중만 유지하시면 안정적입니다."
            )
        }
        Category::LifeBalance => format!(
            "선택하신 라이프 목표를 기준으로 약 {years}년 후 달성이 가능해 보입니다. 루틴형 절약을 유지하시면 더 빨라질 수 있습니다."
        ),
    }
}

pub fn final_guide_comment(category: Category, answers: &AnswerMap) -> String {
    match category {
        Category::RealEstate => {
            let strategy = match answer_str(answers, "r6") {
                strategy if strategy.is_empty() => "주거 전략".to_string(),
                strategy => strategy,
            };
            format!(
                "{strategy} 방향으로 진행하시되, 첫 2주 동안은 지출 조정과 비상자금 분리부터 실행하시면 좋겠습니다."
            )
        }
        Category::Insurance => {
            "보장 점검과 현금흐름 정리를 먼저 진행하시면, 이후 투자/저축 계획이 훨씬 안정적으로 유지됩니다."
                .to_string()
        }
        Category::Stock => {
            "핵심 ETF 중심 비중을 먼저 고정하시고, 관심 테마는 보조 비중으로 관리하시면 장기 성과가 좋아집니다."
                .to_string()
        }
        Category::LifeBalance => {
            let habit = match answer_str(answers, "l3") {
                habit if habit.is_empty() => "절약 루틴".to_string(),
                habit => habit,
            };
            format!(
                "{habit}부터 실행하시고 월간 리뷰를 붙이시면, 목표 시점이 실제로 앞당겨질 가능성이 높습니다."
            )
        }
    }
}

/// Encouragement line under the what-if sliders; first matching threshold
/// wins.
pub fn adjustment_tip(adjustments: ExpenseAdjustments) -> &'static str {
    let adjustments = adjustments.clamped();
    if adjustments.total() >= 250_000 {
        return "아주 좋습니다. 지금 조정 폭이면 목표 시점 단축 가능성이 확실히 높아졌습니다.";
    }
    if adjustments.delivery >= 100_000 {
        return "배달비 조정 효과가 크게 반영되고 있습니다. 유지하시면 체감이 빨리 올라옵니다.";
    }
    if adjustments.coffee >= 50_000 {
        return "커피 지출 조정이 안정적으로 누적되고 있습니다. 실천 지속성이 강점입니다.";
    }
    if adjustments.subscription >= 30_000 {
        return "구독비 정리가 월 고정비를 깔끔하게 줄여주고 있습니다.";
    }
    "지금 페이스도 충분히 좋습니다. 무리 없이 유지 가능한 항목부터 이어가시면 됩니다."
}
