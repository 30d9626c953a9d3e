use crate::model::Category;

/// A category fires when any question needle or any answer needle is a
/// substring of the lower-cased field.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    pub question_needles: &'static [&'static str],
    pub answer_needles: &'static [&'static str],
}

impl CategoryRule {
    fn matches(&self, question: &str, answer: &str) -> bool {
        self.question_needles.iter().any(|n| question.contains(n))
            || self.answer_needles.iter().any(|n| answer.contains(n))
    }
}

// Evaluated top to bottom, first hit wins.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Kyc,
        question_needles: &["kyc"],
        answer_needles: &["know your customer"],
    },
    CategoryRule {
        category: Category::Cards,
        question_needles: &["card"],
        answer_needles: &["debit card"],
    },
    CategoryRule {
        category: Category::Payments,
        question_needles: &["payment"],
        answer_needles: &["upi"],
    },
    CategoryRule {
        category: Category::AccountManagement,
        question_needles: &["account"],
        answer_needles: &[],
    },
    CategoryRule {
        category: Category::Rewards,
        question_needles: &["rewards"],
        answer_needles: &["cashback"],
    },
    CategoryRule {
        category: Category::LoansCredit,
        question_needles: &["loan", "credit"],
        answer_needles: &[],
    },
    CategoryRule {
        category: Category::SupportContact,
        question_needles: &["support", "contact"],
        answer_needles: &[],
    },
];

pub fn categorize(question: &str, answer: &str) -> Category {
    categorize_with(CATEGORY_RULES, question, answer)
}

pub fn categorize_with(rules: &[CategoryRule], question: &str, answer: &str) -> Category {
    let question = question.to_lowercase();
    let answer = answer.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&question, &answer))
        .map_or(Category::General, |rule| rule.category)
}
