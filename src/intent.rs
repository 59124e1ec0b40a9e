use crate::language::Language;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Paid,
    NotPaid,
    NeedHelp,
    CallBack,
    Unknown,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Paid => "paid",
            Intent::NotPaid => "not_paid",
            Intent::NeedHelp => "need_help",
            Intent::CallBack => "call_back",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which question a reply answers; each has its own keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    Payment,
    Help,
    Survey,
}

#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: Vec<String>,
}

impl IntentRule {
    fn new(intent: Intent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn with_localized(mut self, localized: &[&str]) -> Self {
        self.keywords
            .extend(localized.iter().map(|k| k.to_lowercase()));
        self
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && text.contains(k.as_str()))
    }
}

/// Ordered keyword rules. The first rule with a keyword contained in the
/// reply decides the intent.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    pub fn for_set(set: RuleSet, language: Language) -> Self {
        match set {
            RuleSet::Payment => Self::payment(language),
            RuleSet::Help => Self::help(language),
            RuleSet::Survey => Self::survey(),
        }
    }

    pub fn payment(language: Language) -> Self {
        let paid = IntentRule::new(Intent::Paid, &["yes"]);
        let not_paid = IntentRule::new(Intent::NotPaid, &["no", "not yet"]);
        let call_back = IntentRule::new(Intent::CallBack, &["call back"]);

        let rules = match language {
            Language::English => vec![paid, not_paid, call_back],
            Language::Russian => vec![
                paid.with_localized(&["да"]),
                not_paid.with_localized(&["нет"]),
                call_back.with_localized(&["перезвони"]),
            ],
            Language::Uzbek => vec![
                paid.with_localized(&["ha"]),
                not_paid.with_localized(&["yo'q"]),
                call_back.with_localized(&["qayta"]),
            ],
        };
        Self::new(rules)
    }

    pub fn help(language: Language) -> Self {
        let need_help = IntentRule::new(Intent::NeedHelp, &["yes", "i need help"]);
        let need_help = match language {
            Language::English => need_help,
            Language::Russian => need_help.with_localized(&["да", "нужна помощь", "помоги"]),
            Language::Uzbek => need_help.with_localized(&["ha", "yordam"]),
        };
        Self::new(vec![need_help])
    }

    pub fn survey() -> Self {
        Self::new(vec![
            IntentRule::new(
                Intent::Paid,
                &["оплатил", "уже оплатил", "платеж был", "already paid"],
            ),
            IntentRule::new(Intent::NeedHelp, &["нужна помощь", "помощь", "help", "support"]),
            IntentRule::new(
                Intent::CallBack,
                &["перезвоните позже", "позже", "not now", "call me later"],
            ),
        ])
    }

    /// Appends configured keywords to the rule of the same intent. Intents
    /// without a rule in this set get a new rule at the end.
    pub fn with_extra_keywords(mut self, extra: &HashMap<Intent, Vec<String>>) -> Self {
        for intent in [Intent::Paid, Intent::NotPaid, Intent::NeedHelp, Intent::CallBack] {
            let Some(keywords) = extra.get(&intent).filter(|k| !k.is_empty()) else {
                continue;
            };
            let lowered = keywords.iter().map(|k| k.to_lowercase());
            match self.rules.iter_mut().find(|r| r.intent == intent) {
                Some(rule) => rule.keywords.extend(lowered),
                None => self.rules.push(IntentRule {
                    intent,
                    keywords: lowered.collect(),
                }),
            }
        }
        self
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> Intent {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Intent::Unknown;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_matching_is_case_insensitive() {
        let classifier = IntentClassifier::payment(Language::English);
        assert_eq!(classifier.classify("YES I did"), Intent::Paid);
        assert_eq!(classifier.classify("Not yet"), Intent::NotPaid);
        assert_eq!(classifier.classify("please call back tomorrow"), Intent::CallBack);
    }

    #[test]
    fn first_matching_rule_wins() {
        let classifier = IntentClassifier::payment(Language::English);
        // contains both "yes" and "call back"
        assert_eq!(classifier.classify("yes, but call back later"), Intent::Paid);
    }

    #[test]
    fn localized_keywords_only_for_their_language() {
        assert_eq!(
            IntentClassifier::payment(Language::Russian).classify("да, оплатил"),
            Intent::Paid
        );
        assert_eq!(
            IntentClassifier::payment(Language::English).classify("да"),
            Intent::Unknown
        );
        assert_eq!(
            IntentClassifier::payment(Language::Uzbek).classify("qayta qo'ng'iroq qiling"),
            Intent::CallBack
        );
    }

    #[test]
    fn empty_or_unmatched_is_unknown() {
        let classifier = IntentClassifier::survey();
        assert_eq!(classifier.classify(""), Intent::Unknown);
        assert_eq!(classifier.classify("   "), Intent::Unknown);
        assert_eq!(classifier.classify("what is this about"), Intent::Unknown);
    }

    #[test]
    fn survey_rules() {
        let classifier = IntentClassifier::survey();
        assert_eq!(classifier.classify("я уже оплатил"), Intent::Paid);
        assert_eq!(classifier.classify("I need support"), Intent::NeedHelp);
        assert_eq!(classifier.classify("not now please"), Intent::CallBack);
    }

    #[test]
    fn extra_keywords_extend_existing_rule() {
        let mut extra = HashMap::new();
        extra.insert(Intent::Paid, vec!["Paid Already".to_string()]);
        extra.insert(Intent::NeedHelp, vec!["operator".to_string()]);
        let classifier = IntentClassifier::payment(Language::English).with_extra_keywords(&extra);

        assert_eq!(classifier.classify("i paid already"), Intent::Paid);
        assert_eq!(classifier.classify("give me an operator"), Intent::NeedHelp);
        assert_eq!(classifier.rules().last().map(|r| r.intent), Some(Intent::NeedHelp));
    }

    #[test]
    fn help_rules() {
        assert_eq!(
            IntentClassifier::help(Language::Russian).classify("нужна помощь"),
            Intent::NeedHelp
        );
        assert_eq!(
            IntentClassifier::help(Language::English).classify("nope"),
            Intent::Unknown
        );
    }
}
