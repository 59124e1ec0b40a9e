use super::{Conversation, Voice};
use crate::intent::{Intent, RuleSet};
use crate::language::Language;
use crate::phrases::{phrase, PhraseKey};
use crate::record::{CallRecord, Outcome};
use crate::speech::SpeechRecognizer;

const MOBILE_KEYWORDS: &[&str] = &["моб", "mobile", "mobil"];
const DEBT_KEYWORDS: &[&str] = &["долг", "задолж", "debt", "qarz"];

pub(super) fn run<V, R>(conv: &mut Conversation<'_, V, R>) -> anyhow::Result<CallRecord>
where
    V: Voice + ?Sized,
    R: SpeechRecognizer + ?Sized,
{
    let ctx = conv.ctx;

    conv.say(Language::Russian, PhraseKey::SurveyIntro)?;
    let choice = conv.ask(Language::Russian, PhraseKey::SurveyLanguage)?;
    let language = pick_language(choice.heard_or_empty());

    let age = conv.ask(language, PhraseKey::SurveyAge)?;
    let channel = conv.ask(language, PhraseKey::SurveyChannel)?;
    let topic = conv.ask(language, PhraseKey::SurveyNotification)?;

    let now = ctx.started_at.format("%H:%M");
    let line = format!("{}{}", phrase(language, PhraseKey::SurveyCallTime), now);
    conv.say_text(language, &line)?;
    let convenient = conv.listen(language);
    tracing::debug!(reply = convenient.text(), "call time convenience");

    let history = conv.ask(language, PhraseKey::SurveyHistory)?;

    let channel = if contains_any(channel.heard_or_empty(), MOBILE_KEYWORDS) {
        "mobile"
    } else {
        "landline"
    };
    let is_debt = contains_any(topic.heard_or_empty(), DEBT_KEYWORDS);

    conv.say(language, PhraseKey::StartingCall)?;
    conv.say(language, PhraseKey::BankHello)?;
    conv.say(
        language,
        if is_debt {
            PhraseKey::DebtDue
        } else {
            PhraseKey::TariffUpdate
        },
    )?;

    let reply = conv.listen(language);
    let response = reply.heard_or_empty().to_string();
    let intent = ctx.classifier(RuleSet::Survey, language).classify(&response);

    let (closing, result, comment) = match intent {
        Intent::Paid => (PhraseKey::ThanksForPayment, Outcome::Success, "confirmed payment"),
        Intent::NeedHelp => (PhraseKey::RepresentativeWillCall, Outcome::Success, "asked for help"),
        Intent::CallBack => (PhraseKey::WillCallLater, Outcome::Fail, "call back requested"),
        Intent::NotPaid | Intent::Unknown if response.is_empty() => {
            (PhraseKey::NoResponse, Outcome::Fail, "no response")
        }
        Intent::NotPaid | Intent::Unknown => (PhraseKey::ThanksGoodbye, Outcome::Success, "info received"),
    };
    conv.say(language, closing)?;

    let mut record = CallRecord::new(ctx.client_id, result, comment, language, ctx.started_at);
    record.age = age.heard_or_empty().to_string();
    record.channel = channel.to_string();
    record.notification = if is_debt { "debt" } else { "tariff" }.to_string();
    record.history_confirmation = history.heard_or_empty().to_string();
    record.intent = intent.to_string();
    record.response = response;
    Ok(record)
}

/// A named language wins. Silence keeps the survey in Russian; anything else
/// switches to English.
fn pick_language(reply: &str) -> Language {
    match Language::detect(reply) {
        Some(language) => language,
        None if reply.is_empty() => Language::Russian,
        None => Language::English,
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|k| text.contains(k))
}
