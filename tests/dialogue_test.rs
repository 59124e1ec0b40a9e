use chrono::{Local, TimeZone};
use collections_bot::dialogue::{run_call, CallContext, Script, Voice};
use collections_bot::language::Language;
use collections_bot::phrases::{phrase, PhraseKey};
use collections_bot::record::Outcome;
use collections_bot::speech::ScriptedRecognizer;
use std::time::Duration;

#[derive(Default)]
struct RecordingVoice {
    lines: Vec<(Language, String)>,
}

impl RecordingVoice {
    fn said(&self, language: Language, key: PhraseKey) -> bool {
        let text = phrase(language, key);
        self.lines.iter().any(|(l, t)| *l == language && t == text)
    }
}

impl Voice for RecordingVoice {
    fn say(&mut self, language: Language, text: &str) -> anyhow::Result<()> {
        self.lines.push((language, text.to_string()));
        Ok(())
    }
}

fn context() -> CallContext {
    let started_at = Local.with_ymd_and_hms(2025, 4, 24, 14, 5, 0).unwrap();
    let mut ctx = CallContext::new(10001, started_at);
    ctx.help_hold = Duration::ZERO;
    ctx
}

fn call(script: Script, replies: &[&str]) -> (collections_bot::record::CallRecord, RecordingVoice) {
    let mut voice = RecordingVoice::default();
    let mut recognizer = ScriptedRecognizer::new(replies.iter().copied());
    let record = run_call(script, &context(), &mut voice, &mut recognizer).unwrap();
    (record, voice)
}

#[test]
fn collections_full_questionnaire() {
    let (record, voice) = call(
        Script::Collections,
        &["English", "Yes", "no thanks", "John", "30", "SMS", "phone call"],
    );

    assert_eq!(record.result, Outcome::Success);
    assert_eq!(record.language, Language::English);
    assert_eq!(
        record.comment,
        "payment_status: paid; name: john; age: 30; notify: sms; comm: phone call"
    );
    assert_eq!(record.payment_status, "paid");
    assert_eq!(record.intent, "paid");
    assert_eq!(record.call_time, "2025-04-24 14:05");
    assert!(!voice.said(Language::English, PhraseKey::OperatorTransfer));
    assert!(voice.said(Language::English, PhraseKey::Goodbye));

    let call_time_line = format!("{}2025-04-24 14:05", phrase(Language::English, PhraseKey::CallTime));
    assert!(voice.lines.iter().any(|(_, t)| *t == call_time_line));
}

#[test]
fn collections_callback_ends_early() {
    let (record, voice) = call(Script::Collections, &["english", "please call back tomorrow"]);

    assert_eq!(record.result, Outcome::Fail);
    assert_eq!(record.comment, "asked for callback");
    assert_eq!(record.intent, "call_back");
    assert!(voice.said(Language::English, PhraseKey::Callback));
    assert!(!voice.said(Language::English, PhraseKey::Help));
}

#[test]
fn collections_silence_is_unreachable() {
    let (record, voice) = call(Script::Collections, &["english"]);

    assert_eq!(record.result, Outcome::Fail);
    assert_eq!(record.comment, "unreachable");
    assert_eq!(record.response, "unknown");
    let reasks = voice
        .lines
        .iter()
        .filter(|(_, t)| t == phrase(Language::English, PhraseKey::Reask))
        .count();
    assert_eq!(reasks, 2);
}

#[test]
fn collections_service_error_is_unreachable() {
    let (record, voice) = call(Script::Collections, &["english", "!error", "yes"]);

    assert_eq!(record.comment, "unreachable");
    assert_eq!(record.response, "error");
    assert!(voice.said(Language::English, PhraseKey::ServiceError));
}

#[test]
fn collections_in_russian_with_operator_transfer() {
    let (record, voice) = call(
        Script::Collections,
        &["русский", "нет", "да", "Иван", "40", "смс", "звонок"],
    );

    assert_eq!(record.language, Language::Russian);
    assert_eq!(record.payment_status, "not paid");
    assert_eq!(record.name, "иван");
    assert!(voice.said(Language::Russian, PhraseKey::Greet));
    assert!(voice.said(Language::Russian, PhraseKey::OperatorTransfer));
}

#[test]
fn collections_in_uzbek() {
    let (record, voice) = call(
        Script::Collections,
        &["o'zbek", "ha", "yo'q", "Ali", "25", "sms", "telefon"],
    );

    assert_eq!(record.language, Language::Uzbek);
    assert_eq!(record.payment_status, "paid");
    assert!(voice.said(Language::Uzbek, PhraseKey::Tariff));
    assert!(!voice.said(Language::Uzbek, PhraseKey::OperatorTransfer));
}

#[test]
fn collections_unclear_reply_continues() {
    let (record, _) = call(
        Script::Collections,
        &["english", "what is this", "", "", "Ann", "50", "email", "sms"],
    );

    assert_eq!(record.result, Outcome::Success);
    assert_eq!(record.payment_status, "response unclear");
    assert_eq!(record.name, "ann");
}

#[test]
fn survey_confirms_payment() {
    let (record, voice) = call(
        Script::Survey,
        &["русский", "35", "мобильный", "долг", "да", "да", "я уже оплатил"],
    );

    assert_eq!(record.result, Outcome::Success);
    assert_eq!(record.comment, "confirmed payment");
    assert_eq!(record.language, Language::Russian);
    assert_eq!(record.age, "35");
    assert_eq!(record.channel, "mobile");
    assert_eq!(record.notification, "debt");
    assert_eq!(record.history_confirmation, "да");
    assert!(voice.said(Language::Russian, PhraseKey::DebtDue));
    assert!(voice.said(Language::Russian, PhraseKey::ThanksForPayment));
}

#[test]
fn survey_callback_is_a_failure() {
    let (record, voice) = call(
        Script::Survey,
        &["english", "40", "landline", "tariff", "yes", "yes", "call me later"],
    );

    assert_eq!(record.result, Outcome::Fail);
    assert_eq!(record.comment, "call back requested");
    assert_eq!(record.channel, "landline");
    assert_eq!(record.notification, "tariff");
    assert!(voice.said(Language::English, PhraseKey::TariffUpdate));
    assert!(voice.said(Language::English, PhraseKey::WillCallLater));
}

#[test]
fn survey_without_final_reply() {
    let (record, voice) = call(
        Script::Survey,
        &["english", "40", "landline", "tariff", "yes", "yes"],
    );

    assert_eq!(record.result, Outcome::Fail);
    assert_eq!(record.comment, "no response");
    assert!(record.response.is_empty());
    assert!(voice.said(Language::English, PhraseKey::NoResponse));
}

#[test]
fn survey_other_reply_is_received() {
    let (record, voice) = call(
        Script::Survey,
        &["english", "40", "mobile", "debt", "yes", "yes", "okay got it"],
    );

    assert_eq!(record.result, Outcome::Success);
    assert_eq!(record.comment, "info received");
    assert!(voice.said(Language::English, PhraseKey::ThanksGoodbye));
}

#[test]
fn survey_follows_named_language() {
    let (record, voice) = call(
        Script::Survey,
        &["uzbek", "28", "mobil", "qarz", "ha", "ha", "help"],
    );

    assert_eq!(record.language, Language::Uzbek);
    assert_eq!(record.channel, "mobile");
    assert_eq!(record.notification, "debt");
    assert_eq!(record.comment, "asked for help");
    assert!(voice.said(Language::Uzbek, PhraseKey::SurveyAge));
    assert!(voice.said(Language::Uzbek, PhraseKey::RepresentativeWillCall));
}

#[test]
fn survey_silence_stays_russian() {
    let (record, voice) = call(
        Script::Survey,
        &["", "", "30", "мобильный", "тариф", "да", "да", "позже"],
    );

    assert_eq!(record.language, Language::Russian);
    assert_eq!(record.notification, "tariff");
    assert_eq!(record.comment, "call back requested");
    assert!(voice.said(Language::Russian, PhraseKey::TariffUpdate));
}
