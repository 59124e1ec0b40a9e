use super::{Conversation, Voice};
use crate::intent::{Intent, RuleSet};
use crate::language::Language;
use crate::phrases::{phrase, PhraseKey};
use crate::record::{CallRecord, Outcome, CALL_TIME_FORMAT};
use crate::speech::SpeechRecognizer;

pub(super) fn run<V, R>(conv: &mut Conversation<'_, V, R>) -> anyhow::Result<CallRecord>
where
    V: Voice + ?Sized,
    R: SpeechRecognizer + ?Sized,
{
    let ctx = conv.ctx;

    conv.say(Language::English, PhraseKey::Opening)?;
    let choice = conv.ask(Language::English, PhraseKey::ChooseLanguage)?;
    let language = Language::detect(choice.heard_or_empty()).unwrap_or(ctx.default_language);
    tracing::debug!(language = %language, "language selected");

    conv.say(language, PhraseKey::Greet)?;
    let reply = conv.ask(language, PhraseKey::Debt)?;

    if !reply.is_heard() {
        let mut record = CallRecord::early_exit(ctx.client_id, language, "unreachable", ctx.started_at);
        record.response = reply.text().to_string();
        record.intent = Intent::Unknown.to_string();
        return Ok(record);
    }

    let intent = ctx.classifier(RuleSet::Payment, language).classify(reply.text());
    let payment_status = match intent {
        Intent::Paid => "paid",
        Intent::NotPaid => "not paid",
        Intent::CallBack => {
            conv.say(language, PhraseKey::Callback)?;
            let mut record =
                CallRecord::early_exit(ctx.client_id, language, "asked for callback", ctx.started_at);
            record.response = reply.text().to_string();
            record.intent = intent.to_string();
            return Ok(record);
        }
        Intent::NeedHelp | Intent::Unknown => "response unclear",
    };

    let help = conv.ask(language, PhraseKey::Help)?;
    if ctx.classifier(RuleSet::Help, language).classify(help.heard_or_empty()) == Intent::NeedHelp {
        conv.say(language, PhraseKey::OperatorTransfer)?;
        if !ctx.help_hold.is_zero() {
            tracing::info!(hold = ?ctx.help_hold, "holding for operator");
            std::thread::sleep(ctx.help_hold);
        }
    }

    conv.say(language, PhraseKey::Tariff)?;

    let name = conv.ask(language, PhraseKey::AskName)?;
    let age = conv.ask(language, PhraseKey::AskAge)?;
    let notification = conv.ask(language, PhraseKey::AskNotify)?;

    let call_time = ctx.started_at.format(CALL_TIME_FORMAT).to_string();
    let line = format!("{}{}", phrase(language, PhraseKey::CallTime), call_time);
    conv.say_text(language, &line)?;

    let comm = conv.ask(language, PhraseKey::CommType)?;

    conv.say(language, PhraseKey::History)?;
    conv.say(language, PhraseKey::Thanks)?;
    conv.say(language, PhraseKey::Goodbye)?;

    let comment = format!(
        "payment_status: {payment_status}; name: {}; age: {}; notify: {}; comm: {}",
        name.text(),
        age.text(),
        notification.text(),
        comm.text()
    );

    let mut record = CallRecord::new(ctx.client_id, Outcome::Success, comment, language, ctx.started_at);
    record.name = name.text().to_string();
    record.age = age.text().to_string();
    record.notification = notification.text().to_string();
    record.channel = comm.text().to_string();
    record.payment_status = payment_status.to_string();
    record.intent = intent.to_string();
    record.response = reply.text().to_string();
    Ok(record)
}
