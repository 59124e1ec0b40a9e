use crate::language::Language;
use serde::Serialize;

/// Every prompt the bot can say. The text for each key lives in [`phrase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseKey {
    Opening,
    ChooseLanguage,
    Greet,
    Debt,
    Reask,
    ServiceError,
    Help,
    OperatorTransfer,
    Callback,
    Tariff,
    AskName,
    AskAge,
    AskNotify,
    CallTime,
    CommType,
    History,
    Thanks,
    Goodbye,
    SurveyIntro,
    SurveyLanguage,
    SurveyAge,
    SurveyChannel,
    SurveyNotification,
    SurveyCallTime,
    SurveyHistory,
    StartingCall,
    BankHello,
    DebtDue,
    TariffUpdate,
    ThanksForPayment,
    RepresentativeWillCall,
    WillCallLater,
    NoResponse,
    ThanksGoodbye,
}

impl PhraseKey {
    pub fn all() -> &'static [PhraseKey] {
        use PhraseKey::*;
        &[
            Opening,
            ChooseLanguage,
            Greet,
            Debt,
            Reask,
            ServiceError,
            Help,
            OperatorTransfer,
            Callback,
            Tariff,
            AskName,
            AskAge,
            AskNotify,
            CallTime,
            CommType,
            History,
            Thanks,
            Goodbye,
            SurveyIntro,
            SurveyLanguage,
            SurveyAge,
            SurveyChannel,
            SurveyNotification,
            SurveyCallTime,
            SurveyHistory,
            StartingCall,
            BankHello,
            DebtDue,
            TariffUpdate,
            ThanksForPayment,
            RepresentativeWillCall,
            WillCallLater,
            NoResponse,
            ThanksGoodbye,
        ]
    }

    /// Prompts that end with a value filled in at call time (a timestamp).
    pub fn is_prefix(self) -> bool {
        matches!(self, PhraseKey::CallTime | PhraseKey::SurveyCallTime)
    }
}

pub fn phrase(language: Language, key: PhraseKey) -> &'static str {
    match language {
        Language::English => english(key),
        Language::Russian => russian(key),
        Language::Uzbek => uzbek(key),
    }
}

fn english(key: PhraseKey) -> &'static str {
    use PhraseKey::*;
    match key {
        Opening => "Hello! Здравствуйте! Salom! This is a call from your bank.",
        ChooseLanguage => "Please say your preferred language: English, Russian or Uzbek.",
        Greet => "Hello! This is a call from your bank.",
        Debt => "You have an outstanding bill. The payment deadline is tomorrow. Have you already paid?",
        Reask => "I didn't catch that. Could you please repeat?",
        ServiceError => "Service error. Try again later.",
        Help => "Do you need help? I can connect you to our support center.",
        OperatorTransfer => "Please hold, I am connecting you to an operator.",
        Callback => "Okay, I will call you back later. Goodbye.",
        Tariff => "Just to inform you: the tariffs have changed. Service charges increased by 10 percent.",
        AskName => "May I know your name?",
        AskAge => "How old are you?",
        AskNotify => "How would you like to receive notifications? For example, via SMS or call?",
        CallTime => "Call time: ",
        CommType => "What type of phone connection do you use, mobile or landline?",
        History => "Your last interaction was 2 weeks ago regarding a credit card issue.",
        Thanks => "Thank you for the information.",
        Goodbye => "Goodbye!",
        SurveyIntro => "Hello, we are going to ask you a few questions.",
        SurveyLanguage => "What is your preferred language? Russian or English?",
        SurveyAge => "How old are you?",
        SurveyChannel => "Are you using a mobile or landline phone?",
        SurveyNotification => "Are you being contacted about debt or tariffs?",
        SurveyCallTime => "Is this a good time to talk? It is now ",
        SurveyHistory => "We contacted you before. Do you remember?",
        StartingCall => "Thank you, starting the call.",
        BankHello => "Hello, this is your bank.",
        DebtDue => "You have a payment due. Have you paid?",
        TariffUpdate => "We have updated tariffs. Would you like more info?",
        ThanksForPayment => "Thanks for the payment.",
        RepresentativeWillCall => "A representative will contact you.",
        WillCallLater => "We will call you later.",
        NoResponse => "No response. Will call back.",
        ThanksGoodbye => "Thank you. Goodbye!",
    }
}

fn russian(key: PhraseKey) -> &'static str {
    use PhraseKey::*;
    match key {
        Opening => "Здравствуйте! Hello! Salom! Это звонок из вашего банка.",
        ChooseLanguage => "Please say your preferred language: English, Russian or Uzbek.",
        Greet => "Здравствуйте! Это звонок из вашего банка.",
        Debt => "У вас есть задолженность по счету. Крайний срок оплаты завтра. Вы уже оплатили?",
        Reask => "Я не расслышал. Повторите, пожалуйста.",
        ServiceError => "Ошибка сервиса. Попробуйте позже.",
        Help => "Вам нужна помощь? Я могу соединить вас с оператором.",
        OperatorTransfer => "Пожалуйста, оставайтесь на линии, соединяю с оператором.",
        Callback => "Хорошо, я перезвоню позже. До свидания.",
        Tariff => "К вашему сведению: тарифы были изменены. Плата за обслуживание увеличена на 10 процентов.",
        AskName => "Как вас зовут?",
        AskAge => "Сколько вам лет?",
        AskNotify => "Как вы хотите получать уведомления? Например, по СМС или звонку?",
        CallTime => "Время звонка: ",
        CommType => "Какой тип связи вы используете: мобильный или стационарный телефон?",
        History => "Ваш последний контакт с банком был 2 недели назад по поводу кредитной карты.",
        Thanks => "Спасибо за информацию.",
        Goodbye => "До свидания!",
        SurveyIntro => "Здравствуйте, сейчас мы зададим вам несколько вопросов.",
        SurveyLanguage => "На каком языке вы предпочитаете общаться? Русский или Английский?",
        SurveyAge => "Сколько вам лет?",
        SurveyChannel => "Вы используете мобильный или стационарный телефон?",
        SurveyNotification => "Вас беспокоит задолженность или информация о тарифах?",
        SurveyCallTime => "Это удобное время для звонка? Сейчас ",
        SurveyHistory => "Мы уже связывались с вами ранее. Вы это помните?",
        StartingCall => "Спасибо, начинаю звонок.",
        BankHello => "Здравствуйте, это ваш банк.",
        DebtDue => "У вас есть задолженность. Вы оплатили?",
        TariffUpdate => "У нас обновились тарифы. Хотите узнать?",
        ThanksForPayment => "Спасибо за оплату.",
        RepresentativeWillCall => "Оператор свяжется с вами.",
        WillCallLater => "Мы перезвоним позже.",
        NoResponse => "Нет ответа. Перезвоним позже.",
        ThanksGoodbye => "Спасибо. До свидания!",
    }
}

fn uzbek(key: PhraseKey) -> &'static str {
    use PhraseKey::*;
    match key {
        Opening => "Salom! Hello! Здравствуйте! Bu sizning bankingizdan qo'ng'iroq.",
        ChooseLanguage => "Please say your preferred language: English, Russian or Uzbek.",
        Greet => "Salom! Bu sizning bankingizdan qo'ng'iroq.",
        Debt => "Sizda hisob bo'yicha qarz bor. To'lov muddati ertaga. Siz allaqachon to'lov qildingizmi?",
        Reask => "Kechirasiz, tushunmadim. Iltimos, yana ayting.",
        ServiceError => "Xizmatda xatolik. Keyinroq urinib ko'ring.",
        Help => "Yordam kerakmi? Sizni operator bilan ulayman.",
        OperatorTransfer => "Iltimos, kuting, sizni operator bilan ulayapman.",
        Callback => "Yaxshi, keyinroq yana qo'ng'iroq qilaman. Xayr.",
        Tariff => "Ma'lumot uchun: tariflar o'zgardi. Xizmat haqi 10 foizga oshirildi.",
        AskName => "Ismingiz nima?",
        AskAge => "Yoshingiz nechida?",
        AskNotify => "Bildirishnomalarni qanday olishni xohlaysiz? Masalan, SMS yoki qo'ng'iroq orqali?",
        CallTime => "Qo'ng'iroq vaqti: ",
        CommType => "Siz qanday aloqa turidan foydalanasiz: mobil yoki statsionar telefon?",
        History => "Sizning oxirgi murojaatingiz 2 hafta oldin kredit karta haqida bo'lgan.",
        Thanks => "Ma'lumot uchun rahmat.",
        Goodbye => "Xayr!",
        SurveyIntro => "Salom, sizga bir nechta savol beramiz.",
        SurveyLanguage => "Qaysi tilda gaplashishni afzal ko'rasiz? Rus yoki ingliz tilida?",
        SurveyAge => "Yoshingiz nechida?",
        SurveyChannel => "Siz mobil yoki statsionar telefondan foydalanasizmi?",
        SurveyNotification => "Sizni qarz yoki tariflar haqidagi ma'lumot qiziqtiradimi?",
        SurveyCallTime => "Gaplashish uchun qulay vaqtmi? Hozir soat ",
        SurveyHistory => "Biz siz bilan avval bog'langan edik. Eslaysizmi?",
        StartingCall => "Rahmat, qo'ng'iroqni boshlayman.",
        BankHello => "Salom, bu sizning bankingiz.",
        DebtDue => "Sizda to'lov muddati yetgan qarz bor. To'lov qildingizmi?",
        TariffUpdate => "Tariflarimiz yangilandi. Batafsil bilishni xohlaysizmi?",
        ThanksForPayment => "To'lov uchun rahmat.",
        RepresentativeWillCall => "Operator siz bilan bog'lanadi.",
        WillCallLater => "Keyinroq qo'ng'iroq qilamiz.",
        NoResponse => "Javob yo'q. Keyinroq qo'ng'iroq qilamiz.",
        ThanksGoodbye => "Rahmat. Xayr!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_text_in_every_language() {
        for language in Language::ALL {
            for key in PhraseKey::all() {
                assert!(
                    !phrase(language, *key).trim().is_empty(),
                    "{language} {key:?} is empty"
                );
            }
        }
    }

    #[test]
    fn prefix_phrases_end_with_a_space() {
        for language in Language::ALL {
            for key in PhraseKey::all().iter().filter(|k| k.is_prefix()) {
                assert!(phrase(language, *key).ends_with(' '));
            }
        }
    }

    #[test]
    fn language_prompt_is_english_everywhere() {
        let en = phrase(Language::English, PhraseKey::ChooseLanguage);
        assert_eq!(phrase(Language::Russian, PhraseKey::ChooseLanguage), en);
        assert_eq!(phrase(Language::Uzbek, PhraseKey::ChooseLanguage), en);
    }
}
