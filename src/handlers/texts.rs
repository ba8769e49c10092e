//! Persian texts sent to members

use crate::models::{ConversionRequest, Currency, FlowDirection};
use crate::utils::helpers::format_jalali;

pub const VERIFICATION_PROMPT: &str = "برای استفاده از امکانات لیر مارکت شما ابتدا باید حساب کاربری خود را تایید کنید. برای تایید حساب روی دکمه تایید حساب بزنید.";
pub const VERIFY_BUTTON: &str = "تایید حساب";
pub const MAIN_MENU: &str = "منو اصلی:";
pub const LIRA_TO_RIAL_BUTTON: &str = "تبدیل 🇹🇷 لیر به 🇮🇷 ریال";
pub const RIAL_TO_LIRA_BUTTON: &str = "تبدیل 🇮🇷 ریال به 🇹🇷 لیر";
pub const CANCEL_REQUEST_BUTTON: &str = "❌ لغو درخواست";

pub const BLOCKED_NOTICE: &str = "⛔️ حساب کاربری شما مسدود شده است. لطفا با مدیریت تماس بگیرید.";
pub const MEMBER_NOT_FOUND: &str = "❌ کاربری یافت نشد. لطفا دوباره /start بزنید.";
pub const GENERIC_ERROR: &str = "❌ خطایی رخ داد. لطفا دوباره تلاش کنید.";
pub const FLOW_DATA_LOST: &str = "❌ خطایی رخ داد. لطفا دوباره از منو اصلی اقدام کنید.";

// verification
pub const ASK_PHONE: &str = "شماره موبایل خود را همراه با کد کشور وارد نمایید\nمثال : 989123334455";
pub const PHONE_NOT_FOUND: &str = "کاربری با این شماره موبایل یافت نشد.\nلطفا با مدیریت تماس بگیرید.";
pub const ALREADY_VERIFIED: &str = "حساب کاربری شما قبلا تایید شده است.";
pub const ASK_VERIFY_CODE: &str = "کد فعالسازی ۶ رقمی خود را وارد کنید:";
pub const WRONG_VERIFY_CODE: &str = "کد فعالسازی شما اشتباه است.\nلطفا کد فعالسازی ۶ رقمی خود را مجددا وارد کنید:";
pub const PHONE_SESSION_LOST: &str = "خطایی رخ داد. لطفا دوباره روی دکمه تایید حساب کلیک کنید.";
pub const VERIFIED_BY_CODE: &str = "حساب کاربری شما با موفقیت تایید شد.\nاکنون میتوانید از تمام سرویس های لیر مارکت استفاده نمایید.";
pub const ASK_IDENTITY_IMAGE: &str = "لطفا تصویر کارت ملی یا پاسپورت خود را ارسال کنید.";
pub const ASK_IDENTITY_IMAGE_WITH_FORMATS: &str = "لطفا تصویر کارت ملی یا پاسپورت خود را ارسال کنید. (فرمت‌های پشتیبانی شده: PNG، JPG، JPEG، GIF، WEBP، BMP)";
pub const IDENTITY_IMAGE_RECEIVED: &str = "تصویر شما برای تایید حساب به مدیریت ارسال شد از صبر و شکیبایی شما متشکریم\nدر صورت تایید حساب ربات به شما پیام میدهد";
pub const INVALID_IMAGE: &str = "فایل ارسال شده یک تصویر معتبر نیست. لطفا یک فایل تصویری ارسال کنید.";
pub const IMAGE_UPLOAD_FAILED: &str = "❌ خطایی در ارسال تصویر رخ داد. لطفا دوباره تلاش کنید.";

// conversion
pub const ASK_DESTINATION_NAME: &str = "👤 نام صاحب حساب را وارد کنید.";
pub const REQUEST_CREATED: &str = "✅ درخواست شما ثبت گردید.\n🧾 لطفا برای تکمیل درخواست تصویر فاکتور یا فیش خود را ارسال کنید. 📸";
pub const ASK_PROOF_IMAGE: &str = "📸 لطفا تصویر فاکتور یا فیش خود را ارسال کنید.";
pub const ASK_PROOF_IMAGE_WITH_FORMATS: &str = "📸 لطفا تصویر فاکتور یا فیش خود را ارسال کنید.\n🖼 (فرمت‌های پشتیبانی شده: PNG، JPG، JPEG، GIF، WEBP، BMP)";
pub const REQUEST_SUBMITTED: &str = "✅ درخواست شما با موفقیت ثبت گردید و در انتظار تایید مدیریت میباشد.\n\n🔔 بعد از تایید مدیریت پیام تایید برای شما ارسال میشود.\n\n🍀 موفق باشید.";
pub const REQUEST_CANCELLED: &str = "✅ درخواست شما با موفقیت لغو شد.";
pub const NO_ACTIVE_REQUEST: &str = "ℹ️ درخواست فعالی یافت نشد.";

// admin decisions
pub const MEMBER_APPROVED: &str = " ✅ تبریک ، حساب کاربری شما توسط مدیریت لیر مارکت تایید شد . ";
pub const MEMBER_REJECTED_DEFAULT: &str = "درخواست تایید هویت شما پذیرفته نشد،لطفا مجدد با دقت بیشتر تلاش کنید .";

/// Document name of an identity image
pub const VERIFICATION_DOCUMENT_NAME: &str = "تصویر تائید حساب";

pub fn welcome(name: &str) -> String {
    format!("{} گرامی به ربات لیر مارکت خوش آمدید 🌹", name)
}

pub fn ask_amount(direction: FlowDirection) -> String {
    format!(
        "💰 لطفا مبلغ {} مورد نظر خود را برای تبدیل به {} وارد کنید\n🔢 (فقط به صورت عدد)",
        direction.source().label(),
        direction.target().label()
    )
}

pub fn invalid_amount(direction: FlowDirection) -> String {
    format!("⚠️ مقدار وارد شده صحیح نمیباشد.\n{}", ask_amount(direction))
}

pub fn amount_out_of_range(direction: FlowDirection) -> String {
    format!(
        "⚠️ مبلغ وارد شده بیش از حد مجاز است (حداکثر ۱۵ رقم صحیح و ۲ رقم اعشار).\n{}",
        ask_amount(direction)
    )
}

pub fn ask_destination_code(direction: FlowDirection) -> &'static str {
    match direction {
        FlowDirection::LiraToRial => "💳 لطفا شماره شبا یا شماره کارت خود را برای واریز ریال وارد کنید.",
        FlowDirection::RialToLira => "💳 لطفا شماره حساب یا شماره کارت خود را برای واریز لیر وارد کنید.",
    }
}

fn direction_label(direction: FlowDirection) -> &'static str {
    match direction {
        FlowDirection::LiraToRial => "🇹🇷 لیر به 🇮🇷 ریال",
        FlowDirection::RialToLira => "🇮🇷 ریال به 🇹🇷 لیر",
    }
}

/// Summary shown when a member already has a pending request
pub fn pending_request_summary(request: &ConversionRequest) -> String {
    let holder = request
        .receive_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("---");

    format!(
        "⚠️ شما دارای یک درخواست تایید نشده هستید.\n\
         ابتدا باید فرایند این درخواست تکمیل شود و یا میتوانید درخواست را لغو کنید.\n\n\
         📋 اطلاعات درخواست:\n\
         🔄 درخواست: {}\n\
         💰 مبلغ: {}\n\
         👤 نام صاحب حساب: {}\n\
         📅 تاریخ ثبت: {}",
        direction_label(request.direction()),
        request.amount,
        holder,
        format_jalali(request.created_at)
    )
}

/// Whole-number amount with thousands separators, e.g. `1500.50` -> `1,501`
pub fn format_amount(amount: &str) -> String {
    let rounded = amount.trim().parse::<f64>().map(|v| v.round() as u64).unwrap_or(0);
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn request_approved(request: &ConversionRequest) -> String {
    format!(
        "کاربر گرامی درخواست تبدیل {} به {} شما به مبلغ {} توسط مدیریت تایید گردید.\n\nبا تشکر از شما برای انتخاب لیر مارکت ❤️",
        Currency::label_for_code(&request.from_currency),
        Currency::label_for_code(&request.to_currency),
        format_amount(&request.amount)
    )
}

pub fn request_rejected(reason: &str) -> String {
    format!(
        "کاربر گرامی درخواست شما توسط مدیریت رد شد.\n\nدلیل رد درخواست : {}",
        reason
    )
}

pub fn member_rejected(reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("⚠️ حساب کاربری شما رد شد ⚠️\n\nدلیل: {}", reason),
        None => MEMBER_REJECTED_DEFAULT.to_string(),
    }
}
