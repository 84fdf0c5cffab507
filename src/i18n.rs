// ==========================================
// Internationalization (i18n)
// ==========================================
// Backed by rust-i18n; English (fallback) and Persian
// Note: rust_i18n::i18n! is initialized in lib.rs
// ==========================================

use tracing::warn;

/// Locales with a message catalogue under `locales/`
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "fa"];

pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Switch the process-wide locale
///
/// # Returns
/// false for an unsupported locale; the current locale is kept
pub fn set_locale(locale: &str) -> bool {
    let locale = locale.trim();
    if !is_supported(locale) {
        warn!(locale, current = %current_locale(), "unsupported locale ignored");
        return false;
    }
    rust_i18n::set_locale(locale);
    true
}

/// Message for `key` in the current locale
///
/// # Example
/// ```no_run
/// use setup_sheet_analyzer::i18n::t;
/// let msg = t("group.empty_selection");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// `t` with `%{name}` placeholders substituted
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |message, (name, value)| {
        message.replace(&format!("%{{{}}}", name), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale is process-wide and tests run in parallel
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_switch_between_supported_locales() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        assert!(set_locale("fa"));
        assert_eq!(current_locale(), "fa");

        assert!(set_locale(" en "));
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_unsupported_locale_keeps_current() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert!(!set_locale("de"));
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_group_messages_per_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(
            t("group.mixed_diameter"),
            "All selected tools must have the same diameter."
        );

        set_locale("fa");
        assert_eq!(
            t("group.mixed_diameter"),
            "قطر تمام ابزارهای انتخاب شده باید یکسان باشد."
        );

        set_locale("en");
    }

    #[test]
    fn test_unregistered_tools_lists_names() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args("group.unregistered_tools", &[("names", "EM10, DR6.8")]);
        assert_eq!(msg, "All selected tools must be registered: EM10, DR6.8");
    }
}
