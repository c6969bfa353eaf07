use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::error;
use unic_langid::LanguageIdentifier;

pub const DEFAULT_LANGUAGE: &str = "en";

/// Fluent sources shipped with the binary.
const RESOURCES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en/main.ftl")),
    ("ru", include_str!("../locales/ru/main.ftl")),
];

/// Localization manager for the shop bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every bundled language
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (language, source) in RESOURCES {
            let locale: LanguageIdentifier = language.parse()?;
            bundles.insert(language.to_string(), Self::create_bundle(locale, source)?);
        }

        Ok(Self { bundles })
    }

    fn create_bundle(locale: LanguageIdentifier, source: &str) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Isolation marks around arguments show up as garbage in Telegram.
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid {locale} resource: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate messages in {locale} resource: {errors:?}"))?;

        Ok(bundle)
    }

    /// Languages with a bundle, e.g. `["en", "ru"]`.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Resolve a Telegram language code (`"ru"`, `"en-US"`, ...) to a bundled
    /// language, falling back to English.
    pub fn resolve_language(&self, language_code: Option<&str>) -> &str {
        language_code
            .and_then(|code| code.parse::<LanguageIdentifier>().ok())
            .and_then(|langid| {
                self.bundles
                    .get_key_value(langid.language.as_str())
                    .map(|(key, _)| key.as_str())
            })
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let language = self.resolve_language(Some(language));
        let Some(bundle) = self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        else {
            return format!("Missing translation: {key}");
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            error!(key, ?errors, "Failed to format localized message");
        }

        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, language: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }

    fn empty() -> Self {
        Self {
            bundles: HashMap::new(),
        }
    }
}

/// Global localization instance
static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_some() {
        return Ok(());
    }
    let manager = LocalizationManager::new()?;
    // A concurrent initializer may have won; either instance is equivalent.
    let _ = LOCALIZATION_MANAGER.set(manager);
    Ok(())
}

/// Get the global localization manager, initializing it on first use
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER.get_or_init(|| {
        LocalizationManager::new().unwrap_or_else(|e| {
            error!(error = %e, "Failed to load localization resources");
            LocalizationManager::empty()
        })
    })
}

/// Localized message in the user's language
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    let manager = get_localization_manager();
    let language = manager.resolve_language(language_code);
    manager.get_message_in_language(key, language, None)
}

/// Localized message with arguments in the user's language
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let manager = get_localization_manager();
    let language = manager.resolve_language(language_code);
    manager.get_message_with_args(key, language, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_resolution() {
        let manager = LocalizationManager::new().unwrap();
        assert_eq!(manager.resolve_language(Some("ru")), "ru");
        assert_eq!(manager.resolve_language(Some("ru-RU")), "ru");
        assert_eq!(manager.resolve_language(Some("de")), "en");
        assert_eq!(manager.resolve_language(Some("not a language")), "en");
        assert_eq!(manager.resolve_language(None), "en");
    }

    #[test]
    fn test_bundled_languages_share_keys() {
        let manager = LocalizationManager::new().unwrap();
        assert_eq!(manager.languages(), vec!["en", "ru"]);

        for key in ["menu-title", "cart-empty", "email-prompt", "product-not-found"] {
            let en = manager.get_message_in_language(key, "en", None);
            let ru = manager.get_message_in_language(key, "ru", None);
            assert!(!en.starts_with("Missing"), "{key} missing in en");
            assert!(!ru.starts_with("Missing"), "{key} missing in ru");
            assert_ne!(en, ru);
        }
    }
}
