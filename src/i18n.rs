use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use unic_langid::LanguageIdentifier;

// Normalize locale strings like "tr_TR.UTF-8" or "tr-TR" to BCP47-ish form
// Example: "tr_TR.UTF-8" -> "tr-TR"
fn normalize_locale_tag<S: AsRef<str>>(s: S) -> String {
    let mut tag = s.as_ref().trim().to_string();
    if let Some((lang_region, _encoding)) = tag.split_once('.') {
        tag = lang_region.to_string();
    }
    tag = tag.replace('_', "-");
    tag
}

fn lang(tag: &str) -> LanguageIdentifier {
    tag.parse().unwrap_or_default()
}

// Only Turkish and English catalogs ship; everything else falls back to English
fn pick_supported(tag: &str) -> LanguageIdentifier {
    if tag.to_lowercase().starts_with("tr") {
        lang("tr")
    } else {
        lang("en-US")
    }
}

fn detect_lang() -> LanguageIdentifier {
    // 1) Explicit override via env var
    if let Ok(s) = std::env::var("GTRANSLATOR_UI_LANG") {
        let s = s.trim();
        if !s.is_empty() && s != "auto" {
            return pick_supported(&normalize_locale_tag(s));
        }
    }

    // 2) OS/UI locale via sys-locale (cross-platform; uses Windows API on Windows)
    if let Some(loc) = sys_locale::get_locale() {
        return pick_supported(&normalize_locale_tag(&loc));
    }

    // 3) Common UNIX envs as a last resort
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"].iter() {
        if let Ok(val) = std::env::var(key) {
            if !val.trim().is_empty() {
                return pick_supported(&normalize_locale_tag(&val));
            }
        }
    }

    // 4) Default: English
    lang("en-US")
}

fn build_bundle(langid: LanguageIdentifier) -> FluentBundle<FluentResource> {
    let mut bundle = FluentBundle::new_concurrent(vec![langid.clone()]);
    // Plain text labels; no bidi isolation marks around arguments
    bundle.set_use_isolating(false);
    let ftl: &str = match langid.language.as_str() {
        "tr" => include_str!("../i18n/tr/app.ftl"),
        _ => include_str!("../i18n/en/app.ftl"),
    };
    let resource = match FluentResource::try_new(ftl.to_owned()) {
        Ok(res) => res,
        Err(e) => {
            tracing::warn!(
                "failed to parse FTL for {:?}: {:?}. Falling back to English.",
                langid,
                e
            );
            if langid.language != "en" {
                return build_bundle(lang("en-US"));
            } else {
                return bundle;
            }
        }
    };

    if let Err(e) = bundle.add_resource(resource) {
        tracing::warn!(
            "failed to add FTL resource for {:?}: {:?}. Falling back to English.",
            langid,
            e
        );
        if langid.language != "en" {
            return build_bundle(lang("en-US"));
        }
    }

    bundle
}

// Built once; the UI language is fixed for the process lifetime
static BUNDLE: Lazy<FluentBundle<FluentResource>> = Lazy::new(|| build_bundle(detect_lang()));

fn format_message(id: &str, args: Option<&FluentArgs>) -> String {
    format_with(&BUNDLE, id, args)
}

fn format_with(bundle: &FluentBundle<FluentResource>, id: &str, args: Option<&FluentArgs>) -> String {
    if let Some(msg) = bundle.get_message(id) {
        if let Some(pattern) = msg.value() {
            let mut errors = vec![];
            let value: Cow<str> = bundle.format_pattern(pattern, args, &mut errors);
            return value.into_owned();
        }
    }
    id.to_string()
}

pub fn tr(id: &str) -> String {
    format_message(id, None)
}

/// Like [`tr`], with named string arguments.
pub fn tr_args(id: &str, args: &[(&str, &str)]) -> String {
    let mut fa = FluentArgs::new();
    for (k, v) in args {
        fa.set(*k, v.to_string());
    }
    format_message(id, Some(&fa))
}
