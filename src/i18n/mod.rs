//! # Localization
//!
//! Message catalogs are embedded at compile time (`messages/*.json`) and
//! parsed once at startup. Each catalog is a map of namespace to key to text.
//! Handlers pick a `Locale` per request and hand a `Translator` to whatever
//! needs localized strings, such as the form schemas.

use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

type Namespaces = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Message catalog for '{locale}' is not valid JSON: {source}")]
    Parse {
        locale: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Ru,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ru];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    /// Accepts bare codes and region-qualified tags (`en`, `EN`, `ru-RU`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next().unwrap_or("");
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(primary))
    }

    /// Picks the request locale: an explicit choice first, then the
    /// highest-weighted supported `Accept-Language` entry, then `fallback`.
    pub fn negotiate(
        explicit: Option<&str>,
        accept_language: Option<&str>,
        fallback: Locale,
    ) -> Locale {
        if let Some(locale) = explicit.and_then(Self::from_tag) {
            return locale;
        }

        let mut candidates: Vec<(Locale, f32)> = accept_language
            .unwrap_or("")
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split(';');
                let locale = Self::from_tag(parts.next()?)?;
                let weight = parts
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (weight > 0.0).then_some((locale, weight))
            })
            .collect();

        // Stable sort keeps header order between equal weights.
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.first().map_or(fallback, |(locale, _)| *locale)
    }
}

/// All loaded message catalogs
#[derive(Debug, Clone)]
pub struct Catalog {
    locales: HashMap<Locale, Namespaces>,
}

impl Catalog {
    pub fn load() -> Result<Self, CatalogError> {
        let sources = [
            (Locale::En, include_str!("../../messages/en.json")),
            (Locale::Ru, include_str!("../../messages/ru.json")),
        ];

        let mut locales = HashMap::new();
        for (locale, raw) in sources {
            let namespaces: Namespaces =
                serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
                    locale: locale.code(),
                    source,
                })?;
            locales.insert(locale, namespaces);
        }

        Ok(Self { locales })
    }

    pub fn translator<'a>(&'a self, locale: Locale, namespace: &'a str) -> Translator<'a> {
        Translator {
            catalog: self,
            locale,
            namespace,
        }
    }

    fn lookup(&self, locale: Locale, namespace: &str, key: &str) -> Option<&str> {
        self.locales
            .get(&locale)?
            .get(namespace)?
            .get(key)
            .map(String::as_str)
    }
}

/// Message lookup bound to one locale and namespace
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    catalog: &'a Catalog,
    locale: Locale,
    namespace: &'a str,
}

impl Translator<'_> {
    /// Missing keys fall back to English, then to `NAMESPACE.key`.
    pub fn t(&self, key: &str) -> String {
        if let Some(text) = self.catalog.lookup(self.locale, self.namespace, key) {
            return text.to_string();
        }
        if let Some(text) = self.catalog.lookup(Locale::En, self.namespace, key) {
            warn!(
                locale = self.locale.code(),
                namespace = self.namespace,
                key = key,
                "Missing translation, using English"
            );
            return text.to_string();
        }
        warn!(
            locale = self.locale.code(),
            namespace = self.namespace,
            key = key,
            "Missing translation"
        );
        format!("{}.{}", self.namespace, key)
    }
}
