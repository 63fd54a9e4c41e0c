//! The languages reviews are likely to be written in, by store country.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// A ranked list of language codes, most likely first.
pub type LanguageList = [&'static str; 10];

/// Used for any country not in the table.
pub const DEFAULT_LANGUAGES: LanguageList =
    ["en", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh"];

/// Countries sharing one language list are grouped together.
#[rustfmt::skip]
const COUNTRY_LANGUAGES: &[(&[&str], LanguageList)] = &[
    // Americas
    (&["US"], ["en", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh"]),
    (&["CA"], ["en", "fr", "es", "de", "it", "pt", "ru", "ja", "ko", "zh"]),
    (&["MX"], ["es", "en", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh"]),
    (&["BR"], ["pt", "es", "en", "fr", "de", "it", "ru", "ja", "ko", "zh"]),
    (&["AR", "CL", "CO", "VE", "UY"], ["es", "en", "pt", "fr", "de", "it", "ru", "ja", "ko", "zh"]),
    (&["PE", "EC"], ["es", "qu", "en", "pt", "fr", "de", "it", "ru", "ja", "ko"]),
    (&["PY"], ["es", "gn", "en", "pt", "fr", "de", "it", "ru", "ja", "ko"]),
    (&["BO"], ["es", "qu", "ay", "en", "pt", "fr", "de", "it", "ru", "ja"]),

    // Europe
    (&["GB"], ["en", "fr", "de", "es", "it", "pt", "ru", "ja", "ko", "zh"]),
    (&["DE", "AT"], ["de", "en", "fr", "es", "it", "pt", "ru", "ja", "ko", "zh"]),
    (&["FR"], ["fr", "en", "de", "es", "it", "pt", "ru", "ja", "ko", "zh"]),
    (&["ES"], ["es", "en", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh"]),
    (&["IT"], ["it", "en", "fr", "de", "es", "pt", "ru", "ja", "ko", "zh"]),
    (&["PT"], ["pt", "en", "es", "fr", "de", "it", "ru", "ja", "ko", "zh"]),
    (&["NL"], ["nl", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["BE"], ["nl", "fr", "de", "en", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["CH"], ["de", "fr", "it", "en", "es", "pt", "ru", "ja", "ko", "zh"]),
    (&["SE"], ["sv", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["NO"], ["no", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["DK"], ["da", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["PL"], ["pl", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["CZ"], ["cs", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["HU"], ["hu", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["BG"], ["bg", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["HR"], ["hr", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["RS"], ["sr", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["SI"], ["sl", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["SK"], ["sk", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["LT"], ["lt", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["LV"], ["lv", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["EE"], ["et", "en", "de", "fr", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["FI"], ["fi", "en", "sv", "de", "fr", "es", "it", "pt", "ru", "ja"]),
    (&["RO"], ["ro", "en", "fr", "de", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["IE"], ["en", "ga", "fr", "de", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["IS"], ["is", "en", "da", "de", "fr", "es", "it", "pt", "ru", "ja"]),
    (&["LU"], ["lb", "fr", "de", "en", "es", "it", "pt", "ru", "ja", "ko"]),
    (&["MT"], ["mt", "en", "it", "fr", "de", "es", "pt", "ru", "ja", "ko"]),
    (&["CY"], ["el", "en", "tr", "fr", "de", "es", "it", "pt", "ru", "ja"]),

    // East and South-East Asia
    (&["CN"], ["zh", "en", "ja", "ko", "ru", "fr", "de", "es", "it", "pt"]),
    (&["JP"], ["ja", "en", "ko", "zh", "ru", "fr", "de", "es", "it", "pt"]),
    (&["KR"], ["ko", "en", "ja", "zh", "ru", "fr", "de", "es", "it", "pt"]),
    (&["IN"], ["hi", "en", "ta", "te", "bn", "mr", "gu", "kn", "ml", "pa"]),
    (&["ID"], ["id", "en", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["TH"], ["th", "en", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["VN"], ["vi", "en", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["PH"], ["tl", "en", "es", "ja", "ko", "zh", "ru", "fr", "de", "it"]),
    (&["MY"], ["ms", "en", "zh", "ta", "ja", "ko", "ru", "fr", "de", "es"]),
    (&["SG"], ["en", "zh", "ms", "ta", "ja", "ko", "ru", "fr", "de", "es"]),
    (&["TW", "HK"], ["zh", "en", "ja", "ko", "ru", "fr", "de", "es", "it", "pt"]),
    (&["MO"], ["zh", "pt", "en", "ja", "ko", "ru", "fr", "de", "es", "it"]),

    // South and Central Asia
    (&["BD"], ["bn", "en", "hi", "ur", "ja", "ko", "zh", "ru", "fr", "de"]),
    (&["PK"], ["ur", "en", "hi", "bn", "ja", "ko", "zh", "ru", "fr", "de"]),
    (&["LK"], ["si", "ta", "en", "hi", "ja", "ko", "zh", "ru", "fr", "de"]),
    (&["MM"], ["my", "en", "th", "ja", "ko", "zh", "ru", "fr", "de", "es"]),
    (&["KH"], ["km", "en", "th", "vi", "ja", "ko", "zh", "ru", "fr", "de"]),
    (&["LA"], ["lo", "en", "th", "vi", "ja", "ko", "zh", "ru", "fr", "de"]),
    (&["MN"], ["mn", "en", "ru", "ja", "ko", "zh", "fr", "de", "es", "it"]),
    (&["KZ"], ["kk", "ru", "en", "ja", "ko", "zh", "fr", "de", "es", "it"]),
    (&["UZ"], ["uz", "ru", "en", "ja", "ko", "zh", "fr", "de", "es", "it"]),
    (&["KG"], ["ky", "ru", "en", "ja", "ko", "zh", "fr", "de", "es", "it"]),
    (&["TJ"], ["tg", "ru", "en", "ja", "ko", "zh", "fr", "de", "es", "it"]),
    (&["TM"], ["tk", "ru", "en", "ja", "ko", "zh", "fr", "de", "es", "it"]),

    // Middle East and Caucasus
    (&["AF"], ["fa", "ps", "en", "ur", "hi", "ja", "ko", "zh", "ru", "fr"]),
    (&["IR"], ["fa", "en", "ar", "ur", "hi", "ja", "ko", "zh", "ru", "fr"]),
    (&["IQ"], ["ar", "ku", "en", "fa", "hi", "ja", "ko", "zh", "ru", "fr"]),
    (&["SA", "AE", "QA", "KW", "BH", "OM", "YE", "JO"], ["ar", "en", "ur", "hi", "ja", "ko", "zh", "ru", "fr", "de"]),
    (&["LB"], ["ar", "en", "fr", "ur", "hi", "ja", "ko", "zh", "ru", "de"]),
    (&["SY"], ["ar", "en", "ku", "ur", "hi", "ja", "ko", "zh", "ru", "fr"]),
    (&["IL"], ["he", "ar", "en", "ru", "ja", "ko", "zh", "fr", "de", "es"]),
    (&["TR"], ["tr", "en", "ku", "ar", "ru", "ja", "ko", "zh", "fr", "de"]),
    (&["GE"], ["ka", "en", "ru", "ja", "ko", "zh", "fr", "de", "es", "it"]),
    (&["AM"], ["hy", "en", "ru", "ja", "ko", "zh", "fr", "de", "es", "it"]),
    (&["AZ"], ["az", "en", "ru", "ja", "ko", "zh", "fr", "de", "es", "it"]),

    // Southern, Eastern and Northern Africa
    (&["ZA"], ["en", "af", "zu", "xh", "ja", "ko", "zh", "ru", "fr", "de"]),
    (&["NG"], ["en", "ha", "yo", "ig", "ja", "ko", "zh", "ru", "fr", "de"]),
    (&["EG", "LY", "SD"], ["ar", "en", "fr", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["KE"], ["en", "sw", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["GH"], ["en", "ak", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["ET"], ["am", "en", "om", "ja", "ko", "zh", "ru", "fr", "de", "es"]),
    (&["TZ"], ["sw", "en", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["UG"], ["en", "sw", "lg", "ja", "ko", "zh", "ru", "fr", "de", "es"]),
    (&["DZ", "MA", "TN"], ["ar", "fr", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["ZW"], ["en", "sn", "nd", "ja", "ko", "zh", "ru", "fr", "de", "es"]),
    (&["ZM"], ["en", "bem", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["BW"], ["en", "tn", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["NA"], ["en", "af", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["MW"], ["en", "ny", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["MZ", "AO", "CV", "ST"], ["pt", "en", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),

    // Central and Western Africa, Indian Ocean
    (&["MG"], ["mg", "fr", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["MU", "SC"], ["en", "fr", "ja", "ko", "zh", "ru", "de", "es", "it", "pt"]),
    (&["RW"], ["rw", "en", "fr", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["BI"], ["rn", "fr", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["DJ"], ["fr", "ar", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["SO"], ["so", "ar", "en", "ja", "ko", "zh", "ru", "fr", "de", "es"]),
    (&["ER"], ["ti", "ar", "en", "ja", "ko", "zh", "ru", "fr", "de", "es"]),
    (&["SS"], ["en", "ar", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["CF"], ["fr", "sg", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["TD"], ["fr", "ar", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["CM", "BF", "GN", "CI"], ["fr", "en", "ja", "ko", "zh", "ru", "de", "es", "it", "pt"]),
    (&["NE"], ["fr", "ha", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["ML"], ["fr", "bm", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["SN"], ["fr", "wo", "en", "ja", "ko", "zh", "ru", "de", "es", "it"]),
    (&["GM", "SL", "LR"], ["en", "fr", "ja", "ko", "zh", "ru", "de", "es", "it", "pt"]),
    (&["GQ"], ["es", "fr", "en", "ja", "ko", "zh", "ru", "de", "it", "pt"]),

    // Oceania and territories
    (&["AU"], ["en", "zh", "ja", "ko", "ru", "fr", "de", "es", "it", "pt"]),
    (&["NZ"], ["en", "mi", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["FJ"], ["en", "fj", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["PG", "SB", "KI", "TV", "NR", "FM", "PW", "CK", "NU", "TK"], ["en", "ja", "ko", "zh", "ru", "fr", "de", "es", "it", "pt"]),
    (&["VU"], ["en", "fr", "ja", "ko", "zh", "ru", "de", "es", "it", "pt"]),
    (&["NC", "PF"], ["fr", "en", "ja", "ko", "zh", "ru", "de", "es", "it", "pt"]),
    (&["WS", "AS"], ["en", "sm", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["TO"], ["en", "to", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["MH"], ["en", "mh", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["GU", "MP"], ["en", "ch", "ja", "ko", "zh", "ru", "fr", "de", "es", "it"]),
    (&["VI"], ["en", "es", "ja", "ko", "zh", "ru", "fr", "de", "it", "pt"]),
    (&["PR"], ["es", "en", "ja", "ko", "zh", "ru", "fr", "de", "it", "pt"]),
];

lazy_static! {
    /// [`COUNTRY_LANGUAGES`] flattened for lookup by country code.
    static ref BY_COUNTRY: HashMap<&'static str, &'static LanguageList> = COUNTRY_LANGUAGES
        .iter()
        .flat_map(|(countries, languages)| countries.iter().map(move |country| (*country, languages)))
        .collect();
}

/// The ten languages reviews from `country` are most likely written in, most
/// likely first.
///
/// `country` is an ISO 3166-1 alpha-2 code in any case. Unknown countries
/// get [`DEFAULT_LANGUAGES`].
pub fn languages_for(country: &str) -> &'static LanguageList {
    let country = country.trim().to_ascii_uppercase();
    BY_COUNTRY
        .get(country.as_str())
        .copied()
        .unwrap_or(&DEFAULT_LANGUAGES)
}

#[cfg(test)]
mod tests {
    use super::{languages_for, BY_COUNTRY, COUNTRY_LANGUAGES, DEFAULT_LANGUAGES};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(languages_for("br")[0], "pt");
        assert_eq!(languages_for(" BR "), languages_for("br"));
        assert_eq!(languages_for("Jp")[..3], ["ja", "en", "ko"]);
    }

    #[test]
    fn unknown_countries_use_the_default() {
        assert_eq!(languages_for("XX"), &DEFAULT_LANGUAGES);
        assert_eq!(languages_for(""), &DEFAULT_LANGUAGES);
        assert_eq!(languages_for("USA"), &DEFAULT_LANGUAGES);
    }

    #[test]
    fn shared_lists_apply_to_every_member() {
        for country in ["SA", "AE", "QA", "KW", "BH", "OM", "YE", "JO"] {
            assert_eq!(languages_for(country)[..2], ["ar", "en"], "country {}", country);
        }
        assert_eq!(languages_for("IN")[..3], ["hi", "en", "ta"]);
    }

    #[test]
    fn table_is_well_formed() {
        let mut seen = HashSet::new();
        for (countries, languages) in COUNTRY_LANGUAGES {
            for country in *countries {
                assert_eq!(country.len(), 2, "{} is not a 2 letter code", country);
                assert!(country.chars().all(|c| c.is_ascii_uppercase()));
                assert!(seen.insert(*country), "{} is listed twice", country);
            }
            let distinct: HashSet<_> = languages.iter().collect();
            assert_eq!(distinct.len(), 10, "repeated language in {:?}", languages);
        }
        assert_eq!(BY_COUNTRY.len(), seen.len());
    }
}
