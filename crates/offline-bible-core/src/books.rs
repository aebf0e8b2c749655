//! Book name resolution.
//!
//! Tiers, first hit wins, each tier scanning books in corpus order:
//!
//! 1. case-insensitive exact name
//! 2. name starts with the input
//! 3. name contains the input
//! 4. abbreviation table: input equals (or, failing that, is a prefix of)
//!    a known abbreviation, then the first book whose name contains that
//!    entry's canonical name
//!
//! Ambiguous inputs resolve to the first book in corpus order. `"Jo"`
//! becomes Joshua, not John, and a bare `"Samuel"` becomes `1 Samuel`.

use crate::models::{Book, Corpus};

/// Canonical lowercase name → known abbreviations, in table order.
pub const ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("genesis", &["gen", "ge", "gn"]),
    ("exodus", &["exo", "ex", "exod"]),
    ("leviticus", &["lev", "le", "lv"]),
    ("numbers", &["num", "nu", "nm", "nb"]),
    ("deuteronomy", &["deut", "deu", "dt"]),
    ("joshua", &["josh", "jos", "jsh"]),
    ("judges", &["judg", "jdg", "jg", "jdgs"]),
    ("ruth", &["rut", "rth", "ru"]),
    ("samuel", &["sam", "sa", "sm"]),
    ("kings", &["kin", "ki", "kgs"]),
    ("chronicles", &["chr", "ch", "chron"]),
    ("ezra", &["ezr", "ez"]),
    ("nehemiah", &["neh", "ne"]),
    ("esther", &["est", "es", "esth"]),
    ("job", &["jb"]),
    ("psalms", &["psa", "ps", "psalm", "pslm", "psm"]),
    ("proverbs", &["prov", "pro", "prv", "pr"]),
    ("ecclesiastes", &["eccl", "ecc", "ec", "qoh"]),
    ("song", &["song", "sos", "so", "canticle", "canticles"]),
    ("isaiah", &["isa", "is"]),
    ("jeremiah", &["jer", "je", "jr"]),
    ("lamentations", &["lam", "la"]),
    ("ezekiel", &["ezek", "eze", "ezk"]),
    ("daniel", &["dan", "da", "dn"]),
    ("hosea", &["hos", "ho"]),
    ("joel", &["joe", "jl"]),
    ("amos", &["amo", "am"]),
    ("obadiah", &["obad", "oba", "ob"]),
    ("jonah", &["jon", "jnh"]),
    ("micah", &["mic", "mc"]),
    ("nahum", &["nah", "na"]),
    ("habakkuk", &["hab", "hb"]),
    ("zephaniah", &["zeph", "zep", "zp"]),
    ("haggai", &["hag", "hg"]),
    ("zechariah", &["zech", "zec", "zc"]),
    ("malachi", &["mal", "ml"]),
    ("matthew", &["matt", "mat", "mt"]),
    ("mark", &["mar", "mrk", "mk", "mr"]),
    ("luke", &["luk", "lk"]),
    ("john", &["jn", "joh", "jhn"]),
    ("acts", &["act", "ac"]),
    ("romans", &["rom", "ro", "rm"]),
    ("corinthians", &["cor", "co"]),
    ("galatians", &["gal", "ga"]),
    ("ephesians", &["eph", "ep"]),
    ("philippians", &["phil", "php", "pp"]),
    ("colossians", &["col", "co"]),
    ("thessalonians", &["thess", "thes", "th"]),
    ("timothy", &["tim", "ti", "tm"]),
    ("titus", &["tit", "ti"]),
    ("philemon", &["philem", "phm", "pm"]),
    ("hebrews", &["heb", "he"]),
    ("james", &["jas", "ja", "jm"]),
    ("peter", &["pet", "pe", "pt"]),
    ("jude", &["jud", "jd"]),
    ("revelation", &["rev", "re", "rv", "apocalypse"]),
];

/// Map a typed book name to a book in the corpus.
pub fn resolve_book<'a>(corpus: &'a Corpus, raw_name: &str) -> Option<&'a Book> {
    let needle = raw_name.trim().to_lowercase();
    let find = move |pred: &dyn Fn(&str) -> bool| {
        corpus
            .books
            .iter()
            .find(|b| pred(&b.name.to_lowercase()))
    };

    find(&|name: &str| name == needle)
        .or_else(|| find(&|name: &str| name.starts_with(&needle)))
        .or_else(|| find(&|name: &str| name.contains(&needle)))
        .or_else(|| {
            canonical_for_abbreviation(&needle)
                .find_map(|canonical| find(&|name: &str| name.contains(canonical)))
        })
}

/// Canonical names whose abbreviation list matches `needle`: exact
/// abbreviations first, then abbreviations the needle is a prefix of, each
/// in table order.
fn canonical_for_abbreviation<'n>(needle: &'n str) -> impl Iterator<Item = &'static str> + 'n {
    let exact = ABBREVIATIONS
        .iter()
        .filter(move |(_, abbrevs)| abbrevs.iter().any(|a| *a == needle));
    let prefix = ABBREVIATIONS
        .iter()
        .filter(move |(_, abbrevs)| abbrevs.iter().any(|a| a.starts_with(needle)));
    exact.chain(prefix).map(|(canonical, _)| *canonical)
}
