//! Small hand-built corpus for unit tests.

use crate::models::{Book, Chapter, Corpus, Testament, Verse};

fn chapter(number: u32, texts: Vec<String>) -> Chapter {
    Chapter {
        number,
        verses: texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Verse {
                number: i as u32 + 1,
                text,
            })
            .collect(),
    }
}

/// `count` verses of filler, with `overrides` replacing specific verse numbers.
fn filled(book: &str, number: u32, count: u32, overrides: &[(u32, &str)]) -> Chapter {
    let texts = (1..=count)
        .map(|v| {
            overrides
                .iter()
                .find(|(n, _)| *n == v)
                .map(|(_, t)| t.to_string())
                .unwrap_or_else(|| format!("And {} spake in chapter {} verse {}.", book, number, v))
        })
        .collect();
    chapter(number, texts)
}

fn book(name: &str, testament: Testament, chapters: Vec<Chapter>) -> Book {
    Book {
        name: name.to_string(),
        testament,
        chapters,
    }
}

pub fn corpus() -> Corpus {
    let hebrews_11 = (1..=60)
        .map(|v| format!("By faith the elders obtained a good report, witness {}.", v))
        .collect();

    Corpus {
        version: "KJV".to_string(),
        books: vec![
            book(
                "Genesis",
                Testament::Old,
                vec![filled(
                    "Genesis",
                    1,
                    3,
                    &[(1, "In the beginning God created the heaven and the earth.")],
                )],
            ),
            book(
                "Leviticus",
                Testament::Old,
                vec![filled(
                    "Leviticus",
                    19,
                    20,
                    &[(18, "Thou shalt not avenge, but thou shalt love thy neighbour as thyself: I am the LORD.")],
                )],
            ),
            book(
                "Joshua",
                Testament::Old,
                vec![filled("Joshua", 1, 9, &[(9, "Be strong and of a good courage; be not afraid.")])],
            ),
            book(
                "Psalms",
                Testament::Old,
                vec![filled("Psalms", 23, 6, &[(1, "The LORD is my shepherd; I shall not want.")])],
            ),
            book(
                "Matthew",
                Testament::New,
                vec![filled(
                    "Matthew",
                    22,
                    40,
                    &[(39, "And the second is like unto it, Thou shalt love thy neighbour as thyself.")],
                )],
            ),
            book(
                "John",
                Testament::New,
                vec![
                    filled("John", 1, 5, &[(1, "In the beginning was the Word, and the Word was with God.")]),
                    filled(
                        "John",
                        3,
                        36,
                        &[(16, "For God so loved the world, that he gave his only begotten Son.")],
                    ),
                ],
            ),
            book(
                "Romans",
                Testament::New,
                vec![filled(
                    "Romans",
                    8,
                    30,
                    &[(28, "And we know that all things work together for good to them that love God.")],
                )],
            ),
            book("Hebrews", Testament::New, vec![chapter(11, hebrews_11)]),
            book(
                "1 John",
                Testament::New,
                vec![filled("1 John", 4, 8, &[(8, "He that loveth not knoweth not God; for God is love.")])],
            ),
        ],
    }
}
