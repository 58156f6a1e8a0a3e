//! Answer normalization and comparison
//!
//! Matching is exact after normalization. The only equivalence beyond that
//! is between number words and Arabic numerals, through two closed tables:
//! Spanish 0-1000 and Korean (Sino-Korean and native numerals).

use std::collections::HashMap;
use std::sync::LazyLock;

/// Punctuation removed before comparing answers
const STRIPPED_PUNCTUATION: &[char] = &['¡', '¿', '!', '?', '.', ',', ';', ':', '\'', '"'];

/// Strip punctuation, collapse whitespace runs, trim and lowercase
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Live highlighting: does the answer start with what has been typed so far?
pub fn is_prefix_match(answer: &str, input: &str) -> bool {
    let norm_input = normalize(input);
    !norm_input.is_empty() && normalize(answer).starts_with(&norm_input)
}

/// Whether `input` is an accepted answer for `answer`
pub fn answers_match(answer: &str, input: &str) -> bool {
    let norm_answer = normalize(answer);
    let norm_input = normalize(input);

    if norm_answer == norm_input {
        return true;
    }

    [&*SPANISH_NUMBERS, &*KOREAN_NUMBERS].iter().any(|table| {
        table.get(&norm_answer).is_some_and(|d| *d == norm_input)
            || table.get(&norm_input).is_some_and(|d| *d == norm_answer)
    })
}

/// Spanish number word (normalized spelling) -> digits, 0 through 1000
static SPANISH_NUMBERS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for n in 0..=1000u32 {
        for spelling in spanish_spellings(n) {
            table.insert(spelling, n.to_string());
        }
    }
    table
});

const SPANISH_UNITS: [&str; 10] = [
    "cero", "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve",
];

const SPANISH_TEENS: [&[&str]; 10] = [
    &["diez"],
    &["once"],
    &["doce"],
    &["trece"],
    &["catorce"],
    &["quince"],
    &["dieciséis", "dieciseis"],
    &["diecisiete"],
    &["dieciocho"],
    &["diecinueve"],
];

const SPANISH_TWENTIES: [&[&str]; 10] = [
    &["veinte"],
    &["veintiuno", "veintiún", "veintiun", "veintiuna"],
    &["veintidós", "veintidos"],
    &["veintitrés", "veintitres"],
    &["veinticuatro"],
    &["veinticinco"],
    &["veintiséis", "veintiseis"],
    &["veintisiete"],
    &["veintiocho"],
    &["veintinueve"],
];

/// Indexed by tens digit, 3 through 9
const SPANISH_TENS: [&str; 10] = [
    "", "", "", "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta", "noventa",
];

/// Masculine hundreds, indexed by hundreds digit 2 through 9
const SPANISH_HUNDREDS: [&str; 10] = [
    "",
    "",
    "doscientos",
    "trescientos",
    "cuatrocientos",
    "quinientos",
    "seiscientos",
    "setecientos",
    "ochocientos",
    "novecientos",
];

/// Spellings of a unit digit inside a compound ("treinta y un", "... y una")
fn unit_spellings(unit: u32, standalone: bool) -> Vec<String> {
    match unit {
        1 if standalone => vec!["uno".into(), "una".into()],
        1 => vec!["uno".into(), "un".into(), "una".into()],
        u => vec![SPANISH_UNITS[u as usize].to_string()],
    }
}

fn spanish_below_hundred(n: u32) -> Vec<String> {
    match n {
        0..=9 => unit_spellings(n, true),
        10..=19 => strs(SPANISH_TEENS[(n - 10) as usize]),
        20..=29 => strs(SPANISH_TWENTIES[(n - 20) as usize]),
        _ => {
            let tens = SPANISH_TENS[(n / 10) as usize];
            match n % 10 {
                0 => vec![tens.to_string()],
                unit => unit_spellings(unit, false)
                    .into_iter()
                    .map(|u| format!("{} y {}", tens, u))
                    .collect(),
            }
        }
    }
}

fn spanish_spellings(n: u32) -> Vec<String> {
    match n {
        0..=99 => spanish_below_hundred(n),
        100 => vec!["cien".into(), "ciento".into()],
        101..=199 => spanish_below_hundred(n - 100)
            .into_iter()
            .map(|rest| format!("ciento {}", rest))
            .collect(),
        1000 => vec!["mil".into()],
        _ => {
            let masculine = SPANISH_HUNDREDS[(n / 100) as usize];
            let feminine = masculine.replace("ientos", "ientas");
            let rest = n % 100;
            [masculine.to_string(), feminine]
                .into_iter()
                .flat_map(|hundreds| {
                    if rest == 0 {
                        vec![hundreds]
                    } else {
                        spanish_below_hundred(rest)
                            .into_iter()
                            .map(|r| format!("{} {}", hundreds, r))
                            .collect()
                    }
                })
                .collect()
        }
    }
}

fn strs(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Korean numeral word -> digits
static KOREAN_NUMBERS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    let mut table: HashMap<String, String> = KOREAN_SINO
        .iter()
        .chain(KOREAN_NATIVE)
        .map(|(word, digits)| (word.to_string(), digits.to_string()))
        .collect();
    table.insert("영".to_string(), "0".to_string());
    table.insert("공".to_string(), "0".to_string());
    table
});

const KOREAN_SINO: &[(&str, &str)] = &[
    ("일", "1"), ("이", "2"), ("삼", "3"), ("사", "4"), ("오", "5"),
    ("육", "6"), ("칠", "7"), ("팔", "8"), ("구", "9"), ("십", "10"),
    ("십일", "11"), ("십이", "12"), ("십삼", "13"), ("십사", "14"), ("십오", "15"),
    ("십육", "16"), ("십칠", "17"), ("십팔", "18"), ("십구", "19"),
    ("이십", "20"), ("이십일", "21"), ("이십이", "22"), ("이십삼", "23"),
    ("이십사", "24"), ("이십오", "25"), ("이십육", "26"), ("이십칠", "27"),
    ("이십팔", "28"), ("이십구", "29"),
    ("삼십", "30"), ("사십", "40"), ("오십", "50"),
    ("육십", "60"), ("칠십", "70"), ("팔십", "80"), ("구십", "90"),
    ("백", "100"), ("이백", "200"), ("삼백", "300"), ("사백", "400"),
    ("오백", "500"), ("육백", "600"), ("칠백", "700"), ("팔백", "800"), ("구백", "900"),
    ("천", "1000"),
];

const KOREAN_NATIVE: &[(&str, &str)] = &[
    ("하나", "1"), ("둘", "2"), ("셋", "3"), ("넷", "4"), ("다섯", "5"),
    ("여섯", "6"), ("일곱", "7"), ("여덟", "8"), ("아홉", "9"), ("열", "10"),
    ("열하나", "11"), ("열둘", "12"), ("열셋", "13"), ("열넷", "14"), ("열다섯", "15"),
    ("열여섯", "16"), ("열일곱", "17"), ("열여덟", "18"), ("열아홉", "19"),
    ("스물", "20"), ("스물하나", "21"), ("스물둘", "22"),
];
