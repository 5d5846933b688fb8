// Copyright (c) 2026 rezky_nightky

use std::collections::HashSet;

/// Character used when no class is enabled.
pub const FALLBACK_CHAR: char = '?';

/// Set of enabled character classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextClasses(u32);

impl TextClasses {
    pub const NONE: TextClasses = TextClasses(0);
    pub const NUMBERS: TextClasses = TextClasses(0x1);
    pub const LETTERS_LOWER: TextClasses = TextClasses(0x2);
    pub const LETTERS_UPPER: TextClasses = TextClasses(0x4);
    pub const CYRILLIC: TextClasses = TextClasses(0x8);
    pub const SPECIAL: TextClasses = TextClasses(0x10);
    pub const BINARY: TextClasses = TextClasses(0x20);
    pub const OCTAL: TextClasses = TextClasses(0x40);
    pub const HEX: TextClasses = TextClasses(0x80);
    pub const KATAKANA: TextClasses = TextClasses(0x100);
    pub const GREEK: TextClasses = TextClasses(0x200);

    pub const ALL: TextClasses = TextClasses(0x3FF);
    pub const DEFAULT: TextClasses = TextClasses(0x1F);

    pub fn contains(self, other: TextClasses) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn with(self, other: TextClasses, on: bool) -> TextClasses {
        if on {
            TextClasses(self.0 | other.0)
        } else {
            TextClasses(self.0 & !other.0)
        }
    }

}

/// A character class: option name, flag and its fixed characters.
pub struct CharClass {
    pub name: &'static str,
    pub flag: TextClasses,
    pub chars: &'static str,
}

/// Build order of the alphabets.
pub const CHAR_CLASSES: &[CharClass] = &[
    CharClass {
        name: "numbers",
        flag: TextClasses::NUMBERS,
        chars: "0123456789",
    },
    CharClass {
        name: "letters_lower",
        flag: TextClasses::LETTERS_LOWER,
        chars: "abcdefghijklmnopqrstuvwxyz",
    },
    CharClass {
        name: "letters_upper",
        flag: TextClasses::LETTERS_UPPER,
        chars: "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    },
    CharClass {
        name: "cyrillic",
        flag: TextClasses::CYRILLIC,
        chars: "аАбБвВгГдДеЕёЁжЖзЗиИйЙкКлЛмМнНоОпПрРсСтТуУфФхХцЦчЧшШщЩъЪыЫьЬэЭюЮяЯ",
    },
    CharClass {
        name: "special",
        flag: TextClasses::SPECIAL,
        chars: ",;.:-_+*~#'^°!\"§$%&/()=?{[]}\\@€",
    },
    CharClass {
        name: "binary",
        flag: TextClasses::BINARY,
        chars: "01",
    },
    CharClass {
        name: "octal",
        flag: TextClasses::OCTAL,
        chars: "01234567",
    },
    CharClass {
        name: "hex",
        flag: TextClasses::HEX,
        chars: "0123456789ABCDEF",
    },
    CharClass {
        name: "katakana",
        flag: TextClasses::KATAKANA,
        chars: "ｦｧｨｩｪｫｬｭｮｯｰｱｲｳｴｵｶｷｸｹｺｻｼｽｾｿﾀﾁﾂﾃﾄﾅﾆﾇﾈﾉﾊﾋﾌﾍﾎﾏﾐﾑﾒﾓﾔﾕﾖﾗﾘﾙﾚﾛﾜﾝ",
    },
    CharClass {
        name: "greek",
        flag: TextClasses::GREEK,
        chars: "ΑΒΓΔΕΖΗΘΙΚΛΜΝΞΟΠΡΣΤΥΦΧΨΩαβγδεζηθικλμνξοπρστυφχψω",
    },
];

pub fn class_by_name(name: &str) -> Option<&'static CharClass> {
    let key = name.trim().to_ascii_lowercase().replace('-', "_");
    let key = match key.as_str() {
        "digits" | "dec" => "numbers",
        "lower" | "lowercase" => "letters_lower",
        "upper" | "uppercase" => "letters_upper",
        "symbols" | "specialchars" | "punc" => "special",
        "bin" | "01" => "binary",
        "oct" => "octal",
        "hexadecimal" => "hex",
        "japanese" => "katakana",
        other => other,
    }
    .to_string();
    CHAR_CLASSES.iter().find(|c| c.name == key)
}

/// Parses a comma-separated class list; `all` and `none` are accepted.
pub fn classes_from_str(spec: &str) -> Result<TextClasses, String> {
    let mut out = TextClasses::NONE;
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.to_ascii_lowercase().as_str() {
            "all" => out = TextClasses::ALL,
            "none" => {}
            "default" => out = out.with(TextClasses::DEFAULT, true),
            _ => {
                let class = class_by_name(part)
                    .ok_or_else(|| format!("unsupported charset: {} (see --list-charsets)", part))?;
                out = out.with(class.flag, true);
            }
        }
    }
    Ok(out)
}

/// Active and superset alphabets, both free of duplicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRange {
    pub active: Vec<char>,
    pub superset: Vec<char>,
}

fn push_unique(out: &mut Vec<char>, seen: &mut HashSet<char>, chars: &str) {
    for ch in chars.chars() {
        if seen.insert(ch) {
            out.push(ch);
        }
    }
}

pub fn build_text_range(flags: TextClasses) -> TextRange {
    let mut active = Vec::new();
    let mut superset = Vec::new();
    let mut seen_active = HashSet::new();
    let mut seen_superset = HashSet::new();

    for class in CHAR_CLASSES {
        push_unique(&mut superset, &mut seen_superset, class.chars);
        if flags.contains(class.flag) {
            push_unique(&mut active, &mut seen_active, class.chars);
        }
    }

    if active.is_empty() {
        active.push(FALLBACK_CHAR);
    }
    if seen_superset.insert(FALLBACK_CHAR) {
        superset.push(FALLBACK_CHAR);
    }

    TextRange { active, superset }
}
