use rand::{random, rngs::StdRng, Rng, SeedableRng};

use super::*;

use std::fs;

#[test]
fn test_normalize_ascii() {
    assert_eq!(normalize("hello world"), "hello world");
    assert_eq!(normalize("  spaced\tout\n"), "spaced out");
    assert_eq!(normalize("bell\u{7}s and\u{7f} whistles"), "bells and whistles");
}

#[test]
fn test_normalize_overrides() {
    assert_eq!(normalize("«quoted»"), "\"quoted\"");
    assert_eq!(normalize("3 ‰"), "3 %");
    assert_eq!(normalize("up↑down"), "updown");
    // accented letters survive folding
    assert_eq!(normalize("Café"), "Café");
    assert_eq!(normalize("À bientôt"), "À bientôt");
    assert_eq!(normalize("Straße"), "Strasse");
}

#[test]
fn test_normalize_unidecode() {
    assert_eq!(normalize("Café — 42 °C "), "Café -- 42 degC");
    assert_eq!(normalize("…"), "...");
    // astral and private plane code points fold to nothing
    assert_eq!(normalize("a\u{F0000}b"), "ab");
}

#[test]
fn test_normalize_idempotent() {
    let samples = [
        "hello world",
        "Café — 42 °C",
        "«quoted» ‰ …",
        "À Ê Í Õ ü ÿ ç",
        "tabs\tand\nnewlines",
    ];
    for sample in samples.iter() {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "{}", sample);
    }

    let seed: u64 = random();
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..1000 {
        let sample: String = (0..64)
            .map(|_| rng.gen_range(' '..='~'))
            .collect();
        let once = normalize(&sample);
        assert_eq!(normalize(&once), once, "seed:{} {:?}", seed, sample);
    }
}

#[test]
fn test_normalize_alphabet() {
    use std::collections::BTreeSet;

    // the declared normalized character set.
    let alphabet: BTreeSet<char> = {
        let mut alphabet = BTreeSet::new();
        for s in chars::MAPPED.iter() {
            alphabet.extend(s.chars());
        }
        for ch in "\"%ÀàÈèÌìÒòÙùÂâÊêÎîÔôÛûÁáÉéÍíÓóÚúÝýÄäËëÏïÖöÜüŸÿÇçÃãÑñÕõ".chars() {
            alphabet.insert(ch);
        }
        alphabet
    };

    let samples = ["Café — 42 °C", "«x» ↑ ‰ …", "日本語", "Ἀθῆναι", "a\u{200B}b"];
    for sample in samples.iter() {
        for ch in normalize(sample).chars() {
            assert!(alphabet.contains(&ch), "{:?} from {:?}", ch, sample);
        }
    }
}

#[test]
fn test_tokenize() {
    assert_eq!(
        tokenize("Hello, world! 2024"),
        vec!["Hello", ",", "world", "!", "2024"]
    );
    assert_eq!(tokenize("l'été 1905"), vec!["l", "'", "été", "1905"]);
    assert_eq!(tokenize("  a  b  "), vec!["a", "b"]);
    assert_eq!(tokenize("abc123def"), vec!["abc123def"]);
    assert_eq!(tokenize(""), Vec::<String>::new());
}

#[test]
fn test_simplify() {
    assert_eq!(simplify("Hello"), "hello");
    assert_eq!(simplify("2024"), "0");
    assert_eq!(simplify("v1.2.3"), "v0.0.0");
    assert_eq!(simplify("ÉTÉ"), "été");
}

#[test]
fn test_tokenize_stable() {
    let samples = [
        "Hello, world! 2024",
        "l'été de 1905 ... et après?",
        "a-b_c (d) [e] {f}",
    ];
    for sample in samples.iter() {
        let tokens: Vec<String> = tokenize(sample).iter().map(|t| simplify(t)).collect();
        let joined = tokens.join(" ");
        let again: Vec<String> = tokenize(&joined).iter().map(|t| simplify(t)).collect();
        assert_eq!(tokens, again, "{}", sample);
    }
}

#[test]
fn test_normalize_file() {
    let input = {
        let mut loc = std::env::temp_dir();
        loc.push("wikicorpus-nltk-normalize.txt");
        loc
    };
    let output = {
        let mut loc = input.clone();
        loc.set_extension("out");
        loc
    };

    let long = "long enough line with «punctuation» and a café stop";
    fs::write(&input, format!("{}\nshort\n", long)).unwrap();

    let (kept, total) =
        normalize_file(input.as_os_str(), output.as_os_str(), 20).unwrap();
    assert_eq!((kept, total), (1, 2));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "long enough line with \"punctuation\" and a café stop\n"
    );

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn test_tokenize_file() {
    let input = {
        let mut loc = std::env::temp_dir();
        loc.push("wikicorpus-nltk-tokenize.txt");
        loc
    };
    let output = {
        let mut loc = input.clone();
        loc.set_extension("out");
        loc
    };

    fs::write(&input, "One, two three four 55!\ntoo short\n").unwrap();

    let (kept, total) = tokenize_file(input.as_os_str(), output.as_os_str(), 5).unwrap();
    assert_eq!((kept, total), (1, 2));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "one , two three four 0 !\n"
    );

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}
