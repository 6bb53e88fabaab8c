use lv2meta_ttl::lexer::{Lexer, Token};
use lv2meta_ttl::{parse_document, ParseOptions, Term, Triple};
use proptest::prelude::*;

fn local_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z][A-Za-z0-9_]{0,8}").unwrap()
}

fn plain_string() -> impl Strategy<Value = String> {
    // No quotes or backslashes, so the literal survives unescaping unchanged.
    proptest::string::string_regex("[A-Za-z0-9 .,;:#()\\[\\]-]{0,20}").unwrap()
}

fn object() -> impl Strategy<Value = (String, Term)> {
    prop_oneof![
        local_name().prop_map(|n| (format!("ex:{n}"), Term::iri(format!("http://e/#{n}")))),
        plain_string().prop_map(|s| (format!("\"{s}\""), Term::string(s))),
        any::<i32>().prop_map(|i| (i.to_string(), Term::integer(i as i64))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    /// The lexer always terminates and never goes backwards, whatever the input.
    #[test]
    fn lexer_is_total_and_monotonic(input in ".{0,200}") {
        let mut last = None;
        let mut lexer = Lexer::new(&input);
        let mut steps = 0usize;
        while let Some(item) = lexer.next() {
            let offset = match item {
                Ok(spanned) => spanned.offset,
                Err(err) => err.offset,
            };
            if let Some(prev) = last {
                prop_assert!(offset > prev);
            }
            prop_assert!(offset < input.len());
            prop_assert!(lexer.position() > offset);
            last = Some(offset);
            steps += 1;
            prop_assert!(steps <= input.len());
        }
    }

    /// Lenient parsing never panics; it either succeeds or reports an error.
    #[test]
    fn lenient_parse_never_panics(input in "[<>a-z:@ .;,\\[\\]()\"#0-9\n_-]{0,120}") {
        let _ = parse_document("fuzz.ttl", &input, &ParseOptions::lenient());
    }

    /// A generated flat document parses back to exactly the statements written.
    #[test]
    fn generated_statements_parse_back(
        rows in proptest::collection::vec((local_name(), local_name(), object()), 1..12)
    ) {
        let mut text = String::from("@prefix ex: <http://e/#> .\n");
        let mut expected = Vec::new();
        for (s, p, (o_text, o_term)) in rows {
            text.push_str(&format!("ex:{s} ex:{p} {o_text} .\n"));
            expected.push(Triple::new(
                format!("http://e/#{s}"),
                format!("http://e/#{p}"),
                o_term,
            ));
        }
        let doc = parse_document("gen.ttl", &text, &ParseOptions::strict())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(doc.triples, expected);
    }

    #[test]
    fn integers_lex_as_integers(i in any::<i64>()) {
        let text = i.to_string();
        let tokens: Vec<_> = Lexer::new(&text).collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].token, &Token::Integer(i));
    }
}
