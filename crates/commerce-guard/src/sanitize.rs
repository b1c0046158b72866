//! Input Sanitization
//!
//! Strips markup from strings with an empty allow-list: every tag and
//! attribute is removed, raw-text elements lose their content, stray angle
//! brackets are escaped and `javascript:` schemes are rewritten. Output is
//! a fixed point: sanitizing it again changes nothing.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

/// Replacement for `javascript:` scheme occurrences
pub const SCHEME_MARKER: &str = "blocked:";

/// Elements removed together with their content
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "noscript"];

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref RAW_TEXT: Vec<Regex> = RAW_TEXT_ELEMENTS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect();
    // Quoted attribute values may contain '>'
    static ref TAG: Regex =
        Regex::new(r#"<[a-zA-Z!/?](?:"[^"]*"|'[^']*'|[^'">])*>"#).unwrap();
    // Whatever survives: unbalanced quotes or a tag cut off at end of input
    static ref TAG_REMNANT: Regex = Regex::new(r"<[a-zA-Z!/?][^>]*(?:>|$)").unwrap();
    static ref JS_SCHEME: Regex = Regex::new(r"(?i)javascript\s*:").unwrap();
}

/// Sanitize a single string
pub fn sanitize(input: &str) -> String {
    if !input.contains(['<', '>']) && !JS_SCHEME.is_match(input) {
        return input.to_string();
    }

    let mut out = COMMENT.replace_all(input, "").into_owned();
    for element in RAW_TEXT.iter() {
        out = element.replace_all(&out, "").into_owned();
    }
    out = TAG.replace_all(&out, "").into_owned();
    out = TAG_REMNANT.replace_all(&out, "").into_owned();
    out = out.replace('<', "&lt;").replace('>', "&gt;");

    JS_SCHEME.replace_all(&out, SCHEME_MARKER).into_owned()
}

/// Sanitize every string leaf of a JSON value, returning a copy of the
/// same shape. Keys, array order and non-string leaves are untouched.
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize(s)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), sanitize_value(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

/// In-place variant of [`sanitize_value`]
pub fn sanitize_value_mut(value: &mut Value) {
    match value {
        Value::String(s) => {
            let clean = sanitize(s);
            if clean != *s {
                *s = clean;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sanitize_value_mut),
        Value::Object(map) => map.values_mut().for_each(sanitize_value_mut),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_strips_tags_keeps_text() {
        assert_eq!(sanitize("<b>Blue</b> <i>widget</i>"), "Blue widget");
        assert_eq!(sanitize("<p class=\"x\">Hello</p>"), "Hello");
        assert_eq!(sanitize("plain text"), "plain text");
    }

    #[test]
    fn test_drops_script_and_style_content() {
        assert_eq!(sanitize("ok<script>alert(1)</script>!"), "ok!");
        assert_eq!(sanitize("<STYLE type=text/css>body{}</style>x"), "x");
        assert_eq!(sanitize("a<!-- <script>x</script> -->b"), "ab");
    }

    #[test]
    fn test_removes_event_handlers() {
        let out = sanitize(r#"<img src=x onerror="alert(1)">caption"#);
        assert_eq!(out, "caption");

        let out = sanitize(r#"<a title="a>b" onclick='steal()'>link</a>"#);
        assert_eq!(out, "link");
        assert!(!out.contains("onclick"));
    }

    #[test]
    fn test_unterminated_tag() {
        assert_eq!(sanitize("name<img src=x onerror=alert(1)"), "name");
        assert_eq!(sanitize(r#"x<img alt="y onerror=z>w"#), "xw");
    }

    #[test]
    fn test_nested_tag_trick() {
        let out = sanitize("<scr<script>ipt>alert(1)</script>");
        assert!(!out.contains('<'));
        assert!(!out.to_lowercase().contains("<script"));
    }

    #[test]
    fn test_stray_brackets_are_escaped() {
        assert_eq!(sanitize("5 < 6 > 4"), "5 &lt; 6 &gt; 4");
        assert_eq!(sanitize("<3"), "&lt;3");
    }

    #[test]
    fn test_javascript_scheme_rewritten() {
        assert_eq!(sanitize("javascript:alert(1)"), "blocked:alert(1)");
        assert_eq!(sanitize("JavaScript :void(0)"), "blocked:void(0)");
        assert_eq!(
            sanitize(r#"<a href="javascript:x()">go</a> javascript:y()"#),
            "go blocked:y()"
        );
        // tag removal must not reassemble a scheme
        assert_eq!(sanitize("java<b>script:</b>x"), "blocked:x");
    }

    #[test]
    fn test_idempotent_examples() {
        for input in [
            "<b>x</b>",
            "a < b",
            "javascript:javascript:",
            "&lt;script&gt;",
            "<<script>>",
            "java\tscript:1",
        ] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_value_passthrough_for_non_strings() {
        for value in [json!(null), json!(true), json!(42), json!(-1.5)] {
            assert_eq!(sanitize_value(&value), value);
        }
    }

    #[test]
    fn test_value_recursion() {
        let input = json!({
            "name": "<b>Mug</b>",
            "price": 12.5,
            "tags": ["<i>new</i>", 3, null, {"note": "<script>x</script>ok"}],
            "<k>": "javascript:go()",
            "active": false
        });
        let expected = json!({
            "name": "Mug",
            "price": 12.5,
            "tags": ["new", 3, null, {"note": "ok"}],
            "<k>": "blocked:go()",
            "active": false
        });
        assert_eq!(sanitize_value(&input), expected);

        let mut in_place = input.clone();
        sanitize_value_mut(&mut in_place);
        assert_eq!(in_place, expected);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[<>a-z /=\"':!-]{0,24}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map("[a-z<>]{1,6}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn same_shape(before: &Value, after: &Value) -> bool {
        match (before, after) {
            (Value::String(_), Value::String(_)) => true,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_shape(x, y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map_or(false, |w| same_shape(v, w)))
            }
            (x, y) => x == y,
        }
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(s in ".{0,64}") {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn prop_markup_heavy_is_idempotent(s in "[<>a-zA-Z \"'=/!:-]{0,64}") {
            let once = sanitize(&s);
            prop_assert!(!once.contains('<'));
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn prop_no_tags_or_handlers_survive(
            tag in "(img|a|div|svg|body|iframe)",
            event in "(onerror|onload|onclick|onmouseover)",
            payload in "[a-z()0-9]{0,12}",
            text in "[A-Z0-9 ]{0,12}",
        ) {
            let input = format!("{text}<{tag} src=x {event}=\"{payload}\">{text}</{tag}>");
            let out = sanitize(&input);
            prop_assert!(!out.contains('<'));
            prop_assert!(!out.contains(event.as_str()));
        }

        #[test]
        fn prop_value_shape_preserved(value in arb_json()) {
            let clean = sanitize_value(&value);
            prop_assert!(same_shape(&value, &clean));
            prop_assert_eq!(sanitize_value(&clean), clean);
        }
    }
}
