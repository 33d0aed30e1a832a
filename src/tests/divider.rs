use super::{annotated, is_annotated, is_bare, reference, strip_annotation, Divider};

#[test]
fn test_bare_divider_forms() {
    assert!(is_bare("---:"));
    assert!(is_bare("---:   "));
    assert!(!is_bare(" ---:"));
    assert!(!is_bare("---"));
    assert!(!is_bare("---: ABCD1234"));
    assert_eq!(Divider::parse("---:\r"), Some(Divider::Bare));
}

#[test]
fn test_annotated_divider_is_case_insensitive() {
    assert_eq!(
        Divider::parse("---: abcd1234 09:08:07 2024/01/02"),
        Some(Divider::Annotated {
            hash: "ABCD1234".to_string(),
            timestamp: "09:08:07 2024/01/02".to_string(),
        })
    );
    assert_eq!(
        Divider::parse("---: EFAB5678"),
        Some(Divider::Hashed {
            hash: "EFAB5678".to_string()
        })
    );
}

#[test]
fn test_non_dividers() {
    assert_eq!(Divider::parse("--- ABCD"), None);
    assert_eq!(Divider::parse("---: XYZ"), None);
    assert_eq!(Divider::parse("---: ABCD 12:00 2024/01/01"), None);
    assert_eq!(Divider::parse("text ---:"), None);
}

#[test]
fn test_rendering_parses_back() {
    let line = annotated("0A1B2C3D", "23:59:59 1999/12/31");
    assert_eq!(line, "---: 0A1B2C3D 23:59:59 1999/12/31");
    assert_eq!(Divider::parse(&line).unwrap().hash(), Some("0A1B2C3D"));
    assert_eq!(reference("0A1B2C3D"), "---: 0A1B2C3D");
    assert!(is_annotated(&reference("0A1B2C3D")));
}

#[test]
fn test_strip_annotation_collapses_leading_divider() {
    let content = "---: ABCD1234 10:00:00 2024/05/01\n\nBody\n---: 1234ABCD";
    assert_eq!(strip_annotation(content), "---:\n\nBody\n---: 1234ABCD");
    assert_eq!(strip_annotation("---: ABCD1234"), "---:");
}

#[test]
fn test_strip_annotation_leaves_other_content() {
    assert_eq!(strip_annotation("Intro\n---: ABCD1234"), "Intro\n---: ABCD1234");
    assert_eq!(strip_annotation("---:\nBody"), "---:\nBody");
    assert_eq!(strip_annotation(""), "");
}
