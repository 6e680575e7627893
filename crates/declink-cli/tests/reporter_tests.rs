use super::reporter::Reporter;
use declink_common::Diagnostic;
use declink_common::diagnostics::diagnostic_messages;

#[test]
fn formats_warning_with_code_and_related_notes() {
    let diagnostic = Diagnostic::from_message(
        diagnostic_messages::AMBIGUOUS_INHERITED_MEMBER,
        "Both.m",
        &["Both", "m", "Left", "Right"],
    )
    .with_related("Right.m", "Also inherited from here.");

    let text = Reporter::new(false).format_diagnostic(&diagnostic);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Both.m - warning DL9001: Class 'Both' inherits incompatible members 'm' from 'Left' and 'Right'; the member from 'Left' is used.",
            "  Related: Right.m - Also inherited from here.",
        ]
    );
}

#[test]
fn renders_one_block_per_diagnostic() {
    let diagnostics = vec![
        Diagnostic::warning("A.m", "first", 9001),
        Diagnostic::warning("", "second", 0),
    ];

    let text = Reporter::new(false).render(&diagnostics);
    assert_eq!(text, "A.m - warning DL9001: first\n<unknown> - warning: second\n");
}
