use pretty_assertions::assert_eq;
use std::fs;
use stockline::error::StockError;
use stockline::mailmap::Mailmap;
use tempfile::tempdir;

fn write_mailmap(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mailmap");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn resolves_email_aliases_to_canonical_identity() {
    let (_dir, path) = write_mailmap(
        "# canonical identities\n\
         Jane Doe <jane@example.com> <jdoe@oldhost.example>\n\
         <jane@example.com> <jane.doe@corp.example>\n",
    );
    let mailmap = Mailmap::from_path(&path).unwrap();
    assert_eq!(2, mailmap.len());

    let jane = mailmap.resolve("jdoe@oldhost.example", "jdoe");
    assert_eq!("jane@example.com", jane.email);
    assert_eq!("Jane Doe", jane.name);

    // Second form keeps the commit's display name.
    let jane2 = mailmap.resolve("jane.doe@corp.example", "Jane D.");
    assert_eq!("jane@example.com", jane2.email);
    assert_eq!("Jane D.", jane2.name);

    // Emails match case-insensitively.
    let jane3 = mailmap.resolve("JDoe@OldHost.example", "jdoe");
    assert_eq!("jane@example.com", jane3.email);
}

#[test]
fn single_email_form_replaces_display_name_only() {
    let (_dir, path) = write_mailmap("Proper Name <commit@example.com>\n");
    let mailmap = Mailmap::from_path(&path).unwrap();

    let who = mailmap.resolve("commit@example.com", "bad name");
    assert_eq!("commit@example.com", who.email);
    assert_eq!("Proper Name", who.name);
}

#[test]
fn name_restricted_entry_only_matches_that_name() {
    let (_dir, path) = write_mailmap(
        "Real Alice <alice@example.com> Alice Bot <shared@example.com>\n",
    );
    let mailmap = Mailmap::from_path(&path).unwrap();

    let matched = mailmap.resolve("shared@example.com", "Alice Bot");
    assert_eq!("alice@example.com", matched.email);

    let unmatched = mailmap.resolve("shared@example.com", "Someone Else");
    assert_eq!("shared@example.com", unmatched.email);
}

#[test]
fn unknown_signatures_pass_through_unchanged() {
    let mailmap = Mailmap::empty();
    let who = mailmap.resolve("dev@example.com", "Dev");
    assert_eq!("dev@example.com", who.email);
    assert_eq!("Dev", who.name);
}

#[test]
fn malformed_line_aborts_load_with_line_number() {
    let (_dir, path) = write_mailmap("Jane Doe <jane@example.com>\nthis is not a mailmap\n");
    match Mailmap::from_path(&path) {
        Err(StockError::Mailmap { line, .. }) => assert_eq!(2, line),
        other => panic!("expected mailmap error, got {other:?}"),
    }
}

#[test]
fn unclosed_bracket_is_rejected() {
    let (_dir, path) = write_mailmap("Jane <jane@example.com\n");
    assert!(Mailmap::from_path(&path).is_err());
}
