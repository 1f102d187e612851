//! Randomized tests for schema and table name validation.
//!
//! Names are generated from the accepted alphabet, then corrupted with
//! forbidden sequences or stray characters at random positions.

use rand::Rng;
use rand::seq::SliceRandom;
use sql_mcp_server::error::ValidationError;
use sql_mcp_server::sql::{IdentifierKind, validate_identifier};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-";
const FORBIDDEN: &[&str] = &[";", "--", "/*", "*/", "'", "\"", "=", "<", ">"];
const STRAY: &[char] = &[' ', '.', '(', ')', '`', '[', ']', '$', '%', '\\', 'é', '\u{0}', '+'];

fn random_identifier(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Insert `piece` at a random char boundary. Only ASCII is generated, so
/// every byte offset is a boundary.
fn insert_at_random(rng: &mut impl Rng, base: &str, piece: &str) -> String {
    let pos = rng.gen_range(0..=base.len());
    format!("{}{}{}", &base[..pos], piece, &base[pos..])
}

#[test]
fn fuzz_valid_identifiers_are_accepted() {
    let mut rng = rand::thread_rng();
    for _ in 0..2_000 {
        let len = rng.gen_range(1..64);
        let name = random_identifier(&mut rng, len);
        // "--" is itself a forbidden sequence even though '-' is allowed.
        if name.contains("--") {
            continue;
        }
        assert_eq!(
            validate_identifier(&name, IdentifierKind::Table),
            Ok(name.as_str()),
            "rejected {name:?}"
        );
    }
}

#[test]
fn fuzz_forbidden_sequences_are_rejected() {
    let mut rng = rand::thread_rng();
    for _ in 0..2_000 {
        let len = rng.gen_range(0..32);
        let base = random_identifier(&mut rng, len);
        let piece = FORBIDDEN.choose(&mut rng).copied().unwrap_or(";");
        let name = insert_at_random(&mut rng, &base, piece);

        let err = validate_identifier(&name, IdentifierKind::Schema).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ForbiddenCharacter {
                kind: IdentifierKind::Schema
            },
            "wrong error for {name:?}"
        );
    }
}

#[test]
fn fuzz_stray_characters_fail_format() {
    let mut rng = rand::thread_rng();
    for _ in 0..2_000 {
        let len = rng.gen_range(1..32);
        let base = random_identifier(&mut rng, len);
        if base.contains("--") {
            continue;
        }
        let stray = STRAY.choose(&mut rng).copied().unwrap_or('.');
        let pos = rng.gen_range(0..base.len());
        let name = format!("x{}{}{}x", &base[..pos], stray, &base[pos..]);

        let err = validate_identifier(&name, IdentifierKind::Table).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFormat {
                kind: IdentifierKind::Table
            },
            "wrong error for {name:?}"
        );
    }
}

#[test]
fn test_edge_cases() {
    let empty = ["", " ", "   ", "\n\r\t"];
    for name in empty {
        assert!(matches!(
            validate_identifier(name, IdentifierKind::Table),
            Err(ValidationError::EmptyIdentifier { .. })
        ));
    }

    let injections = [
        "'OR 1=1--",
        "users; DROP TABLE users",
        "a/*comment*/b",
        "x\"y",
        "1<2",
    ];
    for name in injections {
        assert!(matches!(
            validate_identifier(name, IdentifierKind::Table),
            Err(ValidationError::ForbiddenCharacter { .. })
        ));
    }

    // Surrounding whitespace is part of the name and fails the format check.
    for name in ["  orders  ", "orders\n", " orders"] {
        assert_eq!(
            validate_identifier(name, IdentifierKind::Table),
            Err(ValidationError::InvalidFormat {
                kind: IdentifierKind::Table
            }),
            "{name:?}"
        );
    }

    let long = "a".repeat(10_000);
    assert!(validate_identifier(&long, IdentifierKind::Table).is_ok());
}

#[test]
fn test_error_text_names_the_kind() {
    let err = validate_identifier("a.b", IdentifierKind::Schema).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid Schema name: must contain only alphanumeric characters, underscores, or hyphens"
    );
}
