//! Argv token classification on top of the union-type facility.
//!
//! `Token = ShortSwitch{letter} | LongSwitch{name} | Int{value} |
//! String{value}`. The union is declared once per process and shared
//! read-only; tokenization only classifies, no argument grammar is parsed
//! on top of it (the CLI surface itself is clap).

use once_cell::sync::Lazy;

use crate::uniontype::{build_union_type, Constructor, UnionType, UnionValue};

/// The process-wide `Token` union and its constructors, in declaration order.
pub struct TokenRegistry {
    pub ty: UnionType,
    pub short_switch: Constructor,
    pub long_switch: Constructor,
    pub int: Constructor,
    pub string: Constructor,
}

static TOKENS: Lazy<TokenRegistry> = Lazy::new(|| {
    let (ty, ctors) = build_union_type(
        "Token",
        &[
            ("ShortSwitch", &["letter"]),
            ("LongSwitch", &["name"]),
            ("Int", &["value"]),
            ("String", &["value"]),
        ],
        false,
    )
    .expect("Token union definition is static and valid");
    let mut ctors = ctors.into_iter();
    TokenRegistry {
        ty,
        short_switch: ctors.next().expect("four declared variants"),
        long_switch: ctors.next().expect("four declared variants"),
        int: ctors.next().expect("four declared variants"),
        string: ctors.next().expect("four declared variants"),
    }
});

pub fn token_registry() -> &'static TokenRegistry {
    &TOKENS
}

/// Classify one argv word into a `Token` value.
pub fn tokenize_arg(arg: &str) -> UnionValue<String> {
    let reg = token_registry();
    if let Some(rest) = arg.strip_prefix("--") {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphabetic()) {
            return make(&reg.long_switch, rest);
        }
    } else if let Some(rest) = arg.strip_prefix('-') {
        let mut chars = rest.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                return make(&reg.short_switch, rest);
            }
        }
    }
    if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
        return make(&reg.int, arg);
    }
    make(&reg.string, arg)
}

pub fn tokenize_args<'a>(args: impl IntoIterator<Item = &'a str>) -> Vec<UnionValue<String>> {
    args.into_iter().map(tokenize_arg).collect()
}

fn make(ctor: &Constructor, value: &str) -> UnionValue<String> {
    // every Token variant has exactly one field
    ctor.positional(vec![value.to_string()])
        .expect("single-field constructor given one value")
}
