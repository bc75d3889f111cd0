//! Static operator table: one descriptor per verb token, giving its unary and
//! binary implementations, its printed form, and identifier aliases.
//!
//! Grounded on the teacher's `syntax::operators` module (a static, searched
//! table of operator descriptors built once via a `default()` constructor)
//! and on the original source's `op_table`/`op_infos` pair, which split the
//! same information across a function-pointer table and a separate
//! printable-text table; here both live on one `OpDesc` per tag.

use crate::error::KError;
use crate::value::Value;

pub type UnaryFn = fn(&Value) -> Result<Value, KError>;
pub type BinaryFn = fn(&Value, &Value) -> Result<Value, KError>;

/// One entry per verb character (plus the three identifier aliases). This is
/// also the adverb tag set for `/ \ '` and their `:`-suffixed forms, since
/// adverbs attach to an `OpTag`-free child rather than needing their own verb
/// slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpTag {
    Plus,
    Minus,
    Star,
    Percent,
    Amp,
    Bar,
    Tilde,
    Caret,
    Equal,
    Less,
    More,
    Bang,
    Hash,
    Underscore,
    Comma,
    Colon,
    Sin,
    Cos,
    Abs,
    // Adverb tags (not verbs; never carry unary/binary slots of their own).
    Over,       // /
    Scan,       // \
    Each,       // '
    EachRight,  // /:
    EachLeft,   // \:
}

pub struct OpDesc {
    pub tag: OpTag,
    pub unary: Option<UnaryFn>,
    pub binary: Option<BinaryFn>,
    pub print_text: &'static str,
    pub aliases: &'static [&'static str],
}

impl OpDesc {
    pub fn find(tag: OpTag) -> &'static OpDesc {
        TABLE
            .iter()
            .find(|d| d.tag == tag)
            .expect("every OpTag has a table entry")
    }
}

/// Lookup by single printable character, used by the lexer to retag a
/// punctuation character into its `OpTag`.
pub fn tag_for_char(c: char) -> Option<OpTag> {
    use OpTag::*;
    Some(match c {
        '+' => Plus,
        '-' => Minus,
        '*' => Star,
        '%' => Percent,
        '&' => Amp,
        '|' => Bar,
        '~' => Tilde,
        '^' => Caret,
        '=' => Equal,
        '<' => Less,
        '>' => More,
        '!' => Bang,
        '#' => Hash,
        '_' => Underscore,
        ',' => Comma,
        ':' => Colon,
        '/' => Over,
        '\\' => Scan,
        '\'' => Each,
        _ => return None,
    })
}

/// Lookup by identifier text, used by the lexer to retag `sin`/`cos`/`abs`.
pub fn tag_for_ident(s: &str) -> Option<OpTag> {
    use OpTag::*;
    Some(match s {
        "sin" => Sin,
        "cos" => Cos,
        "abs" => Abs,
        _ => return None,
    })
}

pub fn is_adverb_tag(tag: OpTag) -> bool {
    matches!(
        tag,
        OpTag::Over | OpTag::Scan | OpTag::Each | OpTag::EachRight | OpTag::EachLeft
    )
}

pub fn print_text(tag: OpTag) -> &'static str {
    OpDesc::find(tag).print_text
}

use crate::verbs;

static TABLE: &[OpDesc] = &[
    OpDesc {
        tag: OpTag::Plus,
        unary: Some(verbs::flip),
        binary: Some(verbs::add),
        print_text: "+",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Minus,
        unary: Some(verbs::negate),
        binary: Some(verbs::sub),
        print_text: "-",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Star,
        unary: Some(verbs::first),
        binary: Some(verbs::mul),
        print_text: "*",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Percent,
        unary: Some(verbs::sqrt),
        binary: Some(verbs::div),
        print_text: "%",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Amp,
        unary: Some(verbs::where_),
        binary: Some(verbs::min),
        print_text: "&",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Bar,
        unary: Some(verbs::reverse),
        binary: Some(verbs::max),
        print_text: "|",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Tilde,
        unary: Some(verbs::not),
        binary: Some(verbs::match_),
        print_text: "~",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Caret,
        unary: Some(verbs::sort),
        binary: None,
        print_text: "^",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Equal,
        unary: Some(verbs::group),
        binary: Some(verbs::eq),
        print_text: "=",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Less,
        unary: Some(verbs::grade_up),
        binary: Some(verbs::less),
        print_text: "<",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::More,
        unary: Some(verbs::grade_down),
        binary: Some(verbs::more),
        print_text: ">",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Bang,
        unary: Some(verbs::enumerate),
        binary: Some(verbs::key),
        print_text: "!",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Hash,
        unary: Some(verbs::count),
        binary: Some(verbs::take),
        print_text: "#",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Underscore,
        unary: Some(verbs::floor),
        binary: Some(verbs::drop),
        print_text: "_",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Comma,
        unary: Some(verbs::enlist),
        binary: Some(verbs::concat),
        print_text: ",",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Colon,
        unary: None,
        binary: None, // assignment is handled specially by the evaluator
        print_text: ":",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Sin,
        unary: Some(verbs::sin),
        binary: None,
        print_text: "sin",
        aliases: &["sin"],
    },
    OpDesc {
        tag: OpTag::Cos,
        unary: Some(verbs::cos),
        binary: None,
        print_text: "cos",
        aliases: &["cos"],
    },
    OpDesc {
        tag: OpTag::Abs,
        unary: Some(verbs::abs),
        binary: None,
        print_text: "abs",
        aliases: &["abs"],
    },
    OpDesc {
        tag: OpTag::Over,
        unary: None,
        binary: None,
        print_text: "/",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Scan,
        unary: None,
        binary: None,
        print_text: "\\",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::Each,
        unary: None,
        binary: None,
        print_text: "'",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::EachRight,
        unary: None,
        binary: None,
        print_text: "/:",
        aliases: &[],
    },
    OpDesc {
        tag: OpTag::EachLeft,
        unary: None,
        binary: None,
        print_text: "\\:",
        aliases: &[],
    },
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_by_char() {
        assert_eq!(tag_for_char('+'), Some(OpTag::Plus));
        assert_eq!(tag_for_char('/'), Some(OpTag::Over));
        assert_eq!(tag_for_char('q'), None);
    }

    #[test]
    fn lookup_by_ident() {
        assert_eq!(tag_for_ident("sin"), Some(OpTag::Sin));
        assert_eq!(tag_for_ident("sine"), None);
    }

    #[test]
    fn every_tag_has_a_desc() {
        for tag in [
            OpTag::Plus,
            OpTag::Minus,
            OpTag::Star,
            OpTag::Percent,
            OpTag::Amp,
            OpTag::Bar,
            OpTag::Tilde,
            OpTag::Caret,
            OpTag::Equal,
            OpTag::Less,
            OpTag::More,
            OpTag::Bang,
            OpTag::Hash,
            OpTag::Underscore,
            OpTag::Comma,
            OpTag::Colon,
            OpTag::Sin,
            OpTag::Cos,
            OpTag::Abs,
        ] {
            OpDesc::find(tag);
        }
    }

    #[test]
    fn caret_has_no_binary() {
        assert!(OpDesc::find(OpTag::Caret).binary.is_none());
    }
}
