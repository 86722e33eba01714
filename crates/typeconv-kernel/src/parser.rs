//! Parser for generic type signatures.
//!
//! Grammar, read in a single left-to-right pass without backtracking:
//!
//! ```text
//! type       := identifier ( '<' type ( ',' type )* '>' )?
//! identifier := one or more characters other than '<', '>', ',' and whitespace
//! ```
//!
//! Whitespace around identifiers, commas and angle brackets is insignificant.
//! Array types such as `int[]` are plain identifiers here; the resolver gives
//! the `[]` suffix its meaning.

use typeconv_types::TypeDescriptor;

use crate::error::SignatureSyntaxError;

/// Parse a type signature such as `java.util.Map<java.lang.String, java.lang.Integer>`.
///
/// The whole input must be consumed; trailing characters after the outermost
/// type are an error.
pub fn parse_signature(signature: &str) -> Result<TypeDescriptor, SignatureSyntaxError> {
    let mut parser = SignatureParser::new(signature);
    let descriptor = parser.parse_type()?;

    parser.skip_spaces();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected '{c}' after type")));
    }

    Ok(descriptor)
}

struct SignatureParser<'a> {
    src: &'a str,
    /// Byte position of the cursor. Boundary characters are all ASCII.
    pos: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, SignatureSyntaxError> {
        self.skip_spaces();
        let raw_name = self.read_identifier();
        if raw_name.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected type name, found '{c}'")),
                None => self.error("expected type name, found end of input"),
            });
        }

        self.skip_spaces();
        if self.peek() != Some('<') {
            return Ok(TypeDescriptor::simple(raw_name));
        }
        self.bump();

        // At least one argument: `Foo<>` fails inside this call.
        let mut args = vec![self.parse_type()?];
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    args.push(self.parse_type()?);
                }
                Some('>') => {
                    self.bump();
                    break;
                }
                Some(c) => return Err(self.error(format!("expected ',' or '>', found '{c}'"))),
                None => return Err(self.error("expected '>', found end of input")),
            }
        }

        Ok(TypeDescriptor::generic(raw_name, args))
    }

    /// Read up to the next boundary character.
    fn read_identifier(&mut self) -> &'a str {
        let start = self.pos;
        let len = self.src[start..]
            .find(is_boundary)
            .unwrap_or(self.src.len() - start);
        self.pos += len;
        &self.src[start..self.pos]
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_spaces(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: impl Into<String>) -> SignatureSyntaxError {
        SignatureSyntaxError {
            message: message.into(),
            offset: self.src[..self.pos].chars().count(),
            signature: self.src.to_string(),
        }
    }
}

fn is_boundary(c: char) -> bool {
    matches!(c, '<' | '>' | ',') || c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn simple(name: &str) -> TypeDescriptor {
        TypeDescriptor::simple(name)
    }

    #[test]
    fn parses_plain_type() {
        assert_eq!(
            parse_signature("java.lang.String").unwrap(),
            simple("java.lang.String")
        );
    }

    #[test]
    fn parses_single_argument() {
        let desc = parse_signature("java.util.List<java.lang.String>").unwrap();
        assert_eq!(desc.raw_name, "java.util.List");
        assert_eq!(desc.type_arguments, vec![simple("java.lang.String")]);
    }

    #[test]
    fn parses_two_arguments_ignoring_whitespace() {
        let desc = parse_signature("java.util.Map<java.lang.String, java.lang.Integer>").unwrap();
        assert_eq!(desc.raw_name, "java.util.Map");
        assert_eq!(
            desc.type_arguments,
            vec![simple("java.lang.String"), simple("java.lang.Integer")]
        );
    }

    #[test]
    fn parses_nested_generics() {
        let desc = parse_signature("Map<String, List<Integer>>").unwrap();
        assert_eq!(
            desc,
            TypeDescriptor::generic(
                "Map",
                vec![
                    simple("String"),
                    TypeDescriptor::generic("List", vec![simple("Integer")]),
                ]
            )
        );
    }

    #[rstest]
    #[case::around_brackets("  List <  String  >  ")]
    #[case::tabs_and_newlines("List\t<\nString\n>")]
    #[case::tight("List<String>")]
    fn whitespace_is_insignificant(#[case] input: &str) {
        let desc = parse_signature(input).unwrap();
        assert_eq!(desc, TypeDescriptor::generic("List", vec![simple("String")]));
    }

    #[test]
    fn array_suffix_is_part_of_identifier() {
        assert_eq!(parse_signature("int[]").unwrap(), simple("int[]"));
        assert_eq!(
            parse_signature("List<java.lang.Integer[]>").unwrap(),
            TypeDescriptor::generic("List", vec![simple("java.lang.Integer[]")])
        );
    }

    #[rstest]
    #[case::unterminated("List<String")]
    #[case::empty_arguments("Foo<>")]
    #[case::trailing_comma("Map<String,>")]
    #[case::leading_comma("Map<,String>")]
    #[case::trailing_garbage("List<String>>")]
    #[case::two_types("String Integer")]
    #[case::empty("")]
    #[case::only_spaces("   ")]
    #[case::starts_with_bracket("<String>")]
    #[case::nested_unterminated("Map<String, List<Integer>")]
    fn rejects_malformed(#[case] input: &str) {
        assert!(parse_signature(input).is_err(), "{input:?} should not parse");
    }

    #[test]
    fn unterminated_reports_end_of_input() {
        let err = parse_signature("List<String").unwrap_err();
        assert_eq!(err.offset, 11);
        insta::assert_snapshot!(err, @"expected '>', found end of input at offset 11 in `List<String`");
    }

    #[test]
    fn empty_argument_list_reports_position() {
        let err = parse_signature("Foo<>").unwrap_err();
        assert_eq!(err.offset, 4);
        insta::assert_snapshot!(err, @"expected type name, found '>' at offset 4 in `Foo<>`");
    }

    #[test]
    fn offsets_count_characters() {
        let err = parse_signature("Größe<").unwrap_err();
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn deep_nesting_has_no_limit() {
        let depth = 200;
        let signature = format!("{}T{}", "L<".repeat(depth), ">".repeat(depth));
        let mut desc = parse_signature(&signature).unwrap();
        for _ in 0..depth {
            assert_eq!(desc.raw_name, "L");
            desc = desc.type_arguments.remove(0);
        }
        assert_eq!(desc, simple("T"));
    }

    proptest! {
        #[test]
        fn never_panics(input in "[A-Za-z.<>, \\[\\]]{0,48}") {
            let _ = parse_signature(&input);
        }

        #[test]
        fn canonical_rendering_is_a_fixed_point(input in "[A-Za-z.<>, ]{1,48}") {
            if let Ok(desc) = parse_signature(&input) {
                let rendered = desc.to_string();
                prop_assert_eq!(parse_signature(&rendered).ok(), Some(desc));
            }
        }
    }
}
