//! カテゴリ文字列のパーサ
//!
//! 2種類の表面構文を受理します。デフォルトのTLCG表記では関手全体が
//! 角括弧`<...>`で囲まれ、depccg表記では丸括弧が使われます。
//! 字句解析器はトークン`(`、`)`、`<`、`>`、`/`、`\`、`|`、`⊥`、識別子を
//! 切り出します。識別子は区切り文字以外の文字の最大連続です。
//!
//! 演算子の結合は段階化された文法で決まります。`\`の連鎖は右結合
//! （`A\B\C` = `A\(B\C)`）、`/`と`|`の連鎖は左結合
//! （`A/B/C` = `(A/B)/C`）です。

use crate::cat::{AbcCat, FunctorMode};
use crate::errors::{AbctkError, Result};

/// カテゴリの表面構文の選択
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// 角括弧`<...>`を使用するTLCG表記（デフォルト）
    #[default]
    Tlcg,

    /// 丸括弧を使用するdepccg表記。基底カテゴリは`[m3]`のような
    /// 素性接尾辞を持つことがあります。
    Depccg,
}

/// 字句解析器が切り出すトークン
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Slash,
    Backslash,
    Vbar,
    Bot,
    Ident(&'a str),
}

impl<'a> Token<'a> {
    fn as_str(&self) -> &'a str {
        match self {
            Self::Open => "<",
            Self::Close => ">",
            Self::Slash => "/",
            Self::Backslash => "\\",
            Self::Vbar => "|",
            Self::Bot => "⊥",
            Self::Ident(s) => s,
        }
    }
}

/// 入力をトークン列に分割します
///
/// 括弧の種類はモードに依存します。もう一方の括弧種は
/// 識別子の一部として扱われます。
fn lex(source: &str, mode: ParseMode) -> Result<Vec<Token<'_>>> {
    let (open, close) = match mode {
        ParseMode::Tlcg => ('<', '>'),
        ParseMode::Depccg => ('(', ')'),
    };

    fn flush<'a>(
        tokens: &mut Vec<Token<'a>>,
        start: &mut Option<usize>,
        source: &'a str,
        end: usize,
    ) {
        if let Some(s) = start.take() {
            tokens.push(Token::Ident(&source[s..end]));
        }
    }

    let mut tokens = Vec::new();
    let mut ident_start: Option<usize> = None;

    for (pos, ch) in source.char_indices() {
        let tok = if ch == open {
            Some(Token::Open)
        } else if ch == close {
            Some(Token::Close)
        } else {
            match ch {
                '/' => Some(Token::Slash),
                '\\' => Some(Token::Backslash),
                '|' => Some(Token::Vbar),
                '⊥' => Some(Token::Bot),
                _ => None,
            }
        };

        match tok {
            Some(tok) => {
                flush(&mut tokens, &mut ident_start, source, pos);
                tokens.push(tok);
            }
            None if ch.is_whitespace() || ch == '#' => {
                return Err(AbctkError::category_parse(ch.to_string(), source));
            }
            None => {
                ident_start.get_or_insert(pos);
            }
        }
    }
    flush(&mut tokens, &mut ident_start, source, source.len());

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn fail<T>(&self, fragment: &str) -> Result<T> {
        Err(AbctkError::category_parse(fragment, self.source))
    }

    /// `vert := right ("|" right)*`、左結合
    fn vert(&mut self) -> Result<AbcCat> {
        let mut acc = self.right()?;
        while self.peek() == Some(Token::Vbar) {
            self.bump();
            let ant = self.right()?;
            acc = AbcCat::functor(FunctorMode::Vert, ant, acc);
        }
        Ok(acc)
    }

    /// `right := left ("/" left)*`、左結合
    fn right(&mut self) -> Result<AbcCat> {
        let mut acc = self.left()?;
        while self.peek() == Some(Token::Slash) {
            self.bump();
            let ant = self.left()?;
            acc = AbcCat::functor(FunctorMode::Right, ant, acc);
        }
        Ok(acc)
    }

    /// `left := atom ("\" atom)*`、右結合
    fn left(&mut self) -> Result<AbcCat> {
        let mut items = vec![self.atom()?];
        while self.peek() == Some(Token::Backslash) {
            self.bump();
            items.push(self.atom()?);
        }

        let mut acc = items.pop().unwrap();
        while let Some(ant) = items.pop() {
            acc = AbcCat::functor(FunctorMode::Left, ant, acc);
        }
        Ok(acc)
    }

    /// `atom := "⊥" | ident | open cat close`
    fn atom(&mut self) -> Result<AbcCat> {
        match self.bump() {
            Some(Token::Bot) => Ok(AbcCat::Bot),
            Some(Token::Ident(name)) => Ok(AbcCat::base(name)),
            Some(Token::Open) => {
                let inner = self.vert()?;
                match self.bump() {
                    Some(Token::Close) => Ok(inner),
                    Some(tok) => self.fail(tok.as_str()),
                    None => self.fail(""),
                }
            }
            Some(tok) => self.fail(tok.as_str()),
            None => self.fail(""),
        }
    }
}

/// カテゴリ文字列をパースします
///
/// # エラー
///
/// 入力全体が一つのカテゴリとして消費できない場合、
/// 問題の断片を持つ[`CategoryParseError`](crate::errors::CategoryParseError)
/// を返します。
pub fn parse_cat(source: &str, mode: ParseMode) -> Result<AbcCat> {
    let tokens = lex(source, mode)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        source,
    };
    let cat = parser.vert()?;
    match parser.peek() {
        None => Ok(cat),
        Some(tok) => parser.fail(tok.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cat::ReprMode;

    fn roundtrip(src: &str) -> String {
        parse_cat(src, ParseMode::Tlcg).unwrap().pprint(ReprMode::Tlcg)
    }

    #[test]
    fn test_parse_base() {
        assert_eq!(parse_cat("NP", ParseMode::Tlcg).unwrap(), AbcCat::base("NP"));
        assert_eq!(parse_cat("⊥", ParseMode::Tlcg).unwrap(), AbcCat::Bot);
    }

    #[test]
    fn test_parse_left_functor() {
        let cat = parse_cat("<NP\\S>", ParseMode::Tlcg).unwrap();
        assert_eq!(
            cat,
            AbcCat::functor(FunctorMode::Left, AbcCat::base("NP"), AbcCat::base("S")),
        );
        assert_eq!(cat.pprint(ReprMode::Tlcg), "<NP\\S>");
    }

    #[test]
    fn test_associativity() {
        // Left chains fold rightwards, right chains leftwards.
        assert_eq!(roundtrip("A\\B\\C"), "<A\\<B\\C>>");
        assert_eq!(roundtrip("A/B/C"), "<<A/B>/C>");
        assert_eq!(roundtrip("A|B|C"), "<<A|B>|C>");
    }

    #[test]
    fn test_mixed_operators() {
        assert_eq!(roundtrip("A\\B/C"), "<<A\\B>/C>");
        assert_eq!(roundtrip("A/B\\C"), "<A/<B\\C>>");
        assert_eq!(roundtrip("A|B/C"), "<A|<B/C>>");
    }

    #[test]
    fn test_nested_brackets() {
        assert_eq!(roundtrip("<<A/B>\\C>"), "<<A/B>\\C>");
        assert_eq!(roundtrip("<A\\<B|C>>"), "<A\\<B|C>>");
    }

    #[test]
    fn test_depccg_mode() {
        let cat = parse_cat("(S[m3]\\NP)", ParseMode::Depccg).unwrap();
        assert_eq!(
            cat,
            AbcCat::functor(
                FunctorMode::Left,
                AbcCat::base("NP"),
                AbcCat::base("S[m3]"),
            ),
        );
        assert_eq!(cat.pprint(ReprMode::Depccg), "(S[m3]\\NP)");
    }

    #[test]
    fn test_roundtrip_canonical() {
        for src in ["NP", "⊥", "<NP\\S>", "<<PP\\S>|PP>", "<N/N>", "<<A/B>/C>"] {
            let cat = parse_cat(src, ParseMode::Tlcg).unwrap();
            assert_eq!(cat.pprint(ReprMode::Tlcg), src);
            assert_eq!(
                parse_cat(&cat.pprint(ReprMode::Tlcg), ParseMode::Tlcg).unwrap(),
                cat,
            );
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_cat("", ParseMode::Tlcg).is_err());
        assert!(parse_cat("<NP\\S", ParseMode::Tlcg).is_err());
        assert!(parse_cat("NP\\", ParseMode::Tlcg).is_err());
        assert!(parse_cat("NP S", ParseMode::Tlcg).is_err());
        assert!(parse_cat("<NP\\S>>", ParseMode::Tlcg).is_err());
    }
}
