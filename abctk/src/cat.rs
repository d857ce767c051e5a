//! ABCカテゴリ代数
//!
//! このモジュールは、ABC Treebankのカテゴリラベルを表現する小さな型システムを
//! 提供します。カテゴリは原子記号（基底カテゴリ）、失敗を表す吸収元`⊥`、
//! および3方向の関手（`/`、`\`、`|`）から構成されます。
//!
//! すべてのカテゴリは不変の値型であり、構造的等価性で比較されます。
//! 操作は常に新しいインスタンスを生成します。
//!
//! # 使用例
//!
//! ```
//! use abctk::cat::{AbcCat, FunctorMode, ReprMode};
//!
//! let cat = AbcCat::parse("<NP\\S>").unwrap();
//! assert_eq!(
//!     cat,
//!     AbcCat::functor(FunctorMode::Left, AbcCat::base("NP"), AbcCat::base("S")),
//! );
//! assert_eq!(cat.pprint(ReprMode::Tlcg), "<NP\\S>");
//! ```

pub mod parse;
pub mod simplify;

use std::fmt;

use crate::errors::Result;

/// 関手の方向の列挙
///
/// ABCカテゴリの関手は3つの方向のいずれかを取ります。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctorMode {
    /// 左関手`\`。前件を左側から取ります。
    Left,

    /// 右関手`/`。前件を右側から取ります。
    Right,

    /// 垂直関手`|`。方向に中立で、非選択的束縛に使用されます。
    Vert,
}

impl FunctorMode {
    /// 方向を反転します
    ///
    /// `Left`と`Right`を入れ替えます。`Vert`は不動です。
    pub fn invert(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Vert => Self::Vert,
        }
    }
}

/// カテゴリの表示モード
///
/// 左関手の前件・後件の表示順序と括弧の種類を制御します。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReprMode {
    /// TLCG式の表記（デフォルト）。左関手は`<前件\後件>`の順。
    #[default]
    Tlcg,

    /// 伝統的なCCG表記。左関手は`<後件\前件>`の順。
    Traditional,

    /// depccg互換の表記。丸括弧を使用し、基底カテゴリの素性は`[feat]`のまま。
    Depccg,

    /// ccg2lambda互換の表記。丸括弧と伝統的順序を使用し、
    /// 基底カテゴリの素性は`name[feat=true]`に正規化されます。
    Ccg2lambda,
}

/// 基底カテゴリの素性ビュー
///
/// `S[m]`のような基底カテゴリ名を本体と素性に分解した結果です。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseFeature<'a> {
    /// 素性を除いたカテゴリ本体
    pub cat: &'a str,

    /// 角括弧内の素性
    pub feat: &'a str,
}

/// ABCカテゴリ
///
/// 原子記号、吸収元`⊥`、または方向付き関手のいずれかです。
/// 構造的等価性を持つ不変の値型として扱われます。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbcCat {
    /// 吸収元となる失敗要素。`⊥`と表示されます。
    Bot,

    /// 原子記号。名前は`S[m]`のような角括弧付き素性接尾辞を持つことがあります。
    Base(String),

    /// 方向付き関手
    Functor {
        /// 関手の方向
        mode: FunctorMode,
        /// 前件
        ant: Box<AbcCat>,
        /// 後件
        conseq: Box<AbcCat>,
    },
}

impl AbcCat {
    /// 原子カテゴリを生成します
    pub fn base<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self::Base(name.into())
    }

    /// 関手カテゴリを生成します
    ///
    /// # 引数
    ///
    /// * `mode` - 関手の方向
    /// * `ant` - 前件
    /// * `conseq` - 後件
    pub fn functor(mode: FunctorMode, ant: AbcCat, conseq: AbcCat) -> Self {
        Self::Functor {
            mode,
            ant: Box::new(ant),
            conseq: Box::new(conseq),
        }
    }

    /// 右関手`self/ant`を生成します
    ///
    /// 引数には前件（`A/B`の`B`）が来ます。
    ///
    /// # 使用例
    ///
    /// ```
    /// use abctk::cat::AbcCat;
    ///
    /// let cat = AbcCat::base("NP").r(AbcCat::base("Scomp"));
    /// assert_eq!(cat.to_string(), "<NP/Scomp>");
    /// ```
    pub fn r(self, ant: AbcCat) -> Self {
        Self::functor(FunctorMode::Right, ant, self)
    }

    /// 左関手`self\conseq`を生成します
    ///
    /// 引数には後件（`B\A`の`A`）が来ます。
    ///
    /// # 使用例
    ///
    /// ```
    /// use abctk::cat::AbcCat;
    ///
    /// let cat = AbcCat::base("NP").l(AbcCat::base("S"));
    /// assert_eq!(cat.to_string(), "<NP\\S>");
    /// ```
    pub fn l(self, conseq: AbcCat) -> Self {
        Self::functor(FunctorMode::Left, self, conseq)
    }

    /// 垂直関手`self|ant`を生成します
    ///
    /// 引数には前件（`A|B`の`B`）が来ます。
    pub fn v(self, ant: AbcCat) -> Self {
        Self::functor(FunctorMode::Vert, ant, self)
    }

    /// 自己付加カテゴリを生成します
    ///
    /// 前件と後件がともに自身と等しい関手を作ります。
    pub fn adjunct(&self, mode: FunctorMode) -> Self {
        Self::functor(mode, self.clone(), self.clone())
    }

    /// 左の付加スキーマ`<X\X>`
    pub fn adj_l(&self) -> Self {
        self.adjunct(FunctorMode::Left)
    }

    /// 右の付加スキーマ`<X/X>`
    pub fn adj_r(&self) -> Self {
        self.adjunct(FunctorMode::Right)
    }

    /// 垂直の付加スキーマ`<X|X>`
    pub fn adj_v(&self) -> Self {
        self.adjunct(FunctorMode::Vert)
    }

    /// 関手の方向を再帰的に反転します
    ///
    /// `Left`と`Right`が入れ替わります。基底カテゴリ、`⊥`、
    /// および`Vert`には作用しません。
    ///
    /// # 使用例
    ///
    /// ```
    /// use abctk::cat::AbcCat;
    ///
    /// let cat = AbcCat::parse("<NP\\S>").unwrap();
    /// assert_eq!(cat.invert_dir().to_string(), "<S/NP>");
    /// ```
    pub fn invert_dir(&self) -> Self {
        match self {
            Self::Bot | Self::Base(_) => self.clone(),
            Self::Functor { mode, ant, conseq } => Self::Functor {
                mode: mode.invert(),
                ant: Box::new(ant.invert_dir()),
                conseq: Box::new(conseq.invert_dir()),
            },
        }
    }

    /// 基底カテゴリの素性接尾辞を分解して返します
    ///
    /// 名前が`S[m]`のように角括弧付き素性で終わる基底カテゴリに対して、
    /// 本体と素性の組を返します。素性を持たない場合や基底カテゴリでない
    /// 場合は`None`を返します。
    pub fn tell_feature(&self) -> Option<BaseFeature<'_>> {
        match self {
            Self::Base(name) => {
                let stripped = name.strip_suffix(']')?;
                let open = stripped.rfind('[')?;
                Some(BaseFeature {
                    cat: &stripped[..open],
                    feat: &stripped[open + 1..],
                })
            }
            _ => None,
        }
    }

    /// 構造的等価性を検査します
    ///
    /// `ignore_feature`が真の場合、基底カテゴリの角括弧付き素性接尾辞を
    /// 取り除いた上で比較します。
    ///
    /// # 使用例
    ///
    /// ```
    /// use abctk::cat::AbcCat;
    ///
    /// let a = AbcCat::parse("<PP\\S[m]>").unwrap();
    /// let b = AbcCat::parse("<PP\\S>").unwrap();
    /// assert!(a.equiv_to(&b, true));
    /// assert!(!a.equiv_to(&b, false));
    /// ```
    pub fn equiv_to(&self, other: &AbcCat, ignore_feature: bool) -> bool {
        if !ignore_feature {
            return self == other;
        }
        match (self, other) {
            (Self::Bot, Self::Bot) => true,
            (Self::Base(_), Self::Base(_)) => self.base_body() == other.base_body(),
            (
                Self::Functor { mode, ant, conseq },
                Self::Functor {
                    mode: mode2,
                    ant: ant2,
                    conseq: conseq2,
                },
            ) => mode == mode2 && ant.equiv_to(ant2, true) && conseq.equiv_to(conseq2, true),
            _ => false,
        }
    }

    /// 基底カテゴリ名の素性を除いた本体を返します（内部メソッド）
    fn base_body(&self) -> Option<&str> {
        match self {
            Self::Base(name) => match self.tell_feature() {
                Some(feature) => Some(feature.cat),
                None => Some(name),
            },
            _ => None,
        }
    }

    /// カテゴリ文字列をパースします
    ///
    /// デフォルトのTLCG表記（角括弧`<...>`）を受理します。
    ///
    /// # エラー
    ///
    /// 不正な入力に対しては[`CategoryParseError`](crate::errors::CategoryParseError)
    /// を返します。
    pub fn parse(source: &str) -> Result<Self> {
        parse::parse_cat(source, parse::ParseMode::Tlcg)
    }

    /// 表面構文を指定してカテゴリ文字列をパースします
    pub fn parse_with(source: &str, mode: parse::ParseMode) -> Result<Self> {
        parse::parse_cat(source, mode)
    }

    /// カテゴリを整形して文字列にします
    ///
    /// # 引数
    ///
    /// * `mode` - 表示モード。左関手の表示順序と括弧の種類を決定します。
    pub fn pprint(&self, mode: ReprMode) -> String {
        let mut buf = String::new();
        self.pprint_into(&mut buf, mode);
        buf
    }

    fn pprint_into(&self, buf: &mut String, mode: ReprMode) {
        match self {
            Self::Bot => buf.push('⊥'),
            Self::Base(name) => match mode {
                ReprMode::Ccg2lambda => match self.tell_feature() {
                    Some(feature) => {
                        buf.push_str(feature.cat);
                        buf.push('[');
                        buf.push_str(feature.feat);
                        buf.push_str("=true]");
                    }
                    None => buf.push_str(name),
                },
                _ => buf.push_str(name),
            },
            Self::Functor { mode: fm, ant, conseq } => {
                let (open, close) = match mode {
                    ReprMode::Tlcg | ReprMode::Traditional => ('<', '>'),
                    ReprMode::Depccg | ReprMode::Ccg2lambda => ('(', ')'),
                };
                buf.push(open);
                match fm {
                    FunctorMode::Left => {
                        // TLCG orders the antecedent of a left functor first;
                        // the other modes put the consequence first.
                        if matches!(mode, ReprMode::Tlcg) {
                            ant.pprint_into(buf, mode);
                            buf.push('\\');
                            conseq.pprint_into(buf, mode);
                        } else {
                            conseq.pprint_into(buf, mode);
                            buf.push('\\');
                            ant.pprint_into(buf, mode);
                        }
                    }
                    FunctorMode::Right => {
                        conseq.pprint_into(buf, mode);
                        buf.push('/');
                        ant.pprint_into(buf, mode);
                    }
                    FunctorMode::Vert => {
                        conseq.pprint_into(buf, mode);
                        buf.push('|');
                        ant.pprint_into(buf, mode);
                    }
                }
                buf.push(close);
            }
        }
    }
}

impl fmt::Display for AbcCat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pprint(ReprMode::Tlcg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjunct_schema() {
        let np = AbcCat::base("NP");
        let adj = np.adj_l();
        match &adj {
            AbcCat::Functor { mode, ant, conseq } => {
                assert_eq!(*mode, FunctorMode::Left);
                assert_eq!(**ant, np);
                assert_eq!(**conseq, np);
            }
            _ => panic!("expected a functor"),
        }
        assert_eq!(np.adj_r().to_string(), "<NP/NP>");
        assert_eq!(np.adj_v().to_string(), "<NP|NP>");
    }

    #[test]
    fn test_invert_involution() {
        for src in ["NP", "⊥", "<NP\\S>", "<<A/B>|C>", "<A\\<B/C>>"] {
            let cat = AbcCat::parse(src).unwrap();
            assert_eq!(cat.invert_dir().invert_dir(), cat);
        }
    }

    #[test]
    fn test_invert_swaps_directions() {
        let cat = AbcCat::parse("<NP\\S>").unwrap();
        assert_eq!(cat.invert_dir().to_string(), "<S/NP>");
        let vert = AbcCat::parse("<S|PP>").unwrap();
        assert_eq!(vert.invert_dir(), vert);
    }

    #[test]
    fn test_tell_feature() {
        let cat = AbcCat::base("S[m]");
        let feature = cat.tell_feature().unwrap();
        assert_eq!(feature.cat, "S");
        assert_eq!(feature.feat, "m");
        assert_eq!(AbcCat::base("NP").tell_feature(), None);
        assert_eq!(AbcCat::Bot.tell_feature(), None);
    }

    #[test]
    fn test_equiv_to_ignore_feature() {
        let a = AbcCat::parse("<PP\\S[m]>").unwrap();
        let b = AbcCat::parse("<PP\\S>").unwrap();
        assert!(a.equiv_to(&b, true));
        assert!(!a.equiv_to(&b, false));
        assert!(a.equiv_to(&a, false));
    }

    #[test]
    fn test_pprint_modes() {
        let cat = AbcCat::parse("<NP\\S>").unwrap();
        assert_eq!(cat.pprint(ReprMode::Tlcg), "<NP\\S>");
        assert_eq!(cat.pprint(ReprMode::Traditional), "<S\\NP>");
        assert_eq!(cat.pprint(ReprMode::Depccg), "(S\\NP)");

        let feat = AbcCat::parse("<S[m]/NP>").unwrap();
        assert_eq!(feat.pprint(ReprMode::Depccg), "(S[m]/NP)");
        assert_eq!(feat.pprint(ReprMode::Ccg2lambda), "(S[m=true]/NP)");
    }
}
