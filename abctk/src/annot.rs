//! ノードラベル注釈のパースと整形
//!
//! ツリーの各ノードラベルは`カテゴリ#キー=値#...`の形式で、カテゴリ部分と
//! 素性バンドルから構成されます。このモジュールはその分解と再構成を提供します。
//!
//! カテゴリ部分は速度のため遅延パースされます。`ID`や`COMMENT`のような
//! 非CCGラベルや、パースに失敗したラベルは生のトークンのまま保持されます。
//!
//! 認識される素性キーには`deriv`、`role`、`comp`、`rel`、`adv-pro`、
//! `trace.*`、`char-start`、`char-end`、`janome`が含まれます。

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::cat::{AbcCat, ReprMode};
use crate::errors::{AbctkError, Result};

static RE_FEAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<key>[^=#]+)(=(?<val>[^#]*))?$").unwrap());

/// 挿入順を保持する素性バンドル
///
/// キーから値への順序付き写像です。素性の数は小さいため、
/// 連想配列として線形探索のベクタを使用します。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feats(Vec<(String, String)>);

impl Feats {
    /// 空の素性バンドルを生成します
    pub fn new() -> Self {
        Self::default()
    }

    /// キーに対応する値を返します
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// キーに対応する値、なければ既定値を返します
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// キーの有無を検査します
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 素性を設定します
    ///
    /// 既存のキーは位置を保ったまま値が置き換えられ、
    /// 新しいキーは末尾に追加されます。
    pub fn insert<K, V>(&mut self, key: K, val: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let val = val.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = val,
            None => self.0.push((key, val)),
        }
    }

    /// キーを削除し、削除された値を返します
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    /// 述語を満たす素性だけを残します
    pub fn retain<F>(&mut self, mut pred: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.0.retain(|(k, v)| pred(k, v));
    }

    /// 素性の組を挿入順で反復します
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 素性の個数を返します
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 素性バンドルが空かどうかを検査します
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Feats
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut feats = Self::new();
        for (k, v) in iter {
            feats.insert(k, v);
        }
        feats
    }
}

/// 注釈のカテゴリ部分
///
/// パース済みのABCカテゴリか、未パースの生トークンのいずれかです。
/// 生トークンは非CCGラベル（`ID`、`COMMENT`、`TOP`など）と
/// パース失敗時の保全に使用されます。
///
/// 等価性は表現に依存しません。パース可能な生トークンはパース結果で
/// 比較されるため、`Parsed`のカテゴリと、それを整形した生トークンは
/// 等しくなります。
#[derive(Clone, Debug)]
pub enum AnnotCat {
    /// パース済みのカテゴリ
    Parsed(AbcCat),

    /// 未パースの生トークン
    Raw(String),
}

impl PartialEq for AnnotCat {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Parsed(a), Self::Parsed(b)) => a == b,
            (Self::Raw(a), Self::Raw(b)) => {
                a == b
                    || matches!(
                        (AbcCat::parse(a), AbcCat::parse(b)),
                        (Ok(ca), Ok(cb)) if ca == cb
                    )
            }
            (Self::Parsed(cat), Self::Raw(raw)) | (Self::Raw(raw), Self::Parsed(cat)) => {
                AbcCat::parse(raw).is_ok_and(|parsed| parsed == *cat)
            }
        }
    }
}

impl Eq for AnnotCat {}

impl AnnotCat {
    /// カテゴリ部分を整形します
    pub fn pprint(&self, mode: ReprMode) -> String {
        match self {
            Self::Parsed(cat) => cat.pprint(mode),
            Self::Raw(raw) => raw.clone(),
        }
    }

    /// 生トークンが空文字列かどうかを検査します
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Raw(raw) if raw.is_empty())
    }
}

/// ノードラベル注釈
///
/// カテゴリ部分と素性バンドルの組です。`CAT#k1=v1#k2=v2…`として
/// 整形され、整形とパースは整形式の注釈に対して正確に往復します。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annot {
    /// カテゴリ部分
    pub cat: AnnotCat,

    /// 素性バンドル
    pub feats: Feats,
}

impl Annot {
    /// パース済みカテゴリから注釈を生成します
    pub fn new(cat: AbcCat, feats: Feats) -> Self {
        Self {
            cat: AnnotCat::Parsed(cat),
            feats,
        }
    }

    /// 生トークンから素性なしの注釈を生成します
    pub fn raw<S>(token: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            cat: AnnotCat::Raw(token.into()),
            feats: Feats::new(),
        }
    }

    /// ノードラベル文字列をパースします
    ///
    /// 最初の`#`でカテゴリ部分と素性部分に分割し、以降の`#`が
    /// `キー=値`の組を区切ります。`=`を持たないキーは空値で
    /// 格納されます。カテゴリ部分はこの時点ではパースされません。
    ///
    /// # エラー
    ///
    /// 空のキー（`#=v`など）に対しては
    /// [`AnnotationParseError`](crate::errors::AnnotationParseError)を返します。
    pub fn parse(source: &str) -> Result<Self> {
        let (cat_part, feats_part) = match source.find('#') {
            Some(pos) => (&source[..pos], &source[pos + 1..]),
            None => (source, ""),
        };

        let mut feats = Feats::new();
        if !feats_part.is_empty() {
            for chunk in feats_part.split('#') {
                let caps = RE_FEAT
                    .captures(chunk)
                    .ok_or_else(|| AbctkError::annotation_parse("empty feature key", source))?;
                let key = caps.name("key").unwrap().as_str();
                let val = caps.name("val").map_or("", |m| m.as_str());
                feats.insert(key, val);
            }
        }

        Ok(Self {
            cat: AnnotCat::Raw(cat_part.to_string()),
            feats,
        })
    }

    /// カテゴリ部分をパース済みの形で返します
    ///
    /// 生トークンは最初のアクセス時にパースされ、成功すると
    /// パース済み表現に置き換えられます。パースできないトークンは
    /// そのまま保持され、`None`が返されます。
    pub fn parse_cat(&mut self) -> Option<&AbcCat> {
        if let AnnotCat::Raw(raw) = &self.cat {
            match AbcCat::parse(raw) {
                Ok(cat) => self.cat = AnnotCat::Parsed(cat),
                Err(_) => return None,
            }
        }
        match &self.cat {
            AnnotCat::Parsed(cat) => Some(cat),
            AnnotCat::Raw(_) => None,
        }
    }

    /// カテゴリ部分のパースを試み、所有するカテゴリを返します
    ///
    /// [`parse_cat`](Self::parse_cat)と異なり自身を変更しません。
    pub fn to_cat(&self) -> Option<AbcCat> {
        match &self.cat {
            AnnotCat::Parsed(cat) => Some(cat.clone()),
            AnnotCat::Raw(raw) => AbcCat::parse(raw).ok(),
        }
    }

    /// 注釈を`CAT#k=v#…`の形式に整形します
    pub fn pprint(&self, mode: ReprMode) -> String {
        let mut buf = self.cat.pprint(mode);
        for (key, val) in self.feats.iter() {
            buf.push('#');
            buf.push_str(key);
            buf.push('=');
            buf.push_str(val);
        }
        buf
    }
}

impl From<AbcCat> for Annot {
    fn from(cat: AbcCat) -> Self {
        Self::new(cat, Feats::new())
    }
}

impl fmt::Display for Annot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pprint(ReprMode::Tlcg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let annot = Annot::parse("<NP/NP>#role=h#deriv=leave").unwrap();
        assert_eq!(annot.cat, AnnotCat::Raw("<NP/NP>".to_string()));
        assert_eq!(annot.feats.get("role"), Some("h"));
        assert_eq!(annot.feats.get("deriv"), Some("leave"));
        assert_eq!(annot.feats.len(), 2);
    }

    #[test]
    fn test_parse_no_feats() {
        let annot = Annot::parse("COMMENT").unwrap();
        assert_eq!(annot.cat, AnnotCat::Raw("COMMENT".to_string()));
        assert!(annot.feats.is_empty());
    }

    #[test]
    fn test_parse_key_without_value() {
        let annot = Annot::parse("NP#rel").unwrap();
        assert_eq!(annot.feats.get("rel"), Some(""));
    }

    #[test]
    fn test_parse_empty_key_fails() {
        assert!(Annot::parse("NP#=v").is_err());
    }

    #[test]
    fn test_roundtrip() {
        for src in [
            "<NP/NP>#role=h#deriv=leave",
            "NP",
            "<PP\\S>#trace.binconj=root#comp=1,cont",
            "#deriv=conj",
        ] {
            let annot = Annot::parse(src).unwrap();
            assert_eq!(annot.pprint(ReprMode::Tlcg), src);
            assert_eq!(Annot::parse(&annot.pprint(ReprMode::Tlcg)).unwrap(), annot);
        }
    }

    #[test]
    fn test_lazy_cat_parse() {
        let mut annot = Annot::parse("<NP\\S>#deriv=none").unwrap();
        assert!(annot.parse_cat().is_some());
        assert!(matches!(annot.cat, AnnotCat::Parsed(_)));
        // Pretty-printing after parsing restores the canonical form.
        assert_eq!(annot.pprint(ReprMode::Tlcg), "<NP\\S>#deriv=none");

        let mut bad = Annot::parse("ID").unwrap();
        assert!(bad.parse_cat().is_some());

        let mut unparsable = Annot::parse("<NP\\#deriv=x").unwrap();
        assert!(unparsable.parse_cat().is_none());
        assert_eq!(unparsable.cat, AnnotCat::Raw("<NP\\".to_string()));
    }

    #[test]
    fn test_equality_ignores_representation() {
        let parsed = AnnotCat::Parsed(AbcCat::parse("<NP\\S>").unwrap());
        assert_eq!(parsed, AnnotCat::Raw("<NP\\S>".to_string()));
        assert_ne!(parsed, AnnotCat::Raw("NP".to_string()));
        assert_ne!(parsed, AnnotCat::Raw("ID".to_string()));

        // Unparsable raws fall back to string comparison.
        assert_eq!(
            AnnotCat::Raw("COMMENT".to_string()),
            AnnotCat::Raw("COMMENT".to_string()),
        );

        let mut lazy = Annot::parse("<NP\\S>#role=h").unwrap();
        let eager = lazy.clone();
        lazy.parse_cat();
        assert_eq!(lazy, eager);
    }

    #[test]
    fn test_feats_order_preserved() {
        let mut feats = Feats::new();
        feats.insert("b", "2");
        feats.insert("a", "1");
        feats.insert("b", "3");
        let collected: Vec<_> = feats.iter().collect();
        assert_eq!(collected, vec![("b", "3"), ("a", "1")]);
    }
}
