//! エラー型の定義
//!
//! このモジュールは、abctkライブラリで使用されるすべてのエラー型を定義します。
//! ツリー単位のエラーはバッチ境界で捕捉され、問題のツリーは理由をログに残して
//! 破棄されます。カテゴリ代数の内部で発生したエラーは呼び出し元の変形パスまで
//! 伝播し、そこでスキップか中断かが決定されます。

use std::error::Error;
use std::fmt::{self, Debug};

/// abctk専用のResult型
///
/// エラー型としてデフォルトで[`AbctkError`]を使用します。
pub type Result<T, E = AbctkError> = std::result::Result<T, E>;

/// abctkのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 各バリアントは特定のエラー条件に対応しています。
#[derive(Debug, thiserror::Error)]
pub enum AbctkError {
    /// カテゴリ文字列のパースエラー
    ///
    /// [`CategoryParseError`]のエラーバリアント。
    #[error(transparent)]
    CategoryParse(CategoryParseError),

    /// ノードラベル注釈のパースエラー
    ///
    /// [`AnnotationParseError`]のエラーバリアント。
    #[error(transparent)]
    AnnotationParse(AnnotationParseError),

    /// ツリー構造のエラー
    ///
    /// 括弧の不整合やIDノードのアリティ異常など、
    /// 入力ツリーの構造が不正な場合に発生します。
    #[error("TreeStructureError: {msg} (tree: {id})")]
    TreeStructure {
        /// 問題のツリーのID
        id: String,
        /// エラーメッセージ
        msg: String,
    },

    /// 関係節痕跡復元のエラー
    ///
    /// 関係節化サイトが不正な形をしている場合に発生します。
    /// 寛容モードではWARNログの上でノードがスキップされます。
    #[error("RelTraceRestorationError: {reason} (tree: {id})")]
    RelTraceRestoration {
        /// 問題のツリーのID
        id: String,
        /// 不正の内容
        reason: String,
    },

    /// 等位接続の不正エラー
    ///
    /// 空の等位接続スパンに遭遇した場合に発生し、
    /// バッチドライバまで浮上します。
    #[error("ConjunctionMalformedError: vacuous conjunct span (tree: {id})")]
    ConjunctionMalformed {
        /// 問題のツリーのID
        id: String,
    },

    /// データセット抽出の対象外ツリーエラー
    ///
    /// パーサ訓練用データに変換できないツリーに遭遇した場合に発生します。
    #[error("IneligibleTreeError: {msg} (tree: {id})")]
    IneligibleTree {
        /// 問題のツリーのID
        id: String,
        /// 不適格の理由
        msg: String,
    },

    /// 標準I/Oエラー
    ///
    /// [`std::io::Error`]のエラーバリアント。
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AbctkError {
    /// カテゴリパースエラーを生成します
    ///
    /// # 引数
    ///
    /// * `fragment` - パースに失敗した断片
    /// * `source` - パース対象の文字列全体
    pub(crate) fn category_parse<S, T>(fragment: S, source: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self::CategoryParse(CategoryParseError {
            fragment: fragment.into(),
            source: source.into(),
        })
    }

    /// 注釈パースエラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `source` - パース対象のラベル全体
    pub(crate) fn annotation_parse<S, T>(msg: S, source: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self::AnnotationParse(AnnotationParseError {
            msg: msg.into(),
            source: source.into(),
        })
    }
}

/// カテゴリ文字列が不正な場合に使用されるエラー
///
/// パースに失敗した断片を保持します。
#[derive(Debug)]
pub struct CategoryParseError {
    /// パースに失敗した断片
    pub(crate) fragment: String,

    /// パース対象の文字列全体
    pub(crate) source: String,
}

impl CategoryParseError {
    /// パースに失敗した断片を返します
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CategoryParseError: unexpected '{}' in '{}'",
            self.fragment, self.source
        )
    }
}

impl Error for CategoryParseError {}

/// ノードラベルの`#k=v`注釈が不正な場合に使用されるエラー
#[derive(Debug)]
pub struct AnnotationParseError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// パース対象のラベル全体
    pub(crate) source: String,
}

impl fmt::Display for AnnotationParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AnnotationParseError: {}: '{}'", self.msg, self.source)
    }
}

impl Error for AnnotationParseError {}
