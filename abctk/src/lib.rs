//! # abctk
//!
//! abctkは、ABC Treebank（CCG風のカテゴリラベルを持つ日本語ツリーバンク）を
//! 整備するための木変換コアです。
//!
//! ## 概要
//!
//! このライブラリは、カテゴリ代数のパースと整形、`カテゴリ#素性=値`形式の
//! ノード注釈、識別子付き括弧表記コーパスの読み書き、ならびに派生を保存する
//! 一連の木書き換えパス（空要素消去、単分岐の圧縮と復元、関係節トレースの
//! 復元、等位接続の2分岐化、ラベルの最小化と精緻化、比較構文スパンの
//! 割り当て）を提供します。
//!
//! ## 主な機能
//!
//! - **カテゴリ代数**: 3方向の関手（`/`、`\`、`|`）を持つABCカテゴリの
//!   パース・整形・合成
//! - **簡約エンジン**: 適用規則と次数3までの関数合成によるCCG簡約の列挙
//! - **木の書き換え**: ラベルと派生を保存する一連の正規化パス
//! - **コーパスI/O**: 安定した識別子による括弧表記ファイルの読み書き
//!
//! ## 使用例
//!
//! ```
//! use abctk::annot::Annot;
//! use abctk::cat::AbcCat;
//! use abctk::cat::simplify::simplify_exh;
//!
//! let left = AbcCat::parse("NP")?;
//! let right = AbcCat::parse("<NP\\S>")?;
//! let results = simplify_exh(&left, &right);
//! assert_eq!(results[0].0, AbcCat::base("S"));
//! assert_eq!(results[0].1.to_string(), "<");
//!
//! let annot = Annot::parse("<NP\\S>#role=h#deriv=none")?;
//! assert_eq!(annot.feats.get("role"), Some("h"));
//! # Ok::<(), abctk::errors::AbctkError>(())
//! ```

/// ノードラベル注釈のパースと整形
pub mod annot;

/// ABCカテゴリ代数
pub mod cat;

/// データセット抽出
pub mod dataset;

/// エラー型の定義
pub mod errors;

/// レコード識別子
pub mod id;

/// 括弧付きコーパスの読み書き
pub mod io;

/// JIGG形式への構造射影
pub mod jigg;

/// 木の書き換えパス
pub mod transform;

/// 注釈付き順序木
pub mod tree;


pub use annot::{Annot, Feats};
pub use cat::AbcCat;
pub use errors::{AbctkError, Result};
pub use id::RecordId;
pub use tree::Tree;
