//! レコード識別子
//!
//! ツリーバンク中の各文は、ソースファイル内の一文を命名する
//! 正準でソート可能な識別子を持ちます。識別子は階層的な名前、通し番号、
//! 接尾辞の三つ組と、元の生文字列から構成されます。
//!
//! 名前は`;`を区切りとする階層パスであり、ディスク上のファイルパスは
//! `;`を`/`に置き換えて安定した拡張子を付けることで決定的に導出されます。

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::LazyLock;

use regex::Regex;

/// 導出されるファイルパスの拡張子
pub const FILE_SUFFIX: &str = ".psd";

/// 識別子の文法`name (";" subname)* "_" number (suffix)?`に対応する
/// パターン。名前は貪欲にマッチするため、分割は最後の`_数字`で起こります。
static RE_RECORD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<name>.+)_(?<number>[0-9]+)(?<suffix>.*)$").unwrap());

static FRESH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// レコード識別子
///
/// `(name, number, suffix)`の三つ組と元の生文字列を保持します。
/// 全順序は`(name, number, suffix, orig)`の辞書式順序です。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId {
    /// `;`区切りの階層的な名前
    pub name: String,

    /// 通し番号
    pub number: u64,

    /// 番号の後に残る接尾辞
    pub suffix: String,

    /// 元の生文字列
    pub orig: String,
}

impl RecordId {
    /// 生文字列から識別子をパースします
    ///
    /// 文法に合致しない文字列は全体を名前として受理され、
    /// 番号0と空の接尾辞が充てられます。
    ///
    /// # 使用例
    ///
    /// ```
    /// use abctk::id::RecordId;
    ///
    /// let id = RecordId::from_string("1_misc_BUFFALO;TSOGD_1a;JP");
    /// assert_eq!(id.name, "1_misc_BUFFALO;TSOGD");
    /// assert_eq!(id.number, 1);
    /// assert_eq!(id.suffix, "a;JP");
    /// ```
    pub fn from_string(source: &str) -> Self {
        match RE_RECORD_ID.captures(source) {
            Some(caps) => {
                let number = caps["number"].parse().unwrap_or_else(|_| {
                    // A run of digits that overflows u64 is folded to 0.
                    log::warn!("record ID number out of range: {source}");
                    0
                });
                Self {
                    name: caps["name"].to_string(),
                    number,
                    suffix: caps["suffix"].to_string(),
                    orig: source.to_string(),
                }
            }
            None => {
                log::debug!("record ID does not match the grammar: {source}");
                Self {
                    name: source.to_string(),
                    number: 0,
                    suffix: String::new(),
                    orig: source.to_string(),
                }
            }
        }
    }

    /// 新しい識別子を発行します
    ///
    /// IDなしで到着したツリーのために、プロセス全体のカウンタから
    /// 一意な識別子を採番します。
    pub fn probe() -> Self {
        let n = FRESH_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
        Self {
            name: "untitled".to_string(),
            number: n,
            suffix: String::new(),
            orig: format!("untitled_{n}"),
        }
    }

    /// 識別子からファイルパスを導出します
    ///
    /// 名前の`;`を`/`に置き換え、安定した拡張子を付けます。
    pub fn tell_path(&self) -> PathBuf {
        Self::path_of_name(&self.name)
    }

    /// 名前からファイルパスを導出します
    ///
    /// 同じ名前を共有するレコード群は同じファイルに書き出されます。
    pub fn path_of_name(name: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", name.replace(';', "/"), FILE_SUFFIX))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.orig)
    }
}

impl PartialOrd for RecordId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordId {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.name, self.number, &self.suffix, &self.orig).cmp(&(
            &other.name,
            other.number,
            &other.suffix,
            &other.orig,
        ))
    }
}
