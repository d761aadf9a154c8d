//! Encoding Detection Module
//!
//! テキスト入力（Markdown、CSV）の文字コードを推定するモジュール。
//!
//! 判定は優先順位付きの候補リストを先頭から順に試すフォールバックチェーンです。
//! スコアリングは行わず、最初にデコードに成功した候補を採用します。
//! 候補がすべて失敗した場合は統計的検出器（chardetng）の推定を、
//! それも信頼できない場合は既定の文字コードを返します。
//!
//! 短いファイルや複数の文字コードで解釈可能なファイルでは誤判定することがあります。

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use encoding_rs::{Decoder, DecoderResult, Encoding, EUC_KR, UTF_8, WINDOWS_1252};

use crate::error::{MdSheetError, Result};

/// 既定の文字コード候補（優先順）
pub const DEFAULT_ENCODING_CANDIDATES: &[&str] = &[
    "utf-8",
    "utf-8-sig",
    "gbk",
    "gb2312",
    "gb18030",
    "big5",
    "shift_jis",
    "euc-jp",
    "euc-kr",
    "cp949",
    "latin-1",
    "iso-8859-1",
    "cp1251",
    "cp1252",
    "koi8-r",
    "ascii",
];

/// 既定のサンプルサイズ（バイト）
pub const DEFAULT_SAMPLE_SIZE: usize = 1024;

/// 検証時にデコードする最小文字数
pub const DEFAULT_VERIFY_CHARS: usize = 100;

/// 統計的検出器の推定を採用する信頼度のしきい値（この値を超える必要がある）
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.7;

/// 候補・統計的検出のいずれも失敗した場合の文字コード
pub const DEFAULT_ENCODING: &str = "utf-8";

const VERIFY_CHUNK_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Plain,
    /// 先頭のBOMを取り除く（utf-8-sig）
    StripBom,
    /// 0x80以上のバイトを拒否する（ascii）
    AsciiOnly,
}

/// 解決済みの文字コード
///
/// 候補リストのラベル（例: `"gbk"`）と、実際にデコードを行う
/// `encoding_rs`のエンコーディングの組です。
#[derive(Clone, Copy)]
pub struct TextEncoding {
    name: &'static str,
    encoding: &'static Encoding,
    flavor: Flavor,
}

impl fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextEncoding")
            .field("name", &self.name)
            .field("encoding", &self.encoding.name())
            .finish()
    }
}

impl PartialEq for TextEncoding {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.encoding == other.encoding && self.flavor == other.flavor
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TextEncoding {
    /// ラベルから文字コードを解決する
    ///
    /// WHATWG Encoding Standardのラベルに加えて、`utf-8-sig`、`ascii`、
    /// `latin-1`、`cp949`を受け付けます。大文字・小文字と`_`/`-`の違いは無視します。
    ///
    /// # 戻り値
    ///
    /// * `Some(TextEncoding)` - 解決できた場合
    /// * `None` - 未対応のラベルの場合
    pub fn for_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");

        let (name, encoding, flavor) = match normalized.as_str() {
            "utf-8-sig" | "utf8-sig" => ("utf-8-sig", UTF_8, Flavor::StripBom),
            "ascii" | "us-ascii" => ("ascii", WINDOWS_1252, Flavor::AsciiOnly),
            "latin-1" | "latin1" => ("latin-1", WINDOWS_1252, Flavor::Plain),
            "cp949" | "uhc" => ("cp949", EUC_KR, Flavor::Plain),
            _ => {
                let encoding = Encoding::for_label(trimmed.as_bytes())
                    .or_else(|| Encoding::for_label(normalized.as_bytes()))?;
                (canonical_label(&normalized, encoding), encoding, Flavor::Plain)
            }
        };

        Some(Self {
            name,
            encoding,
            flavor,
        })
    }

    /// UTF-8
    pub fn utf8() -> Self {
        Self {
            name: "utf-8",
            encoding: UTF_8,
            flavor: Flavor::Plain,
        }
    }

    /// 要求されたラベル名（候補リストの表記）
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// デコードに使用する`encoding_rs`のエンコーディング
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// バイト列全体を厳密にデコードする
    ///
    /// 不正なバイト列が含まれる場合は`None`を返します（置換文字は使用しません）。
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        let mut decoder = self.new_decoder();
        let mut text = String::new();
        self.feed(&mut decoder, bytes, true, &mut text)
            .then_some(text)
    }

    fn new_decoder(&self) -> Decoder {
        match self.flavor {
            Flavor::StripBom => self.encoding.new_decoder_with_bom_removal(),
            Flavor::Plain | Flavor::AsciiOnly => self.encoding.new_decoder_without_bom_handling(),
        }
    }

    /// デコーダーにバイト列を供給する
    ///
    /// `last`が`false`の場合、末尾で途切れたマルチバイト列はエラーにならず
    /// デコーダー内部に保持されます。
    fn feed(&self, decoder: &mut Decoder, mut bytes: &[u8], last: bool, out: &mut String) -> bool {
        if self.flavor == Flavor::AsciiOnly && !bytes.is_ascii() {
            return false;
        }

        loop {
            let needed = decoder
                .max_utf8_buffer_length_without_replacement(bytes.len())
                .unwrap_or_else(|| bytes.len().saturating_mul(3).saturating_add(16));
            out.reserve(needed);

            let (result, read) = decoder.decode_to_string_without_replacement(bytes, out, last);
            match result {
                DecoderResult::InputEmpty => return true,
                DecoderResult::Malformed(_, _) => return false,
                DecoderResult::OutputFull => bytes = &bytes[read..],
            }
        }
    }
}

/// WHATWGラベルで解決したエンコーディングの表示名
fn canonical_label(normalized: &str, encoding: &'static Encoding) -> &'static str {
    DEFAULT_ENCODING_CANDIDATES
        .iter()
        .copied()
        .find(|candidate| candidate.replace('_', "-") == normalized)
        .unwrap_or_else(|| encoding.name())
}

/// 統計的検出器の推定結果
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingGuess {
    /// 推定した文字コードのラベル
    pub label: String,
    /// 信頼度（0.0〜1.0）
    pub confidence: f32,
}

/// 候補リストがすべて失敗した場合に使用する統計的検出器
pub trait StatisticalDetector: fmt::Debug + Send + Sync {
    /// サンプルから文字コードを推定する
    fn guess(&self, sample: &[u8]) -> Option<EncodingGuess>;
}

/// chardetngによる統計的検出器
///
/// chardetngは数値の信頼度を返さないため、`guess_assess()`の評価が
/// 確かな場合は1.0、そうでない場合は0.5を信頼度とします。
#[derive(Debug, Default, Clone, Copy)]
pub struct ChardetngDetector;

impl StatisticalDetector for ChardetngDetector {
    fn guess(&self, sample: &[u8]) -> Option<EncodingGuess> {
        if sample.is_empty() {
            return None;
        }

        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(sample, true);
        let (encoding, confident) = detector.guess_assess(None, true);

        Some(EncodingGuess {
            label: encoding.name().to_string(),
            confidence: if confident { 1.0 } else { 0.5 },
        })
    }
}

/// 文字コード検出器
///
/// # 使用例
///
/// ```rust,no_run
/// use mdsheet::EncodingDetector;
///
/// # fn main() -> Result<(), mdsheet::MdSheetError> {
/// let detector = EncodingDetector::new()
///     .with_candidates(["utf-8", "shift_jis", "euc-jp"])
///     .with_sample_size(4096);
/// let encoding = detector.detect("table.md".as_ref())?;
/// println!("{}", encoding);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EncodingDetector {
    candidates: Vec<String>,
    sample_size: usize,
    verify_chars: usize,
    min_confidence: f32,
    default_label: String,
    statistical: Option<Arc<dyn StatisticalDetector>>,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_ENCODING_CANDIDATES
                .iter()
                .map(|label| label.to_string())
                .collect(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            verify_chars: DEFAULT_VERIFY_CHARS,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            default_label: DEFAULT_ENCODING.to_string(),
            statistical: Some(Arc::new(ChardetngDetector)),
        }
    }
}

impl EncodingDetector {
    /// 既定の設定を持つ検出器を生成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 候補リストを置き換える（先頭ほど優先）
    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// 候補の判定に使用するサンプルサイズ（バイト）を指定する
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// 検証時にデコードする文字数を指定する
    pub fn with_verify_chars(mut self, verify_chars: usize) -> Self {
        self.verify_chars = verify_chars;
        self
    }

    /// 統計的検出器の推定を採用する信頼度のしきい値を指定する
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// 最終的なフォールバックの文字コードを指定する
    pub fn with_default_encoding(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    /// 統計的検出器を差し替える
    pub fn with_statistical_detector(mut self, detector: impl StatisticalDetector + 'static) -> Self {
        self.statistical = Some(Arc::new(detector));
        self
    }

    /// 統計的検出器を使用しない
    pub fn without_statistical_detector(mut self) -> Self {
        self.statistical = None;
        self
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn default_encoding(&self) -> &str {
        &self.default_label
    }

    /// ファイルの文字コードを推定する
    ///
    /// # 処理フロー
    ///
    /// 1. 候補を優先順に試し、サンプルと先頭部分の両方をデコードできた最初の候補を返す
    /// 2. すべて失敗した場合、統計的検出器の推定を信頼度がしきい値を超える場合のみ採用
    /// 3. それも失敗した場合は既定の文字コードを返す
    ///
    /// # 戻り値
    ///
    /// * `Ok(TextEncoding)` - 推定した文字コード
    /// * `Err(MdSheetError::Read)` - ファイルを開けない、または読み込めない場合
    pub fn detect(&self, path: &Path) -> Result<TextEncoding> {
        let sample = read_prefix(path, self.sample_size)?;
        let sample_is_whole_file = sample.len() < self.sample_size;

        for label in &self.candidates {
            let Some(encoding) = TextEncoding::for_label(label) else {
                tracing::debug!(candidate = %label, "skipping unsupported encoding label");
                continue;
            };

            let mut decoder = encoding.new_decoder();
            let mut text = String::new();
            if !encoding.feed(&mut decoder, &sample, sample_is_whole_file, &mut text) {
                tracing::debug!(candidate = %label, "sample does not decode");
                continue;
            }

            if !self.verify(path, &encoding)? {
                tracing::debug!(candidate = %label, "file prefix does not decode");
                continue;
            }

            return Ok(encoding);
        }

        if let Some(encoding) = self.statistical_guess(path)? {
            return Ok(encoding);
        }

        tracing::debug!(default = %self.default_label, "falling back to default encoding");
        Ok(TextEncoding::for_label(&self.default_label).unwrap_or_else(TextEncoding::utf8))
    }

    /// ファイルを開き直し、先頭から`verify_chars`文字以上をデコードできるか確認する
    fn verify(&self, path: &Path, encoding: &TextEncoding) -> Result<bool> {
        let mut file = File::open(path).map_err(|e| MdSheetError::read(path, e))?;
        let mut decoder = encoding.new_decoder();
        let mut chunk = vec![0u8; VERIFY_CHUNK_SIZE];
        let mut text = String::new();

        loop {
            let read = file.read(&mut chunk).map_err(|e| MdSheetError::read(path, e))?;
            let last = read == 0;

            if !encoding.feed(&mut decoder, &chunk[..read], last, &mut text) {
                return Ok(false);
            }
            if last || text.chars().count() >= self.verify_chars {
                return Ok(true);
            }
        }
    }

    fn statistical_guess(&self, path: &Path) -> Result<Option<TextEncoding>> {
        let Some(statistical) = &self.statistical else {
            return Ok(None);
        };

        let sample = read_prefix(path, self.sample_size.saturating_mul(4))?;
        let Some(guess) = statistical.guess(&sample) else {
            return Ok(None);
        };

        if guess.confidence <= self.min_confidence {
            tracing::warn!(
                guess = %guess.label,
                confidence = guess.confidence,
                "ignoring low-confidence encoding guess"
            );
            return Ok(None);
        }

        Ok(TextEncoding::for_label(&guess.label))
    }
}

/// ファイルの先頭`limit`バイトを読み込む
fn read_prefix(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| MdSheetError::read(path, e))?;
    let mut buffer = Vec::with_capacity(limit.min(VERIFY_CHUNK_SIZE));
    file.take(limit as u64)
        .read_to_end(&mut buffer)
        .map_err(|e| MdSheetError::read(path, e))?;
    Ok(buffer)
}
